//! Colormap implementations for figure rendering.
//!
//! Named colormaps are resolved by string through [`get_colormap`]; custom
//! ramps built from user colors live in [`ramp`].

pub mod colormap;
pub mod diverging;
pub mod ramp;
pub mod sequential;

pub use colormap::{get_colormap, lerp_color, Colormap};
pub use ramp::ColorRamp;

// Re-export commonly used colormaps
pub use diverging::Coolwarm;
pub use sequential::{Grays, Terrain, Viridis};
