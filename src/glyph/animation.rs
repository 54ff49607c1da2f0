//! Animation assembly and export.
//!
//! An [`Animation`] is a sequence of rendered frames. GIF output is encoded
//! in-process; every other supported container is piped as raw frames to the
//! system `ffmpeg` binary, which must be installed and on `PATH`.

use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbImage};
use tracing::{info, warn};

use crate::error::{OchreError, Result};

/// Animation containers selectable by file extension.
pub const SUPPORTED_VIDEO_FORMATS: &[&str] = &["gif", "mov", "avi", "mp4"];

/// A rendered frame sequence ready for export.
pub struct Animation {
    frames: Vec<RgbImage>,
    interval_ms: u64,
}

impl Animation {
    pub(crate) fn new(frames: Vec<RgbImage>, interval_ms: u64) -> Self {
        Animation {
            frames,
            interval_ms,
        }
    }

    /// The rendered frames, in playback order.
    pub fn frames(&self) -> &[RgbImage] {
        &self.frames
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Delay between frames in milliseconds, as requested at render time.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Save the animation; the container is chosen by the file extension.
    ///
    /// `gif` is encoded in-process. `mp4`, `avi` and `mov` require the
    /// external `ffmpeg` encoder; when the binary is missing the export is
    /// skipped with a logged hint instead of an error.
    pub fn save<P: AsRef<Path>>(&self, path: P, fps: u32) -> Result<()> {
        let path = path.as_ref();
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if !SUPPORTED_VIDEO_FORMATS.contains(&format.as_str()) {
            return Err(OchreError::UnsupportedVideoFormat { format });
        }
        if self.frames.is_empty() {
            return Err(OchreError::InvalidParameter {
                param: "frames".to_string(),
                message: "the animation has no frames".to_string(),
            });
        }
        let fps = fps.max(1);

        if format == "gif" {
            self.save_gif(path, fps)
        } else {
            self.save_ffmpeg(path, fps)
        }
    }

    fn save_gif(&self, path: &Path, fps: u32) -> Result<()> {
        let file = File::create(path)?;
        let mut encoder = GifEncoder::new(file);
        encoder.set_repeat(Repeat::Infinite)?;

        let delay = Delay::from_numer_denom_ms(1000 / fps, 1);
        for frame in &self.frames {
            let rgba = image::DynamicImage::ImageRgb8(frame.clone()).to_rgba8();
            encoder.encode_frame(Frame::from_parts(rgba, 0, 0, delay))?;
        }

        info!(
            path = %path.display(),
            frames = self.frames.len(),
            fps = fps,
            "Animation saved"
        );
        Ok(())
    }

    fn save_ffmpeg(&self, path: &Path, fps: u32) -> Result<()> {
        let (width, height) = self.frames[0].dimensions();
        let spawned = Command::new("ffmpeg")
            .args([
                "-y",
                "-f",
                "rawvideo",
                "-pixel_format",
                "rgb24",
                "-video_size",
                &format!("{}x{}", width, height),
                "-framerate",
                &fps.to_string(),
                "-i",
                "-",
                "-pix_fmt",
                "yuv420p",
            ])
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    path = %path.display(),
                    "ffmpeg was not found on PATH; skipping video export. \
                     Install a build from https://ffmpeg.org/ to write mp4/avi/mov files"
                );
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let mut stdin = child.stdin.take().ok_or_else(|| OchreError::Render {
            message: "failed to open ffmpeg stdin".to_string(),
        })?;
        for frame in &self.frames {
            stdin.write_all(frame.as_raw())?;
        }
        drop(stdin);

        let status = child.wait()?;
        if !status.success() {
            return Err(OchreError::Render {
                message: format!("ffmpeg exited with status {}", status),
            });
        }

        info!(
            path = %path.display(),
            frames = self.frames.len(),
            fps = fps,
            "Animation saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, image::Rgb(rgb))
    }

    #[test]
    fn test_unsupported_extension() {
        let anim = Animation::new(vec![solid_frame(4, 4, [255, 0, 0])], 200);
        let err = anim.save("out.webm", 2).unwrap_err();
        assert!(matches!(
            err,
            OchreError::UnsupportedVideoFormat { format } if format == "webm"
        ));
    }

    #[test]
    fn test_missing_extension() {
        let anim = Animation::new(vec![solid_frame(4, 4, [255, 0, 0])], 200);
        assert!(anim.save("out", 2).is_err());
    }

    #[test]
    fn test_empty_animation_is_rejected() {
        let anim = Animation::new(vec![], 200);
        assert!(anim.save("out.gif", 2).is_err());
    }

    #[test]
    fn test_gif_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        let frames = vec![
            solid_frame(8, 8, [255, 0, 0]),
            solid_frame(8, 8, [0, 255, 0]),
            solid_frame(8, 8, [0, 0, 255]),
        ];
        let anim = Animation::new(frames, 200);
        anim.save(&path, 2).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Gif
        );
    }
}
