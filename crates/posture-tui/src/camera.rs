use std::path::Path;
use anyhow::Result;
use posture_core::{FrameSource, StillImage};

/// Open the frame source: a still image when one is given, else the webcam.
pub fn acquire(image: Option<&Path>, camera_index: i32) -> Result<Box<dyn FrameSource>> {
    match image {
        Some(path) => Ok(Box::new(StillImage::open(path)?)),
        None => open_webcam(camera_index),
    }
}

#[cfg(feature = "opencv")]
fn open_webcam(camera_index: i32) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(webcam::Webcam::open(camera_index)?))
}

#[cfg(not(feature = "opencv"))]
fn open_webcam(camera_index: i32) -> Result<Box<dyn FrameSource>> {
    anyhow::bail!(
        "camera {} unavailable: built without webcam support (enable the `opencv` feature or pass --image)",
        camera_index
    )
}

#[cfg(feature = "opencv")]
mod webcam {
    use anyhow::Result;
    use opencv::{
        core::Vector,
        imgcodecs,
        prelude::*,
        videoio::{self, VideoCapture},
    };
    use posture_core::FrameSource;

    pub struct Webcam {
        capture: VideoCapture,
        index: i32,
    }

    impl Webcam {
        pub fn open(index: i32) -> Result<Self> {
            let capture = VideoCapture::new(index, videoio::CAP_ANY)?;

            if !capture.is_opened()? {
                anyhow::bail!("Failed to open camera {}", index);
            }

            Ok(Self { capture, index })
        }
    }

    impl FrameSource for Webcam {
        fn describe(&self) -> String {
            format!("camera {}", self.index)
        }

        fn grab_jpeg(&mut self) -> Result<Vec<u8>> {
            let mut frame = Mat::default();
            self.capture.read(&mut frame)?;

            if frame.empty() {
                anyhow::bail!("Empty frame from camera {}", self.index);
            }

            let mut buf = Vector::<u8>::new();
            if !imgcodecs::imencode(".jpg", &frame, &mut buf, &Vector::new())? {
                anyhow::bail!("JPEG encoding failed");
            }

            Ok(buf.to_vec())
        }
    }
}
