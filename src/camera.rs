use anyhow::Result;
use chrono::{DateTime, Utc};
use image::RgbImage;

/// One captured video frame, stamped at capture time.
pub struct VideoFrame {
    image: RgbImage,
    pub timestamp: DateTime<Utc>,
}

impl VideoFrame {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            timestamp: Utc::now(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

/// Camera-device seam. Real implementations wrap a capture backend;
/// tests and the demo binary supply scripted sources.
pub trait FrameSource: Send {
    /// Acquire the device. Permission denial or device errors must be
    /// returned here so the session never starts with partial state.
    /// Callers only invoke this on explicit user action.
    fn open(&mut self) -> Result<()>;

    /// Fetch the next frame. `Ok(None)` means no frame is ready yet;
    /// the loop simply tries again on its next tick.
    fn grab(&mut self) -> Result<Option<VideoFrame>>;

    /// Release the device. Must be idempotent; called on every shutdown
    /// path including repeated stops.
    fn release(&mut self);
}
