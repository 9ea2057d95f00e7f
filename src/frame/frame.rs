//! Immutable view over one decoded video buffer

use crate::engine::{MappedData, Sample};
use crate::error::FrameError;
use crate::format::{self, PixelFormat};

/// One decoded video frame.
///
/// The backing memory is mapped when the frame is constructed and
/// unmapped exactly once, when the frame is dropped. How long a frame
/// may be held depends on the delivery model that produced it (see
/// [`FrameSource`](super::FrameSource)).
pub struct Frame {
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
    scan_size: usize,
    data: MappedData,
}

impl Frame {
    /// Wrap a sample, parsing its negotiated geometry and format and
    /// mapping the buffer for read access.
    ///
    /// A format name without a pixel layout mapping is a per-frame
    /// error; the stream stays usable for subsequent samples.
    pub(crate) fn from_sample(sample: &Sample) -> Result<Frame, FrameError> {
        let video = format::parse_format(&sample.caps.format);
        let pixel = format::video_to_pixel(video);
        if pixel == PixelFormat::Unknown {
            return Err(FrameError::UnsupportedFormat(sample.caps.format.clone()));
        }

        let scan_size = sample.caps.width as usize * format::bytes_per_pixel(pixel);
        let data = sample.buffer.map_read()?;

        Ok(Frame {
            width: sample.caps.width,
            height: sample.caps.height,
            pixel_format: pixel,
            scan_size,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Bytes per row of pixels.
    pub fn scan_size(&self) -> usize {
        self.scan_size
    }

    /// The mapped pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixel_format", &self.pixel_format)
            .field("scan_size", &self.scan_size)
            .field("size", &self.data.len())
            .finish()
    }
}
