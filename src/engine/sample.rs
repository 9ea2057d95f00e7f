//! Decoded samples and zero-copy buffer access
//!
//! A sample is one decoded unit of media: a buffer plus the negotiated
//! caps describing its geometry and pixel format. Buffer memory is
//! owned by the engine; consumers get a mapped read-only view whose
//! unmap runs exactly once, when the view is dropped.

use std::sync::Arc;

use bytes::Bytes;

use crate::error::FrameError;

/// Negotiated stream properties attached to a sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCaps {
    pub width: u32,
    pub height: u32,
    /// Engine-native format name, e.g. `"BGRA"`.
    pub format: String,
}

/// One decoded unit of media pulled from the video sink.
#[derive(Clone)]
pub struct Sample {
    pub caps: SampleCaps,
    pub buffer: Arc<dyn SampleBuffer>,
}

impl std::fmt::Debug for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sample").field("caps", &self.caps).finish()
    }
}

/// Engine-owned buffer memory backing one sample.
pub trait SampleBuffer: Send + Sync {
    /// Map the buffer for read access without copying.
    ///
    /// An unmappable buffer is a per-frame error; the stream itself
    /// stays usable for subsequent samples.
    fn map_read(&self) -> Result<MappedData, FrameError>;
}

/// A mapped read-only view over sample memory.
///
/// The unmap hook runs exactly once, when the view is dropped. The
/// `Bytes` payload keeps the view zero-copy and cheap to slice.
pub struct MappedData {
    data: Bytes,
    unmap: Option<Box<dyn FnOnce() + Send>>,
}

impl MappedData {
    /// Wrap mapped memory together with its unmap operation.
    pub fn new(data: Bytes, unmap: impl FnOnce() + Send + 'static) -> Self {
        MappedData { data, unmap: Some(Box::new(unmap)) }
    }

    /// A view that needs no unmap (already refcounted memory).
    pub fn from_bytes(data: Bytes) -> Self {
        MappedData { data, unmap: None }
    }

    /// The mapped memory.
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    /// Size of the mapped region in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl std::ops::Deref for MappedData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl Drop for MappedData {
    fn drop(&mut self) {
        if let Some(unmap) = self.unmap.take() {
            unmap();
        }
    }
}

impl std::fmt::Debug for MappedData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedData").field("len", &self.len()).finish()
    }
}

/// Terminal pipeline element that receives decoded video samples.
///
/// The sink signals sample availability (preroll, new-sample, EOS) out
/// of band; pulling is non-blocking and may return `None` on a spurious
/// signal, which is a no-op for the consumer.
pub trait VideoSink: Send + Sync {
    /// Pull the preroll sample (first frame, available before playback
    /// formally starts).
    fn pull_preroll(&self) -> Option<Sample>;

    /// Pull the next steady-state sample.
    fn pull_sample(&self) -> Option<Sample>;
}
