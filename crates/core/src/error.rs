//! Error types for the extraction core.
//!
//! Missing state (no context, no framebuffer, an attachment that was never
//! uploaded) is not an error: resolvers return `None` for it. The variants
//! here cover contract violations and foreign data that could not be parsed.

use thiserror::Error;

use crate::native_buffer::NativeBufferError;

/// Errors produced by the extractors.
#[derive(Debug, Error)]
pub enum ExtrasError {
    /// The driver reported writing more bytes than the scratch buffer holds.
    #[error("driver contract violation: {query} reported {reported} bytes for a {capacity}-byte buffer")]
    DriverLengthOverflow {
        query: &'static str,
        reported: usize,
        capacity: usize,
    },

    /// `width * height * 4` does not fit in memory.
    #[error("framebuffer capture of {width}x{height} RGBA8 pixels is too large")]
    CaptureTooLarge { width: u32, height: u32 },

    /// A native buffer block was rejected.
    #[error("native buffer: {0}")]
    NativeBuffer(#[from] NativeBufferError),

    /// A state snapshot could not be decoded.
    #[error("invalid state snapshot: {0}")]
    InvalidSnapshot(String),
}

impl From<serde_json::Error> for ExtrasError {
    fn from(e: serde_json::Error) -> Self {
        ExtrasError::InvalidSnapshot(e.to_string())
    }
}
