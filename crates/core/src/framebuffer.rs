//! RGBA8 readback of the current read framebuffer.

use crate::attachment::resolve_color_attachment0_size;
use crate::driver::Driver;
use crate::error::ExtrasError;
use crate::state::{ContextLookup, ThreadId};

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Pixels read back from color attachment 0.
///
/// `pixels` holds `width * height` RGBA8 texels, bottom row first as
/// `glReadPixels` returns them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferCapture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Reads back the read framebuffer bound on `thread`.
///
/// Returns `Ok(None)` without allocating when the attachment size cannot be
/// resolved.
///
/// # Errors
///
/// Returns `ExtrasError::CaptureTooLarge` if `width * height * 4` overflows
/// `usize` or a dimension does not fit the driver's `GLsizei`.
pub fn capture_framebuffer<L, D>(
    lookup: &L,
    driver: &D,
    thread: ThreadId,
) -> Result<Option<FramebufferCapture>, ExtrasError>
where
    L: ContextLookup + ?Sized,
    D: Driver + ?Sized,
{
    let Some(size) = resolve_color_attachment0_size(lookup, thread) else {
        return Ok(None);
    };
    let too_large = || ExtrasError::CaptureTooLarge {
        width: size.width,
        height: size.height,
    };

    let width = i32::try_from(size.width).map_err(|_| too_large())?;
    let height = i32::try_from(size.height).map_err(|_| too_large())?;
    let len = (size.width as usize)
        .checked_mul(size.height as usize)
        .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
        .ok_or_else(too_large)?;

    let mut pixels = vec![0_u8; len];
    driver.read_pixels(
        0,
        0,
        width,
        height,
        glow::RGBA,
        glow::UNSIGNED_BYTE,
        &mut pixels,
    );

    Ok(Some(FramebufferCapture {
        width: size.width,
        height: size.height,
        pixels,
    }))
}
