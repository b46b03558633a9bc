//! Descriptor extraction for Android `ANativeWindowBuffer` client buffers.
//!
//! An `EGLClientBuffer` passed to `eglCreateImageKHR` is an opaque pointer
//! whose layout is defined by the platform:
//!
//! ```text
//! struct android_native_base_t {
//!     int magic;              // '_bfr' for buffers, '_wnd' for windows
//!     int version;
//!     void* reserved[4];
//!     void (*incRef)(...);
//!     void (*decRef)(...);
//! };
//! struct ANativeWindowBuffer {
//!     android_native_base_t common;
//!     int width, height, stride, format, usage;
//!     ...
//! };
//! ```
//!
//! The only validation the platform offers is the magic tag, so every read
//! goes through [`parse_native_buffer`], which checks the tag and copies the
//! fields into an owned [`AndroidNativeBufferExtra`].

use std::ffi::c_void;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extra::{Extra, ExtraKind, ToExtra};
use crate::observer::CallObserver;

/// Packs four ASCII bytes big-endian into a 32-bit tag.
pub const fn make_constant(a: u8, b: u8, c: u8, d: u8) -> u32 {
    ((a as u32) << 24) | ((b as u32) << 16) | ((c as u32) << 8) | (d as u32)
}

/// Magic of an `ANativeWindowBuffer`.
pub const ANDROID_NATIVE_BUFFER_MAGIC: u32 = make_constant(b'_', b'b', b'f', b'r');

/// Magic of an `ANativeWindow`.
pub const ANDROID_NATIVE_WINDOW_MAGIC: u32 = make_constant(b'_', b'w', b'n', b'd');

/// Reasons a memory block is not accepted as a native buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeBufferError {
    #[error("block of {len} bytes is shorter than the {needed}-byte buffer header")]
    Truncated { len: usize, needed: usize },

    #[error("handle is an ANativeWindow ('_wnd'), not a buffer")]
    WindowHandle,

    #[error("unknown EGLClientBuffer with magic {0:#x}")]
    UnknownMagic(u32),
}

/// Field offsets of `ANativeWindowBuffer` for a given pointer width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeBufferLayout {
    pointer_width: usize,
}

impl NativeBufferLayout {
    /// Layout of the running process.
    pub const HOST: Self = Self::new(std::mem::size_of::<usize>());

    /// 32-bit ABI (armeabi-v7a, x86).
    pub const ABI32: Self = Self::new(4);

    /// 64-bit ABI (arm64-v8a, x86_64).
    pub const ABI64: Self = Self::new(8);

    pub const fn new(pointer_width: usize) -> Self {
        Self { pointer_width }
    }

    pub const fn pointer_width(&self) -> usize {
        self.pointer_width
    }

    /// Size of `android_native_base_t`: two ints, then six pointers aligned
    /// to the pointer width.
    const fn common_len(&self) -> usize {
        let ints = 8_usize.next_multiple_of(self.pointer_width);
        ints + 6 * self.pointer_width
    }

    const fn width_offset(&self) -> usize {
        self.common_len()
    }

    /// Bytes that must be readable to extract every field.
    pub const fn required_len(&self) -> usize {
        self.width_offset() + 5 * 4
    }
}

impl Default for NativeBufferLayout {
    fn default() -> Self {
        Self::HOST
    }
}

/// Geometry and format of a native buffer, copied out of platform memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndroidNativeBufferExtra {
    pub width: i32,
    pub height: i32,
    pub stride: i32,
    pub format: i32,
    pub usage: i32,
}

impl ToExtra for AndroidNativeBufferExtra {
    fn to_extra(&self) -> Extra {
        Extra::from_record(ExtraKind::AndroidNativeBufferExtra, self)
    }
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    let mut word = [0_u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    i32::from_ne_bytes(word)
}

/// Validates the magic tag and copies the buffer fields out of `bytes`.
///
/// Fields are read in native byte order, as they sit in process memory.
pub fn parse_native_buffer(
    bytes: &[u8],
    layout: NativeBufferLayout,
) -> Result<AndroidNativeBufferExtra, NativeBufferError> {
    let needed = layout.required_len();
    if bytes.len() < needed {
        return Err(NativeBufferError::Truncated {
            len: bytes.len(),
            needed,
        });
    }

    let magic = read_i32(bytes, 0) as u32;
    match magic {
        ANDROID_NATIVE_BUFFER_MAGIC => {}
        ANDROID_NATIVE_WINDOW_MAGIC => return Err(NativeBufferError::WindowHandle),
        other => return Err(NativeBufferError::UnknownMagic(other)),
    }

    let base = layout.width_offset();
    Ok(AndroidNativeBufferExtra {
        width: read_i32(bytes, base),
        height: read_i32(bytes, base + 4),
        stride: read_i32(bytes, base + 8),
        format: read_i32(bytes, base + 12),
        usage: read_i32(bytes, base + 16),
    })
}

/// Parses `bytes` and attaches the descriptor to `observer`.
///
/// A rejected block is logged and yields `None`.
pub fn describe_native_buffer_bytes<O>(
    observer: &mut O,
    bytes: &[u8],
    layout: NativeBufferLayout,
) -> Option<AndroidNativeBufferExtra>
where
    O: CallObserver + ?Sized,
{
    match parse_native_buffer(bytes, layout) {
        Ok(extra) => {
            tracing::debug!(
                width = extra.width,
                height = extra.height,
                "created AndroidNativeBufferExtra"
            );
            observer.add_extra(extra.to_extra());
            Some(extra)
        }
        Err(err) => {
            tracing::warn!("{err}");
            None
        }
    }
}

/// Describes the `ANativeWindowBuffer` behind an `EGLClientBuffer` handle.
///
/// # Safety
///
/// `handle` must be null or point to readable memory at least
/// [`NativeBufferLayout::HOST`]`.required_len()` bytes long for the duration
/// of the call. Nothing is retained after it returns.
#[cfg(target_os = "android")]
#[allow(unsafe_code)]
pub unsafe fn describe_native_buffer<O>(
    observer: &mut O,
    handle: *const c_void,
) -> Option<AndroidNativeBufferExtra>
where
    O: CallObserver + ?Sized,
{
    if handle.is_null() {
        return None;
    }
    let layout = NativeBufferLayout::HOST;
    // SAFETY: the caller guarantees `handle` covers `required_len()` bytes.
    let bytes = unsafe { std::slice::from_raw_parts(handle.cast::<u8>(), layout.required_len()) };
    describe_native_buffer_bytes(observer, bytes, layout)
}

/// Native buffers only exist on Android; elsewhere this always returns `None`.
///
/// # Safety
///
/// Never dereferences `handle`.
#[cfg(not(target_os = "android"))]
#[allow(unsafe_code)]
pub unsafe fn describe_native_buffer<O>(
    _observer: &mut O,
    _handle: *const c_void,
) -> Option<AndroidNativeBufferExtra>
where
    O: CallObserver + ?Sized,
{
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RecordingObserver;

    fn buffer_bytes(layout: NativeBufferLayout, magic: u32, fields: [i32; 5]) -> Vec<u8> {
        let mut bytes = vec![0xAA_u8; layout.required_len() + 16];
        bytes[0..4].copy_from_slice(&magic.to_ne_bytes());
        let base = layout.width_offset();
        for (i, value) in fields.iter().enumerate() {
            let at = base + i * 4;
            bytes[at..at + 4].copy_from_slice(&value.to_ne_bytes());
        }
        bytes
    }

    #[test]
    fn magic_constants_pack_big_endian() {
        assert_eq!(ANDROID_NATIVE_BUFFER_MAGIC, u32::from_be_bytes(*b"_bfr"));
        assert_eq!(ANDROID_NATIVE_WINDOW_MAGIC, u32::from_be_bytes(*b"_wnd"));
    }

    #[test]
    fn layout_offsets_match_abi() {
        assert_eq!(NativeBufferLayout::ABI64.width_offset(), 56);
        assert_eq!(NativeBufferLayout::ABI64.required_len(), 76);
        assert_eq!(NativeBufferLayout::ABI32.width_offset(), 32);
        assert_eq!(NativeBufferLayout::ABI32.required_len(), 52);
    }

    #[test]
    fn valid_buffer_parses_on_both_abis() {
        for layout in [NativeBufferLayout::ABI32, NativeBufferLayout::ABI64] {
            let bytes = buffer_bytes(layout, ANDROID_NATIVE_BUFFER_MAGIC, [720, 1280, 736, 1, 0x933]);
            let extra = parse_native_buffer(&bytes, layout).unwrap();
            assert_eq!(
                extra,
                AndroidNativeBufferExtra {
                    width: 720,
                    height: 1280,
                    stride: 736,
                    format: 1,
                    usage: 0x933,
                },
                "layout {layout:?}"
            );
        }
    }

    #[test]
    fn window_magic_is_rejected() {
        let layout = NativeBufferLayout::ABI64;
        let bytes = buffer_bytes(layout, ANDROID_NATIVE_WINDOW_MAGIC, [1, 1, 1, 1, 1]);
        assert_eq!(
            parse_native_buffer(&bytes, layout),
            Err(NativeBufferError::WindowHandle)
        );
    }

    #[test]
    fn any_other_magic_is_rejected() {
        let layout = NativeBufferLayout::ABI64;
        for magic in [0, 0xdead_beef, u32::from_le_bytes(*b"_bfr"), make_constant(b'_', b'b', b'f', b's')] {
            let bytes = buffer_bytes(layout, magic, [1, 1, 1, 1, 1]);
            assert_eq!(
                parse_native_buffer(&bytes, layout),
                Err(NativeBufferError::UnknownMagic(magic)),
                "magic {magic:#x}"
            );
        }
    }

    #[test]
    fn truncated_block_is_rejected() {
        let layout = NativeBufferLayout::ABI64;
        let bytes = buffer_bytes(layout, ANDROID_NATIVE_BUFFER_MAGIC, [1, 1, 1, 1, 1]);
        let short = &bytes[..layout.required_len() - 1];
        assert_eq!(
            parse_native_buffer(short, layout),
            Err(NativeBufferError::Truncated {
                len: 75,
                needed: 76
            })
        );
    }

    #[test]
    fn unknown_magic_message_carries_hex_tag() {
        let msg = NativeBufferError::UnknownMagic(0x1234_abcd).to_string();
        assert!(msg.contains("0x1234abcd"), "got: {msg}");
    }

    #[test]
    fn describe_attaches_extra_on_match() {
        let layout = NativeBufferLayout::HOST;
        let bytes = buffer_bytes(layout, ANDROID_NATIVE_BUFFER_MAGIC, [64, 32, 64, 2, 0]);
        let mut obs = RecordingObserver::new();
        let extra = describe_native_buffer_bytes(&mut obs, &bytes, layout).unwrap();

        assert_eq!(extra.width, 64);
        let extras = obs.extras();
        assert_eq!(extras.len(), 1);
        assert_eq!(extras[0].kind(), ExtraKind::AndroidNativeBufferExtra);
        assert_eq!(extras[0].payload()["height"], 32);
    }

    #[test]
    fn describe_returns_none_and_attaches_nothing_on_mismatch() {
        let layout = NativeBufferLayout::HOST;
        let bytes = buffer_bytes(layout, ANDROID_NATIVE_WINDOW_MAGIC, [64, 32, 64, 2, 0]);
        let mut obs = RecordingObserver::new();
        assert!(describe_native_buffer_bytes(&mut obs, &bytes, layout).is_none());
        assert!(obs.extras().is_empty());
    }

    #[test]
    fn extracted_record_outlives_source_memory() {
        let layout = NativeBufferLayout::HOST;
        let mut obs = RecordingObserver::new();
        let extra = {
            let bytes = buffer_bytes(layout, ANDROID_NATIVE_BUFFER_MAGIC, [5, 6, 7, 8, 9]);
            describe_native_buffer_bytes(&mut obs, &bytes, layout).unwrap()
        };
        assert_eq!(extra.stride, 7);
    }

    #[cfg(not(target_os = "android"))]
    #[test]
    #[allow(unsafe_code)]
    fn raw_handle_is_ignored_off_android() {
        let layout = NativeBufferLayout::HOST;
        let bytes = buffer_bytes(layout, ANDROID_NATIVE_BUFFER_MAGIC, [5, 6, 7, 8, 9]);
        let mut obs = RecordingObserver::new();
        // SAFETY: the non-Android implementation never reads the handle.
        let extra = unsafe { describe_native_buffer(&mut obs, bytes.as_ptr().cast()) };
        assert!(extra.is_none());
        assert!(obs.extras().is_empty());
    }

    #[cfg(target_os = "android")]
    #[test]
    #[allow(unsafe_code)]
    fn raw_handle_is_parsed_on_android() {
        let layout = NativeBufferLayout::HOST;
        let bytes = buffer_bytes(layout, ANDROID_NATIVE_BUFFER_MAGIC, [5, 6, 7, 8, 9]);
        let mut obs = RecordingObserver::new();
        // SAFETY: `bytes` is longer than the required layout length.
        let extra = unsafe { describe_native_buffer(&mut obs, bytes.as_ptr().cast()) };
        assert_eq!(extra.map(|e| e.usage), Some(9));
        // SAFETY: null handles are checked before any read.
        assert!(unsafe { describe_native_buffer(&mut obs, std::ptr::null()) }.is_none());
    }
}
