#![deny(unsafe_code)]
//! State extraction for GLES call tracing.
//!
//! While an application issues GL calls, the interception layer mirrors the
//! driver's object graph in a [`ContextStateGraph`]. The extractors here read
//! that graph and the live [`Driver`] to produce facts the call arguments do
//! not carry, and attach them to the recorded call as [`Extra`]s:
//!
//! - [`describe_program`] -- link status, info log, active uniforms/attributes.
//! - [`resolve_color_attachment0_size`] -- size of the read framebuffer's
//!   first color attachment.
//! - [`capture_framebuffer`] -- RGBA8 readback of that attachment.
//! - [`describe_native_buffer`] -- geometry of an Android `EGLClientBuffer`.

pub mod attachment;
pub mod driver;
pub mod error;
pub mod extra;
pub mod framebuffer;
#[cfg(not(target_arch = "wasm32"))]
pub mod glow_driver;
pub mod native_buffer;
pub mod observer;
pub mod program;
pub mod scratch;
pub mod state;

pub use attachment::{resolve_attachment_size, resolve_color_attachment0_size, AttachmentSize};
pub use driver::{ActiveVariableInfo, Driver, ProgramId};
pub use error::ExtrasError;
pub use extra::{Extra, ExtraKind, ToExtra};
pub use framebuffer::{capture_framebuffer, FramebufferCapture};
#[cfg(not(target_arch = "wasm32"))]
pub use glow_driver::GlowDriver;
pub use native_buffer::{
    describe_native_buffer, describe_native_buffer_bytes, parse_native_buffer,
    AndroidNativeBufferExtra, NativeBufferError, NativeBufferLayout,
};
pub use observer::{CallObserver, RecordingObserver};
pub use program::{describe_program, ActiveAttribute, ActiveUniform, ProgramInfo};
pub use scratch::Scratch;
pub use state::{
    Attachment, Context, ContextLookup, ContextStateGraph, Framebuffer, FramebufferId,
    Renderbuffer, RenderbufferId, Texture, TextureId, TextureKind, TextureLevel, ThreadId,
};
