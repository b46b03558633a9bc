//! [`Driver`] implementation over a live `glow::Context`.
//!
//! glow returns owned strings where GL fills a caller buffer, so the adapter
//! copies each string into the supplied buffer (truncated to leave room for
//! a terminator, as GL does) and reports the copied length.

use std::num::NonZeroU32;

use glow::HasContext;

use crate::driver::{ActiveVariableInfo, Driver, ProgramId};

/// Copies `text` into `buf` GL-style and returns the bytes written, excluding
/// the terminator.
fn copy_gl_string(text: &str, buf: &mut [u8]) -> i32 {
    let n = text.len().min(buf.len().saturating_sub(1));
    buf[..n].copy_from_slice(&text.as_bytes()[..n]);
    if let Some(terminator) = buf.get_mut(n) {
        *terminator = 0;
    }
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Borrows a GL context for the duration of one extraction.
pub struct GlowDriver<'a> {
    gl: &'a glow::Context,
}

impl<'a> GlowDriver<'a> {
    /// Wraps `gl`. The context must be current on the calling thread.
    pub fn new(gl: &'a glow::Context) -> Self {
        Self { gl }
    }

    fn program(program: ProgramId) -> Option<glow::NativeProgram> {
        NonZeroU32::new(program.0).map(glow::NativeProgram)
    }
}

impl Driver for GlowDriver<'_> {
    #[allow(unsafe_code)]
    fn program_parameter(&self, program: ProgramId, pname: u32) -> i32 {
        let Some(program) = Self::program(program) else {
            return 0;
        };
        // SAFETY: glow wraps raw GL calls as unsafe. The query only reads
        // program state; invalid names raise a GL error and return 0.
        unsafe { self.gl.get_program_parameter_i32(program, pname) }
    }

    #[allow(unsafe_code)]
    fn program_info_log(&self, program: ProgramId, buf: &mut [u8]) -> i32 {
        let Some(program) = Self::program(program) else {
            return 0;
        };
        // SAFETY: read-only query on a program name.
        let log = unsafe { self.gl.get_program_info_log(program) };
        copy_gl_string(&log, buf)
    }

    #[allow(unsafe_code)]
    fn active_uniform(&self, program: ProgramId, index: u32, buf: &mut [u8]) -> ActiveVariableInfo {
        let Some(program) = Self::program(program) else {
            return ActiveVariableInfo::default();
        };
        // SAFETY: read-only query; out-of-range indices yield `None`.
        match unsafe { self.gl.get_active_uniform(program, index) } {
            Some(uniform) => ActiveVariableInfo {
                length: copy_gl_string(&uniform.name, buf),
                size: uniform.size,
                ty: uniform.utype,
            },
            None => ActiveVariableInfo::default(),
        }
    }

    #[allow(unsafe_code)]
    fn active_attribute(
        &self,
        program: ProgramId,
        index: u32,
        buf: &mut [u8],
    ) -> ActiveVariableInfo {
        let Some(program) = Self::program(program) else {
            return ActiveVariableInfo::default();
        };
        // SAFETY: read-only query; out-of-range indices yield `None`.
        match unsafe { self.gl.get_active_attribute(program, index) } {
            Some(attribute) => ActiveVariableInfo {
                length: copy_gl_string(&attribute.name, buf),
                size: attribute.size,
                ty: attribute.atype,
            },
            None => ActiveVariableInfo::default(),
        }
    }

    #[allow(unsafe_code)]
    fn uniform_location(&self, program: ProgramId, name: &str) -> i32 {
        let Some(program) = Self::program(program) else {
            return -1;
        };
        // SAFETY: read-only query by name.
        unsafe { self.gl.get_uniform_location(program, name) }
            .and_then(|location| i32::try_from(location.0).ok())
            .unwrap_or(-1)
    }

    #[allow(unsafe_code)]
    fn attrib_location(&self, program: ProgramId, name: &str) -> i32 {
        let Some(program) = Self::program(program) else {
            return -1;
        };
        // SAFETY: read-only query by name.
        unsafe { self.gl.get_attrib_location(program, name) }
            .and_then(|location| i32::try_from(location).ok())
            .unwrap_or(-1)
    }

    #[allow(unsafe_code)]
    fn read_pixels(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        out: &mut [u8],
    ) {
        // SAFETY: `out` is sized by the caller for `width * height` texels of
        // `format`/`ty`; glow checks the slice against the pack parameters.
        unsafe {
            self.gl.read_pixels(
                x,
                y,
                width,
                height,
                format,
                ty,
                glow::PixelPackData::Slice(Some(out)),
            );
        }
    }
}
