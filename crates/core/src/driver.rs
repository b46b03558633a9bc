//! The driver entry points the extractors consume.
//!
//! `Driver` mirrors the handful of GL state queries needed here, keeping
//! GL's buffer contract: string queries write into a caller-supplied buffer
//! and report how many bytes they wrote. Enum arguments use the `glow`
//! constants (`glow::LINK_STATUS`, `glow::RGBA`, ...).

use serde::{Deserialize, Serialize};

/// Driver-assigned program object name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramId(pub u32);

/// Result of `glGetActiveUniform` / `glGetActiveAttrib`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveVariableInfo {
    /// Bytes written to the name buffer, excluding the terminator.
    pub length: i32,
    /// Array size; 1 for scalars.
    pub size: i32,
    /// GL type enum (e.g. `glow::FLOAT_VEC4`).
    pub ty: u32,
}

/// Synchronous GL state queries.
///
/// Implementations are trusted to return sensible values, but callers clamp
/// every reported length against the buffer they supplied.
pub trait Driver {
    /// `glGetProgramiv`. Returns 0 for an invalid program.
    fn program_parameter(&self, program: ProgramId, pname: u32) -> i32;

    /// `glGetProgramInfoLog`. Returns the number of bytes written.
    fn program_info_log(&self, program: ProgramId, buf: &mut [u8]) -> i32;

    /// `glGetActiveUniform`.
    fn active_uniform(&self, program: ProgramId, index: u32, buf: &mut [u8])
        -> ActiveVariableInfo;

    /// `glGetActiveAttrib`.
    fn active_attribute(
        &self,
        program: ProgramId,
        index: u32,
        buf: &mut [u8],
    ) -> ActiveVariableInfo;

    /// `glGetUniformLocation`. -1 when the name is not an active uniform.
    fn uniform_location(&self, program: ProgramId, name: &str) -> i32;

    /// `glGetAttribLocation`. -1 when the name is not an active attribute.
    fn attrib_location(&self, program: ProgramId, name: &str) -> i32;

    /// `glReadPixels` from the current read framebuffer into `out`.
    #[allow(clippy::too_many_arguments)]
    fn read_pixels(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        out: &mut [u8],
    );
}
