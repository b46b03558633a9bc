//! Program introspection: link status, info log, active uniforms and attributes.
//!
//! [`describe_program`] walks a linked program's active variable tables
//! through the [`Driver`] and builds a [`ProgramInfo`]. All name queries in
//! one call share a single scratch buffer sized from the driver-reported
//! maximum lengths.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::driver::{ActiveVariableInfo, Driver, ProgramId};
use crate::error::ExtrasError;
use crate::extra::{Extra, ExtraKind, ToExtra};
use crate::observer::CallObserver;

/// One active uniform of a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveUniform {
    pub name: String,
    /// Array size; scalars report 1.
    pub array_size: i32,
    /// GL type enum (e.g. `glow::FLOAT_MAT4`).
    pub ty: u32,
    /// -1 when the driver could not resolve the name.
    pub location: i32,
}

/// One active vertex attribute of a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveAttribute {
    pub name: String,
    pub array_size: i32,
    pub ty: u32,
    pub location: i32,
}

/// Snapshot of a program object's link results.
///
/// Uniforms and attributes are keyed by their active index, not by name, so
/// two entries stay distinct even if a driver repeats a name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramInfo {
    link_status: bool,
    info_log: String,
    active_uniforms: BTreeMap<u32, ActiveUniform>,
    active_attributes: BTreeMap<u32, ActiveAttribute>,
}

impl ProgramInfo {
    pub fn link_status(&self) -> bool {
        self.link_status
    }

    pub fn info_log(&self) -> &str {
        &self.info_log
    }

    pub fn uniforms(&self) -> &BTreeMap<u32, ActiveUniform> {
        &self.active_uniforms
    }

    pub fn attributes(&self) -> &BTreeMap<u32, ActiveAttribute> {
        &self.active_attributes
    }

    pub fn uniform(&self, index: u32) -> Option<&ActiveUniform> {
        self.active_uniforms.get(&index)
    }

    pub fn attribute(&self, index: u32) -> Option<&ActiveAttribute> {
        self.active_attributes.get(&index)
    }

    /// First uniform (lowest index) with the given name.
    pub fn uniform_by_name(&self, name: &str) -> Option<&ActiveUniform> {
        self.active_uniforms.values().find(|u| u.name == name)
    }
}

impl ToExtra for ProgramInfo {
    fn to_extra(&self) -> Extra {
        Extra::from_record(ExtraKind::ProgramInfo, self)
    }
}

/// Converts a driver-reported length into a usable byte count.
///
/// Negative lengths read as 0. A length past the end of the buffer breaks
/// the driver contract and is reported instead of being trusted.
fn checked_len(query: &'static str, reported: i32, capacity: usize) -> Result<usize, ExtrasError> {
    let len = usize::try_from(reported).unwrap_or(0);
    if len > capacity {
        tracing::error!(query, reported = len, capacity, "driver wrote past scratch buffer");
        return Err(ExtrasError::DriverLengthOverflow {
            query,
            reported: len,
            capacity,
        });
    }
    Ok(len)
}

/// A name read out of the scratch buffer, with the metadata that came with it.
struct VariableName {
    name: String,
    info: ActiveVariableInfo,
}

fn read_variable(
    query: &'static str,
    buf: &mut [u8],
    fetch: impl FnOnce(&mut [u8]) -> ActiveVariableInfo,
) -> Result<VariableName, ExtrasError> {
    let info = fetch(buf);
    let len = checked_len(query, info.length, buf.len())?;
    Ok(VariableName {
        name: String::from_utf8_lossy(&buf[..len]).into_owned(),
        info,
    })
}

/// Describes `program` and attaches the result to `observer`.
///
/// An invalid program makes every driver query report zero, which yields an
/// unlinked record with no variables rather than an error.
///
/// # Errors
///
/// Returns `ExtrasError::DriverLengthOverflow` if the driver reports writing
/// more bytes than the scratch buffer it was given.
pub fn describe_program<D, O>(
    driver: &D,
    observer: &mut O,
    program: ProgramId,
) -> Result<ProgramInfo, ExtrasError>
where
    D: Driver + ?Sized,
    O: CallObserver + ?Sized,
{
    let info_log_length = driver.program_parameter(program, glow::INFO_LOG_LENGTH);
    let attribute_max_length = driver.program_parameter(program, glow::ACTIVE_ATTRIBUTE_MAX_LENGTH);
    let uniform_max_length = driver.program_parameter(program, glow::ACTIVE_UNIFORM_MAX_LENGTH);
    let str_size = info_log_length
        .max(attribute_max_length)
        .max(uniform_max_length)
        .max(0) as usize;

    let link_status = driver.program_parameter(program, glow::LINK_STATUS) != 0;
    let active_uniforms = driver.program_parameter(program, glow::ACTIVE_UNIFORMS).max(0) as u32;
    let active_attributes =
        driver.program_parameter(program, glow::ACTIVE_ATTRIBUTES).max(0) as u32;

    let buf = observer.scratch().alloc(str_size);

    let written = driver.program_info_log(program, buf);
    let len = checked_len("glGetProgramInfoLog", written, buf.len())?;
    let info_log = String::from_utf8_lossy(&buf[..len]).into_owned();

    let mut uniforms = BTreeMap::new();
    for index in 0..active_uniforms {
        let v = read_variable("glGetActiveUniform", buf, |b| {
            driver.active_uniform(program, index, b)
        })?;
        let location = driver.uniform_location(program, &v.name);
        uniforms.insert(
            index,
            ActiveUniform {
                name: v.name,
                array_size: v.info.size,
                ty: v.info.ty,
                location,
            },
        );
    }

    let mut attributes = BTreeMap::new();
    for index in 0..active_attributes {
        let v = read_variable("glGetActiveAttrib", buf, |b| {
            driver.active_attribute(program, index, b)
        })?;
        let location = driver.attrib_location(program, &v.name);
        attributes.insert(
            index,
            ActiveAttribute {
                name: v.name,
                array_size: v.info.size,
                ty: v.info.ty,
                location,
            },
        );
    }

    let info = ProgramInfo {
        link_status,
        info_log,
        active_uniforms: uniforms,
        active_attributes: attributes,
    };

    tracing::debug!(
        program = program.0,
        link_status,
        active_uniforms,
        active_attributes,
        "created ProgramInfo"
    );

    observer.add_extra(info.to_extra());
    Ok(info)
}
