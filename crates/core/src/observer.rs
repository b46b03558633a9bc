//! The per-call observer handed to every extractor.
//!
//! The interception layer creates one observer per recorded call. It lends
//! the extractor a scratch arena and receives the extras it produces.

use crate::extra::Extra;
use crate::scratch::Scratch;

/// Scratch provider plus a one-way sink for extras.
///
/// `add_extra` has no return value: attaching is fire-and-forget.
pub trait CallObserver {
    /// Scratch arena scoped to the current call.
    fn scratch(&mut self) -> &mut Scratch;

    /// Attaches a serialized extra to the call being recorded.
    fn add_extra(&mut self, extra: Extra);
}

/// An observer that keeps attached extras in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    scratch: Scratch,
    extras: Vec<Extra>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an observer whose scratch arena starts with `capacity` bytes.
    pub fn with_scratch_capacity(capacity: usize) -> Self {
        Self {
            scratch: Scratch::with_capacity(capacity),
            extras: Vec::new(),
        }
    }

    /// Extras attached so far, in attach order.
    pub fn extras(&self) -> &[Extra] {
        &self.extras
    }

    /// Removes and returns every attached extra.
    pub fn take_extras(&mut self) -> Vec<Extra> {
        std::mem::take(&mut self.extras)
    }
}

impl CallObserver for RecordingObserver {
    fn scratch(&mut self) -> &mut Scratch {
        &mut self.scratch
    }

    fn add_extra(&mut self, extra: Extra) {
        self.extras.push(extra);
    }
}
