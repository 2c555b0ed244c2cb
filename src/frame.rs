use crate::error::SkipReason;

/// Result of one `draw()` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Work was submitted and the image presented
    Presented { frame_index: u32 },
    /// Nothing was recorded; scene state is as before the call
    Skipped(SkipReason),
}

impl FrameOutcome {
    pub fn is_presented(&self) -> bool {
        matches!(self, FrameOutcome::Presented { .. })
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            FrameOutcome::Skipped(reason) => Some(*reason),
            FrameOutcome::Presented { .. } => None,
        }
    }
}
