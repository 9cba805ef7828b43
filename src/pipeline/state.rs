//! Pipeline state machine.
//!
//! [`PipelineState`] is linear with no branching except on failure:
//!
//! ```text
//! Received ──▶ Normalized ──▶ Recognized ──▶ Translated ──▶ Synthesized ──▶ Completed
//!     │             │              │              │               │
//!     └─────────────┴──────────────┴──────────────┴───────────────┴──▶ Failed
//! ```
//!
//! The orchestrator logs each transition; no state is ever re-entered within
//! a run, and every run ends in exactly one of `Completed` or `Failed`.

/// States of one pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Request accepted; workspace acquired, nothing processed yet.
    Received,

    /// Upload converted to the canonical 16 kHz PCM waveform.
    Normalized,

    /// Speech recognition produced the source-language text.
    Recognized,

    /// Translation produced the target-language text.
    Translated,

    /// Synthesis produced the spoken artifact.
    Synthesized,

    /// Terminal: the structured success result has been assembled.
    Completed,

    /// Terminal: some stage failed; partial state has been discarded.
    Failed,
}

impl PipelineState {
    /// Returns `true` for the two terminal states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Completed | PipelineState::Failed)
    }

    /// A short label for transition logging.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Received => "received",
            PipelineState::Normalized => "normalized",
            PipelineState::Recognized => "recognized",
            PipelineState::Translated => "translated",
            PipelineState::Synthesized => "synthesized",
            PipelineState::Completed => "completed",
            PipelineState::Failed => "failed",
        }
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        PipelineState::Received
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- is_terminal ---

    #[test]
    fn received_is_not_terminal() {
        assert!(!PipelineState::Received.is_terminal());
    }

    #[test]
    fn intermediate_states_are_not_terminal() {
        assert!(!PipelineState::Normalized.is_terminal());
        assert!(!PipelineState::Recognized.is_terminal());
        assert!(!PipelineState::Translated.is_terminal());
        assert!(!PipelineState::Synthesized.is_terminal());
    }

    #[test]
    fn completed_is_terminal() {
        assert!(PipelineState::Completed.is_terminal());
    }

    #[test]
    fn failed_is_terminal() {
        assert!(PipelineState::Failed.is_terminal());
    }

    // ---- label ---

    #[test]
    fn labels_are_lowercase_stage_names() {
        assert_eq!(PipelineState::Received.label(), "received");
        assert_eq!(PipelineState::Normalized.label(), "normalized");
        assert_eq!(PipelineState::Recognized.label(), "recognized");
        assert_eq!(PipelineState::Translated.label(), "translated");
        assert_eq!(PipelineState::Synthesized.label(), "synthesized");
        assert_eq!(PipelineState::Completed.label(), "completed");
        assert_eq!(PipelineState::Failed.label(), "failed");
    }

    // ---- Default ---

    #[test]
    fn default_state_is_received() {
        assert_eq!(PipelineState::default(), PipelineState::Received);
    }
}
