use tracing::debug;

/// Lifecycle of one export request
///
/// `Completed` and `Failed` are terminal; there is no retry or resume
/// transition out of `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    TracksInserted,
    GraphBound,
    Exporting,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether `next` is a legal successor of this state
    fn allows(&self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Created, TracksInserted)
                | (TracksInserted, GraphBound)
                | (GraphBound, Exporting)
                | (Exporting, Completed)
                | (Exporting, Failed)
                // Any pre-export stage may fail fast
                | (Created, Failed)
                | (TracksInserted, Failed)
                | (GraphBound, Failed)
        )
    }
}

/// Tracks one export request through the pipeline stages
///
/// Each export call owns exactly one job; the engine advances it as stages
/// complete and marks it failed when any stage short-circuits.
#[derive(Debug)]
pub struct CompositionJob {
    state: JobState,
}

impl CompositionJob {
    pub fn new() -> Self {
        Self {
            state: JobState::Created,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Advance to the next state; ignored with a debug note if illegal
    /// (terminal states never transition)
    pub fn advance(&mut self, next: JobState) -> bool {
        if self.state.allows(next) {
            debug!("Job state: {:?} -> {:?}", self.state, next);
            self.state = next;
            true
        } else {
            debug!("Rejected job transition: {:?} -> {:?}", self.state, next);
            false
        }
    }

    pub fn fail(&mut self) -> bool {
        self.advance(JobState::Failed)
    }
}

impl Default for CompositionJob {
    fn default() -> Self {
        Self::new()
    }
}
