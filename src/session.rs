use crate::response::InferenceResult;

/// Monotonic tag for one upload. Worker responses carry the generation of
/// the request that produced them; the session discards anything stale.
pub type Generation = u64;

/// What the UI is currently showing.
///
/// One value, explicit transitions: starting a new upload supersedes
/// whatever was there (result and error are cleared immediately), a failure
/// clears the result, and a completed analysis replaces the whole state.
/// Shared between the inference worker and the GUI as `Arc<Mutex<Session>>`.
pub enum SessionPhase {
    /// Nothing uploaded yet.
    Idle,
    /// An upload is in flight.
    Analyzing { file_name: String },
    /// Last inference succeeded. The result is immutable; panels re-derive
    /// everything they draw from it on each render pass.
    Ready {
        file_name: String,
        result: InferenceResult,
    },
    /// Last inference failed; one user-visible message.
    Failed { file_name: String, error: String },
}

pub struct Session {
    phase: SessionPhase,
    current_generation: Generation,
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            current_generation: 0,
        }
    }

    /// Start a new upload. Prior results and errors are gone from this point
    /// on; returns the generation the worker must echo back.
    pub fn begin(&mut self, file_name: &str) -> Generation {
        self.current_generation += 1;
        self.phase = SessionPhase::Analyzing {
            file_name: file_name.to_string(),
        };
        self.current_generation
    }

    /// Record a successful inference. Ignored if a newer upload has
    /// superseded the request that produced it.
    pub fn complete(&mut self, generation: Generation, result: InferenceResult) {
        if generation != self.current_generation {
            tracing::debug!(
                "[Session] Dropping stale result (gen {} != {})",
                generation,
                self.current_generation
            );
            return;
        }
        let file_name = self.file_name().unwrap_or_default().to_string();
        self.phase = SessionPhase::Ready { file_name, result };
    }

    /// Record a failure. Same staleness rule as `complete`; the prior result
    /// stays cleared (it was already dropped by `begin`).
    pub fn fail(&mut self, generation: Generation, error: String) {
        if generation != self.current_generation {
            tracing::debug!(
                "[Session] Dropping stale error (gen {} != {}): {}",
                generation,
                self.current_generation,
                error
            );
            return;
        }
        let file_name = self.file_name().unwrap_or_default().to_string();
        self.phase = SessionPhase::Failed { file_name, error };
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Generation of the most recent upload. Lets the GUI notice that the
    /// result it is looking at changed since the last frame.
    pub fn current_generation(&self) -> Generation {
        self.current_generation
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.phase, SessionPhase::Analyzing { .. })
    }

    /// The current immutable result snapshot, if any.
    pub fn result(&self) -> Option<&InferenceResult> {
        match &self.phase {
            SessionPhase::Ready { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            SessionPhase::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        match &self.phase {
            SessionPhase::Idle => None,
            SessionPhase::Analyzing { file_name }
            | SessionPhase::Ready { file_name, .. }
            | SessionPhase::Failed { file_name, .. } => Some(file_name),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// ===========  Tests ===============
#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{ActivationTensor, WaveformSignal};

    fn result() -> InferenceResult {
        InferenceResult {
            predictions: vec![],
            visualization: vec![],
            input_spectrogram: ActivationTensor {
                shape: vec![1],
                values: vec![vec![0.0]],
            },
            waveform: WaveformSignal {
                values: vec![0.0],
                sample_rate: 44100.0,
                duration: 1.0,
            },
        }
    }

    #[test]
    fn test_begin_clears_prior_result_and_error() {
        let mut session = Session::new();

        let gen = session.begin("a.wav");
        session.complete(gen, result());
        assert!(session.result().is_some());

        // New upload supersedes immediately, before any response arrives
        session.begin("b.wav");
        assert!(session.result().is_none());
        assert!(session.error().is_none());
        assert!(session.is_analyzing());
        assert_eq!(session.file_name(), Some("b.wav"));
    }

    #[test]
    fn test_stale_responses_are_discarded() {
        let mut session = Session::new();

        let first = session.begin("a.wav");
        let second = session.begin("b.wav");

        // The first request resolves late; it must not clobber the newer one
        session.complete(first, result());
        assert!(session.result().is_none());
        assert!(session.is_analyzing());

        session.fail(first, "late failure".into());
        assert!(session.error().is_none());

        session.complete(second, result());
        assert_eq!(session.file_name(), Some("b.wav"));
        assert!(session.result().is_some());
    }

    #[test]
    fn test_failure_shows_one_error_and_no_result() {
        let mut session = Session::new();
        let gen = session.begin("a.wav");
        session.fail(gen, "API Error 500".into());

        assert_eq!(session.error(), Some("API Error 500"));
        assert!(session.result().is_none());
        assert!(!session.is_analyzing());
    }

    #[test]
    fn test_recovery_after_failure() {
        let mut session = Session::new();
        let gen = session.begin("a.wav");
        session.fail(gen, "boom".into());

        let gen = session.begin("a.wav");
        assert!(session.error().is_none());
        session.complete(gen, result());
        assert!(session.result().is_some());
    }

    #[test]
    fn test_idle_has_nothing() {
        let session = Session::new();
        assert!(session.result().is_none());
        assert!(session.error().is_none());
        assert!(session.file_name().is_none());
        assert!(!session.is_analyzing());
    }
}
