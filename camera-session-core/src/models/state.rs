/// Camera session lifecycle state machine.
///
/// State transitions:
/// ```text
/// Closed → Opening → Configuring → PreviewActive ⇄ Capturing
///                                       ⇅
///                                    Recording
/// any state → Closing → Closed        (close / device disconnect)
/// any live state → Faulted            (unrecoverable hardware error)
/// ```
///
/// `Closed` and `Faulted` are both re-enterable via `open()`. All
/// transitions happen on the session worker; callers only ever observe
/// the published snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Opening,
    Configuring,
    PreviewActive,
    Capturing,
    Recording,
    Closing,
    Faulted,
}

impl SessionState {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn is_faulted(&self) -> bool {
        matches!(self, Self::Faulted)
    }

    /// Whether a device handle is currently held (everything except
    /// `Closed` and `Faulted`).
    pub fn holds_device(&self) -> bool {
        !matches!(self, Self::Closed | Self::Faulted)
    }

    /// Whether the repeating preview request is running and user controls
    /// (zoom, focus, flash) may be applied.
    pub fn accepts_controls(&self) -> bool {
        matches!(self, Self::PreviewActive | Self::Recording)
    }

    /// Validates a transition against the lifecycle diagram.
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        use SessionState::*;
        match (self, target) {
            (Closed, Opening) => true,
            (Faulted, Opening) => true,
            (Opening, Configuring) => true,
            (Configuring, PreviewActive) => true,
            (PreviewActive, Capturing) => true,
            (PreviewActive, Recording) => true,
            (Capturing, PreviewActive) => true,
            (Recording, PreviewActive) => true,
            // close() and disconnect are accepted from any live state
            (Closed | Closing, Closing) => false,
            (_, Closing) => true,
            (Closing, Closed) => true,
            // hardware faults land here from any state holding a handle
            (s, Faulted) => s.holds_device(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use SessionState::*;
        assert!(Closed.can_transition_to(&Opening));
        assert!(Opening.can_transition_to(&Configuring));
        assert!(Configuring.can_transition_to(&PreviewActive));
        assert!(PreviewActive.can_transition_to(&Capturing));
        assert!(Capturing.can_transition_to(&PreviewActive));
        assert!(PreviewActive.can_transition_to(&Recording));
        assert!(Recording.can_transition_to(&PreviewActive));
        assert!(Recording.can_transition_to(&Closing));
        assert!(Closing.can_transition_to(&Closed));
        assert!(Faulted.can_transition_to(&Opening));
        assert!(Opening.can_transition_to(&Faulted));
    }

    #[test]
    fn invalid_transitions() {
        use SessionState::*;
        assert!(!Closed.can_transition_to(&PreviewActive));
        assert!(!Closed.can_transition_to(&Closing));
        assert!(!Closed.can_transition_to(&Faulted));
        assert!(!Capturing.can_transition_to(&Recording));
        assert!(!Recording.can_transition_to(&Capturing));
        assert!(!Closing.can_transition_to(&Opening));
        assert!(!Faulted.can_transition_to(&PreviewActive));
    }

    #[test]
    fn capture_and_recording_are_exclusive() {
        // There is no edge between the two active capture modes in either
        // direction; both must pass through PreviewActive.
        assert!(!SessionState::Capturing.can_transition_to(&SessionState::Recording));
        assert!(!SessionState::Recording.can_transition_to(&SessionState::Capturing));
    }

    #[test]
    fn device_possession_matches_lifecycle() {
        assert!(!SessionState::Closed.holds_device());
        assert!(!SessionState::Faulted.holds_device());
        assert!(SessionState::Opening.holds_device());
        assert!(SessionState::Closing.holds_device());
        assert!(SessionState::Recording.holds_device());
    }
}
