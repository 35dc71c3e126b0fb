use super::*;

#[test]
fn test_executor_state_as_str() {
    assert_eq!(ExecutorState::Idle.as_str(), "idle");
    assert_eq!(ExecutorState::Attempting.as_str(), "attempting");
    assert_eq!(ExecutorState::Waiting.as_str(), "waiting");
    assert_eq!(ExecutorState::Resolved.as_str(), "resolved");
}

#[test]
fn test_executor_state_from_str() {
    assert_eq!(ExecutorState::from_str("idle"), Some(ExecutorState::Idle));
    assert_eq!(
        ExecutorState::from_str("attempting"),
        Some(ExecutorState::Attempting)
    );
    assert_eq!(ExecutorState::from_str("waiting"), Some(ExecutorState::Waiting));
    assert_eq!(ExecutorState::from_str("resolved"), Some(ExecutorState::Resolved));
    assert_eq!(ExecutorState::from_str("invalid"), None);
}

#[test]
fn test_executor_state_display() {
    assert_eq!(format!("{}", ExecutorState::Waiting), "waiting");
    assert_eq!(format!("{}", AttemptStatus::FatalFailure), "fatal-failure");
}

#[test]
fn test_transitions_follow_state_machine() {
    use ExecutorState::*;
    assert!(Idle.can_transition_to(Attempting));
    assert!(Attempting.can_transition_to(Waiting));
    assert!(Waiting.can_transition_to(Attempting));
    assert!(Attempting.can_transition_to(Resolved));

    assert!(!Idle.can_transition_to(Waiting));
    assert!(!Waiting.can_transition_to(Waiting));
}

#[test]
fn test_resolved_is_terminal() {
    for next in [
        ExecutorState::Idle,
        ExecutorState::Attempting,
        ExecutorState::Waiting,
        ExecutorState::Resolved,
    ] {
        assert!(!ExecutorState::Resolved.can_transition_to(next));
    }
    assert!(ExecutorState::Resolved.is_terminal());
    assert!(!ExecutorState::Waiting.is_terminal());
}
