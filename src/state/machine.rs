use super::error::{StateError, StateResult};
use super::{SessionEvent, SessionState, StateTransition};

#[derive(Debug)]
pub struct StateMachine {
    state: SessionState,
    has_image: bool,
    transition_history: Vec<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: SessionState::default(),
            has_image: false,
            transition_history: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn has_image(&self) -> bool {
        self.has_image
    }

    pub fn can_transition(&self, event: SessionEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: SessionEvent) -> Option<SessionState> {
        use SessionEvent::*;
        match (self.state, event) {
            (_, RequestLoad) => Some(SessionState::Loading),
            (SessionState::Loading, LoadSucceeded) => Some(SessionState::Ready),
            (SessionState::Loading, LoadFailed) if self.has_image => Some(SessionState::Ready),
            (SessionState::Loading, LoadFailed) => Some(SessionState::LoadFailed),
            (SessionState::Ready, PointerDown) => Some(SessionState::Stroking),
            (SessionState::Stroking, PointerUp) => Some(SessionState::Ready),
            (SessionState::Ready | SessionState::Stroking, Resize) => Some(SessionState::Ready),
            (SessionState::Ready, Clear) => Some(SessionState::Ready),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: SessionEvent) -> StateResult<SessionState> {
        tracing::debug!(from = ?self.state, event = ?event, "request state transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid state transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        if event == SessionEvent::LoadSucceeded {
            self.has_image = true;
        }
        let record = StateTransition::new(Some(self.state), event, next);
        self.state = next;
        self.transition_history.push(record);

        Ok(self.state)
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.transition_history
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionState::{:?}", self.state)
    }
}
