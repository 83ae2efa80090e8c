use crate::errors::RecorderError;
use crate::types::Mode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeMachine {
    pub mode: Mode,
    /// Number of record activations so far. Zero means no session was ever
    /// started, so there is nothing to capture into.
    pub sessions: u64,
}

impl Default for ModeMachine {
    fn default() -> Self {
        Self {
            mode: Mode::Idle,
            sessions: 0,
        }
    }
}

impl ModeMachine {
    pub fn transition(&mut self, next: Mode) -> Result<(), RecorderError> {
        validate_transition(self.mode, next)?;
        if next == Mode::Recording {
            self.sessions = self.sessions.saturating_add(1);
        }
        self.mode = next;
        Ok(())
    }

    pub fn is_capturing(&self) -> bool {
        self.sessions > 0 && self.mode != Mode::Playing
    }
}

pub fn validate_transition(from: Mode, to: Mode) -> Result<(), RecorderError> {
    use Mode as M;

    let allowed = match from {
        M::Idle => matches!(to, M::Recording | M::Playing),
        M::Recording => matches!(to, M::Playing),
        M::Playing => matches!(to, M::Idle),
    };

    if !allowed {
        return Err(RecorderError::Transition(format!("{from:?} -> {to:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_validator_accepts_table_edges() {
        for (from, to) in [
            (Mode::Idle, Mode::Recording),
            (Mode::Idle, Mode::Playing),
            (Mode::Recording, Mode::Playing),
            (Mode::Playing, Mode::Idle),
        ] {
            validate_transition(from, to).expect("edge must be legal");
        }
    }

    #[test]
    fn transition_validator_rejects_invalid_edges() {
        for (from, to) in [
            (Mode::Recording, Mode::Recording),
            (Mode::Recording, Mode::Idle),
            (Mode::Playing, Mode::Recording),
            (Mode::Playing, Mode::Playing),
            (Mode::Idle, Mode::Idle),
        ] {
            let err = validate_transition(from, to).expect_err("must reject");
            assert!(matches!(err, RecorderError::Transition(message) if message.contains("->")));
        }
    }

    #[test]
    fn capture_opens_with_first_session_and_closes_while_playing() {
        let mut machine = ModeMachine::default();
        assert!(!machine.is_capturing());

        machine.transition(Mode::Recording).expect("record");
        assert_eq!(machine.sessions, 1);
        assert!(machine.is_capturing());

        machine.transition(Mode::Playing).expect("play");
        assert!(!machine.is_capturing());

        machine.transition(Mode::Idle).expect("finish");
        assert!(machine.is_capturing());

        machine.transition(Mode::Recording).expect("record again");
        assert_eq!(machine.sessions, 2);
    }

    #[test]
    fn playback_from_fresh_idle_does_not_open_a_session() {
        let mut machine = ModeMachine::default();
        machine.transition(Mode::Playing).expect("play");
        machine.transition(Mode::Idle).expect("finish");
        assert_eq!(machine.sessions, 0);
        assert!(!machine.is_capturing());
    }
}
