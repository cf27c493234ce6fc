use core_types::BotState;

/// Holds the bot's current lifecycle state.
///
/// The normal cycle is IDLE → SCANNING → IN_TRADE → COOLDOWN → SCANNING. STOPPED can be
/// entered from anywhere and is terminal: later transitions are ignored.
#[derive(Debug, Default)]
pub struct StateMachine {
    state: BotState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BotState {
        self.state
    }

    /// Moves to `next`. Returns false if the machine is stopped and the move was refused.
    pub fn transition(&mut self, next: BotState) -> bool {
        let current = self.state;
        if current == BotState::Stopped && next != BotState::Stopped {
            tracing::warn!(from = %current, to = %next, "Ignoring transition out of STOPPED.");
            return false;
        }
        self.state = next;
        tracing::debug!(
            from = %current,
            to = %next,
            on_cycle = is_cycle_step(current, next),
            "State transition."
        );
        true
    }
}

fn is_cycle_step(from: BotState, to: BotState) -> bool {
    matches!(
        (from, to),
        (BotState::Idle, BotState::Scanning)
            | (BotState::Scanning, BotState::InTrade)
            | (BotState::InTrade, BotState::Cooldown)
            | (BotState::Cooldown, BotState::Scanning)
            | (_, BotState::Stopped)
    ) || from == to
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_and_follows_the_cycle() {
        let mut machine = StateMachine::new();
        assert_eq!(machine.state(), BotState::Idle);

        for next in [BotState::Scanning, BotState::InTrade, BotState::Cooldown, BotState::Scanning] {
            assert!(machine.transition(next));
            assert_eq!(machine.state(), next);
        }
    }

    #[test]
    fn stopped_is_terminal() {
        let mut machine = StateMachine::new();
        machine.transition(BotState::InTrade);
        assert!(machine.transition(BotState::Stopped));

        assert!(!machine.transition(BotState::Scanning));
        assert_eq!(machine.state(), BotState::Stopped);
    }
}
