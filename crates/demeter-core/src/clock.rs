//! Simulation clock and termination policy.
//!
//! The clock counts completed cycles. It only moves forward, one cycle at
//! a time, and says nothing about when the game ends: that is the
//! [`TerminationPolicy`]'s job. A game ends either when the policy's cycle
//! limit is reached or when the player finishes it explicitly.

use serde::{Deserialize, Serialize};

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Cycle counter would overflow.
    #[error("cycle counter overflow: cannot advance beyond u64::MAX")]
    CycleOverflow,
}

/// When a session stops accepting actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationPolicy {
    /// Last playable cycle count. `None` means the game never ends on its
    /// own.
    pub max_cycles: Option<u64>,
}

impl TerminationPolicy {
    /// An open-ended session.
    pub const fn open_ended() -> Self {
        Self { max_cycles: None }
    }

    /// A session that ends after `max_cycles` completed cycles.
    pub const fn after(max_cycles: u64) -> Self {
        Self {
            max_cycles: Some(max_cycles),
        }
    }

    /// Whether `completed` cycles reach the limit.
    pub const fn is_reached(&self, completed: u64) -> bool {
        match self.max_cycles {
            Some(max) => completed >= max,
            None => false,
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The cycle limit was reached.
    CycleLimit,
    /// The player ended the game.
    Finished,
}

/// Cycle counter plus end-of-game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationClock {
    /// Completed cycles.
    cycle: u64,
    /// When the game ends.
    policy: TerminationPolicy,
    /// Set once the game has ended.
    ended: Option<EndReason>,
}

impl SimulationClock {
    /// A clock at cycle 0.
    pub const fn new(policy: TerminationPolicy) -> Self {
        Self {
            cycle: 0,
            policy,
            ended: None,
        }
    }

    /// Completed cycles.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// The termination policy.
    pub const fn policy(&self) -> TerminationPolicy {
        self.policy
    }

    /// Why the game ended, if it has.
    pub const fn end_reason(&self) -> Option<EndReason> {
        self.ended
    }

    /// Whether the game has ended.
    pub const fn is_ended(&self) -> bool {
        self.ended.is_some()
    }

    /// Complete one cycle. Ends the game if the policy limit is reached.
    /// Returns the new cycle count.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::CycleOverflow`] at `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.cycle = self.cycle.checked_add(1).ok_or(ClockError::CycleOverflow)?;
        if self.ended.is_none() && self.policy.is_reached(self.cycle) {
            self.ended = Some(EndReason::CycleLimit);
        }
        Ok(self.cycle)
    }

    /// End the game now. No-op if it already ended.
    pub fn finish(&mut self) {
        if self.ended.is_none() {
            self.ended = Some(EndReason::Finished);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_ended_clock_never_ends() {
        let mut clock = SimulationClock::new(TerminationPolicy::open_ended());
        for _ in 0..1000 {
            assert!(clock.advance().is_ok());
        }
        assert_eq!(clock.cycle(), 1000);
        assert!(!clock.is_ended());
    }

    #[test]
    fn cycle_limit_ends_the_game() {
        let mut clock = SimulationClock::new(TerminationPolicy::after(2));
        assert_eq!(clock.advance(), Ok(1));
        assert!(!clock.is_ended());
        assert_eq!(clock.advance(), Ok(2));
        assert_eq!(clock.end_reason(), Some(EndReason::CycleLimit));
    }

    #[test]
    fn explicit_finish_is_sticky() {
        let mut clock = SimulationClock::new(TerminationPolicy::after(1));
        clock.finish();
        let _ = clock.advance();
        assert_eq!(clock.end_reason(), Some(EndReason::Finished));
    }
}
