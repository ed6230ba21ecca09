//! Rolling-window emission throttle.
//!
//! Accepts an invocation when nothing has been accepted yet or the window since
//! the last acceptance has fully elapsed. Rejected data is dropped, never queued.
//! The state is a plain value: the owner passes it in and stores what comes back.

use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum ThrottleState {
    #[default]
    Idle,
    /// Boot-time seconds of the last accepted report.
    Cooling { last_accepted_secs: u64 },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ThrottleDecision {
    Accept,
    /// Still inside the window of the previous report.
    Reject,
    /// The boot clock read as zero.
    ClockUnavailable,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct EmissionThrottle {
    window: Duration,
}

impl EmissionThrottle {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn evaluate(
        &self,
        state: ThrottleState,
        now_secs: u64,
    ) -> (ThrottleDecision, ThrottleState) {
        if now_secs == 0 {
            return (ThrottleDecision::ClockUnavailable, state);
        }

        let accept = match state {
            ThrottleState::Idle => true,
            ThrottleState::Cooling { last_accepted_secs } => {
                now_secs >= last_accepted_secs.saturating_add(self.window.as_secs())
            }
        };

        if accept {
            (
                ThrottleDecision::Accept,
                ThrottleState::Cooling {
                    last_accepted_secs: now_secs,
                },
            )
        } else {
            (ThrottleDecision::Reject, state)
        }
    }
}
