//! Key-usage limit: a monotonically-decrementing budget that triggers soft
//! and hard events before and at exhaustion.

/// Default hard limit: 2^48 - 1, the maximum SRTP packet index.
pub const DEFAULT_HARD_LIMIT: u64 = (1u64 << 48) - 1;

/// Result of crossing a threshold on a single `consume` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageOutcome {
    /// Still below the soft threshold.
    Normal,
    /// Just crossed into the soft-limit band; caller should emit
    /// `Event::KeySoftLimit`.
    SoftLimitCrossed,
    /// Already in the soft-limit band, below hard.
    SoftLimit,
    /// The hard limit has been reached; caller should emit
    /// `Event::KeyHardLimit` and fail the operation with
    /// [`crate::Error::KeyExpired`].
    HardLimitReached,
}

/// `normal -> soft_limit -> hard_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    Soft,
    Hard,
}

/// Tracks how many packets a single cipher/MAC key pair has protected, and
/// in which direction of the `normal -> soft_limit -> hard_limit` state
/// machine the stream currently sits.
///
/// Shared (via `Arc`) between a template stream and every stream cloned
/// from it, exactly like the cipher/MAC objects it gates. A template and
/// its clones burn down the same budget.
#[derive(Debug)]
pub struct UsageLimit {
    hard: u64,
    soft: u64,
    used: u64,
    state: State,
}

impl UsageLimit {
    /// `hard` is the total number of packets this key may protect. The soft
    /// threshold is fixed at 5% before the hard limit, an unspecified but
    /// reasonable choice: only its ordering relative to hard matters.
    pub fn new(hard: u64) -> Self {
        let soft = hard.saturating_sub(hard / 20).max(1);
        UsageLimit {
            hard,
            soft,
            used: 0,
            state: State::Normal,
        }
    }

    pub fn with_default_hard_limit() -> Self {
        Self::new(DEFAULT_HARD_LIMIT)
    }

    /// Consume one unit of budget, advancing the state machine. Returns the
    /// outcome for this call; the caller fails the protect/unprotect
    /// operation with `KeyExpired` on `HardLimitReached`. `hard` packets may
    /// be protected successfully; the call that would make it `hard + 1`
    /// is the one that fails, so `used` is never incremented past `hard`.
    pub fn consume(&mut self) -> UsageOutcome {
        if self.used >= self.hard {
            self.state = State::Hard;
            return UsageOutcome::HardLimitReached;
        }

        self.used += 1;

        if self.used >= self.soft {
            let crossed = self.state == State::Normal;
            self.state = State::Soft;
            return if crossed {
                UsageOutcome::SoftLimitCrossed
            } else {
                UsageOutcome::SoftLimit
            };
        }

        UsageOutcome::Normal
    }

    pub fn used(&self) -> u64 {
        self.used
    }
}

#[cfg(test)]
mod limit_test;
