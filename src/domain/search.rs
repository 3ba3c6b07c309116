//! Adaptive step search over the fillable amount of a pair.
//!
//! Each sweep feeds one pass/fail probe result back into the state of a
//! pair. While results keep agreeing, the step doubles (exponential
//! approach). When the result flips, the engine takes a half step and
//! resets the step to a tenth of the current amount, which damps the
//! oscillation around a boundary that drifts between sweeps.
//!
//! `validated_amount` is the conservative output (proven fillable);
//! `amount` is the probe cursor and may overshoot true liquidity.
//!
//! All arithmetic is on 256-bit unsigned integers with truncating
//! division. A retreat that would reach zero or below collapses to half
//! the previous amount instead.

use alloy::primitives::U256;

use super::amount::Amount;
use super::liquidity::{CheckStatus, LiquidityState};

const BASIC_STEP_DIVISOR: u64 = 10;
const DEFAULT_STEP_DIVISOR: u64 = 5;

/// Stateless transition function for [`LiquidityState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveSearch;

impl AdaptiveSearch {
    /// Compute the state after a probe of `prev.amount`.
    ///
    /// Never fails: callers convert probe errors into
    /// `has_liquidity = false` before calling.
    pub fn next_state(prev: &LiquidityState, has_liquidity: bool) -> LiquidityState {
        let current = prev.amount;
        let basic_step = current / U256::from(BASIC_STEP_DIVISOR);
        let step = prev
            .last_step_size
            .unwrap_or_else(|| current / U256::from(DEFAULT_STEP_DIVISOR));

        if has_liquidity {
            Self::advance(prev, current, step, basic_step)
        } else {
            Self::retreat(prev, current, step, basic_step)
        }
    }

    fn advance(
        prev: &LiquidityState,
        current: Amount,
        step: Amount,
        basic_step: Amount,
    ) -> LiquidityState {
        let (amount, next_step) = match prev.last_check {
            // Just crossed back below the boundary: half step, gentle base step.
            CheckStatus::Failed => (current.saturating_add(step / U256::from(2u64)), basic_step),
            CheckStatus::Unknown | CheckStatus::Passed => {
                (current.saturating_add(step), step.saturating_mul(U256::from(2u64)))
            }
        };

        LiquidityState {
            amount,
            validated_amount: current,
            last_step_size: Some(next_step),
            last_check: CheckStatus::Passed,
        }
    }

    fn retreat(
        prev: &LiquidityState,
        current: Amount,
        step: Amount,
        basic_step: Amount,
    ) -> LiquidityState {
        let validated_amount = prev.validated_amount.min(current);

        let (delta, next_step) = match prev.last_check {
            CheckStatus::Passed => (step / U256::from(2u64), basic_step),
            CheckStatus::Unknown | CheckStatus::Failed => {
                (step, step.saturating_mul(U256::from(2u64)))
            }
        };

        let (amount, next_step) = match current.checked_sub(delta) {
            Some(amount) if !amount.is_zero() => (amount, next_step),
            // Overshot past zero: halve the last amount and resume from there.
            _ => {
                let half = (current / U256::from(2u64)).max(U256::from(1u64));
                (half, half)
            }
        };

        LiquidityState {
            amount,
            validated_amount,
            last_step_size: Some(next_step),
            last_check: CheckStatus::Failed,
        }
    }
}
