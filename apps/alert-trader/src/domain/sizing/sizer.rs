//! Core sizing logic.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use super::error::SizingError;
use super::types::{BalanceAllocation, EquitySizingInput, SizingDecision};

/// Share of funds used when buying whole shares, leaving room for slippage
/// and fees.
pub const NON_FRACTIONABLE_HAIRCUT: Decimal = dec!(0.97);

/// Size an order from a percentage of equity.
///
/// Funds are floored to cents, never rounded up, and never exceed cash.
pub fn size_by_equity(input: &EquitySizingInput) -> Result<SizingDecision, SizingError> {
    let requested = (input.equity * input.capital_percentage)
        .round_dp_with_strategy(2, RoundingStrategy::ToNegativeInfinity);

    if requested <= Decimal::ZERO {
        return Err(SizingError::InsufficientFunds {
            requested,
            available: input.cash,
        });
    }

    let funds = if requested > input.cash {
        tracing::debug!(
            requested = %requested,
            cash = %input.cash,
            "Clamping funds to available cash"
        );
        input.cash
    } else {
        requested
    };

    if funds <= Decimal::ZERO {
        return Err(SizingError::InsufficientFunds {
            requested,
            available: input.cash,
        });
    }

    if input.fractionable {
        return Ok(SizingDecision::Notional(funds));
    }

    let price = input.quote.sizing_price();
    if price <= Decimal::ZERO {
        return Err(SizingError::InvalidInput(
            "quote has no positive bid or ask".to_string(),
        ));
    }

    let shares = (funds * NON_FRACTIONABLE_HAIRCUT / price).floor();
    if shares <= Decimal::ZERO {
        return Err(SizingError::BelowIncrement {
            computed: funds * NON_FRACTIONABLE_HAIRCUT / price,
            minimum: Decimal::ONE,
        });
    }

    Ok(SizingDecision::Shares(shares))
}

/// Size an order from a single-asset balance, floored to `step`.
///
/// The headroom check compares the balance with the raw requested value
/// (the percentage itself for [`BalanceAllocation::Percentage`]).
pub fn size_by_balance(
    balance: Decimal,
    allocation: BalanceAllocation,
    step: Decimal,
) -> Result<Decimal, SizingError> {
    if step <= Decimal::ZERO {
        return Err(SizingError::InvalidInput(format!(
            "increment must be positive, got {step}"
        )));
    }

    let requested = allocation.requested();
    if balance <= requested {
        return Err(SizingError::InsufficientBalance { balance, requested });
    }

    let funds = match allocation {
        BalanceAllocation::Percentage(pct) => balance * pct,
        BalanceAllocation::FixedAmount(amount) => amount,
    };

    let floored = floor_to_step(funds, step);
    if floored <= Decimal::ZERO {
        return Err(SizingError::BelowIncrement {
            computed: funds,
            minimum: step,
        });
    }

    Ok(floored)
}

/// Largest multiple of `step` not greater than `value`.
///
/// A non-positive step leaves the value unchanged.
#[must_use]
pub fn floor_to_step(value: Decimal, step: Decimal) -> Decimal {
    if step <= Decimal::ZERO {
        return value;
    }
    ((value / step).floor() * step).normalize()
}
