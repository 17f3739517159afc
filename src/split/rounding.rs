use rust_decimal::{Decimal, RoundingStrategy};

pub const PERCENT_DP: u32 = 1;
pub const AMOUNT_DP: u32 = 2;

pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Allowed drift of the percentage sum from 100.
pub const PERCENT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);
/// Allowed drift of the amount sum from the expense total.
pub const AMOUNT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Upper bound for totals and single amounts (one trillion).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

pub fn round_to(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_pct(value: Decimal) -> Decimal {
    round_to(value, PERCENT_DP)
}

pub fn round_amount(value: Decimal) -> Decimal {
    round_to(value, AMOUNT_DP)
}

/// Truncating variant for even shares, so the residual is never negative.
pub fn floor_to(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::ToZero)
}

pub fn clamp(value: Decimal, lo: Decimal, hi: Decimal) -> Decimal {
    value.max(lo).min(hi)
}

/// Rounds every value to `dp` places while keeping the group sum equal to the
/// rounded exact sum. The residual lands on the largest value (first on ties).
pub fn round_group(values: &mut [Decimal], dp: u32) {
    if values.is_empty() {
        return;
    }
    let target = round_to(values.iter().sum::<Decimal>(), dp);
    for v in values.iter_mut() {
        *v = round_to(*v, dp);
    }
    let residual = target - values.iter().sum::<Decimal>();
    if residual.is_zero() {
        return;
    }
    let mut largest = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[largest] {
            largest = i;
        }
    }
    values[largest] = (values[largest] + residual).max(Decimal::ZERO);
}
