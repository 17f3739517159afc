use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rounding::{clamp, AMOUNT_DP, HUNDRED, PERCENT_DP};

/// One party receiving a share of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub percentage: Decimal,
    pub amount: Decimal,
    #[serde(default)]
    pub locked: bool,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            percentage: Decimal::ZERO,
            amount: Decimal::ZERO,
            locked: false,
        }
    }

    pub fn with_share(mut self, percentage: Decimal, amount: Decimal) -> Self {
        self.percentage = percentage;
        self.amount = amount;
        self
    }

    pub(crate) fn share(&self, share: Share) -> Decimal {
        match share {
            Share::Percentage => self.percentage,
            Share::Amount => self.amount,
        }
    }

    pub(crate) fn set_share(&mut self, share: Share, value: Decimal) {
        match share {
            Share::Percentage => self.percentage = value,
            Share::Amount => self.amount = value,
        }
    }
}

/// Which field is the primary edit target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationMode {
    #[default]
    Percentage,
    Amount,
}

impl AllocationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Amount => "amount",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Percentage => Self::Amount,
            Self::Amount => Self::Percentage,
        }
    }

    pub(crate) fn primary(self) -> Share {
        match self {
            Self::Percentage => Share::Percentage,
            Self::Amount => Share::Amount,
        }
    }
}

/// Field selector used by the redistribution helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Share {
    Percentage,
    Amount,
}

impl Share {
    pub(crate) fn dp(self) -> u32 {
        match self {
            Share::Percentage => PERCENT_DP,
            Share::Amount => AMOUNT_DP,
        }
    }

    /// Percentages live in [0, 100], amounts only have a lower bound.
    pub(crate) fn bound(self, value: Decimal) -> Decimal {
        match self {
            Share::Percentage => clamp(value, Decimal::ZERO, HUNDRED),
            Share::Amount => value.max(Decimal::ZERO),
        }
    }
}
