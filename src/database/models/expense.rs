use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::split::{AllocationMode, AllocationSet, LimitPolicy, Participant, SplitPolicy, SplitResult};

// Scope of an expense: decides which budget it counts against and whether it is split
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseType {
    Personal,
    Shared,
    Child,
}

impl ExpenseType {
    pub const ALL: [ExpenseType; 3] = [ExpenseType::Personal, ExpenseType::Shared, ExpenseType::Child];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Shared => "shared",
            Self::Child => "child",
        }
    }

    /// Shared and child expenses are divided between participants.
    pub fn is_split(&self) -> bool {
        !matches!(self, Self::Personal)
    }

    pub fn split_policy(&self, limit: LimitPolicy) -> SplitPolicy {
        SplitPolicy::with_limit(limit).for_child_expense(*self == Self::Child)
    }
}

impl Default for ExpenseType {
    fn default() -> Self {
        ExpenseType::Shared
    }
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExpenseType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown expense type: {s}"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    #[default]
    Confirmed,
    NeedsClarification,
}

impl ExpenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::NeedsClarification => "needs_clarification",
        }
    }
}

impl FromStr for ExpenseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "confirmed" => Ok(Self::Confirmed),
            "needs_clarification" => Ok(Self::NeedsClarification),
            other => Err(format!("unknown expense status: {other}")),
        }
    }
}

/// Persisted form of an allocation set. The total is the owning expense's amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub mode: AllocationMode,
    pub participants: Vec<Participant>,
}

impl Distribution {
    pub fn to_allocation(&self, total: Decimal, policy: SplitPolicy) -> SplitResult<AllocationSet> {
        AllocationSet::from_participants(total, self.mode, self.participants.clone(), policy)
    }

    /// The check every distribution passes before it is written.
    pub fn validate_against(&self, total: Decimal) -> SplitResult<()> {
        self.to_allocation(total, SplitPolicy::default())?.validate()
    }
}

impl From<&AllocationSet> for Distribution {
    fn from(set: &AllocationSet) -> Self {
        Self {
            mode: set.mode(),
            participants: set.participants().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub description: String,
    pub category: String,
    pub amount: Decimal,
    pub expense_type: ExpenseType,
    pub spent_on: NaiveDate,
    pub paid_by: Option<String>,         // participant name of whoever paid
    pub status: ExpenseStatus,
    pub clarification_note: Option<String>,
    pub distribution: Option<Distribution>,
    pub created_at: NaiveDateTime,
}

impl Expense {
    pub fn month_key(&self) -> String {
        month_key(self.spent_on)
    }
}

// request body for creating an expense (also the POST /api/expenses payload)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub amount: Decimal,
    pub expense_type: ExpenseType,
    pub spent_on: NaiveDate,
    #[serde(default)]
    pub paid_by: Option<String>,
    #[serde(default)]
    pub distribution: Option<Distribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: ExpenseStatus,
    #[serde(default)]
    pub note: Option<String>,
}

/// `YYYY-MM` key used for monthly listings, budgets and caching.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// First day of the month named by a `YYYY-MM` key.
pub fn parse_month(key: &str) -> Option<NaiveDate> {
    if key.len() != 7 {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use crate::split::SplitError;

    #[test]
    fn month_keys() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(month_key(d), "2024-03");
        assert_eq!(parse_month("2024-03"), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(parse_month("2024-13"), None);
        assert_eq!(parse_month("2024-3"), None);
    }

    #[test]
    fn expense_type_round_trips_through_text() {
        for t in ExpenseType::ALL {
            assert_eq!(t.as_str().parse::<ExpenseType>(), Ok(t));
        }
        assert_eq!(" Child ".parse::<ExpenseType>(), Ok(ExpenseType::Child));
        assert!(ExpenseType::Child.split_policy(LimitPolicy::Ignore).child_expense);
        assert!(!ExpenseType::Personal.is_split());
    }

    #[test]
    fn distribution_json_shape() {
        let set = AllocationSet::default_split(dec!(80), SplitPolicy::default()).unwrap();
        let json = serde_json::to_value(Distribution::from(&set)).unwrap();

        assert_eq!(json["mode"], "percentage");
        assert_eq!(json["participants"][0]["name"], "Partner 1");
        let amount: Decimal = json["participants"][1]["amount"].as_str().unwrap().parse().unwrap();
        assert_eq!(amount, dec!(40));
        assert_eq!(json["participants"][1]["locked"], false);
    }

    #[test]
    fn distribution_is_validated_against_expense_total() {
        let set = AllocationSet::default_split(dec!(80), SplitPolicy::default()).unwrap();
        let mut dist = Distribution::from(&set);
        assert!(dist.validate_against(dec!(80)).is_ok());

        dist.participants[0].percentage = dec!(70);
        assert!(dist.validate_against(dec!(80)).is_err());
    }

    #[test]
    fn inflated_amounts_fail_validation() {
        let dist = Distribution {
            mode: AllocationMode::Percentage,
            participants: vec![
                Participant::new("a", "A").with_share(dec!(50), dec!(1000)),
                Participant::new("b", "B").with_share(dec!(50), dec!(1000)),
            ],
        };
        assert!(matches!(
            dist.validate_against(dec!(80)),
            Err(SplitError::AmountMismatch { .. })
        ));
    }
}
