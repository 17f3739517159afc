use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use super::error::{SplitError, SplitResult};

pub const MIN_PARTICIPANTS: usize = 2;
pub const MAX_PARTICIPANTS: usize = 5;

/// What happens when an add/remove would leave the 2..=5 participant range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitPolicy {
    /// The operation silently does nothing.
    #[default]
    Ignore,
    /// The operation returns an error the caller can show.
    Reject,
}

impl FromStr for LimitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ignore") {
            Ok(Self::Ignore)
        } else if s.eq_ignore_ascii_case("reject") {
            Ok(Self::Reject)
        } else {
            Err(format!("unknown limit policy '{s}' (expected ignore|reject)"))
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitPolicy {
    pub limit: LimitPolicy,
    /// Child expenses name the third participant "Kind".
    pub child_expense: bool,
}

impl SplitPolicy {
    pub fn with_limit(limit: LimitPolicy) -> Self {
        Self { limit, ..Self::default() }
    }

    pub fn for_child_expense(mut self, child_expense: bool) -> Self {
        self.child_expense = child_expense;
        self
    }

    /// Default display name for the participant at 1-based `position`.
    pub fn participant_name(&self, position: usize) -> String {
        if self.child_expense && position == 3 {
            "Kind".to_string()
        } else {
            format!("Partner {position}")
        }
    }

    pub(crate) fn on_limit(&self, err: SplitError) -> SplitResult<()> {
        match self.limit {
            LimitPolicy::Ignore => {
                debug!(%err, "participant limit reached, ignoring");
                Ok(())
            }
            LimitPolicy::Reject => Err(err),
        }
    }
}
