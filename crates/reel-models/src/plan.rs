//! Subscription plans and credit accounting constants.

use serde::{Deserialize, Serialize};

/// Credits charged for one hook generation request.
pub const HOOK_GENERATION_CREDIT_COST: i32 = 10;

/// Credits granted each time a pro subscription invoice is paid.
pub const MONTHLY_PRO_CREDITS: i32 = 500;

/// Plan tier enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
}

impl PlanTier {
    /// Parse from the stored column value. Unknown values fall back to free.
    pub fn from_db(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pro" => PlanTier::Pro,
            _ => PlanTier::Free,
        }
    }

    /// Get the plan name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
        }
    }

    /// Whether the plan is a paid subscription.
    pub fn is_paid(&self) -> bool {
        matches!(self, PlanTier::Pro)
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_round_trip_through_db_value() {
        assert_eq!(PlanTier::from_db(PlanTier::Pro.as_str()), PlanTier::Pro);
        assert_eq!(PlanTier::from_db("PRO"), PlanTier::Pro);
        assert_eq!(PlanTier::from_db("studio"), PlanTier::Free);
    }

    #[test]
    fn test_plan_serializes_lowercase() {
        let json = serde_json::to_string(&PlanTier::Pro).unwrap();
        assert_eq!(json, "\"pro\"");
        assert!(!PlanTier::Free.is_paid());
    }
}
