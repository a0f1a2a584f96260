use serde::{Deserialize, Serialize};
use std::fmt;

/// Rounded questionnaire score. Nominally 1.0..=3.0, but the 2008 and age
/// adjustments are applied without clamping, so 0.0..=3.5 is reachable.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskScore(f64);

impl RiskScore {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn tier(self) -> RiskTier {
        RiskTier::classify(self)
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Conservative,
    Balanced,
    Aggressive,
}

impl RiskTier {
    pub const CONSERVATIVE_MAX: f64 = 1.5;
    pub const BALANCED_MAX: f64 = 2.5;

    /// Single source of truth for tier thresholds; both the allocation policy
    /// and the advisory text go through here. Upper bounds are inclusive.
    pub fn classify(score: RiskScore) -> Self {
        let s = score.value();
        if s <= Self::CONSERVATIVE_MAX {
            RiskTier::Conservative
        } else if s <= Self::BALANCED_MAX {
            RiskTier::Balanced
        } else {
            RiskTier::Aggressive
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            RiskTier::Conservative => {
                "You are a conservative investor. Prioritize capital preservation with limited equity exposure."
            }
            RiskTier::Balanced => {
                "You are a balanced investor. Maintain a diversified portfolio with moderate equity and bond allocation."
            }
            RiskTier::Aggressive => {
                "You are an aggressive investor. You can take higher risks for higher returns."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive_upper_bounds() {
        assert_eq!(RiskTier::classify(RiskScore::new(0.0)), RiskTier::Conservative);
        assert_eq!(RiskTier::classify(RiskScore::new(1.5)), RiskTier::Conservative);
        assert_eq!(RiskTier::classify(RiskScore::new(1.51)), RiskTier::Balanced);
        assert_eq!(RiskTier::classify(RiskScore::new(2.5)), RiskTier::Balanced);
        assert_eq!(RiskTier::classify(RiskScore::new(2.51)), RiskTier::Aggressive);
        assert_eq!(RiskTier::classify(RiskScore::new(3.5)), RiskTier::Aggressive);
    }

    #[test]
    fn advice_follows_the_same_tier() {
        assert!(RiskScore::new(1.5).tier().advice().contains("conservative"));
        assert!(RiskScore::new(2.5).tier().advice().contains("balanced"));
        assert!(RiskScore::new(3.0).tier().advice().contains("aggressive"));
    }

    #[test]
    fn score_serializes_as_bare_number() {
        let v = serde_json::to_value(RiskScore::new(2.25)).unwrap();
        assert_eq!(v, serde_json::json!(2.25));
        assert_eq!(RiskScore::new(2.0).to_string(), "2.00");
    }
}
