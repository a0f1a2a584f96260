use serde::{Deserialize, Serialize};

/// A 1..=3 questionnaire selector. Higher means more risk appetite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Tier {
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Tier::Low),
            2 => Ok(Tier::Medium),
            3 => Ok(Tier::High),
            other => Err(format!("tier must be 1, 2 or 3 (got {other})")),
        }
    }
}

impl From<Tier> for u8 {
    fn from(t: Tier) -> Self {
        t.value()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireResponse {
    pub age: u32,
    /// 1 = ~10% a year is enough, 3 = needs ~30%.
    pub required_return: Tier,
    /// 1 = would exit after a 20% drawdown, 3 = would hold.
    pub loss_reaction: Tier,
    pub experience: Tier,
    /// 1 = under a year, 3 = more than three years.
    pub horizon: Tier,
    pub active_in_2008: bool,
}
