use crate::domain::error::InvalidInputError;
use crate::domain::questionnaire::{QuestionnaireResponse, Tier};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const AGE_RANGE: RangeInclusive<i64> = 18..=70;

const ACTIVE_IN_2008_YES: i64 = 1;
const ACTIVE_IN_2008_NO: i64 = 2;

/// Questionnaire answers as the presentation layer collects them: bare integers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionnaireAnswers {
    pub age: i64,
    pub required_return: i64,
    pub loss_reaction: i64,
    pub experience: i64,
    pub horizon: i64,
    /// 1 = yes, 2 = no.
    pub active_in_2008: i64,
}

impl Default for QuestionnaireAnswers {
    fn default() -> Self {
        Self {
            age: 30,
            required_return: 2,
            loss_reaction: 2,
            experience: 2,
            horizon: 2,
            active_in_2008: ACTIVE_IN_2008_NO,
        }
    }
}

impl QuestionnaireAnswers {
    pub fn validate_and_into_response(self) -> Result<QuestionnaireResponse, InvalidInputError> {
        if !AGE_RANGE.contains(&self.age) {
            return Err(InvalidInputError::new(
                "age",
                format!(
                    "age must be {}..={} (got {})",
                    AGE_RANGE.start(),
                    AGE_RANGE.end(),
                    self.age
                ),
            ));
        }

        let active_in_2008 = match self.active_in_2008 {
            ACTIVE_IN_2008_YES => true,
            ACTIVE_IN_2008_NO => false,
            other => {
                return Err(InvalidInputError::new(
                    "active_in_2008",
                    format!("must be 1 (yes) or 2 (no) (got {other})"),
                ))
            }
        };

        Ok(QuestionnaireResponse {
            age: self.age as u32,
            required_return: tier("required_return", self.required_return)?,
            loss_reaction: tier("loss_reaction", self.loss_reaction)?,
            experience: tier("experience", self.experience)?,
            horizon: tier("horizon", self.horizon)?,
            active_in_2008,
        })
    }
}

fn tier(field: &'static str, v: i64) -> Result<Tier, InvalidInputError> {
    u8::try_from(v)
        .map_err(|_| format!("tier must be 1, 2 or 3 (got {v})"))
        .and_then(Tier::try_from)
        .map_err(|detail| InvalidInputError::new(field, detail))
}
