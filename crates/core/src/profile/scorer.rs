use crate::domain::questionnaire::QuestionnaireResponse;
use crate::domain::risk::RiskScore;
use crate::profile::round2;

const TIER_WEIGHT: f64 = 0.25;
const ACTIVE_IN_2008_ADJ: f64 = -0.5;
const YOUNG_AGE_LIMIT: u32 = 35;
const YOUNG_ADJ: f64 = 0.5;
const SENIOR_AGE_LIMIT: u32 = 55;
const SENIOR_ADJ: f64 = -0.5;

/// Scores a questionnaire. Not clamped: 0.0 and 3.5 are both reachable.
pub fn score(response: &QuestionnaireResponse) -> RiskScore {
    let tiers = [
        response.required_return,
        response.loss_reaction,
        response.experience,
        response.horizon,
    ];
    let mut s: f64 = tiers.iter().map(|t| f64::from(t.value()) * TIER_WEIGHT).sum();

    if response.active_in_2008 {
        s += ACTIVE_IN_2008_ADJ;
    }

    if response.age < YOUNG_AGE_LIMIT {
        s += YOUNG_ADJ;
    } else if response.age > SENIOR_AGE_LIMIT {
        s += SENIOR_ADJ;
    }

    RiskScore::new(round2(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::questionnaire::Tier;

    fn response(age: u32, tier: Tier, active_in_2008: bool) -> QuestionnaireResponse {
        QuestionnaireResponse {
            age,
            required_return: tier,
            loss_reaction: tier,
            experience: tier,
            horizon: tier,
            active_in_2008,
        }
    }

    #[test]
    fn young_balanced_investor_scores_2_5() {
        assert_eq!(score(&response(30, Tier::Medium, false)).value(), 2.5);
    }

    #[test]
    fn senior_2008_veteran_scores_zero() {
        assert_eq!(score(&response(60, Tier::Low, true)).value(), 0.0);
    }

    #[test]
    fn mid_age_gets_no_adjustment() {
        assert_eq!(score(&response(40, Tier::High, false)).value(), 3.0);
        assert_eq!(score(&response(35, Tier::High, false)).value(), 3.0);
        assert_eq!(score(&response(55, Tier::High, false)).value(), 3.0);
    }

    #[test]
    fn age_boundaries() {
        assert_eq!(score(&response(34, Tier::Medium, false)).value(), 2.5);
        assert_eq!(score(&response(56, Tier::Medium, false)).value(), 1.5);
    }

    #[test]
    fn maximum_is_unclamped() {
        assert_eq!(score(&response(18, Tier::High, false)).value(), 3.5);
    }

    #[test]
    fn mixed_tiers_average() {
        let r = QuestionnaireResponse {
            age: 45,
            required_return: Tier::High,
            loss_reaction: Tier::Low,
            experience: Tier::Medium,
            horizon: Tier::High,
            active_in_2008: true,
        };
        // (3 + 1 + 2 + 3) / 4 - 0.5
        assert_eq!(score(&r).value(), 1.75);
    }

    #[test]
    fn deterministic() {
        let r = response(47, Tier::Medium, true);
        assert_eq!(score(&r), score(&r));
    }
}
