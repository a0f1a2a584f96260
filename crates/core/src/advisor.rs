use crate::domain::contract::QuestionnaireAnswers;
use crate::domain::questionnaire::QuestionnaireResponse;
use crate::domain::recommendation::{AllocationTable, Recommendation};
use crate::domain::risk::{RiskScore, RiskTier};
use crate::market::enricher::{enrich, EnrichOptions};
use crate::market::types::InstrumentMarketStats;
use crate::market::MarketDataProvider;
use crate::profile::catalog::StaticCatalog;
use crate::profile::{builder, policy, scorer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Everything the presentation layer renders for one questionnaire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryReport {
    pub generated_at: DateTime<Utc>,
    pub risk_score: RiskScore,
    pub risk_tier: RiskTier,
    pub advice: String,
    pub allocation: AllocationTable,
    pub recommendation: Recommendation,
    pub market_data: BTreeMap<String, InstrumentMarketStats>,
}

/// Score, allocate and pick instruments. Pure; no market data.
pub fn profile(response: &QuestionnaireResponse) -> AdvisoryReport {
    let risk_score = scorer::score(response);
    let risk_tier = risk_score.tier();
    let allocation = policy::allocate(risk_score);
    let recommendation = builder::build(&allocation, &StaticCatalog);

    AdvisoryReport {
        generated_at: Utc::now(),
        risk_score,
        risk_tier,
        advice: risk_tier.advice().to_string(),
        allocation,
        recommendation,
        market_data: BTreeMap::new(),
    }
}

/// Full flow from raw answers. Fails only on invalid input; market data
/// problems end up as per-symbol error markers.
pub async fn advise(
    answers: QuestionnaireAnswers,
    provider: Option<Arc<dyn MarketDataProvider>>,
    opts: &EnrichOptions,
) -> anyhow::Result<AdvisoryReport> {
    let response = answers.validate_and_into_response()?;
    let mut report = profile(&response);

    tracing::info!(
        risk_score = %report.risk_score,
        risk_tier = ?report.risk_tier,
        classes = report.recommendation.classes.len(),
        "profile computed"
    );

    if let Some(provider) = provider {
        report.market_data = enrich(provider, &report.recommendation, opts).await;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::InvalidInputError;
    use crate::domain::recommendation::AssetClass;
    use crate::market::enricher::tests::{Scripted, ScriptedProvider};
    use crate::profile::policy::{AGGRESSIVE, BALANCED};
    use std::time::Duration;

    fn answers(age: i64, tier: i64, active_in_2008: i64) -> QuestionnaireAnswers {
        QuestionnaireAnswers {
            age,
            required_return: tier,
            loss_reaction: tier,
            experience: tier,
            horizon: tier,
            active_in_2008,
        }
    }

    fn opts() -> EnrichOptions {
        EnrichOptions {
            concurrency: 2,
            symbol_timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn young_medium_investor_is_balanced() {
        let report = advise(answers(30, 2, 2), None, &opts()).await.unwrap();
        assert_eq!(report.risk_score.value(), 2.5);
        assert_eq!(report.risk_tier, RiskTier::Balanced);
        assert_eq!(report.allocation, BALANCED);
        assert!(report.market_data.is_empty());
    }

    #[tokio::test]
    async fn senior_veteran_is_conservative() {
        let report = advise(answers(60, 1, 1), None, &opts()).await.unwrap();
        assert_eq!(report.risk_score.value(), 0.0);
        assert_eq!(report.risk_tier, RiskTier::Conservative);
        assert!(report.advice.contains("conservative"));
    }

    #[tokio::test]
    async fn experienced_mid_age_investor_is_aggressive() {
        let report = advise(answers(40, 3, 2), None, &opts()).await.unwrap();
        assert_eq!(report.risk_score.value(), 3.0);
        assert_eq!(report.allocation, AGGRESSIVE);
        let equity = report.recommendation.get(AssetClass::Equity).unwrap();
        assert!(equity.iter().all(|i| i.weight_percent == 20.0));
    }

    #[tokio::test]
    async fn invalid_input_is_reported_not_computed() {
        let err = advise(answers(16, 2, 2), None, &opts()).await.unwrap_err();
        let invalid = err.downcast_ref::<InvalidInputError>().unwrap();
        assert_eq!(invalid.field, "age");
    }

    #[tokio::test]
    async fn report_completes_when_market_data_partly_fails() {
        let provider: Arc<dyn MarketDataProvider> = Arc::new(
            ScriptedProvider::default()
                .with("QQQ", Scripted::Closes(vec![]))
                .with("BND", Scripted::Fault("connection reset")),
        );
        let report = advise(answers(40, 3, 2), Some(provider), &opts())
            .await
            .unwrap();

        assert_eq!(report.market_data.len(), 15);
        assert_eq!(report.market_data["QQQ"].error_message(), Some("No data"));
        assert_eq!(
            report.market_data["BND"].error_message(),
            Some("connection reset")
        );
        assert!(!report.market_data["VOO"].is_error());
    }

    #[test]
    fn report_serializes_for_presentation() {
        let response = answers(40, 3, 2).validate_and_into_response().unwrap();
        let v = serde_json::to_value(profile(&response)).unwrap();
        assert_eq!(v["risk_score"], serde_json::json!(3.0));
        assert_eq!(v["risk_tier"], "aggressive");
        assert_eq!(v["allocation"]["Real_Estate"], 5);
        assert_eq!(v["recommendation"][0]["asset_class"], "Equity");
        assert_eq!(v["recommendation"][2]["asset_class"], "Real_Estate");
        assert_eq!(v["recommendation"][0]["instruments"][0]["symbol"], "VTI");
    }
}
