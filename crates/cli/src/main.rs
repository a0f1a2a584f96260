use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use advisor_core::domain::contract::QuestionnaireAnswers;
use advisor_core::domain::error::InvalidInputError;
use advisor_core::market::yahoo::YahooChartProvider;
use advisor_core::market::MarketDataProvider;

#[derive(Debug, Parser)]
#[command(name = "advisor", about = "Risk profile and ETF allocation from a short questionnaire")]
struct Args {
    /// Investor age (18-70).
    #[arg(long, default_value_t = 30)]
    age: i64,

    /// Required annual return (1 = ~10%, 3 = ~30%).
    #[arg(long, default_value_t = 2)]
    required_return: i64,

    /// Reaction to a 20% loss within a year (1 = exit, 3 = hold).
    #[arg(long, default_value_t = 2)]
    loss_reaction: i64,

    /// Investment experience (1 = beginner, 3 = expert).
    #[arg(long, default_value_t = 2)]
    experience: i64,

    /// Investment horizon (1 = under a year, 3 = over three years).
    #[arg(long, default_value_t = 2)]
    horizon: i64,

    /// Active in the 2008 crash (1 = yes, 2 = no).
    #[arg(long, default_value_t = 2)]
    active_in_2008: i64,

    /// Skip fetching market data for the recommended instruments.
    #[arg(long)]
    offline: bool,

    /// Emit compact instead of pretty-printed JSON.
    #[arg(long)]
    compact: bool,
}

impl Args {
    fn answers(&self) -> QuestionnaireAnswers {
        QuestionnaireAnswers {
            age: self.age,
            required_return: self.required_return,
            loss_reaction: self.loss_reaction,
            experience: self.experience,
            horizon: self.horizon,
            active_in_2008: self.active_in_2008,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = advisor_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    advisor_core::validate_static_config().context("static config check failed")?;

    let provider: Option<Arc<dyn MarketDataProvider>> = if args.offline {
        None
    } else {
        Some(Arc::new(YahooChartProvider::from_settings(&settings)?))
    };

    let report = match advisor_core::advisor::advise(
        args.answers(),
        provider,
        &settings.enrich_options(),
    )
    .await
    {
        Ok(report) => report,
        Err(err) => {
            if is_reportable(&err) {
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "advisory run failed");
            } else {
                tracing::warn!(error = %err, "rejected questionnaire answers");
            }
            return Err(err);
        }
    };

    let out = if args.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{out}");

    tracing::info!(
        risk_score = %report.risk_score,
        risk_tier = ?report.risk_tier,
        market_data = report.market_data.len(),
        "advisory run finished"
    );
    Ok(())
}

/// Invalid questionnaire input is not sent to Sentry.
fn is_reportable(err: &anyhow::Error) -> bool {
    err.downcast_ref::<InvalidInputError>().is_none()
}

fn init_sentry(settings: &advisor_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
