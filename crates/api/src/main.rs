use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use advisor_core::advisor::AdvisoryReport;
use advisor_core::domain::contract::QuestionnaireAnswers;
use advisor_core::domain::error::InvalidInputError;
use advisor_core::domain::recommendation::{AllocationTable, AssetClass};
use advisor_core::domain::risk::{RiskScore, RiskTier};
use advisor_core::market::enricher::EnrichOptions;
use advisor_core::market::yahoo::YahooChartProvider;
use advisor_core::market::MarketDataProvider;
use advisor_core::profile::catalog::{self, Instrument};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = advisor_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    if let Err(e) = advisor_core::validate_static_config() {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(error = %e, "static allocation/catalog config is invalid; refusing to start");
        return Err(e);
    }

    let provider: Option<Arc<dyn MarketDataProvider>> =
        match YahooChartProvider::from_settings(&settings) {
            Ok(p) => Some(Arc::new(p)),
            Err(e) => {
                sentry_anyhow::capture_anyhow(&e);
                tracing::error!(error = %e, "market data client init failed; serving profiles without market data");
                None
            }
        };

    let state = AppState {
        provider,
        enrich_opts: settings.enrich_options(),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/catalog", get(get_catalog))
        .route("/allocation/:score", get(get_allocation))
        .route("/profile", post(post_profile))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    provider: Option<Arc<dyn MarketDataProvider>>,
    enrich_opts: EnrichOptions,
}

#[derive(Debug, Serialize)]
struct ApiReport {
    report_id: Uuid,
    report: AdvisoryReport,
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
    field: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct CatalogEntry {
    asset_class: AssetClass,
    instruments: &'static [Instrument],
}

#[derive(Debug, Serialize)]
struct ApiAllocation {
    risk_score: RiskScore,
    risk_tier: RiskTier,
    advice: &'static str,
    allocation: AllocationTable,
    generated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ProfileQuery {
    #[serde(default = "default_market_data")]
    market_data: bool,
}

fn default_market_data() -> bool {
    true
}

async fn get_catalog() -> Json<Vec<CatalogEntry>> {
    Json(
        AssetClass::ALL
            .into_iter()
            .map(|asset_class| CatalogEntry {
                asset_class,
                instruments: catalog::instruments_for(asset_class),
            })
            .collect(),
    )
}

async fn get_allocation(Path(score): Path<String>) -> Result<Json<ApiAllocation>, StatusCode> {
    let score = score
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite())
        .ok_or(StatusCode::BAD_REQUEST)?;

    let risk_score = RiskScore::new(score);
    let risk_tier = risk_score.tier();
    Ok(Json(ApiAllocation {
        risk_score,
        risk_tier,
        advice: risk_tier.advice(),
        allocation: risk_tier.allocation(),
        generated_at: Utc::now(),
    }))
}

async fn post_profile(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
    Json(answers): Json<QuestionnaireAnswers>,
) -> Result<Json<ApiReport>, (StatusCode, Json<ApiError>)> {
    let provider = if query.market_data {
        state.provider.clone()
    } else {
        None
    };

    let report = advisor_core::advisor::advise(answers, provider, &state.enrich_opts)
        .await
        .map_err(error_response)?;

    let report_id = Uuid::new_v4();
    tracing::info!(%report_id, risk_score = %report.risk_score, "profile served");

    Ok(Json(ApiReport { report_id, report }))
}

fn error_response(err: anyhow::Error) -> (StatusCode, Json<ApiError>) {
    if let Some(invalid) = err.downcast_ref::<InvalidInputError>() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: invalid.detail.clone(),
                field: Some(invalid.field),
            }),
        );
    }

    sentry_anyhow::capture_anyhow(&err);
    tracing::error!(error = %err, "profile request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError {
            error: "internal error".to_string(),
            field: None,
        }),
    )
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
