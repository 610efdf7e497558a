use esg_scoring::config::EvaluatorConfig;
use esg_scoring::pipeline::{EsgScoringService, EvaluationError, LlmClient};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type LlmScoringService = EsgScoringService<LlmClient, LlmClient>;

/// One client serves both the formula and the backfill port.
pub(crate) fn build_scoring_service(
    config: &EvaluatorConfig,
) -> Result<Arc<LlmScoringService>, EvaluationError> {
    if config.api_key.is_none() {
        warn!("ESG_LLM_API_KEY is not set; evaluation endpoints will fail until it is configured");
    }

    let client = Arc::new(LlmClient::new(config.clone())?);
    Ok(Arc::new(EsgScoringService::new(client.clone(), client)))
}
