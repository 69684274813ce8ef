// Location: src/predict.rs

use std::time::Instant;

use tracing::{debug, debug_span, warn};

use crate::backend::{Backend, PredictRequest};
use crate::config::PredictConfig;
use crate::error::{EngineError, Result};
use crate::options::{resolve_predict_config_from, PredictOption};
use crate::session::Session;

/// Run one generation call and return the continuation without the prompt echo.
///
/// Blocks for the whole generation. Calls against the same session are
/// serialized by the session lock.
pub fn predict<B: Backend>(session: &Session<B>, prompt: &str, config: &PredictConfig) -> Result<String> {
    let request = PredictRequest::new(prompt, config);
    let span = debug_span!("predict", prompt_len = prompt.len(), tokens = request.tokens);
    let _enter = span.enter();

    let start = Instant::now();
    let raw = session
        .with_state(|backend, state| backend.predict(state, &request))?
        .map_err(|status| {
            warn!(status, "engine reported a prediction failure");
            EngineError::Prediction { status }
        })?;

    let text = config.echo.strip(&raw, prompt).to_string();
    debug!(elapsed = ?start.elapsed(), output_len = text.len(), "prediction finished");
    Ok(text)
}

/// [`predict`] with `opts` applied over `base`
pub fn predict_with<'a, B: Backend>(
    session: &Session<B>,
    prompt: &str,
    base: PredictConfig,
    opts: impl IntoIterator<Item = &'a PredictOption>,
) -> Result<String> {
    let config = resolve_predict_config_from(base, opts);
    predict(session, prompt, &config)
}
