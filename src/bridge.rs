// 🌉 Request Bridge - one POST to the prediction service, one outcome back
// Transport failures and non-200 answers become display messages, never panics

use crate::currency::format_currency;
use crate::record::PredictionPayload;
use log::{debug, info, warn};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// OUTCOMES
// ============================================================================

/// What the service answered with a 200.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    /// First element of `predictions`
    Price(f64),
    /// Body decoded fine but did not carry a numeric prediction
    Raw(Value),
}

impl Prediction {
    /// Text shown in the result area
    pub fn display(&self) -> String {
        match self {
            Prediction::Price(price) => format_currency(*price),
            Prediction::Raw(value) => value.to_string(),
        }
    }

    pub fn price(&self) -> Option<f64> {
        match self {
            Prediction::Price(price) => Some(*price),
            Prediction::Raw(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    /// The service answered, but not with 200
    #[error("Error: {status}\n{body}")]
    Status { status: u16, body: String },

    /// No usable answer: refused, DNS, timeout, bad URL, undecodable body
    #[error("Failed to connect: {0}")]
    Transport(String),
}

impl BridgeError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BridgeError::Status { status, .. } => Some(*status),
            BridgeError::Transport(_) => None,
        }
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        BridgeError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Transport(err.to_string())
    }
}

/// Map a raw HTTP answer onto a prediction or an error.
///
/// Only the first element of `predictions` is read. A 200 whose body lacks
/// a numeric first prediction is not an error: the decoded body is handed
/// back as-is.
pub fn interpret_response(status: u16, body: &str) -> Result<Prediction, BridgeError> {
    if status != 200 {
        return Err(BridgeError::Status {
            status,
            body: body.to_string(),
        });
    }

    let decoded: Value = serde_json::from_str(body)?;
    let first = decoded
        .get("predictions")
        .and_then(|predictions| predictions.get(0))
        .and_then(Value::as_f64);

    Ok(match first {
        Some(price) => Prediction::Price(price),
        None => Prediction::Raw(decoded),
    })
}

// ============================================================================
// SERVICE SEAM
// ============================================================================

/// Anything that can turn a payload into a prediction.
///
/// The terminal form and the web server talk to this trait so tests can
/// swap in a canned service.
pub trait PredictionService {
    fn predict(&self, url: &str, payload: &PredictionPayload) -> Result<Prediction, BridgeError>;
}

/// Blocking HTTP client for MLflow-style `/invocations` endpoints.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: reqwest::blocking::Client,
    timeout: Duration,
}

impl PredictionClient {
    pub fn new(timeout: Duration) -> Result<Self, BridgeError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(PredictionClient { http, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl PredictionService for PredictionClient {
    fn predict(&self, url: &str, payload: &PredictionPayload) -> Result<Prediction, BridgeError> {
        let body = payload.to_json()?;
        info!("POST {} ({} record(s))", url, payload.dataframe_records.len());

        let result = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(BridgeError::from)
            .and_then(|response| {
                let status = response.status().as_u16();
                let text = response.text()?;
                debug!("{} answered {} ({} bytes)", url, status, text.len());
                interpret_response(status, &text)
            });

        match &result {
            Ok(prediction) => info!("Prediction received: {}", prediction.display()),
            Err(e) => warn!("Prediction request to {} failed: {}", url, e),
        }

        result
    }
}
