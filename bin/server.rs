// House Price Client - Web Server
// Browser form over the same request bridge as the terminal form

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use house_price_client::{
    init_logging, BridgeError, Config, EditableField, HousingInputs, Prediction, PredictionClient,
    PredictionPayload, PredictionService,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
struct AppState {
    client: Arc<dyn PredictionService + Send + Sync>,
    default_url: Arc<String>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// One form control as the browser renders it
#[derive(Serialize)]
struct FieldInfo {
    key: &'static str,
    feature: &'static str,
    label: &'static str,
    default: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<i64>,
}

#[derive(Serialize)]
struct DefaultsResponse {
    url: String,
    inputs: HousingInputs,
    fields: Vec<FieldInfo>,
}

#[derive(Deserialize)]
struct PredictRequest {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    inputs: HousingInputs,
}

#[derive(Serialize)]
struct PredictResponse {
    display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<serde_json::Value>,
}

impl From<Prediction> for PredictResponse {
    fn from(prediction: Prediction) -> Self {
        let display = prediction.display();
        match prediction {
            Prediction::Price(price) => Self {
                display,
                price: Some(price),
                raw: None,
            },
            Prediction::Raw(value) => Self {
                display,
                price: None,
                raw: Some(value),
            },
        }
    }
}

fn input_key(field: EditableField) -> &'static str {
    match field {
        EditableField::LotArea => "lot_area",
        EditableField::OverallQual => "overall_qual",
        EditableField::YearBuilt => "year_built",
        EditableField::GrLivArea => "gr_liv_area",
        EditableField::GarageCars => "garage_cars",
        EditableField::TotalBsmtSf => "total_bsmt_sf",
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/defaults - Initial form state
async fn get_defaults(State(state): State<AppState>) -> impl IntoResponse {
    let fields = EditableField::ALL
        .iter()
        .map(|field| FieldInfo {
            key: input_key(*field),
            feature: field.feature_name(),
            label: field.label(),
            default: field.default_value(),
            min: field.range().map(|(min, _)| min),
            max: field.range().map(|(_, max)| max),
        })
        .collect();

    Json(ApiResponse::ok(DefaultsResponse {
        url: state.default_url.to_string(),
        inputs: HousingInputs::default(),
        fields,
    }))
}

/// POST /api/payload - The JSON that Predict would send
async fn build_payload(Json(inputs): Json<HousingInputs>) -> impl IntoResponse {
    Json(ApiResponse::ok(PredictionPayload::from_inputs(&inputs.clamped())))
}

/// POST /api/predict - Forward one record to the prediction service
async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> impl IntoResponse {
    let url = request
        .url
        .unwrap_or_else(|| state.default_url.to_string());
    let payload = PredictionPayload::from_inputs(&request.inputs.clamped());
    let client = state.client.clone();

    // The bridge is blocking; keep it off the async workers
    let joined = tokio::task::spawn_blocking(move || client.predict(&url, &payload)).await;

    match joined {
        Ok(Ok(prediction)) => {
            (StatusCode::OK, Json(ApiResponse::ok(PredictResponse::from(prediction)))).into_response()
        }
        Ok(Err(e)) => {
            let status = match e {
                BridgeError::Status { .. } => StatusCode::BAD_GATEWAY,
                BridgeError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
            };
            (status, Json(ApiResponse::<PredictResponse>::error(e.to_string()))).into_response()
        }
        Err(e) => {
            error!("Prediction task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<PredictResponse>::error("prediction task failed")),
            )
                .into_response()
        }
    }
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

fn build_router(state: AppState) -> Router {
    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/defaults", get(get_defaults))
        .route("/payload", post(build_payload))
        .route("/predict", post(predict))
        .with_state(state);

    // Build main router
    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

fn main() -> anyhow::Result<()> {
    init_logging("info");

    let config = Config::from_env()?;
    // The blocking client owns its own runtime, so it is built before ours starts
    let client = PredictionClient::new(config.timeout)?;

    info!("🌐 House Price Client - Web Server");
    info!("Prediction service: {} (timeout {:?})", config.service_url, config.timeout);

    let state = AppState {
        client: Arc::new(client),
        default_url: Arc::new(config.service_url.clone()),
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(config.bind_address(), state))
}

async fn serve(addr: String, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🚀 Server running on http://{}", addr);
    info!("   UI:  http://{}/", addr);
    info!("   API: http://{}/api/predict", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    async fn state_for(url: &str) -> AppState {
        // Building a blocking client on an async worker panics
        let client = tokio::task::spawn_blocking(|| PredictionClient::new(Duration::from_secs(5)))
            .await
            .unwrap()
            .unwrap();

        AppState {
            client: Arc::new(client),
            default_url: Arc::new(url.to_string()),
        }
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(state_for("http://127.0.0.1:8000/invocations").await);
        let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();

        let (status, body) = call(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "data": "OK"}));
    }

    #[tokio::test]
    async fn test_defaults_describe_the_six_controls() {
        let app = build_router(state_for("http://model:8000/invocations").await);
        let request = Request::builder().uri("/api/defaults").body(Body::empty()).unwrap();

        let (_, body) = call(app, request).await;

        assert_eq!(body["data"]["url"], "http://model:8000/invocations");
        assert_eq!(body["data"]["fields"].as_array().unwrap().len(), 6);
        assert_eq!(body["data"]["fields"][1]["max"], 10);
        assert_eq!(body["data"]["inputs"]["year_built"], 1961);
    }

    #[tokio::test]
    async fn test_payload_merges_inputs() {
        let app = build_router(state_for("http://127.0.0.1:8000/invocations").await);

        let (status, body) = call(
            app,
            post_json("/api/payload", json!({"garage_cars": 3, "overall_qual": 12})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let record = &body["data"]["dataframe_records"][0];
        assert_eq!(record["Garage Cars"], 3);
        assert_eq!(record["Overall Qual"], 10);
        assert_eq!(record["Lot Area"], 9600);
    }

    #[tokio::test]
    async fn test_predict_forwards_to_service() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/invocations")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(r#"{"predictions": [250000.55]}"#)
            .create_async()
            .await;

        let url = format!("{}/invocations", server.url());
        let app = build_router(state_for(&url).await);

        let (status, body) = call(app, post_json("/api/predict", json!({"inputs": {}}))).await;

        mock.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["display"], "$250,000.55");
        assert_eq!(body["data"]["price"], 250000.55);
    }

    #[tokio::test]
    async fn test_predict_reports_service_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/invocations")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let app = build_router(state_for("http://127.0.0.1:1/unused").await);
        let url = format!("{}/invocations", server.url());

        let (status, body) = call(app, post_json("/api/predict", json!({"url": url}))).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("404"));
        assert!(message.contains("not found"));
    }

    #[tokio::test]
    async fn test_predict_reports_unreachable_service() {
        // Reserve a port, then free it so nothing listens there
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}/invocations", port);
        let app = build_router(state_for(&url).await);

        let (status, body) = call(app, post_json("/api/predict", json!({}))).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Failed to connect:"));
    }
}
