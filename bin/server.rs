// DCP Analyzer - Web Server
// REST API with Axum: multipart upload of up to 10 DCPs, one result per document

use anyhow::{Context, Result};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dcp_analyzer::{
    analyze_upload, Batch, BatchItem, BatchResponse, DcpAnalyzer, DcpError, DecoderRegistry,
    DocumentFailure, Upload, DEFAULT_LOG_FILTER, MAX_BATCH_SIZE,
};

const UPLOAD_FIELD: &str = "pdfs";
const MAX_FILE_SIZE: usize = 20 * 1024 * 1024;

/// Server configuration (flags or environment)
#[derive(Parser, Debug, Clone)]
#[command(name = "dcp-server", version)]
struct ServerConfig {
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Allowed CORS origins, comma separated ("*" allows any)
    #[arg(
        long = "allowed-origin",
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "https://cdp-analizador.netlify.app"
    )]
    allowed_origins: Vec<String>,

    #[arg(long, env = "MAX_FILES", default_value_t = MAX_BATCH_SIZE)]
    max_files: usize,

    /// Per-file size limit in bytes
    #[arg(long, env = "MAX_FILE_SIZE", default_value_t = MAX_FILE_SIZE)]
    max_file_size: usize,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    analyzer: Arc<DcpAnalyzer>,
    decoders: Arc<DecoderRegistry>,
    max_files: usize,
    max_file_size: usize,
}

impl AppState {
    fn new(config: &ServerConfig) -> Self {
        Self {
            analyzer: Arc::new(DcpAnalyzer::new()),
            decoders: Arc::new(DecoderRegistry::new()),
            max_files: config.max_files,
            max_file_size: config.max_file_size,
        }
    }
}

/// Plain-text error response, status + message
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Keeps the extractor's status, so a body over the limit stays a 413
    fn from_multipart(err: MultipartError) -> Self {
        Self {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<DcpError> for ApiError {
    fn from(err: DcpError) -> Self {
        match err {
            DcpError::EmptyBatch => ApiError::bad_request("Nenhum PDF enviado."),
            DcpError::TooManyDocuments { max, .. } => {
                ApiError::bad_request(format!("Envie no máximo {} PDFs.", max))
            }
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: other.to_string(),
            },
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /health - Health check
async fn health_check() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// POST /api/analyze-dcps - Analyze up to `max_files` uploaded DCPs
async fn analyze_dcps(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, ApiError> {
    let mut uploads = Vec::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(ApiError::from_multipart)?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        if uploads.len() >= state.max_files {
            return Err(DcpError::TooManyDocuments {
                count: uploads.len() + 1,
                max: state.max_files,
            }
            .into());
        }

        let file_name = field.file_name().unwrap_or("documento.pdf").to_string();

        // Stop reading as soon as the file passes the per-file limit
        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(ApiError::from_multipart)? {
            if bytes.len() + chunk.len() > state.max_file_size {
                return Err(ApiError {
                    status: StatusCode::PAYLOAD_TOO_LARGE,
                    message: format!(
                        "{} excede o limite de {} bytes.",
                        file_name, state.max_file_size
                    ),
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        uploads.push(Upload::new(file_name, bytes));
    }

    let batch = Batch::new(uploads, state.max_files)?;
    info!("Analyzing batch of {} document(s)", batch.len());

    // One blocking task per document; results keep upload order
    let handles: Vec<_> = batch
        .into_uploads()
        .into_iter()
        .map(|upload| {
            let state = state.clone();
            let file_name = upload.file_name.clone();
            let handle = tokio::task::spawn_blocking(move || {
                analyze_upload(&state.analyzer, &state.decoders, &upload)
            });
            (file_name, handle)
        })
        .collect();

    let mut items = Vec::with_capacity(handles.len());
    for (file_name, handle) in handles {
        let item = handle.await.unwrap_or_else(|e| {
            error!("Analysis task for {} failed: {}", file_name, e);
            BatchItem::Failed(DocumentFailure::new(file_name, "Erro interno."))
        });
        items.push(item);
    }

    let response = BatchResponse::new(items);
    info!("{}", response.summary().summary());

    Ok(Json(response))
}

// ============================================================================
// Router
// ============================================================================

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values = origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o.trim()).with_context(|| format!("Invalid CORS origin: {}", o))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(values)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST]))
}

fn build_router(state: AppState, cors: CorsLayer) -> Router {
    // Whole request may carry max_files documents of max_file_size each
    let body_limit = state
        .max_files
        .saturating_mul(state.max_file_size)
        .saturating_add(1024 * 1024);

    let api_routes = Router::new()
        .route("/analyze-dcps", post(analyze_dcps))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = ServerConfig::parse();
    info!("🌐 DCP Analyzer - Web Server v{}", dcp_analyzer::VERSION);

    let app = build_router(AppState::new(&config), cors_layer(&config.allowed_origins)?);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;

    info!("🚀 API running on http://localhost:{}", config.port);
    info!("   Allowed origins: {}", config.allowed_origins.join(", "));

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
