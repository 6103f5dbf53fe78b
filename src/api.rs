use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::correlation::PendingCorrelation;
use crate::error::DriverError;
use crate::registry::execute::execute;
use crate::registry::validation::validate_intent;
use crate::registry::{catalog, CompileContext, Compiled, Intent};
use crate::settings::ConnectionInfo;
use crate::state::{Instance, SessionState};
use crate::transport::link::LinkClient;
use crate::transport::socket::RemoteSocket;
use crate::variables::SessionVariables;

/// Everything the HTTP surface needs to compile and send intents.
pub struct ApiState {
    pub instance: Arc<Instance>,
    /// `None` when the remote could not be reached at startup.
    pub socket: Option<RemoteSocket>,
    pub link: LinkClient,
}

// ── Response types ───────────────────────────────────────────────

#[derive(Serialize)]
struct ApiOk<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Serialize)]
struct ApiErr {
    ok: bool,
    error: DriverError,
    message: String,
}

fn ok_json<T: Serialize>(data: T) -> impl IntoResponse {
    Json(ApiOk { ok: true, data })
}

fn err_json(e: DriverError) -> impl IntoResponse {
    let status = match &e {
        DriverError::UnknownIntent { .. } => StatusCode::NOT_FOUND,
        DriverError::InvalidIntent { .. } => StatusCode::BAD_REQUEST,
        DriverError::NotConnected => StatusCode::SERVICE_UNAVAILABLE,
        DriverError::Transport { .. } | DriverError::Link { .. } => StatusCode::BAD_GATEWAY,
        DriverError::Settings { .. } | DriverError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = e.to_string();
    (
        status,
        Json(ApiErr {
            ok: false,
            error: e,
            message,
        }),
    )
}

/// Inspection view of the running instance.
#[derive(Serialize)]
struct SessionView {
    connected: bool,
    connection: ConnectionInfo,
    session: SessionState,
    pending: PendingCorrelation,
}

#[derive(Serialize)]
struct IntentResponse {
    summary: String,
    compiled: Compiled,
}

// ── Handlers ─────────────────────────────────────────────────────

async fn run_intent(state: &ApiState, name: &str, options: &Value) -> Result<Compiled, DriverError> {
    let intent = Intent::from_request(name, options)?;
    validate_intent(&intent)?;
    let variables = SessionVariables {
        instance: &state.instance,
    };
    let ctx = CompileContext::new(&state.instance, &variables);
    execute(&ctx, intent, &state.socket, &state.link).await
}

async fn post_intent(
    Extension(state): Extension<Arc<ApiState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    // An empty body means "no options".
    let options = if body.is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_slice::<Value>(&body).map_err(DriverError::from)
    };
    let result = match options {
        Ok(options) => run_intent(&state, &name, &options).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(compiled) => ok_json(IntentResponse {
            summary: compiled.summary(),
            compiled,
        })
        .into_response(),
        Err(e) => err_json(e).into_response(),
    }
}

async fn get_intents() -> impl IntoResponse {
    ok_json(catalog::to_json_schema())
}

async fn get_session(Extension(state): Extension<Arc<ApiState>>) -> impl IntoResponse {
    ok_json(SessionView {
        connected: state.socket.as_ref().is_some_and(RemoteSocket::is_connected),
        connection: ConnectionInfo::from_settings(&state.instance.settings),
        session: state.instance.with_session(Clone::clone),
        pending: state.instance.correlation.snapshot(),
    })
}

// ── Server startup ───────────────────────────────────────────────

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/intents/{name}", post(post_intent))
        .route("/api/intents", get(get_intents))
        .route("/api/session", get(get_session))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}

/// Start the trigger API on `127.0.0.1:port` (0 picks a free port). Returns
/// the bound port.
pub async fn start_api_server(state: Arc<ApiState>, port: u16) -> Result<u16, DriverError> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let port = listener.local_addr()?.port();

    let app = router(state);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("API server error: {e}");
        }
    });

    info!("API server listening on http://127.0.0.1:{port}");
    Ok(port)
}
