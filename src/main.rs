use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
};
use chrono::Utc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crs_core::{
    Actor, ClinicalRecord, CoreConfig, FsStore, LifecycleService, RecordDraft, RecordError,
    RecordKind, RecordStatus, RecordView, ReportIdentities, Role, StaticDirectory, build_report,
    constants::DEFAULT_DATA_DIR,
};
use crs_types::{ActorId, NonEmptyText, RecordId, SubjectId};

/// Application state shared across REST API handlers.
///
/// The REST layer is a thin presentation adapter: it parses the acting staff
/// member out of each request and passes it into the engine explicitly. All
/// confirmation dialogs and user-facing copy live with the caller.
#[derive(Clone)]
struct AppState {
    service: LifecycleService<FsStore>,
    directory: Arc<StaticDirectory>,
}

/// The acting staff member as carried by requests.
#[derive(serde::Deserialize)]
struct ActorParams {
    role: String,
    actor_name: String,
    actor_id: Option<String>,
}

impl ActorParams {
    fn into_actor(self) -> Result<Actor, (StatusCode, String)> {
        let role = Role::from_str(&self.role).map_err(bad_request)?;
        let id = match self.actor_id {
            Some(raw) => ActorId::from_str(&raw).map_err(bad_request)?,
            None => ActorId::generate(),
        };
        let name = NonEmptyText::new(&self.actor_name).map_err(bad_request)?;
        Ok(Actor::new(id, name, role))
    }
}

#[derive(serde::Deserialize)]
struct CreateRecordReq {
    kind: String,
    subject_id: SubjectId,
    assignee: Option<ActorId>,
    notes: Option<String>,
    #[serde(flatten)]
    actor: ActorParams,
}

#[derive(serde::Deserialize)]
struct UpdatePayloadReq {
    payload: String,
    notes: Option<String>,
    #[serde(flatten)]
    actor: ActorParams,
}

#[derive(serde::Deserialize)]
struct AssignReq {
    assignee: Option<ActorId>,
    #[serde(flatten)]
    actor: ActorParams,
}

#[derive(serde::Deserialize)]
struct TransitionReq {
    target: String,
    #[serde(flatten)]
    actor: ActorParams,
}

#[derive(serde::Deserialize)]
struct CompleteReq {
    payload: String,
    #[serde(flatten)]
    actor: ActorParams,
}

#[derive(serde::Deserialize)]
struct ActorOnlyReq {
    #[serde(flatten)]
    actor: ActorParams,
}

#[derive(serde::Serialize)]
struct HealthRes {
    status: &'static str,
}

/// Main entry point for the CRS REST runner.
///
/// # Environment Variables
/// - `CRS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CRS_DATA_DIR`: Directory for record storage (default: "record_data")
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("crs=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CRS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let data_dir = std::env::var("CRS_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());

    tracing::info!("++ Starting CRS REST on {}", rest_addr);
    tracing::info!("++ Record data directory: {}", data_dir);

    let cfg = CoreConfig::new(data_dir.into())?;
    let service = LifecycleService::new(Arc::new(FsStore::new(&cfg)));

    let app = Router::new()
        .route("/health", get(health))
        .route("/records", get(list_records).post(create_record))
        .route("/records/:id", get(load_record))
        .route("/records/:id/payload", put(update_payload))
        .route("/records/:id/assign", post(assign_record))
        .route("/records/:id/transition", post(transition_record))
        .route("/records/:id/complete", post(complete_record))
        .route("/records/:id/revert", post(revert_record))
        .route("/records/:id/report", get(record_report))
        .layer(CorsLayer::permissive())
        .with_state(AppState {
            service,
            directory: Arc::new(StaticDirectory::new()),
        });

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<HealthRes> {
    Json(HealthRes { status: "ok" })
}

async fn create_record(
    State(state): State<AppState>,
    Json(req): Json<CreateRecordReq>,
) -> Result<Json<ClinicalRecord>, (StatusCode, String)> {
    let actor = req.actor.into_actor()?;
    let kind = RecordKind::from_str(&req.kind).map_err(bad_request)?;

    let mut draft = RecordDraft::new(kind, req.subject_id);
    draft.assigned_actor_id = req.assignee;
    draft.notes = req.notes;

    let record = state.service.create(&actor, draft).map_err(error_response)?;
    Ok(Json(record))
}

async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<ActorParams>,
) -> Result<Json<Vec<RecordView>>, (StatusCode, String)> {
    let actor = params.into_actor()?;
    let views = state.service.list(&actor).map_err(error_response)?;
    Ok(Json(views))
}

async fn load_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ActorParams>,
) -> Result<Json<RecordView>, (StatusCode, String)> {
    let actor = params.into_actor()?;
    let id = RecordId::from_str(&id).map_err(bad_request)?;
    let view = state.service.load(id, &actor).map_err(error_response)?;
    Ok(Json(view))
}

async fn update_payload(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePayloadReq>,
) -> Result<Json<ClinicalRecord>, (StatusCode, String)> {
    let actor = req.actor.into_actor()?;
    let id = RecordId::from_str(&id).map_err(bad_request)?;
    let record = state
        .service
        .update_payload(id, &actor, req.payload, req.notes)
        .map_err(error_response)?;
    Ok(Json(record))
}

async fn assign_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AssignReq>,
) -> Result<Json<ClinicalRecord>, (StatusCode, String)> {
    let actor = req.actor.into_actor()?;
    let id = RecordId::from_str(&id).map_err(bad_request)?;
    let record = state
        .service
        .assign(id, &actor, req.assignee)
        .map_err(error_response)?;
    Ok(Json(record))
}

async fn transition_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<TransitionReq>,
) -> Result<Json<ClinicalRecord>, (StatusCode, String)> {
    let actor = req.actor.into_actor()?;
    let id = RecordId::from_str(&id).map_err(bad_request)?;
    let target = RecordStatus::from_str(&req.target).map_err(bad_request)?;
    let record = state
        .service
        .transition_status(id, &actor, target)
        .map_err(error_response)?;
    Ok(Json(record))
}

async fn complete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CompleteReq>,
) -> Result<Json<ClinicalRecord>, (StatusCode, String)> {
    let actor = req.actor.into_actor()?;
    let id = RecordId::from_str(&id).map_err(bad_request)?;
    let record = state
        .service
        .complete(id, &actor, req.payload)
        .map_err(error_response)?;
    Ok(Json(record))
}

async fn revert_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ActorOnlyReq>,
) -> Result<Json<ClinicalRecord>, (StatusCode, String)> {
    let actor = req.actor.into_actor()?;
    let id = RecordId::from_str(&id).map_err(bad_request)?;
    let record = state.service.revert(id, &actor).map_err(error_response)?;
    Ok(Json(record))
}

async fn record_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ActorParams>,
) -> Result<String, (StatusCode, String)> {
    let actor = params.into_actor()?;
    let id = RecordId::from_str(&id).map_err(bad_request)?;
    let view = state.service.load(id, &actor).map_err(error_response)?;

    let identities = ReportIdentities::resolve(
        state.directory.as_ref(),
        view.subject_id,
        view.ordering_actor_id,
        view.assigned_actor_id,
    );
    Ok(build_report(&view, &identities, &actor, Utc::now()))
}

fn bad_request(err: impl std::fmt::Display) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, err.to_string())
}

fn error_response(err: RecordError) -> (StatusCode, String) {
    let status = match &err {
        RecordError::NotFound(_) => StatusCode::NOT_FOUND,
        RecordError::Forbidden { .. } => StatusCode::FORBIDDEN,
        RecordError::IllegalTransition { .. } | RecordError::IncompleteRecord => {
            StatusCode::CONFLICT
        }
        RecordError::UnknownRole(_) | RecordError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        RecordError::Storage(_) => {
            tracing::error!("storage failure: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}
