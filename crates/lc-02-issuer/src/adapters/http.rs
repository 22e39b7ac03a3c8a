//! # HTTP Adapter
//!
//! axum router over any [`IssuerApi`]. Every non-2xx response carries an
//! [`ErrorBody`]; extractor rejections are mapped into the same shape
//! (415 for a missing JSON content type, 400 for everything else).

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use lc_01_lease_store::LeaseQuery;
use lease_types::{
    CheckinRequest, CheckinResponse, ErrorBody, GrantRequest, IndexBody, LeaseId, LeaseStatus,
    LeaseView, ListLeasesParams, PatchLeaseRequest,
};
use tower_http::trace::TraceLayer;

use crate::domain::errors::IssuerError;
use crate::ports::inbound::IssuerApi;

type SharedApi = Arc<dyn IssuerApi>;

/// Build the issuer router.
pub fn router(api: SharedApi) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/licenses", post(grant).get(list))
        .route(
            "/licenses/:id",
            get(get_lease).patch(patch_lease).delete(delete_lease),
        )
        .route("/licenses/:id/checkin", post(checkin))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(api)
}

/// Error rendered as `{status, error, message}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<IssuerError> for ApiError {
    fn from(err: IssuerError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.kind(), err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::UNSUPPORTED_MEDIA_TYPE {
            Self::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_media_type",
                rejection.body_text(),
            )
        } else {
            Self::bad_request(rejection.body_text())
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status: self.status.as_u16(),
            error: self.kind.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

async fn index() -> Json<IndexBody> {
    Json(IndexBody {
        name: "lease-issuer".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        paths: "/licenses".to_string(),
    })
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "lease-issuer",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn metrics() -> Result<Response, ApiError> {
    let text = lease_telemetry::encode_metrics().map_err(|e| {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "metrics_error",
            e.to_string(),
        )
    })?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        text,
    )
        .into_response())
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not_found", "no such route")
}

async fn grant(
    State(api): State<SharedApi>,
    body: Result<Json<GrantRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;
    let view = api.grant(request).await?;
    let location = format!("/licenses/{}", view.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(view)).into_response())
}

async fn list(
    State(api): State<SharedApi>,
    params: Result<Query<ListLeasesParams>, QueryRejection>,
) -> Result<Json<Vec<LeaseView>>, ApiError> {
    let Query(params) = params?;

    let mut query = LeaseQuery::all();
    if let Some(owner) = params.owner {
        query = query.with_owner(owner);
    }
    if let Some(holder) = params.holder {
        query = query.with_holder(holder);
    }
    if let Some(raw) = params.status.as_deref() {
        let status =
            LeaseStatus::from_query_value(raw).map_err(|e| ApiError::bad_request(e.to_string()))?;
        query = query.with_status(status);
    }

    Ok(Json(api.list(query).await?))
}

async fn get_lease(
    State(api): State<SharedApi>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<LeaseView>, ApiError> {
    let Path(id) = id?;
    Ok(Json(api.get(LeaseId(id)).await?))
}

async fn patch_lease(
    State(api): State<SharedApi>,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<PatchLeaseRequest>, JsonRejection>,
) -> Result<Json<LeaseView>, ApiError> {
    let Path(id) = id?;
    let Json(request) = body?;
    Ok(Json(api.patch(LeaseId(id), request).await?))
}

async fn delete_lease(
    State(api): State<SharedApi>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<LeaseView>, ApiError> {
    let Path(id) = id?;
    Ok(Json(api.delete(LeaseId(id)).await?))
}

async fn checkin(
    State(api): State<SharedApi>,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<CheckinRequest>, JsonRejection>,
) -> Result<Json<CheckinResponse>, ApiError> {
    let Path(id) = id?;
    let Json(request) = body?;

    // Undecodable hex still goes through the holder and status checks first.
    let decoded = request.ciphertext_bytes();
    let ciphertext = decoded.as_deref().unwrap_or_default();

    match api.checkin(LeaseId(id), &request.holder, ciphertext).await {
        Ok(echo) => Ok(Json(CheckinResponse::new(&echo))),
        Err(IssuerError::BadRequest(_)) if decoded.is_err() => {
            Err(ApiError::bad_request("ciphertext is not valid hex"))
        }
        Err(e) => Err(e.into()),
    }
}
