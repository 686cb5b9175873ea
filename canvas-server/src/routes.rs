//! API route handlers.
//!
//! Success bodies are `{ "message", "data" }`; failures are `{ "message" }`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use canvas_core::{codec, Document, MarkupBundle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics;
use crate::templates::{StoreError, Template};
use crate::validation::{self, ValidationError};
use crate::AppState;

/// Success envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Human-readable outcome.
    pub message: String,
    /// Payload.
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn new(message: &str, data: T) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            data,
        })
    }
}

/// Create/update request body. Missing fields read as empty.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TemplateRequest {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Page markup.
    #[serde(default)]
    pub html: String,
    /// Page stylesheet.
    #[serde(default)]
    pub css: String,
}

/// Errors returned by the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The request body was not the expected JSON.
    #[error("Invalid request body: {0}")]
    BadBody(String),
    /// No template with that id.
    #[error("Template not found")]
    NotFound(String),
    /// Storage failed.
    #[error("{0}")]
    Storage(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Invalid(e) => Self::Validation(e),
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(e) => {
                metrics::record_validation_failure(e.kind());
                StatusCode::BAD_REQUEST
            }
            Self::BadBody(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(id) => {
                tracing::debug!("Template {id} not found");
                StatusCode::NOT_FOUND
            }
            Self::Storage(e) => {
                tracing::error!("Template storage failed: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "message": self.to_string() }))).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

fn recorded<T>(operation: &str, result: ApiResult<T>) -> ApiResult<T> {
    metrics::record_template_operation(operation, result.is_ok());
    result
}

fn checked_id(id: &str) -> ApiResult<()> {
    validation::validate_template_id(id).map_err(ApiError::from)
}

/// Service banner.
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "server is running..." }))
}

/// `POST /api/templates`
#[tracing::instrument(name = "create_template", skip(state, body))]
pub async fn create_template(
    State(state): State<AppState>,
    body: Result<Json<TemplateRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Template>>)> {
    let result = body.map_err(ApiError::from).and_then(|Json(request)| {
        state
            .templates
            .create(&request.name, &request.html, &request.css)
            .map_err(ApiError::from)
    });
    let template = recorded("create", result)?;
    metrics::set_templates_stored(state.templates.len());
    tracing::info!("Template {} created", template.id);
    Ok((
        StatusCode::CREATED,
        ApiResponse::new("Template created successfully", template),
    ))
}

/// `GET /api/templates`
#[tracing::instrument(name = "list_templates", skip(state))]
pub async fn list_templates(State(state): State<AppState>) -> Json<ApiResponse<Vec<Template>>> {
    metrics::record_template_operation("list", true);
    ApiResponse::new("Templates fetched successfully", state.templates.list())
}

/// `GET /api/templates/{id}`
#[tracing::instrument(name = "get_template", skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Template>>> {
    let template = recorded("get", find(&state, &id))?;
    Ok(ApiResponse::new("Template fetched successfully", template))
}

/// `PUT /api/templates/{id}`
#[tracing::instrument(name = "update_template", skip(state, body))]
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<TemplateRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<Template>>> {
    let result = checked_id(&id)
        .and_then(|()| body.map_err(ApiError::from))
        .and_then(|Json(request)| {
            state
                .templates
                .update(&id, &request.name, &request.html, &request.css)
                .map_err(ApiError::from)
        });
    let template = recorded("update", result)?;
    Ok(ApiResponse::new("Template updated successfully", template))
}

/// `DELETE /api/templates/{id}`
#[tracing::instrument(name = "delete_template", skip(state))]
pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Template>>> {
    let result = checked_id(&id).and_then(|()| state.templates.delete(&id).map_err(ApiError::from));
    let template = recorded("delete", result)?;
    metrics::set_templates_stored(state.templates.len());
    tracing::info!("Template {id} deleted");
    Ok(ApiResponse::new("Template deleted successfully", template))
}

/// `GET /api/templates/{id}/document`
///
/// Parses the stored markup into the editor's document model.
#[tracing::instrument(name = "template_document", skip(state))]
pub async fn template_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Document>>> {
    let template = recorded("document", find(&state, &id))?;
    let bundle = template.bundle();
    let document = metrics::time_codec("parse", || bundle.to_document());
    tracing::debug!(
        "Parsed template {id} into {} pages, {} elements",
        document.page_count(),
        document.element_count()
    );
    Ok(ApiResponse::new("Template parsed successfully", document))
}

/// `POST /api/render`
///
/// Serializes a document into its markup pair.
#[tracing::instrument(name = "render_document", skip(body))]
pub async fn render_document(
    body: Result<Json<Document>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<MarkupBundle>>> {
    let Json(document) = body?;
    let bundle = metrics::time_codec("serialize", || codec::serialize(&document));
    Ok(ApiResponse::new("Document rendered successfully", bundle))
}

fn find(state: &AppState, id: &str) -> ApiResult<Template> {
    checked_id(id)?;
    state
        .templates
        .get(id)
        .ok_or_else(|| ApiError::NotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_fields_default_to_empty() {
        let request: TemplateRequest =
            serde_json::from_str(r#"{"name":"Landing"}"#).expect("should deserialize");
        assert_eq!(request.name, "Landing");
        assert!(request.html.is_empty());
        assert!(request.css.is_empty());
    }

    #[test]
    fn test_store_errors_map_to_api_errors() {
        assert!(matches!(
            ApiError::from(StoreError::NotFound("x".into())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(StoreError::Invalid(ValidationError::NameRequired)),
            ApiError::Validation(ValidationError::NameRequired)
        ));
        assert!(matches!(
            ApiError::from(StoreError::Serialization("bad".into())),
            ApiError::Storage(_)
        ));
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (ApiError::Validation(ValidationError::HtmlRequired), StatusCode::BAD_REQUEST),
            (ApiError::BadBody("eof".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Storage("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_envelope_shape() {
        let Json(envelope) = ApiResponse::new("ok", 5);
        let json = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(json, serde_json::json!({ "message": "ok", "data": 5 }));
    }
}
