//! Axum route handlers for the Workflow API.

use std::sync::Arc;

use axum::{
    extract::{multipart::Field, Multipart, Query, State},
    http::StatusCode,
    Json,
};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::media::InlineImage;
use crate::state::AppState;
use crate::workflow::record::RunInput;
use crate::workflow::stage::Stage;
use crate::workflow::view::{ResultSummary, WorkflowView};

#[derive(Debug, Default, Deserialize)]
pub struct RunParams {
    /// Run inline and answer with the final record instead of `202`.
    #[serde(default)]
    pub wait: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/workflow/run
///
/// Multipart form: `profile_url`, `theme`, optional `image`.
/// Any run already in progress is superseded.
pub async fn handle_run(
    State(state): State<AppState>,
    Query(params): Query<RunParams>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<WorkflowView>), AppError> {
    let input = read_run_form(multipart).await?;
    let driver = Arc::clone(&state.workflow);

    if params.wait {
        // Failures land in the record, which is what the client gets back.
        let _ = driver.run(input, log_progress).await;
        return Ok((StatusCode::OK, Json(driver.snapshot().await.into())));
    }

    let run_id = driver.begin(&input).await;
    let accepted = driver.snapshot().await;
    tokio::spawn(async move {
        let _ = driver.execute(run_id, &input, log_progress).await;
    });

    Ok((StatusCode::ACCEPTED, Json(accepted.into())))
}

/// GET /api/v1/workflow
pub async fn handle_get_workflow(State(state): State<AppState>) -> Json<WorkflowView> {
    Json(state.workflow.snapshot().await.into())
}

/// GET /api/v1/workflow/result
pub async fn handle_get_result(
    State(state): State<AppState>,
) -> Result<Json<ResultSummary>, AppError> {
    let record = state.workflow.snapshot().await;
    ResultSummary::from_record(&record).map(Json).ok_or_else(|| {
        AppError::Conflict(format!(
            "No completed result (workflow is {})",
            record.stage.label()
        ))
    })
}

/// POST /api/v1/workflow/reset
pub async fn handle_reset(State(state): State<AppState>) -> Json<WorkflowView> {
    state.workflow.reset().await;
    Json(state.workflow.snapshot().await.into())
}

// ────────────────────────────────────────────────────────────────────────────
// Form parsing
// ────────────────────────────────────────────────────────────────────────────

fn log_progress(stage: Stage) {
    debug!(
        percent = stage.progress_percent().unwrap_or_default(),
        "Progress: {}",
        stage.label()
    );
}

async fn read_run_form(mut multipart: Multipart) -> Result<RunInput, AppError> {
    let mut profile_url = None;
    let mut theme = None;
    let mut reference_image = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "profile_url" => profile_url = Some(field.text().await.map_err(bad_form)?),
            "theme" => theme = Some(field.text().await.map_err(bad_form)?),
            "image" => reference_image = read_image(field).await?,
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    let profile_url = validate_profile_url(profile_url.as_deref().unwrap_or_default())?;
    let theme = theme.map(|t| t.trim().to_string()).unwrap_or_default();
    if theme.is_empty() {
        return Err(AppError::Validation("theme cannot be empty".to_string()));
    }

    info!(
        has_reference_image = reference_image.is_some(),
        "Run form accepted"
    );
    Ok(RunInput {
        profile_url,
        theme,
        reference_image,
    })
}

/// Reads the optional reference image. A file input left empty arrives as a
/// part with no filename and no bytes; that counts as no image.
async fn read_image(field: Field<'_>) -> Result<Option<InlineImage>, AppError> {
    let has_file_name = field.file_name().is_some_and(|n| !n.is_empty());
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(bad_form)?;

    if bytes.is_empty() {
        if has_file_name {
            return Err(AppError::Validation("image file is empty".to_string()));
        }
        return Ok(None);
    }

    match content_type {
        Some(mime) if mime.starts_with("image/") => Ok(Some(InlineImage::from_bytes(mime, &bytes))),
        Some(mime) => Err(AppError::Validation(format!(
            "image must have an image/* content type, got {mime}"
        ))),
        None => Err(AppError::Validation(
            "image is missing a content type".to_string(),
        )),
    }
}

fn validate_profile_url(raw: &str) -> Result<String, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::Validation("profile_url cannot be empty".to_string()));
    }
    let url = Url::parse(raw)
        .map_err(|e| AppError::Validation(format!("profile_url is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(AppError::Validation(
            "profile_url must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(raw.to_string())
}

fn bad_form(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed form data: {e}"))
}
