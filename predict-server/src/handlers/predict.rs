//! Prediction handlers

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    Json,
};

use crate::{AppState, AppError, AppResult};
use crate::inference::FeatureVector;
use crate::models::{BatchPredictionResponse, PredictionResponse};

/// Multipart field carrying the uploaded CSV
pub const UPLOAD_FIELD: &str = "file";

/// Predict one record and explain it
pub async fn single(
    State(state): State<AppState>,
    payload: Result<Json<FeatureVector>, JsonRejection>,
) -> AppResult<Json<PredictionResponse>> {
    let Json(features) = payload
        .map_err(|rejection| AppError::ValidationError(rejection.body_text()))?;

    let result = state.service.predict_single(&features);

    tracing::debug!(
        prediction = %result.diagnosis,
        probability = result.probability,
        "Single prediction"
    );

    Ok(Json(result.into()))
}

/// Annotate an uploaded CSV with predictions
pub async fn batch(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<BatchPredictionResponse>> {
    let mut multipart = multipart
        .map_err(|rejection| AppError::ValidationError(rejection.body_text()))?;

    let (file_name, content) = read_upload(&mut multipart)
        .await?
        .ok_or_else(|| AppError::ValidationError("No file uploaded".to_string()))?;

    tracing::info!("Received batch file: {} ({} bytes)", file_name, content.len());

    let service = state.service.clone();
    let batch_pred = tokio::task::spawn_blocking(move || service.predict_batch_csv(&content))
        .await??;

    Ok(Json(BatchPredictionResponse { batch_pred }))
}

/// First part named `file`, or failing that the first part with a file name
async fn read_upload(multipart: &mut Multipart) -> AppResult<Option<(String, Bytes)>> {
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some(UPLOAD_FIELD) && field.file_name().is_none() {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload.csv").to_string();
        let data = field.bytes().await.map_err(upload_error)?;
        return Ok(Some((file_name, data)));
    }

    Ok(None)
}

fn upload_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::ValidationError(err.body_text())
    }
}
