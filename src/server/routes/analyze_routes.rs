//! Transcript analysis routes
//!
//! Both endpoints normalize their input first, so invalid transcripts and
//! disallowed uploads never reach the pipeline.

use std::time::Instant;

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    Json,
};
use uuid::Uuid;

use crate::config::ConfigError;
use crate::input::{check_extension, decode_upload, normalize_transcript, ValidationError};
use crate::models::{AnalysisRequest, AnalysisResult, ProductType, Stage};
use crate::server::error::ApiError;
use crate::server::ServerAppState;

/// `POST /analyze` with a JSON body
pub async fn analyze_handler(
    State(state): State<ServerAppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        log::warn!("Rejected /analyze body: {}", rejection.body_text());
        ApiError::from_json_rejection(rejection)
    })?;

    let transcript = normalize_transcript(&request.transcript).map_err(reject)?;

    run_analysis(
        &state,
        transcript,
        request.product_type.unwrap_or_default(),
        request.stage.unwrap_or_default(),
    )
    .await
    .map(Json)
}

/// `POST /analyze-file` with a multipart body (`file`, `product_type`, `stage`)
pub async fn analyze_file_handler(
    State(state): State<ServerAppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        log::warn!("Rejected /analyze-file body: {}", rejection.body_text());
        ApiError::from_multipart_rejection(rejection)
    })?;

    let mut transcript = None;
    let mut product_type = None;
    let mut stage = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(ApiError::from_multipart_error)?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                // Extension is checked before the body is read
                check_extension(&filename).map_err(reject)?;
                let bytes = field.bytes().await.map_err(ApiError::from_multipart_error)?;
                transcript = Some(decode_upload(&filename, &bytes).map_err(reject)?);
            }
            Some("product_type") => {
                let text = field.text().await.map_err(ApiError::from_multipart_error)?;
                product_type = parse_form_field::<ProductType>("product_type", &text)?;
            }
            Some("stage") => {
                let text = field.text().await.map_err(ApiError::from_multipart_error)?;
                stage = parse_form_field::<Stage>("stage", &text)?;
            }
            other => {
                log::debug!("Ignoring unexpected multipart field {:?}", other);
            }
        }
    }

    let transcript = transcript.ok_or(ValidationError::MissingFile).map_err(reject)?;

    run_analysis(
        &state,
        transcript,
        product_type.unwrap_or_default(),
        stage.unwrap_or_default(),
    )
    .await
    .map(Json)
}

/// Blank form fields fall back to the default
fn parse_form_field<T>(field: &str, text: &str) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr<Err = String>,
{
    if text.trim().is_empty() {
        return Ok(None);
    }
    text.parse::<T>().map(Some).map_err(|message| {
        reject(ValidationError::InvalidField {
            field: field.to_string(),
            message,
        })
    })
}

fn reject(err: ValidationError) -> ApiError {
    log::warn!("Validation failed: {}", err);
    ApiError::from(err)
}

/// Shared tail of both endpoints: run the pipeline and wrap the report
async fn run_analysis(
    state: &ServerAppState,
    transcript: String,
    product_type: ProductType,
    stage: Stage,
) -> Result<AnalysisResult, ApiError> {
    let pipeline = match (&state.pipeline, state.openai_configured()) {
        (Some(pipeline), true) => pipeline,
        _ => {
            log::error!("Analysis requested but no OpenAI credential is configured");
            return Err(ConfigError::MissingCredential.into());
        }
    };

    let request_id = Uuid::new_v4();
    let transcript_chars = transcript.chars().count();
    log::info!(
        "[{}] Analyzing transcript ({} chars, {}, {})",
        request_id,
        transcript_chars,
        product_type,
        stage
    );

    let started = Instant::now();
    match pipeline
        .run_detached(transcript.clone(), product_type, stage)
        .await
    {
        Ok(output) => {
            log::info!(
                "[{}] Analysis finished in {:.1}s ({} chars)",
                request_id,
                started.elapsed().as_secs_f32(),
                output.report.len()
            );
            Ok(AnalysisResult::new(
                output.report,
                product_type,
                stage,
                &transcript,
            ))
        }
        Err(err) => {
            log::error!(
                "[{}] Analysis failed after {:.1}s: {}",
                request_id,
                started.elapsed().as_secs_f32(),
                err
            );
            Err(err.into())
        }
    }
}
