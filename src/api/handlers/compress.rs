use crate::AppState;
use crate::api::error::AppError;
use crate::models::{CompressedArtifact, UploadedFile};
use crate::services::pipeline::PipelineStage;
use crate::services::storage::{StorageError, UPLOAD_PREFIX};
use crate::utils::validation::sanitize_filename;
use axum::{
    body::Body,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::{StreamExt, TryStreamExt};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::debug;

/// Multipart field carrying the upload
const FILE_FIELD: &str = "file";

#[utoipa::path(
    post,
    path = "/compress",
    request_body(content = String, description = "Multipart form with a single `file` field", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Compressed artifact streamed as an attachment"),
        (status = 400, description = "No file, unsupported type, invalid PDF or upload too large"),
        (status = 500, description = "Compression failed")
    ),
    tag = "compress"
)]
pub async fn compress_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        AppError::BadRequest(format!(
            "Expected a multipart/form-data upload: {}",
            rejection.body_text()
        ))
    })?;

    let upload = receive_upload(&state, &mut multipart)
        .await?
        .ok_or(AppError::NoFile)?;

    let artifact = state.pipeline.run(upload).await?;
    artifact_response(artifact).await
}

/// Streams the `file` field into the Storage Area.
///
/// The staged file gets a random name and is deleted on drop, so a failed
/// or oversized write never leaves anything behind. The client's name only
/// travels alongside it.
async fn receive_upload(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<Option<UploadedFile>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = sanitize_filename(field.file_name().unwrap_or("unnamed"));
        let staged = state
            .storage
            .allocate(UPLOAD_PREFIX, "")
            .map_err(storage_error)?;

        let body_with_io_error = field.map_err(std::io::Error::other);
        let reader = StreamReader::new(body_with_io_error);

        let size = state
            .storage
            .write_stream(&staged, Box::new(reader), state.config.max_file_size)
            .await
            .map_err(storage_error)?;

        return Ok(Some(UploadedFile::new(staged, original_name, size)));
    }

    Ok(None)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(format!("Malformed upload: {}", err.body_text()))
    }
}

fn storage_error(err: StorageError) -> AppError {
    match err {
        StorageError::TooLarge { limit } => {
            AppError::PayloadTooLarge(format!("maximum upload size is {} bytes", limit))
        }
        StorageError::Io(e) => {
            // Errors from the request body arrive wrapped in io::Error
            let inner = e
                .get_ref()
                .and_then(|inner| inner.downcast_ref::<MultipartError>());
            match inner {
                Some(m) if m.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                    AppError::PayloadTooLarge(m.body_text())
                }
                Some(m) => AppError::BadRequest(format!("Malformed upload: {}", m.body_text())),
                None => AppError::Internal(format!("Failed to stage upload: {}", e.kind())),
            }
        }
    }
}

/// Builds the attachment response. The artifact's guard travels with the
/// body stream and deletes the file when the body finishes or is dropped.
async fn artifact_response(artifact: CompressedArtifact) -> Result<Response, AppError> {
    let file = tokio::fs::File::open(artifact.path())
        .await
        .map_err(|e| AppError::Internal(format!("Failed to open artifact: {}", e.kind())))?;

    let CompressedArtifact {
        file: guard,
        download_name,
        content_type,
        size,
    } = artifact;

    debug!(stage = ?PipelineStage::Streaming, file = %download_name, size);
    // Dropping the guard unlinks the artifact synchronously on whichever
    // runtime thread drops the body, including after a disconnect
    let body_stream = async_stream::stream! {
        let _guard = guard;
        let mut chunks = ReaderStream::new(file);
        while let Some(chunk) = chunks.next().await {
            yield chunk;
        }
        debug!(stage = ?PipelineStage::Done, "Artifact fully sent");
    };

    let headers = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (header::CONTENT_DISPOSITION, content_disposition(&download_name)),
        (header::CONTENT_LENGTH, size.to_string()),
    ];

    Ok((headers, Body::from_stream(body_stream)).into_response())
}

/// `attachment` disposition with an ASCII fallback name plus the exact
/// UTF-8 name.
pub(crate) fn content_disposition(filename: &str) -> String {
    let ascii_filename = filename
        .chars()
        .filter(|c| c.is_ascii() && !c.is_control() && *c != '"' && *c != '\\' && *c != ';')
        .collect::<String>();
    let fallback_filename = if ascii_filename.is_empty() {
        "file"
    } else {
        &ascii_filename
    };

    let encoded_filename = utf8_percent_encode(filename, NON_ALPHANUMERIC).to_string();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback_filename, encoded_filename
    )
}
