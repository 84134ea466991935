//! Submission pipeline: export → encode → transfer.
//!
//! The pipeline is claimed for the whole lifetime of a [`SubmissionRequest`],
//! so a second submission cannot start while one is in flight. The canvas is
//! only read during [`SubmissionPipeline::prepare`]; the transfer carries the
//! encoded bytes alone.

use crate::cache::{ProgressCache, PROGRESS_CURRENT_KEY};
use crate::progress::{parse_submit_response, AccuracyReport};
use crate::session::SessionStore;
use crate::transport::{HttpMethod, Transport, TransportError, TransportResponse, UploadForm, UploadRequest};
use glyphpad_core::canvas::CanvasState;
use glyphpad_render::{ExportError, RasterBuffer, SnapshotExporter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Endpoint receiving drawings.
pub const SUBMIT_PATH: &str = "/progress";
/// Multipart field carrying the image.
pub const UPLOAD_FIELD: &str = "file";
/// Filename announced for the image.
pub const UPLOAD_FILENAME: &str = "image.png";
/// Message shown for every failure without a server-provided reason.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something Went Wrong";

/// Submission errors.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),
    #[error("Session expired")]
    AuthExpired,
    #[error("Server returned status {0}")]
    Status(u16),
    #[error("Submission rejected: {0}")]
    Rejected(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("A submission is already in flight")]
    InFlight,
}

impl SubmissionError {
    /// Text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Rejected(message) if !message.is_empty() => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Result type for submission operations.
pub type SubmissionResult<T> = Result<T, SubmissionError>;

/// Map auth failures and non-2xx statuses to errors, returning the body.
///
/// A 401/403 clears the stored session token.
pub(crate) fn check_status(
    session: &dyn SessionStore,
    response: TransportResponse,
) -> SubmissionResult<Vec<u8>> {
    match response.status {
        401 | 403 => {
            log::warn!("Session expired (status {}), clearing token", response.status);
            if let Err(e) = session.clear_token() {
                log::error!("Failed to clear session token: {}", e);
            }
            Err(SubmissionError::AuthExpired)
        }
        _ if response.is_success() => Ok(response.body),
        status => Err(SubmissionError::Status(status)),
    }
}

/// Releases the pipeline when dropped.
#[derive(Debug)]
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// An encoded drawing, ready to transfer.
#[derive(Debug)]
pub struct SubmissionRequest {
    form: UploadForm,
    _guard: InFlightGuard,
}

impl SubmissionRequest {
    /// The multipart form that will be sent.
    pub fn form(&self) -> &UploadForm {
        &self.form
    }
}

/// Sends drawings to the scoring service.
#[derive(Clone)]
pub struct SubmissionPipeline {
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionStore>,
    cache: Arc<dyn ProgressCache>,
    method: HttpMethod,
    in_flight: Arc<AtomicBool>,
}

impl SubmissionPipeline {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionStore>,
        cache: Arc<dyn ProgressCache>,
    ) -> Self {
        Self {
            transport,
            session,
            cache,
            method: HttpMethod::default(),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set the HTTP method used for uploads.
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Check if a submission is between `prepare` and the end of `transfer`.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn claim(&self) -> SubmissionResult<InFlightGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SubmissionError::InFlight)?;
        Ok(InFlightGuard(self.in_flight.clone()))
    }

    /// Export and encode `canvas`, claiming the pipeline.
    ///
    /// A missing surface fails here, before any network activity.
    pub fn prepare(
        &self,
        exporter: &SnapshotExporter,
        canvas: &CanvasState,
    ) -> SubmissionResult<SubmissionRequest> {
        let guard = self.claim()?;

        let buffer = match exporter.export(canvas) {
            Ok(buffer) => buffer,
            Err(ExportError::EmptyExport) => return Err(ExportError::EmptyExport.into()),
            Err(e) => {
                self.cache.invalidate(PROGRESS_CURRENT_KEY);
                return Err(e.into());
            }
        };

        let form = match Self::encode(buffer) {
            Ok(form) => form,
            Err(e) => {
                self.cache.invalidate(PROGRESS_CURRENT_KEY);
                return Err(e);
            }
        };

        Ok(SubmissionRequest {
            form,
            _guard: guard,
        })
    }

    /// Wrap the raster buffer in the upload form.
    fn encode(buffer: RasterBuffer) -> SubmissionResult<UploadForm> {
        if buffer.is_empty() {
            return Err(ExportError::Encode("snapshot is empty".to_string()).into());
        }
        let mime_type = buffer.mime_type().to_string();
        Ok(UploadForm {
            field: UPLOAD_FIELD.to_string(),
            filename: UPLOAD_FILENAME.to_string(),
            mime_type,
            bytes: buffer.into_bytes(),
        })
    }

    /// Send a prepared request and interpret the response.
    ///
    /// The progress cache is invalidated whatever the outcome.
    pub async fn transfer(&self, request: SubmissionRequest) -> SubmissionResult<AccuracyReport> {
        let SubmissionRequest { form, _guard } = request;
        log::info!("Submitting drawing ({} bytes)", form.bytes.len());

        let upload = UploadRequest {
            method: self.method,
            path: SUBMIT_PATH.to_string(),
            bearer: self.session.token(),
            form,
        };

        let outcome = match self.transport.upload(upload).await {
            Ok(response) => check_status(self.session.as_ref(), response)
                .and_then(|body| parse_submit_response(&body)),
            Err(e) => Err(e.into()),
        };

        self.cache.invalidate(PROGRESS_CURRENT_KEY);

        match &outcome {
            Ok(report) => log::info!("Submission scored: {:?}", report.accuracy),
            Err(e) => log::error!("Submission failed: {}", e),
        }
        outcome
    }
}
