//! Scoring results and the "current progress" query.

use crate::cache::{QueryCache, PROGRESS_CURRENT_KEY};
use crate::session::SessionStore;
use crate::submission::{check_status, SubmissionError, SubmissionResult};
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Endpoint returning the character the user is currently practicing.
pub const CURRENT_PROGRESS_PATH: &str = "/progress/current";

/// Result of one scored submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccuracyReport {
    /// Score returned by the scoring service.
    pub accuracy: Option<f64>,
    /// Human-readable message from the server.
    pub message: Option<String>,
}

impl AccuracyReport {
    /// Text shown to the user after a successful submission.
    pub fn success_message(&self) -> String {
        if let Some(message) = self.message.as_deref().filter(|m| !m.is_empty()) {
            return message.to_string();
        }
        match self.accuracy {
            Some(accuracy) => {
                format!("You have successfully submitted the drawing with accuracy: {accuracy}")
            }
            None => "Submitted Successfully".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SubmitResponse {
    message: Option<String>,
    status: Option<bool>,
    accuracy: Option<f64>,
    data: Option<SubmitData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SubmitData {
    accuracy: Option<f64>,
    message: Option<String>,
}

/// Interpret the body of a 2xx submission response.
///
/// Bodies that are not the expected JSON shape count as an opaque success.
/// An explicit `"status": false` is a rejection.
pub fn parse_submit_response(body: &[u8]) -> SubmissionResult<AccuracyReport> {
    let response: SubmitResponse = match serde_json::from_slice(body) {
        Ok(response) => response,
        Err(e) => {
            log::debug!("Treating unrecognized submission response as success: {}", e);
            return Ok(AccuracyReport::default());
        }
    };

    let data = response.data.unwrap_or_default();
    let message = response.message.or(data.message);

    if response.status == Some(false) {
        return Err(SubmissionError::Rejected(message.unwrap_or_default()));
    }

    Ok(AccuracyReport {
        accuracy: response.accuracy.or(data.accuracy),
        message,
    })
}

/// The character the user is practicing and their last attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentProgress {
    /// Character to draw.
    #[serde(rename = "char")]
    pub character: String,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Time of the last attempt.
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentProgressEnvelope {
    data: CurrentProgress,
}

/// Fetches the current progress, serving it from the cache while fresh.
#[derive(Clone)]
pub struct ProgressService {
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionStore>,
    cache: Arc<QueryCache<CurrentProgress>>,
}

impl ProgressService {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionStore>,
        cache: Arc<QueryCache<CurrentProgress>>,
    ) -> Self {
        Self {
            transport,
            session,
            cache,
        }
    }

    /// The cache shared with the submission pipeline.
    pub fn cache(&self) -> &Arc<QueryCache<CurrentProgress>> {
        &self.cache
    }

    /// Current progress, refetched when the cached copy is stale or invalidated.
    pub async fn current(&self) -> SubmissionResult<CurrentProgress> {
        if let Some(progress) = self.cache.get_fresh(PROGRESS_CURRENT_KEY) {
            return Ok(progress);
        }

        let response = self
            .transport
            .get(CURRENT_PROGRESS_PATH, self.session.token())
            .await?;
        let body = check_status(self.session.as_ref(), response)?;
        let envelope: CurrentProgressEnvelope = serde_json::from_slice(&body)
            .map_err(|e| SubmissionError::InvalidResponse(e.to_string()))?;

        self.cache.insert(PROGRESS_CURRENT_KEY, envelope.data.clone());
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_accuracy() {
        let report = parse_submit_response(br#"{"status":true,"data":{"accuracy":87}}"#).unwrap();
        assert_eq!(report.accuracy, Some(87.0));
        assert_eq!(
            report.success_message(),
            "You have successfully submitted the drawing with accuracy: 87"
        );
    }

    #[test]
    fn test_parse_top_level_accuracy_and_message() {
        let report = parse_submit_response(br#"{"message":"Nice!","accuracy":55.5}"#).unwrap();
        assert_eq!(report.accuracy, Some(55.5));
        assert_eq!(report.success_message(), "Nice!");
    }

    #[test]
    fn test_parse_opaque_body() {
        let report = parse_submit_response(b"OK").unwrap();
        assert_eq!(report, AccuracyReport::default());
        assert_eq!(report.success_message(), "Submitted Successfully");
    }

    #[test]
    fn test_parse_rejection() {
        let err = parse_submit_response(br#"{"status":false,"message":"Try again"}"#).unwrap_err();
        assert!(matches!(err, SubmissionError::Rejected(ref m) if m == "Try again"));
        assert_eq!(err.user_message(), "Try again");
    }

    #[test]
    fn test_current_progress_envelope() {
        let body = br#"{"data":{"id":3,"char":"A","accuracy":72,"completed":"false","updatedAt":"2024-05-01T10:00:00Z"}}"#;
        let envelope: CurrentProgressEnvelope = serde_json::from_slice(body).unwrap();
        assert_eq!(envelope.data.character, "A");
        assert_eq!(envelope.data.accuracy, Some(72.0));
        assert_eq!(envelope.data.updated_at.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert!(envelope.data.image.is_none());
    }
}
