//! glyphpad Application
//!
//! The drawing screen and everything it talks to: configuration, the
//! submission pipeline, the HTTP transport, session storage, the progress
//! query cache and user notifications.

pub mod cache;
pub mod config;
pub mod notify;
pub mod progress;
pub mod screen;
pub mod session;
pub mod submission;
pub mod transport;

pub use cache::{ProgressCache, QueryCache, PROGRESS_CURRENT_KEY};
pub use config::{AppConfig, ConfigError, ConfigResult};
pub use notify::{LogNotifier, Notification, NotificationKind, Notifier};
pub use progress::{AccuracyReport, CurrentProgress, ProgressService};
pub use screen::DrawingScreen;
pub use session::{FileSession, MemorySession, SessionError, SessionStore};
pub use submission::{SubmissionError, SubmissionPipeline, SubmissionRequest, SubmissionResult};
pub use transport::{HttpMethod, HttpTransport, Transport, TransportError};
