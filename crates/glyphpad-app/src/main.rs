//! Command-line entry point: replay a drawing script, export it and
//! optionally submit it for scoring.

#[cfg(feature = "native")]
mod cli {
    use clap::Parser;
    use glyphpad_app::config::ENV_TOKEN;
    use glyphpad_app::{
        AppConfig, ConfigError, CurrentProgress, DrawingScreen, FileSession, HttpTransport,
        LogNotifier, MemorySession, NotificationKind, ProgressService, QueryCache, SessionStore,
        SubmissionPipeline, TransportError,
    };
    use glyphpad_core::InputEvent;
    use glyphpad_render::ExportError;
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;
    use std::sync::Arc;
    use thiserror::Error;

    #[derive(Debug, Parser)]
    #[command(name = "glyphpad", version, about = "Replay a drawing and submit it for scoring")]
    pub struct Args {
        /// JSON file with the input events to replay.
        script: PathBuf,

        /// Write the exported PNG here.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Submit the drawing to the scoring service.
        #[arg(long)]
        submit: bool,

        /// Print the character currently being practiced.
        #[arg(long)]
        progress: bool,

        /// JSON config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the API base URL.
        #[arg(long)]
        base_url: Option<String>,

        /// Bearer token (otherwise read from the environment or the token file).
        #[arg(long)]
        token: Option<String>,
    }

    #[derive(Debug, Error)]
    pub enum CliError {
        #[error(transparent)]
        Config(#[from] ConfigError),
        #[error("Failed to start HTTP client: {0}")]
        Transport(#[from] TransportError),
        #[error("Failed to export drawing: {0}")]
        Export(#[from] ExportError),
        #[error("Invalid script: {0}")]
        Script(String),
        #[error("IO error: {0}")]
        Io(String),
    }

    fn load_config(args: &Args) -> Result<AppConfig, CliError> {
        let mut config = match &args.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        config.apply_env()?;
        if let Some(url) = &args.base_url {
            config.base_url = url.clone();
        }
        Ok(config)
    }

    fn open_session(args: &Args) -> Arc<dyn SessionStore> {
        let explicit = args
            .token
            .clone()
            .or_else(|| std::env::var(ENV_TOKEN).ok())
            .filter(|t| !t.is_empty());
        if let Some(token) = explicit {
            return Arc::new(MemorySession::with_token(token));
        }
        match FileSession::default_location() {
            Ok(session) => {
                log::debug!("Reading token from {}", session.path().display());
                Arc::new(session)
            }
            Err(e) => {
                log::warn!("No token file available: {}", e);
                Arc::new(MemorySession::new())
            }
        }
    }

    fn read_script(path: &Path) -> Result<Vec<InputEvent>, CliError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&json).map_err(|e| CliError::Script(e.to_string()))
    }

    pub async fn run(args: Args) -> Result<ExitCode, CliError> {
        let config = load_config(&args)?;
        let events = read_script(&args.script)?;

        let session = open_session(&args);
        let transport = Arc::new(HttpTransport::new(
            config.base_url.clone(),
            config.request_timeout(),
        )?);
        let cache = Arc::new(QueryCache::<CurrentProgress>::new(config.progress_stale_time()));
        let pipeline = SubmissionPipeline::new(transport.clone(), session.clone(), cache.clone())
            .with_method(config.submit_method);
        let progress = ProgressService::new(transport, session, cache);
        let mut screen =
            DrawingScreen::from_config(&config, pipeline, progress, Arc::new(LogNotifier))?;

        log::info!("Replaying {} events", events.len());
        for event in events {
            screen.handle_event(event).await;
        }
        log::info!("Canvas holds {} strokes", screen.canvas().len());

        if let Some(output) = &args.output {
            let snapshot = screen.export_snapshot()?;
            std::fs::write(output, snapshot.bytes())
                .map_err(|e| CliError::Io(format!("Failed to write {}: {}", output.display(), e)))?;
            log::info!(
                "Wrote {}x{} snapshot to {}",
                snapshot.width(),
                snapshot.height(),
                output.display()
            );
        }

        if args.progress {
            match screen.load_current_progress().await {
                Ok(current) => println!("Current character: {}", current.character),
                Err(e) => log::error!("Could not load progress: {}", e),
            }
        }

        if args.submit {
            screen.submit().await;
            if let Some(notification) = screen.last_notification() {
                println!("{}", notification.message);
                if notification.kind == NotificationKind::Error {
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(feature = "native")]
#[tokio::main]
async fn main() -> std::process::ExitCode {
    use clap::Parser;

    env_logger::init();
    let args = cli::Args::parse();
    match cli::run(args).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
