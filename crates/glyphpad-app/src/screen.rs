//! The drawing screen: routes input to the canvas and drives submissions.

use crate::config::{AppConfig, ConfigResult};
use crate::notify::{Notification, Notifier};
use crate::progress::{AccuracyReport, CurrentProgress, ProgressService};
use crate::submission::{SubmissionError, SubmissionPipeline, SubmissionRequest, SubmissionResult};
use glyphpad_core::{Button, CanvasState, GestureController, HistoryStack, InputEvent, PathBuilder};
use glyphpad_render::{ExportResult, RasterBuffer, RenderContext, SnapshotExporter};
use kurbo::{Point, Size};
use std::sync::Arc;

/// One drawing session.
///
/// The canvas and its undo history are never touched by a submission: a
/// failed submit leaves the drawing exactly as it was.
pub struct DrawingScreen {
    controller: GestureController,
    exporter: SnapshotExporter,
    pipeline: SubmissionPipeline,
    progress: ProgressService,
    notifier: Arc<dyn Notifier>,
    last_report: Option<AccuracyReport>,
    last_notification: Option<Notification>,
}

impl DrawingScreen {
    pub fn new(
        controller: GestureController,
        exporter: SnapshotExporter,
        pipeline: SubmissionPipeline,
        progress: ProgressService,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            controller,
            exporter,
            pipeline,
            progress,
            notifier,
            last_report: None,
            last_notification: None,
        }
    }

    /// Build a screen whose pen, history and surface follow `config`.
    ///
    /// The export surface is attached at the configured canvas size.
    pub fn from_config(
        config: &AppConfig,
        pipeline: SubmissionPipeline,
        progress: ProgressService,
        notifier: Arc<dyn Notifier>,
    ) -> ConfigResult<Self> {
        let builder = PathBuilder::new().with_color(config.stroke_color()?);
        let history = match config.history_limit {
            Some(limit) => HistoryStack::with_capacity_limit(limit),
            None => HistoryStack::new(),
        };
        let controller = GestureController::new()
            .with_builder(builder)
            .with_history(history)
            .with_min_distance(config.min_move_distance);

        let mut exporter =
            SnapshotExporter::with_context(RenderContext::new().with_stroke_width(config.stroke_width));
        exporter.attach_surface(config.canvas_size());

        Ok(Self::new(controller, exporter, pipeline, progress, notifier))
    }

    /// The canvas surface was laid out (or resized).
    pub fn layout(&mut self, size: Size) {
        self.exporter.attach_surface(size);
    }

    /// The canvas surface went away.
    pub fn unmount(&mut self) {
        self.exporter.detach_surface();
    }

    pub fn pointer_start(&mut self, point: Point) -> bool {
        self.controller.pointer_start(point)
    }

    pub fn pointer_move(&mut self, point: Point) -> bool {
        self.controller.pointer_move(point)
    }

    pub fn pointer_end(&mut self) -> bool {
        self.controller.pointer_end().is_some()
    }

    pub fn clear(&mut self) -> bool {
        self.controller.clear()
    }

    pub fn undo(&mut self) -> bool {
        self.controller.undo()
    }

    /// Route one inbound event.
    pub async fn handle_event(&mut self, event: InputEvent) {
        if let Some(pointer) = event.pointer() {
            self.controller.handle_pointer_event(pointer);
            return;
        }
        match event.button() {
            Some(Button::Clear) => {
                self.clear();
            }
            Some(Button::Undo) => {
                self.undo();
            }
            Some(Button::Submit) => self.submit().await,
            None => {}
        }
    }

    /// Export the current drawing without submitting it.
    pub fn export_snapshot(&mut self) -> ExportResult<RasterBuffer> {
        self.controller.lock();
        let result = self.exporter.export(self.controller.canvas());
        self.controller.unlock();
        result
    }

    /// Export and encode the drawing, claiming the pipeline.
    ///
    /// Input is rejected while the canvas is being read. Returns `None` (after
    /// notifying, unless a submission is already running) when nothing can be
    /// sent.
    pub fn prepare_submission(&mut self) -> Option<SubmissionRequest> {
        self.controller.lock();
        let prepared = self.pipeline.prepare(&self.exporter, self.controller.canvas());
        self.controller.unlock();

        match prepared {
            Ok(request) => Some(request),
            Err(SubmissionError::InFlight) => {
                log::debug!("Submit ignored: a submission is already in flight");
                None
            }
            Err(e) => {
                log::error!("Failed to prepare submission: {}", e);
                self.show(Notification::error(e.user_message()));
                None
            }
        }
    }

    /// Report the outcome of a transfer to the user.
    pub fn finish_submission(&mut self, outcome: SubmissionResult<AccuracyReport>) {
        match outcome {
            Ok(report) => {
                self.show(Notification::success(report.success_message()));
                self.last_report = Some(report);
            }
            Err(e) => self.show(Notification::error(e.user_message())),
        }
    }

    /// Submit the drawing and wait for its score.
    pub async fn submit(&mut self) {
        let Some(request) = self.prepare_submission() else {
            return;
        };
        let pipeline = self.pipeline.clone();
        let outcome = pipeline.transfer(request).await;
        self.finish_submission(outcome);
    }

    /// The character being practiced, from cache while fresh.
    pub async fn load_current_progress(&self) -> SubmissionResult<CurrentProgress> {
        let result = self.progress.current().await;
        if let Err(e) = &result {
            log::warn!("Failed to load current progress: {}", e);
        }
        result
    }

    fn show(&mut self, notification: Notification) {
        self.notifier.notify(&notification);
        self.last_notification = Some(notification);
    }

    /// Accuracy of the last successful submission.
    pub fn last_accuracy(&self) -> Option<f64> {
        self.last_report.as_ref().and_then(|report| report.accuracy)
    }

    pub fn last_report(&self) -> Option<&AccuracyReport> {
        self.last_report.as_ref()
    }

    pub fn last_notification(&self) -> Option<&Notification> {
        self.last_notification.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.pipeline.is_in_flight()
    }

    /// Pipeline handle, for running a transfer on another task.
    pub fn pipeline(&self) -> &SubmissionPipeline {
        &self.pipeline
    }

    pub fn controller(&self) -> &GestureController {
        &self.controller
    }

    pub fn canvas(&self) -> &CanvasState {
        self.controller.canvas()
    }
}
