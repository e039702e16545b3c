// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Progress, messages and cancellation for a running model.
//!
//! [`ProcessingFeedback`] accumulates an HTML log and a plain text log of
//! everything reported to it. [`MultiStepFeedback`] wraps a parent feedback
//! and maps per-step progress onto the parent's overall progress.

use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::consts::FEEDBACK_LOG_TARGET;

/// Sink for progress and messages emitted while algorithms run.
///
/// Implementations must be shareable across the awaits of a single run.
pub trait Feedback: Send + Sync {
    /// Sets progress in percent, `0.0..=100.0`.
    fn set_progress(&self, progress: f64);
    fn progress(&self) -> f64;
    fn set_progress_text(&self, text: &str);

    /// Reports an error. `fatal` errors end the current algorithm.
    fn report_error(&self, error: &str, fatal: bool);
    fn push_warning(&self, warning: &str);
    fn push_info(&self, info: &str);
    fn push_command_info(&self, info: &str);
    fn push_debug_info(&self, info: &str);
    fn push_console_info(&self, info: &str);

    fn html_log(&self) -> String;
    fn text_log(&self) -> String;

    fn cancellation_token(&self) -> CancellationToken;

    fn is_canceled(&self) -> bool {
        self.cancellation_token().is_cancelled()
    }

    fn cancel(&self) {
        self.cancellation_token().cancel();
    }
}

#[derive(Debug, Default)]
struct FeedbackState {
    progress: f64,
    progress_text: String,
    html_log: String,
    text_log: String,
}

/// The default [`Feedback`], recording every message in both logs.
#[derive(Debug)]
pub struct ProcessingFeedback {
    state: Mutex<FeedbackState>,
    token: CancellationToken,
    log_feedback: bool,
}

impl Default for ProcessingFeedback {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ProcessingFeedback {
    /// `log_feedback` forwards every message to the tracing log as well.
    pub fn new(log_feedback: bool) -> Self {
        Self {
            state: Mutex::new(FeedbackState::default()),
            token: CancellationToken::new(),
            log_feedback,
        }
    }

    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn progress_text(&self) -> String {
        self.lock().progress_text.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FeedbackState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn append(&self, html: String, text: &str) {
        let mut state = self.lock();
        state.html_log.push_str(&html);
        state.text_log.push_str(text);
        state.text_log.push('\n');
    }
}

/// Escapes HTML special characters and turns newlines into `<br>`.
fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("<br>"),
            other => escaped.push(other),
        }
    }
    escaped
}

impl Feedback for ProcessingFeedback {
    fn set_progress(&self, progress: f64) {
        self.lock().progress = progress.clamp(0.0, 100.0);
    }

    fn progress(&self) -> f64 {
        self.lock().progress
    }

    fn set_progress_text(&self, text: &str) {
        self.lock().progress_text = text.to_string();
    }

    fn report_error(&self, error: &str, fatal: bool) {
        if self.log_feedback {
            tracing::error!(target: FEEDBACK_LOG_TARGET, fatal, "{}", error);
        }
        self.append(
            format!("<span style=\"color:red\">{}</span><br/>", html_escape(error)),
            error,
        );
    }

    fn push_warning(&self, warning: &str) {
        if self.log_feedback {
            tracing::warn!(target: FEEDBACK_LOG_TARGET, "{}", warning);
        }
        self.append(
            format!(
                "<span style=\"color:#b85a20;\">{}</span><br/><br/>",
                html_escape(warning)
            ),
            warning,
        );
    }

    fn push_info(&self, info: &str) {
        if self.log_feedback {
            tracing::info!(target: FEEDBACK_LOG_TARGET, "{}", info);
        }
        self.append(format!("{}<br/>", html_escape(info)), info);
    }

    fn push_command_info(&self, info: &str) {
        if self.log_feedback {
            tracing::info!(target: FEEDBACK_LOG_TARGET, command = true, "{}", info);
        }
        self.append(format!("<code>{}</code><br/>", html_escape(info)), info);
    }

    fn push_debug_info(&self, info: &str) {
        if self.log_feedback {
            tracing::debug!(target: FEEDBACK_LOG_TARGET, "{}", info);
        }
        self.append(
            format!("<span style=\"color:#777\">{}</span><br/>", html_escape(info)),
            info,
        );
    }

    fn push_console_info(&self, info: &str) {
        if self.log_feedback {
            tracing::debug!(target: FEEDBACK_LOG_TARGET, console = true, "{}", info);
        }
        self.append(
            format!("<code style=\"color:#777\">{}</code><br/>", html_escape(info)),
            info,
        );
    }

    fn html_log(&self) -> String {
        self.lock().html_log.clone()
    }

    fn text_log(&self) -> String {
        self.lock().text_log.clone()
    }

    fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}

/// Splits a parent feedback into `steps` equally weighted steps.
///
/// Messages go straight to the parent. Canceling the parent cancels this
/// feedback, but not the other way around.
pub struct MultiStepFeedback<'a> {
    steps: usize,
    current_step: Mutex<usize>,
    progress: Mutex<f64>,
    parent: &'a dyn Feedback,
    token: CancellationToken,
}

impl<'a> MultiStepFeedback<'a> {
    pub fn new(steps: usize, parent: &'a dyn Feedback) -> Self {
        Self {
            steps,
            current_step: Mutex::new(0),
            progress: Mutex::new(0.0),
            parent,
            token: parent.cancellation_token().child_token(),
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn current_step(&self) -> usize {
        *self.current_step.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Moves to `step` and reports `100 * step / steps` to the parent.
    pub fn set_current_step(&self, step: usize) {
        *self.current_step.lock().unwrap_or_else(|p| p.into_inner()) = step;
        *self.progress.lock().unwrap_or_else(|p| p.into_inner()) = 0.0;
        self.parent.set_progress(self.step_base(step));
    }

    fn step_base(&self, step: usize) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            100.0 * step as f64 / self.steps as f64
        }
    }
}

impl Feedback for MultiStepFeedback<'_> {
    fn set_progress(&self, progress: f64) {
        *self.progress.lock().unwrap_or_else(|p| p.into_inner()) = progress;
        let steps = self.steps.max(1) as f64;
        self.parent
            .set_progress(self.step_base(self.current_step()) + progress / steps);
    }

    fn progress(&self) -> f64 {
        *self.progress.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn set_progress_text(&self, text: &str) {
        self.parent.set_progress_text(text);
    }

    fn report_error(&self, error: &str, fatal: bool) {
        self.parent.report_error(error, fatal);
    }

    fn push_warning(&self, warning: &str) {
        self.parent.push_warning(warning);
    }

    fn push_info(&self, info: &str) {
        self.parent.push_info(info);
    }

    fn push_command_info(&self, info: &str) {
        self.parent.push_command_info(info);
    }

    fn push_debug_info(&self, info: &str) {
        self.parent.push_debug_info(info);
    }

    fn push_console_info(&self, info: &str) {
        self.parent.push_console_info(info);
    }

    fn html_log(&self) -> String {
        self.parent.html_log()
    }

    fn text_log(&self) -> String {
        self.parent.text_log()
    }

    fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}
