use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use super::{FormControl, collect};
use crate::config::DEFAULT_NOTIFY_TO;
use crate::models::Record;

/// Intake endpoint the public site posts to.
pub const ENDPOINT_URL: &str = "https://alephiclabs.com/api/submit";

/// How long the submit control shows its success state.
pub const RESTORE_DELAY: Duration = Duration::from_secs(4);

/// How long the error banner stays up.
pub const ERROR_BANNER_TTL: Duration = Duration::from_secs(6);

pub const SUCCESS_MESSAGE: &str =
    "Thank you! We've received your submission and will be in touch soon.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    /// `None` means the banner stays until the visitor dismisses it.
    pub remove_after: Option<Duration>,
}

/// What the submit control shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    /// Request in flight; the control is disabled.
    Sending,
    /// Content replaced by the success indicator; still disabled.
    Succeeded,
    /// Original content, enabled.
    Ready,
}

/// Optional hook for the page's submit control.
pub trait SubmitControl: Send + Sync {
    fn set_state(&self, state: ControlState);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The request left without a transport error. The reply is never read.
    /// The form fields are cleared and the control returns to `Ready` after
    /// `restore_control_after`.
    Submitted {
        banner: Banner,
        reset_form: bool,
        restore_control_after: Duration,
    },
    /// The form keeps its values and the control is already `Ready`.
    Failed {
        banner: Banner,
        reason: String,
        reset_form: bool,
        restore_control_after: Duration,
    },
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted { .. })
    }

    pub fn banner(&self) -> &Banner {
        match self {
            SubmitOutcome::Submitted { banner, .. } | SubmitOutcome::Failed { banner, .. } => banner,
        }
    }

    pub fn reset_form(&self) -> bool {
        match self {
            SubmitOutcome::Submitted { reset_form, .. } | SubmitOutcome::Failed { reset_form, .. } => {
                *reset_form
            }
        }
    }

    pub fn restore_control_after(&self) -> Duration {
        match self {
            SubmitOutcome::Submitted {
                restore_control_after,
                ..
            }
            | SubmitOutcome::Failed {
                restore_control_after,
                ..
            } => *restore_control_after,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionEvent {
    pub name: &'static str,
    pub category: &'static str,
    pub label: String,
}

/// Optional analytics hook notified after a successful submission.
pub trait ConversionTracker: Send + Sync {
    fn track(&self, event: &ConversionEvent);
}

pub struct FormSubmitter {
    client: Client,
    endpoint: String,
    tracker: Option<Arc<dyn ConversionTracker>>,
    control: Option<Arc<dyn SubmitControl>>,
}

impl FormSubmitter {
    pub fn new() -> Self {
        Self::with_endpoint(ENDPOINT_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            tracker: None,
            control: None,
        }
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn ConversionTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn with_control(mut self, control: Arc<dyn SubmitControl>) -> Self {
        self.control = Some(control);
        self
    }

    fn set_control(&self, state: ControlState) {
        if let Some(control) = &self.control {
            control.set_state(state);
        }
    }

    pub async fn submit(&self, form_type: &str, controls: &[FormControl]) -> SubmitOutcome {
        self.submit_record(&collect(form_type, controls)).await
    }

    /// Post `record` once. No retry, no timeout; only a transport error counts
    /// as failure since the reply is deliberately left unread.
    pub async fn submit_record(&self, record: &Record) -> SubmitOutcome {
        self.set_control(ControlState::Sending);

        let sent = self
            .client
            .post(&self.endpoint)
            .json(&record.to_json())
            .send()
            .await;

        match sent {
            Ok(_) => {
                tracing::debug!(form_type = %record.form_type, "Form submitted");
                if let Some(tracker) = &self.tracker {
                    tracker.track(&ConversionEvent {
                        name: "generate_lead",
                        category: "Form Submission",
                        label: record.form_type.clone(),
                    });
                }
                self.set_control(ControlState::Succeeded);
                SubmitOutcome::Submitted {
                    banner: Banner {
                        kind: BannerKind::Success,
                        message: SUCCESS_MESSAGE.to_string(),
                        remove_after: None,
                    },
                    reset_form: true,
                    restore_control_after: RESTORE_DELAY,
                }
            }
            Err(e) => {
                tracing::warn!(form_type = %record.form_type, "Form submission failed: {e}");
                self.set_control(ControlState::Ready);
                SubmitOutcome::Failed {
                    banner: Banner {
                        kind: BannerKind::Error,
                        message: format!(
                            "Something went wrong. Please try again or email us directly at {DEFAULT_NOTIFY_TO}."
                        ),
                        remove_after: Some(ERROR_BANNER_TTL),
                    },
                    reason: e.to_string(),
                    reset_form: false,
                    restore_control_after: Duration::ZERO,
                }
            }
        }
    }
}

impl Default for FormSubmitter {
    fn default() -> Self {
        Self::new()
    }
}
