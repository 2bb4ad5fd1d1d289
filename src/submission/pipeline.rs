use std::net::IpAddr;

use crate::email::Notification;
use crate::models::Record;
use crate::sheets::{self, AppendReceipt};
use crate::state::SharedState;

use super::attachment::{self, AttachmentOutcome};
use super::honeypot;
use super::timestamp;

#[derive(Debug)]
pub struct PipelineResult {
    pub form_type: String,
    pub spam: bool,
    pub attachment: Option<AttachmentOutcome>,
    pub log: Option<AppendReceipt>,
    pub notified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Log,
    Notify,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Log => write!(f, "log"),
            Step::Notify => write!(f, "notify"),
        }
    }
}

#[derive(Debug)]
pub struct StepFailure {
    pub step: Step,
    pub reason: String,
}

#[derive(Debug)]
pub enum PipelineError {
    RateLimited { retry_after: u64 },
    /// At least one step failed. `logged` / `notified` say which effects still committed.
    Steps {
        failures: Vec<StepFailure>,
        logged: bool,
        notified: bool,
    },
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::RateLimited { retry_after } => {
                write!(f, "Rate limited. Retry after {retry_after}s")
            }
            PipelineError::Steps {
                failures,
                logged,
                notified,
            } => {
                for (i, failure) in failures.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{} step failed: {}", failure.step, failure.reason)?;
                }
                write!(
                    f,
                    " (logged: {}, notified: {})",
                    if *logged { "yes" } else { "no" },
                    if *notified { "yes" } else { "no" },
                )
            }
        }
    }
}

/// Run one submission through attachment storage, the sheet log and the
/// notification. Every step runs even when an earlier one failed, so a
/// failed log append still produces an email and vice versa.
pub async fn run(
    state: &SharedState,
    client_ip: IpAddr,
    mut record: Record,
) -> Result<PipelineResult, PipelineError> {
    let config = &state.config;
    let form_type = record.form_type.clone();

    if let Err(retry_after) =
        state
            .submission_limiter
            .check(&form_type, client_ip, config.rate_limit, config.rate_window_secs)
    {
        tracing::warn!(%form_type, %client_ip, "Submission rate limited");
        return Err(PipelineError::RateLimited { retry_after });
    }

    if honeypot::strip_trap(&mut record, config.honeypot_field.as_deref()) {
        tracing::info!(%form_type, %client_ip, "Honeypot filled, dropping submission");
        return Ok(PipelineResult {
            form_type,
            spam: true,
            attachment: None,
            log: None,
            notified: false,
        });
    }

    let timestamp = timestamp::now(config.timezone);
    let attachment = attachment::process_resume(state.files.as_ref(), &mut record).await;

    let mut failures = Vec::new();

    let log = match sheets::append_submission(
        state.sheets.as_ref(),
        config.header_policy,
        &form_type,
        &timestamp,
        &record,
    )
    .await
    {
        Ok(receipt) => {
            tracing::debug!(%form_type, sheet_created = receipt.sheet_created, "Logged submission");
            Some(receipt)
        }
        Err(e) => {
            tracing::error!(%form_type, "Failed to log submission: {e}");
            failures.push(StepFailure {
                step: Step::Log,
                reason: e.to_string(),
            });
            None
        }
    };

    let notified = match &state.mailer {
        Some(mailer) => {
            let notification =
                Notification::for_submission(&config.notify_to, &form_type, &timestamp, &record);
            match mailer.send(&notification).await {
                Ok(()) => {
                    tracing::debug!(%form_type, to = %config.notify_to, "Sent notification");
                    true
                }
                Err(e) => {
                    tracing::error!(%form_type, "Failed to send notification: {e}");
                    failures.push(StepFailure {
                        step: Step::Notify,
                        reason: e,
                    });
                    false
                }
            }
        }
        None => {
            tracing::warn!(%form_type, "No mailer configured, notification skipped");
            false
        }
    };

    if !failures.is_empty() {
        return Err(PipelineError::Steps {
            failures,
            logged: log.is_some(),
            notified,
        });
    }

    tracing::info!(%form_type, %client_ip, "Submission received");

    Ok(PipelineResult {
        form_type,
        spam: false,
        attachment,
        log,
        notified,
    })
}
