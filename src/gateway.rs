// Booking submission gateway
//
// The form service is the system of record for a booking: its answer is the
// answer. The operator chat alert goes out only after the form service
// accepted the booking, runs on its own task, and can fail without the
// visitor ever hearing about it. Nothing is retried; the visitor resubmits.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, GatewayConfig, DEFAULT_TIMEOUT_MS};
use crate::http::{
    CollaboratorError, FormCollector, HttpFormCollector, HttpMessageNotifier, MessageNotifier,
};
use crate::submission::{BookingSubmission, FormFieldMap};

/// What a visitor may be told. Details stay in the logs.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("server configuration error")]
    Configuration,

    #[error("submission failed, please retry")]
    Upstream(#[source] CollaboratorError),

    #[error("submission failed, please retry")]
    Timeout { timeout_ms: u64 },
}

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub fields: FormFieldMap,
    pub form_timeout_ms: u64,
    pub notify_timeout_ms: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            fields: FormFieldMap::default(),
            form_timeout_ms: DEFAULT_TIMEOUT_MS,
            notify_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug)]
pub struct SubmissionReceipt {
    pub reference: String,
    /// Operator alert running in the background. Safe to drop.
    pub notification: JoinHandle<()>,
}

struct Collaborators {
    form: Arc<dyn FormCollector>,
    notifier: Arc<dyn MessageNotifier>,
    settings: GatewaySettings,
}

pub struct BookingGateway {
    collaborators: Result<Collaborators, ConfigError>,
}

impl BookingGateway {
    pub fn new(
        form: Arc<dyn FormCollector>,
        notifier: Arc<dyn MessageNotifier>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            collaborators: Ok(Collaborators {
                form,
                notifier,
                settings,
            }),
        }
    }

    /// A gateway that fails every submission with a configuration error.
    pub fn misconfigured(err: ConfigError) -> Self {
        error!(error = %err, "Booking gateway is not configured");
        Self {
            collaborators: Err(err),
        }
    }

    pub fn from_config(config: GatewayConfig) -> Self {
        let settings = GatewaySettings {
            fields: config.form.fields.clone(),
            form_timeout_ms: config.form.timeout_ms,
            notify_timeout_ms: config.messaging.timeout_ms,
        };

        let clients = HttpFormCollector::new(config.form).and_then(|form| {
            HttpMessageNotifier::new(config.messaging).map(|notifier| (form, notifier))
        });

        match clients {
            Ok((form, notifier)) => Self::new(Arc::new(form), Arc::new(notifier), settings),
            Err(err) => Self::misconfigured(err),
        }
    }

    /// Never fails: missing settings surface on each submission instead.
    pub fn from_env() -> Self {
        match GatewayConfig::from_env() {
            Ok(config) => Self::from_config(config),
            Err(err) => Self::misconfigured(err),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.collaborators.is_ok()
    }

    pub async fn submit(
        &self,
        submission: &BookingSubmission,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let collaborators = match &self.collaborators {
            Ok(collaborators) => collaborators,
            Err(err) => {
                error!(
                    reference = %submission.reference,
                    error = %err,
                    "Rejecting booking: gateway is not configured"
                );
                return Err(SubmissionError::Configuration);
            }
        };
        let settings = &collaborators.settings;
        let reference = submission.reference.clone();
        let fields = submission.form_fields(&settings.fields);

        debug!(%reference, field_count = fields.len(), "Sending booking to form service");

        let form_timeout = Duration::from_millis(settings.form_timeout_ms);
        match timeout(form_timeout, collaborators.form.submit(&fields)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(%reference, error = %err, "Form service did not accept booking");
                return Err(SubmissionError::Upstream(err));
            }
            Err(_) => {
                error!(
                    %reference,
                    timeout_ms = settings.form_timeout_ms,
                    "Form service timed out"
                );
                return Err(SubmissionError::Timeout {
                    timeout_ms: settings.form_timeout_ms,
                });
            }
        }

        info!(
            %reference,
            total = submission.total(),
            line_items = submission.items.len(),
            "Booking accepted by form service"
        );

        let notification = spawn_notification(
            Arc::clone(&collaborators.notifier),
            submission.chat_message(),
            reference.clone(),
            settings.notify_timeout_ms,
        );

        Ok(SubmissionReceipt {
            reference,
            notification,
        })
    }
}

fn spawn_notification(
    notifier: Arc<dyn MessageNotifier>,
    message: String,
    reference: String,
    timeout_ms: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match timeout(Duration::from_millis(timeout_ms), notifier.notify(&message)).await {
            Ok(Ok(())) => debug!(%reference, "Operator notified"),
            Ok(Err(err)) => warn!(%reference, error = %err, "Operator notification failed"),
            Err(_) => warn!(%reference, timeout_ms, "Operator notification timed out"),
        }
    })
}
