// HTTP clients for the two outside services a booking is handed to

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::{ConfigError, FormServiceConfig, MessagingConfig};
use crate::submission::normalize_chat_id;

#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError { status_code: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Submission rejected by form service")]
    Rejected,
}

impl From<reqwest::Error> for CollaboratorError {
    fn from(err: reqwest::Error) -> Self {
        // URLs carry credentials; keep them out of logs
        CollaboratorError::NetworkError(err.without_url().to_string())
    }
}

/// Receives the structured booking. Its answer decides the outcome of a submission.
#[async_trait]
pub trait FormCollector: Send + Sync + 'static {
    async fn submit(&self, fields: &[(String, String)]) -> Result<(), CollaboratorError>;
}

/// Alerts a human operator. Best effort only.
#[async_trait]
pub trait MessageNotifier: Send + Sync + 'static {
    async fn notify(&self, message: &str) -> Result<(), CollaboratorError>;
}

#[derive(Debug, Deserialize)]
struct FormServiceResponse {
    success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatMessage<'a> {
    chat_id: &'a str,
    message: &'a str,
}

fn build_client(timeout_ms: u64) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

async fn status_error(response: reqwest::Response) -> CollaboratorError {
    let status_code = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    CollaboratorError::ApiResponseError {
        status_code,
        message: body.chars().take(200).collect(),
    }
}

pub struct HttpFormCollector {
    client: Client,
    config: FormServiceConfig,
}

impl HttpFormCollector {
    pub fn new(config: FormServiceConfig) -> Result<Self, ConfigError> {
        let client = build_client(config.timeout_ms)?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl FormCollector for HttpFormCollector {
    async fn submit(&self, fields: &[(String, String)]) -> Result<(), CollaboratorError> {
        let response = self
            .client
            .post(self.config.submission_url())
            .query(&[("apiKey", self.config.api_key.as_str())])
            .form(fields)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: FormServiceResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::MalformedResponse(e.without_url().to_string()))?;

        if body.success {
            Ok(())
        } else {
            Err(CollaboratorError::Rejected)
        }
    }
}

pub struct HttpMessageNotifier {
    client: Client,
    config: MessagingConfig,
    chat_id: String,
}

impl HttpMessageNotifier {
    pub fn new(config: MessagingConfig) -> Result<Self, ConfigError> {
        let client = build_client(config.timeout_ms)?;
        let chat_id = normalize_chat_id(&config.destination);
        Ok(Self {
            client,
            config,
            chat_id,
        })
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

#[async_trait]
impl MessageNotifier for HttpMessageNotifier {
    async fn notify(&self, message: &str) -> Result<(), CollaboratorError> {
        let payload = ChatMessage {
            chat_id: &self.chat_id,
            message,
        };

        let response = self
            .client
            .post(self.config.send_message_url())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(chat_id = %self.chat_id, response = %body, "Messaging service accepted message");
        Ok(())
    }
}
