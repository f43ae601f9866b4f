use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use reqwest::multipart::Form;
use serde_json::Value;

use crate::error::TransportError;

/// Trait representing the server side of the game form.
#[async_trait]
pub trait GameTransport: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Post one description and return the parsed JSON reply.
    async fn create_game(&self, description: &str) -> Result<Value, TransportError>;
}

/// Posts descriptions to a running game creator server.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    url: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self {
            url: join_url(base_url, endpoint),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl GameTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn create_game(&self, description: &str) -> Result<Value, TransportError> {
        let form = Form::new().text("description", description.to_string());
        let resp = self.client.post(&self.url).multipart(form).send().await?;

        // Error statuses still carry a JSON body worth reading.
        let status = resp.status();
        if !status.is_success() {
            debug!("Server answered {} for {}", status, self.url);
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!("Non-JSON reply from {} ({}): {}", self.url, status, e);
            TransportError::from(e)
        })
    }
}

fn join_url(base_url: &str, endpoint: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if endpoint.starts_with('/') {
        format!("{}{}", base, endpoint)
    } else {
        format!("{}/{}", base, endpoint)
    }
}
