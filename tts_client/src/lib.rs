use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{blocking::Client, blocking::Response, header};
use serde::Serialize;
use tracing::info;

/// Audio container requested from the service. Only WAV is decoded.
pub const AUDIO_FORMAT: &str = "wav";

/// Body of a synthesis request
#[derive(Debug, Serialize)]
pub struct TtsRequest<'a> {
    pub text: &'a str,
    pub streaming: bool,
    pub format: &'a str,
    pub reference_id: &'a str,
}

impl<'a> TtsRequest<'a> {
    /// A streaming WAV request for `text` in the given reference voice.
    pub fn streaming_wav(text: &'a str, reference_id: &'a str) -> Self {
        Self {
            text,
            streaming: true,
            format: AUDIO_FORMAT,
            reference_id,
        }
    }
}

pub struct TtsClient {
    url: String,
    api_token: Option<String>,
    client: Client,
}

impl TtsClient {
    /// Create a client for the synthesis endpoint at `url`.
    pub fn new(url: &str) -> Result<Self> {
        // No request timeout: a long passage streams for as long as it plays.
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            url: url.to_string(),
            api_token: None,
            client,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST a streaming request and hand back the unread response body.
    ///
    /// The returned response implements `std::io::Read`; nothing has been
    /// consumed from it yet. Non-2xx statuses are turned into errors.
    pub fn open_stream(&self, text: &str, reference_id: &str) -> Result<Response> {
        let body = TtsRequest::streaming_wav(text, reference_id);
        info!(
            "POST {} (text length={}, reference_id={})",
            self.url,
            text.len(),
            reference_id
        );

        let mut request = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .with_context(|| format!("Request to {} failed", self.url))?
            .error_for_status()?; // convert non-2xx into error
        Ok(response)
    }
}
