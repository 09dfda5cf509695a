//! Backend seam: the three workflow endpoints and their HTTP implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    error::ApiError,
    protocol::{
        BlogPost, NarrativeContent, ProcessRequest, RefineRequest, FINALIZE_PATH, PROCESS_PATH,
        REFINE_PATH,
    },
};
use tracing::debug;
use url::Url;

use crate::error::WorkflowError;

#[async_trait]
pub trait WorkflowBackend: Send + Sync {
    async fn process(&self, idea: &str) -> Result<NarrativeContent, WorkflowError>;
    async fn refine(&self, refinement: &str) -> Result<NarrativeContent, WorkflowError>;
    async fn finalize(&self) -> Result<BlogPost, WorkflowError>;
}

pub struct HttpWorkflowBackend {
    http: Client,
    base_url: Url,
    request_timeout: Option<Duration>,
}

impl HttpWorkflowBackend {
    pub fn new(base_url: &str) -> Result<Self, WorkflowError> {
        Self::with_timeout(base_url, None)
    }

    /// `None` waits on the backend indefinitely.
    pub fn with_timeout(
        base_url: &str,
        request_timeout: Option<Duration>,
    ) -> Result<Self, WorkflowError> {
        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(base_url.trim())?,
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn post(&self, path: &str) -> Result<RequestBuilder, WorkflowError> {
        let url = self.base_url.join(path)?;
        let mut request = self
            .http
            .post(url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }
        Ok(request)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &'static str,
        request: RequestBuilder,
    ) -> Result<T, WorkflowError> {
        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(
            endpoint = path,
            %status,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend responded"
        );

        if !status.is_success() {
            let message = match serde_json::from_slice::<ApiError>(&body) {
                Ok(api_error) => api_error.error,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            };
            return Err(WorkflowError::status(status, message));
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl WorkflowBackend for HttpWorkflowBackend {
    async fn process(&self, idea: &str) -> Result<NarrativeContent, WorkflowError> {
        let request = self.post(PROCESS_PATH)?.json(&ProcessRequest {
            idea: idea.to_string(),
        });
        self.execute(PROCESS_PATH, request).await
    }

    async fn refine(&self, refinement: &str) -> Result<NarrativeContent, WorkflowError> {
        let request = self.post(REFINE_PATH)?.json(&RefineRequest {
            refinement: refinement.to_string(),
        });
        self.execute(REFINE_PATH, request).await
    }

    async fn finalize(&self) -> Result<BlogPost, WorkflowError> {
        let request = self.post(FINALIZE_PATH)?;
        self.execute(FINALIZE_PATH, request).await
    }
}
