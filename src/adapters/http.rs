//! HTTP retrieval client for a real backend.
//!
//! POSTs `{query, document_ids}` to `{base}/chat` and expects
//! `{answer, sources}` back. Low-level reqwest errors never cross this
//! seam; they are normalized into descriptive [`RetrieveError`]s.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Source;

use super::{QueryResponse, RetrieveError, Retriever};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    query: &'a str,
    document_ids: &'a [Uuid],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    answer: String,
    #[serde(default)]
    sources: Vec<Source>,
}

/// Error body shape the backend uses for rejections
#[derive(Debug, Deserialize)]
struct ApiError {
    detail: Option<String>,
}

/// Retriever backed by a remote document-intelligence service
pub struct HttpRetriever {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpRetriever {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            bearer_token: None,
        }
    }

    /// Attach a bearer token to every request
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn query(
        &self,
        query: &str,
        document_ids: &[Uuid],
    ) -> Result<QueryResponse, RetrieveError> {
        let mut request = self.client.post(self.endpoint()).json(&ChatRequest {
            query,
            document_ids,
        });

        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RetrieveError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ApiError>()
                .await
                .ok()
                .and_then(|e| e.detail)
                .unwrap_or_else(|| format!("backend returned {}", status));
            return Err(RetrieveError::Rejected(detail));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| RetrieveError::Rejected(format!("malformed response: {}", e)))?;

        Ok(QueryResponse {
            answer: body.answer,
            sources: body.sources,
        })
    }
}
