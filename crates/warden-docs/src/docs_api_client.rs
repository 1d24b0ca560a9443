//! Google OAuth and Docs REST calls used by the appender.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use warden_core::truncate_for_error;

use crate::docs_types::DocsError;

const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct DocumentResponse {
    #[serde(default)]
    body: Option<DocumentBody>,
}

#[derive(Debug, Clone, Deserialize)]
struct DocumentBody {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuralElement {
    #[serde(default)]
    end_index: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateResponse {
    #[serde(default)]
    document_id: Option<String>,
}

#[derive(Clone)]
pub struct GoogleDocsApiClient {
    http: reqwest::Client,
    api_base: String,
}

impl GoogleDocsApiClient {
    pub fn new(api_base: &str, request_timeout_ms: u64) -> Result<Self, DocsError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("warden-docs-appender"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Exchanges a signed assertion for an OAuth access token.
    pub async fn exchange_assertion(
        &self,
        token_uri: &str,
        assertion: &str,
    ) -> Result<AccessTokenResponse, DocsError> {
        let response: AccessTokenResponse = self
            .request_json(
                "oauth token",
                self.http.post(token_uri).form(&[
                    ("grant_type", JWT_BEARER_GRANT_TYPE),
                    ("assertion", assertion),
                ]),
            )
            .await?;
        if response.access_token.trim().is_empty() {
            return Err(DocsError::InvalidResponse(
                "oauth token response missing access_token".to_string(),
            ));
        }
        Ok(response)
    }

    /// Returns the `endIndex` of the last structural element of the body.
    pub async fn document_end_index(
        &self,
        access_token: &str,
        document_id: &str,
    ) -> Result<u64, DocsError> {
        let document: DocumentResponse = self
            .request_json(
                "documents.get",
                self.http
                    .get(format!("{}/documents/{}", self.api_base, document_id))
                    .bearer_auth(access_token),
            )
            .await?;
        document
            .body
            .and_then(|body| body.content.last().and_then(|element| element.end_index))
            .ok_or_else(|| {
                DocsError::InvalidResponse(format!(
                    "document {document_id} has no body content with an endIndex"
                ))
            })
    }

    pub async fn insert_text(
        &self,
        access_token: &str,
        document_id: &str,
        index: u64,
        text: &str,
    ) -> Result<(), DocsError> {
        let payload = json!({
            "requests": [
                {
                    "insertText": {
                        "location": { "index": index },
                        "text": text,
                    }
                }
            ]
        });
        let response: BatchUpdateResponse = self
            .request_json(
                "documents.batchUpdate",
                self.http
                    .post(format!(
                        "{}/documents/{}:batchUpdate",
                        self.api_base, document_id
                    ))
                    .bearer_auth(access_token)
                    .json(&payload),
            )
            .await?;
        debug!(
            document_id = response.document_id.as_deref().unwrap_or(document_id),
            index, "docs batchUpdate applied"
        );
        Ok(())
    }

    async fn request_json<T>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, DocsError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocsError::HttpStatus {
                operation: operation.to_string(),
                status: status.as_u16(),
                body: truncate_for_error(&body, 800),
            });
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice::<T>(&bytes).map_err(|error| {
            DocsError::InvalidResponse(format!("failed to decode google {operation}: {error}"))
        })
    }
}
