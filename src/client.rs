use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::constants::{
    ROUTE_MARK_CODE_USED, ROUTE_SUBMIT_APPLICATION, ROUTE_SUBMIT_INTERESTS, ROUTE_VALIDATE_CODE,
};
use crate::models::{
    ApplicationRequest, CodeValidation, InterestsRequest, MarkCodeUsedRequest, SubmissionReceipt,
    ValidateCodeRequest,
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// The four exchanges the wizard performs against the service.
#[async_trait]
pub trait ApplicationApi: Send + Sync {
    async fn validate_code(&self, code: &str) -> Result<CodeValidation, ClientError>;

    async fn mark_code_used(&self, record_id: &str, email: &str) -> Result<(), ClientError>;

    async fn submit_application(
        &self,
        request: &ApplicationRequest,
    ) -> Result<SubmissionReceipt, ClientError>;

    async fn submit_interests(
        &self,
        request: &InterestsRequest,
    ) -> Result<SubmissionReceipt, ClientError>;
}

/// `ApplicationApi` over HTTP against a running `roamsix serve`.
pub struct HttpApplicationApi {
    client: Client,
    base_url: String,
}

impl HttpApplicationApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post<B, T>(&self, route: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, route);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        debug!(%url, status = status.as_u16(), "API call");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(text);
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ApplicationApi for HttpApplicationApi {
    async fn validate_code(&self, code: &str) -> Result<CodeValidation, ClientError> {
        let request = ValidateCodeRequest {
            code: code.to_string(),
        };
        self.post(ROUTE_VALIDATE_CODE, &request).await
    }

    async fn mark_code_used(&self, record_id: &str, email: &str) -> Result<(), ClientError> {
        let request = MarkCodeUsedRequest {
            record_id: record_id.to_string(),
            email: email.to_string(),
        };
        let _: SubmissionReceipt = self.post(ROUTE_MARK_CODE_USED, &request).await?;
        Ok(())
    }

    async fn submit_application(
        &self,
        request: &ApplicationRequest,
    ) -> Result<SubmissionReceipt, ClientError> {
        self.post(ROUTE_SUBMIT_APPLICATION, request).await
    }

    async fn submit_interests(
        &self,
        request: &InterestsRequest,
    ) -> Result<SubmissionReceipt, ClientError> {
        self.post(ROUTE_SUBMIT_INTERESTS, request).await
    }
}
