//! HTTP access to the questionnaire backend.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Response};
use shared::{
    domain::QuestionnaireId,
    error::ApiError,
    protocol::{QuestionnaireEnvelope, QuestionnairePayload, ServerErrorBody, SubmissionRequest},
};
use tracing::{info, warn};

use crate::error::{FetchError, SubmitError};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A questionnaire as returned by the backend, parsed and raw.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedQuestionnaire {
    pub payload: QuestionnairePayload,
    pub raw: serde_json::Value,
}

#[async_trait]
pub trait QuestionnaireService: Send + Sync {
    async fn fetch_questionnaire(
        &self,
        id: QuestionnaireId,
    ) -> Result<FetchedQuestionnaire, FetchError>;

    async fn submit_answers(
        &self,
        catid: QuestionnaireId,
        request: &SubmissionRequest,
    ) -> Result<(), SubmitError>;
}

pub struct SurveyApi {
    http: Client,
    base_url: String,
}

impl SurveyApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn questionnaire_url(&self, id: QuestionnaireId) -> String {
        format!("{}/ques/{id}", self.base_url)
    }
}

/// Encodes `pairs` as an `application/x-www-form-urlencoded` body.
pub fn encode_form(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Reads the `{ status_code, message }` failure body. The HTTP status stands
/// in when the body is not JSON or carries no `status_code`, so a bare 404
/// with only a `message` is still classified as not found.
async fn api_error_from_response(response: Response) -> ApiError {
    let http_status = response.status().as_u16();
    let body = response
        .bytes()
        .await
        .ok()
        .and_then(|bytes| serde_json::from_slice::<ServerErrorBody>(&bytes).ok());
    match body {
        Some(body) => ApiError::new(body.status_code.unwrap_or(http_status), body.message),
        None => ApiError::new(http_status, String::new()),
    }
}

#[async_trait]
impl QuestionnaireService for SurveyApi {
    async fn fetch_questionnaire(
        &self,
        id: QuestionnaireId,
    ) -> Result<FetchedQuestionnaire, FetchError> {
        let url = self.questionnaire_url(id);
        info!(questionnaire_id = id.0, %url, "fetching questionnaire");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            let err = api_error_from_response(response).await;
            warn!(
                questionnaire_id = id.0,
                status_code = err.status_code,
                message = %err.message,
                "questionnaire fetch rejected"
            );
            return Err(err.into());
        }

        let body = response.bytes().await?;
        let envelope: QuestionnaireEnvelope = serde_json::from_slice(&body)?;
        let payload: QuestionnairePayload = serde_json::from_value(envelope.data.clone())?;
        Ok(FetchedQuestionnaire {
            payload,
            raw: envelope.data,
        })
    }

    async fn submit_answers(
        &self,
        catid: QuestionnaireId,
        request: &SubmissionRequest,
    ) -> Result<(), SubmitError> {
        let url = self.questionnaire_url(catid);
        let body = encode_form(&request.form_pairs());
        info!(
            questionnaire_id = catid.0,
            %url,
            answers = request.answers.len(),
            "submitting answers"
        );

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error_from_response(response).await.into());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
