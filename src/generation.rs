use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

/// Stateless client for the external content/video generation webhook.
/// Requests are forwarded as-is and upstream failures are surfaced with the
/// upstream status and body text; there is no retry or backoff.
#[derive(Clone, Debug)]
pub struct GenerationClient {
    http_client: Client,
    base_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    pub user_prompt: String,
    pub system_prompt: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContentResponse {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VideoCreateRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UploadResponse {
    pub code: i64,
    pub message: String,
}

/// Shape actually returned by the content endpoint; the dialogue lines are
/// re-serialized into a single string for storage in the video record.
#[derive(Debug, Serialize, Deserialize)]
struct ContentApiResponse {
    output: Vec<DialogueLine>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DialogueLine {
    text: String,
    speaker: String,
}

impl GenerationClient {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url,
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("PODCAST_API_BASE_URL").ok())
    }

    fn endpoint(&self, path: &str) -> Result<String, AppError> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| AppError::Configuration("PODCAST_API_BASE_URL".to_string()))?;

        Ok(format!("{}{}", base_url.trim_end_matches('/'), path))
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, AppError> {
        let url = self.endpoint(path)?;
        tracing::info!(url = %url, "Calling generation API");

        let response = self.http_client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body_text, "Generation API returned an error");
            return Err(AppError::ExternalService(anyhow::anyhow!(
                "Generation API request failed: {} - {}",
                status,
                body_text
            )));
        }

        Ok(response)
    }

    #[tracing::instrument(name = "Generate content", skip(self, request))]
    pub async fn create_content(
        &self,
        request: &ContentRequest,
    ) -> Result<ContentResponse, AppError> {
        let response = self
            .post_json("/webhook/podcast/content/create", request)
            .await?;

        let api_response = response.json::<ContentApiResponse>().await?;

        let content = serde_json::to_string_pretty(&api_response.output).map_err(|e| {
            AppError::Unexpected(
                anyhow::Error::new(e).context("Failed to serialize generated content"),
            )
        })?;

        Ok(ContentResponse { content })
    }

    #[tracing::instrument(name = "Create video", skip(self, request), fields(title = %request.title))]
    pub async fn create_video(&self, request: &VideoCreateRequest) -> Result<Value, AppError> {
        let response = self
            .post_json("/webhook/podcast/video/create", request)
            .await?;

        Ok(response.json::<Value>().await?)
    }

    #[tracing::instrument(name = "Upload video", skip(self, video))]
    pub async fn upload_video(&self, video: &Value) -> Result<UploadResponse, AppError> {
        let response = self
            .post_json("/webhook/podcast/video/upload", video)
            .await?;

        Ok(response.json::<UploadResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn content_request() -> ContentRequest {
        ContentRequest {
            user_prompt: "Summarize the week in tech".to_string(),
            system_prompt: "You are a podcast host".to_string(),
        }
    }

    #[tokio::test]
    async fn content_create_re_serializes_the_dialogue_lines() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook/podcast/content/create"))
            .and(body_json(json!({
                "userPrompt": "Summarize the week in tech",
                "systemPrompt": "You are a podcast host"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "output": [
                    { "text": "Welcome back!", "speaker": "A" },
                    { "text": "Glad to be here.", "speaker": "B" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GenerationClient::new(Some(server.uri()));
        let response = client
            .create_content(&content_request())
            .await
            .expect("content creation should succeed");

        assert!(response.content.contains("Welcome back!"));
        assert!(response.content.contains("\"speaker\""));
    }

    #[tokio::test]
    async fn upstream_failure_surfaces_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook/podcast/content/create"))
            .respond_with(ResponseTemplate::new(500).set_body_string("generator exploded"))
            .mount(&server)
            .await;

        let client = GenerationClient::new(Some(server.uri()));
        let error = client
            .create_content(&content_request())
            .await
            .expect_err("a 500 upstream must fail the call");

        match error {
            AppError::ExternalService(e) => {
                let message = format!("{}", e);
                assert!(message.contains("500"));
                assert!(message.contains("generator exploded"));
            }
            other => panic!("expected ExternalService, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn video_create_relays_the_upstream_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook/podcast/video/create"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "jobId": "abc-123" })),
            )
            .mount(&server)
            .await;

        let client = GenerationClient::new(Some(server.uri()));
        let body = client
            .create_video(&VideoCreateRequest {
                title: "Episode 1".to_string(),
                content: "[]".to_string(),
            })
            .await
            .expect("video creation should succeed");

        assert_eq!(body, json!({ "jobId": "abc-123" }));
    }

    #[tokio::test]
    async fn upload_parses_code_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook/podcast/video/upload"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "code": 0, "message": "queued" })),
            )
            .mount(&server)
            .await;

        let client = GenerationClient::new(Some(server.uri()));
        let response = client
            .upload_video(&json!({ "id": "v1", "title": "Episode 1" }))
            .await
            .expect("upload should succeed");

        assert_eq!(response.code, 0);
        assert_eq!(response.message, "queued");
    }

    #[tokio::test]
    async fn missing_base_url_is_a_configuration_error() {
        let client = GenerationClient::new(None);
        let error = client
            .create_content(&content_request())
            .await
            .expect_err("no base URL must fail the call");

        assert!(matches!(error, AppError::Configuration(_)));
    }
}
