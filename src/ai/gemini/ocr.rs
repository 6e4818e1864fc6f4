use super::client::GeminiHttpClient;
use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::ai::TextExtractionService;
use crate::config::Config;
use crate::error::FailureKind;
use crate::{Error, Result};
use async_trait::async_trait;

/// Instruction sent ahead of the image in every request.
pub const EXTRACTION_PROMPT: &str = "Extract all text from this image.";

/// Image-to-text adapter backed by Gemini `generateContent`.
pub struct GeminiOcrClient {
    http: GeminiHttpClient,
}

impl GeminiOcrClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        let http = GeminiHttpClient::new_with_client(api_key, model, client);
        tracing::info!("Gemini OCR client ready (model: {})", http.model());
        Self { http }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_key.clone(), config.model.clone()).with_base_url(config.base_url.clone())
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    fn validate(image_bytes: &[u8], mime_type: &str) -> Result<()> {
        if image_bytes.is_empty() {
            return Err(Error::InvalidInput("image is empty".to_string()));
        }
        if mime_type.trim().is_empty() {
            return Err(Error::InvalidInput("MIME type is blank".to_string()));
        }
        Ok(())
    }

    async fn request_text(&self, image_bytes: &[u8], mime_type: &str) -> Result<Option<String>> {
        Self::validate(image_bytes, mime_type)?;

        use base64::Engine as _;
        let base64_image = base64::engine::general_purpose::STANDARD.encode(image_bytes);

        let request =
            GenerateContentRequest::instruction_with_image(EXTRACTION_PROMPT, mime_type, base64_image);

        tracing::info!(
            "Sending OCR request to Gemini ({} bytes, {})",
            image_bytes.len(),
            mime_type
        );

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        Ok(response.first_text().map(str::to_string))
    }
}

#[async_trait]
impl TextExtractionService for GeminiOcrClient {
    async fn extract_text(&self, image_bytes: &[u8], mime_type: &str) -> String {
        match self.request_text(image_bytes, mime_type).await {
            Ok(Some(text)) => {
                tracing::info!("Extracted {} characters of text", text.chars().count());
                text
            }
            Ok(None) => {
                tracing::warn!("Gemini response contained no text");
                String::new()
            }
            Err(e) => {
                match e.kind() {
                    FailureKind::Input => tracing::warn!("Skipping OCR request: {}", e),
                    FailureKind::Transport => tracing::error!("Gemini OCR request failed: {}", e),
                    FailureKind::Decode => tracing::error!("Gemini OCR response unreadable: {}", e),
                    FailureKind::Unexpected => tracing::error!("Unexpected OCR failure: {}", e),
                }
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::capture_levels;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, header, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    const GENERATE_CONTENT_PATH_REGEX: &str = r"^/v1beta/models/[^/]+:generateContent$";

    fn make_client(server: &MockServer) -> GeminiOcrClient {
        GeminiOcrClient::new("test-key".to_string(), "gemini-2.0-flash".to_string())
            .with_base_url(server.uri())
    }

    fn text_response(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }] }
            }]
        }))
    }

    #[tokio::test]
    async fn test_returns_first_candidate_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .respond_with(text_response("Hello"))
            .expect(1)
            .mount(&server)
            .await;

        let text = make_client(&server).extract_text(PNG_BYTES, "image/png").await;
        assert_eq!(text, "Hello");
    }

    #[tokio::test]
    async fn test_request_shape_and_auth_header() {
        let server = MockServer::start().await;

        use base64::Engine as _;
        let expected_data = base64::engine::general_purpose::STANDARD.encode(PNG_BYTES);

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_json(serde_json::json!({
                "contents": [{
                    "parts": [
                        { "text": EXTRACTION_PROMPT },
                        { "inlineData": { "mimeType": "image/png", "data": expected_data } }
                    ]
                }]
            })))
            .respond_with(text_response("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let text = make_client(&server).extract_text(PNG_BYTES, "image/png").await;
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn test_text_is_returned_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(text_response("  Line 1\n  Line 2\n"))
            .mount(&server)
            .await;

        let text = make_client(&server).extract_text(PNG_BYTES, "image/png").await;
        assert_eq!(text, "  Line 1\n  Line 2\n");
    }

    #[tokio::test]
    async fn test_empty_image_skips_network_call() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(text_response("should not be used"))
            .expect(0)
            .mount(&server)
            .await;

        let (levels, _guard) = capture_levels();
        let text = make_client(&server).extract_text(&[], "image/png").await;

        assert_eq!(text, "");
        assert_eq!(levels.warnings(), 1);
        assert_eq!(levels.errors(), 0);
    }

    #[tokio::test]
    async fn test_blank_mime_type_skips_network_call() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(text_response("should not be used"))
            .expect(0)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let (levels, _guard) = capture_levels();

        assert_eq!(client.extract_text(PNG_BYTES, "").await, "");
        assert_eq!(client.extract_text(PNG_BYTES, "   ").await, "");
        assert_eq!(levels.warnings(), 2);
        assert_eq!(levels.errors(), 0);
    }

    #[tokio::test]
    async fn test_empty_candidates_yield_empty_string() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let (levels, _guard) = capture_levels();
        let text = make_client(&server).extract_text(PNG_BYTES, "image/png").await;

        assert_eq!(text, "");
        assert_eq!(levels.errors(), 0);
        assert_eq!(levels.warnings(), 1);
    }

    #[tokio::test]
    async fn test_blank_text_yields_empty_string() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(text_response("   \n"))
            .mount(&server)
            .await;

        let text = make_client(&server).extract_text(PNG_BYTES, "image/png").await;
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_server_error_logs_one_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .expect(1)
            .mount(&server)
            .await;

        let (levels, _guard) = capture_levels();
        let text = make_client(&server).extract_text(PNG_BYTES, "image/png").await;

        assert_eq!(text, "");
        assert_eq!(levels.errors(), 1);
    }

    #[tokio::test]
    async fn test_non_json_body_logs_one_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("definitely not json"))
            .expect(1)
            .mount(&server)
            .await;

        let (levels, _guard) = capture_levels();
        let text = make_client(&server).extract_text(PNG_BYTES, "image/png").await;

        assert_eq!(text, "");
        assert_eq!(levels.errors(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_host_yields_empty_string() {
        // Reserve a free port, then release it so nothing is listening there.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = GeminiOcrClient::new("k".to_string(), "gemini-2.0-flash".to_string())
            .with_base_url(format!("http://127.0.0.1:{}", port));

        let (levels, _guard) = capture_levels();
        let text = client.extract_text(PNG_BYTES, "image/png").await;

        assert_eq!(text, "");
        assert_eq!(levels.errors(), 1);
    }

    #[tokio::test]
    async fn test_repeated_calls_are_identical() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(text_response("Same every time"))
            .expect(2)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let first = client.extract_text(PNG_BYTES, "image/png").await;
        let second = client.extract_text(PNG_BYTES, "image/png").await;

        assert_eq!(first, "Same every time");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(text_response("parallel"))
            .expect(4)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let results = tokio::join!(
            client.extract_text(PNG_BYTES, "image/png"),
            client.extract_text(PNG_BYTES, "image/jpeg"),
            client.extract_text(PNG_BYTES, "image/webp"),
            client.extract_text(PNG_BYTES, "image/gif"),
        );

        assert_eq!(results.0, "parallel");
        assert_eq!(results.1, "parallel");
        assert_eq!(results.2, "parallel");
        assert_eq!(results.3, "parallel");
    }
}
