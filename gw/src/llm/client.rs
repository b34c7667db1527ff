//! GenAiClient trait definition

use async_trait::async_trait;

use super::{GenerateRequest, GenerateResponse, LlmError};

/// Stateless provider client - each call is independent
///
/// Handlers hold this as `Arc<dyn GenAiClient>` so the provider can be
/// swapped for a mock in tests.
#[async_trait]
pub trait GenAiClient: Send + Sync {
    /// Send a single generation request and wait for the full response
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError>;
}

pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tracing::debug;

    /// Mock provider for tests
    ///
    /// Returns queued results in order and records every request it receives.
    #[derive(Default)]
    pub struct MockGenAiClient {
        results: Mutex<VecDeque<Result<GenerateResponse, LlmError>>>,
        requests: Mutex<Vec<GenerateRequest>>,
    }

    impl MockGenAiClient {
        pub fn new(responses: Vec<GenerateResponse>) -> Self {
            debug!(response_count = %responses.len(), "MockGenAiClient::new: called");
            Self {
                results: Mutex::new(responses.into_iter().map(Ok).collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Queue a successful response
        pub fn push_response(&self, response: GenerateResponse) {
            if let Ok(mut results) = self.results.lock() {
                results.push_back(Ok(response));
            }
        }

        /// Queue a failure
        pub fn push_error(&self, error: LlmError) {
            if let Ok(mut results) = self.results.lock() {
                results.push_back(Err(error));
            }
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().map(|r| r.len()).unwrap_or(0)
        }

        /// Requests received so far, in call order
        pub fn requests(&self) -> Vec<GenerateRequest> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl GenAiClient for MockGenAiClient {
        async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError> {
            debug!(model = %request.model, "MockGenAiClient::generate: called");
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request);
            }
            let next = self.results.lock().ok().and_then(|mut r| r.pop_front());
            next.unwrap_or_else(|| {
                debug!("MockGenAiClient::generate: no more mock responses");
                Err(LlmError::InvalidResponse("No more mock responses".to_string()))
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_client_returns_responses_in_order() {
            let client = MockGenAiClient::new(vec![
                GenerateResponse::from_text("Response 1"),
                GenerateResponse::from_text("Response 2"),
            ]);

            let req = GenerateRequest::new("test-model").text("hi");

            let resp1 = client.generate(req.clone()).await.unwrap();
            assert_eq!(resp1.text.as_deref(), Some("Response 1"));

            let resp2 = client.generate(req).await.unwrap();
            assert_eq!(resp2.text.as_deref(), Some("Response 2"));

            assert_eq!(client.call_count(), 2);
            assert_eq!(client.requests()[0].prompt_text(), "hi");
        }

        #[tokio::test]
        async fn test_mock_client_errors_when_exhausted() {
            let client = MockGenAiClient::new(vec![]);
            let result = client.generate(GenerateRequest::new("test-model")).await;
            assert!(result.is_err());
        }

        #[tokio::test]
        async fn test_mock_client_queued_error() {
            let client = MockGenAiClient::default();
            client.push_error(LlmError::ApiError {
                status: 500,
                message: "boom".to_string(),
            });
            let err = client.generate(GenerateRequest::new("m")).await.unwrap_err();
            assert_eq!(err.status(), Some(500));
        }
    }
}
