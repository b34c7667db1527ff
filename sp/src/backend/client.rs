//! StudioBackend trait definition

use async_trait::async_trait;

use super::{BackendError, PlanParams, PoseParams, RenderParams};

/// The five gateway operations the orchestrator depends on
#[async_trait]
pub trait StudioBackend: Send + Sync {
    async fn suggest_shooting_contexts(&self, image_base64: &str) -> Result<Vec<String>, BackendError>;

    async fn suggest_model_styles(&self, image_base64: &str) -> Result<Vec<String>, BackendError>;

    /// Returns the plan text
    async fn generate_shooting_plan(&self, params: PlanParams) -> Result<String, BackendError>;

    /// Returns the pose description as a JSON string
    async fn generate_pose_prompt(&self, params: PoseParams) -> Result<String, BackendError>;

    /// Returns the rendered image as a `data:image/png;base64,` URI
    async fn generate_image_from_json_prompt(&self, params: RenderParams) -> Result<String, BackendError>;
}

pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tracing::debug;

    /// One recorded call to the mock backend
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum BackendCall {
        SuggestContexts(String),
        SuggestStyles(String),
        Plan(PlanParams),
        Pose(PoseParams),
        Render(RenderParams),
    }

    type Queue<T> = Mutex<VecDeque<(Duration, Result<T, BackendError>)>>;

    /// Mock backend for tests
    ///
    /// Each operation pops its own queue of results. A result can carry a
    /// delay to simulate a slow request. An empty queue answers with an
    /// `Api` error.
    #[derive(Default)]
    pub struct MockBackend {
        contexts: Queue<Vec<String>>,
        styles: Queue<Vec<String>>,
        plans: Queue<String>,
        poses: Queue<String>,
        images: Queue<String>,
        calls: Mutex<Vec<BackendCall>>,
    }

    fn push<T>(queue: &Queue<T>, delay: Duration, result: Result<T, BackendError>) {
        if let Ok(mut q) = queue.lock() {
            q.push_back((delay, result));
        }
    }

    async fn pop<T>(queue: &Queue<T>, name: &str) -> Result<T, BackendError> {
        let next = queue.lock().ok().and_then(|mut q| q.pop_front());
        match next {
            Some((delay, result)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => {
                debug!(%name, "MockBackend: no more mock results");
                Err(BackendError::Api {
                    status: 500,
                    message: format!("No more mock results for {}", name),
                })
            }
        }
    }

    /// Shorthand for a server-reported failure
    pub fn api_error(message: &str) -> BackendError {
        BackendError::Api {
            status: 500,
            message: message.to_string(),
        }
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_contexts(&self, result: Result<Vec<String>, BackendError>) {
            push(&self.contexts, Duration::ZERO, result);
        }

        pub fn push_contexts_delayed(&self, delay: Duration, result: Result<Vec<String>, BackendError>) {
            push(&self.contexts, delay, result);
        }

        pub fn push_styles(&self, result: Result<Vec<String>, BackendError>) {
            push(&self.styles, Duration::ZERO, result);
        }

        pub fn push_styles_delayed(&self, delay: Duration, result: Result<Vec<String>, BackendError>) {
            push(&self.styles, delay, result);
        }

        pub fn push_plan(&self, result: Result<String, BackendError>) {
            push(&self.plans, Duration::ZERO, result);
        }

        pub fn push_plan_delayed(&self, delay: Duration, result: Result<String, BackendError>) {
            push(&self.plans, delay, result);
        }

        pub fn push_pose(&self, result: Result<String, BackendError>) {
            push(&self.poses, Duration::ZERO, result);
        }

        pub fn push_image(&self, result: Result<String, BackendError>) {
            push(&self.images, Duration::ZERO, result);
        }

        pub fn push_pose_delayed(&self, delay: Duration, result: Result<String, BackendError>) {
            push(&self.poses, delay, result);
        }

        pub fn push_image_delayed(&self, delay: Duration, result: Result<String, BackendError>) {
            push(&self.images, delay, result);
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().map(|c| c.len()).unwrap_or(0)
        }

        /// Calls received so far, in call order
        pub fn calls(&self) -> Vec<BackendCall> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        fn record(&self, call: BackendCall) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call);
            }
        }
    }

    #[async_trait]
    impl StudioBackend for MockBackend {
        async fn suggest_shooting_contexts(&self, image_base64: &str) -> Result<Vec<String>, BackendError> {
            self.record(BackendCall::SuggestContexts(image_base64.to_string()));
            pop(&self.contexts, "contexts").await
        }

        async fn suggest_model_styles(&self, image_base64: &str) -> Result<Vec<String>, BackendError> {
            self.record(BackendCall::SuggestStyles(image_base64.to_string()));
            pop(&self.styles, "styles").await
        }

        async fn generate_shooting_plan(&self, params: PlanParams) -> Result<String, BackendError> {
            self.record(BackendCall::Plan(params));
            pop(&self.plans, "plan").await
        }

        async fn generate_pose_prompt(&self, params: PoseParams) -> Result<String, BackendError> {
            self.record(BackendCall::Pose(params));
            pop(&self.poses, "pose").await
        }

        async fn generate_image_from_json_prompt(&self, params: RenderParams) -> Result<String, BackendError> {
            self.record(BackendCall::Render(params));
            pop(&self.images, "image").await
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_returns_in_order() {
            let mock = MockBackend::new();
            mock.push_contexts(Ok(vec!["a".to_string()]));
            mock.push_contexts(Err(api_error("boom")));

            assert_eq!(mock.suggest_shooting_contexts("img").await.unwrap(), vec!["a"]);
            assert_eq!(mock.suggest_shooting_contexts("img").await.unwrap_err().to_string(), "boom");
            assert!(mock.suggest_shooting_contexts("img").await.is_err());
            assert_eq!(mock.call_count(), 3);
        }

        #[tokio::test]
        async fn test_mock_records_params() {
            let mock = MockBackend::new();
            mock.push_plan(Ok("Plan A".to_string()));
            let params = PlanParams {
                image_base64: "img".to_string(),
                context: "c".to_string(),
                model_style: "s".to_string(),
                closeup_image_base64: None,
                face_image_base64: None,
            };
            mock.generate_shooting_plan(params.clone()).await.unwrap();
            assert_eq!(mock.calls(), vec![BackendCall::Plan(params)]);
        }
    }
}
