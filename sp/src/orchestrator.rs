//! Shooting-Plan Orchestrator
//!
//! Owns the [`ShootingPlanState`] snapshot and drives the
//! upload -> suggest -> plan workflow plus the per-pose prompt and image
//! generation. Every transition derives a new snapshot from the current one
//! and replaces it whole; subscribers see each replacement through a
//! `watch` channel.
//!
//! Uploads and plan requests carry a generation number. A reply whose
//! generation no longer matches the snapshot is dropped, so a slow response
//! from a superseded request never overwrites fresher state.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::{PlanParams, PoseParams, RenderParams, StudioBackend};
use crate::image::{self, ImageError};
use crate::reporter::ErrorReporter;
use crate::session::{SessionError, SessionStore, User};
use crate::state::{ImageSize, ShootingPlanState};

pub struct Orchestrator {
    state: watch::Sender<ShootingPlanState>,
    backend: Arc<dyn StudioBackend>,
    session: Arc<dyn SessionStore>,
    reporter: Arc<dyn ErrorReporter>,
    user: Mutex<Option<User>>,
}

impl Orchestrator {
    /// Create an orchestrator with an empty snapshot
    ///
    /// The stored user is read once here. A record that cannot be read is
    /// reported and treated as signed out.
    pub fn new(
        backend: Arc<dyn StudioBackend>,
        session: Arc<dyn SessionStore>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        debug!("Orchestrator::new: called");
        let user = match session.load() {
            Ok(user) => user,
            Err(e) => {
                reporter.report("session", &e.to_string());
                None
            }
        };
        let (state, _) = watch::channel(ShootingPlanState::default());

        Self {
            state,
            backend,
            session,
            reporter,
            user: Mutex::new(user),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> ShootingPlanState {
        self.state.borrow().clone()
    }

    /// Receiver that sees every snapshot replacement
    pub fn subscribe(&self) -> watch::Receiver<ShootingPlanState> {
        self.state.subscribe()
    }

    /// Replace the snapshot with one derived from it
    fn transition(&self, f: impl FnOnce(&ShootingPlanState) -> ShootingPlanState) {
        self.state.send_modify(|current| {
            let next = f(current);
            *current = next;
        });
    }

    /// Replace the snapshot only if `f` yields one, returning `f`'s extra value
    ///
    /// The check and the replacement happen under one lock.
    fn transition_with<R>(&self, f: impl FnOnce(&ShootingPlanState) -> Option<(ShootingPlanState, R)>) -> Option<R> {
        let mut out = None;
        self.state.send_if_modified(|current| match f(current) {
            Some((next, extra)) => {
                *current = next;
                out = Some(extra);
                true
            }
            None => false,
        });
        out
    }

    // =========================================================================
    // Upload and suggestions
    // =========================================================================

    /// Read an image file and run the suggestion pair on it
    ///
    /// A read failure is returned and leaves the snapshot untouched.
    pub async fn handle_image_upload(&self, path: impl AsRef<Path>) -> Result<(), ImageError> {
        debug!(path = ?path.as_ref(), "handle_image_upload: called");
        let data_uri = image::read_data_uri(path).await?;
        self.handle_image_data(data_uri).await;
        Ok(())
    }

    /// Store an uploaded image and fetch both suggestion lists for it
    ///
    /// Both lists are applied together or not at all. If either request
    /// fails, both flags are reset, both lists stay empty, and the failure
    /// goes to the reporter.
    pub async fn handle_image_data(&self, data_uri: String) {
        debug!(len = data_uri.len(), "handle_image_data: called");
        let mut generation = 0;
        self.transition(|s| {
            generation = s.upload_generation + 1;
            ShootingPlanState {
                image: Some(data_uri.clone()),
                is_suggesting_contexts: true,
                is_suggesting_model_styles: true,
                suggested_contexts: Vec::new(),
                suggested_model_styles: Vec::new(),
                upload_generation: generation,
                ..s.clone()
            }
        });

        let (contexts, styles) = tokio::join!(
            self.backend.suggest_shooting_contexts(&data_uri),
            self.backend.suggest_model_styles(&data_uri)
        );

        let outcome = match (contexts, styles) {
            (Ok(contexts), Ok(styles)) => Ok((contexts, styles)),
            (Err(e), _) | (_, Err(e)) => Err(e),
        };

        let applied = match outcome {
            Ok((contexts, styles)) => {
                info!(contexts = contexts.len(), styles = styles.len(), "Suggestions received");
                self.transition_with(|s| {
                    (s.upload_generation == generation).then(|| {
                        let next = ShootingPlanState {
                            suggested_contexts: contexts,
                            suggested_model_styles: styles,
                            is_suggesting_contexts: false,
                            is_suggesting_model_styles: false,
                            ..s.clone()
                        };
                        (next, ())
                    })
                })
            }
            Err(e) => {
                debug!(status = ?e.status(), "handle_image_data: suggestion request failed");
                self.reporter.report("suggest", &e.to_string());
                self.transition_with(|s| {
                    (s.upload_generation == generation).then(|| {
                        let next = ShootingPlanState {
                            is_suggesting_contexts: false,
                            is_suggesting_model_styles: false,
                            ..s.clone()
                        };
                        (next, ())
                    })
                })
            }
        };

        if applied.is_none() {
            debug!(%generation, "handle_image_data: dropping suggestions for superseded upload");
        }
    }

    /// Attach an optional close-up reference image used by plan generation
    pub async fn set_closeup_image(&self, path: impl AsRef<Path>) -> Result<(), ImageError> {
        debug!(path = ?path.as_ref(), "set_closeup_image: called");
        let data_uri = image::read_data_uri(path).await?;
        self.transition(|s| ShootingPlanState {
            closeup_image: Some(data_uri),
            ..s.clone()
        });
        Ok(())
    }

    /// Attach an optional face reference image used by plan generation
    pub async fn set_face_image(&self, path: impl AsRef<Path>) -> Result<(), ImageError> {
        debug!(path = ?path.as_ref(), "set_face_image: called");
        let data_uri = image::read_data_uri(path).await?;
        self.transition(|s| ShootingPlanState {
            face_image: Some(data_uri),
            ..s.clone()
        });
        Ok(())
    }

    // =========================================================================
    // Selections
    // =========================================================================

    pub fn set_context(&self, context: impl Into<String>) {
        let context = context.into();
        debug!(%context, "set_context: called");
        self.transition(|s| ShootingPlanState { context, ..s.clone() });
    }

    pub fn set_model_style(&self, model_style: impl Into<String>) {
        let model_style = model_style.into();
        debug!(%model_style, "set_model_style: called");
        self.transition(|s| ShootingPlanState {
            model_style,
            ..s.clone()
        });
    }

    pub fn set_image_size(&self, image_size: ImageSize) {
        debug!(%image_size, "set_image_size: called");
        self.transition(|s| ShootingPlanState {
            image_size,
            ..s.clone()
        });
    }

    // =========================================================================
    // Plan
    // =========================================================================

    /// Generate the shooting plan from the current image, context and model style
    ///
    /// Does nothing unless all three are present. The previous plan stays
    /// visible until the new one arrives.
    pub async fn handle_generate_plan(&self) {
        debug!("handle_generate_plan: called");
        let started = self.transition_with(|s| {
            if !s.can_generate_plan() {
                return None;
            }
            let params = PlanParams {
                image_base64: s.image.clone()?,
                context: s.context.clone(),
                model_style: s.model_style.clone(),
                closeup_image_base64: s.closeup_image.clone(),
                face_image_base64: s.face_image.clone(),
            };
            let generation = s.plan_generation + 1;
            let next = ShootingPlanState {
                is_loading_plan: true,
                error: None,
                plan_generation: generation,
                ..s.clone()
            };
            Some((next, (params, generation)))
        });

        let Some((params, generation)) = started else {
            debug!("handle_generate_plan: missing image, context or model style");
            return;
        };

        let result = self.backend.generate_shooting_plan(params).await;

        let applied = self.transition_with(|s| {
            if s.plan_generation != generation {
                return None;
            }
            let next = match &result {
                Ok(text) => ShootingPlanState {
                    plan_result: Some(text.clone()),
                    is_loading_plan: false,
                    ..s.clone()
                },
                Err(e) => ShootingPlanState {
                    is_loading_plan: false,
                    error: Some(e.to_string()),
                    ..s.clone()
                },
            };
            Some((next, ()))
        });

        match (&result, applied) {
            (_, None) => debug!(%generation, "handle_generate_plan: dropping reply for superseded request"),
            (Ok(text), Some(())) => info!(len = text.len(), "Shooting plan generated"),
            (Err(e), Some(())) => warn!(error = %e, status = ?e.status(), "Shooting plan failed"),
        }
    }

    // =========================================================================
    // Poses
    // =========================================================================

    /// Generate the JSON prompt for one pose
    ///
    /// Needs an image and no other pose prompt in flight. The current
    /// context is sent as the user context. A reply for an image that has
    /// since been replaced only clears the in-flight marker.
    pub async fn handle_generate_pose_prompt(&self, pose_id: &str, concept: &str, pose_description: &str) {
        debug!(%pose_id, %concept, "handle_generate_pose_prompt: called");
        let started = self.transition_with(|s| {
            if s.generating_pose_prompt_id.is_some() {
                return None;
            }
            let params = PoseParams {
                image_base64: s.image.clone()?,
                concept: concept.to_string(),
                pose_description: pose_description.to_string(),
                user_context: s.context.clone(),
            };
            let next = ShootingPlanState {
                generating_pose_prompt_id: Some(pose_id.to_string()),
                error: None,
                ..s.clone()
            };
            Some((next, (params, s.upload_generation)))
        });

        let Some((params, generation)) = started else {
            debug!("handle_generate_pose_prompt: no image or a pose prompt is in flight");
            return;
        };

        let result = self.backend.generate_pose_prompt(params).await;
        if let Err(e) = &result {
            warn!(%pose_id, error = %e, status = ?e.status(), "Pose prompt failed");
        }

        self.transition(|s| {
            let mut next = ShootingPlanState {
                generating_pose_prompt_id: None,
                ..s.clone()
            };
            if s.upload_generation != generation {
                debug!(%pose_id, "handle_generate_pose_prompt: dropping reply for replaced image");
                return next;
            }
            match result {
                Ok(json) => {
                    next.pose_prompts.insert(pose_id.to_string(), json);
                }
                Err(e) => next.error = Some(e.to_string()),
            }
            next
        });
    }

    /// Render the image for a pose whose prompt is already generated
    ///
    /// A reply for an image that has since been replaced only clears the
    /// in-flight markers.
    pub async fn handle_generate_pose_image(&self, pose_id: &str) {
        debug!(%pose_id, "handle_generate_pose_image: called");
        let started = self.transition_with(|s| {
            if s.generating_pose_image_id.is_some() {
                return None;
            }
            let params = RenderParams {
                image_base64: s.image.clone()?,
                json_prompt: s.pose_prompts.get(pose_id)?.clone(),
                size: s.image_size.to_string(),
            };
            let next = ShootingPlanState {
                is_generating_image: true,
                generating_pose_image_id: Some(pose_id.to_string()),
                error: None,
                ..s.clone()
            };
            Some((next, (params, s.upload_generation)))
        });

        let Some((params, generation)) = started else {
            debug!("handle_generate_pose_image: no image, no prompt for pose, or a render is in flight");
            return;
        };

        let result = self.backend.generate_image_from_json_prompt(params).await;
        if let Err(e) = &result {
            warn!(%pose_id, error = %e, status = ?e.status(), "Pose image failed");
        }

        self.transition(|s| {
            let mut next = ShootingPlanState {
                is_generating_image: false,
                generating_pose_image_id: None,
                ..s.clone()
            };
            if s.upload_generation != generation {
                debug!(%pose_id, "handle_generate_pose_image: dropping reply for replaced image");
                return next;
            }
            match result {
                Ok(uri) => {
                    next.pose_images.insert(pose_id.to_string(), uri.clone());
                    next.generated_image = Some(uri);
                }
                Err(e) => next.error = Some(e.to_string()),
            }
            next
        });
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub fn user(&self) -> Option<User> {
        self.user.lock().ok().and_then(|u| u.clone())
    }

    /// Persist and adopt a signed-in user
    pub fn login(&self, user: User) -> Result<(), SessionError> {
        debug!(email = %user.email, "login: called");
        self.session.save(&user)?;
        if let Ok(mut slot) = self.user.lock() {
            *slot = Some(user);
        }
        Ok(())
    }

    /// Forget the signed-in user
    pub fn logout(&self) -> Result<(), SessionError> {
        debug!("logout: called");
        self.session.clear()?;
        if let Ok(mut slot) = self.user.lock() {
            *slot = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCall, MockBackend, api_error};
    use crate::reporter::RecordingReporter;
    use crate::session::MemorySessionStore;
    use std::time::Duration;

    const IMAGE: &str = "data:image/png;base64,QQ==";

    struct Harness {
        orchestrator: Arc<Orchestrator>,
        backend: Arc<MockBackend>,
        reporter: Arc<RecordingReporter>,
        session: Arc<MemorySessionStore>,
    }

    fn harness() -> Harness {
        harness_with_session(MemorySessionStore::new())
    }

    fn harness_with_session(session: MemorySessionStore) -> Harness {
        let backend = Arc::new(MockBackend::new());
        let reporter = Arc::new(RecordingReporter::new());
        let session = Arc::new(session);
        let orchestrator = Arc::new(Orchestrator::new(backend.clone(), session.clone(), reporter.clone()));
        Harness {
            orchestrator,
            backend,
            reporter,
            session,
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    async fn ready_for_plan(h: &Harness) {
        h.backend.push_contexts(Ok(strings(&["Studio"])));
        h.backend.push_styles(Ok(strings(&["Editorial"])));
        h.orchestrator.handle_image_data(IMAGE.to_string()).await;
        h.orchestrator.set_context("Studio");
        h.orchestrator.set_model_style("Editorial");
    }

    #[tokio::test]
    async fn test_upload_populates_both_suggestion_lists() {
        let h = harness();
        h.backend.push_contexts(Ok(strings(&["a", "b"])));
        h.backend.push_styles(Ok(strings(&["x"])));

        h.orchestrator.handle_image_data(IMAGE.to_string()).await;

        let s = h.orchestrator.snapshot();
        assert_eq!(s.image.as_deref(), Some(IMAGE));
        assert_eq!(s.suggested_contexts, strings(&["a", "b"]));
        assert_eq!(s.suggested_model_styles, strings(&["x"]));
        assert!(!s.is_suggesting_contexts);
        assert!(!s.is_suggesting_model_styles);
        assert!(h.reporter.reports().is_empty());
    }

    #[tokio::test]
    async fn test_one_failed_suggestion_discards_both() {
        let h = harness();
        h.backend.push_contexts(Err(api_error("context model down")));
        h.backend.push_styles(Ok(strings(&["Editorial"])));

        h.orchestrator.handle_image_data(IMAGE.to_string()).await;

        let s = h.orchestrator.snapshot();
        assert!(!s.is_suggesting_contexts);
        assert!(!s.is_suggesting_model_styles);
        assert!(s.suggested_contexts.is_empty());
        assert!(s.suggested_model_styles.is_empty());
        assert!(s.error.is_none());
        assert_eq!(
            h.reporter.reports(),
            vec![("suggest".to_string(), "context model down".to_string())]
        );
    }

    #[tokio::test]
    async fn test_style_failure_also_discards_both() {
        let h = harness();
        h.backend.push_contexts(Ok(strings(&["Studio"])));
        h.backend.push_styles(Err(api_error("styles down")));

        h.orchestrator.handle_image_data(IMAGE.to_string()).await;

        let s = h.orchestrator.snapshot();
        assert!(s.suggested_contexts.is_empty());
        assert!(s.suggested_model_styles.is_empty());
        assert_eq!(h.reporter.reports().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_clears_previous_suggestions_and_sets_flags() {
        let h = harness();
        h.backend.push_contexts(Ok(strings(&["old"])));
        h.backend.push_styles(Ok(strings(&["old"])));
        h.orchestrator.handle_image_data(IMAGE.to_string()).await;

        h.backend.push_contexts_delayed(Duration::from_millis(100), Ok(strings(&["new"])));
        h.backend.push_styles(Ok(strings(&["new"])));
        let mut rx = h.orchestrator.subscribe();
        let o = h.orchestrator.clone();
        let task = tokio::spawn(async move { o.handle_image_data("data:image/jpeg;base64,/9j/".to_string()).await });

        rx.wait_for(|s| s.is_suggesting_contexts).await.unwrap();
        let s = h.orchestrator.snapshot();
        assert!(s.is_suggesting_model_styles);
        assert!(s.suggested_contexts.is_empty());
        assert!(s.suggested_model_styles.is_empty());

        task.await.unwrap();
        assert_eq!(h.orchestrator.snapshot().suggested_contexts, strings(&["new"]));
    }

    #[tokio::test]
    async fn test_stale_suggestions_are_dropped() {
        let h = harness();
        // First upload answers slowly, second one quickly
        h.backend.push_contexts_delayed(Duration::from_millis(200), Ok(strings(&["stale"])));
        h.backend.push_styles_delayed(Duration::from_millis(200), Ok(strings(&["stale"])));
        h.backend.push_contexts(Ok(strings(&["fresh"])));
        h.backend.push_styles(Ok(strings(&["fresh"])));

        let o = h.orchestrator.clone();
        let first = tokio::spawn(async move { o.handle_image_data("data:image/png;base64,AAAA".to_string()).await });
        let mut rx = h.orchestrator.subscribe();
        rx.wait_for(|s| s.upload_generation == 1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        h.orchestrator.handle_image_data(IMAGE.to_string()).await;
        first.await.unwrap();

        let s = h.orchestrator.snapshot();
        assert_eq!(s.image.as_deref(), Some(IMAGE));
        assert_eq!(s.suggested_contexts, strings(&["fresh"]));
        assert_eq!(s.suggested_model_styles, strings(&["fresh"]));
        assert_eq!(s.upload_generation, 2);
    }

    #[tokio::test]
    async fn test_plan_is_noop_without_preconditions() {
        let h = harness();
        h.orchestrator.handle_generate_plan().await;
        assert_eq!(h.orchestrator.snapshot(), ShootingPlanState::default());

        h.orchestrator.set_context("Studio");
        h.orchestrator.set_model_style("Editorial");
        let before = h.orchestrator.snapshot();
        h.orchestrator.handle_generate_plan().await;
        assert_eq!(h.orchestrator.snapshot(), before);

        h.backend.push_contexts(Ok(Vec::new()));
        h.backend.push_styles(Ok(Vec::new()));
        h.orchestrator.handle_image_data(IMAGE.to_string()).await;
        h.orchestrator.set_model_style("");
        let before = h.orchestrator.snapshot();
        h.orchestrator.handle_generate_plan().await;
        assert_eq!(h.orchestrator.snapshot(), before);

        // Only the two suggestion calls reached the backend
        assert_eq!(h.backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_plan_success() {
        let h = harness();
        ready_for_plan(&h).await;
        h.backend.push_plan(Ok("Plan A".to_string()));

        h.orchestrator.handle_generate_plan().await;

        let s = h.orchestrator.snapshot();
        assert_eq!(s.plan_result.as_deref(), Some("Plan A"));
        assert!(!s.is_loading_plan);
        assert!(s.error.is_none());

        let calls = h.backend.calls();
        assert_eq!(
            calls.last(),
            Some(&BackendCall::Plan(PlanParams {
                image_base64: IMAGE.to_string(),
                context: "Studio".to_string(),
                model_style: "Editorial".to_string(),
                closeup_image_base64: None,
                face_image_base64: None,
            }))
        );
    }

    #[tokio::test]
    async fn test_plan_failure_sets_error_and_keeps_previous_plan() {
        let h = harness();
        ready_for_plan(&h).await;
        h.backend.push_plan(Ok("Plan A".to_string()));
        h.orchestrator.handle_generate_plan().await;

        h.backend.push_plan(Err(api_error("Gemini call failed")));
        h.orchestrator.handle_generate_plan().await;

        let s = h.orchestrator.snapshot();
        assert!(!s.is_loading_plan);
        assert_eq!(s.error.as_deref(), Some("Gemini call failed"));
        assert_eq!(s.plan_result.as_deref(), Some("Plan A"));
    }

    #[tokio::test]
    async fn test_plan_start_clears_error() {
        let h = harness();
        ready_for_plan(&h).await;
        h.backend.push_plan(Err(api_error("first failure")));
        h.orchestrator.handle_generate_plan().await;
        assert!(h.orchestrator.snapshot().error.is_some());

        h.backend.push_plan_delayed(Duration::from_millis(100), Ok("Plan B".to_string()));
        let mut rx = h.orchestrator.subscribe();
        let o = h.orchestrator.clone();
        let task = tokio::spawn(async move { o.handle_generate_plan().await });

        rx.wait_for(|s| s.is_loading_plan).await.unwrap();
        assert!(h.orchestrator.snapshot().error.is_none());
        task.await.unwrap();
        assert_eq!(h.orchestrator.snapshot().plan_result.as_deref(), Some("Plan B"));
    }

    #[tokio::test]
    async fn test_stale_plan_reply_is_dropped() {
        let h = harness();
        ready_for_plan(&h).await;
        h.backend.push_plan_delayed(Duration::from_millis(200), Ok("old plan".to_string()));
        h.backend.push_plan(Ok("new plan".to_string()));

        let o = h.orchestrator.clone();
        let first = tokio::spawn(async move { o.handle_generate_plan().await });
        let mut rx = h.orchestrator.subscribe();
        rx.wait_for(|s| s.plan_generation == 1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        h.orchestrator.handle_generate_plan().await;
        first.await.unwrap();

        let s = h.orchestrator.snapshot();
        assert_eq!(s.plan_result.as_deref(), Some("new plan"));
        assert!(!s.is_loading_plan);
    }

    #[tokio::test]
    async fn test_pose_prompt_then_image() {
        let h = harness();
        ready_for_plan(&h).await;
        h.orchestrator.set_image_size(ImageSize::Size2K);
        h.backend.push_pose(Ok(r#"{"pose":"hands on hips"}"#.to_string()));
        h.backend.push_image(Ok("data:image/png;base64,Zm9v".to_string()));

        h.orchestrator
            .handle_generate_pose_prompt("pose-1", "Minimal studio", "Hands on hips")
            .await;
        let s = h.orchestrator.snapshot();
        assert_eq!(s.pose_prompts.get("pose-1").map(String::as_str), Some(r#"{"pose":"hands on hips"}"#));
        assert!(s.generating_pose_prompt_id.is_none());

        h.orchestrator.handle_generate_pose_image("pose-1").await;
        let s = h.orchestrator.snapshot();
        assert_eq!(s.pose_images.get("pose-1").map(String::as_str), Some("data:image/png;base64,Zm9v"));
        assert_eq!(s.generated_image.as_deref(), Some("data:image/png;base64,Zm9v"));
        assert!(!s.is_generating_image);
        assert!(s.generating_pose_image_id.is_none());

        let calls = h.backend.calls();
        assert!(calls.contains(&BackendCall::Pose(PoseParams {
            image_base64: IMAGE.to_string(),
            concept: "Minimal studio".to_string(),
            pose_description: "Hands on hips".to_string(),
            user_context: "Studio".to_string(),
        })));
        assert!(calls.contains(&BackendCall::Render(RenderParams {
            image_base64: IMAGE.to_string(),
            json_prompt: r#"{"pose":"hands on hips"}"#.to_string(),
            size: "2K".to_string(),
        })));
    }

    #[tokio::test]
    async fn test_pose_image_requires_prompt() {
        let h = harness();
        ready_for_plan(&h).await;
        let calls_before = h.backend.call_count();

        h.orchestrator.handle_generate_pose_image("pose-9").await;

        assert_eq!(h.backend.call_count(), calls_before);
        assert!(!h.orchestrator.snapshot().is_generating_image);
    }

    #[tokio::test]
    async fn test_pose_prompt_requires_image() {
        let h = harness();
        h.orchestrator.handle_generate_pose_prompt("pose-1", "c", "d").await;
        assert_eq!(h.backend.call_count(), 0);
        assert!(h.orchestrator.snapshot().generating_pose_prompt_id.is_none());
    }

    #[tokio::test]
    async fn test_pose_prompt_single_in_flight() {
        let h = harness();
        ready_for_plan(&h).await;
        h.backend.push_pose(Ok("{}".to_string()));
        let calls_before = h.backend.call_count();

        // Simulate a request already in flight
        h.orchestrator.transition(|s| ShootingPlanState {
            generating_pose_prompt_id: Some("pose-1".to_string()),
            ..s.clone()
        });
        h.orchestrator.handle_generate_pose_prompt("pose-2", "c", "d").await;
        assert_eq!(h.backend.call_count(), calls_before);
    }

    #[tokio::test]
    async fn test_pose_prompt_for_replaced_image_is_dropped() {
        let h = harness();
        ready_for_plan(&h).await;
        h.backend
            .push_pose_delayed(Duration::from_millis(200), Ok(r#"{"pose":"old"}"#.to_string()));

        let o = h.orchestrator.clone();
        let pending = tokio::spawn(async move { o.handle_generate_pose_prompt("pose-1", "c", "d").await });
        let mut rx = h.orchestrator.subscribe();
        rx.wait_for(|s| s.generating_pose_prompt_id.is_some()).await.unwrap();

        h.backend.push_contexts(Ok(strings(&["Beach"])));
        h.backend.push_styles(Ok(strings(&["Casual"])));
        h.orchestrator.handle_image_data("data:image/png;base64,Qg==".to_string()).await;
        pending.await.unwrap();

        let s = h.orchestrator.snapshot();
        assert_eq!(s.image.as_deref(), Some("data:image/png;base64,Qg=="));
        assert!(s.pose_prompts.is_empty());
        assert!(s.generating_pose_prompt_id.is_none());
        assert!(s.error.is_none());
    }

    #[tokio::test]
    async fn test_pose_image_for_replaced_image_is_dropped() {
        let h = harness();
        ready_for_plan(&h).await;
        h.backend.push_pose(Ok("{}".to_string()));
        h.orchestrator.handle_generate_pose_prompt("pose-1", "c", "d").await;
        h.backend
            .push_image_delayed(Duration::from_millis(200), Ok("data:image/png;base64,b2xk".to_string()));

        let o = h.orchestrator.clone();
        let pending = tokio::spawn(async move { o.handle_generate_pose_image("pose-1").await });
        let mut rx = h.orchestrator.subscribe();
        rx.wait_for(|s| s.is_generating_image).await.unwrap();

        h.backend.push_contexts(Ok(strings(&["Beach"])));
        h.backend.push_styles(Ok(strings(&["Casual"])));
        h.orchestrator.handle_image_data("data:image/png;base64,Qg==".to_string()).await;
        pending.await.unwrap();

        let s = h.orchestrator.snapshot();
        assert!(s.pose_images.is_empty());
        assert!(s.generated_image.is_none());
        assert!(!s.is_generating_image);
        assert!(s.generating_pose_image_id.is_none());
    }

    #[tokio::test]
    async fn test_pose_prompt_failure_sets_error() {
        let h = harness();
        ready_for_plan(&h).await;
        h.backend.push_pose(Err(api_error("Gemini call failed")));

        h.orchestrator.handle_generate_pose_prompt("pose-1", "c", "d").await;

        let s = h.orchestrator.snapshot();
        assert_eq!(s.error.as_deref(), Some("Gemini call failed"));
        assert!(s.pose_prompts.is_empty());
        assert!(s.generating_pose_prompt_id.is_none());
    }

    #[tokio::test]
    async fn test_login_logout_persist() {
        let h = harness();
        assert!(h.orchestrator.user().is_none());

        let user = User::from_login("lan@athea.vn", "secret", None, false).unwrap();
        h.orchestrator.login(user.clone()).unwrap();
        assert_eq!(h.orchestrator.user(), Some(user.clone()));
        assert_eq!(h.session.load().unwrap(), Some(user));

        h.orchestrator.logout().unwrap();
        assert!(h.orchestrator.user().is_none());
        assert!(h.session.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stored_user_is_read_at_construction() {
        let user = User {
            email: "lan@athea.vn".to_string(),
            name: "lan".to_string(),
        };
        let h = harness_with_session(MemorySessionStore::with_user(user.clone()));
        assert_eq!(h.orchestrator.user(), Some(user));
    }

    #[tokio::test]
    async fn test_upload_read_failure_leaves_state() {
        let h = harness();
        let result = h.orchestrator.handle_image_upload("/nonexistent/athea/shoe.png").await;
        assert!(result.is_err());
        assert_eq!(h.orchestrator.snapshot(), ShootingPlanState::default());
        assert_eq!(h.backend.call_count(), 0);
    }
}
