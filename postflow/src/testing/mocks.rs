//! Mock collaborators for testing.

use crate::auth::{AuthGrant, AuthProvider, AuthSession};
use crate::collaborators::{
    ComposeRequest, GenerativeClient, ImageRequest, SocialClient, WorkflowPlan,
};
use crate::core::{ComposedPost, ImageData, Profile, PublishReceipt, ResearchResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use uuid::Uuid;

type Scripted<T> = Result<T, String>;

fn to_anyhow<T>(result: Scripted<T>) -> anyhow::Result<T> {
    result.map_err(|message| anyhow::anyhow!(message))
}

/// A generative client that returns scripted responses and records
/// every request it receives.
pub struct MockGenerativeClient {
    plan: Mutex<Scripted<WorkflowPlan>>,
    research: Mutex<Scripted<ResearchResult>>,
    compose: Mutex<Scripted<ComposedPost>>,
    image_script: Mutex<VecDeque<Scripted<ImageData>>>,
    fail_all_images: Mutex<Option<String>>,
    research_topics: Mutex<Vec<String>>,
    compose_requests: Mutex<Vec<ComposeRequest>>,
    image_requests: Mutex<Vec<ImageRequest>>,
}

impl Default for MockGenerativeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerativeClient {
    /// Creates a mock that succeeds on every call with canned content.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plan: Mutex::new(Ok(WorkflowPlan::new())),
            research: Mutex::new(Ok(ResearchResult::new("Mock research summary", Vec::new()))),
            compose: Mutex::new(Ok(ComposedPost::new(
                "Mock post text",
                Vec::new(),
                "mock image prompt",
            ))),
            image_script: Mutex::new(VecDeque::new()),
            fail_all_images: Mutex::new(None),
            research_topics: Mutex::new(Vec::new()),
            compose_requests: Mutex::new(Vec::new()),
            image_requests: Mutex::new(Vec::new()),
        }
    }

    /// Scripts the plan response.
    pub fn set_plan(&self, plan: WorkflowPlan) {
        *self.plan.lock() = Ok(plan);
    }

    /// Scripts the research response.
    pub fn set_research(&self, result: ResearchResult) {
        *self.research.lock() = Ok(result);
    }

    /// Makes research fail with the given message.
    pub fn fail_research(&self, message: impl Into<String>) {
        *self.research.lock() = Err(message.into());
    }

    /// Scripts the compose response.
    pub fn set_compose(&self, post: ComposedPost) {
        *self.compose.lock() = Ok(post);
    }

    /// Makes compose fail with the given message.
    pub fn fail_compose(&self, message: impl Into<String>) {
        *self.compose.lock() = Err(message.into());
    }

    /// Scripts per-call image outcomes, consumed in order. Once the
    /// script is exhausted, calls succeed with a canned image.
    pub fn script_images(&self, outcomes: Vec<Scripted<ImageData>>) {
        *self.image_script.lock() = outcomes.into();
    }

    /// Makes every image call fail with the given message.
    pub fn fail_all_images(&self, message: impl Into<String>) {
        *self.fail_all_images.lock() = Some(message.into());
    }

    /// Topics passed to research, in call order.
    #[must_use]
    pub fn research_topics(&self) -> Vec<String> {
        self.research_topics.lock().clone()
    }

    /// Requests passed to compose, in call order.
    #[must_use]
    pub fn compose_requests(&self) -> Vec<ComposeRequest> {
        self.compose_requests.lock().clone()
    }

    /// Requests passed to image generation, in call order.
    #[must_use]
    pub fn image_requests(&self) -> Vec<ImageRequest> {
        self.image_requests.lock().clone()
    }
}

#[async_trait]
impl GenerativeClient for MockGenerativeClient {
    async fn plan_workflow(
        &self,
        _intent: &str,
        _has_reference_image: bool,
    ) -> anyhow::Result<WorkflowPlan> {
        to_anyhow(self.plan.lock().clone())
    }

    async fn research(&self, topic: &str) -> anyhow::Result<ResearchResult> {
        self.research_topics.lock().push(topic.to_string());
        to_anyhow(self.research.lock().clone())
    }

    async fn compose(&self, request: &ComposeRequest) -> anyhow::Result<ComposedPost> {
        self.compose_requests.lock().push(request.clone());
        to_anyhow(self.compose.lock().clone())
    }

    async fn generate_image(&self, request: &ImageRequest) -> anyhow::Result<ImageData> {
        self.image_requests.lock().push(request.clone());

        if let Some(message) = self.fail_all_images.lock().clone() {
            return Err(anyhow::anyhow!(message));
        }

        match self.image_script.lock().pop_front() {
            Some(outcome) => to_anyhow(outcome),
            None => Ok(ImageData::from_bytes(b"mock-image")),
        }
    }
}

/// A social client that returns a scripted receipt and records every
/// publish call.
pub struct MockSocialClient {
    publish: Mutex<Scripted<PublishReceipt>>,
    published: Mutex<Vec<PublishedCall>>,
}

/// One recorded publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedCall {
    /// The credential used.
    pub token: String,
    /// The text posted.
    pub text: String,
    /// Whether an image was attached.
    pub has_image: bool,
}

impl Default for MockSocialClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSocialClient {
    /// Creates a mock that publishes successfully.
    #[must_use]
    pub fn new() -> Self {
        Self {
            publish: Mutex::new(Ok(PublishReceipt::new(
                "mock-post-1",
                "https://social.example/p/mock-post-1",
            ))),
            published: Mutex::new(Vec::new()),
        }
    }

    /// Scripts the publish response.
    pub fn set_publish(&self, receipt: PublishReceipt) {
        *self.publish.lock() = Ok(receipt);
    }

    /// Makes publish fail with the given message.
    pub fn fail_publish(&self, message: impl Into<String>) {
        *self.publish.lock() = Err(message.into());
    }

    /// Recorded publish calls, in order.
    #[must_use]
    pub fn published(&self) -> Vec<PublishedCall> {
        self.published.lock().clone()
    }

    /// Number of publish calls made.
    #[must_use]
    pub fn publish_count(&self) -> usize {
        self.published.lock().len()
    }
}

#[async_trait]
impl SocialClient for MockSocialClient {
    async fn publish(
        &self,
        token: &str,
        text: &str,
        image: Option<&ImageData>,
    ) -> anyhow::Result<PublishReceipt> {
        self.published.lock().push(PublishedCall {
            token: token.to_string(),
            text: text.to_string(),
            has_image: image.is_some(),
        });
        to_anyhow(self.publish.lock().clone())
    }
}

enum AuthBehavior {
    GrantAfter(usize),
    Never,
    Fail(String),
}

/// An auth provider with scripted poll behavior.
pub struct MockAuthProvider {
    behavior: AuthBehavior,
    polls: Mutex<usize>,
    closed: Mutex<bool>,
}

impl MockAuthProvider {
    /// Grants after the given number of pending polls.
    #[must_use]
    pub fn granting_after(pending_polls: usize) -> Self {
        Self {
            behavior: AuthBehavior::GrantAfter(pending_polls),
            polls: Mutex::new(0),
            closed: Mutex::new(false),
        }
    }

    /// Stays pending forever, forcing a timeout.
    #[must_use]
    pub fn never_granting() -> Self {
        Self {
            behavior: AuthBehavior::Never,
            polls: Mutex::new(0),
            closed: Mutex::new(false),
        }
    }

    /// Fails every poll with the given message.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: AuthBehavior::Fail(message.into()),
            polls: Mutex::new(0),
            closed: Mutex::new(false),
        }
    }

    /// Number of polls made.
    #[must_use]
    pub fn poll_count(&self) -> usize {
        *self.polls.lock()
    }

    /// Whether the session was closed.
    #[must_use]
    pub fn closed(&self) -> bool {
        *self.closed.lock()
    }

    fn grant() -> AuthGrant {
        AuthGrant {
            access_token: "mock-token".to_string(),
            profile: Profile {
                id: "acct-1".to_string(),
                display_name: "Postflow".to_string(),
                handle: "@postflow".to_string(),
            },
        }
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn begin(&self) -> anyhow::Result<AuthSession> {
        Ok(AuthSession {
            session_id: Uuid::new_v4(),
            authorize_url: "https://social.example/oauth/authorize".to_string(),
        })
    }

    async fn poll(&self, _session: &AuthSession) -> anyhow::Result<Option<AuthGrant>> {
        let mut polls = self.polls.lock();
        *polls += 1;
        match &self.behavior {
            AuthBehavior::GrantAfter(pending) => {
                if *polls > *pending {
                    Ok(Some(Self::grant()))
                } else {
                    Ok(None)
                }
            }
            AuthBehavior::Never => Ok(None),
            AuthBehavior::Fail(message) => Err(anyhow::anyhow!(message.clone())),
        }
    }

    async fn close(&self, _session: &AuthSession) {
        *self.closed.lock() = true;
    }
}
