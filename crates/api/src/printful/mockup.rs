//! Mockup generation: submit a render task, then poll it to a terminal state.

use pod_relay_core::{CredentialSet, MockupTaskStatus, PlacementSpec, RenderedMockup};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::PrintfulClient;
use crate::error::{Provider, RelayError};
use crate::poll::PollPolicy;

/// Product used when the caller names none.
pub const DEFAULT_PRODUCT_ID: u64 = 71;
/// Variant used when the caller names none.
pub const DEFAULT_VARIANT_ID: u64 = 4012;

/// What to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockupRequest {
    pub product_id: u64,
    pub variant_id: u64,
    /// Public URL of the design image.
    pub image_url: String,
    /// Empty means one default `front` placement.
    pub placements: Vec<PlacementSpec>,
}

impl MockupRequest {
    #[must_use]
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            product_id: DEFAULT_PRODUCT_ID,
            variant_id: DEFAULT_VARIANT_ID,
            image_url: image_url.into(),
            placements: Vec::new(),
        }
    }

    /// Body for `POST /mockup-generator/create-task/{product_id}`.
    #[must_use]
    pub fn task_payload(&self) -> Value {
        let defaults = [PlacementSpec::default()];
        let placements = if self.placements.is_empty() {
            &defaults[..]
        } else {
            &self.placements[..]
        };

        let files: Vec<Value> = placements
            .iter()
            .map(|spec| {
                let rect = spec.rect;
                json!({
                    "placement": spec.placement,
                    "image_url": self.image_url,
                    "position": {
                        "area_width": rect.area_width,
                        "area_height": rect.area_height,
                        "width": rect.width,
                        "height": rect.height,
                        "top": rect.top,
                        "left": rect.left,
                    },
                })
            })
            .collect();

        json!({
            "variant_ids": [self.variant_id],
            "format": "jpg",
            "files": files,
        })
    }
}

/// Rendered mockups and the number of polls it took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MockupRender {
    pub mockups: Vec<RenderedMockup>,
    pub attempts: u32,
}

/// Observed state of a render task after one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Completed(Vec<RenderedMockup>),
    Failed(String),
}

#[derive(Debug, Deserialize)]
struct CreatedTask {
    task_key: String,
}

#[derive(Debug, Deserialize)]
struct TaskResult {
    status: String,
    #[serde(default)]
    mockups: Vec<TaskMockup>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskMockup {
    placement: String,
    #[serde(default)]
    variant_ids: Vec<u64>,
    mockup_url: String,
}

impl From<TaskResult> for TaskState {
    fn from(result: TaskResult) -> Self {
        match result.status.parse::<MockupTaskStatus>() {
            Ok(MockupTaskStatus::Completed) => Self::Completed(
                result
                    .mockups
                    .into_iter()
                    .map(|m| RenderedMockup {
                        url: m.mockup_url,
                        placement: m.placement,
                        variant_id: m.variant_ids.first().copied(),
                    })
                    .collect(),
            ),
            Ok(MockupTaskStatus::Failed) => Self::Failed(
                result
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "task failed".to_string()),
            ),
            Ok(MockupTaskStatus::Pending) => Self::Pending,
            Err(_) => {
                tracing::warn!(status = %result.status, "Unknown mockup task status, treating as pending");
                Self::Pending
            }
        }
    }
}

impl PrintfulClient {
    /// Submit a render task and poll it until it completes.
    ///
    /// Each poll is preceded by one policy interval. At most
    /// `policy.max_attempts` task fetches are made.
    ///
    /// # Errors
    ///
    /// - `RelayError::Config` / `RelayError::Provider` from the adapter
    /// - `RelayError::Render` as soon as the task reports `failed`
    /// - `RelayError::Timeout` when the attempt ceiling is reached
    /// - `RelayError::Cancelled` if `cancel` fires during a wait
    #[instrument(skip(self, credentials, request, cancel), fields(product_id = request.product_id, variant_id = request.variant_id))]
    pub async fn render_mockup(
        &self,
        credentials: &CredentialSet,
        request: &MockupRequest,
        policy: PollPolicy,
        cancel: &CancellationToken,
    ) -> Result<MockupRender, RelayError> {
        let task_key = self.submit_mockup_task(credentials, request).await?;
        tracing::info!(task_key = %task_key, "Mockup task submitted");

        let mut attempts = 0;
        while attempts < policy.max_attempts {
            policy.wait(cancel).await?;
            attempts += 1;

            match self.fetch_task_state(credentials, &task_key).await? {
                TaskState::Pending => {
                    tracing::debug!(attempts, "Mockup task pending");
                }
                TaskState::Completed(mockups) => {
                    tracing::info!(attempts, count = mockups.len(), "Mockup task completed");
                    return Ok(MockupRender { mockups, attempts });
                }
                TaskState::Failed(reason) => {
                    return Err(RelayError::Render { task_key, reason });
                }
            }
        }

        Err(RelayError::Timeout {
            task: "Mockup generation".to_string(),
            attempts,
        })
    }

    /// Submit a render task and return its key.
    ///
    /// # Errors
    ///
    /// Returns the adapter's errors, or `RelayError::Provider` if no task key
    /// comes back.
    pub async fn submit_mockup_task(
        &self,
        credentials: &CredentialSet,
        request: &MockupRequest,
    ) -> Result<String, RelayError> {
        let payload = request.task_payload();
        let created: CreatedTask = self
            .call(
                credentials,
                Method::POST,
                &format!("/mockup-generator/create-task/{}", request.product_id),
                Some(&payload),
            )
            .await?;

        if created.task_key.is_empty() {
            return Err(RelayError::provider(Provider::Printful, None, "no task key returned"));
        }
        Ok(created.task_key)
    }

    /// Fetch a task once.
    ///
    /// # Errors
    ///
    /// Returns the adapter's errors.
    pub async fn fetch_task_state(
        &self,
        credentials: &CredentialSet,
        task_key: &str,
    ) -> Result<TaskState, RelayError> {
        let result: TaskResult = self
            .call(
                credentials,
                Method::GET,
                &format!(
                    "/mockup-generator/task?task_key={}",
                    urlencoding::encode(task_key)
                ),
                None,
            )
            .await?;

        Ok(result.into())
    }
}
