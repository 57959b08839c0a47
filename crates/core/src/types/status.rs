//! Status enums for provider-side entities.

use serde::{Deserialize, Serialize};

/// Status of an asynchronous mockup render task.
///
/// Maps to the fulfillment platform's task status values. A task starts
/// `Pending` and moves to exactly one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MockupTaskStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl MockupTaskStatus {
    /// Whether the task will not change state any more.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for MockupTaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A task status string the relay does not know.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid mockup task status: {0}")]
pub struct UnknownTaskStatus(pub String);

impl std::str::FromStr for MockupTaskStatus {
    type Err = UnknownTaskStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(UnknownTaskStatus(s.to_string())),
        }
    }
}

/// Role tag on a generative chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// Rendering style for generated images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageStyle {
    #[default]
    Natural,
    Vivid,
}

impl ImageStyle {
    /// Parse a caller-supplied style leniently: anything but `vivid` is natural.
    #[must_use]
    pub fn from_caller(value: &str) -> Self {
        if value.eq_ignore_ascii_case("vivid") {
            Self::Vivid
        } else {
            Self::Natural
        }
    }
}
