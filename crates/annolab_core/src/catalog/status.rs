//! Status enums for datasets, annotation tasks, reviews, tenders and members.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Presentation tone shared by every status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Default,
    Processing,
    Success,
    Warning,
    Error,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Common contract for catalog enums.
pub trait StatusTag: Copy + Sized + 'static {
    /// Catalog name used in error messages.
    const CATALOG: &'static str;

    /// Every variant in display order.
    fn all() -> &'static [Self];
    /// Stable snake_case key.
    fn as_str(self) -> &'static str;
    fn label(self) -> &'static str;
    fn tone(self) -> Tone;
}

/// Parses a stable key into a catalog variant.
pub fn parse_tag<T: StatusTag>(value: &str) -> Result<T, UnknownTag> {
    let normalized = value.trim();
    T::all()
        .iter()
        .copied()
        .find(|tag| tag.as_str() == normalized)
        .ok_or_else(|| UnknownTag {
            catalog: T::CATALOG,
            value: value.to_string(),
        })
}

/// Key that does not belong to the requested catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTag {
    pub catalog: &'static str,
    pub value: String,
}

impl Display for UnknownTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} `{}`", self.catalog, self.value)
    }
}

impl Error for UnknownTag {}

/// Lifecycle of an uploaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetStatus {
    Draft,
    Importing,
    Ready,
    Archived,
}

impl StatusTag for DatasetStatus {
    const CATALOG: &'static str = "dataset status";

    fn all() -> &'static [Self] {
        &[Self::Draft, Self::Importing, Self::Ready, Self::Archived]
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Importing => "importing",
            Self::Ready => "ready",
            Self::Archived => "archived",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Importing => "Importing",
            Self::Ready => "Ready",
            Self::Archived => "Archived",
        }
    }

    fn tone(self) -> Tone {
        match self {
            Self::Draft => Tone::Default,
            Self::Importing => Tone::Processing,
            Self::Ready => Tone::Success,
            Self::Archived => Tone::Warning,
        }
    }
}

/// Progress of one annotation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationTaskStatus {
    Pending,
    InProgress,
    Submitted,
    Completed,
    Rejected,
}

impl StatusTag for AnnotationTaskStatus {
    const CATALOG: &'static str = "annotation task status";

    fn all() -> &'static [Self] {
        &[
            Self::Pending,
            Self::InProgress,
            Self::Submitted,
            Self::Completed,
            Self::Rejected,
        ]
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In progress",
            Self::Submitted => "Submitted",
            Self::Completed => "Completed",
            Self::Rejected => "Rejected",
        }
    }

    fn tone(self) -> Tone {
        match self {
            Self::Pending => Tone::Default,
            Self::InProgress | Self::Submitted => Tone::Processing,
            Self::Completed => Tone::Success,
            Self::Rejected => Tone::Error,
        }
    }
}

/// Outcome of a quality review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewVerdict {
    Pending,
    Approved,
    Rejected,
    NeedsRework,
}

impl StatusTag for ReviewVerdict {
    const CATALOG: &'static str = "review verdict";

    fn all() -> &'static [Self] {
        &[
            Self::Pending,
            Self::Approved,
            Self::Rejected,
            Self::NeedsRework,
        ]
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::NeedsRework => "needs_rework",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "Awaiting review",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::NeedsRework => "Needs rework",
        }
    }

    fn tone(self) -> Tone {
        match self {
            Self::Pending => Tone::Processing,
            Self::Approved => Tone::Success,
            Self::Rejected => Tone::Error,
            Self::NeedsRework => Tone::Warning,
        }
    }
}

/// Stage of a tracked tender project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenderStage {
    Bidding,
    Won,
    Lost,
    Delivering,
    Closed,
}

impl StatusTag for TenderStage {
    const CATALOG: &'static str = "tender stage";

    fn all() -> &'static [Self] {
        &[
            Self::Bidding,
            Self::Won,
            Self::Lost,
            Self::Delivering,
            Self::Closed,
        ]
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Bidding => "bidding",
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Delivering => "delivering",
            Self::Closed => "closed",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Bidding => "Bidding",
            Self::Won => "Won",
            Self::Lost => "Lost",
            Self::Delivering => "Delivering",
            Self::Closed => "Closed",
        }
    }

    fn tone(self) -> Tone {
        match self {
            Self::Bidding | Self::Delivering => Tone::Processing,
            Self::Won => Tone::Success,
            Self::Lost => Tone::Error,
            Self::Closed => Tone::Default,
        }
    }
}

/// Role assigned to a platform member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    ProjectManager,
    Annotator,
    Reviewer,
}

impl StatusTag for MemberRole {
    const CATALOG: &'static str = "member role";

    fn all() -> &'static [Self] {
        &[
            Self::Admin,
            Self::ProjectManager,
            Self::Annotator,
            Self::Reviewer,
        ]
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::ProjectManager => "project_manager",
            Self::Annotator => "annotator",
            Self::Reviewer => "reviewer",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::ProjectManager => "Project manager",
            Self::Annotator => "Annotator",
            Self::Reviewer => "Reviewer",
        }
    }

    fn tone(self) -> Tone {
        match self {
            Self::Admin => Tone::Error,
            Self::ProjectManager => Tone::Warning,
            Self::Annotator => Tone::Processing,
            Self::Reviewer => Tone::Success,
        }
    }
}
