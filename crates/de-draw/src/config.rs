//! Projector configuration
//!
//! Policies for view specs that are accepted but questionable.

use serde::{Deserialize, Serialize};

/// What to do when two views share an id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuplicateViewPolicy {
    /// Dimensions resolve to the view registered last
    #[default]
    LastWins,
    /// Fail before anything is created
    Reject,
}

/// What to do with a section view that has no section normal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SectionNormalPolicy {
    /// Let the renderer pick its default cutting plane
    #[default]
    Defer,
    /// Fail before anything is created
    Reject,
}

/// Projector configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorConfig {
    pub duplicate_views: DuplicateViewPolicy,
    pub missing_section_normal: SectionNormalPolicy,
}

impl ProjectorConfig {
    /// Reject both duplicate view ids and section views without a normal
    pub fn strict() -> Self {
        Self {
            duplicate_views: DuplicateViewPolicy::Reject,
            missing_section_normal: SectionNormalPolicy::Reject,
        }
    }
}
