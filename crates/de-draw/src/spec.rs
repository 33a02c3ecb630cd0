//! Drawing specifications
//!
//! Plain value types describing one drawing page: which views to place and
//! which dimensions to attach to them.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// One view on the drawing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSpec {
    /// Identifier, referenced by dimensions
    pub id: String,
    /// Projection direction
    pub direction: DVec3,
    /// Whether the view cuts the body with a section plane
    #[serde(default)]
    pub is_section: bool,
    /// Normal of the section plane (only meaningful for section views)
    #[serde(default)]
    pub section_normal: Option<DVec3>,
    /// View scale; the renderer's default when absent
    #[serde(default)]
    pub scale: Option<f64>,
}

impl ViewSpec {
    /// Plain projected view
    pub fn projection(id: impl Into<String>, direction: DVec3) -> Self {
        Self {
            id: id.into(),
            direction,
            is_section: false,
            section_normal: None,
            scale: None,
        }
    }

    /// Section view cut by a plane with the given normal
    pub fn section(id: impl Into<String>, direction: DVec3, normal: Option<DVec3>) -> Self {
        Self {
            id: id.into(),
            direction,
            is_section: true,
            section_normal: normal,
            scale: None,
        }
    }

    /// Set the view scale
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }
}

/// One dimension attached to a view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSpec {
    /// View the dimension belongs to
    pub view_id: String,
    /// Abstract kind, e.g. "linear" or "diameter"
    pub kind: String,
    /// Display text, used verbatim
    pub label: String,
    /// Edge names within the view, passed to the renderer untouched
    #[serde(default)]
    pub edges: Vec<String>,
}

impl DimensionSpec {
    pub fn new(
        view_id: impl Into<String>,
        kind: impl Into<String>,
        label: impl Into<String>,
        edges: &[&str],
    ) -> Self {
        Self {
            view_id: view_id.into(),
            kind: kind.into(),
            label: label.into(),
            edges: edges.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Specification of an entire drawing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingSpec {
    pub page_title: String,
    /// Page template, owned by the renderer
    #[serde(alias = "template_path")]
    pub template_reference: String,
    #[serde(default)]
    pub views: Vec<ViewSpec>,
    #[serde(default)]
    pub dimensions: Vec<DimensionSpec>,
}
