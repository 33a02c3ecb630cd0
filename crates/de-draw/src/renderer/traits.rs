//! Drawing renderer trait definitions
//!
//! The interface of the document service that owns pages, views and
//! dimension annotations and exports finished pages.

use std::fmt;
use std::path::Path;

use de_cad::Solid;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for renderer operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Renderer not available: {0}")]
    RendererNotAvailable(String),

    #[error("Unknown {kind}: {id}")]
    UnknownObject { kind: &'static str, id: Uuid },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for renderer operations
pub type RenderResult<T> = Result<T, RenderError>;

macro_rules! object_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

object_id!(
    /// A page inside the renderer
    PageId
);
object_id!(
    /// A body placed on a page
    BodyId
);
object_id!(
    /// A view placed on a page
    ViewId
);

/// Annotation type understood by the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationType {
    Distance,
    Diameter,
    /// Passed through verbatim for the renderer to interpret
    Other(String),
}

impl AnnotationType {
    /// Map an abstract dimension kind, ignoring case
    pub fn from_kind(kind: &str) -> Self {
        match kind.to_lowercase().as_str() {
            "linear" | "distance" => AnnotationType::Distance,
            "diameter" | "radial" | "radius" => AnnotationType::Diameter,
            _ => AnnotationType::Other(kind.to_string()),
        }
    }

    /// Name of the annotation type
    pub fn as_str(&self) -> &str {
        match self {
            AnnotationType::Distance => "Distance",
            AnnotationType::Diameter => "Diameter",
            AnnotationType::Other(name) => name,
        }
    }
}

/// Section settings of a view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionRequest {
    /// Cutting-plane normal; the renderer's default plane when absent
    pub normal: Option<DVec3>,
}

/// A view to place on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRequest {
    pub name: String,
    pub direction: DVec3,
    pub scale: Option<f64>,
    pub section: Option<SectionRequest>,
}

/// A dimension annotation to attach to a view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionRequest {
    pub annotation: AnnotationType,
    /// Edge references, in order
    pub edges: Vec<String>,
    /// Display text
    pub label: String,
}

/// The main drawing renderer trait
///
/// Like a CAD kernel, a renderer is a single-document session owned by
/// one projection at a time.
pub trait DrawingRenderer {
    /// Get the name of this renderer
    fn name(&self) -> &str;

    /// Check if the renderer is available
    fn is_available(&self) -> bool;

    /// Create an empty page bound to a template
    fn create_page(&mut self, title: &str, template: &str) -> RenderResult<PageId>;

    /// Place a solid on a page so views can reference it
    fn add_body(&mut self, page: PageId, solid: &Solid) -> RenderResult<BodyId>;

    /// Create a projected or sectioned view of a body
    fn add_view(&mut self, page: PageId, body: BodyId, view: &ViewRequest)
    -> RenderResult<ViewId>;

    /// Attach a dimension annotation to a view
    fn add_dimension(
        &mut self,
        page: PageId,
        view: ViewId,
        dimension: &DimensionRequest,
    ) -> RenderResult<()>;

    /// Bring the page up to date after changes
    fn recompute(&mut self, page: PageId) -> RenderResult<()>;

    /// Export the page as PDF
    fn export_pdf(&mut self, page: PageId, path: &Path) -> RenderResult<()>;

    /// Export the page as SVG
    fn export_svg(&mut self, page: PageId, path: &Path) -> RenderResult<()>;

    /// Release every resource held by the session
    fn shutdown(&mut self) {}
}

/// A null renderer that always returns errors
#[derive(Debug, Default)]
pub struct NullRenderer;

impl NullRenderer {
    fn unavailable<T>() -> RenderResult<T> {
        Err(RenderError::RendererNotAvailable(
            "No drawing renderer available".into(),
        ))
    }
}

impl DrawingRenderer for NullRenderer {
    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn create_page(&mut self, _title: &str, _template: &str) -> RenderResult<PageId> {
        Self::unavailable()
    }

    fn add_body(&mut self, _page: PageId, _solid: &Solid) -> RenderResult<BodyId> {
        Self::unavailable()
    }

    fn add_view(
        &mut self,
        _page: PageId,
        _body: BodyId,
        _view: &ViewRequest,
    ) -> RenderResult<ViewId> {
        Self::unavailable()
    }

    fn add_dimension(
        &mut self,
        _page: PageId,
        _view: ViewId,
        _dimension: &DimensionRequest,
    ) -> RenderResult<()> {
        Self::unavailable()
    }

    fn recompute(&mut self, _page: PageId) -> RenderResult<()> {
        Self::unavailable()
    }

    fn export_pdf(&mut self, _page: PageId, _path: &Path) -> RenderResult<()> {
        Self::unavailable()
    }

    fn export_svg(&mut self, _page: PageId, _path: &Path) -> RenderResult<()> {
        Self::unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_mapping_ignores_case() {
        for kind in ["linear", "Distance", "LINEAR"] {
            assert_eq!(AnnotationType::from_kind(kind), AnnotationType::Distance);
        }
        for kind in ["diameter", "Radial", "RADIUS"] {
            assert_eq!(AnnotationType::from_kind(kind), AnnotationType::Diameter);
        }
    }

    #[test]
    fn test_unknown_kind_passes_through_verbatim() {
        assert_eq!(
            AnnotationType::from_kind("Angle"),
            AnnotationType::Other("Angle".into())
        );
        assert_eq!(AnnotationType::from_kind("Angle").as_str(), "Angle");
    }
}
