//! Drawing Projection for the Drawing Engine
//!
//! This crate provides:
//! - Drawing specifications (views, section views, dimensions)
//! - A projector that places views and dimensions on a page and exports it
//! - Abstract drawing renderer traits, scoped renderer sessions and a sheet renderer

pub mod config;
pub mod projector;
pub mod renderer;
pub mod spec;

// Re-exports for convenience
pub use config::{DuplicateViewPolicy, ProjectorConfig, SectionNormalPolicy};
pub use projector::{DocumentHandle, ExportTargets, ProjectError, ProjectResult, project};
pub use renderer::{
    AnnotationType, BodyId, DimensionRequest, DrawingRenderer, DrawingSession, NullRenderer,
    PageId, RenderError, RenderResult, SectionRequest, SheetConfig, SheetRenderer, ViewId,
    ViewRequest,
};
pub use spec::{DimensionSpec, DrawingSpec, ViewSpec};
