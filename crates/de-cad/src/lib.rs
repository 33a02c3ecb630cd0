//! Solid Construction for the Drawing Engine
//!
//! This crate provides:
//! - Declarative solid operations (sketch circles, extrusion, boxes, cuts, holes)
//! - A grammar validator that classifies operations and enforces the base-style rules
//! - A builder that folds validated plans into CAD kernel calls
//! - Abstract CAD kernel traits, scoped kernel sessions and reference backends

pub mod builder;
pub mod grammar;
pub mod kernel;
pub mod operation;

// Re-exports for convenience
pub use builder::{BuildError, BuildResult, SolidBuilder, build_solid};
pub use grammar::{BaseStyle, BuildPlan, GrammarError, GrammarViolation};
pub use kernel::{
    Aabb, BoxCentering, CadError, CadKernel, CadResult, Circle2D, CsgConfig, CsgKernel,
    ExtrudeDirection, KernelSession, MassProperties, NullKernel, Profile, SketchPlane, Solid,
    default_kernel,
};
pub use operation::{
    Axis, BaseBox, CutBox, Extrude, Operation, ParameterError, SketchCircle, SolidSpec,
    ThroughHole,
};

#[cfg(feature = "truck")]
pub use kernel::TruckKernel;
