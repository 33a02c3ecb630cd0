//! CAD Kernel trait definitions
//!
//! These traits define the interface that every solid-modeling backend must
//! implement. The builder only ever talks to a kernel through [`CadKernel`].

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for CAD kernel operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CadError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Boolean operation failed: {0}")]
    BooleanFailed(String),

    #[error("Kernel not available: {0}")]
    KernelNotAvailable(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Unknown solid: {0}")]
    UnknownSolid(Uuid),
}

/// Result type for CAD operations
pub type CadResult<T> = Result<T, CadError>;

/// One of the three principal sketch planes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SketchPlane {
    /// Local axes (X, Y), normal +Z
    #[default]
    XY,
    /// Local axes (Y, Z), normal +X
    YZ,
    /// Local axes (X, Z), normal +Y
    XZ,
}

impl SketchPlane {
    /// Unit normal of the plane
    pub fn normal(self) -> DVec3 {
        match self {
            SketchPlane::XY => DVec3::Z,
            SketchPlane::YZ => DVec3::X,
            SketchPlane::XZ => DVec3::Y,
        }
    }

    /// Map a point given in plane coordinates, at `offset` along the
    /// normal, to world coordinates
    pub fn to_world(self, local: DVec2, offset: f64) -> DVec3 {
        match self {
            SketchPlane::XY => DVec3::new(local.x, local.y, offset),
            SketchPlane::YZ => DVec3::new(offset, local.x, local.y),
            SketchPlane::XZ => DVec3::new(local.x, offset, local.y),
        }
    }

    /// Project a world point onto the plane's two local axes
    pub fn to_local(self, world: DVec3) -> DVec2 {
        match self {
            SketchPlane::XY => DVec2::new(world.x, world.y),
            SketchPlane::YZ => DVec2::new(world.y, world.z),
            SketchPlane::XZ => DVec2::new(world.x, world.z),
        }
    }

    /// Component of a world point along the plane normal
    pub fn offset_of(self, world: DVec3) -> f64 {
        world.dot(self.normal())
    }
}

/// A circle drawn in sketch-plane coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle2D {
    pub center: DVec2,
    pub radius: f64,
}

/// A planar sketch profile made of circles
///
/// All circles of one profile are filled together; overlapping or nested
/// circles are unioned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    /// Plane the sketch lies on
    pub plane: SketchPlane,
    /// Position of the plane along its normal
    pub offset: f64,
    /// Circles in drawing order
    pub circles: Vec<Circle2D>,
}

impl Profile {
    /// Start an empty sketch on `plane` through the origin
    pub fn new(plane: SketchPlane) -> Self {
        Self {
            plane,
            offset: 0.0,
            circles: Vec::new(),
        }
    }

    /// Move the sketch plane along its normal
    pub fn at_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Draw a circle into the sketch
    pub fn circle(mut self, center: DVec2, radius: f64) -> Self {
        self.circles.push(Circle2D { center, radius });
        self
    }

    /// Check if nothing has been drawn
    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    /// Reject profiles no backend can fill
    pub fn validate(&self) -> CadResult<()> {
        if self.circles.is_empty() {
            return Err(CadError::InvalidProfile("Profile contains no circles".into()));
        }
        if let Some(c) = self
            .circles
            .iter()
            .find(|c| !(c.radius.is_finite() && c.radius > 0.0) || !c.center.is_finite())
        {
            return Err(CadError::InvalidProfile(format!(
                "Degenerate circle (radius {}) in profile",
                c.radius
            )));
        }
        Ok(())
    }
}

/// Direction for extrusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtrudeDirection {
    /// Extrude in the positive normal direction
    #[default]
    Positive,
    /// Extrude in the negative normal direction
    Negative,
    /// Extrude half the distance to each side of the plane
    Symmetric,
}

impl ExtrudeDirection {
    /// Span covered along the plane normal, relative to the plane
    pub fn span(self, distance: f64) -> (f64, f64) {
        match self {
            ExtrudeDirection::Positive => (0.0, distance),
            ExtrudeDirection::Negative => (-distance, 0.0),
            ExtrudeDirection::Symmetric => (-distance / 2.0, distance / 2.0),
        }
    }
}

/// Centering flags for box primitives
///
/// A centered axis spans `[-s/2, s/2]`, an uncentered one `[0, s]`. X and Y
/// share one flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoxCentering {
    pub xy: bool,
    pub z: bool,
}

impl BoxCentering {
    /// Centered on every axis
    pub const ALL: Self = Self { xy: true, z: true };

    /// Corner of the box with the lowest coordinates
    pub fn min_corner(self, size: DVec3) -> DVec3 {
        let half = size * 0.5;
        DVec3::new(
            if self.xy { -half.x } else { 0.0 },
            if self.xy { -half.y } else { 0.0 },
            if self.z { -half.z } else { 0.0 },
        )
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    /// Create a bounding box from two corners
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Edge lengths
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Center point
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Shift by an offset
    pub fn translated(&self, offset: DVec3) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

/// Measured properties of a solid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassProperties {
    /// Enclosed volume in model units cubed
    pub volume: f64,
    /// Axis-aligned bounds
    pub bounds: Aabb,
}

/// Opaque handle to a solid owned by a kernel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Solid {
    /// Unique identifier
    pub id: Uuid,
    /// Name of the kernel holding the geometry
    pub kernel: String,
}

impl Solid {
    /// Create a handle for a freshly stored solid
    pub fn new(kernel: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kernel: kernel.into(),
        }
    }
}

/// The main CAD kernel trait
///
/// A kernel is a single-document session: it is owned by exactly one build
/// and never shared, so every mutating call takes `&mut self`.
pub trait CadKernel {
    /// Get the name of this kernel
    fn name(&self) -> &str;

    /// Check if the kernel is available
    fn is_available(&self) -> bool;

    /// Extrude a planar profile along its plane normal
    ///
    /// # Arguments
    /// * `profile` - The circles to fill and sweep
    /// * `distance` - Total extrusion length
    /// * `direction` - Which side(s) of the plane the sweep covers
    fn extrude(
        &mut self,
        profile: &Profile,
        distance: f64,
        direction: ExtrudeDirection,
    ) -> CadResult<Solid>;

    /// Create a box primitive at the origin
    fn create_box(&mut self, size: DVec3, centering: BoxCentering) -> CadResult<Solid>;

    /// Remove `tool` from `target`
    fn subtract(&mut self, target: &Solid, tool: &Solid) -> CadResult<Solid>;

    /// Move a solid by `offset`
    fn translate(&mut self, solid: &Solid, offset: DVec3) -> CadResult<Solid>;

    /// Measure volume and bounds
    fn measure(&self, solid: &Solid) -> CadResult<MassProperties>;

    /// Axis-aligned bounds of a solid
    ///
    /// Backends that cannot integrate volume may still answer this.
    fn bounds(&self, solid: &Solid) -> CadResult<Aabb> {
        self.measure(solid).map(|props| props.bounds)
    }

    /// Release every resource held by the session
    fn shutdown(&mut self) {}
}

/// A null kernel that always returns errors (used when no kernel is available)
#[derive(Debug, Default)]
pub struct NullKernel;

impl NullKernel {
    fn unavailable<T>() -> CadResult<T> {
        Err(CadError::KernelNotAvailable(
            "No CAD kernel available".into(),
        ))
    }
}

impl CadKernel for NullKernel {
    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn extrude(
        &mut self,
        _profile: &Profile,
        _distance: f64,
        _direction: ExtrudeDirection,
    ) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn create_box(&mut self, _size: DVec3, _centering: BoxCentering) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn subtract(&mut self, _target: &Solid, _tool: &Solid) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn translate(&mut self, _solid: &Solid, _offset: DVec3) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn measure(&self, _solid: &Solid) -> CadResult<MassProperties> {
        Self::unavailable()
    }
}

/// Get the default CAD kernel based on available features
pub fn default_kernel() -> Box<dyn CadKernel> {
    #[cfg(feature = "truck")]
    {
        Box::new(super::TruckKernel::new())
    }

    #[cfg(not(feature = "truck"))]
    {
        Box::new(super::CsgKernel::default())
    }
}
