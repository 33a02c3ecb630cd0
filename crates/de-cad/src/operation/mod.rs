//! Solid Operations
//!
//! The closed set of declarative operations a [`SolidSpec`] is made of.
//! Every operation is an immutable value; validation of individual
//! parameters lives here, validation of combinations lives in
//! [`crate::grammar`].

use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kernel::SketchPlane;

/// A single invalid operation parameter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be finite")]
    NotFinite { field: &'static str },

    #[error("axis must be one of 'x', 'y', 'z', got '{0}'")]
    UnknownAxis(String),
}

fn positive(field: &'static str, value: f64) -> Result<(), ParameterError> {
    if !value.is_finite() {
        return Err(ParameterError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(ParameterError::NotPositive { field, value });
    }
    Ok(())
}

fn finite_point(field: &'static str, value: DVec3) -> Result<(), ParameterError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParameterError::NotFinite { field })
    }
}

/// One of the three coordinate axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

impl Axis {
    /// Sketch plane perpendicular to this axis
    pub fn sketch_plane(self) -> SketchPlane {
        match self {
            Axis::X => SketchPlane::YZ,
            Axis::Y => SketchPlane::XZ,
            Axis::Z => SketchPlane::XY,
        }
    }

    /// Unit vector along the axis
    pub fn unit(self) -> DVec3 {
        match self {
            Axis::X => DVec3::X,
            Axis::Y => DVec3::Y,
            Axis::Z => DVec3::Z,
        }
    }
}

impl FromStr for Axis {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(ParameterError::UnknownAxis(s.to_string())),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

fn default_true() -> bool {
    true
}

/// A circle on the XY sketch plane, centered at the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SketchCircle {
    pub radius: f64,
    /// Material-removing instead of material-adding
    #[serde(default)]
    pub is_hole: bool,
}

impl SketchCircle {
    pub fn validate(&self) -> Result<(), ParameterError> {
        positive("radius", self.radius)
    }
}

/// Extrusion of the sketch along +Z
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extrude {
    pub length: f64,
}

impl Extrude {
    pub fn validate(&self) -> Result<(), ParameterError> {
        positive("length", self.length)
    }
}

/// Axis-aligned box used as the base solid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseBox {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    #[serde(default = "default_true")]
    pub centered_xy: bool,
    #[serde(default)]
    pub centered_z: bool,
}

impl BaseBox {
    pub fn validate(&self) -> Result<(), ParameterError> {
        positive("width", self.width)?;
        positive("depth", self.depth)?;
        positive("height", self.height)
    }

    pub fn size(&self) -> DVec3 {
        DVec3::new(self.width, self.depth, self.height)
    }
}

/// Axis-aligned box subtracted from the solid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutBox {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    pub center: DVec3,
}

impl CutBox {
    pub fn validate(&self) -> Result<(), ParameterError> {
        positive("width", self.width)?;
        positive("depth", self.depth)?;
        positive("height", self.height)?;
        finite_point("center", self.center)
    }

    pub fn size(&self) -> DVec3 {
        DVec3::new(self.width, self.depth, self.height)
    }
}

/// Cylindrical hole along one axis, always cut through
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThroughHole {
    pub radius: f64,
    pub depth: f64,
    #[serde(default)]
    pub axis: Axis,
    #[serde(default)]
    pub center: DVec3,
}

impl ThroughHole {
    pub fn validate(&self) -> Result<(), ParameterError> {
        positive("radius", self.radius)?;
        positive("depth", self.depth)?;
        finite_point("center", self.center)
    }
}

/// A declarative solid-construction operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Operation {
    SketchCircle(SketchCircle),
    Extrude(Extrude),
    BaseBox(BaseBox),
    CutBox(CutBox),
    ThroughHole(ThroughHole),
}

impl Operation {
    /// Type tags accepted at the job boundary
    pub const TYPE_NAMES: [&'static str; 5] =
        ["SketchCircle", "Extrude", "BaseBox", "CutBox", "ThroughHole"];

    /// Get the type name of this operation
    pub fn type_name(&self) -> &'static str {
        match self {
            Operation::SketchCircle(_) => "SketchCircle",
            Operation::Extrude(_) => "Extrude",
            Operation::BaseBox(_) => "BaseBox",
            Operation::CutBox(_) => "CutBox",
            Operation::ThroughHole(_) => "ThroughHole",
        }
    }

    /// Check this operation's own numeric constraints
    pub fn validate(&self) -> Result<(), ParameterError> {
        match self {
            Operation::SketchCircle(op) => op.validate(),
            Operation::Extrude(op) => op.validate(),
            Operation::BaseBox(op) => op.validate(),
            Operation::CutBox(op) => op.validate(),
            Operation::ThroughHole(op) => op.validate(),
        }
    }

    /// Circle on the sketch plane
    pub fn circle(radius: f64, is_hole: bool) -> Self {
        Operation::SketchCircle(SketchCircle { radius, is_hole })
    }

    /// Extrusion of the sketch
    pub fn extrude(length: f64) -> Self {
        Operation::Extrude(Extrude { length })
    }

    /// Base box primitive
    pub fn base_box(
        width: f64,
        depth: f64,
        height: f64,
        centered_xy: bool,
        centered_z: bool,
    ) -> Self {
        Operation::BaseBox(BaseBox {
            width,
            depth,
            height,
            centered_xy,
            centered_z,
        })
    }

    /// Subtractive box centered at `center`
    pub fn cut_box(width: f64, depth: f64, height: f64, center: DVec3) -> Self {
        Operation::CutBox(CutBox {
            width,
            depth,
            height,
            center,
        })
    }

    /// Through-hole along `axis` centered at `center`
    pub fn through_hole(radius: f64, depth: f64, axis: Axis, center: DVec3) -> Self {
        Operation::ThroughHole(ThroughHole {
            radius,
            depth,
            axis,
            center,
        })
    }
}

/// Ordered description of one solid body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidSpec {
    pub id: String,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl SolidSpec {
    /// Create a spec from an id and its operations
    pub fn new(id: impl Into<String>, operations: Vec<Operation>) -> Self {
        Self {
            id: id.into(),
            operations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_parse() {
        assert_eq!("x".parse::<Axis>().unwrap(), Axis::X);
        assert_eq!(" Y ".parse::<Axis>().unwrap(), Axis::Y);
        assert_eq!(
            "w".parse::<Axis>().unwrap_err(),
            ParameterError::UnknownAxis("w".into())
        );
    }

    #[test]
    fn test_axis_planes() {
        assert_eq!(Axis::X.sketch_plane(), SketchPlane::YZ);
        assert_eq!(Axis::Y.sketch_plane(), SketchPlane::XZ);
        assert_eq!(Axis::Z.sketch_plane(), SketchPlane::XY);
    }

    #[test]
    fn test_parameter_validation() {
        assert!(Operation::circle(1.0, false).validate().is_ok());
        assert_eq!(
            Operation::circle(0.0, false).validate(),
            Err(ParameterError::NotPositive {
                field: "radius",
                value: 0.0
            })
        );
        assert_eq!(
            Operation::extrude(f64::NAN).validate(),
            Err(ParameterError::NotFinite { field: "length" })
        );
        assert!(
            Operation::base_box(1.0, -1.0, 1.0, true, false)
                .validate()
                .is_err()
        );
        assert!(
            Operation::through_hole(1.0, 1.0, Axis::X, DVec3::new(f64::INFINITY, 0.0, 0.0))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_operation_json_defaults() {
        let op: Operation =
            serde_json::from_str(r#"{"type":"BaseBox","width":1,"depth":2,"height":3}"#).unwrap();
        assert_eq!(op, Operation::base_box(1.0, 2.0, 3.0, true, false));

        let op: Operation =
            serde_json::from_str(r#"{"type":"ThroughHole","radius":1,"depth":2}"#).unwrap();
        assert_eq!(op, Operation::through_hole(1.0, 2.0, Axis::Z, DVec3::ZERO));
    }
}
