//! Operation Grammar
//!
//! Classifies a flat operation list into typed buckets, then checks the
//! bucket combination against the base-style rules. The result is a
//! [`BuildPlan`] the builder can execute without further checks.

use std::fmt;

use thiserror::Error;

use crate::operation::{
    BaseBox, CutBox, Extrude, Operation, ParameterError, SketchCircle, SolidSpec, ThroughHole,
};

/// A broken rule about how operations may be combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarViolation {
    /// The spec has no operations at all
    EmptyOperations,
    /// More than one `Extrude`
    DuplicateExtrude,
    /// More than one `BaseBox`
    DuplicateBaseBox,
    /// `BaseBox` together with sketch circles or an extrusion
    MixedBaseStyle,
    /// Neither `BaseBox` nor `Extrude`
    NoBaseStyle,
}

impl fmt::Display for GrammarViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            GrammarViolation::EmptyOperations => "contains no operations",
            GrammarViolation::DuplicateExtrude => "contains multiple Extrude operations",
            GrammarViolation::DuplicateBaseBox => "defines multiple BaseBox operations",
            GrammarViolation::MixedBaseStyle => {
                "mixes BaseBox with sketch/extrude operations; choose one base style"
            }
            GrammarViolation::NoBaseStyle => {
                "must define either a BaseBox or an Extrude with supporting sketch geometry"
            }
        };
        f.write_str(msg)
    }
}

/// Errors raised while validating a spec
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrammarError {
    #[error("SolidSpec '{solid}' {violation}")]
    InvalidSpec {
        solid: String,
        violation: GrammarViolation,
    },

    #[error("SolidSpec '{solid}': operation #{index} ({operation}): {source}")]
    InvalidOperationParameter {
        solid: String,
        index: usize,
        operation: &'static str,
        #[source]
        source: ParameterError,
    },

    #[error("SolidSpec '{solid}' defines no positive geometry to extrude")]
    NoPositiveGeometry { solid: String },
}

/// Operations sorted by role, each bucket in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    pub sketch_circles: Vec<SketchCircle>,
    pub extrude: Option<Extrude>,
    pub base_box: Option<BaseBox>,
    pub cut_boxes: Vec<CutBox>,
    pub through_holes: Vec<ThroughHole>,
}

/// How the base solid is produced
#[derive(Debug, Clone, PartialEq)]
pub enum BaseStyle {
    /// A single box primitive
    Box(BaseBox),
    /// Filled circles extruded together, hole circles cut afterwards
    Sketch {
        profile: Vec<SketchCircle>,
        holes: Vec<SketchCircle>,
        length: f64,
    },
}

/// A validated construction recipe
#[derive(Debug, Clone, PartialEq)]
pub struct BuildPlan {
    pub solid_id: String,
    pub base: BaseStyle,
    pub cut_boxes: Vec<CutBox>,
    pub through_holes: Vec<ThroughHole>,
}

impl BuildPlan {
    /// Number of subtractions the plan performs
    pub fn cut_count(&self) -> usize {
        let sketch_holes = match &self.base {
            BaseStyle::Box(_) => 0,
            BaseStyle::Sketch { holes, .. } => holes.len(),
        };
        sketch_holes + self.cut_boxes.len() + self.through_holes.len()
    }
}

/// Sort operations into buckets, checking cardinality, then parameters
pub fn classify(spec: &SolidSpec) -> Result<Buckets, GrammarError> {
    let invalid = |violation| GrammarError::InvalidSpec {
        solid: spec.id.clone(),
        violation,
    };

    if spec.operations.is_empty() {
        return Err(invalid(GrammarViolation::EmptyOperations));
    }

    let mut buckets = Buckets::default();
    for (index, op) in spec.operations.iter().enumerate() {
        // A second Extrude or BaseBox is rejected whatever its parameters
        match op {
            Operation::SketchCircle(circle) => buckets.sketch_circles.push(*circle),
            Operation::Extrude(extrude) => {
                if buckets.extrude.replace(*extrude).is_some() {
                    return Err(invalid(GrammarViolation::DuplicateExtrude));
                }
            }
            Operation::BaseBox(base) => {
                if buckets.base_box.replace(*base).is_some() {
                    return Err(invalid(GrammarViolation::DuplicateBaseBox));
                }
            }
            Operation::CutBox(cut) => buckets.cut_boxes.push(*cut),
            Operation::ThroughHole(hole) => buckets.through_holes.push(*hole),
        }

        op.validate()
            .map_err(|source| GrammarError::InvalidOperationParameter {
                solid: spec.id.clone(),
                index,
                operation: op.type_name(),
                source,
            })?;
    }

    Ok(buckets)
}

/// Pick the base style from the bucket combination
///
/// | base_box | extrude | circles | outcome          |
/// |----------|---------|---------|------------------|
/// | yes      | any     | some    | `MixedBaseStyle` |
/// | yes      | yes     | any     | `MixedBaseStyle` |
/// | yes      | no      | none    | box style        |
/// | no       | yes     | any     | sketch style     |
/// | no       | no      | any     | `NoBaseStyle`    |
fn select_base(solid: &str, buckets: &Buckets) -> Result<BaseStyle, GrammarError> {
    let invalid = |violation| GrammarError::InvalidSpec {
        solid: solid.to_string(),
        violation,
    };

    match (
        buckets.base_box,
        buckets.extrude,
        buckets.sketch_circles.is_empty(),
    ) {
        (Some(_), Some(_), _) | (Some(_), None, false) => {
            Err(invalid(GrammarViolation::MixedBaseStyle))
        }
        (Some(base), None, true) => Ok(BaseStyle::Box(base)),
        (None, Some(extrude), _) => {
            let (holes, profile): (Vec<SketchCircle>, Vec<SketchCircle>) =
                buckets.sketch_circles.iter().copied().partition(|c| c.is_hole);
            if profile.is_empty() {
                return Err(GrammarError::NoPositiveGeometry {
                    solid: solid.to_string(),
                });
            }
            Ok(BaseStyle::Sketch {
                profile,
                holes,
                length: extrude.length,
            })
        }
        (None, None, _) => Err(invalid(GrammarViolation::NoBaseStyle)),
    }
}

/// Validate a spec completely and produce its build plan
pub fn plan(spec: &SolidSpec) -> Result<BuildPlan, GrammarError> {
    let buckets = classify(spec)?;
    let base = select_base(&spec.id, &buckets)?;

    Ok(BuildPlan {
        solid_id: spec.id.clone(),
        base,
        cut_boxes: buckets.cut_boxes,
        through_holes: buckets.through_holes,
    })
}
