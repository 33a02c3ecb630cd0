//! Job decoding
//!
//! A job is one JSON object:
//!
//! ```json
//! {
//!   "solid": { "id": "...", "operations": [{ "type": "BaseBox", ... }] },
//!   "drawing": { "page_title": "...", "template_path": "...", "views": [], "dimensions": [] },
//!   "output_pdf": "out/part.pdf",
//!   "output_svg": "out/part.svg"
//! }
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use de_cad::{Axis, Operation, SolidSpec};
use de_draw::DrawingSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{JobError, JobResult};

/// A decoded job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub solid: SolidSpec,
    pub drawing: DrawingSpec,
    pub output_pdf: PathBuf,
    #[serde(default)]
    pub output_svg: Option<PathBuf>,
}

/// What a finished job reports back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOutput {
    pub output_pdf: PathBuf,
    pub output_svg: Option<PathBuf>,
    pub solid: SolidSpec,
    pub drawing: DrawingSpec,
}

/// Decode a job object
///
/// Operation tags are checked before the typed decode so that an unknown
/// tag reports [`JobError::UnsupportedOperationType`] instead of a generic
/// decode error. Axis literals are accepted in any case.
pub fn decode_job(value: &Value) -> JobResult<Job> {
    let mut value = value.clone();
    let solid = value
        .get_mut("solid")
        .ok_or_else(|| JobError::Decode("missing field `solid`".into()))?;
    normalize_solid(solid)?;

    let job: Job = serde_json::from_value(value).map_err(|e| JobError::Decode(e.to_string()))?;
    tracing::debug!(
        solid = %job.solid.id,
        operations = job.solid.operations.len(),
        views = job.drawing.views.len(),
        "Decoded job"
    );
    Ok(job)
}

fn normalize_solid(solid: &mut Value) -> JobResult<()> {
    let id = solid
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let Some(operations) = solid.get_mut("operations").and_then(Value::as_array_mut) else {
        return Ok(());
    };

    for (index, op) in operations.iter_mut().enumerate() {
        let tag = match op.get("type") {
            Some(Value::String(tag)) => tag.clone(),
            Some(other) => return Err(JobError::UnsupportedOperationType(other.to_string())),
            None => return Err(JobError::UnsupportedOperationType("<missing>".into())),
        };
        if !Operation::TYPE_NAMES.contains(&tag.as_str()) {
            return Err(JobError::UnsupportedOperationType(tag));
        }

        if tag != "ThroughHole" {
            continue;
        }
        let literal = op.get("axis").and_then(Value::as_str).map(str::to_owned);
        if let Some(literal) = literal {
            let axis = Axis::from_str(&literal).map_err(|source| {
                JobError::InvalidOperationParameter {
                    solid: id.clone(),
                    index,
                    source,
                }
            })?;
            op["axis"] = Value::String(axis.to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use de_cad::{ParameterError, ThroughHole};
    use serde_json::json;

    fn ring_job() -> Value {
        json!({
            "solid": {
                "id": "RING_001",
                "operations": [
                    {"type": "SketchCircle", "radius": 20.0},
                    {"type": "SketchCircle", "radius": 15.0, "is_hole": true},
                    {"type": "Extrude", "length": 10.0}
                ]
            },
            "drawing": {
                "page_title": "DRW_RING_001",
                "template_path": "A4_LandscapeTD.svg",
                "views": [{"id": "SECTION_AA", "direction": [0, 1, 0], "is_section": true}],
                "dimensions": [
                    {"view_id": "SECTION_AA", "kind": "linear", "label": "10 mm", "edges": ["Edge1"]}
                ]
            },
            "output_pdf": "out/ring.pdf"
        })
    }

    #[test]
    fn test_decode_ring_job() {
        let job = decode_job(&ring_job()).unwrap();
        assert_eq!(job.solid.id, "RING_001");
        assert_eq!(job.solid.operations.len(), 3);
        assert_eq!(job.solid.operations[1], Operation::circle(15.0, true));
        assert_eq!(job.drawing.template_reference, "A4_LandscapeTD.svg");
        assert_eq!(job.output_pdf, PathBuf::from("out/ring.pdf"));
        assert_eq!(job.output_svg, None);
    }

    #[test]
    fn test_unsupported_operation_type() {
        let mut job = ring_job();
        job["solid"]["operations"][2] = json!({"type": "Fillet", "radius": 1.0});
        assert_eq!(
            decode_job(&job),
            Err(JobError::UnsupportedOperationType("Fillet".into()))
        );
    }

    #[test]
    fn test_axis_literal_any_case() {
        let mut job = ring_job();
        job["solid"]["operations"] = json!([
            {"type": "BaseBox", "width": 10, "depth": 10, "height": 10},
            {"type": "ThroughHole", "radius": 1, "depth": 10, "axis": "X", "center": [0, 1, 2]}
        ]);
        let decoded = decode_job(&job).unwrap();
        let Operation::ThroughHole(ThroughHole { axis, center, .. }) = &decoded.solid.operations[1]
        else {
            panic!("expected a through hole");
        };
        assert_eq!(*axis, Axis::X);
        assert_eq!(center.to_array(), [0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_bad_axis_literal() {
        let mut job = ring_job();
        job["solid"]["operations"] = json!([
            {"type": "BaseBox", "width": 10, "depth": 10, "height": 10},
            {"type": "ThroughHole", "radius": 1, "depth": 10, "axis": "w"}
        ]);
        assert_eq!(
            decode_job(&job),
            Err(JobError::InvalidOperationParameter {
                solid: "RING_001".into(),
                index: 1,
                source: ParameterError::UnknownAxis("w".into()),
            })
        );
    }

    #[test]
    fn test_missing_fields_are_decode_errors() {
        let mut job = ring_job();
        job.as_object_mut().unwrap().remove("output_pdf");
        assert!(matches!(decode_job(&job), Err(JobError::Decode(_))));

        assert!(matches!(
            decode_job(&json!({"drawing": {}})),
            Err(JobError::Decode(_))
        ));
    }
}
