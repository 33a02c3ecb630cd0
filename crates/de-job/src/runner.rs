//! Job runner
//!
//! Builds the solid inside a kernel session and projects it inside a
//! drawing session nested in the first, so the solid stays alive until the
//! page is exported.

use std::fs;
use std::path::{Path, PathBuf};

use de_cad::KernelSession;
use de_draw::{DrawingSession, ExportTargets};

use crate::config::JobConfig;
use crate::error::{JobError, JobResult};
use crate::job::{Job, JobOutput};

/// Run one decoded job
pub fn run_job(job: &Job, config: &JobConfig) -> JobResult<JobOutput> {
    let output_pdf = absolute(&job.output_pdf)?;
    let output_svg = job.output_svg.as_deref().map(absolute).transpose()?;

    let targets = ExportTargets {
        pdf: Some(output_pdf.clone()),
        svg: output_svg.clone(),
    };

    KernelSession::scoped(config.make_kernel()?, |kernel| -> JobResult<()> {
        let solid = kernel.build(&job.solid)?;
        match kernel.measure(&solid) {
            Ok(props) => tracing::info!(
                solid = %job.solid.id,
                volume = props.volume,
                size = ?props.bounds.size(),
                "Measured solid"
            ),
            Err(e) => match kernel.bounds(&solid) {
                Ok(bounds) => tracing::info!(
                    solid = %job.solid.id,
                    size = ?bounds.size(),
                    "Measured solid bounds"
                ),
                Err(_) => tracing::debug!(solid = %job.solid.id, error = %e, "Solid not measured"),
            },
        }

        if let Some(parent) = output_pdf.parent() {
            fs::create_dir_all(parent).map_err(|e| JobError::Io(e.to_string()))?;
        }

        DrawingSession::scoped(
            config.make_renderer(),
            config.projector.clone(),
            |drawing| -> JobResult<()> {
                drawing.project(&solid, &job.drawing, &targets)?;
                Ok(())
            },
        )
    })?;

    tracing::info!(pdf = %output_pdf.display(), "Job finished");

    Ok(JobOutput {
        output_pdf,
        output_svg,
        solid: job.solid.clone(),
        drawing: job.drawing.clone(),
    })
}

fn absolute(path: &Path) -> JobResult<PathBuf> {
    std::path::absolute(path).map_err(|e| JobError::Io(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KernelChoice, RendererChoice};
    use de_cad::{BuildError, CadError, GrammarError, Operation, SolidSpec};
    use de_draw::{DimensionSpec, DrawingSpec, ProjectError, ViewSpec};
    use glam::DVec3;

    fn block_job(dir: &Path) -> Job {
        Job {
            solid: SolidSpec::new(
                "BLOCK",
                vec![
                    Operation::base_box(40.0, 20.0, 10.0, false, false),
                    Operation::through_hole(3.0, 10.0, de_cad::Axis::Z, DVec3::new(20.0, 10.0, 5.0)),
                ],
            ),
            drawing: DrawingSpec {
                page_title: "DRW_BLOCK".into(),
                template_reference: "A4_LandscapeTD.svg".into(),
                views: vec![ViewSpec::projection("TOP", DVec3::Z)],
                dimensions: vec![DimensionSpec::new("TOP", "diameter", "Ø6", &["Edge3"])],
            },
            output_pdf: dir.join("nested/block.pdf"),
            output_svg: Some(dir.join("block.svg")),
        }
    }

    #[test]
    fn test_run_job_writes_exports() {
        let dir = tempfile::tempdir().unwrap();
        let job = block_job(dir.path());
        let output = run_job(&job, &JobConfig::default()).unwrap();

        assert!(output.output_pdf.is_absolute());
        assert!(output.output_pdf.exists());
        assert!(output.output_svg.as_ref().unwrap().exists());
        assert_eq!(output.solid, job.solid);
        assert_eq!(output.drawing, job.drawing);
    }

    #[test]
    fn test_invalid_spec_surfaces_build_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = block_job(dir.path());
        job.solid.operations.push(Operation::extrude(5.0));

        let err = run_job(&job, &JobConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            JobError::Build(BuildError::Grammar(GrammarError::InvalidSpec { .. }))
        ));
        assert!(!job.output_pdf.exists());
        assert!(!dir.path().join("nested").exists());
    }

    #[test]
    fn test_unknown_view_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = block_job(dir.path());
        job.drawing.dimensions[0].view_id = "SIDE".into();

        let err = run_job(&job, &JobConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            JobError::Project(ProjectError::UnknownViewReference { .. })
        ));
        assert!(!job.output_pdf.exists());
    }

    #[test]
    fn test_unavailable_backends() {
        let dir = tempfile::tempdir().unwrap();
        let job = block_job(dir.path());

        let config = JobConfig {
            kernel: KernelChoice::Null,
            ..Default::default()
        };
        assert!(matches!(
            run_job(&job, &config),
            Err(JobError::Kernel(CadError::KernelNotAvailable(_)))
        ));

        let config = JobConfig {
            renderer: RendererChoice::Null,
            ..Default::default()
        };
        assert!(matches!(
            run_job(&job, &config),
            Err(JobError::Render(_))
        ));
    }

    #[test]
    fn test_calibration_block_job_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let value = serde_json::json!({
            "solid": {
                "id": "CAL-BLOCK-001",
                "operations": [
                    {"type": "BaseBox", "width": 200, "depth": 80, "height": 40,
                     "centered_xy": false, "centered_z": false},
                    {"type": "CutBox", "width": 80, "depth": 80, "height": 20, "center": [40, 40, 30]},
                    {"type": "ThroughHole", "radius": 8, "depth": 40, "axis": "z", "center": [60, 20, 20]},
                    {"type": "ThroughHole", "radius": 8, "depth": 40, "axis": "Z", "center": [140, 20, 20]}
                ]
            },
            "drawing": {
                "page_title": "DRW_CAL-BLOCK-001",
                "template_path": "A4_LandscapeTD.svg",
                "views": [
                    {"id": "FRONT", "direction": [0, -1, 0], "scale": 0.5},
                    {"id": "TOP", "direction": [0, 0, 1], "scale": 0.5},
                    {"id": "ISO", "direction": [1, -1, 1], "scale": 0.4}
                ],
                "dimensions": [
                    {"view_id": "FRONT", "kind": "linear", "label": "200.0 mm", "edges": ["Edge1"]},
                    {"view_id": "TOP", "kind": "diameter", "label": "Ø 16.0 mm", "edges": ["Edge3"]}
                ]
            },
            "output_pdf": dir.path().join("out/calibration_block.pdf"),
            "output_svg": dir.path().join("out/calibration_block.svg")
        });

        let job = crate::decode_job(&value).unwrap();
        let output = run_job(&job, &JobConfig::default()).unwrap();

        let svg = fs::read_to_string(output.output_svg.unwrap()).unwrap();
        assert!(svg.contains("DRW_CAL-BLOCK-001"));
        assert!(svg.contains("Diameter Ø 16.0 mm [Edge3]"));
        assert!(svg.contains("scale 0.4"));

        let echoed = serde_json::to_value(&output.solid).unwrap();
        assert_eq!(echoed["operations"][3]["axis"], "z");
    }
}
