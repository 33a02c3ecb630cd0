//! Solid Builder
//!
//! Folds a validated [`BuildPlan`] into kernel calls. Validation always
//! runs to completion before the first kernel call, so a rejected spec
//! never leaves a half-built solid behind.

use glam::DVec2;
use thiserror::Error;

use crate::grammar::{self, BaseStyle, BuildPlan, GrammarError};
use crate::kernel::{
    BoxCentering, CadError, CadKernel, CadResult, ExtrudeDirection, Profile, SketchPlane, Solid,
};
use crate::operation::{CutBox, SketchCircle, SolidSpec, ThroughHole};

/// Build-related errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("Kernel construction failed for SolidSpec '{solid}': {source}")]
    Kernel {
        solid: String,
        #[source]
        source: CadError,
    },
}

/// Result type for build operations
pub type BuildResult<T> = Result<T, BuildError>;

/// Validate `spec` and construct it with `kernel`
pub fn build_solid(kernel: &mut dyn CadKernel, spec: &SolidSpec) -> BuildResult<Solid> {
    let plan = grammar::plan(spec)?;
    tracing::debug!(
        solid = %plan.solid_id,
        cuts = plan.cut_count(),
        "Validated solid spec"
    );

    let solid = SolidBuilder::new(kernel)
        .execute(&plan)
        .map_err(|source| BuildError::Kernel {
            solid: spec.id.clone(),
            source,
        })?;

    tracing::info!(solid = %spec.id, kernel = kernel.name(), "Built solid");
    Ok(solid)
}

/// Executes build plans against a kernel
pub struct SolidBuilder<'k> {
    kernel: &'k mut dyn CadKernel,
}

impl<'k> SolidBuilder<'k> {
    /// Create a builder borrowing `kernel`
    pub fn new(kernel: &'k mut dyn CadKernel) -> Self {
        Self { kernel }
    }

    /// Run every construction step of `plan`
    pub fn execute(&mut self, plan: &BuildPlan) -> CadResult<Solid> {
        let mut solid = self.base(&plan.base)?;

        for cut in &plan.cut_boxes {
            let tool = self.cut_box_tool(cut)?;
            solid = self.kernel.subtract(&solid, &tool)?;
        }

        for hole in &plan.through_holes {
            let tool = self.through_hole_tool(hole)?;
            solid = self.kernel.subtract(&solid, &tool)?;
        }

        Ok(solid)
    }

    fn base(&mut self, base: &BaseStyle) -> CadResult<Solid> {
        match base {
            BaseStyle::Box(bb) => {
                tracing::debug!(size = %bb.size(), "Creating base box");
                self.kernel.create_box(
                    bb.size(),
                    BoxCentering {
                        xy: bb.centered_xy,
                        z: bb.centered_z,
                    },
                )
            }
            BaseStyle::Sketch {
                profile,
                holes,
                length,
            } => {
                tracing::debug!(circles = profile.len(), length, "Extruding base sketch");
                let mut solid = self.kernel.extrude(
                    &sketch_profile(profile),
                    *length,
                    ExtrudeDirection::Positive,
                )?;

                for hole in holes {
                    let tool = self.kernel.extrude(
                        &sketch_profile(std::slice::from_ref(hole)),
                        *length,
                        ExtrudeDirection::Positive,
                    )?;
                    solid = self.kernel.subtract(&solid, &tool)?;
                }
                Ok(solid)
            }
        }
    }

    fn cut_box_tool(&mut self, cut: &CutBox) -> CadResult<Solid> {
        tracing::debug!(center = %cut.center, "Cutting box");
        let tool = self.kernel.create_box(cut.size(), BoxCentering::ALL)?;
        self.kernel.translate(&tool, cut.center)
    }

    /// Cylinder of length `2 * depth` centered on the hole center, sketched
    /// on the plane perpendicular to the hole axis
    fn through_hole_tool(&mut self, hole: &ThroughHole) -> CadResult<Solid> {
        tracing::debug!(axis = %hole.axis, center = %hole.center, "Cutting through-hole");
        let plane = hole.axis.sketch_plane();
        let profile = Profile::new(plane)
            .at_offset(plane.offset_of(hole.center))
            .circle(plane.to_local(hole.center), hole.radius);
        self.kernel
            .extrude(&profile, hole.depth * 2.0, ExtrudeDirection::Symmetric)
    }
}

/// Concentric sketch circles on the XY plane
fn sketch_profile(circles: &[SketchCircle]) -> Profile {
    circles
        .iter()
        .fold(Profile::new(SketchPlane::XY), |profile, c| {
            profile.circle(DVec2::ZERO, c.radius)
        })
}
