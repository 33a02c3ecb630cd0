//! Drawing sessions
//!
//! A session owns one renderer for the duration of one projection and shuts
//! it down exactly once, on `close` or when dropped.

use de_cad::Solid;

use crate::config::ProjectorConfig;
use crate::projector::{DocumentHandle, ExportTargets, ProjectResult, project};
use crate::spec::DrawingSpec;

use super::{DrawingRenderer, RenderError, RenderResult};

/// Exclusive, scoped ownership of a drawing renderer
pub struct DrawingSession {
    renderer: Box<dyn DrawingRenderer>,
    config: ProjectorConfig,
    closed: bool,
}

impl DrawingSession {
    /// Open a session, failing if the renderer is not usable
    pub fn open(renderer: Box<dyn DrawingRenderer>, config: ProjectorConfig) -> RenderResult<Self> {
        if !renderer.is_available() {
            return Err(RenderError::RendererNotAvailable(format!(
                "Renderer '{}' is not available",
                renderer.name()
            )));
        }
        tracing::debug!(renderer = renderer.name(), "Opened drawing session");
        Ok(Self {
            renderer,
            config,
            closed: false,
        })
    }

    /// Run `f` inside a fresh session and tear the session down afterwards
    pub fn scoped<T, E>(
        renderer: Box<dyn DrawingRenderer>,
        config: ProjectorConfig,
        f: impl FnOnce(&mut DrawingSession) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<RenderError>,
    {
        let mut session = Self::open(renderer, config)?;
        let result = f(&mut session);
        session.close();
        result
    }

    pub fn renderer_name(&self) -> &str {
        self.renderer.name()
    }

    pub fn renderer_mut(&mut self) -> &mut dyn DrawingRenderer {
        self.renderer.as_mut()
    }

    /// Project a solid onto a new page and export it
    pub fn project(
        &mut self,
        solid: &Solid,
        spec: &DrawingSpec,
        targets: &ExportTargets,
    ) -> ProjectResult<DocumentHandle> {
        project(self.renderer.as_mut(), solid, spec, targets, &self.config)
    }

    /// Shut the renderer down now
    pub fn close(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if !self.closed {
            self.closed = true;
            self.renderer.shutdown();
            tracing::debug!(renderer = self.renderer.name(), "Closed drawing session");
        }
    }
}

impl Drop for DrawingSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::ProjectError;
    use crate::renderer::{NullRenderer, SheetRenderer};
    use crate::spec::{DimensionSpec, ViewSpec};
    use glam::DVec3;

    fn block_drawing() -> DrawingSpec {
        DrawingSpec {
            page_title: "DRW_BLOCK".into(),
            template_reference: "A4_LandscapeTD.svg".into(),
            views: vec![
                ViewSpec::projection("FRONT", DVec3::NEG_Y),
                ViewSpec::section("SECTION_BB", DVec3::X, Some(DVec3::X)),
            ],
            dimensions: vec![DimensionSpec::new("SECTION_BB", "radius", "R5", &["Edge7"])],
        }
    }

    #[test]
    fn test_open_rejects_unavailable_renderer() {
        assert!(matches!(
            DrawingSession::open(Box::new(NullRenderer), ProjectorConfig::default()),
            Err(RenderError::RendererNotAvailable(_))
        ));
    }

    #[test]
    fn test_scoped_projection_exports_files() {
        let dir = tempfile::tempdir().unwrap();
        let targets = ExportTargets::pdf(dir.path().join("block.pdf"))
            .with_svg(dir.path().join("block.svg"));

        let handle = DrawingSession::scoped(
            Box::new(SheetRenderer::default()),
            ProjectorConfig::default(),
            |session| -> Result<_, ProjectError> {
                session.project(&Solid::new("csg"), &block_drawing(), &targets)
            },
        )
        .unwrap();

        assert!(handle.pdf.as_ref().unwrap().exists());
        let svg = std::fs::read_to_string(handle.svg.unwrap()).unwrap();
        assert!(svg.contains("Diameter R5 [Edge7]"));
        assert!(svg.contains("section normal (1, 0, 0)"));
    }
}
