//! View and dimension projection
//!
//! Turns a built solid plus a [`DrawingSpec`] into a rendered page: views
//! first, then dimensions bound to those views, then the exports.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use de_cad::Solid;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{DuplicateViewPolicy, ProjectorConfig, SectionNormalPolicy};
use crate::renderer::{
    AnnotationType, DimensionRequest, DrawingRenderer, PageId, RenderError, SectionRequest,
    ViewId, ViewRequest,
};
use crate::spec::{DrawingSpec, ViewSpec};

/// Error type for projection
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectError {
    #[error("Dimension {index} references unknown view '{view_id}'")]
    UnknownViewReference { view_id: String, index: usize },

    #[error("View id '{0}' is used more than once")]
    DuplicateViewId(String),

    #[error("Section view '{0}' has no section normal")]
    MissingSectionNormal(String),

    #[error("Invalid parameter in view '{view}': {reason}")]
    InvalidViewParameter { view: String, reason: String },

    #[error(transparent)]
    Renderer(#[from] RenderError),
}

/// Result type for projection
pub type ProjectResult<T> = Result<T, ProjectError>;

/// Where the finished page is exported to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportTargets {
    pub pdf: Option<PathBuf>,
    pub svg: Option<PathBuf>,
}

impl ExportTargets {
    pub fn pdf(path: impl Into<PathBuf>) -> Self {
        Self {
            pdf: Some(path.into()),
            svg: None,
        }
    }

    pub fn with_svg(mut self, path: impl Into<PathBuf>) -> Self {
        self.svg = Some(path.into());
        self
    }
}

/// A finished, exported page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentHandle {
    pub page: PageId,
    pub pdf: Option<PathBuf>,
    pub svg: Option<PathBuf>,
}

/// Project a solid onto a new page and export it
///
/// Every check that can fail on the drawing spec alone runs before the
/// renderer is touched, so a rejected spec never leaves a half-built page.
pub fn project(
    renderer: &mut dyn DrawingRenderer,
    solid: &Solid,
    spec: &DrawingSpec,
    targets: &ExportTargets,
    config: &ProjectorConfig,
) -> ProjectResult<DocumentHandle> {
    validate(spec, config)?;

    let page = renderer.create_page(&spec.page_title, &spec.template_reference)?;
    let body = renderer.add_body(page, solid)?;
    tracing::debug!(page = %page, title = %spec.page_title, "Created page");

    let mut views: HashMap<&str, ViewId> = HashMap::with_capacity(spec.views.len());
    for view in &spec.views {
        let id = renderer.add_view(page, body, &view_request(view))?;
        tracing::debug!(view = %view.id, section = view.is_section, "Added view");
        views.insert(view.id.as_str(), id);
    }
    renderer.recompute(page)?;

    for (index, dimension) in spec.dimensions.iter().enumerate() {
        let view = views.get(dimension.view_id.as_str()).copied().ok_or_else(|| {
            ProjectError::UnknownViewReference {
                view_id: dimension.view_id.clone(),
                index,
            }
        })?;
        let request = DimensionRequest {
            annotation: AnnotationType::from_kind(&dimension.kind),
            edges: dimension.edges.clone(),
            label: dimension.label.clone(),
        };
        if let AnnotationType::Other(kind) = &request.annotation {
            tracing::debug!(kind = %kind, "Passing unrecognised dimension kind to renderer");
        }
        renderer.add_dimension(page, view, &request)?;
    }
    renderer.recompute(page)?;

    if let Some(path) = &targets.pdf {
        renderer.export_pdf(page, path)?;
    }
    if let Some(path) = &targets.svg {
        renderer.export_svg(page, path)?;
    }

    tracing::info!(
        title = %spec.page_title,
        views = spec.views.len(),
        dimensions = spec.dimensions.len(),
        "Projected drawing"
    );

    Ok(DocumentHandle {
        page,
        pdf: targets.pdf.clone(),
        svg: targets.svg.clone(),
    })
}

fn view_request(view: &ViewSpec) -> ViewRequest {
    ViewRequest {
        name: view.id.clone(),
        direction: view.direction,
        scale: view.scale,
        section: view.is_section.then_some(SectionRequest {
            normal: view.section_normal,
        }),
    }
}

/// Check a drawing spec without touching any renderer
pub fn validate(spec: &DrawingSpec, config: &ProjectorConfig) -> ProjectResult<()> {
    let mut seen = HashSet::with_capacity(spec.views.len());
    for view in &spec.views {
        validate_view(view)?;

        if !seen.insert(view.id.as_str()) {
            match config.duplicate_views {
                DuplicateViewPolicy::Reject => {
                    return Err(ProjectError::DuplicateViewId(view.id.clone()));
                }
                DuplicateViewPolicy::LastWins => {
                    tracing::warn!(view = %view.id, "Duplicate view id, the later view wins");
                }
            }
        }

        if view.is_section && view.section_normal.is_none() {
            match config.missing_section_normal {
                SectionNormalPolicy::Reject => {
                    return Err(ProjectError::MissingSectionNormal(view.id.clone()));
                }
                SectionNormalPolicy::Defer => {
                    tracing::warn!(
                        view = %view.id,
                        "Section view without a normal, using the renderer default"
                    );
                }
            }
        }
    }

    for (index, dimension) in spec.dimensions.iter().enumerate() {
        if !seen.contains(dimension.view_id.as_str()) {
            return Err(ProjectError::UnknownViewReference {
                view_id: dimension.view_id.clone(),
                index,
            });
        }
    }
    Ok(())
}

fn validate_view(view: &ViewSpec) -> ProjectResult<()> {
    let invalid = |reason: &str| ProjectError::InvalidViewParameter {
        view: view.id.clone(),
        reason: reason.to_string(),
    };

    if !is_usable_direction(view.direction) {
        return Err(invalid("direction must be finite and non-zero"));
    }
    if let Some(normal) = view.section_normal {
        if !is_usable_direction(normal) {
            return Err(invalid("section normal must be finite and non-zero"));
        }
    }
    if let Some(scale) = view.scale {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(invalid("scale must be finite and positive"));
        }
    }
    Ok(())
}

fn is_usable_direction(v: DVec3) -> bool {
    v.is_finite() && v.length_squared() > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{BodyId, NullRenderer, RenderResult};
    use crate::spec::DimensionSpec;
    use std::path::Path;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        CreatePage(String, String),
        AddBody,
        AddView(ViewRequest),
        AddDimension(ViewId, DimensionRequest),
        Recompute,
        ExportPdf(PathBuf),
        ExportSvg(PathBuf),
    }

    /// Renderer that records every call and hands out fresh ids
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Vec<Call>,
        views: Vec<(String, ViewId)>,
        fail_exports: bool,
    }

    impl RecordingRenderer {
        fn view_id(&self, name: &str) -> ViewId {
            self.views
                .iter()
                .rev()
                .find(|(n, _)| n == name)
                .map(|(_, id)| *id)
                .unwrap()
        }

        fn dimensions(&self) -> Vec<(ViewId, DimensionRequest)> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::AddDimension(view, request) => Some((*view, request.clone())),
                    _ => None,
                })
                .collect()
        }
    }

    impl DrawingRenderer for RecordingRenderer {
        fn name(&self) -> &str {
            "recording"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn create_page(&mut self, title: &str, template: &str) -> RenderResult<PageId> {
            self.calls.push(Call::CreatePage(title.into(), template.into()));
            Ok(PageId::new())
        }

        fn add_body(&mut self, _page: PageId, _solid: &Solid) -> RenderResult<BodyId> {
            self.calls.push(Call::AddBody);
            Ok(BodyId::new())
        }

        fn add_view(
            &mut self,
            _page: PageId,
            _body: BodyId,
            view: &ViewRequest,
        ) -> RenderResult<ViewId> {
            let id = ViewId::new();
            self.views.push((view.name.clone(), id));
            self.calls.push(Call::AddView(view.clone()));
            Ok(id)
        }

        fn add_dimension(
            &mut self,
            _page: PageId,
            view: ViewId,
            dimension: &DimensionRequest,
        ) -> RenderResult<()> {
            self.calls.push(Call::AddDimension(view, dimension.clone()));
            Ok(())
        }

        fn recompute(&mut self, _page: PageId) -> RenderResult<()> {
            self.calls.push(Call::Recompute);
            Ok(())
        }

        fn export_pdf(&mut self, _page: PageId, path: &Path) -> RenderResult<()> {
            if self.fail_exports {
                return Err(RenderError::Export("disk full".into()));
            }
            self.calls.push(Call::ExportPdf(path.to_path_buf()));
            Ok(())
        }

        fn export_svg(&mut self, _page: PageId, path: &Path) -> RenderResult<()> {
            self.calls.push(Call::ExportSvg(path.to_path_buf()));
            Ok(())
        }
    }

    fn solid() -> Solid {
        Solid::new("test")
    }

    fn ring_drawing() -> DrawingSpec {
        DrawingSpec {
            page_title: "DRW_RING".into(),
            template_reference: "A4_LandscapeTD.svg".into(),
            views: vec![
                ViewSpec::section("SECTION_AA", DVec3::Y, None),
                ViewSpec::projection("TOP", DVec3::Z).with_scale(0.5),
            ],
            dimensions: vec![
                DimensionSpec::new("SECTION_AA", "linear", "20 mm", &["Edge1", "Edge3"]),
                DimensionSpec::new("TOP", "Diameter", "Ø30", &["Edge2"]),
            ],
        }
    }

    #[test]
    fn test_project_call_order() {
        let mut renderer = RecordingRenderer::default();
        let targets = ExportTargets::pdf("/out/ring.pdf").with_svg("/out/ring.svg");
        let handle = project(
            &mut renderer,
            &solid(),
            &ring_drawing(),
            &targets,
            &ProjectorConfig::default(),
        )
        .unwrap();

        let kinds: Vec<&str> = renderer
            .calls
            .iter()
            .map(|c| match c {
                Call::CreatePage(..) => "page",
                Call::AddBody => "body",
                Call::AddView(_) => "view",
                Call::AddDimension(..) => "dimension",
                Call::Recompute => "recompute",
                Call::ExportPdf(_) => "pdf",
                Call::ExportSvg(_) => "svg",
            })
            .collect();
        assert_eq!(
            kinds,
            [
                "page",
                "body",
                "view",
                "view",
                "recompute",
                "dimension",
                "dimension",
                "recompute",
                "pdf",
                "svg"
            ]
        );
        assert_eq!(
            renderer.calls[0],
            Call::CreatePage("DRW_RING".into(), "A4_LandscapeTD.svg".into())
        );
        assert_eq!(handle.pdf, Some(PathBuf::from("/out/ring.pdf")));
        assert_eq!(handle.svg, Some(PathBuf::from("/out/ring.svg")));
    }

    #[test]
    fn test_section_view_without_normal_defers_to_renderer() {
        let mut renderer = RecordingRenderer::default();
        project(
            &mut renderer,
            &solid(),
            &ring_drawing(),
            &ExportTargets::default(),
            &ProjectorConfig::default(),
        )
        .unwrap();

        let Call::AddView(section) = &renderer.calls[2] else {
            panic!("expected a view, got {:?}", renderer.calls[2]);
        };
        assert_eq!(section.section, Some(SectionRequest { normal: None }));

        let Call::AddView(top) = &renderer.calls[3] else {
            panic!("expected a view, got {:?}", renderer.calls[3]);
        };
        assert_eq!(top.section, None);
        assert_eq!(top.scale, Some(0.5));
    }

    #[test]
    fn test_dimensions_bind_to_views_and_map_kinds() {
        let mut spec = ring_drawing();
        spec.dimensions.push(DimensionSpec::new("TOP", "Angle", "45°", &["Edge4", "Edge5"]));

        let mut renderer = RecordingRenderer::default();
        project(
            &mut renderer,
            &solid(),
            &spec,
            &ExportTargets::default(),
            &ProjectorConfig::default(),
        )
        .unwrap();

        let dims = renderer.dimensions();
        assert_eq!(dims.len(), 3);

        assert_eq!(dims[0].0, renderer.view_id("SECTION_AA"));
        assert_eq!(dims[0].1.annotation, AnnotationType::Distance);
        assert_eq!(dims[0].1.edges, ["Edge1", "Edge3"]);
        assert_eq!(dims[0].1.label, "20 mm");

        assert_eq!(dims[1].0, renderer.view_id("TOP"));
        assert_eq!(dims[1].1.annotation, AnnotationType::Diameter);
        assert_eq!(dims[1].1.label, "Ø30");

        assert_eq!(dims[2].1.annotation, AnnotationType::Other("Angle".into()));
    }

    #[test]
    fn test_unknown_view_reference_makes_no_renderer_calls() {
        let mut spec = ring_drawing();
        spec.dimensions.push(DimensionSpec::new("SIDE", "linear", "5 mm", &["Edge1"]));

        let mut renderer = RecordingRenderer::default();
        let err = project(
            &mut renderer,
            &solid(),
            &spec,
            &ExportTargets::pdf("/out/ring.pdf"),
            &ProjectorConfig::default(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ProjectError::UnknownViewReference {
                view_id: "SIDE".into(),
                index: 2,
            }
        );
        assert!(renderer.calls.is_empty());
    }

    #[test]
    fn test_duplicate_view_last_wins() {
        let mut spec = ring_drawing();
        spec.views.push(ViewSpec::projection("TOP", DVec3::NEG_Z));

        let mut renderer = RecordingRenderer::default();
        project(
            &mut renderer,
            &solid(),
            &spec,
            &ExportTargets::default(),
            &ProjectorConfig::default(),
        )
        .unwrap();

        let later_top = renderer.view_id("TOP");
        assert_eq!(renderer.views.len(), 3);
        assert_eq!(renderer.dimensions()[1].0, later_top);
    }

    #[test]
    fn test_strict_policies_reject_before_rendering() {
        let mut renderer = RecordingRenderer::default();
        let err = project(
            &mut renderer,
            &solid(),
            &ring_drawing(),
            &ExportTargets::default(),
            &ProjectorConfig::strict(),
        )
        .unwrap_err();
        assert_eq!(err, ProjectError::MissingSectionNormal("SECTION_AA".into()));
        assert!(renderer.calls.is_empty());

        let mut spec = ring_drawing();
        spec.views[0].section_normal = Some(DVec3::Y);
        spec.views.push(ViewSpec::projection("TOP", DVec3::X));
        assert_eq!(
            validate(&spec, &ProjectorConfig::strict()),
            Err(ProjectError::DuplicateViewId("TOP".into()))
        );
    }

    #[test]
    fn test_invalid_view_parameters() {
        let mut spec = ring_drawing();
        spec.views[1].scale = Some(0.0);
        assert!(matches!(
            validate(&spec, &ProjectorConfig::default()),
            Err(ProjectError::InvalidViewParameter { view, .. }) if view == "TOP"
        ));

        let mut spec = ring_drawing();
        spec.views[0].direction = DVec3::ZERO;
        assert!(matches!(
            validate(&spec, &ProjectorConfig::default()),
            Err(ProjectError::InvalidViewParameter { view, .. }) if view == "SECTION_AA"
        ));
    }

    #[test]
    fn test_empty_drawing_is_valid() {
        let spec = DrawingSpec {
            page_title: "EMPTY".into(),
            template_reference: "A4.svg".into(),
            views: Vec::new(),
            dimensions: Vec::new(),
        };
        let mut renderer = RecordingRenderer::default();
        project(
            &mut renderer,
            &solid(),
            &spec,
            &ExportTargets::pdf("/out/empty.pdf"),
            &ProjectorConfig::default(),
        )
        .unwrap();
        assert_eq!(renderer.calls.len(), 5);
    }

    #[test]
    fn test_renderer_errors_propagate() {
        let mut renderer = RecordingRenderer {
            fail_exports: true,
            ..Default::default()
        };
        let err = project(
            &mut renderer,
            &solid(),
            &ring_drawing(),
            &ExportTargets::pdf("/out/ring.pdf"),
            &ProjectorConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ProjectError::Renderer(RenderError::Export("disk full".into()))
        );

        let err = project(
            &mut NullRenderer,
            &solid(),
            &ring_drawing(),
            &ExportTargets::default(),
            &ProjectorConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ProjectError::Renderer(RenderError::RendererNotAvailable(_))
        ));
    }
}
