//! Sheet renderer
//!
//! A reference [`DrawingRenderer`] that does not project geometry. Each view
//! becomes a labelled frame on the sheet listing its direction, scale,
//! section data and dimension callouts, and the page carries a title block
//! with the page title and template reference.

mod pdf;
mod svg;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use de_cad::Solid;
use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::traits::{
    BodyId, DimensionRequest, DrawingRenderer, PageId, RenderError, RenderResult, SectionRequest,
    ViewId, ViewRequest,
};

/// Sheet geometry, in millimetres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub width_mm: f64,
    pub height_mm: f64,
    pub margin_mm: f64,
    /// Height of the title block along the bottom edge
    pub title_block_mm: f64,
    /// View frames per row
    pub columns: usize,
    pub font_size_mm: f64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self::a4_landscape()
    }
}

impl SheetConfig {
    pub fn a4_landscape() -> Self {
        Self {
            width_mm: 297.0,
            height_mm: 210.0,
            margin_mm: 10.0,
            title_block_mm: 20.0,
            columns: 2,
            font_size_mm: 3.5,
        }
    }

    pub fn a3_landscape() -> Self {
        Self {
            width_mm: 420.0,
            height_mm: 297.0,
            columns: 3,
            ..Self::a4_landscape()
        }
    }

    fn line_height(&self) -> f64 {
        self.font_size_mm * 1.4
    }
}

/// Axis-aligned rectangle with its origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// One view frame on the sheet
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub view: ViewId,
    pub rect: Rect,
    pub heading: String,
    /// Text lines below the heading that fit inside the frame
    pub lines: Vec<String>,
}

/// Finished layout of a page, produced by `recompute`
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub title: String,
    pub template: String,
    pub border: Rect,
    pub title_block: Rect,
    pub frames: Vec<Frame>,
}

#[derive(Debug)]
struct SheetView {
    id: ViewId,
    request: ViewRequest,
    dimensions: Vec<DimensionRequest>,
}

#[derive(Debug)]
struct SheetPage {
    title: String,
    template: String,
    bodies: HashMap<BodyId, Solid>,
    views: Vec<SheetView>,
    layout: Option<SheetLayout>,
    dirty: bool,
}

impl SheetPage {
    fn view_mut(&mut self, id: ViewId) -> Option<&mut SheetView> {
        self.views.iter_mut().find(|v| v.id == id)
    }
}

/// Renderer that lays views out as labelled frames and exports SVG and PDF
#[derive(Debug, Default)]
pub struct SheetRenderer {
    config: SheetConfig,
    pages: HashMap<PageId, SheetPage>,
}

impl SheetRenderer {
    pub fn new(config: SheetConfig) -> Self {
        Self {
            config,
            pages: HashMap::new(),
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Layout of a page as of its last recompute
    pub fn layout(&self, page: PageId) -> Option<&SheetLayout> {
        self.pages.get(&page).and_then(|p| p.layout.as_ref())
    }

    fn page(&self, id: PageId) -> RenderResult<&SheetPage> {
        self.pages.get(&id).ok_or(RenderError::UnknownObject {
            kind: "page",
            id: id.0,
        })
    }

    fn page_mut(&mut self, id: PageId) -> RenderResult<&mut SheetPage> {
        self.pages.get_mut(&id).ok_or(RenderError::UnknownObject {
            kind: "page",
            id: id.0,
        })
    }

    /// Layout of a page that is ready to export
    fn exportable(&self, id: PageId) -> RenderResult<&SheetLayout> {
        let page = self.page(id)?;
        match (&page.layout, page.dirty) {
            (Some(layout), false) => Ok(layout),
            _ => Err(RenderError::InvalidRequest(format!(
                "page '{}' has changes that were not recomputed",
                page.title
            ))),
        }
    }

    fn layout_page(&self, page: &SheetPage) -> SheetLayout {
        let c = &self.config;
        let border = Rect::new(
            c.margin_mm,
            c.margin_mm,
            c.width_mm - 2.0 * c.margin_mm,
            c.height_mm - 2.0 * c.margin_mm,
        );
        let title_block = Rect::new(
            border.x,
            border.y + border.height - c.title_block_mm,
            border.width,
            c.title_block_mm,
        );

        let columns = c.columns.max(1);
        let rows = page.views.len().div_ceil(columns).max(1);
        let cell_width = border.width / columns as f64;
        let cell_height = (border.height - c.title_block_mm) / rows as f64;
        let max_lines = ((cell_height - 2.0 * c.line_height()) / c.line_height()).max(0.0) as usize;

        let frames = page
            .views
            .iter()
            .enumerate()
            .map(|(i, view)| {
                let rect = Rect::new(
                    border.x + (i % columns) as f64 * cell_width,
                    border.y + (i / columns) as f64 * cell_height,
                    cell_width,
                    cell_height,
                );
                let mut lines = frame_lines(view);
                if lines.len() > max_lines {
                    tracing::debug!(
                        view = %view.request.name,
                        dropped = lines.len() - max_lines,
                        "Frame too small for all callouts"
                    );
                    lines.truncate(max_lines);
                }
                Frame {
                    view: view.id,
                    rect,
                    heading: view.request.name.clone(),
                    lines,
                }
            })
            .collect();

        SheetLayout {
            title: page.title.clone(),
            template: page.template.clone(),
            border,
            title_block,
            frames,
        }
    }

    fn write_export(path: &Path, bytes: &[u8]) -> RenderResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| RenderError::Io(e.to_string()))?;
        }
        fs::write(path, bytes).map_err(|e| RenderError::Io(e.to_string()))
    }
}

fn frame_lines(view: &SheetView) -> Vec<String> {
    let request = &view.request;
    let mut lines = vec![format!("direction {}", fmt_vec(request.direction))];
    lines.push(match request.scale {
        Some(scale) => format!("scale {scale}"),
        None => "scale default".to_string(),
    });
    match request.section {
        Some(SectionRequest {
            normal: Some(normal),
        }) => lines.push(format!("section normal {}", fmt_vec(normal))),
        Some(SectionRequest { normal: None }) => lines.push("section default plane".to_string()),
        None => {}
    }
    for dim in &view.dimensions {
        let mut line = format!("{} {}", dim.annotation.as_str(), dim.label);
        if !dim.edges.is_empty() {
            line.push_str(&format!(" [{}]", dim.edges.join(", ")));
        }
        lines.push(line);
    }
    lines
}

fn fmt_vec(v: DVec3) -> String {
    format!("({}, {}, {})", v.x, v.y, v.z)
}

impl DrawingRenderer for SheetRenderer {
    fn name(&self) -> &str {
        "sheet"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn create_page(&mut self, title: &str, template: &str) -> RenderResult<PageId> {
        let id = PageId::new();
        self.pages.insert(
            id,
            SheetPage {
                title: title.to_string(),
                template: template.to_string(),
                bodies: HashMap::new(),
                views: Vec::new(),
                layout: None,
                dirty: true,
            },
        );
        Ok(id)
    }

    fn add_body(&mut self, page: PageId, solid: &Solid) -> RenderResult<BodyId> {
        let page = self.page_mut(page)?;
        let id = BodyId::new();
        page.bodies.insert(id, solid.clone());
        page.dirty = true;
        Ok(id)
    }

    fn add_view(
        &mut self,
        page: PageId,
        body: BodyId,
        view: &ViewRequest,
    ) -> RenderResult<ViewId> {
        let page = self.page_mut(page)?;
        if !page.bodies.contains_key(&body) {
            return Err(RenderError::UnknownObject {
                kind: "body",
                id: body.0,
            });
        }
        if !view.direction.is_finite() || view.direction.length_squared() == 0.0 {
            return Err(RenderError::InvalidRequest(format!(
                "view '{}' has no usable direction",
                view.name
            )));
        }
        let id = ViewId::new();
        page.views.push(SheetView {
            id,
            request: view.clone(),
            dimensions: Vec::new(),
        });
        page.dirty = true;
        Ok(id)
    }

    fn add_dimension(
        &mut self,
        page: PageId,
        view: ViewId,
        dimension: &DimensionRequest,
    ) -> RenderResult<()> {
        let page = self.page_mut(page)?;
        let target = page.view_mut(view).ok_or(RenderError::UnknownObject {
            kind: "view",
            id: view.0,
        })?;
        target.dimensions.push(dimension.clone());
        page.dirty = true;
        Ok(())
    }

    fn recompute(&mut self, page: PageId) -> RenderResult<()> {
        let layout = self.layout_page(self.page(page)?);
        let page = self.page_mut(page)?;
        page.layout = Some(layout);
        page.dirty = false;
        Ok(())
    }

    fn export_pdf(&mut self, page: PageId, path: &Path) -> RenderResult<()> {
        let bytes = pdf::render(self.exportable(page)?, &self.config)?;
        Self::write_export(path, &bytes)?;
        tracing::debug!(path = %path.display(), "Exported PDF");
        Ok(())
    }

    fn export_svg(&mut self, page: PageId, path: &Path) -> RenderResult<()> {
        let text = svg::render(self.exportable(page)?, &self.config);
        Self::write_export(path, text.as_bytes())?;
        tracing::debug!(path = %path.display(), "Exported SVG");
        Ok(())
    }

    fn shutdown(&mut self) {
        self.pages.clear();
    }
}
