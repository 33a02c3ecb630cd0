//! Reference CSG Kernel Backend
//!
//! Keeps every solid as a constructive-solid-geometry tree of boxes and
//! axis-aligned cylinders. Volumes are integrated by casting a grid of rays
//! parallel to Z through the tree; each primitive contributes an exact
//! interval along the ray, so only the XY sampling introduces error. The
//! grid always has an edge on every primitive boundary, so curved walls are
//! the only source of that error.

use std::collections::HashMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    Aabb, BoxCentering, CadError, CadKernel, CadResult, ExtrudeDirection, MassProperties,
    Profile, SketchPlane, Solid,
};

/// Settings for the reference kernel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsgConfig {
    /// Uniform sample cells per bounding-box axis, before they are split at
    /// primitive boundaries
    pub samples_per_axis: u32,
    /// Volumes at or below this are treated as empty
    pub empty_volume: f64,
}

impl Default for CsgConfig {
    fn default() -> Self {
        Self {
            samples_per_axis: 256,
            empty_volume: 1e-9,
        }
    }
}

/// Sorted, disjoint closed intervals along one ray
#[derive(Debug, Clone, Default, PartialEq)]
struct Spans(Vec<(f64, f64)>);

impl Spans {
    fn single(lo: f64, hi: f64) -> Self {
        if hi > lo {
            Spans(vec![(lo, hi)])
        } else {
            Spans::default()
        }
    }

    fn length(&self) -> f64 {
        self.0.iter().map(|(lo, hi)| hi - lo).sum()
    }

    fn union(mut self, other: Spans) -> Spans {
        self.0.extend(other.0);
        self.0.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut merged: Vec<(f64, f64)> = Vec::with_capacity(self.0.len());
        for (lo, hi) in self.0 {
            match merged.last_mut() {
                Some(last) if lo <= last.1 => last.1 = last.1.max(hi),
                _ => merged.push((lo, hi)),
            }
        }
        Spans(merged)
    }

    fn difference(self, other: &Spans) -> Spans {
        let mut out = Vec::new();
        for (mut lo, hi) in self.0 {
            for &(cut_lo, cut_hi) in &other.0 {
                if cut_hi <= lo || cut_lo >= hi {
                    continue;
                }
                if cut_lo > lo {
                    out.push((lo, cut_lo));
                }
                lo = lo.max(cut_hi);
                if lo >= hi {
                    break;
                }
            }
            if hi > lo {
                out.push((lo, hi));
            }
        }
        Spans(out)
    }
}

/// Node of a CSG tree
#[derive(Debug, Clone, PartialEq)]
enum CsgNode {
    Cuboid(Aabb),
    /// Cylinder whose axis is the normal of `plane`
    Cylinder {
        plane: SketchPlane,
        center: DVec3,
        radius: f64,
        half_length: f64,
    },
    Union(Vec<CsgNode>),
    Difference(Box<CsgNode>, Box<CsgNode>),
}

impl CsgNode {
    fn bounds(&self) -> Aabb {
        match self {
            CsgNode::Cuboid(aabb) => *aabb,
            CsgNode::Cylinder {
                plane,
                center,
                radius,
                half_length,
            } => {
                let axis = plane.normal();
                let extent = axis * *half_length + (DVec3::ONE - axis) * *radius;
                Aabb::new(*center - extent, *center + extent)
            }
            CsgNode::Union(children) => children
                .iter()
                .map(CsgNode::bounds)
                .reduce(|a, b| a.union(&b))
                .unwrap_or(Aabb::new(DVec3::ZERO, DVec3::ZERO)),
            CsgNode::Difference(target, _) => target.bounds(),
        }
    }

    fn translated(&self, offset: DVec3) -> CsgNode {
        match self {
            CsgNode::Cuboid(aabb) => CsgNode::Cuboid(aabb.translated(offset)),
            CsgNode::Cylinder {
                plane,
                center,
                radius,
                half_length,
            } => CsgNode::Cylinder {
                plane: *plane,
                center: *center + offset,
                radius: *radius,
                half_length: *half_length,
            },
            CsgNode::Union(children) => {
                CsgNode::Union(children.iter().map(|c| c.translated(offset)).collect())
            }
            CsgNode::Difference(target, tool) => CsgNode::Difference(
                Box::new(target.translated(offset)),
                Box::new(tool.translated(offset)),
            ),
        }
    }

    fn contains(&self, p: DVec3) -> bool {
        match self {
            CsgNode::Cuboid(aabb) => p.cmpge(aabb.min).all() && p.cmple(aabb.max).all(),
            CsgNode::Cylinder {
                plane,
                center,
                radius,
                half_length,
            } => {
                let rel = p - *center;
                let along = plane.offset_of(rel);
                let radial = plane.to_local(rel);
                along.abs() <= *half_length && radial.length_squared() <= radius * radius
            }
            CsgNode::Union(children) => children.iter().any(|c| c.contains(p)),
            CsgNode::Difference(target, tool) => target.contains(p) && !tool.contains(p),
        }
    }

    /// Intervals covered by the node along the vertical line through (x, y)
    fn z_spans(&self, x: f64, y: f64) -> Spans {
        match self {
            CsgNode::Cuboid(aabb) => {
                if x >= aabb.min.x && x <= aabb.max.x && y >= aabb.min.y && y <= aabb.max.y {
                    Spans::single(aabb.min.z, aabb.max.z)
                } else {
                    Spans::default()
                }
            }
            CsgNode::Cylinder {
                plane,
                center,
                radius,
                half_length,
            } => {
                let (dx, dy) = (x - center.x, y - center.y);
                let r2 = radius * radius;
                match plane {
                    SketchPlane::XY => {
                        if dx * dx + dy * dy <= r2 {
                            Spans::single(center.z - half_length, center.z + half_length)
                        } else {
                            Spans::default()
                        }
                    }
                    SketchPlane::YZ => {
                        if dx.abs() <= *half_length && dy * dy <= r2 {
                            let dz = (r2 - dy * dy).sqrt();
                            Spans::single(center.z - dz, center.z + dz)
                        } else {
                            Spans::default()
                        }
                    }
                    SketchPlane::XZ => {
                        if dy.abs() <= *half_length && dx * dx <= r2 {
                            let dz = (r2 - dx * dx).sqrt();
                            Spans::single(center.z - dz, center.z + dz)
                        } else {
                            Spans::default()
                        }
                    }
                }
            }
            CsgNode::Union(children) => children
                .iter()
                .fold(Spans::default(), |acc, c| acc.union(c.z_spans(x, y))),
            CsgNode::Difference(target, tool) => {
                let base = target.z_spans(x, y);
                if base.0.is_empty() {
                    return base;
                }
                base.difference(&tool.z_spans(x, y))
            }
        }
    }

    /// Collect the x and y coordinates where a primitive boundary starts or ends
    fn breakpoints(&self, xs: &mut Vec<f64>, ys: &mut Vec<f64>) {
        match self {
            CsgNode::Cuboid(aabb) => {
                xs.extend([aabb.min.x, aabb.max.x]);
                ys.extend([aabb.min.y, aabb.max.y]);
            }
            CsgNode::Cylinder {
                plane,
                center,
                radius,
                half_length,
            } => {
                let (rx, ry) = match plane {
                    SketchPlane::XY => (*radius, *radius),
                    SketchPlane::YZ => (*half_length, *radius),
                    SketchPlane::XZ => (*radius, *half_length),
                };
                xs.extend([center.x - rx, center.x, center.x + rx]);
                ys.extend([center.y - ry, center.y, center.y + ry]);
            }
            CsgNode::Union(children) => {
                for child in children {
                    child.breakpoints(xs, ys);
                }
            }
            CsgNode::Difference(target, tool) => {
                target.breakpoints(xs, ys);
                tool.breakpoints(xs, ys);
            }
        }
    }

    /// Integrate the volume with the midpoint rule over Z rays
    ///
    /// The sample cells are a uniform grid refined by every primitive
    /// breakpoint, so a feature narrower than one uniform cell still gets a
    /// cell of its own. Trees made only of cuboids integrate exactly.
    fn volume(&self, samples: u32) -> f64 {
        let bounds = self.bounds();
        let size = bounds.size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return 0.0;
        }

        let (mut xs, mut ys) = (Vec::new(), Vec::new());
        self.breakpoints(&mut xs, &mut ys);
        let xs = cell_edges(xs, bounds.min.x, bounds.max.x, samples);
        let ys = cell_edges(ys, bounds.min.y, bounds.max.y, samples);

        let mut total = 0.0;
        for x in xs.windows(2) {
            let (xm, dx) = ((x[0] + x[1]) / 2.0, x[1] - x[0]);
            for y in ys.windows(2) {
                let (ym, dy) = ((y[0] + y[1]) / 2.0, y[1] - y[0]);
                total += self.z_spans(xm, ym).length() * dx * dy;
            }
        }
        total
    }
}

/// Sorted cell edges on `[lo, hi]`: `samples` uniform cells split at each breakpoint
fn cell_edges(breaks: Vec<f64>, lo: f64, hi: f64, samples: u32) -> Vec<f64> {
    let n = samples.max(1);
    let mut edges: Vec<f64> = (0..=n)
        .map(|i| lo + (hi - lo) * f64::from(i) / f64::from(n))
        .chain(breaks.into_iter().filter(|b| *b > lo && *b < hi))
        .collect();
    edges.sort_by(f64::total_cmp);
    edges.dedup();
    edges
}

/// In-process reference kernel
#[derive(Debug, Default)]
pub struct CsgKernel {
    config: CsgConfig,
    solids: HashMap<Uuid, CsgNode>,
}

impl CsgKernel {
    /// Create a kernel with the given settings
    pub fn new(config: CsgConfig) -> Self {
        Self {
            config,
            solids: HashMap::new(),
        }
    }

    /// Number of solids currently stored
    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    /// Point-membership test (boundary points count as inside)
    pub fn contains(&self, solid: &Solid, point: DVec3) -> CadResult<bool> {
        Ok(self.node(solid)?.contains(point))
    }

    fn node(&self, solid: &Solid) -> CadResult<&CsgNode> {
        self.solids
            .get(&solid.id)
            .ok_or(CadError::UnknownSolid(solid.id))
    }

    fn store(&mut self, node: CsgNode) -> Solid {
        let solid = Solid::new(self.name());
        self.solids.insert(solid.id, node);
        solid
    }
}

impl CadKernel for CsgKernel {
    fn name(&self) -> &str {
        "csg"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn extrude(
        &mut self,
        profile: &Profile,
        distance: f64,
        direction: ExtrudeDirection,
    ) -> CadResult<Solid> {
        profile.validate()?;
        if !(distance.is_finite() && distance > 0.0) {
            return Err(CadError::OperationFailed(format!(
                "Extrusion distance must be positive, got {}",
                distance
            )));
        }

        let (lo, hi) = direction.span(distance);
        let mid = profile.offset + (lo + hi) / 2.0;
        let mut cylinders: Vec<CsgNode> = profile
            .circles
            .iter()
            .map(|c| CsgNode::Cylinder {
                plane: profile.plane,
                center: profile.plane.to_world(c.center, mid),
                radius: c.radius,
                half_length: (hi - lo) / 2.0,
            })
            .collect();

        let node = if cylinders.len() == 1 {
            cylinders.remove(0)
        } else {
            CsgNode::Union(cylinders)
        };
        Ok(self.store(node))
    }

    fn create_box(&mut self, size: DVec3, centering: BoxCentering) -> CadResult<Solid> {
        if !(size.is_finite() && size.cmpgt(DVec3::ZERO).all()) {
            return Err(CadError::OperationFailed(format!(
                "Box size must be positive, got {}",
                size
            )));
        }
        let min = centering.min_corner(size);
        Ok(self.store(CsgNode::Cuboid(Aabb::new(min, min + size))))
    }

    fn subtract(&mut self, target: &Solid, tool: &Solid) -> CadResult<Solid> {
        let node = CsgNode::Difference(
            Box::new(self.node(target)?.clone()),
            Box::new(self.node(tool)?.clone()),
        );

        if node.volume(self.config.samples_per_axis) <= self.config.empty_volume {
            return Err(CadError::BooleanFailed(
                "Cut leaves no material in the target solid".into(),
            ));
        }
        Ok(self.store(node))
    }

    fn translate(&mut self, solid: &Solid, offset: DVec3) -> CadResult<Solid> {
        let node = self.node(solid)?.translated(offset);
        Ok(self.store(node))
    }

    fn measure(&self, solid: &Solid) -> CadResult<MassProperties> {
        let node = self.node(solid)?;
        Ok(MassProperties {
            volume: node.volume(self.config.samples_per_axis),
            bounds: node.bounds(),
        })
    }

    fn shutdown(&mut self) {
        tracing::debug!("Releasing {} CSG solids", self.solids.len());
        self.solids.clear();
    }
}
