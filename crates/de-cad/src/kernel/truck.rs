//! Truck CAD Kernel Backend
//!
//! Pure Rust B-Rep kernel using the Truck library.
//!
//! Note: Truck offers no mass-property queries, so `measure` is unsupported.
//! `bounds` is answered from the topological vertices, which is exact along
//! every straight edge and along a cylinder axis, but may fall short of a
//! curved wall between two vertices.

use std::collections::HashMap;
use std::f64::consts::TAU;

use glam::DVec3;
use uuid::Uuid;

use truck_modeling::{Point3, Rad, Solid as TruckSolid, Vector3, builder};

use super::{
    Aabb, BoxCentering, CadError, CadKernel, CadResult, ExtrudeDirection, MassProperties,
    Profile, Solid,
};

/// Tolerance handed to truck-shapeops
const BOOLEAN_TOLERANCE: f64 = 0.05;

fn point(v: DVec3) -> Point3 {
    Point3::new(v.x, v.y, v.z)
}

fn vector(v: DVec3) -> Vector3 {
    Vector3::new(v.x, v.y, v.z)
}

/// Truck-based CAD kernel
pub struct TruckKernel {
    /// Storage for solid data (keyed by UUID)
    solids: HashMap<Uuid, TruckSolid>,
}

impl TruckKernel {
    /// Create a new Truck kernel
    pub fn new() -> Self {
        Self {
            solids: HashMap::new(),
        }
    }

    /// Store a solid and return a Solid reference
    fn store_solid(&mut self, solid: TruckSolid) -> Solid {
        let handle = Solid::new(self.name());
        self.solids.insert(handle.id, solid);
        handle
    }

    fn get_solid(&self, solid: &Solid) -> CadResult<&TruckSolid> {
        self.solids
            .get(&solid.id)
            .ok_or(CadError::UnknownSolid(solid.id))
    }

    /// Sweep one circle of a profile into a cylinder
    fn cylinder(
        &self,
        profile: &Profile,
        index: usize,
        start: f64,
        length: f64,
    ) -> CadResult<TruckSolid> {
        let circle = profile.circles[index];
        let normal = profile.plane.normal();
        let center = profile.plane.to_world(circle.center, profile.offset + start);
        let rim = profile
            .plane
            .to_world(circle.center + glam::DVec2::X * circle.radius, profile.offset + start);

        let vertex = builder::vertex(point(rim));
        let wire = builder::rsweep(&vertex, point(center), vector(normal), Rad(TAU));
        let face = builder::try_attach_plane(&[wire])
            .map_err(|e| CadError::OperationFailed(format!("Failed to create face: {:?}", e)))?;
        Ok(builder::tsweep(&face, vector(normal * length)))
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl CadKernel for TruckKernel {
    fn name(&self) -> &str {
        "truck"
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
        let (lo, hi) = direction.span(distance);

        let mut solid = self.cylinder(profile, 0, lo, hi - lo)?;
        for index in 1..profile.circles.len() {
            let next = self.cylinder(profile, index, lo, hi - lo)?;
            solid = truck_shapeops::or(&solid, &next, BOOLEAN_TOLERANCE).ok_or_else(|| {
                CadError::BooleanFailed("Failed to union sketch circles".into())
            })?;
        }

        Ok(self.store_solid(solid))
    }

    fn create_box(&mut self, size: DVec3, centering: BoxCentering) -> CadResult<Solid> {
        let min = centering.min_corner(size);

        let vertex = builder::vertex(point(min));
        let edge = builder::tsweep(&vertex, Vector3::new(size.x, 0.0, 0.0));
        let face = builder::tsweep(&edge, Vector3::new(0.0, size.y, 0.0));
        let solid = builder::tsweep(&face, Vector3::new(0.0, 0.0, size.z));

        Ok(self.store_solid(solid))
    }

    fn subtract(&mut self, target: &Solid, tool: &Solid) -> CadResult<Solid> {
        let base = self.get_solid(target)?;
        let mut inverted = self.get_solid(tool)?.clone();
        inverted.not();

        let result = truck_shapeops::and(base, &inverted, BOOLEAN_TOLERANCE)
            .ok_or_else(|| CadError::BooleanFailed("Subtraction produced no solid".into()))?;
        Ok(self.store_solid(result))
    }

    fn translate(&mut self, solid: &Solid, offset: DVec3) -> CadResult<Solid> {
        let moved = builder::translated(self.get_solid(solid)?, vector(offset));
        Ok(self.store_solid(moved))
    }

    fn measure(&self, solid: &Solid) -> CadResult<MassProperties> {
        let _ = self.get_solid(solid)?;
        Err(CadError::OperationFailed(
            "Mass properties are not supported in Truck kernel".into(),
        ))
    }

    fn bounds(&self, solid: &Solid) -> CadResult<Aabb> {
        self.get_solid(solid)?
            .boundaries()
            .iter()
            .flat_map(|shell| shell.vertex_iter())
            .map(|vertex| {
                let p = vertex.point();
                Aabb::new(DVec3::new(p.x, p.y, p.z), DVec3::new(p.x, p.y, p.z))
            })
            .reduce(|a, b| a.union(&b))
            .ok_or_else(|| CadError::OperationFailed("Solid has no vertices".into()))
    }

    fn shutdown(&mut self) {
        self.solids.clear();
    }
}
