//! Parry-backed query world over level geometry.
//!
//! Builds an in-memory collider registry from a set of definitions (typically
//! sourced from level data) and answers [`ShapeQueries`] against it.
//!
//! Design goals
//! - Deterministic: given the same inputs, colliders are stored sorted by `id` and
//!   queries visit them in that order, so ties resolve identically everywhere.
//! - Query-focused: no dynamics. Poses only change through [`QueryWorld::set_pose`],
//!   which the level calls between actor passes (moving and falling platforms).
//! - Cheap prefilter: every collider caches its world AABB; shape queries test the
//!   narrow phase only for colliders whose bounds touch the query's swept bounds.

use log::warn;
use nalgebra as na;
use rapier3d::parry::{
    query::{self, Ray, ShapeCastOptions},
    shape::{Ball, Capsule, Shape, SharedShape},
};

use crate::{
    flags::{Layer, Tag, Tags},
    query::{ColliderInfo, QueryFilter, ShapeQueries},
    types::{Bounds, ColliderId, Contact, Hit, Iso, Penetration, Point, Quat, Vec3, iso},
};

/// Supported collider shapes.
///
/// Keep this intentionally small and deterministic. Extend as needed.
#[derive(Clone, Debug, PartialEq)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space). The plane normal is the pose's local +Y.
    Plane,

    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vec3 },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },

    /// Y-aligned cylinder (meters).
    CylinderY { radius: f32, half_height: f32 },
}

/// Canonical definition of a world collider.
#[derive(Clone, Debug, PartialEq)]
pub struct ColliderDef {
    /// Stable unique identifier used to ensure deterministic ordering.
    pub id: ColliderId,
    pub translation: Vec3,
    pub rotation: Quat,
    pub shape: ColliderShapeDef,
    /// Trigger volumes report overlaps but never block movement.
    pub is_trigger: bool,
    pub layer: Layer,
    pub tags: Tags,
}

impl ColliderDef {
    pub fn new(id: u32, shape: ColliderShapeDef, translation: Vec3) -> Self {
        Self {
            id: ColliderId(id),
            translation,
            rotation: Quat::identity(),
            shape,
            is_trigger: false,
            layer: Layer::Default,
            tags: Tags::default(),
        }
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    pub fn on_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    pub fn tagged(mut self, tag: Tag) -> Self {
        self.tags.add(tag);
        self
    }

    /// Reject definitions parry cannot represent.
    pub fn validate(&self) -> Result<(), &'static str> {
        let finite = |v: &Vec3| v.iter().all(|c| c.is_finite());
        if !finite(&self.translation) {
            return Err("collider translation must be finite");
        }
        let positive = |v: f32| v.is_finite() && v > 0.0;
        match &self.shape {
            ColliderShapeDef::Plane => Ok(()),
            ColliderShapeDef::Cuboid { half_extents } => {
                if half_extents.iter().all(|c| positive(*c)) {
                    Ok(())
                } else {
                    Err("cuboid half extents must be positive")
                }
            }
            ColliderShapeDef::Sphere { radius } => {
                if positive(*radius) {
                    Ok(())
                } else {
                    Err("sphere radius must be positive")
                }
            }
            ColliderShapeDef::CapsuleY {
                radius,
                half_height,
            }
            | ColliderShapeDef::CylinderY {
                radius,
                half_height,
            } => {
                if positive(*radius) && half_height.is_finite() && *half_height >= 0.0 {
                    Ok(())
                } else {
                    Err("capsule/cylinder dimensions must be positive")
                }
            }
        }
    }
}

struct Entry {
    def: ColliderDef,
    shape: SharedShape,
    pose: Iso,
    bounds: Bounds,
}

impl Entry {
    fn new(def: ColliderDef) -> Self {
        let shape = shape_from_def(&def.shape);
        let pose = iso(def.translation, def.rotation);
        let bounds = world_bounds(&shape, &pose);
        Self {
            def,
            shape,
            pose,
            bounds,
        }
    }

    fn info(&self) -> ColliderInfo {
        ColliderInfo {
            id: self.def.id,
            bounds: self.bounds,
            is_trigger: self.def.is_trigger,
            layer: self.def.layer,
            tags: self.def.tags,
            translation: self.def.translation,
            rotation: self.def.rotation,
        }
    }

    fn accepted_by(&self, filter: &QueryFilter) -> bool {
        filter.accepts(self.def.id, self.def.layer, self.def.is_trigger)
    }
}

/// In-memory collider registry answering shape queries.
pub struct QueryWorld {
    entries: Vec<Entry>,
}

impl QueryWorld {
    /// Build a query world from a list of collider definitions.
    ///
    /// Determinism
    /// - The input is sorted by `id` before insertion.
    /// - Invalid definitions and duplicate ids are skipped with a warning.
    pub fn build(mut defs: Vec<ColliderDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut entries: Vec<Entry> = Vec::with_capacity(defs.len());
        for def in defs {
            if let Err(reason) = def.validate() {
                warn!("skipping collider {:?}: {reason}", def.id);
                continue;
            }
            if entries.last().is_some_and(|e| e.def.id == def.id) {
                warn!("skipping duplicate collider id {:?}", def.id);
                continue;
            }
            entries.push(Entry::new(def));
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn index_of(&self, id: ColliderId) -> Option<usize> {
        self.entries.binary_search_by_key(&id, |e| e.def.id).ok()
    }

    /// Insert a new collider, keeping id order.
    pub fn insert(&mut self, def: ColliderDef) -> Result<(), &'static str> {
        def.validate()?;
        match self.entries.binary_search_by_key(&def.id, |e| e.def.id) {
            Ok(_) => Err("collider id already present"),
            Err(at) => {
                self.entries.insert(at, Entry::new(def));
                Ok(())
            }
        }
    }

    pub fn remove(&mut self, id: ColliderId) -> bool {
        match self.index_of(id) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    /// Move a collider. Returns false when the id is unknown.
    pub fn set_pose(&mut self, id: ColliderId, translation: Vec3, rotation: Quat) -> bool {
        let Some(i) = self.index_of(id) else {
            return false;
        };
        let e = &mut self.entries[i];
        e.def.translation = translation;
        e.def.rotation = rotation;
        e.pose = iso(translation, rotation);
        e.bounds = world_bounds(&e.shape, &e.pose);
        true
    }

    pub fn set_trigger(&mut self, id: ColliderId, is_trigger: bool) -> bool {
        let Some(i) = self.index_of(id) else {
            return false;
        };
        self.entries[i].def.is_trigger = is_trigger;
        true
    }

    /// Definitions currently stored, in id order.
    pub fn defs(&self) -> impl Iterator<Item = &ColliderDef> {
        self.entries.iter().map(|e| &e.def)
    }

    /// Cast `shape` from `shape_pose` along `dir` and return the earliest hit.
    fn cast(
        &self,
        shape_pose: &Iso,
        shape: &dyn Shape,
        swept: Bounds,
        dir: Vec3,
        max_dist: f32,
        filter: &QueryFilter,
    ) -> Option<Hit> {
        let dir = normalized(dir)?;
        let mut opts = ShapeCastOptions::with_max_time_of_impact(max_dist.max(0.0));
        // Shapes overlapping at the start are skipped when the motion separates them.
        opts.stop_at_penetration = false;

        let mut best: Option<Hit> = None;
        for e in &self.entries {
            if !e.accepted_by(filter) || !e.bounds.intersects(&swept) {
                continue;
            }
            let Ok(Some(hit)) = query::cast_shapes(
                shape_pose,
                &dir,
                shape,
                &e.pose,
                &Vec3::zeros(),
                &*e.shape,
                opts,
            ) else {
                continue;
            };

            if best.is_some_and(|b| hit.time_of_impact >= b.distance) {
                continue;
            }

            // Normals and witnesses are reported in each shape's local space.
            let normal = e.pose.rotation * hit.normal2.into_inner();
            let point = e.pose * hit.witness2;
            best = Some(Hit {
                point: point.coords,
                normal,
                distance: hit.time_of_impact,
                collider: e.def.id,
            });
        }
        best
    }
}

impl ShapeQueries for QueryWorld {
    fn raycast(&self, origin: Vec3, dir: Vec3, max_dist: f32, filter: QueryFilter) -> Option<Hit> {
        let dir = normalized(dir)?;
        let ray = Ray::new(Point::from(origin), dir);

        let mut best: Option<Hit> = None;
        for e in &self.entries {
            if !e.accepted_by(&filter) {
                continue;
            }
            let Some(hit) = e
                .shape
                .cast_ray_and_get_normal(&e.pose, &ray, max_dist.max(0.0), true)
            else {
                continue;
            };
            if best.is_some_and(|b| hit.time_of_impact >= b.distance) {
                continue;
            }
            best = Some(Hit {
                point: ray.point_at(hit.time_of_impact).coords,
                normal: hit.normal,
                distance: hit.time_of_impact,
                collider: e.def.id,
            });
        }
        best
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        dir: Vec3,
        max_dist: f32,
        filter: QueryFilter,
    ) -> Option<Hit> {
        let ball = Ball::new(radius);
        let pose = iso(origin, Quat::identity());
        let start = Bounds::new(origin, origin).loosened(radius);
        let end = origin + normalized(dir)? * max_dist.max(0.0);
        let swept = merge(start, Bounds::new(end, end).loosened(radius));
        self.cast(&pose, &ball, swept, dir, max_dist, &filter)
    }

    fn capsule_cast(
        &self,
        bottom: Vec3,
        top: Vec3,
        radius: f32,
        dir: Vec3,
        max_dist: f32,
        filter: QueryFilter,
    ) -> Option<Hit> {
        let capsule = Capsule::new(Point::from(bottom), Point::from(top), radius);
        let start = capsule_bounds(bottom, top, radius);
        let delta = normalized(dir)? * max_dist.max(0.0);
        let end = capsule_bounds(bottom + delta, top + delta, radius);
        self.cast(&Iso::identity(), &capsule, merge(start, end), dir, max_dist, &filter)
    }

    fn overlap_capsule(
        &self,
        bottom: Vec3,
        top: Vec3,
        radius: f32,
        filter: QueryFilter,
    ) -> Vec<ColliderId> {
        let capsule = Capsule::new(Point::from(bottom), Point::from(top), radius);
        let bounds = capsule_bounds(bottom, top, radius);
        let pose = Iso::identity();

        self.entries
            .iter()
            .filter(|e| e.accepted_by(&filter) && e.bounds.intersects(&bounds))
            .filter(|e| {
                query::intersection_test(&pose, &capsule, &e.pose, &*e.shape)
                    .unwrap_or(false)
            })
            .map(|e| e.def.id)
            .collect()
    }

    fn compute_penetration(
        &self,
        bottom: Vec3,
        top: Vec3,
        radius: f32,
        other: ColliderId,
    ) -> Option<Penetration> {
        let e = &self.entries[self.index_of(other)?];
        let capsule = Capsule::new(Point::from(bottom), Point::from(top), radius);

        let contact = query::contact(&Iso::identity(), &capsule, &e.pose, &*e.shape, 0.0)
            .ok()
            .flatten()?;
        if contact.dist >= 0.0 {
            return None;
        }

        // `normal2` points out of the other collider, toward the capsule.
        Some(Penetration {
            direction: contact.normal2.into_inner(),
            distance: -contact.dist,
        })
    }

    fn contact(
        &self,
        bottom: Vec3,
        top: Vec3,
        radius: f32,
        other: ColliderId,
        prediction: f32,
    ) -> Option<Contact> {
        let e = &self.entries[self.index_of(other)?];
        let capsule = Capsule::new(Point::from(bottom), Point::from(top), radius);

        let contact = query::contact(
            &Iso::identity(),
            &capsule,
            &e.pose,
            &*e.shape,
            prediction.max(0.0),
        )
        .ok()
        .flatten()?;
        Some(Contact {
            normal: contact.normal2.into_inner(),
            distance: contact.dist,
        })
    }

    fn collider(&self, id: ColliderId) -> Option<ColliderInfo> {
        self.index_of(id).map(|i| self.entries[i].info())
    }
}

/// Build a parry shape from a definition. The pose lives on the entry.
fn shape_from_def(def: &ColliderShapeDef) -> SharedShape {
    match def {
        ColliderShapeDef::Plane => SharedShape::halfspace(na::Vector3::y_axis()),
        ColliderShapeDef::Cuboid { half_extents } => {
            SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
        ColliderShapeDef::Sphere { radius } => SharedShape::ball(*radius),
        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => SharedShape::capsule_y(*half_height, *radius),
        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => SharedShape::cylinder(*half_height, *radius),
    }
}

fn world_bounds(shape: &SharedShape, pose: &Iso) -> Bounds {
    let aabb = shape.compute_aabb(pose);
    Bounds::new(aabb.mins.coords, aabb.maxs.coords)
}

#[inline]
fn capsule_bounds(bottom: Vec3, top: Vec3, radius: f32) -> Bounds {
    Bounds::new(bottom.inf(&top), bottom.sup(&top)).loosened(radius)
}

#[inline]
fn merge(a: Bounds, b: Bounds) -> Bounds {
    Bounds::new(a.min.inf(&b.min), a.max.sup(&b.max))
}

#[inline]
fn normalized(dir: Vec3) -> Option<Vec3> {
    let len = dir.norm();
    if len > 1.0e-6 { Some(dir / len) } else { None }
}
