//! Read-only shape-query capability consumed by the motion core.
//!
//! Actors never touch the physics world directly: every cast, overlap and
//! separation request goes through [`ShapeQueries`], which is object-safe so the
//! core can run against the parry-backed [`crate::QueryWorld`] or a scripted
//! provider in tests.

use crate::{
    flags::{Layer, LayerMask, Tags},
    types::{Bounds, ColliderId, Contact, Hit, Penetration, Quat, Vec3},
};

/// Whether trigger colliders take part in a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TriggerPolicy {
    #[default]
    Ignore,
    Collide,
}

/// Filter applied to every query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueryFilter {
    /// Layers considered by the query.
    pub layers: LayerMask,
    pub triggers: TriggerPolicy,
    /// Collider skipped by the query (usually the querying actor's own collider).
    pub exclude: Option<ColliderId>,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            layers: LayerMask::all(),
            triggers: TriggerPolicy::Ignore,
            exclude: None,
        }
    }
}

impl QueryFilter {
    #[inline]
    pub fn with_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    #[inline]
    pub fn with_triggers(mut self, triggers: TriggerPolicy) -> Self {
        self.triggers = triggers;
        self
    }

    #[inline]
    pub fn excluding(mut self, id: Option<ColliderId>) -> Self {
        self.exclude = id;
        self
    }

    /// Whether a collider with the given properties passes this filter.
    #[inline]
    pub fn accepts(&self, id: ColliderId, layer: Layer, is_trigger: bool) -> bool {
        if self.exclude == Some(id) {
            return false;
        }
        if is_trigger && self.triggers == TriggerPolicy::Ignore {
            return false;
        }
        self.layers.has(layer)
    }
}

/// What an actor can see of another collidable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColliderInfo {
    pub id: ColliderId,
    pub bounds: Bounds,
    pub is_trigger: bool,
    pub layer: Layer,
    pub tags: Tags,
    pub translation: Vec3,
    pub rotation: Quat,
}

/// Shape queries against the physics world.
///
/// All directions are expected to be unit length; implementations return `None`
/// for zero-length directions. Capsules are given by their segment end points.
pub trait ShapeQueries {
    fn raycast(&self, origin: Vec3, dir: Vec3, max_dist: f32, filter: QueryFilter) -> Option<Hit>;

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        dir: Vec3,
        max_dist: f32,
        filter: QueryFilter,
    ) -> Option<Hit>;

    fn capsule_cast(
        &self,
        bottom: Vec3,
        top: Vec3,
        radius: f32,
        dir: Vec3,
        max_dist: f32,
        filter: QueryFilter,
    ) -> Option<Hit>;

    /// Colliders overlapping the capsule, ordered by id.
    fn overlap_capsule(&self, bottom: Vec3, top: Vec3, radius: f32, filter: QueryFilter)
    -> Vec<ColliderId>;

    /// Minimum translation moving the capsule out of `other`, if they overlap.
    fn compute_penetration(
        &self,
        bottom: Vec3,
        top: Vec3,
        radius: f32,
        other: ColliderId,
    ) -> Option<Penetration>;

    /// Closest contact between the capsule and `other` when their gap is below `prediction`.
    fn contact(
        &self,
        bottom: Vec3,
        top: Vec3,
        radius: f32,
        other: ColliderId,
        prediction: f32,
    ) -> Option<Contact>;

    fn collider(&self, id: ColliderId) -> Option<ColliderInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_ignores_triggers_only() {
        let f = QueryFilter::default();
        assert!(f.accepts(ColliderId(1), Layer::Default, false));
        assert!(!f.accepts(ColliderId(1), Layer::Default, true));

        let f = f.with_triggers(TriggerPolicy::Collide);
        assert!(f.accepts(ColliderId(1), Layer::Water, true));
    }

    #[test]
    fn filter_excludes_self_and_foreign_layers() {
        let f = QueryFilter::default()
            .with_layers(Layer::Ledge.only())
            .excluding(Some(ColliderId(7)));
        assert!(!f.accepts(ColliderId(7), Layer::Ledge, false));
        assert!(!f.accepts(ColliderId(8), Layer::Default, false));
        assert!(f.accepts(ColliderId(8), Layer::Ledge, false));
    }
}
