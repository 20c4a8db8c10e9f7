//! Per-frame broad-phase collision space
//!
//! Each frame owns one space holding two disjoint registries of geoms:
//!
//! - **dynamic**: members are expected to move every step and are tested
//!   against each other directly.
//! - **static**: members are assumed not to move. They are indexed by an
//!   octree that is only rebuilt after the static registry changes, so a
//!   static geom that moves must be removed and re-added to be seen at its
//!   new position.
//!
//! Registries hold [`GeomRef`]s only. Adds and removes must come in matched
//! pairs from the geom's owner.

use std::collections::BTreeMap;

use crate::body::BodyId;
use crate::config::CollisionConfig;
use crate::physics::collision::{Geom, GeomId, GeomRef, GeomSnapshot};
use crate::spatial::{Aabb, Octree, OctreeConfig};

/// Two overlapping geoms found by [`CollisionSpace::collide`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// The dynamic geom that was tested
    pub geom_a: GeomId,
    /// The geom it overlaps (static or dynamic)
    pub geom_b: GeomId,
    /// Owner of `geom_a`
    pub body_a: Option<BodyId>,
    /// Owner of `geom_b`
    pub body_b: Option<BodyId>,
    /// Bounding sphere penetration depth
    pub depth: f64,
}

/// Which registry a geom lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// Moving members
    Dynamic,
    /// Rarely moving members, indexed by an octree
    Static,
}

/// Broad-phase registries of one frame
#[derive(Debug)]
pub struct CollisionSpace {
    dynamic: BTreeMap<GeomId, GeomRef>,
    statics: BTreeMap<GeomId, GeomRef>,
    static_index: Option<Octree<GeomId>>,
    config: CollisionConfig,
    static_rebuilds: usize,
}

impl CollisionSpace {
    /// Create an empty space
    pub fn new(config: CollisionConfig) -> Self {
        Self {
            dynamic: BTreeMap::new(),
            statics: BTreeMap::new(),
            static_index: None,
            config,
            static_rebuilds: 0,
        }
    }

    /// Register a geom in the dynamic partition
    pub fn add_geom(&mut self, geom: &Geom) {
        Self::insert(&mut self.dynamic, geom, Partition::Dynamic);
    }

    /// Remove a geom from the dynamic partition
    pub fn remove_geom(&mut self, geom: &Geom) {
        Self::take(&mut self.dynamic, geom.id(), Partition::Dynamic);
    }

    /// Register a geom in the static partition
    pub fn add_static_geom(&mut self, geom: &Geom) {
        Self::insert(&mut self.statics, geom, Partition::Static);
        self.static_index = None;
    }

    /// Remove a geom from the static partition
    pub fn remove_static_geom(&mut self, geom: &Geom) {
        Self::take(&mut self.statics, geom.id(), Partition::Static);
        self.static_index = None;
    }

    fn insert(registry: &mut BTreeMap<GeomId, GeomRef>, geom: &Geom, partition: Partition) {
        let previous = registry.insert(geom.id(), geom.downgrade());
        if previous.is_some() {
            log::warn!("{} added twice to the {:?} partition", geom.id(), partition);
        }
        debug_assert!(previous.is_none(), "{} added twice to the {:?} partition", geom.id(), partition);
    }

    fn take(registry: &mut BTreeMap<GeomId, GeomRef>, id: GeomId, partition: Partition) {
        let removed = registry.remove(&id);
        if removed.is_none() {
            log::warn!("{} removed from the {:?} partition without being registered", id, partition);
        }
        debug_assert!(removed.is_some(), "{} removed from the {:?} partition without being registered", id, partition);
    }

    /// Partition currently holding `id`, if any
    pub fn partition_of(&self, id: GeomId) -> Option<Partition> {
        if self.dynamic.contains_key(&id) {
            Some(Partition::Dynamic)
        } else if self.statics.contains_key(&id) {
            Some(Partition::Static)
        } else {
            None
        }
    }

    /// True if `id` is in the dynamic partition
    pub fn has_geom(&self, id: GeomId) -> bool {
        self.dynamic.contains_key(&id)
    }

    /// True if `id` is in the static partition
    pub fn has_static_geom(&self, id: GeomId) -> bool {
        self.statics.contains_key(&id)
    }

    /// Number of dynamic registrations
    pub fn geom_count(&self) -> usize {
        self.dynamic.len()
    }

    /// Number of static registrations
    pub fn static_geom_count(&self) -> usize {
        self.statics.len()
    }

    /// How many times the static octree has been built
    pub fn static_rebuild_count(&self) -> usize {
        self.static_rebuilds
    }

    /// Drop registrations whose geom was released without being removed
    fn prune_dead(&mut self) {
        for (registry, partition) in [
            (&mut self.dynamic, Partition::Dynamic),
            (&mut self.statics, Partition::Static),
        ] {
            let before = registry.len();
            registry.retain(|_, handle| handle.is_alive());
            let pruned = before - registry.len();
            if pruned > 0 {
                log::warn!("Pruned {} released geoms from the {:?} partition", pruned, partition);
                if partition == Partition::Static {
                    self.static_index = None;
                }
            }
        }
    }

    fn rebuild_static_index(&mut self) {
        let snapshots: Vec<GeomSnapshot> = self.statics.values().filter_map(GeomRef::snapshot).collect();
        let bounds = Aabb::from_points(snapshots.iter().map(|s| &s.position))
            .expanded(self.config.static_bounds_margin.max(self.config.min_node_size));

        let mut octree = Octree::new(bounds, OctreeConfig::from(&self.config));
        for snapshot in &snapshots {
            octree.insert(snapshot.id, snapshot.position, snapshot.radius);
        }

        self.static_rebuilds += 1;
        log::debug!("Rebuilt static index with {} geoms", snapshots.len());
        self.static_index = Some(octree);
    }

    /// Report every overlapping pair that involves an enabled dynamic geom
    ///
    /// Dynamic geoms are tested against the static index and against each
    /// other. Static pairs are never reported. Disabled geoms are skipped
    /// on both sides.
    pub fn collide(&mut self, mut on_contact: impl FnMut(&Contact)) {
        self.prune_dead();
        if self.static_index.is_none() && !self.statics.is_empty() {
            self.rebuild_static_index();
        }

        let movers: Vec<GeomSnapshot> = self
            .dynamic
            .values()
            .filter_map(GeomRef::snapshot)
            .filter(|s| s.enabled)
            .collect();

        for (i, mover) in movers.iter().enumerate() {
            let sphere = mover.bounding_sphere();

            if let Some(index) = &self.static_index {
                for candidate in index.query_sphere(&mover.position, mover.radius) {
                    let Some(other) = self.statics.get(&candidate.id).and_then(GeomRef::snapshot) else {
                        continue;
                    };
                    if other.enabled && sphere.intersects(&other.bounding_sphere()) {
                        on_contact(&Self::contact(mover, &other));
                    }
                }
            }

            for other in &movers[i + 1..] {
                if sphere.intersects(&other.bounding_sphere()) {
                    on_contact(&Self::contact(mover, other));
                }
            }
        }
    }

    fn contact(a: &GeomSnapshot, b: &GeomSnapshot) -> Contact {
        Contact {
            geom_a: a.id,
            geom_b: b.id,
            body_a: a.user_data,
            body_b: b.user_data,
            depth: a.bounding_sphere().penetration_depth(&b.bounding_sphere()),
        }
    }
}

impl Default for CollisionSpace {
    fn default() -> Self {
        Self::new(CollisionConfig::default())
    }
}
