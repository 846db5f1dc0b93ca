//! Keyed registry of zones
//!
//! [`Pathfinding`] maps string keys to immutable [`Zone`]s. Zones are handed
//! out as `Arc`s, so replacing or removing a zone never disturbs queries that
//! are still running against the previous version. Every query builds its own
//! [`ZoneQuery`] and with it its own search scratch state, which makes the
//! registry safe to share between threads.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use glam::Vec3;
use polypath_common::{Error, Result};

use crate::config::{QueryConfig, ZoneConfig};
use crate::path::Path;
use crate::step_clamp::StepResult;
use crate::zone::{GroupId, NodeId, Zone};
use crate::zone_builder::ZoneBuilder;
use crate::zone_query::{Near, RandomSample, SampleKind, ZoneQuery};

type ZoneMap = HashMap<String, Arc<Zone>>;

/// Registry of named zones and the entry point for queries against them
#[derive(Debug, Default)]
pub struct Pathfinding {
    zones: RwLock<ZoneMap>,
    zone_config: ZoneConfig,
    query_config: QueryConfig,
}

impl Pathfinding {
    /// Creates an empty registry with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry, rejecting invalid configuration
    pub fn with_config(zone_config: ZoneConfig, query_config: QueryConfig) -> Result<Self> {
        zone_config.validate()?;
        query_config.validate()?;
        Ok(Self {
            zones: RwLock::new(HashMap::new()),
            zone_config,
            query_config,
        })
    }

    pub fn zone_config(&self) -> &ZoneConfig {
        &self.zone_config
    }

    pub fn query_config(&self) -> &QueryConfig {
        &self.query_config
    }

    // A panic while holding the lock cannot leave the map half-updated
    fn read(&self) -> RwLockReadGuard<'_, ZoneMap> {
        self.zones.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ZoneMap> {
        self.zones.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Builds a zone from a triangle soup and stores it under `key`.
    ///
    /// Returns the new zone. A failed build leaves the registry untouched.
    pub fn create_zone(&self, key: &str, triangles: &[[Vec3; 3]]) -> Result<Arc<Zone>> {
        let zone = Arc::new(ZoneBuilder::new(self.zone_config.clone()).build(triangles)?);
        self.set_zone(key, Arc::clone(&zone));
        Ok(zone)
    }

    /// Stores `zone` under `key`, returning the zone it replaces
    pub fn set_zone(&self, key: &str, zone: Arc<Zone>) -> Option<Arc<Zone>> {
        log::debug!(
            "registering zone '{key}': {} groups, {} nodes",
            zone.groups().len(),
            zone.node_count()
        );
        self.write().insert(key.to_string(), zone)
    }

    /// Removes the zone stored under `key`
    pub fn remove_zone(&self, key: &str) -> Option<Arc<Zone>> {
        self.write().remove(key)
    }

    /// Gets the zone stored under `key`
    pub fn zone(&self, key: &str) -> Result<Arc<Zone>> {
        self.read()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("zone '{key}'")))
    }

    pub fn contains_zone(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Keys of all stored zones, sorted
    pub fn zone_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn closest_node(
        &self,
        key: &str,
        position: Vec3,
        group: GroupId,
        check_polygon: bool,
    ) -> Result<NodeId> {
        let zone = self.zone(key)?;
        self.query(&zone)?.closest_node(position, group, check_polygon)
    }

    /// Draws a random sample from a group, using `rng` for every random choice
    pub fn random_sample(
        &self,
        key: &str,
        group: GroupId,
        near: Option<Near>,
        kind: SampleKind,
        rng: &mut fastrand::Rng,
    ) -> Result<RandomSample> {
        let zone = self.zone(key)?;
        let mut query = self.query(&zone)?;
        query.set_random_seed(rng.u64(..));
        query.random_sample(group, near, kind)
    }

    pub fn group_of(&self, key: &str, position: Vec3, check_polygon: bool) -> Result<GroupId> {
        let zone = self.zone(key)?;
        self.query(&zone)?.group_of(position, check_polygon)
    }

    pub fn find_path(&self, key: &str, start: Vec3, end: Vec3, group: GroupId) -> Result<Path> {
        let zone = self.zone(key)?;
        self.query(&zone)?.find_path(start, end, group)
    }

    pub fn find_path_in_zone(&self, key: &str, start: Vec3, end: Vec3) -> Result<Path> {
        let zone = self.zone(key)?;
        self.query(&zone)?.find_path_in_zone(start, end)
    }

    pub fn clamp_step(
        &self,
        key: &str,
        start: Vec3,
        end: Vec3,
        node: NodeId,
        group: GroupId,
    ) -> Result<StepResult> {
        let zone = self.zone(key)?;
        self.query(&zone)?.clamp_step(start, end, node, group)
    }

    fn query<'z>(&self, zone: &'z Zone) -> Result<ZoneQuery<'z>> {
        ZoneQuery::with_config(zone, self.query_config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_mesh_helpers::*;

    #[test]
    fn test_zone_lifecycle() -> Result<()> {
        let pathfinding = Pathfinding::new();
        assert!(pathfinding.zone_keys().is_empty());

        let zone = pathfinding.create_zone("level1", &unit_square_triangles())?;
        assert_eq!(zone.node_count(), 2);
        assert!(pathfinding.contains_zone("level1"));
        assert_eq!(pathfinding.zone_keys(), vec!["level1".to_string()]);

        let removed = pathfinding.remove_zone("level1");
        assert!(removed.is_some());
        assert!(matches!(pathfinding.zone("level1"), Err(Error::NotFound(_))));
        assert!(pathfinding.remove_zone("level1").is_none());
        Ok(())
    }

    #[test]
    fn test_queries_on_missing_zone() {
        let pathfinding = Pathfinding::new();
        let p = Vec3::ZERO;

        assert!(matches!(
            pathfinding.find_path("nowhere", p, p, GroupId::new(0)),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            pathfinding.group_of("nowhere", p, true),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() -> Result<()> {
        assert!(matches!(
            Pathfinding::with_config(ZoneConfig::default(), QueryConfig::new().with_max_group_distance(-1.0)),
            Err(Error::InvalidParam(_))
        ));
        assert!(matches!(
            Pathfinding::with_config(ZoneConfig::new().with_weld_tolerance(-1.0), QueryConfig::default()),
            Err(Error::InvalidMesh(_))
        ));

        let pathfinding = Pathfinding::with_config(
            ZoneConfig::default(),
            QueryConfig::new().with_max_group_distance(0.25),
        )?;
        pathfinding.create_zone("level1", &unit_square_triangles())?;
        assert_eq!(pathfinding.group_of("level1", Vec3::new(0.5, 0.0, 0.3), true)?, GroupId::new(0));
        assert!(matches!(
            pathfinding.group_of("level1", Vec3::new(1.5, 0.0, 0.5), true),
            Err(Error::NotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_failed_build_keeps_previous_zone() -> Result<()> {
        let pathfinding = Pathfinding::new();
        pathfinding.create_zone("level1", &unit_square_triangles())?;

        let bad = [[Vec3::new(f32::NAN, 0.0, 0.0), Vec3::X, Vec3::Z]];
        assert!(matches!(
            pathfinding.create_zone("level1", &bad),
            Err(Error::InvalidMesh(_))
        ));
        assert_eq!(pathfinding.zone("level1")?.node_count(), 2);
        Ok(())
    }

    #[test]
    fn test_seeded_sampling_is_repeatable() -> Result<()> {
        let pathfinding = Pathfinding::new();
        pathfinding.set_zone("grid", Arc::new(create_grid_zone(4)?));

        let draw = |seed| -> Result<Vec<RandomSample>> {
            let mut rng = fastrand::Rng::with_seed(seed);
            (0..8)
                .map(|_| {
                    pathfinding.random_sample("grid", GroupId::new(0), None, SampleKind::Surface, &mut rng)
                })
                .collect()
        };

        assert_eq!(draw(7)?, draw(7)?);
        Ok(())
    }
}
