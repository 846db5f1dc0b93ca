//! Tests for spatial queries
//!
//! Spatial queries include closest node lookup, group resolution and
//! random sampling.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::test_mesh_helpers::*;
    use crate::{Error, GroupId, Near, NodeId, QueryConfig, RandomSample, SampleKind, ZoneQuery};
    use glam::Vec3;
    use polypath_common::{distance_squared, point_in_convex_polygon_2d, Result};

    #[test]
    fn test_closest_node_prefers_containing_node() -> Result<()> {
        let zone = create_unit_square_zone()?;
        let query = ZoneQuery::new(&zone);
        let group = GroupId::new(0);

        assert_eq!(query.closest_node(v(0.8, 0.2), group, true)?, NodeId::new(0));
        assert_eq!(query.closest_node(v(0.2, 0.8), group, true)?, NodeId::new(1));
        Ok(())
    }

    #[test]
    fn test_closest_node_off_mesh_uses_nearest_centroid() -> Result<()> {
        let zone = create_unit_square_zone()?;
        let query = ZoneQuery::new(&zone);
        let group = GroupId::new(0);

        assert_eq!(query.closest_node(v(5.0, 0.0), group, true)?, NodeId::new(0));
        assert_eq!(query.closest_node(v(-3.0, 4.0), group, true)?, NodeId::new(1));
        // Equidistant centroids: the lowest id wins
        assert_eq!(query.closest_node(v(5.0, 5.0), group, true)?, NodeId::new(0));
        Ok(())
    }

    #[test]
    fn test_closest_node_without_polygon_check_matches_brute_force() -> Result<()> {
        let zone = create_grid_zone(4)?;
        let query = ZoneQuery::new(&zone);
        let group = &zone.groups()[0];

        for i in 0..50 {
            let f = i as f32;
            let p = v((f * 0.731).fract() * 5.0 - 0.5, (f * 0.377).fract() * 5.0 - 0.5);

            let expected = group
                .nodes()
                .iter()
                .map(|node| (node.id(), distance_squared(&node.centroid(), &p)))
                .fold(None, |best: Option<(NodeId, f32)>, (id, d)| match best {
                    Some((_, best_d)) if best_d <= d => best,
                    _ => Some((id, d)),
                })
                .map(|(id, _)| id);

            assert_eq!(Some(query.closest_node(p, group.id(), false)?), expected);
        }
        Ok(())
    }

    #[test]
    fn test_closest_point_projects_onto_mesh() -> Result<()> {
        let zone = create_unit_square_zone()?;
        let query = ZoneQuery::new(&zone);

        let (node, point, inside) = query.closest_point(v(0.8, 0.2), GroupId::new(0))?;
        assert_eq!(node, NodeId::new(0));
        assert_eq!(point, v(0.8, 0.2));
        assert!(inside);

        let (node, point, inside) = query.closest_point(v(2.0, 0.5), GroupId::new(0))?;
        assert_eq!(node, NodeId::new(0));
        assert_near(point, v(1.0, 0.5), 1e-5);
        assert!(!inside);
        Ok(())
    }

    #[test]
    fn test_height_tolerance_limits_containment() -> Result<()> {
        let zone = create_unit_square_zone()?;
        let config = QueryConfig::new()
            .with_height_tolerance(0.5)
            .with_max_group_distance(1.0);
        let query = ZoneQuery::with_config(&zone, config)?;
        let group = zone.group(GroupId::new(0))?;

        let floating = Vec3::new(0.8, 3.0, 0.2);
        assert!(!query.node_contains(&group.nodes()[0], &floating));
        assert!(query.node_contains(&group.nodes()[0], &Vec3::new(0.8, 0.4, 0.2)));

        // Too far above every centroid to belong to any group
        assert!(matches!(query.group_of(floating, true), Err(Error::NotFound(_))));
        // Node lookup still falls back to the nearest centroid
        assert_eq!(query.closest_node(floating, group.id(), true)?, NodeId::new(0));
        Ok(())
    }

    #[test]
    fn test_group_of() -> Result<()> {
        let zone = create_two_islands_zone()?;
        let query = ZoneQuery::new(&zone);

        assert_eq!(query.group_of(v(0.5, 0.3), true)?, GroupId::new(0));
        assert_eq!(query.group_of(v(3.5, 0.3), true)?, GroupId::new(1));
        assert_eq!(query.group_of(v(3.5, 0.3), false)?, GroupId::new(1));

        // Between the islands, nearer the second
        assert_eq!(query.group_of(v(2.9, 0.5), true)?, GroupId::new(1));

        let strict = ZoneQuery::with_config(&zone, QueryConfig::new().with_max_group_distance(0.1))?;
        assert!(matches!(strict.group_of(v(2.9, 0.5), true), Err(Error::NotFound(_))));
        assert_eq!(strict.group_of(v(0.5, 0.3), true)?, GroupId::new(0));
        Ok(())
    }

    #[test]
    fn test_invalid_query_config_is_rejected() -> Result<()> {
        let zone = create_unit_square_zone()?;

        // A negative ceiling must not turn into a positive one when squared
        assert!(matches!(
            ZoneQuery::with_config(&zone, QueryConfig::new().with_max_group_distance(-1.0)),
            Err(Error::InvalidParam(_))
        ));
        assert!(matches!(
            ZoneQuery::with_config(&zone, QueryConfig::new().with_containment_epsilon(f32::NAN)),
            Err(Error::InvalidParam(_))
        ));
        assert!(matches!(
            ZoneQuery::with_config(&zone, QueryConfig::new().with_height_tolerance(-0.1)),
            Err(Error::InvalidParam(_))
        ));

        // Zero is a valid ceiling: only containing nodes resolve a group
        let strict = ZoneQuery::with_config(&zone, QueryConfig::new().with_max_group_distance(0.0))?;
        assert_eq!(strict.group_of(v(0.5, 0.3), true)?, GroupId::new(0));
        assert!(matches!(strict.group_of(v(1.5, 0.5), true), Err(Error::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_unknown_group_is_not_found() -> Result<()> {
        let zone = create_unit_square_zone()?;
        let mut query = ZoneQuery::new(&zone);

        assert!(matches!(
            query.closest_node(v(0.5, 0.5), GroupId::new(3), true),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(query.random_node(GroupId::new(3), None), Err(Error::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_random_node_covers_group() -> Result<()> {
        let zone = create_grid_zone(2)?;
        let mut query = ZoneQuery::new(&zone);
        query.set_random_seed(42);

        let mut seen = HashSet::new();
        for _ in 0..400 {
            let node = query.random_node(GroupId::new(0), None)?;
            assert!(node.index() < 8);
            seen.insert(node);
        }
        assert_eq!(seen.len(), 8);
        Ok(())
    }

    #[test]
    fn test_random_node_near_position() -> Result<()> {
        let zone = create_grid_zone(4)?;
        let mut query = ZoneQuery::new(&zone);
        query.set_random_seed(7);

        let near = Near::new(v(0.5, 0.5), 0.6);
        for _ in 0..100 {
            let node = query.random_node(GroupId::new(0), Some(near))?;
            assert!(node == NodeId::new(0) || node == NodeId::new(1));
        }

        // Nothing in range: the whole group is sampled
        let far = Near::new(v(50.0, 50.0), 1.0);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.insert(query.random_node(GroupId::new(0), Some(far))?);
        }
        assert!(seen.len() > 2);
        Ok(())
    }

    #[test]
    fn test_random_node_rejects_invalid_range() -> Result<()> {
        let zone = create_unit_square_zone()?;
        let mut query = ZoneQuery::new(&zone);

        for range in [-1.0, f32::NAN] {
            assert!(matches!(
                query.random_node(GroupId::new(0), Some(Near::new(v(0.5, 0.5), range))),
                Err(Error::InvalidParam(_))
            ));
        }
        Ok(())
    }

    #[test]
    fn test_random_sample_kinds() -> Result<()> {
        let zone = create_grid_zone(3)?;
        let group = zone.group(GroupId::new(0))?;
        let mut query = ZoneQuery::new(&zone);
        query.set_random_seed(1234);

        for _ in 0..100 {
            match query.random_sample(group.id(), None, SampleKind::Surface)? {
                RandomSample::Point(p) => {
                    let on_mesh = group
                        .nodes()
                        .iter()
                        .any(|node| point_in_convex_polygon_2d(&p, &zone.triangle(node), 1e-4));
                    assert!(on_mesh, "{p} is off the mesh");
                }
                other => panic!("expected a point, got {other:?}"),
            }

            match query.random_sample(group.id(), None, SampleKind::Centroid)? {
                RandomSample::Point(p) => {
                    assert!(group.nodes().iter().any(|node| node.centroid() == p));
                }
                other => panic!("expected a point, got {other:?}"),
            }

            assert!(matches!(
                query.random_sample(group.id(), None, SampleKind::Node)?,
                RandomSample::Node(id) if group.node(id).is_some()
            ));
        }
        Ok(())
    }

    #[test]
    fn test_seeded_sampling_is_deterministic() -> Result<()> {
        let zone = create_grid_zone(3)?;

        let draw = |seed: u64| -> Result<Vec<RandomSample>> {
            let mut query = ZoneQuery::new(&zone);
            query.set_random_seed(seed);
            (0..16)
                .map(|_| query.random_sample(GroupId::new(0), None, SampleKind::Surface))
                .collect()
        };

        assert_eq!(draw(99)?, draw(99)?);
        Ok(())
    }
}
