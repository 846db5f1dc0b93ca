//! Configuration for zone building and zone queries

use polypath_common::{Error, Result};

/// Parameters controlling how a triangle soup is turned into a zone
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneConfig {
    /// Input vertices closer than this distance collapse into one vertex
    pub weld_tolerance: f32,
    /// Triangles with a smaller area are dropped as degenerate
    pub min_triangle_area: f32,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            weld_tolerance: 1.0e-4,
            min_triangle_area: 1.0e-9,
        }
    }
}

impl ZoneConfig {
    /// Creates a new ZoneConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weld_tolerance(mut self, weld_tolerance: f32) -> Self {
        self.weld_tolerance = weld_tolerance;
        self
    }

    pub fn with_min_triangle_area(mut self, min_triangle_area: f32) -> Self {
        self.min_triangle_area = min_triangle_area;
        self
    }

    /// Rejects negative or non-finite parameters
    pub fn validate(&self) -> Result<()> {
        if !self.weld_tolerance.is_finite() || self.weld_tolerance < 0.0 {
            return Err(Error::InvalidMesh(format!(
                "weld tolerance must be a finite non-negative distance, got {}",
                self.weld_tolerance
            )));
        }
        if !self.min_triangle_area.is_finite() || self.min_triangle_area < 0.0 {
            return Err(Error::InvalidMesh(format!(
                "minimum triangle area must be finite and non-negative, got {}",
                self.min_triangle_area
            )));
        }
        Ok(())
    }
}

/// Parameters shared by the spatial, path and step queries
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    /// Maximum number of nodes a single corridor search may expand
    pub max_search_nodes: usize,
    /// Farthest a position may be from a group's nearest centroid and still
    /// be assigned to it when no node contains the position
    pub max_group_distance: f32,
    /// Vertical band around a node's corners within which a position counts
    /// as standing on it; `None` tests the ground-plane projection only
    pub height_tolerance: Option<f32>,
    /// Distance from a node's boundary still treated as inside the node
    pub containment_epsilon: f32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_search_nodes: 4096,
            max_group_distance: f32::INFINITY,
            height_tolerance: None,
            containment_epsilon: 1.0e-4,
        }
    }
}

impl QueryConfig {
    /// Creates a new QueryConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_search_nodes(mut self, max_search_nodes: usize) -> Self {
        self.max_search_nodes = max_search_nodes;
        self
    }

    pub fn with_max_group_distance(mut self, max_group_distance: f32) -> Self {
        self.max_group_distance = max_group_distance;
        self
    }

    pub fn with_height_tolerance(mut self, height_tolerance: f32) -> Self {
        self.height_tolerance = Some(height_tolerance);
        self
    }

    pub fn with_containment_epsilon(mut self, containment_epsilon: f32) -> Self {
        self.containment_epsilon = containment_epsilon;
        self
    }

    /// Rejects negative or NaN distances. The group distance may be infinite.
    pub fn validate(&self) -> Result<()> {
        if self.max_group_distance.is_nan() || self.max_group_distance < 0.0 {
            return Err(Error::InvalidParam(format!(
                "max group distance must be non-negative, got {}",
                self.max_group_distance
            )));
        }
        if let Some(tolerance) = self.height_tolerance {
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(Error::InvalidParam(format!(
                    "height tolerance must be a finite non-negative distance, got {tolerance}"
                )));
            }
        }
        if !self.containment_epsilon.is_finite() || self.containment_epsilon < 0.0 {
            return Err(Error::InvalidParam(format!(
                "containment epsilon must be a finite non-negative distance, got {}",
                self.containment_epsilon
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_config_validation() {
        assert!(ZoneConfig::default().validate().is_ok());
        assert!(ZoneConfig::new().with_weld_tolerance(0.0).validate().is_ok());
        assert!(matches!(
            ZoneConfig::new().with_weld_tolerance(-1.0).validate(),
            Err(Error::InvalidMesh(_))
        ));
        assert!(ZoneConfig::new().with_weld_tolerance(f32::NAN).validate().is_err());
        assert!(ZoneConfig::new().with_min_triangle_area(f32::INFINITY).validate().is_err());
    }

    #[test]
    fn test_query_config_builders() {
        let config = QueryConfig::new()
            .with_max_search_nodes(8)
            .with_max_group_distance(3.0)
            .with_height_tolerance(0.5);
        assert_eq!(config.max_search_nodes, 8);
        assert_eq!(config.max_group_distance, 3.0);
        assert_eq!(config.height_tolerance, Some(0.5));
        assert_eq!(config.containment_epsilon, QueryConfig::default().containment_epsilon);
    }

    #[test]
    fn test_query_config_validation() {
        assert!(QueryConfig::default().validate().is_ok());
        assert!(QueryConfig::new()
            .with_max_group_distance(0.0)
            .with_height_tolerance(0.0)
            .with_containment_epsilon(0.0)
            .validate()
            .is_ok());

        assert!(matches!(
            QueryConfig::new().with_max_group_distance(-1.0).validate(),
            Err(Error::InvalidParam(_))
        ));
        assert!(QueryConfig::new().with_max_group_distance(f32::NAN).validate().is_err());
        assert!(QueryConfig::new().with_height_tolerance(-0.5).validate().is_err());
        assert!(QueryConfig::new().with_height_tolerance(f32::NAN).validate().is_err());
        assert!(QueryConfig::new().with_containment_epsilon(-1.0e-4).validate().is_err());
        assert!(QueryConfig::new().with_containment_epsilon(f32::NAN).validate().is_err());
        assert!(QueryConfig::new().with_containment_epsilon(f32::INFINITY).validate().is_err());
    }
}
