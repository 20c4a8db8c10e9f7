//! Octree spatial partitioning structure
//!
//! Divides 3D space into hierarchical regions for fast proximity queries.
//! Each node subdivides into 8 octants when occupancy exceeds a threshold.
//! Collision spaces build one over their static partition, since static
//! members rarely move and the tree can be reused across many steps.

use crate::config::CollisionConfig;
use crate::foundation::math::Vec3d;
use crate::spatial::Aabb;

/// Configuration for octree behavior
#[derive(Debug, Clone)]
pub struct OctreeConfig {
    /// Maximum entries per node before subdivision
    pub max_entries_per_node: usize,
    
    /// Maximum subdivision depth
    pub max_depth: u32,
    
    /// Minimum node size (prevents excessive subdivision)
    pub min_node_size: f64,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_entries_per_node: 8,
            max_depth: 8,
            min_node_size: 1.0,
        }
    }
}

impl From<&CollisionConfig> for OctreeConfig {
    fn from(config: &CollisionConfig) -> Self {
        Self {
            max_entries_per_node: config.max_geoms_per_node.max(1),
            max_depth: config.max_depth,
            min_node_size: config.min_node_size,
        }
    }
}

/// Entry stored in the octree with position and bounding radius
#[derive(Debug, Clone, Copy)]
pub struct OctreeEntry<T> {
    /// Caller's identifier for the entry
    pub id: T,
    /// Center of the entry's bounding sphere
    pub position: Vec3d,
    /// Bounding sphere radius
    pub radius: f64,
}

/// Single node in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctreeNode<T> {
    /// World-space bounds of this node
    pub bounds: Aabb,
    
    /// Entries contained in this node
    pub entries: Vec<OctreeEntry<T>>,
    
    /// Child nodes (8 octants), None if this is a leaf
    pub children: Option<Box<[OctreeNode<T>; 8]>>,
    
    /// Depth in the tree (0 = root)
    pub depth: u32,
}

impl<T: Copy + PartialEq> OctreeNode<T> {
    /// Create a new leaf node
    pub fn new(bounds: Aabb, depth: u32) -> Self {
        Self {
            bounds,
            entries: Vec::new(),
            children: None,
            depth,
        }
    }
    
    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
    
    /// Octant index (0-7) for a position, bit 0 = +X, bit 1 = +Y, bit 2 = +Z
    fn octant_index(center: &Vec3d, position: &Vec3d) -> usize {
        let x_bit = usize::from(position.x >= center.x);
        let y_bit = usize::from(position.y >= center.y);
        let z_bit = usize::from(position.z >= center.z);
        (z_bit << 2) | (y_bit << 1) | x_bit
    }
    
    /// Subdivide this node into 8 children
    fn subdivide(&mut self) {
        if self.children.is_some() {
            return;
        }
        
        let center = self.bounds.center();
        let quarter_extents = self.bounds.extents() * 0.5;
        let depth = self.depth + 1;
        
        let children: [OctreeNode<T>; 8] = std::array::from_fn(|octant| {
            let sign = |bit: usize| if octant & bit != 0 { 1.0 } else { -1.0 };
            let child_center = Vec3d::new(
                center.x + quarter_extents.x * sign(1),
                center.y + quarter_extents.y * sign(2),
                center.z + quarter_extents.z * sign(4),
            );
            OctreeNode::new(Aabb::from_center_extents(child_center, quarter_extents), depth)
        });
        let mut children = Box::new(children);
        
        // Redistribute existing entries to children
        for entry in std::mem::take(&mut self.entries) {
            children[Self::octant_index(&center, &entry.position)].entries.push(entry);
        }
        self.children = Some(children);
    }
    
    /// Insert an entry into this node
    pub fn insert(&mut self, entry: OctreeEntry<T>, config: &OctreeConfig) -> bool {
        if !self.bounds.contains_point(&entry.position) {
            return false;
        }
        
        if self.is_leaf() {
            let should_subdivide = self.entries.len() >= config.max_entries_per_node
                && self.depth < config.max_depth
                && self.bounds.extents().x > config.min_node_size;
            
            if !should_subdivide {
                self.entries.push(entry);
                return true;
            }
            self.subdivide();
        }
        
        let center = self.bounds.center();
        match self.children {
            Some(ref mut children) => {
                children[Self::octant_index(&center, &entry.position)].insert(entry, config)
            }
            None => false,
        }
    }
    
    /// Remove an entry from this node
    pub fn remove(&mut self, id: T) -> bool {
        if let Some(index) = self.entries.iter().position(|e| e.id == id) {
            self.entries.swap_remove(index);
            return true;
        }
        
        if let Some(ref mut children) = self.children {
            return children.iter_mut().any(|child| child.remove(id));
        }
        
        false
    }
    
    /// Collect entries whose bounding sphere overlaps the query sphere
    ///
    /// `max_entry_radius` widens the node test, since an entry is stored by
    /// its center and may reach past its node's bounds.
    pub fn query_sphere(
        &self,
        center: &Vec3d,
        radius: f64,
        max_entry_radius: f64,
        results: &mut Vec<OctreeEntry<T>>,
    ) {
        let reach = radius + max_entry_radius;
        if self.bounds.distance_squared_to(center) > reach * reach {
            return;
        }
        
        for entry in &self.entries {
            let distance_sq = (entry.position - center).magnitude_squared();
            let combined_radius = radius + entry.radius;
            if distance_sq <= combined_radius * combined_radius {
                results.push(*entry);
            }
        }
        
        if let Some(ref children) = self.children {
            for child in children.iter() {
                child.query_sphere(center, radius, max_entry_radius, results);
            }
        }
    }
    
    /// Count total entries in this node and all children
    pub fn count_entries(&self) -> usize {
        self.entries.len()
            + self
                .children
                .as_ref()
                .map_or(0, |children| children.iter().map(Self::count_entries).sum())
    }
}

/// Octree spatial partitioning structure
#[derive(Debug, Clone)]
pub struct Octree<T> {
    /// Root node containing the indexed region
    pub root: OctreeNode<T>,
    
    /// Configuration
    config: OctreeConfig,
    
    /// Largest entry radius inserted so far
    max_entry_radius: f64,
}

impl<T: Copy + PartialEq> Octree<T> {
    /// Create a new octree with given bounds
    pub fn new(bounds: Aabb, config: OctreeConfig) -> Self {
        Self {
            root: OctreeNode::new(bounds, 0),
            config,
            max_entry_radius: 0.0,
        }
    }
    
    /// Insert an entry; returns false if the position lies outside the bounds
    pub fn insert(&mut self, id: T, position: Vec3d, radius: f64) -> bool {
        self.max_entry_radius = self.max_entry_radius.max(radius);
        self.root.insert(OctreeEntry { id, position, radius }, &self.config)
    }
    
    /// Remove an entry from the octree
    pub fn remove(&mut self, id: T) -> bool {
        self.root.remove(id)
    }
    
    /// Query all entries whose bounding sphere overlaps the given sphere
    pub fn query_sphere(&self, center: &Vec3d, radius: f64) -> Vec<OctreeEntry<T>> {
        let mut results = Vec::new();
        self.root.query_sphere(center, radius, self.max_entry_radius, &mut results);
        results
    }
    
    /// Get total entry count
    pub fn len(&self) -> usize {
        self.root.count_entries()
    }
    
    /// True if nothing has been inserted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    fn bounds() -> Aabb {
        Aabb::new(Vec3d::repeat(-100.0), Vec3d::repeat(100.0))
    }
    
    #[test]
    fn test_octree_basic_insertion() {
        let mut octree = Octree::new(bounds(), OctreeConfig::default());
        assert!(octree.insert(1u32, Vec3d::zeros(), 1.0));
        assert!(!octree.insert(2u32, Vec3d::new(500.0, 0.0, 0.0), 1.0));
        assert_eq!(octree.len(), 1);
    }
    
    #[test]
    fn test_octree_subdivision() {
        let config = OctreeConfig {
            max_entries_per_node: 4,
            max_depth: 3,
            min_node_size: 1.0,
        };
        let mut octree = Octree::new(bounds(), config);
        
        for id in 0..10u32 {
            octree.insert(id, Vec3d::new(f64::from(id), 0.0, 0.0), 1.0);
        }
        
        assert_eq!(octree.len(), 10);
        assert!(octree.root.children.is_some());
    }
    
    #[test]
    fn test_octree_sphere_query() {
        let mut octree = Octree::new(bounds(), OctreeConfig::default());
        octree.insert(1u32, Vec3d::zeros(), 1.0);
        octree.insert(2u32, Vec3d::new(5.0, 0.0, 0.0), 1.0);
        octree.insert(3u32, Vec3d::new(50.0, 0.0, 0.0), 1.0);
        
        let mut found: Vec<u32> = octree
            .query_sphere(&Vec3d::zeros(), 10.0)
            .into_iter()
            .map(|e| e.id)
            .collect();
        found.sort_unstable();
        assert_eq!(found, vec![1, 2]);
    }
    
    #[test]
    fn test_large_entry_found_from_neighbouring_node() {
        let config = OctreeConfig {
            max_entries_per_node: 1,
            max_depth: 4,
            min_node_size: 1.0,
        };
        let mut octree = Octree::new(bounds(), config);
        octree.insert(1u32, Vec3d::new(-60.0, -60.0, -60.0), 1.0);
        octree.insert(2u32, Vec3d::new(5.0, 5.0, 5.0), 20.0);
        
        let found = octree.query_sphere(&Vec3d::new(-3.0, -3.0, -3.0), 1.0);
        assert!(found.iter().any(|e| e.id == 2));
    }
    
    #[test]
    fn test_octree_remove() {
        let mut octree = Octree::new(bounds(), OctreeConfig::default());
        octree.insert(7u32, Vec3d::new(3.0, 3.0, 3.0), 1.0);
        assert!(octree.remove(7));
        assert!(!octree.remove(7));
        assert!(octree.is_empty());
    }
}
