//! Configuration system
//!
//! Engine settings are plain serde structs. Any of them can be read from or
//! written to TOML or RON, chosen by file extension.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;
        
        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }
    
    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };
        
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
    
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
    
    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Tuning for the static-partition octree each frame's collision space builds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Maximum geoms per octree node before subdivision
    pub max_geoms_per_node: usize,
    /// Maximum subdivision depth
    pub max_depth: u32,
    /// Minimum node half-size (prevents excessive subdivision)
    pub min_node_size: f64,
    /// Padding added around the static geoms when the octree bounds are fitted
    pub static_bounds_margin: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            max_geoms_per_node: 8,
            max_depth: 8,
            min_node_size: 1.0,
            static_bounds_margin: 1.0,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Broad-phase settings shared by every frame
    pub collision: CollisionConfig,
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_ron_roundtrip() {
        let path = std::env::temp_dir().join(format!("body_engine_config_{}.ron", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let mut config = EngineConfig::default();
        config.collision.max_depth = 4;
        config.collision.min_node_size = 25.0;
        config.save_to_file(&path).unwrap();

        let loaded = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: EngineConfig = toml::from_str("[collision]\nmax_depth = 3\n").unwrap();
        assert_eq!(parsed.collision.max_depth, 3);
        assert_eq!(parsed.collision.max_geoms_per_node, 8);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = EngineConfig::default().save_to_file("config.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
