use popmap_shared::models::MapConfig;
use std::io::ErrorKind;
use std::path::Path;

pub const MAP_CONFIG_FILE: &str = "map.json";

/// Immutable map wiring shared by every request.
pub struct Assets {
    pub config: MapConfig,
}

impl Assets {
    /// Read `map.json` from the assets directory. A missing file means the
    /// built-in configuration; a present but broken one is an error.
    pub fn load(assets_dir: &Path) -> Result<Self, String> {
        let config_path = assets_dir.join(MAP_CONFIG_FILE);

        let config = match std::fs::read_to_string(&config_path) {
            Ok(data) => serde_json::from_str::<MapConfig>(&data)
                .map_err(|e| format!("Failed to parse {}: {}", config_path.display(), e))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %config_path.display(), "No map config override, using built-in");
                MapConfig::default()
            }
            Err(e) => return Err(format!("Failed to read {}: {}", config_path.display(), e)),
        };

        config
            .validate()
            .map_err(|e| format!("Invalid {}: {}", config_path.display(), e))?;

        tracing::info!(
            basemap = %config.basemap.current,
            breaks = config.layer.renderer.class_breaks().len(),
            presets = config.navigation.len(),
            "Loaded map config"
        );

        Ok(Assets { config })
    }
}

impl Default for Assets {
    fn default() -> Self {
        Assets {
            config: MapConfig::default(),
        }
    }
}
