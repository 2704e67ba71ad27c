use std::collections::HashSet;

use super::{types::Config, ConfigError};
use crate::brush::compile_excludes;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Client limits are sane
/// - Site names are present and unique, size bounds ordered, excludes compile
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let client = &config.client;
    if client.min_disk_space < 0 {
        return Err(ConfigError::ValidationError(
            "client.min_disk_space cannot be negative".to_string(),
        ));
    }
    if client.slow_upload_speed_tier <= 0 {
        return Err(ConfigError::ValidationError(
            "client.slow_upload_speed_tier must be positive".to_string(),
        ));
    }
    if client.max_downloading_torrents < 0 {
        return Err(ConfigError::ValidationError(
            "client.max_downloading_torrents cannot be negative".to_string(),
        ));
    }
    if client.min_ratio < 0.0 {
        return Err(ConfigError::ValidationError(
            "client.min_ratio cannot be negative".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for site in &config.sites {
        if site.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "site name cannot be empty".to_string(),
            ));
        }
        if !names.insert(site.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate site name '{}'",
                site.name
            )));
        }
        if let (Some(min), Some(max)) = (site.torrent_min_size, site.torrent_max_size) {
            if min > max {
                return Err(ConfigError::ValidationError(format!(
                    "site '{}': torrent_min_size exceeds torrent_max_size",
                    site.name
                )));
            }
        }
        compile_excludes(&site.excludes)?;
    }

    Ok(())
}
