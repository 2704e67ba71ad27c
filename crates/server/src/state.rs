use brush_core::{BrushClientOption, Config, SiteConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    client_option: BrushClientOption,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let client_option = BrushClientOption::from(&config.client);
        Self {
            config,
            client_option,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn site(&self, name: &str) -> Option<&SiteConfig> {
        self.config.site(name)
    }

    /// Client limits decisions are computed with.
    pub fn client_option(&self) -> &BrushClientOption {
        &self.client_option
    }
}
