/// Configuration for the Postgres media catalog.
#[derive(Debug, Clone)]
pub struct PostgresCatalogConfig {
    /// Postgres connection URL.
    pub url: String,
    /// Table name prefix (e.g. "mediadrop_").
    pub prefix: String,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
}

impl PostgresCatalogConfig {
    /// Create a new configuration with the given URL and defaults.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prefix: "mediadrop_".to_owned(),
            max_connections: 10,
        }
    }

    /// Set the table prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}
