//! Redis store configuration.

use std::time::Duration;

/// Configuration for [`RedisStore`](super::RedisStore).
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Connection URL (`redis://host:port/db`).
    url: String,
    /// Maximum time to wait for the initial connection.
    connect_timeout: Duration,
    /// How often the readiness probe pings while the store is down.
    probe_interval: Duration,
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_probe_interval() -> Duration {
    Duration::from_secs(2)
}

impl RedisStoreConfig {
    /// Creates a new builder for RedisStoreConfig.
    pub fn builder() -> RedisStoreConfigBuilder {
        RedisStoreConfigBuilder::default()
    }

    /// Returns the connection URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the readiness probe interval.
    pub fn probe_interval(&self) -> Duration {
        self.probe_interval
    }

    /// Returns the URL with any password replaced, for logging.
    pub fn redacted_url(&self) -> String {
        match (self.url.find("://"), self.url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                format!("{}://***@{}", &self.url[..scheme_end], &self.url[at + 1..])
            }
            _ => self.url.clone(),
        }
    }
}

/// Builder for RedisStoreConfig.
#[derive(Debug, Default)]
pub struct RedisStoreConfigBuilder {
    url: Option<String>,
    connect_timeout: Option<Duration>,
    probe_interval: Option<Duration>,
}

impl RedisStoreConfigBuilder {
    /// Sets the connection URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the readiness probe interval.
    pub fn probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = Some(interval);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is missing or does not use a redis scheme.
    pub fn build(self) -> Result<RedisStoreConfig, &'static str> {
        let url = self.url.ok_or("url is required")?;

        if !(url.starts_with("redis://")
            || url.starts_with("rediss://")
            || url.starts_with("redis+unix://")
            || url.starts_with("unix://"))
        {
            return Err("url must use the redis://, rediss:// or unix:// scheme");
        }

        Ok(RedisStoreConfig {
            url,
            connect_timeout: self.connect_timeout.unwrap_or_else(default_connect_timeout),
            probe_interval: self.probe_interval.unwrap_or_else(default_probe_interval),
        })
    }
}
