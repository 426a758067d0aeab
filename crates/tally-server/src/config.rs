//! Server configuration types.

use std::net::SocketAddr;

/// Default HTTP bind address.
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8080";

/// Default request path routed to the dispatch engine.
pub const DEFAULT_METHOD_PATH: &str = "/method";

/// Server configuration.
///
/// Use [`ServerConfig::builder()`] to construct instances.
///
/// # Example
///
/// ```
/// use tally_server::ServerConfig;
///
/// let config = ServerConfig::builder()
///     .http_addr("0.0.0.0:8080")
///     .build();
///
/// assert_eq!(config.http_addr(), "0.0.0.0:8080");
/// assert_eq!(config.method_path(), "/method");
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP bind address (e.g. "127.0.0.1:8080").
    http_addr: String,

    /// Request path routed to the dispatch engine.
    method_path: String,
}

impl ServerConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the HTTP bind address.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// Parses and returns the HTTP address as a `SocketAddr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.http_addr.parse()
    }

    /// Returns the path routed to the dispatch engine.
    #[must_use]
    pub fn method_path(&self) -> &str {
        &self.method_path
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    http_addr: Option<String>,
    method_path: Option<String>,
}

impl ServerConfigBuilder {
    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.http_addr = Some(addr.into());
        self
    }

    /// Sets the request path routed to the engine.
    #[must_use]
    pub fn method_path(mut self, path: impl Into<String>) -> Self {
        self.method_path = Some(path.into());
        self
    }

    /// Builds the configuration, applying defaults for unset fields.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            http_addr: self.http_addr.unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string()),
            method_path: self
                .method_path
                .unwrap_or_else(|| DEFAULT_METHOD_PATH.to_string()),
        }
    }
}
