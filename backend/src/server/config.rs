//! HTTP server configuration object.

use std::net::SocketAddr;

use backend::inbound::http::state::HttpState;

/// Everything `create_server` needs besides the health state.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
    pub(crate) swagger_ui: bool,
}

impl ServerConfig {
    /// Serve `http_state` on `bind_addr`; Swagger UI follows the build profile.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, http_state: HttpState) -> Self {
        Self {
            bind_addr,
            http_state,
            swagger_ui: cfg!(debug_assertions),
        }
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
