//! Server configuration.
//!
//! Fixed once the server is built. Hosts that keep their settings in a file
//! can deserialize it; nothing here reads the environment.

use std::net::SocketAddr;

use serde::Deserialize;

use crate::error::ServerError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to listen on when no listener is handed to the builder.
    /// `None` picks a free loopback port.
    pub listen_addr: Option<SocketAddr>,
    /// Also serve the status pages on `/`. `/status` is always served.
    pub bind_root_path: bool,
}

impl ServerConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ServerError> {
        Ok(toml::from_str(source)?)
    }
}
