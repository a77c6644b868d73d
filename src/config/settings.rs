use std::net::SocketAddr;

use super::LongPollConfig;
use crate::logging::LoggingConfig;

/// Default address of the HTTP server.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Everything `longpoll-server` needs to start.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub listen_addr: SocketAddr,
    pub logging: LoggingConfig,
    pub longpoll: LongPollConfig,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            logging: LoggingConfig::default(),
            longpoll: LongPollConfig::default(),
        }
    }
}
