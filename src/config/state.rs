// Application state module
// Shared, read-only state handed to every connection

use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::Config;
use crate::routing::RouteTable;

/// Application state
///
/// Built once at startup; handlers only read from it, so requests never
/// observe each other.
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
    /// Connections currently being served
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            routes: RouteTable::projects_api(),
            active_connections: AtomicUsize::new(0),
        }
    }

    pub fn connection_count(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }
}
