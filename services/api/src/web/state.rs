//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use skinlog_core::ports::{ProductClassificationService, StorageService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
///
/// The shelf and history are read-modify-write without writer coordination; the
/// service is meant for a single interactive user.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StorageService>,
    pub classifier: Arc<dyn ProductClassificationService>,
    pub config: Arc<Config>,
}
