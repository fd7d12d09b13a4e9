use std::sync::Arc;

use crate::config::ServerConfig;
use crate::health::HealthChecker;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Queue proxy connectivity checks backing `/__health` and `/__gtg`.
    pub health: Arc<HealthChecker>,
}
