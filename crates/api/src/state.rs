use std::sync::Arc;

use crate::checkins::CheckinBoard;
use crate::config::ServerConfig;
use crate::submit::endpoints::EndpointRegistry;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: aura_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Submit endpoints keyed by route suffix ("" = generic).
    pub endpoints: Arc<EndpointRegistry>,
    /// Runner/tag last-seen observability maps.
    pub checkins: Arc<CheckinBoard>,
}
