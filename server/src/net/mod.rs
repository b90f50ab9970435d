//! The HTTP/WS transport layer: everything here is a thin adapter between
//! axum and the table manager. No game rules live here.

pub mod http;
pub mod router;
pub mod ws;

use std::sync::Arc;

use crate::config::Config;
use crate::store::Store;
use crate::table_manager::TableManager;

/// Shared application state handed to every axum handler.
pub struct AppCtx {
    pub table_manager: Arc<TableManager>,
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
}

pub use router::build_router;
