//! The table server as a library: every module the binary wires together,
//! exposed so integration tests can build a router without spawning a
//! process.

pub mod broadcast;
pub mod config;
pub mod error;
pub mod event_log;
pub mod net;
pub mod poker;
pub mod session;
pub mod store;
pub mod table;
pub mod table_manager;
pub mod timeout;
pub mod token;

pub use config::Config;
pub use net::{build_router, AppCtx};
pub use store::{MemStore, Store};
pub use table_manager::TableManager;
