//! REST API over the assessment store

pub mod extract;
pub mod handler;
pub mod server;

use crate::journal::ActivityJournal;
use crate::store::Store;
use crate::types::config::HviConfig;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

pub use server::HttpServer;

/// State shared by every request handler.
pub struct AppState {
    pub store: RwLock<Store>,
    pub journal: Mutex<ActivityJournal>,
    pub config: HviConfig,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn shared(store: Store, journal: ActivityJournal, config: HviConfig) -> SharedState {
        Arc::new(Self {
            store: RwLock::new(store),
            journal: Mutex::new(journal),
            config,
        })
    }
}
