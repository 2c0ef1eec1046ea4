use std::sync::Arc;

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod infrastructure;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod store;
pub mod utils;

use cache::ResponseCache;
use config::Config;
use database::{ItemRepository, UserRepository};
use infrastructure::QuoteClient;
use store::CounterStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub items: Arc<dyn ItemRepository>,
    pub users: Arc<dyn UserRepository>,
    pub store: Arc<dyn CounterStore>,
    pub cache: ResponseCache,
    pub quotes: QuoteClient,
}
