pub mod catalog;
pub mod handlers;
pub mod models;
pub mod prom;
pub mod reduce;
pub mod resolve;

use std::sync::Arc;

use catalog::Catalog;
use prom::PromClient;

#[derive(Clone)]
pub struct AppState {
    pub prom: Arc<PromClient>,
    pub catalog: Arc<Catalog>,
}
