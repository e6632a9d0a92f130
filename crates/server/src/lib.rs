//! Server crate for the reel-recs recommendation API.
//!
//! A thin HTTP layer over the recommender core. The active model lives in a
//! [`ModelHandle`] that is injected into the router state, so handlers never
//! reach for global state and a reload swaps the whole model at once.

pub mod config;
pub mod error;
pub mod model;
pub mod handlers;
pub mod routes;
pub mod startup;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use model::ModelHandle;
pub use routes::{AppState, create_router};
pub use startup::{bootstrap, stop_training, train_and_save};
