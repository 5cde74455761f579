//! Service coordination and the HTTP API

pub mod app;
pub mod routes;

pub use app::AppState;
pub use routes::create_router;
