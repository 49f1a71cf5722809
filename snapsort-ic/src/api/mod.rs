//! HTTP API handlers for snapsort-ic

pub mod classify;
pub mod health;
pub mod root;

pub use classify::classify_routes;
pub use health::health_routes;
pub use root::root_routes;
