pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod query;
pub mod render;
pub mod routes;
pub mod server;
pub mod store;
