pub mod config;
pub mod http;
pub mod model;
pub mod seed;
pub mod sqlite;
pub mod store;
