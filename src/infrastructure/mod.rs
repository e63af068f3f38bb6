pub mod config;
pub mod logger;
pub mod schema;
pub mod store;
pub mod uploads;
