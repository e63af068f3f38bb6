pub mod error;
pub mod middleware;
