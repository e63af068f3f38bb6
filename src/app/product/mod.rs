//! 产品模块

pub mod handler;
pub mod model;
pub mod service;

use axum::{
    routing::{get, put},
    Router,
};

use handler::AppState;

/// 产品模块路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/products", get(handler::index).post(handler::store))
        .route("/products/:id", put(handler::update))
        .route("/health", get(handler::health_check))
        .with_state(state)
}
