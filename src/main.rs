//! 产品管理服务入口

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, middleware};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};

use product_api::app::product::{self, handler::AppState, service::ProductService};
use product_api::core::middleware::request_logging_middleware;
use product_api::infrastructure::{
    config::AppConfig, logger::Logger, store::DocumentStore, uploads::UploadRelocator,
};

#[tokio::main]
async fn main() {
    Logger::init(Level::INFO);

    let config = AppConfig::from_env();
    info!("启动产品管理服务...");
    info!("上传目录: {}", config.upload_dir().display());

    let store = Arc::new(DocumentStore::new(config.product_schema()));
    let relocator = UploadRelocator::new(config.upload_dir());
    let state = AppState {
        product_service: ProductService::new(store, relocator),
    };

    let app = product::router(state)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.max_body_bytes));

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .expect("无法绑定监听地址");

    info!("📖 API 端点:");
    info!("   GET    /products      - 产品列表 (limit/skip 分页)");
    info!("   POST   /products      - 创建产品 (multipart, 可选 image)");
    info!("   PUT    /products/:id  - 更新产品 (multipart, 可选 image)");
    info!("   GET    /health        - 健康检查");
    info!("🚀 服务运行在 http://{}", config.bind_address);

    axum::serve(listener, app)
        .await
        .expect("服务器启动失败");
}
