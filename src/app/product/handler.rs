//! 产品处理器

use axum::{
    extract::{Multipart, Path, Query, State},
    response::Json,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{
    model::{ListQuery, Product},
    service::ProductService,
};
use crate::core::error::CoreError;
use crate::infrastructure::uploads::{self, StagedUpload};

#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
}

/// GET /products：按 limit/skip 分页列出产品
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, CoreError> {
    let products = state.product_service.list(query.limit, query.skip).await?;
    Ok(Json(products))
}

/// POST /products：multipart 表单创建产品，可附带单个 image 文件
pub async fn store(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Product>, CoreError> {
    let (payload, image) = read_form(multipart).await?;
    let product = state.product_service.create(payload, image).await?;
    Ok(Json(product))
}

/// PUT /products/:id：multipart 表单更新产品，可附带单个 image 文件
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Product>, CoreError> {
    let (payload, image) = read_form(multipart).await?;
    let product = state.product_service.update(id, payload, image).await?;
    Ok(Json(product))
}

/// GET /health：健康检查
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "products_count": state.product_service.count().await,
    }))
}

/// 拆解 multipart 表单：文本字段收进 payload，image 文件字段暂存到临时目录
async fn read_form(
    mut multipart: Multipart,
) -> Result<(Map<String, Value>, Option<StagedUpload>), CoreError> {
    let mut payload = Map::new();
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(|name| name.to_string()) else {
            continue;
        };

        if name == "image" && field.file_name().is_some() {
            image = Some(uploads::stage(field).await?);
        } else {
            let text = field.text().await?;
            payload.insert(name, Value::String(text));
        }
    }

    Ok((payload, image))
}
