use std::sync::Arc;

use axum::extract::Query;
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use serde_json::{Map, Value};
use tempfile::TempDir;
use uuid::Uuid;

use product_api::app::product::model::ListQuery;
use product_api::app::product::service::ProductService;
use product_api::core::error::CoreError;
use product_api::infrastructure::schema::{DocumentSchema, FieldKind, FieldRule};
use product_api::infrastructure::store::DocumentStore;
use product_api::infrastructure::uploads::{StagedUpload, UploadRelocator};

/// 与生产配置同构的产品 schema
fn test_schema() -> DocumentSchema {
    DocumentSchema::new(vec![
        FieldRule::required("name", FieldKind::Text),
        FieldRule::required("price", FieldKind::Number),
        FieldRule::optional("description", FieldKind::Text),
        FieldRule::optional("image_url", FieldKind::Text),
    ])
}

fn test_service(upload_dir: &TempDir) -> ProductService {
    let store = Arc::new(DocumentStore::new(test_schema()));
    let relocator = UploadRelocator::new(upload_dir.path().to_path_buf());
    ProductService::new(store, relocator)
}

/// 模拟 multipart 中间件的暂存结果：把内容写进系统临时目录
async fn staged(content: &[u8], original_name: &str) -> StagedUpload {
    let temp_path = std::env::temp_dir().join(format!("staged-{}.part", Uuid::new_v4()));
    tokio::fs::write(&temp_path, content).await.unwrap();
    StagedUpload {
        temp_path,
        original_name: original_name.to_string(),
    }
}

fn payload(name: &str, price: &str) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("name".to_string(), Value::String(name.to_string()));
    payload.insert("price".to_string(), Value::String(price.to_string()));
    payload
}

/// 上传目录下的文件数
fn upload_count(upload_dir: &TempDir) -> usize {
    std::fs::read_dir(upload_dir.path())
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_create_without_file() {
    let upload_dir = TempDir::new().unwrap();
    let service = test_service(&upload_dir);

    let product = service.create(payload("木桌", "120.5"), None).await.unwrap();

    // 字段与 payload 一致，数字从表单文本转换而来
    assert_eq!(product.fields.get("name").unwrap(), "木桌");
    assert_eq!(product.fields.get("price").unwrap().as_f64().unwrap(), 120.5);
    assert!(product.image_url().is_none());

    // 每次创建分配新的标识符
    let another = service.create(payload("木椅", "60"), None).await.unwrap();
    assert_ne!(product.id, another.id);
}

#[tokio::test]
async fn test_create_with_file_relocates() {
    let upload_dir = TempDir::new().unwrap();
    let service = test_service(&upload_dir);

    let image = staged(b"fake-image-bytes", "photo.jpg").await;
    let temp_path = image.temp_path.clone();

    let product = service.create(payload("台灯", "45"), Some(image)).await.unwrap();

    // image_url 形如 <生成名>.<原扩展名>
    let image_url = product.image_url().unwrap().to_string();
    assert!(image_url.ends_with(".jpg"));

    // 文件已完整落到永久路径，暂存文件被清理
    let relocated = std::fs::read(upload_dir.path().join(&image_url)).unwrap();
    assert_eq!(relocated, b"fake-image-bytes");
    assert!(!temp_path.exists());
}

#[tokio::test]
async fn test_create_validation_failure_removes_orphan() {
    let upload_dir = TempDir::new().unwrap();
    let service = test_service(&upload_dir);

    // 缺少必填的 name
    let mut incomplete = Map::new();
    incomplete.insert("price".to_string(), Value::String("45".to_string()));
    let image = staged(b"orphan", "photo.png").await;

    let err = service.create(incomplete, Some(image)).await.unwrap_err();

    match err {
        CoreError::Validation { message, fields } => {
            assert!(!message.is_empty());
            assert!(fields.contains_key("name"));
        }
        other => panic!("期望校验错误，实际: {:?}", other),
    }

    // 已搬迁的孤儿文件被删除
    assert_eq!(upload_count(&upload_dir), 0);
}

#[tokio::test]
async fn test_validation_error_response_shape() {
    let mut fields = Map::new();
    fields.insert(
        "name".to_string(),
        Value::String("name 是必填项".to_string()),
    );
    let err = CoreError::Validation {
        message: "产品校验失败: name".to_string(),
        fields,
    };

    // 校验错误按历史约定用 200 + {error:1, message, fields} 返回
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], 1);
    assert!(body["message"].is_string());
    assert!(body["fields"].is_object());
    assert_eq!(body["fields"]["name"], "name 是必填项");
}

#[tokio::test]
async fn test_update_with_new_file_replaces_old() {
    let upload_dir = TempDir::new().unwrap();
    let service = test_service(&upload_dir);

    let first = staged(b"old-image", "old.png").await;
    let product = service.create(payload("海报", "15"), Some(first)).await.unwrap();
    let old_url = product.image_url().unwrap().to_string();
    assert!(upload_dir.path().join(&old_url).exists());

    let second = staged(b"new-image", "new.jpg").await;
    let updated = service
        .update(product.id, payload("海报", "18"), Some(second))
        .await
        .unwrap();

    // 旧图被删除，image_url 指向新文件
    let new_url = updated.image_url().unwrap().to_string();
    assert_ne!(new_url, old_url);
    assert!(new_url.ends_with(".jpg"));
    assert!(!upload_dir.path().join(&old_url).exists());
    assert_eq!(
        std::fs::read(upload_dir.path().join(&new_url)).unwrap(),
        b"new-image"
    );
}

#[tokio::test]
async fn test_update_without_file_preserves_image() {
    let upload_dir = TempDir::new().unwrap();
    let service = test_service(&upload_dir);

    let image = staged(b"keep-me", "keep.gif").await;
    let product = service.create(payload("挂画", "88"), Some(image)).await.unwrap();
    let image_url = product.image_url().unwrap().to_string();

    // 只改 price，合并语义下其余字段保持原值
    let mut partial = Map::new();
    partial.insert("price".to_string(), Value::String("99".to_string()));
    let updated = service.update(product.id, partial, None).await.unwrap();

    assert_eq!(updated.fields.get("name").unwrap(), "挂画");
    assert_eq!(updated.fields.get("price").unwrap().as_f64().unwrap(), 99.0);
    assert_eq!(updated.image_url().unwrap(), image_url);
    assert!(upload_dir.path().join(&image_url).exists());
}

#[tokio::test]
async fn test_update_validation_failure_removes_new_file() {
    let upload_dir = TempDir::new().unwrap();
    let service = test_service(&upload_dir);

    let product = service.create(payload("花瓶", "30"), None).await.unwrap();

    // 非法的 price 触发校验失败，新搬迁的文件要被回收
    let mut invalid = Map::new();
    invalid.insert("price".to_string(), Value::String("不是数字".to_string()));
    let image = staged(b"doomed", "doomed.webp").await;

    let err = service.update(product.id, invalid, Some(image)).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
    assert_eq!(upload_count(&upload_dir), 0);

    // 文档未被改动
    let unchanged = &service.list(10, 0).await.unwrap()[0];
    assert_eq!(unchanged.fields.get("price").unwrap().as_f64().unwrap(), 30.0);
}

#[tokio::test]
async fn test_update_unknown_id() {
    let upload_dir = TempDir::new().unwrap();
    let service = test_service(&upload_dir);

    let err = service
        .update(Uuid::new_v4(), payload("幽灵", "1"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn test_list_pagination() {
    let upload_dir = TempDir::new().unwrap();
    let service = test_service(&upload_dir);

    for i in 0..5 {
        service
            .create(payload(&format!("产品{}", i), "10"), None)
            .await
            .unwrap();
    }

    assert_eq!(service.list(2, 0).await.unwrap().len(), 2);
    assert_eq!(service.list(10, 4).await.unwrap().len(), 1);
    assert_eq!(service.list(10, 0).await.unwrap().len(), 5);
    assert_eq!(service.list(10, 9).await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_list_query_defaults() {
    // 不带参数时 limit=10 skip=0
    let uri: Uri = "http://localhost/products".parse().unwrap();
    let Query(query) = Query::<ListQuery>::try_from_uri(&uri).unwrap();
    assert_eq!(query.limit, 10);
    assert_eq!(query.skip, 0);

    let uri: Uri = "http://localhost/products?limit=2&skip=3".parse().unwrap();
    let Query(query) = Query::<ListQuery>::try_from_uri(&uri).unwrap();
    assert_eq!(query.limit, 2);
    assert_eq!(query.skip, 3);

    // 非整数参数被拒绝
    let uri: Uri = "http://localhost/products?limit=abc".parse().unwrap();
    assert!(Query::<ListQuery>::try_from_uri(&uri).is_err());
}

#[tokio::test]
async fn test_extension_less_filename() {
    let upload_dir = TempDir::new().unwrap();
    let service = test_service(&upload_dir);

    // 原始文件名没有 `.` 时，落盘名就是生成的基名
    let image = staged(b"raw", "rawfile").await;
    let product = service.create(payload("裸文件", "5"), Some(image)).await.unwrap();

    let image_url = product.image_url().unwrap();
    assert!(!image_url.contains('.'));
    assert!(upload_dir.path().join(image_url).exists());
}

#[tokio::test]
async fn test_schema_casts_and_drops_unknown_fields() {
    let upload_dir = TempDir::new().unwrap();
    let service = test_service(&upload_dir);

    let mut loose = payload("茶壶", "9.99");
    loose.insert("color".to_string(), Value::String("红".to_string()));

    let product = service.create(loose, None).await.unwrap();

    // 数字完成类型转换，schema 外的字段被丢弃
    assert_eq!(product.fields.get("price").unwrap().as_f64().unwrap(), 9.99);
    assert!(!product.fields.contains_key("color"));
}

#[tokio::test]
async fn test_relocate_failure_skips_document_write() {
    let upload_dir = TempDir::new().unwrap();
    let service = test_service(&upload_dir);

    // 暂存路径不存在，搬迁必然失败
    let broken = StagedUpload {
        temp_path: std::env::temp_dir().join(format!("missing-{}", Uuid::new_v4())),
        original_name: "ghost.jpg".to_string(),
    };

    let err = service.create(payload("幽灵", "1"), Some(broken)).await.unwrap_err();
    assert!(matches!(err, CoreError::InternalServerError(_)));

    // 搬迁失败时不写文档
    assert_eq!(service.count().await, 0);
    assert_eq!(service.list(10, 0).await.unwrap().len(), 0);
}
