//! 产品数据模型

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// 产品文档：存储层分配的标识符 + 由 schema 约束的业务字段
///
/// 字段部分平铺序列化，对外的 JSON 形如
/// `{"id": ..., "name": ..., "price": ..., "image_url": ...}`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Product {
    /// 当前文档引用的图片文件名
    pub fn image_url(&self) -> Option<&str> {
        self.fields.get("image_url").and_then(Value::as_str)
    }
}

/// 列表接口的分页参数
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub skip: i64,
}

fn default_limit() -> i64 {
    10
}
