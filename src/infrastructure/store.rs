//! 内存文档集合
//!
//! 以插入顺序保存产品文档，模拟外部文档数据库的 find/save/update 行为。
//! 字段校验交给注入的 [`DocumentSchema`]，存储层自身不认识业务字段。

use std::sync::RwLock;

use serde_json::{Map, Value};
use uuid::Uuid;

use super::schema::{DocumentSchema, SchemaViolation};
use crate::app::product::model::Product;

/// 存储层错误
#[derive(Debug)]
pub enum StoreError {
    /// schema 校验拒绝，携带结构化的字段错误
    Validation {
        message: String,
        fields: Map<String, Value>,
    },
    /// 标识符不存在
    NotFound(Uuid),
}

impl From<SchemaViolation> for StoreError {
    fn from(violation: SchemaViolation) -> Self {
        StoreError::Validation {
            message: violation.message,
            fields: violation.fields,
        }
    }
}

pub struct DocumentStore {
    schema: DocumentSchema,
    documents: RwLock<Vec<Product>>,
}

impl DocumentStore {
    pub fn new(schema: DocumentSchema) -> Self {
        Self {
            schema,
            documents: RwLock::new(Vec::new()),
        }
    }

    /// 按存储顺序分页读取，不承诺额外的排序
    pub async fn find(&self, limit: i64, skip: i64) -> Vec<Product> {
        let documents = self.documents.read().unwrap();
        documents
            .iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: Uuid) -> Option<Product> {
        let documents = self.documents.read().unwrap();
        documents.iter().find(|p| p.id == id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.documents.read().unwrap().len()
    }

    /// 校验后插入新文档，分配新的标识符
    pub async fn insert(&self, payload: &Map<String, Value>) -> Result<Product, StoreError> {
        let fields = self.schema.validate(payload)?;
        let product = Product {
            id: Uuid::new_v4(),
            fields,
        };

        let mut documents = self.documents.write().unwrap();
        documents.push(product.clone());
        Ok(product)
    }

    /// 合并更新：payload 覆盖已有字段，未提供的字段保持原值
    pub async fn update(&self, id: Uuid, payload: &Map<String, Value>) -> Result<Product, StoreError> {
        let merged = {
            let documents = self.documents.read().unwrap();
            let existing = documents
                .iter()
                .find(|p| p.id == id)
                .ok_or(StoreError::NotFound(id))?;
            let mut merged = existing.fields.clone();
            for (key, value) in payload {
                merged.insert(key.clone(), value.clone());
            }
            merged
        };

        // 对合并后的整份文档做校验，同一标识符的并发更新不做协调
        let fields = self.schema.validate(&merged)?;

        let mut documents = self.documents.write().unwrap();
        let existing = documents
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))?;
        existing.fields = fields;
        Ok(existing.clone())
    }
}
