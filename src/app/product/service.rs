//! 产品业务服务
//!
//! 编排「搬迁文件 → 写文档 → 失败补偿」的顺序流程。搬迁是文档写入前
//! 唯一的挂起点，搬迁未完成（或失败）绝不写文档。

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use super::model::Product;
use crate::core::error::CoreError;
use crate::infrastructure::store::{DocumentStore, StoreError};
use crate::infrastructure::uploads::{StagedUpload, UploadRelocator};

#[derive(Clone)]
pub struct ProductService {
    store: Arc<DocumentStore>,
    relocator: UploadRelocator,
}

impl ProductService {
    pub fn new(store: Arc<DocumentStore>, relocator: UploadRelocator) -> Self {
        Self { store, relocator }
    }

    pub async fn list(&self, limit: i64, skip: i64) -> Result<Vec<Product>, CoreError> {
        Ok(self.store.find(limit, skip).await)
    }

    pub async fn count(&self) -> usize {
        self.store.count().await
    }

    /// 创建产品
    ///
    /// 带图片时先以新生成的 uuid 为基名搬迁文件；搬迁失败直接上抛，
    /// 不写文档。文档校验失败则删除刚搬迁的孤儿文件再返回校验错误。
    pub async fn create(
        &self,
        mut payload: Map<String, Value>,
        image: Option<StagedUpload>,
    ) -> Result<Product, CoreError> {
        let relocated = match image {
            Some(staged) => {
                let filename = self
                    .relocator
                    .relocate(&staged, &Uuid::new_v4().to_string())
                    .await?;
                payload.insert("image_url".to_string(), Value::String(filename.clone()));
                Some(filename)
            }
            None => None,
        };

        match self.store.insert(&payload).await {
            Ok(product) => {
                info!("产品已创建: {}", product.id);
                Ok(product)
            }
            Err(err) => Err(self.compensate(relocated, err).await),
        }
    }

    /// 更新产品
    ///
    /// 先取出现有文档定位旧图；带新图片时搬迁新文件、删除旧图并覆盖
    /// image_url，然后按合并语义更新文档。校验失败只回收新搬迁的文件。
    pub async fn update(
        &self,
        id: Uuid,
        mut payload: Map<String, Value>,
        image: Option<StagedUpload>,
    ) -> Result<Product, CoreError> {
        let existing = self
            .store
            .get(id)
            .await
            .ok_or_else(|| CoreError::NotFound(format!("产品 {} 不存在", id)))?;

        let relocated = match image {
            Some(staged) => {
                let filename = self
                    .relocator
                    .relocate(&staged, &Uuid::new_v4().to_string())
                    .await?;
                if let Some(previous) = existing.image_url() {
                    // 旧图删除失败不阻塞更新
                    if let Err(err) = self.relocator.remove(previous).await {
                        warn!("删除旧图片 {} 失败: {:?}", previous, err);
                    }
                }
                payload.insert("image_url".to_string(), Value::String(filename.clone()));
                Some(filename)
            }
            None => None,
        };

        match self.store.update(id, &payload).await {
            Ok(product) => {
                info!("产品已更新: {}", product.id);
                Ok(product)
            }
            Err(err) => Err(self.compensate(relocated, err).await),
        }
    }

    /// 文档写入失败后的补偿：校验失败时删除本次搬迁的文件，其余错误
    /// 不动文件系统，原样换算为响应错误
    async fn compensate(&self, relocated: Option<String>, err: StoreError) -> CoreError {
        if matches!(err, StoreError::Validation { .. }) {
            if let Some(filename) = relocated {
                if let Err(remove_err) = self.relocator.remove(&filename).await {
                    warn!("回滚删除孤儿文件 {} 失败: {:?}", filename, remove_err);
                }
            }
        }

        match err {
            StoreError::Validation { message, fields } => CoreError::Validation { message, fields },
            StoreError::NotFound(id) => CoreError::NotFound(format!("产品 {} 不存在", id)),
        }
    }
}
