//! 应用配置
//!
//! 配置在启动时读取一次，显式注入到各组件，不使用进程级全局变量。

use std::env;
use std::path::PathBuf;

use super::schema::{DocumentSchema, FieldKind, FieldRule};

/// 应用配置结构
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP 服务绑定地址
    pub bind_address: String,
    /// 应用根目录，上传文件保存在其下的 public/uploads/product
    pub root_path: PathBuf,
    /// 请求体大小上限（字节），约束 multipart 上传
    pub max_body_bytes: usize,
}

impl AppConfig {
    /// 从环境变量读取配置，缺省使用默认值
    pub fn from_env() -> Self {
        let bind_address =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1:3001".to_string());
        let root_path = env::var("APP_ROOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let max_body_bytes = env::var("MAX_BODY_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(16 * 1024 * 1024);

        Self {
            bind_address,
            root_path,
            max_body_bytes,
        }
    }

    /// 产品图片的永久上传目录
    pub fn upload_dir(&self) -> PathBuf {
        self.root_path
            .join("public")
            .join("uploads")
            .join("product")
    }

    /// 产品文档的字段约束，规则由配置给出而非写死在存储层
    pub fn product_schema(&self) -> DocumentSchema {
        DocumentSchema::new(vec![
            FieldRule::required("name", FieldKind::Text),
            FieldRule::required("price", FieldKind::Number),
            FieldRule::optional("description", FieldKind::Text),
            FieldRule::optional("image_url", FieldKind::Text),
        ])
    }
}
