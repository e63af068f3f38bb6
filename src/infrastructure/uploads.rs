//! 上传文件的暂存与搬迁
//!
//! multipart 上传先流式落到系统临时目录，数据库写入前再流式搬迁到
//! 配置的上传目录，全程按块传输，大文件不会整体读进内存。

use std::path::{Path, PathBuf};

use axum::extract::multipart::Field;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

use crate::core::error::CoreError;

/// 已暂存的上传文件：临时路径 + 原始文件名（用于提取扩展名）
#[derive(Debug)]
pub struct StagedUpload {
    pub temp_path: PathBuf,
    pub original_name: String,
}

/// 把 multipart 文件字段逐块写入临时目录
pub async fn stage(mut field: Field<'_>) -> Result<StagedUpload, CoreError> {
    let original_name = field
        .file_name()
        .map(|name| name.to_string())
        .unwrap_or_else(|| "upload".to_string());
    let temp_path = std::env::temp_dir().join(format!("upload-{}.part", Uuid::new_v4()));

    let mut file = fs::File::create(&temp_path).await?;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(StagedUpload {
        temp_path,
        original_name,
    })
}

/// 文件搬迁器：把暂存文件落到永久上传目录
#[derive(Debug, Clone)]
pub struct UploadRelocator {
    upload_dir: PathBuf,
}

impl UploadRelocator {
    pub fn new(upload_dir: PathBuf) -> Self {
        Self { upload_dir }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// 以 `<base>.<原扩展名>` 为名做流式拷贝，完全落盘后才返回
    ///
    /// 扩展名取原始文件名最后一个 `.` 之后的部分；原始文件名不含 `.`
    /// 时不追加扩展名，直接使用 base。返回值是文件名而非完整路径。
    pub async fn relocate(&self, staged: &StagedUpload, base: &str) -> Result<String, CoreError> {
        let filename = match staged.original_name.rsplit_once('.') {
            Some((_, extension)) => format!("{}.{}", base, extension),
            None => base.to_string(),
        };

        fs::create_dir_all(&self.upload_dir).await?;
        let target = self.upload_dir.join(&filename);

        let mut source = fs::File::open(&staged.temp_path).await?;
        let mut destination = fs::File::create(&target).await?;
        tokio::io::copy(&mut source, &mut destination).await?;
        destination.flush().await?;

        // 暂存文件尽力清理，失败不影响本次请求
        if let Err(err) = fs::remove_file(&staged.temp_path).await {
            warn!("清理暂存文件 {} 失败: {}", staged.temp_path.display(), err);
        }

        Ok(filename)
    }

    /// 删除上传目录下的文件，用于校验失败回滚和更新时替换旧图
    pub async fn remove(&self, filename: &str) -> Result<(), CoreError> {
        fs::remove_file(self.upload_dir.join(filename)).await?;
        Ok(())
    }
}
