//! 核心错误处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// 核心错误类型
#[derive(Debug)]
pub enum CoreError {
    BadRequest(String),
    NotFound(String),
    /// 文档 schema 拒绝，携带逐字段的错误说明
    Validation {
        message: String,
        fields: Map<String, Value>,
    },
    InternalServerError(String),
}

/// 错误响应结构
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
    pub timestamp: String,
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let (status, error_message, user_message) = match self {
            // 校验错误按历史接口约定返回 200 和 {error:1,...} 结构
            CoreError::Validation { message, fields } => {
                let body = json!({
                    "error": 1,
                    "message": message,
                    "fields": fields,
                });
                return (StatusCode::OK, Json(body)).into_response();
            }
            CoreError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            CoreError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                msg,
            ),
        };

        let error_response = ErrorResponse {
            error: error_message.to_string(),
            message: user_message,
            code: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::InternalServerError(format!("IO 错误: {}", err))
    }
}

impl From<axum::extract::multipart::MultipartError> for CoreError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        CoreError::BadRequest(format!("表单解析失败: {}", err))
    }
}
