use reqwest::StatusCode;
use thiserror::Error;

/// 统一的请求失败结果：传输错误、非 2xx 响应、响应解析失败都归并为一条可读消息
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// 从非 2xx 响应体中提取消息
    /// FastAPI 的错误格式为 {"detail": "..."}，参数校验失败时 detail 为数组
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
        let message = parsed.as_ref().and_then(|json| {
            match json.get("detail") {
                Some(serde_json::Value::String(s)) => Some(s.clone()),
                Some(serde_json::Value::Array(items)) => items
                    .first()
                    .and_then(|item| item.get("msg"))
                    .and_then(|m| m.as_str())
                    .map(|s| s.to_string()),
                _ => json.get("message").and_then(|m| m.as_str()).map(|s| s.to_string()),
            }
        });

        Self::new(message.unwrap_or_else(|| format!("请求失败 (HTTP {})", status.as_u16())))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new("请求超时")
        } else if err.is_decode() {
            Self::new(format!("响应解析失败: {}", err))
        } else if err.is_connect() {
            Self::new(format!("无法连接服务器: {}", err))
        } else {
            Self::new(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("响应解析失败: {}", err))
    }
}
