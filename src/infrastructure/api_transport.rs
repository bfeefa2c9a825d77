//! HTTP 传输 - 基础设施层
//!
//! 持有唯一的 reqwest::Client 和后端地址，只暴露"POST JSON"的能力

use reqwest::Client;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::ApiError;

/// 一次 POST 的原始结果
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// 响应体；空响应或非 JSON 时为 `None`
    pub body: Option<JsonValue>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP 传输
///
/// 职责：
/// - 持有 Client 和 base_url
/// - 暴露 post_json() 能力
/// - 不认识 Lecture / Task
/// - 不判断业务成败
#[derive(Clone)]
pub struct ApiTransport {
    client: Client,
    base_url: String,
}

impl ApiTransport {
    /// 创建新的传输对象
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 拼接完整地址
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST JSON 并读取响应
    ///
    /// # 参数
    /// - `path`: 接口路径
    /// - `payload`: 请求体
    ///
    /// # 返回
    /// 只要拿到了 HTTP 响应就返回 Ok，状态码由调用方判断
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| ApiError::request_failed(path, e))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::request_failed(path, e))?;

        debug!("POST {} → {} ({} 字节)", url, status, text.len());

        let body = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&text).ok()
        };

        Ok(ApiResponse { status, body })
    }
}
