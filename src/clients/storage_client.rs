/// 讲义保存 API 客户端
use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::infrastructure::ApiTransport;
use crate::services::{PersistenceService, StoreLectureRequest};

/// 讲义保存客户端
pub struct HttpPersistenceService {
    transport: ApiTransport,
    path: String,
}

impl HttpPersistenceService {
    /// 创建新的保存客户端
    pub fn new(transport: ApiTransport, config: &Config) -> Self {
        Self::with_path(transport, config.store_path.clone())
    }

    pub fn with_path(transport: ApiTransport, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
        }
    }

    async fn request(&self, payload: &StoreLectureRequest) -> Result<(), ApiError> {
        debug!(
            "保存讲义 Payload: topic={}, title={}, content={} 字节",
            payload.topic,
            payload.title,
            payload.content.len()
        );

        let response = self.transport.post_json(&self.path, payload).await?;

        if !response.is_success() {
            warn!("保存接口返回非成功状态: {}", response.status);
            return Err(ApiError::BadStatus {
                endpoint: self.path.clone(),
                status: response.status,
            });
        }

        Ok(())
    }
}

impl PersistenceService for HttpPersistenceService {
    fn store<'a>(&'a self, request: &'a StoreLectureRequest) -> BoxFuture<'a, Result<(), ApiError>> {
        self.request(request).boxed()
    }
}
