//! 远程服务接口 - 业务能力层
//!
//! 生成服务和持久化服务都是外部黑盒，这里只描述"能做什么"。
//! HTTP 实现见 `clients`，测试中可以替换成内存实现。

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{LectureDocument, Topic};

/// 生成请求体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateLectureRequest {
    pub topic: String,
}

/// 保存请求体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreLectureRequest {
    pub topic: String,
    pub title: String,
    /// 序列化后的幻灯片
    pub content: String,
}

/// 讲义生成服务
pub trait GenerationService: Send + Sync {
    /// 按主题生成讲义；非成功状态、结构不符、网络失败都返回错误
    fn generate<'a>(&'a self, topic: &'a Topic) -> BoxFuture<'a, Result<LectureDocument, ApiError>>;
}

/// 讲义持久化服务
pub trait PersistenceService: Send + Sync {
    /// 保存讲义；成功时响应体为空
    fn store<'a>(&'a self, request: &'a StoreLectureRequest) -> BoxFuture<'a, Result<(), ApiError>>;
}
