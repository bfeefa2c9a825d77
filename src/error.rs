use std::path::PathBuf;
use thiserror::Error;

/// 后端接口调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败（连接不上、读取响应失败等）
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 非 2xx 响应
    #[error("HTTP 错误 ({endpoint}): 状态码 {status}")]
    BadStatus { endpoint: String, status: u16 },
    /// 响应体不是预期的结构
    #[error("无效的响应数据 ({endpoint}): {reason}")]
    InvalidPayload { endpoint: String, reason: String },
}

impl ApiError {
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        }
    }

    pub fn invalid_payload(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        ApiError::InvalidPayload {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

/// 缓存读写错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("缓存文件读写失败 ({path}): {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("缓存内容序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置项 {key} 无效: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error("无法读取配置文件 ({path}): {source}", path = .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("配置文件解析失败 ({path}): {source}", path = .path.display())]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// 一次激活中讲义解析流程的终止性错误
///
/// 所有变体都不会在内部重试，交给调用方展示。
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("未提供主题")]
    MissingTopic,
    #[error("讲义生成失败: {0}")]
    Generation(#[source] ApiError),
    #[error("讲义保存失败: {0}")]
    Persistence(#[source] ApiError),
    #[error("讲义缓存失败: {0}")]
    Cache(#[from] CacheError),
}

/// 错误类别，供界面和日志区分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveErrorKind {
    MissingTopic,
    Generation,
    Persistence,
    Cache,
}

impl ResolveError {
    pub fn kind(&self) -> ResolveErrorKind {
        match self {
            ResolveError::MissingTopic => ResolveErrorKind::MissingTopic,
            ResolveError::Generation(_) => ResolveErrorKind::Generation,
            ResolveError::Persistence(_) => ResolveErrorKind::Persistence,
            ResolveError::Cache(_) => ResolveErrorKind::Cache,
        }
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, ResolveError>;
