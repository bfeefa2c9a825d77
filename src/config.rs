use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 后端地址
    pub api_base_url: String,
    /// 生成讲义接口路径
    pub generate_path: String,
    /// 保存讲义接口路径
    pub store_path: String,
    /// 单槽缓存文件
    pub cache_file: PathBuf,
    // --- 进度模拟 ---
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
    // --- 跳转 ---
    /// 保存成功后等待多久再发出跳转信号
    pub settle_delay_ms: u64,
    pub navigate_to: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            generate_path: "/generate_simple".to_string(),
            store_path: "/api/store_lecture".to_string(),
            cache_file: PathBuf::from(".lecture_cache/lecture.json"),
            min_interval_ms: 2000,
            max_interval_ms: 6000,
            settle_delay_ms: 1500,
            navigate_to: "/lecture".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 默认值 + 环境变量覆盖
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 读取 TOML 配置文件，再叠加环境变量
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(self) -> Self {
        Self {
            api_base_url: std::env::var("LECTURE_API_BASE_URL").unwrap_or(self.api_base_url),
            generate_path: std::env::var("LECTURE_GENERATE_PATH").unwrap_or(self.generate_path),
            store_path: std::env::var("LECTURE_STORE_PATH").unwrap_or(self.store_path),
            cache_file: std::env::var("LECTURE_CACHE_FILE").map(PathBuf::from).unwrap_or(self.cache_file),
            min_interval_ms: std::env::var("PROGRESS_MIN_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.min_interval_ms),
            max_interval_ms: std::env::var("PROGRESS_MAX_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.max_interval_ms),
            settle_delay_ms: std::env::var("NAVIGATION_SETTLE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.settle_delay_ms),
            navigate_to: std::env::var("NAVIGATION_TARGET").unwrap_or(self.navigate_to),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(invalid("api_base_url", "不能为空"));
        }
        if self.max_interval_ms == 0 {
            return Err(invalid("max_interval_ms", "必须大于 0"));
        }
        if self.min_interval_ms > self.max_interval_ms {
            return Err(invalid(
                "min_interval_ms",
                format!("{} 大于 max_interval_ms {}", self.min_interval_ms, self.max_interval_ms),
            ));
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}
