use std::fmt;

use crate::error::ResolveError;

/// 讲义主题
///
/// 由外部在激活时传入，读入后不再变化。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic(String);

impl Topic {
    /// 校验入口参数，空或全空白视为缺失
    pub fn parse(raw: Option<&str>) -> Result<Self, ResolveError> {
        match raw {
            Some(value) if !value.trim().is_empty() => Ok(Self(value.to_string())),
            _ => Err(ResolveError::MissingTopic),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
