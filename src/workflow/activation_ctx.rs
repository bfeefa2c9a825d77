//! 激活上下文
//!
//! 封装"这是第几次激活、主题是什么"这一信息

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::Topic;

static NEXT_ACTIVATION: AtomicU64 = AtomicU64::new(1);

/// 激活上下文
#[derive(Debug, Clone)]
pub struct ActivationCtx {
    /// 激活编号（仅用于日志显示）
    pub activation_id: u64,

    pub topic: Topic,
}

impl ActivationCtx {
    /// 为一次新的激活分配编号
    pub fn next(topic: Topic) -> Self {
        Self {
            activation_id: NEXT_ACTIVATION.fetch_add(1, Ordering::Relaxed),
            topic,
        }
    }
}

impl Display for ActivationCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[激活 #{} 主题#{}]", self.activation_id, self.topic)
    }
}
