/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{ProgressCursor, Task};
use crate::orchestrator::PageState;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info。
/// 重复调用不会报错。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, topic: Option<&str>) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 讲义研究模式");
    info!("📚 主题: {}", topic.unwrap_or("(未提供)"));
    info!("🌐 后端: {}", config.api_base_url);
    info!("💾 缓存: {}", config.cache_file.display());
    info!(
        "⏱️ 进度间隔: {}-{} ms",
        config.min_interval_ms, config.max_interval_ms
    );
    info!("{}", "=".repeat(60));
}

/// 记录页面结果
pub fn log_page_state(state: &PageState) {
    match state {
        PageState::Loading => info!("⏳ 正在研究..."),
        PageState::Ready { origin } => info!("✓ 讲义已就绪 (来源: {:?})", origin),
        PageState::Failed { message, .. } => error!("❌ 失败: {}", message),
    }
}

/// 渲染任务看板
///
/// 当前任务前加 `▶`，有链接时追加去掉协议头后的地址
pub fn render_task_board(tasks: &[Task], cursor: &ProgressCursor) -> String {
    let mut lines = Vec::with_capacity(tasks.len() + 1);

    let activity = cursor
        .subtask
        .as_deref()
        .map(|s| truncate_text(s, 60))
        .unwrap_or_else(|| "准备研究中...".to_string());
    lines.push(format!("当前: {}", activity));

    for task in tasks {
        let marker = if cursor.task_title.as_deref() == Some(task.title.as_str()) {
            "▶"
        } else {
            " "
        };
        let line = match task.display_host() {
            Some(host) => format!("{} {} ({})", marker, task.title, host),
            None => format!("{} {}", marker, task.title),
        };
        lines.push(line);
    }

    lines.join("\n")
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
