use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::OnceLock;

/// 研究任务状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
    /// 未识别的状态值，只影响展示
    #[serde(other)]
    Unknown,
}

/// 研究任务
///
/// 完全由生成服务产出，本地只读不改。
/// `title` 在同一份讲义内唯一，进度游标靠它定位任务。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subtasks: Vec<String>,
}

impl Task {
    /// 创建一个没有链接的任务
    pub fn new(title: impl Into<String>, subtasks: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            title: title.into(),
            url: None,
            status: TaskStatus::Todo,
            subtasks: subtasks.into_iter().map(Into::into).collect(),
        }
    }

    /// 去掉协议头和 `www.` 前缀后的链接，用于展示
    pub fn display_host(&self) -> Option<String> {
        let url = self.url.as_deref()?;
        match scheme_prefix() {
            Some(re) => Some(re.replace(url, "").into_owned()),
            None => Some(url.to_string()),
        }
    }
}

// 看板每次刷新都会调用，只编译一次
fn scheme_prefix() -> Option<&'static Regex> {
    static SCHEME_PREFIX: OnceLock<Option<Regex>> = OnceLock::new();
    SCHEME_PREFIX
        .get_or_init(|| Regex::new(r"^https?://(www\.)?").ok())
        .as_ref()
}

/// 讲义文档
///
/// `slides` 对本系统是不透明的结构化内容，只做序列化转发。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LectureDocument {
    pub title: String,
    pub slides: JsonValue,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub research_tasks: Vec<Task>,
}

impl LectureDocument {
    /// 序列化后的幻灯片内容（持久化接口的 `content` 字段）
    pub fn serialized_slides(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.slides)
    }
}

// 后端有时给 null 而不是省略字段
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// 缓存槽中保存的条目
///
/// `topic` 只用于诊断日志，查找时并不按主题区分。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedLecture {
    pub topic: String,
    pub cached_at: DateTime<Utc>,
    pub lecture: LectureDocument,
}

impl CachedLecture {
    pub fn new(topic: impl Into<String>, lecture: LectureDocument) -> Self {
        Self {
            topic: topic.into(),
            cached_at: Utc::now(),
            lecture,
        }
    }
}

/// 进度游标：当前任务 + 当前子任务
///
/// 非空时 `task_title` 一定指向当前任务列表中的某个任务，
/// `subtask` 一定是该任务的子任务之一。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressCursor {
    pub task_title: Option<String>,
    pub subtask: Option<String>,
}

impl ProgressCursor {
    pub fn unset() -> Self {
        Self::default()
    }

    /// 指向给定任务的第一个子任务（没有子任务时子任务为空）
    pub fn at_start_of(task: &Task) -> Self {
        Self {
            task_title: Some(task.title.clone()),
            subtask: task.subtasks.first().cloned(),
        }
    }

    pub fn is_set(&self) -> bool {
        self.task_title.is_some()
    }
}

impl fmt::Display for ProgressCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.task_title, &self.subtask) {
            (Some(task), Some(sub)) => write!(f, "{} → {}", task, sub),
            (Some(task), None) => write!(f, "{} → ·", task),
            _ => write!(f, "(未开始)"),
        }
    }
}
