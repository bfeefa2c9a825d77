//! 任务看板
//!
//! 解析流程和进度模拟之间唯一共享的东西：当前的研究任务列表。
//! 写入方整体替换，读取方每次拿一个快照，快照本身不可变。

use std::sync::Arc;
use tokio::sync::watch;

use crate::models::Task;

pub type TaskSnapshot = Arc<Vec<Task>>;

#[derive(Clone)]
pub struct TaskBoard {
    tx: Arc<watch::Sender<TaskSnapshot>>,
}

impl TaskBoard {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Vec::new()));
        Self { tx: Arc::new(tx) }
    }

    /// 整体替换任务列表
    pub fn publish(&self, tasks: Vec<Task>) {
        self.tx.send_replace(Arc::new(tasks));
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for TaskBoard {
    fn default() -> Self {
        Self::new()
    }
}
