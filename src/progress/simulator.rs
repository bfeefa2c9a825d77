//! 进度模拟状态机
//!
//! 后端没有真实的进度信号，这里按固定规则在任务 / 子任务之间轮转，
//! 永不结束，也没有错误状态。

use crate::models::{ProgressCursor, Task};

/// 进度模拟器
///
/// 只持有游标，任务列表由调用方每次传入快照。
#[derive(Debug, Clone, Default)]
pub struct ProgressSimulator {
    cursor: ProgressCursor,
}

impl ProgressSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> &ProgressCursor {
        &self.cursor
    }

    /// 把游标放到第一个任务的第一个子任务上；列表为空时游标清空
    pub fn seed(&mut self, tasks: &[Task]) -> &ProgressCursor {
        self.cursor = tasks
            .first()
            .map(ProgressCursor::at_start_of)
            .unwrap_or_default();
        &self.cursor
    }

    /// 推进一步
    ///
    /// - 游标指向的任务已不在列表中 → 回到第一个任务的第一个子任务
    /// - 任务没有子任务 → 直接进入下一个任务
    /// - 当前子任务不在该任务的子任务中 → 回到该任务的第一个子任务
    /// - 否则子任务后移一位，绕回 0 时进入下一个任务
    pub fn tick(&mut self, tasks: &[Task]) -> &ProgressCursor {
        let Some(task_index) = self.current_task_index(tasks) else {
            return self.seed(tasks);
        };

        let task = &tasks[task_index];
        if task.subtasks.is_empty() {
            self.enter_task(tasks, (task_index + 1) % tasks.len());
            return &self.cursor;
        }

        let subtask_index = self
            .cursor
            .subtask
            .as_ref()
            .and_then(|current| task.subtasks.iter().position(|s| s == current));

        match subtask_index {
            None => {
                self.cursor = ProgressCursor::at_start_of(task);
            }
            Some(j) => {
                let next = (j + 1) % task.subtasks.len();
                if next == 0 {
                    self.enter_task(tasks, (task_index + 1) % tasks.len());
                } else {
                    self.cursor.subtask = Some(task.subtasks[next].clone());
                }
            }
        }

        &self.cursor
    }

    fn current_task_index(&self, tasks: &[Task]) -> Option<usize> {
        let title = self.cursor.task_title.as_ref()?;
        tasks.iter().position(|t| &t.title == title)
    }

    fn enter_task(&mut self, tasks: &[Task], index: usize) {
        self.cursor = ProgressCursor::at_start_of(&tasks[index]);
    }
}
