//! 进度模拟
//!
//! - `simulator` - 纯状态机，给定任务快照推进游标
//! - `ticker` - 随机间隔的后台定时器，持有取消令牌
//! - `task_board` - 解析流程与定时器之间共享的任务列表

pub mod simulator;
pub mod task_board;
pub mod ticker;

pub use simulator::ProgressSimulator;
pub use task_board::{TaskBoard, TaskSnapshot};
pub use ticker::{ProgressTicker, SimulatorOptions};
