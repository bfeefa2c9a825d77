//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责页面生命周期，是整个系统的"指挥中心"。
//!
//! ### `research_page` - 研究页
//! - 激活时启动进度定时器（ProgressTicker）
//! - 后台运行讲义解析（GenerationOrchestrator）
//! - 发布页面状态与进度游标
//! - 保存成功后发出跳转信号
//! - 卸载时停止定时器
//!
//! ## 层次关系
//!
//! ```text
//! research_page (页面生命周期)
//!     ↓                    ↓
//! workflow::GenerationOrchestrator   progress::ProgressTicker
//!     ↓
//! services / clients (能力层：缓存 / 生成 / 保存)
//!     ↓
//! infrastructure (基础设施：ApiTransport)
//! ```

pub mod research_page;

pub use research_page::{ActivePage, NavigationOptions, PageState, ResearchPage};
