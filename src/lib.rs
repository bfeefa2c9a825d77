//! # Lecture Research
//!
//! 按主题请求后端生成讲义，本地单槽缓存，并在等待期间模拟研究进度
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有 HTTP 客户端，只暴露能力
//! - `ApiTransport` - 唯一的 Client owner，提供 post_json() 能力
//!
//! ### ② 业务能力层（Services / Clients）
//! - `services/` - 描述"我能做什么"：缓存、生成、保存
//! - `clients/` - 生成 / 保存接口的 HTTP 实现
//!
//! ### ③ 流程层（Workflow）
//! - `ActivationCtx` - 上下文封装（激活编号 + 主题）
//! - `GenerationOrchestrator` - 流程编排（缓存 → 生成 → 缓存 → 保存）
//!
//! ### ④ 编排层（Orchestration / Progress）
//! - `progress/` - 进度模拟状态机与定时器
//! - `orchestrator/research_page` - 页面生命周期，持有定时器与跳转信号

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{ApiError, AppResult, CacheError, ConfigError, ResolveError, ResolveErrorKind};
pub use models::{LectureDocument, ProgressCursor, Task, TaskStatus, Topic};
pub use orchestrator::{ActivePage, PageState, ResearchPage};
pub use progress::{ProgressSimulator, ProgressTicker, SimulatorOptions, TaskBoard};
pub use workflow::{GenerationOrchestrator, Resolution, ResolutionOrigin};
