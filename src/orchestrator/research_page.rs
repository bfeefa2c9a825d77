//! 研究页 - 编排层
//!
//! ## 职责
//!
//! 页面生命周期的唯一持有者：激活时启动进度定时器和讲义解析，卸载时停止定时器。
//!
//! ## 核心功能
//!
//! 1. **激活**：创建任务看板，启动 `ProgressTicker`，后台运行 `GenerationOrchestrator`
//! 2. **状态**：通过 watch 通道对外发布 `PageState` 和 `ProgressCursor`
//! 3. **跳转**：保存成功后等待一段稳定时间，发出一次跳转信号
//! 4. **卸载**：取消定时器；正在进行的网络请求不会被中断，其结果到达后被安全丢弃

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::clients::{HttpGenerationService, HttpPersistenceService};
use crate::config::Config;
use crate::error::ResolveErrorKind;
use crate::infrastructure::ApiTransport;
use crate::models::ProgressCursor;
use crate::progress::{ProgressTicker, SimulatorOptions, TaskBoard, TaskSnapshot};
use crate::services::FileCache;
use crate::workflow::{GenerationOrchestrator, ResolutionOrigin};

/// 页面状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    /// 讲义解析中
    Loading,
    /// 讲义可用
    Ready { origin: ResolutionOrigin },
    /// 终止性失败，附带给用户看的消息
    Failed {
        kind: ResolveErrorKind,
        message: String,
    },
}

impl PageState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, PageState::Loading)
    }
}

/// 跳转配置
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    pub target: String,
    pub settle_delay: Duration,
}

impl NavigationOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            target: config.navigate_to.clone(),
            settle_delay: config.settle_delay(),
        }
    }
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            target: "/lecture".to_string(),
            settle_delay: Duration::from_millis(1500),
        }
    }
}

/// 研究页
pub struct ResearchPage {
    orchestrator: Arc<GenerationOrchestrator>,
    simulator: SimulatorOptions,
    navigation: NavigationOptions,
}

impl ResearchPage {
    pub fn new(
        orchestrator: Arc<GenerationOrchestrator>,
        simulator: SimulatorOptions,
        navigation: NavigationOptions,
    ) -> Self {
        Self {
            orchestrator,
            simulator,
            navigation,
        }
    }

    /// 按配置装配 HTTP 客户端和磁盘缓存
    pub fn from_config(config: &Config) -> Self {
        let transport = ApiTransport::new(config.api_base_url.clone());
        let orchestrator = GenerationOrchestrator::new(
            Arc::new(FileCache::new(config.cache_file.clone())),
            Arc::new(HttpGenerationService::new(transport.clone(), config)),
            Arc::new(HttpPersistenceService::new(transport, config)),
        );

        Self::new(
            Arc::new(orchestrator),
            SimulatorOptions::from_config(config),
            NavigationOptions::from_config(config),
        )
    }

    pub fn orchestrator(&self) -> &Arc<GenerationOrchestrator> {
        &self.orchestrator
    }

    /// 激活页面
    ///
    /// 定时器立即启动（任务为空时空转），解析流程在后台运行。
    pub fn activate(&self, topic: Option<String>) -> ActivePage {
        let board = TaskBoard::new();
        let ticker = ProgressTicker::start(&board, self.simulator);
        let (state_tx, state_rx) = watch::channel(PageState::Loading);
        let (navigation_tx, navigation_rx) = oneshot::channel();

        let orchestrator = Arc::clone(&self.orchestrator);
        let navigation = self.navigation.clone();
        let torn_down = ticker.cancellation_token();
        let task_board = board.clone();

        let resolve_handle = tokio::spawn(async move {
            let resolution = match orchestrator.resolve(topic.as_deref(), &task_board).await {
                Ok(resolution) => resolution,
                Err(e) => {
                    error!("❌ 页面进入失败状态: {}", e);
                    state_tx.send_replace(PageState::Failed {
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                    return;
                }
            };

            state_tx.send_replace(PageState::Ready {
                origin: resolution.origin,
            });

            if !resolution.should_navigate() {
                return;
            }

            tokio::select! {
                _ = torn_down.cancelled() => {
                    debug!("页面已卸载，放弃跳转");
                }
                _ = tokio::time::sleep(navigation.settle_delay) => {
                    info!("➡️ 跳转到 {}", navigation.target);
                    // 接收端可能已经不在了
                    let _ = navigation_tx.send(navigation.target);
                }
            }
        });

        ActivePage {
            board,
            ticker: Some(ticker),
            state_rx,
            navigation_rx: Some(navigation_rx),
            _resolve_handle: resolve_handle,
        }
    }
}

/// 已激活的页面
pub struct ActivePage {
    board: TaskBoard,
    ticker: Option<ProgressTicker>,
    state_rx: watch::Receiver<PageState>,
    navigation_rx: Option<oneshot::Receiver<String>>,
    /// 卸载时不 abort，让进行中的请求自然结束
    _resolve_handle: JoinHandle<()>,
}

impl ActivePage {
    pub fn state(&self) -> watch::Receiver<PageState> {
        self.state_rx.clone()
    }

    /// 订阅进度游标；页面卸载后返回 None
    pub fn cursor(&self) -> Option<watch::Receiver<ProgressCursor>> {
        self.ticker.as_ref().map(ProgressTicker::subscribe)
    }

    pub fn tasks(&self) -> TaskSnapshot {
        self.board.snapshot()
    }

    /// 取走跳转信号（只能取一次）
    pub fn take_navigation(&mut self) -> Option<oneshot::Receiver<String>> {
        self.navigation_rx.take()
    }

    /// 等待解析流程给出结果
    pub async fn settled(&self) -> PageState {
        let mut rx = self.state_rx.clone();
        let settled = rx
            .wait_for(PageState::is_settled)
            .await
            .map(|state| (*state).clone());
        match settled {
            Ok(state) => state,
            // 发送端已释放，最后一个值就是结果
            Err(_) => rx.borrow().clone(),
        }
    }

    /// 卸载页面：停止定时器，不中断网络请求
    pub async fn teardown(mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.shutdown().await;
        }
        info!("页面已卸载");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CachedLecture, LectureDocument, Task};
    use crate::services::MemoryCache;
    use crate::workflow::generation_flow::tests::{photosynthesis_body, FakeGenerator, FakeStore};
    use serde_json::json;
    use tokio::time::Instant;

    fn page(
        cache: Arc<MemoryCache>,
        generator: Arc<FakeGenerator>,
        store: Arc<FakeStore>,
    ) -> ResearchPage {
        let orchestrator = GenerationOrchestrator::new(cache, generator, store);
        ResearchPage::new(
            Arc::new(orchestrator),
            SimulatorOptions {
                min_interval_ms: 2000,
                max_interval_ms: 6000,
            },
            NavigationOptions::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_generated_lecture_navigates_after_settle_delay() {
        let cache = Arc::new(MemoryCache::new());
        let generator = Arc::new(FakeGenerator::ok(photosynthesis_body()));
        let store = Arc::new(FakeStore::new(200));
        let page = page(cache.clone(), generator.clone(), store.clone());

        let started = Instant::now();
        let mut active = page.activate(Some("photosynthesis".to_string()));
        let navigation = active.take_navigation().unwrap();

        assert_eq!(
            active.settled().await,
            PageState::Ready {
                origin: ResolutionOrigin::Generated
            }
        );
        assert_eq!(navigation.await.unwrap(), "/lecture");
        assert!(started.elapsed() >= Duration::from_millis(1500));

        assert_eq!(generator.calls(), 1);
        assert_eq!(store.calls(), 1);
        assert!(cache.snapshot().is_some());

        // 完成后定时器仍在运行
        let mut cursor = active.cursor().unwrap();
        cursor
            .wait_for(|c| c.task_title.as_deref() == Some("Light reactions"))
            .await
            .unwrap();
        assert_eq!(active.tasks().len(), 1);

        active.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_does_not_navigate() {
        let cache = Arc::new(MemoryCache::with_entry(CachedLecture::new(
            "photosynthesis",
            LectureDocument {
                title: "Cached".to_string(),
                slides: json!([]),
                research_tasks: vec![Task::new("T1", ["a", "b"])],
            },
        )));
        let generator = Arc::new(FakeGenerator::ok(photosynthesis_body()));
        let store = Arc::new(FakeStore::new(200));
        let page = page(cache, generator.clone(), store.clone());

        let mut active = page.activate(Some("photosynthesis".to_string()));
        let navigation = active.take_navigation().unwrap();

        assert_eq!(
            active.settled().await,
            PageState::Ready {
                origin: ResolutionOrigin::Cache
            }
        );
        assert!(navigation.await.is_err());
        assert_eq!(generator.calls(), 0);
        assert_eq!(store.calls(), 0);

        let mut cursor = active.cursor().unwrap();
        let seeded = cursor
            .wait_for(|c| c.is_set())
            .await
            .map(|c| (*c).clone())
            .unwrap();
        assert_eq!(seeded.task_title.as_deref(), Some("T1"));

        active.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistence_failure_surfaces_failed_state() {
        let cache = Arc::new(MemoryCache::new());
        let page = page(
            cache.clone(),
            Arc::new(FakeGenerator::ok(photosynthesis_body())),
            Arc::new(FakeStore::new(500)),
        );

        let mut active = page.activate(Some("photosynthesis".to_string()));
        let navigation = active.take_navigation().unwrap();

        match active.settled().await {
            PageState::Failed { kind, message } => {
                assert_eq!(kind, ResolveErrorKind::Persistence);
                assert!(message.contains("500"));
            }
            other => panic!("unexpected state: {:?}", other),
        }
        assert!(navigation.await.is_err());
        assert!(cache.snapshot().is_some());

        active.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_topic_fails_without_calls() {
        let generator = Arc::new(FakeGenerator::ok(photosynthesis_body()));
        let store = Arc::new(FakeStore::new(200));
        let page = page(Arc::new(MemoryCache::new()), generator.clone(), store.clone());

        let active = page.activate(None);
        assert!(matches!(
            active.settled().await,
            PageState::Failed {
                kind: ResolveErrorKind::MissingTopic,
                ..
            }
        ));
        assert_eq!(generator.calls(), 0);
        assert_eq!(store.calls(), 0);
        active.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_before_settle_drops_navigation() {
        let page = page(
            Arc::new(MemoryCache::new()),
            Arc::new(FakeGenerator::ok(photosynthesis_body())),
            Arc::new(FakeStore::new(200)),
        );

        let mut active = page.activate(Some("photosynthesis".to_string()));
        let navigation = active.take_navigation().unwrap();
        active.settled().await;

        active.teardown().await;
        assert!(navigation.await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_mid_generation_lets_request_finish() {
        let cache = Arc::new(MemoryCache::new());
        let generator = Arc::new(FakeGenerator::slow(
            photosynthesis_body(),
            Duration::from_secs(5),
        ));
        let store = Arc::new(FakeStore::new(200));
        let page = page(cache.clone(), generator.clone(), store.clone());

        let mut active = page.activate(Some("photosynthesis".to_string()));
        let navigation = active.take_navigation().unwrap();
        let state = active.state();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(generator.calls(), 1);
        assert_eq!(*state.borrow(), PageState::Loading);

        active.teardown().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        // 迟到的结果照常落地，但不再跳转
        assert!(cache.snapshot().is_some());
        assert_eq!(store.calls(), 1);
        assert_eq!(
            *state.borrow(),
            PageState::Ready {
                origin: ResolutionOrigin::Generated
            }
        );
        assert!(navigation.await.is_err());
    }
}
