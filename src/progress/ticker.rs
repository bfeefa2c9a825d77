//! 进度定时器
//!
//! 自带取消令牌的后台任务：每次触发推进一次模拟器，然后重新随机下一次间隔。
//! 由页面生命周期启动和停止，停止后不会再触发。

use rand::Rng;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Config;
use crate::models::ProgressCursor;
use crate::progress::simulator::ProgressSimulator;
use crate::progress::task_board::TaskBoard;

/// 定时间隔范围（毫秒，闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorOptions {
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            min_interval_ms: 2000,
            max_interval_ms: 6000,
        }
    }
}

impl SimulatorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_interval_ms: config.min_interval_ms,
            max_interval_ms: config.max_interval_ms,
        }
    }

    /// 在区间内均匀抽取下一次间隔
    pub fn next_interval(&self) -> Duration {
        let ms = if self.min_interval_ms >= self.max_interval_ms {
            self.min_interval_ms
        } else {
            rand::thread_rng().gen_range(self.min_interval_ms..=self.max_interval_ms)
        };
        Duration::from_millis(ms)
    }
}

/// 进度定时器
pub struct ProgressTicker {
    token: CancellationToken,
    cursor_rx: watch::Receiver<ProgressCursor>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    /// 启动定时器
    ///
    /// 看板上已经有任务时立即定位到第一个子任务；
    /// 之后每次看板整体替换也会重新定位。
    pub fn start(board: &TaskBoard, options: SimulatorOptions) -> Self {
        let token = CancellationToken::new();
        let (cursor_tx, cursor_rx) = watch::channel(ProgressCursor::unset());
        let mut tasks_rx = board.subscribe();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            let mut simulator = ProgressSimulator::new();
            let initial = tasks_rx.borrow_and_update().clone();
            cursor_tx.send_replace(simulator.seed(&initial).clone());

            let mut board_open = true;
            loop {
                let delay = options.next_interval();
                debug!("下一次进度推进: {:?} 后", delay);

                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    changed = tasks_rx.changed(), if board_open => {
                        if changed.is_err() {
                            board_open = false;
                            continue;
                        }
                        let snapshot = tasks_rx.borrow_and_update().clone();
                        let cursor = simulator.seed(&snapshot).clone();
                        debug!("任务列表更新 ({} 个)，游标: {}", snapshot.len(), cursor);
                        cursor_tx.send_replace(cursor);
                    }
                    _ = tokio::time::sleep(delay) => {
                        let snapshot = tasks_rx.borrow().clone();
                        let cursor = simulator.tick(&snapshot).clone();
                        debug!("进度推进: {}", cursor);
                        cursor_tx.send_replace(cursor);
                    }
                }
            }

            debug!("进度定时器已停止");
        });

        Self {
            token,
            cursor_rx,
            handle: Some(handle),
        }
    }

    /// 订阅游标变化
    pub fn subscribe(&self) -> watch::Receiver<ProgressCursor> {
        self.cursor_rx.clone()
    }

    pub fn cursor(&self) -> ProgressCursor {
        self.cursor_rx.borrow().clone()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// 停止并等待后台任务退出
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;
    use tokio::time::Instant;

    fn fixed(ms: u64) -> SimulatorOptions {
        SimulatorOptions {
            min_interval_ms: ms,
            max_interval_ms: ms,
        }
    }

    fn cursor(task: &str, subtask: Option<&str>) -> ProgressCursor {
        ProgressCursor {
            task_title: Some(task.to_string()),
            subtask: subtask.map(str::to_string),
        }
    }

    #[test]
    fn test_next_interval_within_bounds() {
        let options = SimulatorOptions::default();
        for _ in 0..200 {
            let d = options.next_interval();
            assert!(d >= Duration::from_millis(2000) && d <= Duration::from_millis(6000));
        }
        assert_eq!(fixed(750).next_interval(), Duration::from_millis(750));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_follow_rotation_at_interval() {
        let board = TaskBoard::new();
        board.publish(vec![
            Task::new("T1", ["a", "b"]),
            Task::new("T2", Vec::<String>::new()),
            Task::new("T3", ["c"]),
        ]);

        let ticker = ProgressTicker::start(&board, fixed(3000));
        let mut rx = ticker.subscribe();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), cursor("T1", Some("a")));

        let started = Instant::now();
        let expected = [
            cursor("T1", Some("b")),
            cursor("T2", None),
            cursor("T3", Some("c")),
            cursor("T1", Some("a")),
        ];
        for want in expected {
            rx.changed().await.unwrap();
            assert_eq!(*rx.borrow_and_update(), want);
        }
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(12_000));
        assert!(elapsed < Duration::from_millis(12_100));

        ticker.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_idles_until_tasks_published() {
        let board = TaskBoard::new();
        let ticker = ProgressTicker::start(&board, fixed(1000));
        let mut rx = ticker.subscribe();

        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_set());

        // 空列表时推进也保持未定位
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_set());

        board.publish(vec![Task::new("Light reactions", ["find sources", "summarize"])]);
        rx.changed().await.unwrap();
        assert_eq!(
            *rx.borrow_and_update(),
            cursor("Light reactions", Some("find sources"))
        );

        ticker.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_after_shutdown() {
        let board = TaskBoard::new();
        board.publish(vec![Task::new("T1", ["a", "b"])]);
        let ticker = ProgressTicker::start(&board, fixed(500));
        let mut rx = ticker.subscribe();
        rx.changed().await.unwrap();

        ticker.shutdown().await;

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(*rx.borrow_and_update(), cursor("T1", Some("a")));
        // 发送端随任务退出而释放
        assert!(rx.changed().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_cursor_channel_stays_closed() {
        let board = TaskBoard::new();
        let ticker = ProgressTicker::start(&board, fixed(500));
        let mut rx = ticker.subscribe();
        ticker.shutdown().await;
        rx.borrow_and_update();

        // 订阅方必须自己停止监听，否则每次 changed() 都立刻返回 Err
        let started = tokio::time::Instant::now();
        for _ in 0..3 {
            assert!(rx.changed().await.is_err());
        }
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let board = TaskBoard::new();
        let ticker = ProgressTicker::start(&board, fixed(500));
        let token = ticker.cancellation_token();
        drop(ticker);
        assert!(token.is_cancelled());
    }
}
