use anyhow::{anyhow, Context, Result};
use clap::Parser;
use lecture_research::orchestrator::{PageState, ResearchPage};
use lecture_research::utils::logging;
use lecture_research::workflow::ResolutionOrigin;
use lecture_research::Config;
use std::path::PathBuf;
use tracing::info;

/// 按主题生成讲义并显示研究进度
#[derive(Parser, Debug)]
#[command(name = "lecture-research", version)]
struct Args {
    /// 讲义主题
    #[arg(long, env = "LECTURE_TOPIC")]
    topic: Option<String>,

    /// TOML 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 启动前清空讲义缓存
    #[arg(long)]
    clear_cache: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 加载配置
    let config = match &args.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::from_env(),
    };

    // 初始化日志
    logging::init(config.verbose_logging);
    config.validate()?;
    logging::log_startup(&config, args.topic.as_deref());

    let page = ResearchPage::from_config(&config);

    if args.clear_cache {
        page.orchestrator().cache().clear().await?;
        info!("🗑️ 讲义缓存已清空");
    }

    let mut active = page.activate(args.topic);
    let mut navigation = active.take_navigation().context("跳转信号已被取走")?;
    let mut state = active.state();
    let mut cursor = active.cursor().context("进度定时器未启动")?;

    let mut navigation_open = true;
    let mut state_open = true;
    let mut cursor_open = true;

    let result: Result<()> = loop {
        tokio::select! {
            target = &mut navigation, if navigation_open => match target {
                Ok(target) => {
                    println!("{}", target);
                    break Ok(());
                }
                Err(_) => navigation_open = false,
            },
            changed = state.changed(), if state_open => {
                if changed.is_err() {
                    state_open = false;
                    continue;
                }
                let current = state.borrow_and_update().clone();
                logging::log_page_state(&current);
                match current {
                    PageState::Failed { message, .. } => break Err(anyhow!(message)),
                    PageState::Ready { origin: ResolutionOrigin::Cache } => {
                        info!("讲义来自缓存，按 Ctrl-C 退出");
                    }
                    _ => {}
                }
            }
            changed = cursor.changed(), if cursor_open => {
                if changed.is_err() {
                    cursor_open = false;
                    continue;
                }
                let current = cursor.borrow_and_update().clone();
                info!("\n{}", logging::render_task_board(&active.tasks(), &current));
            }
            _ = tokio::signal::ctrl_c() => {
                info!("收到退出信号");
                break Ok(());
            }
        }
    };

    active.teardown().await;
    result
}
