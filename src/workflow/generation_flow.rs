//! 讲义解析流程 - 流程层
//!
//! 核心职责：把一个主题变成一份讲义
//!
//! 流程顺序（严格串行，任何一步失败即终止，不重试）：
//! 1. 校验主题 → 缺失直接失败，不发任何请求
//! 2. 查缓存 → 命中直接返回，不生成也不保存
//! 3. 调用生成服务
//! 4. 写缓存（先于保存，保存失败也不回滚）
//! 5. 调用保存服务

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{ApiError, AppResult, ResolveError};
use crate::models::{CachedLecture, LectureDocument, Topic};
use crate::progress::TaskBoard;
use crate::services::{GenerationService, LectureCache, PersistenceService, StoreLectureRequest};
use crate::workflow::activation_ctx::ActivationCtx;

/// 缓存查找结果
#[derive(Debug)]
pub enum CacheLookup {
    Hit(CachedLecture),
    Miss,
}

/// 讲义来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOrigin {
    /// 缓存命中，本次激活没有任何网络请求
    Cache,
    /// 新生成并已保存
    Generated,
}

/// 解析结果
#[derive(Debug, Clone)]
pub struct Resolution {
    pub document: LectureDocument,
    pub origin: ResolutionOrigin,
}

impl Resolution {
    /// 只有本次激活完成了保存，才应该跳转
    pub fn should_navigate(&self) -> bool {
        self.origin == ResolutionOrigin::Generated
    }
}

/// 讲义解析流程
///
/// - 编排 缓存 → 生成 → 缓存 → 保存
/// - 不持有任何页面状态
/// - 只依赖能力接口（services）
pub struct GenerationOrchestrator {
    cache: Arc<dyn LectureCache>,
    generator: Arc<dyn GenerationService>,
    persistence: Arc<dyn PersistenceService>,
}

impl GenerationOrchestrator {
    pub fn new(
        cache: Arc<dyn LectureCache>,
        generator: Arc<dyn GenerationService>,
        persistence: Arc<dyn PersistenceService>,
    ) -> Self {
        Self {
            cache,
            generator,
            persistence,
        }
    }

    pub fn cache(&self) -> &Arc<dyn LectureCache> {
        &self.cache
    }

    /// 解析主题对应的讲义
    ///
    /// 讲义一旦可用（缓存命中或生成成功），其研究任务立刻发布到 `board`，
    /// 不等保存完成。
    pub async fn resolve(
        &self,
        raw_topic: Option<&str>,
        board: &TaskBoard,
    ) -> AppResult<Resolution> {
        let topic = Topic::parse(raw_topic).map_err(|e| {
            error!("❌ 未提供主题，流程终止");
            e
        })?;
        let ctx = ActivationCtx::next(topic);

        // ========== 阶段 1: 查缓存 ==========
        if let CacheLookup::Hit(entry) = self.lookup_cache(&ctx).await {
            board.publish(entry.lecture.research_tasks.clone());
            return Ok(Resolution {
                document: entry.lecture,
                origin: ResolutionOrigin::Cache,
            });
        }

        // ========== 阶段 2: 生成 ==========
        let document = self.generate(&ctx).await?;
        board.publish(document.research_tasks.clone());

        // ========== 阶段 3: 写缓存 ==========
        self.write_cache(&ctx, &document).await?;

        // ========== 阶段 4: 保存 ==========
        self.persist(&ctx, &document).await?;

        info!("{} ✅ 讲义已生成并保存: {}", ctx, document.title);
        Ok(Resolution {
            document,
            origin: ResolutionOrigin::Generated,
        })
    }

    async fn lookup_cache(&self, ctx: &ActivationCtx) -> CacheLookup {
        match self.cache.get().await {
            Some(entry) => {
                if entry.topic != ctx.topic.as_str() {
                    // 单槽缓存不区分主题，这里只提示不拦截
                    warn!(
                        "{} ⚠️ 缓存中的讲义属于另一个主题 ({})，仍然使用缓存",
                        ctx, entry.topic
                    );
                }
                info!(
                    "{} ✓ 缓存命中: {} (缓存于 {})",
                    ctx,
                    entry.lecture.title,
                    entry.cached_at.format("%Y-%m-%d %H:%M:%S")
                );
                CacheLookup::Hit(entry)
            }
            None => {
                info!("{} 缓存未命中，开始生成讲义...", ctx);
                CacheLookup::Miss
            }
        }
    }

    async fn generate(&self, ctx: &ActivationCtx) -> Result<LectureDocument, ResolveError> {
        match self.generator.generate(&ctx.topic).await {
            Ok(document) => {
                info!(
                    "{} ✓ 讲义生成完成: {} ({} 个研究任务)",
                    ctx,
                    document.title,
                    document.research_tasks.len()
                );
                Ok(document)
            }
            Err(e) => {
                error!("{} ❌ 讲义生成失败: {}", ctx, e);
                Err(ResolveError::Generation(e))
            }
        }
    }

    async fn write_cache(
        &self,
        ctx: &ActivationCtx,
        document: &LectureDocument,
    ) -> Result<(), ResolveError> {
        let entry = CachedLecture::new(ctx.topic.as_str(), document.clone());
        self.cache.set(&entry).await.map_err(|e| {
            error!("{} ❌ 写入缓存失败: {}", ctx, e);
            ResolveError::Cache(e)
        })?;
        info!("{} ✓ 讲义已写入缓存", ctx);
        Ok(())
    }

    async fn persist(&self, ctx: &ActivationCtx, document: &LectureDocument) -> Result<(), ResolveError> {
        info!("{} 📤 正在保存讲义...", ctx);

        let content = document
            .serialized_slides()
            .map_err(|e| ResolveError::Persistence(ApiError::invalid_payload("slides", e.to_string())))?;

        let request = StoreLectureRequest {
            topic: ctx.topic.as_str().to_string(),
            title: document.title.clone(),
            content,
        };

        self.persistence.store(&request).await.map_err(|e| {
            // 缓存保留，重新激活时会直接命中
            error!("{} ❌ 讲义保存失败: {}", ctx, e);
            ResolveError::Persistence(e)
        })
    }
}
