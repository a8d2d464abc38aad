//! 单查询处理流程 - 流程层
//!
//! 编排一个查询的完整路径：导航 → 验证探测 → 容器定位 → 点击采集。
//! 不持有任何资源（page），只依赖业务能力（services）。

use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::JsExecutor;
use crate::models::QaPair;
use crate::selectors::SelectorRole;
use crate::services::{challenge, locator, CaptchaResolver, LivePaaWidget};
use crate::workflow::extract_loop::{self, click_and_extract, ClickBudget, Pacing};
use crate::workflow::query_ctx::QueryCtx;

/// 导航后等页面稳定的抖动窗口（毫秒）
const SETTLE_WAIT_MS: (u64, u64) = (2000, 3000);

/// 单查询处理结果
///
/// `Blocked`（被验证拦住）和 `Empty`（页面上没有 PAA 组件）都意味着
/// 零结果，但调用方的升级策略只看前者，必须区分开。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// 按展开顺序采到的问答对（可能为空列表）
    Harvested(Vec<QaPair>),
    /// 页面正常但没有 PAA 组件
    Empty,
    /// 被验证拦截且未能解决
    Blocked,
}

/// 单查询处理流程
pub struct QueryFlow {
    budget: ClickBudget,
    pacing: Pacing,
    navigation_timeout: Duration,
    container_wait: Duration,
    resolver: CaptchaResolver,
}

impl QueryFlow {
    /// 创建新的查询处理流程
    pub fn new(config: &Config) -> Self {
        Self {
            budget: ClickBudget::new(config.max_clicks, config.scan_slack),
            pacing: Pacing::new(
                config.answer_wait_min_ms,
                config.answer_wait_max_ms,
                1000,
            ),
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            container_wait: Duration::from_secs(config.container_wait_secs),
            resolver: CaptchaResolver::new(
                config.captcha_api_key.clone(),
                config.captcha_service.clone(),
                Duration::from_secs(config.manual_captcha_timeout_secs),
            ),
        }
    }

    /// 处理单个查询
    pub async fn run(&self, executor: &JsExecutor, ctx: &QueryCtx) -> Result<QueryOutcome> {
        let url = ctx.search_url();
        self.navigate(executor, &url).await?;
        sleep(extract_loop::jitter(SETTLE_WAIT_MS.0, SETTLE_WAIT_MS.1)).await;

        // 验证探测必须先于容器定位：被拦截的页面上找什么都是白找
        if challenge::is_challenged(executor).await {
            warn!("{} ⚠️ 检测到验证页面", ctx);
            if !self.resolver.resolve(executor).await {
                return Ok(QueryOutcome::Blocked);
            }
        }

        let Some(container) =
            locator::locate(executor.page(), SelectorRole::Container, self.container_wait).await
        else {
            warn!("{} 页面上没有 PAA 组件", ctx);
            return Ok(QueryOutcome::Empty);
        };

        info!("{} ✓ 定位到 PAA 组件，开始展开采集", ctx);

        let widget = LivePaaWidget::new(container);
        let pairs = click_and_extract(&widget, &self.budget, &self.pacing).await?;

        Ok(QueryOutcome::Harvested(pairs))
    }

    /// 带超时的导航（超时是可恢复错误，调用方按零结果处理该查询）
    async fn navigate(&self, executor: &JsExecutor, url: &str) -> Result<()> {
        let page = executor.page();
        let navigation = async {
            page.goto(url)
                .await
                .map_err(|e| AppError::navigation_failed(url, e))?;
            page.wait_for_navigation()
                .await
                .map_err(|e| AppError::navigation_failed(url, e))?;
            Ok::<(), AppError>(())
        };

        tokio::time::timeout(self.navigation_timeout, navigation)
            .await
            .map_err(|_| {
                AppError::navigation_timeout(url, self.navigation_timeout.as_secs())
            })??;

        Ok(())
    }
}
