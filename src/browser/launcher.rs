//! 浏览器启动
//!
//! 以反自动化检测配置启动 Chromium，整个批次复用同一个浏览器和页面

use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::AppError;

/// 启动浏览器并创建初始页面
pub async fn launch_browser(config: &Config) -> Result<(Browser, Page)> {
    info!("🚀 启动浏览器 (headless: {})...", config.headless);

    let lang_arg = format!("--lang={}", config.locale.hl);
    let ua_arg = format!("--user-agent={}", config.user_agent);

    let mut builder = BrowserConfig::builder().args(vec![
        "--start-maximized",
        "--disable-blink-features=AutomationControlled",
        "--disable-dev-shm-usage",
        "--no-sandbox",
        lang_arg.as_str(),
        ua_arg.as_str(),
    ]);

    if !config.headless {
        builder = builder.with_head();
    }

    let browser_config = builder.build().map_err(|e| {
        error!("配置浏览器失败: {}", e);
        anyhow::anyhow!("配置浏览器失败: {}", e)
    })?;

    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        AppError::browser_launch_failed(e)
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        e
    })?;

    // 抹掉 navigator.webdriver 特征
    page.evaluate("Object.defineProperty(navigator, 'webdriver', {get: () => undefined})")
        .await?;

    info!("✅ 浏览器就绪");

    Ok((browser, page))
}
