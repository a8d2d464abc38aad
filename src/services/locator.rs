//! 容器定位服务 - 业务能力层
//!
//! 按角色的候选选择器列表逐个探测页面，首个命中即返回。
//! 每个候选的探测是"短轮询 + 时限"的显式等待，不是固定睡眠。
//! 全部候选失效是正常结果（本次查询页面上没有 PAA 组件），返回 None 而非报错。

use chromiumoxide::{Element, Page};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::selectors::SelectorRole;

/// 轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 按角色定位元素
///
/// # 参数
/// - `page`: 页面对象
/// - `role`: 逻辑角色
/// - `timeout`: 单个候选选择器的等待上限
///
/// # 返回
/// 返回首个命中的元素；全部候选失效返回 None
pub async fn locate(page: &Page, role: SelectorRole, timeout: Duration) -> Option<Element> {
    for &selector in role.candidates() {
        if let Some(element) = probe_one(page, selector, timeout).await {
            debug!("{:?} 命中选择器: {}", role, selector);
            return Some(element);
        }
        debug!("{:?} 候选未命中: {}", role, selector);
    }
    None
}

/// 对选择器列表逐个做限时探测，返回首个命中的元素
pub async fn probe_selectors(
    page: &Page,
    selectors: &[&str],
    timeout: Duration,
) -> Option<Element> {
    for &selector in selectors {
        if let Some(element) = probe_one(page, selector, timeout).await {
            return Some(element);
        }
    }
    None
}

/// 限时轮询单个选择器
async fn probe_one(page: &Page, selector: &str, timeout: Duration) -> Option<Element> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(element) = page.find_element(selector).await {
            return Some(element);
        }
        if Instant::now() >= deadline {
            return None;
        }
        sleep(POLL_INTERVAL).await;
    }
}
