//! PAA 组件的实时视图 - 业务能力层
//!
//! 把定位到的根容器包装成采集循环所需的组件接口。
//! 约定：页面结构随时会在两次读取之间变动，所以每次调用都重新枚举，
//! 绝不缓存上一轮拿到的元素句柄或索引。

use anyhow::Result;
use async_trait::async_trait;
use chromiumoxide::Element;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::models::QaPair;
use crate::selectors::SelectorRole;
use crate::services::extractor;
use crate::workflow::extract_loop::PaaWidget;

/// 滚动到位后、点击前的短暂停顿
const SCROLL_SETTLE: Duration = Duration::from_millis(200);

/// 实时 PAA 组件
pub struct LivePaaWidget {
    root: Element,
}

impl LivePaaWidget {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// 在根容器下按角色枚举元素：首个有命中的候选选择器生效
    async fn find_all(&self, role: SelectorRole) -> Vec<Element> {
        for selector in role.candidates() {
            if let Ok(elements) = self.root.find_elements(*selector).await {
                if !elements.is_empty() {
                    return elements;
                }
            }
        }
        Vec::new()
    }
}

#[async_trait]
impl PaaWidget for LivePaaWidget {
    async fn control_count(&self) -> Result<usize> {
        Ok(self.find_all(SelectorRole::ExpandControl).await.len())
    }

    async fn question_at(&self, index: usize) -> Result<String> {
        // 问题文本在 pair 容器里读（展开按钮本身是空元素）
        let pairs = self.find_all(SelectorRole::Pair).await;
        let Some(pair) = pairs.get(index) else {
            return Ok(String::new());
        };

        for selector in SelectorRole::QuestionText.candidates() {
            if let Ok(element) = pair.find_element(*selector).await {
                let text = extractor::normalize_text(element.inner_text().await.ok().flatten());
                if !text.is_empty() {
                    return Ok(text);
                }
            }
        }

        // 兜底：取 pair 全文的第一行
        let full_text = extractor::normalize_text(pair.inner_text().await.ok().flatten());
        Ok(extractor::first_line(&full_text))
    }

    async fn click_control(&self, index: usize) -> Result<bool> {
        let controls = self.find_all(SelectorRole::ExpandControl).await;
        let Some(control) = controls.get(index) else {
            return Ok(false);
        };

        if control.scroll_into_view().await.is_err() {
            debug!("槽位 {} 滚动失败", index);
        }
        sleep(SCROLL_SETTLE).await;

        // 优先 DOM 级激活，失败再退回模拟指针点击
        if control
            .call_js_fn("function() { this.click(); }", false)
            .await
            .is_ok()
        {
            return Ok(true);
        }
        debug!("槽位 {} DOM 点击失败，尝试指针点击", index);

        Ok(control.click().await.is_ok())
    }

    async fn harvest_pairs(&self) -> Result<Vec<QaPair>> {
        let pairs = self.find_all(SelectorRole::Pair).await;
        let mut out = Vec::with_capacity(pairs.len());
        for pair in &pairs {
            out.push(extractor::extract_pair(pair).await);
        }
        Ok(out)
    }
}
