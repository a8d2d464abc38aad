//! Cookie 同意处理服务 - 业务能力层
//!
//! 欧盟地区首次打开会弹 cookie 同意层，整个批次只需要处理一次。
//! 弹层不存在是正常情况（非欧盟出口 IP）。

use chromiumoxide::Page;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// 同意按钮候选选择器（首项为当前样式，后续为旧版降级）
const CONSENT_SELECTORS: &[&str] = &[
    "div.QS5gu.sy4vM",
    "button#L2AGLb",
    "button[jsname='b3VHJd']",
];

/// 单个候选的等待上限
const CONSENT_WAIT: Duration = Duration::from_secs(4);

/// 尝试点掉 cookie 同意弹层
///
/// # 返回
/// 返回是否点击了同意按钮
pub async fn accept_cookies(page: &Page) -> bool {
    for &selector in CONSENT_SELECTORS {
        let Some(button) =
            crate::services::locator::probe_selectors(page, &[selector], CONSENT_WAIT).await
        else {
            continue;
        };

        if button.click().await.is_ok() {
            sleep(Duration::from_secs(1)).await;
            info!("✓ Cookie 同意已接受 ({})", selector);
            return true;
        }
        // 点击失败就试下一个候选
    }

    debug!("未检测到 cookie 同意弹层");
    false
}
