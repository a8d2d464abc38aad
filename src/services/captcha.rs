//! 验证解决服务 - 业务能力层
//!
//! 被验证拦截后的两条出路：有 API 密钥时走打码服务（2captcha 协议，
//! rucaptcha / capguru 同协议仅换地址），否则等操作员在浏览器里人工解决。

use anyhow::Result;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::infrastructure::JsExecutor;
use crate::services::challenge;

/// 提交任务后的轮询间隔与次数（36 × 5 秒 = 最长 180 秒）
const POLL_INTERVAL: Duration = Duration::from_secs(5);
const POLL_ATTEMPTS: usize = 36;

/// 打码服务 API 错误
#[derive(Debug, thiserror::Error)]
pub enum CaptchaApiError {
    /// 页面上找不到 reCAPTCHA sitekey，只能人工解决
    #[error("页面上未找到 reCAPTCHA sitekey")]
    SitekeyNotFound,
    /// HTTP 请求失败
    #[error("打码服务请求失败: {0}")]
    Request(#[from] reqwest::Error),
    /// 服务端返回错误响应
    #[error("打码服务返回错误: {0}")]
    Service(String),
    /// 轮询超时，任务未在时限内解决
    #[error("等待打码结果超时")]
    PollTimeout,
}

/// 按服务名取 API 基地址（未知名称回落到 2captcha）
pub fn service_base(service: &str) -> &'static str {
    match service {
        "rucaptcha" => "http://rucaptcha.com",
        "capguru" => "http://api.cap.guru",
        _ => "http://2captcha.com",
    }
}

/// 验证解决器
pub struct CaptchaResolver {
    client: reqwest::Client,
    api_key: String,
    base: &'static str,
    service: String,
    manual_timeout: Duration,
}

impl CaptchaResolver {
    /// 创建新的验证解决器
    ///
    /// # 参数
    /// - `api_key`: 打码服务密钥，留空则只等人工解决
    /// - `service`: 服务名称（2captcha / rucaptcha / capguru）
    /// - `manual_timeout`: 人工解决的等待上限
    pub fn new(api_key: impl Into<String>, service: impl Into<String>, manual_timeout: Duration) -> Self {
        let service = service.into();
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base: service_base(&service),
            service,
            manual_timeout,
        }
    }

    /// 尝试解决当前页面的验证
    ///
    /// # 返回
    /// 返回验证是否已解除；任何内部失败都折算为 false，不向上抛错
    pub async fn resolve(&self, executor: &JsExecutor) -> bool {
        if !self.api_key.is_empty() {
            info!("尝试通过 {} 自动解决验证...", self.service);
            match self.solve_via_api(executor).await {
                Ok(true) => return true,
                Ok(false) => warn!("API 解决后页面仍被拦截，转人工..."),
                Err(e) => warn!("API 解决失败: {}，转人工...", e),
            }
        }

        self.wait_for_manual(executor).await
    }

    /// 等待操作员在浏览器中人工解决
    async fn wait_for_manual(&self, executor: &JsExecutor) -> bool {
        warn!("{}", "=".repeat(50));
        warn!("⚠️ 检测到验证页面！请在浏览器中人工解决。");
        warn!("最长等待 {} 秒...", self.manual_timeout.as_secs());
        warn!("{}", "=".repeat(50));

        let deadline = Instant::now() + self.manual_timeout;
        while Instant::now() < deadline {
            sleep(POLL_INTERVAL).await;
            if !challenge::is_challenged(executor).await {
                info!("✓ 验证已解决，继续采集");
                return true;
            }
        }

        warn!("等待人工解决超时");
        false
    }

    /// 通过打码 API 解决 reCAPTCHA v2
    async fn solve_via_api(&self, executor: &JsExecutor) -> Result<bool, CaptchaApiError> {
        let sitekey = find_sitekey(executor)
            .await
            .ok_or(CaptchaApiError::SitekeyNotFound)?;
        let page_url = executor
            .current_url()
            .await
            .ok()
            .flatten()
            .unwrap_or_default();

        info!("提交验证任务到 {} (sitekey: {}...)", self.service, truncated(&sitekey, 20));

        let task_id = self.submit_task(&sitekey, &page_url).await?;
        info!("任务已创建: {}", task_id);

        let token = self.poll_token(&task_id).await?;
        info!("✓ 打码服务返回 token");

        if let Err(e) = inject_token(executor, &token).await {
            warn!("注入 token 失败: {}", e);
            return Ok(false);
        }

        sleep(Duration::from_secs(3)).await;
        Ok(!challenge::is_challenged(executor).await)
    }

    /// 提交任务（in.php）
    async fn submit_task(&self, sitekey: &str, page_url: &str) -> Result<String, CaptchaApiError> {
        let response: JsonValue = self
            .client
            .post(format!("{}/in.php", self.base))
            .form(&[
                ("key", self.api_key.as_str()),
                ("method", "userrecaptcha"),
                ("googlekey", sitekey),
                ("pageurl", page_url),
                ("json", "1"),
            ])
            .timeout(Duration::from_secs(30))
            .send()
            .await?
            .json()
            .await?;

        if response.get("status").and_then(|v| v.as_u64()) != Some(1) {
            return Err(CaptchaApiError::Service(
                response
                    .get("request")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown")
                    .to_string(),
            ));
        }

        response
            .get("request")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| CaptchaApiError::Service("响应缺少任务 ID".to_string()))
    }

    /// 轮询任务结果（res.php），拿到 token 为止
    async fn poll_token(&self, task_id: &str) -> Result<String, CaptchaApiError> {
        for _ in 0..POLL_ATTEMPTS {
            sleep(POLL_INTERVAL).await;

            let response: JsonValue = match self
                .client
                .get(format!("{}/res.php", self.base))
                .query(&[
                    ("key", self.api_key.as_str()),
                    ("action", "get"),
                    ("id", task_id),
                    ("json", "1"),
                ])
                .timeout(Duration::from_secs(15))
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
            {
                Ok(resp) => match resp.json().await {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("打码结果解析失败: {}，继续轮询", e);
                        continue;
                    }
                },
                Err(e) => {
                    warn!("打码结果轮询失败: {}，继续轮询", e);
                    continue;
                }
            };

            if response.get("status").and_then(|v| v.as_u64()) == Some(1) {
                if let Some(token) = response.get("request").and_then(|v| v.as_str()) {
                    return Ok(token.to_string());
                }
            }

            match response.get("request").and_then(|v| v.as_str()) {
                Some("CAPCHA_NOT_READY") => continue,
                Some(other) => return Err(CaptchaApiError::Service(other.to_string())),
                None => continue,
            }
        }

        Err(CaptchaApiError::PollTimeout)
    }
}

/// 在页面上寻找 reCAPTCHA sitekey：先查属性，再用正则扫源码
async fn find_sitekey(executor: &JsExecutor) -> Option<String> {
    if let Ok(element) = executor.page().find_element("[data-sitekey]").await {
        if let Ok(Some(sitekey)) = element.attribute("data-sitekey").await {
            if !sitekey.is_empty() {
                return Some(sitekey);
            }
        }
    }

    let source = executor.page_source_snippet(usize::MAX).await.ok()?;
    extract_sitekey_from_source(&source)
}

/// 正则扫描页面源码中的 sitekey
fn extract_sitekey_from_source(source: &str) -> Option<String> {
    let attr_re = Regex::new(r#"data-sitekey="([^"]+)""#).ok()?;
    if let Some(cap) = attr_re.captures(source) {
        return Some(cap[1].to_string());
    }

    let js_re = Regex::new(r#"sitekey['"]?\s*[:=]\s*['"]([^'"]+)"#).ok()?;
    js_re.captures(source).map(|cap| cap[1].to_string())
}

/// 把 token 写进 g-recaptcha-response 并提交验证表单
async fn inject_token(executor: &JsExecutor, token: &str) -> Result<()> {
    let token_json = serde_json::to_string(token)?;
    let js_code = format!(
        r#"
        (() => {{
            const token = {token_json};
            let el = document.getElementById('g-recaptcha-response');
            if (!el) {{
                el = document.querySelector('[name="g-recaptcha-response"]');
            }}
            if (el) {{
                el.style.display = 'block';
                el.value = token;
            }}
            try {{
                const cb = document.querySelector('[data-callback]');
                if (cb) {{
                    const fn = cb.getAttribute('data-callback');
                    if (fn && window[fn]) window[fn](token);
                }}
            }} catch (e) {{}}
            const form = document.querySelector("form[action*='sorry']") || document.querySelector('form');
            if (form) form.submit();
            return true;
        }})()
        "#
    );

    executor.eval(js_code).await?;
    Ok(())
}

fn truncated(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_services_have_bases() {
        assert_eq!(service_base("2captcha"), "http://2captcha.com");
        assert_eq!(service_base("rucaptcha"), "http://rucaptcha.com");
        assert_eq!(service_base("capguru"), "http://api.cap.guru");
        // 未知名称回落到 2captcha
        assert_eq!(service_base("whatever"), "http://2captcha.com");
    }

    #[test]
    fn sitekey_from_attribute_markup() {
        let source = r#"<div class="g-recaptcha" data-sitekey="6LcAbcDeFgHiJkLm"></div>"#;
        assert_eq!(
            extract_sitekey_from_source(source).as_deref(),
            Some("6LcAbcDeFgHiJkLm")
        );
    }

    #[test]
    fn sitekey_from_inline_js() {
        let source = r#"grecaptcha.render(el, { sitekey: '6LcXyZ123' });"#;
        assert_eq!(extract_sitekey_from_source(source).as_deref(), Some("6LcXyZ123"));
    }

    #[test]
    fn missing_sitekey_is_none() {
        assert!(extract_sitekey_from_source("<html>nothing here</html>").is_none());
    }
}
