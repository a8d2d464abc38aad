//! 验证挑战探测服务 - 业务能力层
//!
//! 根据 URL 特征和页面源码片段判断当前页面是否被反自动化验证拦截。
//! 纯判定，不做任何解决动作。

use tracing::debug;

use crate::infrastructure::JsExecutor;

/// 源码嗅探的截断长度（字符）
const SNIFF_CHARS: usize = 5000;

/// 纯分类函数：URL 或源码片段带验证特征即视为被拦截
pub fn classify(url: &str, source_snippet: &str) -> bool {
    let url = url.to_lowercase();
    if url.contains("sorry/index") || url.contains("/recaptcha/") {
        return true;
    }
    let snippet = source_snippet.to_lowercase();
    snippet.contains("unusual traffic") || snippet.contains("captcha")
}

/// 检查当前页面是否被验证拦截
///
/// 读取失败时按"未拦截"处理（与零结果路径合流，不阻塞批次）
pub async fn is_challenged(executor: &JsExecutor) -> bool {
    let url = match executor.current_url().await {
        Ok(url) => url.unwrap_or_default(),
        Err(e) => {
            debug!("读取页面 URL 失败: {}", e);
            String::new()
        }
    };

    let snippet = match executor.page_source_snippet(SNIFF_CHARS).await {
        Ok(snippet) => snippet,
        Err(e) => {
            debug!("读取页面源码失败: {}", e);
            String::new()
        }
    };

    classify(&url, &snippet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorry_url_is_challenged() {
        assert!(classify("https://www.google.com/sorry/index?continue=x", ""));
        assert!(classify("https://www.google.com/recaptcha/api2/demo", ""));
    }

    #[test]
    fn unusual_traffic_text_is_challenged() {
        let snippet = "<html>Our systems have detected Unusual Traffic from your network";
        assert!(classify("https://www.google.com/search?q=x", snippet));
    }

    #[test]
    fn plain_result_page_is_clear() {
        let snippet = "<html><div id=\"search\">ordinary results</div>";
        assert!(!classify("https://www.google.com/search?q=x", snippet));
    }

    #[test]
    fn empty_signals_are_clear() {
        assert!(!classify("", ""));
    }
}
