//! 查询处理上下文
//!
//! 封装"我正在处理第几个查询、用什么语言地区"这一信息

use std::fmt::Display;

use crate::models::LocaleParams;

/// 查询处理上下文
#[derive(Debug, Clone)]
pub struct QueryCtx {
    /// 查询文本
    pub query: String,

    /// 查询序号（从 1 开始，仅用于日志显示）
    pub query_index: usize,

    /// 批次内查询总数
    pub total: usize,

    /// 语言/地区参数
    pub locale: LocaleParams,
}

impl QueryCtx {
    /// 创建新的查询上下文
    pub fn new(query: String, query_index: usize, total: usize, locale: LocaleParams) -> Self {
        Self {
            query,
            query_index,
            total,
            locale,
        }
    }

    /// 组装搜索结果页 URL
    pub fn search_url(&self) -> String {
        format!(
            "https://www.google.com/search?q={}&hl={}&gl={}",
            urlencoding::encode(&self.query),
            self.locale.hl,
            self.locale.gl
        )
    }
}

impl Display for QueryCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[查询 {}/{}] '{}'", self.query_index, self.total, self.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_is_percent_encoded() {
        let ctx = QueryCtx::new(
            "rust 异步 & await".to_string(),
            1,
            1,
            LocaleParams::new("ru", "ru"),
        );
        let url = ctx.search_url();
        assert!(url.starts_with("https://www.google.com/search?q="));
        assert!(url.ends_with("&hl=ru&gl=ru"));
        assert!(!url.contains(' '));
        assert!(!url.contains("q=rust 异步"));
    }
}
