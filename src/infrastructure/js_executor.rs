//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"读页面、执行 JS"的能力

use anyhow::Result;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 和页面状态读取能力
/// - 不认识 Query / 问答对
/// - 不处理采集流程
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于元素查找等其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 当前页面 URL（页面尚未导航时为 None）
    pub async fn current_url(&self) -> Result<Option<String>> {
        Ok(self.page.url().await?)
    }

    /// 页面源码开头片段（按字符截断，用于特征嗅探）
    pub async fn page_source_snippet(&self, max_chars: usize) -> Result<String> {
        let content = self.page.content().await?;
        Ok(content.chars().take(max_chars).collect())
    }
}
