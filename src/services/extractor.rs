//! 问答对提取服务 - 业务能力层
//!
//! 在单个问答对容器范围内读取问题和答案文本。
//! 只读操作，可对同一元素反复调用；元素缺失一律产出空字符串，不报错。

use chromiumoxide::Element;

use crate::models::QaPair;
use crate::selectors::SelectorRole;

/// 从单个问答对容器提取问题和答案
///
/// 点击前答案尚未渲染时 `answer` 为空串，属于正常状态
pub async fn extract_pair(pair: &Element) -> QaPair {
    QaPair {
        question: text_for_role(pair, SelectorRole::QuestionText).await,
        answer: text_for_role(pair, SelectorRole::AnswerText).await,
    }
}

/// 在容器范围内按角色候选列表读取文本，全部未命中返回空串
async fn text_for_role(scope: &Element, role: SelectorRole) -> String {
    for &selector in role.candidates() {
        if let Ok(element) = scope.find_element(selector).await {
            let text = normalize_text(element.inner_text().await.ok().flatten());
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

/// 整理原始文本：None 视为空，去除首尾空白
pub fn normalize_text(raw: Option<String>) -> String {
    raw.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// 取整段文本的第一行（问题元素为空时的兜底）
pub fn first_line(text: &str) -> String {
    text.trim().lines().next().unwrap_or("").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_defaults() {
        assert_eq!(normalize_text(Some("  问题？  \n".to_string())), "问题？");
        assert_eq!(normalize_text(None), "");
        assert_eq!(normalize_text(Some("   ".to_string())), "");
    }

    #[test]
    fn first_line_of_block() {
        assert_eq!(first_line("第一行\n第二行\n第三行"), "第一行");
        assert_eq!(first_line("\n  只有一行  "), "只有一行");
        assert_eq!(first_line(""), "");
    }
}
