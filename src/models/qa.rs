//! 问答数据模型

use serde::{Deserialize, Serialize};

/// 单个"大家还在搜"问答对
///
/// `question` 是去重键（去除首尾空白，保留大小写）。
/// `answer` 允许为空：点击后答案未及时渲染时照样记录，属于合法的部分结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// 导出记录：问答对归属于哪个原始查询
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub query: String,
    pub question: String,
    pub answer: String,
}

impl QueryRecord {
    /// 由查询文本和问答对组装一条导出记录
    pub fn new(query: impl Into<String>, pair: QaPair) -> Self {
        Self {
            query: query.into(),
            question: pair.question,
            answer: pair.answer,
        }
    }
}
