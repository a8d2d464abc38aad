//! 导出服务 - 业务能力层
//!
//! 把采集结果写成 JSON 和 CSV 两种格式。写 CSV 时总是附带同名 JSON，
//! 避免表格工具对编码或引号处理不当时丢数据。

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::models::QueryRecord;

/// 导出 JSON
pub async fn export_json(results: &[QueryRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(results)?;
    fs::write(path, json)
        .await
        .with_context(|| format!("无法写入 JSON: {}", path.display()))?;

    info!("📄 JSON: {} ({} 条)", path.display(), results.len());
    Ok(())
}

/// 导出 CSV（RFC 4180 引号规则，UTF-8）
pub async fn export_csv(results: &[QueryRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    let mut out = String::from("query,question,answer\n");
    for record in results {
        out.push_str(&csv_escape(&record.query));
        out.push(',');
        out.push_str(&csv_escape(&record.question));
        out.push(',');
        out.push_str(&csv_escape(&record.answer));
        out.push('\n');
    }

    fs::write(path, out)
        .await
        .with_context(|| format!("无法写入 CSV: {}", path.display()))?;

    info!("📄 CSV: {} ({} 条)", path.display(), results.len());
    Ok(())
}

/// 按输出路径后缀导出：.json 只写 JSON，其余写 CSV + JSON 副本
pub async fn export_all(results: &[QueryRecord], output_path: &str) -> Result<()> {
    if output_path.ends_with(".json") {
        export_json(results, output_path).await?;
    } else {
        export_csv(results, output_path).await?;
        let json_path = Path::new(output_path).with_extension("json");
        export_json(results, &json_path).await?;
    }
    Ok(())
}

/// CSV 字段转义：含逗号/引号/换行的字段加引号，内部引号翻倍
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<QueryRecord> {
        vec![
            QueryRecord {
                query: "rust".to_string(),
                question: "What is \"ownership\", exactly?".to_string(),
                answer: "第一行\n第二行".to_string(),
            },
            QueryRecord {
                query: "rust".to_string(),
                question: "无答案的问题".to_string(),
                answer: String::new(),
            },
        ]
    }

    #[test]
    fn escape_rules() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("line1\nline2"), "\"line1\nline2\"");
    }

    #[tokio::test]
    async fn csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        export_csv(&sample(), &path).await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("query,question,answer"));
        // 空答案照常占位，不被丢弃
        assert!(content.contains("无答案的问题,"));
    }

    #[tokio::test]
    async fn json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        export_json(&sample(), &path).await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: Vec<QueryRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, sample());
    }

    #[tokio::test]
    async fn csv_output_writes_json_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        export_all(&sample(), path.to_str().unwrap()).await.unwrap();

        assert!(path.exists());
        assert!(dir.path().join("results.json").exists());
    }
}
