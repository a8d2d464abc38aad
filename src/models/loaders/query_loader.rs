//! 查询文件加载器
//!
//! 从纯文本文件读取待处理的搜索查询：每行一个，支持 `#` 注释行

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从文件加载查询列表
///
/// # 参数
/// - `path`: 查询文件路径
///
/// # 返回
/// 返回去除空行和注释行后的查询列表（保持文件内顺序）
pub async fn load_queries(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();

    if !path.exists() {
        anyhow::bail!("查询文件不存在: {}", path.display());
    }

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取查询文件: {}", path.display()))?;

    let queries: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    tracing::info!("从 {} 加载了 {} 个查询", path.display(), queries.len());

    Ok(queries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn skips_comments_and_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# 注释行").unwrap();
        writeln!(file, "rust 异步编程").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  how to learn rust  ").unwrap();

        let queries = load_queries(file.path()).await.unwrap();
        assert_eq!(queries, vec!["rust 异步编程", "how to learn rust"]);
    }

    #[tokio::test]
    async fn missing_file_is_error() {
        assert!(load_queries("no_such_queries.txt").await.is_err());
    }
}
