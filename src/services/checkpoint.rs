//! 检查点服务 - 业务能力层
//!
//! 把已完成的查询和累计结果落盘，供 --resume 在中断后继续。
//! 损坏的检查点按空进度处理，不让历史文件拖垮新批次。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::models::QueryRecord;

/// 检查点文件内容
#[derive(Debug, Serialize, Deserialize)]
struct CheckpointData {
    done: Vec<String>,
    results: Vec<QueryRecord>,
    timestamp: String,
}

/// 检查点存储
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// 保存当前进度
    pub async fn save(&self, done: &HashSet<String>, results: &[QueryRecord]) -> Result<()> {
        let data = CheckpointData {
            done: done.iter().cloned().collect(),
            results: results.to_vec(),
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };

        let json = serde_json::to_string_pretty(&data)?;
        fs::write(&self.path, json)
            .await
            .with_context(|| format!("无法写入检查点: {}", self.path.display()))?;

        Ok(())
    }

    /// 加载进度
    ///
    /// # 返回
    /// 返回 (已完成查询集合, 历史结果)；文件缺失或损坏时返回空进度
    pub async fn load(&self) -> (HashSet<String>, Vec<QueryRecord>) {
        if !self.path.exists() {
            return (HashSet::new(), Vec::new());
        }

        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("检查点读取失败: {}", e);
                return (HashSet::new(), Vec::new());
            }
        };

        match serde_json::from_str::<CheckpointData>(&content) {
            Ok(data) => {
                info!(
                    "检查点已加载: {} 个查询，{} 条结果",
                    data.done.len(),
                    data.results.len()
                );
                (data.done.into_iter().collect(), data.results)
            }
            Err(e) => {
                warn!("检查点损坏: {}", e);
                (HashSet::new(), Vec::new())
            }
        }
    }

    /// 删除检查点（批次完整跑完后调用）
    pub async fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path).await {
                warn!("删除检查点失败: {}", e);
            }
        }
    }
}
