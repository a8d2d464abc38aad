//! # PAA Collector
//!
//! 一个用于批量采集搜索结果页 "大家还在搜" (People Also Ask) 问答对的
//! Rust 应用程序：驱动真实浏览器，逐个展开问题组件并在点击后立刻读取
//! 答案，按查询输出 (查询, 问题, 答案) 记录。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() 和页面状态读取
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个动作
//! - `locator` - 按候选选择器列表定位 PAA 容器
//! - `extractor` - 从单个 pair 容器读问答文本
//! - `challenge` / `captcha` - 验证探测与解决
//! - `checkpoint` / `export` - 进度落盘与结果导出
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个查询"的完整处理流程
//! - `QueryCtx` - 上下文封装（查询文本 + 语言地区）
//! - `extract_loop` - 点击预算/停滞计数/去重的增量采集循环
//! - `QueryFlow` - 流程编排（导航 → 验证 → 定位 → 采集）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量查询处理器，管理资源、
//!   检查点、连续拦截安全阀和中断
//!
//! ## 模块结构

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod selectors;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::launch_browser;
pub use cli::Args;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::JsExecutor;
pub use models::{LocaleParams, QaPair, QueryRecord};
pub use orchestrator::App;
pub use selectors::SelectorRole;
pub use workflow::{ClickBudget, PaaWidget, Pacing, QueryCtx, QueryFlow, QueryOutcome};
