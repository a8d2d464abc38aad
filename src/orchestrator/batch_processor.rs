//! 批量查询处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量查询的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、启动浏览器、创建 JsExecutor
//! 2. **批量加载**：读取查询文件，结合检查点算出剩余查询
//! 3. **顺序处理**：一个浏览器页面、一次一个查询、一次一次点击
//! 4. **安全阀**：连续被验证拦截达到阈值即中止整批（不是重试）
//! 5. **资源管理**：唯一持有 Browser 和 JsExecutor 的模块
//! 6. **进度保护**：定期落检查点，所有中止路径都先保存再退出
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个查询的细节，向下委托 QueryFlow
//! - **显式状态**：连续拦截计数装在 ChallengeGate 里随调用链传递，
//!   不放在模块级可变全局
//! - **中断粒度**：Ctrl-C 在查询之间生效，已采集的结果全部保留

use anyhow::Result;
use chromiumoxide::Browser;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::models::{load_queries, QueryRecord};
use crate::services::{checkpoint::CheckpointStore, consent, export};
use crate::utils::logging;
use crate::workflow::extract_loop::jitter;
use crate::workflow::{QueryCtx, QueryFlow, QueryOutcome};

/// 每处理多少个查询落一次检查点
const CHECKPOINT_EVERY: usize = 5;

/// 连续验证拦截计数器
///
/// 进程级状态，只在查询之间变动；达到阈值触发整批中止（安全阀）
#[derive(Debug)]
pub struct ChallengeGate {
    streak: usize,
    threshold: usize,
}

impl ChallengeGate {
    pub fn new(threshold: usize) -> Self {
        Self { streak: 0, threshold }
    }

    /// 记录一次被拦截的查询
    ///
    /// # 返回
    /// 返回是否应当中止整批
    pub fn record_blocked(&mut self) -> bool {
        self.streak += 1;
        self.streak >= self.threshold
    }

    /// 记录一次正常完成的查询（清零连击）
    pub fn record_clear(&mut self) {
        self.streak = 0;
    }

    pub fn streak(&self) -> usize {
        self.streak
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    executor: JsExecutor,
}

/// 批次统计
#[derive(Debug, Default)]
struct RunStats {
    total_queries: usize,
    processed: usize,
    pairs_total: usize,
    answered: usize,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)?;
        log_startup(&config);

        let (browser, page) = browser::launch_browser(&config).await?;
        let executor = JsExecutor::new(page);

        Ok(Self {
            config,
            _browser: browser,
            executor,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let queries = load_queries(&self.config.queries_file).await?;
        if queries.is_empty() {
            warn!("⚠️ 查询文件里没有有效查询，程序结束");
            return Ok(());
        }

        let store = CheckpointStore::new(&self.config.checkpoint_file);
        let (mut done, mut all_results) = if self.config.resume {
            store.load().await
        } else {
            (HashSet::new(), Vec::new())
        };

        let remaining: Vec<String> = queries
            .iter()
            .filter(|q| !done.contains(*q))
            .cloned()
            .collect();

        log_queries_loaded(queries.len(), remaining.len(), &self.config);

        if remaining.is_empty() {
            info!("所有查询都已处理过。");
            if !all_results.is_empty() {
                export::export_all(&all_results, &self.config.output_file).await?;
            }
            return Ok(());
        }

        // 先到首页处理一次 cookie 同意
        self.open_home_page().await;

        // Ctrl-C 在查询之间生效（不打断进行中的点击循环）
        let interrupted = Arc::new(AtomicBool::new(false));
        {
            let flag = interrupted.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    flag.store(true, Ordering::SeqCst);
                }
            });
        }

        // 跨查询的问题级去重
        let mut seen_questions: HashSet<String> =
            all_results.iter().map(|r| r.question.clone()).collect();

        let mut gate = ChallengeGate::new(self.config.max_consecutive_challenges);
        let flow = QueryFlow::new(&self.config);
        let mut aborted = false;

        for (i, query) in remaining.iter().enumerate() {
            if interrupted.load(Ordering::SeqCst) {
                warn!("收到中断信号，保存进度后退出...");
                aborted = true;
                break;
            }

            let ctx = QueryCtx::new(
                query.clone(),
                done.len() + 1,
                queries.len(),
                self.config.locale.clone(),
            );
            info!("{}", ctx);
            let started = Instant::now();

            // 单查询的任何意外错误都不掀翻整批：记日志、按零结果处理
            let outcome = match flow.run(&self.executor, &ctx).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("{} ❌ 处理过程中发生错误: {}", ctx, e);
                    QueryOutcome::Empty
                }
            };

            let pairs = match outcome {
                QueryOutcome::Blocked => {
                    warn!("{} ⚠️ 被验证拦截 (连续第 {} 次)", ctx, gate.streak() + 1);
                    if gate.record_blocked() {
                        error!(
                            "🛑 连续 {} 个查询被验证拦截，中止批次并保存进度。",
                            gate.streak()
                        );
                        aborted = true;
                        break;
                    }
                    Vec::new()
                }
                QueryOutcome::Empty => {
                    gate.record_clear();
                    Vec::new()
                }
                QueryOutcome::Harvested(pairs) => {
                    gate.record_clear();
                    pairs
                }
            };

            // 合并结果（对之前所有查询的问题去重）
            let harvested = pairs.len();
            let answered = pairs.iter().filter(|qa| !qa.answer.is_empty()).count();
            let mut new_count = 0;
            for qa in pairs {
                if seen_questions.insert(qa.question.clone()) {
                    all_results.push(QueryRecord::new(query.clone(), qa));
                    new_count += 1;
                }
            }

            info!(
                "  → {} 个问题（{} 个带答案），{} 个新增，{:.1}s",
                harvested,
                answered,
                new_count,
                started.elapsed().as_secs_f64()
            );

            done.insert(query.clone());

            if done.len() % CHECKPOINT_EVERY == 0 {
                if let Err(e) = store.save(&done, &all_results).await {
                    warn!("检查点保存失败: {}", e);
                }
            }

            // 查询之间的随机停顿
            if i < remaining.len() - 1 && !interrupted.load(Ordering::SeqCst) {
                let pause = jitter(
                    (self.config.pause_min_secs * 1000.0) as u64,
                    (self.config.pause_max_secs * 1000.0) as u64,
                );
                info!("  停顿 {:.0}s...", pause.as_secs_f64());
                sleep(pause).await;
            }
        }

        // 所有退出路径都先保存进度
        if let Err(e) = store.save(&done, &all_results).await {
            warn!("检查点保存失败: {}", e);
        }

        if !all_results.is_empty() {
            export::export_all(&all_results, &self.config.output_file).await?;
        }

        let stats = RunStats {
            total_queries: queries.len(),
            processed: done.len(),
            pairs_total: all_results.len(),
            answered: all_results.iter().filter(|r| !r.answer.is_empty()).count(),
        };
        print_final_stats(&stats, &self.config);

        // 只有整批顺利跑完才清掉检查点
        if !aborted && done.len() == queries.len() {
            store.clear().await;
        }

        Ok(())
    }

    /// 打开首页并处理 cookie 同意（整个批次只做一次）
    async fn open_home_page(&self) {
        let home_url = format!(
            "https://www.google.com/?hl={}&gl={}",
            self.config.locale.hl, self.config.locale.gl
        );
        let page = self.executor.page();
        if let Err(e) = page.goto(home_url.as_str()).await {
            warn!("打开首页失败: {}", e);
            return;
        }
        let _ = page.wait_for_navigation().await;
        sleep(Duration::from_secs(2)).await;
        consent::accept_cookies(page).await;
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - PAA 批量采集模式");
    info!(
        "📊 hl={} gl={} clicks={} headless={}",
        config.locale.hl, config.locale.gl, config.max_clicks, config.headless
    );
    if !config.captcha_api_key.is_empty() {
        info!("🔑 打码服务: {} (密钥已配置)", config.captcha_service);
    }
    info!("{}", "=".repeat(60));
}

fn log_queries_loaded(total: usize, remaining: usize, config: &Config) {
    info!("✓ 共 {} 个查询，剩余 {} 个待处理", total, remaining);
    if config.resume {
        info!("💡 已从检查点恢复进度");
    }
}

fn print_final_stats(stats: &RunStats, config: &Config) {
    let ratio = if stats.pairs_total > 0 {
        stats.answered * 100 / stats.pairs_total
    } else {
        0
    };
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!(
        "✅ 共 {} 个问题，{} 个带答案 ({}%)",
        stats.pairs_total, stats.answered, ratio
    );
    info!("📋 处理查询: {}/{}", stats.processed, stats.total_queries);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", config.output_log_file);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_aborts_at_threshold() {
        let mut gate = ChallengeGate::new(3);
        assert!(!gate.record_blocked());
        assert!(!gate.record_blocked());
        assert!(gate.record_blocked());
    }

    #[test]
    fn clear_resets_streak() {
        let mut gate = ChallengeGate::new(3);
        gate.record_blocked();
        gate.record_blocked();
        gate.record_clear();
        assert_eq!(gate.streak(), 0);
        // 重新计数，单次拦截不会中止
        assert!(!gate.record_blocked());
    }
}
