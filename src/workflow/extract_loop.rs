//! 增量点击采集循环 - 流程层核心
//!
//! 对单个查询的 PAA 组件反复执行"展开一个问题 → 立刻收割答案"：
//! 点击预算封顶、连续空扫记停滞、问题文本做去重键。
//!
//! 组件结构在两次读取之间随时会变（重渲染、异步插入、重排序），
//! 所以每一步都通过 [`PaaWidget`] 重新枚举，从不依赖上一轮的句柄。
//!
//! 收割用两级匹配：优先找与点击前问题文本完全一致的 pair，找不到时
//! 取扫描中遇到的最后一个"未见过且带答案"的 pair。页面上有多个组件
//! 同时渲染时，第二级可能把答案归到错误的问题上。这是已知的精度局限，
//! 换更激进的匹配会引入别的错配，维持现状。

use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::models::QaPair;

/// 连续多少次空扫后判定组件已耗尽
const STALL_THRESHOLD: usize = 3;

/// 点击预算
///
/// 循环最多扫描 `max_clicks + scan_slack` 个槽位（容忍展开失败的槽位），
/// 但接受的点击数永远不超过 `max_clicks`。
#[derive(Debug, Clone, Copy)]
pub struct ClickBudget {
    pub max_clicks: usize,
    pub scan_slack: usize,
}

impl Default for ClickBudget {
    fn default() -> Self {
        Self {
            max_clicks: 15,
            scan_slack: 15,
        }
    }
}

impl ClickBudget {
    pub fn new(max_clicks: usize, scan_slack: usize) -> Self {
        Self {
            max_clicks,
            scan_slack,
        }
    }

    /// 扫描槽位上限
    pub fn scan_limit(&self) -> usize {
        self.max_clicks + self.scan_slack
    }
}

/// 节奏控制
///
/// 点击后的等待做成随机抖动窗口：均匀的机械节奏容易被风控识别。
/// 测试里用 [`Pacing::zero`] 换成零延迟。
#[derive(Debug, Clone)]
pub struct Pacing {
    /// 点击后等答案渲染的窗口（毫秒）
    pub answer_wait_min_ms: u64,
    pub answer_wait_max_ms: u64,
    /// 空扫后等控件继续加载的时长（毫秒）
    pub rescan_wait_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            answer_wait_min_ms: 1200,
            answer_wait_max_ms: 2200,
            rescan_wait_ms: 1000,
        }
    }
}

impl Pacing {
    pub fn new(answer_wait_min_ms: u64, answer_wait_max_ms: u64, rescan_wait_ms: u64) -> Self {
        Self {
            answer_wait_min_ms,
            answer_wait_max_ms,
            rescan_wait_ms,
        }
    }

    /// 零延迟节奏（测试用）
    pub fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// 抽取一次答案等待时长
    pub fn answer_wait(&self) -> Duration {
        jitter(self.answer_wait_min_ms, self.answer_wait_max_ms)
    }

    pub fn rescan_wait(&self) -> Duration {
        Duration::from_millis(self.rescan_wait_ms)
    }
}

/// 在 [min_ms, max_ms] 内均匀抽一个时长
pub fn jitter(min_ms: u64, max_ms: u64) -> Duration {
    if max_ms <= min_ms {
        return Duration::from_millis(min_ms);
    }
    let ms = rand::thread_rng().gen_range(min_ms..=max_ms);
    Duration::from_millis(ms)
}

/// 采集循环眼中的 PAA 组件
///
/// 每个方法都代表一次全新的枚举：实现方不得缓存元素句柄。
#[async_trait]
pub trait PaaWidget {
    /// 当前可见的展开按钮数量
    async fn control_count(&self) -> Result<usize>;

    /// 读第 `index` 个 pair 容器的问题文本（带第一行兜底；越界返回空串）
    async fn question_at(&self, index: usize) -> Result<String>;

    /// 点击第 `index` 个展开按钮
    ///
    /// # 返回
    /// 返回点击是否成功（两种点击方式都失败算 false，不算错误）
    async fn click_control(&self, index: usize) -> Result<bool>;

    /// 枚举当前所有 pair 并提取问答文本
    async fn harvest_pairs(&self) -> Result<Vec<QaPair>>;
}

/// 对一个 PAA 组件执行增量点击采集
///
/// # 返回
/// 返回按展开顺序排列的问答对（近似页面顺序），同一问题只出现一次。
/// 问题一旦记录，答案不再被后续轮次覆盖。
pub async fn click_and_extract(
    widget: &(impl PaaWidget + Sync),
    budget: &ClickBudget,
    pacing: &Pacing,
) -> Result<Vec<QaPair>> {
    let mut results: Vec<QaPair> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut clicked = 0usize;
    let mut stall = 0usize;
    let mut index = 0usize;

    while index < budget.scan_limit() {
        if clicked >= budget.max_clicks {
            break;
        }

        let control_count = widget.control_count().await?;
        if index >= control_count {
            stall += 1;
            if stall > STALL_THRESHOLD {
                debug!("连续 {} 次空扫，组件已耗尽", stall);
                break;
            }
            // 控件可能仍在流式加载：原地等待后重扫同一槽位
            sleep(pacing.rescan_wait()).await;
            continue;
        }
        stall = 0;

        // 点击前先记下问题文本（点击后索引可能对不上）
        let pre_question = widget.question_at(index).await.unwrap_or_default();

        if !pre_question.is_empty() && seen.contains(&pre_question) {
            // 组件重渲染产生的重复槽位：跳过，不消耗点击预算
            debug!("槽位 {} 是重复问题，跳过: {}", index, pre_question);
            index += 1;
            continue;
        }

        if !widget.click_control(index).await.unwrap_or(false) {
            debug!("槽位 {} 点击失败，跳过", index);
            index += 1;
            continue;
        }

        clicked += 1;
        sleep(pacing.answer_wait()).await;

        // 点击后立刻收割：页面可能异步插入或重排 pair，
        // 同索引的 pair 不保证就是刚展开的那个
        let pairs = widget.harvest_pairs().await.unwrap_or_default();
        let mut best_question = pre_question.clone();
        let mut best_answer = String::new();

        for qa in &pairs {
            if qa.answer.is_empty() || qa.question.is_empty() {
                continue;
            }
            if qa.question == pre_question || pre_question.is_empty() {
                best_question = qa.question.clone();
                best_answer = qa.answer.clone();
                break;
            }
            if !seen.contains(&qa.question) {
                best_question = qa.question.clone();
                best_answer = qa.answer.clone();
            }
        }

        // 答案没等到照样记录（空答案是合法的部分结果）；
        // 问题文本彻底拿不到时放弃这条（没有去重键就没法记）
        if !best_question.is_empty() && !seen.contains(&best_question) {
            seen.insert(best_question.clone());
            results.push(QaPair {
                question: best_question,
                answer: best_answer,
            });
        }

        index += 1;
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockSlot {
        question: String,
        answer: String,
        clickable: bool,
    }

    impl MockSlot {
        fn new(question: &str, answer: &str) -> Self {
            Self {
                question: question.to_string(),
                answer: answer.to_string(),
                clickable: true,
            }
        }

        fn unclickable(question: &str, answer: &str) -> Self {
            Self {
                clickable: false,
                ..Self::new(question, answer)
            }
        }
    }

    /// 脚本化组件：答案在对应槽位被点击后才"渲染"出来
    struct MockWidget {
        slots: Vec<MockSlot>,
        clicked: Mutex<Vec<usize>>,
        harvest_override: Option<Vec<QaPair>>,
    }

    impl MockWidget {
        fn new(slots: Vec<MockSlot>) -> Self {
            Self {
                slots,
                clicked: Mutex::new(Vec::new()),
                harvest_override: None,
            }
        }

        fn with_harvest(mut self, pairs: Vec<QaPair>) -> Self {
            self.harvest_override = Some(pairs);
            self
        }

        fn click_count(&self) -> usize {
            self.clicked.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PaaWidget for MockWidget {
        async fn control_count(&self) -> Result<usize> {
            Ok(self.slots.len())
        }

        async fn question_at(&self, index: usize) -> Result<String> {
            Ok(self
                .slots
                .get(index)
                .map(|s| s.question.clone())
                .unwrap_or_default())
        }

        async fn click_control(&self, index: usize) -> Result<bool> {
            let Some(slot) = self.slots.get(index) else {
                return Ok(false);
            };
            if !slot.clickable {
                return Ok(false);
            }
            self.clicked.lock().unwrap().push(index);
            Ok(true)
        }

        async fn harvest_pairs(&self) -> Result<Vec<QaPair>> {
            if let Some(pairs) = &self.harvest_override {
                return Ok(pairs.clone());
            }
            let clicked = self.clicked.lock().unwrap();
            Ok(self
                .slots
                .iter()
                .enumerate()
                .map(|(i, slot)| QaPair {
                    question: slot.question.clone(),
                    answer: if clicked.contains(&i) {
                        slot.answer.clone()
                    } else {
                        String::new()
                    },
                })
                .collect())
        }
    }

    fn qa(question: &str, answer: &str) -> QaPair {
        QaPair {
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }

    #[tokio::test]
    async fn click_budget_is_never_exceeded() {
        let slots = (0..10).map(|i| MockSlot::new(&format!("Q{i}"), "A")).collect();
        let widget = MockWidget::new(slots);
        let budget = ClickBudget::new(3, 15);

        let results = click_and_extract(&widget, &budget, &Pacing::zero())
            .await
            .unwrap();

        assert_eq!(widget.click_count(), 3);
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn stall_stops_loop_when_widget_is_exhausted() {
        let slots = (0..5).map(|i| MockSlot::new(&format!("Q{i}"), "A")).collect();
        let widget = MockWidget::new(slots);
        let budget = ClickBudget::new(15, 15);

        let results = click_and_extract(&widget, &budget, &Pacing::zero())
            .await
            .unwrap();

        // 预算没用完，靠停滞计数退出
        assert_eq!(results.len(), 5);
        assert!(results.len() < budget.max_clicks);
    }

    #[tokio::test]
    async fn duplicate_question_slot_is_skipped() {
        let widget = MockWidget::new(vec![
            MockSlot::new("同一个问题", "答案一"),
            MockSlot::new("同一个问题", "答案二"),
            MockSlot::new("另一个问题", "答案三"),
        ]);

        let results = click_and_extract(&widget, &ClickBudget::default(), &Pacing::zero())
            .await
            .unwrap();

        assert_eq!(widget.click_count(), 2);
        assert_eq!(
            results,
            vec![qa("同一个问题", "答案一"), qa("另一个问题", "答案三")]
        );
    }

    #[tokio::test]
    async fn empty_answer_is_recorded_not_dropped() {
        // 答案在等待窗口内始终没渲染出来
        let widget = MockWidget::new(vec![MockSlot::new("悬而未决的问题", "")]);

        let results = click_and_extract(&widget, &ClickBudget::default(), &Pacing::zero())
            .await
            .unwrap();

        assert_eq!(results, vec![qa("悬而未决的问题", "")]);
    }

    #[tokio::test]
    async fn failed_click_skips_slot_without_spending_budget() {
        let widget = MockWidget::new(vec![
            MockSlot::new("Q0", "A0"),
            MockSlot::unclickable("Q1", "A1"),
            MockSlot::new("Q2", "A2"),
        ]);
        let budget = ClickBudget::new(2, 15);

        let results = click_and_extract(&widget, &budget, &Pacing::zero())
            .await
            .unwrap();

        assert_eq!(results, vec![qa("Q0", "A0"), qa("Q2", "A2")]);
    }

    #[tokio::test]
    async fn exact_pre_click_match_beats_unseen_candidate() {
        // 收割时页面已重排：未见过的 B 先出现，刚展开的 A 在后面
        let widget = MockWidget::new(vec![MockSlot::new("A", "")]).with_harvest(vec![
            qa("B", "B 的答案"),
            qa("A", "A 的答案"),
        ]);
        let budget = ClickBudget::new(1, 0);

        let results = click_and_extract(&widget, &budget, &Pacing::zero())
            .await
            .unwrap();

        assert_eq!(results, vec![qa("A", "A 的答案")]);
    }

    #[tokio::test]
    async fn unseen_candidate_wins_when_no_exact_match() {
        // 刚展开的问题在收割时已消失，采用未见过且带答案的候选
        let widget = MockWidget::new(vec![MockSlot::new("A", "")])
            .with_harvest(vec![qa("C", "C 的答案")]);
        let budget = ClickBudget::new(1, 0);

        let results = click_and_extract(&widget, &budget, &Pacing::zero())
            .await
            .unwrap();

        assert_eq!(results, vec![qa("C", "C 的答案")]);
    }

    #[tokio::test]
    async fn unresolvable_question_is_never_recorded() {
        // 问题文本所有兜底都拿不到：即使有答案也不记录（没有去重键）
        let widget = MockWidget::new(vec![MockSlot::new("", "暗答案")]);

        let results = click_and_extract(&widget, &ClickBudget::default(), &Pacing::zero())
            .await
            .unwrap();

        assert_eq!(widget.click_count(), 1);
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn emitted_questions_are_unique() {
        let widget = MockWidget::new(vec![
            MockSlot::new("Q0", "A0"),
            MockSlot::new("Q1", "A1"),
            MockSlot::new("Q0", "A0-bis"),
            MockSlot::new("Q2", ""),
            MockSlot::new("Q1", ""),
        ]);

        let results = click_and_extract(&widget, &ClickBudget::default(), &Pacing::zero())
            .await
            .unwrap();

        let mut questions: Vec<&str> = results.iter().map(|qa| qa.question.as_str()).collect();
        let before = questions.len();
        questions.sort_unstable();
        questions.dedup();
        assert_eq!(questions.len(), before);
    }

    #[tokio::test]
    async fn harvest_is_idempotent_on_unchanged_widget() {
        let widget = MockWidget::new(vec![
            MockSlot::new("Q0", "A0"),
            MockSlot::new("Q1", "A1"),
        ]);
        widget.click_control(0).await.unwrap();

        let first = widget.harvest_pairs().await.unwrap();
        let second = widget.harvest_pairs().await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn jitter_degenerate_window() {
        assert_eq!(jitter(500, 500), Duration::from_millis(500));
        assert_eq!(jitter(500, 100), Duration::from_millis(500));
    }

    #[test]
    fn scan_limit_is_budget_plus_slack() {
        assert_eq!(ClickBudget::new(15, 15).scan_limit(), 30);
        assert_eq!(ClickBudget::default().scan_limit(), 30);
    }
}
