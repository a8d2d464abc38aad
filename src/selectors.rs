//! 选择器注册表
//!
//! PAA 组件各逻辑角色对应的 CSS 选择器，集中在此维护。
//! 每个角色是一个有序候选列表：首项是当前已知的精确匹配（2026-02 实测有效），
//! 后续是目标页面改版后的降级匹配。解析时按声明顺序逐个尝试，首个命中即生效。
//!
//! 目标页面的标记由第三方控制、随时可能变动，选择器失效属于正常运行条件。

/// 逻辑角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorRole {
    /// PAA 组件根容器
    Container,
    /// 单个问答对容器
    Pair,
    /// 问题文本元素
    QuestionText,
    /// 答案文本元素
    AnswerText,
    /// 展开按钮
    ExpandControl,
}

impl SelectorRole {
    /// 取该角色的候选选择器列表（有序，非空）
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            SelectorRole::Container => &[
                "div[jsname='N760b']",
                // 降级：jsname 变更后的宽松匹配
                "div[data-initq]",
                "div[jscontroller='PoEVuc']",
            ],
            SelectorRole::Pair => &[
                "div[jsname='yEVEwb']",
                // 降级：旧版问答对容器
                "div[jsname='Cpkphb']",
            ],
            SelectorRole::QuestionText => &["div[jsname='tJHJj']"],
            SelectorRole::AnswerText => &["div[jsname='NRdf4c']"],
            SelectorRole::ExpandControl => &["div[jsname='pcRaIe']"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_has_candidates() {
        let roles = [
            SelectorRole::Container,
            SelectorRole::Pair,
            SelectorRole::QuestionText,
            SelectorRole::AnswerText,
            SelectorRole::ExpandControl,
        ];
        for role in roles {
            assert!(!role.candidates().is_empty());
        }
    }

    #[test]
    fn container_primary_is_exact_jsname_match() {
        assert_eq!(SelectorRole::Container.candidates()[0], "div[jsname='N760b']");
    }
}
