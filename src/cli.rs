//! 命令行参数

use clap::Parser;

/// PAA 问答采集器：驱动真实浏览器，批量展开搜索结果页的
/// "大家还在搜" 问题并采集问答对
#[derive(Parser, Debug, Default)]
#[command(name = "paa_collector", version, about)]
pub struct Args {
    /// 查询文件（每行一个查询，# 开头为注释）
    #[arg(short, long)]
    pub input: Option<String>,

    /// 导出文件路径（.csv 或 .json）
    #[arg(short, long)]
    pub output: Option<String>,

    /// 语言/地区预设（如 ru、en-gb，或 "hl=de gl=at"）
    #[arg(long)]
    pub locale: Option<String>,

    /// 界面语言（覆盖 --locale）
    #[arg(long)]
    pub hl: Option<String>,

    /// 结果地区（覆盖 --locale）
    #[arg(long)]
    pub gl: Option<String>,

    /// 每个查询最多展开多少个问题
    #[arg(long)]
    pub clicks: Option<usize>,

    /// 无头模式（不显示浏览器窗口）
    #[arg(long)]
    pub headless: bool,

    /// 从检查点继续上次中断的批次
    #[arg(long)]
    pub resume: bool,

    /// 查询之间的最小停顿（秒）
    #[arg(long)]
    pub pause_min: Option<f64>,

    /// 查询之间的最大停顿（秒）
    #[arg(long)]
    pub pause_max: Option<f64>,

    /// 打码服务 API 密钥（也可用环境变量 CAPTCHA_API_KEY）
    #[arg(long)]
    pub captcha_key: Option<String>,

    /// 打码服务（2captcha / rucaptcha / capguru）
    #[arg(long)]
    pub captcha_service: Option<String>,

    /// TOML 配置文件路径
    #[arg(long)]
    pub config: Option<String>,
}
