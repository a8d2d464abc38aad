use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::cli::Args;
use crate::error::{AppError, ConfigError};
use crate::models::LocaleParams;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 查询文件路径（每行一个查询）
    pub queries_file: String,
    /// 导出文件路径（.csv 或 .json）
    pub output_file: String,
    /// 检查点文件路径
    pub checkpoint_file: String,
    /// 运行日志文件
    pub output_log_file: String,
    /// 语言/地区参数
    pub locale: LocaleParams,
    /// 每个查询的最大接受点击数
    pub max_clicks: usize,
    /// 扫描余量：容忍展开失败的额外槽位数
    pub scan_slack: usize,
    /// 无头模式
    pub headless: bool,
    /// 从检查点继续
    pub resume: bool,
    /// 点击后等待答案渲染的抖动窗口（毫秒）
    pub answer_wait_min_ms: u64,
    pub answer_wait_max_ms: u64,
    /// 查询之间的停顿窗口（秒）
    pub pause_min_secs: f64,
    pub pause_max_secs: f64,
    /// 单次导航超时（秒）
    pub navigation_timeout_secs: u64,
    /// 定位 PAA 容器的单个候选选择器等待上限（秒）
    pub container_wait_secs: u64,
    /// 等待人工解决验证的上限（秒）
    pub manual_captcha_timeout_secs: u64,
    /// 连续被验证拦截多少个查询后中止整批
    pub max_consecutive_challenges: usize,
    /// 打码服务 API 密钥（留空则只等人工解决）
    pub captcha_api_key: String,
    /// 打码服务名称（2captcha / rucaptcha / capguru）
    pub captcha_service: String,
    /// 浏览器 User-Agent
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queries_file: "queries.txt".to_string(),
            output_file: "results.csv".to_string(),
            checkpoint_file: ".checkpoint.json".to_string(),
            output_log_file: "output.txt".to_string(),
            locale: LocaleParams::default(),
            max_clicks: 15,
            scan_slack: 15,
            headless: false,
            resume: false,
            answer_wait_min_ms: 1200,
            answer_wait_max_ms: 2200,
            pause_min_secs: 10.0,
            pause_max_secs: 20.0,
            navigation_timeout_secs: 30,
            container_wait_secs: 6,
            manual_captcha_timeout_secs: 300,
            max_consecutive_challenges: 3,
            captcha_api_key: String::new(),
            captcha_service: "2captcha".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// 配置文件（TOML）中允许出现的字段，全部可选
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub queries_file: Option<String>,
    pub output_file: Option<String>,
    pub hl: Option<String>,
    pub gl: Option<String>,
    pub max_clicks: Option<usize>,
    pub scan_slack: Option<usize>,
    pub headless: Option<bool>,
    pub answer_wait_min_ms: Option<u64>,
    pub answer_wait_max_ms: Option<u64>,
    pub pause_min_secs: Option<f64>,
    pub pause_max_secs: Option<f64>,
    pub navigation_timeout_secs: Option<u64>,
    pub max_consecutive_challenges: Option<usize>,
    pub captcha_api_key: Option<String>,
    pub captcha_service: Option<String>,
    pub user_agent: Option<String>,
}

impl Config {
    /// 从环境变量读取配置（未设置的项保持默认值）
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            queries_file: std::env::var("PAA_QUERIES_FILE").unwrap_or(default.queries_file),
            output_file: std::env::var("PAA_OUTPUT_FILE").unwrap_or(default.output_file),
            captcha_api_key: std::env::var("CAPTCHA_API_KEY").unwrap_or(default.captcha_api_key),
            captcha_service: std::env::var("CAPTCHA_SERVICE").unwrap_or(default.captcha_service),
            max_clicks: std::env::var("PAA_MAX_CLICKS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_clicks),
            headless: std::env::var("PAA_HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            ..default
        }
    }

    /// 加载最终配置：默认值 ← 环境变量 ← TOML 配置文件 ← 命令行参数
    pub fn load(args: &Args) -> Result<Self> {
        let mut config = Self::from_env();

        let config_path = args.config.as_deref().unwrap_or("paa_collector.toml");
        if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("无法读取配置文件: {}", config_path))?;
            let file: ConfigFile = toml::from_str(&content)
                .with_context(|| format!("无法解析配置文件: {}", config_path))?;
            config.apply_file(file);
        }

        config.apply_cli(args)?;

        if config.pause_max_secs < config.pause_min_secs {
            config.pause_max_secs = config.pause_min_secs;
        }
        if config.answer_wait_max_ms < config.answer_wait_min_ms {
            config.answer_wait_max_ms = config.answer_wait_min_ms;
        }

        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(v) = file.queries_file {
            self.queries_file = v;
        }
        if let Some(v) = file.output_file {
            self.output_file = v;
        }
        if let Some(v) = file.hl {
            self.locale.hl = v;
        }
        if let Some(v) = file.gl {
            self.locale.gl = v;
        }
        if let Some(v) = file.max_clicks {
            self.max_clicks = v;
        }
        if let Some(v) = file.scan_slack {
            self.scan_slack = v;
        }
        if let Some(v) = file.headless {
            self.headless = v;
        }
        if let Some(v) = file.answer_wait_min_ms {
            self.answer_wait_min_ms = v;
        }
        if let Some(v) = file.answer_wait_max_ms {
            self.answer_wait_max_ms = v;
        }
        if let Some(v) = file.pause_min_secs {
            self.pause_min_secs = v;
        }
        if let Some(v) = file.pause_max_secs {
            self.pause_max_secs = v;
        }
        if let Some(v) = file.navigation_timeout_secs {
            self.navigation_timeout_secs = v;
        }
        if let Some(v) = file.max_consecutive_challenges {
            self.max_consecutive_challenges = v;
        }
        if let Some(v) = file.captcha_api_key {
            self.captcha_api_key = v;
        }
        if let Some(v) = file.captcha_service {
            self.captcha_service = v;
        }
        if let Some(v) = file.user_agent {
            self.user_agent = v;
        }
    }

    fn apply_cli(&mut self, args: &Args) -> Result<()> {
        if let Some(v) = &args.input {
            self.queries_file = v.clone();
        }
        if let Some(v) = &args.output {
            self.output_file = v.clone();
        }
        if let Some(v) = &args.locale {
            self.locale = LocaleParams::parse(v).ok_or_else(|| {
                AppError::Config(ConfigError::InvalidLocale { value: v.clone() })
            })?;
        }
        // --hl / --gl 优先于 --locale 预设
        if let Some(v) = &args.hl {
            self.locale.hl = v.clone();
        }
        if let Some(v) = &args.gl {
            self.locale.gl = v.clone();
        }
        if let Some(v) = args.clicks {
            self.max_clicks = v;
        }
        if args.headless {
            self.headless = true;
        }
        if args.resume {
            self.resume = true;
        }
        if let Some(v) = args.pause_min {
            self.pause_min_secs = v;
        }
        if let Some(v) = args.pause_max {
            self.pause_max_secs = v;
        }
        if let Some(v) = &args.captcha_key {
            self.captcha_api_key = v.clone();
        }
        if let Some(v) = &args.captcha_service {
            self.captcha_service = v.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_overlay() {
        let mut config = Config::default();
        let file: ConfigFile = toml::from_str(
            r#"
            max_clicks = 20
            hl = "ru"
            gl = "ru"
            headless = true
            "#,
        )
        .unwrap();
        config.apply_file(file);

        assert_eq!(config.max_clicks, 20);
        assert_eq!(config.locale.hl, "ru");
        assert!(config.headless);
        // 未出现的字段保持默认
        assert_eq!(config.scan_slack, 15);
    }

    #[test]
    fn pause_window_is_normalized() {
        let args = Args {
            pause_min: Some(30.0),
            pause_max: Some(5.0),
            ..Default::default()
        };
        let config = Config::load(&args).unwrap();
        assert!(config.pause_max_secs >= config.pause_min_secs);
    }
}
