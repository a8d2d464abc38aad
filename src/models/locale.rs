//! 语言/地区参数
//!
//! hl 控制界面语言，gl 控制结果地区，两者共同决定搜索结果页的本地化形态

use serde::{Deserialize, Serialize};

/// 常用语言/地区预设
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalePreset {
    pub hl: &'static str,
    pub gl: &'static str,
    pub label: &'static str,
}

/// 预设表（键为简写代码）
pub static POPULAR_LOCALES: phf::Map<&'static str, LocalePreset> = phf::phf_map! {
    "ru" => LocalePreset { hl: "ru", gl: "ru", label: "Русский (Россия)" },
    "en" => LocalePreset { hl: "en", gl: "us", label: "English (US)" },
    "en-gb" => LocalePreset { hl: "en", gl: "gb", label: "English (UK)" },
    "de" => LocalePreset { hl: "de", gl: "de", label: "Deutsch" },
    "fr" => LocalePreset { hl: "fr", gl: "fr", label: "Français" },
    "es" => LocalePreset { hl: "es", gl: "es", label: "Español" },
    "it" => LocalePreset { hl: "it", gl: "it", label: "Italiano" },
    "pt" => LocalePreset { hl: "pt", gl: "br", label: "Português (Brasil)" },
    "tr" => LocalePreset { hl: "tr", gl: "tr", label: "Türkçe" },
    "pl" => LocalePreset { hl: "pl", gl: "pl", label: "Polski" },
    "uk" => LocalePreset { hl: "uk", gl: "ua", label: "Українська" },
    "kk" => LocalePreset { hl: "kk", gl: "kz", label: "Қазақша" },
};

/// 实际生效的语言/地区参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleParams {
    pub hl: String,
    pub gl: String,
}

impl Default for LocaleParams {
    fn default() -> Self {
        Self {
            hl: "en".to_string(),
            gl: "us".to_string(),
        }
    }
}

impl LocaleParams {
    pub fn new(hl: impl Into<String>, gl: impl Into<String>) -> Self {
        Self {
            hl: hl.into(),
            gl: gl.into(),
        }
    }

    /// 解析用户输入的语言/地区描述
    ///
    /// 支持三种形式：
    /// - 预设代码（如 "ru"、"en-gb"）
    /// - 手动指定（如 "hl=de gl=at"）
    /// - 裸语言代码（取前两位同时作为 hl 和 gl）
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            return None;
        }

        if let Some(preset) = POPULAR_LOCALES.get(input.as_str()) {
            return Some(Self::new(preset.hl, preset.gl));
        }

        if input.contains("hl=") || input.contains("gl=") {
            let mut hl = "en".to_string();
            let mut gl = "us".to_string();
            for part in input.split_whitespace() {
                if let Some(v) = part.strip_prefix("hl=") {
                    hl = v.to_string();
                } else if let Some(v) = part.strip_prefix("gl=") {
                    gl = v.to_string();
                }
            }
            return Some(Self { hl, gl });
        }

        let code: String = input.chars().take(2).collect();
        Some(Self::new(code.clone(), code))
    }
}
