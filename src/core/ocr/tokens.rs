use once_cell::sync::Lazy;
use regex::Regex;

/// 小数形式的倍数：点两侧都至少一位数字
static MULTIPLIER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\d+").expect("multiplier pattern is valid"));

/// 从识别文本中按出现顺序提取倍数
pub fn extract_multipliers(text: &str) -> Vec<f64> {
    MULTIPLIER_PATTERN
        .find_iter(text)
        .filter_map(|m| parse_multiplier(m.as_str()))
        .collect()
}

/// 解析失败直接丢弃，不区分原因
pub fn parse_multiplier(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}
