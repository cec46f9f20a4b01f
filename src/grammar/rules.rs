//! 语法规则数据
//!
//! 包含数字读法表、数量词白名单

use std::collections::BTreeSet;

/// 数字读法（数字, 读法）
pub const DIGIT_NAMES: [(&str, &str); 10] = [
    ("0", "zero"),
    ("1", "one"),
    ("2", "two"),
    ("3", "three"),
    ("4", "four"),
    ("5", "five"),
    ("6", "six"),
    ("7", "seven"),
    ("8", "eight"),
    ("9", "nine"),
];

/// 非确定模式下 "0" 的备选读法
pub const ZERO_ALTERNATIVE: (&str, &str) = ("0", "o");

/// 备选读法的惩罚权重，最优改写仍选标准读法
pub const ALTERNATIVE_PENALTY: f32 = 0.1;

/// 默认数量词
pub const DEFAULT_QUANTITIES: [&str; 5] = ["thousand", "million", "billion", "trillion", "quadrillion"];

/// 数量词白名单
///
/// 数量词原样透传，不做任何读法处理
#[derive(Debug, Clone)]
pub struct QuantityWords {
    words: BTreeSet<String>,
}

impl QuantityWords {
    pub fn new<S: AsRef<str>>(words: impl IntoIterator<Item = S>) -> Self {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// 检查是否为数量词（区分大小写，与语法一致）
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(|w| w.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for QuantityWords {
    fn default() -> Self {
        Self::new(DEFAULT_QUANTITIES)
    }
}
