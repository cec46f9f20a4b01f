//! 数字规范化语法
//!
//! 每条语法都是由纯构造函数生成的不可变值，依赖（其他语法）显式传入。
//!
//! ## 组成
//! 1. cardinal：单个数字读法 + 基数形状过滤
//! 2. decimal：小数形状过滤 ∘ 改写图，输出 integer_part / fractional_part
//! 3. decimal_phrase：在 decimal 外层补充 negative / quantity 字段

mod cardinal;
mod decimal;
mod decimal_phrase;
pub mod rules;

pub use cardinal::{CardinalFst, CardinalGrammar};
pub use decimal::{DecimalFst, SELF_CHECK_EXPECTED, SELF_CHECK_INPUT};
pub use decimal_phrase::DecimalPhraseFst;

use serde::{Deserialize, Serialize};

use crate::fst::{rewrite, Fst};

/// 语法类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammarKind {
    /// 分类：原文 -> 带标签的中间表示
    Classify,
}

impl GrammarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrammarKind::Classify => "classify",
        }
    }
}

/// 语法基类：身份标签 + 最终 FST
#[derive(Debug, Clone)]
pub struct GraphFst {
    name: &'static str,
    kind: GrammarKind,
    deterministic: bool,
    fst: Fst,
}

impl GraphFst {
    pub fn new(name: &'static str, kind: GrammarKind, deterministic: bool) -> Self {
        Self {
            name,
            kind,
            deterministic,
            fst: Fst::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> GrammarKind {
        self.kind
    }

    pub fn deterministic(&self) -> bool {
        self.deterministic
    }

    pub fn fst(&self) -> &Fst {
        &self.fst
    }

    pub(crate) fn set_fst(&mut self, fst: Fst) {
        self.fst = fst;
    }

    /// 统一的 token 包装：`<name> { ` + fst + ` }`
    pub fn add_tokens(&self, fst: Fst) -> Fst {
        Fst::insert(&format!("{} {{ ", self.name)) + fst + Fst::insert(" }")
    }

    /// 用最终 FST 改写输入；不匹配返回 None
    pub fn classify(&self, input: &str) -> Option<String> {
        rewrite::top_rewrite(input, &self.fst)
    }
}

/// 数字字符类 `[0-9]`
pub fn digit() -> Fst {
    Fst::char_class('0'..='9')
}

/// 插入单个空格
pub fn insert_space() -> Fst {
    Fst::insert(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_tokens_envelope() {
        let graph = GraphFst::new("money", GrammarKind::Classify, true);
        let wrapped = graph.add_tokens(Fst::cross("$", "currency: \"dollar\""));
        assert_eq!(
            rewrite::top_rewrite("$", &wrapped).as_deref(),
            Some("money { currency: \"dollar\" }")
        );
    }

    #[test]
    fn test_grammar_kind_serde() {
        assert_eq!(GrammarKind::Classify.as_str(), "classify");
        let json = serde_json::to_string(&GrammarKind::Classify).unwrap();
        assert_eq!(json, "\"classify\"");
    }

    #[test]
    fn test_digit_class() {
        let fst = digit();
        assert!(fst.accepts("0"));
        assert!(fst.accepts("9"));
        assert!(!fst.accepts("a"));
        assert!(!fst.accepts("12"));
    }
}
