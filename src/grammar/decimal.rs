//! 小数分类语法
//!
//! 例：
//! - `123.01891` -> `integer_part: "one two three" fractional_part: "zero one eight nine one"`
//! - `.2345` -> `fractional_part: "two three four five"`
//!
//! 最终 FST 外层再包一层 `decimal { ... }`。

use anyhow::Result;

use crate::config::DecimalConfig;
use crate::fst::{rewrite, Fst};
use crate::grammar::cardinal::CardinalGrammar;
use crate::grammar::{digit, GrammarKind, GraphFst};

/// 构建时自检输入
pub const SELF_CHECK_INPUT: &str = "123.01891";

/// 构建时自检期望输出
pub const SELF_CHECK_EXPECTED: &str =
    "integer_part: \"one two three\" fractional_part: \"zero one eight nine one\"";

/// 小数分类器
pub struct DecimalFst {
    graph: GraphFst,
    /// 小数形状接受器
    filter: Fst,
    /// filter ∘ 改写图（不含 token 包装）
    final_graph: Fst,
}

impl DecimalFst {
    pub fn new(
        cardinal: &impl CardinalGrammar,
        config: &DecimalConfig,
        deterministic: bool,
    ) -> Result<Self> {
        let filter = Self::build_filter(cardinal, config.min_fraction_digits)?;
        let rewrite_graph = Self::build_rewrite_graph(cardinal);

        let final_graph = filter.compose(&rewrite_graph).optimize();
        if final_graph.is_empty() {
            anyhow::bail!("decimal 组合结果为空，请检查 cardinal 语法");
        }

        let mut graph = GraphFst::new("decimal", GrammarKind::Classify, deterministic);
        let fst = graph.add_tokens(final_graph.clone()).optimize();
        graph.set_fst(fst);

        if config.self_check {
            Self::self_check(&final_graph)?;
        }

        tracing::info!(
            "decimal 语法构建完成: 过滤器 {} 状态, 分类器 {} 状态/{} 弧",
            filter.num_states(),
            final_graph.num_states(),
            final_graph.num_arcs()
        );

        Ok(Self {
            graph,
            filter,
            final_graph,
        })
    }

    /// 两种形状的并集，各自恰好包含一个 "."
    ///
    /// - 整数主导：基数 + "." + 至少 1 位小数
    /// - 小数主导：任意位整数 + "." + 至少 `min_fraction_digits` 位小数
    fn build_filter(cardinal: &impl CardinalGrammar, min_fraction_digits: usize) -> Result<Fst> {
        if min_fraction_digits == 0 {
            anyhow::bail!("小数主导分支的最少小数位数必须大于 0");
        }
        if cardinal.filter().is_empty() {
            anyhow::bail!("cardinal 过滤器为空");
        }

        let filter_integer_part =
            cardinal.filter().clone() + Fst::accep(".") + digit().closure(1, None);
        let filter_fractional_part =
            digit().star() + Fst::accep(".") + digit().closure(min_fraction_digits, None);

        Ok((filter_integer_part | filter_fractional_part).optimize())
    }

    /// 整数部分可选（0 或 1 次）
    ///
    /// - 有整数部分："." 替换为单个空格
    /// - 无整数部分："." 删除，输出以 `fractional_part: "` 开头
    fn build_rewrite_graph(cardinal: &impl CardinalGrammar) -> Fst {
        let digits = cardinal.single_digits_graph();

        let integer_part = Fst::insert("integer_part: \"")
            + digits.clone()
            + Fst::insert("\"")
            + Fst::cross(".", " ");
        let fractional_part =
            Fst::insert("fractional_part: \"") + digits.clone() + Fst::insert("\"");

        (integer_part | Fst::delete(".")) + fractional_part
    }

    fn self_check(final_graph: &Fst) -> Result<()> {
        let actual = rewrite::top_rewrite(SELF_CHECK_INPUT, final_graph);
        if actual.as_deref() != Some(SELF_CHECK_EXPECTED) {
            tracing::error!("decimal 分类器自检失败: {:?}", actual);
            anyhow::bail!(
                "decimal 分类器自检失败: 输入 {:?}, 期望 {:?}, 实际 {:?}",
                SELF_CHECK_INPUT,
                SELF_CHECK_EXPECTED,
                actual
            );
        }
        Ok(())
    }

    pub fn graph(&self) -> &GraphFst {
        &self.graph
    }

    /// 带 `decimal { ... }` 包装的最终 FST
    pub fn fst(&self) -> &Fst {
        self.graph.fst()
    }

    pub fn filter(&self) -> &Fst {
        &self.filter
    }

    pub fn final_graph(&self) -> &Fst {
        &self.final_graph
    }

    /// 形状检查
    pub fn accepts(&self, input: &str) -> bool {
        self.filter.accepts(input)
    }

    /// 完整分类（含包装）；不匹配返回 None
    pub fn classify(&self, input: &str) -> Option<String> {
        self.graph.classify(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CardinalConfig;
    use crate::grammar::cardinal::CardinalFst;
    use crate::tagger::TaggedToken;

    fn cardinal() -> CardinalFst {
        CardinalFst::new(&CardinalConfig::default(), true).unwrap()
    }

    fn decimal(cardinal: &CardinalFst) -> DecimalFst {
        DecimalFst::new(cardinal, &DecimalConfig::default(), true).unwrap()
    }

    /// 只接受固定集合的基数过滤器
    struct FixedCardinal {
        filter: Fst,
        digits: Fst,
    }

    impl FixedCardinal {
        fn new(accepted: &[&str]) -> Self {
            let base = cardinal();
            let filter = accepted
                .iter()
                .fold(Fst::new(), |acc, s| acc | Fst::accep(s))
                .optimize();
            Self {
                filter,
                digits: base.single_digits_graph().clone(),
            }
        }
    }

    impl CardinalGrammar for FixedCardinal {
        fn filter(&self) -> &Fst {
            &self.filter
        }

        fn single_digits_graph(&self) -> &Fst {
            &self.digits
        }
    }

    #[test]
    fn test_self_check_literal() {
        let cardinal = cardinal();
        let decimal = decimal(&cardinal);
        assert_eq!(
            rewrite::top_rewrite("123.01891", decimal.final_graph()).as_deref(),
            Some("integer_part: \"one two three\" fractional_part: \"zero one eight nine one\"")
        );
    }

    #[test]
    fn test_identity_and_envelope() {
        let cardinal = cardinal();
        let decimal = decimal(&cardinal);
        assert_eq!(decimal.graph().name(), "decimal");
        assert_eq!(decimal.graph().kind(), GrammarKind::Classify);
        assert_eq!(
            decimal.classify("123.01891").as_deref(),
            Some("decimal { integer_part: \"one two three\" fractional_part: \"zero one eight nine one\" }")
        );
    }

    #[test]
    fn test_fraction_heavy_branch_spells_integer() {
        let cardinal = cardinal();
        let decimal = decimal(&cardinal);
        // "1" 不是合法基数，靠小数主导分支接受
        assert!(!cardinal.filter().accepts("1"));
        assert!(decimal.accepts("1.2345"));
        assert_eq!(
            rewrite::top_rewrite("1.2345", decimal.final_graph()).as_deref(),
            Some("integer_part: \"one\" fractional_part: \"two three four five\"")
        );
    }

    #[test]
    fn test_empty_integer_part_has_no_field() {
        let cardinal = cardinal();
        let decimal = decimal(&cardinal);
        let output = rewrite::top_rewrite(".2345", decimal.final_graph()).unwrap();
        assert_eq!(output, "fractional_part: \"two three four five\"");
        assert!(!output.contains("integer_part"));
    }

    #[test]
    fn test_empty_integer_part_no_leading_space() {
        let cardinal = cardinal();
        let decimal = decimal(&cardinal);
        for (input, expected) in [
            (".0007", "fractional_part: \"zero zero zero seven\""),
            (".70000", "fractional_part: \"seven zero zero zero zero\""),
        ] {
            assert_eq!(
                rewrite::top_rewrite(input, decimal.final_graph()).as_deref(),
                Some(expected),
                "输入 {:?}",
                input
            );
        }
        assert_eq!(
            decimal.classify(".0007").as_deref(),
            Some("decimal { fractional_part: \"zero zero zero seven\" }")
        );
        // 有整数部分时仍是单个空格分隔
        assert_eq!(
            rewrite::rewrites("7.0007", decimal.final_graph()),
            vec!["integer_part: \"seven\" fractional_part: \"zero zero zero seven\""]
        );
    }

    #[test]
    fn test_rejection_produces_no_output() {
        let cardinal = cardinal();
        let decimal = decimal(&cardinal);
        assert!(!decimal.accepts("12.3"));
        assert_eq!(rewrite::top_rewrite("12.3", decimal.final_graph()), None);
        assert!(rewrite::rewrites("12.3", decimal.fst()).is_empty());
        assert_eq!(decimal.classify("12.3"), None);
    }

    #[test]
    fn test_integer_heavy_branch() {
        let cardinal = cardinal();
        let decimal = decimal(&cardinal);
        // 基数合法时 1 位小数即可
        assert!(decimal.accepts("12345.6"));
        assert_eq!(
            rewrite::top_rewrite("12345.6", decimal.final_graph()).as_deref(),
            Some("integer_part: \"one two three four five\" fractional_part: \"six\"")
        );
    }

    #[test]
    fn test_separator_uniqueness() {
        let cardinal = cardinal();
        let decimal = decimal(&cardinal);
        for input in ["12345", "1234.5.6", "..1234", "1.2345.", "1234.", ".", ""] {
            assert!(!decimal.accepts(input), "不应接受 {:?}", input);
            assert_eq!(decimal.classify(input), None);
        }
    }

    #[test]
    fn test_filter_soundness() {
        let cardinal = FixedCardinal::new(&["7", "42"]);
        let decimal = DecimalFst::new(
            &cardinal,
            &DecimalConfig {
                self_check: false,
                ..DecimalConfig::default()
            },
            true,
        )
        .unwrap();

        let integers = ["", "7", "42", "8", "123"];
        let fractions = ["", "1", "12", "123", "1234", "12345"];
        for d1 in integers {
            for d2 in fractions {
                let input = format!("{}.{}", d1, d2);
                let expected =
                    (cardinal.filter().accepts(d1) && !d2.is_empty()) || d2.len() >= 4;
                assert_eq!(decimal.accepts(&input), expected, "输入 {:?}", input);
                assert_eq!(
                    decimal.classify(&input).is_some(),
                    expected,
                    "输入 {:?}",
                    input
                );
            }
        }
    }

    #[test]
    fn test_field_ordering() {
        let cardinal = cardinal();
        let decimal = decimal(&cardinal);
        for input in ["1234.5", "9.87654", "00.0000", "31415.9265"] {
            let output = decimal.classify(input).unwrap();
            let token = TaggedToken::parse(&output).unwrap();
            let keys: Vec<&str> = token.fields.iter().map(|(k, _)| k.as_str()).collect();
            assert_eq!(keys, vec!["integer_part", "fractional_part"], "输入 {:?}", input);
            assert!(output.contains("\" fractional_part: \""));
            assert!(!output.contains("  "));
        }
    }

    #[test]
    fn test_idempotent_construction() {
        let cardinal = cardinal();
        let first = decimal(&cardinal);
        let second = decimal(&cardinal);
        assert_eq!(first.filter(), second.filter());
        assert_eq!(first.final_graph(), second.final_graph());
        assert_eq!(first.fst(), second.fst());
    }

    #[test]
    fn test_self_check_failure_is_fatal() {
        // 只接受 "42" 的基数 + 要求 6 位小数："123.01891" 两个分支都不接受
        let cardinal = FixedCardinal::new(&["42"]);
        let config = DecimalConfig {
            min_fraction_digits: 6,
            self_check: true,
        };
        let err = DecimalFst::new(&cardinal, &config, true).err().unwrap();
        assert!(err.to_string().contains("自检失败"));
    }

    #[test]
    fn test_empty_cardinal_filter_rejected() {
        let cardinal = FixedCardinal::new(&[]);
        let err = DecimalFst::new(&cardinal, &DecimalConfig::default(), true)
            .err()
            .unwrap();
        assert!(err.to_string().contains("过滤器为空"));
    }

    #[test]
    fn test_concurrent_readers() {
        let cardinal = cardinal();
        let decimal = std::sync::Arc::new(decimal(&cardinal));
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let decimal = std::sync::Arc::clone(&decimal);
                scope.spawn(move || {
                    for _ in 0..10 {
                        assert_eq!(
                            rewrite::top_rewrite(SELF_CHECK_INPUT, decimal.final_graph())
                                .as_deref(),
                            Some(SELF_CHECK_EXPECTED)
                        );
                    }
                });
            }
        });
    }
}
