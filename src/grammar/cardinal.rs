//! 基数语法
//!
//! 对小数语法而言只暴露两样东西：基数形状过滤器、逐位读法转换器。

use anyhow::Result;

use crate::config::CardinalConfig;
use crate::fst::{Fst, Weight};
use crate::grammar::rules::{ALTERNATIVE_PENALTY, DIGIT_NAMES, ZERO_ALTERNATIVE};
use crate::grammar::{digit, insert_space, GrammarKind, GraphFst};

/// 基数语法对外接口
pub trait CardinalGrammar {
    /// 合法基数数字串的接受器
    fn filter(&self) -> &Fst;

    /// 逐位读法："123" -> "one two three"
    fn single_digits_graph(&self) -> &Fst;
}

/// 基数分类器
///
/// - 过滤：至少 `min_digits` 位数字
/// - 输出：`cardinal { negative: "-" integer: "one two three four" }`
pub struct CardinalFst {
    graph: GraphFst,
    filter: Fst,
    single_digits_graph: Fst,
}

impl CardinalFst {
    pub fn new(config: &CardinalConfig, deterministic: bool) -> Result<Self> {
        if config.min_digits == 0 {
            anyhow::bail!("基数过滤器的最少位数必须大于 0");
        }

        let mut graph_digit = match &config.digit_names_path {
            // 文件格式：读法<TAB>数字
            Some(path) => Fst::string_file(path)?.invert(),
            None => Fst::string_map(DIGIT_NAMES),
        };
        if !deterministic {
            let (zero, name) = ZERO_ALTERNATIVE;
            graph_digit = graph_digit
                | Fst::cross(zero, name).add_weight(Weight::new(ALTERNATIVE_PENALTY));
        }

        let graph_digit = graph_digit.optimize();
        Self::check_digit_coverage(&graph_digit)?;

        let single_digits_graph =
            (graph_digit.clone() + (insert_space() + graph_digit).star()).optimize();
        let filter = digit().closure(config.min_digits, None).optimize();

        let mut graph = GraphFst::new("cardinal", GrammarKind::Classify, deterministic);
        let negative = Fst::cross("-", "negative: \"-\" ").optional();
        let integer = Fst::insert("integer: \"")
            + filter.compose(&single_digits_graph)
            + Fst::insert("\"");
        let fst = graph.add_tokens(negative + integer).optimize();
        graph.set_fst(fst);

        tracing::info!(
            "cardinal 语法构建完成: 过滤器 {} 状态, 读法图 {} 状态",
            filter.num_states(),
            single_digits_graph.num_states()
        );

        Ok(Self {
            graph,
            filter,
            single_digits_graph,
        })
    }

    /// 每个数字都必须有读法
    fn check_digit_coverage(graph_digit: &Fst) -> Result<()> {
        let missing: Vec<char> = ('0'..='9')
            .filter(|d| !graph_digit.accepts(&d.to_string()))
            .collect();
        if !missing.is_empty() {
            anyhow::bail!("数字读法表缺少数字: {:?}", missing);
        }
        Ok(())
    }

    pub fn graph(&self) -> &GraphFst {
        &self.graph
    }

    pub fn fst(&self) -> &Fst {
        self.graph.fst()
    }

    pub fn classify(&self, input: &str) -> Option<String> {
        self.graph.classify(input)
    }
}

impl CardinalGrammar for CardinalFst {
    fn filter(&self) -> &Fst {
        &self.filter
    }

    fn single_digits_graph(&self) -> &Fst {
        &self.single_digits_graph
    }
}
