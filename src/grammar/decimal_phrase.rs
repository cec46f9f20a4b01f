//! 带符号与数量词的小数短语
//!
//! `-12.5006 billion` ->
//! `decimal { negative: "true" integer_part: "one two" fractional_part: "five zero zero six" quantity: "billion" }`
//!
//! negative / quantity 由本语法补充，核心字段仍来自 [`DecimalFst`]。

use crate::fst::Fst;
use crate::grammar::decimal::DecimalFst;
use crate::grammar::rules::QuantityWords;
use crate::grammar::{GrammarKind, GraphFst};

pub struct DecimalPhraseFst {
    graph: GraphFst,
    filter: Fst,
}

impl DecimalPhraseFst {
    pub fn new(decimal: &DecimalFst, quantities: &QuantityWords) -> Self {
        let words = quantities
            .iter()
            .fold(Fst::new(), |acc, word| acc | Fst::accep(word));

        let negative = Fst::cross("-", "negative: \"true\" ").optional();
        // 数量词原样透传
        let quantity = (Fst::accep(" ")
            + Fst::insert("quantity: \"")
            + words.clone()
            + Fst::insert("\""))
        .optional();

        let mut graph = GraphFst::new(
            "decimal",
            GrammarKind::Classify,
            decimal.graph().deterministic(),
        );
        let fst = graph
            .add_tokens(negative + decimal.final_graph().clone() + quantity)
            .optimize();
        graph.set_fst(fst);

        let filter = (Fst::accep("-").optional()
            + decimal.filter().clone()
            + (Fst::accep(" ") + words).optional())
        .optimize();

        tracing::info!(
            "decimal 短语语法构建完成: {} 个数量词, {} 状态",
            quantities.iter().count(),
            graph.fst().num_states()
        );

        Self { graph, filter }
    }

    pub fn graph(&self) -> &GraphFst {
        &self.graph
    }

    pub fn fst(&self) -> &Fst {
        self.graph.fst()
    }

    pub fn filter(&self) -> &Fst {
        &self.filter
    }

    pub fn accepts(&self, input: &str) -> bool {
        self.filter.accepts(input)
    }

    pub fn classify(&self, input: &str) -> Option<String> {
        self.graph.classify(input)
    }
}
