//! 数字标注主引擎
//!
//! 组合 Unicode 归一化、分词、小数/基数语法

use std::time::Instant;

use anyhow::Result;
use unicode_normalization::UnicodeNormalization;

use crate::config::GrammarConfig;
use crate::grammar::rules::QuantityWords;
use crate::grammar::{CardinalFst, DecimalFst, DecimalPhraseFst};
use crate::tagger::tokenizer::{Token, TokenType, Tokenizer};
use crate::tagger::types::{TaggedSpan, TaggingResult, TokenClass};

/// 数字标注引擎（可复用，语法在构建时一次性编译）
pub struct NumeralTagger {
    cardinal: CardinalFst,
    decimal: DecimalFst,
    phrase: DecimalPhraseFst,
    quantities: QuantityWords,
}

/// 一个数字串周围可用的上下文
struct Candidate<'a> {
    numeral: &'a str,
    start: usize,
    end: usize,
    /// 紧邻的 "-" 起始位置
    negative_start: Option<usize>,
    /// 数量词及其结束位置
    quantity: Option<(&'a str, usize)>,
}

impl NumeralTagger {
    /// 按依赖顺序构建：cardinal -> decimal -> decimal 短语
    pub fn new(config: &GrammarConfig) -> Result<Self> {
        config.validate()?;
        let start = Instant::now();

        let cardinal = CardinalFst::new(&config.cardinal, config.deterministic)?;
        let decimal = DecimalFst::new(&cardinal, &config.decimal, config.deterministic)?;
        let quantities = QuantityWords::new(&config.quantities);
        let phrase = DecimalPhraseFst::new(&decimal, &quantities);

        tracing::info!("数字标注引擎构建完成，耗时 {}ms", start.elapsed().as_millis());

        Ok(Self {
            cardinal,
            decimal,
            phrase,
            quantities,
        })
    }

    pub fn cardinal(&self) -> &CardinalFst {
        &self.cardinal
    }

    pub fn decimal(&self) -> &DecimalFst {
        &self.decimal
    }

    pub fn phrase(&self) -> &DecimalPhraseFst {
        &self.phrase
    }

    /// 标注文本中的数字
    ///
    /// 纯函数，不可失败（未匹配的数字保持原样）
    pub fn tag(&self, text: &str) -> TaggingResult {
        let start = Instant::now();

        if text.is_empty() {
            return TaggingResult::untagged(String::new(), 0);
        }

        // 1. Unicode 归一化 (NFC) + 空白折叠
        let normalized = self.unicode_normalize(text);

        // 2. 分词
        let tokens = Tokenizer::tokenize(&normalized);

        // 3. 逐个数字串尝试语法
        let mut spans: Vec<TaggedSpan> = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            if token.token_type != TokenType::Numeral {
                continue;
            }
            let candidate = self.candidate(&tokens, i);
            if let Some(span) = self.classify_candidate(&normalized, &candidate) {
                // 与上一个片段重叠时跳过
                if spans.last().is_some_and(|last| span.start < last.end) {
                    continue;
                }
                spans.push(span);
            } else {
                tracing::debug!("未匹配的数字串: {:?}", token.text);
            }
        }

        TaggingResult {
            text: normalized,
            spans,
            elapsed_us: u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
        }
    }

    /// Unicode 归一化 + 空白折叠
    fn unicode_normalize(&self, text: &str) -> String {
        let nfc: String = text.nfc().collect();

        // 空白折叠：多个连续空白 -> 单个空格
        let mut result = String::with_capacity(nfc.len());
        let mut prev_whitespace = false;

        for ch in nfc.chars() {
            if ch.is_whitespace() {
                if !prev_whitespace {
                    result.push(' ');
                    prev_whitespace = true;
                }
            } else {
                result.push(ch);
                prev_whitespace = false;
            }
        }

        result.trim().to_string()
    }

    /// 收集数字串的符号与数量词上下文
    fn candidate<'a>(&self, tokens: &'a [Token], index: usize) -> Candidate<'a> {
        let token = &tokens[index];

        // 句末的 "." 不属于数字
        let numeral = token.text.trim_end_matches('.');
        let end = token.start + numeral.len();

        // "-" 前面必须是开头或空白
        let negative_start = index
            .checked_sub(1)
            .map(|prev| &tokens[prev])
            .filter(|prev| prev.text == "-")
            .filter(|_| index < 2 || tokens[index - 2].token_type == TokenType::Whitespace)
            .map(|prev| prev.start);

        let quantity = if end == token.end {
            match (tokens.get(index + 1), tokens.get(index + 2)) {
                (Some(space), Some(word))
                    if space.text == " "
                        && word.token_type == TokenType::Word
                        && self.quantities.contains(&word.text) =>
                {
                    Some((word.text.as_str(), word.end))
                }
                _ => None,
            }
        } else {
            None
        };

        Candidate {
            numeral,
            start: token.start,
            end,
            negative_start,
            quantity,
        }
    }

    /// 依次尝试：
    /// - 含 "." 时交给 decimal 短语语法：先带数量词，再去掉数量词
    ///   （短语过滤器包含 decimal 过滤器，裸 decimal 已被覆盖）
    /// - 不含 "." 时交给基数语法
    fn classify_candidate(&self, text: &str, candidate: &Candidate) -> Option<TaggedSpan> {
        if candidate.numeral.is_empty() {
            return None;
        }
        let start = candidate.negative_start.unwrap_or(candidate.start);

        let mut attempts: Vec<usize> = Vec::with_capacity(2);
        if let Some((_, quantity_end)) = candidate.quantity {
            attempts.push(quantity_end);
        }
        attempts.push(candidate.end);

        if candidate.numeral.contains('.') {
            for end in attempts {
                let input = &text[start..end];
                if !self.phrase.accepts(input) {
                    continue;
                }
                if let Some(tagged) = self.phrase.classify(input) {
                    return Some(Self::span(text, start, end, tagged, TokenClass::Decimal));
                }
            }
            return None;
        }

        let input = &text[start..candidate.end];
        self.cardinal
            .classify(input)
            .map(|tagged| Self::span(text, start, candidate.end, tagged, TokenClass::Cardinal))
    }

    fn span(text: &str, start: usize, end: usize, tagged: String, class: TokenClass) -> TaggedSpan {
        TaggedSpan {
            original: text[start..end].to_string(),
            tagged,
            start,
            end,
            class,
        }
    }
}
