//! 数字标注层
//!
//! 把原始文本中的数字串交给语法，输出带标签的中间表示。
//!
//! ## 处理流程
//! 1. Unicode 归一化 + 空白折叠
//! 2. 分词（数字串/单词/空白/符号）
//! 3. 收集 "-" 与数量词上下文
//! 4. 依次尝试 decimal 短语、decimal、cardinal 语法

mod engine;
mod tokenizer;
mod types;

pub use engine::NumeralTagger;
pub use tokenizer::{Token, TokenType, Tokenizer};
pub use types::{TaggedSpan, TaggedToken, TaggingResult, TokenClass};
