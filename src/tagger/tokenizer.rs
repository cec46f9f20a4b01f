//! 分词器
//!
//! 将输入文本分割为：数字串（含小数点）、单词、空白、符号

/// Token 类型
#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    /// ASCII 数字与 "." 序列
    Numeral,
    /// 字母序列
    Word,
    /// 空白符序列
    Whitespace,
    /// 标点/符号
    Symbol,
}

/// Token
#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    pub token_type: TokenType,
    /// 在原文中的起始字节索引
    pub start: usize,
    /// 在原文中的结束字节索引（不含）
    pub end: usize,
}

/// 分词器
pub struct Tokenizer;

impl Tokenizer {
    /// 按字符类型将文本分割为 Token 序列
    pub fn tokenize(text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut current_type: Option<TokenType> = None;
        let mut current_start = 0;
        let mut current_text = String::new();

        for (idx, ch) in text.char_indices() {
            let char_type = Self::classify_char(ch);

            match current_type {
                Some(ref ct) if ct == &char_type => current_text.push(ch),
                Some(ct) => {
                    // 类型切换，保存当前 token
                    tokens.push(Token {
                        text: std::mem::take(&mut current_text),
                        token_type: ct,
                        start: current_start,
                        end: idx,
                    });
                    current_text.push(ch);
                    current_start = idx;
                    current_type = Some(char_type);
                }
                None => {
                    current_text.push(ch);
                    current_start = idx;
                    current_type = Some(char_type);
                }
            }
        }

        // 处理最后一个 token
        if let Some(ct) = current_type {
            tokens.push(Token {
                text: current_text,
                token_type: ct,
                start: current_start,
                end: text.len(),
            });
        }

        tokens
    }

    /// 字符分类
    fn classify_char(ch: char) -> TokenType {
        if ch.is_ascii_digit() || ch == '.' {
            TokenType::Numeral
        } else if ch.is_alphabetic() {
            TokenType::Word
        } else if ch.is_whitespace() {
            TokenType::Whitespace
        } else {
            TokenType::Symbol
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_signed_decimal_with_quantity() {
        let tokens = Tokenizer::tokenize("-12.5006 billion");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].text, "-");
        assert_eq!(tokens[0].token_type, TokenType::Symbol);
        assert_eq!(tokens[1].text, "12.5006");
        assert_eq!(tokens[1].token_type, TokenType::Numeral);
        assert_eq!(tokens[2].token_type, TokenType::Whitespace);
        assert_eq!(tokens[3].text, "billion");
        assert_eq!(tokens[3].token_type, TokenType::Word);
    }

    #[test]
    fn test_tokenize_offsets() {
        let text = "价格 3.14159 元";
        let tokens = Tokenizer::tokenize(text);
        let numeral = tokens
            .iter()
            .find(|t| t.token_type == TokenType::Numeral)
            .unwrap();
        assert_eq!(&text[numeral.start..numeral.end], "3.14159");
        assert_eq!(tokens.last().unwrap().end, text.len());
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(Tokenizer::tokenize("").is_empty());
    }
}
