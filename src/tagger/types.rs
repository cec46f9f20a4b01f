//! 标注结果类型定义

use serde::{Deserialize, Serialize};

/// 片段类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenClass {
    /// 小数（如 12.5006）
    Decimal,
    /// 长整数（如 1234567）
    Cardinal,
}

/// 已标注片段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedSpan {
    /// 原始文本
    pub original: String,
    /// 标注输出，如 `decimal { integer_part: "one" fractional_part: "two" }`
    pub tagged: String,
    /// 起始位置（规范化文本中的字节索引）
    pub start: usize,
    /// 结束位置（不含）
    pub end: usize,
    pub class: TokenClass,
}

/// 标注结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggingResult {
    /// 规范化后的输入
    pub text: String,
    /// 按出现顺序排列的标注片段
    pub spans: Vec<TaggedSpan>,
    /// 处理耗时（微秒）
    pub elapsed_us: u64,
}

impl TaggingResult {
    /// 创建无标注的结果
    pub fn untagged(text: String, elapsed_us: u64) -> Self {
        Self {
            text,
            spans: Vec::new(),
            elapsed_us,
        }
    }

    /// 把标注片段替换回文本
    pub fn tagged_text(&self) -> String {
        let mut result = String::with_capacity(self.text.len());
        let mut last_end = 0;
        for span in &self.spans {
            result.push_str(&self.text[last_end..span.start]);
            result.push_str(&span.tagged);
            last_end = span.end;
        }
        result.push_str(&self.text[last_end..]);
        result
    }
}

/// 解析后的 token：`name { key: "value" ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub name: String,
    /// 按出现顺序保存的字段
    pub fields: Vec<(String, String)>,
}

impl TaggedToken {
    /// 格式不合法时返回 None
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (name, rest) = text.split_once(" {")?;
        let body = rest.strip_suffix('}')?;
        if name.is_empty() || name.contains(char::is_whitespace) {
            return None;
        }

        let mut fields = Vec::new();
        let mut remaining = body.trim_start();
        while !remaining.is_empty() {
            let (key, after_key) = remaining.split_once(": \"")?;
            if key.is_empty() || key.contains(char::is_whitespace) {
                return None;
            }
            let (value, after_value) = after_key.split_once('"')?;
            fields.push((key.to_string(), value.to_string()));
            remaining = after_value.trim_start();
        }

        Some(Self {
            name: name.to_string(),
            fields,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tagged_token() {
        let token = TaggedToken::parse(
            "decimal { negative: \"true\" integer_part: \"one two\" fractional_part: \"five\" quantity: \"billion\" }",
        )
        .unwrap();
        assert_eq!(token.name, "decimal");
        assert_eq!(token.fields.len(), 4);
        assert_eq!(token.get("integer_part"), Some("one two"));
        assert_eq!(token.get("quantity"), Some("billion"));
        assert_eq!(token.get("missing"), None);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(TaggedToken::parse("decimal integer_part: \"one\"").is_none());
        assert!(TaggedToken::parse("decimal { integer_part: \"one }").is_none());
        assert!(TaggedToken::parse("decimal { integer_part \"one\" }").is_none());
        assert_eq!(
            TaggedToken::parse("cardinal { }").unwrap().fields,
            Vec::<(String, String)>::new()
        );
    }

    #[test]
    fn test_tagged_text() {
        let result = TaggingResult {
            text: "x 1.2345 y".to_string(),
            spans: vec![TaggedSpan {
                original: "1.2345".to_string(),
                tagged: "decimal { }".to_string(),
                start: 2,
                end: 8,
                class: TokenClass::Decimal,
            }],
            elapsed_us: 0,
        };
        assert_eq!(result.tagged_text(), "x decimal { } y");
        assert_eq!(TaggingResult::untagged("abc".into(), 0).tagged_text(), "abc");
    }
}
