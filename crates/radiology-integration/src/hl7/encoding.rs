//! HL7 v2 段模型与管道编码
//!
//! 字段和组件下标与 HL7 文档一致，从 1 开始。编码时省略末尾的空字段和空组件，
//! 字段值中的分隔符按 HL7 转义规则编码。

use serde::{Deserialize, Serialize};

/// HL7 编码字符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingCharacters {
    pub field_separator: char,
    pub component_separator: char,
    pub repetition_separator: char,
    pub escape_character: char,
    pub subcomponent_separator: char,
}

impl Default for EncodingCharacters {
    fn default() -> Self {
        Self {
            field_separator: '|',
            component_separator: '^',
            repetition_separator: '~',
            escape_character: '\\',
            subcomponent_separator: '&',
        }
    }
}

impl EncodingCharacters {
    /// MSH-2 的内容，例如 `^~\&`
    pub fn encoding_characters_field(&self) -> String {
        [
            self.component_separator,
            self.repetition_separator,
            self.escape_character,
            self.subcomponent_separator,
        ]
        .iter()
        .collect()
    }

    /// 转义值中出现的分隔符
    pub fn escape(&self, value: &str) -> String {
        let mut escaped = String::with_capacity(value.len());
        for c in value.chars() {
            let code = if c == self.escape_character {
                Some('E')
            } else if c == self.field_separator {
                Some('F')
            } else if c == self.component_separator {
                Some('S')
            } else if c == self.repetition_separator {
                Some('R')
            } else if c == self.subcomponent_separator {
                Some('T')
            } else {
                None
            };

            match code {
                Some(code) => {
                    escaped.push(self.escape_character);
                    escaped.push(code);
                    escaped.push(self.escape_character);
                }
                None => escaped.push(c),
            }
        }
        escaped
    }

    /// [`EncodingCharacters::escape`] 的逆操作
    pub fn unescape(&self, value: &str) -> String {
        let mut result = String::with_capacity(value.len());
        let mut chars = value.chars().peekable();
        while let Some(c) = chars.next() {
            if c != self.escape_character {
                result.push(c);
                continue;
            }
            let code = chars.next();
            let closed = chars.next_if_eq(&self.escape_character).is_some();
            match (code, closed) {
                (Some('E'), true) => result.push(self.escape_character),
                (Some('F'), true) => result.push(self.field_separator),
                (Some('S'), true) => result.push(self.component_separator),
                (Some('R'), true) => result.push(self.repetition_separator),
                (Some('T'), true) => result.push(self.subcomponent_separator),
                (code, closed) => {
                    result.push(c);
                    if let Some(code) = code {
                        result.push(code);
                    }
                    if closed {
                        result.push(self.escape_character);
                    }
                }
            }
        }
        result
    }
}

/// 由组件构成的字段
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    components: Vec<String>,
}

impl Field {
    pub fn component(&self, index: usize) -> &str {
        index
            .checked_sub(1)
            .and_then(|i| self.components.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    fn set_component(&mut self, index: usize, value: &str) {
        let slot = index.max(1) - 1;
        if self.components.len() <= slot {
            self.components.resize(slot + 1, String::new());
        }
        self.components[slot] = value.to_string();
    }

    pub fn is_empty(&self) -> bool {
        self.components.iter().all(String::is_empty)
    }

    pub fn encode(&self, encoding: &EncodingCharacters) -> String {
        let last = self
            .components
            .iter()
            .rposition(|c| !c.is_empty())
            .map_or(0, |i| i + 1);

        self.components[..last]
            .iter()
            .map(|c| encoding.escape(c))
            .collect::<Vec<_>>()
            .join(&encoding.component_separator.to_string())
    }
}

/// HL7 段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    name: String,
    fields: Vec<Field>,
}

impl Segment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 设置字段的第一个组件
    pub fn set_field(&mut self, field: usize, value: &str) -> &mut Self {
        self.set_component(field, 1, value)
    }

    pub fn set_component(&mut self, field: usize, component: usize, value: &str) -> &mut Self {
        let slot = field.max(1) - 1;
        if self.fields.len() <= slot {
            self.fields.resize_with(slot + 1, Field::default);
        }
        self.fields[slot].set_component(component, value);
        self
    }

    pub fn field(&self, field: usize) -> Option<&Field> {
        field.checked_sub(1).and_then(|i| self.fields.get(i))
    }

    /// 字段第 `component` 个组件的值，不存在时为空串
    pub fn value(&self, field: usize, component: usize) -> &str {
        self.field(field).map_or("", |f| f.component(component))
    }

    /// 编码为一行（不含段结束符）
    pub fn encode(&self, encoding: &EncodingCharacters) -> String {
        let separator = encoding.field_separator.to_string();
        let is_header = self.name == "MSH";

        // MSH-1 是字段分隔符本身，MSH-2 原样输出
        let first_field = if is_header { 3 } else { 1 };
        let mut encoded: Vec<String> = (first_field..=self.fields.len())
            .map(|index| self.field(index).map(|f| f.encode(encoding)).unwrap_or_default())
            .collect();
        while encoded.last().is_some_and(String::is_empty) {
            encoded.pop();
        }

        let mut line = self.name.clone();
        if is_header {
            line.push(encoding.field_separator);
            line.push_str(&encoding.encoding_characters_field());
        }
        for value in encoded {
            line.push_str(&separator);
            line.push_str(&value);
        }
        line
    }
}

/// 将段按顺序编码为完整消息，每段以回车结束
pub fn encode_segments(segments: &[Segment], encoding: &EncodingCharacters) -> String {
    let mut message = String::new();
    for segment in segments {
        message.push_str(&segment.encode(encoding));
        message.push('\r');
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_empty_fields_are_omitted() {
        let mut segment = Segment::new("PID");
        segment.set_field(3, "100").set_field(8, "M").set_field(12, "");
        assert_eq!(segment.encode(&EncodingCharacters::default()), "PID|||100|||||M");
    }

    #[test]
    fn test_components_and_leading_empties() {
        let mut segment = Segment::new("ORC");
        segment
            .set_field(1, "NW")
            .set_component(7, 4, "20150204143500")
            .set_component(7, 6, "S");
        assert_eq!(
            segment.encode(&EncodingCharacters::default()),
            "ORC|NW||||||^^^20150204143500^^S"
        );
        assert_eq!(segment.value(7, 6), "S");
        assert_eq!(segment.value(7, 5), "");
        assert_eq!(segment.value(30, 1), "");
    }

    #[test]
    fn test_header_encoding() {
        let mut segment = Segment::new("MSH");
        segment.set_field(3, "APP").set_component(9, 1, "ORM").set_component(9, 2, "O01");
        assert_eq!(
            segment.encode(&EncodingCharacters::default()),
            "MSH|^~\\&|APP||||||ORM^O01"
        );
    }

    #[test]
    fn test_empty_segment() {
        assert_eq!(Segment::new("ZDS").encode(&EncodingCharacters::default()), "ZDS");
    }

    #[test]
    fn test_escape_delimiters() {
        let encoding = EncodingCharacters::default();
        assert_eq!(encoding.escape("A|B^C~D\\E&F"), "A\\F\\B\\S\\C\\R\\D\\E\\E\\T\\F");
        assert_eq!(encoding.unescape("A\\F\\B\\S\\C\\R\\D\\E\\E\\T\\F"), "A|B^C~D\\E&F");
        assert_eq!(encoding.unescape("no escapes"), "no escapes");
        assert_eq!(encoding.unescape("\\X41\\"), "\\X41\\");

        let mut segment = Segment::new("OBR");
        segment.set_component(4, 5, "CT HEAD|NECK");
        assert_eq!(segment.encode(&encoding), "OBR||||^^^^CT HEAD\\F\\NECK");
    }

    #[test]
    fn test_encode_segments_terminates_each_segment() {
        let mut first = Segment::new("MSH");
        first.set_field(3, "A");
        let mut second = Segment::new("ZDS");
        second.set_field(1, "1.2");

        let message = encode_segments(&[first, second], &EncodingCharacters::default());
        assert_eq!(message, "MSH|^~\\&|A\rZDS|1.2\r");
    }
}
