//! HL7 应答解析
//!
//! PACS 对每条 ORM^O01 返回一条 ACK (MSH + MSA)。解析时从 MSH 读取分隔符，
//! 段之间允许 `\r` 或 `\n`。

use super::encoding::{EncodingCharacters, Segment};
use super::Hl7Error;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// MSA-1 应答码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcknowledgmentCode {
    ApplicationAccept,
    ApplicationError,
    ApplicationReject,
    CommitAccept,
    CommitError,
    CommitReject,
}

impl AcknowledgmentCode {
    pub fn value(&self) -> &'static str {
        match self {
            Self::ApplicationAccept => "AA",
            Self::ApplicationError => "AE",
            Self::ApplicationReject => "AR",
            Self::CommitAccept => "CA",
            Self::CommitError => "CE",
            Self::CommitReject => "CR",
        }
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, Self::ApplicationAccept | Self::CommitAccept)
    }
}

impl TryFrom<&str> for AcknowledgmentCode {
    type Error = Hl7Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "AA" => Ok(Self::ApplicationAccept),
            "AE" => Ok(Self::ApplicationError),
            "AR" => Ok(Self::ApplicationReject),
            "CA" => Ok(Self::CommitAccept),
            "CE" => Ok(Self::CommitError),
            "CR" => Ok(Self::CommitReject),
            _ => Err(Hl7Error::UnsupportedCode(value.to_string())),
        }
    }
}

/// 解析后的 ACK
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgment {
    pub code: AcknowledgmentCode,
    pub control_id: String,
    pub text: Option<String>,
}

impl Acknowledgment {
    pub fn is_success(&self) -> bool {
        self.code.is_accept()
    }
}

/// HL7 解析器
#[derive(Debug, Default)]
pub struct Hl7Parser;

impl Hl7Parser {
    pub fn new() -> Self {
        Self
    }

    /// 解析整条消息为段列表，第一段必须是 MSH
    pub fn parse(&self, message: &str) -> Result<Vec<Segment>, Hl7Error> {
        let lines: Vec<&str> = message
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let header = lines
            .first()
            .ok_or_else(|| Hl7Error::InvalidFormat("Empty message".to_string()))?;

        let encoding = Self::encoding_from_header(header)?;
        let segments = lines
            .iter()
            .map(|line| Self::parse_segment(line, &encoding))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Parsed HL7 message with {} segments", segments.len());
        Ok(segments)
    }

    /// 解析 ACK，取 MSA-1/2/3
    pub fn parse_acknowledgment(&self, message: &str) -> Result<Acknowledgment, Hl7Error> {
        let segments = self.parse(message)?;
        let msa = segments
            .iter()
            .find(|s| s.name() == "MSA")
            .ok_or_else(|| Hl7Error::MissingField("MSA segment".to_string()))?;

        let code = msa.value(1, 1);
        if code.is_empty() {
            return Err(Hl7Error::MissingField("Acknowledgment Code (MSA-1)".to_string()));
        }
        let code = AcknowledgmentCode::try_from(code)?;
        let text = Some(msa.value(3, 1))
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        if !code.is_accept() {
            warn!("Received negative acknowledgment {}: {:?}", code.value(), text);
        }

        Ok(Acknowledgment {
            code,
            control_id: msa.value(2, 1).to_string(),
            text,
        })
    }

    fn encoding_from_header(header: &str) -> Result<EncodingCharacters, Hl7Error> {
        if !header.starts_with("MSH") {
            return Err(Hl7Error::InvalidFormat(
                "Message must start with MSH segment".to_string(),
            ));
        }
        let delimiters: Vec<char> = header.chars().skip(3).take(5).collect();
        if delimiters.len() < 5 {
            return Err(Hl7Error::InvalidFormat(
                "MSH segment is missing encoding characters".to_string(),
            ));
        }
        Ok(EncodingCharacters {
            field_separator: delimiters[0],
            component_separator: delimiters[1],
            repetition_separator: delimiters[2],
            escape_character: delimiters[3],
            subcomponent_separator: delimiters[4],
        })
    }

    /// 重复字段只保留第一次出现
    fn parse_segment(line: &str, encoding: &EncodingCharacters) -> Result<Segment, Hl7Error> {
        let parts: Vec<&str> = line.split(encoding.field_separator).collect();
        let name = parts[0];
        if name.len() != 3 {
            return Err(Hl7Error::ParseError(format!("Invalid segment name: {}", name)));
        }

        let mut segment = Segment::new(name);
        let first_field = if name == "MSH" {
            segment
                .set_field(1, &encoding.field_separator.to_string())
                .set_field(2, &encoding.encoding_characters_field());
            3
        } else {
            1
        };
        // 没有字段分隔符的段只有段名
        let skip = if name == "MSH" { 2 } else { 1 };
        let values = parts.get(skip..).unwrap_or(&[]);

        for (offset, value) in values.iter().enumerate() {
            let field = first_field + offset;
            let first_repetition = value
                .split(encoding.repetition_separator)
                .next()
                .unwrap_or("");
            for (index, component) in first_repetition
                .split(encoding.component_separator)
                .enumerate()
            {
                segment.set_component(field, index + 1, &encoding.unescape(component));
            }
        }
        Ok(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACK: &str = "MSH|^~\\&|dcm4chee|PACS|OpenMRSRadiologyModule|OpenMRS|20150204143501||ACK^O01|MSG1|P|2.3.1\rMSA|AA|MSG1|Order accepted\r";

    #[test]
    fn test_parse_segments() {
        let segments = Hl7Parser::new().parse(ACK).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].value(3, 1), "dcm4chee");
        assert_eq!(segments[0].value(9, 1), "ACK");
        assert_eq!(segments[0].value(9, 2), "O01");
        assert_eq!(segments[0].value(12, 1), "2.3.1");
    }

    #[test]
    fn test_parse_accept() {
        let ack = Hl7Parser::new().parse_acknowledgment(ACK).unwrap();
        assert!(ack.is_success());
        assert_eq!(ack.code, AcknowledgmentCode::ApplicationAccept);
        assert_eq!(ack.control_id, "MSG1");
        assert_eq!(ack.text.as_deref(), Some("Order accepted"));
    }

    #[test]
    fn test_parse_reject_with_newlines() {
        let message = "MSH|^~\\&|PACS|||||||ACK|2|P|2.3.1\nMSA|AR|2|Unknown patient\\S\\id\n";
        let ack = Hl7Parser::new().parse_acknowledgment(message).unwrap();
        assert!(!ack.is_success());
        assert_eq!(ack.code.value(), "AR");
        assert_eq!(ack.text.as_deref(), Some("Unknown patient^id"));
    }

    #[test]
    fn test_commit_accept_is_success() {
        let message = "MSH|^~\\&|PACS\rMSA|CA|3\r";
        let ack = Hl7Parser::new().parse_acknowledgment(message).unwrap();
        assert!(ack.is_success());
        assert_eq!(ack.text, None);
    }

    #[test]
    fn test_invalid_messages() {
        let parser = Hl7Parser::new();
        assert!(matches!(parser.parse(""), Err(Hl7Error::InvalidFormat(_))));
        assert!(matches!(parser.parse("PID|||100"), Err(Hl7Error::InvalidFormat(_))));
        assert!(matches!(
            parser.parse_acknowledgment("MSH|^~\\&|PACS\r"),
            Err(Hl7Error::MissingField(_))
        ));
        assert!(matches!(
            parser.parse_acknowledgment("MSH|^~\\&|PACS\rMSA|ZZ|1\r"),
            Err(Hl7Error::UnsupportedCode(_))
        ));
    }

    #[test]
    fn test_bare_segment_names() {
        let parser = Hl7Parser::new();
        let ack = parser
            .parse_acknowledgment("MSH|^~\\&|PACS\rMSH\rMSA|AA|1\r")
            .unwrap();
        assert!(ack.is_success());
        assert_eq!(ack.control_id, "1");

        let segments = parser.parse("MSH|^~\\&|PACS\rMSH\rZDS\r").unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].value(3, 1), "");
        assert_eq!(segments[2].name(), "ZDS");
        assert!(segments[2].field(1).is_none());
    }
}
