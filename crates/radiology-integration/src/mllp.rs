//! MLLP (Minimal Lower Layer Protocol) 帧编解码
//!
//! 帧格式：`0x0B <HL7 消息> 0x1C 0x0D`

use crate::hl7::Hl7Error;
use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

pub const START_BLOCK: u8 = 0x0B;
pub const END_BLOCK: u8 = 0x1C;
pub const CARRIAGE_RETURN: u8 = 0x0D;

/// MLLP 编解码器
#[derive(Debug, Default, Clone, Copy)]
pub struct MllpCodec;

impl MllpCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for MllpCodec {
    type Item = String;
    type Error = Hl7Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // 丢弃起始符之前的字节
        match src.iter().position(|b| *b == START_BLOCK) {
            Some(0) => {}
            Some(start) => {
                warn!("Discarding {} bytes before MLLP start block", start);
                let _ = src.split_to(start);
            }
            None => {
                src.clear();
                return Ok(None);
            }
        }

        let end = src
            .windows(2)
            .position(|w| w[0] == END_BLOCK && w[1] == CARRIAGE_RETURN);
        let Some(end) = end else {
            return Ok(None);
        };

        let frame = src.split_to(end + 2);
        let payload = &frame[1..end];
        String::from_utf8(payload.to_vec())
            .map(Some)
            .map_err(|e| Hl7Error::ParseError(format!("MLLP payload is not UTF-8: {}", e)))
    }
}

impl Encoder<&str> for MllpCodec {
    type Error = Hl7Error;

    fn encode(&mut self, item: &str, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len() + 3);
        dst.put_u8(START_BLOCK);
        dst.put_slice(item.as_bytes());
        dst.put_u8(END_BLOCK);
        dst.put_u8(CARRIAGE_RETURN);
        Ok(())
    }
}
