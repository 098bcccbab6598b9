//! HL7 消息发送
//!
//! 每次发送建立一条 TCP 连接，写入一帧 MLLP 消息并等待一帧 ACK，不做重试。

use crate::hl7::{Acknowledgment, Hl7Error, Hl7Parser};
use crate::mllp::MllpCodec;
use async_trait::async_trait;
use bytes::BytesMut;
use radiology_core::config::PacsConfig;
use radiology_core::{RadiologyError, Result};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, error, info};

/// HL7 消息发送接口
#[async_trait]
pub trait Hl7Sender: Send + Sync {
    /// 发送一条消息并返回对端 ACK
    async fn send(&self, message: &str) -> Result<Acknowledgment>;
}

/// 基于 MLLP/TCP 的发送器
pub struct MllpHl7Sender {
    endpoint: String,
    timeout: Duration,
}

impl MllpHl7Sender {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn from_config(config: &PacsConfig) -> Self {
        Self::new(config.hl7_endpoint(), config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn exchange(&self, message: &str) -> Result<String> {
        let mut stream = TcpStream::connect(&self.endpoint).await?;
        let mut codec = MllpCodec::new();

        let mut frame = BytesMut::new();
        codec.encode(message, &mut frame)?;
        stream.write_all(&frame).await?;
        stream.flush().await?;
        debug!("Sent {} bytes to {}", frame.len(), self.endpoint);

        let mut buffer = BytesMut::with_capacity(1024);
        loop {
            if let Some(response) = codec.decode(&mut buffer)? {
                return Ok(response);
            }
            if stream.read_buf(&mut buffer).await? == 0 {
                return Err(Hl7Error::InvalidFormat(
                    "Connection closed before acknowledgment".to_string(),
                )
                .into());
            }
        }
    }
}

#[async_trait]
impl Hl7Sender for MllpHl7Sender {
    async fn send(&self, message: &str) -> Result<Acknowledgment> {
        info!("Sending HL7 message to {}", self.endpoint);

        let response = timeout(self.timeout, self.exchange(message))
            .await
            .map_err(|_| {
                error!("Timed out waiting for acknowledgment from {}", self.endpoint);
                RadiologyError::Transport(format!(
                    "timed out after {:?} waiting for {}",
                    self.timeout, self.endpoint
                ))
            })?
            .map_err(|e| match e {
                RadiologyError::Io(io) => {
                    RadiologyError::Transport(format!("{}: {}", self.endpoint, io))
                }
                other => other,
            })?;

        let ack = Hl7Parser::new().parse_acknowledgment(&response)?;
        info!(
            "Received acknowledgment {} for control id {}",
            ack.code.value(),
            ack.control_id
        );
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn ack_server(reply: &'static [u8]) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut codec = MllpCodec::new();
            let mut buffer = BytesMut::new();
            let received = loop {
                if let Some(message) = codec.decode(&mut buffer).unwrap() {
                    break message;
                }
                socket.read_buf(&mut buffer).await.unwrap();
            };
            socket.write_all(reply).await.unwrap();
            received
        });
        (address, handle)
    }

    #[tokio::test]
    async fn test_send_and_receive_accept() {
        let (address, server) =
            ack_server(b"\x0bMSH|^~\\&|PACS|||||||ACK|1|P|2.3.1\rMSA|AA|1\r\x1c\r").await;
        let sender = MllpHl7Sender::new(address, Duration::from_secs(5));

        let ack = sender.send("MSH|^~\\&|OpenMRSRadiologyModule\r").await.unwrap();
        assert!(ack.is_success());
        assert_eq!(ack.control_id, "1");
        assert_eq!(server.await.unwrap(), "MSH|^~\\&|OpenMRSRadiologyModule\r");
    }

    #[tokio::test]
    async fn test_send_receives_reject() {
        let (address, _server) =
            ack_server(b"\x0bMSH|^~\\&|PACS\rMSA|AE|7|Bad order\r\x1c\r").await;
        let sender = MllpHl7Sender::new(address, Duration::from_secs(5));

        let ack = sender.send("MSH|^~\\&|A\r").await.unwrap();
        assert!(!ack.is_success());
        assert_eq!(ack.text.as_deref(), Some("Bad order"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let sender = MllpHl7Sender::new(address, Duration::from_secs(2));
        let err = sender.send("MSH|^~\\&|A\r").await.unwrap_err();
        assert!(matches!(err, RadiologyError::Transport(_)));
    }

    #[tokio::test]
    async fn test_timeout_without_acknowledgment() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let sender = MllpHl7Sender::new(address, Duration::from_millis(200));
        let err = sender.send("MSH|^~\\&|A\r").await.unwrap_err();
        assert!(matches!(err, RadiologyError::Transport(_)));
    }
}
