//! 원격 전달 싱크
//!
//! 분류 결과를 `<level> - syslog: <message>` 한 줄로 원격 TCP 수신기에 보냅니다.
//! 전달마다 새 연결을 엽니다. 주소가 비어 있으면 아무 일도 하지 않습니다.

use logsift_core::config::ForwardConfig;
use logsift_core::types::Classification;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use super::SINK_FORWARD;
use crate::error::LogPipelineError;

/// 원격 전달기
#[derive(Debug, Clone, Default)]
pub struct RemoteForwarder {
    /// `host:port`, 비활성이면 `None`
    target: Option<String>,
}

impl RemoteForwarder {
    /// 호스트와 포트로 전달기를 생성합니다. 호스트가 비어 있으면 비활성입니다.
    pub fn new(host: &str, port: u16) -> Self {
        let target = match host {
            "" => None,
            h if h.contains(':') && !h.starts_with('[') => Some(format!("[{h}]:{port}")),
            h => Some(format!("{h}:{port}")),
        };
        Self { target }
    }

    /// `[sinks.forward]` 설정으로 생성합니다.
    pub fn from_config(config: &ForwardConfig) -> Self {
        Self::new(&config.addr, config.port)
    }

    /// 전달 대상 주소
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// 전달 대상이 설정되어 있는지 여부
    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    /// 전달할 한 줄을 만듭니다.
    pub fn format_line(classification: &Classification) -> String {
        format!(
            "{} - syslog: {}\n",
            classification.level, classification.message
        )
    }

    /// 분류 결과를 원격 수신기로 보냅니다.
    pub async fn send(&self, classification: &Classification) -> Result<(), LogPipelineError> {
        let Some(target) = self.target.as_deref() else {
            return Ok(());
        };

        let mut stream = TcpStream::connect(target)
            .await
            .map_err(|e| error(target, "connect", e))?;
        stream
            .write_all(Self::format_line(classification).as_bytes())
            .await
            .map_err(|e| error(target, "write", e))?;
        stream
            .shutdown()
            .await
            .map_err(|e| error(target, "shutdown", e))?;

        Ok(())
    }
}

fn error(target: &str, op: &str, e: std::io::Error) -> LogPipelineError {
    LogPipelineError::Sink {
        sink: SINK_FORWARD.to_owned(),
        reason: format!("failed to {op} {target}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn empty_host_disables_forwarder() {
        let forwarder = RemoteForwarder::new("", 514);
        assert!(!forwarder.is_enabled());
        assert_eq!(forwarder.target(), None);
    }

    #[test]
    fn ipv6_host_is_bracketed() {
        assert_eq!(RemoteForwarder::new("::1", 514).target(), Some("[::1]:514"));
        assert_eq!(
            RemoteForwarder::new("collector", 6514).target(),
            Some("collector:6514")
        );
    }

    #[test]
    fn line_format() {
        let line = RemoteForwarder::format_line(&Classification::new("disk full", "error"));
        assert_eq!(line, "error - syslog: disk full\n");
    }

    #[tokio::test]
    async fn disabled_forwarder_is_noop() {
        RemoteForwarder::default()
            .send(&Classification::new("x", "info"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn sends_one_line_to_receiver() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let receiver = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = String::new();
            stream.read_to_string(&mut received).await.unwrap();
            received
        });

        RemoteForwarder::new("127.0.0.1", port)
            .send(&Classification::new("link down", "warn"))
            .await
            .unwrap();

        assert_eq!(receiver.await.unwrap(), "warn - syslog: link down\n");
    }

    #[tokio::test]
    async fn unreachable_target_is_sink_error() {
        // 바인드 후 바로 닫아서 연결이 거부되는 포트를 얻는다
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = RemoteForwarder::new("127.0.0.1", port)
            .send(&Classification::new("x", "info"))
            .await
            .unwrap_err();
        assert!(matches!(err, LogPipelineError::Sink { ref sink, .. } if sink == "forward"));
    }
}
