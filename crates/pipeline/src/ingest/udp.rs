//! UDP 수신 서버
//!
//! 데이터그램 하나를 메시지 하나로 취급합니다. `max_message_size`보다 큰
//! 데이터그램은 잘립니다. 빈 데이터그램도 디스패치합니다.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use logsift_core::metrics as m;
use logsift_core::types::IngestMode;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{InflightGuard, RawMessage, TaskLimiter, dispatch_raw};
use crate::config::IngestConfig;
use crate::dispatch::Dispatcher;
use crate::error::LogPipelineError;

/// UDP 수신 서버
pub struct UdpIngest {
    socket: UdpSocket,
    config: IngestConfig,
    dispatcher: Arc<Dispatcher>,
    cancel: CancellationToken,
    limiter: TaskLimiter,
}

impl UdpIngest {
    /// 설정된 주소에 UDP 소켓을 바인드합니다.
    ///
    /// # Errors
    /// 바인드 실패 시 [`LogPipelineError::Ingest`]
    pub async fn bind(
        config: IngestConfig,
        dispatcher: Arc<Dispatcher>,
        cancel: CancellationToken,
    ) -> Result<Self, LogPipelineError> {
        config.validate()?;

        let socket =
            UdpSocket::bind(&config.bind_addr)
                .await
                .map_err(|e| LogPipelineError::Ingest {
                    mode: IngestMode::Udp.to_string(),
                    reason: format!("failed to bind to {}: {e}", config.bind_addr),
                })?;

        let limiter = TaskLimiter::new(config.concurrency_limit());
        Ok(Self {
            socket,
            config,
            dispatcher,
            cancel,
            limiter,
        })
    }

    /// 실제 바인드된 주소
    pub fn local_addr(&self) -> Result<SocketAddr, LogPipelineError> {
        Ok(self.socket.local_addr()?)
    }

    /// 취소될 때까지 데이터그램 수신 루프를 실행합니다.
    pub async fn run(self) -> Result<(), LogPipelineError> {
        info!(
            bind_addr = %self.config.bind_addr,
            max_concurrency = self.config.max_concurrency,
            "UDP ingest listening"
        );

        let mut buf = vec![0u8; self.config.max_message_size];

        loop {
            let (n, peer) = tokio::select! {
                result = self.socket.recv_from(&mut buf) => match result {
                    Ok(received) => received,
                    Err(e) => {
                        metrics::counter!(m::INGEST_READ_ERRORS_TOTAL, m::LABEL_MODE => "udp")
                            .increment(1);
                        warn!(error = %e, "recv failed");
                        continue;
                    }
                },
                _ = self.cancel.cancelled() => break,
            };

            // 버퍼는 다음 recv에 재사용하므로 태스크에는 복사본을 넘긴다
            let raw = RawMessage::new(Bytes::copy_from_slice(&buf[..n]), peer.to_string());

            let permit = tokio::select! {
                permit = self.limiter.acquire() => permit,
                _ = self.cancel.cancelled() => break,
            };

            let dispatcher = self.dispatcher.clone();
            tokio::spawn(async move {
                let _inflight = InflightGuard::enter();
                dispatch_raw(&dispatcher, IngestMode::Udp, raw).await;
                drop(permit);
            });
        }

        info!("UDP ingest received shutdown signal");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IngestConfigBuilder;
    use crate::dispatch::DispatcherBuilder;
    use crate::rule::Classifier;
    use std::time::Duration;

    #[tokio::test]
    async fn binds_ephemeral_port_and_stops_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = Arc::new(
            DispatcherBuilder::new(Arc::new(Classifier::new(vec![])))
                .local_path(dir.path().join("syslog.log"))
                .build(),
        );
        let config = IngestConfigBuilder::new()
            .mode(IngestMode::Udp)
            .bind_addr("127.0.0.1:0")
            .build()
            .unwrap();
        let cancel = CancellationToken::new();
        let server = UdpIngest::bind(config, dispatcher, cancel.clone())
            .await
            .unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);

        let handle = tokio::spawn(server.run());
        cancel.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
