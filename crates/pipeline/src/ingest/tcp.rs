//! TCP 수신 서버
//!
//! 연결마다 태스크 하나를 만들어 최대 `max_message_size` 바이트를 한 번 읽고,
//! 읽은 바이트가 있으면 디스패치한 뒤 연결을 닫습니다.
//! 프레이밍은 하지 않으므로 한 번의 읽기에 담긴 내용이 곧 메시지입니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use logsift_core::metrics as m;
use logsift_core::types::IngestMode;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{InflightGuard, RawMessage, TaskLimiter, dispatch_raw};
use crate::config::IngestConfig;
use crate::dispatch::Dispatcher;
use crate::error::LogPipelineError;

/// TCP 수신 서버
///
/// [`bind`](Self::bind)로 소켓을 연 뒤 [`run`](Self::run)으로 수락 루프를 실행합니다.
pub struct TcpIngest {
    listener: TcpListener,
    config: IngestConfig,
    dispatcher: Arc<Dispatcher>,
    cancel: CancellationToken,
    limiter: TaskLimiter,
}

impl TcpIngest {
    /// 설정된 주소에 TCP 리스너를 바인드합니다.
    ///
    /// # Errors
    /// 바인드 실패 시 [`LogPipelineError::Ingest`]
    pub async fn bind(
        config: IngestConfig,
        dispatcher: Arc<Dispatcher>,
        cancel: CancellationToken,
    ) -> Result<Self, LogPipelineError> {
        config.validate()?;

        let listener =
            TcpListener::bind(&config.bind_addr)
                .await
                .map_err(|e| LogPipelineError::Ingest {
                    mode: IngestMode::Tcp.to_string(),
                    reason: format!("failed to bind to {}: {e}", config.bind_addr),
                })?;

        let limiter = TaskLimiter::new(config.concurrency_limit());
        Ok(Self {
            listener,
            config,
            dispatcher,
            cancel,
            limiter,
        })
    }

    /// 실제 바인드된 주소 (포트 0으로 바인드한 경우 확인용)
    pub fn local_addr(&self) -> Result<SocketAddr, LogPipelineError> {
        Ok(self.listener.local_addr()?)
    }

    /// 취소될 때까지 연결 수락 루프를 실행합니다.
    ///
    /// 일시적인 accept 실패는 경고 후 계속 진행합니다.
    pub async fn run(self) -> Result<(), LogPipelineError> {
        info!(
            bind_addr = %self.config.bind_addr,
            max_concurrency = self.config.max_concurrency,
            "TCP ingest listening"
        );

        let read_timeout = self.config.read_timeout();

        loop {
            let (stream, peer) = tokio::select! {
                result = self.listener.accept() => match result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        metrics::counter!(m::INGEST_READ_ERRORS_TOTAL, m::LABEL_MODE => "tcp")
                            .increment(1);
                        warn!(error = %e, "accept failed");
                        continue;
                    }
                },
                _ = self.cancel.cancelled() => break,
            };

            let permit = tokio::select! {
                permit = self.limiter.acquire() => permit,
                _ = self.cancel.cancelled() => break,
            };

            debug!(peer = %peer, "accepted connection");

            let dispatcher = self.dispatcher.clone();
            let max_size = self.config.max_message_size;
            tokio::spawn(async move {
                let _inflight = InflightGuard::enter();
                Self::handle_connection(stream, peer, &dispatcher, max_size, read_timeout).await;
                drop(permit);
            });
        }

        info!("TCP ingest received shutdown signal");
        Ok(())
    }

    /// 연결 하나에서 한 번 읽고 디스패치합니다.
    async fn handle_connection(
        mut stream: TcpStream,
        peer: SocketAddr,
        dispatcher: &Dispatcher,
        max_size: usize,
        read_timeout: Option<Duration>,
    ) {
        let mut buf = vec![0u8; max_size];

        let read = match read_timeout {
            Some(limit) => match timeout(limit, stream.read(&mut buf)).await {
                Ok(result) => result,
                Err(_) => {
                    metrics::counter!(m::INGEST_READ_ERRORS_TOTAL, m::LABEL_MODE => "tcp")
                        .increment(1);
                    warn!(peer = %peer, timeout_secs = limit.as_secs(), "read timed out");
                    return;
                }
            },
            None => stream.read(&mut buf).await,
        };

        let n = match read {
            Ok(n) => n,
            Err(e) => {
                metrics::counter!(m::INGEST_READ_ERRORS_TOTAL, m::LABEL_MODE => "tcp")
                    .increment(1);
                warn!(peer = %peer, error = %e, "read failed");
                return;
            }
        };

        if n == 0 {
            debug!(peer = %peer, "connection closed without data");
            return;
        }

        buf.truncate(n);
        let raw = RawMessage::new(Bytes::from(buf), peer.to_string());
        dispatch_raw(dispatcher, IngestMode::Tcp, raw).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IngestConfigBuilder;
    use crate::dispatch::DispatcherBuilder;
    use crate::rule::Classifier;

    fn dispatcher(dir: &std::path::Path) -> Arc<Dispatcher> {
        Arc::new(
            DispatcherBuilder::new(Arc::new(Classifier::new(vec![])))
                .local_path(dir.join("syslog.log"))
                .build(),
        )
    }

    #[tokio::test]
    async fn bind_failure_is_ingest_error() {
        let dir = tempfile::tempdir().unwrap();
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = IngestConfigBuilder::new()
            .bind_addr(taken.local_addr().unwrap().to_string())
            .build()
            .unwrap();

        let result = TcpIngest::bind(config, dispatcher(dir.path()), CancellationToken::new()).await;
        assert!(matches!(result, Err(LogPipelineError::Ingest { .. })));
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let config = IngestConfigBuilder::new()
            .bind_addr("127.0.0.1:0")
            .build()
            .unwrap();
        let server = TcpIngest::bind(config, dispatcher(dir.path()), cancel.clone())
            .await
            .unwrap();

        let handle = tokio::spawn(server.run());
        cancel.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
