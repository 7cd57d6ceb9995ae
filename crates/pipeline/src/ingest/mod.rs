//! 수신 서버 -- 네트워크에서 원시 메시지를 받아 디스패처로 전달합니다.
//!
//! # 수신 모드
//! - [`TcpIngest`]: 연결마다 한 번 읽고 연결을 닫음
//! - [`UdpIngest`]: 데이터그램마다 한 메시지
//!
//! # 아키텍처
//! 수신 루프 하나가 연결/데이터그램마다 `tokio::spawn`으로 태스크를 만들고,
//! 각 태스크가 [`Dispatcher::dispatch`]를 호출합니다.
//! `max_concurrency`가 설정되면 세마포어 허가를 얻을 때까지 수신 루프가 기다립니다.
//! 취소 토큰이 취소되면 수신을 멈추고 진행 중인 태스크는 기다리지 않습니다.

pub mod tcp;
pub mod udp;

pub use tcp::TcpIngest;
pub use udp::UdpIngest;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use logsift_core::metrics as m;
use logsift_core::types::IngestMode;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::IngestConfig;
use crate::dispatch::Dispatcher;
use crate::error::LogPipelineError;

/// 수신된 원시 메시지
#[derive(Debug, Clone)]
pub struct RawMessage {
    /// 원시 바이트 (최대 메시지 크기로 잘린 상태)
    pub data: Bytes,
    /// 송신자 주소
    pub source: String,
    /// 수신 시각 (디스패치 지연 측정용)
    pub received_at: Instant,
}

impl RawMessage {
    /// 새 RawMessage를 생성합니다.
    pub fn new(data: Bytes, source: impl Into<String>) -> Self {
        Self {
            data,
            source: source.into(),
            received_at: Instant::now(),
        }
    }

    /// UTF-8로 디코딩(잘못된 바이트는 대체 문자)하고 앞뒤 공백을 제거합니다.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).trim().to_owned()
    }

    /// 수신 이후 경과 시간
    pub fn age(&self) -> Duration {
        self.received_at.elapsed()
    }
}

/// 설정된 모드로 바인드된 수신 서버
pub enum IngestServer {
    /// TCP 수신 서버
    Tcp(TcpIngest),
    /// UDP 수신 서버
    Udp(UdpIngest),
}

impl IngestServer {
    /// 설정의 모드에 따라 소켓을 바인드합니다.
    pub async fn bind(
        config: IngestConfig,
        dispatcher: Arc<Dispatcher>,
        cancel: CancellationToken,
    ) -> Result<Self, LogPipelineError> {
        match config.mode {
            IngestMode::Tcp => Ok(Self::Tcp(
                TcpIngest::bind(config, dispatcher, cancel).await?,
            )),
            IngestMode::Udp => Ok(Self::Udp(
                UdpIngest::bind(config, dispatcher, cancel).await?,
            )),
        }
    }

    /// 수신 모드
    pub fn mode(&self) -> IngestMode {
        match self {
            Self::Tcp(_) => IngestMode::Tcp,
            Self::Udp(_) => IngestMode::Udp,
        }
    }

    /// 실제 바인드된 주소
    pub fn local_addr(&self) -> Result<SocketAddr, LogPipelineError> {
        match self {
            Self::Tcp(server) => server.local_addr(),
            Self::Udp(server) => server.local_addr(),
        }
    }

    /// 취소될 때까지 수신 루프를 실행합니다.
    pub async fn run(self) -> Result<(), LogPipelineError> {
        match self {
            Self::Tcp(server) => server.run().await,
            Self::Udp(server) => server.run().await,
        }
    }
}

/// 선택적 동시 처리 상한
#[derive(Debug, Clone)]
pub(crate) struct TaskLimiter {
    semaphore: Option<Arc<Semaphore>>,
}

impl TaskLimiter {
    pub(crate) fn new(limit: Option<usize>) -> Self {
        Self {
            semaphore: limit.map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    /// 허가를 기다립니다. 상한이 없으면 즉시 `None`을 반환합니다.
    pub(crate) async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        match &self.semaphore {
            Some(semaphore) => semaphore.clone().acquire_owned().await.ok(),
            None => None,
        }
    }
}

/// 메시지 한 건을 디스패치합니다. 태스크 안에서 호출됩니다.
pub(crate) async fn dispatch_raw(dispatcher: &Dispatcher, mode: IngestMode, raw: RawMessage) {
    metrics::counter!(m::INGEST_MESSAGES_RECEIVED_TOTAL, m::LABEL_MODE => mode.as_str())
        .increment(1);

    let text = raw.text();
    debug!(mode = %mode, peer = %raw.source, bytes = raw.data.len(), "message received");
    dispatcher.dispatch(&text).await;

    // 허가 대기 시간을 포함한 수신부터 모든 싱크 기록까지
    metrics::histogram!(m::INGEST_DISPATCH_DURATION_SECONDS, m::LABEL_MODE => mode.as_str())
        .record(raw.age().as_secs_f64());
}

/// 진행 중인 태스크 게이지를 태스크 수명 동안 유지합니다.
pub(crate) struct InflightGuard;

impl InflightGuard {
    pub(crate) fn enter() -> Self {
        metrics::gauge!(m::INGEST_INFLIGHT_TASKS).increment(1.0);
        Self
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        metrics::gauge!(m::INGEST_INFLIGHT_TASKS).decrement(1.0);
    }
}
