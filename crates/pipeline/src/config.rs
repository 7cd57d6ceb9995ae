//! 수신 서버 설정
//!
//! [`IngestConfig`]는 core의 [`ServerConfig`]에서 수신 서버가 쓰는 값만
//! 골라 타입이 있는 형태로 변환한 설정입니다.

use std::time::Duration;

use logsift_core::config::ServerConfig;
use logsift_core::types::IngestMode;

use crate::error::LogPipelineError;

/// UDP 데이터그램 최대 페이로드
const MAX_MESSAGE_SIZE: usize = 65_535;

/// 수신 서버 설정
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// 수신 모드
    pub mode: IngestMode,
    /// 바인드 주소 (예: "0.0.0.0:514")
    pub bind_addr: String,
    /// 메시지 한 건의 최대 크기 (바이트, 초과분은 잘림)
    pub max_message_size: usize,
    /// TCP 읽기 타임아웃 (초, 0이면 무제한)
    pub read_timeout_secs: u64,
    /// 동시 처리 태스크 상한 (0이면 무제한)
    pub max_concurrency: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            mode: IngestMode::Tcp,
            bind_addr: "0.0.0.0:514".to_owned(),
            max_message_size: 2048,
            read_timeout_secs: 0,
            max_concurrency: 0,
        }
    }
}

impl IngestConfig {
    /// core 설정의 `[server]` 섹션에서 변환합니다.
    pub fn from_core(core: &ServerConfig) -> Result<Self, LogPipelineError> {
        let mode = core.ingest_mode().map_err(|e| LogPipelineError::Config {
            field: "server.mode".to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            mode,
            bind_addr: core.listen_address(),
            max_message_size: core.max_message_size,
            read_timeout_secs: core.read_timeout_secs,
            max_concurrency: core.max_concurrency,
        })
    }

    /// 설정 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        if self.bind_addr.is_empty() {
            return Err(LogPipelineError::Config {
                field: "bind_addr".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.max_message_size == 0 || self.max_message_size > MAX_MESSAGE_SIZE {
            return Err(LogPipelineError::Config {
                field: "max_message_size".to_owned(),
                reason: format!("must be 1-{MAX_MESSAGE_SIZE}"),
            });
        }

        Ok(())
    }

    /// 읽기 타임아웃 (설정되지 않았으면 `None`)
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_secs > 0).then(|| Duration::from_secs(self.read_timeout_secs))
    }

    /// 동시 처리 상한 (무제한이면 `None`)
    pub fn concurrency_limit(&self) -> Option<usize> {
        (self.max_concurrency > 0).then_some(self.max_concurrency)
    }
}

/// [`IngestConfig`] 빌더
#[derive(Debug, Default)]
pub struct IngestConfigBuilder {
    config: IngestConfig,
}

impl IngestConfigBuilder {
    /// 기본값으로 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 수신 모드를 설정합니다.
    pub fn mode(mut self, mode: IngestMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// 바인드 주소를 설정합니다.
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_addr = addr.into();
        self
    }

    /// 메시지 최대 크기를 설정합니다.
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// TCP 읽기 타임아웃을 설정합니다.
    pub fn read_timeout_secs(mut self, secs: u64) -> Self {
        self.config.read_timeout_secs = secs;
        self
    }

    /// 동시 처리 상한을 설정합니다.
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.config.max_concurrency = limit;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    pub fn build(self) -> Result<IngestConfig, LogPipelineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
