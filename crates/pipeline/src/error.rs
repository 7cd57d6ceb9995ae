//! 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 규칙 로딩, 수신, 싱크 기록 중 발생하는 에러를 표현합니다.
//! 저장소 에러는 [`StorageError`]를 그대로 감쌉니다.

use logsift_core::error::StorageError;

/// 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 규칙 파일 로딩 실패 (읽기, JSON 파싱, include 순환, 제한 초과)
    #[error("rule load error: {path}: {reason}")]
    RuleLoad {
        /// 규칙 파일 경로
        path: String,
        /// 로딩 실패 사유
        reason: String,
    },

    /// 와일드카드 패턴 컴파일 실패
    #[error("invalid pattern '{pattern}': {reason}")]
    Pattern {
        /// 원본 와일드카드 패턴
        pattern: String,
        /// 실패 사유
        reason: String,
    },

    /// 수신 서버 에러 (바인드, accept, recv)
    #[error("ingest error: {mode}: {reason}")]
    Ingest {
        /// 수신 모드 (tcp, udp)
        mode: String,
        /// 에러 사유
        reason: String,
    },

    /// 싱크 기록 실패
    #[error("sink error: {sink}: {reason}")]
    Sink {
        /// 싱크 이름 (local, database, forward)
        sink: String,
        /// 에러 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 저장소 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
