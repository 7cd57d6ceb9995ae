//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 분류 엔진, 수신 서버, 싱크가 공유하는 데이터 구조를 정의합니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 규칙이 하나도 매칭되지 않았을 때 사용하는 레벨
pub const FALLBACK_LEVEL: &str = "info";

/// 로컬 로그와 관계형 저장소가 공유하는 타임스탬프 형식 (`YYYY-MM-DD HH:MM:SS`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 분류 결과
///
/// 하나의 입력 메시지에 대해 선택된 (치환된) 메시지와 레벨입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Classification {
    /// 변수 치환이 끝난 메시지
    pub message: String,
    /// 심각도 레이블 (규칙이 정의한 문자열 그대로)
    pub level: String,
}

impl Classification {
    /// 새 분류 결과를 생성합니다.
    pub fn new(message: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: level.into(),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// 싱크에 기록되는 한 건의 레코드
///
/// 하나의 메시지를 여러 싱크에 쓸 때 모든 싱크가 같은 타임스탬프를 보도록
/// 디스패치 시점에 한 번 생성합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkRecord {
    /// `YYYY-MM-DD HH:MM:SS` 형식의 로컬 시각
    pub timestamp: String,
    /// 레벨
    pub level: String,
    /// 메시지
    pub message: String,
}

impl SinkRecord {
    /// 분류 결과와 타임스탬프로 레코드를 만듭니다.
    pub fn new(timestamp: impl Into<String>, classification: Classification) -> Self {
        Self {
            timestamp: timestamp.into(),
            level: classification.level,
            message: classification.message,
        }
    }
}

/// 수신 모드
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// 연결당 한 메시지를 읽는 TCP 스트림 모드 (기본값)
    #[default]
    Tcp,
    /// 데이터그램당 한 메시지를 처리하는 UDP 모드
    Udp,
}

impl IngestMode {
    /// 설정/메트릭 레이블에 쓰는 문자열을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

impl fmt::Display for IngestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IngestMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            other => Err(ConfigError::InvalidValue {
                field: "server.mode".to_owned(),
                reason: format!("unknown mode '{other}', use 'tcp' or 'udp'"),
            }),
        }
    }
}
