#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`rule`]: 규칙 문서 로딩, 패턴 매칭, 변수 치환, 분류기
//! - [`ingest`]: TCP/UDP 수신 서버 (메시지당 태스크 하나)
//! - [`sink`]: 로컬 파일, 관계형 저장소, 원격 전달
//! - [`dispatch`]: 토큰화 -> 분류 -> 싱크 기록
//! - [`config`]: 수신 서버 설정 (core 설정에서 변환)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! TcpIngest / UdpIngest -> Dispatcher -> Classifier -> LocalFileSink
//!        |                     |             |         -> RelationalSink (선택)
//!   메시지당 태스크        Arc 공유      평탄화된 규칙  -> RemoteForwarder (선택)
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod ingest;
pub mod rule;
pub mod sink;

// --- 주요 타입 re-export ---

// 설정
pub use config::{IngestConfig, IngestConfigBuilder};

// 에러
pub use error::LogPipelineError;

// 규칙 엔진
pub use rule::{Classifier, LogicEntry, RuleDocument, RuleLoader, classify, tokenize};

// 디스패치
pub use dispatch::{Dispatcher, DispatcherBuilder};

// 수신 서버
pub use ingest::{IngestServer, RawMessage, TcpIngest, UdpIngest};

// 싱크
pub use sink::{LocalFileSink, MySqlStore, RelationalSink, RemoteForwarder};
