//! 싱크 -- 분류된 메시지를 기록하는 대상
//!
//! - [`LocalFileSink`]: 추가 전용 로컬 텍스트 파일 (쓰기마다 열고 닫음)
//! - [`RelationalSink`]: 단일 뮤텍스로 직렬화된 관계형 저장소 ([`MySqlStore`])
//! - [`RemoteForwarder`]: 원격 TCP 수신기로 한 줄 전달
//!
//! 싱크들은 서로 독립적입니다. 한 싱크의 실패가 다른 싱크의 기록을
//! 막거나 되돌리지 않습니다.

pub mod forward;
pub mod local;
pub mod relational;

pub use forward::RemoteForwarder;
pub use local::LocalFileSink;
pub use relational::{MySqlStore, RelationalSink};

/// 로컬 파일 싱크 이름 (로그/메트릭 레이블)
pub const SINK_LOCAL: &str = "local";
/// 관계형 저장소 싱크 이름
pub const SINK_DATABASE: &str = "database";
/// 원격 전달 싱크 이름
pub const SINK_FORWARD: &str = "forward";
