//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logsift_`
//! - 모듈명: `ingest_`, `classifier_`, `sink_`
//! - 접미어: `_total` (counter), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use logsift_core::metrics as m;
//!
//! metrics::counter!(m::INGEST_MESSAGES_RECEIVED_TOTAL, m::LABEL_MODE => "tcp").increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 수신 모드 레이블 키 (tcp, udp)
pub const LABEL_MODE: &str = "mode";

/// 매칭 규칙 레이블 키 (평탄화된 규칙 인덱스 또는 fallback)
pub const LABEL_RULE: &str = "rule";

/// 싱크 레이블 키 (local, database, forward)
pub const LABEL_SINK: &str = "sink";

// ─── Ingest 메트릭 ─────────────────────────────────────────────────

/// Ingest: 수신된 메시지 수 (counter, label: mode)
pub const INGEST_MESSAGES_RECEIVED_TOTAL: &str = "logsift_ingest_messages_received_total";

/// Ingest: 연결/데이터그램 읽기 실패 수 (counter, label: mode)
pub const INGEST_READ_ERRORS_TOTAL: &str = "logsift_ingest_read_errors_total";

/// Ingest: 현재 처리 중인 메시지 태스크 수 (gauge)
pub const INGEST_INFLIGHT_TASKS: &str = "logsift_ingest_inflight_tasks";

/// Ingest: 수신부터 모든 싱크 기록까지 걸린 시간 (histogram, 초, label: mode)
pub const INGEST_DISPATCH_DURATION_SECONDS: &str = "logsift_ingest_dispatch_duration_seconds";

// ─── Classifier 메트릭 ─────────────────────────────────────────────

/// Classifier: 분류된 메시지 수 (counter, label: rule)
pub const CLASSIFIER_MESSAGES_CLASSIFIED_TOTAL: &str =
    "logsift_classifier_messages_classified_total";

/// Classifier: 어떤 규칙에도 매칭되지 않아 기본 분류된 메시지 수 (counter)
pub const CLASSIFIER_FALLBACK_TOTAL: &str = "logsift_classifier_fallback_total";

/// Classifier: 로드된 규칙 수 (gauge)
pub const CLASSIFIER_RULES_LOADED: &str = "logsift_classifier_rules_loaded";

// ─── Sink 메트릭 ───────────────────────────────────────────────────

/// Sink: 기록 성공 수 (counter, label: sink)
pub const SINK_WRITES_TOTAL: &str = "logsift_sink_writes_total";

/// Sink: 기록 실패 수 (counter, label: sink)
pub const SINK_WRITE_ERRORS_TOTAL: &str = "logsift_sink_write_errors_total";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더 설치 직후 한 번 호출합니다. 레코더가 없으면 아무 일도 하지 않습니다.
pub fn describe_all() {
    use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};

    describe_counter!(
        INGEST_MESSAGES_RECEIVED_TOTAL,
        "Total number of messages received per ingest mode"
    );
    describe_counter!(
        INGEST_READ_ERRORS_TOTAL,
        "Connection or datagram read failures per ingest mode"
    );
    describe_gauge!(
        INGEST_INFLIGHT_TASKS,
        "Number of per-message tasks currently running"
    );
    describe_histogram!(
        INGEST_DISPATCH_DURATION_SECONDS,
        Unit::Seconds,
        "Time from message receipt until every sink was written"
    );

    describe_counter!(
        CLASSIFIER_MESSAGES_CLASSIFIED_TOTAL,
        "Total number of messages classified, by matched rule index"
    );
    describe_counter!(
        CLASSIFIER_FALLBACK_TOTAL,
        "Messages that matched no rule and received the built-in classification"
    );
    describe_gauge!(
        CLASSIFIER_RULES_LOADED,
        "Number of rules in the flattened rule set"
    );

    describe_counter!(SINK_WRITES_TOTAL, "Successful sink writes per sink");
    describe_counter!(SINK_WRITE_ERRORS_TOTAL, "Failed sink writes per sink");
}
