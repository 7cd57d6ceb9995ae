//! 메시지 디스패처 -- 토큰화, 분류, 싱크 기록
//!
//! 수신 서버의 메시지당 태스크가 호출하는 공통 경로입니다.
//! 싱크는 로컬 파일 -> 관계형 저장소 -> 원격 전달 순서로 기록하며,
//! 각 싱크의 실패는 로그와 메트릭으로만 남기고 다음 싱크로 진행합니다.

use std::path::PathBuf;
use std::sync::Arc;

use logsift_core::metrics as m;
use logsift_core::types::{Classification, SinkRecord, TIMESTAMP_FORMAT};
use tracing::{debug, warn};

use crate::error::LogPipelineError;
use crate::rule::{Classifier, tokenize};
use crate::sink::{
    LocalFileSink, RelationalSink, RemoteForwarder, SINK_DATABASE, SINK_FORWARD, SINK_LOCAL,
};

/// 어떤 규칙에도 매칭되지 않은 메시지의 `rule` 레이블 값
const RULE_LABEL_FALLBACK: &str = "fallback";

/// 메시지 디스패처
///
/// 분류기와 싱크를 소유하며 `Arc<Dispatcher>`로 모든 태스크가 공유합니다.
///
/// # 사용 예시
/// ```ignore
/// let dispatcher = DispatcherBuilder::new(Arc::new(classifier))
///     .local_path("syslog.log")
///     .relational(RelationalSink::new(Box::new(store)))
///     .build();
///
/// let result = dispatcher.dispatch("ERROR101 failed").await;
/// ```
#[derive(Debug)]
pub struct Dispatcher {
    classifier: Arc<Classifier>,
    local: LocalFileSink,
    relational: Option<RelationalSink>,
    forwarder: Option<RemoteForwarder>,
}

impl Dispatcher {
    /// 메시지 한 건을 분류하고 모든 싱크에 기록합니다.
    ///
    /// 싱크 실패와 무관하게 분류 결과를 반환합니다.
    pub async fn dispatch(&self, message: &str) -> Classification {
        let tokens = tokenize(message);
        let (matched, classification) = self.classifier.classify_indexed(&tokens);

        metrics::counter!(
            m::CLASSIFIER_MESSAGES_CLASSIFIED_TOTAL,
            m::LABEL_RULE => rule_label(matched)
        )
        .increment(1);
        debug!(
            rule = ?matched,
            level = %classification.level,
            message = %classification.message,
            "message classified"
        );

        // 모든 싱크가 같은 타임스탬프를 본다
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let record = SinkRecord::new(timestamp, classification.clone());

        record_outcome(SINK_LOCAL, self.local.write(&record).await);

        if let Some(relational) = &self.relational {
            record_outcome(SINK_DATABASE, relational.write(&record).await);
        }

        if let Some(forwarder) = &self.forwarder {
            record_outcome(SINK_FORWARD, forwarder.send(&classification).await);
        }

        classification
    }

    /// 공유 분류기
    pub fn classifier(&self) -> &Arc<Classifier> {
        &self.classifier
    }

    /// 관계형 저장소 싱크가 연결되어 있는지 여부
    pub fn has_relational(&self) -> bool {
        self.relational.is_some()
    }

    /// 원격 전달이 디스패치 경로에 연결되어 있는지 여부
    pub fn has_forwarder(&self) -> bool {
        self.forwarder.is_some()
    }
}

/// 분류 카운터의 `rule` 레이블 값
///
/// 치환된 레벨 대신 규칙 인덱스를 쓰므로 시리즈 수는 규칙 수 + 1을 넘지 않는다.
fn rule_label(matched: Option<usize>) -> String {
    matched.map_or_else(|| RULE_LABEL_FALLBACK.to_owned(), |idx| idx.to_string())
}

fn record_outcome(sink: &'static str, result: Result<(), LogPipelineError>) {
    match result {
        Ok(()) => {
            metrics::counter!(m::SINK_WRITES_TOTAL, m::LABEL_SINK => sink).increment(1);
        }
        Err(e) => {
            metrics::counter!(m::SINK_WRITE_ERRORS_TOTAL, m::LABEL_SINK => sink).increment(1);
            warn!(sink, error = %e, "sink write failed");
        }
    }
}

/// [`Dispatcher`] 빌더
pub struct DispatcherBuilder {
    classifier: Arc<Classifier>,
    local_path: PathBuf,
    relational: Option<RelationalSink>,
    forwarder: Option<RemoteForwarder>,
}

impl DispatcherBuilder {
    /// 분류기로 빌더를 생성합니다. 로컬 로그 경로 기본값은 `syslog.log`입니다.
    pub fn new(classifier: Arc<Classifier>) -> Self {
        Self {
            classifier,
            local_path: PathBuf::from("syslog.log"),
            relational: None,
            forwarder: None,
        }
    }

    /// 로컬 로그 파일 경로를 설정합니다.
    pub fn local_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_path = path.into();
        self
    }

    /// 관계형 저장소 싱크를 연결합니다.
    pub fn relational(mut self, sink: RelationalSink) -> Self {
        self.relational = Some(sink);
        self
    }

    /// 원격 전달을 디스패치 경로에 연결합니다.
    ///
    /// 비활성 전달기(주소 없음)는 연결하지 않습니다.
    pub fn forwarder(mut self, forwarder: RemoteForwarder) -> Self {
        self.forwarder = forwarder.is_enabled().then_some(forwarder);
        self
    }

    /// 디스패처를 빌드합니다.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            classifier: self.classifier,
            local: LocalFileSink::new(self.local_path),
            relational: self.relational,
            forwarder: self.forwarder,
        }
    }
}
