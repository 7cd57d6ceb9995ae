//! 규칙 분류 엔진 -- JSON 규칙 기반 메시지 분류
//!
//! 공백으로 나눈 메시지 토큰을 평탄화된 규칙 목록에 대해 순서대로 평가하고,
//! 처음 참이 되는 규칙의 메시지/레벨 템플릿을 치환하여 반환합니다.
//!
//! # 규칙 형식
//! ```json
//! {
//!   "logic": [
//!     { "condition": "$0==ERR*", "message": "err: $0", "level": "error" },
//!     { "include": "auth.rules" },
//!     { "condition": "default", "message": "$0", "level": "info" }
//!   ]
//! }
//! ```
//!
//! # 아키텍처
//! - [`Classifier`]: 평탄화된 규칙과 미리 컴파일된 조건을 보유, `Arc`로 공유
//! - [`loader`]: JSON 파일 로딩 및 include 해석
//! - [`condition`]: `default` / `LEFT==RIGHT` 조건 평가
//! - [`pattern`]: 와일드카드 -> 정규식 변환 및 매칭
//! - [`substitute`]: `$N` 위치 변수 치환
//! - [`types`]: 규칙 문서 데이터 구조 정의

pub mod condition;
pub mod loader;
pub mod pattern;
pub mod substitute;
pub mod types;

pub use condition::Condition;
pub use loader::RuleLoader;
pub use types::{LogicEntry, RuleDocument};

use std::path::Path;

use logsift_core::metrics as m;
use logsift_core::types::{Classification, FALLBACK_LEVEL};

use crate::error::LogPipelineError;
use substitute::substitute;

/// 메시지를 공백 기준 토큰으로 나눕니다.
///
/// 연속된 공백은 하나의 구분자로 취급하고 빈 토큰은 만들지 않습니다.
pub fn tokenize(message: &str) -> Vec<&str> {
    message.split_whitespace().collect()
}

/// 규칙 목록으로 토큰을 분류합니다.
///
/// include 지시자는 건너뛰고, 처음 참이 되는 규칙의 메시지와 레벨을
/// 치환하여 반환합니다. 매칭되는 규칙이 없으면 토큰을 공백 하나로
/// 이어 붙인 메시지와 `info` 레벨을 반환합니다.
pub fn classify<S: AsRef<str>>(rules: &[LogicEntry], tokens: &[S]) -> Classification {
    rules
        .iter()
        .filter(|rule| !rule.is_include())
        .find(|rule| condition::evaluate(&rule.condition, tokens))
        .map(|rule| render(rule, tokens))
        .unwrap_or_else(|| fallback(tokens))
}

fn render<S: AsRef<str>>(rule: &LogicEntry, tokens: &[S]) -> Classification {
    Classification::new(
        substitute(&rule.message, tokens),
        substitute(&rule.level, tokens),
    )
}

fn fallback<S: AsRef<str>>(tokens: &[S]) -> Classification {
    let message = tokens
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");
    Classification::new(message, FALLBACK_LEVEL)
}

/// 규칙 분류기
///
/// 로드 이후 변경되지 않으므로 `Arc<Classifier>`로 모든 태스크가
/// 동기화 없이 공유합니다. 조건 패턴은 생성 시 한 번만 컴파일합니다.
///
/// # 사용 예시
/// ```ignore
/// let classifier = Classifier::load("/etc/logsift/rules/syslog.rules").await?;
/// let tokens = tokenize("ERROR101 failed");
/// let result = classifier.classify(&tokens);
/// ```
#[derive(Debug)]
pub struct Classifier {
    /// 평탄화된 규칙 목록
    rules: Vec<LogicEntry>,
    /// (규칙 인덱스, 컴파일된 조건), include 지시자 제외
    compiled: Vec<(usize, Condition)>,
}

impl Classifier {
    /// 규칙 목록으로 분류기를 생성합니다.
    pub fn new(rules: Vec<LogicEntry>) -> Self {
        let compiled = rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| !rule.is_include())
            .map(|(idx, rule)| (idx, Condition::parse(&rule.condition)))
            .collect();

        metrics::gauge!(m::CLASSIFIER_RULES_LOADED).set(rules.len() as f64);

        Self { rules, compiled }
    }

    /// 루트 규칙 파일을 로드하여 분류기를 생성합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogPipelineError> {
        let rules = RuleLoader::load(path).await?;
        Ok(Self::new(rules))
    }

    /// 토큰에 처음 매칭되는 규칙과 그 인덱스를 반환합니다.
    pub fn matching_rule<S: AsRef<str>>(&self, tokens: &[S]) -> Option<(usize, &LogicEntry)> {
        self.compiled
            .iter()
            .find(|(_, condition)| condition.evaluate(tokens))
            .map(|(idx, _)| (*idx, &self.rules[*idx]))
    }

    /// 토큰을 분류합니다. [`classify`]와 같은 결과를 반환합니다.
    pub fn classify<S: AsRef<str>>(&self, tokens: &[S]) -> Classification {
        self.classify_indexed(tokens).1
    }

    /// 토큰을 분류하고 매칭된 규칙의 인덱스를 함께 반환합니다.
    ///
    /// 기본 분류가 적용되면 인덱스는 `None`입니다.
    pub fn classify_indexed<S: AsRef<str>>(
        &self,
        tokens: &[S],
    ) -> (Option<usize>, Classification) {
        match self.matching_rule(tokens) {
            Some((idx, rule)) => (Some(idx), render(rule, tokens)),
            None => {
                metrics::counter!(m::CLASSIFIER_FALLBACK_TOTAL).increment(1);
                (None, fallback(tokens))
            }
        }
    }

    /// 평탄화된 규칙 목록
    pub fn rules(&self) -> &[LogicEntry] {
        &self.rules
    }

    /// 규칙 수
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 규칙이 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
