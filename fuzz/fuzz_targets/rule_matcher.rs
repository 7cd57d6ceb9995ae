#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use logsift_pipeline::{Classifier, LogicEntry, classify, tokenize};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 규칙 목록 (최대 8개로 제한)
    rules: Vec<FuzzRule>,
    /// 수신 메시지 (바이트 그대로, lossy 디코딩)
    message: Vec<u8>,
}

#[derive(Arbitrary, Debug)]
struct FuzzRule {
    condition: String,
    message: String,
    level: String,
}

fuzz_target!(|input: FuzzInput| {
    let rules: Vec<LogicEntry> = input
        .rules
        .into_iter()
        .take(8)
        .map(|r| LogicEntry::rule(r.condition, r.message, r.level))
        .collect();

    let text = String::from_utf8_lossy(&input.message);
    let tokens = tokenize(text.trim());

    // 미리 컴파일한 분류기와 즉석 평가는 항상 같은 결과를 내야 한다
    let classifier = Classifier::new(rules.clone());
    assert_eq!(classifier.classify(&tokens), classify(&rules, &tokens));
});
