#![no_main]

use libfuzzer_sys::fuzz_target;
use logsift_pipeline::{Classifier, RuleLoader, tokenize};

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    // 파싱은 Ok 또는 Err만 반환해야 한다
    let Ok(document) = RuleLoader::parse_document(json, "fuzz-input.rules") else {
        return;
    };

    let rules = document
        .logic
        .into_iter()
        .filter(|rule| !rule.is_include())
        .collect();
    let classifier = Classifier::new(rules);
    let _ = classifier.classify(&tokenize("host1 sshd[22]: Failed password for root"));
});
