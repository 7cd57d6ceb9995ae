#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use logsift_pipeline::rule::pattern;
use logsift_pipeline::rule::substitute::substitute;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    pattern: String,
    subject: String,
    template: String,
    tokens: Vec<String>,
}

fuzz_target!(|input: FuzzInput| {
    // 컴파일 실패는 매칭 실패와 같다
    let expected = match pattern::compile(&input.pattern) {
        Ok(regex) => regex.is_match(&input.subject),
        Err(_) => false,
    };
    assert_eq!(pattern::matches(&input.subject, &input.pattern), expected);

    // 영숫자만으로 된 패턴은 완전 일치와 같다
    if input.pattern.chars().all(|c| c.is_ascii_alphanumeric()) {
        assert_eq!(expected, input.subject == input.pattern);
    }

    // 자리표시자가 없으면 원문 그대로다
    let rendered = substitute(&input.template, &input.tokens);
    if !input.template.contains('$') {
        assert_eq!(rendered, input.template);
    }
});
