//! 와일드카드 패턴 매칭
//!
//! 규칙 조건의 오른쪽 피연산자는 와일드카드 패턴입니다.
//! 다음 순서로 정규식으로 변환한 뒤 문자열 전체에 대해 매칭합니다.
//!
//! | 패턴 | 정규식 |
//! |------|--------|
//! | `.`  | `\.`   |
//! | `*`  | `.*`   |
//! | `?`  | `.`    |
//!
//! 그 밖의 문자는 정규식 엔진에 그대로 전달되므로 `[0-9]+` 같은
//! 정규식 구문도 패턴 안에서 동작합니다.

use regex::Regex;
use tracing::warn;

use crate::error::LogPipelineError;

/// 와일드카드 패턴을 앵커가 붙은 정규식 문자열로 변환합니다.
pub fn to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    for c in pattern.chars() {
        match c {
            '.' => out.push_str(r"\."),
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push(other),
        }
    }
    out.push('$');
    out
}

/// 와일드카드 패턴을 컴파일합니다.
pub fn compile(pattern: &str) -> Result<Regex, LogPipelineError> {
    Regex::new(&to_regex(pattern)).map_err(|e| LogPipelineError::Pattern {
        pattern: pattern.to_owned(),
        reason: e.to_string(),
    })
}

/// `candidate` 전체가 `pattern`에 매칭되는지 검사합니다.
///
/// 패턴 컴파일 실패는 매칭 실패로 취급하고 경고 로그만 남깁니다.
pub fn matches(candidate: &str, pattern: &str) -> bool {
    match compile(pattern) {
        Ok(regex) => regex.is_match(candidate),
        Err(e) => {
            warn!(pattern, error = %e, "pattern compile failed, treating as no match");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn translation_escapes_dot_and_expands_wildcards() {
        assert_eq!(to_regex("a.b*c?"), r"^a\.b.*c.$");
        assert_eq!(to_regex(""), "^$");
    }

    #[test]
    fn star_matches_any_run() {
        assert!(matches("abc", "a*c"));
        assert!(matches("ac", "a*c"));
        assert!(matches("ERROR101", "ERR*"));
        assert!(!matches("xERROR", "ERR*"));
    }

    #[test]
    fn question_mark_matches_exactly_one() {
        assert!(matches("abc", "a?c"));
        assert!(!matches("ac", "a?c"));
        assert!(!matches("abbc", "a?c"));
    }

    #[test]
    fn dot_is_literal() {
        assert!(!matches("abc", "a.c"));
        assert!(matches("a.c", "a.c"));
        assert!(matches("10.0.0.1", "10.0.*"));
    }

    #[test]
    fn match_is_anchored_at_both_ends() {
        assert!(!matches("prefix-error", "error"));
        assert!(!matches("error-suffix", "error"));
    }

    #[test]
    fn regex_syntax_passes_through() {
        assert!(matches("disk42", "disk[0-9]+"));
        assert!(!matches("diskX", "disk[0-9]+"));
    }

    #[test]
    fn invalid_pattern_is_no_match() {
        assert!(!matches("(", "("));
        assert!(!matches("anything", "[unclosed"));
    }

    #[test]
    fn compile_reports_pattern_in_error() {
        let err = compile("[unclosed").unwrap_err();
        assert!(err.to_string().contains("[unclosed"));
    }

    proptest! {
        #[test]
        fn literal_pattern_matches_itself(s in "[a-zA-Z0-9 _.:-]{0,32}") {
            prop_assert!(matches(&s, &s));
        }

        #[test]
        fn literal_pattern_rejects_extension(s in "[a-zA-Z0-9_.:-]{0,32}") {
            let longer = format!("{s}x");
            prop_assert!(!matches(&longer, &s));
        }

        #[test]
        fn star_matches_every_string(s in "\\PC{0,64}") {
            prop_assert!(matches(&s, "*"));
        }
    }
}
