//! 규칙 조건 평가
//!
//! 조건은 `"default"` 이거나 `LEFT==RIGHT` 형식입니다.
//! LEFT는 위치 변수 치환 대상이고 RIGHT는 와일드카드 패턴입니다.
//! `==`가 정확히 한 번 나오지 않는 조건은 에러가 아니라 매칭 실패입니다.

use regex::Regex;
use tracing::warn;

use super::pattern;
use super::substitute::substitute;

/// 항상 참인 조건
pub const DEFAULT_CONDITION: &str = "default";

const EQ_OPERATOR: &str = "==";

/// 조건 문자열을 즉석에서 평가합니다.
pub fn evaluate<S: AsRef<str>>(condition: &str, tokens: &[S]) -> bool {
    if condition == DEFAULT_CONDITION {
        return true;
    }
    match split(condition) {
        Some((left, right)) => pattern::matches(&substitute(left, tokens), right),
        None => false,
    }
}

/// `LEFT==RIGHT`를 양쪽 공백을 제거한 두 피연산자로 나눕니다.
fn split(condition: &str) -> Option<(&str, &str)> {
    let mut parts = condition.split(EQ_OPERATOR);
    let left = parts.next()?;
    let right = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((left.trim(), right.trim()))
}

/// 미리 파싱하고 패턴을 컴파일해 둔 조건
///
/// [`Classifier`](super::Classifier)가 규칙마다 한 번 만들어 두고
/// 메시지마다 재사용합니다. 평가 결과는 [`evaluate`]와 같습니다.
#[derive(Debug, Clone)]
pub enum Condition {
    /// `"default"`: 항상 참
    Always,
    /// `LEFT==RIGHT`
    Compare {
        /// 치환 전 왼쪽 피연산자
        left: String,
        /// 컴파일된 오른쪽 패턴
        pattern: Regex,
    },
    /// 형식 오류 또는 컴파일 불가 패턴: 항상 거짓
    Never,
}

impl Condition {
    /// 조건 문자열을 파싱합니다.
    ///
    /// 패턴 컴파일 실패는 여기서 한 번만 경고합니다.
    pub fn parse(condition: &str) -> Self {
        if condition == DEFAULT_CONDITION {
            return Self::Always;
        }
        let Some((left, right)) = split(condition) else {
            return Self::Never;
        };
        match pattern::compile(right) {
            Ok(pattern) => Self::Compare {
                left: left.to_owned(),
                pattern,
            },
            Err(e) => {
                warn!(condition, error = %e, "rule pattern does not compile, rule will never match");
                Self::Never
            }
        }
    }

    /// 토큰에 대해 조건을 평가합니다.
    pub fn evaluate<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        match self {
            Self::Always => true,
            Self::Compare { left, pattern } => pattern.is_match(&substitute(left, tokens)),
            Self::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKENS: [&str; 3] = ["ERROR101", "failed", "disk"];

    #[test]
    fn default_is_always_true() {
        assert!(evaluate("default", &TOKENS));
        assert!(evaluate("default", &[] as &[&str]));
    }

    #[test]
    fn compares_substituted_left_against_pattern() {
        assert!(evaluate("$0==ERR*", &TOKENS));
        assert!(evaluate("$1==failed", &TOKENS));
        assert!(!evaluate("$1==ok", &TOKENS));
    }

    #[test]
    fn operands_are_trimmed() {
        assert!(evaluate("  $2   ==   d?sk  ", &TOKENS));
    }

    #[test]
    fn right_side_is_never_substituted() {
        assert!(!evaluate("$0==$0", &TOKENS));
    }

    #[test]
    fn missing_or_repeated_operator_is_no_match() {
        assert!(!evaluate("$0", &TOKENS));
        assert!(!evaluate("$0==a==b", &TOKENS));
        assert!(!evaluate("", &TOKENS));
    }

    #[test]
    fn default_must_be_exact() {
        assert!(!evaluate(" default", &TOKENS));
        assert!(!evaluate("Default", &TOKENS));
    }

    #[test]
    fn bad_pattern_is_no_match() {
        assert!(!evaluate("$0==[oops", &TOKENS));
        assert!(matches!(Condition::parse("$0==[oops"), Condition::Never));
    }

    #[test]
    fn parsed_condition_agrees_with_evaluate() {
        let conditions = [
            "default",
            "$0==ERR*",
            "$1 == fail??",
            "$0==a==b",
            "$2==disk",
            "$0==[oops",
            "no operator",
            "$5==*",
        ];
        for c in conditions {
            assert_eq!(
                Condition::parse(c).evaluate(&TOKENS),
                evaluate(c, &TOKENS),
                "condition {c:?}"
            );
        }
    }
}
