//! 규칙 문서 데이터 타입
//!
//! JSON 규칙 파일에서 역직렬화되는 구조체들을 정의합니다.

use serde::{Deserialize, Serialize};

/// 규칙 문서 -- 하나의 JSON 규칙 파일에 대응합니다.
///
/// # JSON 스키마
/// ```json
/// {
///   "logic": [
///     { "condition": "$0==ERR*", "message": "err: $0", "level": "error" },
///     { "include": "auth.rules" },
///     { "condition": "default", "message": "$0", "level": "info" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDocument {
    /// 문서 순서대로의 규칙 및 include 지시자
    #[serde(default)]
    pub logic: Vec<LogicEntry>,
}

/// 규칙 항목 하나
///
/// `include`가 비어 있지 않으면 규칙이 아니라 지시자입니다.
/// 분류기는 지시자를 건너뛰고, 로더는 지시자를 펼칩니다.
/// 누락된 문자열 필드는 빈 문자열로 역직렬화됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicEntry {
    /// `"default"` 또는 `LEFT==RIGHT`
    #[serde(default)]
    pub condition: String,
    /// 매칭 시 출력할 메시지 템플릿
    #[serde(default)]
    pub message: String,
    /// 매칭 시 레벨 템플릿
    #[serde(default)]
    pub level: String,
    /// 포함할 규칙 파일 (현재 파일 기준 상대 경로)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
}

impl LogicEntry {
    /// 매칭 가능한 규칙을 생성합니다.
    pub fn rule(
        condition: impl Into<String>,
        message: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        Self {
            condition: condition.into(),
            message: message.into(),
            level: level.into(),
            include: None,
        }
    }

    /// include 지시자를 생성합니다.
    pub fn include(path: impl Into<String>) -> Self {
        Self {
            include: Some(path.into()),
            ..Default::default()
        }
    }

    /// include 지시자인지 여부 (빈 문자열은 지시자가 아님)
    pub fn is_include(&self) -> bool {
        self.include_path().is_some()
    }

    /// 비어 있지 않은 include 경로를 반환합니다.
    pub fn include_path(&self) -> Option<&str> {
        self.include.as_deref().filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_empty() {
        let doc: RuleDocument =
            serde_json::from_str(r#"{"logic":[{"condition":"default"}]}"#).unwrap();
        let entry = &doc.logic[0];
        assert_eq!(entry.condition, "default");
        assert!(entry.message.is_empty());
        assert!(entry.level.is_empty());
        assert!(!entry.is_include());
    }

    #[test]
    fn missing_logic_is_empty_document() {
        let doc: RuleDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.logic.is_empty());
    }

    #[test]
    fn empty_include_is_not_a_directive() {
        let entry = LogicEntry {
            include: Some(String::new()),
            ..LogicEntry::rule("default", "$0", "info")
        };
        assert!(!entry.is_include());
        assert_eq!(entry.include_path(), None);
    }

    #[test]
    fn include_entry_is_a_directive() {
        let entry = LogicEntry::include("auth.rules");
        assert!(entry.is_include());
        assert_eq!(entry.include_path(), Some("auth.rules"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let doc: RuleDocument = serde_json::from_str(
            r#"{"version":2,"logic":[{"condition":"default","comment":"x"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.logic.len(), 1);
    }

    #[test]
    fn rule_serializes_without_include_field() {
        let json = serde_json::to_string(&LogicEntry::rule("default", "$0", "info")).unwrap();
        assert!(!json.contains("include"));
    }
}
