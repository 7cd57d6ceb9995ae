//! 규칙 파일 로더 -- JSON 규칙 문서를 읽고 include를 재귀적으로 펼칩니다.
//!
//! 각 파일의 매칭 가능한 규칙을 문서 순서대로 모은 뒤, include 지시자가
//! 가리키는 파일의 평탄화 결과를 지시자 순서대로 뒤에 붙입니다.
//! include 경로는 지시자를 가진 파일의 디렉토리를 기준으로 해석합니다.
//! 절대 경로도 루트를 떼어 내고 같은 디렉토리 아래에서 찾습니다.
//!
//! 같은 파일이 서로 다른 경로로 두 번 포함되는 것(다이아몬드)은 허용되며
//! 규칙이 중복됩니다. 자기 자신의 조상을 다시 포함하는 순환은 에러입니다.

use std::path::{Component, Path, PathBuf};

use logsift_core::pipeline::BoxFuture;
use tracing::{debug, info};

use crate::error::LogPipelineError;

use super::types::{LogicEntry, RuleDocument};

/// 규칙 파일 최대 크기
const MAX_RULE_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB
/// 평탄화된 규칙 최대 수
const MAX_RULES_COUNT: usize = 10_000;

/// 규칙 파일 로더
pub struct RuleLoader;

impl RuleLoader {
    /// 루트 규칙 파일을 로드하고 평탄화된 규칙 목록을 반환합니다.
    ///
    /// 반환된 목록에는 include 지시자가 포함되지 않습니다.
    ///
    /// # Errors
    /// - 파일을 읽을 수 없거나 JSON으로 파싱할 수 없는 경우 (include 대상 포함)
    /// - include 순환이 있는 경우
    /// - 파일 크기나 규칙 수가 제한을 넘는 경우
    pub async fn load(path: impl AsRef<Path>) -> Result<Vec<LogicEntry>, LogPipelineError> {
        let path = path.as_ref();
        let mut chain = Vec::new();
        let rules = Self::load_recursive(path.to_path_buf(), &mut chain).await?;

        info!(path = %path.display(), count = rules.len(), "loaded rules");
        Ok(rules)
    }

    fn load_recursive(
        path: PathBuf,
        chain: &mut Vec<PathBuf>,
    ) -> BoxFuture<'_, Result<Vec<LogicEntry>, LogPipelineError>> {
        Box::pin(async move {
            let canonical =
                tokio::fs::canonicalize(&path)
                    .await
                    .map_err(|e| LogPipelineError::RuleLoad {
                        path: path.display().to_string(),
                        reason: format!("failed to resolve path: {e}"),
                    })?;

            if chain.contains(&canonical) {
                let cycle = chain
                    .iter()
                    .chain(std::iter::once(&canonical))
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(LogPipelineError::RuleLoad {
                    path: path.display().to_string(),
                    reason: format!("include cycle: {cycle}"),
                });
            }

            let document = Self::load_file(&path).await?;
            let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

            let mut rules = Vec::with_capacity(document.logic.len());
            let mut includes = Vec::new();
            for entry in document.logic {
                match entry.include_path() {
                    Some(include) => includes.push(resolve_include(&base_dir, include)),
                    None => rules.push(entry),
                }
            }
            Self::check_count(&path, rules.len())?;

            chain.push(canonical);
            for include in includes {
                debug!(
                    from = %path.display(),
                    include = %include.display(),
                    "resolving include"
                );
                let nested = Self::load_recursive(include, chain).await?;
                rules.extend(nested);
                Self::check_count(&path, rules.len())?;
            }
            chain.pop();

            Ok(rules)
        })
    }

    /// 단일 JSON 파일에서 규칙 문서를 읽습니다 (include는 펼치지 않음).
    pub async fn load_file(path: impl AsRef<Path>) -> Result<RuleDocument, LogPipelineError> {
        let path = path.as_ref();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| LogPipelineError::RuleLoad {
                path: path.display().to_string(),
                reason: format!("failed to read file metadata: {e}"),
            })?;

        if metadata.len() > MAX_RULE_FILE_SIZE {
            return Err(LogPipelineError::RuleLoad {
                path: path.display().to_string(),
                reason: format!(
                    "file too large: {} bytes (max: {MAX_RULE_FILE_SIZE})",
                    metadata.len()
                ),
            });
        }

        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| LogPipelineError::RuleLoad {
                    path: path.display().to_string(),
                    reason: format!("failed to read file: {e}"),
                })?;

        Self::parse_document(&content, &path.display().to_string())
    }

    /// JSON 문자열을 규칙 문서로 파싱합니다.
    pub fn parse_document(json: &str, source: &str) -> Result<RuleDocument, LogPipelineError> {
        serde_json::from_str(json).map_err(|e| LogPipelineError::RuleLoad {
            path: source.to_owned(),
            reason: format!("JSON parse error: {e}"),
        })
    }

    fn check_count(path: &Path, count: usize) -> Result<(), LogPipelineError> {
        if count > MAX_RULES_COUNT {
            return Err(LogPipelineError::RuleLoad {
                path: path.display().to_string(),
                reason: format!("too many rules: max {MAX_RULES_COUNT}"),
            });
        }
        Ok(())
    }
}

/// include 경로를 포함하는 파일의 디렉토리 기준으로 해석합니다.
///
/// 루트(`/`)와 드라이브 접두사는 버리므로 `/extra.rules`도 `<dir>/extra.rules`가 됩니다.
fn resolve_include(base_dir: &Path, include: &str) -> PathBuf {
    let relative: PathBuf = Path::new(include)
        .components()
        .filter(|c| {
            matches!(
                c,
                Component::Normal(_) | Component::CurDir | Component::ParentDir
            )
        })
        .collect();
    base_dir.join(relative)
}
