//! 로컬 로그 파일 싱크
//!
//! 레코드마다 파일을 추가 모드로 열어 한 줄을 쓰고 닫습니다.
//! 핸들을 유지하지 않으므로 외부 로테이션 도구와 함께 쓸 수 있습니다.

use std::path::{Path, PathBuf};

use logsift_core::types::SinkRecord;
use tokio::io::AsyncWriteExt;

use super::SINK_LOCAL;
use crate::error::LogPipelineError;

/// 로컬 로그 파일 싱크
#[derive(Debug, Clone)]
pub struct LocalFileSink {
    path: PathBuf,
}

impl LocalFileSink {
    /// 새 싱크를 생성합니다. 파일은 첫 기록 시 생성됩니다.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 로그 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<timestamp> - <level> - syslog: <message>` 형식의 한 줄을 만듭니다.
    pub fn format_line(record: &SinkRecord) -> String {
        format!(
            "{} - {} - syslog: {}\n",
            record.timestamp, record.level, record.message
        )
    }

    /// 레코드 한 건을 파일 끝에 추가합니다.
    pub async fn write(&self, record: &SinkRecord) -> Result<(), LogPipelineError> {
        let line = Self::format_line(record);

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.error("open", e))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.error("write", e))?;
        file.flush().await.map_err(|e| self.error("flush", e))?;

        Ok(())
    }

    fn error(&self, op: &str, e: std::io::Error) -> LogPipelineError {
        LogPipelineError::Sink {
            sink: SINK_LOCAL.to_owned(),
            reason: format!("failed to {op} {}: {e}", self.path.display()),
        }
    }
}
