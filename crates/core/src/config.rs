//! 설정 관리 -- logsift.toml 파싱 및 런타임 설정
//!
//! [`LogsiftConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선, 데몬에서 적용)
//! 2. 환경변수 (`LOGSIFT_SERVER_PORT=5514` 형식)
//! 3. 설정 파일 (`logsift.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logsift_core::error::LogsiftError> {
//! use logsift_core::config::LogsiftConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogsiftConfig::load("logsift.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogsiftConfig::parse("[server]\nmode = \"udp\"")?;
//! # Ok(())
//! # }
//! ```

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogsiftError};
use crate::types::IngestMode;

/// 메시지 한 건의 최대 크기 상한 (UDP 데이터그램 최대 페이로드)
const MAX_MESSAGE_SIZE_LIMIT: usize = 65_535;

/// logsift 통합 설정
///
/// `logsift.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogsiftConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 수신 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 싱크 설정
    #[serde(default)]
    pub sinks: SinksConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl LogsiftConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogsiftError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 읽습니다 (환경변수 오버라이드, 검증 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogsiftError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogsiftError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogsiftError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogsiftError> {
        toml::from_str(toml_str).map_err(|e| {
            LogsiftError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGSIFT_{SECTION}_{FIELD}`
    /// 예: `LOGSIFT_SERVER_MODE=udp`, `LOGSIFT_DATABASE_ENABLED=true`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGSIFT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGSIFT_GENERAL_LOG_FORMAT");

        // Server
        override_string(&mut self.server.mode, "LOGSIFT_SERVER_MODE");
        override_string(&mut self.server.bind_addr, "LOGSIFT_SERVER_BIND_ADDR");
        override_parsed(&mut self.server.port, "LOGSIFT_SERVER_PORT");
        override_string(&mut self.server.rules_dir, "LOGSIFT_SERVER_RULES_DIR");
        override_string(&mut self.server.rules_file, "LOGSIFT_SERVER_RULES_FILE");
        override_parsed(
            &mut self.server.max_message_size,
            "LOGSIFT_SERVER_MAX_MESSAGE_SIZE",
        );
        override_parsed(
            &mut self.server.read_timeout_secs,
            "LOGSIFT_SERVER_READ_TIMEOUT_SECS",
        );
        override_parsed(
            &mut self.server.max_concurrency,
            "LOGSIFT_SERVER_MAX_CONCURRENCY",
        );

        // Local sink
        override_string(&mut self.sinks.local.path, "LOGSIFT_LOCAL_PATH");

        // Database sink
        let db = &mut self.sinks.database;
        override_parsed(&mut db.enabled, "LOGSIFT_DATABASE_ENABLED");
        override_string(&mut db.addr, "LOGSIFT_DATABASE_ADDR");
        override_parsed(&mut db.port, "LOGSIFT_DATABASE_PORT");
        override_string(&mut db.user, "LOGSIFT_DATABASE_USER");
        override_string(&mut db.password, "LOGSIFT_DATABASE_PASSWORD");
        override_string(&mut db.database, "LOGSIFT_DATABASE_DATABASE");
        override_string(&mut db.table, "LOGSIFT_DATABASE_TABLE");

        // Forward sink
        override_string(&mut self.sinks.forward.addr, "LOGSIFT_FORWARD_ADDR");
        override_parsed(&mut self.sinks.forward.port, "LOGSIFT_FORWARD_PORT");
        override_parsed(&mut self.sinks.forward.dispatch, "LOGSIFT_FORWARD_DISPATCH");

        // Metrics
        override_parsed(&mut self.metrics.enabled, "LOGSIFT_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "LOGSIFT_METRICS_LISTEN_ADDR");
        override_parsed(&mut self.metrics.port, "LOGSIFT_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogsiftError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        self.server.ingest_mode()?;

        if self.server.bind_addr.parse::<IpAddr>().is_err() {
            return Err(invalid(
                "server.bind_addr",
                format!("'{}' is not an IP address", self.server.bind_addr),
            ));
        }

        if self.server.max_message_size == 0
            || self.server.max_message_size > MAX_MESSAGE_SIZE_LIMIT
        {
            return Err(invalid(
                "server.max_message_size",
                format!("must be 1-{MAX_MESSAGE_SIZE_LIMIT}"),
            ));
        }

        if self.server.rules_file.is_empty() {
            return Err(invalid("server.rules_file", "must not be empty"));
        }

        if self.sinks.local.path.is_empty() {
            return Err(invalid("sinks.local.path", "must not be empty"));
        }

        let db = &self.sinks.database;
        if db.enabled {
            // 테이블 이름은 INSERT 문에 그대로 들어가므로 식별자 문자만 허용
            let table_ok = !db.table.is_empty()
                && db
                    .table
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !table_ok {
                return Err(invalid(
                    "sinks.database.table",
                    "must be a non-empty identifier of [A-Za-z0-9_]",
                ));
            }
            if db.database.is_empty() {
                return Err(invalid("sinks.database.database", "must not be empty"));
            }
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(invalid("metrics.port", "must be non-zero when enabled"));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> LogsiftError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 수신 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 수신 모드 (tcp, udp)
    pub mode: String,
    /// 바인드 IP
    pub bind_addr: String,
    /// 수신 포트 (0이면 OS가 할당)
    pub port: u16,
    /// 규칙 디렉토리
    pub rules_dir: String,
    /// 규칙 디렉토리 안의 루트 규칙 파일 이름
    pub rules_file: String,
    /// 메시지 한 건의 최대 크기 (바이트)
    pub max_message_size: usize,
    /// TCP 읽기 타임아웃 (초, 0이면 무제한)
    pub read_timeout_secs: u64,
    /// 동시 처리 태스크 상한 (0이면 무제한)
    pub max_concurrency: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            mode: "tcp".to_owned(),
            bind_addr: "0.0.0.0".to_owned(),
            port: 514,
            rules_dir: "/etc/logsift/rules".to_owned(),
            rules_file: "syslog.rules".to_owned(),
            max_message_size: 2048,
            read_timeout_secs: 0,
            max_concurrency: 0,
        }
    }
}

impl ServerConfig {
    /// 수신 모드를 파싱합니다.
    pub fn ingest_mode(&self) -> Result<IngestMode, ConfigError> {
        IngestMode::from_str(&self.mode)
    }

    /// `bind_addr:port` 형식의 주소를 반환합니다.
    pub fn listen_address(&self) -> String {
        match self.bind_addr.parse::<IpAddr>() {
            Ok(IpAddr::V6(_)) => format!("[{}]:{}", self.bind_addr, self.port),
            _ => format!("{}:{}", self.bind_addr, self.port),
        }
    }

    /// 루트 규칙 파일 경로를 반환합니다.
    pub fn rules_path(&self) -> PathBuf {
        Path::new(&self.rules_dir).join(&self.rules_file)
    }
}

/// 싱크 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SinksConfig {
    /// 로컬 로그 파일
    pub local: LocalSinkConfig,
    /// 관계형 저장소
    pub database: DatabaseConfig,
    /// 원격 전달
    pub forward: ForwardConfig,
}

/// 로컬 로그 파일 싱크 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSinkConfig {
    /// 로그 파일 경로
    pub path: String,
}

impl Default for LocalSinkConfig {
    fn default() -> Self {
        Self {
            path: "syslog.log".to_owned(),
        }
    }
}

/// 관계형 저장소 (MySQL) 싱크 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 서버 주소
    pub addr: String,
    /// 서버 포트
    pub port: u16,
    /// 사용자
    pub user: String,
    /// 비밀번호
    pub password: String,
    /// 데이터베이스 이름
    pub database: String,
    /// 삽입 대상 테이블
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: "127.0.0.1".to_owned(),
            port: 3306,
            user: "root".to_owned(),
            password: String::new(),
            database: "syslog".to_owned(),
            table: "syslog".to_owned(),
        }
    }
}

/// 원격 전달 싱크 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardConfig {
    /// 전달 대상 호스트 (비어 있으면 전달하지 않음)
    pub addr: String,
    /// 전달 대상 포트
    pub port: u16,
    /// 디스패치 경로에서 전달을 수행할지 여부
    pub dispatch: bool,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            addr: String::new(),
            port: 514,
            dispatch: false,
        }
    }
}

/// 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus 엔드포인트 활성화 여부
    pub enabled: bool,
    /// 리스닝 주소
    pub listen_addr: String,
    /// 리스닝 포트
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_parsed<T: FromStr>(target: &mut T, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                expected = std::any::type_name::<T>(),
                "failed to parse env var, ignoring"
            ),
        }
    }
}
