//! 관계형 저장소 싱크
//!
//! 모든 태스크가 하나의 저장소 핸들을 공유하며, 삽입 한 건 동안만
//! 뮤텍스를 잡습니다. 분류는 락 밖에서 끝난 뒤 호출됩니다.

use logsift_core::config::DatabaseConfig;
use logsift_core::error::StorageError;
use logsift_core::pipeline::{BoxFuture, LogStore};
use logsift_core::types::SinkRecord;
use std::time::Duration;

use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use tokio::sync::Mutex;
use tracing::info;

use super::SINK_DATABASE;
use crate::error::LogPipelineError;

/// 관계형 저장소 싱크
///
/// [`LogStore`] 구현체를 뮤텍스로 감싸 동시 삽입을 직렬화합니다.
pub struct RelationalSink {
    store: Mutex<Box<dyn LogStore>>,
}

impl RelationalSink {
    /// 저장소로 싱크를 생성합니다.
    pub fn new(store: Box<dyn LogStore>) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// 레코드 한 건을 삽입합니다.
    pub async fn write(&self, record: &SinkRecord) -> Result<(), LogPipelineError> {
        let mut store = self.store.lock().await;
        let result = store.insert(record).await;
        result.map_err(|e| LogPipelineError::Sink {
            sink: SINK_DATABASE.to_owned(),
            reason: format!("{}: {e}", store.name()),
        })
    }
}

impl std::fmt::Debug for RelationalSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationalSink").finish_non_exhaustive()
    }
}

/// 연결 획득 대기 시간 (시작 시 연결 확인 포함)
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// MySQL 저장소
///
/// `INSERT INTO <table> (currentTime, level, message) VALUES (?, ?, ?)`를
/// 연결 하나짜리 풀로 실행합니다. 서버 재시작이나 유휴 타임아웃으로 끊긴
/// 연결은 풀이 획득 시점에 검사하고 다시 연결합니다.
/// 스키마는 미리 준비되어 있어야 합니다.
pub struct MySqlStore {
    pool: MySqlPool,
    insert_sql: String,
}

impl MySqlStore {
    /// 설정에 따라 MySQL 풀을 만들고 첫 연결을 확인합니다.
    ///
    /// 테이블 이름은 설정 검증에서 식별자 문자만 허용된 상태여야 합니다.
    ///
    /// # Errors
    /// 첫 연결이 [`ACQUIRE_TIMEOUT`] 안에 성립하지 않으면 [`StorageError::Connection`]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let options = MySqlConnectOptions::new()
            .host(&config.addr)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = pool_options()
            .connect_with(options)
            .await
            .map_err(|e| {
                StorageError::Connection(format!(
                    "{}@{}:{}/{}: {e}",
                    config.user, config.addr, config.port, config.database
                ))
            })?;

        info!(
            addr = %config.addr,
            port = config.port,
            database = %config.database,
            table = %config.table,
            "connected to mysql"
        );

        Ok(Self {
            pool,
            insert_sql: insert_statement(&config.table),
        })
    }
}

/// 삽입은 [`RelationalSink`]의 뮤텍스로 직렬화되므로 연결 하나면 충분하다
fn pool_options() -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .test_before_acquire(true)
}

fn insert_statement(table: &str) -> String {
    format!("INSERT INTO {table} (currentTime, level, message) VALUES (?, ?, ?)")
}

impl LogStore for MySqlStore {
    fn name(&self) -> &str {
        "mysql"
    }

    fn insert<'a>(
        &'a mut self,
        record: &'a SinkRecord,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            sqlx::query(&self.insert_sql)
                .bind(&record.timestamp)
                .bind(&record.level)
                .bind(&record.message)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Query(e.to_string()))?;
            Ok(())
        })
    }
}
