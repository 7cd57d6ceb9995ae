//! 파이프라인 trait -- 모듈 확장 포인트 정의

use std::future::Future;
use std::pin::Pin;

use crate::error::StorageError;
use crate::types::SinkRecord;

/// dyn-compatible trait에서 사용하는 boxed future
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 관계형 저장소 trait
///
/// 분류된 레코드 한 건을 단일 테이블에 삽입합니다.
/// 호출자(관계형 싱크)가 뮤텍스로 호출을 직렬화하므로 구현체는
/// `&mut self`만 다루면 됩니다. 테스트에서는 인메모리 구현으로 대체합니다.
pub trait LogStore: Send {
    /// 저장소 이름 (로그/메트릭 식별용)
    fn name(&self) -> &str;

    /// 레코드 한 건을 삽입합니다.
    fn insert<'a>(&'a mut self, record: &'a SinkRecord) -> BoxFuture<'a, Result<(), StorageError>>;
}
