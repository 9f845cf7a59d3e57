use crate::domain::model::{IpoRecord, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Fetch raw records from the provider. Exhausted transient failures
    /// yield an empty list, not an error.
    async fn extract(&self) -> Result<Vec<IpoRecord>>;
    /// Filter, classify, build and aggregate events.
    async fn transform(&self, records: Vec<IpoRecord>) -> Result<TransformResult>;
    /// Serialize the event set to the output files; returns the calendar
    /// file path.
    async fn load(&self, result: TransformResult) -> Result<String>;
}
