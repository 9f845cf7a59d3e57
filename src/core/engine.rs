use crate::domain::ports::Pipeline;
use crate::utils::error::{CalError, Result};

/// Drives the pipeline stages in order. The run aborts early with
/// `NoData` when nothing usable survives the fetch or the filter, so no
/// calendar or summary file is produced for that run.
pub struct CalendarEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> CalendarEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting Hong Kong IPO calendar generation...");

        let records = self.pipeline.extract().await?;
        if records.is_empty() {
            tracing::error!("No IPO data available");
            return Err(CalError::NoData);
        }
        tracing::info!("Extracted {} records", records.len());

        let result = self.pipeline.transform(records).await?;
        if result.days.is_empty() {
            tracing::error!("No IPO entries within the reporting window");
            return Err(CalError::NoData);
        }
        tracing::info!("Transformed into {} calendar days", result.days.len());

        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
