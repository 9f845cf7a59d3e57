use std::time::Duration;

use crate::config::session::SessionConfig;
use crate::config::CliConfig;
use crate::core::aggregate::aggregate_by_day;
use crate::core::calendar;
use crate::core::classify::{classify, filter_records};
use crate::core::dates::DateWindow;
use crate::core::event::EventBuilder;
use crate::core::fetch::{FetchOptions, IpoClient};
use crate::domain::model::{IpoRecord, TransformResult};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::Result;

/// The whole fetch → filter → classify/build → aggregate → write pipeline,
/// owned data handed off stage to stage by value.
pub struct IpoPipeline<S: Storage> {
    storage: S,
    client: IpoClient,
    config: CliConfig,
}

impl<S: Storage> IpoPipeline<S> {
    pub fn new(storage: S, config: CliConfig, session: &SessionConfig) -> Result<Self> {
        let options = FetchOptions {
            endpoint: config.endpoint.clone(),
            page_size: config.page_size,
            timeout: Duration::from_secs(config.timeout_seconds),
            max_retries: config.max_retries,
            ..FetchOptions::default()
        };
        let client = IpoClient::new(options, session)?;
        Ok(Self {
            storage,
            client,
            config,
        })
    }

    fn window(&self) -> DateWindow {
        DateWindow::current(self.config.days_ahead)
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for IpoPipeline<S> {
    async fn extract(&self) -> Result<Vec<IpoRecord>> {
        tracing::info!("Fetching Hong Kong IPO data...");
        self.client.fetch_records(&self.storage).await
    }

    async fn transform(&self, records: Vec<IpoRecord>) -> Result<TransformResult> {
        let window = self.window();
        let total = records.len();

        let kept = filter_records(records, window.start);
        tracing::info!("Filtered {} entries down to {} relevant", total, kept.len());

        let builder = EventBuilder::new(self.config.alarm_minutes);
        let mut events = Vec::with_capacity(kept.len());
        for record in &kept {
            let event_type = classify(&record.list_date, &record.apply_date, window.start);
            match builder.build(record, event_type) {
                Ok(event) => events.push(event),
                Err(reason) => tracing::warn!("Skipping record: {}", reason),
            }
        }

        let days = aggregate_by_day(events, self.config.alarm_minutes);
        tracing::info!("Created {} calendar events (including consolidated events)", days.len());
        Ok(TransformResult { days })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        calendar::write_outputs(&self.storage, &result).await
    }
}
