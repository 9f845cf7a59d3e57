pub mod session;
pub mod storage;

use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;

/// Fixed relative output file names, overwritten on every run.
pub const CALENDAR_FILE: &str = "hkipo.ics";
pub const RAW_RESPONSE_FILE: &str = "hkipo_response.json";
pub const SUMMARY_FILE: &str = "hkipo_summary.txt";
pub const LOG_FILE: &str = "hkipo.log";

#[derive(Debug, Clone, Parser)]
#[command(name = "hkipo-cal")]
#[command(about = "Generate an ICS calendar of upcoming Hong Kong IPO listings")]
pub struct CliConfig {
    #[arg(long, default_value = "https://www.jisilu.cn/data/new_stock/hkipo/")]
    pub endpoint: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Lookahead horizon of the reporting window, in days.
    #[arg(long, default_value = "30")]
    pub days_ahead: u32,

    /// Minutes before event start for the generic reminder.
    #[arg(long, default_value = "30")]
    pub alarm_minutes: u32,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    #[arg(long, default_value = "3")]
    pub max_retries: u32,

    /// Page size of the single provider request.
    #[arg(long, default_value = "50")]
    pub page_size: u32,

    /// TOML file carrying session cookies and header overrides.
    /// Without it the request goes out with browser headers only.
    #[arg(long)]
    pub session_config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("endpoint", &self.endpoint)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_range("days_ahead", self.days_ahead, 1, 365)?;
        validation::validate_range("alarm_minutes", self.alarm_minutes, 1, 24 * 60)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
        validation::validate_range("max_retries", self.max_retries, 0, 10)?;
        validation::validate_range("page_size", self.page_size, 1, 200)?;
        if let Some(path) = &self.session_config {
            validation::validate_path("session_config", path)?;
        }
        Ok(())
    }
}
