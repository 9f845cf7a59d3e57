use std::path::Path;

use clap::Parser;
use hkipo_cal::utils::error::ErrorSeverity;
use hkipo_cal::utils::{logger, validation::Validate};
use hkipo_cal::{CalendarEngine, CliConfig, IpoPipeline, LocalStorage, SessionConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    let log_path = Path::new(&config.output_path).join(hkipo_cal::config::LOG_FILE);
    logger::init_logger(config.verbose, Some(log_path.as_path()));

    tracing::info!("Starting hkipo-cal");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let session = match &config.session_config {
        Some(path) => match SessionConfig::from_file(path) {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("❌ Failed to load session config: {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 {}", e.recovery_suggestion());
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("No session config given; requesting without session cookies");
            SessionConfig::default()
        }
    };

    let storage = LocalStorage::new(config.output_path.clone());
    let output_path = config.output_path.clone();
    let pipeline = match IpoPipeline::new(storage, config, &session) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!("❌ Failed to build HTTP client: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(3);
        }
    };

    let engine = CalendarEngine::new(pipeline);

    match engine.run().await {
        Ok(calendar_file) => {
            tracing::info!("✅ Hong Kong IPO calendar generated successfully!");
            println!("\n=== Hong Kong IPO Calendar Summary ===");
            println!("📁 Calendar file: {}/{}", output_path, calendar_file);
            println!(
                "📁 Response data: {}/{}",
                output_path,
                hkipo_cal::config::RAW_RESPONSE_FILE
            );
            println!(
                "📁 Summary file: {}/{}",
                output_path,
                hkipo_cal::config::SUMMARY_FILE
            );
            println!("📁 Log file: {}/{}", output_path, hkipo_cal::config::LOG_FILE);
            println!("{}", "=".repeat(40));

            let summary_path = Path::new(&output_path).join(hkipo_cal::config::SUMMARY_FILE);
            match std::fs::read_to_string(&summary_path) {
                Ok(summary) => {
                    println!("\n📋 Event Summary:");
                    println!("{}", summary);
                }
                Err(_) => println!("Summary file not found"),
            }
        }
        Err(e) => {
            tracing::error!("❌ Calendar generation failed: {}", e);
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
