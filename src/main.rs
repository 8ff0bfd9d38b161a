use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use mot2coco::{convert_dataset, Args};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match args.to_convert_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid arguments: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if !config.data_dir.exists() {
        error!("The specified data_dir does not exist: {}", args.data_dir);
        return ExitCode::FAILURE;
    }

    info!("Starting MOT to COCO conversion process...");

    match convert_dataset(&config) {
        Ok(summaries) => {
            for summary in &summaries {
                summary.stats.print_summary(&summary.split);
            }
            info!("Conversion process completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to convert dataset: {}", e);
            ExitCode::FAILURE
        }
    }
}
