use anyhow::Result;
use log::info;
use std::path::Path;

use p3data::config::Config;
use p3data::dataset::keys::PARQUET_EXTENSION;
use p3data::validator::{validate_export, validate_shot, validate_shot_folder};

/// Validate a shot number, a shot folder or an exported file
pub fn run(config: &Config, target: &str) -> Result<()> {
    info!("p3data Validator");
    info!("Target: {}", target);

    let result = match target.parse::<u32>() {
        Ok(shot) => validate_shot(config.loader().archive(), shot),
        Err(_) => {
            let path = Path::new(target);
            let is_parquet = path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case(PARQUET_EXTENSION));
            if is_parquet {
                validate_export(path)
            } else {
                validate_shot_folder(path)
            }
        }
    };

    match result {
        Ok(report) => {
            #[cfg(feature = "colorized_output")]
            {
                println!("{}", report.format_colored());
            }

            #[cfg(not(feature = "colorized_output"))]
            {
                println!("{}", report);
            }

            if report.has_failures() {
                std::process::exit(1);
            }

            Ok(())
        }
        Err(e) => {
            eprintln!("Validation error: {}", e);
            std::process::exit(1);
        }
    }
}
