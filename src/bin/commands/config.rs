use super::print_json;
use anyhow::Result;
use serde::Serialize;
use sqlite_smoke::{OutputFormat, Platform, SmokeConfig};

#[derive(Debug, Serialize)]
struct ConfigInfo<'a> {
    config_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    platform: Option<String>,
    sqlite_version: &'static str,
    settings: &'a SmokeConfig,
}

pub fn run(
    config: &SmokeConfig,
    config_path: &Option<String>,
    output_format: OutputFormat,
) -> Result<()> {
    let config_file = match config_path {
        Some(p) => p.clone(),
        None => SmokeConfig::config_file_path()?,
    };
    let platform = Platform::current().ok().map(|p| p.to_string());

    if output_format.is_json() {
        let info = ConfigInfo {
            config_file,
            platform,
            sqlite_version: rusqlite::version(),
            settings: config,
        };
        return print_json(&info, output_format);
    }

    println!("Config file:  {}", config_file);
    println!(
        "Platform:     {}",
        platform.unwrap_or_else(|| "unsupported".to_string())
    );
    println!("SQLite:       {}", rusqlite::version());
    println!();
    println!("{}", config.summary());
    Ok(())
}
