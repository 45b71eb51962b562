pub mod check;
pub mod config;
pub mod resolve;
pub mod run;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sqlite_smoke::{OutputFormat, SmokeConfig};
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Where to find the extension; overrides the configuration file
#[derive(Args, Debug, Default)]
pub struct ExtensionArgs {
    /// Path to a loadable extension, e.g. ./dist/linux-x86_64/hello0.so
    #[clap(short, long, conflicts_with = "package_dir")]
    pub extension: Option<String>,

    /// Distribution directory holding per-platform artifacts
    #[clap(short = 'd', long)]
    pub package_dir: Option<String>,

    /// Package name, for <package>-<os>-<cpu> directories
    #[clap(short = 'P', long)]
    pub package: Option<String>,

    /// Artifact base name inside the package directory, e.g. hello0
    #[clap(short = 'n', long)]
    pub entrypoint: Option<String>,

    /// Init symbol to call, e.g. sqlite3_hello_init (derived from the file name by default)
    #[clap(long)]
    pub entry_point: Option<String>,
}

impl ExtensionArgs {
    pub fn to_config(&self) -> SmokeConfig {
        SmokeConfig {
            extension: self.extension.clone(),
            package_dir: self.package_dir.clone(),
            package: self.package.clone(),
            entrypoint: self.entrypoint.clone(),
            entry_point: self.entry_point.clone(),
            ..Default::default()
        }
    }
}

pub(crate) fn print_table<T: Tabled>(rows: &[T], output_format: OutputFormat) {
    match output_format {
        OutputFormat::Markdown => println!("{}", Table::new(rows).with(Style::markdown())),
        _ => println!("{}", Table::new(rows).with(Style::rounded())),
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(
    value: &T,
    output_format: OutputFormat,
) -> Result<()> {
    let json = match output_format {
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
        _ => serde_json::to_string(value)?,
    };
    println!("{}", json);
    Ok(())
}
