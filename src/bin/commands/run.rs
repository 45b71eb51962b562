use super::{print_json, print_table, ExtensionArgs};
use anyhow::Result;
use clap::Args;
use sqlite_smoke::{OutputFormat, SmokeConfig};
use tracing::info;

/// Arguments for the Run command
#[derive(Args)]
pub struct RunArgs {
    #[clap(flatten)]
    pub extension: ExtensionArgs,

    /// SQL to evaluate after loading, by default SELECT <name>_version()
    #[clap(short, long)]
    pub query: Option<String>,

    /// Fail unless the query returns this version
    #[clap(short = 'x', long)]
    pub expect: Option<String>,
}

pub fn run(config: &SmokeConfig, args: RunArgs, output_format: OutputFormat) -> Result<()> {
    let RunArgs {
        extension,
        query,
        expect,
    } = args;

    let config = config.clone().merge(SmokeConfig {
        query,
        expect,
        ..extension.to_config()
    });
    let smoke = config.smoke_test()?;
    let report = smoke.run()?;
    info!("smoke run passed for {}", report.artifact);

    match output_format {
        OutputFormat::Plain => println!("{}", report.value),
        OutputFormat::Table | OutputFormat::Markdown => {
            print_table(&report.fields(), output_format)
        }
        OutputFormat::Json | OutputFormat::JsonPretty => print_json(&report, output_format)?,
        OutputFormat::Psv => {
            println!("field|value");
            for f in report.fields() {
                println!("{}|{}", f.field, f.value);
            }
        }
    }
    Ok(())
}
