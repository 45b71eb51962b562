use super::{print_json, print_table, ExtensionArgs};
use anyhow::{anyhow, Result};
use clap::Args;
use sqlite_smoke::{OutputFormat, SmokeConfig};

/// Arguments for the Check command
#[derive(Args)]
pub struct CheckArgs {
    #[clap(flatten)]
    pub extension: ExtensionArgs,

    /// SQL to evaluate after loading, by default SELECT <name>_version()
    #[clap(short, long)]
    pub query: Option<String>,

    /// Fail unless the query returns this version
    #[clap(short = 'x', long)]
    pub expect: Option<String>,
}

pub fn run(config: &SmokeConfig, args: CheckArgs, output_format: OutputFormat) -> Result<()> {
    let CheckArgs {
        extension,
        query,
        expect,
    } = args;

    let config = config.clone().merge(SmokeConfig {
        query,
        expect,
        ..extension.to_config()
    });
    let results = config.smoke_test()?.check_all();

    match output_format {
        OutputFormat::Plain => {
            for r in &results {
                let status = if r.passed { "ok" } else { "FAILED" };
                println!("{:<12} {:<7} {}", r.check, status, r.detail);
            }
        }
        OutputFormat::Table | OutputFormat::Markdown => print_table(&results, output_format),
        OutputFormat::Json | OutputFormat::JsonPretty => print_json(&results, output_format)?,
        OutputFormat::Psv => {
            println!("check|passed|detail");
            for r in &results {
                println!("{}|{}|{}", r.check, r.passed, r.detail);
            }
        }
    }

    let failed = results.iter().filter(|r| !r.passed).count();
    if failed > 0 {
        return Err(anyhow!("{} of {} checks failed", failed, results.len()));
    }
    Ok(())
}
