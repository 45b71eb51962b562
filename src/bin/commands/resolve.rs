use super::{print_json, print_table, ExtensionArgs};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sqlite_smoke::{OutputFormat, Platform, SmokeConfig};
use tabled::Tabled;

/// Arguments for the Resolve command
#[derive(Args)]
pub struct ResolveArgs {
    #[clap(flatten)]
    pub extension: ExtensionArgs,

    /// Resolve for another platform, e.g. macos-aarch64
    #[clap(long)]
    pub platform: Option<Platform>,
}

#[derive(Debug, Serialize, Tabled)]
struct ResolvedArtifact {
    path: String,
    platform: String,
    init_symbol: String,
    version_function: String,
}

pub fn run(config: &SmokeConfig, args: ResolveArgs, output_format: OutputFormat) -> Result<()> {
    let ResolveArgs {
        extension,
        platform,
    } = args;

    let config = config.clone().merge(extension.to_config());
    let platform = match platform {
        Some(p) => p,
        None => Platform::current()?,
    };
    let artifact = config.locator()?.with_platform(platform).resolve()?;

    let resolved = ResolvedArtifact {
        path: artifact.path.display().to_string(),
        platform: platform.to_string(),
        init_symbol: artifact.init_symbol(),
        version_function: artifact.version_function(),
    };

    match output_format {
        OutputFormat::Plain => println!("{}", resolved.path),
        OutputFormat::Table | OutputFormat::Markdown => print_table(&[resolved], output_format),
        OutputFormat::Json | OutputFormat::JsonPretty => print_json(&resolved, output_format)?,
        OutputFormat::Psv => {
            println!("path|platform|init_symbol|version_function");
            println!(
                "{}|{}|{}|{}",
                resolved.path, resolved.platform, resolved.init_symbol, resolved.version_function
            );
        }
    }
    Ok(())
}
