//! Write the OpenAPI document as JSON to stdout or a file.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use recordkeeper::ApiDoc;
use utoipa::OpenApi;

/// Command-line options for `openapi-dump`.
#[derive(Debug, Parser)]
#[command(about = "Export the Recordkeeper OpenAPI document")]
struct Args {
    /// Write to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .wrap_err("failed to serialise OpenAPI document")?;
    match args.output {
        Some(path) => std::fs::write(&path, json)
            .wrap_err_with(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
