use std::path::PathBuf;
use std::process::ExitCode;

use brd_qa::app::{self, RunOptions};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "brd-qa")]
#[command(about = "Generate a QA test-case workbook from a Business Requirements Document")]
struct Cli {
    /// BRD in PDF form.
    pdf: PathBuf,
    /// Project name used in the prompts. Defaults to the PDF file name.
    #[arg(long)]
    project: Option<String>,
    /// TOML settings file. Defaults to ./brd-qa.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory for the generated report.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    app::init_tracing();
    let cli = Cli::parse();

    let options = RunOptions {
        pdf: cli.pdf,
        project: cli.project,
        config: cli.config,
        output_dir: cli.output_dir,
    };

    match app::run(options).await {
        Ok(artifact) => {
            let summary = artifact.summary;
            println!("{}", artifact.path.display());
            println!(
                "{} modules, {} scenarios, {} test cases, {} edge cases, {} automation candidates",
                summary.modules,
                summary.scenarios,
                summary.test_cases,
                summary.edge_cases,
                summary.automation_candidates
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
