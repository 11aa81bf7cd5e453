use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use drivedigest::{
    config,
    drive::FileKind,
    export, logging,
    processing::{BatchOrchestrator, FileStatus, ResultSet},
    remote::ServiceClient,
};
use time::OffsetDateTime;

#[derive(Parser)]
#[command(
    name = "drivedigest-cli",
    about = "Summarize the documents in a Google Drive folder"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline in this process using credentials from the environment.
    Run {
        #[command(flatten)]
        batch: BatchArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Hand the batch to a running drivedigest server.
    Remote {
        #[command(flatten)]
        batch: BatchArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(
            long,
            env = "SUMMARIZER_SERVICE_URL",
            default_value = "http://127.0.0.1:4100"
        )]
        service_url: String,
        #[arg(long, env = "SERVICE_TIMEOUT_SECS", default_value_t = 300)]
        timeout_secs: u64,
    },
    /// Render reports from a result set saved with `--json`.
    Export {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct BatchArgs {
    /// Drive folder id.
    #[arg(long)]
    folder: String,
    /// Restrict to these types (repeatable); defaults to pdf, docx, and txt.
    #[arg(long = "type", value_parser = parse_kind)]
    types: Vec<FileKind>,
}

#[derive(Args)]
struct OutputArgs {
    /// Write the result set as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
    /// Write a CSV report.
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Write a PDF report.
    #[arg(long)]
    pdf: Option<PathBuf>,
}

fn parse_kind(value: &str) -> Result<FileKind, String> {
    FileKind::from_extension(value)
        .ok_or_else(|| format!("unsupported file type '{value}' (expected pdf, docx, or txt)"))
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_tracing();

    match cli.command {
        Command::Run { batch, output } => {
            config::init_config();
            let orchestrator =
                BatchOrchestrator::from_config().context("failed to build Drive client")?;
            let results = orchestrator
                .run(&batch.folder, &kinds(&batch.types))
                .await
                .with_context(|| format!("failed to summarize folder {}", batch.folder))?;
            print_results(&results);
            write_outputs(&results, &output)
        }
        Command::Remote {
            batch,
            output,
            service_url,
            timeout_secs,
        } => {
            let client =
                ServiceClient::with_base_url(&service_url, Duration::from_secs(timeout_secs))?;
            let results = client
                .summarize_folder(&batch.folder, &kinds(&batch.types))
                .await?;
            print_results(&results);
            if let Some(path) = &output.json {
                write_file(path, &serde_json::to_vec_pretty(&results)?)?;
            }
            if let Some(path) = &output.csv {
                write_file(path, &client.export_csv(&results).await?)?;
            }
            if let Some(path) = &output.pdf {
                write_file(path, &client.export_pdf(&results).await?)?;
            }
            Ok(())
        }
        Command::Export { input, output } => {
            let raw = fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let results: ResultSet = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a saved result set", input.display()))?;
            if output.csv.is_none() && output.pdf.is_none() && output.json.is_none() {
                bail!("nothing to do: pass --csv and/or --pdf");
            }
            write_outputs(&results, &output)
        }
    }
}

fn kinds(requested: &[FileKind]) -> Vec<FileKind> {
    if requested.is_empty() {
        FileKind::ALL.to_vec()
    } else {
        requested.to_vec()
    }
}

fn print_results(results: &ResultSet) {
    for (index, file) in results.files.iter().enumerate() {
        let marker = match file.status {
            FileStatus::Success => "ok ",
            FileStatus::Error => "ERR",
            FileStatus::Unknown => " ? ",
        };
        println!("{:>3}. [{marker}] {} ({})", index + 1, file.name, file.size);
        println!("      {}", file.summary.replace('\n', "\n      "));
    }
    println!(
        "{} files: {} succeeded, {} failed",
        results.total_files,
        results.success_count(),
        results.error_count()
    );
}

fn write_outputs(results: &ResultSet, output: &OutputArgs) -> Result<()> {
    if let Some(path) = &output.json {
        write_file(path, &serde_json::to_vec_pretty(results)?)?;
    }
    if let Some(path) = &output.csv {
        write_file(path, &export::render_csv(results)?)?;
    }
    if let Some(path) = &output.pdf {
        let pdf = export::render_pdf(results, OffsetDateTime::now_utc())?;
        write_file(path, &pdf)?;
    }
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
