use std::path::PathBuf;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing::error;
use tracing_subscriber::EnvFilter;

use genomeark_sra_metadata::app::{App, GenerateOutcome};
use genomeark_sra_metadata::batch::load_batch;
use genomeark_sra_metadata::config::ConfigLoader;
use genomeark_sra_metadata::domain::{DataKind, SampleRequest};
use genomeark_sra_metadata::error::SraMetaError;
use genomeark_sra_metadata::output::{JsonOutput, RunSummary, SampleSummary};
use genomeark_sra_metadata::storage::{ObjectStore, S3HttpStore};

#[derive(Parser)]
#[command(name = "gark-sra")]
#[command(about = "Generate SRA submission metadata for GenomeArk sequencing data")]
#[command(version, author)]
struct Cli {
    /// Generate genome sequence metadata
    #[arg(short = 'g', long, global = true)]
    genome: bool,

    /// Generate transcriptome metadata
    #[arg(short = 'x', long, visible_alias = "tx", global = true)]
    transcriptome: bool,

    /// JSON config file (defaults to ./gark-sra.json when present)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Root directory for generated sheets
    #[arg(long, global = true)]
    output_dir: Option<Utf8PathBuf>,

    /// Print a JSON run summary on stdout
    #[arg(long, global = true)]
    json: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Generate metadata for one sample")]
    Single(SingleArgs),
    #[command(about = "Generate metadata for every sample in a CSV sheet")]
    Batch(BatchArgs),
}

#[derive(Args)]
struct SingleArgs {
    /// BioSample accession
    #[arg(short = 'b', long)]
    biosample: String,

    /// ToLID
    #[arg(short = 't', long)]
    tolid: String,

    /// Species name in latin (e.g. Homo_sapiens)
    #[arg(short = 's', long)]
    species: String,
}

#[derive(Args)]
struct BatchArgs {
    /// CSV file with BioSample, ToLID and Species columns
    #[arg(short = 'f', long)]
    filename: PathBuf,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<SraMetaError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &SraMetaError) -> u8 {
    match error {
        SraMetaError::InvalidBiosample(_)
        | SraMetaError::InvalidTolid(_)
        | SraMetaError::InvalidSpecies(_)
        | SraMetaError::ConfigRead(_)
        | SraMetaError::ConfigParse(_)
        | SraMetaError::BatchRead { .. } => 2,
        err if err.is_storage() => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let kinds = selected_kinds(&cli);
    if kinds.is_empty() {
        return Err(miette::Report::msg(
            "nothing to do (pass --genome and/or --transcriptome)",
        ));
    }

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let output_dir = cli.output_dir.clone().unwrap_or(config.output_dir);
    let store = S3HttpStore::new(&config.bucket, config.endpoint.as_deref())?;
    let app = App::new(store, config.instruments);

    let summary = match cli.command {
        Commands::Single(args) => {
            let request = SampleRequest::parse(&args.biosample, &args.tolid, &args.species)?;
            let mut samples = Vec::new();
            for kind in &kinds {
                let outcome = app.generate(&request, *kind, &output_dir)?;
                samples.push(sample_summary(&request, *kind, Ok(&outcome)));
            }
            RunSummary { samples }
        }
        Commands::Batch(args) => {
            let requests = load_batch(&args.filename)?;
            run_batch(&app, &requests, &kinds, &output_dir)
        }
    };

    report_summary(&summary, cli.json)?;

    let failed = summary
        .samples
        .iter()
        .filter(|sample| sample.error.is_some())
        .count();
    if failed > 0 {
        return Err(SraMetaError::BatchFailed {
            failed,
            total: summary.samples.len(),
        }
        .into());
    }
    Ok(())
}

fn selected_kinds(cli: &Cli) -> Vec<DataKind> {
    let mut kinds = Vec::new();
    if cli.genome {
        kinds.push(DataKind::Genome);
    }
    if cli.transcriptome {
        kinds.push(DataKind::Transcriptome);
    }
    kinds
}

/// A failing sample is logged and recorded; the rest of the sheet still runs.
fn run_batch<S: ObjectStore>(
    app: &App<S>,
    requests: &[SampleRequest],
    kinds: &[DataKind],
    output_dir: &Utf8Path,
) -> RunSummary {
    let mut samples = Vec::new();
    for request in requests {
        for kind in kinds {
            let outcome = app.generate(request, *kind, output_dir);
            if let Err(err) = &outcome {
                error!(tolid = %request.tolid, kind = %kind, "{err}");
            }
            samples.push(sample_summary(request, *kind, outcome.as_ref()));
        }
    }
    RunSummary { samples }
}

fn sample_summary(
    request: &SampleRequest,
    kind: DataKind,
    outcome: Result<&GenerateOutcome, &SraMetaError>,
) -> SampleSummary {
    match outcome {
        Ok(outcome) => SampleSummary {
            tolid: request.tolid.to_string(),
            species: request.species.to_string(),
            kind,
            status: outcome.report.status.as_str().to_string(),
            records: outcome.report.records.len(),
            skipped: outcome.report.skipped.len(),
            output: outcome.output.as_ref().map(|path| path.to_string()),
            error: None,
        },
        Err(err) => SampleSummary {
            tolid: request.tolid.to_string(),
            species: request.species.to_string(),
            kind,
            status: "failed".to_string(),
            records: 0,
            skipped: 0,
            output: None,
            error: Some(err.to_string()),
        },
    }
}

fn report_summary(summary: &RunSummary, json: bool) -> miette::Result<()> {
    if json {
        return JsonOutput::print_summary(summary).into_diagnostic();
    }
    for sample in &summary.samples {
        let target = sample
            .output
            .as_deref()
            .or(sample.error.as_deref())
            .unwrap_or("-");
        println!(
            "{} {} [{}]: {} records, {} skipped ({})",
            sample.species, sample.tolid, sample.kind, sample.records, sample.skipped, target
        );
    }
    Ok(())
}
