//! Enrol CLI - bulk student upload and grade scales
//!
//! # Commands
//!
//! ```bash
//! enrol template -o downloads/        # Download the blank upload template
//! enrol check students.csv            # Run the local file gate only
//! enrol upload students.csv           # Validate, preview, confirm, commit
//! enrol grades check scale.csv        # Check grade ranges locally
//! enrol grades save 3 scale.csv       # Check, then replace scale 3's ranges
//! ```
//!
//! Backend settings come from `--api-url`/`--token`, `ENROL_API_URL`/
//! `ENROL_API_TOKEN`, or a `.env` file.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use enrol::{read_ranges_file, report, CliError, CliResult, HttpApi, Settings};
use enrol_core::{
    save_grade_scale, validate_file, validate_ranges, ExportedFile, GradeScaleError,
    UploadWorkflow, WorkflowError,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "enrol")]
#[command(about = "Bulk student upload and grade scales for the school backend", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the blank student upload template
    Template {
        /// Directory to save into (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a file's extension and size without uploading it
    Check {
        /// CSV file to check
        input: PathBuf,
    },

    /// Upload a CSV, preview the staged batch, and commit it
    Upload {
        /// CSV file to upload
        input: PathBuf,

        /// Commit without asking for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Directory for the error log if validation fails (default: current directory)
        #[arg(long)]
        error_log_dir: Option<PathBuf>,
    },

    /// Check or save grade scales
    Grades {
        #[command(subcommand)]
        action: GradesAction,
    },
}

#[derive(Subcommand)]
enum GradesAction {
    /// Check a grade scale CSV (min,max,grade[,remark])
    Check {
        /// Grade scale CSV file
        input: PathBuf,
    },

    /// Check a grade scale CSV, then replace the scale's ranges on the server
    Save {
        /// Grade scale ID
        scale_id: String,
        /// Grade scale CSV file
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Template { output } => cmd_template(&cli.settings, output.as_deref()).await,

        Commands::Check { input } => cmd_check(&input),

        Commands::Upload {
            input,
            yes,
            error_log_dir,
        } => cmd_upload(&cli.settings, &input, yes, error_log_dir.as_deref()).await,

        Commands::Grades { action } => cmd_grades(&cli.settings, action).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_template(settings: &Settings, output: Option<&Path>) -> CliResult<()> {
    let mut flow = UploadWorkflow::new(HttpApi::new(settings)?);
    eprintln!("📥 Downloading template from {}", flow.api().endpoints().base());

    let file = match flow.download_template().await {
        Ok(file) => file,
        Err(e) => {
            report::write_notice(&mut io::stderr(), flow.session().notice())?;
            return Err(e.into());
        }
    };
    let path = save_file(&file, output)?;
    eprintln!("💾 Template saved to: {}", path.display());
    Ok(())
}

fn cmd_check(input: &Path) -> CliResult<()> {
    let name = file_name(input)?;
    let size = fs::metadata(input)?.len();
    validate_file(&name, size).map_err(WorkflowError::from)?;
    eprintln!("✅ {} ({} bytes) can be uploaded", name, size);
    Ok(())
}

async fn cmd_upload(
    settings: &Settings,
    input: &Path,
    yes: bool,
    error_log_dir: Option<&Path>,
) -> CliResult<()> {
    let mut stderr = io::stderr();
    let mut flow = UploadWorkflow::new(HttpApi::new(settings)?);

    // Gate on name and size before reading a possibly huge file.
    let name = file_name(input)?;
    let size = fs::metadata(input)?.len();
    if let Err(e) = validate_file(&name, size) {
        return Err(WorkflowError::from(e).into());
    }

    eprintln!("📄 Uploading: {}", input.display());
    flow.select_file(name, fs::read(input)?)?;

    if let Err(e) = flow.preview().await {
        report::write_notice(&mut stderr, flow.session().notice())?;
        return Err(e.into());
    }
    report::write_notice(&mut stderr, flow.session().notice())?;

    if let Some(failure) = flow.session().failure() {
        let error_count = failure.errors.len();
        report::write_row_errors(&mut stderr, failure)?;
        if flow.session().has_error_log() {
            match flow.export_error_log() {
                Ok(file) => {
                    let path = save_file(&file, error_log_dir)?;
                    eprintln!("💾 Error log saved to: {}", path.display());
                }
                Err(_) => report::write_notice(&mut stderr, flow.session().notice())?,
            }
        }
        return Err(CliError::ValidationFailed(error_count));
    }

    let Some(batch) = flow.session().batch() else {
        return Err(WorkflowError::NoActiveBatch.into());
    };
    report::write_preview(&mut stderr, batch)?;

    if !yes && !confirm("Create these students?")? {
        flow.reset();
        eprintln!("🚫 Not committed. The staged batch will expire on the server.");
        return Ok(());
    }

    loop {
        match flow.commit().await {
            Ok(_) => {
                report::write_notice(&mut stderr, flow.session().notice())?;
                return Ok(());
            }
            Err(WorkflowError::Api(e)) => {
                report::write_notice(&mut stderr, flow.session().notice())?;
                if yes || !confirm("Retry the commit?")? {
                    return Err(WorkflowError::Api(e).into());
                }
            }
            Err(e) => {
                report::write_notice(&mut stderr, flow.session().notice())?;
                return Err(e.into());
            }
        }
    }
}

async fn cmd_grades(settings: &Settings, action: GradesAction) -> CliResult<()> {
    let mut stderr = io::stderr();

    match action {
        GradesAction::Check { input } => {
            eprintln!("📋 Checking grade scale: {}", input.display());
            let ranges = read_ranges_file(&input)?;
            match validate_ranges(&ranges) {
                Ok(sorted) => {
                    report::write_ranges(&mut stderr, &sorted)?;
                    eprintln!("✅ {} ranges, no problems found", sorted.len());
                }
                Err(issues) => {
                    report::write_issues(&mut stderr, &issues)?;
                    return Err(GradeScaleError::Invalid(issues).into());
                }
            }
        }

        GradesAction::Save { scale_id, input } => {
            eprintln!("📋 Saving grade scale {} from {}", scale_id, input.display());
            let ranges = read_ranges_file(&input)?;
            let api = HttpApi::new(settings)?;
            match save_grade_scale(&api, &scale_id, &ranges).await {
                Ok((message, sent)) => {
                    report::write_ranges(&mut stderr, &sent)?;
                    eprintln!("✅ {}", message);
                }
                Err(GradeScaleError::Invalid(issues)) => {
                    report::write_issues(&mut stderr, &issues)?;
                    return Err(GradeScaleError::Invalid(issues).into());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

fn file_name(path: &Path) -> CliResult<String> {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_owned)
        .ok_or_else(|| CliError::NotAFile(path.display().to_string()))
}

fn save_file(file: &ExportedFile, dir: Option<&Path>) -> CliResult<PathBuf> {
    let dir = dir.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let path = dir.join(&file.file_name);
    fs::write(&path, &file.bytes)?;
    Ok(path)
}

fn confirm(question: &str) -> CliResult<bool> {
    eprint!("❓ {} [y/N] ", question);
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
