//! Gizi CLI - Command-line interface for the Gizi engine
//!
//! Commands:
//! - profile: Compute nutrition targets from a patient record
//! - evaluate: Evaluate a meal plan against daily targets
//! - foods: Search the food composition table
//! - presets: List the diet presets and their energy split

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use gizi_engine::adequacy::MicronutrientReference;
use gizi_engine::food::{FoodCategory, FoodTable};
use gizi_engine::pipeline::{compute_profile_record, MenuRequest, NutritionPlanner};
use gizi_engine::record::PatientRecord;
use gizi_engine::types::DietType;
use gizi_engine::{EngineError, ENGINE_VERSION};

/// Gizi - Nutrition profile calculator and menu adequacy evaluator
#[derive(Parser)]
#[command(name = "gizi")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Compute nutrition targets and evaluate daily menus", long_about = None)]
struct Cli {
    /// Log engine events to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute nutrition targets from a patient record
    Profile {
        /// Patient record JSON file (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Evaluate a meal plan against daily targets
    Evaluate {
        /// Food composition table (JSON array)
        #[arg(short, long)]
        foods: PathBuf,

        /// Menu request JSON file (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Micronutrient reference overrides (JSON object)
        #[arg(long)]
        micronutrients: Option<PathBuf>,

        /// Save the menu as a snapshot instead of only evaluating it
        #[arg(long)]
        save: bool,

        /// Print one adequacy line per nutrient instead of JSON
        #[arg(long, conflicts_with = "save")]
        report: bool,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Search the food composition table
    Foods {
        /// Food composition table (JSON array)
        #[arg(short, long)]
        foods: PathBuf,

        /// Case-insensitive name filter
        #[arg(short, long, default_value = "")]
        search: String,

        /// Restrict to one category
        #[arg(long)]
        category: Option<CategoryArg>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the diet presets and their energy split
    Presets {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Single-line JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    RawIngredient,
    ProcessedProduct,
    Tuber,
    TuberProduct,
    Other,
}

impl From<CategoryArg> for FoodCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::RawIngredient => FoodCategory::RawIngredient,
            CategoryArg::ProcessedProduct => FoodCategory::ProcessedProduct,
            CategoryArg::Tuber => FoodCategory::Tuber,
            CategoryArg::TuberProduct => FoodCategory::TuberProduct,
            CategoryArg::Other => FoodCategory::Other,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), GiziCliError> {
    match cli.command {
        Commands::Profile {
            input,
            output,
            output_format,
        } => cmd_profile(&input, &output, output_format),

        Commands::Evaluate {
            foods,
            input,
            output,
            micronutrients,
            save,
            report,
            output_format,
        } => cmd_evaluate(
            &foods,
            &input,
            &output,
            micronutrients.as_deref(),
            save,
            report,
            output_format,
        ),

        Commands::Foods {
            foods,
            search,
            category,
            json,
        } => cmd_foods(&foods, &search, category.map(FoodCategory::from), json),

        Commands::Presets { json } => cmd_presets(json),
    }
}

fn cmd_profile(input: &Path, output: &Path, output_format: OutputFormat) -> Result<(), GiziCliError> {
    let record = PatientRecord::from_json(&read_input(input)?)?;
    let profile = compute_profile_record(&record)?;

    write_output(output, &format_output(&profile, &output_format)?)
}

fn cmd_evaluate(
    foods: &Path,
    input: &Path,
    output: &Path,
    micronutrients: Option<&Path>,
    save: bool,
    report: bool,
    output_format: OutputFormat,
) -> Result<(), GiziCliError> {
    let table = FoodTable::from_json(&fs::read_to_string(foods)?)?;
    let request = MenuRequest::from_json(&read_input(input)?)?;

    let mut planner = NutritionPlanner::new(table);
    if let Some(path) = micronutrients {
        let micros = MicronutrientReference::from_json(&fs::read_to_string(path)?)?;
        planner = planner.with_micronutrients(micros);
    }

    let targets = planner.resolve_targets(&request)?;
    let rendered = if save {
        let snapshot = planner.save_menu(&request.plan, &targets, request.patient_record_id)?;
        format_output(&snapshot, &output_format)?
    } else {
        let evaluation = planner.evaluate(&request.plan, &targets)?;
        if report {
            let lines: Vec<String> = evaluation.adequacy.results.iter().map(|r| r.to_string()).collect();
            lines.join("\n")
        } else {
            format_output(&evaluation, &output_format)?
        }
    };

    write_output(output, &rendered)
}

fn cmd_foods(
    foods: &Path,
    search: &str,
    category: Option<FoodCategory>,
    json: bool,
) -> Result<(), GiziCliError> {
    let table = FoodTable::from_json(&fs::read_to_string(foods)?)?;
    let matches = table.search(search, category);

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
    } else {
        for entry in &matches {
            println!(
                "{:<8} {:<18} {:>7.1} kcal  {}",
                entry.code,
                entry.category().as_str(),
                entry.energy_kcal.unwrap_or(0.0),
                entry.name
            );
        }
        println!("{} of {} foods", matches.len(), table.len());
    }

    Ok(())
}

fn cmd_presets(json: bool) -> Result<(), GiziCliError> {
    let presets: Vec<PresetInfo> = DietType::ALL
        .iter()
        .map(|diet| {
            let composition = diet.composition();
            PresetInfo {
                diet_type: diet.as_str(),
                label: diet.label(),
                carb_percent: composition.carb_percent,
                protein_percent: composition.protein_percent,
                fat_percent: composition.fat_percent,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&presets)?);
    } else {
        println!("{:<30} {:>5} {:>8} {:>5}", "Diet", "Carb%", "Protein%", "Fat%");
        for p in &presets {
            println!(
                "{:<30} {:>5} {:>8} {:>5}",
                p.diet_type, p.carb_percent, p.protein_percent, p.fat_percent
            );
        }
    }

    Ok(())
}

fn read_input(input: &Path) -> Result<String, GiziCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(GiziCliError::NoInput);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), GiziCliError> {
    if output.to_string_lossy() == "-" {
        println!("{data}");
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn format_output<T: serde::Serialize>(value: &T, format: &OutputFormat) -> Result<String, GiziCliError> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
    };
    Ok(rendered)
}

#[derive(serde::Serialize)]
struct PresetInfo {
    diet_type: &'static str,
    label: &'static str,
    carb_percent: u8,
    protein_percent: u8,
    fat_percent: u8,
}

// Error types

#[derive(Debug)]
enum GiziCliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    NoInput,
}

impl From<io::Error> for GiziCliError {
    fn from(e: io::Error) -> Self {
        GiziCliError::Io(e)
    }
}

impl From<EngineError> for GiziCliError {
    fn from(e: EngineError) -> Self {
        GiziCliError::Engine(e)
    }
}

impl From<serde_json::Error> for GiziCliError {
    fn from(e: serde_json::Error) -> Self {
        GiziCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<GiziCliError> for CliError {
    fn from(e: GiziCliError) -> Self {
        match e {
            GiziCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            GiziCliError::Engine(e) => {
                let (code, hint) = match &e {
                    EngineError::Validation(_) => {
                        ("VALIDATION_ERROR", "Check the patient record and meal plan fields")
                    }
                    EngineError::ReferenceNotFound(_) => {
                        ("REFERENCE_NOT_FOUND", "Run 'gizi foods' to list valid food codes")
                    }
                    EngineError::ItemNotFound { .. } => {
                        ("ITEM_NOT_FOUND", "Check the meal slot and item index")
                    }
                    EngineError::Json(_) => ("JSON_ERROR", "Check JSON syntax"),
                    EngineError::Encoding(_) => ("ENCODING_ERROR", "Report this as a bug"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            GiziCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            GiziCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "stdin is a TTY and no input file was given".to_string(),
                hint: Some("Pipe JSON into the command or pass --input <file>".to_string()),
            },
        }
    }
}
