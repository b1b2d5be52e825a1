//! # lumber CLI
//!
//! Command-line front end for the dimension lumber design value engine.
//!
//! ```text
//! lumber values --species sp --grade no_2 --size 2x10 --repetitive --bearing-length 0.089
//! lumber values --species spf --grade no_1 --width 0.1 --depth 0.05 --wet --json
//! lumber --config lumber.toml values --size 2x6 --dry
//! lumber reference --species sp --grade stud --width 0.089
//! lumber grades --species sp
//! ```
//!
//! Section dimensions are in metres. Log output goes to stderr and is
//! controlled by `-v` or `RUST_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use lumber_core::adjustment::adjusted_design_values;
use lumber_core::config::{DesignConfig, OutputFormat};
use lumber_core::materials::{
    find_provider, GradeFamily, LumberMaterial, LumberSize, Orientation, ReferenceValueProvider,
    Species, SubGrade, TabulatedSpecies, TabulatedValue,
};
use lumber_core::nds_factors::{bearing_area_factor, nds_ref, RepetitiveMember, WetService};
use lumber_core::units::{Pascals, Psi};
use lumber_core::{LumberError, LumberResult};

#[derive(Parser)]
#[command(
    name = "lumber",
    about = "NDS adjusted design values for visually graded dimension lumber",
    version
)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of a text report
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Adjusted design values for a member
    Values(ValuesArgs),

    /// Tabulated (unadjusted) reference values
    Reference(ReferenceArgs),

    /// List the grades a species accepts
    Grades {
        /// Species (SP, SPF or a loaded table name); all species when omitted
        #[arg(short, long)]
        species: Option<String>,
    },
}

#[derive(Args)]
struct MaterialArgs {
    /// Species: SP, SPF or the name of a loaded species table
    #[arg(short, long)]
    species: Option<String>,

    /// Grade: structural, no_1, no_2, no_3, stud
    #[arg(short, long)]
    grade: Option<String>,

    /// Sub-grade: dense or non_dense (Southern Pine only)
    #[arg(long)]
    sub_grade: Option<String>,

    /// Wet service (MC > 19%)
    #[arg(long, conflicts_with = "dry")]
    wet: bool,

    /// Dry service, even when the config defaults to wet
    #[arg(long)]
    dry: bool,
}

#[derive(Args)]
struct ValuesArgs {
    #[command(flatten)]
    material: MaterialArgs,

    /// Standard size, e.g. 2x10
    #[arg(long, conflicts_with_all = ["width", "depth"])]
    size: Option<LumberSize>,

    /// Horizontal section dimension b (m)
    #[arg(long, requires = "depth")]
    width: Option<f64>,

    /// Section dimension in the load direction h (m)
    #[arg(long, requires = "width")]
    depth: Option<f64>,

    /// Load the wide face of a standard size
    #[arg(long, requires = "size")]
    flat: bool,

    /// Repetitive member factor C_r
    #[arg(long)]
    repetitive_factor: Option<f64>,

    /// Repetitive member use (C_r = 1.15)
    #[arg(long, conflicts_with = "repetitive_factor")]
    repetitive: bool,

    /// Bearing area factor C_b
    #[arg(long)]
    bearing_area_factor: Option<f64>,

    /// Bearing length parallel to grain (m); C_b is computed from it
    #[arg(long, conflicts_with = "bearing_area_factor")]
    bearing_length: Option<f64>,
}

#[derive(Args)]
struct ReferenceArgs {
    #[command(flatten)]
    material: MaterialArgs,

    /// Evaluate width-graduated values at this member width (m)
    #[arg(long)]
    width: Option<f64>,
}

/// Everything a subcommand needs from the config file
struct Session {
    config: DesignConfig,
    tables: Vec<TabulatedSpecies>,
    format: OutputFormat,
}

impl Session {
    fn load(cli: &Cli) -> Result<Self> {
        let config = DesignConfig::load_or_default(cli.config.as_deref())?;
        let tables = config.load_species_tables()?;
        let format = if cli.json { OutputFormat::Json } else { config.defaults.format };
        debug!(tables = tables.len(), ?format, "configuration ready");
        Ok(Self { config, tables, format })
    }

    fn material(&self, args: &MaterialArgs) -> Result<LumberMaterial> {
        let defaults = &self.config.defaults;
        let species = args.species.as_deref().unwrap_or(&defaults.species);
        let grade = args.grade.as_deref().unwrap_or(&defaults.grade);
        let sub_grade = args.sub_grade.as_deref().unwrap_or(&defaults.sub_grade);
        let wet = if args.dry {
            WetService::Dry
        } else {
            WetService::from_flag(args.wet || defaults.wet_service)
        };

        let provider = find_provider(species, &self.tables)?;
        Ok(LumberMaterial::from_names(provider, grade, sub_grade, wet)?)
    }

    fn print<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Text => println!("{}", text()),
        }
        Ok(())
    }
}

fn values(ctx: &Session, args: &ValuesArgs) -> Result<()> {
    let material = ctx.material(&args.material)?;
    let (b, h) = match (args.size, args.width, args.depth) {
        (Some(size), _, _) => {
            let orientation = if args.flat { Orientation::Flat } else { Orientation::Edge };
            size.section_m(orientation)
        }
        (None, Some(b), Some(h)) => (b, h),
        _ => bail!("give a section with --size or with --width and --depth"),
    };
    let (c_r, c_b) = member_factors(ctx, args)?;

    let values = adjusted_design_values(&material, b, h, c_r, c_b)?;
    ctx.print(&values, || values.format_report())
}

/// C_r and C_b from the flags, falling back to the config defaults
fn member_factors(ctx: &Session, args: &ValuesArgs) -> Result<(f64, f64)> {
    let defaults = &ctx.config.defaults;
    let c_r = match (args.repetitive, args.repetitive_factor) {
        (true, _) => RepetitiveMember::Repetitive.factor(),
        (false, Some(c_r)) => c_r,
        (false, None) => defaults.repetitive_factor,
    };
    let c_b = match (args.bearing_length, args.bearing_area_factor) {
        (Some(length_m), _) => bearing_area_factor(length_m)?,
        (None, Some(c_b)) => c_b,
        (None, None) => defaults.bearing_area_factor,
    };
    Ok((c_r, c_b))
}

#[derive(Serialize)]
struct ReferenceOutput {
    material: String,
    width_m: Option<f64>,
    values: serde_json::Value,
    #[serde(skip)]
    lines: Vec<(&'static str, String)>,
}

fn reference(ctx: &Session, args: &ReferenceArgs) -> Result<()> {
    let material = ctx.material(&args.material)?;
    let record = material.reference_values();

    let output = match args.width {
        Some(width_m) => {
            let at = record.at_width(width_m)?;
            let lines = vec![
                ("Fb", psi_text(at.fb)),
                ("Ft", psi_text(at.ft)),
                ("Fv", psi_text(at.fv)),
                ("Fc_perp", psi_text(at.fct)),
                ("Fc", psi_text(at.fc)),
                ("E", psi_text(at.e)),
                ("Emin", psi_text(at.emin)),
            ];
            ReferenceOutput {
                material: material.solved_material_name(),
                width_m: Some(width_m),
                values: serde_json::to_value(at)?,
                lines,
            }
        }
        None => {
            let lines = vec![
                ("Fb", tabulated_text(&record.fb)),
                ("Ft", tabulated_text(&record.ft)),
                ("Fv", psi_text(record.fv)),
                ("Fc_perp", psi_text(record.fct)),
                ("Fc", tabulated_text(&record.fc)),
                ("E", psi_text(record.e)),
                ("Emin", psi_text(record.emin)),
            ];
            ReferenceOutput {
                material: material.solved_material_name(),
                width_m: None,
                values: serde_json::to_value(record)?,
                lines,
            }
        }
    };

    ctx.print(&output, || {
        let mut text = format!("{}: {}", nds_ref::TABLE_4A, output.material);
        if let Some(width_m) = output.width_m {
            text.push_str(&format!(" at {:.1} mm", width_m * 1000.0));
        }
        text.push_str("\n================================================");
        for (label, value) in &output.lines {
            text.push_str(&format!("\n{:<8}= {}", label, value));
        }
        text
    })
}

fn psi_text(pa: f64) -> String {
    format!("{:>10.0} psi", Psi::from(Pascals(pa)).0)
}

fn tabulated_text(value: &TabulatedValue) -> String {
    match value {
        TabulatedValue::Constant(pa) => psi_text(*pa),
        TabulatedValue::WidthGraduated { .. } => "graduated by width (use --width)".to_string(),
    }
}

#[derive(Serialize)]
struct GradeListing {
    species: String,
    grades: Vec<(GradeFamily, SubGrade)>,
}

fn grades(ctx: &Session, species: Option<&str>) -> Result<()> {
    let providers: Vec<&dyn ReferenceValueProvider> = match species {
        Some(name) => vec![find_provider(name, &ctx.tables)?],
        None => {
            let mut all: Vec<&dyn ReferenceValueProvider> = Vec::new();
            for species in Species::ALL {
                all.push(species.provider());
            }
            for table in &ctx.tables {
                all.push(table);
            }
            all
        }
    };
    let listings = providers
        .iter()
        .map(|p| {
            Ok(GradeListing {
                species: p.name().to_string(),
                grades: p.grades()?,
            })
        })
        .collect::<LumberResult<Vec<_>>>()?;

    ctx.print(&listings, || {
        listings
            .iter()
            .map(|listing| {
                let grades: Vec<String> = listing
                    .grades
                    .iter()
                    .map(|(grade, sub)| match sub {
                        SubGrade::None => grade.code().to_string(),
                        sub => format!("{} ({})", grade.code(), sub.code()),
                    })
                    .collect();
                format!("{}: {}", listing.species, grades.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = Session::load(cli).context("loading configuration")?;
    match &cli.command {
        Commands::Values(args) => values(&ctx, args),
        Commands::Reference(args) => reference(&ctx, args),
        Commands::Grades { species } => grades(&ctx, species.as_deref()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(err) = e.downcast_ref::<LumberError>() {
                if let Ok(json) = serde_json::to_string_pretty(err) {
                    eprintln!();
                    eprintln!("Error JSON:");
                    eprintln!("{}", json);
                }
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_values() {
        let cli = Cli::try_parse_from([
            "lumber", "values", "--species", "sp", "--grade", "no_2", "--size", "2x10", "--flat",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Values(args) => {
                assert_eq!(args.size, Some(LumberSize::L2x10));
                assert!(args.flat);
                assert_eq!(args.material.grade.as_deref(), Some("no_2"));
            }
            _ => panic!("expected values"),
        }
    }

    #[test]
    fn test_size_conflicts_with_dimensions() {
        let result = Cli::try_parse_from([
            "lumber", "values", "--size", "2x10", "--width", "0.1", "--depth", "0.2",
        ]);
        assert!(result.is_err());
        assert!(Cli::try_parse_from(["lumber", "values", "--width", "0.1"]).is_err());
        assert!(Cli::try_parse_from(["lumber", "values", "--size", "7x9"]).is_err());
    }

    #[test]
    fn test_material_defaults_from_config() {
        let cli = Cli::try_parse_from(["lumber", "values", "--size", "2x4"]).unwrap();
        let ctx = Session::load(&cli).unwrap();
        let Commands::Values(args) = &cli.command else {
            panic!("expected values");
        };
        let material = ctx.material(&args.material).unwrap();
        assert_eq!(material.solved_material_name(), "SouthernPine_no_2_");
        assert!(!material.wet_service().is_wet());
        assert!(values(&ctx, args).is_ok());
    }

    #[test]
    fn test_unknown_grade_is_lumber_error() {
        let cli = Cli::try_parse_from([
            "lumber", "values", "--species", "spf", "--grade", "no_1", "--sub-grade", "dense",
            "--size", "2x4",
        ])
        .unwrap();
        let err = run(&cli).unwrap_err();
        let lumber = err.downcast_ref::<LumberError>().unwrap();
        assert_eq!(lumber.error_code(), "UNKNOWN_GRADE");
    }

    #[test]
    fn test_stud_too_wide() {
        // 2x8 is 7.25 in actual, 2x10 is over 8 in
        let stud = |size: &str| {
            Cli::try_parse_from(["lumber", "values", "--grade", "stud", "--size", size]).unwrap()
        };
        assert!(run(&stud("2x8")).is_ok());
        let cli = stud("2x10");
        let err = run(&cli).unwrap_err();
        assert_eq!(err.downcast_ref::<LumberError>().unwrap().error_code(), "DOMAIN_ERROR");
    }

    #[test]
    fn test_reference_and_grades() {
        let cli = Cli::try_parse_from([
            "lumber", "reference", "--species", "sp", "--grade", "no_1", "--width", "0.14",
        ])
        .unwrap();
        assert!(run(&cli).is_ok());
        let cli = Cli::try_parse_from(["lumber", "grades", "--json"]).unwrap();
        assert!(run(&cli).is_ok());
    }

    fn values_args(cli: &Cli) -> &ValuesArgs {
        match &cli.command {
            Commands::Values(args) => args,
            _ => panic!("expected values"),
        }
    }

    #[test]
    fn test_repetitive_and_bearing_length_flags() {
        let cli = Cli::try_parse_from([
            "lumber", "values", "--size", "2x10", "--repetitive", "--bearing-length", "0.0381",
        ])
        .unwrap();
        let ctx = Session::load(&cli).unwrap();
        let (c_r, c_b) = member_factors(&ctx, values_args(&cli)).unwrap();
        assert!((c_r - 1.15).abs() < 1e-12);
        // 1.5 in bearing: (1.5 + 0.375) / 1.5
        assert!((c_b - 1.25).abs() < 1e-9);

        let cli = Cli::try_parse_from(["lumber", "values", "--size", "2x10"]).unwrap();
        let (c_r, c_b) = member_factors(&ctx, values_args(&cli)).unwrap();
        assert_eq!((c_r, c_b), (1.0, 1.0));

        let cli = Cli::try_parse_from([
            "lumber", "values", "--size", "2x10", "--bearing-length", "0",
        ])
        .unwrap();
        let err = run(&cli).unwrap_err();
        assert_eq!(err.downcast_ref::<LumberError>().unwrap().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_factor_flags_conflict_with_explicit_factors() {
        let repetitive = Cli::try_parse_from([
            "lumber", "values", "--size", "2x10", "--repetitive", "--repetitive-factor", "1.1",
        ]);
        assert!(repetitive.is_err());
        let bearing = Cli::try_parse_from([
            "lumber", "values", "--size", "2x10", "--bearing-length", "0.05",
            "--bearing-area-factor", "1.1",
        ]);
        assert!(bearing.is_err());
    }

    #[test]
    fn test_dry_overrides_wet_config_default() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("lumber.toml");
        std::fs::write(&config_path, "[defaults]\nwet_service = true\n").unwrap();
        let config = config_path.to_str().unwrap();

        let cli = Cli::try_parse_from(["lumber", "--config", config, "values", "--size", "2x4"])
            .unwrap();
        let ctx = Session::load(&cli).unwrap();
        assert!(ctx.material(&values_args(&cli).material).unwrap().wet_service().is_wet());

        let cli = Cli::try_parse_from([
            "lumber", "--config", config, "values", "--size", "2x4", "--dry",
        ])
        .unwrap();
        let material = ctx.material(&values_args(&cli).material).unwrap();
        assert_eq!(material.wet_service(), WetService::Dry);

        let both = Cli::try_parse_from(["lumber", "values", "--size", "2x4", "--wet", "--dry"]);
        assert!(both.is_err());
    }
}
