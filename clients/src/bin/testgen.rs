//! `neon-testgen`: writes one DejaGnu C test per catalog intrinsic.
//!
//! **Outputs:**
//! - `<out>/<stem>.c`: one test per intrinsic (`vorns64.c` for `vorn_s64`)
//! - `--dump-catalog <json>`: the catalog that was used, as JSON
//!
//! **Usage:**
//! ```
//! neon-testgen [--catalog <toml>] [--out <dir>] [--requirement <name>]
//!              [--option <flag>]... [--family <name>] [--action compile|assemble]
//!              [--dump-catalog <json>]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use neon_catalog::serializer::json;
use neon_clients::{build_options, load_catalog, select};
use neon_codegen::{emit_all, write_cases, EmitOptions, TestAction};

/// Generate NEON intrinsic tests.
#[derive(Parser)]
#[command(name = "neon-testgen", about = "Generate NEON intrinsic test sources")]
struct Args {
    /// TOML definition file to use instead of the built-in catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Output directory for the generated tests.
    #[arg(long, default_value = "generated")]
    out: PathBuf,

    /// Effective-target requirement gating every test (empty for none).
    #[arg(long, default_value = "arm_neon_ok")]
    requirement: String,

    /// Build option, repeatable (default: -save-temps -O2).
    #[arg(long = "option", value_name = "FLAG", allow_hyphen_values = true)]
    options: Vec<String>,

    /// Only generate tests for this family.
    #[arg(long)]
    family: Option<String>,

    /// How far the toolchain takes each test (`dg-do`).
    #[arg(long, default_value = "assemble")]
    action: TestAction,

    /// Also write the catalog as JSON to this path.
    #[arg(long)]
    dump_catalog: Option<PathBuf>,
}

fn main() -> Result<()> {
    neon_harness::logging::init().context("Failed to initialize logging")?;
    let args = Args::parse();

    let loaded = load_catalog(args.catalog.as_deref())?;
    let catalog = loaded.catalog.as_ref();
    let specs = select(catalog, args.family.as_deref())?;

    println!(
        "NEON catalog {}: {} intrinsics in {} families",
        catalog.version,
        catalog.len(),
        catalog.families().len()
    );

    let options = EmitOptions {
        target_requirement: args.requirement,
        build_options: build_options(&args.options),
        action: args.action,
    };

    fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create output directory: {}", args.out.display()))?;
    let batch = emit_all(specs.iter().copied(), &options);
    let report = write_cases(&batch, &args.out)?;
    println!("  Written: {} tests to {}", report.file_count, args.out.display());

    if let Some(path) = &args.dump_catalog {
        let text = serde_json::to_string_pretty(&json::to_json(catalog))
            .context("Failed to serialize catalog to JSON")?;
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  Written: {}", path.display());
    }

    let rejected = loaded.rejected.len() + report.rejected.len();
    if rejected > 0 {
        for reason in &loaded.rejected {
            eprintln!("  Rejected: {reason}");
        }
        for (name, reason) in &report.rejected {
            eprintln!("  Rejected: {name}: {reason}");
        }
        eprintln!("{rejected} definition(s) were not generated.");
    }

    Ok(())
}
