#![allow(clippy::print_stdout)]

use anyhow::{Context, Result};
use clap::Parser;

use tspack::bundling::output_targets;
use tspack::cli::args::CliArgs;
use tspack::cli::driver;
use tspack::config::OutputFormat;
use tspack::doctor;

fn main() -> Result<()> {
    // Initialize tracing if TSPACK_LOG or RUST_LOG is set (zero cost
    // otherwise). Supports TSPACK_LOG_FORMAT=tree|json|text.
    tspack::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;

    let project = driver::resolve_project(&cwd, &args)?;

    if args.doctor || project.config.doctor {
        doctor::run_doctor(&project.pkg);
        println!();
        doctor::inspect_pack_config(&cwd, &project.config);
        return Ok(());
    }

    if args.show_config {
        println!(
            "{}",
            serde_json::to_string_pretty(&project.ts_config)
                .context("failed to render resolved tsconfig")?
        );
        return Ok(());
    }

    print_resolved(&project);
    Ok(())
}

/// Print the resolved configuration summary: which package is being built,
/// with which options, into which targets.
fn print_resolved(project: &driver::ResolvedProject) {
    let name = project.pkg.name.as_deref().unwrap_or("<unnamed>");
    match project.pkg.version.as_deref() {
        Some(version) => println!("{name}@{version}"),
        None => println!("{name}"),
    }

    let formats = project
        .config
        .formats
        .iter()
        .map(|format| OutputFormat::as_str(*format))
        .collect::<Vec<_>>()
        .join(", ");
    println!("  input:    {}", project.config.input_file);
    println!("  tsconfig: {}", project.config.ts_config);
    println!("  formats:  {formats}");

    for target in output_targets(&project.pkg, &project.config) {
        println!(
            "  target:   {} ({:?})",
            target.dir.join(&target.entry_file_names).display(),
            target.format
        );
    }
}
