use clap::Parser;

/// CLI arguments for the tspack binary.
///
/// Every flag has a manifest-declared equivalent under the `pack` block in
/// `package.json`; the CLI wins on conflict. The struct is plain data so
/// the aggregator can be exercised with synthetic flag sets in tests.
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "tspack",
    version,
    about = "A preconfigured bundler for TypeScript libraries",
    after_help = "\
Configuration via flags or package.json:
    --doctor, -d, pack.doctor
        Check package.json's publishing configuration

    --tsConfig, -c, pack.tsConfig
        TypeScript config to use on build (default: 'tsconfig.json')

    --inputFile, -i, pack.inputFile
        Entry point to bundle (default: 'src/index.ts')

    --formats, -f, pack.formats
        Comma-separated bundle formats: cjs, esm (default: 'cjs,esm')"
)]
pub struct CliArgs {
    /// Run configuration checks on package.json and exit.
    #[arg(short = 'd', long)]
    pub doctor: bool,

    /// Path to the TypeScript config used for the build.
    #[arg(short = 'c', long = "tsConfig", alias = "ts-config")]
    pub ts_config: Option<String>,

    /// Entry point to bundle.
    #[arg(short = 'i', long = "inputFile", alias = "input-file")]
    pub input_file: Option<String>,

    /// Comma-separated output formats (cjs, esm).
    #[arg(short = 'f', long)]
    pub formats: Option<String>,

    /// Print the fully resolved configuration instead of building.
    #[arg(long = "showConfig", alias = "show-config")]
    pub show_config: bool,
}
