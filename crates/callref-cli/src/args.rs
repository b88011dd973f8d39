use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the callref binary.
#[derive(Parser, Debug)]
#[command(
    name = "callref",
    version,
    about = "Resolve `lhs::name` and `lhs::class` references against declaration stubs"
)]
pub struct CliArgs {
    /// Declaration stub file describing the scope references resolve in.
    #[arg(long, value_name = "FILE")]
    pub decls: Option<PathBuf>,

    /// Path to callref.json. Defaults to ./callref.json when present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Resolve as if inside the body of this class (dotted path, e.g. `a.b.Outer`).
    #[arg(long, value_name = "CLASS")]
    pub within: Option<String>,

    /// Print results and diagnostics as JSON.
    #[arg(long)]
    pub json: bool,

    /// Disable colored output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Reject bound references (`expr::name`, `expr::class`).
    #[arg(long = "no-bound-references")]
    pub no_bound_references: bool,

    /// Resolve without the reflection classes (`KClass`, `KFunction`, ...).
    #[arg(long = "no-reflection")]
    pub no_reflection: bool,

    /// Reference expressions to resolve, in order.
    #[arg(value_name = "REFERENCE", required = true)]
    pub references: Vec<String>,
}
