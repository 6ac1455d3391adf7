use clap::{Parser, ValueHint};
use std::path::PathBuf;

/* Argument Stucture
 *
 * [--ledger <file>] [--output <dir>] [--layout <file>]
 * [--soffice <program>] [--temporary <file>] [--no-progress]
 * [generate | plan]
 */

#[derive(Parser)]
pub struct Opts {
    /// Workbook with one row per invoice
    #[clap(short, long, default_value="Kandela_2026.xlsx",
        value_hint=ValueHint::FilePath)]
    pub ledger: PathBuf,

    /// Root folder for the generated PDFs, grouped by month
    #[clap(short, long, default_value="output",
        value_hint=ValueHint::DirPath)]
    pub output: PathBuf,

    /// Template paths and cell addresses, overriding the defaults
    #[clap(long, value_hint=ValueHint::FilePath)]
    pub layout: Option<PathBuf>,

    /// Office program used to convert filled templates to PDF
    #[clap(long, default_value="soffice",
        value_hint=ValueHint::CommandName)]
    pub soffice: PathBuf,

    /// Scratch workbook shared by every row during conversion
    #[clap(long, default_value="temporary_invoice.xlsx",
        value_hint=ValueHint::FilePath)]
    pub temporary: PathBuf,

    /// Do not draw the progress bar
    #[clap(long)]
    pub no_progress: bool,

    #[clap(subcommand)]
    pub subcommand: Option<Command>,
}

#[derive(Parser, Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Generate a PDF invoice for every valid ledger row (default)
    Generate,
    /// Validate the ledger and list the PDFs that would be generated
    Plan,
}
