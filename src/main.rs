/*
 * Batch invoice generation from a ledger workbook
 *
 * For every ledger row:
 *  - Validate DATE (day first), Name and one currency column
 *      - Currency priority: TRY, Pound, Euro, usd
 *      - Invalid rows are reported and skipped
 *  - Load the currency's template and fill:
 *      - D4 date, D7 invoice number, A9 name
 *      - C15 hours, D15 amount, A15 note (ledger column I)
 *  - Save the filled template to the shared temporary workbook
 *  - Convert it to output/<MM>/<name> - <DD.MM>.pdf with soffice
 *  - Remove the temporary workbook
 *
 * The office session lives for the whole run and is released at the end,
 * failed rows or not.
 */

mod billing;
mod calendar;
mod cli;
mod error;
mod invoices;
mod ledger;
mod paths;
mod render;
mod report;
mod run;
mod templates;

use clap::Parser;
use crate::cli::Opts;

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    )
    .init();

    let opts = Opts::parse();

    if let Err(error) = run::run_cmd(&opts) {
        eprintln!("{}", error);
        std::process::exit(1);
    }
}
