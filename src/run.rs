use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use umya_spreadsheet::Spreadsheet;

use crate::cli::{Command, Opts};
use crate::error::RunError;
use crate::invoices::Invoice;
use crate::ledger::Ledger;
use crate::paths::{sanitize, OutputPath};
use crate::render::{OfficeSession, Renderer, TemporaryInvoice};
use crate::report::{Reporter, Summary};
use crate::templates::{Layout, Templates};

fn load_layout(path: Option<&Path>) -> Result<Layout, RunError> {
    Ok(match path {
        Some(path) => {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            Layout::load(path)?.relative_to(base)
        }
        None => Layout::default(),
    })
}

fn load_ledger(path: &Path) -> Result<Ledger, RunError> {
    let ledger = Ledger::open(path)?;
    for column in ledger.missing_columns.iter() {
        warn!("Ledger {:?} has no '{}' column", path, column);
    }
    Ok(ledger)
}

pub fn run_cmd(opts: &Opts) -> Result<Summary, RunError> {
    let layout = load_layout(opts.layout.as_deref())?;
    let ledger = load_ledger(&opts.ledger)?;

    match opts.subcommand.unwrap_or(Command::Generate) {
        Command::Plan => {
            let mut reporter = Reporter::new(ledger.len(), false);
            plan(&ledger, &opts.output, &mut reporter);
            Ok(reporter.finish())
        }
        Command::Generate => {
            let templates = Templates::new(layout);
            fs::create_dir_all(&opts.output)?;

            let mut session = OfficeSession::start(&opts.soffice)?;
            let mut reporter = Reporter::new(ledger.len(), !opts.no_progress);
            let result = generate(
                &ledger,
                &templates,
                &mut session,
                &opts.output,
                &opts.temporary,
                &mut reporter,
            );
            session.close();
            result?;

            reporter.complete(&opts.output);
            Ok(reporter.finish())
        }
    }
}

/// Lists where each valid row would be written, without touching the
/// filesystem.
pub fn plan(
    ledger: &Ledger,
    output: &Path,
    reporter: &mut Reporter,
) -> Vec<(usize, PathBuf)> {
    let mut planned = Vec::new();
    for row in ledger.rows.iter().filter(|r| !r.is_blank()) {
        match Invoice::from_row(row) {
            Ok(invoice) => {
                let out = OutputPath::for_invoice(output, &invoice);
                reporter.planned(row.number, &out);
                planned.push((row.number, out.path()));
            }
            Err(skip) => reporter.skipped(row.number, skip),
        }
    }
    planned
}

fn render_row<R: Renderer>(
    book: &Spreadsheet,
    target: &Path,
    renderer: &mut R,
    temporary: &Path,
) -> Result<(), RunError> {
    let temp = TemporaryInvoice::write(book, temporary)?;
    renderer.render(temp.path(), target)?;
    Ok(())
}

/// Renders every valid row. Row level problems are reported and skipped; a
/// missing template stops the run.
pub fn generate<R: Renderer>(
    ledger: &Ledger,
    templates: &Templates,
    renderer: &mut R,
    output: &Path,
    temporary: &Path,
    reporter: &mut Reporter,
) -> Result<(), RunError> {
    let mut written: HashSet<PathBuf> = HashSet::new();

    for row in ledger.rows.iter() {
        reporter.advance();
        if row.is_blank() {
            continue;
        }

        let invoice = match Invoice::from_row(row) {
            Ok(invoice) => invoice,
            Err(skip) => {
                reporter.skipped(row.number, skip);
                continue;
            }
        };

        debug!("Row {}: {}", row.number, invoice);
        let book = templates.fill(&invoice)?;
        let out = OutputPath::for_invoice(output, &invoice);
        let safe_name = sanitize(&invoice.name);

        let result = match out.prepare() {
            Ok(target) => {
                if !written.insert(target.clone()) {
                    warn!("Row {} overwrites {:?}", row.number, target);
                }
                render_row(&book, &target, renderer, temporary)
            }
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(()) => reporter.generated(),
            Err(error) => reporter.failed(row.number, &safe_name, &error),
        }
    }
    Ok(())
}
