use std::fmt;
use std::io::IsTerminal;
use std::path::Path;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;

use crate::error::Skip;

const TITLE: &str = "PDF Fatura Olusturuluyor";

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct Summary {
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} generated, {} skipped, {} failed",
            self.generated, self.skipped, self.failed
        )
    }
}

pub fn skip_line(row: usize, reason: Skip) -> String {
    format!("Atlaniyor (satir {}): {}", row, reason)
}

pub fn error_line(row: usize, name: &str, error: &dyn fmt::Display) -> String {
    format!("Hata (satir {}, {}): {}", row, name, error)
}

pub fn completion_line(output: &Path) -> String {
    format!(
        "PDF uretimi tamamlandi. Dosyalar '{}' klasorunde, aya gore siniflandirildi.",
        output.display()
    )
}

/// The bar shares stdout with the operator lines, and only shows on a
/// terminal.
fn draw_target(progress: bool) -> ProgressDrawTarget {
    if progress && std::io::stdout().is_terminal() {
        ProgressDrawTarget::stdout()
    } else {
        ProgressDrawTarget::hidden()
    }
}

/// Operator-facing output: one line per skipped or failed row above a live
/// progress bar.
pub struct Reporter {
    bar: ProgressBar,
    #[cfg(test)]
    lines: Vec<String>,
    pub summary: Summary,
}

impl Reporter {
    pub fn new(total: usize, progress: bool) -> Self {
        Self::with_target(total, draw_target(progress))
    }

    fn with_target(total: usize, target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total as u64), target);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg}: {percent:>3}%|{bar:40}| {pos}/{len} [{elapsed_precise}]")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        bar.set_message(TITLE);
        Self {
            bar,
            #[cfg(test)]
            lines: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Lines printed so far, in order.
    #[cfg(test)]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn print(&mut self, line: String) {
        // a hidden bar swallows println
        if self.bar.is_hidden() {
            println!("{}", line);
        } else {
            self.bar.println(&line);
        }
        #[cfg(test)]
        self.lines.push(line);
    }

    pub fn skipped(&mut self, row: usize, reason: Skip) {
        self.summary.skipped += 1;
        self.print(skip_line(row, reason));
    }

    pub fn failed(&mut self, row: usize, name: &str, error: &dyn fmt::Display) {
        self.summary.failed += 1;
        self.print(error_line(row, name, error));
    }

    pub fn generated(&mut self) {
        self.summary.generated += 1;
    }

    pub fn planned(&mut self, row: usize, path: &dyn fmt::Display) {
        self.print(format!("{}: {}", row, path));
    }

    pub fn advance(&self) {
        self.bar.inc(1);
    }

    pub fn complete(&mut self, output: &Path) {
        self.bar.finish_and_clear();
        let line = completion_line(output);
        println!("{}", line);
        #[cfg(test)]
        self.lines.push(line);
    }

    pub fn finish(self) -> Summary {
        self.bar.finish_and_clear();
        info!("{}", self.summary);
        self.summary
    }
}
