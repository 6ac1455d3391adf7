use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::invoices::Invoice;

/// Keeps letters, digits, space, underscore and hyphen, then trims.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Where an invoice's PDF goes: `<root>/<MM>/<name> - <DD.MM>.pdf`.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct OutputPath {
    pub folder: PathBuf,
    pub file_name: String,
}

impl OutputPath {
    pub fn for_invoice(root: &Path, invoice: &Invoice) -> Self {
        let month = invoice.date.format("%m").to_string();
        let day_month = invoice.date.format("%d.%m");
        Self {
            folder: root.join(month),
            file_name: format!("{} - {}.pdf", sanitize(&invoice.name), day_month),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.folder.join(&self.file_name)
    }

    /// Creates the month folder if needed.
    pub fn prepare(&self) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.folder)?;
        Ok(self.path())
    }
}

impl fmt::Display for OutputPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}
