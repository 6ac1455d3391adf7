use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::billing::Currency;

/// Why a ledger row produced no invoice. Displayed as printed to the
/// operator.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum Skip {
    #[error("DATE eksik.")]
    MissingDate,

    #[error("Name eksik.")]
    MissingName,

    #[error("DATE formati gecersiz.")]
    InvalidDate,

    #[error("Doviz degeri bulunamadi.")]
    MissingCurrency,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not open ledger {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: calamine::Error,
    },

    #[error("Ledger {0:?} has no worksheet")]
    NoSheet(PathBuf),

    #[error("Error reading ledger: {source}")]
    Read {
        #[from]
        source: calamine::Error,
    },
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("IO Error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("Error decoding layout: {source}")]
    Format {
        #[from]
        source: serde_lexpr::Error,
    },

    #[error("Layout cell '{field}' has an invalid address: '{address}'")]
    Cell {
        field: &'static str,
        address: String,
    },
}

#[derive(Debug, Error)]
pub enum FillError {
    #[error("Could not load {currency} template {path:?}: {source}")]
    Template {
        currency: Currency,
        path: PathBuf,
        source: umya_spreadsheet::XlsxError,
    },

    #[error("Could not save {path:?}: {source}")]
    Save {
        path: PathBuf,
        source: umya_spreadsheet::XlsxError,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Office program {program:?} could not be started: {source}")]
    Unavailable { program: PathBuf, source: io::Error },

    #[error("IO Error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("Conversion failed ({status}): {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Conversion produced no PDF at {0:?}")]
    NoOutput(PathBuf),
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{source}")]
    Load {
        #[from]
        source: LoadError,
    },

    #[error("{source}")]
    Layout {
        #[from]
        source: LayoutError,
    },

    #[error("{source}")]
    Fill {
        #[from]
        source: FillError,
    },

    #[error("{source}")]
    Render {
        #[from]
        source: RenderError,
    },

    #[error("IO Error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}
