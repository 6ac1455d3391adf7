use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use umya_spreadsheet::{reader, Spreadsheet, Worksheet};

use crate::billing::Currency;
use crate::calendar::ExcelSerial;
use crate::error::{FillError, LayoutError};
use crate::invoices::Invoice;
use crate::ledger::Cell;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct TemplatePaths {
    #[serde(rename = "TRY")]
    pub try_: PathBuf,
    pub pound: PathBuf,
    pub euro: PathBuf,
    pub usd: PathBuf,
}

impl Default for TemplatePaths {
    fn default() -> Self {
        Self {
            try_: Currency::Try.default_template().into(),
            pound: Currency::Pound.default_template().into(),
            euro: Currency::Euro.default_template().into(),
            usd: Currency::Usd.default_template().into(),
        }
    }
}

impl TemplatePaths {
    pub fn get(&self, currency: Currency) -> &Path {
        match currency {
            Currency::Try => &self.try_,
            Currency::Pound => &self.pound,
            Currency::Euro => &self.euro,
            Currency::Usd => &self.usd,
        }
    }
}

/// Addresses on the template's active sheet.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct Cells {
    pub date: String,
    pub number: String,
    pub name: String,
    pub hours: String,
    pub amount: String,
    pub note: String,
}

/// Highest column (XFD) and row a worksheet can address.
const MAX_COLUMN: u32 = 16_384;
const MAX_ROW: u32 = 1_048_576;

/// Accepts plain A1 style references such as `D15`, within sheet bounds.
fn valid_address(address: &str) -> bool {
    let split = address
        .find(|c: char| !c.is_ascii_uppercase())
        .unwrap_or(address.len());
    let (letters, digits) = address.split_at(split);
    if letters.is_empty() || letters.len() > 3 {
        return false;
    }
    if digits.is_empty()
        || digits.starts_with('0')
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return false;
    }
    let column = letters
        .bytes()
        .fold(0u32, |n, b| n * 26 + u32::from(b - b'A' + 1));
    matches!(digits.parse::<u32>(), Ok(row) if row <= MAX_ROW) && column <= MAX_COLUMN
}

impl Cells {
    pub fn validate(&self) -> Result<(), LayoutError> {
        for (field, address) in [
            ("date", &self.date),
            ("number", &self.number),
            ("name", &self.name),
            ("hours", &self.hours),
            ("amount", &self.amount),
            ("note", &self.note),
        ] {
            if !valid_address(address) {
                return Err(LayoutError::Cell {
                    field,
                    address: address.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Default for Cells {
    fn default() -> Self {
        Self {
            date: "D4".into(),
            number: "D7".into(),
            name: "A9".into(),
            hours: "C15".into(),
            amount: "D15".into(),
            note: "A15".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(default)]
pub struct Layout {
    pub templates: TemplatePaths,
    pub cells: Cells,
}

impl Layout {
    /// Reads an s-expression layout file; omitted fields keep their
    /// defaults. Every cell address is checked before any row is filled.
    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let reader = BufReader::new(File::open(path)?);
        let layout: Layout = serde_lexpr::from_reader(reader)?;
        layout.cells.validate()?;
        Ok(layout)
    }

    /// Template paths are taken relative to the layout file's folder.
    pub fn relative_to(mut self, base: &Path) -> Self {
        for path in [
            &mut self.templates.try_,
            &mut self.templates.pound,
            &mut self.templates.euro,
            &mut self.templates.usd,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }
}

fn write_cell(sheet: &mut Worksheet, address: &str, value: &Cell) {
    let cell = sheet.get_cell_mut(address);
    match value {
        Cell::Empty => {
            cell.set_value("");
        }
        Cell::Number(n) => match n.to_f64() {
            Some(f) => {
                cell.set_value_number(f);
            }
            None => {
                cell.set_value(n.to_string());
            }
        },
        Cell::Text(s) => {
            cell.set_value_string(s.as_str());
        }
        Cell::DateTime(dt) => {
            cell.set_value_number(dt.to_serial());
        }
        Cell::Bool(b) => {
            cell.set_value_bool(*b);
        }
    }
}

pub struct Templates {
    layout: Layout,
}

impl Templates {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn path(&self, currency: Currency) -> &Path {
        self.layout.templates.get(currency)
    }

    /// Loads a fresh copy of the currency's template and writes the invoice
    /// into it. Only the active sheet is touched.
    pub fn fill(&self, invoice: &Invoice) -> Result<Spreadsheet, FillError> {
        let currency = invoice.amount.currency;
        let path = self.path(currency);
        let mut book =
            reader::xlsx::read(path).map_err(|source| FillError::Template {
                currency,
                path: path.to_path_buf(),
                source,
            })?;

        let cells = &self.layout.cells;
        let sheet = book.get_active_sheet_mut();
        write_cell(sheet, &cells.date, &invoice.raw_date);
        write_cell(sheet, &cells.number, &invoice.number);
        write_cell(sheet, &cells.name, &Cell::Text(invoice.name.clone()));
        write_cell(sheet, &cells.hours, &invoice.hours);
        write_cell(sheet, &cells.amount, &invoice.amount.value);
        write_cell(sheet, &cells.note, &invoice.note);

        Ok(book)
    }
}
