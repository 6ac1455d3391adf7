use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use strum::IntoEnumIterator;

use crate::billing::Currency;
use crate::calendar::ExcelSerial;
use crate::error::LoadError;

pub const DATE: &str = "DATE";
pub const NAME: &str = "Name";
pub const NUMBER: &str = "Inv No";
pub const HOURS: &str = "Hours";

/// Zero based position of the unnamed note column (column I).
pub const NOTE_COLUMN: usize = 8;

#[derive(Debug, PartialEq, Clone, Default)]
pub enum Cell {
    #[default]
    Empty,
    Number(Decimal),
    Text(String),
    DateTime(NaiveDateTime),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// `Some` only for cells holding a value.
    pub fn present(&self) -> Option<&Cell> {
        (!self.is_empty()).then_some(self)
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Int(i) => Cell::Number(Decimal::from(*i)),
            Data::Float(f) => Decimal::from_f64(*f)
                .map(|d| Cell::Number(d.normalize()))
                .unwrap_or(Cell::Empty),
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                if s.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(s.clone())
                }
            }
            Data::DateTime(dt) => NaiveDateTime::from_serial(dt.as_f64())
                .map(Cell::DateTime)
                .unwrap_or(Cell::Empty),
            Data::Bool(b) => Cell::Bool(*b),
            Data::Error(_) | Data::Empty => Cell::Empty,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::DateTime(dt) if dt.time() == chrono::NaiveTime::MIN => {
                write!(f, "{}", dt.date())
            }
            Cell::DateTime(dt) => write!(f, "{}", dt),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// One data row of the ledger, cells addressed by header name or position.
#[derive(Debug, PartialEq, Clone)]
pub struct LedgerRow {
    /// 1-based, counting data rows only.
    pub number: usize,
    pub date: Cell,
    pub name: Cell,
    pub invoice_no: Cell,
    pub hours: Cell,
    pub amounts: Vec<(Currency, Cell)>,
    pub note: Cell,
}

impl LedgerRow {
    pub fn is_blank(&self) -> bool {
        self.date.is_empty()
            && self.name.is_empty()
            && self.invoice_no.is_empty()
            && self.hours.is_empty()
            && self.note.is_empty()
            && self.amounts.iter().all(|(_, c)| c.is_empty())
    }
}

#[derive(Debug, Default)]
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_header(header: &[Data]) -> Self {
        let mut index = HashMap::new();
        for (i, cell) in header.iter().enumerate() {
            if let Data::String(s) = cell {
                index.entry(s.trim().to_string()).or_insert(i);
            }
        }
        Self { index }
    }

    fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    fn cell(&self, row: &[Data], name: &str) -> Cell {
        self.get(name)
            .and_then(|i| row.get(i))
            .map(Cell::from)
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct Ledger {
    pub rows: Vec<LedgerRow>,
    pub missing_columns: Vec<&'static str>,
}

impl Ledger {
    /// Reads the first worksheet of an xlsx, xls or ods workbook. The first
    /// row holds the headers.
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let mut workbook = open_workbook_auto(path).map_err(|source| {
            LoadError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| LoadError::NoSheet(path.to_path_buf()))??;

        // Positions are absolute: pad when the used range starts after A.
        let offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);
        let rows: Vec<Vec<Data>> = range
            .rows()
            .map(|r| {
                std::iter::repeat(Data::Empty)
                    .take(offset)
                    .chain(r.iter().cloned())
                    .collect()
            })
            .collect();

        Ok(Self::from_rows(&rows))
    }

    fn from_rows(rows: &[Vec<Data>]) -> Self {
        let Some((header, data)) = rows.split_first() else {
            return Self::default();
        };
        let columns = Columns::from_header(header);

        let mut expected = vec![DATE, NAME, NUMBER, HOURS];
        expected.extend(Currency::iter().map(|c| c.column()));
        let missing_columns = expected
            .into_iter()
            .filter(|name| columns.get(name).is_none())
            .collect();

        let rows = data
            .iter()
            .enumerate()
            .map(|(i, row)| LedgerRow {
                number: i + 1,
                date: columns.cell(row, DATE),
                name: columns.cell(row, NAME),
                invoice_no: columns.cell(row, NUMBER),
                hours: columns.cell(row, HOURS),
                amounts: Currency::iter()
                    .map(|c| (c, columns.cell(row, c.column())))
                    .collect(),
                note: row.get(NOTE_COLUMN).map(Cell::from).unwrap_or_default(),
            })
            .collect();

        Self {
            rows,
            missing_columns,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::path::PathBuf;
    use umya_spreadsheet::{new_file, writer};

    pub const HEADERS: [&str; 9] = [
        "DATE", "Name", "Inv No", "Hours", "TRY", "Pound", "Euro", "usd", "",
    ];

    pub enum Value<'a> {
        Text(&'a str),
        Number(f64),
    }

    /// Writes a ledger workbook laid out like the real one: headers in row
    /// one, the note in column I.
    pub fn write_ledger(path: &Path, rows: &[Vec<Option<Value>>]) {
        let mut book = new_file();
        let sheet = book.get_active_sheet_mut();
        for (col, header) in HEADERS.iter().enumerate() {
            if !header.is_empty() {
                sheet
                    .get_cell_mut((col as u32 + 1, 1))
                    .set_value(header.to_string());
            }
        }
        for (r, row) in rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                let cell = sheet.get_cell_mut((col as u32 + 1, r as u32 + 2));
                match value {
                    Some(Value::Text(s)) => {
                        cell.set_value(s.to_string());
                    }
                    Some(Value::Number(n)) => {
                        cell.set_value_number(*n);
                    }
                    None => {}
                }
            }
        }
        writer::xlsx::write(&book, path).unwrap();
    }

    fn header_row() -> Vec<Data> {
        HEADERS.iter().map(|h| Data::String(h.to_string())).collect()
    }

    #[test]
    fn reads_cells_by_header() {
        let rows = vec![
            header_row(),
            vec![
                Data::String("05/03/2025".into()),
                Data::String("Acme".into()),
                Data::Int(17),
                Data::Empty,
                Data::Float(1000.0),
                Data::Empty,
                Data::Empty,
                Data::Empty,
                Data::String("Danismanlik".into()),
            ],
        ];
        let ledger = Ledger::from_rows(&rows);

        assert!(ledger.missing_columns.is_empty());
        assert_eq!(ledger.len(), 1);
        let row = &ledger.rows[0];
        assert_eq!(row.number, 1);
        assert_eq!(row.name, Cell::Text("Acme".into()));
        assert_eq!(row.invoice_no, Cell::Number(dec!(17)));
        assert_eq!(row.hours, Cell::Empty);
        assert_eq!(row.amounts[0], (Currency::Try, Cell::Number(dec!(1000))));
        assert_eq!(row.note, Cell::Text("Danismanlik".into()));
    }

    #[test]
    fn short_rows_have_empty_note() {
        let rows = vec![
            header_row()[..4].to_vec(),
            vec![Data::String("05/03/2025".into()), Data::String("Acme".into())],
        ];
        let ledger = Ledger::from_rows(&rows);

        assert_eq!(ledger.rows[0].note, Cell::Empty);
        assert_eq!(ledger.rows[0].hours, Cell::Empty);
        assert_eq!(
            ledger.missing_columns,
            vec!["TRY", "Pound", "Euro", "usd"]
        );
    }

    #[test]
    fn blank_cells() {
        assert_eq!(Cell::from(&Data::String("  ".into())), Cell::Empty);
        assert_eq!(Cell::from(&Data::Float(f64::NAN)), Cell::Empty);
        assert_eq!(Cell::from(&Data::Float(12.50)), Cell::Number(dec!(12.5)));

        let blank = LedgerRow {
            number: 3,
            date: Cell::Empty,
            name: Cell::Empty,
            invoice_no: Cell::Empty,
            hours: Cell::Empty,
            amounts: Currency::iter().map(|c| (c, Cell::Empty)).collect(),
            note: Cell::Empty,
        };
        assert!(blank.is_blank());
    }

    #[test]
    fn display_dates() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        let cell = Cell::DateTime(date.and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(cell.to_string(), "2025-03-05");
    }

    #[test]
    fn opens_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.xlsx");
        write_ledger(
            &path,
            &[
                vec![
                    Some(Value::Text("05/03/2025")),
                    Some(Value::Text("Acme")),
                    Some(Value::Number(1.0)),
                    None,
                    Some(Value::Number(1000.0)),
                ],
                vec![],
                vec![
                    Some(Value::Text("06/03/2025")),
                    Some(Value::Text("Globex")),
                    None,
                    Some(Value::Number(7.5)),
                    None,
                    None,
                    Some(Value::Number(300.0)),
                    None,
                    Some(Value::Text("Mart")),
                ],
            ],
        );

        let ledger = Ledger::open(&path).unwrap();
        let names: Vec<String> =
            ledger.rows.iter().map(|r| r.name.to_string()).collect();

        assert_eq!(names.first().map(String::as_str), Some("Acme"));
        assert_eq!(names.last().map(String::as_str), Some("Globex"));
        let globex = ledger.rows.last().unwrap();
        assert_eq!(globex.number, 3);
        assert_eq!(globex.hours, Cell::Number(dec!(7.5)));
        assert_eq!(globex.amounts[2], (Currency::Euro, Cell::Number(dec!(300))));
        assert_eq!(globex.note, Cell::Text("Mart".into()));
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = Ledger::open(&PathBuf::from("does-not-exist.xlsx"));
        assert!(matches!(err, Err(LoadError::Open { .. })));
    }
}
