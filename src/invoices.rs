use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;

use crate::billing::Amount;
use crate::calendar::{parse_day_first, ExcelSerial};
use crate::error::Skip;
use crate::ledger::{Cell, LedgerRow};

/// A ledger row that passed validation.
#[derive(Debug, PartialEq, Clone)]
pub struct Invoice {
    pub row: usize,
    /// `DATE` as read, written back to the template unchanged.
    pub raw_date: Cell,
    pub date: NaiveDate,
    pub name: String,
    pub number: Cell,
    pub hours: Cell,
    pub amount: Amount,
    pub note: Cell,
}

fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Text(s) => parse_day_first(s),
        Cell::Number(n) => {
            NaiveDateTime::from_serial(n.to_f64()?).map(|dt| dt.date())
        }
        Cell::Empty | Cell::Bool(_) => None,
    }
}

impl Invoice {
    pub fn from_row(row: &LedgerRow) -> Result<Self, Skip> {
        let raw_date = row.date.present().ok_or(Skip::MissingDate)?;
        let name = row.name.present().ok_or(Skip::MissingName)?;
        let date = parse_date(raw_date).ok_or(Skip::InvalidDate)?;
        let amount = row
            .amounts
            .iter()
            .find(|(_, value)| !value.is_empty())
            .map(|(currency, value)| Amount::new(*currency, value.clone()))
            .ok_or(Skip::MissingCurrency)?;

        Ok(Self {
            row: row.number,
            raw_date: raw_date.clone(),
            date,
            name: name.to_string(),
            number: row.invoice_no.clone(),
            hours: row.hours.clone(),
            amount,
            note: row.note.clone(),
        })
    }
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "#{} {} {}: {}",
            self.number, self.date, self.name, self.amount
        )
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::billing::Currency;
    use rust_decimal_macros::dec;
    use strum::IntoEnumIterator;

    pub fn row(date: &str, name: &str, amounts: &[(Currency, Cell)]) -> LedgerRow {
        let text = |s: &str| {
            if s.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.to_string())
            }
        };
        LedgerRow {
            number: 1,
            date: text(date),
            name: text(name),
            invoice_no: Cell::Number(dec!(42)),
            hours: Cell::Empty,
            amounts: Currency::iter()
                .map(|c| {
                    let value = amounts
                        .iter()
                        .find(|(a, _)| *a == c)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_default();
                    (c, value)
                })
                .collect(),
            note: Cell::Empty,
        }
    }

    fn amount(n: rust_decimal::Decimal) -> Cell {
        Cell::Number(n)
    }

    #[test]
    fn valid_row() {
        let r = row("05/03/2025", "Acme", &[(Currency::Try, amount(dec!(1000)))]);
        let invoice = Invoice::from_row(&r).unwrap();

        assert_eq!(invoice.date, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        assert_eq!(invoice.name, "Acme");
        assert_eq!(invoice.amount.currency, Currency::Try);
        assert_eq!(invoice.raw_date, Cell::Text("05/03/2025".into()));
        assert_eq!(invoice.to_string(), "#42 2025-03-05 Acme: TRY 1000.00");
    }

    #[test]
    fn skip_reasons_in_order() {
        let pound = [(Currency::Pound, amount(dec!(5)))];

        assert_eq!(Invoice::from_row(&row("", "", &[])), Err(Skip::MissingDate));
        assert_eq!(
            Invoice::from_row(&row("05/03/2025", "", &pound)),
            Err(Skip::MissingName)
        );
        assert_eq!(
            Invoice::from_row(&row("March 5th", "Acme", &[])),
            Err(Skip::InvalidDate)
        );
        assert_eq!(
            Invoice::from_row(&row("05/03/2025", "Acme", &[])),
            Err(Skip::MissingCurrency)
        );
    }

    #[test]
    fn currency_priority() {
        let all = [
            (Currency::Usd, amount(dec!(4))),
            (Currency::Euro, amount(dec!(3))),
            (Currency::Pound, amount(dec!(2))),
            (Currency::Try, amount(dec!(1))),
        ];
        for skip in 0..all.len() {
            let filled = &all[..all.len() - skip];
            let r = row("05/03/2025", "Acme", filled);
            let picked = Invoice::from_row(&r).unwrap().amount;
            let expected = filled.last().unwrap();
            assert_eq!(picked.currency, expected.0);
            assert_eq!(picked.value, expected.1);
        }
    }

    #[test]
    fn date_cells() {
        let serial = Cell::Number(dec!(45721));
        assert_eq!(parse_date(&serial), NaiveDate::from_ymd_opt(2025, 3, 5));

        let dt = NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            parse_date(&Cell::DateTime(dt)),
            NaiveDate::from_ymd_opt(2025, 3, 5)
        );
        assert_eq!(parse_date(&Cell::Bool(true)), None);
    }
}
