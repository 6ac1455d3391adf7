use std::fmt;

use rust_decimal::Decimal;
use strum_macros::{Display, EnumIter};

use crate::ledger::Cell;

/// Declaration order is the selection priority when a row fills more than
/// one currency column.
#[derive(Display, EnumIter, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Currency {
    #[strum(serialize = "TRY")]
    Try,
    #[strum(serialize = "Pound")]
    Pound,
    #[strum(serialize = "Euro")]
    Euro,
    #[strum(serialize = "usd")]
    Usd,
}

impl Currency {
    /// Ledger header holding amounts in this currency.
    pub fn column(&self) -> &'static str {
        match self {
            Currency::Try => "TRY",
            Currency::Pound => "Pound",
            Currency::Euro => "Euro",
            Currency::Usd => "usd",
        }
    }

    pub fn default_template(&self) -> &'static str {
        match self {
            Currency::Try => "invoice.xlsx",
            Currency::Pound => "Invoice_Pound.xlsx",
            Currency::Euro => "Invoice_Euro.xlsx",
            Currency::Usd => "Invoice_Dolar.xlsx",
        }
    }
}

/// The value found in the selected currency column. Ledgers usually hold a
/// number, but text such as "1.000,00" is carried through untouched.
#[derive(Debug, PartialEq, Clone)]
pub struct Amount {
    pub currency: Currency,
    pub value: Cell,
}

impl Amount {
    pub fn new(currency: Currency, value: Cell) -> Self {
        Self { currency, value }
    }

    pub fn decimal(&self) -> Option<Decimal> {
        match self.value {
            Cell::Number(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.decimal() {
            Some(n) => write!(f, "{} {:.2}", self.currency, n),
            None => write!(f, "{} {}", self.currency, self.value),
        }
    }
}
