//! II: import tax.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calc::{exigir_base, percentual};
use super::error::ImpostoError;

/// Import tax of one line item: `vII = base × rate / 100`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ii {
    pub base: Option<Decimal>,
    pub aliquota: Decimal,
    /// `vDespAdu`: customs expenses.
    pub despesas: Decimal,
    /// `vIOF`.
    pub iof: Decimal,
}

impl Ii {
    pub fn new(aliquota: Decimal) -> Self {
        Self {
            base: None,
            aliquota,
            despesas: Decimal::ZERO,
            iof: Decimal::ZERO,
        }
    }

    pub fn with_base(mut self, base: Decimal) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_despesas(mut self, despesas: Decimal) -> Self {
        self.despesas = despesas;
        self
    }

    pub fn with_iof(mut self, iof: Decimal) -> Self {
        self.iof = iof;
        self
    }

    pub fn valor(&self) -> Result<Decimal, ImpostoError> {
        Ok(percentual(exigir_base(self.base, "ii.base")?, self.aliquota))
    }

    pub fn resolve(&mut self, padrao: Decimal) {
        self.base.get_or_insert(padrao);
    }
}
