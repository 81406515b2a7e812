//! Rate, quantity, exempt and generic variants shared by IPI, PIS and COFINS.
//!
//! Each record is generic over the family's situation code (`IpiCst`,
//! `ContribuicaoCst`), so the derivation rules are written once.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calc::{exigir_base, percentual, por_quantidade};
use super::error::ImpostoError;

/// Tax computed as a percentage of a base: `value = base × rate / 100`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aliquota<C> {
    /// CST of the situation.
    pub tributacao: C,
    /// Calculation base; `None` inherits the line item's base.
    pub base: Option<Decimal>,
    /// Rate in percent.
    pub aliquota: Decimal,
}

impl<C> Aliquota<C> {
    pub fn new(tributacao: C, aliquota: Decimal) -> Self {
        Self {
            tributacao,
            base: None,
            aliquota,
        }
    }

    pub fn with_base(mut self, base: Decimal) -> Self {
        self.base = Some(base);
        self
    }

    pub fn valor(&self) -> Result<Decimal, ImpostoError> {
        Ok(percentual(exigir_base(self.base, "base")?, self.aliquota))
    }

    pub fn resolve(&mut self, padrao: Decimal) {
        self.base.get_or_insert(padrao);
    }
}

/// Tax computed per unit: `value = quantity × unit value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantidade<C> {
    pub tributacao: C,
    /// Taxed quantity (`qUnid` / `qBCProd`).
    pub quantidade: Decimal,
    /// Tax per unit (`vUnid` / `vAliqProd`).
    pub valor_unitario: Decimal,
}

impl<C> Quantidade<C> {
    pub fn new(tributacao: C, quantidade: Decimal, valor_unitario: Decimal) -> Self {
        Self {
            tributacao,
            quantidade,
            valor_unitario,
        }
    }

    pub fn valor(&self) -> Decimal {
        por_quantidade(self.quantidade, self.valor_unitario)
    }
}

/// Exempt, untaxed, suspended or zero-rated: base, rate and value are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Isento<C> {
    pub tributacao: C,
}

impl<C> Isento<C> {
    pub fn new(tributacao: C) -> Self {
        Self { tributacao }
    }

    pub fn base(&self) -> Decimal {
        Decimal::ZERO
    }

    pub fn aliquota(&self) -> Decimal {
        Decimal::ZERO
    }

    pub fn valor(&self) -> Decimal {
        Decimal::ZERO
    }
}

/// Other operations: the amount is reported as is, never derived.
///
/// The optional base/rate or quantity/unit pair documents how the amount was
/// reached, it does not feed the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generico<C> {
    pub tributacao: C,
    pub base: Option<Decimal>,
    pub aliquota: Option<Decimal>,
    pub quantidade: Option<Decimal>,
    pub valor_unitario: Option<Decimal>,
    pub valor: Option<Decimal>,
}

impl<C> Generico<C> {
    pub fn new(tributacao: C) -> Self {
        Self {
            tributacao,
            base: None,
            aliquota: None,
            quantidade: None,
            valor_unitario: None,
            valor: None,
        }
    }

    pub fn with_valor(mut self, valor: Decimal) -> Self {
        self.valor = Some(valor);
        self
    }

    pub fn with_aliquota(mut self, base: Decimal, aliquota: Decimal) -> Self {
        self.base = Some(base);
        self.aliquota = Some(aliquota);
        self
    }

    pub fn with_quantidade(mut self, quantidade: Decimal, valor_unitario: Decimal) -> Self {
        self.quantidade = Some(quantidade);
        self.valor_unitario = Some(valor_unitario);
        self
    }

    pub fn valor(&self) -> Result<Decimal, ImpostoError> {
        self.valor
            .ok_or_else(|| ImpostoError::validation("valor", "generic situation requires a stored value"))
    }
}
