//! PIS and COFINS: social contributions sharing one situation table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::codes::ContribuicaoCst;
use super::error::ImpostoError;
use super::tributo::{Aliquota, Generico, Isento, Quantidade};

/// PIS or COFINS of one line item.
///
/// The substitution blocks (`PISST`, `COFINSST`) reuse the rate and quantity
/// variants without their situation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contribuicao {
    /// CST 01, 02.
    Aliquota(Aliquota<ContribuicaoCst>),
    /// CST 03.
    Quantidade(Quantidade<ContribuicaoCst>),
    /// CST 04 to 09.
    Isento(Isento<ContribuicaoCst>),
    /// CST 49 to 99.
    Generico(Generico<ContribuicaoCst>),
}

impl Contribuicao {
    pub fn aliquota(aliquota: Decimal) -> Self {
        Self::Aliquota(Aliquota::new(ContribuicaoCst::Normal, aliquota))
    }

    pub fn quantidade(quantidade: Decimal, valor_unitario: Decimal) -> Self {
        Self::Quantidade(Quantidade::new(
            ContribuicaoCst::Quantidade,
            quantidade,
            valor_unitario,
        ))
    }

    /// Rate block for `PISST`/`COFINSST`, which carry no situation code.
    pub fn substituicao(aliquota: Decimal) -> Self {
        Self::Aliquota(Aliquota::new(ContribuicaoCst::Substituicao, aliquota))
    }

    pub fn isento(tributacao: ContribuicaoCst) -> Self {
        Self::Isento(Isento::new(tributacao))
    }

    pub fn generico(tributacao: ContribuicaoCst, valor: Decimal) -> Self {
        Self::Generico(Generico::new(tributacao).with_valor(valor))
    }

    pub fn tributacao(&self) -> &ContribuicaoCst {
        match self {
            Self::Aliquota(a) => &a.tributacao,
            Self::Quantidade(q) => &q.tributacao,
            Self::Isento(i) => &i.tributacao,
            Self::Generico(g) => &g.tributacao,
        }
    }

    pub fn valor(&self) -> Result<Decimal, ImpostoError> {
        match self {
            Self::Aliquota(a) => a.valor(),
            Self::Quantidade(q) => Ok(q.valor()),
            Self::Isento(i) => Ok(i.valor()),
            Self::Generico(g) => g.valor(),
        }
    }

    pub fn resolve(&mut self, padrao: Decimal) {
        if let Self::Aliquota(a) = self {
            a.resolve(padrao);
        }
    }
}
