//! IPI: tax on industrialized products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::codes::IpiCst;
use super::error::ImpostoError;
use super::tributo::{Aliquota, Isento, Quantidade};

/// Legal framework code used when no specific one applies.
pub const ENQUADRAMENTO_PADRAO: &str = "999";

/// How the IPI amount is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpiTributo {
    /// `IPITrib` with `vBC`/`pIPI`.
    Aliquota(Aliquota<IpiCst>),
    /// `IPITrib` with `qUnid`/`vUnid`.
    Quantidade(Quantidade<IpiCst>),
    /// `IPINT`.
    Isento(Isento<IpiCst>),
}

/// IPI of one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipi {
    /// `CNPJProd`: producer, when different from the issuer.
    pub cnpj_produtor: Option<String>,
    /// `cSelo`: control stamp code.
    pub selo: Option<String>,
    /// `qSelo`: number of control stamps.
    pub quantidade_selo: Option<u64>,
    /// `cEnq`: legal framework code.
    pub enquadramento: String,
    pub tributo: IpiTributo,
}

impl Ipi {
    pub fn new(tributo: IpiTributo) -> Self {
        Self {
            cnpj_produtor: None,
            selo: None,
            quantidade_selo: None,
            enquadramento: ENQUADRAMENTO_PADRAO.to_string(),
            tributo,
        }
    }

    pub fn aliquota(tributacao: IpiCst, aliquota: Decimal) -> Self {
        Self::new(IpiTributo::Aliquota(Aliquota::new(tributacao, aliquota)))
    }

    pub fn quantidade(tributacao: IpiCst, quantidade: Decimal, valor_unitario: Decimal) -> Self {
        Self::new(IpiTributo::Quantidade(Quantidade::new(
            tributacao,
            quantidade,
            valor_unitario,
        )))
    }

    pub fn isento(tributacao: IpiCst) -> Self {
        Self::new(IpiTributo::Isento(Isento::new(tributacao)))
    }

    pub fn with_enquadramento(mut self, codigo: impl Into<String>) -> Self {
        self.enquadramento = codigo.into();
        self
    }

    pub fn with_selo(mut self, codigo: impl Into<String>, quantidade: u64) -> Self {
        self.selo = Some(codigo.into());
        self.quantidade_selo = Some(quantidade);
        self
    }

    pub fn with_produtor(mut self, cnpj: impl Into<String>) -> Self {
        self.cnpj_produtor = Some(cnpj.into());
        self
    }

    pub fn tributacao(&self) -> &IpiCst {
        match &self.tributo {
            IpiTributo::Aliquota(a) => &a.tributacao,
            IpiTributo::Quantidade(q) => &q.tributacao,
            IpiTributo::Isento(i) => &i.tributacao,
        }
    }

    pub fn valor(&self) -> Result<Decimal, ImpostoError> {
        match &self.tributo {
            IpiTributo::Aliquota(a) => a.valor(),
            IpiTributo::Quantidade(q) => Ok(q.valor()),
            IpiTributo::Isento(i) => Ok(i.valor()),
        }
    }

    pub fn resolve(&mut self, padrao: Decimal) {
        if let IpiTributo::Aliquota(a) = &mut self.tributo {
            a.resolve(padrao);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_to_generic_framework() {
        let ipi = Ipi::isento(IpiCst::SaidaIsenta);
        assert_eq!(ipi.enquadramento, "999");
        assert_eq!(ipi.valor().unwrap(), dec!(0));
    }

    #[test]
    fn rate_and_unit_values() {
        let mut ipi = Ipi::aliquota(IpiCst::SaidaTributada, dec!(15));
        ipi.resolve(dec!(200));
        assert_eq!(ipi.valor().unwrap(), dec!(30));

        let ipi = Ipi::quantidade(IpiCst::SaidaTributada, dec!(2), dec!(9.00));
        assert_eq!(ipi.valor().unwrap(), dec!(18.00));
        assert_eq!(ipi.tributacao(), &IpiCst::SaidaTributada);
    }
}
