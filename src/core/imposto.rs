use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::contribuicao::Contribuicao;
use super::error::ImpostoError;
use super::icms::Icms;
use super::ii::Ii;
use super::ipi::Ipi;

/// Tax group of a variant.
///
/// `IcmsSt` and the three FCP levels tag sub-records that travel inside the
/// ICMS container; the others map one-to-one to a container of `<imposto>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grupo {
    Icms,
    IcmsSt,
    Ipi,
    Pis,
    PisSt,
    Cofins,
    CofinsSt,
    Ii,
    Fcp,
    FcpSt,
    FcpStRet,
}

impl Grupo {
    /// Container tag inside `<imposto>`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Icms | Self::IcmsSt | Self::Fcp | Self::FcpSt | Self::FcpStRet => "ICMS",
            Self::Ipi => "IPI",
            Self::Pis => "PIS",
            Self::PisSt => "PISST",
            Self::Cofins => "COFINS",
            Self::CofinsSt => "COFINSST",
            Self::Ii => "II",
        }
    }

    /// Whether the group's amount counts towards `vTotTrib`.
    pub fn compoe_total(&self) -> bool {
        !matches!(
            self,
            Self::Icms | Self::IcmsSt | Self::Fcp | Self::FcpSt | Self::FcpStRet
        )
    }
}

/// One tax variant attached to a line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Imposto {
    Icms(Icms),
    Ipi(Ipi),
    Pis(Contribuicao),
    PisSt(Contribuicao),
    Cofins(Contribuicao),
    CofinsSt(Contribuicao),
    Ii(Ii),
}

impl Imposto {
    pub fn grupo(&self) -> Grupo {
        match self {
            Self::Icms(_) => Grupo::Icms,
            Self::Ipi(_) => Grupo::Ipi,
            Self::Pis(_) => Grupo::Pis,
            Self::PisSt(_) => Grupo::PisSt,
            Self::Cofins(_) => Grupo::Cofins,
            Self::CofinsSt(_) => Grupo::CofinsSt,
            Self::Ii(_) => Grupo::Ii,
        }
    }

    /// Amount of the variant.
    pub fn valor(&self) -> Result<Decimal, ImpostoError> {
        match self {
            Self::Icms(icms) => icms.valor(),
            Self::Ipi(ipi) => ipi.valor(),
            Self::Pis(c) | Self::PisSt(c) | Self::Cofins(c) | Self::CofinsSt(c) => c.valor(),
            Self::Ii(ii) => ii.valor(),
        }
    }

    /// Contribution to the line item's total taxes (`vTotTrib`).
    pub fn retido(&self) -> Result<Decimal, ImpostoError> {
        if self.grupo().compoe_total() {
            self.valor()
        } else {
            Ok(Decimal::ZERO)
        }
    }

    /// Fill every inherited base from the line item's base.
    pub fn resolve(&mut self, padrao: Decimal) -> Result<(), ImpostoError> {
        match self {
            Self::Icms(icms) => icms.resolve(padrao)?,
            Self::Ipi(ipi) => ipi.resolve(padrao),
            Self::Pis(c) | Self::PisSt(c) | Self::Cofins(c) | Self::CofinsSt(c) => {
                c.resolve(padrao)
            }
            Self::Ii(ii) => ii.resolve(padrao),
        }
        Ok(())
    }

    /// Copy with every inherited base resolved.
    pub fn resolved(&self, padrao: Decimal) -> Result<Self, ImpostoError> {
        let mut imposto = self.clone();
        imposto.resolve(padrao)?;
        Ok(imposto)
    }
}

impl From<Icms> for Imposto {
    fn from(icms: Icms) -> Self {
        Self::Icms(icms)
    }
}

impl From<Ipi> for Imposto {
    fn from(ipi: Ipi) -> Self {
        Self::Ipi(ipi)
    }
}

impl From<Ii> for Imposto {
    fn from(ii: Ii) -> Self {
        Self::Ii(ii)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codes::IcmsCst;
    use crate::core::icms::Cobrado;
    use rust_decimal_macros::dec;

    #[test]
    fn icms_is_left_out_of_the_total() {
        let icms = Imposto::from(Icms::cobrado(Cobrado::default().with_valor(dec!(10), dec!(1.8))));
        assert_eq!(icms.valor().unwrap(), dec!(1.8));
        assert_eq!(icms.retido().unwrap(), dec!(0));

        let pis = Imposto::Pis(Contribuicao::aliquota(dec!(1.65))).resolved(dec!(100)).unwrap();
        assert_eq!(pis.retido().unwrap(), dec!(1.65));
    }

    #[test]
    fn container_tags() {
        assert_eq!(Grupo::Fcp.tag(), "ICMS");
        assert_eq!(Grupo::PisSt.tag(), "PISST");
        assert_eq!(Imposto::from(Icms::isento(IcmsCst::Isenta)).grupo(), Grupo::Icms);
        assert!(!Grupo::FcpStRet.compoe_total());
        assert!(Grupo::Ii.compoe_total());
    }
}
