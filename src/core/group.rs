use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ImpostoError;
use super::imposto::{Grupo, Imposto};

/// The tax variants of one line item, in wire order.
///
/// Holds at most one variant per [`Grupo`]. Adding a variant whose group is
/// already present replaces the earlier one in its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxGroup {
    impostos: Vec<Imposto>,
}

impl TaxGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variant; last wins for a repeated group.
    pub fn add(&mut self, imposto: Imposto) {
        let grupo = imposto.grupo();
        match self.impostos.iter_mut().find(|i| i.grupo() == grupo) {
            Some(slot) => *slot = imposto,
            None => self.impostos.push(imposto),
        }
    }

    pub fn get(&self, grupo: Grupo) -> Option<&Imposto> {
        self.impostos.iter().find(|i| i.grupo() == grupo)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Imposto> {
        self.impostos.iter()
    }

    pub fn len(&self) -> usize {
        self.impostos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.impostos.is_empty()
    }

    /// Copy with every inherited base filled from `padrao`.
    pub fn resolved(&self, padrao: Decimal) -> Result<Self, ImpostoError> {
        Ok(Self {
            impostos: self
                .impostos
                .iter()
                .map(|i| i.resolved(padrao))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Sum of the amounts that count towards `vTotTrib`.
    ///
    /// Bases must already be resolved.
    pub fn total_retido(&self) -> Result<Decimal, ImpostoError> {
        self.impostos
            .iter()
            .try_fold(Decimal::ZERO, |acc, i| i.retido().map(|v| acc + v))
    }
}

impl FromIterator<Imposto> for TaxGroup {
    fn from_iter<I: IntoIterator<Item = Imposto>>(iter: I) -> Self {
        let mut group = Self::new();
        for imposto in iter {
            group.add(imposto);
        }
        group
    }
}

impl<'a> IntoIterator for &'a TaxGroup {
    type Item = &'a Imposto;
    type IntoIter = std::slice::Iter<'a, Imposto>;

    fn into_iter(self) -> Self::IntoIter {
        self.impostos.iter()
    }
}

/// Line item (`det`) reduced to what the tax block needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// `nItem`.
    pub id: String,
    /// Default base inherited by variants without their own (`vProd`).
    pub base: Decimal,
    pub impostos: TaxGroup,
    /// `vTotTrib`, set when the tax block is built.
    pub tributos: Option<Decimal>,
}

/// Builder for LineItem.
pub struct LineItemBuilder {
    id: String,
    base: Decimal,
    impostos: TaxGroup,
}

impl LineItemBuilder {
    pub fn new(id: impl Into<String>, base: Decimal) -> Self {
        Self {
            id: id.into(),
            base,
            impostos: TaxGroup::new(),
        }
    }

    pub fn imposto(mut self, imposto: impl Into<Imposto>) -> Self {
        self.impostos.add(imposto.into());
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            id: self.id,
            base: self.base,
            impostos: self.impostos,
            tributos: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codes::{ContribuicaoCst, IcmsCst};
    use crate::core::contribuicao::Contribuicao;
    use crate::core::icms::Icms;
    use rust_decimal_macros::dec;

    #[test]
    fn keeps_insertion_order() {
        let group: TaxGroup = [
            Imposto::Pis(Contribuicao::aliquota(dec!(0.65))),
            Imposto::from(Icms::isento(IcmsCst::Isenta)),
            Imposto::Cofins(Contribuicao::aliquota(dec!(3))),
        ]
        .into_iter()
        .collect();
        let grupos: Vec<_> = group.iter().map(Imposto::grupo).collect();
        assert_eq!(grupos, [Grupo::Pis, Grupo::Icms, Grupo::Cofins]);
    }

    #[test]
    fn repeated_group_last_wins_in_place() {
        let mut group = TaxGroup::new();
        group.add(Imposto::Pis(Contribuicao::aliquota(dec!(0.65))));
        group.add(Imposto::Cofins(Contribuicao::aliquota(dec!(3))));
        group.add(Imposto::Pis(Contribuicao::isento(ContribuicaoCst::Isenta)));

        assert_eq!(group.len(), 2);
        assert_eq!(group.iter().next().map(Imposto::grupo), Some(Grupo::Pis));
        assert_eq!(
            group.get(Grupo::Pis),
            Some(&Imposto::Pis(Contribuicao::isento(ContribuicaoCst::Isenta)))
        );
    }

    #[test]
    fn total_needs_resolved_bases() {
        let item = LineItemBuilder::new("1", dec!(4.99))
            .imposto(Imposto::Pis(Contribuicao::aliquota(dec!(0.65))))
            .build();
        assert!(item.impostos.total_retido().is_err());
        let total = item.impostos.resolved(item.base).unwrap().total_retido().unwrap();
        assert_eq!(total, dec!(0.032435));
    }
}
