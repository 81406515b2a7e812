//! `<II>` import tax block.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::node::Element;
use crate::core::calc::exigir_base;
use crate::core::{Ii, ImpostoError};

pub const TAG: &str = "II";

pub fn encode(ii: &Ii) -> Result<Element, ImpostoError> {
    let mut el = Element::new(TAG);
    el.push_valor("vBC", exigir_base(ii.base, "ii.base")?)
        .push_valor("vDespAdu", ii.despesas)
        .push_valor("vII", ii.valor()?)
        .push_valor("vIOF", ii.iof);
    Ok(el)
}

/// The block has no rate tag, so the rate is recovered as `vII × 100 / vBC`.
pub fn decode(el: &Element) -> Result<Ii, ImpostoError> {
    let base = el.required_decimal("vBC")?;
    let valor = el.required_decimal("vII")?;
    let aliquota = if base.is_zero() {
        if !valor.is_zero() {
            return Err(ImpostoError::validation(
                "ii.base",
                format!("cannot derive rate from value {valor} with zero base"),
            ));
        }
        Decimal::ZERO
    } else {
        valor
            .checked_mul(dec!(100))
            .and_then(|v| v.checked_div(base))
            .ok_or_else(|| ImpostoError::validation("ii.aliquota", format!("rate of {valor} overflows")))?
    };
    Ok(Ii::new(aliquota)
        .with_base(base)
        .with_despesas(el.required_decimal("vDespAdu")?)
        .with_iof(el.required_decimal("vIOF")?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_and_reverse_rate() {
        let ii = Ii::new(dec!(14))
            .with_base(dec!(1000))
            .with_despesas(dec!(35.5))
            .with_iof(dec!(3.8));
        let xml = encode(&ii).unwrap().to_xml().unwrap();
        assert_eq!(
            xml,
            "<II><vBC>1000.00</vBC><vDespAdu>35.50</vDespAdu><vII>140.00</vII><vIOF>3.80</vIOF></II>"
        );
        assert_eq!(decode(&Element::parse(&xml).unwrap()).unwrap(), ii);
    }

    #[test]
    fn zero_base() {
        let el = Element::parse("<II><vBC>0</vBC><vDespAdu>0</vDespAdu><vII>0</vII><vIOF>0</vIOF></II>").unwrap();
        assert_eq!(decode(&el).unwrap().aliquota, dec!(0));

        let el = Element::parse("<II><vBC>0</vBC><vDespAdu>0</vDespAdu><vII>5</vII><vIOF>0</vIOF></II>").unwrap();
        assert!(matches!(decode(&el), Err(ImpostoError::Validation(_))));
    }
}
