//! Shared derivation rules.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::error::ImpostoError;

/// `base × rate / 100`.
pub fn percentual(base: Decimal, aliquota: Decimal) -> Decimal {
    base * aliquota / dec!(100)
}

/// `quantity × unit value`.
pub fn por_quantidade(quantidade: Decimal, valor_unitario: Decimal) -> Decimal {
    quantidade * valor_unitario
}

/// Recover a base from an absolute amount: `value × 100 / rate`.
///
/// A zero rate leaves the base undetermined and is reported against `field`.
pub fn base_reversa(valor: Decimal, aliquota: Decimal, field: &str) -> Result<Decimal, ImpostoError> {
    if aliquota.is_zero() {
        return Err(ImpostoError::validation(
            field,
            format!("cannot derive base from value {valor} with zero rate"),
        ));
    }
    valor
        .checked_mul(dec!(100))
        .and_then(|v| v.checked_div(aliquota))
        .ok_or_else(|| ImpostoError::validation(field, format!("base of {valor} overflows")))
}

/// Base of a variant, falling back to the line item's own base.
pub fn resolve_base(base: Option<Decimal>, padrao: Decimal) -> Decimal {
    base.unwrap_or(padrao)
}

/// Apply a percentage reduction: `base × (1 − reduction / 100)`.
pub fn reduzir(base: Decimal, reducao: Decimal, field: &str) -> Result<Decimal, ImpostoError> {
    dec!(100)
        .checked_sub(reducao)
        .and_then(|fator| base.checked_mul(fator))
        .and_then(|v| v.checked_div(dec!(100)))
        .ok_or_else(|| ImpostoError::validation(field, format!("reduction {reducao} of {base} overflows")))
}

/// Apply an added value margin: `base × (1 + margin / 100)`.
pub fn agregar(base: Decimal, margem: Decimal, field: &str) -> Result<Decimal, ImpostoError> {
    dec!(100)
        .checked_add(margem)
        .and_then(|fator| base.checked_mul(fator))
        .and_then(|v| v.checked_div(dec!(100)))
        .ok_or_else(|| ImpostoError::validation(field, format!("margin {margem} on {base} overflows")))
}

/// Base that must have been resolved before deriving a value.
pub(crate) fn exigir_base(base: Option<Decimal>, field: &str) -> Result<Decimal, ImpostoError> {
    base.ok_or_else(|| ImpostoError::validation(field, "base not resolved"))
}

/// Round half away from zero.
pub fn arredondar(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentual_keeps_precision() {
        assert_eq!(percentual(dec!(4.99), dec!(0.65)), dec!(0.032435));
        assert_eq!(percentual(dec!(4.99), dec!(3.00)), dec!(0.1497));
        assert_eq!(percentual(dec!(1036.80), dec!(1.25)), dec!(12.96));
        assert_eq!(percentual(dec!(0), dec!(18)), dec!(0));
    }

    #[test]
    fn quantity_products() {
        assert_eq!(por_quantidade(dec!(2), dec!(9.00)), dec!(18.00));
        assert_eq!(por_quantidade(dec!(1), dec!(4.99)), dec!(4.99));
        assert_eq!(por_quantidade(dec!(3), dec!(0.1234)), dec!(0.3702));
    }

    #[test]
    fn reverse_base() {
        assert_eq!(base_reversa(dec!(12.96), dec!(1.25), "x").unwrap(), dec!(1036.80));
        let err = base_reversa(dec!(5), dec!(0), "icms.aliquota").unwrap_err();
        assert!(err.fields().contains_key("icms.aliquota"));
    }

    #[test]
    fn reduction_and_margin() {
        assert_eq!(reduzir(dec!(200), dec!(25), "x").unwrap(), dec!(150));
        assert_eq!(agregar(dec!(100), dec!(40), "x").unwrap(), dec!(140));
    }

    #[test]
    fn reduction_and_margin_overflow_is_an_error() {
        let err = reduzir(dec!(1), Decimal::MIN, "icms.reducao").unwrap_err();
        assert!(err.fields().contains_key("icms.reducao"));
        let err = agregar(Decimal::MAX, dec!(40), "icms.substituicao.margem").unwrap_err();
        assert!(err.fields().contains_key("icms.substituicao.margem"));
    }

    #[test]
    fn resolve_prefers_own_base() {
        assert_eq!(resolve_base(Some(dec!(10)), dec!(99)), dec!(10));
        assert_eq!(resolve_base(None, dec!(99)), dec!(99));
    }

    #[test]
    fn rounding_half_away_from_zero() {
        assert_eq!(arredondar(dec!(0.125), 2), dec!(0.13));
        assert_eq!(arredondar(dec!(0.032435), 2), dec!(0.03));
        assert_eq!(arredondar(dec!(-0.125), 2), dec!(-0.13));
    }
}
