use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::contribuicao::Contribuicao;
use super::error::ValidationError;
use super::group::TaxGroup;
use super::icms::{Fcp, IcmsTributo, Normal, Substituicao};
use super::imposto::Imposto;
use super::ipi::IpiTributo;
use super::tributo::{Aliquota, Generico, Quantidade};

/// Validate every variant of a line item.
/// Returns all validation errors found (not just the first).
pub fn validate_group(group: &TaxGroup) -> Vec<ValidationError> {
    group.iter().flat_map(validate_imposto).collect()
}

/// Validate the inputs of a single variant.
pub fn validate_imposto(imposto: &Imposto) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match imposto {
        Imposto::Icms(icms) => {
            let prefix = "icms";
            match &icms.tributo {
                IcmsTributo::Normal(n) => {
                    validate_normal(n, prefix, &mut errors);
                    if n.modalidade.is_none() {
                        errors.push(ValidationError::with_rule(
                            format!("{prefix}.modalidade"),
                            "base modality is required",
                            "modBC",
                        ));
                    }
                }
                IcmsTributo::SimplesNormal(n) => validate_normal(n, prefix, &mut errors),
                IcmsTributo::Cobranca(c) => {
                    validate_normal(&c.normal, prefix, &mut errors);
                    validate_substituicao(&c.substituicao, prefix, &mut errors);
                }
                IcmsTributo::Reducao(r) => {
                    validate_normal(&r.normal, prefix, &mut errors);
                    validate_percent(r.reducao, &format!("{prefix}.reducao"), "pRedBC", &mut errors);
                }
                IcmsTributo::Parcial(p) => {
                    validate_substituicao(&p.substituicao, prefix, &mut errors)
                }
                IcmsTributo::Isento(_) => {}
                IcmsTributo::Diferido(d) => {
                    if let Some(n) = &d.normal {
                        validate_normal(n, prefix, &mut errors);
                    }
                    if let Some(r) = d.reducao {
                        validate_percent(r, &format!("{prefix}.reducao"), "pRedBC", &mut errors);
                    }
                    if let Some(p) = d.diferimento {
                        validate_percent(p, &format!("{prefix}.diferimento"), "pDif", &mut errors);
                    }
                }
                IcmsTributo::Cobrado(c) => {
                    if let Some(base) = c.base {
                        non_negative(base, &format!("{prefix}.base"), "vBCSTRet", &mut errors);
                    }
                    if let Some(valor) = c.valor {
                        non_negative(valor, &format!("{prefix}.valor"), "vICMSSTRet", &mut errors);
                    }
                    if let Some(f) = &c.fundo {
                        validate_fcp(f, prefix, &mut errors);
                    }
                }
                IcmsTributo::Mista(m) => {
                    validate_normal(&m.normal, prefix, &mut errors);
                    validate_percent(m.reducao, &format!("{prefix}.reducao"), "pRedBC", &mut errors);
                    validate_substituicao(&m.substituicao, prefix, &mut errors);
                }
                IcmsTributo::Generico(g) => {
                    if let Some(n) = &g.normal {
                        validate_normal(n, prefix, &mut errors);
                    }
                    if let Some(s) = &g.substituicao {
                        validate_substituicao(s, prefix, &mut errors);
                    }
                    if let Some(c) = &g.credito {
                        validate_normal(c, &format!("{prefix}.credito"), &mut errors);
                    }
                }
            }
        }
        Imposto::Ipi(ipi) => match &ipi.tributo {
            IpiTributo::Aliquota(a) => validate_aliquota(a, "ipi", "pIPI", &mut errors),
            IpiTributo::Quantidade(q) => validate_quantidade(q, "ipi", "qUnid", &mut errors),
            IpiTributo::Isento(_) => {}
        },
        Imposto::Pis(c) | Imposto::PisSt(c) => validate_contribuicao(c, "pis", "pPIS", &mut errors),
        Imposto::Cofins(c) | Imposto::CofinsSt(c) => {
            validate_contribuicao(c, "cofins", "pCOFINS", &mut errors)
        }
        Imposto::Ii(ii) => {
            if let Some(base) = ii.base {
                non_negative(base, "ii.base", "vBC", &mut errors);
            }
            non_negative(ii.aliquota, "ii.aliquota", "vII", &mut errors);
            non_negative(ii.despesas, "ii.despesas", "vDespAdu", &mut errors);
            non_negative(ii.iof, "ii.iof", "vIOF", &mut errors);
        }
    }

    if matches!(imposto, Imposto::PisSt(c) | Imposto::CofinsSt(c)
        if !matches!(c, Contribuicao::Aliquota(_) | Contribuicao::Quantidade(_)))
    {
        errors.push(ValidationError::new(
            "tributo",
            "substitution block takes a rate or a quantity",
        ));
    }

    errors
}

fn validate_contribuicao(
    c: &Contribuicao,
    prefix: &str,
    rate_tag: &str,
    errors: &mut Vec<ValidationError>,
) {
    match c {
        Contribuicao::Aliquota(a) => validate_aliquota(a, prefix, rate_tag, errors),
        Contribuicao::Quantidade(q) => validate_quantidade(q, prefix, "qBCProd", errors),
        Contribuicao::Isento(_) => {}
        Contribuicao::Generico(g) => validate_generico(g, prefix, rate_tag, errors),
    }
}

fn validate_aliquota<C>(a: &Aliquota<C>, prefix: &str, rate_tag: &str, errors: &mut Vec<ValidationError>) {
    if let Some(base) = a.base {
        non_negative(base, &format!("{prefix}.base"), "vBC", errors);
    }
    validate_percent(a.aliquota, &format!("{prefix}.aliquota"), rate_tag, errors);
}

fn validate_quantidade<C>(
    q: &Quantidade<C>,
    prefix: &str,
    quantity_tag: &str,
    errors: &mut Vec<ValidationError>,
) {
    non_negative(q.quantidade, &format!("{prefix}.quantidade"), quantity_tag, errors);
    non_negative(q.valor_unitario, &format!("{prefix}.valor_unitario"), quantity_tag, errors);
}

fn validate_generico<C>(g: &Generico<C>, prefix: &str, rate_tag: &str, errors: &mut Vec<ValidationError>) {
    if g.valor.is_none() {
        errors.push(ValidationError::new(
            format!("{prefix}.valor"),
            "generic situation requires a stored value",
        ));
    }
    if let Some(valor) = g.valor {
        non_negative(valor, &format!("{prefix}.valor"), "valor", errors);
    }
    if let Some(a) = g.aliquota {
        validate_percent(a, &format!("{prefix}.aliquota"), rate_tag, errors);
    }
    if g.base.is_some() != g.aliquota.is_some() {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.base"),
            "base and rate go together",
            "vBC",
        ));
    }
    if g.quantidade.is_some() != g.valor_unitario.is_some() {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.quantidade"),
            "quantity and unit value go together",
            "qBCProd",
        ));
    }
}

fn validate_normal(n: &Normal, prefix: &str, errors: &mut Vec<ValidationError>) {
    if let Some(base) = n.base {
        non_negative(base, &format!("{prefix}.base"), "vBC", errors);
    }
    validate_percent(n.aliquota, &format!("{prefix}.aliquota"), "pICMS", errors);
    if let Some(f) = &n.fundo {
        validate_fcp(f, prefix, errors);
    }
}

fn validate_substituicao(s: &Substituicao, prefix: &str, errors: &mut Vec<ValidationError>) {
    let prefix = format!("{prefix}.substituicao");
    if let Some(base) = s.base {
        non_negative(base, &format!("{prefix}.base"), "vBCST", errors);
    }
    if let Some(margem) = s.margem {
        non_negative(margem, &format!("{prefix}.margem"), "pMVAST", errors);
    }
    if let Some(reducao) = s.reducao {
        validate_percent(reducao, &format!("{prefix}.reducao"), "pRedBCST", errors);
    }
    validate_percent(s.aliquota, &format!("{prefix}.aliquota"), "pICMSST", errors);
    if let Some(f) = &s.fundo {
        validate_fcp(f, &prefix, errors);
    }
}

fn validate_fcp(f: &Fcp, prefix: &str, errors: &mut Vec<ValidationError>) {
    let prefix = format!("{prefix}.fundo");
    if let Some(base) = f.base {
        non_negative(base, &format!("{prefix}.base"), "vBCFCP", errors);
    }
    validate_percent(f.aliquota, &format!("{prefix}.aliquota"), "pFCP", errors);
}

fn validate_percent(value: Decimal, field: &str, rule: &str, errors: &mut Vec<ValidationError>) {
    if value < Decimal::ZERO || value > dec!(100) {
        errors.push(ValidationError::with_rule(
            field,
            format!("percentage {value} outside 0..=100"),
            rule,
        ));
    }
}

/// Amounts on the wire hold at most 13 integer digits.
const LIMITE: Decimal = dec!(10000000000000);

fn non_negative(value: Decimal, field: &str, rule: &str, errors: &mut Vec<ValidationError>) {
    if value < Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            field,
            format!("{value} must not be negative"),
            rule,
        ));
    } else if value >= LIMITE {
        errors.push(ValidationError::with_rule(
            field,
            format!("{value} exceeds 13 integer digits"),
            rule,
        ));
    }
}
