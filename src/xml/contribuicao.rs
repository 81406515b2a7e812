//! PIS and COFINS fragments, which differ only in tag names.

use super::node::Element;
use crate::core::calc::exigir_base;
use crate::core::codes::ContribuicaoCst;
use crate::core::{Aliquota, Contribuicao, Generico, ImpostoError, Isento, Quantidade};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Especie {
    Pis,
    Cofins,
}

impl Especie {
    /// Container tag, also the prefix of every fragment tag.
    pub fn container(self) -> &'static str {
        match self {
            Self::Pis => "PIS",
            Self::Cofins => "COFINS",
        }
    }

    pub fn container_st(self) -> &'static str {
        match self {
            Self::Pis => "PISST",
            Self::Cofins => "COFINSST",
        }
    }

    fn aliquota(self) -> &'static str {
        match self {
            Self::Pis => "pPIS",
            Self::Cofins => "pCOFINS",
        }
    }

    fn valor(self) -> &'static str {
        match self {
            Self::Pis => "vPIS",
            Self::Cofins => "vCOFINS",
        }
    }

    fn prefixo(self) -> &'static str {
        match self {
            Self::Pis => "pis",
            Self::Cofins => "cofins",
        }
    }

    pub fn tags(self) -> [&'static str; 4] {
        match self {
            Self::Pis => ["PISAliq", "PISQtde", "PISNT", "PISOutr"],
            Self::Cofins => ["COFINSAliq", "COFINSQtde", "COFINSNT", "COFINSOutr"],
        }
    }
}

pub fn tag(c: &Contribuicao, especie: Especie) -> &'static str {
    let [aliq, qtde, nt, outr] = especie.tags();
    match c {
        Contribuicao::Aliquota(_) => aliq,
        Contribuicao::Quantidade(_) => qtde,
        Contribuicao::Isento(_) => nt,
        Contribuicao::Generico(_) => outr,
    }
}

/// Write the situation fragment, under `tag` when given.
pub fn encode(
    c: &Contribuicao,
    especie: Especie,
    tag_override: Option<&str>,
) -> Result<Element, ImpostoError> {
    let mut el = Element::new(tag_override.unwrap_or_else(|| tag(c, especie)));
    el.push_text("CST", c.tributacao().code());
    write_campos(&mut el, c, especie)?;
    Ok(el)
}

/// Write a `PISST`/`COFINSST` block: rate or quantity, no situation code.
pub fn encode_st(c: &Contribuicao, especie: Especie) -> Result<Element, ImpostoError> {
    if !matches!(c, Contribuicao::Aliquota(_) | Contribuicao::Quantidade(_)) {
        return Err(ImpostoError::validation(
            format!("{}.tributo", especie.prefixo()),
            "substitution block takes a rate or a quantity",
        ));
    }
    let mut el = Element::new(especie.container_st());
    write_campos(&mut el, c, especie)?;
    Ok(el)
}

fn write_campos(el: &mut Element, c: &Contribuicao, especie: Especie) -> Result<(), ImpostoError> {
    let base_field = format!("{}.base", especie.prefixo());
    match c {
        Contribuicao::Aliquota(a) => {
            el.push_valor("vBC", exigir_base(a.base, &base_field)?)
                .push_aliquota(especie.aliquota(), a.aliquota)
                .push_valor(especie.valor(), a.valor()?);
        }
        Contribuicao::Quantidade(q) => {
            el.push_quantidade("qBCProd", q.quantidade)
                .push_quantidade("vAliqProd", q.valor_unitario)
                .push_valor(especie.valor(), q.valor());
        }
        Contribuicao::Isento(_) => {}
        Contribuicao::Generico(g) => {
            if let (Some(base), Some(aliquota)) = (g.base, g.aliquota) {
                el.push_valor("vBC", base)
                    .push_aliquota(especie.aliquota(), aliquota);
            } else if let (Some(q), Some(v)) = (g.quantidade, g.valor_unitario) {
                el.push_quantidade("qBCProd", q)
                    .push_quantidade("vAliqProd", v);
            }
            let valor = g.valor.ok_or_else(|| {
                ImpostoError::validation(
                    format!("{}.valor", especie.prefixo()),
                    "generic situation requires a stored value",
                )
            })?;
            el.push_valor(especie.valor(), valor);
        }
    }
    Ok(())
}

/// Read a situation fragment; the tag suffix selects the variant.
pub fn decode(el: &Element, especie: Especie) -> Result<Contribuicao, ImpostoError> {
    let tributacao = ContribuicaoCst::from_code(el.required_text("CST")?);
    let [aliq, qtde, nt, outr] = especie.tags();
    match el.name.as_str() {
        n if n == aliq => Ok(Contribuicao::Aliquota(read_aliquota(el, especie, tributacao)?)),
        n if n == qtde => Ok(Contribuicao::Quantidade(read_quantidade(el, tributacao)?)),
        n if n == nt => Ok(Contribuicao::Isento(Isento::new(tributacao))),
        n if n == outr => {
            let mut g = Generico::new(tributacao).with_valor(el.required_decimal(especie.valor())?);
            if el.has("vBC") {
                g = g.with_aliquota(
                    el.required_decimal("vBC")?,
                    el.required_decimal(especie.aliquota())?,
                );
            } else if el.has("qBCProd") {
                g = g.with_quantidade(
                    el.required_decimal("qBCProd")?,
                    el.required_decimal("vAliqProd")?,
                );
            }
            Ok(Contribuicao::Generico(g))
        }
        other => Err(ImpostoError::Xml(format!(
            "<{other}> is not a {} fragment",
            especie.container()
        ))),
    }
}

/// Read a `PISST`/`COFINSST` block, situation set to substitution.
pub fn decode_st(el: &Element, especie: Especie) -> Result<Contribuicao, ImpostoError> {
    let tributacao = ContribuicaoCst::Substituicao;
    if el.has("qBCProd") {
        Ok(Contribuicao::Quantidade(read_quantidade(el, tributacao)?))
    } else {
        Ok(Contribuicao::Aliquota(read_aliquota(el, especie, tributacao)?))
    }
}

fn read_aliquota(
    el: &Element,
    especie: Especie,
    tributacao: ContribuicaoCst,
) -> Result<Aliquota<ContribuicaoCst>, ImpostoError> {
    Ok(Aliquota::new(tributacao, el.required_decimal(especie.aliquota())?)
        .with_base(el.required_decimal("vBC")?))
}

fn read_quantidade(
    el: &Element,
    tributacao: ContribuicaoCst,
) -> Result<Quantidade<ContribuicaoCst>, ImpostoError> {
    Ok(Quantidade::new(
        tributacao,
        el.required_decimal("qBCProd")?,
        el.required_decimal("vAliqProd")?,
    ))
}
