//! ICMS fragments (`ICMS00` … `ICMSSN900`) inside the `<ICMS>` container.

use rust_decimal::Decimal;

use super::fcp;
use super::node::Element;
use crate::core::calc::{base_reversa, exigir_base};
use crate::core::codes::{Csosn, IcmsCst, Modalidade, ModalidadeSt, Origem};
use crate::core::icms::{
    Cobrado, Cobranca, Desoneracao, Diferido, Generico, Isento, Mista, Parcial, Reducao,
};
use crate::core::{FcpNivel, Icms, IcmsTributo, ImpostoError, Normal, Situacao, Substituicao};

/// Fragment tags this module reads and writes.
pub const TAGS: &[&str] = &[
    "ICMS00",
    "ICMS10",
    "ICMS20",
    "ICMS30",
    "ICMS40",
    "ICMS51",
    "ICMS60",
    "ICMS70",
    "ICMS90",
    "ICMSSN101",
    "ICMSSN102",
    "ICMSSN201",
    "ICMSSN202",
    "ICMSSN500",
    "ICMSSN900",
];

/// Fragment tag for the variant and its regime.
pub fn tag(icms: &Icms) -> &'static str {
    let simples = icms.situacao.is_simples();
    match &icms.tributo {
        IcmsTributo::Normal(_) => "ICMS00",
        IcmsTributo::Cobranca(_) if simples => "ICMSSN201",
        IcmsTributo::Cobranca(_) => "ICMS10",
        IcmsTributo::Reducao(_) => "ICMS20",
        IcmsTributo::Parcial(_) if simples => "ICMSSN202",
        IcmsTributo::Parcial(_) => "ICMS30",
        IcmsTributo::Isento(_) if simples => "ICMSSN102",
        IcmsTributo::Isento(_) => "ICMS40",
        IcmsTributo::Diferido(_) => "ICMS51",
        IcmsTributo::Cobrado(_) if simples => "ICMSSN500",
        IcmsTributo::Cobrado(_) => "ICMS60",
        IcmsTributo::Mista(_) => "ICMS70",
        IcmsTributo::Generico(_) if simples => "ICMSSN900",
        IcmsTributo::Generico(_) => "ICMS90",
        IcmsTributo::SimplesNormal(_) => "ICMSSN101",
    }
}

/// Write the fragment of a resolved variant, under `tag` when given.
pub fn encode(icms: &Icms, tag_override: Option<&str>) -> Result<Element, ImpostoError> {
    let name = tag_override.unwrap_or_else(|| tag(icms));
    let mut el = cabecalho(icms, name);

    match &icms.tributo {
        IcmsTributo::Normal(n) => {
            let modalidade = n
                .modalidade
                .as_ref()
                .ok_or_else(|| ImpostoError::validation("icms.modalidade", "base modality is required"))?;
            el.push_text("modBC", modalidade.code());
            write_proprio(&mut el, n, "vICMS")?;
            write_fundo(&mut el, n, false)?;
        }
        IcmsTributo::SimplesNormal(n) => write_credito(&mut el, n)?,
        IcmsTributo::Cobranca(c) => return encode_cobranca(icms, name, c),
        IcmsTributo::Reducao(r) => {
            write_modalidade(&mut el, &r.normal);
            el.push_aliquota("pRedBC", r.reducao);
            write_proprio(&mut el, &r.normal, "vICMS")?;
            write_fundo(&mut el, &r.normal, true)?;
            write_desoneracao(&mut el, &r.desoneracao);
        }
        IcmsTributo::Parcial(p) => {
            write_substituicao(&mut el, &p.substituicao)?;
            write_desoneracao(&mut el, &p.desoneracao);
        }
        IcmsTributo::Isento(i) => write_desoneracao(&mut el, &i.desoneracao),
        IcmsTributo::Diferido(d) => {
            if let Some(n) = &d.normal {
                write_modalidade(&mut el, n);
            }
            if let Some(r) = d.reducao {
                el.push_aliquota("pRedBC", r);
            }
            if let Some(n) = &d.normal {
                write_proprio(&mut el, n, "vICMSOp")?;
            }
            if let Some(p) = d.diferimento {
                el.push_aliquota("pDif", p).push_valor("vICMSDif", d.diferido()?);
            }
            el.push_valor("vICMS", d.valor()?);
            if let Some(n) = &d.normal {
                write_fundo(&mut el, n, true)?;
            }
        }
        IcmsTributo::Cobrado(c) => {
            if let Some(valor) = c.valor {
                el.push_valor("vBCSTRet", c.base_retida());
                if let Some(p) = c.aliquota {
                    el.push_aliquota("pST", p);
                }
                el.push_valor("vICMSSTRet", valor);
            }
            if let Some(f) = &c.fundo {
                fcp::write(f, &mut el, true)?;
            }
        }
        IcmsTributo::Mista(m) => {
            write_modalidade(&mut el, &m.normal);
            el.push_aliquota("pRedBC", m.reducao);
            write_proprio(&mut el, &m.normal, "vICMS")?;
            write_fundo(&mut el, &m.normal, true)?;
            write_substituicao(&mut el, &m.substituicao)?;
            write_desoneracao(&mut el, &m.desoneracao);
        }
        IcmsTributo::Generico(g) => {
            if let Some(n) = &g.normal {
                write_modalidade(&mut el, n);
                el.push_valor("vBC", exigir_base(n.base, "icms.base")?);
                if let Some(r) = g.reducao {
                    el.push_aliquota("pRedBC", r);
                }
                el.push_aliquota("pICMS", n.aliquota)
                    .push_valor("vICMS", n.valor()?);
                write_fundo(&mut el, n, true)?;
            }
            if let Some(s) = &g.substituicao {
                write_substituicao(&mut el, s)?;
            }
            write_desoneracao(&mut el, &g.desoneracao);
            if let Some(c) = &g.credito {
                write_credito(&mut el, c)?;
            }
        }
    }

    Ok(el)
}

/// CST 10 / CSOSN 201.
///
/// A normal-regime own leg without modality, or a substitution leg without
/// one, writes only the own leg. CSOSN 201 writes the substitution fields
/// followed by the credit pair.
fn encode_cobranca(icms: &Icms, name: &str, c: &Cobranca) -> Result<Element, ImpostoError> {
    let simples = icms.situacao.is_simples();
    let mut normal = cabecalho(icms, name);
    if simples {
        write_credito(&mut normal, &c.normal)?;
    } else {
        write_modalidade(&mut normal, &c.normal);
        write_proprio(&mut normal, &c.normal, "vICMS")?;
        write_fundo(&mut normal, &c.normal, true)?;
    }

    if c.substituicao.modalidade.is_none() || (!simples && c.normal.modalidade.is_none()) {
        return Ok(normal);
    }

    let mut st = cabecalho(icms, name);
    write_substituicao(&mut st, &c.substituicao)?;

    if simples {
        st.merge_over(normal);
        Ok(st)
    } else {
        normal.merge(st);
        Ok(normal)
    }
}

fn cabecalho(icms: &Icms, name: &str) -> Element {
    let mut el = Element::new(name);
    el.push_text("orig", icms.origem.code());
    match &icms.situacao {
        Situacao::Cst(cst) => el.push_text("CST", cst.code()),
        Situacao::Csosn(csosn) => el.push_text("CSOSN", csosn.code()),
    };
    el
}

fn write_modalidade(el: &mut Element, n: &Normal) {
    if let Some(m) = &n.modalidade {
        el.push_text("modBC", m.code());
    }
}

fn write_proprio(el: &mut Element, n: &Normal, valor_tag: &str) -> Result<(), ImpostoError> {
    el.push_valor("vBC", exigir_base(n.base, "icms.base")?)
        .push_aliquota("pICMS", n.aliquota)
        .push_valor(valor_tag, n.valor()?);
    Ok(())
}

fn write_fundo(el: &mut Element, n: &Normal, com_base: bool) -> Result<(), ImpostoError> {
    match &n.fundo {
        Some(f) => fcp::write(f, el, com_base),
        None => Ok(()),
    }
}

fn write_credito(el: &mut Element, n: &Normal) -> Result<(), ImpostoError> {
    el.push_aliquota("pCredSN", n.aliquota)
        .push_valor("vCredICMSSN", n.valor()?);
    Ok(())
}

fn write_substituicao(el: &mut Element, s: &Substituicao) -> Result<(), ImpostoError> {
    if let Some(m) = &s.modalidade {
        el.push_text("modBCST", m.code());
    }
    if let Some(m) = s.margem {
        el.push_aliquota("pMVAST", m);
    }
    if let Some(r) = s.reducao {
        el.push_aliquota("pRedBCST", r);
    }
    el.push_valor("vBCST", exigir_base(s.base, "icms.substituicao.base")?)
        .push_aliquota("pICMSST", s.aliquota)
        .push_valor("vICMSST", s.valor()?);
    if let Some(f) = &s.fundo {
        fcp::write(f, el, true)?;
    }
    Ok(())
}

fn write_desoneracao(el: &mut Element, d: &Option<Desoneracao>) {
    if let Some(d) = d {
        el.push_valor("vICMSDeson", d.valor)
            .push_text("motDesICMS", d.motivo.as_str());
    }
}

/// Read an ICMS fragment; the tag selects the variant.
pub fn decode(el: &Element) -> Result<Icms, ImpostoError> {
    let origem = Origem::from_code(el.required_text("orig")?);
    let simples = el.name.starts_with("ICMSSN");
    let situacao = if simples {
        Situacao::Csosn(Csosn::from_code(el.required_text("CSOSN")?))
    } else {
        Situacao::Cst(IcmsCst::from_code(el.required_text("CST")?))
    };

    let tributo = match el.name.as_str() {
        "ICMS00" => IcmsTributo::Normal(read_proprio(el)?),
        "ICMSSN101" => IcmsTributo::SimplesNormal(read_credito(el)?),
        "ICMS10" | "ICMSSN201" => {
            let normal = if simples {
                read_credito(el)?
            } else {
                read_proprio(el)?
            };
            let substituicao = if el.has("vBCST") {
                read_substituicao(el)?
            } else {
                Substituicao::new(Decimal::ZERO)
            };
            IcmsTributo::Cobranca(Cobranca {
                normal,
                substituicao,
            })
        }
        "ICMS20" => IcmsTributo::Reducao(Reducao {
            normal: read_proprio(el)?,
            reducao: el.required_decimal("pRedBC")?,
            desoneracao: read_desoneracao(el)?,
        }),
        "ICMS30" | "ICMSSN202" => IcmsTributo::Parcial(Parcial {
            substituicao: read_substituicao(el)?,
            desoneracao: read_desoneracao(el)?,
        }),
        "ICMS40" | "ICMSSN102" => IcmsTributo::Isento(Isento {
            desoneracao: read_desoneracao(el)?,
        }),
        "ICMS51" => IcmsTributo::Diferido(Diferido {
            normal: el.has("vBC").then(|| read_operacao(el)).transpose()?,
            reducao: el.decimal("pRedBC")?,
            diferimento: el.decimal("pDif")?,
        }),
        "ICMS60" | "ICMSSN500" => {
            let valor = el.decimal("vICMSSTRet")?;
            IcmsTributo::Cobrado(Cobrado {
                base: valor
                    .map(|_| el.required_decimal("vBCSTRet"))
                    .transpose()?,
                aliquota: el.decimal("pST")?,
                valor,
                fundo: fcp::read(el, FcpNivel::Retido)?,
            })
        }
        "ICMS70" => IcmsTributo::Mista(Mista {
            normal: read_proprio(el)?,
            reducao: el.required_decimal("pRedBC")?,
            substituicao: read_substituicao(el)?,
            desoneracao: read_desoneracao(el)?,
        }),
        "ICMS90" | "ICMSSN900" => IcmsTributo::Generico(Generico {
            normal: el.has("vBC").then(|| read_proprio(el)).transpose()?,
            reducao: el.decimal("pRedBC")?,
            substituicao: el.has("vBCST").then(|| read_substituicao(el)).transpose()?,
            desoneracao: read_desoneracao(el)?,
            credito: el.has("pCredSN").then(|| read_credito(el)).transpose()?,
        }),
        other => {
            return Err(ImpostoError::Xml(format!("<{other}> is not an ICMS fragment")));
        }
    };

    Ok(Icms::new(origem, situacao, tributo))
}

fn read_modalidade(el: &Element) -> Option<Modalidade> {
    el.text_of("modBC").map(Modalidade::from_code)
}

fn read_proprio(el: &Element) -> Result<Normal, ImpostoError> {
    Ok(Normal {
        modalidade: read_modalidade(el),
        base: Some(el.required_decimal("vBC")?),
        aliquota: el.required_decimal("pICMS")?,
        fundo: fcp::read(el, FcpNivel::Base)?,
    })
}

/// Deferred operation leg; the rate may be absent.
fn read_operacao(el: &Element) -> Result<Normal, ImpostoError> {
    Ok(Normal {
        modalidade: read_modalidade(el),
        base: Some(el.required_decimal("vBC")?),
        aliquota: el.decimal("pICMS")?.unwrap_or_default(),
        fundo: fcp::read(el, FcpNivel::Base)?,
    })
}

/// Simples credit leg; the base is recovered from the credited amount.
fn read_credito(el: &Element) -> Result<Normal, ImpostoError> {
    let aliquota = el.required_decimal("pCredSN")?;
    let valor = el.required_decimal("vCredICMSSN")?;
    Ok(Normal {
        modalidade: None,
        base: Some(base_reversa(valor, aliquota, "icms.aliquota")?),
        aliquota,
        fundo: None,
    })
}

fn read_substituicao(el: &Element) -> Result<Substituicao, ImpostoError> {
    Ok(Substituicao {
        modalidade: el.text_of("modBCST").map(ModalidadeSt::from_code),
        margem: el.decimal("pMVAST")?,
        reducao: el.decimal("pRedBCST")?,
        base: Some(el.required_decimal("vBCST")?),
        aliquota: el.required_decimal("pICMSST")?,
        fundo: fcp::read(el, FcpNivel::Substituido)?,
    })
}

fn read_desoneracao(el: &Element) -> Result<Option<Desoneracao>, ImpostoError> {
    match el.decimal("vICMSDeson")? {
        Some(valor) => Ok(Some(Desoneracao {
            valor,
            motivo: el.required_text("motDesICMS")?.to_string(),
        })),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn resolved(mut icms: Icms, base: Decimal) -> Icms {
        icms.resolve(base).unwrap();
        icms
    }

    fn round_trip(icms: &Icms) -> Icms {
        let xml = encode(icms, None).unwrap().to_xml().unwrap();
        decode(&Element::parse(&xml).unwrap()).unwrap()
    }

    #[test]
    fn icms00_layout() {
        let icms = resolved(
            Icms::normal(
                Normal::new(dec!(18))
                    .with_modalidade(Modalidade::Operacao)
                    .with_fundo(dec!(2)),
            ),
            dec!(100),
        );
        let xml = encode(&icms, None).unwrap().to_xml().unwrap();
        assert_eq!(
            xml,
            "<ICMS00><orig>0</orig><CST>00</CST><modBC>3</modBC><vBC>100.00</vBC>\
             <pICMS>18.0000</pICMS><vICMS>18.00</vICMS><pFCP>2.0000</pFCP><vFCP>2.00</vFCP></ICMS00>"
        );
    }

    #[test]
    fn icms00_without_modality_is_rejected() {
        let icms = resolved(Icms::normal(Normal::new(dec!(18))), dec!(100));
        assert!(matches!(encode(&icms, None), Err(ImpostoError::Validation(_))));
    }

    #[test]
    fn simples_cobranca_puts_st_first_then_credit() {
        let icms = resolved(
            Icms::simples_cobranca(
                Normal::new(dec!(1.25)),
                Substituicao::new(dec!(18))
                    .with_modalidade(ModalidadeSt::Margem)
                    .with_base(dec!(162)),
            ),
            dec!(1036.80),
        );
        let el = encode(&icms, None).unwrap();
        assert_eq!(el.name, "ICMSSN201");
        let names: Vec<_> = el.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            ["orig", "CSOSN", "modBCST", "vBCST", "pICMSST", "vICMSST", "pCredSN", "vCredICMSSN"]
        );
        assert_eq!(el.text_of("vICMSST"), Some("29.16"));
        assert_eq!(el.text_of("vCredICMSSN"), Some("12.96"));
        assert_eq!(round_trip(&icms), icms);
    }

    #[test]
    fn cobranca_without_st_modality_is_minimal() {
        let icms = resolved(
            Icms::cobranca(
                Normal::new(dec!(18)).with_modalidade(Modalidade::Operacao),
                Substituicao::new(dec!(18)),
            ),
            dec!(100),
        );
        let el = encode(&icms, None).unwrap();
        assert!(!el.has("vBCST"));
        assert_eq!(el.text_of("vICMS"), Some("18.00"));
    }

    #[test]
    fn cobranca_normal_first_when_both_modalities() {
        let icms = resolved(
            Icms::cobranca(
                Normal::new(dec!(12)).with_modalidade(Modalidade::Operacao),
                Substituicao::new(dec!(18))
                    .with_modalidade(ModalidadeSt::Margem)
                    .with_margem(dec!(40))
                    .with_fundo(dec!(2)),
            ),
            dec!(100),
        );
        let el = encode(&icms, None).unwrap();
        assert_eq!(el.children[2].name, "modBC");
        assert_eq!(el.text_of("vBCST"), Some("140.00"));
        assert_eq!(el.text_of("vFCPST"), Some("2.80"));
        assert_eq!(round_trip(&icms), icms);
    }

    #[test]
    fn cobranca_without_own_modality_writes_own_leg_only() {
        let icms = resolved(
            Icms::cobranca(
                Normal::new(dec!(12)),
                Substituicao::new(dec!(18)).with_modalidade(ModalidadeSt::Margem),
            ),
            dec!(100),
        );
        let xml = encode(&icms, None).unwrap().to_xml().unwrap();
        assert_eq!(
            xml,
            "<ICMS10><orig>0</orig><CST>10</CST><vBC>100.00</vBC>\
             <pICMS>12.0000</pICMS><vICMS>12.00</vICMS></ICMS10>"
        );
    }

    #[test]
    fn cobrado_value_without_base_is_rejected() {
        let el = Element::parse(
            "<ICMS60><orig>0</orig><CST>60</CST><pST>18.0000</pST>\
             <vICMSSTRet>1.80</vICMSSTRet></ICMS60>",
        )
        .unwrap();
        assert!(matches!(
            decode(&el),
            Err(ImpostoError::MissingField { field, .. }) if field == "vBCSTRet"
        ));
    }

    #[test]
    fn cobrado_without_value_omits_retention() {
        let icms = resolved(Icms::cobrado(Cobrado::default()), dec!(4.99));
        let el = encode(&icms, None).unwrap();
        assert!(!el.has("vBCSTRet"));
        assert!(!el.has("vICMSSTRet"));
        assert_eq!(round_trip(&icms), icms);
    }

    #[test]
    fn cobrado_with_value_and_fund() {
        let icms = resolved(
            Icms::simples_cobrado(
                Cobrado::default()
                    .with_valor(dec!(20), dec!(3.60))
                    .with_aliquota(dec!(18))
                    .with_fundo(dec!(20), dec!(2)),
            ),
            dec!(4.99),
        );
        let el = encode(&icms, None).unwrap();
        assert_eq!(el.name, "ICMSSN500");
        assert_eq!(el.text_of("vBCSTRet"), Some("20.00"));
        assert_eq!(el.text_of("pST"), Some("18.0000"));
        assert_eq!(el.text_of("vFCPSTRet"), Some("0.40"));
        assert_eq!(round_trip(&icms), icms);
    }

    #[test]
    fn reducao_and_mista_round_trip() {
        let reducao = resolved(
            Icms::reducao(
                Normal::new(dec!(18))
                    .with_modalidade(Modalidade::Operacao)
                    .with_fundo(dec!(2)),
                dec!(25),
            )
            .with_desoneracao(dec!(4.50), "9"),
            dec!(200),
        );
        let el = encode(&reducao, None).unwrap();
        assert_eq!(el.text_of("vBC"), Some("150.00"));
        assert_eq!(el.text_of("vBCFCP"), Some("150.00"));
        assert_eq!(round_trip(&reducao), reducao);

        let mista = resolved(
            Icms::mista(
                Normal::new(dec!(18)).with_modalidade(Modalidade::Margem),
                dec!(10),
                Substituicao::new(dec!(18)).with_modalidade(ModalidadeSt::Margem),
            )
            .with_origem(Origem::Estrangeira),
            dec!(100),
        );
        let el = encode(&mista, None).unwrap();
        assert_eq!(el.text_of("orig"), Some("1"));
        assert_eq!(round_trip(&mista), mista);
    }

    #[test]
    fn diferido_layout() {
        let icms = resolved(
            Icms::diferido(Normal::new(dec!(18)).with_modalidade(Modalidade::Operacao), dec!(33.33)),
            dec!(100),
        );
        let el = encode(&icms, None).unwrap();
        assert_eq!(el.text_of("vICMSOp"), Some("18.00"));
        assert_eq!(el.text_of("vICMSDif"), Some("6.00"));
        assert_eq!(el.text_of("vICMS"), Some("12.00"));
        assert_eq!(round_trip(&icms), icms);
    }

    #[test]
    fn isento_keeps_situation() {
        let icms = Icms::isento(IcmsCst::Suspensao).with_desoneracao(dec!(1), "12");
        let el = encode(&icms, None).unwrap();
        assert_eq!(el.name, "ICMS40");
        assert_eq!(el.text_of("CST"), Some("50"));
        assert_eq!(round_trip(&icms), icms);

        let sn = Icms::simples_isento(Csosn::Imune);
        assert_eq!(tag(&sn), "ICMSSN102");
        assert_eq!(round_trip(&sn), sn);
    }

    #[test]
    fn generico_with_every_block() {
        let icms = resolved(
            Icms::simples_generico(Generico {
                normal: Some(Normal::new(dec!(18)).with_modalidade(Modalidade::Operacao)),
                reducao: Some(dec!(10)),
                substituicao: Some(Substituicao::new(dec!(18)).with_modalidade(ModalidadeSt::Margem)),
                desoneracao: None,
                credito: Some(Normal::new(dec!(2))),
            }),
            dec!(100),
        );
        let el = encode(&icms, None).unwrap();
        assert_eq!(el.text_of("vBC"), Some("90.00"));
        assert_eq!(el.text_of("vCredICMSSN"), Some("2.00"));
        assert_eq!(round_trip(&icms), icms);
    }

    #[test]
    fn tag_override() {
        let icms = Icms::isento(IcmsCst::NaoTributada);
        assert_eq!(encode(&icms, Some("ICMS41")).unwrap().name, "ICMS41");
    }

    #[test]
    fn missing_rate_is_reported() {
        let el = Element::parse("<ICMS00><orig>0</orig><CST>00</CST><vBC>1.00</vBC></ICMS00>").unwrap();
        let err = decode(&el).unwrap_err();
        assert_eq!(err.to_string(), "required field <pICMS> missing in <ICMS00>");
    }

    #[test]
    fn unknown_codes_pass_through() {
        let el = Element::parse("<ICMS40><orig>9</orig><CST>77</CST></ICMS40>").unwrap();
        let icms = decode(&el).unwrap();
        assert_eq!(icms.origem, Origem::Outro("9".into()));
        assert_eq!(icms.situacao, Situacao::Cst(IcmsCst::Outro("77".into())));
    }
}
