//! `<IPI>` container: producer and stamp data, `cEnq`, then `IPITrib` or `IPINT`.

use super::node::Element;
use crate::core::calc::exigir_base;
use crate::core::codes::IpiCst;
use crate::core::{Aliquota, ImpostoError, Ipi, IpiTributo, Isento, Quantidade};

pub const TAGS: &[&str] = &["IPITrib", "IPINT"];

pub fn tag(ipi: &Ipi) -> &'static str {
    match ipi.tributo {
        IpiTributo::Aliquota(_) | IpiTributo::Quantidade(_) => "IPITrib",
        IpiTributo::Isento(_) => "IPINT",
    }
}

/// Write the container with the situation fragment under `tag` when given.
pub fn encode(ipi: &Ipi, tag_override: Option<&str>) -> Result<Element, ImpostoError> {
    let mut container = Element::new("IPI");
    if let Some(cnpj) = &ipi.cnpj_produtor {
        container.push_text("CNPJProd", cnpj.as_str());
    }
    if let Some(selo) = &ipi.selo {
        container.push_text("cSelo", selo.as_str());
    }
    if let Some(q) = ipi.quantidade_selo {
        container.push_text("qSelo", q.to_string());
    }
    container.push_text("cEnq", ipi.enquadramento.as_str());

    let mut fragment = Element::new(tag_override.unwrap_or_else(|| tag(ipi)));
    fragment.push_text("CST", ipi.tributacao().code());
    match &ipi.tributo {
        IpiTributo::Aliquota(a) => {
            fragment
                .push_valor("vBC", exigir_base(a.base, "ipi.base")?)
                .push_aliquota("pIPI", a.aliquota)
                .push_valor("vIPI", a.valor()?);
        }
        IpiTributo::Quantidade(q) => {
            fragment
                .push_quantidade("qUnid", q.quantidade)
                .push_quantidade("vUnid", q.valor_unitario)
                .push_valor("vIPI", q.valor());
        }
        IpiTributo::Isento(_) => {}
    }
    container.push(fragment);
    Ok(container)
}

/// Read the situation fragment; framework and stamp data come from `container`.
pub fn decode(fragment: &Element, container: &Element) -> Result<Ipi, ImpostoError> {
    let tributacao = IpiCst::from_code(fragment.required_text("CST")?);
    let tributo = match fragment.name.as_str() {
        "IPINT" => IpiTributo::Isento(Isento::new(tributacao)),
        _ if fragment.has("qUnid") => IpiTributo::Quantidade(Quantidade::new(
            tributacao,
            fragment.required_decimal("qUnid")?,
            fragment.required_decimal("vUnid")?,
        )),
        _ => IpiTributo::Aliquota(
            Aliquota::new(tributacao, fragment.required_decimal("pIPI")?)
                .with_base(fragment.required_decimal("vBC")?),
        ),
    };

    let quantidade_selo = container
        .text_of("qSelo")
        .map(|q| {
            q.parse::<u64>().map_err(|_| ImpostoError::InvalidNumber {
                field: "qSelo".into(),
                value: q.to_string(),
            })
        })
        .transpose()?;

    Ok(Ipi {
        cnpj_produtor: container.text_of("CNPJProd").map(str::to_string),
        selo: container.text_of("cSelo").map(str::to_string),
        quantidade_selo,
        enquadramento: container.required_text("cEnq")?.to_string(),
        tributo,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn round_trip(ipi: &Ipi) -> Ipi {
        let container = encode(ipi, None).unwrap();
        let parsed = Element::parse(&container.to_xml().unwrap()).unwrap();
        decode(parsed.children.last().unwrap(), &parsed).unwrap()
    }

    #[test]
    fn rate_layout() {
        let mut ipi = Ipi::aliquota(IpiCst::SaidaTributada, dec!(15)).with_selo("ABC", 3);
        ipi.resolve(dec!(200));
        let xml = encode(&ipi, None).unwrap().to_xml().unwrap();
        assert_eq!(
            xml,
            "<IPI><cSelo>ABC</cSelo><qSelo>3</qSelo><cEnq>999</cEnq><IPITrib><CST>50</CST>\
             <vBC>200.00</vBC><pIPI>15.0000</pIPI><vIPI>30.00</vIPI></IPITrib></IPI>"
        );
        assert_eq!(round_trip(&ipi), ipi);
    }

    #[test]
    fn quantity_layout() {
        let ipi = Ipi::quantidade(IpiCst::SaidaTributada, dec!(2), dec!(9.00))
            .with_produtor("12345678000199");
        let el = encode(&ipi, None).unwrap();
        let trib = el.child("IPITrib").unwrap();
        assert_eq!(trib.text_of("qUnid"), Some("2.0000"));
        assert_eq!(trib.text_of("vIPI"), Some("18.00"));
        assert_eq!(round_trip(&ipi), ipi);
    }

    #[test]
    fn exempt_carries_only_cst() {
        let ipi = Ipi::isento(IpiCst::SaidaImune).with_enquadramento("001");
        let el = encode(&ipi, None).unwrap();
        assert_eq!(el.child("IPINT").unwrap().children.len(), 1);
        assert_eq!(round_trip(&ipi), ipi);
    }

    #[test]
    fn framework_is_required() {
        let el = Element::parse("<IPI><IPINT><CST>53</CST></IPINT></IPI>").unwrap();
        let err = decode(&el.children[0], &el).unwrap_err();
        assert!(matches!(err, ImpostoError::MissingField { ref field, .. } if field == "cEnq"));
    }
}
