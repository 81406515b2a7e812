//! FCP sub-records, written inside the ICMS fragment.

use tracing::debug;

use super::node::Element;
use crate::core::calc::exigir_base;
use crate::core::{Fcp, FcpNivel, ImpostoError};

/// Base, rate and value tags of one FCP level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FcpTags {
    pub base: &'static str,
    pub aliquota: &'static str,
    pub valor: &'static str,
}

pub fn tags(nivel: FcpNivel) -> FcpTags {
    match nivel {
        FcpNivel::Base => FcpTags {
            base: "vBCFCP",
            aliquota: "pFCP",
            valor: "vFCP",
        },
        FcpNivel::Substituido => FcpTags {
            base: "vBCFCPST",
            aliquota: "pFCPST",
            valor: "vFCPST",
        },
        FcpNivel::Retido => FcpTags {
            base: "vBCFCPSTRet",
            aliquota: "pFCPSTRet",
            valor: "vFCPSTRet",
        },
    }
}

/// An FCP level is present when its rate tag is.
pub fn exists(fragment: &Element, nivel: FcpNivel) -> bool {
    fragment.has(tags(nivel).aliquota)
}

/// Append the level's tags; the base tag is left out when `com_base` is false.
pub fn write(fcp: &Fcp, fragment: &mut Element, com_base: bool) -> Result<(), ImpostoError> {
    let t = tags(fcp.nivel);
    if com_base {
        fragment.push_valor(t.base, exigir_base(fcp.base, t.base)?);
    }
    fragment
        .push_aliquota(t.aliquota, fcp.aliquota)
        .push_valor(t.valor, fcp.valor()?);
    Ok(())
}

pub fn read(fragment: &Element, nivel: FcpNivel) -> Result<Option<Fcp>, ImpostoError> {
    if !exists(fragment, nivel) {
        debug!(tag = %fragment.name, ?nivel, "no FCP rate, skipping");
        return Ok(None);
    }
    let t = tags(nivel);
    Ok(Some(Fcp {
        nivel,
        base: fragment.decimal(t.base)?,
        aliquota: fragment.required_decimal(t.aliquota)?,
    }))
}
