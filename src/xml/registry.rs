//! Tag registry: maps each fragment tag to the decoder of its variant.
//!
//! The table is built once, before any lookup, and never changes afterwards.

use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::debug;

use super::contribuicao::{self, Especie};
use super::node::Element;
use super::{icms, ii, ipi};
use crate::core::{Imposto, ImpostoError};

/// Decoder of one fragment. The second argument is the enclosing container,
/// which carries data shared by every fragment of the family (IPI's `cEnq`).
pub type Decoder = fn(&Element, &Element) -> Result<Imposto, ImpostoError>;

static REGISTRY: LazyLock<HashMap<&'static str, Decoder>> = LazyLock::new(|| {
    let mut table: HashMap<&'static str, Decoder> = HashMap::new();
    for tag in icms::TAGS {
        table.insert(*tag, decode_icms);
    }
    for tag in ipi::TAGS {
        table.insert(*tag, decode_ipi);
    }
    for tag in Especie::Pis.tags() {
        table.insert(tag, decode_pis);
    }
    for tag in Especie::Cofins.tags() {
        table.insert(tag, decode_cofins);
    }
    table.insert(Especie::Pis.container_st(), decode_pis_st);
    table.insert(Especie::Cofins.container_st(), decode_cofins_st);
    table.insert(ii::TAG, decode_ii);
    table
});

fn decode_icms(fragment: &Element, _: &Element) -> Result<Imposto, ImpostoError> {
    icms::decode(fragment).map(Imposto::Icms)
}

fn decode_ipi(fragment: &Element, container: &Element) -> Result<Imposto, ImpostoError> {
    ipi::decode(fragment, container).map(Imposto::Ipi)
}

fn decode_pis(fragment: &Element, _: &Element) -> Result<Imposto, ImpostoError> {
    contribuicao::decode(fragment, Especie::Pis).map(Imposto::Pis)
}

fn decode_cofins(fragment: &Element, _: &Element) -> Result<Imposto, ImpostoError> {
    contribuicao::decode(fragment, Especie::Cofins).map(Imposto::Cofins)
}

fn decode_pis_st(fragment: &Element, _: &Element) -> Result<Imposto, ImpostoError> {
    contribuicao::decode_st(fragment, Especie::Pis).map(Imposto::PisSt)
}

fn decode_cofins_st(fragment: &Element, _: &Element) -> Result<Imposto, ImpostoError> {
    contribuicao::decode_st(fragment, Especie::Cofins).map(Imposto::CofinsSt)
}

fn decode_ii(fragment: &Element, _: &Element) -> Result<Imposto, ImpostoError> {
    ii::decode(fragment).map(Imposto::Ii)
}

pub fn lookup(tag: &str) -> Option<Decoder> {
    REGISTRY.get(tag).copied()
}

pub fn is_registered(tag: &str) -> bool {
    REGISTRY.contains_key(tag)
}

/// Every registered tag, sorted.
pub fn tags() -> Vec<&'static str> {
    let mut tags: Vec<_> = REGISTRY.keys().copied().collect();
    tags.sort_unstable();
    tags
}

/// Decode one container of `<imposto>`.
///
/// A registered container tag (`II`, `PISST`) is decoded as a whole;
/// otherwise the first child with a registered tag is. Unknown content
/// yields `None`.
pub fn decode(container: &Element) -> Result<Option<Imposto>, ImpostoError> {
    if let Some(decoder) = lookup(&container.name) {
        return decoder(container, container).map(Some);
    }
    for fragment in &container.children {
        if let Some(decoder) = lookup(&fragment.name) {
            return decoder(fragment, container).map(Some);
        }
    }
    debug!(tag = %container.name, "no registered tax fragment, skipping");
    Ok(None)
}

/// Write the container of a resolved variant.
pub fn encode(imposto: &Imposto) -> Result<Element, ImpostoError> {
    let wrap = |name: &str, fragment: Element| {
        let mut container = Element::new(name);
        container.push(fragment);
        container
    };
    match imposto {
        Imposto::Icms(i) => Ok(wrap("ICMS", icms::encode(i, None)?)),
        Imposto::Ipi(i) => ipi::encode(i, None),
        Imposto::Pis(c) => Ok(wrap(
            Especie::Pis.container(),
            contribuicao::encode(c, Especie::Pis, None)?,
        )),
        Imposto::Cofins(c) => Ok(wrap(
            Especie::Cofins.container(),
            contribuicao::encode(c, Especie::Cofins, None)?,
        )),
        Imposto::PisSt(c) => contribuicao::encode_st(c, Especie::Pis),
        Imposto::CofinsSt(c) => contribuicao::encode_st(c, Especie::Cofins),
        Imposto::Ii(i) => ii::encode(i),
    }
}
