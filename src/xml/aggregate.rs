//! `<imposto>` block of a line item: `vTotTrib` followed by one container
//! per tax variant, in the order the variants were added.

use rust_decimal::Decimal;
use tracing::{debug, trace, warn};

use super::node::Element;
use super::registry;
use crate::core::{ImpostoError, LineItem, TaxGroup, validate_group};

pub const TAG: &str = "imposto";
pub const TOTAL_TAG: &str = "vTotTrib";

/// Build the block for `impostos`, inheriting bases from `base`.
///
/// Returns the element and the unrounded total written to `vTotTrib`.
pub fn build(impostos: &TaxGroup, base: Decimal) -> Result<(Element, Decimal), ImpostoError> {
    let resolved = impostos.resolved(base).inspect_err(|err| {
        warn!(error = %err, "tax group bases cannot be resolved");
    })?;
    let errors = validate_group(&resolved);
    if !errors.is_empty() {
        warn!(count = errors.len(), "tax group rejected");
        return Err(ImpostoError::Validation(errors));
    }

    let total = resolved.total_retido()?;
    let mut imposto = Element::new(TAG);
    imposto.push_valor(TOTAL_TAG, total);
    for variant in &resolved {
        let container = registry::encode(variant)?;
        trace!(tag = %container.name, "tax container written");
        imposto.push(container);
    }
    Ok((imposto, total))
}

/// Build the block of `item` and record its total on the item.
pub fn write_item(item: &mut LineItem) -> Result<Element, ImpostoError> {
    let (imposto, total) = build(&item.impostos, item.base)?;
    debug!(item = %item.id, total = %total, "line item taxes built");
    item.tributos = Some(total);
    Ok(imposto)
}

/// Read every recognised container; unknown ones are skipped.
pub fn parse(imposto: &Element) -> Result<TaxGroup, ImpostoError> {
    let mut group = TaxGroup::new();
    for container in &imposto.children {
        if container.name == TOTAL_TAG {
            continue;
        }
        if let Some(variant) = registry::decode(container)? {
            group.add(variant);
        }
    }
    Ok(group)
}

/// `vTotTrib` as written, if present.
pub fn total(imposto: &Element) -> Result<Option<Decimal>, ImpostoError> {
    imposto.decimal(TOTAL_TAG)
}
