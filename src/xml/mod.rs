//! NFe/NFCe `<imposto>` XML generation and parsing.
//!
//! Each tax variant is written as a container (`ICMS`, `IPI`, `PIS`,
//! `PISST`, `COFINS`, `COFINSST`, `II`) holding the fragment of its
//! situation (`ICMS00`, `IPITrib`, `PISAliq`…). Reading goes through a
//! registry from fragment tag to decoder, so unknown containers are skipped.
//!
//! Amounts are derived at full precision and rounded only when written:
//! money to two decimals, rates, quantities and unit values to four.
//!
//! # Example
//!
//! ```
//! use imposto::core::*;
//! use imposto::xml;
//! use rust_decimal_macros::dec;
//!
//! let mut item = LineItemBuilder::new("1", dec!(4.99))
//!     .imposto(Imposto::Pis(Contribuicao::aliquota(dec!(0.65))))
//!     .build();
//! let block = xml::to_imposto_xml(&mut item).unwrap();
//! assert!(block.starts_with("<imposto><vTotTrib>0.03</vTotTrib><PIS><PISAliq>"));
//!
//! let group = xml::from_imposto_xml(&block).unwrap();
//! assert_eq!(group.resolved(item.base).unwrap(), item.impostos.resolved(item.base).unwrap());
//! ```

pub mod aggregate;
pub mod contribuicao;
pub mod fcp;
pub mod icms;
pub mod ii;
pub mod ipi;
mod node;
pub mod registry;
pub(crate) mod xml_utils;

pub use aggregate::{build, parse, write_item};
pub use node::Element;
pub use xml_utils::{format_aliquota, format_quantidade, format_valor};

use crate::core::{ImpostoError, LineItem, TaxGroup};

/// Build the `<imposto>` block of `item` as compact XML, recording `vTotTrib`.
pub fn to_imposto_xml(item: &mut LineItem) -> Result<String, ImpostoError> {
    write_item(item)?.to_xml()
}

/// Parse an `<imposto>` block.
pub fn from_imposto_xml(xml: &str) -> Result<TaxGroup, ImpostoError> {
    parse(&Element::parse(xml)?)
}
