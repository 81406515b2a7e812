//! # imposto
//!
//! Tax block (`<imposto>`) of Brazilian electronic invoices, NFe model 55
//! and NFCe model 65: ICMS in the normal and Simples Nacional regimes with
//! its substitution and FCP legs, IPI, PIS, COFINS and II.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! Amounts are derived at full precision and rounded only on the wire.
//!
//! ## Quick Start
//!
//! ```rust
//! use imposto::core::*;
//! use imposto::core::icms::Cobrado;
//! use rust_decimal_macros::dec;
//!
//! let item = LineItemBuilder::new("1", dec!(4.99))
//!     .imposto(Icms::cobrado(Cobrado::default()))
//!     .imposto(Imposto::Pis(Contribuicao::aliquota(dec!(0.65))))
//!     .imposto(Imposto::Cofins(Contribuicao::aliquota(dec!(3.00))))
//!     .build();
//!
//! let resolved = item.impostos.resolved(item.base).unwrap();
//! assert!(validate_group(&resolved).is_empty());
//! assert_eq!(resolved.total_retido().unwrap(), dec!(0.182135));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Tax variants, derivation rules, code tables, validation |
//! | `xml` (default) | `<imposto>` generation and parsing, tag registry |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "xml")]
pub mod xml;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
