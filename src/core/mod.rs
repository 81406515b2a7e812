//! Tax variants, derivation rules and code tables.
//!
//! This module holds the in-memory model of a line item's tax block: one
//! record per ICMS/IPI/PIS/COFINS/II regime, the rules deriving each amount
//! from base, rate and quantity, and the translation between symbolic
//! situations and the CST/CSOSN codes written on the wire.

pub mod calc;
pub mod codes;
mod contribuicao;
mod error;
mod group;
pub mod icms;
mod ii;
mod imposto;
mod ipi;
mod tributo;
mod validation;

pub use codes::{ContribuicaoCst, Csosn, Familia, IcmsCst, IpiCst, Modalidade, ModalidadeSt, Origem};
pub use contribuicao::*;
pub use error::*;
pub use group::*;
pub use icms::{Fcp, FcpNivel, Icms, IcmsTributo, Normal, Situacao, Substituicao};
pub use ii::*;
pub use imposto::*;
pub use ipi::*;
pub use tributo::*;
pub use validation::*;
