//! Code translation tables between symbolic situations and wire codes.
//!
//! Each family owns a static table of `(symbol, code)` pairs. Lookups are
//! lenient: a symbol or code missing from the table passes through unchanged,
//! so codes introduced by later layout versions survive a round trip.

use serde::{Deserialize, Serialize};

/// Families with their own code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Familia {
    /// `orig`: merchandise origin.
    Origem,
    /// `CST` of ICMS (normal regime).
    Icms,
    /// `CSOSN` of ICMS under Simples Nacional.
    Simples,
    /// `CST` of IPI.
    Ipi,
    /// `CST` of PIS.
    Pis,
    /// `CST` of COFINS.
    Cofins,
    /// `modBC`: ICMS base modality.
    Modalidade,
    /// `modBCST`: ICMS-ST base modality.
    ModalidadeSt,
}

impl Familia {
    pub const ALL: [Familia; 8] = [
        Familia::Origem,
        Familia::Icms,
        Familia::Simples,
        Familia::Ipi,
        Familia::Pis,
        Familia::Cofins,
        Familia::Modalidade,
        Familia::ModalidadeSt,
    ];
}

/// The `(symbol, code)` table of a family.
pub fn tabela(familia: Familia) -> &'static [(&'static str, &'static str)] {
    match familia {
        Familia::Origem => ORIGEM,
        Familia::Icms => ICMS_CST,
        Familia::Simples => CSOSN,
        Familia::Ipi => IPI_CST,
        // PIS and COFINS share the same situation table.
        Familia::Pis | Familia::Cofins => CONTRIBUICAO_CST,
        Familia::Modalidade => MODALIDADE,
        Familia::ModalidadeSt => MODALIDADE_ST,
    }
}

/// Translate a symbol to its wire code, or return it unchanged when unknown.
pub fn to_wire_code(familia: Familia, symbol: &str) -> &str {
    tabela(familia)
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, code)| *code)
        .unwrap_or(symbol)
}

/// Translate a wire code to its symbol, or return it unchanged when unknown.
pub fn to_symbol(familia: Familia, code: &str) -> &str {
    tabela(familia)
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(symbol, _)| *symbol)
        .unwrap_or(code)
}

macro_rules! tabela {
    (
        $(#[$meta:meta])*
        $name:ident, $familia:expr, $table:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($symbol:literal, $code:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Code outside the known table, kept verbatim.
            Outro(String),
        }

        static $table: &[(&str, &str)] = &[ $( ($symbol, $code) ),+ ];

        impl $name {
            pub const FAMILIA: Familia = $familia;

            /// Symbolic name of the situation.
            pub fn symbol(&self) -> &str {
                match self {
                    $( Self::$variant => $symbol, )+
                    Self::Outro(code) => code.as_str(),
                }
            }

            pub fn from_symbol(symbol: &str) -> Self {
                match symbol {
                    $( $symbol => Self::$variant, )+
                    other => Self::Outro(other.to_string()),
                }
            }

            /// Wire code written to the XML.
            pub fn code(&self) -> &str {
                to_wire_code(Self::FAMILIA, self.symbol())
            }

            /// Parse from a wire code; unknown codes become [`Self::Outro`].
            pub fn from_code(code: &str) -> Self {
                Self::from_symbol(to_symbol(Self::FAMILIA, code))
            }
        }
    };
}

tabela! {
    /// `orig`: origin of the merchandise.
    Origem, Familia::Origem, ORIGEM {
        /// 0: domestic.
        Nacional => ("nacional", "0"),
        /// 1: foreign, direct import.
        Estrangeira => ("estrangeira", "1"),
        /// 2: foreign, bought on the domestic market.
        EstrangeiraInterna => ("estrangeira_interna", "2"),
        /// 3: domestic with import content above 40 %.
        Nacional40 => ("nacional_40", "3"),
        /// 4: domestic, basic production processes.
        NacionalProducao => ("nacional_producao", "4"),
        /// 5: domestic with import content up to 40 %.
        NacionalAte40 => ("nacional_ate_40", "5"),
        /// 6: foreign direct import without domestic similar (CAMEX list).
        EstrangeiraSemSimilar => ("estrangeira_sem_similar", "6"),
        /// 7: foreign internal market without domestic similar.
        EstrangeiraInternaSemSimilar => ("estrangeira_interna_sem_similar", "7"),
        /// 8: domestic with import content above 70 %.
        Nacional70 => ("nacional_70", "8"),
    }
}

tabela! {
    /// `CST` of ICMS for the normal tax regime.
    IcmsCst, Familia::Icms, ICMS_CST {
        /// 00: fully taxed.
        Tributada => ("tributada", "00"),
        /// 10: taxed, with ICMS charged by substitution.
        TributadaComSt => ("tributada_com_st", "10"),
        /// 20: base reduction.
        Reducao => ("reducao", "20"),
        /// 30: exempt or untaxed, with ICMS charged by substitution.
        IsentaComSt => ("isenta_com_st", "30"),
        /// 40: exempt.
        Isenta => ("isenta", "40"),
        /// 41: not taxed.
        NaoTributada => ("nao_tributada", "41"),
        /// 50: suspended.
        Suspensao => ("suspensao", "50"),
        /// 51: deferred.
        Diferimento => ("diferimento", "51"),
        /// 60: charged earlier by substitution.
        Cobrado => ("cobrado", "60"),
        /// 70: base reduction with ICMS charged by substitution.
        ReducaoComSt => ("reducao_com_st", "70"),
        /// 90: other.
        Outras => ("outras", "90"),
    }
}

tabela! {
    /// `CSOSN`: ICMS situation under Simples Nacional.
    Csosn, Familia::Simples, CSOSN {
        /// 101: taxed with credit permission.
        ComCredito => ("com_credito", "101"),
        /// 102: taxed without credit permission.
        SemCredito => ("sem_credito", "102"),
        /// 103: exempt for the gross revenue range.
        Isencao => ("isencao", "103"),
        /// 201: with credit permission and substitution.
        ComCreditoSt => ("com_credito_st", "201"),
        /// 202: without credit permission, with substitution.
        SemCreditoSt => ("sem_credito_st", "202"),
        /// 203: exempt for the revenue range, with substitution.
        IsencaoSt => ("isencao_st", "203"),
        /// 300: immune.
        Imune => ("imune", "300"),
        /// 400: not taxed.
        NaoTributada => ("nao_tributada", "400"),
        /// 500: charged earlier by substitution or anticipation.
        Cobrado => ("cobrado", "500"),
        /// 900: other.
        Outros => ("outros", "900"),
    }
}

tabela! {
    /// `CST` of IPI.
    IpiCst, Familia::Ipi, IPI_CST {
        EntradaRecuperacao => ("entrada_recuperacao", "00"),
        EntradaZero => ("entrada_zero", "01"),
        EntradaIsenta => ("entrada_isenta", "02"),
        EntradaNaoTributada => ("entrada_nao_tributada", "03"),
        EntradaImune => ("entrada_imune", "04"),
        EntradaSuspensao => ("entrada_suspensao", "05"),
        EntradaOutras => ("entrada_outras", "49"),
        SaidaTributada => ("saida_tributada", "50"),
        SaidaZero => ("saida_zero", "51"),
        SaidaIsenta => ("saida_isenta", "52"),
        SaidaNaoTributada => ("saida_nao_tributada", "53"),
        SaidaImune => ("saida_imune", "54"),
        SaidaSuspensao => ("saida_suspensao", "55"),
        SaidaOutras => ("saida_outras", "99"),
    }
}

tabela! {
    /// `CST` of PIS and COFINS.
    ContribuicaoCst, Familia::Pis, CONTRIBUICAO_CST {
        /// 01: basic rate.
        Normal => ("normal", "01"),
        /// 02: differentiated rate.
        Diferenciada => ("diferenciada", "02"),
        /// 03: rate per unit of product.
        Quantidade => ("quantidade", "03"),
        /// 04: single-phase, resale at zero rate.
        Monofasica => ("monofasica", "04"),
        /// 05: substitution.
        Substituicao => ("substituicao", "05"),
        /// 06: zero rate.
        Zero => ("zero", "06"),
        /// 07: exempt.
        Isenta => ("isenta", "07"),
        /// 08: without incidence.
        SemIncidencia => ("sem_incidencia", "08"),
        /// 09: suspended.
        Suspensao => ("suspensao", "09"),
        /// 49: other outgoing operations.
        OutrasSaidas => ("outras_saidas", "49"),
        /// 50: credit tied to taxed domestic revenue.
        CreditoTributada => ("credito_tributada", "50"),
        /// 60: presumed credit tied to taxed domestic revenue.
        CreditoPresumido => ("credito_presumido", "60"),
        /// 70: acquisition without credit.
        AquisicaoSemCredito => ("aquisicao_sem_credito", "70"),
        /// 98: other incoming operations.
        OutrasEntradas => ("outras_entradas", "98"),
        /// 99: other.
        Outras => ("outras", "99"),
    }
}

tabela! {
    /// `modBC`: how the ICMS base is determined.
    Modalidade, Familia::Modalidade, MODALIDADE {
        /// 0: added value margin (%).
        Margem => ("margem", "0"),
        /// 1: reference price list (pauta).
        Pauta => ("pauta", "1"),
        /// 2: maximum regulated price.
        Tabelado => ("tabelado", "2"),
        /// 3: operation value.
        Operacao => ("operacao", "3"),
    }
}

tabela! {
    /// `modBCST`: how the ICMS-ST base is determined.
    ModalidadeSt, Familia::ModalidadeSt, MODALIDADE_ST {
        /// 0: regulated or maximum suggested price.
        Tabelado => ("tabelado", "0"),
        /// 1: negative list.
        ListaNegativa => ("lista_negativa", "1"),
        /// 2: positive list.
        ListaPositiva => ("lista_positiva", "2"),
        /// 3: neutral list.
        ListaNeutra => ("lista_neutra", "3"),
        /// 4: added value margin (%).
        Margem => ("margem", "4"),
        /// 5: reference price list (pauta).
        Pauta => ("pauta", "5"),
        /// 6: operation value.
        Operacao => ("operacao", "6"),
    }
}

impl Default for Origem {
    fn default() -> Self {
        Self::Nacional
    }
}
