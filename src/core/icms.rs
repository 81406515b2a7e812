//! ICMS variants, normal regime (CST) and Simples Nacional (CSOSN).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calc::{agregar, exigir_base, percentual, reduzir, resolve_base};
use super::codes::{Csosn, IcmsCst, Modalidade, ModalidadeSt, Origem};
use super::error::ImpostoError;
use super::imposto::Grupo;

/// Level of the state poverty fund surtax (FCP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FcpNivel {
    /// Charged on the own operation.
    Base,
    /// Charged on the substitution base.
    Substituido,
    /// Retained earlier by substitution.
    Retido,
}

impl FcpNivel {
    pub fn grupo(self) -> Grupo {
        match self {
            Self::Base => Grupo::Fcp,
            Self::Substituido => Grupo::FcpSt,
            Self::Retido => Grupo::FcpStRet,
        }
    }
}

/// FCP surtax: `value = base × rate / 100`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fcp {
    pub nivel: FcpNivel,
    /// `None` inherits the base of the enclosing ICMS leg.
    pub base: Option<Decimal>,
    pub aliquota: Decimal,
}

impl Fcp {
    pub fn new(nivel: FcpNivel, aliquota: Decimal) -> Self {
        Self {
            nivel,
            base: None,
            aliquota,
        }
    }

    pub fn with_base(mut self, base: Decimal) -> Self {
        self.base = Some(base);
        self
    }

    pub fn grupo(&self) -> Grupo {
        self.nivel.grupo()
    }

    pub fn valor(&self) -> Result<Decimal, ImpostoError> {
        Ok(percentual(exigir_base(self.base, "fundo.base")?, self.aliquota))
    }

    pub fn resolve(&mut self, padrao: Decimal) {
        self.base.get_or_insert(padrao);
    }
}

/// Situation code: CST for the normal regime, CSOSN for Simples Nacional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Situacao {
    Cst(IcmsCst),
    Csosn(Csosn),
}

impl Situacao {
    pub fn is_simples(&self) -> bool {
        matches!(self, Self::Csosn(_))
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Cst(cst) => cst.code(),
            Self::Csosn(csosn) => csosn.code(),
        }
    }
}

/// Own-operation leg: `value = base × rate / 100`.
///
/// Also used as the Simples Nacional credit leg (`pCredSN`/`vCredICMSSN`),
/// which carries no modality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normal {
    pub modalidade: Option<Modalidade>,
    pub base: Option<Decimal>,
    pub aliquota: Decimal,
    pub fundo: Option<Fcp>,
}

impl Normal {
    pub fn new(aliquota: Decimal) -> Self {
        Self {
            modalidade: None,
            base: None,
            aliquota,
            fundo: None,
        }
    }

    pub fn with_modalidade(mut self, modalidade: Modalidade) -> Self {
        self.modalidade = Some(modalidade);
        self
    }

    pub fn with_base(mut self, base: Decimal) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_fundo(mut self, aliquota: Decimal) -> Self {
        self.fundo = Some(Fcp::new(FcpNivel::Base, aliquota));
        self
    }

    pub fn valor(&self) -> Result<Decimal, ImpostoError> {
        Ok(percentual(exigir_base(self.base, "base")?, self.aliquota))
    }

    pub fn resolve(&mut self, padrao: Decimal) {
        let base = *self.base.get_or_insert(padrao);
        if let Some(fundo) = &mut self.fundo {
            fundo.resolve(base);
        }
    }
}

/// Substitution leg (ICMS-ST).
///
/// An inherited base is the item base raised by the margin and lowered by
/// the ST reduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substituicao {
    pub modalidade: Option<ModalidadeSt>,
    /// `pMVAST`.
    pub margem: Option<Decimal>,
    /// `pRedBCST`.
    pub reducao: Option<Decimal>,
    pub base: Option<Decimal>,
    pub aliquota: Decimal,
    pub fundo: Option<Fcp>,
}

impl Substituicao {
    pub fn new(aliquota: Decimal) -> Self {
        Self {
            modalidade: None,
            margem: None,
            reducao: None,
            base: None,
            aliquota,
            fundo: None,
        }
    }

    pub fn with_modalidade(mut self, modalidade: ModalidadeSt) -> Self {
        self.modalidade = Some(modalidade);
        self
    }

    pub fn with_margem(mut self, margem: Decimal) -> Self {
        self.margem = Some(margem);
        self
    }

    pub fn with_reducao(mut self, reducao: Decimal) -> Self {
        self.reducao = Some(reducao);
        self
    }

    pub fn with_base(mut self, base: Decimal) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_fundo(mut self, aliquota: Decimal) -> Self {
        self.fundo = Some(Fcp::new(FcpNivel::Substituido, aliquota));
        self
    }

    pub fn grupo(&self) -> Grupo {
        Grupo::IcmsSt
    }

    pub fn valor(&self) -> Result<Decimal, ImpostoError> {
        Ok(percentual(
            exigir_base(self.base, "substituicao.base")?,
            self.aliquota,
        ))
    }

    pub fn resolve(&mut self, padrao: Decimal) -> Result<(), ImpostoError> {
        let base = match self.base {
            Some(base) => base,
            None => {
                let agregada = agregar(
                    padrao,
                    self.margem.unwrap_or_default(),
                    "substituicao.margem",
                )?;
                reduzir(agregada, self.reducao.unwrap_or_default(), "substituicao.reducao")?
            }
        };
        self.base = Some(base);
        if let Some(fundo) = &mut self.fundo {
            fundo.resolve(base);
        }
        Ok(())
    }
}

/// Relief granted on the operation (`vICMSDeson`/`motDesICMS`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Desoneracao {
    pub valor: Decimal,
    pub motivo: String,
}

/// CST 10 / CSOSN 201: own leg plus substitution, the own amount credited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cobranca {
    pub normal: Normal,
    pub substituicao: Substituicao,
}

impl Cobranca {
    /// Substitution amount net of the own leg.
    pub fn valor(&self) -> Result<Decimal, ImpostoError> {
        Ok(self.substituicao.valor()? - self.normal.valor()?)
    }

    /// Amount of the own leg.
    pub fn total(&self) -> Result<Decimal, ImpostoError> {
        self.normal.valor()
    }
}

/// CST 20: own leg on a reduced base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reducao {
    pub normal: Normal,
    /// `pRedBC`.
    pub reducao: Decimal,
    pub desoneracao: Option<Desoneracao>,
}

/// CST 30 / CSOSN 202, 203: substitution only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcial {
    pub substituicao: Substituicao,
    pub desoneracao: Option<Desoneracao>,
}

/// CST 40, 41, 50 / CSOSN 102, 103, 300, 400.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Isento {
    pub desoneracao: Option<Desoneracao>,
}

/// CST 51: part of the operation amount is deferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diferido {
    pub normal: Option<Normal>,
    pub reducao: Option<Decimal>,
    /// `pDif`.
    pub diferimento: Option<Decimal>,
}

impl Diferido {
    /// `vICMSOp`.
    pub fn operacao(&self) -> Result<Decimal, ImpostoError> {
        match &self.normal {
            Some(normal) => normal.valor(),
            None => Ok(Decimal::ZERO),
        }
    }

    /// `vICMSDif`.
    pub fn diferido(&self) -> Result<Decimal, ImpostoError> {
        Ok(percentual(
            self.operacao()?,
            self.diferimento.unwrap_or_default(),
        ))
    }

    /// `vICMS`.
    pub fn valor(&self) -> Result<Decimal, ImpostoError> {
        Ok(self.operacao()? - self.diferido()?)
    }
}

/// CST 60 / CSOSN 500: retained earlier by substitution.
///
/// While no retained amount is reported the base is zero and the whole
/// retention block stays off the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cobrado {
    pub base: Option<Decimal>,
    /// `pST`, rate borne by the final consumer.
    pub aliquota: Option<Decimal>,
    /// `vICMSSTRet`.
    pub valor: Option<Decimal>,
    pub fundo: Option<Fcp>,
}

impl Cobrado {
    pub fn with_valor(mut self, base: Decimal, valor: Decimal) -> Self {
        self.base = Some(base);
        self.valor = Some(valor);
        self
    }

    pub fn with_aliquota(mut self, aliquota: Decimal) -> Self {
        self.aliquota = Some(aliquota);
        self
    }

    pub fn with_fundo(mut self, base: Decimal, aliquota: Decimal) -> Self {
        self.fundo = Some(Fcp::new(FcpNivel::Retido, aliquota).with_base(base));
        self
    }

    /// `vBCSTRet`: zero unless a retained amount is reported.
    pub fn base_retida(&self) -> Decimal {
        match self.valor {
            Some(_) => self.base.unwrap_or_default(),
            None => Decimal::ZERO,
        }
    }

    pub fn resolve(&mut self, padrao: Decimal) {
        if self.valor.is_some() {
            self.base.get_or_insert(padrao);
        }
        let base = self.base_retida();
        if let Some(fundo) = &mut self.fundo {
            fundo.resolve(base);
        }
    }
}

/// CST 70: reduced own leg plus substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mista {
    pub normal: Normal,
    pub reducao: Decimal,
    pub substituicao: Substituicao,
    pub desoneracao: Option<Desoneracao>,
}

/// CST 90 / CSOSN 900: every block optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generico {
    pub normal: Option<Normal>,
    pub reducao: Option<Decimal>,
    pub substituicao: Option<Substituicao>,
    pub desoneracao: Option<Desoneracao>,
    /// Simples Nacional credit (CSOSN 900 only).
    pub credito: Option<Normal>,
}

/// The regime-specific part of an ICMS record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IcmsTributo {
    Normal(Normal),
    Cobranca(Cobranca),
    Reducao(Reducao),
    Parcial(Parcial),
    Isento(Isento),
    Diferido(Diferido),
    Cobrado(Cobrado),
    Mista(Mista),
    Generico(Generico),
    /// CSOSN 101: credit only.
    SimplesNormal(Normal),
}

/// ICMS of one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icms {
    pub origem: Origem,
    pub situacao: Situacao,
    pub tributo: IcmsTributo,
}

impl Icms {
    pub fn new(origem: Origem, situacao: Situacao, tributo: IcmsTributo) -> Self {
        Self {
            origem,
            situacao,
            tributo,
        }
    }

    fn cst(cst: IcmsCst, tributo: IcmsTributo) -> Self {
        Self::new(Origem::Nacional, Situacao::Cst(cst), tributo)
    }

    fn csosn(csosn: Csosn, tributo: IcmsTributo) -> Self {
        Self::new(Origem::Nacional, Situacao::Csosn(csosn), tributo)
    }

    /// CST 00.
    pub fn normal(normal: Normal) -> Self {
        Self::cst(IcmsCst::Tributada, IcmsTributo::Normal(normal))
    }

    /// CST 10.
    pub fn cobranca(normal: Normal, substituicao: Substituicao) -> Self {
        Self::cst(
            IcmsCst::TributadaComSt,
            IcmsTributo::Cobranca(Cobranca {
                normal,
                substituicao,
            }),
        )
    }

    /// CST 20.
    pub fn reducao(normal: Normal, reducao: Decimal) -> Self {
        Self::cst(
            IcmsCst::Reducao,
            IcmsTributo::Reducao(Reducao {
                normal,
                reducao,
                desoneracao: None,
            }),
        )
    }

    /// CST 30.
    pub fn parcial(substituicao: Substituicao) -> Self {
        Self::cst(
            IcmsCst::IsentaComSt,
            IcmsTributo::Parcial(Parcial {
                substituicao,
                desoneracao: None,
            }),
        )
    }

    /// CST 40, 41 or 50.
    pub fn isento(cst: IcmsCst) -> Self {
        Self::cst(cst, IcmsTributo::Isento(Isento::default()))
    }

    /// CST 51.
    pub fn diferido(normal: Normal, diferimento: Decimal) -> Self {
        Self::cst(
            IcmsCst::Diferimento,
            IcmsTributo::Diferido(Diferido {
                normal: Some(normal),
                reducao: None,
                diferimento: Some(diferimento),
            }),
        )
    }

    /// CST 60.
    pub fn cobrado(cobrado: Cobrado) -> Self {
        Self::cst(IcmsCst::Cobrado, IcmsTributo::Cobrado(cobrado))
    }

    /// CST 70.
    pub fn mista(normal: Normal, reducao: Decimal, substituicao: Substituicao) -> Self {
        Self::cst(
            IcmsCst::ReducaoComSt,
            IcmsTributo::Mista(Mista {
                normal,
                reducao,
                substituicao,
                desoneracao: None,
            }),
        )
    }

    /// CST 90.
    pub fn generico(generico: Generico) -> Self {
        Self::cst(IcmsCst::Outras, IcmsTributo::Generico(generico))
    }

    /// CSOSN 101.
    pub fn simples_normal(credito: Normal) -> Self {
        Self::csosn(Csosn::ComCredito, IcmsTributo::SimplesNormal(credito))
    }

    /// CSOSN 102, 103, 300 or 400.
    pub fn simples_isento(csosn: Csosn) -> Self {
        Self::csosn(csosn, IcmsTributo::Isento(Isento::default()))
    }

    /// CSOSN 201: credit leg plus substitution.
    pub fn simples_cobranca(credito: Normal, substituicao: Substituicao) -> Self {
        Self::csosn(
            Csosn::ComCreditoSt,
            IcmsTributo::Cobranca(Cobranca {
                normal: credito,
                substituicao,
            }),
        )
    }

    /// CSOSN 202 or 203.
    pub fn simples_parcial(csosn: Csosn, substituicao: Substituicao) -> Self {
        Self::csosn(
            csosn,
            IcmsTributo::Parcial(Parcial {
                substituicao,
                desoneracao: None,
            }),
        )
    }

    /// CSOSN 500.
    pub fn simples_cobrado(cobrado: Cobrado) -> Self {
        Self::csosn(Csosn::Cobrado, IcmsTributo::Cobrado(cobrado))
    }

    /// CSOSN 900.
    pub fn simples_generico(generico: Generico) -> Self {
        Self::csosn(Csosn::Outros, IcmsTributo::Generico(generico))
    }

    pub fn with_origem(mut self, origem: Origem) -> Self {
        self.origem = origem;
        self
    }

    /// Record a relief (`vICMSDeson`/`motDesICMS`).
    ///
    /// Only the reduction, partial, exempt, mixed and generic variants carry
    /// a relief; any other variant is returned unchanged.
    pub fn with_desoneracao(mut self, valor: Decimal, motivo: impl Into<String>) -> Self {
        let desoneracao = Some(Desoneracao {
            valor,
            motivo: motivo.into(),
        });
        match &mut self.tributo {
            IcmsTributo::Reducao(r) => r.desoneracao = desoneracao,
            IcmsTributo::Parcial(p) => p.desoneracao = desoneracao,
            IcmsTributo::Isento(i) => i.desoneracao = desoneracao,
            IcmsTributo::Mista(m) => m.desoneracao = desoneracao,
            IcmsTributo::Generico(g) => g.desoneracao = desoneracao,
            _ => {}
        }
        self
    }

    /// ICMS amount of the variant (`vICMS`, `vICMSST` net of credit, `vICMSSTRet`…).
    pub fn valor(&self) -> Result<Decimal, ImpostoError> {
        match &self.tributo {
            IcmsTributo::Normal(n) | IcmsTributo::SimplesNormal(n) => n.valor(),
            IcmsTributo::Cobranca(c) => c.valor(),
            IcmsTributo::Reducao(r) => r.normal.valor(),
            IcmsTributo::Parcial(p) => p.substituicao.valor(),
            IcmsTributo::Isento(_) => Ok(Decimal::ZERO),
            IcmsTributo::Diferido(d) => d.valor(),
            IcmsTributo::Cobrado(c) => Ok(c.valor.unwrap_or_default()),
            IcmsTributo::Mista(m) => m.normal.valor(),
            IcmsTributo::Generico(g) => match &g.normal {
                Some(n) => n.valor(),
                None => Ok(Decimal::ZERO),
            },
        }
    }

    /// FCP sub-records carried by this variant.
    pub fn fundos(&self) -> Vec<&Fcp> {
        let mut fundos = Vec::new();
        match &self.tributo {
            IcmsTributo::Normal(n) | IcmsTributo::SimplesNormal(n) => fundos.extend(&n.fundo),
            IcmsTributo::Cobranca(c) => {
                fundos.extend(&c.normal.fundo);
                fundos.extend(&c.substituicao.fundo);
            }
            IcmsTributo::Reducao(r) => fundos.extend(&r.normal.fundo),
            IcmsTributo::Parcial(p) => fundos.extend(&p.substituicao.fundo),
            IcmsTributo::Isento(_) => {}
            IcmsTributo::Diferido(d) => {
                if let Some(n) = &d.normal {
                    fundos.extend(&n.fundo);
                }
            }
            IcmsTributo::Cobrado(c) => fundos.extend(&c.fundo),
            IcmsTributo::Mista(m) => {
                fundos.extend(&m.normal.fundo);
                fundos.extend(&m.substituicao.fundo);
            }
            IcmsTributo::Generico(g) => {
                if let Some(n) = &g.normal {
                    fundos.extend(&n.fundo);
                }
                if let Some(s) = &g.substituicao {
                    fundos.extend(&s.fundo);
                }
            }
        }
        fundos
    }

    /// Fill every inherited base from the line item's base.
    ///
    /// Fails when a reduced or margin-raised base overflows.
    pub fn resolve(&mut self, padrao: Decimal) -> Result<(), ImpostoError> {
        match &mut self.tributo {
            IcmsTributo::Normal(n) | IcmsTributo::SimplesNormal(n) => n.resolve(padrao),
            IcmsTributo::Cobranca(c) => {
                c.normal.resolve(padrao);
                c.substituicao.resolve(padrao)?;
            }
            IcmsTributo::Reducao(r) => {
                let base = base_reduzida(&r.normal, padrao, Some(r.reducao))?;
                r.normal.resolve(base);
            }
            IcmsTributo::Parcial(p) => p.substituicao.resolve(padrao)?,
            IcmsTributo::Isento(_) => {}
            IcmsTributo::Diferido(d) => {
                if let Some(n) = &mut d.normal {
                    let base = base_reduzida(n, padrao, d.reducao)?;
                    n.resolve(base);
                }
            }
            IcmsTributo::Cobrado(c) => c.resolve(padrao),
            IcmsTributo::Mista(m) => {
                let base = base_reduzida(&m.normal, padrao, Some(m.reducao))?;
                m.normal.resolve(base);
                m.substituicao.resolve(padrao)?;
            }
            IcmsTributo::Generico(g) => {
                if let Some(n) = &mut g.normal {
                    let base = base_reduzida(n, padrao, g.reducao)?;
                    n.resolve(base);
                }
                if let Some(s) = &mut g.substituicao {
                    s.resolve(padrao)?;
                }
                if let Some(c) = &mut g.credito {
                    c.resolve(padrao);
                }
            }
        }
        Ok(())
    }
}

/// Base an own leg falls back to: its own, else the reduced item base.
fn base_reduzida(
    normal: &Normal,
    padrao: Decimal,
    reducao: Option<Decimal>,
) -> Result<Decimal, ImpostoError> {
    match reducao {
        Some(r) if normal.base.is_none() => reduzir(padrao, r, "icms.reducao"),
        _ => Ok(resolve_base(normal.base, padrao)),
    }
}
