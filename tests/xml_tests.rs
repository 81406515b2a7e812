#![cfg(feature = "xml")]

use imposto::core::icms::Cobrado;
use imposto::core::*;
use imposto::xml::{self, Element};
use rust_decimal_macros::dec;

fn retail_item() -> LineItem {
    LineItemBuilder::new("1", dec!(4.99))
        .imposto(Icms::cobrado(Cobrado::default()))
        .imposto(Imposto::Pis(Contribuicao::aliquota(dec!(0.65))))
        .imposto(Imposto::Cofins(Contribuicao::aliquota(dec!(3.00))))
        .build()
}

fn reencode(block: &str) -> String {
    let group = xml::from_imposto_xml(block).unwrap();
    let mut item = LineItem {
        id: "1".into(),
        base: dec!(0),
        impostos: group,
        tributos: None,
    };
    xml::to_imposto_xml(&mut item).unwrap()
}

#[test]
fn retail_block() {
    let mut item = retail_item();
    let block = xml::to_imposto_xml(&mut item).unwrap();
    assert_eq!(
        block,
        "<imposto><vTotTrib>0.18</vTotTrib>\
         <ICMS><ICMS60><orig>0</orig><CST>60</CST></ICMS60></ICMS>\
         <PIS><PISAliq><CST>01</CST><vBC>4.99</vBC><pPIS>0.6500</pPIS><vPIS>0.03</vPIS></PISAliq></PIS>\
         <COFINS><COFINSAliq><CST>01</CST><vBC>4.99</vBC><pCOFINS>3.0000</pCOFINS><vCOFINS>0.15</vCOFINS></COFINSAliq></COFINS>\
         </imposto>"
    );
    assert_eq!(item.tributos, Some(dec!(0.182135)));
}

#[test]
fn block_round_trips() {
    let mut item = retail_item();
    let block = xml::to_imposto_xml(&mut item).unwrap();
    let parsed = xml::from_imposto_xml(&block).unwrap();
    assert_eq!(parsed, item.impostos.resolved(item.base).unwrap());
    assert_eq!(reencode(&block), block);
}

#[test]
fn cobrado_without_value_omits_retention_tags() {
    let mut item = retail_item();
    let block = xml::to_imposto_xml(&mut item).unwrap();
    assert!(!block.contains("vBCSTRet"));
    assert!(!block.contains("vICMSSTRet"));
}

#[test]
fn cobranca_values_on_the_wire() {
    let mut item = LineItemBuilder::new("1", dec!(1036.80))
        .imposto(Icms::simples_cobranca(
            Normal::new(dec!(1.25)),
            Substituicao::new(dec!(18.00))
                .with_modalidade(ModalidadeSt::Margem)
                .with_base(dec!(162.00)),
        ))
        .build();
    let block = xml::write_item(&mut item).unwrap();
    let sn201 = block.child("ICMS").and_then(|c| c.child("ICMSSN201")).unwrap();
    assert_eq!(sn201.text_of("vBCST"), Some("162.00"));
    assert_eq!(sn201.text_of("vICMSST"), Some("29.16"));
    assert_eq!(sn201.text_of("pCredSN"), Some("1.2500"));
    assert_eq!(sn201.text_of("vCredICMSSN"), Some("12.96"));
    assert_eq!(item.tributos, Some(dec!(0)));
}

#[test]
fn generico_with_value_only_is_reproduced() {
    let block = "<imposto><vTotTrib>7.50</vTotTrib>\
                 <ICMS><ICMS90><orig>0</orig><CST>90</CST></ICMS90></ICMS>\
                 <COFINS><COFINSOutr><CST>99</CST><vCOFINS>7.50</vCOFINS></COFINSOutr></COFINS>\
                 </imposto>";
    assert_eq!(reencode(block), block.replace(' ', ""));
}

#[test]
fn simples_generico_with_situation_only_is_reproduced() {
    let block = "<imposto><vTotTrib>0.00</vTotTrib>\
                 <ICMS><ICMSSN900><orig>2</orig><CSOSN>900</CSOSN></ICMSSN900></ICMS>\
                 </imposto>";
    assert_eq!(reencode(block), block.replace(' ', ""));

    let group = xml::from_imposto_xml(block).unwrap();
    let Some(Imposto::Icms(icms)) = group.get(Grupo::Icms) else {
        panic!("expected ICMS");
    };
    assert_eq!(icms.situacao, Situacao::Csosn(Csosn::Outros));
    assert!(matches!(&icms.tributo, IcmsTributo::Generico(g)
        if g.normal.is_none() && g.substituicao.is_none() && g.credito.is_none()));
}

#[test]
fn generico_ignores_whitespace() {
    let pretty = "<imposto>\n  <vTotTrib>1.00</vTotTrib>\n  <PIS>\n    <PISOutr>\n      \
                  <CST>49</CST>\n      <vPIS>1.00</vPIS>\n    </PISOutr>\n  </PIS>\n</imposto>";
    assert_eq!(
        reencode(pretty),
        "<imposto><vTotTrib>1.00</vTotTrib><PIS><PISOutr><CST>49</CST><vPIS>1.00</vPIS></PISOutr></PIS></imposto>"
    );
}

#[test]
fn missing_fcp_rate_is_not_an_error() {
    let block = "<imposto><ICMS><ICMS00><orig>0</orig><CST>00</CST><modBC>3</modBC>\
                 <vBC>100.00</vBC><pICMS>18.0000</pICMS><vICMS>18.00</vICMS><vFCP>2.00</vFCP>\
                 </ICMS00></ICMS></imposto>";
    let root = Element::parse(block).unwrap();
    let fragment = root.child("ICMS").and_then(|c| c.child("ICMS00")).unwrap();
    assert!(!xml::fcp::exists(fragment, FcpNivel::Base));

    let group = xml::parse(&root).unwrap();
    let Some(Imposto::Icms(icms)) = group.get(Grupo::Icms) else {
        panic!("expected ICMS");
    };
    assert!(icms.fundos().is_empty());
}

#[test]
fn fcp_is_read_when_rate_present() {
    let block = "<imposto><ICMS><ICMS00><orig>0</orig><CST>00</CST><modBC>3</modBC>\
                 <vBC>100.00</vBC><pICMS>18.0000</pICMS><vICMS>18.00</vICMS>\
                 <pFCP>2.0000</pFCP><vFCP>2.00</vFCP></ICMS00></ICMS></imposto>";
    let group = xml::from_imposto_xml(block).unwrap().resolved(dec!(0)).unwrap();
    let Some(Imposto::Icms(icms)) = group.get(Grupo::Icms) else {
        panic!("expected ICMS");
    };
    let fundos = icms.fundos();
    assert_eq!(fundos.len(), 1);
    assert_eq!(fundos[0].valor().unwrap(), dec!(2));
    assert_eq!(fundos[0].grupo(), Grupo::Fcp);
}

#[test]
fn every_container_in_one_block() {
    let mut item = LineItemBuilder::new("7", dec!(1000))
        .imposto(Icms::mista(
            Normal::new(dec!(12)).with_modalidade(Modalidade::Operacao),
            dec!(10),
            Substituicao::new(dec!(18))
                .with_modalidade(ModalidadeSt::Margem)
                .with_margem(dec!(30)),
        ))
        .imposto(Ipi::aliquota(IpiCst::SaidaTributada, dec!(5)))
        .imposto(Imposto::Pis(Contribuicao::aliquota(dec!(1.65))))
        .imposto(Imposto::PisSt(Contribuicao::substituicao(dec!(1.65))))
        .imposto(Imposto::Cofins(Contribuicao::aliquota(dec!(7.60))))
        .imposto(Imposto::CofinsSt(Contribuicao::substituicao(dec!(7.60))))
        .imposto(Ii::new(dec!(14)))
        .build();
    let block = xml::write_item(&mut item).unwrap();
    let names: Vec<_> = block.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        ["vTotTrib", "ICMS", "IPI", "PIS", "PISST", "COFINS", "COFINSST", "II"]
    );
    // 50 + 16.50 + 16.50 + 76 + 76 + 140
    assert_eq!(item.tributos, Some(dec!(375)));

    let parsed = xml::parse(&block).unwrap();
    assert_eq!(parsed, item.impostos.resolved(item.base).unwrap());
}

#[test]
fn pretty_output_parses_back() {
    let mut item = retail_item();
    let block = xml::write_item(&mut item).unwrap();
    let pretty = block.to_xml_pretty().unwrap();
    assert!(pretty.contains('\n'));
    assert_eq!(xml::from_imposto_xml(&pretty).unwrap(), item.impostos.resolved(item.base).unwrap());
}

// Snapshot tests (insta)

#[test]
fn snapshot_simples_cobranca_block() {
    let mut item = LineItemBuilder::new("1", dec!(1036.80))
        .imposto(
            Icms::simples_cobranca(
                Normal::new(dec!(1.25)),
                Substituicao::new(dec!(18.00))
                    .with_modalidade(ModalidadeSt::Margem)
                    .with_base(dec!(162.00)),
            )
            .with_origem(Origem::Estrangeira),
        )
        .imposto(Imposto::Pis(Contribuicao::isento(ContribuicaoCst::Monofasica)))
        .imposto(Imposto::Cofins(Contribuicao::isento(ContribuicaoCst::Monofasica)))
        .build();
    let block = xml::to_imposto_xml(&mut item).unwrap();
    insta::assert_snapshot!(block, @"<imposto><vTotTrib>0.00</vTotTrib><ICMS><ICMSSN201><orig>1</orig><CSOSN>201</CSOSN><modBCST>4</modBCST><vBCST>162.00</vBCST><pICMSST>18.0000</pICMSST><vICMSST>29.16</vICMSST><pCredSN>1.2500</pCredSN><vCredICMSSN>12.96</vCredICMSSN></ICMSSN201></ICMS><PIS><PISNT><CST>04</CST></PISNT></PIS><COFINS><COFINSNT><CST>04</CST></COFINSNT></COFINS></imposto>");
}
