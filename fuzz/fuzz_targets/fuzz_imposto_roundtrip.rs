#![no_main]

use libfuzzer_sys::fuzz_target;
use rust_decimal::Decimal;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Parse, serialize, parse again: no step may panic.
        if let Ok(group) = imposto::xml::from_imposto_xml(s) {
            let mut item = imposto::LineItem {
                id: "1".into(),
                base: Decimal::ZERO,
                impostos: group,
                tributos: None,
            };
            if let Ok(xml2) = imposto::xml::to_imposto_xml(&mut item) {
                let _ = imposto::xml::from_imposto_xml(&xml2);
            }
        }
    }
});
