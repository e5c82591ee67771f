#![no_main]

use doc_i18n_tool::tree::Document;
use doc_i18n_tool::xml::LoadOptions;
use doc_i18n_tool::{process_document, Config};
use doc_i18n_tool_fuzz::create_catalog;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|inputs: (Vec<(&str, &str)>, &str)| {
    let (translations, text) = inputs;
    let catalog = create_catalog(translations);
    let Ok(mut doc) = Document::parse(text, &LoadOptions::default()) else {
        return; // Invalid XML is fine.
    };
    let mut output = Vec::new();
    let entries = process_document(&mut doc, "doc.xml", &Config::default(), &catalog, &mut output)
        .expect("Translating should succeed");
    assert_eq!(entries, 0);
    assert!(output.is_empty());
    let _ = doc.to_xml();
});
