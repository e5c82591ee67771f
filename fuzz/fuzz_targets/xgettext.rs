#![no_main]

use doc_i18n_tool::catalog::Identity;
use doc_i18n_tool::tree::Document;
use doc_i18n_tool::xml::LoadOptions;
use doc_i18n_tool::{process_document, Config, ExtractionMode};
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;

fn text_of(doc: &Document) -> String {
    let root = doc.root_element().expect("Document should have a root");
    doc.text_content(root)
}

fuzz_target!(|inputs: (&str, bool)| {
    let (text, keep_entities) = inputs;
    let options = LoadOptions { keep_entities };
    let Ok(mut doc) = Document::parse(text, &options) else {
        return; // Invalid XML is fine.
    };
    let original_text = text_of(&doc);

    let config = Config {
        mode: ExtractionMode::EmitTemplate,
        ..Config::default()
    };
    let mut output = Vec::new();
    let entries = process_document(&mut doc, "doc.xml", &config, &Identity, &mut output)
        .expect("Writing to a Vec should succeed");
    let template = String::from_utf8(output).expect("Template should be UTF-8");
    assert!(template.starts_with("# SOME DESCRIPTIVE TITLE\n"));
    assert_eq!(template.matches("\n#: doc.xml:").count(), entries);

    // Collapsing changes the structure of the document, never its text.
    let reparsed =
        Document::parse(&doc.to_xml(), &options).expect("Serialized document should parse");
    assert_eq!(text_of(&reparsed), original_text);
});
