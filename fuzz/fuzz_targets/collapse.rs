#![no_main]

use doc_i18n_tool::collapse::{collapse, PresentationElements};
use doc_i18n_tool::tree::NodeKind;
use doc_i18n_tool_fuzz::{create_document, Node};
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;

fuzz_target!(|nodes: Vec<Node>| {
    let (mut doc, root) = create_document(nodes);
    let presentation = PresentationElements::default();
    let text = doc.text_content(root);

    if collapse(&mut doc, root, &presentation) {
        let children = doc.children(root).collect::<Vec<_>>();
        assert_eq!(children.len(), 1);
        assert_eq!(doc[children[0]].kind(), NodeKind::Text);
    }
    assert_eq!(doc.text_content(root), text);

    // A second collapse never changes anything.
    let once = doc.clone();
    assert!(!collapse(&mut doc, root, &presentation));
    assert_eq!(doc, once);
});
