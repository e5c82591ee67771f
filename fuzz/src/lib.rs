use arbitrary::Arbitrary;
use doc_i18n_tool::tree::{Document, NodeId};
use polib::catalog::Catalog;
use polib::message::Message;
use polib::metadata::CatalogMetadata;

/// Generate a random Catalog for fuzzing.
pub fn create_catalog(translations: Vec<(&str, &str)>) -> Catalog {
    let mut catalog = Catalog::new(CatalogMetadata::new());
    for (idx, (msgid, msgstr)) in translations.iter().enumerate() {
        let message = Message::build_singular()
            .with_source(format!("doc.xml:{idx}"))
            .with_msgid(String::from(*msgid))
            .with_msgstr(String::from(*msgstr))
            .done();
        catalog.append_or_update(message);
    }
    catalog
}

/// A few DocBook element names, with `accel` being presentational.
#[derive(Arbitrary, Debug, Copy, Clone)]
pub enum ElementName {
    Para,
    Title,
    Emphasis,
    Accel,
}

impl ElementName {
    fn as_str(self) -> &'static str {
        match self {
            ElementName::Para => "para",
            ElementName::Title => "title",
            ElementName::Emphasis => "emphasis",
            ElementName::Accel => "accel",
        }
    }
}

/// Wrapper enum for generating arbitrary document trees.
#[derive(Arbitrary, Debug)]
pub enum Node {
    Element {
        name: ElementName,
        children: Vec<Node>,
    },
    Text(String),
    EntityReference(Vec<Node>),
    EntityDeclaration(String),
    Comment,
}

/// Generate a Document with `root` as its document element.
pub fn create_document(root: Vec<Node>) -> (Document, NodeId) {
    let mut doc = Document::new();
    let id = doc.create_element("article", 1);
    doc.append_top_level(id);
    add_children(&mut doc, id, root, 1);
    (doc, id)
}

fn add_children(doc: &mut Document, parent: NodeId, nodes: Vec<Node>, line: usize) {
    for (idx, node) in nodes.into_iter().enumerate() {
        let line = line + idx;
        let id = match node {
            Node::Element { name, children } => {
                let id = doc.create_element(name.as_str(), line);
                doc.append_child(parent, id);
                add_children(doc, id, children, line);
                continue;
            }
            Node::Text(text) => doc.create_text(text, line),
            Node::EntityReference(children) => {
                let id = doc.create_entity_reference("ent", line);
                doc.append_child(parent, id);
                add_children(doc, id, children, line);
                continue;
            }
            Node::EntityDeclaration(value) => doc.create_entity_declaration("ent", &value, line),
            Node::Comment => doc.create_other("<!-- comment -->", line),
        };
        doc.append_child(parent, id);
    }
}
