// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Merging of presentational markup into plain text.
//!
//! Elements such as `<accel>` only change how a part of a string is
//! rendered. A translator needs to see `_Open` as a single string, not
//! as `_` followed by `Open`, so an element whose element children are
//! all presentational is flattened into a single text node.

use crate::tree::{Document, NodeId, NodeKind};

/// The element names treated as presentational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationElements(Vec<String>);

impl Default for PresentationElements {
    fn default() -> Self {
        Self(vec![String::from("accel")])
    }
}

impl PresentationElements {
    /// An empty set: nothing is collapsed.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|element| element == name)
    }

    /// Add `name` to the set unless it is already present.
    pub fn push(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.contains(&name) {
            self.0.push(name);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> Extend<S> for PresentationElements {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        for name in iter {
            self.push(name);
        }
    }
}

/// Check if every element child of `element` is presentational.
///
/// Text, expanded entity references and other nodes do not prevent a
/// collapse. A reference to an undeclared entity has no text to
/// flatten, so it keeps its parent from being collapsed.
pub fn is_collapsible(
    doc: &Document,
    element: NodeId,
    presentation: &PresentationElements,
) -> bool {
    doc.children(element).all(|child| {
        let node = &doc[child];
        match node.kind() {
            NodeKind::Element => presentation.contains(node.name()),
            NodeKind::EntityReference => node.has_children(),
            _ => true,
        }
    })
}

/// Replace the children of `element` with a single text node holding
/// their flattened text, if they are all presentational.
///
/// Returns `true` if the tree was modified. Collapsing an element
/// which already has a single text child does nothing, so the
/// operation can be repeated safely.
///
/// # Examples
///
/// ```
/// use doc_i18n_tool::collapse::{collapse, PresentationElements};
/// use doc_i18n_tool::tree::{Document, NodeKind};
///
/// let mut doc = Document::new();
/// let para = doc.create_element("para", 1);
/// let accel = doc.create_element("accel", 1);
/// let underscore = doc.create_text("_", 1);
/// let open = doc.create_text("Open", 1);
/// doc.append_child(para, underscore);
/// doc.append_child(para, accel);
/// doc.append_child(accel, open);
///
/// assert!(collapse(&mut doc, para, &PresentationElements::default()));
/// let text = doc[para].first_child().unwrap();
/// assert_eq!(doc[text].kind(), NodeKind::Text);
/// assert_eq!(doc[text].content(), "_Open");
/// ```
pub fn collapse(
    doc: &mut Document,
    element: NodeId,
    presentation: &PresentationElements,
) -> bool {
    let Some(first) = doc[element].first_child() else {
        return false;
    };
    if doc[first].next_sibling().is_none() && doc[first].kind() == NodeKind::Text {
        return false;
    }
    if !is_collapsible(doc, element, presentation) {
        return false;
    }

    let content = doc.text_content(element);
    let line = doc[element].line();
    doc.remove_children(element);
    let text = doc.create_text(content, line);
    doc.append_child(element, text);
    log::debug!(
        "Collapsed <{}> at line {line} into a single text node",
        doc[element].name()
    );
    true
}
