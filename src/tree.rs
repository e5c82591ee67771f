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

//! The document tree walked by the extractor.
//!
//! Nodes live in an arena owned by [`Document`] and refer to each
//! other through [`NodeId`] handles. Every node has exactly one owner:
//! its parent, or the top level of the document. Removing the children
//! of a node releases the whole subtree; the freed slots are reused by
//! later allocations.

use std::ops::Index;

/// Handle to a node in a [`Document`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// The kinds of nodes the extractor distinguishes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    EntityReference,
    EntityDeclaration,
    /// Comments, processing instructions, the XML declaration and the
    /// document type declaration.
    Other,
}

/// A single node in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    name: String,
    content: String,
    attributes: String,
    line: usize,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl Node {
    fn new(kind: NodeKind, name: String, content: String, line: usize) -> Self {
        Self {
            kind,
            name,
            content,
            attributes: String::new(),
            line,
            parent: None,
            first_child: None,
            last_child: None,
            prev: None,
            next: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Tag name of an element or name of an entity. Empty for other
    /// kinds of nodes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The text of a text node, the replacement text of an entity
    /// declaration or the raw markup of an [`NodeKind::Other`] node.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Raw attribute text of an element start tag, including the
    /// leading whitespace.
    pub fn attributes(&self) -> &str {
        &self.attributes
    }

    /// The 1-based source line where the node starts.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    pub fn prev_sibling(&self) -> Option<NodeId> {
        self.prev
    }

    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next
    }

    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}

/// An XML document held as an arena of nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    nodes: Vec<Option<Node>>,
    free: Vec<NodeId>,
    first: Option<NodeId>,
    last: Option<NodeId>,
}

impl Index<NodeId> for Document {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match &self.nodes[id.0] {
            Some(node) => node,
            None => panic!("{id:?} refers to a released node"),
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match &mut self.nodes[id.0] {
            Some(node) => node,
            None => panic!("{id:?} refers to a released node"),
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Create a detached element.
    pub fn create_element(&mut self, name: &str, line: usize) -> NodeId {
        self.alloc(Node::new(
            NodeKind::Element,
            String::from(name),
            String::new(),
            line,
        ))
    }

    /// Create a detached element with the raw attribute text of its
    /// start tag.
    pub fn create_element_with_attributes(
        &mut self,
        name: &str,
        attributes: &str,
        line: usize,
    ) -> NodeId {
        let id = self.create_element(name, line);
        self.node_mut(id).attributes = String::from(attributes);
        id
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, content: impl Into<String>, line: usize) -> NodeId {
        self.alloc(Node::new(
            NodeKind::Text,
            String::new(),
            content.into(),
            line,
        ))
    }

    /// Create a detached reference to the entity `name`.
    pub fn create_entity_reference(&mut self, name: &str, line: usize) -> NodeId {
        self.alloc(Node::new(
            NodeKind::EntityReference,
            String::from(name),
            String::new(),
            line,
        ))
    }

    /// Create a detached declaration of the entity `name`.
    pub fn create_entity_declaration(&mut self, name: &str, value: &str, line: usize) -> NodeId {
        self.alloc(Node::new(
            NodeKind::EntityDeclaration,
            String::from(name),
            String::from(value),
            line,
        ))
    }

    /// Create a detached node which is written back as `markup`.
    pub fn create_other(&mut self, markup: impl Into<String>, line: usize) -> NodeId {
        self.alloc(Node::new(
            NodeKind::Other,
            String::new(),
            markup.into(),
            line,
        ))
    }

    /// Append the detached node `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let last = self[parent].last_child;
        {
            let node = self.node_mut(child);
            debug_assert!(node.parent.is_none() && node.prev.is_none() && node.next.is_none());
            node.parent = Some(parent);
            node.prev = last;
        }
        match last {
            Some(last) => self.node_mut(last).next = Some(child),
            None => self.node_mut(parent).first_child = Some(child),
        }
        self.node_mut(parent).last_child = Some(child);
    }

    /// Append the detached node `child` to the top level of the
    /// document.
    pub fn append_top_level(&mut self, child: NodeId) {
        self.node_mut(child).prev = self.last;
        match self.last {
            Some(last) => self.node_mut(last).next = Some(child),
            None => self.first = Some(child),
        }
        self.last = Some(child);
    }

    /// Replace the content of `id`. The previous buffer is dropped.
    pub fn set_content(&mut self, id: NodeId, content: String) {
        self.node_mut(id).content = content;
    }

    /// Append `text` to the content of `id`.
    pub fn push_content(&mut self, id: NodeId, text: &str) {
        self.node_mut(id).content.push_str(text);
    }

    /// The nodes at the top level of the document, in order.
    pub fn top_level(&self) -> Siblings<'_> {
        Siblings {
            doc: self,
            next: self.first,
        }
    }

    /// The document element.
    pub fn root_element(&self) -> Option<NodeId> {
        self.top_level()
            .find(|&id| self[id].kind == NodeKind::Element)
    }

    /// The children of `id`, in order.
    pub fn children(&self, id: NodeId) -> Siblings<'_> {
        Siblings {
            doc: self,
            next: self[id].first_child,
        }
    }

    /// All nodes below `id` in document order, not including `id`.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root: id,
            next: self[id].first_child,
        }
    }

    /// Concatenate the text of all text nodes below `id` in document
    /// order.
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_i18n_tool::tree::Document;
    ///
    /// let mut doc = Document::new();
    /// let para = doc.create_element("para", 1);
    /// let accel = doc.create_element("accel", 1);
    /// let a = doc.create_text("_Open ", 1);
    /// let b = doc.create_text("F", 1);
    /// let c = doc.create_text("ile", 1);
    /// doc.append_child(para, a);
    /// doc.append_child(para, accel);
    /// doc.append_child(accel, b);
    /// doc.append_child(para, c);
    /// assert_eq!(doc.text_content(para), "_Open File");
    /// ```
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter(|&child| self[child].kind == NodeKind::Text)
            .map(|child| self[child].content.as_str())
            .collect()
    }

    /// Remove and release every child of `id` together with their
    /// subtrees.
    pub fn remove_children(&mut self, id: NodeId) {
        let released = self.descendants(id).collect::<Vec<_>>();
        let node = self.node_mut(id);
        node.first_child = None;
        node.last_child = None;
        for child in released {
            self.nodes[child.0] = None;
            self.free.push(child);
        }
    }

    /// Number of live nodes in the document.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Iterator over a run of sibling nodes.
#[derive(Debug, Clone)]
pub struct Siblings<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Siblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.doc[id].next;
        Some(id)
    }
}

/// Pre-order iterator over a subtree. It keeps no stack: the position
/// is recovered from the parent and sibling links.
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    doc: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Descendants<'_> {
    fn following(&self, mut id: NodeId) -> Option<NodeId> {
        loop {
            if id == self.root {
                return None;
            }
            if let Some(next) = self.doc[id].next {
                return Some(next);
            }
            id = self.doc[id].parent?;
        }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = match self.doc[id].first_child {
            Some(child) => Some(child),
            None => self.following(id),
        };
        Some(id)
    }
}
