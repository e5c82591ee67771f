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

//! Pre-order traversal of a document.
//!
//! The walk keeps a cursor and moves with the parent and sibling links
//! of the tree. Only the children of an entity reference are walked in
//! a nested traversal, so the nesting depth is bounded by the nesting
//! of entities rather than the depth of the document.

use crate::collapse::collapse;
use crate::strings::StringProcessor;
use crate::tree::{Document, NodeId, NodeKind};
use std::io::{self, Write};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

struct Walker<'p, 'a, W> {
    processor: &'p mut StringProcessor<'a, W>,
    source_file: &'p str,
    line: usize,
}

impl<W: Write> Walker<'_, '_, W> {
    /// Walk from `start` until the traversal climbs back to `bound`.
    /// The siblings of `bound` are never visited.
    fn walk_from(&mut self, doc: &mut Document, bound: NodeId, start: NodeId) -> io::Result<Flow> {
        let mut cursor = start;
        loop {
            self.visit(doc, cursor)?;
            match doc[cursor].kind() {
                NodeKind::EntityReference => {
                    if let Some(first) = doc[cursor].first_child() {
                        if self.walk_from(doc, cursor, first)? == Flow::Stop {
                            return Ok(Flow::Stop);
                        }
                    }
                }
                NodeKind::EntityDeclaration => {
                    log::debug!(
                        "Stopping at the declaration of entity {:?} on line {}",
                        doc[cursor].name(),
                        self.line
                    );
                    return Ok(Flow::Stop);
                }
                _ => {
                    if let Some(child) = doc[cursor].first_child() {
                        cursor = child;
                        continue;
                    }
                }
            }
            match following(doc, bound, cursor) {
                Some(next) => cursor = next,
                None => return Ok(Flow::Continue),
            }
        }
    }

    /// Strings are reported at the line of the last element visited.
    fn visit(&mut self, doc: &mut Document, id: NodeId) -> io::Result<()> {
        match doc[id].kind() {
            NodeKind::Element => {
                self.line = doc[id].line();
                collapse(doc, id, &self.processor.config().presentation_elements);
            }
            NodeKind::Text => {
                let translated = self
                    .processor
                    .process(doc[id].content(), self.source_file, self.line)?;
                if let Some(translated) = translated {
                    doc.set_content(id, translated);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// The next node in pre-order after the subtree of `id`, without
/// leaving the subtree of `bound`.
fn following(doc: &Document, bound: NodeId, mut id: NodeId) -> Option<NodeId> {
    loop {
        if id == bound {
            return None;
        }
        if let Some(next) = doc[id].next_sibling() {
            return Some(next);
        }
        id = doc[id].parent()?;
    }
}

/// Walk the subtree of `root` in document order.
///
/// Elements are collapsed when all their element children are
/// presentational, then every text node is handed to `processor`. In
/// translation mode the text is replaced by its translation. The walk
/// stops entirely at the first entity declaration.
///
/// # Examples
///
/// ```
/// use doc_i18n_tool::catalog::Identity;
/// use doc_i18n_tool::strings::StringProcessor;
/// use doc_i18n_tool::tree::Document;
/// use doc_i18n_tool::xml::LoadOptions;
/// use doc_i18n_tool::{walk::walk, Config, ExtractionMode};
///
/// let mut doc = Document::parse("<a><b>One</b><c>Two</c></a>", &LoadOptions::default())?;
/// let config = Config {
///     mode: ExtractionMode::EmitTemplate,
///     ..Config::default()
/// };
/// let mut processor = StringProcessor::new(&config, &Identity, Vec::new());
/// let root = doc.root_element().unwrap();
/// walk(&mut doc, root, "doc.xml", &mut processor)?;
/// assert_eq!(processor.entries(), 2);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn walk<W: Write>(
    doc: &mut Document,
    root: NodeId,
    source_file: &str,
    processor: &mut StringProcessor<'_, W>,
) -> io::Result<()> {
    let line = doc[root].line();
    let mut walker = Walker {
        processor,
        source_file,
        line,
    };
    walker.walk_from(doc, root, root)?;
    Ok(())
}
