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

//! Loading XML into a [`Document`] and writing it back out.

use crate::tree::{Document, NodeId, NodeKind};
use anyhow::{anyhow, bail, Context};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Entity references may expand to text containing other references.
/// Expansion stops with an error past this depth, which also catches
/// entities referring to themselves.
const MAX_ENTITY_DEPTH: usize = 16;

/// Upper bound on the entity text expanded while parsing one document.
const MAX_EXPANDED_BYTES: usize = 1024 * 1024;

/// How a document is turned into a tree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Keep references to declared entities as
    /// [`NodeKind::EntityReference`] nodes holding the expanded
    /// content, instead of substituting the content in place.
    pub keep_entities: bool,
}

/// Map byte offsets to 1-based line numbers.
enum Lines {
    Offsets(Vec<usize>),
    /// Expanded entity text is reported at the line of the reference.
    Fixed(usize),
}

impl Lines {
    fn new(text: &str) -> Self {
        Lines::Offsets(
            text.match_indices('\n')
                .map(|(offset, _)| offset)
                .collect(),
        )
    }

    fn line_at(&self, offset: usize) -> usize {
        match self {
            Lines::Offsets(offsets) => offsets.partition_point(|&o| o < offset) + 1,
            Lines::Fixed(line) => *line,
        }
    }
}

fn entity_declaration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = r#"(?x)
              <!ENTITY \s+
              (?<name>[^\s%"']+) \s+       # general entities only
              (?: "(?<double>[^"]*)" | '(?<single>[^']*)' )
              \s*>
        "#;
        Regex::new(pattern).expect("well-formed regex")
    })
}

fn is_predefined_entity(name: &str) -> bool {
    matches!(name, "lt" | "gt" | "amp" | "apos" | "quot")
}

/// Split a raw start tag like `<para id="x">` into name and raw
/// attribute text.
fn split_tag(markup: &str, empty: bool) -> (&str, &str) {
    let inner = markup
        .strip_prefix('<')
        .and_then(|m| m.strip_suffix('>'))
        .unwrap_or(markup);
    let inner = if empty {
        inner.strip_suffix('/').unwrap_or(inner)
    } else {
        inner
    };
    let name_end = inner
        .find(|c: char| c.is_whitespace())
        .unwrap_or(inner.len());
    inner.split_at(name_end)
}

struct Builder<'a> {
    doc: Document,
    options: &'a LoadOptions,
    entities: HashMap<String, String>,
    /// Bytes of entity values expanded so far.
    expanded: usize,
}

impl Builder<'_> {
    fn attach(&mut self, parent: Option<NodeId>, child: NodeId) {
        match parent {
            Some(parent) => self.doc.append_child(parent, child),
            None => self.doc.append_top_level(child),
        }
    }

    fn last_child(&self, parent: Option<NodeId>) -> Option<NodeId> {
        match parent {
            Some(parent) => self.doc[parent].last_child(),
            None => self.doc.top_level().last(),
        }
    }

    /// Append text, merging it into a directly preceding text node.
    fn append_text(&mut self, parent: Option<NodeId>, text: &str, line: usize) {
        if text.is_empty() {
            return;
        }
        match self.last_child(parent) {
            Some(last) if self.doc[last].kind() == NodeKind::Text => {
                self.doc.push_content(last, text);
            }
            _ => {
                let id = self.doc.create_text(text, line);
                self.attach(parent, id);
            }
        }
    }

    fn flush_text(&mut self, parent: Option<NodeId>, raw: &str, line: usize) -> anyhow::Result<()> {
        let text = quick_xml::escape::unescape(raw)
            .with_context(|| format!("Invalid character reference on line {line}"))?;
        self.append_text(parent, &text, line);
        Ok(())
    }

    /// Add character data which may contain entity references.
    fn add_text(
        &mut self,
        parent: Option<NodeId>,
        raw: &str,
        line: usize,
        depth: usize,
    ) -> anyhow::Result<()> {
        // Text with only predefined entities and character references,
        // unescaped in one go once a declared entity interrupts it.
        let mut pending = String::new();
        let mut rest = raw;
        while let Some(amp) = rest.find('&') {
            let after = &rest[amp + 1..];
            let semicolon = after
                .find(';')
                .ok_or_else(|| anyhow!("Unterminated entity reference on line {line}"))?;
            let name = &after[..semicolon];
            pending.push_str(&rest[..amp]);
            if name.starts_with('#') || is_predefined_entity(name) {
                pending.push_str(&rest[amp..amp + semicolon + 2]);
            } else {
                self.flush_text(parent, &pending, line)?;
                pending.clear();
                self.add_entity_reference(parent, name, line, depth)?;
            }
            rest = &after[semicolon + 1..];
        }
        pending.push_str(rest);
        self.flush_text(parent, &pending, line)
    }

    fn add_entity_reference(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        line: usize,
        depth: usize,
    ) -> anyhow::Result<()> {
        let Some(value) = self.entities.get(name).cloned() else {
            log::warn!("Reference to undeclared entity &{name}; on line {line}");
            let id = self.doc.create_entity_reference(name, line);
            self.attach(parent, id);
            return Ok(());
        };
        if depth >= MAX_ENTITY_DEPTH {
            bail!("Entity &{name}; on line {line} is nested too deeply");
        }
        self.expanded += value.len();
        if self.expanded > MAX_EXPANDED_BYTES {
            bail!("Entity &{name}; on line {line} expands to too much text");
        }

        let lines = Lines::Fixed(line);
        let container = if self.options.keep_entities {
            let id = self.doc.create_entity_reference(name, line);
            self.attach(parent, id);
            Some(id)
        } else {
            parent
        };
        self.parse_content(&value, container, &lines, depth + 1)
            .with_context(|| format!("Could not expand entity &{name};"))
    }

    /// Record the internal general entities declared in `markup` and
    /// add them as declarations below the `doctype` node.
    fn add_entity_declarations(
        &mut self,
        doctype: NodeId,
        markup: &str,
        start: usize,
        lines: &Lines,
    ) {
        for captures in entity_declaration_regex().captures_iter(markup) {
            let name = &captures["name"];
            let value = captures
                .name("double")
                .or_else(|| captures.name("single"))
                .map_or("", |m| m.as_str());
            let offset = captures.get(0).map_or(0, |m| m.start());
            log::debug!("Found declaration of entity &{name};");

            let id = self
                .doc
                .create_entity_declaration(name, value, lines.line_at(start + offset));
            self.doc.append_child(doctype, id);
            // The first declaration of an entity is binding.
            self.entities
                .entry(String::from(name))
                .or_insert_with(|| String::from(value));
        }
    }

    /// Parse `text` and add the resulting nodes below `container`, or
    /// at the top level when there is no container.
    fn parse_content(
        &mut self,
        text: &str,
        container: Option<NodeId>,
        lines: &Lines,
        depth: usize,
    ) -> anyhow::Result<()> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);
        let mut open: Vec<NodeId> = Vec::new();

        loop {
            let start = usize::try_from(reader.buffer_position())?;
            let line = lines.line_at(start);
            let event = reader
                .read_event()
                .with_context(|| format!("Could not parse XML on line {line}"))?;
            let end = usize::try_from(reader.buffer_position())?;
            let markup = &text[start..end];
            let parent = open.last().copied().or(container);

            match event {
                Event::Start(_) | Event::Empty(_) => {
                    let empty = matches!(event, Event::Empty(_));
                    let (name, attributes) = split_tag(markup, empty);
                    let id = self
                        .doc
                        .create_element_with_attributes(name, attributes, line);
                    self.attach(parent, id);
                    if !empty {
                        open.push(id);
                    }
                }
                Event::End(_) => {
                    if open.pop().is_none() {
                        bail!("Unexpected end tag {markup} on line {line}");
                    }
                }
                Event::Text(_) => self.add_text(parent, markup, line, depth)?,
                Event::CData(_) => {
                    let content = markup
                        .strip_prefix("<![CDATA[")
                        .and_then(|m| m.strip_suffix("]]>"))
                        .unwrap_or_default();
                    self.append_text(parent, content, line);
                }
                Event::DocType(_) => {
                    let id = self.doc.create_other(markup, line);
                    self.attach(parent, id);
                    self.add_entity_declarations(id, markup, start, lines);
                }
                Event::Comment(_) | Event::PI(_) | Event::Decl(_) => {
                    let id = self.doc.create_other(markup, line);
                    self.attach(parent, id);
                }
                Event::Eof => break,
            }
        }

        if let Some(&unclosed) = open.last() {
            bail!(
                "Element <{}> opened on line {} is never closed",
                self.doc[unclosed].name(),
                self.doc[unclosed].line()
            );
        }
        Ok(())
    }
}

impl Document {
    /// Parse an XML document.
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_i18n_tool::tree::{Document, NodeKind};
    /// use doc_i18n_tool::xml::LoadOptions;
    ///
    /// let doc = Document::parse("<para>Hello &amp; welcome</para>", &LoadOptions::default())?;
    /// let para = doc.root_element().unwrap();
    /// assert_eq!(doc[para].name(), "para");
    /// assert_eq!(doc.text_content(para), "Hello & welcome");
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn parse(text: &str, options: &LoadOptions) -> anyhow::Result<Document> {
        let mut builder = Builder {
            doc: Document::new(),
            options,
            entities: HashMap::new(),
            expanded: 0,
        };
        builder.parse_content(text, None, &Lines::new(text), 0)?;
        if builder.doc.root_element().is_none() {
            bail!("Document has no root element");
        }
        Ok(builder.doc)
    }

    /// Serialize the document back to XML.
    ///
    /// Entity references are written as references, so text inside
    /// them is not written out.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        for id in self.top_level() {
            self.write_subtree(id, &mut out);
        }
        out
    }

    fn write_subtree(&self, top: NodeId, out: &mut String) {
        let mut cur = top;
        loop {
            let node = &self[cur];
            match node.kind() {
                NodeKind::Element if node.has_children() => {
                    out.push('<');
                    out.push_str(node.name());
                    out.push_str(node.attributes());
                    out.push('>');
                }
                NodeKind::Element => {
                    out.push('<');
                    out.push_str(node.name());
                    out.push_str(node.attributes());
                    out.push_str("/>");
                }
                NodeKind::Text => out.push_str(&quick_xml::escape::partial_escape(node.content())),
                NodeKind::EntityReference => {
                    out.push('&');
                    out.push_str(node.name());
                    out.push(';');
                }
                NodeKind::Other => out.push_str(node.content()),
                NodeKind::EntityDeclaration => {}
            }

            if node.kind() == NodeKind::Element {
                if let Some(child) = node.first_child() {
                    cur = child;
                    continue;
                }
            }

            // Close elements until a sibling is found.
            loop {
                if cur == top {
                    return;
                }
                if let Some(next) = self[cur].next_sibling() {
                    cur = next;
                    break;
                }
                let Some(parent) = self[cur].parent() else {
                    return;
                };
                cur = parent;
                out.push_str("</");
                out.push_str(self[cur].name());
                out.push('>');
            }
        }
    }
}

/// Read and parse the XML file at `path`.
pub fn load(path: &Path, options: &LoadOptions) -> anyhow::Result<Document> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    Document::parse(&text, options)
        .with_context(|| format!("Could not parse {} as XML", path.display()))
}
