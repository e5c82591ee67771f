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

//! Helpers for translating DocBook documents.
//!
//! The functions here are used to implement a Gettext based
//! internationalization (i18n) workflow for DocBook XML: the text of a
//! document is extracted into a template (POT) file for translators,
//! and the translated catalogs are later used to produce a translated
//! copy of the document.
//!
//! Presentational elements such as `<accel>` are merged into the
//! surrounding text, so that `_<accel>O</accel>pen` is seen by
//! translators as the single string `_Open`.

pub mod catalog;
pub mod collapse;
pub mod pot;
pub mod strings;
pub mod tree;
pub mod walk;
pub mod xml;

use catalog::Translator;
use collapse::PresentationElements;
use std::io::{self, Write};
use strings::StringProcessor;
use tree::Document;

/// What to do with the strings of a document.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Replace every string with its translation.
    #[default]
    Translate,
    /// Write every string to a template file.
    EmitTemplate,
}

/// Settings for processing documents.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: ExtractionMode,
    /// File name to use in the template instead of the name of the
    /// processed file.
    pub alternate_file_name: Option<String>,
    pub presentation_elements: PresentationElements,
}

impl Config {
    /// The file name to report for strings from `source_file`.
    pub fn file_name<'a>(&'a self, source_file: &'a str) -> &'a str {
        self.alternate_file_name.as_deref().unwrap_or(source_file)
    }
}

/// Extract or translate the strings of `doc`.
///
/// In [`ExtractionMode::EmitTemplate`] mode, a template header and an
/// entry per string are written to `output`. In
/// [`ExtractionMode::Translate`] mode, the strings of `doc` are
/// replaced by their translations and nothing is written.
///
/// The number of template entries written is returned. A document
/// without a root element is left alone.
///
/// # Examples
///
/// ```
/// use doc_i18n_tool::catalog::Identity;
/// use doc_i18n_tool::tree::Document;
/// use doc_i18n_tool::xml::LoadOptions;
/// use doc_i18n_tool::{process_document, Config, ExtractionMode};
///
/// let mut doc = Document::parse(
///     "<para>Press <accel>Q</accel> to quit</para>",
///     &LoadOptions::default(),
/// )?;
/// let config = Config {
///     mode: ExtractionMode::EmitTemplate,
///     ..Config::default()
/// };
/// let mut output = Vec::new();
/// let entries = process_document(&mut doc, "quit.xml", &config, &Identity, &mut output)?;
/// assert_eq!(entries, 1);
/// let template = String::from_utf8(output)?;
/// assert!(template.ends_with(
///     "#: quit.xml:1\nmsgid \"Press Q to quit\"\nmsgstr \"\"\n\n"
/// ));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn process_document<W: Write>(
    doc: &mut Document,
    source_file: &str,
    config: &Config,
    translator: &dyn Translator,
    output: W,
) -> io::Result<usize> {
    let Some(root) = doc.root_element() else {
        log::debug!("{source_file} has no root element");
        return Ok(0);
    };
    log::info!("Processing {source_file} ({:?})", config.mode);
    let mut processor = StringProcessor::new(config, translator, output);
    processor.begin_document(source_file)?;
    walk::walk(doc, root, source_file, &mut processor)?;
    if config.mode == ExtractionMode::EmitTemplate {
        log::info!(
            "Wrote {} template entries for {source_file}",
            processor.entries()
        );
    }
    Ok(processor.entries())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Identity;
    use crate::xml::LoadOptions;
    use polib::catalog::Catalog;
    use polib::message::Message;
    use polib::metadata::CatalogMetadata;
    use pretty_assertions::assert_eq;

    const GUIDE: &str = "<?xml version=\"1.0\"?>
<!DOCTYPE article [
<!ENTITY app \"gedit\">
]>
<article>
  <title>Getting started</title>
  <para>Choose <guimenu>_<accel>F</accel>ile</guimenu> to begin.</para>
  <para>Welcome to &app;</para>
</article>
";

    fn create_catalog(translations: &[(&str, &str)]) -> Catalog {
        let mut catalog = Catalog::new(CatalogMetadata::new());
        for (msgid, msgstr) in translations {
            let message = Message::build_singular()
                .with_msgid(String::from(*msgid))
                .with_msgstr(String::from(*msgstr))
                .done();
            catalog.append_or_update(message);
        }
        catalog
    }

    #[track_caller]
    fn emit_template(text: &str, config: &Config) -> String {
        let mut doc = Document::parse(text, &LoadOptions::default()).unwrap();
        let mut output = Vec::new();
        process_document(&mut doc, "guide.xml", config, &Identity, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_file_name() {
        let mut config = Config::default();
        assert_eq!(config.file_name("a.xml"), "a.xml");
        config.alternate_file_name = Some(String::from("C/a.xml"));
        assert_eq!(config.file_name("a.xml"), "C/a.xml");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.mode, ExtractionMode::Translate);
        assert!(config.presentation_elements.contains("accel"));
        assert_eq!(config.alternate_file_name, None);
    }

    #[test]
    fn test_emit_template() {
        let config = Config {
            mode: ExtractionMode::EmitTemplate,
            ..Config::default()
        };
        assert_eq!(
            emit_template(GUIDE, &config),
            "# SOME DESCRIPTIVE TITLE\n\
             # Copyright (C) YEAR Free Software Foundation, Inc.\n\
             # FIRST AUTHOR <EMAIL@ADDRESS>, YEAR.\n\
             #\n\
             # guide.xml\n\
             \n\
             #: guide.xml:5\nmsgid \"\\n\"\n\"  \"\nmsgstr \"\"\n\n\
             #: guide.xml:6\nmsgid \"Getting started\"\nmsgstr \"\"\n\n\
             #: guide.xml:6\nmsgid \"\\n\"\n\"  \"\nmsgstr \"\"\n\n\
             #: guide.xml:7\nmsgid \"Choose \"\nmsgstr \"\"\n\n\
             #: guide.xml:7\nmsgid \"_File\"\nmsgstr \"\"\n\n\
             #: guide.xml:7\nmsgid \" to begin.\"\nmsgstr \"\"\n\n\
             #: guide.xml:7\nmsgid \"\\n\"\n\"  \"\nmsgstr \"\"\n\n\
             #: guide.xml:8\nmsgid \"Welcome to gedit\"\nmsgstr \"\"\n\n\
             #: guide.xml:8\nmsgid \"\\n\"\n\"\"\nmsgstr \"\"\n\n"
        );
    }

    #[test]
    fn test_emit_template_alternate_file_name() {
        let config = Config {
            mode: ExtractionMode::EmitTemplate,
            alternate_file_name: Some(String::from("C/index.xml")),
            ..Config::default()
        };
        let template = emit_template("<para>Hello</para>", &config);
        assert!(template.contains("\n# C/index.xml\n"));
        assert!(template.ends_with("#: C/index.xml:1\nmsgid \"Hello\"\nmsgstr \"\"\n\n"));
    }

    #[test]
    fn test_translate_document() -> anyhow::Result<()> {
        let catalog = create_catalog(&[
            ("Getting started", "Erste Schritte"),
            ("_File", "_Datei"),
            ("Welcome to gedit", "Willkommen bei gedit"),
        ]);
        let mut doc = Document::parse(GUIDE, &LoadOptions::default())?;
        let mut output = Vec::new();
        let entries =
            process_document(&mut doc, "guide.xml", &Config::default(), &catalog, &mut output)?;
        assert_eq!(entries, 0);
        assert!(output.is_empty());
        assert_eq!(
            doc.to_xml(),
            "<?xml version=\"1.0\"?>
<!DOCTYPE article [
<!ENTITY app \"gedit\">
]>
<article>
  <title>Erste Schritte</title>
  <para>Choose <guimenu>_Datei</guimenu> to begin.</para>
  <para>Willkommen bei gedit</para>
</article>
"
        );
        Ok(())
    }

    #[test]
    fn test_undeclared_entity_is_kept() -> anyhow::Result<()> {
        let source = "<article><para>Welcome to &GNOME; desktop</para></article>";
        let config = Config {
            mode: ExtractionMode::EmitTemplate,
            ..Config::default()
        };
        let template = emit_template(source, &config);
        assert!(template.ends_with(
            "#: guide.xml:1\nmsgid \"Welcome to \"\nmsgstr \"\"\n\n\
             #: guide.xml:1\nmsgid \" desktop\"\nmsgstr \"\"\n\n"
        ));

        let catalog = create_catalog(&[("Welcome to ", "Willkommen bei ")]);
        let mut doc = Document::parse(source, &LoadOptions::default())?;
        process_document(&mut doc, "guide.xml", &Config::default(), &catalog, io::sink())?;
        assert_eq!(
            doc.to_xml(),
            "<article><para>Willkommen bei &GNOME; desktop</para></article>"
        );
        Ok(())
    }

    #[test]
    fn test_document_without_root() {
        let mut doc = Document::new();
        let mut output = Vec::new();
        let config = Config {
            mode: ExtractionMode::EmitTemplate,
            ..Config::default()
        };
        assert_eq!(
            process_document(&mut doc, "empty.xml", &config, &Identity, &mut output).unwrap(),
            0
        );
        assert!(output.is_empty());
    }
}
