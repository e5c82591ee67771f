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

//! Handling of the individual strings found in a document.

use crate::catalog::Translator;
use crate::{pot, Config, ExtractionMode};
use std::io::{self, Write};

/// Escape `text` for use as a `msgid` in a template.
///
/// Double quotes are escaped and the text is split into continuation
/// lines after each newline. Everything else is kept as is.
///
/// # Examples
///
/// ```
/// use doc_i18n_tool::strings::escape_msgid;
///
/// assert_eq!(
///     escape_msgid("He said \"hi\"\nBye"),
///     "He said \\\"hi\\\"\\n\"\n\"Bye"
/// );
/// ```
pub fn escape_msgid(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => escaped.push_str("\\n\"\n\""),
            '"' => escaped.push_str("\\\""),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Turns the text of a node into a template entry or a translation,
/// depending on the [`ExtractionMode`].
pub struct StringProcessor<'a, W> {
    config: &'a Config,
    translator: &'a dyn Translator,
    output: W,
    entries: usize,
}

impl<'a, W: Write> StringProcessor<'a, W> {
    pub fn new(config: &'a Config, translator: &'a dyn Translator, output: W) -> Self {
        Self {
            config,
            translator,
            output,
            entries: 0,
        }
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Number of template entries written so far.
    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Process the text `raw` found at `source_file:lineno`.
    ///
    /// When translating, the translated text is returned. When
    /// emitting a template, an entry is written to the output and
    /// `None` is returned. Empty and blank strings are not treated
    /// specially.
    pub fn process(
        &mut self,
        raw: &str,
        source_file: &str,
        lineno: usize,
    ) -> io::Result<Option<String>> {
        match self.config.mode {
            ExtractionMode::Translate => Ok(Some(String::from(self.translator.translate(raw)))),
            ExtractionMode::EmitTemplate => {
                let file_name = self.config.file_name(source_file);
                pot::write_entry(&mut self.output, file_name, lineno, &escape_msgid(raw))?;
                self.entries += 1;
                Ok(None)
            }
        }
    }

    /// Write the template header when emitting a template.
    pub fn begin_document(&mut self, source_file: &str) -> io::Result<()> {
        match self.config.mode {
            ExtractionMode::Translate => Ok(()),
            ExtractionMode::EmitTemplate => {
                pot::write_header(&mut self.output, self.config.file_name(source_file))
            }
        }
    }
}
