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

//! Writing GNU Gettext template (POT) files.
//!
//! The output is written line by line as the document is walked. The
//! header carries the usual placeholders which translators fill in.

use std::io::{self, Write};

/// Write the template header for `file_name`.
///
/// # Examples
///
/// ```
/// let mut out = Vec::new();
/// doc_i18n_tool::pot::write_header(&mut out, "guide.xml")?;
/// let header = String::from_utf8(out).unwrap();
/// assert_eq!(header.lines().count(), 6);
/// assert!(header.starts_with("# SOME DESCRIPTIVE TITLE\n"));
/// assert!(header.ends_with("#\n# guide.xml\n\n"));
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn write_header<W: Write>(out: &mut W, file_name: &str) -> io::Result<()> {
    writeln!(out, "# SOME DESCRIPTIVE TITLE")?;
    writeln!(out, "# Copyright (C) YEAR Free Software Foundation, Inc.")?;
    writeln!(out, "# FIRST AUTHOR <EMAIL@ADDRESS>, YEAR.")?;
    writeln!(out, "#\n# {file_name}\n")
}

/// Write a single template entry.
///
/// The `msgid` must already be escaped, see
/// [`escape_msgid`](crate::strings::escape_msgid).
pub fn write_entry<W: Write>(
    out: &mut W,
    file_name: &str,
    lineno: usize,
    msgid: &str,
) -> io::Result<()> {
    writeln!(out, "#: {file_name}:{lineno}")?;
    writeln!(out, "msgid \"{msgid}\"")?;
    writeln!(out, "msgstr \"\"\n")
}
