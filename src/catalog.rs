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

//! Translation lookup with Gettext PO files.

use anyhow::{anyhow, bail, Context};
use polib::catalog::Catalog;
use polib::po_file;
use std::fs;
use std::path::{Path, PathBuf};

/// Header fields polib needs in order to read a PO file.
const REQUIRED_HEADERS: &[&str] = &[
    "Project-Id-Version",
    "POT-Creation-Date",
    "PO-Revision-Date",
    "Language-Team",
    "MIME-Version",
    "Content-Type",
    "Content-Transfer-Encoding",
    "Language",
    "Plural-Forms",
];

/// Looks up the translation of a message.
pub trait Translator {
    /// Return the translation of `msgid`, or `msgid` itself when there
    /// is none.
    fn translate<'a>(&'a self, msgid: &'a str) -> &'a str;
}

/// A translator which leaves every message untranslated.
#[derive(Debug, Default, Copy, Clone)]
pub struct Identity;

impl Translator for Identity {
    fn translate<'a>(&'a self, msgid: &'a str) -> &'a str {
        msgid
    }
}

/// Fuzzy and empty translations are ignored.
impl Translator for Catalog {
    fn translate<'a>(&'a self, msgid: &'a str) -> &'a str {
        self.find_message(None, msgid, None)
            .filter(|msg| !msg.flags().is_fuzzy())
            .and_then(|msg| msg.msgstr().ok())
            .filter(|msgstr| !msgstr.is_empty())
            .unwrap_or(msgid)
    }
}

/// The required header fields missing from the header entry of
/// `content`: the lines from `msgid ""` up to the next blank line.
fn missing_headers(content: &str) -> Vec<&'static str> {
    let present = content
        .lines()
        .skip_while(|line| line.trim() != "msgid \"\"")
        .take_while(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let line = line.trim();
            let line = line.strip_prefix("msgstr").unwrap_or(line).trim_start();
            let (key, _) = line.strip_prefix('"')?.split_once(':')?;
            Some(key.trim())
        })
        .collect::<Vec<_>>();
    REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|header| !present.contains(header))
        .collect()
}

/// Parse the PO file at `path`.
///
/// Files lacking one of the header fields polib relies on are
/// rejected with an error.
pub fn load_catalog(path: &Path) -> anyhow::Result<Catalog> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Could not read {:?}", path))?;
    let missing = missing_headers(&content);
    if !missing.is_empty() {
        bail!(
            "Could not parse {:?} as PO file: missing header fields {}",
            path,
            missing.join(", ")
        );
    }
    po_file::parse(path)
        .map_err(|err| anyhow!("{err}"))
        .with_context(|| format!("Could not parse {:?} as PO file", path))
}

/// Derive the language names to try for the locale `value`.
///
/// The codeset and modifier are dropped, then the territory. The `C`
/// and `POSIX` locales have no translations.
///
/// # Examples
///
/// ```
/// use doc_i18n_tool::catalog::language_candidates;
///
/// assert_eq!(language_candidates("de_DE.UTF-8@euro"), ["de_DE", "de"]);
/// assert_eq!(language_candidates("fr"), ["fr"]);
/// assert!(language_candidates("C.UTF-8").is_empty());
/// ```
pub fn language_candidates(value: &str) -> Vec<String> {
    let language = value
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim();
    if language.is_empty() || language == "C" || language == "POSIX" {
        return Vec::new();
    }
    let mut candidates = vec![String::from(language)];
    if let Some((base, _)) = language.split_once('_') {
        if !base.is_empty() {
            candidates.push(String::from(base));
        }
    }
    candidates
}

/// Resolve the preferred languages from environment variables read
/// through `lookup`.
///
/// The locale is the first non-empty of `LC_ALL`, `LC_MESSAGES` and
/// `LANG`. A `C` or `POSIX` locale disables translation altogether.
/// Otherwise the colon separated entries of `LANGUAGE` come first,
/// followed by the locale.
pub fn languages_from<F>(lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|value| !value.is_empty());
    let locale = ["LC_ALL", "LC_MESSAGES", "LANG"]
        .into_iter()
        .find_map(&var);
    if let Some(locale) = &locale {
        if language_candidates(locale).is_empty() {
            return Vec::new();
        }
    }

    let mut languages: Vec<String> = Vec::new();
    let entries = var("LANGUAGE").unwrap_or_default();
    for entry in entries.split(':').chain(locale.as_deref()) {
        for candidate in language_candidates(entry) {
            if !languages.contains(&candidate) {
                languages.push(candidate);
            }
        }
    }
    languages
}

/// Resolve the preferred languages from the process environment.
pub fn languages_from_env() -> Vec<String> {
    languages_from(|name| std::env::var(name).ok())
}

/// Find the PO file for `package` below `localedir`.
///
/// For each language in order, `<localedir>/<lang>/LC_MESSAGES/<package>.po`
/// is tried before `<localedir>/<lang>.po`.
pub fn find_catalog(localedir: &Path, package: &str, languages: &[String]) -> Option<PathBuf> {
    languages.iter().find_map(|language| {
        [
            localedir
                .join(language)
                .join("LC_MESSAGES")
                .join(format!("{package}.po")),
            localedir.join(format!("{language}.po")),
        ]
        .into_iter()
        .find(|path| path.is_file())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polib::message::{Message, MessageFlags};
    use polib::metadata::CatalogMetadata;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::fs;

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

    fn environment(vars: &[(&str, &str)]) -> Vec<String> {
        let vars = vars
            .iter()
            .map(|(name, value)| (String::from(*name), String::from(*value)))
            .collect::<HashMap<_, _>>();
        languages_from(|name| vars.get(name).cloned())
    }

    const PO_FILE: &str = "\
msgid \"\"
msgstr \"\"
\"Project-Id-Version: Gedit Help\\n\"
\"POT-Creation-Date: 2023-06-01 10:00+0200\\n\"
\"PO-Revision-Date: 2023-06-12 18:30+0200\\n\"
\"Last-Translator: Translator <translator@example.com>\\n\"
\"Language-Team: German\\n\"
\"Language: de\\n\"
\"MIME-Version: 1.0\\n\"
\"Content-Type: text/plain; charset=UTF-8\\n\"
\"Content-Transfer-Encoding: 8bit\\n\"
\"Plural-Forms: nplurals=2; plural=(n != 1);\\n\"

msgid \"Open\"
msgstr \"Öffnen\"
";

    #[test]
    fn test_identity() {
        assert_eq!(Identity.translate("Open"), "Open");
        assert_eq!(Identity.translate(""), "");
    }

    #[test]
    fn test_catalog_translate() {
        let catalog = create_catalog(&[("Open", "Öffnen"), ("Save", "")]);
        assert_eq!(catalog.translate("Open"), "Öffnen");
        // Empty translations and unknown messages fall back to the msgid.
        assert_eq!(catalog.translate("Save"), "Save");
        assert_eq!(catalog.translate("Quit"), "Quit");
    }

    #[test]
    fn test_catalog_ignores_fuzzy() {
        let mut flags = MessageFlags::new();
        flags.add_flag("fuzzy");
        let mut catalog = create_catalog(&[]);
        catalog.append_or_update(
            Message::build_singular()
                .with_msgid(String::from("Open"))
                .with_msgstr(String::from("Öffnen"))
                .with_flags(flags)
                .done(),
        );
        assert_eq!(catalog.translate("Open"), "Open");
    }

    #[test]
    fn test_load_catalog() -> anyhow::Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let path = tmpdir.path().join("de.po");
        fs::write(&path, PO_FILE)?;
        let catalog = load_catalog(&path)?;
        assert_eq!(catalog.translate("Open"), "Öffnen");
        Ok(())
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let tmpdir = tempfile::tempdir().unwrap();
        let Err(err) = load_catalog(&tmpdir.path().join("missing.po")) else {
            panic!("Loading a missing file should fail");
        };
        assert!(format!("{err:#}").contains("Could not read"));
    }

    #[test]
    fn test_load_catalog_without_full_header() -> anyhow::Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let path = tmpdir.path().join("de.po");
        fs::write(
            &path,
            "msgid \"\"\n\
             msgstr \"\"\n\
             \"Language: de\\n\"\n\
             \"Content-Type: text/plain; charset=UTF-8\\n\"\n\
             \n\
             msgid \"Open\"\n\
             msgstr \"Öffnen\"\n",
        )?;
        let Err(err) = load_catalog(&path) else {
            panic!("Loading a PO file without a full header should fail");
        };
        let message = format!("{err:#}");
        assert!(message.contains("missing header fields"));
        assert!(message.contains("POT-Creation-Date"));
        assert!(message.contains("Language-Team"));
        assert!(!message.contains("Content-Type"));
        Ok(())
    }

    #[test]
    fn test_missing_headers() {
        assert!(missing_headers(PO_FILE).is_empty());
        assert_eq!(missing_headers(""), REQUIRED_HEADERS);
        // Only the header entry counts.
        let content = "msgid \"\"\n\
                       msgstr \"Language: de\\n\"\n\
                       \n\
                       \"Language-Team: x\\n\"\n";
        assert_eq!(missing_headers(content).len(), REQUIRED_HEADERS.len() - 1);

        let commented = format!("# German translation\n\n{PO_FILE}");
        assert!(missing_headers(&commented).is_empty());
    }

    #[test]
    fn test_language_candidates() {
        assert_eq!(language_candidates("pt_BR"), ["pt_BR", "pt"]);
        assert_eq!(language_candidates("sr_RS@latin"), ["sr_RS", "sr"]);
        assert_eq!(language_candidates("de.UTF-8"), ["de"]);
        assert!(language_candidates("").is_empty());
        assert!(language_candidates("POSIX").is_empty());
    }

    #[test]
    fn test_languages_from_locale_variables() {
        assert_eq!(environment(&[("LANG", "de_DE.UTF-8")]), ["de_DE", "de"]);
        assert_eq!(
            environment(&[("LANG", "de_DE.UTF-8"), ("LC_MESSAGES", "fr_FR")]),
            ["fr_FR", "fr"]
        );
        assert_eq!(
            environment(&[("LC_ALL", "it"), ("LC_MESSAGES", "fr_FR"), ("LANG", "de")]),
            ["it"]
        );
        assert!(environment(&[]).is_empty());
    }

    #[test]
    fn test_languages_from_language_list() {
        assert_eq!(
            environment(&[("LANGUAGE", "pt_BR:es"), ("LANG", "de_DE.UTF-8")]),
            ["pt_BR", "pt", "es", "de_DE", "de"]
        );
        assert_eq!(
            environment(&[("LANGUAGE", "de:de_AT"), ("LANG", "de_DE")]),
            ["de", "de_AT", "de_DE"]
        );
    }

    #[test]
    fn test_c_locale_disables_translation() {
        assert!(environment(&[("LANGUAGE", "de"), ("LC_ALL", "C")]).is_empty());
        assert!(environment(&[("LANG", "POSIX")]).is_empty());
    }

    #[test]
    fn test_find_catalog() -> anyhow::Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let localedir = tmpdir.path();
        fs::create_dir_all(localedir.join("de/LC_MESSAGES"))?;
        fs::write(localedir.join("de/LC_MESSAGES/gedit.po"), PO_FILE)?;
        fs::write(localedir.join("de.po"), PO_FILE)?;
        fs::write(localedir.join("fr.po"), PO_FILE)?;

        let languages = |names: &[&str]| names.iter().map(|s| String::from(*s)).collect::<Vec<_>>();
        assert_eq!(
            find_catalog(localedir, "gedit", &languages(&["de_DE", "de"])),
            Some(localedir.join("de/LC_MESSAGES/gedit.po"))
        );
        assert_eq!(
            find_catalog(localedir, "other", &languages(&["de"])),
            Some(localedir.join("de.po"))
        );
        assert_eq!(
            find_catalog(localedir, "gedit", &languages(&["es", "fr"])),
            Some(localedir.join("fr.po"))
        );
        assert_eq!(find_catalog(localedir, "gedit", &languages(&["es"])), None);
        assert_eq!(find_catalog(localedir, "gedit", &[]), None);
        Ok(())
    }
}
