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

//! Translate DocBook documents or extract their strings into a POT
//! file.
//!
//! By default every document is translated with the catalog of the
//! current locale and written to stdout. With `--output-pot-file` a
//! template for the document is written instead.

use anyhow::Context;
use clap::Parser;
use doc_i18n_tool::catalog::{
    find_catalog, language_candidates, languages_from_env, load_catalog, Identity, Translator,
};
use doc_i18n_tool::xml::{self, LoadOptions};
use doc_i18n_tool::{process_document, Config, ExtractionMode};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Clone, Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Output a POT file for the documents instead of translating them.
    #[arg(short = 'p', long)]
    output_pot_file: bool,
    /// File name to use in the POT file instead of the real one.
    #[arg(short = 'f', long = "filename", value_name = "NAME")]
    filename: Option<String>,
    /// Keep entity references instead of substituting them.
    #[arg(short = 'n', long)]
    noent: bool,
    /// Text domain of the catalogs.
    #[arg(short = 'g', long, value_name = "PACKAGE")]
    package: Option<String>,
    /// Directory holding the catalogs.
    #[arg(short = 'l', long, value_name = "LOCALEDIR", default_value = ".")]
    localedir: PathBuf,
    /// Language to translate to, instead of the one from the environment.
    #[arg(long, value_name = "LANG")]
    lang: Option<String>,
    /// PO file to translate with. Takes precedence over --package.
    #[arg(long, value_name = "FILE")]
    po: Option<PathBuf>,
    /// Additional element to merge into the surrounding text.
    #[arg(short = 'e', long = "presentation-element", value_name = "NAME")]
    presentation_elements: Vec<String>,
    files: Vec<PathBuf>,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config {
            mode: if self.output_pot_file {
                ExtractionMode::EmitTemplate
            } else {
                ExtractionMode::Translate
            },
            alternate_file_name: self.filename.clone(),
            ..Config::default()
        };
        config
            .presentation_elements
            .extend(self.presentation_elements.iter().cloned());
        config
    }

    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            keep_entities: self.noent,
        }
    }

    /// Find the catalog to translate with.
    fn translator(&self) -> anyhow::Result<Box<dyn Translator>> {
        if let Some(po) = &self.po {
            log::debug!("Using catalog {}", po.display());
            return Ok(Box::new(load_catalog(po)?));
        }
        let Some(package) = &self.package else {
            log::warn!("Neither --package nor --po given, documents are left untranslated");
            return Ok(Box::new(Identity));
        };
        let languages = match &self.lang {
            Some(lang) => language_candidates(lang),
            None => languages_from_env(),
        };
        if languages.is_empty() {
            log::debug!("Translation is disabled by the locale");
            return Ok(Box::new(Identity));
        }
        match find_catalog(&self.localedir, package, &languages) {
            Some(path) => {
                log::debug!("Using catalog {}", path.display());
                Ok(Box::new(load_catalog(&path)?))
            }
            None => {
                log::warn!(
                    "No catalog for {package} in {} for {}",
                    self.localedir.display(),
                    languages.join(", ")
                );
                Ok(Box::new(Identity))
            }
        }
    }
}

/// Translate or extract the document at `path`, writing the result to
/// `out`.
fn process_file<W: Write>(
    path: &Path,
    config: &Config,
    options: &LoadOptions,
    translator: &dyn Translator,
    mut out: W,
) -> anyhow::Result<()> {
    let source_file = path.display().to_string();
    let mut doc = xml::load(path, options)?;
    process_document(&mut doc, &source_file, config, translator, &mut out)
        .with_context(|| format!("Could not process {source_file}"))?;
    if config.mode == ExtractionMode::Translate {
        out.write_all(doc.to_xml().as_bytes())?;
    }
    Ok(())
}

/// Process every file named in `args`, returning the exit status.
///
/// Processing stops at the first file which does not exist, after the
/// output for the files before it has been written.
fn run<W: Write>(args: &Args, mut out: W) -> anyhow::Result<i32> {
    let config = args.config();
    let options = args.load_options();
    let translator: Box<dyn Translator> = match config.mode {
        ExtractionMode::Translate if !args.files.is_empty() => args.translator()?,
        _ => Box::new(Identity),
    };

    for path in &args.files {
        if !path.is_file() {
            writeln!(out, "File {} doesn't exist", path.display())?;
            return Ok(1);
        }
        process_file(path, &config, &options, translator.as_ref(), &mut out)?;
    }
    Ok(0)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut stdout = io::stdout().lock();
    let status = run(&args, &mut stdout)?;
    stdout.flush()?;
    if status != 0 {
        process::exit(status);
    }

    Ok(())
}
