// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config diagnostics: figment errors rendered through miette.
//!
//! Unknown keys and wrong value types are pointed at in the TOML source when
//! the offending file is known. Typos get a "did you mean" hint ranked by
//! Jaro-Winkler similarity against the keys the table accepts.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity a known key must exceed to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key (or whole table) that no config struct accepts.
    #[error("unknown key `{key}` in {}", display_table(table))]
    #[diagnostic(
        code(costlog::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), accepted))
    )]
    UnknownKey {
        key: String,
        table: String,
        suggestion: Option<String>,
        accepted: String,
        #[label("not a costlog setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that does not deserialize into the key's type.
    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(costlog::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
        #[label("expected {expected}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A key that must be present when its table is.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(costlog::config::missing_key),
        help("add `{key} = <value>` to costlog.toml")
    )]
    MissingKey { key: String },

    /// A value that parsed but is semantically unusable.
    #[error("validation error: {message}")]
    #[diagnostic(code(costlog::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(costlog::config::other))]
    Other(String),
}

fn display_table(table: &str) -> String {
    if table.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{table}]")
    }
}

fn unknown_key_help(suggestion: Option<&str>, accepted: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? accepted here: {accepted}"),
        None => format!("accepted here: {accepted}"),
    }
}

/// Convert a figment error chain into diagnostics.
///
/// `toml_sources` holds `(path, content)` pairs for every TOML file that was
/// merged, so spans can be attached to the file the value came from.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let table = table_path(&error);
            match &error.kind {
                Kind::UnknownField(field, accepted) => {
                    let (span, src) = locate(&error, &table, field, toml_sources);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        table: table.join("."),
                        suggestion: suggest_key(field, accepted),
                        accepted: accepted.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: field.to_string(),
                },
                Kind::InvalidType(found, expected) => {
                    // figment reports the full path; the key is its last segment.
                    let (parent, key) = match table.split_last() {
                        Some((key, parent)) => (parent.to_vec(), key.clone()),
                        None => (Vec::new(), String::new()),
                    };
                    let (span, src) = locate(&error, &parent, &key, toml_sources);
                    ConfigError::InvalidType {
                        key: table.join("."),
                        found: found.to_string(),
                        expected: expected.clone(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn table_path(error: &figment::Error) -> Vec<String> {
    error.path.iter().map(|segment| segment.to_string()).collect()
}

fn locate(
    error: &figment::Error,
    table: &[String],
    key: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|source| match source {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    // Inline strings carry no file path; with a single source it must be that one.
    let source = match file {
        Some(file) => toml_sources.iter().find(|(path, _)| *path == file),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };

    source
        .and_then(|(path, content)| {
            let offset = find_key_offset(content, table, key)?;
            Some((
                SourceSpan::new(offset.into(), key.len()),
                NamedSource::new(path, content.clone()),
            ))
        })
        .map_or((None, None), |(span, src)| (Some(span), Some(src)))
}

/// Byte offset of `key` inside the TOML table named by `table`.
///
/// Table headers are compared segment by segment with quotes removed, so
/// `[pricing.models."gpt-x"]` matches `["pricing", "models", "gpt-x"]`. An
/// unknown top-level table (`table` empty) is found through its header.
pub fn find_key_offset(content: &str, table: &[String], key: &str) -> Option<usize> {
    let mut current: Vec<String> = Vec::new();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let trimmed = line.trim();

        if let Some(header) = parse_header(trimmed) {
            if table.is_empty() && header.first().is_some_and(|first| first == key) {
                return line.find(key).map(|at| offset + at);
            }
            current = header;
        } else if current == table
            && let Some(rest) = trimmed.strip_prefix(key)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + indent);
        }

        offset += line.len();
    }

    None
}

/// Split a `[a.b."c.d"]` or `[[a.b]]` header into unquoted segments.
fn parse_header(line: &str) -> Option<Vec<String>> {
    let inner = line
        .strip_prefix("[[")
        .and_then(|l| l.split_once("]]"))
        .or_else(|| line.strip_prefix('[').and_then(|l| l.split_once(']')))?
        .0;

    let mut segments = Vec::new();
    let mut segment = String::new();
    let mut quoted = false;
    for c in inner.chars() {
        match c {
            '"' | '\'' => quoted = !quoted,
            '.' if !quoted => segments.push(std::mem::take(&mut segment).trim().to_string()),
            _ => segment.push(c),
        }
    }
    segments.push(segment.trim().to_string());
    Some(segments)
}

/// Closest accepted key to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, accepted: &[&str]) -> Option<String> {
    accepted
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print every error to stderr with miette's graphical report handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    let mut out = String::new();
    for error in errors {
        let before = out.len();
        if handler.render_report(&mut out, error as &dyn Diagnostic).is_err() {
            out.truncate(before);
            out.push_str(&format!("Error: {error}\n"));
        }
    }
    eprint!("{out}");
}
