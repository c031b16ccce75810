//! Reader for generated formulas.
//!
//! Understands the subset of Ruby that `formula::render` emits: the class
//! line, top-level string attributes, `bin.install` lines and the caveats
//! heredoc. Platform blocks and tests are skipped.

use serde::Serialize;

use crate::descriptor::InstallStep;
use crate::error::{BrewtapError, Result};

/// Indentation of caveats lines inside `def caveats`.
const HEREDOC_INDENT: &str = "      ";

/// Fields recovered from formula text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedFormula {
    pub class_name: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub url: Option<String>,
    pub download_strategy: Option<String>,
    pub checksum: Option<String>,
    pub version: Option<String>,
    pub license: Option<String>,
    pub install_steps: Vec<InstallStep>,
    /// Caveats text without its final newline.
    pub caveats: Option<String>,
}

pub fn parse_formula(text: &str) -> Result<ParsedFormula> {
    let mut parsed = ParsedFormula::default();
    let mut found_class = false;
    // 0 = outside the class, 1 = class body, deeper = nested blocks
    let mut depth = 0usize;
    let mut in_install = false;
    let mut in_caveats = false;
    let mut in_heredoc = false;
    let mut caveat_lines: Option<Vec<String>> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_num = idx + 1;
        let line = raw.trim();

        if in_heredoc {
            if raw.trim_start_matches(&[' ', '\t'][..]) == "EOS" {
                in_heredoc = false;
                if let Some(lines) = caveat_lines.take() {
                    parsed.caveats = Some(lines.join("\n"));
                }
            } else if let Some(lines) = caveat_lines.as_mut() {
                let content = raw.strip_prefix(HEREDOC_INDENT).unwrap_or(line);
                lines.push(unescape_heredoc_line(content, line_num)?);
            }
            continue;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line == "<<~EOS" {
            in_heredoc = true;
            if in_caveats {
                caveat_lines = Some(Vec::new());
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("class ") {
            parsed.class_name = rest
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();
            found_class = true;
            depth = 1;
            continue;
        }

        if line == "end" {
            in_install = false;
            in_caveats = false;
            depth = depth.saturating_sub(1);
            continue;
        }
        if line == "def install" {
            in_install = depth == 1;
            depth += 1;
            continue;
        }
        if line == "def caveats" {
            in_caveats = depth == 1;
            depth += 1;
            continue;
        }
        if line.starts_with("def ") || line.ends_with(" do") {
            depth += 1;
            continue;
        }

        if in_install {
            if let Some(rest) = line.strip_prefix("bin.install ") {
                parsed.install_steps.push(parse_install(rest, line_num)?);
            }
            continue;
        }
        if depth != 1 {
            continue;
        }

        let (key, rest) = line.split_once(' ').unwrap_or((line, ""));
        let slot = match key {
            "desc" => &mut parsed.description,
            "homepage" => &mut parsed.homepage,
            "url" => &mut parsed.url,
            "sha256" => &mut parsed.checksum,
            "version" => &mut parsed.version,
            "license" => &mut parsed.license,
            _ => continue,
        };
        let (value, tail) = read_string(rest, line_num)?;
        *slot = Some(value);

        if key == "url" {
            if let Some(strategy) = tail.trim().strip_prefix(", using:") {
                parsed.download_strategy = Some(strategy.trim().to_string());
            }
        }
    }

    if !found_class {
        return Err(BrewtapError::Parse {
            line: text.lines().count(),
            message: "no `class ... < Formula` line found".into(),
        });
    }
    Ok(parsed)
}

fn parse_install(rest: &str, line: usize) -> Result<InstallStep> {
    let (source, tail) = read_string(rest, line)?;
    let installed = match tail.trim_start().strip_prefix("=>") {
        Some(target) => read_string(target.trim_start(), line)?.0,
        None => String::new(),
    };
    Ok(InstallStep::new(source, installed))
}

/// Read a double-quoted Ruby string literal from the start of `input`,
/// returning its value and the text after the closing quote.
pub fn read_string(input: &str, line: usize) -> Result<(String, &str)> {
    let err = |message: String| BrewtapError::Parse { line, message };

    let body = input
        .strip_prefix('"')
        .ok_or_else(|| err(format!("expected string literal, found `{input}`")))?;

    let mut value = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((value, &body[i + 1..])),
            '\\' => value.push(read_escape(&mut chars, line)?),
            c => value.push(c),
        }
    }
    Err(err("unterminated string literal".into()))
}

/// Unescape one heredoc content line, indentation already removed.
fn unescape_heredoc_line(content: &str, line: usize) -> Result<String> {
    let mut value = String::with_capacity(content.len());
    let mut chars = content.char_indices();
    while let Some((_, c)) = chars.next() {
        match c {
            '\\' => value.push(read_escape(&mut chars, line)?),
            c => value.push(c),
        }
    }
    Ok(value)
}

/// The character a backslash escape stands for; `chars` is positioned just
/// after the backslash.
fn read_escape(chars: &mut std::str::CharIndices<'_>, line: usize) -> Result<char> {
    let err = |message: String| BrewtapError::Parse { line, message };
    match chars.next() {
        Some((_, '\\')) => Ok('\\'),
        Some((_, '"')) => Ok('"'),
        Some((_, '#')) => Ok('#'),
        Some((_, 'n')) => Ok('\n'),
        Some((_, 't')) => Ok('\t'),
        Some((_, 'r')) => Ok('\r'),
        Some((_, 's')) => Ok(' '),
        Some((_, 'x')) => read_hex_escape(chars, line),
        Some((_, 'u')) => read_unicode_escape(chars, line),
        Some((_, other)) => Err(err(format!("unsupported escape `\\{other}`"))),
        None => Err(err("unterminated escape".into())),
    }
}

fn read_hex_escape(chars: &mut std::str::CharIndices<'_>, line: usize) -> Result<char> {
    let hex: String = chars.by_ref().take(2).map(|(_, c)| c).collect();
    u8::from_str_radix(&hex, 16)
        .ok()
        .filter(u8::is_ascii)
        .map(char::from)
        .ok_or_else(|| BrewtapError::Parse {
            line,
            message: format!("bad `\\x{hex}` escape"),
        })
}

fn read_unicode_escape(chars: &mut std::str::CharIndices<'_>, line: usize) -> Result<char> {
    let err = |message: &str| BrewtapError::Parse {
        line,
        message: message.into(),
    };

    if !matches!(chars.next(), Some((_, '{'))) {
        return Err(err("expected `{` after `\\u`"));
    }
    let mut hex = String::new();
    for (_, c) in chars.by_ref() {
        if c == '}' {
            let code = u32::from_str_radix(&hex, 16).map_err(|_| err("bad `\\u{..}` escape"))?;
            return char::from_u32(code).ok_or_else(|| err("`\\u{..}` is not a character"));
        }
        hex.push(c);
    }
    Err(err("unterminated `\\u{..}` escape"))
}
