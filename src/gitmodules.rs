//! `.gitmodules` reading.
//!
//! git writes `.gitmodules` with tab-indented keys, which the generic section
//! parser below reads as continuation lines. [`GitmoduleReader`] strips the
//! leading whitespace of every line before the parser sees it.

use std::io::BufRead;

use crate::error::{Error, Result};

/// Line reader that trims the start of each line.
pub struct GitmoduleReader<R> {
    inner: R,
}

impl<R: BufRead> GitmoduleReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: BufRead> Iterator for GitmoduleReader<R> {
    type Item = std::io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        match self.inner.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(Ok(line.trim_start().to_string())),
            Err(e) => Some(Err(e)),
        }
    }
}

/// One `[name]` section and its key/value pairs in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub entries: Vec<(String, String)>,
}

impl Section {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Generic INI-style parser.
///
/// Understands `[section]` headers, `key = value` and `key: value` pairs,
/// `#`/`;` comments and blank lines. A line starting with whitespace
/// continues the previous value.
pub fn parse_sections<I, S>(lines: I) -> Result<Vec<Section>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sections: Vec<Section> = Vec::new();

    for (idx, raw) in lines.into_iter().enumerate() {
        let raw = raw.as_ref();
        let line = raw.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim();
        let lineno = idx + 1;

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if line.starts_with([' ', '\t']) {
            let entry = sections
                .last_mut()
                .and_then(|s| s.entries.last_mut())
                .ok_or_else(|| parse_error(lineno, "continuation line without a preceding key"))?;
            entry.1.push('\n');
            entry.1.push_str(trimmed);
            continue;
        }

        if let Some(header) = trimmed.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or_else(|| parse_error(lineno, "unterminated section header"))?;
            sections.push(Section {
                name: name.trim().to_string(),
                entries: Vec::new(),
            });
            continue;
        }

        let section = sections
            .last_mut()
            .ok_or_else(|| parse_error(lineno, "key outside of any section"))?;
        let split = trimmed
            .find(['=', ':'])
            .ok_or_else(|| parse_error(lineno, "expected `key = value`"))?;
        let key = trimmed[..split].trim().to_lowercase();
        let value = trimmed[split + 1..].trim().to_string();
        section.entries.push((key, value));
    }

    Ok(sections)
}

/// Parses `.gitmodules` content through [`GitmoduleReader`].
pub fn read_gitmodules<R: BufRead>(reader: R) -> Result<Vec<Section>> {
    let lines = GitmoduleReader::new(reader)
        .collect::<std::io::Result<Vec<String>>>()
        .map_err(|e| Error::Parse {
            what: ".gitmodules".to_string(),
            message: e.to_string(),
        })?;
    parse_sections(lines)
}

fn parse_error(line: usize, message: &str) -> Error {
    Error::Parse {
        what: ".gitmodules".to_string(),
        message: format!("line {line}: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABBED: &str = "[submodule \"docs/build/html\"]\n\
                          \tpath = docs/build/html\n\
                          \turl = git@github.com:damien/foo.git\n";

    const FLAT: &str = "[submodule \"docs/build/html\"]\n\
                        path = docs/build/html\n\
                        url = git@github.com:damien/foo.git\n";

    #[test]
    fn reader_strips_leading_whitespace() {
        let lines: Vec<String> = GitmoduleReader::new(TABBED.as_bytes())
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines[1], "path = docs/build/html\n");
        assert_eq!(lines[2], "url = git@github.com:damien/foo.git\n");
    }

    #[test]
    fn tabbed_and_flat_parse_the_same() {
        let tabbed = read_gitmodules(TABBED.as_bytes()).unwrap();
        let flat = read_gitmodules(FLAT.as_bytes()).unwrap();
        assert_eq!(tabbed, flat);

        let section = &tabbed[0];
        assert_eq!(section.name, "submodule \"docs/build/html\"");
        assert_eq!(section.get("path"), Some("docs/build/html"));
        assert_eq!(section.get("url"), Some("git@github.com:damien/foo.git"));
    }

    #[test]
    fn raw_tabbed_lines_are_continuations() {
        // without the reader the indented keys glue onto nothing
        let err = parse_sections(TABBED.lines()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn continuation_extends_previous_value() {
        let text = "[a]\nkey = one\n  two\n";
        let sections = parse_sections(text.lines()).unwrap();
        assert_eq!(sections[0].get("key"), Some("one\ntwo"));
    }

    #[test]
    fn comments_and_colons() {
        let text = "# top\n[core]\n; note\nbare: false\n\n[remote \"origin\"]\nurl = a=b\n";
        let sections = parse_sections(text.lines()).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].get("bare"), Some("false"));
        assert_eq!(sections[1].get("url"), Some("a=b"));
    }

    #[test]
    fn key_before_section_is_rejected() {
        assert!(parse_sections(["path = x"]).is_err());
        assert!(parse_sections(["[open"]).is_err());
    }
}
