use derive_more::Display;

/// Connector glyphs that may appear in the indentation prefix of a line.
const CONNECTOR_GLYPHS: [char; 4] = ['│', '├', '└', '─'];

const DIRECTORY_SUFFIX: char = '/';

/// Returns true for characters that belong to a line's indentation prefix.
pub fn is_indent_char(c: char) -> bool {
    c.is_whitespace() || CONNECTOR_GLYPHS.contains(&c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EntryKind {
    #[display("dir")]
    Directory,
    #[display("file")]
    File,
}

/// A single non-blank line of a tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    pub raw: String,
    /// Number of chars in the indent-and-connector prefix. Used as the depth key.
    pub width: usize,
    /// Entry name with surrounding whitespace and trailing separators removed.
    pub name: String,
    pub kind: EntryKind,
}

impl TreeLine {
    /// Parses one line. Returns `None` when nothing but indentation is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let (width, name_start) = raw
            .char_indices()
            .enumerate()
            .find(|(_, (_, c))| !is_indent_char(*c))
            .map(|(width, (offset, _))| (width, offset))?;

        let raw_name = raw[name_start..].trim();
        if raw_name.is_empty() {
            return None;
        }

        let kind = if raw_name.ends_with(DIRECTORY_SUFFIX) {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        Some(TreeLine {
            raw: raw.to_string(),
            width,
            name: raw_name.trim_end_matches(DIRECTORY_SUFFIX).to_string(),
            kind,
        })
    }
}

/// Splits a tree listing into lines, dropping blank and glyph-only ones.
pub fn parse_tree(text: &str) -> Vec<TreeLine> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(TreeLine::parse)
        .collect()
}
