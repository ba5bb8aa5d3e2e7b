//! Zeek ASCII log header directives.

use super::value::{unescape, ZeekType};

/// Header state accumulated from `#` directive lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeekHeader {
    pub separator: String,
    pub set_separator: String,
    pub empty_field: String,
    pub unset_field: String,
    /// Log stream name, e.g. `conn` or `dns`
    pub path: Option<String>,
    pub fields: Vec<String>,
    pub types: Vec<ZeekType>,
}

impl Default for ZeekHeader {
    fn default() -> Self {
        Self {
            separator: "\t".into(),
            set_separator: ",".into(),
            empty_field: "(empty)".into(),
            unset_field: "-".into(),
            path: None,
            fields: Vec::new(),
            types: Vec::new(),
        }
    }
}

/// Effect of one `#` line on the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Header state changed
    Updated,
    /// Recognized but carries nothing the reader needs (`#open`, `#close`)
    Informational,
    /// Not a known directive; treated as a comment
    Comment,
}

impl ZeekHeader {
    /// Apply a line starting with `#`.
    pub fn apply(&mut self, line: &str) -> Directive {
        // `#separator` is always space-delimited since the separator is
        // not known until it has been read.
        if let Some(value) = line.strip_prefix("#separator ") {
            let sep = unescape(value.trim());
            if !sep.is_empty() {
                self.separator = sep;
            }
            return Directive::Updated;
        }

        let (name, value) = match line.split_once(self.separator.as_str()) {
            Some((name, value)) => (name, value),
            None => (line, ""),
        };

        match name {
            "#set_separator" => self.set_separator = unescape(value),
            "#empty_field" => self.empty_field = unescape(value),
            "#unset_field" => self.unset_field = unescape(value),
            "#path" => self.path = Some(value.to_string()),
            "#fields" => {
                self.fields = value.split(self.separator.as_str()).map(str::to_string).collect();
                self.types.clear();
            }
            "#types" => {
                self.types = value.split(self.separator.as_str()).map(ZeekType::parse).collect();
            }
            "#open" | "#close" => return Directive::Informational,
            _ => return Directive::Comment,
        }
        Directive::Updated
    }

    /// Index of a column by name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    /// Declared type of a column; columns without a `#types` entry are untyped.
    pub fn column_type(&self, index: usize) -> &ZeekType {
        self.types.get(index).unwrap_or(&ZeekType::Untyped)
    }

    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }
}
