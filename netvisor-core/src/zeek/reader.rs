//! Lazy record iterator over a Zeek ASCII log.

use std::sync::Arc;

use tracing::trace;

use super::header::{Directive, ZeekHeader};
use super::value::ZeekValue;
use crate::error::ZeekError;

/// One data line, decoded against the header in force when it was read.
#[derive(Debug, Clone)]
pub struct ZeekRecord {
    line: u64,
    header: Arc<ZeekHeader>,
    values: Vec<Option<ZeekValue>>,
}

impl ZeekRecord {
    /// 1-based line number in the input.
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn header(&self) -> &ZeekHeader {
        &self.header
    }

    /// Value of a column; `None` when the column is absent, unset or empty.
    pub fn get(&self, name: &str) -> Option<&ZeekValue> {
        let idx = self.header.column(name)?;
        self.values.get(idx)?.as_ref()
    }

    /// Iterate `(column, value)` pairs for present values.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ZeekValue)> {
        self.header
            .fields
            .iter()
            .zip(&self.values)
            .filter_map(|(name, value)| value.as_ref().map(|v| (name.as_str(), v)))
    }
}

/// Iterator of [`ZeekRecord`]s over in-memory log bytes.
///
/// Malformed lines are yielded as [`ZeekError::MalformedRecord`] and
/// iteration continues. A data line before any `#fields` directive, or a
/// header lacking a required column, is yielded as a fatal error and ends
/// iteration.
pub struct ZeekReader<'a> {
    lines: std::slice::Split<'a, u8, fn(&u8) -> bool>,
    line_number: u64,
    header: ZeekHeader,
    current: Option<Arc<ZeekHeader>>,
    header_dirty: bool,
    required: &'static [&'static str],
    done: bool,
}

fn is_newline(b: &u8) -> bool {
    *b == b'\n'
}

impl<'a> ZeekReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            lines: data.split(is_newline as fn(&u8) -> bool),
            line_number: 0,
            header: ZeekHeader::default(),
            current: None,
            header_dirty: false,
            required: &[],
            done: false,
        }
    }

    /// Columns every `#fields` header must declare.
    pub fn require(mut self, columns: &'static [&'static str]) -> Self {
        self.required = columns;
        self
    }

    /// The header as accumulated so far.
    pub fn header(&self) -> &ZeekHeader {
        &self.header
    }

    /// Freeze the accumulated header for the records that follow.
    fn seal_header(&mut self) -> Result<Arc<ZeekHeader>, ZeekError> {
        if self.header_dirty || self.current.is_none() {
            if !self.header.has_fields() {
                return Err(ZeekError::MissingHeader {
                    line: self.line_number,
                });
            }
            if let Some(&missing) = self
                .required
                .iter()
                .find(|name| self.header.column(name).is_none())
            {
                return Err(ZeekError::MissingField { field: missing });
            }
            self.current = Some(Arc::new(self.header.clone()));
            self.header_dirty = false;
        }
        self.current.clone().ok_or(ZeekError::MissingHeader {
            line: self.line_number,
        })
    }

    fn decode(&self, header: Arc<ZeekHeader>, line: &str) -> Result<ZeekRecord, ZeekError> {
        let malformed = |reason: String| ZeekError::MalformedRecord {
            line: self.line_number,
            reason,
        };

        let raw: Vec<&str> = line.split(header.separator.as_str()).collect();
        if raw.len() != header.fields.len() {
            return Err(malformed(format!(
                "expected {} fields, found {}",
                header.fields.len(),
                raw.len()
            )));
        }

        let mut values = Vec::with_capacity(raw.len());
        for (idx, raw_value) in raw.into_iter().enumerate() {
            if raw_value == header.unset_field || raw_value == header.empty_field {
                values.push(None);
                continue;
            }
            let value = ZeekValue::parse(header.column_type(idx), raw_value, &header.set_separator)
                .map_err(|reason| malformed(format!("{}: {reason}", header.fields[idx])))?;
            values.push(Some(value));
        }

        Ok(ZeekRecord {
            line: self.line_number,
            header,
            values,
        })
    }
}

impl Iterator for ZeekReader<'_> {
    type Item = Result<ZeekRecord, ZeekError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        for raw in self.lines.by_ref() {
            self.line_number += 1;
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            if raw.is_empty() {
                continue;
            }

            let line = match std::str::from_utf8(raw) {
                Ok(line) => line,
                Err(e) => {
                    return Some(Err(ZeekError::MalformedRecord {
                        line: self.line_number,
                        reason: format!("invalid UTF-8: {e}"),
                    }))
                }
            };

            if line.starts_with('#') {
                match self.header.apply(line) {
                    Directive::Updated => self.header_dirty = true,
                    Directive::Informational => {}
                    Directive::Comment => trace!(line = self.line_number, "skipping comment"),
                }
                continue;
            }

            let header = match self.seal_header() {
                Ok(header) => header,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            return Some(self.decode(header, line));
        }

        self.done = true;
        None
    }
}
