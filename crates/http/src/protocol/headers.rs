//! Case-insensitive HTTP header collection.
//!
//! Field names are stored lowercased. Setting a name that is already present
//! folds the new value into the old one with a comma, the way repeated field
//! lines are combined by RFC 7230 section 3.2.2. [`Headers::replace`] is the
//! only way to overwrite a value.
//!
//! The same collection is used on both sides of a connection: the request
//! parser fills one incrementally through [`Headers::parse_from`], and the
//! response writer serializes one for the header section and another for the
//! trailer section of a chunked body.

use crate::ensure;
use crate::protocol::ParseError;
use tracing::trace;

/// Line delimiter of the HTTP/1.1 head.
pub(crate) const CRLF: &[u8] = b"\r\n";

/// A mapping from lowercased field name to field value.
///
/// Entries keep the order in which a name was first inserted, so iterating
/// the same collection twice always yields the same sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    /// Adds a field, merging with an existing value as `old,new`.
    pub fn set<V: Into<String>>(&mut self, name: &str, value: V) {
        let value = value.into();
        match self.position(name) {
            Some(index) => {
                let existing = &mut self.entries[index].1;
                existing.push(',');
                existing.push_str(&value);
            }
            None => self.entries.push((name.to_ascii_lowercase(), value)),
        }
    }

    /// Sets a field, discarding any previous value.
    pub fn replace<V: Into<String>>(&mut self, name: &str, value: V) {
        let value = value.into();
        match self.position(name) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((name.to_ascii_lowercase(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.entries[index].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Removes a field and returns its value if it was present.
    pub fn delete(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|index| self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, value)` pairs, names lowercased.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// The `content-length` value as an unsigned integer.
    ///
    /// A missing or non-numeric value is reported as `None`, which callers
    /// treat the same as "no body".
    pub fn content_length(&self) -> Option<u64> {
        self.get("content-length").and_then(|value| value.parse::<u64>().ok())
    }

    /// Parses CRLF terminated `name: value` lines from the start of `data`.
    ///
    /// Returns the number of bytes consumed and whether the empty line ending
    /// the header section was reached. When `data` ends in the middle of a
    /// line the complete lines before it are already stored, the partial line
    /// is left unconsumed and the caller is expected to call again with it
    /// prefixed to more data.
    ///
    /// # Errors
    ///
    /// - [`ParseError::MalformedFieldLine`] if a line has no `:`
    /// - [`ParseError::MalformedFieldName`] if the name ends in whitespace or
    ///   is not a token
    pub fn parse_from(&mut self, data: &[u8]) -> Result<(usize, bool), ParseError> {
        let mut read = 0;

        while let Some(index) = find_crlf(&data[read..]) {
            if index == 0 {
                return Ok((read + CRLF.len(), true));
            }

            let (name, value) = parse_field_line(&data[read..read + index])?;
            trace!(name = %name, value = %value, "parsed field line");
            read += index + CRLF.len();
            self.set(&name, value);
        }

        Ok((read, false))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key.eq_ignore_ascii_case(name))
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl<N: AsRef<str>, V: Into<String>> Extend<(N, V)> for Headers {
    fn extend<T: IntoIterator<Item = (N, V)>>(&mut self, iter: T) {
        for (name, value) in iter {
            self.set(name.as_ref(), value);
        }
    }
}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        headers.extend(iter);
        headers
    }
}

/// Position of the first CRLF in `data`.
pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(CRLF.len()).position(|window| window == CRLF)
}

/// Splits a single field line (without its CRLF) into lowercased name and
/// trimmed value.
fn parse_field_line(line: &[u8]) -> Result<(String, String), ParseError> {
    let colon = line.iter().position(|b| *b == b':').ok_or(ParseError::MalformedFieldLine)?;
    let (name, value) = (&line[..colon], &line[colon + 1..]);

    // no whitespace is allowed between the field name and colon
    ensure!(
        !name.last().is_some_and(u8::is_ascii_whitespace),
        ParseError::malformed_field_name(String::from_utf8_lossy(name))
    );
    ensure!(is_token(name), ParseError::malformed_field_name(String::from_utf8_lossy(name)));

    // tokens are ascii, so every byte maps to exactly one char
    let name = name.iter().map(|b| char::from(b.to_ascii_lowercase())).collect();
    let value = String::from_utf8_lossy(value.trim_ascii()).into_owned();

    Ok((name, value))
}

/// Whether `bytes` is a non-empty RFC 7230 token.
pub(crate) fn is_token(bytes: &[u8]) -> bool {
    !bytes.is_empty() && bytes.iter().copied().all(is_tchar)
}

fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~')
}
