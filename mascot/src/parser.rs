//! Line splitting, quote normalization and the lazy record iterator
use super::*;
use memchr::{memchr_iter, Memchr};

/// Generalized wrapper around [`Memchr`] iterator for splitting `&[u8]` slices
/// by a byte.
///
/// A trailing needle does not produce an empty final slice, so a file ending
/// in a newline yields no phantom last line.
pub(crate) struct Pitchfork<'a> {
    pos: usize,
    haystack: &'a [u8],
    inner: Memchr<'a>,
}

impl<'a> Pitchfork<'a> {
    pub fn new(needle: u8, haystack: &'a [u8]) -> Self {
        Self {
            pos: 0,
            haystack,
            inner: memchr_iter(needle, haystack),
        }
    }
}

impl<'a> Iterator for Pitchfork<'a> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let end = match self.inner.next() {
            Some(e) => e,
            None => {
                if self.pos < self.haystack.len() {
                    self.haystack.len()
                } else {
                    return None;
                }
            }
        };
        let slice = &self.haystack[self.pos..end];
        self.pos = end + 1;
        Some(slice)
    }
}

/// Replace every delimiter that sits inside a double-quoted region with
/// [`PLACEHOLDER`], so free-text fields such as multi-valued modification
/// annotations don't split into extra columns.
///
/// Quotes are a plain toggle; there is no escaped-quote handling. The quote
/// characters themselves are kept. Lines without quoted delimiters are
/// returned borrowed, and cleaning an already cleaned line is a no-op.
///
/// ```rust
/// # use mascot::clean_line;
/// assert_eq!(clean_line("1,\"a,b,c\",2"), "1,\"a:b:c\",2");
/// assert_eq!(clean_line("1,2,3"), "1,2,3");
/// ```
pub fn clean_line(line: &str) -> Cow<'_, str> {
    let mut quote = false;
    let mut cleaned: Option<String> = None;

    for (idx, c) in line.char_indices() {
        if c == QUOTE {
            quote = !quote;
        }
        let replace = quote && c == DELIMITER;
        match cleaned.as_mut() {
            Some(s) => s.push(if replace { PLACEHOLDER } else { c }),
            None => {
                if replace {
                    let mut s = String::with_capacity(line.len());
                    s.push_str(&line[..idx]);
                    s.push(PLACEHOLDER);
                    cleaned = Some(s);
                }
            }
        }
    }

    match cleaned {
        Some(s) => Cow::Owned(s),
        None => Cow::Borrowed(line),
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum State {
    /// Looking for the header marker
    Searching,
    /// Marker seen, this many rows still to skip
    Skipping(usize),
    Reading,
    Done,
}

/// Lazy iterator over the data rows of an [`Export`]
///
/// Yields exactly one [`Error::MissingHeaderMarker`] if the input ends
/// before the marker is seen.
pub struct Records<'a> {
    export: &'a Export,
    lines: Pitchfork<'a>,
    line: usize,
    state: State,
}

impl<'a> Records<'a> {
    pub(crate) fn new(export: &'a Export) -> Self {
        Records {
            export,
            lines: Pitchfork::new(b'\n', &export.buffer),
            line: 0,
            state: State::Searching,
        }
    }

    fn parse(&self, raw: &[u8]) -> Option<Result<Record>> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let text = match std::str::from_utf8(raw) {
            Ok(text) => text,
            Err(_) => {
                return Some(Err(Error::malformed(
                    &self.export.path,
                    self.line,
                    "row is not valid UTF-8",
                )))
            }
        };

        if text.trim().is_empty() {
            debug!(
                "{}:{}: skipping blank line",
                self.export.path.display(),
                self.line
            );
            return None;
        }

        let cleaned = clean_line(text);
        let fields = cleaned.split(DELIMITER).collect::<Vec<&str>>();
        Some(
            self.export
                .schema
                .extract(self.line, &fields)
                .map_err(|reason| Error::malformed(&self.export.path, self.line, reason)),
        )
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = match self.lines.next() {
                Some(raw) => raw,
                None => {
                    return match std::mem::replace(&mut self.state, State::Done) {
                        State::Searching => Some(Err(Error::MissingHeaderMarker {
                            path: self.export.path.clone(),
                            marker: self.export.schema.marker.clone(),
                        })),
                        _ => None,
                    };
                }
            };
            self.line += 1;

            match self.state {
                State::Done => return None,
                State::Searching => {
                    if raw.starts_with(self.export.schema.marker.as_bytes()) {
                        self.state = match self.export.schema.skip_after_marker {
                            0 => State::Reading,
                            n => State::Skipping(n),
                        };
                    }
                }
                State::Skipping(n) => {
                    self.state = if n > 1 {
                        State::Skipping(n - 1)
                    } else {
                        State::Reading
                    };
                }
                State::Reading => {
                    if let Some(record) = self.parse(raw) {
                        return Some(record);
                    }
                }
            }
        }
    }
}
