//! Splits a playlist buffer into lines.
//!
//! Lines are delimited by `\n`. A `\r` right before the delimiter is dropped so
//! CRLF playlists read the same as LF ones. A final line without a delimiter
//! is still produced.

use memchr::memchr;

/// Lazy iterator over the lines of a playlist buffer.
///
/// Each item is `None` when the slice is not valid UTF-8, so a single
/// undecodable line never hides the rest of the playlist.
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Lines<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = Option<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.data.len() {
            return None;
        }

        let rest = &self.data[self.position..];
        let slice = match memchr(b'\n', rest) {
            Some(end) => {
                self.position += end + 1;
                &rest[..end]
            }
            None => {
                self.position = self.data.len();
                rest
            }
        };

        let slice = slice.strip_suffix(b"\r").unwrap_or(slice);
        Some(std::str::from_utf8(slice).ok())
    }
}

/// Shorthand for [`Lines::new`].
pub fn lines(data: &[u8]) -> Lines<'_> {
    Lines::new(data)
}
