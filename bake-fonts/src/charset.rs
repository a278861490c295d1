//! Collecting the characters a font should contain.
//!
//! Characters can come from literal strings, hexadecimal code point ranges,
//! UTF-8 text files and binary `.cst` files holding little-endian u16 code
//! points. The result is sorted and free of duplicates.

use std::{collections::BTreeSet, path::Path};

use crate::Error;

/// Highest code point an index slot can address.
pub const MAX_CODE_POINT: u32 = 0xFFFF;

/// A sorted set of code points in the basic multilingual plane.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharacterSet {
    chars: BTreeSet<u32>,
    /// Code points above [`MAX_CODE_POINT`] that were dropped.
    dropped: usize,
}

impl CharacterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a code point, returning false if it is out of range.
    pub fn insert(&mut self, unicode: u32) -> bool {
        if unicode > MAX_CODE_POINT {
            if self.dropped == 0 {
                log::warn!("U+{unicode:04X} is outside the basic multilingual plane, dropping");
            }
            self.dropped += 1;
            return false;
        }
        self.chars.insert(unicode);
        true
    }

    /// Add every character of a string.
    pub fn add_str(&mut self, text: &str) {
        for ch in text.chars().filter(|ch| !matches!(ch, '\n' | '\r')) {
            self.insert(ch as u32);
        }
    }

    /// Add code points from a list of hexadecimal values and ranges, such
    /// as `"20-7e,U+4E00"`.
    pub fn add_ranges(&mut self, ranges: &str) -> Result<(), Error> {
        for (start, end) in parse_unicodes(ranges)? {
            for unicode in start..=end {
                self.insert(unicode);
            }
        }
        Ok(())
    }

    /// Add the characters stored in a file.
    ///
    /// Files with a `.cst` extension hold little-endian u16 code points;
    /// anything else is read as UTF-8 text.
    pub fn add_file(&mut self, path: &Path) -> Result<(), Error> {
        let is_binary = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("cst"));
        let before = self.len();
        if is_binary {
            let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
            if bytes.len() % 2 != 0 {
                log::warn!("{} has a trailing odd byte", path.display());
            }
            for pair in bytes.chunks_exact(2) {
                self.insert(u16::from_le_bytes([pair[0], pair[1]]) as u32);
            }
        } else {
            let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            // a byte order mark is not a requested character
            self.add_str(text.strip_prefix('\u{FEFF}').unwrap_or(&text));
        }
        log::debug!(
            "{} added {} characters",
            path.display(),
            self.len() - before
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Number of code points dropped for being out of range.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn contains(&self, unicode: u32) -> bool {
        self.chars.contains(&unicode)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.chars.iter().copied()
    }

    /// The code points in ascending order.
    pub fn to_vec(&self) -> Vec<u32> {
        self.chars.iter().copied().collect()
    }
}

impl Extend<u32> for CharacterSet {
    fn extend<T: IntoIterator<Item = u32>>(&mut self, iter: T) {
        for unicode in iter {
            self.insert(unicode);
        }
    }
}

impl FromIterator<u32> for CharacterSet {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        let mut set = CharacterSet::new();
        set.extend(iter);
        set
    }
}

/// Parse a list of hexadecimal code points and inclusive ranges.
///
/// Entries are separated by commas, semicolons or whitespace and may carry
/// `U+`, `u+` or `0x` prefixes.
pub fn parse_unicodes(input: &str) -> Result<Vec<(u32, u32)>, Error> {
    let separators = regex::Regex::new(r"(?i)u\+|0x|[,;\s]").expect("valid regex");
    let cleaned = separators.replace_all(input, " ");
    cleaned
        .split_whitespace()
        .map(|entry| {
            let parse = |s: &str| {
                u32::from_str_radix(s, 16).map_err(|_| Error::InvalidUnicode(s.to_owned()))
            };
            match entry.split_once('-') {
                Some((start, end)) => {
                    let (start, end) = (parse(start)?, parse(end)?);
                    if start > end {
                        return Err(Error::InvalidUnicodeRange { start, end });
                    }
                    Ok((start, end))
                }
                None => parse(entry).map(|unicode| (unicode, unicode)),
            }
        })
        .collect()
}
