//! Font file headers.
//!
//! Both variants start with the same packed fields: a length byte, a file
//! type flag and a version, followed by size and style information, the byte
//! size of the index area and a null-terminated font name.

use serde::Deserialize;

use crate::{
    index::IndexLayout,
    pack::RenderMode,
    write::{ByteWriter, FontWrite},
    Error,
};

/// File type flag of bitmap fonts.
pub const BITMAP_FILE_FLAG: u8 = 1;
/// File type flag of vector fonts.
pub const VECTOR_FILE_FLAG: u8 = 2;

/// Bitmap header version, as `major.minor.revision`.
pub const BITMAP_VERSION: [u8; 3] = [1, 0, 2];
/// Vector header version, as `major.minor.revision.build`.
pub const VECTOR_VERSION: [u8; 4] = [0, 0, 0, 1];

/// How characters are located through the index area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexMethod {
    /// One slot for every code point in the basic multilingual plane.
    #[default]
    Address = 0,
    /// One slot per requested character, sorted by code point.
    Offset = 1,
}

/// The flag byte shared by both header variants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeaderFlags {
    pub bold: bool,
    pub italic: bool,
    /// Reserved flag passed through from configuration.
    pub rvd: bool,
    pub index_method: IndexMethod,
    /// Only meaningful for bitmap fonts.
    pub crop: bool,
}

impl HeaderFlags {
    const BOLD: u8 = 1 << 0;
    const ITALIC: u8 = 1 << 1;
    const RVD: u8 = 1 << 2;
    const INDEX_METHOD: u8 = 1 << 3;
    const CROP: u8 = 1 << 4;

    pub fn bits(self) -> u8 {
        let mut bits = 0;
        if self.bold {
            bits |= Self::BOLD;
        }
        if self.italic {
            bits |= Self::ITALIC;
        }
        if self.rvd {
            bits |= Self::RVD;
        }
        if self.index_method == IndexMethod::Offset {
            bits |= Self::INDEX_METHOD;
        }
        if self.crop {
            bits |= Self::CROP;
        }
        bits
    }
}

/// Encode a font name, checking that the header length still fits in a byte.
fn encode_name(name: &str, fixed_len: usize) -> Result<Vec<u8>, Error> {
    let bytes = name.as_bytes();
    if fixed_len + bytes.len() + 1 > u8::MAX as usize {
        return Err(Error::FontNameTooLong(bytes.len()));
    }
    Ok(bytes.to_vec())
}

/// Header of a bitmap font file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitmapHeader {
    /// Pixel size the outlines were rendered at.
    pub size: u8,
    /// Canvas size.
    pub font_size: u8,
    pub render_mode: RenderMode,
    pub flags: HeaderFlags,
    pub index_area_size: i32,
    font_name: Vec<u8>,
}

impl BitmapHeader {
    /// Byte length of all fields before the font name.
    pub const FIXED_LEN: usize = 14;

    pub fn new(
        size: u8,
        font_size: u8,
        render_mode: RenderMode,
        flags: HeaderFlags,
        char_count: usize,
        font_name: &str,
    ) -> Result<Self, Error> {
        let layout = IndexLayout::bitmap(flags.index_method, flags.crop, char_count);
        Ok(Self {
            size,
            font_size,
            render_mode,
            flags,
            index_area_size: layout.area_size() as i32,
            font_name: encode_name(font_name, Self::FIXED_LEN)?,
        })
    }

    /// Total header length, including the name's null terminator.
    pub fn length(&self) -> usize {
        Self::FIXED_LEN + self.font_name.len() + 1
    }
}

impl FontWrite for BitmapHeader {
    fn write_into(&self, writer: &mut ByteWriter) {
        let start = writer.len();
        writer.write(&(self.length() as u8));
        writer.write(&BITMAP_FILE_FLAG);
        writer.write_slice(&BITMAP_VERSION);
        writer.write(&self.size);
        writer.write(&self.font_size);
        writer.write(&(self.render_mode.bits_per_pixel() as u8));
        writer.write(&self.flags.bits());
        writer.write(&self.index_area_size);
        writer.write(&(self.font_name.len() as u8));
        writer.write_slice(&self.font_name);
        writer.write(&0u8);
        debug_assert_eq!(writer.len() - start, self.length());
    }
}

/// Header of a vector font file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorHeader {
    pub font_size: u8,
    pub flags: HeaderFlags,
    pub index_area_size: i32,
    pub ascent: i16,
    pub descent: i16,
    pub line_gap: i16,
    font_name: Vec<u8>,
}

impl VectorHeader {
    /// Byte length of all fields before the font name.
    pub const FIXED_LEN: usize = 20;

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        font_size: u8,
        flags: HeaderFlags,
        char_count: usize,
        ascent: i16,
        descent: i16,
        line_gap: i16,
        font_name: &str,
    ) -> Result<Self, Error> {
        // vector fonts have no crop bit
        let flags = HeaderFlags {
            crop: false,
            ..flags
        };
        let layout = IndexLayout::vector(flags.index_method, char_count);
        Ok(Self {
            font_size,
            flags,
            index_area_size: layout.area_size() as i32,
            ascent,
            descent,
            line_gap,
            font_name: encode_name(font_name, Self::FIXED_LEN)?,
        })
    }

    /// Total header length, including the name's null terminator.
    pub fn length(&self) -> usize {
        Self::FIXED_LEN + self.font_name.len() + 1
    }
}

impl FontWrite for VectorHeader {
    fn write_into(&self, writer: &mut ByteWriter) {
        let start = writer.len();
        writer.write(&(self.length() as u8));
        writer.write(&VECTOR_FILE_FLAG);
        writer.write_slice(&VECTOR_VERSION);
        writer.write(&self.font_size);
        // render mode is unused by vector fonts
        writer.write(&0u8);
        writer.write(&self.flags.bits());
        writer.write(&self.index_area_size);
        writer.write(&(self.font_name.len() as u8));
        writer.write(&self.ascent);
        writer.write(&self.descent);
        writer.write(&self.line_gap);
        writer.write_slice(&self.font_name);
        writer.write(&0u8);
        debug_assert_eq!(writer.len() - start, self.length());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::dump;
    use pretty_assertions::assert_eq;

    #[test]
    fn flag_bits() {
        let flags = HeaderFlags {
            bold: true,
            italic: false,
            rvd: false,
            index_method: IndexMethod::Offset,
            crop: true,
        };
        assert_eq!(flags.bits(), 0x19);
        assert_eq!(HeaderFlags::default().bits(), 0);
        let all = HeaderFlags {
            bold: true,
            italic: true,
            rvd: true,
            index_method: IndexMethod::Offset,
            crop: true,
        };
        assert_eq!(all.bits(), 0x1F);
    }

    #[test]
    fn bitmap_header_layout() {
        let flags = HeaderFlags {
            italic: true,
            ..Default::default()
        };
        let header = BitmapHeader::new(14, 16, RenderMode::Gray4, flags, 95, "Abc").unwrap();
        assert_eq!(header.index_area_size, 131072);
        let bytes = dump(&header);
        assert_eq!(bytes.len(), header.length());
        #[rustfmt::skip]
        let expected = vec![
            18,             // length
            1,              // file flag
            1, 0, 2,        // version
            14,             // size
            16,             // font size
            4,              // render mode
            0b0000_0010,    // flags
            0x00, 0x00, 0x02, 0x00, // index area size
            3,              // name length
            b'A', b'b', b'c', 0,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn bitmap_index_area_sizes() {
        let offset = HeaderFlags {
            index_method: IndexMethod::Offset,
            ..Default::default()
        };
        let crop = HeaderFlags {
            crop: true,
            ..offset
        };
        let area = |flags, count| {
            BitmapHeader::new(16, 16, RenderMode::Mono, flags, count, "x")
                .unwrap()
                .index_area_size
        };
        assert_eq!(area(HeaderFlags::default(), 10), 131072);
        assert_eq!(area(offset, 10), 20);
        assert_eq!(area(offset, 0), 0);
        assert_eq!(area(crop, 10), 262144);
    }

    #[test]
    fn vector_header_layout() {
        let flags = HeaderFlags {
            bold: true,
            index_method: IndexMethod::Offset,
            crop: true,
            ..Default::default()
        };
        let header = VectorHeader::new(32, flags, 3, 800, -200, 90, "V").unwrap();
        assert_eq!(header.index_area_size, 18);
        let bytes = dump(&header);
        #[rustfmt::skip]
        let expected = vec![
            22,             // length
            2,              // file flag
            0, 0, 0, 1,     // version
            32,             // font size
            0,              // render mode
            0b0000_1001,    // flags, crop dropped
            18, 0, 0, 0,    // index area size
            1,              // name length
            0x20, 0x03,     // ascent
            0x38, 0xFF,     // descent
            90, 0,          // line gap
            b'V', 0,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn long_names_are_rejected() {
        let name = "n".repeat(300);
        assert!(matches!(
            BitmapHeader::new(1, 1, RenderMode::Mono, HeaderFlags::default(), 1, &name),
            Err(Error::FontNameTooLong(300))
        ));
    }
}
