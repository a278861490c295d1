//! The index area and assembly of complete font files.
//!
//! A font file is a header, an index area and the glyph records in ascending
//! code point order. The index is reserved up front, filled with a sentinel,
//! and patched while records are appended.

use crate::{
    header::IndexMethod,
    write::{ByteWriter, FontWrite},
};

/// Number of slots in address mode indexes, one per BMP code point.
pub const ADDRESS_SLOTS: usize = 0x10000;

/// The layout of a font's index area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexLayout {
    /// A u16 record ordinal for every code point.
    BitmapAddress,
    /// A u16 code point per requested character, in ascending order.
    BitmapOffset { count: usize },
    /// A u32 file offset for every code point.
    BitmapCrop,
    /// A u32 file offset for every code point.
    VectorAddress,
    /// A u16 code point followed by a u32 file offset per requested character.
    VectorOffset { count: usize },
}

impl IndexLayout {
    /// The index layout of a bitmap font.
    ///
    /// Cropped glyph records vary in size, so they are always located by
    /// file offset, regardless of `method`.
    pub fn bitmap(method: IndexMethod, crop: bool, count: usize) -> Self {
        match (crop, method) {
            (true, _) => IndexLayout::BitmapCrop,
            (false, IndexMethod::Address) => IndexLayout::BitmapAddress,
            (false, IndexMethod::Offset) => IndexLayout::BitmapOffset { count },
        }
    }

    pub fn vector(method: IndexMethod, count: usize) -> Self {
        match method {
            IndexMethod::Address => IndexLayout::VectorAddress,
            IndexMethod::Offset => IndexLayout::VectorOffset { count },
        }
    }

    pub fn entry_count(&self) -> usize {
        match self {
            IndexLayout::BitmapAddress | IndexLayout::BitmapCrop | IndexLayout::VectorAddress => {
                ADDRESS_SLOTS
            }
            IndexLayout::BitmapOffset { count } | IndexLayout::VectorOffset { count } => *count,
        }
    }

    /// Byte size of a single slot.
    pub fn entry_size(&self) -> usize {
        match self {
            IndexLayout::BitmapAddress | IndexLayout::BitmapOffset { .. } => 2,
            IndexLayout::BitmapCrop | IndexLayout::VectorAddress => 4,
            IndexLayout::VectorOffset { .. } => 6,
        }
    }

    /// Byte size of the whole index area.
    pub fn area_size(&self) -> usize {
        self.entry_count() * self.entry_size()
    }

    /// Returns true if slots are addressed by code point rather than by
    /// record ordinal.
    pub fn is_addressed(&self) -> bool {
        matches!(
            self,
            IndexLayout::BitmapAddress | IndexLayout::BitmapCrop | IndexLayout::VectorAddress
        )
    }

    /// The bytes of the slot describing a record.
    fn entry(&self, unicode: u32, ordinal: usize, offset: usize) -> Vec<u8> {
        match self {
            IndexLayout::BitmapAddress => (ordinal as u16).to_le_bytes().to_vec(),
            IndexLayout::BitmapOffset { .. } => (unicode as u16).to_le_bytes().to_vec(),
            IndexLayout::BitmapCrop | IndexLayout::VectorAddress => {
                (offset as u32).to_le_bytes().to_vec()
            }
            IndexLayout::VectorOffset { .. } => {
                let mut bytes = (unicode as u16).to_le_bytes().to_vec();
                bytes.extend_from_slice(&(offset as u32).to_le_bytes());
                bytes
            }
        }
    }
}

/// Builds a font file from a header and a sequence of glyph records.
///
/// Records must be pushed in ascending code point order.
pub struct FileAssembler {
    writer: ByteWriter,
    layout: IndexLayout,
    index_start: usize,
    records: usize,
}

impl FileAssembler {
    /// Write the header and reserve the index area, filled with the
    /// all-ones sentinel.
    pub fn new(header: &(impl FontWrite + ?Sized), layout: IndexLayout) -> Self {
        let mut writer = ByteWriter::new();
        writer.write(header);
        let index_start = writer.reserve(layout.area_size());
        writer.patch(index_start, &vec![0xFF; layout.area_size()]);
        Self {
            writer,
            layout,
            index_start,
            records: 0,
        }
    }

    /// Append the record for `unicode` and point its index slot at it.
    pub fn push_record(&mut self, unicode: u32, record: &(impl FontWrite + ?Sized)) {
        let offset = self.writer.len();
        let slot = if self.layout.is_addressed() {
            unicode as usize
        } else {
            // offset slots are filled in record order, so a slot's position
            // is its record's ordinal and unused slots trail at the end
            self.records
        };
        if slot < self.layout.entry_count() {
            let entry = self.layout.entry(unicode, self.records, offset);
            self.writer
                .patch(self.index_start + slot * entry.len(), &entry);
        } else {
            log::warn!("no index slot for U+{unicode:04X}, record is unreachable");
        }
        self.writer.write(record);
        self.records += 1;
    }

    /// Number of records pushed so far.
    pub fn record_count(&self) -> usize {
        self.records
    }

    pub fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Raw(Vec<u8>);

    impl FontWrite for Raw {
        fn write_into(&self, writer: &mut ByteWriter) {
            writer.write_slice(&self.0)
        }
    }

    #[test]
    fn area_sizes() {
        use IndexMethod::*;
        assert_eq!(IndexLayout::bitmap(Address, false, 7).area_size(), 131072);
        assert_eq!(IndexLayout::bitmap(Offset, false, 7).area_size(), 14);
        assert_eq!(IndexLayout::bitmap(Address, true, 7).area_size(), 262144);
        assert_eq!(IndexLayout::bitmap(Offset, true, 7).area_size(), 262144);
        assert_eq!(IndexLayout::vector(Address, 7).area_size(), 262144);
        assert_eq!(IndexLayout::vector(Offset, 7).area_size(), 42);
    }

    #[test]
    fn address_slots_hold_ordinals() {
        let mut assembler = FileAssembler::new(&Raw(vec![9]), IndexLayout::BitmapAddress);
        assembler.push_record(0x41, &Raw(vec![1, 1]));
        assembler.push_record(0x43, &Raw(vec![2, 2]));
        let bytes = assembler.finish();
        let index = &bytes[1..1 + 131072];
        assert_eq!(&index[0x41 * 2..0x41 * 2 + 2], &[0, 0]);
        assert_eq!(&index[0x42 * 2..0x42 * 2 + 2], &[0xFF, 0xFF]);
        assert_eq!(&index[0x43 * 2..0x43 * 2 + 2], &[1, 0]);
        assert_eq!(&bytes[1 + 131072..], &[1, 1, 2, 2]);
    }

    #[test]
    fn offset_slots_fill_in_order() {
        // three characters requested, only two rendered
        let layout = IndexLayout::BitmapOffset { count: 3 };
        let mut assembler = FileAssembler::new(&Raw(vec![]), layout);
        assembler.push_record(0x20, &Raw(vec![7]));
        assembler.push_record(0x4E00, &Raw(vec![8]));
        assert_eq!(assembler.record_count(), 2);
        let bytes = assembler.finish();
        assert_eq!(bytes, vec![0x20, 0x00, 0x00, 0x4E, 0xFF, 0xFF, 7, 8]);
    }

    #[test]
    fn crop_slots_hold_file_offsets() {
        let mut assembler = FileAssembler::new(&Raw(vec![0; 5]), IndexLayout::BitmapCrop);
        assembler.push_record(0x01, &Raw(vec![1, 2, 3]));
        assembler.push_record(0x02, &Raw(vec![4]));
        let bytes = assembler.finish();
        let first = 5 + 262144;
        assert_eq!(&bytes[5..9], &[0xFF; 4]);
        assert_eq!(&bytes[9..13], &(first as u32).to_le_bytes());
        assert_eq!(&bytes[13..17], &(first as u32 + 3).to_le_bytes());
        assert_eq!(bytes.len(), first + 4);
    }

    #[test]
    fn vector_offset_slots_pair_code_point_and_offset() {
        let layout = IndexLayout::VectorOffset { count: 2 };
        let mut assembler = FileAssembler::new(&Raw(vec![0xAA]), layout);
        assembler.push_record(0x3042, &Raw(vec![5, 5]));
        let bytes = assembler.finish();
        assert_eq!(
            bytes,
            vec![0xAA, 0x42, 0x30, 13, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 5, 5]
        );
    }
}
