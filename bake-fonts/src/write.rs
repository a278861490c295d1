//! Little-endian serialization of binary font structures.

/// A type that can be written out as part of a binary font file.
pub trait FontWrite {
    /// Write our little-endian bytes into this [`ByteWriter`].
    fn write_into(&self, writer: &mut ByteWriter);
}

/// A growable output buffer that also supports patching bytes that were
/// written earlier.
///
/// The index area of a font is written before the glyph records whose
/// positions it stores, so those slots are reserved first and patched once
/// the records have been appended.
#[derive(Debug, Default)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current length, which is also the position of the next write.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn write_slice(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes)
    }

    pub fn write(&mut self, obj: &(impl FontWrite + ?Sized)) {
        obj.write_into(self)
    }

    /// Append `len` zero bytes, returning the position of the first one.
    pub fn reserve(&mut self, len: usize) -> usize {
        let pos = self.bytes.len();
        self.bytes.resize(pos + len, 0);
        pos
    }

    /// Overwrite previously written bytes at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if the range was never written.
    pub fn patch(&mut self, pos: usize, bytes: &[u8]) {
        self.bytes[pos..pos + bytes.len()].copy_from_slice(bytes)
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }
}

macro_rules! write_le_bytes {
    ($ty:ty) => {
        impl FontWrite for $ty {
            #[inline]
            fn write_into(&self, writer: &mut ByteWriter) {
                writer.write_slice(&self.to_le_bytes())
            }
        }
    };
}

write_le_bytes!(u8);
write_le_bytes!(u16);
write_le_bytes!(i16);
write_le_bytes!(u32);
write_le_bytes!(i32);

impl<T: FontWrite> FontWrite for [T] {
    fn write_into(&self, writer: &mut ByteWriter) {
        self.iter().for_each(|item| item.write_into(writer))
    }
}

/// Serialize a single object.
pub fn dump<T: FontWrite + ?Sized>(obj: &T) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    obj.write_into(&mut writer);
    writer.into_inner()
}
