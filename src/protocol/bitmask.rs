//! Value masks and masked attribute lists
//!
//! Requests such as CreateGC carry a 32-bit value mask followed by one
//! payload per set bit. Payloads appear in ascending bit order, so a
//! resource type describes its attributes once as a table of
//! [`MaskedField`]s indexed by bit, and [`Bitmask`] drives both decoding
//! from the wire and masked copies between two resources.

use super::errors::*;
use super::requests::RequestReader;

/// Decodes one payload into its slot of the target.
pub type FieldDecoder<T> = fn(&mut T, &mut RequestReader<'_>) -> RequestResult<()>;

/// Copies one slot from a source resource into a destination.
pub type FieldCopier<T> = fn(&mut T, &T);

/// One entry of a masked attribute table. The entry's position in the table
/// is its bit index.
pub struct MaskedField<T> {
    pub name: &'static str,
    /// Bytes consumed from the value list when this bit is set
    pub width: usize,
    pub decode: FieldDecoder<T>,
    pub copy: FieldCopier<T>,
}

/// Immutable set of 32 flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitmask(u32);

impl Bitmask {
    pub const EMPTY: Bitmask = Bitmask(0);

    pub fn new(bits: u32) -> Self {
        Bitmask(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_set(&self, index: usize) -> bool {
        index < 32 && self.0 & (1 << index) != 0
    }

    pub fn intersects(&self, flags: u32) -> bool {
        self.0 & flags != 0
    }

    /// Set bit indices, lowest first
    pub fn iter(&self) -> SetBits {
        SetBits(self.0)
    }

    /// Apply every masked payload in `reader` to `target`.
    ///
    /// Bits are visited strictly in ascending order and each set bit consumes
    /// exactly its field's width. Bits past the end of `table` are ignored.
    pub fn decode_into<T>(
        &self,
        table: &[MaskedField<T>],
        target: &mut T,
        reader: &mut RequestReader<'_>,
    ) -> RequestResult<()> {
        for index in self.iter().take_while(|&index| index < table.len()) {
            let field = &table[index];
            let mut value = reader.sub_reader(field.width)?;
            (field.decode)(target, &mut value)?;
        }
        Ok(())
    }

    /// Copy every masked slot from `src` into `dst`, in ascending bit order.
    pub fn copy_into<T>(&self, table: &[MaskedField<T>], src: &T, dst: &mut T) {
        for index in self.iter().take_while(|&index| index < table.len()) {
            (table[index].copy)(dst, src);
        }
    }
}

impl From<u32> for Bitmask {
    fn from(bits: u32) -> Self {
        Bitmask(bits)
    }
}

/// Iterator over the set bits of a [`Bitmask`]
pub struct SetBits(u32);

impl Iterator for SetBits {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(index)
    }
}
