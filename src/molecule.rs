//! Minimal typed readers over the Molecule binary layout CoTA entries are
//! encoded with. This is not a general-purpose Molecule implementation,
//! just enough of the `table`, `fixvec` and `dynvec` layouts to walk the
//! CoTA entry schemas the Codec Adapters layer consumes.

use crate::error::CodecError;

fn u32_le(data: &[u8], at: usize) -> Result<u32, CodecError> {
    let end = at + 4;
    if data.len() < end {
        return Err(CodecError::TooShort { need: end, got: data.len() });
    }
    Ok(u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]))
}

/// A Molecule `table`: `total_size:u32 | offset_1:u32 .. offset_n:u32 | field data...`.
/// Every field, fixed or dynamic size, is addressed by its offset.
pub struct Table<'a> {
    data: &'a [u8],
    field_count: usize,
}

impl<'a> Table<'a> {
    pub fn new(data: &'a [u8], field_count: usize) -> Result<Self, CodecError> {
        let total = u32_le(data, 0)? as usize;
        if data.len() < total {
            return Err(CodecError::SizeMismatch { declared: total, actual: data.len() });
        }
        Ok(Self { data: &data[..total], field_count })
    }

    fn offset(&self, i: usize) -> Result<usize, CodecError> {
        u32_le(self.data, 4 + i * 4).map(|v| v as usize)
    }

    pub fn field(&self, i: usize) -> Result<&'a [u8], CodecError> {
        let start = self.offset(i)?;
        let end = if i + 1 < self.field_count { self.offset(i + 1)? } else { self.data.len() };
        if start > end || end > self.data.len() {
            return Err(CodecError::SizeMismatch { declared: end, actual: self.data.len() });
        }
        Ok(&self.data[start..end])
    }
}

/// A Molecule `dynvec`: same offset-table shape as `Table`, but the item
/// count is derived from the first offset rather than known up front.
pub struct DynVec<'a> {
    data: &'a [u8],
    len: usize,
}

impl<'a> DynVec<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, CodecError> {
        let total = u32_le(data, 0)? as usize;
        if data.len() < total {
            return Err(CodecError::SizeMismatch { declared: total, actual: data.len() });
        }
        let data = &data[..total];
        if total == 4 {
            return Ok(Self { data, len: 0 });
        }
        let first_offset = u32_le(data, 4)? as usize;
        if first_offset < 4 || (first_offset - 4) % 4 != 0 {
            return Err(CodecError::SizeMismatch { declared: first_offset, actual: total });
        }
        Ok(Self { data, len: (first_offset - 4) / 4 })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn offset(&self, i: usize) -> Result<usize, CodecError> {
        u32_le(self.data, 4 + i * 4).map(|v| v as usize)
    }

    pub fn get(&self, i: usize) -> Result<&'a [u8], CodecError> {
        let start = self.offset(i)?;
        let end = if i + 1 < self.len { self.offset(i + 1)? } else { self.data.len() };
        if start > end || end > self.data.len() {
            return Err(CodecError::SizeMismatch { declared: end, actual: self.data.len() });
        }
        Ok(&self.data[start..end])
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<&'a [u8], CodecError>> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }
}

/// A Molecule `fixvec`: `item_count:u32 | item bytes, item_size each`.
pub struct FixVec<'a> {
    data: &'a [u8],
    item_size: usize,
    len: usize,
}

impl<'a> FixVec<'a> {
    pub fn new(data: &'a [u8], item_size: usize) -> Result<Self, CodecError> {
        let len = u32_le(data, 0)? as usize;
        let need = 4 + len * item_size;
        if data.len() < need {
            return Err(CodecError::TooShort { need, got: data.len() });
        }
        Ok(Self { data: &data[..need], item_size, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, i: usize) -> &'a [u8] {
        let start = 4 + i * self.item_size;
        &self.data[start..start + self.item_size]
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }
}

/// A Molecule dynamic `Bytes`: `len:u32 | raw bytes`.
pub fn raw_bytes(data: &[u8]) -> Result<&[u8], CodecError> {
    let len = u32_le(data, 0)? as usize;
    let need = 4 + len;
    if data.len() < need {
        return Err(CodecError::TooShort { need, got: data.len() });
    }
    Ok(&data[4..need])
}

pub fn take(data: &[u8], n: usize) -> Result<&[u8], CodecError> {
    if data.len() < n {
        return Err(CodecError::TooShort { need: n, got: data.len() });
    }
    Ok(&data[..n])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_table(fields: &[&[u8]]) -> Vec<u8> {
        let header_len = 4 + fields.len() * 4;
        let mut offsets = Vec::with_capacity(fields.len());
        let mut cursor = header_len;
        for f in fields {
            offsets.push(cursor as u32);
            cursor += f.len();
        }
        let mut out = Vec::with_capacity(cursor);
        out.extend_from_slice(&(cursor as u32).to_le_bytes());
        for o in &offsets {
            out.extend_from_slice(&o.to_le_bytes());
        }
        for f in fields {
            out.extend_from_slice(f);
        }
        out
    }

    #[test]
    fn table_round_trip() {
        let raw = build_table(&[&[1, 2, 3], &[9, 9]]);
        let t = Table::new(&raw, 2).unwrap();
        assert_eq!(t.field(0).unwrap(), &[1, 2, 3]);
        assert_eq!(t.field(1).unwrap(), &[9, 9]);
    }

    #[test]
    fn fixvec_round_trip() {
        let mut raw = vec![2, 0, 0, 0];
        raw.extend_from_slice(&[1, 2, 3, 4]);
        raw.extend_from_slice(&[5, 6, 7, 8]);
        let v = FixVec::new(&raw, 4).unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v.get(0), &[1, 2, 3, 4]);
        assert_eq!(v.get(1), &[5, 6, 7, 8]);
    }

    #[test]
    fn dynvec_round_trip() {
        let items: Vec<Vec<u8>> = vec![build_table(&[&[1, 2]]), build_table(&[&[3, 4, 5]])];
        let refs: Vec<&[u8]> = items.iter().map(|v| v.as_slice()).collect();
        let raw = build_table(&refs);
        // build_table already produces a correctly offset dynvec-shaped blob
        // when every "field" is itself a sub-table.
        let dv = DynVec::new(&raw).unwrap();
        assert_eq!(dv.len(), 2);
        assert_eq!(Table::new(dv.get(0).unwrap(), 1).unwrap().field(0).unwrap(), &[1, 2]);
    }

    #[test]
    fn raw_bytes_round_trip() {
        let mut raw = vec![3, 0, 0, 0];
        raw.extend_from_slice(&[7, 8, 9]);
        assert_eq!(raw_bytes(&raw).unwrap(), &[7, 8, 9]);
    }
}
