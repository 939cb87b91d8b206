//! Bounds-checked 32-bit cell access over byte regions.
//!
//! A batch region is a byte slice viewed as an array of little-endian
//! 32-bit cells. Integer and float cells share the same backing bytes;
//! which view applies to a cell is determined entirely by the procedure
//! table, never by the data.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::Error;

/// Bytes per cell.
pub(crate) const CELL: usize = 4;

/// Number of whole cells in a region.
pub(crate) fn cell_count(region: &[u8]) -> usize {
    region.len() / CELL
}

pub(crate) fn get_int(region: &[u8], pos: usize) -> Result<i32, Error> {
    region
        .get(pos * CELL..pos * CELL + CELL)
        .map(LittleEndian::read_i32)
        .ok_or(Error::Truncated { pos, len: region.len() })
}

pub(crate) fn get_float(region: &[u8], pos: usize) -> Result<f32, Error> {
    region
        .get(pos * CELL..pos * CELL + CELL)
        .map(LittleEndian::read_f32)
        .ok_or(Error::Truncated { pos, len: region.len() })
}

pub(crate) fn put_int(region: &mut [u8], pos: usize, value: i32) -> Result<(), Error> {
    let capacity = cell_count(region);
    region
        .get_mut(pos * CELL..pos * CELL + CELL)
        .map(|cell| LittleEndian::write_i32(cell, value))
        .ok_or(Error::BatchFull { needed: pos + 1, capacity })
}

pub(crate) fn put_float(region: &mut [u8], pos: usize, value: f32) -> Result<(), Error> {
    let capacity = cell_count(region);
    region
        .get_mut(pos * CELL..pos * CELL + CELL)
        .map(|cell| LittleEndian::write_f32(cell, value))
        .ok_or(Error::BatchFull { needed: pos + 1, capacity })
}

/// Cells a string occupies on the wire: a length cell plus one per unit.
pub(crate) fn str_cells(s: &str) -> usize {
    1 + s.chars().count()
}

/// Writes `s` at `pos` as a length cell followed by one cell per code unit.
/// Returns the position past the string.
pub(crate) fn put_str(region: &mut [u8], mut pos: usize, s: &str) -> Result<usize, Error> {
    put_int(region, pos, s.chars().count() as i32)?;
    pos += 1;
    for unit in s.chars() {
        put_int(region, pos, unit as i32)?;
        pos += 1;
    }
    Ok(pos)
}

/// Reads a string written by [`put_str`]. Returns it with the position past
/// the string.
pub(crate) fn get_str(region: &[u8], mut pos: usize) -> Result<(String, usize), Error> {
    let count = get_int(region, pos)?;
    if count < 0 {
        return Err(Error::Malformed { pos, cell: count });
    }
    pos += 1;
    let mut out = String::with_capacity(count as usize);
    for _ in 0..count {
        let cell = get_int(region, pos)?;
        let unit = u32::try_from(cell)
            .ok()
            .and_then(char::from_u32)
            .ok_or(Error::Malformed { pos, cell })?;
        out.push(unit);
        pos += 1;
    }
    Ok((out, pos))
}
