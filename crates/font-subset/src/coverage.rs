//! Character coverage introspection via the cmap table.

use anyhow::{Context, Result};
use read_fonts::{
    FontRef, TableProvider,
    tables::cmap::{Cmap4, Cmap12, CmapSubtable},
};

/// True when the font data parses and carries a cmap table.
pub fn has_cmap(data: &[u8]) -> bool {
    FontRef::new(data).map(|font| font.cmap().is_ok()).unwrap_or(false)
}

/// Codepoints the font maps to glyphs. Prefers a format 12 subtable (full
/// Unicode) and falls back to format 4.
pub fn mapped_codepoints(data: &[u8]) -> Result<Vec<u32>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    let cmap = font.cmap().context("font has no character-to-glyph mapping (cmap) table")?;

    let records = cmap.encoding_records();

    for record in records.iter() {
        if let Ok(CmapSubtable::Format12(subtable)) = record.subtable(cmap.offset_data()) {
            return Ok(codepoints_from_format12(&subtable));
        }
    }

    for record in records.iter() {
        if let Ok(CmapSubtable::Format4(subtable)) = record.subtable(cmap.offset_data()) {
            return Ok(codepoints_from_format4(&subtable));
        }
    }

    Ok(Vec::new())
}

fn codepoints_from_format12(subtable: &Cmap12) -> Vec<u32> {
    let mut codepoints = Vec::new();
    for group in subtable.groups() {
        let mut gid = group.start_glyph_id();
        for cp in group.start_char_code()..=group.end_char_code() {
            if gid != 0 {
                codepoints.push(cp);
            }
            gid += 1;
        }
    }
    codepoints
}

fn codepoints_from_format4(subtable: &Cmap4) -> Vec<u32> {
    let mut codepoints = Vec::new();

    let end_codes = subtable.end_code();
    let start_codes = subtable.start_code();
    let id_deltas = subtable.id_delta();
    let id_range_offsets = subtable.id_range_offsets();
    let glyph_id_array = subtable.glyph_id_array();

    let seg_count = subtable.seg_count_x2() as usize / 2;
    for seg in 0..seg_count {
        let end_code = end_codes.get(seg).map(|v| v.get()).unwrap_or(0xFFFF);
        let start_code = start_codes.get(seg).map(|v| v.get()).unwrap_or(0);
        let id_delta = id_deltas.get(seg).map(|v| v.get()).unwrap_or(0);
        let id_range_offset = id_range_offsets.get(seg).map(|v| v.get()).unwrap_or(0);

        // The final 0xFFFF sentinel segment maps nothing.
        if start_code == 0xFFFF {
            continue;
        }

        for cp in start_code..=end_code {
            let gid = if id_range_offset == 0 {
                ((cp as i32 + id_delta as i32) & 0xFFFF) as u16
            } else {
                // Malformed offsets would index before the glyph id array.
                let glyph_idx = (id_range_offset as usize / 2 + (cp - start_code) as usize)
                    .checked_sub(seg_count - seg);
                match glyph_idx.and_then(|i| glyph_id_array.get(i)) {
                    Some(gid) if gid.get() != 0 => {
                        ((gid.get() as i32 + id_delta as i32) & 0xFFFF) as u16
                    }
                    _ => 0,
                }
            };

            if gid != 0 {
                codepoints.push(cp as u32);
            }
        }
    }

    codepoints
}
