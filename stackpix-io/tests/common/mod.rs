#![allow(dead_code)]

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use tiff::encoder::colortype::ColorType;
use tiff::encoder::{TiffEncoder, TiffValue};

pub fn with_tmp_dir<T, F: FnMut(PathBuf) -> T>(mut func: F) -> T {
    let dir = tempdir().unwrap();
    let path = dir.path().to_path_buf();
    func(path)
}

/// Writes one TIFF page per entry of `pages`, all with the same geometry.
pub fn write_stack<C>(path: &Path, width: u32, height: u32, pages: &[Vec<C::Inner>])
where
    C: ColorType,
    [C::Inner]: TiffValue,
{
    let file = File::create(path).unwrap();
    let mut encoder = TiffEncoder::new(BufWriter::new(file)).unwrap();
    for page in pages {
        encoder.write_image::<C>(width, height, page).unwrap();
    }
}

/// Pages whose pixel at `(y, x)` of page `t` holds `t * 100 + y * width + x`.
pub fn ramp_pages(width: usize, height: usize, pages: usize) -> Vec<Vec<u16>> {
    (0..pages)
        .map(|t| {
            (0..width * height)
                .map(|i| u16::try_from(t * 100 + i).unwrap())
                .collect()
        })
        .collect()
}

/// One uncompressed single-strip grayscale page for [`write_raw_tiff`].
pub struct RawPage {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: u16,
    /// Strip contents, written after all IFDs.
    pub data: Vec<u8>,
    /// Overrides the strip offset, e.g. to point past the end of the file.
    pub strip_offset: Option<u32>,
}

const IFD_ENTRIES: u16 = 9;
const IFD_LEN: u32 = 2 + 12 * IFD_ENTRIES as u32 + 4;

fn push_short(out: &mut Vec<u8>, tag: u16, value: u16) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&3_u16.to_le_bytes());
    out.extend_from_slice(&1_u32.to_le_bytes());
    out.extend_from_slice(&value.to_le_bytes());
    out.extend_from_slice(&[0, 0]);
}

fn push_long(out: &mut Vec<u8>, tag: u16, value: u32) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&4_u16.to_le_bytes());
    out.extend_from_slice(&1_u32.to_le_bytes());
    out.extend_from_slice(&value.to_le_bytes());
}

/// Writes a little-endian TIFF header by hand, so tests can declare
/// geometry or strip offsets that no encoder would produce.
pub fn write_raw_tiff(path: &Path, pages: &[RawPage]) {
    let count = u32::try_from(pages.len()).unwrap();
    let mut data_offset = 8 + IFD_LEN * count;

    let mut out = b"II*\0".to_vec();
    out.extend_from_slice(&8_u32.to_le_bytes());
    for (i, page) in pages.iter().enumerate() {
        let index = u32::try_from(i).unwrap();
        let strip_len = u32::try_from(page.data.len()).unwrap();
        out.extend_from_slice(&IFD_ENTRIES.to_le_bytes());
        push_long(&mut out, 256, page.width);
        push_long(&mut out, 257, page.height);
        push_short(&mut out, 258, page.bits_per_sample);
        push_short(&mut out, 259, 1);
        push_short(&mut out, 262, 1);
        push_long(&mut out, 273, page.strip_offset.unwrap_or(data_offset));
        push_short(&mut out, 277, 1);
        push_long(&mut out, 278, page.height);
        push_long(&mut out, 279, strip_len);
        let next = if index + 1 < count {
            8 + IFD_LEN * (index + 1)
        } else {
            0
        };
        out.extend_from_slice(&next.to_le_bytes());
        data_offset += strip_len;
    }
    for page in pages {
        out.extend_from_slice(&page.data);
    }
    std::fs::write(path, out).unwrap();
}
