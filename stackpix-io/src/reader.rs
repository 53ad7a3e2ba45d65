//! Memory-mapped multi-page TIFF reader.
//!

use crate::array::TiffArray;
use crate::{Error, Result};
use log::debug;
use memmap2::Mmap;
use ndarray::{Array3, Array4, Array5, ArrayD, Axis};
use stackpix_core::{standardize_array, AxisOrder, Dtype, ReadPrecision, ShapeDtype};
use std::fmt;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;

type PageDecoder<'a> = Decoder<Cursor<&'a [u8]>>;

/// Largest decoded page accepted, in bytes.
const MAX_PAGE_BYTES: u64 = 1 << 32;

/// Geometry and element type shared by every page of a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageLayout {
    height: usize,
    width: usize,
    samples: usize,
    dtype: Dtype,
}

impl PageLayout {
    /// Samples in one page, or `None` if the header sizes overflow.
    fn page_len(&self) -> Option<usize> {
        self.height.checked_mul(self.width)?.checked_mul(self.samples)
    }
}

impl fmt::Display for PageLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}x{} {}",
            self.height, self.width, self.samples, self.dtype
        )
    }
}

/// Maps the `SampleFormat` / `BitsPerSample` tag pair to a dtype.
fn dtype_from_tags(format: u16, bits: u16) -> Option<Dtype> {
    // SampleFormat: 1 = unsigned, 2 = signed, 3 = IEEE float
    match (format, bits) {
        (1, 8) => Some(Dtype::U8),
        (1, 16) => Some(Dtype::U16),
        (1, 32) => Some(Dtype::U32),
        (1, 64) => Some(Dtype::U64),
        (2, 8) => Some(Dtype::I8),
        (2, 16) => Some(Dtype::I16),
        (2, 32) => Some(Dtype::I32),
        (2, 64) => Some(Dtype::I64),
        (3, 32) => Some(Dtype::F32),
        (3, 64) => Some(Dtype::F64),
        _ => None,
    }
}

/// Returns the single value shared by every sample, if there is one.
fn uniform(values: &[u16]) -> Option<u16> {
    let (&first, rest) = values.split_first()?;
    rest.iter().all(|&v| v == first).then_some(first)
}

/// Element types the reader decodes pixel data into.
trait Sample: Copy + 'static {
    const DTYPE: Dtype;

    fn from_decoded(result: DecodingResult) -> Option<Vec<Self>>;
}

macro_rules! impl_sample {
    ($($t:ty => $variant:ident, $dtype:ident);* $(;)?) => {
        $(
            impl Sample for $t {
                const DTYPE: Dtype = Dtype::$dtype;

                fn from_decoded(result: DecodingResult) -> Option<Vec<Self>> {
                    match result {
                        DecodingResult::$variant(data) => Some(data),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_sample! {
    u8 => U8, U8;
    u16 => U16, U16;
    u32 => U32, U32;
    i16 => I16, I16;
    i32 => I32, I32;
    f32 => F32, F32;
    f64 => F64, F64;
}

/// A read-only memory mapping of a multi-page TIFF file.
pub struct TiffReader {
    mmap: Mmap,
    path: PathBuf,
}

impl TiffReader {
    /// Maps a TIFF file for reading.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedFormat`] if the file cannot be opened and
    /// [`Error::Io`] if it cannot be memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)
            .map_err(|e| Error::unsupported(path.as_ref(), format!("cannot open: {e}")))?;
        // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Path the reader was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decoder(&self) -> Result<PageDecoder<'_>> {
        let decoder = Decoder::new(Cursor::new(&self.mmap[..]))
            .map_err(|e| Error::unsupported(&self.path, e.to_string()))?;
        let mut limits = Limits::unlimited();
        limits.decoding_buffer_size = usize::try_from(MAX_PAGE_BYTES).unwrap_or(usize::MAX);
        Ok(decoder.with_limits(limits))
    }

    fn page_layout(&self, decoder: &mut PageDecoder<'_>) -> Result<PageLayout> {
        let unsupported = |e: tiff::TiffError| Error::unsupported(&self.path, e.to_string());

        let (width, height) = decoder.dimensions().map_err(unsupported)?;
        let samples = decoder
            .find_tag_unsigned::<u16>(Tag::SamplesPerPixel)
            .map_err(unsupported)?
            .unwrap_or(1);
        let bits = decoder
            .find_tag_unsigned_vec::<u16>(Tag::BitsPerSample)
            .map_err(unsupported)?
            .unwrap_or_else(|| vec![1]);
        let formats = decoder
            .find_tag_unsigned_vec::<u16>(Tag::SampleFormat)
            .map_err(unsupported)?
            .unwrap_or_else(|| vec![1]);

        let bits = uniform(&bits).ok_or_else(|| {
            Error::unsupported(&self.path, format!("mixed bits per sample {bits:?}"))
        })?;
        let format = uniform(&formats).ok_or_else(|| {
            Error::unsupported(&self.path, format!("mixed sample formats {formats:?}"))
        })?;
        let dtype = dtype_from_tags(format, bits).ok_or_else(|| {
            Error::unsupported(
                &self.path,
                format!("sample format {format} with {bits} bits per sample"),
            )
        })?;

        Ok(PageLayout {
            height: height as usize,
            width: width as usize,
            samples: usize::from(samples),
            dtype,
        })
    }

    /// Walks every page and returns the shared layout and the page count.
    fn scan(&self) -> Result<(PageLayout, usize)> {
        let mut decoder = self.decoder()?;
        let first = self.page_layout(&mut decoder)?;
        let mut pages = 1;

        while decoder.more_images() {
            decoder
                .next_image()
                .map_err(|e| Error::unsupported(&self.path, e.to_string()))?;
            let layout = self.page_layout(&mut decoder)?;
            if layout != first {
                return Err(Error::unsupported(
                    &self.path,
                    format!("page {pages} is {layout}, page 0 is {first}"),
                ));
            }
            pages += 1;
        }
        Ok((first, pages))
    }

    /// Shape `(y, x, pages, c)` and dtype of the stack.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedFormat`] if the file cannot be decoded, if
    /// pages disagree on geometry or dtype, or if the sample layout has no
    /// matching dtype.
    pub fn inspect(&self) -> Result<ShapeDtype> {
        let (layout, pages) = self.scan()?;
        let info = ShapeDtype::new(
            vec![layout.height, layout.width, pages, layout.samples],
            layout.dtype,
        );
        debug!(
            "inspected {}: shape {:?}, dtype {}",
            self.path.display(),
            info.shape,
            info.dtype
        );
        Ok(info)
    }

    /// Decodes the whole stack into a dense 5-D array in `order`.
    ///
    /// # Errors
    /// Fails on anything [`TiffReader::inspect`] rejects, with
    /// `UnsupportedDtype` for dtypes outside [`ReadPrecision`], and with the
    /// layout errors of [`standardize_array`].
    pub fn read(&self, order: &AxisOrder, pages_to_channel: usize) -> Result<TiffArray> {
        let (layout, pages) = self.scan()?;
        let precision = ReadPrecision::try_from(layout.dtype)?;

        macro_rules! read_as {
            ($t:ty) => {
                TiffArray::from(self.read_standard::<$t>(layout, pages, order, pages_to_channel)?)
            };
        }

        let array = match precision {
            ReadPrecision::Double => read_as!(f64),
            ReadPrecision::Float => read_as!(f32),
            ReadPrecision::Uint32 => read_as!(u32),
            ReadPrecision::Int32 => read_as!(i32),
            ReadPrecision::Uint16 => read_as!(u16),
            ReadPrecision::Int16 => read_as!(i16),
            ReadPrecision::Uint8 => read_as!(u8),
        };
        debug!(
            "read {} as {:?} {} (order {order})",
            self.path.display(),
            array.shape(),
            array.dtype()
        );
        Ok(array)
    }

    fn read_standard<T: Sample>(
        &self,
        layout: PageLayout,
        pages: usize,
        order: &AxisOrder,
        pages_to_channel: usize,
    ) -> Result<Array5<T>> {
        let raw = if pages > 1 {
            self.read_volume::<T>(layout, pages)?
        } else {
            self.read_image::<T>(layout)?
        };
        Ok(standardize_array(raw, order, pages_to_channel)?)
    }

    /// Samples per page, checked against overflow and [`MAX_PAGE_BYTES`].
    fn checked_page_len(&self, layout: PageLayout) -> Result<usize> {
        let overflow = || Error::unsupported(&self.path, format!("page size {layout} overflows"));
        let len = layout.page_len().ok_or_else(overflow)?;
        let bytes = len
            .checked_mul(layout.dtype.size_of())
            .ok_or_else(overflow)?;
        if !u64::try_from(bytes).is_ok_and(|bytes| bytes <= MAX_PAGE_BYTES) {
            return Err(Error::unsupported(
                &self.path,
                format!("page of {bytes} bytes exceeds the {MAX_PAGE_BYTES} byte decode limit"),
            ));
        }
        Ok(len)
    }

    /// Decodes every page into `(y, x, t, c)`.
    fn read_volume<T: Sample>(&self, layout: PageLayout, pages: usize) -> Result<ArrayD<T>> {
        let page_len = self.checked_page_len(layout)?;
        let total = page_len.checked_mul(pages).ok_or_else(|| {
            Error::unsupported(&self.path, format!("{pages} pages of {layout} overflow"))
        })?;
        let mut decoder = self.decoder()?;
        // decoded data may be larger than the file when compressed
        let mut data = Vec::with_capacity(total.min(self.mmap.len()));

        for page in 0..pages {
            if page > 0 {
                decoder.next_image()?;
            }
            data.extend(self.decode_page::<T>(&mut decoder, page_len)?);
        }

        let stack = Array4::from_shape_vec(
            (pages, layout.height, layout.width, layout.samples),
            data,
        )
        .map_err(|e| Error::unsupported(&self.path, e.to_string()))?;
        Ok(stack.permuted_axes([1, 2, 0, 3]).into_dyn())
    }

    /// Decodes a single page into `(y, x, 1, c)`.
    fn read_image<T: Sample>(&self, layout: PageLayout) -> Result<ArrayD<T>> {
        let page_len = self.checked_page_len(layout)?;
        let mut decoder = self.decoder()?;
        let data = self.decode_page::<T>(&mut decoder, page_len)?;

        let image = Array3::from_shape_vec((layout.height, layout.width, layout.samples), data)
            .map_err(|e| Error::unsupported(&self.path, e.to_string()))?;
        Ok(image.insert_axis(Axis(2)).into_dyn())
    }

    fn decode_page<T: Sample>(&self, decoder: &mut PageDecoder<'_>, expected: usize) -> Result<Vec<T>> {
        let data = T::from_decoded(decoder.read_image()?).ok_or_else(|| {
            Error::unsupported(&self.path, format!("decoded pixels are not {}", T::DTYPE))
        })?;
        if data.len() != expected {
            return Err(Error::unsupported(
                &self.path,
                format!("decoded {} samples, expected {expected}", data.len()),
            ));
        }
        Ok(data)
    }
}

/// Shape `(y, x, pages, c)` and dtype of a multi-page TIFF.
///
/// # Errors
/// See [`TiffReader::inspect`].
pub fn inspect_tiff<P: AsRef<Path>>(path: P) -> Result<ShapeDtype> {
    TiffReader::open(path)?.inspect()
}

/// Shape of a multi-page TIFF as [`read_tiff`] would return it.
///
/// # Errors
/// See [`TiffReader::inspect`] and [`ShapeDtype::transformed`].
pub fn inspect_tiff_transformed<P: AsRef<Path>>(
    path: P,
    order: &AxisOrder,
    pages_to_channel: usize,
) -> Result<ShapeDtype> {
    Ok(inspect_tiff(path)?.transformed(order, pages_to_channel)?)
}

/// Reads a multi-page TIFF into a dense 5-D array.
///
/// # Errors
/// See [`TiffReader::read`].
pub fn read_tiff<P: AsRef<Path>>(
    path: P,
    order: &AxisOrder,
    pages_to_channel: usize,
) -> Result<TiffArray> {
    TiffReader::open(path)?.read(order, pages_to_channel)
}
