mod common;

use approx::assert_abs_diff_eq;
use common::{ramp_pages, with_tmp_dir, write_raw_tiff, write_stack, RawPage};
use stackpix_core::{AxisOrder, Dtype, Error as CoreError};
use stackpix_io::{
    inspect_tiff, inspect_tiff_transformed, read_tiff, Error, TiffArray, TiffReader,
};
use std::fs;
use tiff::encoder::colortype;

#[test]
fn test_inspect_gray_stack() {
    with_tmp_dir(|dir| {
        let path = dir.join("stack.tif");
        write_stack::<colortype::Gray16>(&path, 4, 3, &ramp_pages(4, 3, 5));

        let info = inspect_tiff(&path).unwrap();
        assert_eq!(info.shape, vec![3, 4, 5, 1]);
        assert_eq!(info.dtype, Dtype::U16);
    });
}

#[test]
fn test_inspect_rgb_image() {
    with_tmp_dir(|dir| {
        let path = dir.join("rgb.tif");
        write_stack::<colortype::RGB8>(&path, 2, 2, &[vec![0_u8; 12]]);

        let info = inspect_tiff(&path).unwrap();
        assert_eq!(info.shape, vec![2, 2, 1, 3]);
        assert_eq!(info.dtype, Dtype::U8);
    });
}

#[test]
fn test_inspect_transformed() {
    with_tmp_dir(|dir| {
        let path = dir.join("stack.tif");
        write_stack::<colortype::Gray16>(&path, 4, 3, &ramp_pages(4, 3, 6));
        let order = AxisOrder::CHANNEL_FIRST;

        let info = inspect_tiff_transformed(&path, &order, 1).unwrap();
        assert_eq!(info.shape, vec![1, 1, 6, 3, 4]);

        let info = inspect_tiff_transformed(&path, &order, 3).unwrap();
        assert_eq!(info.shape, vec![3, 1, 2, 3, 4]);

        let err = inspect_tiff_transformed(&path, &order, 4).unwrap_err();
        assert!(matches!(
            err,
            Error::CoreError(CoreError::InvalidChannelFold { factor: 4, pages: 6 })
        ));
    });
}

#[test]
fn test_read_volume_canonical_order() {
    with_tmp_dir(|dir| {
        let path = dir.join("stack.tif");
        write_stack::<colortype::Gray16>(&path, 4, 3, &ramp_pages(4, 3, 5));

        let TiffArray::U16(array) = read_tiff(&path, &AxisOrder::CANONICAL, 1).unwrap() else {
            panic!("expected a u16 array");
        };
        assert_eq!(array.shape(), &[1, 3, 4, 5, 1]);
        assert!(array.is_standard_layout());
        for t in 0..5 {
            for y in 0..3 {
                for x in 0..4 {
                    let expected = u16::try_from(t * 100 + y * 4 + x).unwrap();
                    assert_eq!(array[[0, y, x, t, 0]], expected);
                }
            }
        }
    });
}

#[test]
fn test_read_single_page_adds_time_axis() {
    with_tmp_dir(|dir| {
        let path = dir.join("image.tif");
        write_stack::<colortype::Gray16>(&path, 4, 3, &ramp_pages(4, 3, 1));

        let array = read_tiff(&path, &"tczyx".parse().unwrap(), 1).unwrap();
        assert_eq!(array.shape(), &[1, 1, 1, 3, 4]);
        assert_eq!(array.dtype(), Dtype::U16);
    });
}

#[test]
fn test_read_folds_pages_into_channels() {
    with_tmp_dir(|dir| {
        let path = dir.join("stack.tif");
        write_stack::<colortype::Gray16>(&path, 2, 1, &ramp_pages(2, 1, 4));

        let TiffArray::U16(array) = read_tiff(&path, &AxisOrder::CANONICAL, 2).unwrap() else {
            panic!("expected a u16 array");
        };
        assert_eq!(array.shape(), &[1, 1, 2, 2, 2]);
        // page j * 2 + i lands at time j, channel i
        for j in 0..2 {
            for i in 0..2 {
                let page = u16::try_from((j * 2 + i) * 100).unwrap();
                assert_eq!(array[[0, 0, 0, j, i]], page);
                assert_eq!(array[[0, 0, 1, j, i]], page + 1);
            }
        }
    });
}

#[test]
fn test_read_float_stack() {
    with_tmp_dir(|dir| {
        let path = dir.join("float.tif");
        let pages = vec![vec![0.5_f32; 6], vec![1.25_f32; 6]];
        write_stack::<colortype::Gray32Float>(&path, 3, 2, &pages);

        let TiffArray::F32(array) = read_tiff(&path, &AxisOrder::CANONICAL, 1).unwrap() else {
            panic!("expected an f32 array");
        };
        assert_abs_diff_eq!(array[[0, 1, 2, 0, 0]], 0.5);
        assert_abs_diff_eq!(array[[0, 0, 0, 1, 0]], 1.25);
    });
}

#[test]
fn test_read_rejects_unreadable_dtype() {
    with_tmp_dir(|dir| {
        let path = dir.join("wide.tif");
        write_stack::<colortype::Gray64>(&path, 2, 2, &[vec![1_u64; 4]]);

        assert_eq!(inspect_tiff(&path).unwrap().dtype, Dtype::U64);
        let err = read_tiff(&path, &AxisOrder::CANONICAL, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::CoreError(CoreError::UnsupportedDtype(Dtype::U64))
        ));
    });
}

#[test]
fn test_mixed_page_geometry_is_unsupported() {
    with_tmp_dir(|dir| {
        let path = dir.join("mixed.tif");
        let file = fs::File::create(&path).unwrap();
        let mut encoder = tiff::encoder::TiffEncoder::new(std::io::BufWriter::new(file)).unwrap();
        encoder
            .write_image::<colortype::Gray16>(2, 2, &[0; 4])
            .unwrap();
        encoder
            .write_image::<colortype::Gray16>(3, 2, &[0; 6])
            .unwrap();
        drop(encoder);

        let err = inspect_tiff(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    });
}

#[test]
fn test_not_a_tiff_is_unsupported() {
    with_tmp_dir(|dir| {
        let path = dir.join("notes.tif");
        fs::write(&path, b"definitely not a tiff").unwrap();

        let err = inspect_tiff(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { ref path, .. } if path.ends_with("notes.tif")));
    });
}

#[test]
fn test_oversized_pages_are_rejected_before_decoding() {
    with_tmp_dir(|dir| {
        let path = dir.join("huge.tif");
        let page = || RawPage {
            width: 1 << 31,
            height: 1 << 31,
            bits_per_sample: 8,
            data: vec![0],
            strip_offset: None,
        };
        write_raw_tiff(&path, &[page(), page()]);

        let info = inspect_tiff(&path).unwrap();
        assert_eq!(info.shape, vec![1 << 31, 1 << 31, 2, 1]);

        let err = read_tiff(&path, &AxisOrder::CANONICAL, 1).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { ref path, .. } if path.ends_with("huge.tif")));
        let err = read_tiff(&path, &AxisOrder::CANONICAL, 2).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    });
}

#[test]
fn test_reader_keeps_its_path() {
    with_tmp_dir(|dir| {
        let path = dir.join("stack.tif");
        write_stack::<colortype::Gray8>(&path, 2, 2, &[vec![1; 4]]);

        let reader = TiffReader::open(&path).unwrap();
        assert_eq!(reader.path(), path.as_path());
    });
}
