use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_layer_png_dimensions() {
    let layer = decode_layer(&png_bytes(3, 2, [100, 50, 200, 128])).unwrap();
    assert_eq!(layer.width(), 3);
    assert_eq!(layer.height(), 2);
}

#[test]
fn decode_layer_rejects_garbage() {
    let err = decode_layer(b"definitely not a png").unwrap_err();
    assert!(matches!(err, SpriteError::Decode(_)));
}

#[test]
fn from_rgba8_rejects_length_mismatch() {
    assert!(LayerImage::from_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(LayerImage::from_rgba8(0, 0, vec![]).is_err());
}

#[test]
fn decode_pair_joins_both_layers() {
    let ok = png_bytes(2, 2, [255, 0, 0, 255]);
    let pair = decode_pair(&ok, &ok).unwrap();
    assert_eq!(pair.upper.width(), 2);
    assert_eq!(pair.lower.height(), 2);
}

#[test]
fn decode_pair_fails_when_either_layer_fails() {
    let ok = png_bytes(2, 2, [255, 0, 0, 255]);

    let err = decode_pair(&ok, b"bad").unwrap_err();
    assert!(err.to_string().contains("lower layer"));

    let err = decode_pair(b"bad", &ok).unwrap_err();
    assert!(err.to_string().contains("upper layer"));
}
