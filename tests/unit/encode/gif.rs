use std::io::Cursor;

use image::AnimationDecoder as _;

use super::*;
use crate::foundation::core::Rgba8;

fn solid_frame(side: u32, rgba: [u8; 4]) -> FrameRgba {
    let data = rgba
        .iter()
        .copied()
        .cycle()
        .take(side as usize * side as usize * 4)
        .collect();
    FrameRgba::new(side, side, data).unwrap()
}

fn decode_frames(bytes: &[u8]) -> Vec<image::Frame> {
    let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(bytes)).unwrap();
    decoder.into_frames().collect_frames().unwrap()
}

#[test]
fn options_validation_catches_bad_sizes() {
    assert!(SessionOptions::square(0, Rgba8::WHITE).validate().is_err());
    assert!(SessionOptions::square(70_000, Rgba8::WHITE).validate().is_err());
    assert!(SessionOptions::square(16, Rgba8::WHITE).validate().is_ok());
    assert!(GifSession::with_speed(SessionOptions::square(16, Rgba8::WHITE), 0).is_err());
}

#[test]
fn finalize_emits_decodable_animation() {
    let mut session = GifSession::new(SessionOptions::square(16, Rgba8::WHITE)).unwrap();
    session
        .submit_frame(&solid_frame(16, [255, 0, 0, 255]), 70)
        .unwrap();
    session
        .submit_frame(&solid_frame(16, [0, 0, 255, 255]), 70)
        .unwrap();
    assert_eq!(session.frames_submitted(), 2);

    let bytes = session.finalize().unwrap();
    assert_eq!(&bytes[..6], b"GIF89a");
    assert_eq!(session.state(), SessionState::Finalized);

    let frames = decode_frames(&bytes);
    assert_eq!(frames.len(), 2);
    let (num, den) = frames[0].delay().numer_denom_ms();
    assert_eq!(num / den, 70);
}

#[test]
fn finalize_twice_and_submit_after_finalize_are_errors() {
    let mut session = GifSession::new(SessionOptions::square(8, Rgba8::WHITE)).unwrap();
    session
        .submit_frame(&solid_frame(8, [1, 2, 3, 255]), 50)
        .unwrap();
    session.finalize().unwrap();

    assert!(matches!(session.finalize(), Err(SpriteError::Encode(_))));
    assert!(matches!(
        session.submit_frame(&solid_frame(8, [1, 2, 3, 255]), 50),
        Err(SpriteError::Encode(_))
    ));
}

#[test]
fn abort_discards_and_blocks_finalize() {
    let mut session = GifSession::new(SessionOptions::square(8, Rgba8::WHITE)).unwrap();
    session
        .submit_frame(&solid_frame(8, [1, 2, 3, 255]), 50)
        .unwrap();
    session.abort();
    session.abort();
    assert_eq!(session.state(), SessionState::Aborted);
    assert!(session.finalize().is_err());
}

#[test]
fn delays_round_to_whole_centiseconds() {
    let mut session = GifSession::new(SessionOptions::square(8, Rgba8::WHITE)).unwrap();
    session
        .submit_frame(&solid_frame(8, [255, 0, 0, 255]), 67)
        .unwrap();
    session
        .submit_frame(&solid_frame(8, [0, 255, 0, 255]), 20)
        .unwrap();
    let frames = decode_frames(&session.finalize().unwrap());
    let ms: Vec<u32> = frames
        .iter()
        .map(|f| {
            let (num, den) = f.delay().numer_denom_ms();
            num / den
        })
        .collect();
    assert_eq!(ms, vec![70, 20]);
}

#[test]
fn size_mismatch_is_rejected() {
    let mut session = GifSession::new(SessionOptions::square(8, Rgba8::WHITE)).unwrap();
    let err = session
        .submit_frame(&solid_frame(4, [0, 0, 0, 255]), 50)
        .unwrap_err();
    assert!(err.to_string().contains("frame size mismatch"));
    assert_eq!(session.frames_submitted(), 0);
}

#[test]
fn finalize_without_frames_fails() {
    let mut session = GifSession::new(SessionOptions::square(8, Rgba8::WHITE)).unwrap();
    assert!(session.finalize().is_err());
    assert_eq!(session.state(), SessionState::Aborted);
}

#[test]
fn flatten_straight_over_black_produces_expected_rgb() {
    // Straight red @ 50% alpha => rgb becomes 128,0,0 over black.
    let src = vec![255u8, 0u8, 0u8, 128u8];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128u8, 0u8, 0u8, 255u8]);
}

#[test]
fn flatten_transparent_takes_background() {
    let src = vec![9u8, 9, 9, 0];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}
