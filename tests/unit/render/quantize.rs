use super::*;

fn pseudo_random_buffer(len: usize) -> Vec<u8> {
    let mut state = 0x2545_F491_4F6C_DD1Du64;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 24) as u8
        })
        .collect()
}

#[test]
fn zero_step_is_rejected() {
    assert!(ColorQuantizer::new(0).is_err());
}

#[test]
fn channels_round_to_nearest_step() {
    let q = ColorQuantizer::new(8).unwrap();
    assert_eq!(q.quantize_channel(0), 0);
    assert_eq!(q.quantize_channel(3), 0);
    assert_eq!(q.quantize_channel(4), 8);
    assert_eq!(q.quantize_channel(12), 16);
    assert_eq!(q.quantize_channel(250), 248);
    assert_eq!(q.quantize_channel(252), 255);
    assert_eq!(q.quantize_channel(255), 255);
}

#[test]
fn alpha_is_untouched() {
    let q = ColorQuantizer::new(16).unwrap();
    let mut px = vec![7u8, 9, 200, 13];
    q.apply(&mut px);
    assert_eq!(px, vec![0, 16, 208, 13]);
}

#[test]
fn quantization_is_idempotent() {
    for step in [8u8, 16] {
        let q = ColorQuantizer::new(step).unwrap();
        let mut once = pseudo_random_buffer(4096);
        q.apply(&mut once);
        let mut twice = once.clone();
        q.apply(&mut twice);
        assert_eq!(once, twice);
    }
}

#[test]
fn trailing_partial_pixel_is_ignored() {
    let q = ColorQuantizer::default();
    let mut buf = vec![3u8, 3, 3, 3, 3, 3];
    q.apply(&mut buf);
    assert_eq!(buf, vec![0, 0, 0, 3, 3, 3]);
}

#[test]
fn serde_uses_bare_step() {
    let q: ColorQuantizer = serde_json::from_str("16").unwrap();
    assert_eq!(q.step(), 16);
    assert!(serde_json::from_str::<ColorQuantizer>("0").is_err());
    assert_eq!(serde_json::to_string(&q).unwrap(), "16");
}
