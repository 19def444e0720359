#![no_main]

use libfuzzer_sys::fuzz_target;
use limbsync_wire::{
    decode_color, decode_hand, decode_rotation, decode_vector_bounded, encode_color,
    encode_rotation, pack_fingers, unpack_fingers, SharedFrame,
};

fuzz_target!(|words: (u32, u64, u64)| {
    let (a, b, c) = words;

    let q = decode_rotation(a);
    assert!(q.is_finite());
    assert!((q.norm() - 1.0).abs() < 1e-3);
    assert_ne!(encode_rotation(q), 0);

    let curls = unpack_fingers(a);
    assert!(curls.0.iter().all(|c| (0.0..=1.0).contains(c)));
    assert_eq!(unpack_fingers(pack_fingers(&curls)), curls);

    assert_eq!(encode_color(decode_color(a)), a);

    let v = decode_vector_bounded(a, 2.0);
    assert!(v.is_finite());

    let (pos, rot) = decode_hand(b);
    assert!(pos.is_finite() && rot.is_finite());

    let frame = SharedFrame {
        root_rotation: a,
        head_rotation: a.rotate_left(7),
        left_hand: b,
        right_hand: c,
        position: c.rotate_left(13),
        status: a ^ 0x2000,
        accessory_pos_rot: b ^ c,
        accessory_color: a,
    };
    let state = frame.decode(false);
    assert!(state.root_rotation.is_none());
    assert!((0.0..=1.0).contains(&state.loudness));
    if let Some(accessory) = state.accessory {
        assert!(accessory.local_position.length() <= 1.0 + 1e-4);
    }
});
