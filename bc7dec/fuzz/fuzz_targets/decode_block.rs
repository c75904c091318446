#![no_main]

extern crate libfuzzer_sys;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: [u8; 16]| {
    // Any 16 byte input must either decode to a full tile or fail cleanly.
    let _ = bc7dec::decode_block(&data);
});
