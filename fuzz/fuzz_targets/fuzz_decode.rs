#![no_main]

use libfuzzer_sys::fuzz_target;
use mt76_usb_dma::core::rx::decode;
use mt76_usb_dma::core::tx::parse_tx;

fuzz_target!(|data: &[u8]| {
    // Device input must never panic or read out of bounds
    if let Ok(frame) = decode(data) {
        assert!(frame.payload.len() + 4 <= data.len());
    }
    let _ = parse_tx(data);
});
