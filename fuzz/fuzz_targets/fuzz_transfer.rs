#![no_main]

use libfuzzer_sys::fuzz_target;
use mt76_usb_dma::core::codec::RxCodec;
use mt76_usb_dma::core::rx::RxSegments;
use mt76_usb_dma::protocol::dispatcher::Dispatcher;
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    // Whole bulk-in transfers: iterator, codec and dispatcher must agree on
    // never failing for malformed input
    for _ in RxSegments::new(data) {}

    let mut src = bytes::BytesMut::from(data);
    let mut codec = RxCodec::default();
    while let Ok(Some(_)) = codec.decode(&mut src) {}
    let _ = codec.decode_eof(&mut src);

    let dispatcher = Dispatcher::new();
    let _ = dispatcher.register_port(mt76_usb_dma::Port::Wlan, |_| Ok(()));
    assert!(dispatcher.dispatch_transfer(data).is_ok());
});
