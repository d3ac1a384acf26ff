use bytes::{Bytes, BytesMut};
use mt76_usb_dma::core::codec::{RxCodec, TxCodec, TxMessage};
use mt76_usb_dma::core::rx::{decode, wrap_rx, RxInfo, RxPacketFlags};
use mt76_usb_dma::core::tx::{parse_tx, TxInfo, TxPacketFlags};
use mt76_usb_dma::core::types::Port;
use mt76_usb_dma::protocol::sequence::SequenceAllocator;
use tokio_util::codec::{Decoder, Encoder};

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_encode_decode_heavy() {
    use tokio::task::JoinSet;

    let iterations = 20_000usize;
    let payload_sizes = [0usize, 1, 64, 1500, 16_000];

    let mut tasks = JoinSet::new();
    for &size in &payload_sizes {
        tasks.spawn(async move {
            let mut codec = TxCodec::default();
            let mut buf = BytesMut::new();
            for i in 0..iterations {
                let payload = Bytes::from(vec![((i + size) & 0xFF) as u8; size]);
                let msg = TxMessage {
                    info: TxInfo::packet(Port::Wlan, TxPacketFlags::default()),
                    payload: payload.clone(),
                };
                codec.encode(msg, &mut buf).unwrap();
                let view = parse_tx(&buf).unwrap();
                assert_eq!(&view.payload[..size], &payload[..]);
                buf.clear();
            }
        });
    }

    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_rx_codecs_independent() {
    use tokio::task::JoinSet;

    let mut tasks = JoinSet::new();
    for worker in 0u8..4 {
        tasks.spawn(async move {
            let mut transfer = BytesMut::new();
            for i in 0..256u16 {
                let payload = vec![worker; (i as usize % 61) + 1];
                wrap_rx(
                    &payload,
                    &RxInfo::packet(Port::Wlan, RxPacketFlags::default()),
                    &mut transfer,
                );
            }
            assert!(decode(&transfer).is_ok());

            let mut codec = RxCodec::default();
            let mut count = 0;
            while let Some(msg) = codec.decode(&mut transfer).unwrap() {
                assert_eq!(msg.payload[0], worker);
                count += 1;
            }
            assert_eq!(count, 256);
        });
    }

    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sequence_allocator_shared_across_tasks() {
    use std::sync::Arc;
    use tokio::task::JoinSet;

    let alloc = Arc::new(SequenceAllocator::new());
    let mut tasks = JoinSet::new();
    for _ in 0..8 {
        let alloc = alloc.clone();
        tasks.spawn(async move {
            for _ in 0..1000 {
                let seq = alloc.next().get();
                assert!((1..=15).contains(&seq));
            }
        });
    }

    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }
}
