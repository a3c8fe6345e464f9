use criterion::{criterion_group, criterion_main, Criterion};
use slot_apdu::{encode_request, AccountId, DerivationPath, Request, SlotEntry, SlotIndex};
use slotkeeper::{AutoReview, Decision, Dispatcher, MemorySlotStore};

fn set_frames() -> Vec<Vec<u8>> {
    let path: DerivationPath = "m/44'/539'/513'/0/0".parse().unwrap();
    (0..64u8)
        .map(|slot| {
            encode_request(&Request::SetSlot {
                slot: SlotIndex::new(slot),
                entry: SlotEntry::new(AccountId::from_bytes([slot; 8]), path),
            })
        })
        .collect()
}

fn bench_dispatch(c: &mut Criterion) {
    let frames = set_frames();
    c.bench_function("dispatch_fill_table", |b| {
        b.iter(|| {
            let mut dispatcher = Dispatcher::new(MemorySlotStore::default());
            let mut ui = AutoReview(Decision::Approve);
            for frame in &frames {
                dispatcher.process(frame, &mut ui).unwrap();
            }
            dispatcher
                .process(&[0x33, 0x10, 0x00, 0x00, 0x00], &mut ui)
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
