use seg_alloc::provider::VecHeapProvider;
use seg_alloc::{check_heap, SegHeap};

fn fresh_heap(capacity: usize) -> SegHeap<VecHeapProvider> {
    let provider = VecHeapProvider::with_capacity(capacity);
    SegHeap::init(provider).expect("provider has room for the initial chunk")
}

#[test]
fn alloc_free_many_sizes_leaves_a_clean_heap() {
    let mut heap = fresh_heap(1 << 20);
    let sizes = [1, 8, 16, 17, 64, 100, 127, 128, 129, 500, 4096];

    let blocks: Vec<_> = sizes
        .iter()
        .map(|&s| heap.allocate(s).expect("allocation succeeds"))
        .collect();

    assert_eq!(check_heap(&heap), 0);

    for b in blocks {
        heap.free(Some(b));
    }
    assert_eq!(check_heap(&heap), 0);
}

#[test]
fn fragmentation_is_reclaimed_by_coalescing() {
    let mut heap = fresh_heap(1 << 16);

    let blocks: Vec<_> = (0..16)
        .map(|_| heap.allocate(48).expect("allocation succeeds"))
        .collect();

    // Free every other block: no coalescing should be possible yet.
    for (i, b) in blocks.iter().enumerate() {
        if i % 2 == 0 {
            heap.free(Some(*b));
        }
    }
    assert_eq!(check_heap(&heap), 0);

    // Free the rest: everything should now merge into one contiguous run.
    for (i, b) in blocks.into_iter().enumerate() {
        if i % 2 != 0 {
            heap.free(Some(b));
        }
    }
    assert_eq!(check_heap(&heap), 0);
}

#[test]
fn allocation_survives_heap_extension() {
    let mut heap = fresh_heap(1 << 22);

    let mut live = Vec::new();
    for _ in 0..2000 {
        live.push(heap.allocate(96).expect("allocation succeeds"));
    }
    assert_eq!(check_heap(&heap), 0);

    for b in live {
        heap.free(Some(b));
    }
    assert_eq!(check_heap(&heap), 0);
}

#[test]
fn reallocate_grow_falls_back_to_move_when_no_room_follows() {
    let mut heap = fresh_heap(1 << 16);

    let a = heap.allocate(64).expect("allocation succeeds");
    // Keep the successor allocated so the in-place grow path cannot apply.
    let keepalive = heap.allocate(64).expect("allocation succeeds");

    let grown = heap
        .reallocate(Some(a), 4096)
        .expect("falls back to allocate+copy+free");
    assert_ne!(grown, a);

    heap.free(Some(grown));
    heap.free(Some(keepalive));
    assert_eq!(check_heap(&heap), 0);
}

#[test]
fn reallocate_preserves_payload_bytes_across_a_move() {
    let mut heap = fresh_heap(1 << 16);

    let a = heap.allocate(32).expect("allocation succeeds");
    unsafe {
        core::ptr::write_bytes(a.as_ptr(), 0xAB, 32);
    }
    // Pin the successor so growth must move the block.
    let keepalive = heap.allocate(32).expect("allocation succeeds");

    let grown = heap.reallocate(Some(a), 2048).expect("move succeeds");
    let bytes = unsafe { core::slice::from_raw_parts(grown.as_ptr(), 32) };
    assert!(bytes.iter().all(|&b| b == 0xAB));

    heap.free(Some(grown));
    heap.free(Some(keepalive));
}

#[test]
fn zero_size_allocate_and_reallocate_are_rejected_or_free() {
    let mut heap = fresh_heap(1 << 16);
    assert!(heap.allocate(0).is_none());

    let a = heap.allocate(64).expect("allocation succeeds");
    assert!(heap.reallocate(Some(a), 0).is_none());
    assert_eq!(check_heap(&heap), 0);
}

#[test]
fn exhausted_provider_fails_allocation_without_corrupting_the_heap() {
    // A capacity too small to extend by a full chunk forces extend() to
    // fail on the first large request.
    let mut heap = fresh_heap(4096 + 4 * 8);
    let huge = heap.allocate(1 << 30);
    assert!(huge.is_none());
    assert_eq!(check_heap(&heap), 0);
}
