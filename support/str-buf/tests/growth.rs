use ibpc_str_buf::{
    AllocationError, GrowthPolicy, StrBuf,
    tracking::{AllocStats, TrackingAlloc},
};
use pretty_assertions::assert_eq;

// =============================================================================
// Content integrity
// =============================================================================

#[test]
fn appends_reproduce_concatenation() {
    let pieces: [&[u8]; 6] = [b"", b"a", b"bc", b"defghij", b"", b"klmnopqrstuvwxyz"];
    let mut buf = StrBuf::with_capacity(2).unwrap();
    let mut expected = Vec::new();
    for piece in pieces {
        buf.append(piece).unwrap();
        expected.extend_from_slice(piece);
        assert_eq!(buf.as_bytes(), expected.as_slice());
        assert!(buf.len() <= buf.capacity());
    }
    assert_eq!(buf.len(), 26);
}

#[test]
fn create_four_append_ten() {
    let mut buf = StrBuf::with_capacity(4).unwrap();
    buf.append(b"abcdefghij").unwrap();
    assert_eq!(buf.len(), 10);
    assert_eq!(buf.as_bytes(), b"abcdefghij");
}

#[test]
fn binary_content_round_trips() {
    let bytes: Vec<u8> = (0..=255).collect();
    let mut buf = StrBuf::new();
    for chunk in bytes.chunks(7) {
        buf.append(chunk).unwrap();
    }
    assert_eq!(buf.as_bytes(), bytes.as_slice());
}

// =============================================================================
// Growth policy
// =============================================================================

#[test]
fn byte_at_a_time_reallocates_logarithmically() {
    let alloc = TrackingAlloc::new();
    let mut buf = StrBuf::with_capacity_in(1, alloc.clone()).unwrap();
    for i in 0..100u8 {
        buf.push(i).unwrap();
    }

    let stats = alloc.stats();
    assert_eq!(buf.len(), 100);
    assert_eq!(buf.capacity(), 128);
    assert_eq!(stats.allocations, 1);
    // 1 -> 2 -> 4 -> 8 -> 16 -> 32 -> 64 -> 128
    assert_eq!(stats.reallocations, 7);
    assert_eq!(buf.as_bytes(), (0..100u8).collect::<Vec<_>>().as_slice());
}

#[test]
fn reallocations_stay_logarithmic_for_large_inputs() {
    let alloc = TrackingAlloc::new();
    let mut buf = StrBuf::with_capacity_in(1, alloc.clone()).unwrap();
    for _ in 0..100_000 {
        buf.push(b'z').unwrap();
    }
    // ceil(log2(100_000)) == 17
    assert!(alloc.stats().reallocations <= 17);
}

#[test]
fn larger_factor_reallocates_less() {
    let doubling = TrackingAlloc::new();
    let quadrupling = TrackingAlloc::new();
    let mut a = StrBuf::with_capacity_in(1, doubling.clone()).unwrap();
    let mut b = StrBuf::with_capacity_in(1, quadrupling.clone())
        .unwrap()
        .with_policy(GrowthPolicy::new(4, 0));
    for _ in 0..1000 {
        a.push(b'.').unwrap();
        b.push(b'.').unwrap();
    }
    assert!(quadrupling.stats().reallocations < doubling.stats().reallocations);
    assert_eq!(a, b);
}

#[test]
fn reserve_uses_policy() {
    let mut buf = StrBuf::with_capacity(8).unwrap();
    buf.append(b"12345678").unwrap();
    buf.reserve(1).unwrap();
    assert_eq!(buf.capacity(), 16);
    buf.reserve(8).unwrap();
    assert_eq!(buf.capacity(), 16);
}

// =============================================================================
// Allocation failure
// =============================================================================

#[test]
fn create_reports_allocation_error() {
    let alloc = TrackingAlloc::new().with_limit(16);
    let err = StrBuf::with_capacity_in(32, alloc.clone()).unwrap_err();
    assert_eq!(err, AllocationError::new(32));
    assert_eq!(err.requested(), 32);
    assert_eq!(alloc.stats(), AllocStats::default());
}

#[test]
fn failed_append_leaves_buffer_unchanged() {
    let alloc = TrackingAlloc::new().with_limit(8);
    let mut buf = StrBuf::with_capacity_in(4, alloc.clone()).unwrap();
    buf.append(b"abc").unwrap();

    let err = buf.append(b"defghijk").unwrap_err();
    assert_eq!(err.requested(), 11);
    assert_eq!(buf.as_bytes(), b"abc");
    assert_eq!(buf.len(), 3);
    assert_eq!(buf.capacity(), 4);

    // Still usable after the failure.
    buf.append(b"d").unwrap();
    assert_eq!(buf.as_bytes(), b"abcd");
}

#[test]
fn failed_clone_reports_error() {
    let alloc = TrackingAlloc::new().with_limit(10);
    let buf = StrBuf::from_bytes_in(b"abcdef", alloc.clone()).unwrap();
    assert_eq!(buf.try_clone().unwrap_err(), AllocationError::new(6));
    alloc.set_limit(None);
    assert_eq!(buf.try_clone().unwrap(), buf);
}

#[test]
fn oversized_request_is_an_error() {
    let mut buf = StrBuf::from_bytes(b"x").unwrap();
    assert!(buf.reserve(usize::MAX).is_err());
    assert_eq!(buf.as_bytes(), b"x");
}

#[test]
fn error_message() {
    assert_eq!(
        AllocationError::new(42).to_string(),
        "failed to allocate 42 bytes"
    );
}

// =============================================================================
// Release
// =============================================================================

#[test]
fn release_returns_every_byte() {
    let alloc = TrackingAlloc::new();
    let mut buf = StrBuf::new_in(alloc.clone());
    for _ in 0..10 {
        buf.append(b"0123456789").unwrap();
    }
    let copy = buf.try_clone().unwrap();
    assert_eq!(alloc.stats().live_allocations(), 2);

    buf.release();
    copy.release();
    let stats = alloc.stats();
    assert!(stats.is_balanced());
    assert!(stats.peak_bytes >= 200);
}
