//! Bus-Width Bridge Unit Tests.
//!
//! Exercises the bridge on its own: validation, lane placement, mask
//! inversion, and burst sequencing with hand-made cache responses.

use pretty_assertions::assert_eq;
use rstest::rstest;
use widebridge_core::BusWidthBridge;
use widebridge_core::bus::{Busy, NarrowRequest, NarrowResponse, RouteTag, Status};
use widebridge_core::cache::CacheRsp;
use widebridge_core::common::{BackendError, BackendPhase, BusError, ByteMask, UnsupportedRequest};
use widebridge_core::config::{BusConfig, Config};

fn bridge_with_depth(depth: usize) -> BusWidthBridge {
    let geometry = Config::default().validate().unwrap();
    BusWidthBridge::new(geometry, &BusConfig { response_queue_depth: depth }).unwrap()
}

fn bridge() -> BusWidthBridge {
    bridge_with_depth(2)
}

/// A 16-byte line whose byte `i` is `seed + i`.
fn line_from(seed: u8) -> Vec<u8> {
    (0..16).map(|i| seed.wrapping_add(i)).collect()
}

fn ok(context: u64, line: Vec<u8>) -> CacheRsp {
    CacheRsp {
        context,
        result: Ok(line),
    }
}

// ══════════════════════════════════════════════════════════
// 1. Validation
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::single_read(NarrowRequest::read(0x40, RouteTag(1)), Ok(1))]
#[case::single_write(NarrowRequest::write_word(0x44, 7, RouteTag(1)), Ok(1))]
#[case::burst_in_line(NarrowRequest::burst_read(0x40, 4, RouteTag(1)), Ok(4))]
#[case::burst_across_lines(NarrowRequest::burst_read(0x48, 8, RouteTag(1)), Ok(8))]
#[case::unaligned(
    NarrowRequest::read(0x42, RouteTag(1)),
    Err(UnsupportedRequest::Unaligned { addr: 0x42 })
)]
#[case::sub_word(
    NarrowRequest { length: 0, ..NarrowRequest::read(0x40, RouteTag(1)) },
    Err(UnsupportedRequest::BadLength { length: 0 })
)]
#[case::partial_word_burst(
    NarrowRequest { length: 5, ..NarrowRequest::read(0x40, RouteTag(1)) },
    Err(UnsupportedRequest::BadLength { length: 5 })
)]
#[case::burst_write(
    NarrowRequest { length: 7, ..NarrowRequest::write_word(0x40, 0, RouteTag(1)) },
    Err(UnsupportedRequest::BurstWrite { length: 7 })
)]
#[case::read_and_write(
    NarrowRequest { is_read: true, ..NarrowRequest::write_word(0x40, 0, RouteTag(1)) },
    Err(UnsupportedRequest::BadOperation)
)]
#[case::neither(
    NarrowRequest { is_read: false, ..NarrowRequest::read(0x40, RouteTag(1)) },
    Err(UnsupportedRequest::BadOperation)
)]
#[case::burst_past_end(
    NarrowRequest::burst_read(0x0FFF_FFFC, 2, RouteTag(1)),
    Err(UnsupportedRequest::OutOfRange { addr: 0x0FFF_FFFC })
)]
#[case::beyond_address_space(
    NarrowRequest::read(0x1000_0000, RouteTag(1)),
    Err(UnsupportedRequest::OutOfRange { addr: 0x1000_0000 })
)]
fn validate_request_shapes(
    #[case] req: NarrowRequest,
    #[case] expected: Result<u32, UnsupportedRequest>,
) {
    assert_eq!(bridge().validate(&req), expected);
}

#[test]
fn unsupported_request_is_answered_once_without_a_cache_command() {
    let mut bridge = bridge();
    bridge.submit(NarrowRequest::read(0x42, RouteTag(9))).unwrap();

    assert_eq!(bridge.take_command(), None);
    assert!(bridge.is_idle());
    assert_eq!(
        bridge.pop_response(),
        Some(NarrowResponse {
            route: RouteTag(9),
            status: Status::Error(BusError::Unsupported(UnsupportedRequest::Unaligned {
                addr: 0x42
            })),
            data: 0,
            last: true,
        })
    );
    assert!(!bridge.has_response());
    assert_eq!(bridge.stats().unsupported, 1);
    assert_eq!(bridge.stats().accepted, 0);
}

// ══════════════════════════════════════════════════════════
// 2. Acceptance
// ══════════════════════════════════════════════════════════

#[test]
fn second_request_is_refused_while_busy() {
    let mut bridge = bridge();
    bridge.submit(NarrowRequest::read(0x40, RouteTag(1))).unwrap();

    let second = NarrowRequest::read(0x50, RouteTag(2));
    assert_eq!(bridge.submit(second.clone()), Err(Busy(second)));
}

#[test]
fn full_response_queue_refuses_new_requests() {
    let mut bridge = bridge_with_depth(1);
    bridge.submit(NarrowRequest::read(0x42, RouteTag(1))).unwrap();
    assert!(!bridge.can_accept());

    let next = NarrowRequest::read(0x40, RouteTag(2));
    assert_eq!(bridge.submit(next.clone()), Err(Busy(next)));

    let _ = bridge.pop_response();
    assert!(bridge.can_accept());
}

#[test]
fn command_is_handed_out_once_until_retracted() {
    let mut bridge = bridge();
    bridge.submit(NarrowRequest::read(0x44, RouteTag(1))).unwrap();

    let cmd = bridge.take_command().unwrap();
    assert_eq!(cmd.address, 0x44);
    assert!(!cmd.write);
    assert_eq!(cmd.context, 1);
    assert_eq!(bridge.take_command(), None);

    bridge.retract_command();
    assert_eq!(bridge.take_command(), Some(cmd));
}

// ══════════════════════════════════════════════════════════
// 3. Lane placement and mask inversion
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0x40, 0)]
#[case(0x44, 1)]
#[case(0x48, 2)]
#[case(0x4C, 3)]
fn write_lands_in_its_lane_with_inverted_mask(#[case] addr: u64, #[case] lane: usize) {
    let (data, preserve) = bridge().expand_write(addr, 0x1122_3344, 0b0011);

    let mut expected = vec![0; 16];
    expected[lane * 4..lane * 4 + 4].copy_from_slice(&[0x44, 0x33, 0x22, 0x11]);
    assert_eq!(data, expected);
    assert_eq!(preserve, ByteMask(0xFFFF & !(0x3 << (lane * 4))));
}

#[test]
fn empty_write_mask_preserves_the_whole_line() {
    let (_, preserve) = bridge().expand_write(0x40, 0xFFFF_FFFF, 0);
    assert!(preserve.is_full(16));
}

#[test]
fn mask_bits_above_the_word_are_ignored() {
    let (_, preserve) = bridge().expand_write(0x40, 0, 0xF1);
    assert_eq!(preserve, ByteMask(0xFFFE));
}

#[test]
fn read_extracts_little_endian_lane() {
    let line = line_from(0);
    assert_eq!(bridge().extract_read(0x48, &line), u32::from_le_bytes([8, 9, 10, 11]));
    assert_eq!(bridge().extract_read(0x40, &line), u32::from_le_bytes([0, 1, 2, 3]));
}

// ══════════════════════════════════════════════════════════
// 4. Completion
// ══════════════════════════════════════════════════════════

#[test]
fn write_beat_completes_with_zero_data() {
    let mut bridge = bridge();
    bridge
        .submit(NarrowRequest::write(0x48, 0xDEAD_BEEF, 0xF, RouteTag(4)))
        .unwrap();

    let cmd = bridge.take_command().unwrap();
    assert!(cmd.write);
    assert_eq!(cmd.preserve, ByteMask(0xF0FF));
    assert_eq!(&cmd.data[8..12], &0xDEAD_BEEFu32.to_le_bytes());

    bridge.complete(ok(4, vec![0; 16]));
    assert_eq!(
        bridge.pop_response(),
        Some(NarrowResponse {
            route: RouteTag(4),
            status: Status::Success,
            data: 0,
            last: true,
        })
    );
    assert!(bridge.is_idle());
}

#[test]
fn burst_replays_one_read_per_word_in_order() {
    let mut bridge = bridge();
    bridge
        .submit(NarrowRequest::burst_read(0x48, 4, RouteTag(3)))
        .unwrap();

    let mut beats = Vec::new();
    for expected_addr in [0x48u64, 0x4C, 0x50, 0x54] {
        let cmd = bridge.take_command().unwrap();
        assert_eq!(cmd.address, expected_addr);
        assert!(bridge.wants_response());
        bridge.complete(ok(3, line_from((expected_addr & !0xF) as u8)));
        beats.push(bridge.pop_response().unwrap());
    }

    let data: Vec<u32> = beats.iter().map(|b| b.data).collect();
    assert_eq!(
        data,
        vec![
            u32::from_le_bytes([0x48, 0x49, 0x4A, 0x4B]),
            u32::from_le_bytes([0x4C, 0x4D, 0x4E, 0x4F]),
            u32::from_le_bytes([0x50, 0x51, 0x52, 0x53]),
            u32::from_le_bytes([0x54, 0x55, 0x56, 0x57]),
        ]
    );
    let lasts: Vec<bool> = beats.iter().map(|b| b.last).collect();
    assert_eq!(lasts, vec![false, false, false, true]);
    assert!(beats.iter().all(|b| b.route == RouteTag(3)));
    assert!(bridge.is_idle());
    assert_eq!(bridge.stats().bursts, 1);
    assert_eq!(bridge.stats().beats, 4);
}

#[test]
fn backend_error_ends_the_burst() {
    let mut bridge = bridge();
    bridge
        .submit(NarrowRequest::burst_read(0x40, 4, RouteTag(5)))
        .unwrap();

    let _ = bridge.take_command().unwrap();
    bridge.complete(ok(5, line_from(0)));
    assert!(!bridge.pop_response().unwrap().last);

    let _ = bridge.take_command().unwrap();
    let err = BackendError {
        addr: 0x40,
        phase: BackendPhase::Refill,
    };
    bridge.complete(CacheRsp {
        context: 5,
        result: Err(err),
    });

    let beat = bridge.pop_response().unwrap();
    assert_eq!(beat.status, Status::Error(BusError::Backend(err)));
    assert!(beat.last);
    assert!(bridge.is_idle());
    assert_eq!(bridge.take_command(), None);
}

#[test]
fn unexpected_cache_response_is_ignored() {
    let mut bridge = bridge();
    bridge.complete(ok(1, vec![0; 16]));
    assert!(!bridge.has_response());

    bridge.submit(NarrowRequest::read(0x40, RouteTag(1))).unwrap();
    assert!(!bridge.wants_response(), "nothing issued yet");
    bridge.complete(ok(1, vec![0; 16]));
    assert!(!bridge.has_response());
}
