//! Statistics Unit Tests.

use pretty_assertions::assert_eq;
use widebridge_core::stats::{CacheStats, SystemStats};

#[test]
fn hit_rate_is_zero_without_accesses() {
    assert_eq!(CacheStats::default().hit_rate(), 0.0);
}

#[test]
fn totals_combine_reads_and_writes() {
    let stats = CacheStats {
        read_hits: 3,
        read_misses: 1,
        write_hits: 5,
        write_misses: 3,
        ..CacheStats::default()
    };
    assert_eq!(stats.hits(), 8);
    assert_eq!(stats.misses(), 4);
    assert_eq!(stats.accesses(), 12);
    assert!((stats.hit_rate() - 66.666).abs() < 0.01);
}

#[test]
fn print_does_not_panic() {
    SystemStats::default().print();
}
