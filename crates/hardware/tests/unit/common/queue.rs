//! Bounded Queue Unit Tests.

use pretty_assertions::assert_eq;
use widebridge_core::common::BoundedQueue;

#[test]
fn push_until_full_then_refuse() {
    let mut q = BoundedQueue::new(2);
    assert!(q.push(1).is_ok());
    assert!(q.push(2).is_ok());
    assert!(q.is_full());
    assert_eq!(q.push(3), Err(3));
    assert_eq!(q.len(), 2);
}

#[test]
fn pops_in_fifo_order_across_wrap() {
    let mut q = BoundedQueue::new(3);
    for round in 0..5u32 {
        assert!(q.push(round * 2).is_ok());
        assert!(q.push(round * 2 + 1).is_ok());
        assert_eq!(q.front(), Some(&(round * 2)));
        assert_eq!(q.pop(), Some(round * 2));
        assert_eq!(q.pop(), Some(round * 2 + 1));
        assert!(q.is_empty());
    }
    assert_eq!(q.pop(), None);
}

#[test]
fn capacity_is_at_least_one() {
    let mut q = BoundedQueue::new(0);
    assert_eq!(q.capacity(), 1);
    assert!(q.push('a').is_ok());
    assert_eq!(q.push('b'), Err('b'));
}
