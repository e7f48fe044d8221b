//! DNS answer records and order-insensitive comparison.

use std::collections::HashMap;
use std::fmt;

use hickory_proto::rr::RecordType;

/// A single DNS answer in canonical text form.
///
/// The value is the presentation form of the record data: addresses for
/// A/AAAA, target names (with trailing dot) for CNAME/NS/PTR,
/// `"<pref> <exchange>"` for MX, `"<prio> <weight> <port> <target>"` for
/// SRV, the seven whitespace-separated SOA fields, and the wire library's
/// rendering for TXT and anything else. Records are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    rtype: RecordType,
    value: String,
    ttl: u32,
}

impl Record {
    pub fn new(rtype: RecordType, value: impl Into<String>, ttl: u32) -> Self {
        Self {
            rtype,
            value: value.into(),
            ttl,
        }
    }

    pub fn record_type(&self) -> RecordType {
        self.rtype
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (TTL: {})", self.rtype, self.value, self.ttl)
    }
}

/// Compares two record lists as multisets.
///
/// Order does not matter, duplicate counts do: `[x, x, y]` is not equal to
/// `[x, y]`. When `ignore_ttl` is set, records compare by value alone; TTLs
/// decay independently at each resolver, so two servers holding the same
/// data rarely report identical TTLs.
///
/// This is the sole equivalence relation used by the Consensus and Compare
/// strategies.
pub fn records_equal(a: &[Record], b: &[Record], ignore_ttl: bool) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let key = |r: &Record| (r.value.clone(), if ignore_ttl { 0 } else { r.ttl });

    let mut counts: HashMap<(String, u32), usize> = HashMap::with_capacity(a.len());
    for record in a {
        *counts.entry(key(record)).or_insert(0) += 1;
    }

    for record in b {
        match counts.get_mut(&key(record)) {
            Some(count) if *count > 0 => *count -= 1,
            _ => return false,
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(value: &str, ttl: u32) -> Record {
        Record::new(RecordType::A, value, ttl)
    }

    #[test]
    fn equal_is_reflexive_and_symmetric() {
        let xs = vec![a("1.1.1.1", 300), a("2.2.2.2", 60)];
        let ys = vec![a("2.2.2.2", 60), a("1.1.1.1", 300)];
        assert!(records_equal(&xs, &xs, false));
        assert!(records_equal(&xs, &ys, false));
        assert!(records_equal(&ys, &xs, false));
    }

    #[test]
    fn equal_ignores_order_but_not_duplicates() {
        let xs = vec![a("1.1.1.1", 300), a("1.1.1.1", 300), a("2.2.2.2", 300)];
        let shuffled = vec![a("2.2.2.2", 300), a("1.1.1.1", 300), a("1.1.1.1", 300)];
        let deduped = vec![a("1.1.1.1", 300), a("2.2.2.2", 300)];
        assert!(records_equal(&xs, &shuffled, false));
        assert!(!records_equal(&xs, &deduped, false));
    }

    #[test]
    fn doubled_list_is_not_equal_to_original() {
        let xs = vec![a("1.1.1.1", 300)];
        let doubled = vec![a("1.1.1.1", 300), a("1.1.1.1", 300)];
        assert!(!records_equal(&doubled, &xs, false));
    }

    #[test]
    fn ttl_differences_require_ignore_ttl() {
        let xs = vec![a("1.1.1.1", 300)];
        let ys = vec![a("1.1.1.1", 600)];
        assert!(!records_equal(&xs, &ys, false));
        assert!(records_equal(&xs, &ys, true));
    }

    #[test]
    fn ttl_blind_mode_matches_zeroed_ttls() {
        let xs = vec![a("1.1.1.1", 120), a("2.2.2.2", 240)];
        let zeroed: Vec<Record> = xs
            .iter()
            .map(|r| Record::new(r.record_type(), r.value(), 0))
            .collect();
        assert!(records_equal(&xs, &zeroed, true));
    }

    #[test]
    fn empty_lists() {
        assert!(records_equal(&[], &[], false));
        assert!(records_equal(&[], &[], true));
        assert!(!records_equal(&[], &[a("1.1.1.1", 300)], true));
    }

    #[test]
    fn mismatched_duplicate_counts() {
        let xs = vec![a("1.1.1.1", 300), a("1.1.1.1", 300), a("2.2.2.2", 300)];
        let ys = vec![a("1.1.1.1", 300), a("2.2.2.2", 300), a("2.2.2.2", 300)];
        assert!(!records_equal(&xs, &ys, false));
    }

    #[test]
    fn display_includes_type_value_and_ttl() {
        let record = Record::new(RecordType::AAAA, "2606:4700:4700::1111", 60);
        assert_eq!(record.to_string(), "AAAA: 2606:4700:4700::1111 (TTL: 60)");
    }
}
