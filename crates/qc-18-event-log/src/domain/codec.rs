//! # Record Codec
//!
//! Deterministic binary encoding of every record the event log keeps in ledger
//! state (events, buckets, the head pointer), and timestamp validation.
//!
//! ## Encoding
//!
//! bincode with fixed-width little-endian integers and `u64` length prefixes.
//! The layout depends only on field values, so the same record always yields
//! the same bytes; the ledger hashes these bytes into its state root.
//!
//! Decoding is strict: truncated input, trailing bytes and invalid tags fail
//! with `MalformedRecord`. Events arrive as untrusted contract arguments, so
//! their encoding is also bounded by [`MAX_RECORD_SIZE`]. Buckets and the head
//! pointer are written only by the event log itself and carry no bound: late
//! events and the sentinel may grow a bucket without limit.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::ObjectId;

use super::entities::{Bucket, Event};
use super::errors::{EventLogError, Result};
use super::value_objects::{duration_nanos, MAX_RECORD_SIZE, TIMESTAMP_TOLERANCE};

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_no_limit()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

fn encode<T: Serialize>(options: impl Options, value: &T, what: &str) -> Result<Vec<u8>> {
    options
        .serialize(value)
        .map_err(|e| EventLogError::MalformedRecord(format!("cannot encode {what}: {e}")))
}

fn decode<T: DeserializeOwned>(options: impl Options, bytes: &[u8], what: &str) -> Result<T> {
    options
        .deserialize(bytes)
        .map_err(|e| EventLogError::MalformedRecord(format!("cannot decode {what}: {e}")))
}

/// Encode an event.
pub fn encode_event(event: &Event) -> Result<Vec<u8>> {
    encode(options().with_limit(MAX_RECORD_SIZE), event, "event")
}

/// Decode an event, rejecting encodings larger than [`MAX_RECORD_SIZE`].
pub fn decode_event(bytes: &[u8]) -> Result<Event> {
    decode(options().with_limit(MAX_RECORD_SIZE), bytes, "event")
}

pub fn encode_bucket(bucket: &Bucket) -> Result<Vec<u8>> {
    encode(options(), bucket, "bucket")
}

pub fn decode_bucket(bytes: &[u8]) -> Result<Bucket> {
    decode(options(), bytes, "bucket")
}

/// Encode the head pointer value (the head bucket's id).
pub fn encode_head_pointer(head: &ObjectId) -> Result<Vec<u8>> {
    encode(options(), head, "head pointer")
}

pub fn decode_head_pointer(bytes: &[u8]) -> Result<ObjectId> {
    decode(options(), bytes, "head pointer")
}

/// Check an event's timestamp against the validation time `now` (ns).
///
/// Accepts `now - TIMESTAMP_TOLERANCE <= when <= now`.
pub fn validate_timestamp(event: &Event, now: i64) -> Result<()> {
    if event.when > now {
        return Err(EventLogError::TimestampInFuture {
            when: event.when,
            now,
        });
    }
    let tolerance_ns = duration_nanos(TIMESTAMP_TOLERANCE);
    if event.when < now.saturating_sub(tolerance_ns) {
        return Err(EventLogError::TimestampTooOld {
            when: event.when,
            now,
            tolerance_ns,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: i64 = 1_000_000_000;

    // ========== Test Group 1: Encoding ==========

    #[test]
    fn test_event_layout_is_fixed() {
        let event = Event::at(1, "ab", vec![9]);
        let bytes = encode_event(&event).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&1i64.to_le_bytes());
        expected.extend_from_slice(&2u64.to_le_bytes());
        expected.extend_from_slice(b"ab");
        expected.extend_from_slice(&1u64.to_le_bytes());
        expected.push(9);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let event = Event::at(1_700_000_000 * SECOND, "audit", b"login".to_vec());
        assert_eq!(encode_event(&event).unwrap(), encode_event(&event).unwrap());

        let bucket = Bucket {
            start: 5,
            prev: Some(ObjectId([3; 32])),
            event_refs: vec![ObjectId([4; 32]), ObjectId([5; 32])],
        };
        assert_eq!(
            encode_bucket(&bucket).unwrap(),
            encode_bucket(&bucket.clone()).unwrap()
        );
    }

    #[test]
    fn test_head_pointer_is_raw_id() {
        let id = ObjectId([0xAB; 32]);
        let bytes = encode_head_pointer(&id).unwrap();
        assert_eq!(bytes, vec![0xAB; 32]);
        assert_eq!(decode_head_pointer(&bytes).unwrap(), id);
    }

    // ========== Test Group 2: Strict Decoding ==========

    #[test]
    fn test_truncated_event_rejected() {
        let bytes = encode_event(&Event::at(7, "topic", b"content".to_vec())).unwrap();
        let result = decode_event(&bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(EventLogError::MalformedRecord(_))));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode_event(&Event::at(7, "topic", vec![])).unwrap();
        bytes.push(0);
        assert!(matches!(
            decode_event(&bytes),
            Err(EventLogError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_invalid_option_tag_rejected() {
        let mut bytes = encode_bucket(&Bucket::sentinel()).unwrap();
        // start (8 bytes) then the Option tag for prev.
        bytes[8] = 2;
        assert!(matches!(
            decode_bucket(&bytes),
            Err(EventLogError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_huge_length_prefix_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0i64.to_le_bytes());
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        assert!(matches!(
            decode_event(&bytes),
            Err(EventLogError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_oversized_event_rejected() {
        let event = Event::at(0, "t", vec![0; MAX_RECORD_SIZE as usize]);
        assert!(matches!(
            encode_event(&event),
            Err(EventLogError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_bucket_larger_than_event_bound_round_trips() {
        let refs = (MAX_RECORD_SIZE as usize) / 32 + 1;
        let bucket = Bucket {
            start: 0,
            prev: None,
            event_refs: vec![ObjectId([7; 32]); refs],
        };
        let bytes = encode_bucket(&bucket).unwrap();
        assert!(bytes.len() as u64 > MAX_RECORD_SIZE);
        assert_eq!(decode_bucket(&bytes).unwrap().event_refs.len(), refs);
    }

    #[test]
    fn test_short_head_pointer_rejected() {
        assert!(decode_head_pointer(&[1; 31]).is_err());
    }

    // ========== Test Group 3: Timestamp Window ==========

    #[test]
    fn test_future_timestamp_rejected() {
        let now = 100 * SECOND;
        let event = Event::at(now + SECOND, "t", vec![]);
        assert!(matches!(
            validate_timestamp(&event, now),
            Err(EventLogError::TimestampInFuture { .. })
        ));
    }

    #[test]
    fn test_old_timestamp_rejected() {
        let now = 100 * SECOND;
        let event = Event::at(now - 6 * SECOND, "t", vec![]);
        assert!(matches!(
            validate_timestamp(&event, now),
            Err(EventLogError::TimestampTooOld { .. })
        ));
    }

    #[test]
    fn test_recent_timestamp_accepted() {
        let now = 100 * SECOND;
        assert!(validate_timestamp(&Event::at(now - SECOND, "t", vec![]), now).is_ok());
        assert!(validate_timestamp(&Event::at(now, "t", vec![]), now).is_ok());
        assert!(validate_timestamp(&Event::at(now - 5 * SECOND, "t", vec![]), now).is_ok());
    }

    #[test]
    fn test_window_saturates_near_min() {
        let event = Event::at(i64::MIN, "t", vec![]);
        assert!(validate_timestamp(&event, i64::MIN + 1).is_ok());
    }
}
