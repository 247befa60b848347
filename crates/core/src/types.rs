/// Asset, usage request, department and person identifiers are opaque strings.
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh opaque identifier.
pub fn new_entity_id() -> EntityId {
    uuid::Uuid::new_v4().to_string()
}

/// Return a timestamp strictly later than `previous`.
///
/// Uses the wall clock when it has moved past `previous`, otherwise bumps
/// `previous` by one microsecond so audit timestamps never stand still.
pub fn next_timestamp(previous: Timestamp) -> Timestamp {
    let now = chrono::Utc::now();
    if now > previous {
        now
    } else {
        previous + chrono::Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_timestamp_is_strictly_later() {
        let future = chrono::Utc::now() + chrono::Duration::hours(1);
        assert!(next_timestamp(future) > future);
    }

    #[test]
    fn entity_ids_are_unique() {
        assert_ne!(new_entity_id(), new_entity_id());
    }
}
