//! Completeness check for cached payloads.
//!
//! A payload that was cached while a park's feed was failing, or under an
//! older schema, can be fresh by timestamp yet missing rides for a park the
//! caller asked about. Such a hit earns exactly one forced refresh.

use parkpal_common::Payload;

/// Whether any requested park is missing from `payload` or has no rides.
pub fn needs_refresh(payload: &Payload, requested_ids: &[i64]) -> bool {
    requested_ids.iter().any(|id| match payload.park(*id) {
        Some(park) => park.rides.is_empty(),
        None => true,
    })
}
