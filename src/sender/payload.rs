use super::DeliveryError;
use crate::formatter::FormattedEntry;

// Rough size of one serialized entry, used to pre-size bulk buffers
const ESTIMATED_ENTRY_SIZE: usize = 256;
const MAX_PREALLOCATED_SIZE: usize = 16 * 1024 * 1024;

/// Body for a single-event request: one JSON object.
pub fn entry_payload(entry: &FormattedEntry) -> Result<String, DeliveryError> {
    Ok(serde_json::to_string(entry)?)
}

/// Body for a bulk request: one JSON object per line, in the given order.
///
/// Lines are separated by `\n` with no trailing newline and no array wrapper.
pub fn bulk_payload(entries: &[FormattedEntry]) -> Result<String, DeliveryError> {
    let capacity = entries
        .len()
        .saturating_mul(ESTIMATED_ENTRY_SIZE)
        .min(MAX_PREALLOCATED_SIZE);
    let mut buffer = Vec::with_capacity(capacity);

    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            buffer.push(b'\n');
        }
        serde_json::to_writer(&mut buffer, entry)?;
    }

    Ok(String::from_utf8(buffer)?)
}
