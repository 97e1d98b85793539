//! Ingestion URL construction.
//!
//! Loggly accepts single events on `/inputs/<token>` and newline-delimited
//! batches on `/bulk/<token>`; tags ride along as an extra path segment.

const INPUTS_SEGMENT: &str = "/inputs/";
const BULK_SEGMENT: &str = "/bulk/";

/// Builds `{base_url}{/inputs/|/bulk/}{token}{/tag/t1,t2/}`.
///
/// Tags are joined in the given order and are not URL-encoded; callers must
/// pass URL-safe tag names.
pub fn build_url<S: AsRef<str>>(base_url: &str, bulk: bool, customer_token: &str, tags: &[S]) -> String {
    let mode_segment = if bulk { BULK_SEGMENT } else { INPUTS_SEGMENT };
    let tag_segment = tag_segment(tags);

    let mut url = String::with_capacity(
        base_url.len() + mode_segment.len() + customer_token.len() + tag_segment.len(),
    );
    url.push_str(base_url);
    url.push_str(mode_segment);
    url.push_str(customer_token);
    url.push_str(&tag_segment);
    url
}

fn tag_segment<S: AsRef<str>>(tags: &[S]) -> String {
    if tags.is_empty() {
        return String::new();
    }

    let joined = tags.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
    format!("/tag/{joined}/")
}
