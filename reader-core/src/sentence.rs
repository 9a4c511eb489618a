//! Sentence reconstruction from the regions under a crop rectangle.

use crate::crop::CropRect;
use crate::region::DetectedRegion;

/// Punctuation that should hug the preceding word.
const CLOSING_PUNCTUATION: [char; 4] = [',', '.', '!', '?'];

/// Regions whose bounds lie entirely inside `crop`, in detection order.
///
/// Partially covered regions are left out.
// TODO: make the inclusion rule an overlap-ratio threshold in ReaderConfig
// so partially covered tokens can be opted in.
pub fn regions_within<'a>(
    crop: &CropRect,
    regions: &'a [DetectedRegion],
) -> impl Iterator<Item = &'a DetectedRegion> {
    let area = crop.to_rect();
    regions
        .iter()
        .filter(move |region| area.contains_rect(&region.bounds()))
}

/// Rebuild the sentence covered by `crop`.
///
/// Texts of fully contained regions are joined with `join`, lower-cased, and
/// a `join` directly before `,` `.` `!` or `?` is removed. No region inside
/// the crop yields an empty string.
#[must_use]
pub fn reconstruct_sentence(crop: &CropRect, regions: &[DetectedRegion], join: &str) -> String {
    let joined = regions_within(crop, regions)
        .map(|region| region.text.as_str())
        .collect::<Vec<_>>()
        .join(join)
        .to_lowercase();

    normalize_punctuation(&joined, join)
}

/// Drop `join` wherever it directly precedes closing punctuation.
#[must_use]
pub fn normalize_punctuation(text: &str, join: &str) -> String {
    if join.is_empty() {
        return text.to_string();
    }
    CLOSING_PUNCTUATION
        .iter()
        .fold(text.to_string(), |acc, mark| {
            acc.replace(&format!("{join}{mark}"), &mark.to_string())
        })
}
