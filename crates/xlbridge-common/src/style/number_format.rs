//! Mapping between `num_fmt`/`decimal_places` and a single native format code.
//!
//! An explicit `num_fmt` wins over `decimal_places`. On the way back a plain
//! fixed-decimal code (`0.00`) is reported as `decimal_places`, and `General`
//! is reported as no format at all. `0` counts as zero decimal places.

const GENERAL: &str = "General";

/// Native format code for the neutral pair, or `None` when neither is set.
pub fn compose(num_fmt: Option<&str>, decimal_places: Option<u32>) -> Option<String> {
    if let Some(code) = num_fmt.filter(|c| !c.is_empty()) {
        return Some(code.to_string());
    }
    match decimal_places? {
        0 => Some("0".to_string()),
        n => Some(format!("0.{}", "0".repeat(n as usize))),
    }
}

/// Split a native format code back into `(num_fmt, decimal_places)`.
pub fn decompose(code: &str) -> (Option<String>, Option<u32>) {
    if code.is_empty() || code.eq_ignore_ascii_case(GENERAL) {
        return (None, None);
    }
    match fixed_decimals(code) {
        Some(places) => (None, Some(places)),
        None => (Some(code.to_string()), None),
    }
}

fn fixed_decimals(code: &str) -> Option<u32> {
    if code == "0" {
        return Some(0);
    }
    let zeros = code.strip_prefix("0.")?;
    if zeros.is_empty() || !zeros.bytes().all(|b| b == b'0') {
        return None;
    }
    u32::try_from(zeros.len()).ok()
}
