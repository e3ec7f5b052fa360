//! Color string handling.
//!
//! The neutral form is `#RRGGBB` in uppercase. Native forms are bare hex
//! (`RRGGBB`), xlsx ARGB (`AARRGGBB`) and the host application's BGR integer
//! (see [`super::automation`]).

/// Accepts `RRGGBB`, `#RRGGBB`, `AARRGGBB` or `#AARRGGBB` in any case and
/// returns `#RRGGBB` uppercase. An alpha byte is dropped.
pub fn normalize_color(input: &str) -> Option<String> {
    let hex = input.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let rgb = match hex.len() {
        6 => hex,
        8 => &hex[2..],
        _ => return None,
    };
    Some(format!("#{}", rgb.to_ascii_uppercase()))
}

/// Bare `RRGGBB` as used by the direct-file engine's style records.
pub fn to_native_hex(color: &str) -> Option<String> {
    normalize_color(color).map(|c| c[1..].to_string())
}

/// Opaque `FFRRGGBB`.
pub fn to_argb(color: &str) -> Option<String> {
    normalize_color(color).map(|c| format!("FF{}", &c[1..]))
}

/// Inverse of [`to_native_hex`] / [`to_argb`]; an empty native string means "no color".
pub fn from_native_hex(native: &str) -> Option<String> {
    if native.is_empty() {
        return None;
    }
    normalize_color(native)
}

/// Split `#RRGGBB` into channels.
pub fn rgb_channels(color: &str) -> Option<(u8, u8, u8)> {
    let c = normalize_color(color)?;
    let r = u8::from_str_radix(&c[1..3], 16).ok()?;
    let g = u8::from_str_radix(&c[3..5], 16).ok()?;
    let b = u8::from_str_radix(&c[5..7], 16).ok()?;
    Some((r, g, b))
}
