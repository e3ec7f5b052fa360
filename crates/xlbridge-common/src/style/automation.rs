//! Style encoding for the host application's object model.
//!
//! Constants are the numeric values of the object model's enumerations
//! (`XlLineStyle`, `XlBordersIndex`, `XlPattern`, `XlUnderlineStyle`, ...).
//! Colors are BGR integers (`R + G*256 + B*65536`).

use super::color::{normalize_color, rgb_channels};
use super::number_format::{compose, decompose};
use super::{
    Border, BorderStyle, BorderType, CellStyle, FillPattern, FillStyle, FillType, FontStyle,
    FontUnderline, FontVertAlign, GradientGeometry,
};

pub const XL_NONE: i32 = -4142;
pub const XL_AUTOMATIC: i32 = -4105;

pub const XL_CONTINUOUS: i32 = 1;
pub const XL_DASH: i32 = -4115;
pub const XL_DOT: i32 = -4118;
pub const XL_DOUBLE: i32 = -4119;
pub const XL_DASH_DOT: i32 = 4;
pub const XL_DASH_DOT_DOT: i32 = 5;
pub const XL_SLANT_DASH_DOT: i32 = 13;

pub const XL_HAIRLINE: i32 = 1;
pub const XL_THIN: i32 = 2;
pub const XL_MEDIUM: i32 = -4138;
pub const XL_THICK: i32 = 4;

pub const XL_EDGE_LEFT: i32 = 7;
pub const XL_EDGE_TOP: i32 = 8;
pub const XL_EDGE_BOTTOM: i32 = 9;
pub const XL_EDGE_RIGHT: i32 = 10;
pub const XL_DIAGONAL_DOWN: i32 = 5;
pub const XL_DIAGONAL_UP: i32 = 6;

pub const XL_PATTERN_SOLID: i32 = 1;
pub const XL_PATTERN_LINEAR_GRADIENT: i32 = 4000;
pub const XL_PATTERN_RECTANGULAR_GRADIENT: i32 = 4001;

pub const XL_UNDERLINE_SINGLE: i32 = 2;
pub const XL_UNDERLINE_DOUBLE: i32 = -4119;
pub const XL_UNDERLINE_SINGLE_ACCOUNTING: i32 = 4;
pub const XL_UNDERLINE_DOUBLE_ACCOUNTING: i32 = 5;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AutomationStyle {
    pub borders: Vec<AutomationBorder>,
    pub font: Option<AutomationFont>,
    pub fill: Option<AutomationFill>,
    pub number_format: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutomationBorder {
    pub index: i32,
    pub line_style: Option<i32>,
    pub weight: Option<i32>,
    pub color: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AutomationFont {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<i32>,
    pub size: Option<f64>,
    pub strikethrough: Option<bool>,
    pub color: Option<i32>,
    pub superscript: Option<bool>,
    pub subscript: Option<bool>,
}

impl AutomationFont {
    fn is_empty(&self) -> bool {
        *self == AutomationFont::default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AutomationFill {
    Pattern {
        pattern: Option<i32>,
        color: Option<i32>,
        pattern_color: Option<i32>,
    },
    Gradient {
        geometry: Option<GradientGeometry>,
        stops: Vec<i32>,
    },
}

/// `#RRGGBB` to a BGR long.
pub fn to_bgr(color: &str) -> Option<i32> {
    let (r, g, b) = rgb_channels(color)?;
    Some(i32::from(r) | (i32::from(g) << 8) | (i32::from(b) << 16))
}

/// BGR long to `#RRGGBB`; values outside 24 bits are not colors.
pub fn from_bgr(value: i64) -> Option<String> {
    if !(0..=0xFF_FFFF).contains(&value) {
        return None;
    }
    let r = value & 0xFF;
    let g = (value >> 8) & 0xFF;
    let b = (value >> 16) & 0xFF;
    normalize_color(&format!("{r:02X}{g:02X}{b:02X}"))
}

pub fn border_index(side: BorderType) -> i32 {
    match side {
        BorderType::Left => XL_EDGE_LEFT,
        BorderType::Top => XL_EDGE_TOP,
        BorderType::Bottom => XL_EDGE_BOTTOM,
        BorderType::Right => XL_EDGE_RIGHT,
        BorderType::DiagonalDown => XL_DIAGONAL_DOWN,
        BorderType::DiagonalUp => XL_DIAGONAL_UP,
    }
}

pub fn border_side(index: i32) -> Option<BorderType> {
    match index {
        XL_EDGE_LEFT => Some(BorderType::Left),
        XL_EDGE_TOP => Some(BorderType::Top),
        XL_EDGE_BOTTOM => Some(BorderType::Bottom),
        XL_EDGE_RIGHT => Some(BorderType::Right),
        XL_DIAGONAL_DOWN => Some(BorderType::DiagonalDown),
        XL_DIAGONAL_UP => Some(BorderType::DiagonalUp),
        _ => None,
    }
}

/// Line style and weight. The medium variants have no line style of their
/// own; they are the plain style drawn at medium weight.
pub fn line_code(style: BorderStyle) -> (i32, i32) {
    match style {
        BorderStyle::None => (XL_NONE, XL_THIN),
        BorderStyle::Continuous => (XL_CONTINUOUS, XL_THIN),
        BorderStyle::Dash => (XL_DASH, XL_THIN),
        BorderStyle::Dot => (XL_DOT, XL_THIN),
        BorderStyle::Double => (XL_DOUBLE, XL_THICK),
        BorderStyle::DashDot => (XL_DASH_DOT, XL_THIN),
        BorderStyle::DashDotDot => (XL_DASH_DOT_DOT, XL_THIN),
        BorderStyle::SlantDashDot => (XL_SLANT_DASH_DOT, XL_MEDIUM),
        BorderStyle::MediumDashDot => (XL_DASH_DOT, XL_MEDIUM),
        BorderStyle::MediumDashDotDot => (XL_DASH_DOT_DOT, XL_MEDIUM),
    }
}

/// Unknown line styles read back as `Continuous`.
pub fn line_style_from_code(line_style: i32, weight: Option<i32>) -> BorderStyle {
    let medium = weight == Some(XL_MEDIUM);
    match line_style {
        XL_NONE => BorderStyle::None,
        XL_DASH => BorderStyle::Dash,
        XL_DOT => BorderStyle::Dot,
        XL_DOUBLE => BorderStyle::Double,
        XL_DASH_DOT if medium => BorderStyle::MediumDashDot,
        XL_DASH_DOT => BorderStyle::DashDot,
        XL_DASH_DOT_DOT if medium => BorderStyle::MediumDashDotDot,
        XL_DASH_DOT_DOT => BorderStyle::DashDotDot,
        XL_SLANT_DASH_DOT => BorderStyle::SlantDashDot,
        _ => BorderStyle::Continuous,
    }
}

pub fn pattern_code(pattern: FillPattern) -> i32 {
    match pattern {
        FillPattern::None => XL_NONE,
        FillPattern::Solid => XL_PATTERN_SOLID,
        FillPattern::MediumGray => -4125,
        FillPattern::DarkGray => -4126,
        FillPattern::LightGray => -4124,
        FillPattern::DarkHorizontal => -4128,
        FillPattern::DarkVertical => -4166,
        FillPattern::DarkDown => -4121,
        FillPattern::DarkUp => -4162,
        FillPattern::DarkGrid => 9,
        FillPattern::DarkTrellis => 10,
        FillPattern::LightHorizontal => 11,
        FillPattern::LightVertical => 12,
        FillPattern::LightDown => 13,
        FillPattern::LightUp => 14,
        FillPattern::LightGrid => 15,
        FillPattern::LightTrellis => 16,
        FillPattern::Gray125 => 17,
        FillPattern::Gray0625 => 18,
    }
}

/// `xlAutomatic` reads back as `Solid`; unknown codes as `None`.
pub fn pattern_from_code(code: i32) -> FillPattern {
    if code == XL_AUTOMATIC {
        return FillPattern::Solid;
    }
    FillPattern::ALL
        .iter()
        .copied()
        .find(|p| pattern_code(*p) == code)
        .unwrap_or(FillPattern::None)
}

pub fn underline_code(underline: FontUnderline) -> i32 {
    match underline {
        FontUnderline::None => XL_NONE,
        FontUnderline::Single => XL_UNDERLINE_SINGLE,
        FontUnderline::Double => XL_UNDERLINE_DOUBLE,
        FontUnderline::SingleAccounting => XL_UNDERLINE_SINGLE_ACCOUNTING,
        FontUnderline::DoubleAccounting => XL_UNDERLINE_DOUBLE_ACCOUNTING,
    }
}

/// Unknown codes read back as `Single`.
pub fn underline_from_code(code: i32) -> FontUnderline {
    match code {
        XL_NONE => FontUnderline::None,
        XL_UNDERLINE_DOUBLE => FontUnderline::Double,
        XL_UNDERLINE_SINGLE_ACCOUNTING => FontUnderline::SingleAccounting,
        XL_UNDERLINE_DOUBLE_ACCOUNTING => FontUnderline::DoubleAccounting,
        _ => FontUnderline::Single,
    }
}

/// `(superscript, subscript)` flags.
pub fn vert_align_flags(align: FontVertAlign) -> (bool, bool) {
    match align {
        FontVertAlign::Baseline => (false, false),
        FontVertAlign::Superscript => (true, false),
        FontVertAlign::Subscript => (false, true),
    }
}

pub fn vert_align_from_flags(superscript: bool, subscript: bool) -> FontVertAlign {
    match (superscript, subscript) {
        (true, _) => FontVertAlign::Superscript,
        (false, true) => FontVertAlign::Subscript,
        (false, false) => FontVertAlign::Baseline,
    }
}

pub fn to_automation(style: &CellStyle) -> AutomationStyle {
    let borders = style
        .border
        .iter()
        .map(|b| {
            let line = b.style.map(line_code);
            AutomationBorder {
                index: border_index(b.border_type),
                line_style: line.map(|(s, _)| s),
                weight: line.map(|(_, w)| w),
                color: b.color.as_deref().and_then(to_bgr),
            }
        })
        .collect();

    let font = style
        .font
        .as_ref()
        .map(|f| {
            let flags = f.vert_align.map(vert_align_flags);
            AutomationFont {
                bold: f.bold,
                italic: f.italic,
                underline: f.underline.map(underline_code),
                size: f.size,
                strikethrough: f.strike,
                color: f.color.as_deref().and_then(to_bgr),
                superscript: flags.map(|(sup, _)| sup),
                subscript: flags.map(|(_, sub)| sub),
            }
        })
        .filter(|f| !f.is_empty());

    let fill = style.fill.as_ref().filter(|f| !f.is_empty()).map(|f| {
        if f.is_gradient() {
            AutomationFill::Gradient {
                geometry: f.shading.map(GradientGeometry::from_shading),
                stops: f.color.iter().filter_map(|c| to_bgr(c)).collect(),
            }
        } else {
            AutomationFill::Pattern {
                pattern: f.pattern.map(pattern_code),
                color: f.color.first().and_then(|c| to_bgr(c)),
                pattern_color: f.color.get(1).and_then(|c| to_bgr(c)),
            }
        }
    });

    AutomationStyle {
        borders,
        font,
        fill,
        number_format: compose(style.num_fmt.as_deref(), style.decimal_places),
    }
}

pub fn from_automation(native: &AutomationStyle) -> CellStyle {
    let border = native
        .borders
        .iter()
        .filter_map(|b| {
            let border_type = border_side(b.index)?;
            Some(Border {
                border_type,
                style: b.line_style.map(|s| line_style_from_code(s, b.weight)),
                color: b.color.and_then(|c| from_bgr(i64::from(c))),
            })
        })
        .collect();

    let font = native
        .font
        .as_ref()
        .map(|f| FontStyle {
            bold: f.bold,
            italic: f.italic,
            underline: f.underline.map(underline_from_code),
            size: f.size,
            strike: f.strikethrough,
            color: f.color.and_then(|c| from_bgr(i64::from(c))),
            vert_align: match (f.superscript, f.subscript) {
                (None, None) => None,
                (sup, sub) => Some(vert_align_from_flags(
                    sup.unwrap_or(false),
                    sub.unwrap_or(false),
                )),
            },
        })
        .filter(|f| !f.is_empty());

    let fill = native.fill.as_ref().and_then(|fill| match fill {
        AutomationFill::Pattern {
            pattern,
            color,
            pattern_color,
        } => {
            let pattern = pattern.map(pattern_from_code);
            if pattern == Some(FillPattern::None) {
                return None;
            }
            let color: Vec<String> = [color, pattern_color]
                .into_iter()
                .flatten()
                .filter_map(|c| from_bgr(i64::from(*c)))
                .collect();
            if pattern.is_none() && color.is_empty() {
                return None;
            }
            Some(FillStyle {
                fill_type: Some(FillType::Pattern),
                pattern,
                color,
                shading: None,
            })
        }
        AutomationFill::Gradient { geometry, stops } => Some(FillStyle {
            fill_type: Some(FillType::Gradient),
            pattern: None,
            color: stops
                .iter()
                .filter_map(|c| from_bgr(i64::from(*c)))
                .collect(),
            shading: geometry.map(GradientGeometry::to_shading),
        }),
    });

    let (num_fmt, decimal_places) = native
        .number_format
        .as_deref()
        .map(decompose)
        .unwrap_or_default();

    CellStyle {
        border,
        font,
        fill,
        num_fmt,
        decimal_places,
    }
}
