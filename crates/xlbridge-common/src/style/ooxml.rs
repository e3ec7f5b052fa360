//! Style encoding for the direct-file engine (xlsx attribute vocabulary).
//!
//! Border styles, underline kinds and pattern types travel as their xlsx
//! attribute strings; colors as opaque ARGB. Reading back is lossy where the
//! file format is richer than the neutral vocabulary: `thin`, `medium`,
//! `thick` and `hair` all read back as `continuous`.

use super::color::{from_native_hex, to_argb};
use super::number_format::{compose, decompose};
use super::{
    Border, BorderStyle, BorderType, CellStyle, FillPattern, FillStyle, FillType, FontStyle,
    FontUnderline, FontVertAlign, GradientGeometry,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NativeStyle {
    pub borders: Vec<NativeBorder>,
    pub font: Option<NativeFont>,
    pub fill: Option<NativeFill>,
    pub number_format: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeBorder {
    pub side: BorderType,
    pub style: Option<String>,
    pub argb: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NativeFont {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<String>,
    pub size: Option<f64>,
    pub strike: Option<bool>,
    pub argb: Option<String>,
    pub vert_align: Option<String>,
}

impl NativeFont {
    fn is_empty(&self) -> bool {
        *self == NativeFont::default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NativeFill {
    Pattern {
        pattern: Option<String>,
        argb: Vec<String>,
    },
    Gradient {
        geometry: Option<GradientGeometry>,
        argb: Vec<String>,
    },
}

pub fn border_style_code(style: BorderStyle) -> &'static str {
    match style {
        BorderStyle::None => "none",
        BorderStyle::Continuous => "thin",
        BorderStyle::Dash => "dashed",
        BorderStyle::Dot => "dotted",
        BorderStyle::Double => "double",
        BorderStyle::DashDot => "dashDot",
        BorderStyle::DashDotDot => "dashDotDot",
        BorderStyle::SlantDashDot => "slantDashDot",
        BorderStyle::MediumDashDot => "mediumDashDot",
        BorderStyle::MediumDashDotDot => "mediumDashDotDot",
    }
}

/// Unknown codes read back as `Continuous`.
pub fn border_style_from_code(code: &str) -> BorderStyle {
    match code {
        "none" | "" => BorderStyle::None,
        "dashed" | "mediumDashed" => BorderStyle::Dash,
        "dotted" => BorderStyle::Dot,
        "double" => BorderStyle::Double,
        "dashDot" => BorderStyle::DashDot,
        "dashDotDot" => BorderStyle::DashDotDot,
        "slantDashDot" => BorderStyle::SlantDashDot,
        "mediumDashDot" => BorderStyle::MediumDashDot,
        "mediumDashDotDot" => BorderStyle::MediumDashDotDot,
        _ => BorderStyle::Continuous,
    }
}

pub fn underline_code(underline: FontUnderline) -> &'static str {
    match underline {
        FontUnderline::None => "none",
        FontUnderline::Single => "single",
        FontUnderline::Double => "double",
        FontUnderline::SingleAccounting => "singleAccounting",
        FontUnderline::DoubleAccounting => "doubleAccounting",
    }
}

/// Unknown codes read back as `Single`; an empty code means no underline.
pub fn underline_from_code(code: &str) -> FontUnderline {
    match code {
        "none" | "" => FontUnderline::None,
        "double" => FontUnderline::Double,
        "singleAccounting" => FontUnderline::SingleAccounting,
        "doubleAccounting" => FontUnderline::DoubleAccounting,
        _ => FontUnderline::Single,
    }
}

pub fn vert_align_code(align: FontVertAlign) -> &'static str {
    match align {
        FontVertAlign::Baseline => "baseline",
        FontVertAlign::Superscript => "superscript",
        FontVertAlign::Subscript => "subscript",
    }
}

pub fn vert_align_from_code(code: &str) -> FontVertAlign {
    match code {
        "superscript" => FontVertAlign::Superscript,
        "subscript" => FontVertAlign::Subscript,
        _ => FontVertAlign::Baseline,
    }
}

/// The pattern vocabulary already uses xlsx `patternType` names.
pub fn pattern_code(pattern: FillPattern) -> &'static str {
    pattern.as_str()
}

/// Unknown codes read back as `None`.
pub fn pattern_from_code(code: &str) -> FillPattern {
    code.parse().unwrap_or(FillPattern::None)
}

pub fn to_native(style: &CellStyle) -> NativeStyle {
    let borders = style
        .border
        .iter()
        .map(|b| NativeBorder {
            side: b.border_type,
            style: b.style.map(|s| border_style_code(s).to_string()),
            argb: b.color.as_deref().and_then(to_argb),
        })
        .collect();

    let font = style
        .font
        .as_ref()
        .map(|f| NativeFont {
            bold: f.bold,
            italic: f.italic,
            underline: f.underline.map(|u| underline_code(u).to_string()),
            size: f.size,
            strike: f.strike,
            argb: f.color.as_deref().and_then(to_argb),
            vert_align: f.vert_align.map(|v| vert_align_code(v).to_string()),
        })
        .filter(|f| !f.is_empty());

    let fill = style.fill.as_ref().filter(|f| !f.is_empty()).map(|f| {
        let argb = f.color.iter().filter_map(|c| to_argb(c)).collect();
        if f.is_gradient() {
            NativeFill::Gradient {
                geometry: f.shading.map(GradientGeometry::from_shading),
                argb,
            }
        } else {
            NativeFill::Pattern {
                pattern: f.pattern.map(|p| pattern_code(p).to_string()),
                argb,
            }
        }
    });

    NativeStyle {
        borders,
        font,
        fill,
        number_format: compose(style.num_fmt.as_deref(), style.decimal_places),
    }
}

pub fn from_native(native: &NativeStyle) -> CellStyle {
    let border = native
        .borders
        .iter()
        .map(|b| Border {
            border_type: b.side,
            style: b.style.as_deref().map(border_style_from_code),
            color: b.argb.as_deref().and_then(from_native_hex),
        })
        .collect();

    let font = native.font.as_ref().map(|f| FontStyle {
        bold: f.bold,
        italic: f.italic,
        underline: f.underline.as_deref().map(underline_from_code),
        size: f.size,
        strike: f.strike,
        color: f.argb.as_deref().and_then(from_native_hex),
        vert_align: f.vert_align.as_deref().map(vert_align_from_code),
    });

    let fill = native.fill.as_ref().and_then(|fill| match fill {
        NativeFill::Pattern { pattern, argb } => {
            let pattern = pattern.as_deref().map(pattern_from_code);
            let color: Vec<String> = argb.iter().filter_map(|c| from_native_hex(c)).collect();
            if color.is_empty() && matches!(pattern, None | Some(FillPattern::None)) {
                return None;
            }
            Some(FillStyle {
                fill_type: Some(FillType::Pattern),
                pattern,
                color,
                shading: None,
            })
        }
        NativeFill::Gradient { geometry, argb } => Some(FillStyle {
            fill_type: Some(FillType::Gradient),
            pattern: None,
            color: argb.iter().filter_map(|c| from_native_hex(c)).collect(),
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
        font: font.filter(|f| !f.is_empty()),
        fill,
        num_fmt,
        decimal_places,
    }
}
