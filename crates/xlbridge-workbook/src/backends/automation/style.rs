//! Moves [`AutomationStyle`] records through a live range's `Borders`,
//! `Font`, `Interior` and `NumberFormat` properties.

use xlbridge_common::GradientGeometry;
use xlbridge_common::style::automation::{
    AutomationBorder, AutomationFill, AutomationFont, AutomationStyle, XL_AUTOMATIC,
    XL_DIAGONAL_DOWN, XL_DIAGONAL_UP, XL_EDGE_BOTTOM, XL_EDGE_LEFT, XL_EDGE_RIGHT, XL_EDGE_TOP,
    XL_NONE, XL_PATTERN_LINEAR_GRADIENT, XL_PATTERN_RECTANGULAR_GRADIENT,
};

use crate::error::Result;

use super::dispatch::{Dispatch, Variant, items, set};

const DEFAULT_FONT_SIZE: f64 = 11.0;
const GENERAL_FORMAT: &str = "General";

const BORDER_INDEXES: [i32; 6] = [
    XL_EDGE_LEFT,
    XL_EDGE_RIGHT,
    XL_EDGE_TOP,
    XL_EDGE_BOTTOM,
    XL_DIAGONAL_DOWN,
    XL_DIAGONAL_UP,
];

fn opt_i32(value: &Variant) -> Option<i32> {
    value.opt_i64().and_then(|n| i32::try_from(n).ok())
}

fn flag(value: &Variant) -> bool {
    value.as_bool().unwrap_or(false)
}

fn apply_border(range: &dyn Dispatch, border: &AutomationBorder) -> Result<()> {
    let target = range.object("Borders", &[Variant::from(border.index)])?;
    if let Some(line_style) = border.line_style {
        set(target.as_ref(), "LineStyle", line_style)?;
    }
    if let Some(weight) = border.weight {
        set(target.as_ref(), "Weight", weight)?;
    }
    if let Some(color) = border.color {
        set(target.as_ref(), "Color", color)?;
    }
    Ok(())
}

fn apply_font(range: &dyn Dispatch, native: &AutomationFont) -> Result<()> {
    let font = range.object("Font", &[])?;
    let font = font.as_ref();
    if let Some(bold) = native.bold {
        set(font, "Bold", bold)?;
    }
    if let Some(italic) = native.italic {
        set(font, "Italic", italic)?;
    }
    if let Some(underline) = native.underline {
        set(font, "Underline", underline)?;
    }
    if let Some(size) = native.size {
        set(font, "Size", size)?;
    }
    if let Some(strike) = native.strikethrough {
        set(font, "Strikethrough", strike)?;
    }
    if let Some(color) = native.color {
        set(font, "Color", color)?;
    }
    if let Some(sup) = native.superscript {
        set(font, "Superscript", sup)?;
    }
    if let Some(sub) = native.subscript {
        set(font, "Subscript", sub)?;
    }
    Ok(())
}

fn apply_fill(range: &dyn Dispatch, fill: &AutomationFill) -> Result<()> {
    let interior = range.object("Interior", &[])?;
    let interior = interior.as_ref();
    match fill {
        AutomationFill::Pattern {
            pattern,
            color,
            pattern_color,
        } => {
            if let Some(pattern) = pattern {
                set(interior, "Pattern", *pattern)?;
            }
            if let Some(color) = color {
                set(interior, "Color", *color)?;
            }
            if let Some(color) = pattern_color {
                set(interior, "PatternColor", *color)?;
            }
        }
        AutomationFill::Gradient { geometry, stops } => {
            let pattern = match geometry {
                Some(GradientGeometry::Rectangular { .. }) => XL_PATTERN_RECTANGULAR_GRADIENT,
                _ => XL_PATTERN_LINEAR_GRADIENT,
            };
            set(interior, "Pattern", pattern)?;
            let gradient = interior.object("Gradient", &[])?;
            match geometry {
                Some(GradientGeometry::Linear { degree }) => {
                    set(gradient.as_ref(), "Degree", *degree)?;
                }
                Some(GradientGeometry::Rectangular { left, top }) => {
                    set(gradient.as_ref(), "RectangleLeft", *left)?;
                    set(gradient.as_ref(), "RectangleRight", *left)?;
                    set(gradient.as_ref(), "RectangleTop", *top)?;
                    set(gradient.as_ref(), "RectangleBottom", *top)?;
                }
                None => {}
            }
            let color_stops = gradient.object("ColorStops", &[])?;
            color_stops.call("Clear", &[])?;
            let last = stops.len().saturating_sub(1).max(1) as f64;
            for (i, color) in stops.iter().enumerate() {
                let stop = color_stops.call_object("Add", &[Variant::Float(i as f64 / last)])?;
                set(stop.as_ref(), "Color", *color)?;
            }
        }
    }
    Ok(())
}

/// Write every part present in `native` to `range`.
pub(super) fn apply(range: &dyn Dispatch, native: &AutomationStyle) -> Result<()> {
    for border in &native.borders {
        apply_border(range, border)?;
    }
    if let Some(font) = &native.font {
        apply_font(range, font)?;
    }
    if let Some(fill) = &native.fill {
        apply_fill(range, fill)?;
    }
    if let Some(code) = &native.number_format {
        set(range, "NumberFormat", code.as_str())?;
    }
    Ok(())
}

fn read_border(range: &dyn Dispatch, index: i32) -> Result<Option<AutomationBorder>> {
    let border = range.object("Borders", &[Variant::from(index)])?;
    let line_style = opt_i32(&border.get("LineStyle", &[])?);
    if line_style.is_none_or(|s| s == XL_NONE) {
        return Ok(None);
    }
    Ok(Some(AutomationBorder {
        index,
        line_style,
        weight: opt_i32(&border.get("Weight", &[])?),
        color: opt_i32(&border.get("Color", &[])?),
    }))
}

fn read_font(range: &dyn Dispatch) -> Result<Option<AutomationFont>> {
    let font = range.object("Font", &[])?;
    let underline = opt_i32(&font.get("Underline", &[])?).filter(|u| *u != XL_NONE);
    let size = font
        .get("Size", &[])?
        .as_f64()
        .ok()
        .filter(|s| *s > 0.0 && *s != DEFAULT_FONT_SIZE);
    let native = AutomationFont {
        bold: flag(&font.get("Bold", &[])?).then_some(true),
        italic: flag(&font.get("Italic", &[])?).then_some(true),
        underline,
        size,
        strikethrough: flag(&font.get("Strikethrough", &[])?).then_some(true),
        color: opt_i32(&font.get("Color", &[])?).filter(|c| *c != 0),
        superscript: flag(&font.get("Superscript", &[])?).then_some(true),
        subscript: flag(&font.get("Subscript", &[])?).then_some(true),
    };
    Ok((native != AutomationFont::default()).then_some(native))
}

fn read_fill(range: &dyn Dispatch) -> Result<Option<AutomationFill>> {
    let interior = range.object("Interior", &[])?;
    let Some(pattern) = opt_i32(&interior.get("Pattern", &[])?) else {
        return Ok(None);
    };
    if pattern == XL_NONE {
        return Ok(None);
    }
    if pattern == XL_PATTERN_LINEAR_GRADIENT || pattern == XL_PATTERN_RECTANGULAR_GRADIENT {
        let gradient = interior.object("Gradient", &[])?;
        let geometry = if pattern == XL_PATTERN_LINEAR_GRADIENT {
            GradientGeometry::Linear {
                degree: gradient.get("Degree", &[])?.as_f64().unwrap_or(0.0),
            }
        } else {
            GradientGeometry::Rectangular {
                left: gradient.get("RectangleLeft", &[])?.as_f64().unwrap_or(0.0),
                top: gradient.get("RectangleTop", &[])?.as_f64().unwrap_or(0.0),
            }
        };
        let stops = items(gradient.object("ColorStops", &[])?.as_ref())?
            .iter()
            .filter_map(|stop| stop.get("Color", &[]).ok().as_ref().and_then(opt_i32))
            .collect();
        return Ok(Some(AutomationFill::Gradient {
            geometry: Some(geometry),
            stops,
        }));
    }
    let automatic_pattern_color =
        opt_i32(&interior.get("PatternColorIndex", &[])?) == Some(XL_AUTOMATIC);
    let pattern_color = if automatic_pattern_color {
        None
    } else {
        opt_i32(&interior.get("PatternColor", &[])?)
    };
    Ok(Some(AutomationFill::Pattern {
        pattern: Some(pattern),
        color: opt_i32(&interior.get("Color", &[])?),
        pattern_color,
    }))
}

/// Non-default parts of the style of `range`, which should be one cell.
pub(super) fn read(range: &dyn Dispatch) -> Result<AutomationStyle> {
    let mut borders = Vec::new();
    for index in BORDER_INDEXES {
        borders.extend(read_border(range, index)?);
    }
    let number_format = range
        .text("NumberFormat")?
        .trim()
        .to_string();
    Ok(AutomationStyle {
        borders,
        font: read_font(range)?,
        fill: read_fill(range)?,
        number_format: (!number_format.is_empty() && number_format != GENERAL_FORMAT)
            .then_some(number_format),
    })
}
