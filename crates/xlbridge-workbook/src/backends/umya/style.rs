//! Moves [`NativeStyle`] records in and out of umya's style objects.
//!
//! Writes are merges: only the parts present in the record touch the cell's
//! existing style. Reads report only attributes that differ from a fresh
//! cell, so an untouched cell reads back as an empty style.

use umya_spreadsheet::{Border as UmyaBorder, Fill, GradientFill, GradientStop, PatternValues, Style};
use xlbridge_common::style::ooxml::{NativeBorder, NativeFill, NativeFont, NativeStyle};
use xlbridge_common::{BorderType, GradientGeometry};

const DEFAULT_FONT_SIZE: f64 = 11.0;
const DEFAULT_FONT_ARGB: &str = "FF000000";

pub(super) fn pattern_values(code: &str) -> PatternValues {
    match code {
        "solid" => PatternValues::Solid,
        "mediumGray" => PatternValues::MediumGray,
        "darkGray" => PatternValues::DarkGray,
        "lightGray" => PatternValues::LightGray,
        "darkHorizontal" => PatternValues::DarkHorizontal,
        "darkVertical" => PatternValues::DarkVertical,
        "darkDown" => PatternValues::DarkDown,
        "darkUp" => PatternValues::DarkUp,
        "darkGrid" => PatternValues::DarkGrid,
        "darkTrellis" => PatternValues::DarkTrellis,
        "lightHorizontal" => PatternValues::LightHorizontal,
        "lightVertical" => PatternValues::LightVertical,
        "lightDown" => PatternValues::LightDown,
        "lightUp" => PatternValues::LightUp,
        "lightGrid" => PatternValues::LightGrid,
        "lightTrellis" => PatternValues::LightTrellis,
        "gray125" => PatternValues::Gray125,
        "gray0625" => PatternValues::Gray0625,
        _ => PatternValues::None,
    }
}

fn pattern_code(value: &PatternValues) -> &'static str {
    match value {
        PatternValues::Solid => "solid",
        PatternValues::MediumGray => "mediumGray",
        PatternValues::DarkGray => "darkGray",
        PatternValues::LightGray => "lightGray",
        PatternValues::DarkHorizontal => "darkHorizontal",
        PatternValues::DarkVertical => "darkVertical",
        PatternValues::DarkDown => "darkDown",
        PatternValues::DarkUp => "darkUp",
        PatternValues::DarkGrid => "darkGrid",
        PatternValues::DarkTrellis => "darkTrellis",
        PatternValues::LightHorizontal => "lightHorizontal",
        PatternValues::LightVertical => "lightVertical",
        PatternValues::LightDown => "lightDown",
        PatternValues::LightUp => "lightUp",
        PatternValues::LightGrid => "lightGrid",
        PatternValues::LightTrellis => "lightTrellis",
        PatternValues::Gray125 => "gray125",
        PatternValues::Gray0625 => "gray0625",
        PatternValues::None => "none",
    }
}

fn set_border(border: &mut UmyaBorder, native: &NativeBorder) {
    if let Some(style) = &native.style {
        border.set_border_style(style.as_str());
    }
    if let Some(argb) = &native.argb {
        border.get_color_mut().set_argb(argb.as_str());
    }
}

fn apply_font(style: &mut Style, native: &NativeFont) {
    let font = style.get_font_mut();
    if let Some(bold) = native.bold {
        font.set_bold(bold);
    }
    if let Some(italic) = native.italic {
        font.set_italic(italic);
    }
    if let Some(underline) = &native.underline {
        font.set_underline(underline.as_str());
    }
    if let Some(size) = native.size {
        font.set_size(size);
    }
    if let Some(strike) = native.strike {
        font.set_strikethrough(strike);
    }
    if let Some(argb) = &native.argb {
        font.get_color_mut().set_argb(argb.as_str());
    }
    // The font record exposes no vertical alignment; `vert_align` is dropped.
}

fn apply_fill(style: &mut Style, native: &NativeFill) {
    let mut fill = Fill::default();
    match native {
        NativeFill::Pattern { pattern, argb } => {
            let mut pattern_fill = style
                .get_fill()
                .and_then(|f| f.get_pattern_fill())
                .cloned()
                .unwrap_or_default();
            match pattern {
                Some(code) => {
                    pattern_fill.set_pattern_type(pattern_values(code));
                }
                None if *pattern_fill.get_pattern_type() == PatternValues::None
                    && !argb.is_empty() =>
                {
                    pattern_fill.set_pattern_type(PatternValues::Solid);
                }
                None => {}
            }
            if let Some(fg) = argb.first() {
                pattern_fill.get_foreground_color_mut().set_argb(fg.as_str());
            }
            if let Some(bg) = argb.get(1) {
                pattern_fill.get_background_color_mut().set_argb(bg.as_str());
            }
            fill.set_pattern_fill(pattern_fill);
        }
        NativeFill::Gradient { geometry, argb } => {
            let mut gradient = GradientFill::default();
            // Path gradients have no focus setting here and are written linear.
            if let Some(GradientGeometry::Linear { degree }) = geometry {
                gradient.set_degree(*degree);
            }
            let last = argb.len().saturating_sub(1).max(1) as f64;
            for (i, color) in argb.iter().enumerate() {
                let mut stop = GradientStop::default();
                stop.set_position(i as f64 / last);
                stop.get_color_mut().set_argb(color.as_str());
                gradient.set_gradient_stop(stop);
            }
            fill.set_gradient_fill(gradient);
        }
    }
    style.set_fill(fill);
}

/// Merge `native` into `style`.
pub(super) fn apply(style: &mut Style, native: &NativeStyle) {
    for border in &native.borders {
        let borders = style.get_borders_mut();
        match border.side {
            BorderType::Left => set_border(borders.get_left_border_mut(), border),
            BorderType::Right => set_border(borders.get_right_border_mut(), border),
            BorderType::Top => set_border(borders.get_top_border_mut(), border),
            BorderType::Bottom => set_border(borders.get_bottom_border_mut(), border),
            BorderType::DiagonalDown => {
                set_border(borders.get_diagonal_border_mut(), border);
                borders.set_diagonal_down(true);
            }
            BorderType::DiagonalUp => {
                set_border(borders.get_diagonal_border_mut(), border);
                borders.set_diagonal_up(true);
            }
        }
    }
    if let Some(font) = &native.font {
        apply_font(style, font);
    }
    if let Some(fill) = &native.fill {
        apply_fill(style, fill);
    }
    if let Some(code) = &native.number_format {
        style.get_number_format_mut().set_format_code(code.as_str());
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn read_border(side: BorderType, border: &UmyaBorder) -> Option<NativeBorder> {
    let style = border.get_border_style();
    if style.is_empty() || style == "none" {
        return None;
    }
    Some(NativeBorder {
        side,
        style: Some(style.to_string()),
        argb: non_empty(border.get_color().get_argb()),
    })
}

fn read_font(style: &Style) -> Option<NativeFont> {
    let font = style.get_font()?;
    let underline = font.get_underline();
    let size = *font.get_size();
    let argb = font.get_color().get_argb();
    let native = NativeFont {
        bold: font.get_bold().then_some(true),
        italic: font.get_italic().then_some(true),
        underline: (!underline.is_empty() && underline != "none").then(|| underline.to_string()),
        size: (size > 0.0 && size != DEFAULT_FONT_SIZE).then_some(size),
        strike: font.get_strikethrough().then_some(true),
        argb: (!argb.is_empty() && argb != DEFAULT_FONT_ARGB).then(|| argb.to_string()),
        vert_align: None,
    };
    (native != NativeFont::default()).then_some(native)
}

fn read_fill(style: &Style) -> Option<NativeFill> {
    let fill = style.get_fill()?;
    if let Some(gradient) = fill.get_gradient_fill() {
        return Some(NativeFill::Gradient {
            geometry: Some(GradientGeometry::Linear {
                degree: *gradient.get_degree(),
            }),
            argb: gradient
                .get_gradient_stop()
                .iter()
                .filter_map(|stop| non_empty(stop.get_color().get_argb()))
                .collect(),
        });
    }
    let pattern = fill.get_pattern_fill()?;
    let argb = [
        pattern.get_foreground_color().map(|c| c.get_argb()),
        pattern.get_background_color().map(|c| c.get_argb()),
    ]
    .into_iter()
    .flatten()
    .filter_map(non_empty)
    .collect();
    Some(NativeFill::Pattern {
        pattern: Some(pattern_code(pattern.get_pattern_type()).to_string()),
        argb,
    })
}

/// Non-default parts of `style`.
pub(super) fn read(style: &Style) -> NativeStyle {
    let mut borders = Vec::new();
    if let Some(b) = style.get_borders() {
        let sides = [
            (BorderType::Left, b.get_left_border()),
            (BorderType::Right, b.get_right_border()),
            (BorderType::Top, b.get_top_border()),
            (BorderType::Bottom, b.get_bottom_border()),
        ];
        borders.extend(sides.into_iter().filter_map(|(side, border)| read_border(side, border)));
        if *b.get_diagonal_down() {
            borders.extend(read_border(BorderType::DiagonalDown, b.get_diagonal_border()));
        }
        if *b.get_diagonal_up() {
            borders.extend(read_border(BorderType::DiagonalUp, b.get_diagonal_border()));
        }
    }
    NativeStyle {
        borders,
        font: read_font(style),
        fill: read_fill(style),
        number_format: style
            .get_number_format()
            .map(|n| n.get_format_code().to_string()),
    }
}
