//! Backend-neutral cell style vocabulary.
//!
//! Every field of [`CellStyle`] is independently optional: `None` means
//! "unspecified", never "reset to default". Backends translate through the
//! tables in [`ooxml`] (direct-file engine) and [`automation`] (host
//! application object model).
//!
//! Colors are carried as canonical uppercase `#RRGGBB` strings on this side.

pub mod automation;
pub mod color;
pub mod number_format;
pub mod ooxml;

use std::error::Error;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A vocabulary string that does not name any known constant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} value '{}'", self.kind, self.value)
    }
}

impl Error for UnknownVariant {}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

vocabulary! {
    /// Which edge (or diagonal) of the cell a border applies to.
    BorderType {
        Left => "left",
        Right => "right",
        Top => "top",
        Bottom => "bottom",
        DiagonalDown => "diagonalDown",
        DiagonalUp => "diagonalUp",
    }
}

vocabulary! {
    /// Border line style.
    BorderStyle {
        None => "none",
        Continuous => "continuous",
        Dash => "dash",
        Dot => "dot",
        Double => "double",
        DashDot => "dashDot",
        DashDotDot => "dashDotDot",
        SlantDashDot => "slantDashDot",
        MediumDashDot => "mediumDashDot",
        MediumDashDotDot => "mediumDashDotDot",
    }
}

vocabulary! {
    FontUnderline {
        None => "none",
        Single => "single",
        Double => "double",
        SingleAccounting => "singleAccounting",
        DoubleAccounting => "doubleAccounting",
    }
}

vocabulary! {
    FontVertAlign {
        Baseline => "baseline",
        Superscript => "superscript",
        Subscript => "subscript",
    }
}

vocabulary! {
    FillType {
        Gradient => "gradient",
        Pattern => "pattern",
    }
}

vocabulary! {
    /// Pattern fill kinds, named after the xlsx `patternType` values.
    FillPattern {
        None => "none",
        Solid => "solid",
        MediumGray => "mediumGray",
        DarkGray => "darkGray",
        LightGray => "lightGray",
        DarkHorizontal => "darkHorizontal",
        DarkVertical => "darkVertical",
        DarkDown => "darkDown",
        DarkUp => "darkUp",
        DarkGrid => "darkGrid",
        DarkTrellis => "darkTrellis",
        LightHorizontal => "lightHorizontal",
        LightVertical => "lightVertical",
        LightDown => "lightDown",
        LightUp => "lightUp",
        LightGrid => "lightGrid",
        LightTrellis => "lightTrellis",
        Gray125 => "gray125",
        Gray0625 => "gray0625",
    }
}

vocabulary! {
    /// Direction of a gradient fill.
    FillShading {
        Horizontal => "horizontal",
        Vertical => "vertical",
        DiagonalDown => "diagonalDown",
        DiagonalUp => "diagonalUp",
        FromCenter => "fromCenter",
        FromCorner => "fromCorner",
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellStyle {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub border: Vec<Border>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub font: Option<FontStyle>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub fill: Option<FillStyle>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub num_fmt: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub decimal_places: Option<u32>,
}

impl CellStyle {
    pub fn is_empty(&self) -> bool {
        self.border.is_empty()
            && self.font.as_ref().is_none_or(FontStyle::is_empty)
            && self.fill.as_ref().is_none_or(FillStyle::is_empty)
            && self.num_fmt.is_none()
            && self.decimal_places.is_none()
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Border {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub border_type: BorderType,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub style: Option<BorderStyle>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub color: Option<String>,
}

impl Border {
    pub fn new(border_type: BorderType) -> Self {
        Self {
            border_type,
            style: None,
            color: None,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FontStyle {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub bold: Option<bool>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub italic: Option<bool>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub underline: Option<FontUnderline>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub size: Option<f64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub strike: Option<bool>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub color: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub vert_align: Option<FontVertAlign>,
}

impl FontStyle {
    pub fn is_empty(&self) -> bool {
        self.bold.is_none()
            && self.italic.is_none()
            && self.underline.is_none()
            && self.size.is_none()
            && self.strike.is_none()
            && self.color.is_none()
            && self.vert_align.is_none()
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FillStyle {
    #[cfg_attr(
        feature = "serde",
        serde(rename = "type", default, skip_serializing_if = "Option::is_none")
    )]
    pub fill_type: Option<FillType>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub pattern: Option<FillPattern>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub color: Vec<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub shading: Option<FillShading>,
}

impl FillStyle {
    pub fn is_empty(&self) -> bool {
        self.fill_type.is_none()
            && self.pattern.is_none()
            && self.color.is_empty()
            && self.shading.is_none()
    }

    /// Gradient when asked for explicitly or implied by a shading direction.
    pub fn is_gradient(&self) -> bool {
        match self.fill_type {
            Some(FillType::Gradient) => true,
            Some(FillType::Pattern) => false,
            None => self.shading.is_some(),
        }
    }
}

/// Gradient placement shared by both native models: a linear sweep at an
/// angle, or a rectangular (path) gradient radiating from a focus point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientGeometry {
    Linear { degree: f64 },
    Rectangular { left: f64, top: f64 },
}

impl GradientGeometry {
    pub fn from_shading(shading: FillShading) -> Self {
        match shading {
            FillShading::Horizontal => GradientGeometry::Linear { degree: 90.0 },
            FillShading::Vertical => GradientGeometry::Linear { degree: 0.0 },
            FillShading::DiagonalUp => GradientGeometry::Linear { degree: 45.0 },
            FillShading::DiagonalDown => GradientGeometry::Linear { degree: 135.0 },
            FillShading::FromCenter => GradientGeometry::Rectangular {
                left: 0.5,
                top: 0.5,
            },
            FillShading::FromCorner => GradientGeometry::Rectangular {
                left: 0.0,
                top: 0.0,
            },
        }
    }

    /// Unrecognized angles fall back to `Horizontal`; any off-center focus is `FromCorner`.
    pub fn to_shading(self) -> FillShading {
        match self {
            GradientGeometry::Linear { degree } => {
                let degree = degree.rem_euclid(180.0);
                if degree == 0.0 {
                    FillShading::Vertical
                } else if degree == 45.0 {
                    FillShading::DiagonalUp
                } else if degree == 135.0 {
                    FillShading::DiagonalDown
                } else {
                    FillShading::Horizontal
                }
            }
            GradientGeometry::Rectangular { left, top } => {
                if left == 0.5 && top == 0.5 {
                    FillShading::FromCenter
                } else {
                    FillShading::FromCorner
                }
            }
        }
    }
}
