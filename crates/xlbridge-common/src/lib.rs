pub mod coord;
pub mod error;
pub mod range;
pub mod style;

pub use coord::*;
pub use error::*;
pub use range::*;
pub use style::{
    Border, BorderStyle, BorderType, CellStyle, FillPattern, FillShading, FillStyle, FillType,
    FontStyle, FontUnderline, FontVertAlign, GradientGeometry, UnknownVariant,
};
