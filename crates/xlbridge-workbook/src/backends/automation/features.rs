//! Sheet decorations driven through the host's object model: charts,
//! panes, validation, conditional formats, comments, hyperlinks and
//! rendered snapshots.

use std::rc::Rc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;
use xlbridge_common::style::automation::to_bgr;
use xlbridge_common::{CellRange, cell_name, normalize_range};

use crate::address;
use crate::error::{BridgeError, Result};
use crate::traits::{
    CellOperator, ChartKind, ChartSpec, Comment, ConditionalFormat, ConditionalRule,
    DEFAULT_DATA_BAR_COLOR, DEFAULT_SCALE_MAX_COLOR, DEFAULT_SCALE_MIN_COLOR, DataValidation,
    HyperlinkTarget, ValidationRule,
};

use super::dispatch::{Dispatch, Variant, items, set};

/// Default chart extent in points.
const CHART_WIDTH: f64 = 480.0;
const CHART_HEIGHT: f64 = 288.0;

const XL_VALIDATE_WHOLE: i32 = 1;
const XL_VALIDATE_DECIMAL: i32 = 2;
const XL_VALIDATE_LIST: i32 = 3;
const XL_VALID_ALERT_STOP: i32 = 1;
const XL_BETWEEN: i32 = 1;

const XL_CELL_VALUE: i32 = 1;
const XL_TOP10_TOP: i32 = 1;
const XL_DUPLICATE: i32 = 1;
const XL_CONDITION_VALUE_NUMBER: i32 = 0;
const XL_CONDITION_VALUE_LOWEST: i32 = 1;
const XL_CONDITION_VALUE_HIGHEST: i32 = 2;

const XL_SCREEN: i32 = 1;
const XL_BITMAP: i32 = 2;

pub(super) fn chart_type_code(kind: ChartKind) -> i32 {
    match kind {
        ChartKind::Col => 51,
        ChartKind::Bar => 57,
        ChartKind::Line => 4,
        ChartKind::Pie => 5,
        ChartKind::Area => 1,
        ChartKind::Scatter => -4169,
    }
}

pub(super) fn operator_code(operator: CellOperator) -> i32 {
    match operator {
        CellOperator::Between => 1,
        CellOperator::NotBetween => 2,
        CellOperator::Equal => 3,
        CellOperator::NotEqual => 4,
        CellOperator::GreaterThan => 5,
        CellOperator::LessThan => 6,
        CellOperator::GreaterThanOrEqual => 7,
        CellOperator::LessThanOrEqual => 8,
    }
}

fn bgr(color: &str) -> Result<i32> {
    to_bgr(color).ok_or_else(|| BridgeError::InvalidFormat(format!("invalid color: {color}")))
}

/// A1 address of `range` without `$` markers.
pub(super) fn address_of(range: &dyn Dispatch) -> Result<String> {
    let address = range.get("Address", &[Variant::Bool(false), Variant::Bool(false)])?;
    Ok(normalize_range(&address.to_text()))
}

pub(super) fn add_chart(
    application: &dyn Dispatch,
    sheet: &dyn Dispatch,
    chart: &ChartSpec,
) -> Result<()> {
    let (col, row) = address::cell(&chart.position)?;
    let anchor = sheet.object("Range", &[Variant::from(cell_name(col, row)?)])?;
    let left = anchor.get("Left", &[])?.as_f64()?;
    let top = anchor.get("Top", &[])?.as_f64()?;

    // A sheet-qualified source may live on another sheet.
    let source = if chart.data_range.contains('!') {
        application.object("Range", &[Variant::from(chart.data_range.as_str())])?
    } else {
        let area = address::range(&chart.data_range)?;
        sheet.object("Range", &[Variant::from(area.to_string())])?
    };

    let chart_objects = sheet.call_object("ChartObjects", &[])?;
    let added = chart_objects.call_object(
        "Add",
        &[
            Variant::Float(left),
            Variant::Float(top),
            Variant::Float(CHART_WIDTH),
            Variant::Float(CHART_HEIGHT),
        ],
    )?;
    let target = added.object("Chart", &[])?;
    target.call("SetSourceData", &[Variant::Object(source)])?;
    set(target.as_ref(), "ChartType", chart_type_code(chart.kind))?;
    if let Some(title) = &chart.title {
        set(target.as_ref(), "HasTitle", true)?;
        let chart_title = target.object("ChartTitle", &[])?;
        set(chart_title.as_ref(), "Text", title.as_str())?;
    }
    debug!(position = %chart.position, kind = ?chart.kind, "added chart");
    Ok(())
}

/// Panes are a property of the window showing the sheet, so the sheet is
/// activated first.
pub(super) fn freeze_panes(
    application: &dyn Dispatch,
    sheet: &dyn Dispatch,
    cell: &str,
) -> Result<()> {
    let (col, row) = address::cell(cell)?;
    sheet.call("Activate", &[])?;
    let window = application.object("ActiveWindow", &[])?;
    let window = window.as_ref();
    set(window, "FreezePanes", false)?;
    set(window, "SplitColumn", col - 1)?;
    set(window, "SplitRow", row - 1)?;
    if col > 1 || row > 1 {
        set(window, "FreezePanes", true)?;
    }
    Ok(())
}

pub(super) fn add_data_validation(range: &dyn Dispatch, validation: &DataValidation) -> Result<()> {
    let target = range.object("Validation", &[])?;
    target.call("Delete", &[])?;
    let args = match &validation.rule {
        ValidationRule::List(items) => vec![
            Variant::from(XL_VALIDATE_LIST),
            Variant::from(XL_VALID_ALERT_STOP),
            Variant::from(XL_BETWEEN),
            Variant::from(items.join(",")),
        ],
        ValidationRule::Whole { min, max } | ValidationRule::Decimal { min, max } => {
            let kind = if matches!(validation.rule, ValidationRule::Whole { .. }) {
                XL_VALIDATE_WHOLE
            } else {
                XL_VALIDATE_DECIMAL
            };
            vec![
                Variant::from(kind),
                Variant::from(XL_VALID_ALERT_STOP),
                Variant::from(XL_BETWEEN),
                Variant::from(min.as_str()),
                Variant::from(max.as_str()),
            ]
        }
    };
    target.call("Add", &args)?;
    set(target.as_ref(), "IgnoreBlank", validation.allow_blank)
}

fn modify_point(bar: &dyn Dispatch, point: &str, bound: Option<&str>) -> Result<()> {
    if let Some(value) = bound {
        bar.object(point, &[])?.call(
            "Modify",
            &[Variant::from(XL_CONDITION_VALUE_NUMBER), Variant::from(value)],
        )?;
    }
    Ok(())
}

fn scale_criterion(
    criteria: &dyn Dispatch,
    index: i32,
    bound: Option<&str>,
    fallback: i32,
    color: &str,
) -> Result<()> {
    let criterion = criteria.object("Item", &[Variant::from(index)])?;
    match bound {
        Some(value) => {
            set(criterion.as_ref(), "Type", XL_CONDITION_VALUE_NUMBER)?;
            set(criterion.as_ref(), "Value", value)?;
        }
        None => set(criterion.as_ref(), "Type", fallback)?,
    }
    let format_color = criterion.object("FormatColor", &[])?;
    set(format_color.as_ref(), "Color", bgr(color)?)
}

pub(super) fn add_conditional_format(
    range: &dyn Dispatch,
    format: &ConditionalFormat,
) -> Result<()> {
    let conditions = range.object("FormatConditions", &[])?;
    let condition: Rc<dyn Dispatch> = match &format.rule {
        ConditionalRule::Cell {
            operator,
            value,
            value2,
        } => {
            let mut args = vec![
                Variant::from(XL_CELL_VALUE),
                Variant::from(operator_code(*operator)),
                Variant::from(value.as_str()),
            ];
            if let Some(high) = value2.as_deref().filter(|_| operator.takes_two_values()) {
                args.push(Variant::from(high));
            }
            conditions.call_object("Add", &args)?
        }
        ConditionalRule::Top { rank, percent } => {
            let top = conditions.call_object("AddTop10", &[])?;
            set(top.as_ref(), "TopBottom", XL_TOP10_TOP)?;
            set(top.as_ref(), "Rank", *rank)?;
            set(top.as_ref(), "Percent", *percent)?;
            top
        }
        ConditionalRule::Duplicate => {
            let unique = conditions.call_object("AddUniqueValues", &[])?;
            set(unique.as_ref(), "DupeUnique", XL_DUPLICATE)?;
            unique
        }
        ConditionalRule::ColorScale { min, max } => {
            let scale = conditions.call_object("AddColorScale", &[Variant::from(2)])?;
            let criteria = scale.object("ColorScaleCriteria", &[])?;
            scale_criterion(
                criteria.as_ref(),
                1,
                min.as_deref(),
                XL_CONDITION_VALUE_LOWEST,
                DEFAULT_SCALE_MIN_COLOR,
            )?;
            scale_criterion(
                criteria.as_ref(),
                2,
                max.as_deref(),
                XL_CONDITION_VALUE_HIGHEST,
                DEFAULT_SCALE_MAX_COLOR,
            )?;
            scale
        }
        ConditionalRule::DataBar { min, max } => {
            let bar = conditions.call_object("AddDatabar", &[])?;
            modify_point(bar.as_ref(), "MinPoint", min.as_deref())?;
            modify_point(bar.as_ref(), "MaxPoint", max.as_deref())?;
            let bar_color = bar.object("BarColor", &[])?;
            set(bar_color.as_ref(), "Color", bgr(DEFAULT_DATA_BAR_COLOR)?)?;
            bar
        }
    };

    let styled = matches!(
        format.rule,
        ConditionalRule::Cell { .. } | ConditionalRule::Top { .. } | ConditionalRule::Duplicate
    );
    if styled {
        if let Some(font) = &format.font_color {
            let target = condition.object("Font", &[])?;
            set(target.as_ref(), "Color", bgr(font)?)?;
        }
        if let Some(fill) = &format.fill_color {
            let target = condition.object("Interior", &[])?;
            set(target.as_ref(), "Color", bgr(fill)?)?;
        }
    }
    Ok(())
}

/// Replaces any comment already on the cell. The author is whoever the
/// host application is registered to.
pub(super) fn add_comment(range: &dyn Dispatch, text: &str) -> Result<()> {
    range.call("ClearComments", &[])?;
    range.call("AddComment", &[Variant::from(text)])?;
    Ok(())
}

pub(super) fn comments(sheet: &dyn Dispatch) -> Result<Vec<Comment>> {
    items(sheet.object("Comments", &[])?.as_ref())?
        .iter()
        .map(|comment| {
            let parent = comment.object("Parent", &[])?;
            let area = CellRange::parse(&address_of(parent.as_ref())?)?;
            Ok(Comment {
                cell: area.start_cell(),
                author: comment.text("Author")?,
                text: comment.call("Text", &[])?.to_text(),
            })
        })
        .collect()
}

pub(super) fn add_hyperlink(
    sheet: &dyn Dispatch,
    anchor: Rc<dyn Dispatch>,
    url: &str,
    display: Option<&str>,
) -> Result<()> {
    let hyperlinks = sheet.object("Hyperlinks", &[])?;
    let args = match HyperlinkTarget::classify(url) {
        HyperlinkTarget::Location => vec![
            Variant::Object(Rc::clone(&anchor)),
            Variant::from(""),
            Variant::from(url),
        ],
        HyperlinkTarget::External => {
            vec![Variant::Object(Rc::clone(&anchor)), Variant::from(url)]
        }
    };
    hyperlinks.call("Add", &args)?;
    if let Some(text) = display {
        set(anchor.as_ref(), "Value", text)?;
    }
    Ok(())
}

/// Render `range` as a PNG through a scratch chart, returned base64-encoded.
pub(super) fn capture_picture(sheet: &dyn Dispatch, range: &dyn Dispatch) -> Result<String> {
    let width = range.get("Width", &[])?.as_f64()?;
    let height = range.get("Height", &[])?.as_f64()?;
    range.call("CopyPicture", &[Variant::from(XL_SCREEN), Variant::from(XL_BITMAP)])?;

    let chart_objects = sheet.call_object("ChartObjects", &[])?;
    let holder = chart_objects.call_object(
        "Add",
        &[
            Variant::Float(0.0),
            Variant::Float(0.0),
            Variant::Float(width),
            Variant::Float(height),
        ],
    )?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("capture.png");
    let exported = holder.object("Chart", &[]).and_then(|chart| {
        holder.call("Activate", &[])?;
        chart.call("Paste", &[])?;
        chart.call(
            "Export",
            &[
                Variant::from(path.display().to_string()),
                Variant::from("PNG"),
            ],
        )
    });
    // The scratch chart is removed whether or not the export worked.
    let removed = holder.call("Delete", &[]);
    exported?;
    removed?;

    let bytes = std::fs::read(&path)?;
    debug!(bytes = bytes.len(), "captured range picture");
    Ok(STANDARD.encode(bytes))
}
