//! Sheet decorations written through umya's object model: charts, panes,
//! validation, conditional formats, comments and hyperlinks.

use std::collections::HashMap;
use std::fmt;
use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use umya_spreadsheet::structs::drawing::spreadsheet::MarkerType;
use umya_spreadsheet::{
    Chart, ChartType, Color, ColorScale, Comment as UmyaComment, ConditionalFormatValueObject,
    ConditionalFormatValueObjectValues, ConditionalFormatValues, ConditionalFormatting,
    ConditionalFormattingOperatorValues, ConditionalFormattingRule, DataBar,
    DataValidation as UmyaValidation, DataValidationOperatorValues, DataValidationValues,
    DataValidations, Formula, Hyperlink, Pane, PaneStateValues, PaneValues, PatternValues,
    SheetView, Style, Worksheet as Sheet, writer,
};
use xlbridge_common::style::color::to_argb;
use xlbridge_common::{CellRange, cell_name, column_letters};
use zip::ZipArchive;

use super::{BACKEND, map_xlsx_error};
use crate::address;
use crate::error::{BridgeError, Result};
use crate::traits::{
    CellOperator, ChartKind, ChartSpec, Comment, ConditionalFormat, ConditionalRule,
    DEFAULT_DATA_BAR_COLOR, DEFAULT_SCALE_MAX_COLOR, DEFAULT_SCALE_MIN_COLOR, DataValidation,
    HyperlinkTarget, ValidationRule,
};

/// Default chart extent, in cells from the anchor.
const CHART_COLUMNS: u32 = 8;
const CHART_ROWS: u32 = 15;

fn chart_type(kind: ChartKind) -> ChartType {
    match kind {
        // The bar chart part renders as columns unless its direction is changed.
        ChartKind::Col | ChartKind::Bar => ChartType::BarChart,
        ChartKind::Line => ChartType::LineChart,
        ChartKind::Pie => ChartType::PieChart,
        ChartKind::Area => ChartType::AreaChart,
        ChartKind::Scatter => ChartType::ScatterChart,
    }
}

fn absolute(range: &CellRange) -> Result<String> {
    Ok(format!(
        "${}${}:${}${}",
        column_letters(range.start_col)?,
        range.start_row,
        column_letters(range.end_col)?,
        range.end_row
    ))
}

/// Series reference with a sheet prefix. References that already name a
/// sheet pass through.
pub(super) fn series_reference(sheet: &str, data_range: &str) -> Result<String> {
    let data_range = data_range.trim();
    if data_range.contains('!') {
        return Ok(data_range.to_string());
    }
    let range = address::range(data_range)?;
    Ok(format!("'{}'!{}", sheet.replace('\'', "''"), absolute(&range)?))
}

pub(super) fn add_chart(sheet: &mut Sheet, chart: &ChartSpec) -> Result<()> {
    let (col, row) = address::cell(&chart.position)?;
    let mut from = MarkerType::default();
    from.set_coordinate(cell_name(col, row)?);
    let mut to = MarkerType::default();
    to.set_coordinate(cell_name(
        col.saturating_add(CHART_COLUMNS).min(xlbridge_common::MAX_COLUMNS),
        row.saturating_add(CHART_ROWS).min(xlbridge_common::MAX_ROWS),
    )?);
    let series = series_reference(sheet.get_name(), &chart.data_range)?;

    let mut built = Chart::default();
    built.new_chart(chart_type(chart.kind), from, to, vec![series.as_str()]);
    if let Some(title) = &chart.title {
        built.set_title(title.as_str());
    }
    sheet.add_chart(built);
    Ok(())
}

pub(super) fn freeze_panes(sheet: &mut Sheet, cell: &str) -> Result<()> {
    let (col, row) = address::cell(cell)?;
    let (x_split, y_split) = (col - 1, row - 1);
    let active = match (x_split > 0, y_split > 0) {
        (true, true) => PaneValues::BottomRight,
        (true, false) => PaneValues::TopRight,
        _ => PaneValues::BottomLeft,
    };

    let mut pane = Pane::default();
    pane.set_horizontal_split(f64::from(x_split));
    pane.set_vertical_split(f64::from(y_split));
    pane.get_top_left_cell_mut().set_coordinate(cell_name(col, row)?);
    pane.set_active_pane(active);
    pane.set_state(PaneStateValues::Frozen);

    let views = sheet.get_sheet_views_mut().get_sheet_view_list_mut();
    if views.is_empty() {
        views.push(SheetView::default());
    }
    if let Some(view) = views.first_mut() {
        view.set_pane(pane);
    }
    Ok(())
}

pub(super) fn add_data_validation(
    sheet: &mut Sheet,
    range: &str,
    validation: &DataValidation,
) -> Result<()> {
    let sqref = address::range(range)?.to_string();
    let mut dv = UmyaValidation::default();
    dv.get_sequence_of_references_mut().set_sqref(sqref);
    dv.set_allow_blank(validation.allow_blank);
    match &validation.rule {
        ValidationRule::List(items) => {
            dv.set_type(DataValidationValues::List);
            dv.set_formula1(ValidationRule::list_formula(items));
        }
        ValidationRule::Whole { min, max } | ValidationRule::Decimal { min, max } => {
            let kind = match validation.rule {
                ValidationRule::Whole { .. } => DataValidationValues::Whole,
                _ => DataValidationValues::Decimal,
            };
            dv.set_type(kind);
            dv.set_operator(DataValidationOperatorValues::Between);
            dv.set_formula1(min.clone());
            dv.set_formula2(max.clone());
        }
    }

    if sheet.get_data_validations_mut().is_none() {
        sheet.set_data_validations(DataValidations::default());
    }
    let dvs = sheet
        .get_data_validations_mut()
        .ok_or_else(|| BridgeError::from_backend(BACKEND, "data validations unavailable"))?;
    dvs.add_data_validation_list(dv);
    Ok(())
}

fn argb(color: &str) -> Result<String> {
    to_argb(color).ok_or_else(|| BridgeError::InvalidFormat(format!("invalid color: {color}")))
}

fn color(value: &str) -> Result<Color> {
    let mut c = Color::default();
    c.set_argb(argb(value)?);
    Ok(c)
}

fn value_object(
    bound: Option<&str>,
    fallback: ConditionalFormatValueObjectValues,
) -> ConditionalFormatValueObject {
    let mut object = ConditionalFormatValueObject::default();
    match bound {
        Some(value) => {
            object.set_type(ConditionalFormatValueObjectValues::Number);
            object.set_val(value);
        }
        None => {
            object.set_type(fallback);
        }
    }
    object
}

fn cell_operator(operator: CellOperator) -> ConditionalFormattingOperatorValues {
    match operator {
        CellOperator::Between => ConditionalFormattingOperatorValues::Between,
        CellOperator::NotBetween => ConditionalFormattingOperatorValues::NotBetween,
        CellOperator::Equal => ConditionalFormattingOperatorValues::Equal,
        CellOperator::NotEqual => ConditionalFormattingOperatorValues::NotEqual,
        CellOperator::GreaterThan => ConditionalFormattingOperatorValues::GreaterThan,
        CellOperator::LessThan => ConditionalFormattingOperatorValues::LessThan,
        CellOperator::GreaterThanOrEqual => {
            ConditionalFormattingOperatorValues::GreaterThanOrEqual
        }
        CellOperator::LessThanOrEqual => ConditionalFormattingOperatorValues::LessThanOrEqual,
    }
}

/// Two-value tests are written as an expression on the anchor cell; the
/// rule record carries a single formula.
pub(super) fn between_expression(
    anchor: &str,
    operator: CellOperator,
    low: &str,
    high: &str,
) -> String {
    match operator {
        CellOperator::NotBetween => format!("OR({anchor}<{low},{anchor}>{high})"),
        _ => format!("AND({anchor}>={low},{anchor}<={high})"),
    }
}

fn formula(text: &str) -> Formula {
    let mut f = Formula::default();
    f.set_string_value(text);
    f
}

fn differential_style(format: &ConditionalFormat) -> Result<Style> {
    let mut style = Style::default();
    if let Some(font) = &format.font_color {
        style.get_font_mut().get_color_mut().set_argb(argb(font)?);
    }
    if let Some(fill) = &format.fill_color {
        let pattern = style.get_fill_mut().get_pattern_fill_mut();
        pattern.set_pattern_type(PatternValues::Solid);
        pattern.get_background_color_mut().set_argb(argb(fill)?);
    }
    Ok(style)
}

pub(super) fn add_conditional_format(
    sheet: &mut Sheet,
    range: &str,
    format: &ConditionalFormat,
) -> Result<()> {
    let area = address::range(range)?;
    let priority = sheet
        .get_conditional_formatting_collection()
        .iter()
        .map(|cf| cf.get_conditional_collection().len())
        .sum::<usize>()
        + 1;

    let mut rule = ConditionalFormattingRule::default();
    rule.set_priority(priority as i32);
    match &format.rule {
        ConditionalRule::Cell {
            operator,
            value,
            value2,
        } => match value2 {
            Some(high) if operator.takes_two_values() => {
                rule.set_type(ConditionalFormatValues::Expression);
                rule.set_formula(formula(&between_expression(
                    &area.start_cell(),
                    *operator,
                    value,
                    high,
                )));
            }
            _ => {
                rule.set_type(ConditionalFormatValues::CellIs);
                rule.set_operator(cell_operator(*operator));
                rule.set_formula(formula(value));
            }
        },
        ConditionalRule::Top { rank, percent } => {
            rule.set_type(ConditionalFormatValues::Top10);
            rule.set_rank(*rank);
            rule.set_percent(*percent);
        }
        ConditionalRule::Duplicate => {
            rule.set_type(ConditionalFormatValues::DuplicateValues);
        }
        ConditionalRule::ColorScale { min, max } => {
            let mut scale = ColorScale::default();
            scale.add_cfvo_collection(value_object(
                min.as_deref(),
                ConditionalFormatValueObjectValues::Min,
            ));
            scale.add_cfvo_collection(value_object(
                max.as_deref(),
                ConditionalFormatValueObjectValues::Max,
            ));
            scale.add_color_collection(color(DEFAULT_SCALE_MIN_COLOR)?);
            scale.add_color_collection(color(DEFAULT_SCALE_MAX_COLOR)?);
            rule.set_type(ConditionalFormatValues::ColorScale);
            rule.set_color_scale(scale);
        }
        ConditionalRule::DataBar { min, max } => {
            let mut bar = DataBar::default();
            bar.add_cfvo_collection(value_object(
                min.as_deref(),
                ConditionalFormatValueObjectValues::Min,
            ));
            bar.add_cfvo_collection(value_object(
                max.as_deref(),
                ConditionalFormatValueObjectValues::Max,
            ));
            bar.add_color_collection(color(DEFAULT_DATA_BAR_COLOR)?);
            rule.set_type(ConditionalFormatValues::DataBar);
            rule.set_data_bar(bar);
        }
    }
    if format.has_style() {
        rule.set_style(differential_style(format)?);
    }

    let mut block = ConditionalFormatting::default();
    block.get_sequence_of_references_mut().set_sqref(area.to_string());
    block.add_conditional_collection(rule);

    let mut all = sheet.get_conditional_formatting_collection().to_vec();
    all.push(block);
    sheet.set_conditional_formatting_collection(all);
    Ok(())
}

pub(super) fn add_comment(sheet: &mut Sheet, cell: &str, author: &str, text: &str) -> Result<()> {
    let (col, row) = address::cell(cell)?;
    let mut comment = UmyaComment::default();
    comment.new_comment(cell_name(col, row)?);
    comment.set_author(author);
    comment.set_text_string(text);
    sheet.add_comments(comment);
    Ok(())
}

pub(super) fn comments(sheet: &Sheet) -> Result<Vec<Comment>> {
    if sheet.get_comments().is_empty() {
        return Ok(Vec::new());
    }
    let mut texts = comment_texts(sheet)?;
    Ok(sheet
        .get_comments()
        .iter()
        .filter_map(|c| {
            let coordinate = c.get_coordinate();
            let cell = cell_name(*coordinate.get_col_num(), *coordinate.get_row_num()).ok()?;
            let text = texts.remove(&cell).unwrap_or_default();
            Some(Comment {
                cell,
                author: c.get_author().to_string(),
                text,
            })
        })
        .collect())
}

/// Comment bodies keyed by cell. umya keeps the text private, so it is read
/// back from the comments part of a one-sheet copy written to memory.
fn comment_texts(sheet: &Sheet) -> Result<HashMap<String, String>> {
    let mut scratch = umya_spreadsheet::new_file_empty_worksheet();
    scratch
        .add_sheet(sheet.clone())
        .map_err(|e| BridgeError::from_backend(BACKEND, e))?;
    let mut bytes = Vec::new();
    writer::xlsx::write_writer(&scratch, &mut bytes).map_err(map_xlsx_error)?;

    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| BridgeError::from_backend(BACKEND, e))?;
    let mut xml = String::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| BridgeError::from_backend(BACKEND, e))?;
        if entry.name().starts_with("xl/comments") && entry.name().ends_with(".xml") {
            entry.read_to_string(&mut xml)?;
            break;
        }
    }
    parse_comment_texts(&xml)
}

fn malformed(err: impl fmt::Display) -> BridgeError {
    BridgeError::from_backend(BACKEND, err)
}

/// Concatenates every `<t>` run inside each `<comment ref="..">`.
fn parse_comment_texts(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut texts = HashMap::new();
    let mut current: Option<(String, String)> = None;
    let mut in_run = false;
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) if e.name().as_ref() == b"comment" => {
                let cell = match e.try_get_attribute("ref").map_err(malformed)? {
                    Some(attr) => attr.unescape_value().map_err(malformed)?.replace('$', ""),
                    None => String::new(),
                };
                current = Some((cell, String::new()));
            }
            Event::Start(e) if e.name().as_ref() == b"t" => in_run = true,
            Event::End(e) if e.name().as_ref() == b"t" => in_run = false,
            Event::Text(t) if in_run => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&t.unescape().map_err(malformed)?);
                }
            }
            Event::End(e) if e.name().as_ref() == b"comment" => {
                if let Some((cell, text)) = current.take() {
                    texts.insert(cell, text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(texts)
}

pub(super) fn add_hyperlink(
    sheet: &mut Sheet,
    cell: &str,
    url: &str,
    display: Option<&str>,
) -> Result<()> {
    let (col, row) = address::cell(cell)?;
    let mut link = Hyperlink::default();
    link.set_url(url);
    link.set_location(HyperlinkTarget::classify(url) == HyperlinkTarget::Location);

    let target = sheet.get_cell_mut((col, row));
    target.set_hyperlink(link);
    if let Some(text) = display.filter(|t| !t.is_empty()) {
        target.set_value_string(text);
    }
    Ok(())
}
