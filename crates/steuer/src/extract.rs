//! Extract the result table from a calculator page.
//!
//! Figures live in `<td>` cells whose `class` attribute equals one of two
//! marker strings. The net-pay row uses the second marker and wraps its
//! amount in `<b>`. Cells are read in document order and mapped onto
//! [`Field::ALL`] by position, so the page must contain exactly
//! [`FIELD_COUNT`] marked cells.

use std::fmt;
use std::str::FromStr;

use scraper::{ElementRef, Html};

use crate::types::{Cadence, Field, TaxError, TaxOutcome, TaxResult, FIELD_COUNT};

const REGULAR_MARKER: &str = "right_column";
const FINAL_MARKER: &str = "right_column orange big";
const MONTHLY_SUFFIX: &str = " grey_bg";

/// Class attribute values identifying extractable cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub regular: String,
    pub last: String,
}

impl Markers {
    pub fn for_cadence(cadence: Cadence) -> Self {
        match cadence {
            Cadence::Yearly => Self {
                regular: REGULAR_MARKER.to_string(),
                last: FINAL_MARKER.to_string(),
            },
            Cadence::Monthly => Self {
                regular: format!("{REGULAR_MARKER}{MONTHLY_SUFFIX}"),
                last: format!("{FINAL_MARKER}{MONTHLY_SUFFIX}"),
            },
        }
    }
}

/// How matched cells are assigned to fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// By document position.
    #[default]
    Positional,
    /// By the label in the first cell of the same table row.
    Labeled,
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMode::Positional => f.write_str("positional"),
            ExtractionMode::Labeled => f.write_str("labeled"),
        }
    }
}

impl FromStr for ExtractionMode {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positional" => Ok(ExtractionMode::Positional),
            "labeled" | "labelled" => Ok(ExtractionMode::Labeled),
            other => Err(TaxError::InvalidOption(format!(
                "unknown extraction mode '{other}' (expected positional or labeled)"
            ))),
        }
    }
}

/// A marked cell together with the raw text holding its amount.
struct MarkedCell<'a> {
    element: ElementRef<'a>,
    text: String,
}

/// Parse a localized amount such as `"1.234,56 €"`.
pub fn parse_amount(raw: &str) -> TaxOutcome<f64> {
    let normalized = raw
        .trim()
        .replace('\u{a0}', "")
        .replace(' ', "")
        .replace('€', "")
        .replace('.', "")
        .replace(',', ".");

    let value = normalized
        .parse::<f64>()
        .map_err(|source| TaxError::Amount {
            text: raw.to_string(),
            source,
        })?;

    // f64 parsing accepts "NaN" and "inf", which JSON cannot carry.
    if !value.is_finite() {
        return Err(TaxError::NonFiniteAmount(raw.to_string()));
    }
    Ok(value)
}

/// All amounts in marked cells, in document order.
pub fn extract_values(doc: &Html, cadence: Cadence) -> TaxOutcome<Vec<f64>> {
    marked_cells(doc, &Markers::for_cadence(cadence))
        .iter()
        .map(|cell| parse_amount(&cell.text))
        .collect()
}

/// Extract one [`TaxResult`] from a result page.
pub fn extract_tax_result(
    doc: &Html,
    cadence: Cadence,
    mode: ExtractionMode,
) -> TaxOutcome<TaxResult> {
    match mode {
        ExtractionMode::Positional => {
            let values = extract_values(doc, cadence)?;
            let found = values.len();
            let values: [f64; FIELD_COUNT] =
                values.try_into().map_err(|_| TaxError::CountMismatch {
                    expected: FIELD_COUNT,
                    found,
                })?;
            Ok(TaxResult::from_values(values))
        }
        ExtractionMode::Labeled => extract_labeled(doc, cadence),
    }
}

fn extract_labeled(doc: &Html, cadence: Cadence) -> TaxOutcome<TaxResult> {
    let mut slots: [Option<f64>; FIELD_COUNT] = [None; FIELD_COUNT];

    for cell in marked_cells(doc, &Markers::for_cadence(cadence)) {
        let label = row_label(cell.element).unwrap_or_default();
        let field =
            Field::from_key(&normalize_label(&label)).ok_or(TaxError::UnknownLabel(label))?;
        let slot = &mut slots[field.index()];
        if slot.is_some() {
            return Err(TaxError::DuplicateField(field));
        }
        *slot = Some(parse_amount(&cell.text)?);
    }

    let mut values = [0.0; FIELD_COUNT];
    for field in Field::ALL {
        values[field.index()] = slots[field.index()].ok_or(TaxError::MissingField(field))?;
    }
    Ok(TaxResult::from_values(values))
}

/// Depth-first walk collecting cells whose class equals a marker.
fn marked_cells<'a>(doc: &'a Html, markers: &Markers) -> Vec<MarkedCell<'a>> {
    let mut cells = Vec::new();

    for node in doc.tree.root().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        if element.value().name() != "td" {
            continue;
        }
        let Some(class) = element.value().attr("class") else {
            continue;
        };

        let text = if class == markers.regular {
            first_text(element)
        } else if class == markers.last {
            // The net amount sits one level down in <b>; the last one wins.
            element
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|c| c.value().name() == "b")
                .filter_map(first_text)
                .last()
        } else {
            continue;
        };

        tracing::debug!("matched cell class={class:?} text={text:?}");
        cells.push(MarkedCell {
            element,
            text: text.unwrap_or_default(),
        });
    }

    cells
}

/// Text of an element's first child, if that child is a text node.
fn first_text(element: ElementRef<'_>) -> Option<String> {
    element
        .first_child()
        .and_then(|child| child.value().as_text().map(|t| String::from(&**t)))
}

/// Text of the first cell in the row containing `cell`, unless that is `cell` itself.
fn row_label(cell: ElementRef<'_>) -> Option<String> {
    let row = cell.parent().and_then(ElementRef::wrap)?;
    if row.value().name() != "tr" {
        return None;
    }
    let first = row
        .children()
        .filter_map(ElementRef::wrap)
        .find(|c| matches!(c.value().name(), "td" | "th"))?;
    if first.id() == cell.id() {
        return None;
    }
    Some(first.text().collect::<String>().trim().to_string())
}

fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}
