use crate::types::Cell;

/// Cell text treated as a missing value
pub const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Check if a raw text value is a missing-value token
pub fn is_missing(value: &str) -> bool {
    MISSING_TOKENS.contains(&value)
}

/// Build a cell from raw text, mapping missing tokens to `Cell::Empty`
pub fn text_cell(value: &str) -> Cell {
    if is_missing(value) {
        Cell::Empty
    } else {
        Cell::Text(value.to_string())
    }
}

/// Parse a float, rejecting non-finite results
pub fn parse_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Convert a cell to a non-negative count.
///
/// Returns `None` when the value is missing, unparseable, non-finite or
/// negative; callers store those as zero.
pub fn to_count(cell: &Cell) -> Option<u64> {
    match cell {
        Cell::Int(i) => u64::try_from(*i).ok(),
        Cell::Float(f) => float_to_count(*f),
        Cell::Bool(b) => Some(u64::from(*b)),
        Cell::Text(s) => {
            let trimmed = s.trim();
            match trimmed.parse::<u64>() {
                Ok(n) => Some(n),
                Err(_) => parse_numeric(trimmed).and_then(float_to_count),
            }
        }
        Cell::Empty | Cell::Date(_) => None,
    }
}

fn float_to_count(f: f64) -> Option<u64> {
    if !f.is_finite() {
        return None;
    }
    let truncated = f.trunc();
    if truncated < 0.0 {
        return None;
    }
    // `as` saturates at u64::MAX
    Some(truncated as u64)
}

/// Coerce a cell in place; returns false when it fell back to zero
pub fn coerce_in_place(cell: &mut Cell) -> bool {
    match to_count(cell) {
        Some(n) => {
            *cell = Cell::Int(n.min(i64::MAX as u64) as i64);
            true
        }
        None => {
            *cell = Cell::Int(0);
            false
        }
    }
}
