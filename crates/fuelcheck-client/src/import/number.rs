/// Parses a number written with `.` thousands separators and a `,` decimal
/// separator, e.g. `1.234,56`.
///
/// Blank or unparseable text yields `None`, never zero.
pub fn parse_locale_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = trimmed.replace('.', "").replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub fn parse_optional_locale_number(raw: Option<&str>) -> Option<f64> {
    raw.and_then(parse_locale_number)
}
