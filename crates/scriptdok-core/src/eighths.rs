//! Page-length eighths
//!
//! Screenplay scene lengths are measured in eighths of a page and written
//! as `"1 3/8"`, `"5/8"` or `"2"`. Internally a length is a single
//! non-negative count of eighths.

/// Eighths in one page
pub const EIGHTHS_PER_PAGE: u32 = 8;

/// Parse a page-length string into eighths.
///
/// Accepts `"N M/8"`, `"M/8"` and bare `"N"`. Fractions with another
/// denominator are rounded to the nearest eighth; malformed tokens
/// (zero denominator, non-numeric parts, numerators too large to scale)
/// contribute nothing.
pub fn parse_eighths(input: &str) -> u32 {
    input
        .split_whitespace()
        .map(|token| match token.split_once('/') {
            Some((num, den)) => fraction_to_eighths(num, den),
            None => token
                .parse::<u32>()
                .map(|pages| pages.saturating_mul(EIGHTHS_PER_PAGE))
                .unwrap_or(0),
        })
        .fold(0u32, u32::saturating_add)
}

fn fraction_to_eighths(num: &str, den: &str) -> u32 {
    let (Ok(num), Ok(den)) = (num.parse::<u64>(), den.parse::<u64>()) else {
        return 0;
    };
    if den == 0 {
        return 0;
    }
    let Some(scaled) = num
        .checked_mul(u64::from(EIGHTHS_PER_PAGE))
        .and_then(|n| n.checked_add(den / 2))
    else {
        return 0;
    };
    u32::try_from(scaled / den).unwrap_or(u32::MAX)
}

/// Format eighths the way scripts print them: `"1 3/8"`, `"5/8"`, `"2"`, `"0"`
pub fn format_eighths(eighths: u32) -> String {
    let pages = eighths / EIGHTHS_PER_PAGE;
    let rest = eighths % EIGHTHS_PER_PAGE;
    match (pages, rest) {
        (0, 0) => "0".to_string(),
        (0, rest) => format!("{}/8", rest),
        (pages, 0) => pages.to_string(),
        (pages, rest) => format!("{} {}/8", pages, rest),
    }
}

/// Eighths as a fractional page count
pub fn pages_from_eighths(eighths: u32) -> f64 {
    f64::from(eighths) / f64::from(EIGHTHS_PER_PAGE)
}
