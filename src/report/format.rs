//! Text formatting helpers shared by the reports.

use std::fmt;

/// Marker appended to rows for assemblies with first-in-list bias.
pub const BIAS_MARKER: &str = " *";
/// Footnote explaining [`BIAS_MARKER`].
pub const BIAS_FOOTNOTE: &str =
    "* = May have first-in-list bias (appears early in assembly listings)";

/// `Xm Ys` when at least a minute, else `Ys`; `N/A` when absent.
pub fn format_time(seconds: Option<u64>) -> String {
    match seconds {
        None => "N/A".to_string(),
        Some(s) if s >= 60 => format!("{}m {}s", s / 60, s % 60),
        Some(s) => format!("{}s", s),
    }
}

/// Cuts `text` to `keep` characters plus `...` when it is longer than `max`.
pub fn truncate(text: &str, max: usize, keep: usize) -> String {
    if text.chars().count() > max {
        let mut cut: String = text.chars().take(keep).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}

/// `malaria-parasite` becomes `Malaria Parasite`.
///
/// A letter is upper-cased when it follows a non-letter and lower-cased
/// otherwise, so `h5n1` becomes `H5N1`.
pub fn title_case(slug: &str) -> String {
    let mut out = String::with_capacity(slug.len());
    let mut prev_is_letter = false;
    for c in slug.chars() {
        let c = if c == '-' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Suffix for a table row: [`BIAS_MARKER`] for flagged assemblies, else two spaces.
pub fn bias_marker(accession: &str, biased: &[String]) -> &'static str {
    if biased.iter().any(|b| b == accession) {
        BIAS_MARKER
    } else {
        "  "
    }
}

/// A line of `c` repeated `width` times.
pub fn rule(f: &mut impl fmt::Write, c: char, width: usize) -> fmt::Result {
    writeln!(f, "{}", c.to_string().repeat(width))
}

/// Title block: rule, title, rule.
pub fn banner(f: &mut impl fmt::Write, title: &str, width: usize) -> fmt::Result {
    rule(f, '=', width)?;
    writeln!(f, "{}", title)?;
    rule(f, '=', width)
}

/// Section heading followed by a dashed rule.
pub fn section(f: &mut impl fmt::Write, title: &str, width: usize) -> fmt::Result {
    writeln!(f, "{}", title)?;
    rule(f, '-', width)
}

/// Column header line closed by a dashed rule.
pub fn table_header(f: &mut impl fmt::Write, header: &str, width: usize) -> fmt::Result {
    writeln!(f, "{}", header)?;
    rule(f, '-', width)
}
