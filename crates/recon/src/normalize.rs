//! Locale-aware money parsing.
//!
//! Amount cells arrive either as plain decimals (`"1234.56"`) or in
//! pt-BR format (`"1.234,56"`), sometimes wrapped with an `R$` prefix
//! or a debit/credit marker letter. Everything goes through integer
//! cents math; no f64 on the parse path.

use crate::model::Money;

/// Parse a raw amount cell into `Money`.
///
/// Blank cells parse to zero (the loader decides what to do with
/// non-positive amounts). Returns `None` when the cell is not a number
/// in either plain or pt-BR form; callers count those drops rather
/// than aborting the batch.
pub fn parse_money(raw: &str) -> Option<Money> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(Money::ZERO);
    }
    let s = strip_markers(s);
    if s.is_empty() {
        return None;
    }
    parse_plain(s).or_else(|| parse_plain(&to_plain(s)))
}

/// Remove an optional `R$` prefix and a single leading or trailing
/// debit/credit marker letter (`D`/`C`, case-insensitive).
fn strip_markers(s: &str) -> &str {
    let mut t = s.trim();
    if let Some(rest) = t.strip_prefix("R$").or_else(|| t.strip_prefix("r$")) {
        t = rest.trim_start();
    }
    if let Some(first) = t.chars().next() {
        if matches!(first, 'D' | 'd' | 'C' | 'c') {
            let rest = t[first.len_utf8()..].trim_start();
            // Only a marker when a number follows ("C 100,00"), so that
            // ordinary words are left for the parser to reject.
            if rest.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
                t = rest;
            }
        }
    }
    if t.len() > 1 {
        if let Some(last) = t.chars().last() {
            if matches!(last, 'D' | 'd' | 'C' | 'c') {
                t = t[..t.len() - last.len_utf8()].trim_end();
            }
        }
    }
    t
}

/// Plain decimal parse, period separator, at most two fraction digits.
/// One fraction digit scales by ten ("1234.5" == 1234.50).
fn parse_plain(s: &str) -> Option<Money> {
    let negative = s.starts_with('-');
    let s = s.strip_prefix('-').unwrap_or(s);
    if s.is_empty() {
        return None;
    }
    let (units, cents) = match s.find('.') {
        Some(dot) => {
            let whole = &s[..dot];
            let frac = &s[dot + 1..];
            let units: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
            let cents: i64 = match frac.len() {
                0 => 0,
                1 => frac.parse::<i64>().ok()? * 10,
                2 => frac.parse().ok()?,
                _ => return None,
            };
            (units, cents)
        }
        None => (s.parse().ok()?, 0),
    };
    let minor = units.checked_mul(100)?.checked_add(cents)?;
    Some(Money::from_cents(if negative { -minor } else { minor }))
}

/// Rewrite pt-BR formatting into plain form: drop `.` thousands
/// separators, turn the `,` decimal separator into `.`.
fn to_plain(s: &str) -> String {
    s.replace('.', "").replace(',', ".")
}
