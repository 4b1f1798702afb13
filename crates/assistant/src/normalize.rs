//! Rewrites of Brazilian-formatted text into the canonical forms the rest of
//! the system expects: `1234.56` for money and `YYYY-MM-DD` for dates.

use std::sync::LazyLock;

use api_types::EntryKind;
use chrono::{Datelike, NaiveDate, Utc};
use regex::{Captures, Regex};

static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:R\$\s*)?\b(\d{1,3}(?:\.\d{3})+|\d+)(?:,(\d{1,2}))?\b").expect("static regex")
});
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b").expect("static regex")
});
static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").expect("static regex"));
static CANONICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:\.(\d{1,2}))?$").expect("static regex"));
static TABS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ ]*\t+[ ]*").expect("static regex"));

const SEPARATORS: [char; 4] = ['-', ':', '=', '|'];

static INCOME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:salário|salario|receita|recebi|renda|pix recebido|reembolso|freela)\b")
        .expect("static regex")
});
// Tax payments name the authority, not an income.
static TAX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\breceita federal\b").expect("static regex"));

/// Rewrites every currency amount to dot-decimal without thousands
/// separators. `R$ 1.234,56` becomes `1234.56`, `R$400` becomes `400`.
///
/// Text already in canonical form is returned unchanged.
pub fn normalize_currency(text: &str) -> String {
    CURRENCY_RE
        .replace_all(text, |caps: &Captures| {
            let integer = caps[1].replace('.', "");
            match caps.get(2) {
                Some(fraction) => format!("{integer}.{}", fraction.as_str()),
                None => integer,
            }
        })
        .into_owned()
}

/// Rewrites `dd/mm/yyyy`, `dd/mm/yy` and `dd/mm` to `yyyy-mm-dd`. Two-digit
/// years are read as 20yy and dates without a year take the year of `month`
/// (`YYYY-MM`). Impossible dates, and slash runs that do not parse as one
/// date, are left as they are.
pub fn normalize_dates(text: &str, month: &str) -> String {
    let default_year = month
        .get(..4)
        .and_then(|year| year.parse::<i32>().ok())
        .unwrap_or_else(|| Utc::now().year());

    DATE_RE
        .replace_all(text, |caps: &Captures| {
            let whole = &caps[0];
            let end = caps.get(0).map_or(0, |m| m.end());
            if text[end..].starts_with('/') {
                return whole.to_string();
            }
            let day = caps[1].parse::<u32>().ok();
            let month = caps[2].parse::<u32>().ok();
            let year = match caps.get(3) {
                Some(year) if year.len() == 2 => {
                    year.as_str().parse::<i32>().ok().map(|yy| 2000 + yy)
                }
                Some(year) => year.as_str().parse::<i32>().ok(),
                None => Some(default_year),
            };
            match (year, month, day) {
                (Some(year), Some(month), Some(day)) => NaiveDate::from_ymd_opt(year, month, day)
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| caps[0].to_string()),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Full rewrite applied before text goes to the model: dates, then currency,
/// then tab runs collapsed to a ` | ` column separator.
pub fn normalize_text(text: &str, month: &str) -> String {
    let text = normalize_dates(text, month);
    let text = normalize_currency(&text);
    TABS_RE.replace_all(&text, " | ").into_owned()
}

/// Canonical two-decimal amount, or `None` when `value` is not a positive
/// decimal with at most two fractional digits.
pub fn canonical_amount(value: &str) -> Option<String> {
    let normalized = normalize_currency(value.trim());
    let caps = CANONICAL_RE.captures(&normalized)?;
    let integer = caps[1].trim_start_matches('0');
    let fraction = caps.get(2).map_or("", |m| m.as_str());
    if integer.is_empty() && fraction.chars().all(|c| c == '0') {
        return None;
    }
    let integer = if integer.is_empty() { "0" } else { integer };
    Some(format!("{integer}.{fraction:0<2}"))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedLine {
    pub name: String,
    pub amount: String,
    pub expected_date: Option<String>,
}

/// Pulls a name and an amount out of one free-form line.
///
/// The amount is the last numeric token; the name is what remains once
/// currency symbols, separators, dates and trailing numbers are removed.
pub fn extract_line(line: &str) -> Option<ExtractedLine> {
    let normalized = TABS_RE.replace_all(&normalize_currency(line), " ").into_owned();

    let expected_date = ISO_DATE_RE
        .find(&normalized)
        .map(|found| found.as_str().to_string());
    let without_dates = ISO_DATE_RE.replace_all(&normalized, " ");

    let mut tokens: Vec<&str> = without_dates
        .split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .map(|token| token.trim_start_matches('+'))
        .filter(|token| !token.is_empty() && !token.starts_with("R$") && *token != "$")
        .collect();

    let position = tokens
        .iter()
        .rposition(|token| canonical_amount(token).is_some() && is_number(token))?;
    let amount = canonical_amount(tokens.remove(position))?;

    while tokens.last().is_some_and(|token| is_number(token)) {
        tokens.pop();
    }
    let name = tokens.join(" ");
    if !name.chars().any(char::is_alphabetic) {
        return None;
    }

    Some(ExtractedLine {
        name,
        amount,
        expected_date,
    })
}

/// Weak income/expense guess from keywords and a leading sign.
///
/// A line carrying only a person's name ("Rafael 400") has no signal and
/// reads as an expense.
pub fn guess_kind(line: &str) -> EntryKind {
    let line = line.trim().to_lowercase();
    if line.starts_with('+') {
        return EntryKind::Income;
    }
    if line.starts_with('-') {
        return EntryKind::Expense;
    }
    if INCOME_RE.is_match(&line) && !TAX_RE.is_match(&line) {
        EntryKind::Income
    } else {
        EntryKind::Expense
    }
}

fn is_number(token: &str) -> bool {
    CANONICAL_RE.is_match(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_is_rewritten() {
        assert_eq!(normalize_currency("R$ 1.234,56"), "1234.56");
        assert_eq!(normalize_currency("400,00"), "400.00");
        assert_eq!(normalize_currency("R$ 1.500"), "1500");
        assert_eq!(normalize_currency("R$400"), "400");
        assert_eq!(
            normalize_currency("Luz R$ 120,50 e água R$ 80"),
            "Luz 120.50 e água 80"
        );
    }

    #[test]
    fn currency_rewrite_is_idempotent() {
        assert_eq!(normalize_currency("1234.56"), "1234.56");
        for input in ["R$ 1.234,56", "Mercado 3.000.000,00", "R$ 19,9", "2025-03-10"] {
            let once = normalize_currency(input);
            assert_eq!(normalize_currency(&once), once);
        }
    }

    #[test]
    fn dates_are_rewritten() {
        assert_eq!(
            normalize_dates("vence 05/03/2024", "2025-01"),
            "vence 2024-03-05"
        );
        assert_eq!(normalize_dates("dia 10/4", "2025-04"), "dia 2025-04-10");
        assert_eq!(normalize_dates("31/02", "2025-02"), "31/02");
    }

    #[test]
    fn two_digit_years_are_expanded() {
        assert_eq!(
            normalize_dates("vence 05/03/24", "2025-03"),
            "vence 2024-03-05"
        );
        assert_eq!(normalize_dates("05/03/245", "2025-03"), "05/03/245");

        let line = extract_line(&normalize_dates("Luz 05/03/24 120,00", "2025-03")).unwrap();
        assert_eq!(line.name, "Luz");
        assert_eq!(line.amount, "120.00");
        assert_eq!(line.expected_date.as_deref(), Some("2024-03-05"));
    }

    #[test]
    fn text_is_normalized_dates_first() {
        assert_eq!(
            normalize_text("Rafael\tR$ 400,00\t10/03", "2025-03"),
            "Rafael | 400.00 | 2025-03-10"
        );
    }

    #[test]
    fn amounts_are_canonical() {
        assert_eq!(canonical_amount("400").as_deref(), Some("400.00"));
        assert_eq!(canonical_amount("R$ 1.234,5").as_deref(), Some("1234.50"));
        assert_eq!(canonical_amount("0.07").as_deref(), Some("0.07"));
        assert_eq!(canonical_amount("0,00"), None);
        assert_eq!(canonical_amount("12.3456"), None);
        assert_eq!(canonical_amount("abc"), None);
    }

    #[test]
    fn tab_separated_line_is_extracted() {
        let line = extract_line("Rafael\tR$ 400,00").unwrap();
        assert_eq!(line.name, "Rafael");
        assert_eq!(line.amount, "400.00");
        assert_eq!(line.expected_date, None);
    }

    #[test]
    fn separators_and_dates_are_stripped() {
        let line = extract_line("Aluguel - R$ 1.500 - 2025-03-10").unwrap();
        assert_eq!(line.name, "Aluguel");
        assert_eq!(line.amount, "1500.00");
        assert_eq!(line.expected_date.as_deref(), Some("2025-03-10"));

        let line = extract_line("+ Salário: 5.000,00").unwrap();
        assert_eq!(line.name, "Salário");
        assert_eq!(line.amount, "5000.00");
    }

    #[test]
    fn lines_without_amount_or_name_are_skipped() {
        assert_eq!(extract_line("Despesas do mês"), None);
        assert_eq!(extract_line("R$ 400,00"), None);
        assert_eq!(extract_line(""), None);
    }

    #[test]
    fn kind_is_guessed_from_keywords_and_sign() {
        assert_eq!(guess_kind("Salário março 5000"), EntryKind::Income);
        assert_eq!(guess_kind("pix recebido João 50"), EntryKind::Income);
        assert_eq!(guess_kind("+ 300 venda"), EntryKind::Income);
        assert_eq!(guess_kind("- Freela devolvido"), EntryKind::Expense);
        assert_eq!(guess_kind("Mercado 250"), EntryKind::Expense);
        assert_eq!(guess_kind("Rafael 400"), EntryKind::Expense);
    }

    #[test]
    fn keywords_match_whole_words() {
        assert_eq!(guess_kind("Compra de prendas 50"), EntryKind::Expense);
        assert_eq!(guess_kind("Receita Federal DARF 300"), EntryKind::Expense);
        assert_eq!(guess_kind("Receita extra 300"), EntryKind::Income);
        assert_eq!(guess_kind("Reembolso plano 120"), EntryKind::Income);
    }
}
