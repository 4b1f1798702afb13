//! Input validation for request bodies.
//!
//! Every body the server accepts implements [`Validate`]. Checks are flat and
//! independent: a body reports all the violations it finds, and the server
//! joins them into a single `400 Bad Request` message.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::{
    Amount,
    ai::ParseRequest,
    auth::{Login, Register},
    category::{CategoryNew, CategoryQuery, CategoryUpdate},
    config::ConfigUpdate,
    dashboard::DashboardQuery,
    entry::{EntryBatch, EntryCompleted, EntryNew, EntryQuery, EntryUpdate, MonthCopy},
};

pub const MAX_ENTRY_NAME: usize = 120;
pub const MAX_CATEGORY_NAME: usize = 60;
pub const MAX_ICON: usize = 40;
pub const MAX_CONFIG_TEXT: usize = 200;
pub const MAX_USER_NAME: usize = 80;
pub const MIN_PASSWORD: usize = 8;
pub const MAX_BATCH: usize = 100;
pub const MAX_PARSE_TEXT: usize = 10_000;

static MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").expect("static regex"));
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static regex"));
static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,12}([.,]\d{1,2})?$").expect("static regex"));
static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("static regex"));

pub trait Validate {
    /// Returns every violated constraint, or `Ok(())`.
    fn validate(&self) -> Result<(), Vec<String>>;
}

/// Accumulates violation messages.
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn check(&mut self, ok: bool, message: impl Into<String>) {
        if !ok {
            self.0.push(message.into());
        }
    }

    pub fn extend_prefixed(&mut self, prefix: &str, other: Vec<String>) {
        self.0
            .extend(other.into_iter().map(|msg| format!("{prefix}: {msg}")));
    }

    pub fn finish(self) -> Result<(), Vec<String>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}

/// `YYYY-MM` with a month between 01 and 12.
pub fn is_month(value: &str) -> bool {
    MONTH_RE.is_match(value)
}

/// `YYYY-MM-DD` naming a real calendar day.
pub fn is_date(value: &str) -> bool {
    DATE_RE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Decimal with at most two fractional digits and strictly greater than zero.
pub fn is_positive_amount(amount: &Amount) -> bool {
    let value = amount.as_str();
    AMOUNT_RE.is_match(value) && value.chars().any(|c| c.is_ascii_digit() && c != '0')
}

pub fn is_color(value: &str) -> bool {
    COLOR_RE.is_match(value)
}

pub fn is_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn length_between(value: &str, min: usize, max: usize) -> bool {
    let len = value.trim().chars().count();
    (min..=max).contains(&len)
}

impl Validate for EntryNew {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.check(
            length_between(&self.name, 1, MAX_ENTRY_NAME),
            format!("nome must have between 1 and {MAX_ENTRY_NAME} characters"),
        );
        v.check(
            is_positive_amount(&self.amount),
            "valor must be a positive decimal with at most 2 decimals",
        );
        v.check(is_month(&self.month), "mes must match YYYY-MM");
        if let Some(date) = &self.expected_date {
            v.check(is_date(date), "data_prevista must be a valid YYYY-MM-DD date");
        }
        v.finish()
    }
}

impl Validate for EntryUpdate {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        let touched = self.kind.is_some()
            || self.name.is_some()
            || self.amount.is_some()
            || self.month.is_some()
            || self.completed.is_some()
            || self.expected_date.is_some()
            || self.category_id.is_some();
        v.check(touched, "provide at least one field to update");
        if let Some(name) = &self.name {
            v.check(
                length_between(name, 1, MAX_ENTRY_NAME),
                format!("nome must have between 1 and {MAX_ENTRY_NAME} characters"),
            );
        }
        if let Some(amount) = &self.amount {
            v.check(
                is_positive_amount(amount),
                "valor must be a positive decimal with at most 2 decimals",
            );
        }
        if let Some(month) = &self.month {
            v.check(is_month(month), "mes must match YYYY-MM");
        }
        if let Some(Some(date)) = &self.expected_date {
            v.check(is_date(date), "data_prevista must be a valid YYYY-MM-DD date");
        }
        v.finish()
    }
}

impl Validate for EntryBatch {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.check(
            (1..=MAX_BATCH).contains(&self.entries.len()),
            format!("lancamentos must contain between 1 and {MAX_BATCH} items"),
        );
        for (idx, entry) in self.entries.iter().enumerate() {
            if let Err(errors) = entry.validate() {
                v.extend_prefixed(&format!("lancamentos[{idx}]"), errors);
            }
        }
        v.finish()
    }
}

impl Validate for EntryCompleted {
    fn validate(&self) -> Result<(), Vec<String>> {
        Ok(())
    }
}

impl Validate for MonthCopy {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.check(is_month(&self.from), "de must match YYYY-MM");
        v.check(is_month(&self.to), "para must match YYYY-MM");
        v.check(self.from != self.to, "de and para must be different months");
        v.finish()
    }
}

impl Validate for EntryQuery {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        if let Some(month) = &self.month {
            v.check(is_month(month), "mes must match YYYY-MM");
        }
        v.finish()
    }
}

fn check_category_extras(
    v: &mut Violations,
    icon: Option<&str>,
    color: Option<&str>,
    order: Option<i32>,
) {
    if let Some(icon) = icon {
        v.check(
            icon.chars().count() <= MAX_ICON,
            format!("icone must have at most {MAX_ICON} characters"),
        );
    }
    if let Some(color) = color {
        v.check(is_color(color), "cor must match #RRGGBB");
    }
    if let Some(order) = order {
        v.check(order >= 0, "ordem must be >= 0");
    }
}

impl Validate for CategoryNew {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.check(
            length_between(&self.name, 1, MAX_CATEGORY_NAME),
            format!("nome must have between 1 and {MAX_CATEGORY_NAME} characters"),
        );
        check_category_extras(
            &mut v,
            self.icon.as_deref(),
            self.color.as_deref(),
            self.order,
        );
        v.finish()
    }
}

impl Validate for CategoryUpdate {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        let touched = self.name.is_some()
            || self.icon.is_some()
            || self.color.is_some()
            || self.order.is_some();
        v.check(touched, "provide at least one field to update");
        if let Some(name) = &self.name {
            v.check(
                length_between(name, 1, MAX_CATEGORY_NAME),
                format!("nome must have between 1 and {MAX_CATEGORY_NAME} characters"),
            );
        }
        check_category_extras(
            &mut v,
            self.icon.as_ref().and_then(Option::as_deref),
            self.color.as_ref().and_then(Option::as_deref),
            self.order,
        );
        v.finish()
    }
}

impl Validate for ConfigUpdate {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        match &self.value {
            serde_json::Value::Bool(_) | serde_json::Value::Number(_) => {}
            serde_json::Value::String(text) => v.check(
                text.chars().count() <= MAX_CONFIG_TEXT,
                format!("valor must have at most {MAX_CONFIG_TEXT} characters"),
            ),
            _ => v.check(false, "valor must be a boolean, a string or a number"),
        }
        v.finish()
    }
}

impl Validate for CategoryQuery {
    fn validate(&self) -> Result<(), Vec<String>> {
        Ok(())
    }
}

impl Validate for DashboardQuery {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        if let Some(month) = &self.month {
            v.check(is_month(month), "mes must match YYYY-MM");
        }
        v.finish()
    }
}

impl Validate for Register {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.check(
            length_between(&self.name, 1, MAX_USER_NAME),
            format!("nome must have between 1 and {MAX_USER_NAME} characters"),
        );
        v.check(is_email(&self.email), "email is not valid");
        v.check(
            self.password.chars().count() >= MIN_PASSWORD,
            format!("senha must have at least {MIN_PASSWORD} characters"),
        );
        v.finish()
    }
}

impl Validate for Login {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.check(!self.email.trim().is_empty(), "email is required");
        v.check(!self.password.is_empty(), "senha is required");
        v.finish()
    }
}

impl Validate for ParseRequest {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.check(
            !self.text.trim().is_empty() && self.text.chars().count() <= MAX_PARSE_TEXT,
            format!("texto must have between 1 and {MAX_PARSE_TEXT} characters"),
        );
        v.check(is_month(&self.month), "mes must match YYYY-MM");
        v.finish()
    }
}
