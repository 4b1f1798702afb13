use std::collections::HashMap;

use sea_orm::{QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{Entry, EntryKind, Money, Month, ResultEngine, entries};

use super::{Engine, TREND_MONTHS};

const UNCATEGORIZED: &str = "Sem categoria";

/// Totals of one month. Amounts are always >= 0; `balance` carries the sign.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonthTotals {
    pub income: Money,
    pub expense: Money,
    pub income_completed: Money,
    pub income_pending: Money,
    pub expense_completed: Money,
    pub expense_pending: Money,
    pub entries: usize,
}

impl MonthTotals {
    pub fn balance(&self) -> Money {
        self.income - self.expense
    }

    fn add(&mut self, entry: &Entry) {
        self.entries += 1;
        match (entry.kind, entry.completed) {
            (EntryKind::Income, true) => self.income_completed += entry.amount,
            (EntryKind::Income, false) => self.income_pending += entry.amount,
            (EntryKind::Expense, true) => self.expense_completed += entry.amount,
            (EntryKind::Expense, false) => self.expense_pending += entry.amount,
        }
        match entry.kind {
            EntryKind::Income => self.income += entry.amount,
            EntryKind::Expense => self.expense += entry.amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub kind: EntryKind,
    pub total: Money,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrendPoint {
    pub month: Month,
    pub income: Money,
    pub expense: Money,
}

impl TrendPoint {
    pub fn balance(&self) -> Money {
        self.income - self.expense
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dashboard {
    pub month: Month,
    pub totals: MonthTotals,
    /// Per category, income first, then by descending total.
    pub categories: Vec<CategoryTotal>,
    /// [`TREND_MONTHS`] months ending at `month`, oldest first.
    pub trend: Vec<TrendPoint>,
}

impl Engine {
    pub async fn dashboard(&self, user_id: Uuid, month: Month) -> ResultEngine<Dashboard> {
        let months = month.trailing(TREND_MONTHS);
        let first = months.first().copied().unwrap_or(month);

        // `YYYY-MM` sorts lexicographically in calendar order.
        let window: Vec<Entry> = entries::Entity::find()
            .filter(entries::Column::UserId.eq(user_id.to_string()))
            .filter(entries::Column::Month.between(first.to_string(), month.to_string()))
            .all(&self.database)
            .await?
            .into_iter()
            .map(Entry::try_from)
            .collect::<ResultEngine<_>>()?;

        let names: HashMap<Uuid, String> = self
            .list_categories(user_id, None)
            .await?
            .into_iter()
            .map(|category| (category.id, category.name))
            .collect();

        Ok(summarize(month, &months, &window, &names))
    }
}

fn summarize(
    month: Month,
    months: &[Month],
    window: &[Entry],
    names: &HashMap<Uuid, String>,
) -> Dashboard {
    let mut totals = MonthTotals::default();
    let mut by_category: HashMap<(Option<Uuid>, EntryKind), Money> = HashMap::new();
    for entry in window.iter().filter(|entry| entry.month == month) {
        totals.add(entry);
        *by_category
            .entry((entry.category_id, entry.kind))
            .or_default() += entry.amount;
    }

    let mut categories: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|((category_id, kind), total)| CategoryTotal {
            category_id,
            name: category_id
                .and_then(|id| names.get(&id).cloned())
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            kind,
            total,
        })
        .collect();
    categories.sort_by(|a, b| {
        let rank = |kind: EntryKind| matches!(kind, EntryKind::Expense);
        rank(a.kind)
            .cmp(&rank(b.kind))
            .then(b.total.cmp(&a.total))
            .then_with(|| a.name.cmp(&b.name))
    });

    let trend = months
        .iter()
        .map(|&point| {
            let (income, expense) = window
                .iter()
                .filter(|entry| entry.month == point)
                .fold((Money::ZERO, Money::ZERO), |(income, expense), entry| {
                    match entry.kind {
                        EntryKind::Income => (income + entry.amount, expense),
                        EntryKind::Expense => (income, expense + entry.amount),
                    }
                });
            TrendPoint {
                month: point,
                income,
                expense,
            }
        })
        .collect();

    Dashboard {
        month,
        totals,
        categories,
        trend,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn entry(kind: EntryKind, cents: i64, month: &str, completed: bool) -> Entry {
        let now = Utc::now();
        Entry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            kind,
            name: "x".to_string(),
            amount: Money::new(cents),
            month: month.parse().unwrap(),
            completed,
            expected_date: None,
            category_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn totals_split_completed_and_pending() {
        let month: Month = "2025-03".parse().unwrap();
        let window = vec![
            entry(EntryKind::Income, 500_000, "2025-03", true),
            entry(EntryKind::Expense, 150_000, "2025-03", true),
            entry(EntryKind::Expense, 20_000, "2025-03", false),
            entry(EntryKind::Expense, 99_999, "2025-02", true),
        ];

        let dashboard = summarize(month, &month.trailing(TREND_MONTHS), &window, &HashMap::new());

        let totals = dashboard.totals;
        assert_eq!(totals.entries, 3);
        assert_eq!(totals.income, Money::new(500_000));
        assert_eq!(totals.expense, Money::new(170_000));
        assert_eq!(totals.expense_pending, Money::new(20_000));
        assert_eq!(totals.balance(), Money::new(330_000));
    }

    #[test]
    fn trend_covers_every_month_even_empty_ones() {
        let month: Month = "2025-03".parse().unwrap();
        let window = vec![entry(EntryKind::Expense, 1_000, "2025-01", false)];

        let dashboard = summarize(month, &month.trailing(TREND_MONTHS), &window, &HashMap::new());

        assert_eq!(dashboard.trend.len(), TREND_MONTHS);
        assert_eq!(dashboard.trend[0].month.to_string(), "2024-10");
        let january = &dashboard.trend[3];
        assert_eq!(january.month.to_string(), "2025-01");
        assert_eq!(january.balance(), Money::new(-1_000));
        assert_eq!(dashboard.trend[5].balance(), Money::ZERO);
    }

    #[test]
    fn uncategorized_entries_are_grouped() {
        let month: Month = "2025-03".parse().unwrap();
        let window = vec![
            entry(EntryKind::Expense, 1_000, "2025-03", false),
            entry(EntryKind::Expense, 2_000, "2025-03", false),
            entry(EntryKind::Income, 5_000, "2025-03", false),
        ];

        let dashboard = summarize(month, &month.trailing(TREND_MONTHS), &window, &HashMap::new());

        assert_eq!(dashboard.categories.len(), 2);
        assert_eq!(dashboard.categories[0].kind, EntryKind::Income);
        assert_eq!(dashboard.categories[1].name, UNCATEGORIZED);
        assert_eq!(dashboard.categories[1].total, Money::new(3_000));
    }
}
