use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub mod validate;

pub use validate::Validate;

/// Monetary amount as it travels on the wire.
///
/// Clients may send either a JSON number (`400`, `19.9`) or a decimal string
/// (`"400.00"`, `"19,90"`). Responses always carry the canonical dot-decimal
/// string with two fractional digits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Amount(String);

impl Amount {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(number) => Amount(number.to_string()),
            Raw::Text(text) => Amount(text.trim().to_string()),
        })
    }
}

/// Distinguishes "field absent" (`None`) from "field explicitly null"
/// (`Some(None)`) in partial updates.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

pub mod health {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
        pub database: bool,
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Register {
        #[serde(rename = "nome")]
        pub name: String,
        pub email: String,
        #[serde(rename = "senha")]
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub email: String,
        #[serde(rename = "senha")]
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        #[serde(rename = "nome")]
        pub name: String,
        pub email: String,
    }

    /// Returned by register and login. The token goes in
    /// `Authorization: Bearer <token>`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionView {
        pub token: String,
        #[serde(rename = "expira_em")]
        pub expires_at: DateTime<Utc>,
        #[serde(rename = "usuario")]
        pub user: UserView,
    }
}

pub mod entry {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryNew {
        #[serde(rename = "tipo")]
        pub kind: EntryKind,
        #[serde(rename = "nome")]
        pub name: String,
        #[serde(rename = "valor")]
        pub amount: Amount,
        /// `YYYY-MM`
        #[serde(rename = "mes")]
        pub month: String,
        #[serde(rename = "concluido", default)]
        pub completed: Option<bool>,
        /// `YYYY-MM-DD`
        #[serde(rename = "data_prevista", default)]
        pub expected_date: Option<String>,
        #[serde(rename = "categoria_id", default)]
        pub category_id: Option<Uuid>,
    }

    /// Partial update. Absent fields are left untouched; `data_prevista` and
    /// `categoria_id` may be sent as `null` to clear them.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryUpdate {
        #[serde(rename = "tipo", default)]
        pub kind: Option<EntryKind>,
        #[serde(rename = "nome", default)]
        pub name: Option<String>,
        #[serde(rename = "valor", default)]
        pub amount: Option<Amount>,
        #[serde(rename = "mes", default)]
        pub month: Option<String>,
        #[serde(rename = "concluido", default)]
        pub completed: Option<bool>,
        #[serde(
            rename = "data_prevista",
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub expected_date: Option<Option<String>>,
        #[serde(
            rename = "categoria_id",
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub category_id: Option<Option<Uuid>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryBatch {
        #[serde(rename = "lancamentos")]
        pub entries: Vec<EntryNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryCompleted {
        #[serde(rename = "concluido")]
        pub completed: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthCopy {
        #[serde(rename = "de")]
        pub from: String,
        #[serde(rename = "para")]
        pub to: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthCopied {
        #[serde(rename = "copiados")]
        pub copied: usize,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryQuery {
        #[serde(rename = "mes", default)]
        pub month: Option<String>,
        #[serde(rename = "tipo", default)]
        pub kind: Option<EntryKind>,
        #[serde(rename = "concluido", default)]
        pub completed: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryView {
        pub id: Uuid,
        #[serde(rename = "tipo")]
        pub kind: EntryKind,
        #[serde(rename = "nome")]
        pub name: String,
        #[serde(rename = "valor")]
        pub amount: Amount,
        #[serde(rename = "mes")]
        pub month: String,
        #[serde(rename = "concluido")]
        pub completed: bool,
        #[serde(rename = "data_prevista")]
        pub expected_date: Option<NaiveDate>,
        #[serde(rename = "categoria_id")]
        pub category_id: Option<Uuid>,
        #[serde(rename = "criado_em")]
        pub created_at: DateTime<Utc>,
        #[serde(rename = "atualizado_em")]
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryListResponse {
        #[serde(rename = "lancamentos")]
        pub entries: Vec<EntryView>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        #[serde(rename = "nome")]
        pub name: String,
        #[serde(rename = "tipo")]
        pub kind: EntryKind,
        #[serde(rename = "icone", default)]
        pub icon: Option<String>,
        /// `#RRGGBB`
        #[serde(rename = "cor", default)]
        pub color: Option<String>,
        #[serde(rename = "ordem", default)]
        pub order: Option<i32>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        #[serde(rename = "nome", default)]
        pub name: Option<String>,
        #[serde(
            rename = "icone",
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub icon: Option<Option<String>>,
        #[serde(
            rename = "cor",
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub color: Option<Option<String>>,
        #[serde(rename = "ordem", default)]
        pub order: Option<i32>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryQuery {
        #[serde(rename = "tipo", default)]
        pub kind: Option<EntryKind>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        #[serde(rename = "nome")]
        pub name: String,
        #[serde(rename = "tipo")]
        pub kind: EntryKind,
        #[serde(rename = "icone")]
        pub icon: Option<String>,
        #[serde(rename = "cor")]
        pub color: Option<String>,
        #[serde(rename = "ordem")]
        pub order: i32,
        #[serde(rename = "padrao")]
        pub is_default: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        #[serde(rename = "categorias")]
        pub categories: Vec<CategoryView>,
    }
}

pub mod config {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConfigUpdate {
        /// Boolean, string or number.
        #[serde(rename = "valor")]
        pub value: serde_json::Value,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConfigView {
        #[serde(rename = "chave")]
        pub key: String,
        #[serde(rename = "valor")]
        pub value: serde_json::Value,
        #[serde(rename = "atualizado_em")]
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConfigListResponse {
        #[serde(rename = "configuracoes")]
        pub configurations: Vec<ConfigView>,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DashboardQuery {
        /// Defaults to the current month when absent.
        #[serde(rename = "mes", default)]
        pub month: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthSummary {
        #[serde(rename = "receitas")]
        pub income: Amount,
        #[serde(rename = "despesas")]
        pub expense: Amount,
        #[serde(rename = "saldo")]
        pub balance: Amount,
        #[serde(rename = "receitas_recebidas")]
        pub income_completed: Amount,
        #[serde(rename = "receitas_pendentes")]
        pub income_pending: Amount,
        #[serde(rename = "despesas_pagas")]
        pub expense_completed: Amount,
        #[serde(rename = "despesas_pendentes")]
        pub expense_pending: Amount,
        #[serde(rename = "lancamentos")]
        pub entries: usize,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTotal {
        /// `None` groups the entries without a category.
        #[serde(rename = "categoria_id")]
        pub category_id: Option<Uuid>,
        #[serde(rename = "nome")]
        pub name: String,
        #[serde(rename = "tipo")]
        pub kind: EntryKind,
        #[serde(rename = "total")]
        pub total: Amount,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthTrend {
        #[serde(rename = "mes")]
        pub month: String,
        #[serde(rename = "receitas")]
        pub income: Amount,
        #[serde(rename = "despesas")]
        pub expense: Amount,
        #[serde(rename = "saldo")]
        pub balance: Amount,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Dashboard {
        #[serde(rename = "mes")]
        pub month: String,
        #[serde(rename = "resumo")]
        pub summary: MonthSummary,
        #[serde(rename = "categorias")]
        pub categories: Vec<CategoryTotal>,
        #[serde(rename = "tendencia")]
        pub trend: Vec<MonthTrend>,
    }
}

pub mod ai {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParseRequest {
        #[serde(rename = "texto")]
        pub text: String,
        /// Reference month (`YYYY-MM`) for the parsed entries.
        #[serde(rename = "mes")]
        pub month: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ParsedEntry {
        #[serde(rename = "tipo")]
        pub kind: EntryKind,
        #[serde(rename = "nome")]
        pub name: String,
        #[serde(rename = "valor")]
        pub amount: Amount,
        #[serde(rename = "mes")]
        pub month: String,
        #[serde(rename = "data_prevista", default)]
        pub expected_date: Option<String>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ParseSource {
        #[serde(rename = "ia")]
        Ai,
        Fallback,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParseResponse {
        #[serde(rename = "lancamentos")]
        pub entries: Vec<ParsedEntry>,
        #[serde(rename = "origem")]
        pub source: ParseSource,
        #[serde(rename = "avisos")]
        pub warnings: Vec<String>,
    }
}

#[cfg(test)]
mod tests {
    use super::entry::{EntryNew, EntryUpdate};
    use super::*;

    #[test]
    fn amount_accepts_number_or_string() {
        let from_number: Amount = serde_json::from_str("400").unwrap();
        assert_eq!(from_number.as_str(), "400");
        let from_float: Amount = serde_json::from_str("19.9").unwrap();
        assert_eq!(from_float.as_str(), "19.9");
        let from_text: Amount = serde_json::from_str("\" 1234,56 \"").unwrap();
        assert_eq!(from_text.as_str(), "1234,56");
    }

    #[test]
    fn entry_new_uses_portuguese_field_names() {
        let body = r#"{"tipo":"expense","nome":"Aluguel","valor":"1500.00","mes":"2025-03"}"#;
        let entry: EntryNew = serde_json::from_str(body).unwrap();
        assert_eq!(entry.kind, EntryKind::Expense);
        assert_eq!(entry.name, "Aluguel");
        assert_eq!(entry.month, "2025-03");
        assert!(entry.expected_date.is_none());
    }

    #[test]
    fn entry_update_tells_null_from_absent() {
        let cleared: EntryUpdate = serde_json::from_str(r#"{"data_prevista":null}"#).unwrap();
        assert_eq!(cleared.expected_date, Some(None));
        assert!(cleared.category_id.is_none());

        let untouched: EntryUpdate = serde_json::from_str(r#"{"nome":"x"}"#).unwrap();
        assert!(untouched.expected_date.is_none());
    }
}
