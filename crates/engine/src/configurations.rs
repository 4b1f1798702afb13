//! Per-user preferences ("configurações").
//!
//! Every user owns the default key set from the moment the account is
//! created. Updates only touch existing keys; there is no way to create a
//! new key through the API.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde_json::{Number, Value};

use crate::{EngineError, ResultEngine};

/// A configuration value: boolean, text or number. Numbers keep their JSON
/// form, so integers stay integers.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Text(String),
    Number(Number),
}

impl ConfigValue {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(value) => Value::Bool(*value),
            Self::Text(value) => Value::String(value.clone()),
            Self::Number(value) => Value::Number(value.clone()),
        }
    }

    fn encode(&self) -> String {
        self.to_json().to_string()
    }

    fn decode(raw: &str) -> ResultEngine<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| EngineError::InvalidConfig(format!("stored value is not JSON: {err}")))?;
        Self::try_from(value)
    }
}

impl TryFrom<Value> for ConfigValue {
    type Error = EngineError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(value) => Ok(Self::Bool(value)),
            Value::String(value) => Ok(Self::Text(value)),
            Value::Number(number) => Ok(Self::Number(number)),
            other => Err(EngineError::InvalidConfig(format!(
                "value must be a boolean, a string or a number, got {other}"
            ))),
        }
    }
}

/// Keys and values every new account starts with.
pub fn default_configurations() -> Vec<(&'static str, ConfigValue)> {
    vec![
        ("tema", ConfigValue::Text("claro".to_string())),
        ("moeda", ConfigValue::Text("BRL".to_string())),
        ("mostrar_concluidos", ConfigValue::Bool(true)),
        ("dia_inicio_mes", ConfigValue::Number(Number::from(1))),
        ("ia_habilitada", ConfigValue::Bool(true)),
    ]
}

#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    pub key: String,
    pub value: ConfigValue,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "configurations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub key: String,
    /// JSON-encoded [`ConfigValue`].
    pub value: String,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Configuration {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            value: ConfigValue::decode(&model.value)?,
            key: model.key,
            updated_at: model.updated_at,
        })
    }
}

pub(crate) fn encode_value(value: &ConfigValue) -> String {
    value.encode()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_scalars_convert() {
        assert_eq!(
            ConfigValue::try_from(serde_json::json!(true)).unwrap(),
            ConfigValue::Bool(true)
        );
        assert_eq!(
            ConfigValue::try_from(serde_json::json!("escuro")).unwrap(),
            ConfigValue::Text("escuro".to_string())
        );
        assert_eq!(
            ConfigValue::try_from(serde_json::json!(5)).unwrap(),
            ConfigValue::Number(Number::from(5))
        );
        assert!(ConfigValue::try_from(serde_json::json!([1])).is_err());
        assert!(ConfigValue::try_from(Value::Null).is_err());
    }

    #[test]
    fn integers_are_not_widened_to_floats() {
        let (_, start_day) = default_configurations()
            .into_iter()
            .find(|(key, _)| *key == "dia_inicio_mes")
            .unwrap();
        assert_eq!(start_day.to_json(), serde_json::json!(1));
        assert_eq!(encode_value(&start_day), "1");

        let stored = ConfigValue::decode("15").unwrap();
        assert_eq!(stored.to_json().to_string(), "15");
        let fractional = ConfigValue::try_from(serde_json::json!(2.5)).unwrap();
        assert_eq!(encode_value(&fractional), "2.5");
    }

    #[test]
    fn stored_form_decodes_back() {
        let value = ConfigValue::Text("BRL".to_string());
        assert_eq!(ConfigValue::decode(&encode_value(&value)).unwrap(), value);
    }

    #[test]
    fn defaults_have_unique_keys() {
        let defaults = default_configurations();
        let mut keys: Vec<_> = defaults.iter().map(|(key, _)| *key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), defaults.len());
    }
}
