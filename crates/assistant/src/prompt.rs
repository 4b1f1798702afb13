//! Prompt sent to the model and decoding of its answer.

use api_types::{Amount, EntryKind, ai::ParsedEntry, validate};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    AssistantError,
    normalize::{canonical_amount, guess_kind},
};

pub(crate) fn system_prompt(month: &str) -> String {
    format!(
        "Você converte texto livre em lançamentos financeiros.\n\
         Responda apenas com um array JSON, sem comentários. Cada item tem:\n\
         - \"tipo\": \"income\" para receitas ou \"expense\" para despesas\n\
         - \"nome\": descrição curta\n\
         - \"valor\": número decimal positivo com ponto, ex. 1234.56\n\
         - \"mes\": mês no formato YYYY-MM (use {month} quando não houver outro)\n\
         - \"data_prevista\": data YYYY-MM-DD ou null\n\
         Colunas separadas por \" | \" são campos da mesma linha."
    )
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Answer {
    List(Vec<RawEntry>),
    Wrapped {
        #[serde(alias = "entries")]
        lancamentos: Vec<RawEntry>,
    },
}

#[derive(Deserialize)]
struct RawEntry {
    #[serde(default, alias = "type")]
    tipo: Option<String>,
    #[serde(default, alias = "name")]
    nome: Option<String>,
    #[serde(default, alias = "amount")]
    valor: Option<Value>,
    #[serde(default)]
    mes: Option<String>,
    #[serde(default)]
    data_prevista: Option<String>,
}

/// Decodes the model answer. Items that cannot become a valid entry are
/// dropped and described in the returned warnings.
pub(crate) fn decode_entries(
    answer: &str,
    month: &str,
) -> Result<(Vec<ParsedEntry>, Vec<String>), AssistantError> {
    let json = strip_code_fence(answer);
    let answer: Answer =
        serde_json::from_str(json).map_err(|err| AssistantError::Decode(err.to_string()))?;
    let raw = match answer {
        Answer::List(list) => list,
        Answer::Wrapped { lancamentos } => lancamentos,
    };

    let mut entries = Vec::with_capacity(raw.len());
    let mut warnings = Vec::new();
    for (index, item) in raw.into_iter().enumerate() {
        match into_entry(item, month) {
            Ok(entry) => entries.push(entry),
            Err(reason) => warnings.push(format!("item {}: {reason}", index + 1)),
        }
    }
    Ok((entries, warnings))
}

fn into_entry(item: RawEntry, month: &str) -> Result<ParsedEntry, &'static str> {
    let name = item
        .nome
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or("missing name")?;
    let name: String = name.chars().take(validate::MAX_ENTRY_NAME).collect();

    let amount = match item.valor {
        Some(Value::Number(number)) => canonical_amount(&number.to_string()),
        Some(Value::String(text)) => canonical_amount(&text),
        _ => None,
    }
    .ok_or("invalid amount")?;

    let kind = match item.tipo.as_deref().map(str::to_lowercase).as_deref() {
        Some("income" | "receita" | "entrada") => EntryKind::Income,
        Some("expense" | "despesa" | "saida" | "saída") => EntryKind::Expense,
        _ => guess_kind(&name),
    };

    let month = item
        .mes
        .filter(|value| validate::is_month(value))
        .unwrap_or_else(|| month.to_string());
    let expected_date = item.data_prevista.filter(|value| validate::is_date(value));

    Ok(ParsedEntry {
        kind,
        name,
        amount: Amount::new(amount),
        month,
        expected_date,
    })
}

fn strip_code_fence(answer: &str) -> &str {
    let trimmed = answer.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_array_is_decoded() {
        let answer = "```json\n[{\"tipo\":\"income\",\"nome\":\"Salário\",\"valor\":5000,\"mes\":\"2025-03\",\"data_prevista\":\"2025-03-05\"}]\n```";

        let (entries, warnings) = decode_entries(answer, "2025-03").unwrap();

        assert!(warnings.is_empty());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, EntryKind::Income);
        assert_eq!(entries[0].amount.as_str(), "5000.00");
        assert_eq!(entries[0].expected_date.as_deref(), Some("2025-03-05"));
    }

    #[test]
    fn wrapped_object_and_bad_items() {
        let answer = r#"{"lancamentos": [
            {"tipo": "despesa", "nome": "Luz", "valor": "120,50", "mes": "março"},
            {"tipo": "expense", "nome": "", "valor": 10},
            {"tipo": "expense", "nome": "Nada", "valor": 0}
        ]}"#;

        let (entries, warnings) = decode_entries(answer, "2025-03").unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].month, "2025-03");
        assert_eq!(entries[0].amount.as_str(), "120.50");
        assert_eq!(warnings, vec!["item 2: missing name", "item 3: invalid amount"]);
    }

    #[test]
    fn prose_is_a_decode_error() {
        let result = decode_entries("Claro! Aqui estão os lançamentos.", "2025-03");
        assert!(matches!(result, Err(AssistantError::Decode(_))));
    }
}
