//! Turns free-form text into entry drafts.
//!
//! The text is normalized (dates, Brazilian currency, tab-separated columns)
//! and sent to a chat model. When no model is configured, the call fails or
//! the answer cannot be decoded, each line goes through a local extractor
//! instead. Nothing here touches the database.

use std::{fmt, sync::Arc};

use api_types::ai::{ParseResponse, ParseSource, ParsedEntry};

pub use client::{OpenAiClient, OpenAiConfig, TextModel};
pub use error::AssistantError;

mod client;
mod error;
pub mod normalize;
mod prompt;

use normalize::{extract_line, guess_kind, normalize_dates, normalize_text};

#[derive(Clone, Default)]
pub struct Assistant {
    model: Option<Arc<dyn TextModel>>,
}

impl fmt::Debug for Assistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assistant")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl Assistant {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Assistant that always uses the local extractor.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Builds the OpenAI-compatible client, or a disabled assistant without config.
    pub fn from_config(config: Option<OpenAiConfig>) -> Result<Self, AssistantError> {
        match config {
            Some(config) => Ok(Self::new(Arc::new(OpenAiClient::new(config)?))),
            None => Ok(Self::disabled()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.model.is_some()
    }

    /// Parses `text` into entries for `month` (`YYYY-MM`). Never fails: AI
    /// problems degrade to the fallback extractor and show up in `avisos`.
    pub async fn parse(&self, text: &str, month: &str) -> ParseResponse {
        match self.ask_model(text, month).await {
            Ok((entries, warnings)) if !entries.is_empty() => {
                tracing::debug!(count = entries.len(), "entries parsed by the model");
                ParseResponse {
                    entries,
                    source: ParseSource::Ai,
                    warnings,
                }
            }
            Ok((_, mut warnings)) => {
                warnings.push("the model returned no entries".to_string());
                fallback(text, month, warnings)
            }
            Err(AssistantError::Disabled) => fallback(text, month, Vec::new()),
            Err(err) => {
                tracing::warn!(%err, "ai parsing failed, using fallback");
                fallback(text, month, vec![err.to_string()])
            }
        }
    }

    async fn ask_model(
        &self,
        text: &str,
        month: &str,
    ) -> Result<(Vec<ParsedEntry>, Vec<String>), AssistantError> {
        let model = self.model.as_ref().ok_or(AssistantError::Disabled)?;
        let answer = model
            .complete(&prompt::system_prompt(month), &normalize_text(text, month))
            .await?;
        prompt::decode_entries(&answer, month)
    }
}

/// Line-by-line extraction. Lines without a name and an amount are reported
/// in the warnings.
pub fn fallback(text: &str, month: &str, mut warnings: Vec<String>) -> ParseResponse {
    let mut entries = Vec::new();
    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let normalized = normalize_dates(line, month);
        match extract_line(&normalized) {
            Some(found) => entries.push(ParsedEntry {
                kind: guess_kind(line),
                name: found.name,
                amount: api_types::Amount::new(found.amount),
                month: month.to_string(),
                expected_date: found.expected_date,
            }),
            None => warnings.push(format!("line {} skipped: no name and amount", number + 1)),
        }
    }
    ParseResponse {
        entries,
        source: ParseSource::Fallback,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use api_types::EntryKind;
    use async_trait::async_trait;

    use super::*;

    struct Canned(&'static str);

    #[async_trait]
    impl TextModel for Canned {
        async fn complete(&self, _system: &str, user: &str) -> Result<String, AssistantError> {
            assert!(!user.contains('\t'));
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl TextModel for Failing {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, AssistantError> {
            Err(AssistantError::Upstream {
                status: 429,
                message: "rate limited".to_string(),
            })
        }
    }

    const TEXT: &str = "Salário\tR$ 5.000,00\nRafael\tR$ 400,00\n\nTotal do mês";

    #[tokio::test]
    async fn disabled_assistant_uses_fallback() {
        let response = Assistant::disabled().parse(TEXT, "2025-03").await;

        assert_eq!(response.source, ParseSource::Fallback);
        assert_eq!(response.entries.len(), 2);
        assert_eq!(response.entries[0].kind, EntryKind::Income);
        assert_eq!(response.entries[1].name, "Rafael");
        assert_eq!(response.entries[1].amount.as_str(), "400.00");
        assert_eq!(response.entries[1].kind, EntryKind::Expense);
        assert_eq!(response.warnings, vec!["line 4 skipped: no name and amount"]);
    }

    #[tokio::test]
    async fn model_answer_is_used() {
        let assistant = Assistant::new(Arc::new(Canned(
            r#"[{"tipo":"expense","nome":"Rafael","valor":"400.00","mes":"2025-03"}]"#,
        )));

        let response = assistant.parse(TEXT, "2025-03").await;

        assert_eq!(response.source, ParseSource::Ai);
        assert_eq!(response.entries.len(), 1);
        assert!(response.warnings.is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_falls_back_with_warning() {
        let assistant = Assistant::new(Arc::new(Failing));

        let response = assistant.parse(TEXT, "2025-03").await;

        assert_eq!(response.source, ParseSource::Fallback);
        assert_eq!(response.entries.len(), 2);
        assert_eq!(
            response.warnings[0],
            "ai service answered 429: rate limited"
        );
    }

    #[tokio::test]
    async fn undecodable_answer_falls_back() {
        let assistant = Assistant::new(Arc::new(Canned("not json")));

        let response = assistant.parse("Mercado 250", "2025-03").await;

        assert_eq!(response.source, ParseSource::Fallback);
        assert_eq!(response.entries[0].name, "Mercado");
        assert!(response.warnings[0].starts_with("could not decode ai answer"));
    }
}
