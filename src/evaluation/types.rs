use serde::{Deserialize, Deserializer, Serialize};

use crate::config::Rubric;
use crate::constants::DEFAULT_LANGUAGE;

/// Page content submitted for scoring.
///
/// Every field is optional on the wire; unknown fields sent by the crawler are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,

    /// Used for logging and echoed in the result; never sent to the model as an instruction.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl EvaluationRequest {
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            url: url.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Declared language, `"en"` when missing or blank.
    pub fn language(&self) -> &str {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Which path produced an [`EvaluationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Score parsed from the model reply.
    Model,
    /// Decided locally without calling the model.
    ShortCircuit,
    /// The model reply could not be turned into a score.
    ParseFallback,
}

impl Verdict {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Model => "model",
            Verdict::ShortCircuit => "short_circuit",
            Verdict::ParseFallback => "parse_fallback",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Outcome of a page evaluation.
pub struct EvaluationResult {
    pub url: String,
    /// Always within `[0.0, 1.0]`.
    pub score: f64,
    /// `score >= min_quality_score`.
    pub is_useful: bool,
    /// Short explanation, never empty.
    pub reason: String,
    pub verdict: Verdict,
}

impl EvaluationResult {
    /// Builds a result, clamping `score` and deriving `is_useful` from `rubric`.
    pub fn new(
        url: impl Into<String>,
        score: f64,
        reason: impl Into<String>,
        verdict: Verdict,
        rubric: &Rubric,
    ) -> Self {
        let score = clamp_score(score);
        Self {
            url: url.into(),
            score,
            is_useful: rubric.is_useful(score),
            reason: reason.into(),
            verdict,
        }
    }
}

/// Clamps into `[0, 1]`; NaN becomes `0.0`.
#[inline]
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
