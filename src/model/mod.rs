use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::util::fingerprint::fingerprint;

/// A collected posting as handed over by the source collectors.
///
/// Every field except `source` is optional. Readers go through the accessor
/// methods, which treat an absent field as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_source")]
    pub source: String,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Posting {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// `title + " " + text`, the body used for content overlap.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title(), self.text())
    }

    /// The supplied id, or the fingerprint when the collector did not set one.
    pub fn effective_id(&self) -> String {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => fingerprint(self),
        }
    }

    pub(crate) fn ensure_id(&mut self) -> &str {
        if self.id.as_deref().map_or(true, str::is_empty) {
            self.id = Some(fingerprint(self));
        }
        self.id.as_deref().unwrap_or_default()
    }
}

/// Which tier of the classifier declared two postings duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    Url,
    SourceTitle,
    Content,
}

impl MatchReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchReason::Url => "url",
            MatchReason::SourceTitle => "source_title",
            MatchReason::Content => "content",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DuplicateMatch {
    pub reason: MatchReason,
    pub score: f64,
}

/// A posting found to repeat an earlier unique posting of the same batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateRecord {
    #[serde(flatten)]
    pub posting: Posting,
    pub duplicate_of: String,
    pub reason: MatchReason,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DedupeResult {
    pub unique: Vec<Posting>,
    pub duplicates: Vec<DuplicateRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExistingCheck {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_posting: Option<Posting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via_similarity: Option<bool>,
}

impl ExistingCheck {
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn by_id(posting: Posting) -> Self {
        Self {
            exists: true,
            matched_posting: Some(posting),
            via_similarity: None,
        }
    }

    pub fn by_similarity(posting: Posting) -> Self {
        Self {
            exists: true,
            matched_posting: Some(posting),
            via_similarity: Some(true),
        }
    }

    pub fn via_similarity(&self) -> bool {
        self.via_similarity.unwrap_or(false)
    }
}

/// A posting already present in the store, paired with the batch posting that repeats it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredMatch {
    pub posting: Posting,
    pub stored: Posting,
    pub via_similarity: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestPlan {
    pub fresh: Vec<Posting>,
    pub batch_duplicates: Vec<DuplicateRecord>,
    pub already_stored: Vec<StoredMatch>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_source<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}
