//! Slide decks: slides, templates, saved records and model-output parsing.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::artifacts::{ArtifactKind, Record};
use crate::common::errors::{StudioError, StudioResult};
use crate::common::ids::ArtifactId;

/// Title stored when neither the slides nor the prompt give one.
pub const DEFAULT_DECK_TITLE: &str = "Presentation";

/// Subtitle of the fallback deck's title slide.
pub const FALLBACK_SUBTITLE: &str = "Professional Presentation";

const PROMPT_TITLE_CHARS: usize = 50;

static CODE_FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"```(?:json)?[ \t]*\n?").ok());

/// Visual theme of a deck.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    /// Light theme with thin rules.
    Minimal,
    /// Light text on a dark background.
    Dark,
    /// Colour gradient background.
    Gradient,
    /// Default theme. Unknown template names load as this one.
    #[default]
    #[serde(other)]
    Modern,
}

impl Template {
    /// All templates, in picker order.
    pub const ALL: [Self; 4] = [Self::Modern, Self::Minimal, Self::Dark, Self::Gradient];

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Minimal => "minimal",
            Self::Dark => "dark",
            Self::Gradient => "gradient",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Template {
    type Err = StudioError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| StudioError::InvalidOperation(format!("unknown template: {value}")))
    }
}

/// One slide, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Slide {
    /// Opening slide.
    Title {
        /// Deck heading.
        title: String,
        /// Line under the heading.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subtitle: Option<String>,
    },
    /// Body slide with optional lead text and bullets.
    Content {
        /// Slide heading.
        title: String,
        /// Lead paragraph.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        /// Bullet points in order.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        bullets: Vec<String>,
    },
}

impl Slide {
    /// Title slide.
    #[must_use]
    pub fn title(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self::Title {
            title: title.into(),
            subtitle: Some(subtitle.into()),
        }
    }

    /// Content slide.
    #[must_use]
    pub fn content<I, S>(title: impl Into<String>, content: impl Into<String>, bullets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Content {
            title: title.into(),
            content: Some(content.into()),
            bullets: bullets.into_iter().map(Into::into).collect(),
        }
    }

    /// Slide heading.
    #[must_use]
    pub fn heading(&self) -> &str {
        match self {
            Self::Title { title, .. } | Self::Content { title, .. } => title,
        }
    }

    /// Whether this is an opening slide.
    #[must_use]
    pub const fn is_title(&self) -> bool {
        matches!(self, Self::Title { .. })
    }

    /// Apply one field edit.
    ///
    /// # Errors
    /// Returns `InvalidOperation` when the field does not exist on this kind
    /// of slide or a bullet index is out of range.
    pub fn apply(&mut self, edit: SlideEdit) -> StudioResult<()> {
        match (self, edit) {
            (Self::Title { title, .. } | Self::Content { title, .. }, SlideEdit::Title(value)) => {
                *title = value;
            }
            (Self::Title { subtitle, .. }, SlideEdit::Subtitle(value)) => {
                *subtitle = Some(value);
            }
            (Self::Content { content, .. }, SlideEdit::Content(value)) => {
                *content = Some(value);
            }
            (Self::Content { bullets, .. }, SlideEdit::Bullets(values)) => {
                *bullets = values;
            }
            (Self::Content { bullets, .. }, SlideEdit::Bullet { index, text }) => {
                let len = bullets.len();
                let slot = bullets.get_mut(index).ok_or_else(|| {
                    StudioError::InvalidOperation(format!(
                        "bullet {index} out of range ({len} bullets)"
                    ))
                })?;
                *slot = text;
            }
            (slide, edit) => {
                return Err(StudioError::InvalidOperation(format!(
                    "cannot apply {} to a {} slide",
                    edit.field(),
                    if slide.is_title() { "title" } else { "content" }
                )));
            }
        }
        Ok(())
    }
}

/// Field-level edit of a slide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlideEdit {
    /// Replace the heading. Valid on both kinds.
    Title(String),
    /// Replace the subtitle of a title slide.
    Subtitle(String),
    /// Replace the lead text of a content slide.
    Content(String),
    /// Replace all bullets of a content slide.
    Bullets(Vec<String>),
    /// Replace one existing bullet.
    Bullet {
        /// Zero-based bullet position.
        index: usize,
        /// New bullet text.
        text: String,
    },
}

impl SlideEdit {
    const fn field(&self) -> &'static str {
        match self {
            Self::Title(_) => "title",
            Self::Subtitle(_) => "subtitle",
            Self::Content(_) => "content",
            Self::Bullets(_) | Self::Bullet { .. } => "bullets",
        }
    }
}

/// Title stored with a deck: the working title, then the start of the
/// prompt, then [`DEFAULT_DECK_TITLE`].
#[must_use]
pub fn derive_deck_title(title: &str, prompt: &str) -> String {
    if !title.trim().is_empty() {
        return title.to_string();
    }
    let from_prompt: String = prompt.trim().chars().take(PROMPT_TITLE_CHARS).collect();
    if from_prompt.is_empty() {
        DEFAULT_DECK_TITLE.to_string()
    } else {
        from_prompt
    }
}

/// Heading of the first slide when it is a non-empty title slide. This is
/// the canonical display title of a deck.
#[must_use]
pub fn title_slide_heading(slides: &[Slide]) -> Option<&str> {
    slides
        .first()
        .filter(|slide| slide.is_title())
        .map(Slide::heading)
        .filter(|heading| !heading.is_empty())
}

/// A titled list of slides, as produced by generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    /// Title returned by the model, or derived from the prompt.
    pub title: String,
    /// At least one slide.
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Fixed deck used when generation fails or returns unusable output.
    #[must_use]
    pub fn fallback(prompt: &str) -> Self {
        Self {
            title: prompt.to_string(),
            slides: vec![
                Slide::title(prompt, FALLBACK_SUBTITLE),
                Slide::content(
                    "Introduction",
                    "Key concepts and overview",
                    ["Main point 1", "Main point 2", "Main point 3"],
                ),
                Slide::content(
                    "Key Details",
                    "Important information",
                    ["Detail 1", "Detail 2", "Detail 3", "Detail 4"],
                ),
                Slide::content(
                    "Conclusion",
                    "Summary and next steps",
                    ["Summary point", "Key takeaway", "Call to action"],
                ),
            ],
        }
    }

    /// Parse a model reply into a deck.
    ///
    /// Markdown code fences are stripped. Slides without a recognised
    /// `type` become content slides and array-valued `content` is merged
    /// into the bullets. Returns `None` when the reply is not a JSON object
    /// with at least one slide.
    #[must_use]
    pub fn from_model_output(raw: &str, prompt: &str) -> Option<Self> {
        let cleaned = match CODE_FENCE.as_ref() {
            Some(re) => re.replace_all(raw, "").into_owned(),
            None => raw.to_string(),
        };
        let parsed: RawDeck = match serde_json::from_str(cleaned.trim()) {
            Ok(deck) => deck,
            Err(e) => {
                warn!(error = %e, "model output is not a valid deck");
                return None;
            }
        };

        let slides: Vec<Slide> = parsed.slides.into_iter().map(RawSlide::into_slide).collect();
        if slides.is_empty() {
            warn!("model output has no slides");
            return None;
        }
        let title = parsed
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| prompt.to_string());
        debug!(slides = slides.len(), "parsed generated deck");
        Some(Self { title, slides })
    }

    /// Parsed deck, or the fallback deck.
    #[must_use]
    pub fn from_model_output_or_fallback(raw: &str, prompt: &str) -> Self {
        Self::from_model_output(raw, prompt).unwrap_or_else(|| Self::fallback(prompt))
    }
}

#[derive(Deserialize)]
struct RawDeck {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    slides: Vec<RawSlide>,
}

#[derive(Deserialize)]
struct RawSlide {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default)]
    content: Option<Value>,
    #[serde(default)]
    bullets: Vec<String>,
}

impl RawSlide {
    fn into_slide(self) -> Slide {
        if self.kind.as_deref() == Some("title") {
            return Slide::Title {
                title: self.title,
                subtitle: self.subtitle,
            };
        }
        let mut bullets = self.bullets;
        let content = match self.content {
            Some(Value::String(text)) => Some(text),
            Some(Value::Array(items)) => {
                bullets.extend(items.into_iter().filter_map(|item| match item {
                    Value::String(text) => Some(text),
                    _ => None,
                }));
                None
            }
            _ => None,
        };
        Slide::Content {
            title: self.title,
            content,
            bullets,
        }
    }
}

/// A saved deck.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRecord {
    /// Record id.
    pub id: ArtifactId,
    /// Mirrors the first slide's heading.
    pub title: String,
    /// Slides in order. Never empty.
    pub slides: Vec<Slide>,
    /// Theme.
    #[serde(default)]
    pub template: Template,
    /// Last save time, epoch millis.
    pub timestamp: i64,
    /// Cached `slides.len()`.
    pub slide_count: usize,
}

impl Record for PresentationRecord {
    const KIND: ArtifactKind = ArtifactKind::Presentation;

    fn id(&self) -> ArtifactId {
        self.id
    }

    fn set_id(&mut self, id: ArtifactId) {
        self.id = id;
    }
}
