//! Audio-guide script generation through the local language model.
//!
//! The model is asked for a JSON document listing narration segments. Its
//! answer is parsed by trying [`PARSE_STRATEGIES`] in order; the last strategy
//! always succeeds, so a reachable model always yields a script.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use super::ports::{CompletionRequest, LanguageModel, LanguageModelError};
use super::{AudioScript, Category, Segment, SegmentType};

/// Source text beyond this many characters is not sent to the model.
pub const MAX_SOURCE_CHARS: usize = 4000;

const SYSTEM_PROMPT: &str = "\
Tu es un guide conférencier qui écrit des scripts d'audioguide en français.
Réponds uniquement avec un objet JSON de la forme
{\"segments\": [{\"type\": \"...\", \"title\": \"...\", \"content\": \"...\"}]}.
Les types autorisés, dans cet ordre :
- hook : une accroche de une ou deux phrases qui capte l'attention ;
- essential : l'essentiel à retenir sur le lieu ;
- context : le contexte historique ou artistique ;
- anecdotes : des anecdotes surprenantes et vérifiables ;
- details : des détails pour les visiteurs curieux ;
- transition : une phrase qui invite à poursuivre la visite.
Écris pour l'oreille : phrases courtes, pas de listes, pas de références.";

static JSON_OBJECT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").ok());

/// Inputs for one script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptRequest {
    pub poi_name: String,
    pub source_text: String,
    pub category: Category,
    /// Replacement user prompt; `{name}`, `{category}` and `{content}` are
    /// substituted.
    pub custom_prompt: Option<String>,
}

/// Failures surfaced to callers of [`ScriptGenerator::generate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptGenerationError {
    #[error("script generation service unavailable: {message}")]
    ServiceUnavailable { message: String },
    #[error("no source text to narrate")]
    EmptySource,
}

impl From<LanguageModelError> for ScriptGenerationError {
    fn from(error: LanguageModelError) -> Self {
        Self::ServiceUnavailable {
            message: error.to_string(),
        }
    }
}

/// Ways of reading a model answer, tried in [`PARSE_STRATEGIES`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// The whole answer is a JSON document.
    StrictJson,
    /// The first `{` to the last `}` is a JSON document.
    ExtractedObject,
    /// The answer is prose; keep it as one essential segment.
    RawText,
}

/// Parsing order.
pub const PARSE_STRATEGIES: [ParseStrategy; 3] = [
    ParseStrategy::StrictJson,
    ParseStrategy::ExtractedObject,
    ParseStrategy::RawText,
];

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScriptDto {
    Wrapped { segments: Vec<SegmentDto> },
    Bare(Vec<SegmentDto>),
}

#[derive(Debug, Deserialize)]
struct SegmentDto {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "text")]
    content: Option<String>,
}

impl ScriptDto {
    fn into_segments(self) -> Vec<Segment> {
        let dtos = match self {
            Self::Wrapped { segments } | Self::Bare(segments) => segments,
        };
        dtos.into_iter()
            .filter_map(|dto| {
                let kind = dto.kind?.parse::<SegmentType>().ok()?;
                let content = dto.content?.trim().to_owned();
                if content.is_empty() {
                    return None;
                }
                let title = dto
                    .title
                    .map(|title| title.trim().to_owned())
                    .filter(|title| !title.is_empty())
                    .unwrap_or_else(|| kind.default_title().to_owned());
                Some((kind, title, content))
            })
            .enumerate()
            .map(|(position, (kind, title, content))| Segment::new(position, kind, title, content))
            .collect()
    }
}

impl ParseStrategy {
    /// Attempt to read `answer`; `None` hands over to the next strategy.
    pub fn parse(self, answer: &str) -> Option<Vec<Segment>> {
        let segments = match self {
            Self::StrictJson => parse_json(answer.trim())?,
            Self::ExtractedObject => {
                let pattern = JSON_OBJECT.as_ref()?;
                parse_json(pattern.find(answer)?.as_str())?
            }
            Self::RawText => {
                let text = strip_code_fences(answer);
                if text.is_empty() {
                    return None;
                }
                vec![Segment::new(
                    0,
                    SegmentType::Essential,
                    SegmentType::Essential.default_title(),
                    text,
                )]
            }
        };
        (!segments.is_empty()).then_some(segments)
    }
}

fn parse_json(candidate: &str) -> Option<Vec<Segment>> {
    serde_json::from_str::<ScriptDto>(candidate)
        .ok()
        .map(ScriptDto::into_segments)
}

fn strip_code_fences(answer: &str) -> String {
    answer
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned()
}

/// Parse a model answer with the first strategy that yields segments.
///
/// # Examples
/// ```
/// use backend::domain::{SegmentType, parse_script};
///
/// let script = parse_script("Voici la tour.").expect("prose is kept");
/// assert_eq!(script.segments[0].segment_type, SegmentType::Essential);
/// assert_eq!(script.segments[0].id, "seg-0");
/// ```
pub fn parse_script(answer: &str) -> Option<AudioScript> {
    PARSE_STRATEGIES.iter().find_map(|strategy| {
        let segments = strategy.parse(answer)?;
        debug!(?strategy, segments = segments.len(), "model answer parsed");
        Some(AudioScript::new(segments))
    })
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(index, _)| &text[..index])
}

/// Service turning POI source text into a segmented script.
#[derive(Clone)]
pub struct ScriptGenerator {
    model: Arc<dyn LanguageModel>,
}

impl ScriptGenerator {
    /// Build a generator over `model`.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Whether the model service currently answers.
    pub async fn is_available(&self) -> bool {
        self.model.is_available().await
    }

    /// Generate a script for `request`.
    pub async fn generate(
        &self,
        request: &ScriptRequest,
    ) -> Result<AudioScript, ScriptGenerationError> {
        let source = truncate_chars(request.source_text.trim(), MAX_SOURCE_CHARS);
        if source.is_empty() {
            return Err(ScriptGenerationError::EmptySource);
        }

        let completion = CompletionRequest {
            system: SYSTEM_PROMPT.to_owned(),
            prompt: user_prompt(request, source),
            json_output: true,
        };
        let answer = self.model.complete(&completion).await?;

        parse_script(&answer).ok_or_else(|| {
            warn!(poi = %request.poi_name, "model returned an empty answer");
            ScriptGenerationError::ServiceUnavailable {
                message: "language model returned an empty answer".to_owned(),
            }
        })
    }
}

fn user_prompt(request: &ScriptRequest, source: &str) -> String {
    match request.custom_prompt.as_deref().map(str::trim) {
        Some(template) if !template.is_empty() => template
            .replace("{name}", &request.poi_name)
            .replace("{category}", request.category.as_str())
            .replace("{content}", source),
        _ => format!(
            "Lieu : {name}\nCatégorie : {category}\n\nSource :\n{source}\n\n\
             Écris le script d'audioguide de ce lieu.",
            name = request.poi_name,
            category = request.category.as_str(),
        ),
    }
}
