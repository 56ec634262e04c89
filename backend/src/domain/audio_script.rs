//! Segmented audio-guide scripts and playback-mode filtering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Reading rate used for duration estimates.
pub const WORDS_PER_MINUTE: u32 = 150;

/// Narrative role of a segment, in fixed taxonomy order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SegmentType {
    Hook,
    Essential,
    Context,
    Anecdotes,
    Details,
    Transition,
}

impl SegmentType {
    /// Every type, in taxonomy order.
    pub const ALL: [Self; 6] = [
        Self::Hook,
        Self::Essential,
        Self::Context,
        Self::Anecdotes,
        Self::Details,
        Self::Transition,
    ];

    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hook => "hook",
            Self::Essential => "essential",
            Self::Context => "context",
            Self::Anecdotes => "anecdotes",
            Self::Details => "details",
            Self::Transition => "transition",
        }
    }

    /// Default heading used when the model omits a title.
    pub const fn default_title(self) -> &'static str {
        match self {
            Self::Hook => "Accroche",
            Self::Essential => "L'essentiel",
            Self::Context => "Contexte",
            Self::Anecdotes => "Anecdotes",
            Self::Details => "Détails",
            Self::Transition => "Transition",
        }
    }
}

impl FromStr for SegmentType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown segment type: {value}"))
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named subset of segment types read aloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    Express,
    Standard,
    Complete,
}

impl PlaybackMode {
    /// Segment types included by this mode.
    pub const fn segment_types(self) -> &'static [SegmentType] {
        match self {
            Self::Express => &[
                SegmentType::Hook,
                SegmentType::Essential,
                SegmentType::Transition,
            ],
            Self::Standard => &[
                SegmentType::Hook,
                SegmentType::Essential,
                SegmentType::Context,
                SegmentType::Anecdotes,
                SegmentType::Transition,
            ],
            Self::Complete => &SegmentType::ALL,
        }
    }

    /// Whether `segment_type` is read in this mode.
    pub fn includes(self, segment_type: SegmentType) -> bool {
        self.segment_types().contains(&segment_type)
    }
}

impl FromStr for PlaybackMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "express" => Ok(Self::Express),
            "standard" => Ok(Self::Standard),
            "complete" => Ok(Self::Complete),
            other => Err(format!("unknown playback mode: {other}")),
        }
    }
}

/// One chunk of narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[schema(example = "seg-0")]
    pub id: String,
    #[serde(rename = "type")]
    pub segment_type: SegmentType,
    pub title: String,
    pub content: String,
    pub duration_seconds: u32,
}

impl Segment {
    /// Build a segment at `position`, estimating its spoken duration.
    pub fn new(
        position: usize,
        segment_type: SegmentType,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        Self {
            id: format!("seg-{position}"),
            segment_type,
            title: title.into(),
            duration_seconds: estimate_duration_seconds(&content),
            content,
        }
    }
}

/// Estimated narration time: `round(words / 150 * 60)` seconds.
///
/// # Examples
/// ```
/// use backend::domain::estimate_duration_seconds;
///
/// let text = vec!["mot"; 150].join(" ");
/// assert_eq!(estimate_duration_seconds(&text), 60);
/// assert_eq!(estimate_duration_seconds(""), 0);
/// ```
pub fn estimate_duration_seconds(text: &str) -> u32 {
    let words = u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX);
    let scaled = u64::from(words) * 60;
    let per_minute = u64::from(WORDS_PER_MINUTE);
    let rounded = (scaled + per_minute / 2) / per_minute;
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Ordered narration segments for one POI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AudioScript {
    pub segments: Vec<Segment>,
}

impl AudioScript {
    /// Wrap segments as produced.
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Sum of segment durations in seconds.
    pub fn total_duration_seconds(&self) -> u32 {
        self.segments
            .iter()
            .fold(0_u32, |total, segment| {
                total.saturating_add(segment.duration_seconds)
            })
    }

    /// Segment bodies joined with blank lines, in stored order.
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.content.trim())
            .filter(|content| !content.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Segments read in `mode`, ordered by taxonomy position.
    ///
    /// Segments sharing a type keep their relative order.
    pub fn for_mode(&self, mode: PlaybackMode) -> Vec<&Segment> {
        let mut selected: Vec<&Segment> = self
            .segments
            .iter()
            .filter(|segment| mode.includes(segment.segment_type))
            .collect();
        selected.sort_by_key(|segment| segment.segment_type);
        selected
    }
}
