//! DTOs for the Wikipedia REST `mobile-sections` and `summary` endpoints.

use serde::Deserialize;

use super::html_text::html_to_text;

#[derive(Debug, Deserialize)]
pub(super) struct MobileSectionsDto {
    pub(super) lead: Option<LeadDto>,
    pub(super) remaining: Option<RemainingDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LeadDto {
    #[serde(default)]
    pub(super) normalizedtitle: Option<String>,
    #[serde(default)]
    pub(super) sections: Vec<SectionDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RemainingDto {
    #[serde(default)]
    pub(super) sections: Vec<SectionDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SectionDto {
    #[serde(default)]
    pub(super) line: Option<String>,
    #[serde(default)]
    pub(super) text: String,
}

/// Plain-text article assembled from sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SectionText {
    pub(super) title: Option<String>,
    pub(super) extract: String,
    pub(super) content: String,
}

impl MobileSectionsDto {
    /// Plain text of every section, or `None` when the article has no body.
    pub(super) fn into_text(self) -> Option<SectionText> {
        let (title, lead_sections) = match self.lead {
            Some(lead) => (lead.normalizedtitle, lead.sections),
            None => (None, Vec::new()),
        };
        let remaining = self.remaining.map(|rest| rest.sections).unwrap_or_default();

        let mut blocks = Vec::new();
        for section in lead_sections.into_iter().chain(remaining) {
            let body = html_to_text(&section.text);
            let heading = section
                .line
                .map(|line| html_to_text(&line))
                .filter(|line| !line.is_empty());
            match (heading, body.is_empty()) {
                (_, true) => {}
                (Some(heading), false) => blocks.push(format!("{heading}\n\n{body}")),
                (None, false) => blocks.push(body),
            }
        }
        if blocks.is_empty() {
            return None;
        }

        let content = blocks.join("\n\n");
        let extract = content
            .split("\n\n")
            .next()
            .unwrap_or_default()
            .to_owned();
        Some(SectionText {
            title,
            extract,
            content,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SummaryDto {
    #[serde(default)]
    pub(super) title: Option<String>,
    #[serde(default)]
    pub(super) extract: String,
    #[serde(default)]
    pub(super) content_urls: Option<ContentUrlsDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ContentUrlsDto {
    pub(super) desktop: Option<PageUrlDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PageUrlDto {
    pub(super) page: String,
}

impl SummaryDto {
    pub(super) fn page_url(&self) -> Option<&str> {
        self.content_urls
            .as_ref()?
            .desktop
            .as_ref()
            .map(|desktop| desktop.page.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_are_joined_with_headings() {
        let body = r#"{
            "lead": {"normalizedtitle": "Tour Eiffel", "sections": [
                {"id": 0, "text": "<p>La <b>tour Eiffel</b> est une tour de fer.</p><p>Elle mesure 330 m.</p>"}
            ]},
            "remaining": {"sections": [
                {"id": 1, "line": "Histoire", "text": "<p>Construite en 1889.</p>"},
                {"id": 2, "line": "Notes", "text": ""}
            ]}
        }"#;
        let decoded: MobileSectionsDto = serde_json::from_str(body).expect("decodes");

        let text = decoded.into_text().expect("has body");

        assert_eq!(text.title.as_deref(), Some("Tour Eiffel"));
        assert_eq!(text.extract, "La tour Eiffel est une tour de fer.");
        assert_eq!(
            text.content,
            "La tour Eiffel est une tour de fer.\n\nElle mesure 330 m.\n\nHistoire\n\nConstruite en 1889."
        );
    }

    #[test]
    fn empty_sections_yield_none() {
        let decoded: MobileSectionsDto =
            serde_json::from_str(r#"{"lead": {"sections": []}}"#).expect("decodes");
        assert!(decoded.into_text().is_none());
    }
}
