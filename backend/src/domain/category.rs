//! POI category derivation from raw OSM tags.
//!
//! Categories come from an ordered rule table: the first rule whose tag
//! matches wins and anything unmatched falls back to [`Category::Autre`].
//! The table order is the only precedence source; tag map iteration order
//! never influences the result.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Closed set of audio-guide categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Monuments,
    Musees,
    Art,
    Insolite,
    Autre,
}

/// Tag value matcher used by [`CATEGORY_RULES`].
#[derive(Debug, Clone, Copy)]
enum TagValue {
    Any,
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
struct CategoryRule {
    key: &'static str,
    value: TagValue,
    category: Category,
}

impl CategoryRule {
    const fn exact(key: &'static str, values: &'static [&'static str], category: Category) -> Self {
        Self {
            key,
            value: TagValue::OneOf(values),
            category,
        }
    }

    const fn any(key: &'static str, category: Category) -> Self {
        Self {
            key,
            value: TagValue::Any,
            category,
        }
    }

    fn matches(&self, tags: &BTreeMap<String, String>) -> bool {
        let Some(value) = tags.get(self.key) else {
            return false;
        };
        match self.value {
            TagValue::Any => !value.trim().is_empty(),
            TagValue::OneOf(expected) => expected.contains(&value.trim()),
        }
    }
}

/// Priority-ordered mapping table, highest priority first.
const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule::exact("tourism", &["museum"], Category::Musees),
    CategoryRule::exact("amenity", &["arts_centre"], Category::Art),
    CategoryRule::exact("tourism", &["artwork", "gallery"], Category::Art),
    CategoryRule::exact(
        "historic",
        &[
            "monument",
            "memorial",
            "castle",
            "ruins",
            "archaeological_site",
        ],
        Category::Monuments,
    ),
    CategoryRule::any("historic", Category::Monuments),
    CategoryRule::exact(
        "building",
        &["cathedral", "church", "chapel"],
        Category::Monuments,
    ),
    CategoryRule::exact("amenity", &["place_of_worship"], Category::Monuments),
    CategoryRule::exact(
        "man_made",
        &["lighthouse", "tower", "windmill", "watermill"],
        Category::Insolite,
    ),
    CategoryRule::exact("tourism", &["attraction", "viewpoint"], Category::Insolite),
    CategoryRule::exact(
        "natural",
        &["cave_entrance", "waterfall"],
        Category::Insolite,
    ),
];

/// Tag selectors sent to Overpass, derived from the rule table.
///
/// Wildcard rules become key-only selectors; exact rules become one selector
/// per accepted value unless a wildcard already covers their key.
pub fn overpass_tag_filters() -> Vec<(&'static str, Option<&'static str>)> {
    let wildcard_keys: Vec<&'static str> = CATEGORY_RULES
        .iter()
        .filter(|rule| matches!(rule.value, TagValue::Any))
        .map(|rule| rule.key)
        .collect();

    let mut filters = Vec::new();
    for rule in CATEGORY_RULES {
        match rule.value {
            TagValue::Any => push_unique(&mut filters, (rule.key, None)),
            TagValue::OneOf(_) if wildcard_keys.contains(&rule.key) => {}
            TagValue::OneOf(values) => {
                for value in values {
                    push_unique(&mut filters, (rule.key, Some(*value)));
                }
            }
        }
    }
    filters
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

impl Category {
    /// Derive the category for a set of raw tags.
    ///
    /// # Examples
    /// ```
    /// use std::collections::BTreeMap;
    ///
    /// use backend::domain::Category;
    ///
    /// let tags = BTreeMap::from([("tourism".to_owned(), "museum".to_owned())]);
    /// assert_eq!(Category::from_tags(&tags), Category::Musees);
    /// ```
    pub fn from_tags(tags: &BTreeMap<String, String>) -> Self {
        CATEGORY_RULES
            .iter()
            .find(|rule| rule.matches(tags))
            .map_or(Self::Autre, |rule| rule.category)
    }

    /// Lowercase storage and wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monuments => "monuments",
            Self::Musees => "musees",
            Self::Art => "art",
            Self::Insolite => "insolite",
            Self::Autre => "autre",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "monuments" => Ok(Self::Monuments),
            "musees" => Ok(Self::Musees),
            "art" => Ok(Self::Art),
            "insolite" => Ok(Self::Insolite),
            "autre" => Ok(Self::Autre),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[rstest]
    #[case::museum(&[("tourism", "museum")], Category::Musees)]
    #[case::artwork(&[("tourism", "artwork")], Category::Art)]
    #[case::arts_centre(&[("amenity", "arts_centre")], Category::Art)]
    #[case::castle(&[("historic", "castle")], Category::Monuments)]
    #[case::wayside_cross(&[("historic", "wayside_cross")], Category::Monuments)]
    #[case::church(&[("amenity", "place_of_worship")], Category::Monuments)]
    #[case::lighthouse(&[("man_made", "lighthouse")], Category::Insolite)]
    #[case::viewpoint(&[("tourism", "viewpoint")], Category::Insolite)]
    #[case::waterfall(&[("natural", "waterfall")], Category::Insolite)]
    #[case::cafe(&[("amenity", "cafe")], Category::Autre)]
    #[case::untagged(&[], Category::Autre)]
    fn maps_single_tags(#[case] pairs: &[(&str, &str)], #[case] expected: Category) {
        assert_eq!(Category::from_tags(&tags(pairs)), expected);
    }

    #[test]
    fn museum_rule_outranks_historic_rule() {
        let both = tags(&[("historic", "building"), ("tourism", "museum")]);
        assert_eq!(Category::from_tags(&both), Category::Musees);
    }

    #[test]
    fn historic_rule_outranks_attraction_rule() {
        let both = tags(&[("historic", "monument"), ("tourism", "attraction")]);
        assert_eq!(Category::from_tags(&both), Category::Monuments);
    }

    #[test]
    fn blank_historic_value_does_not_match_wildcard() {
        assert_eq!(
            Category::from_tags(&tags(&[("historic", " ")])),
            Category::Autre
        );
    }

    #[test]
    fn mapping_is_stable_for_identical_inputs() {
        let input = tags(&[("tourism", "gallery"), ("historic", "yes")]);
        let first = Category::from_tags(&input);
        let second = Category::from_tags(&input.clone());
        assert_eq!(first, second);
        assert_eq!(first, Category::Art);
    }

    #[test]
    fn overpass_filters_cover_wildcards_once() {
        let filters = overpass_tag_filters();
        assert!(filters.contains(&("historic", None)));
        assert!(filters.contains(&("tourism", Some("museum"))));
        assert!(!filters.contains(&("historic", Some("castle"))));
        let historic_selectors = filters
            .iter()
            .filter(|(key, _)| *key == "historic")
            .count();
        assert_eq!(historic_selectors, 1);
    }

    #[rstest]
    #[case(Category::Monuments)]
    #[case(Category::Autre)]
    fn parses_storage_names(#[case] category: Category) {
        assert_eq!(category.as_str().parse::<Category>(), Ok(category));
    }
}
