//! Operator-curated vocabulary for the lookbook browse facets.

use serde::{Deserialize, Serialize};

/// A multi-select facet of the lookbook browse view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Style,
    Material,
    Color,
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::Style, Facet::Material, Facet::Color];

    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Style => "style",
            Facet::Material => "material",
            Facet::Color => "color",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "style" => Some(Facet::Style),
            "material" => Some(Facet::Material),
            "color" => Some(Facet::Color),
            _ => None,
        }
    }
}

/// One row of `lookbook_filters`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookbookFilterTerm {
    pub id: String,
    #[serde(rename = "type")]
    pub facet: Facet,
    pub value: String,
}

/// Request body for adding a facet value.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFilterTermRequest {
    #[serde(rename = "type")]
    pub facet: Facet,
    pub value: String,
}

/// Facet values grouped by facet, in display order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterVocabulary {
    pub style: Vec<String>,
    pub material: Vec<String>,
    pub color: Vec<String>,
}

impl FilterVocabulary {
    pub fn from_terms(terms: &[LookbookFilterTerm]) -> Self {
        let mut vocabulary = Self::default();
        for term in terms {
            let bucket = match term.facet {
                Facet::Style => &mut vocabulary.style,
                Facet::Material => &mut vocabulary.material,
                Facet::Color => &mut vocabulary.color,
            };
            bucket.push(term.value.clone());
        }
        vocabulary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_parse_matches_as_str() {
        for facet in Facet::ALL {
            assert_eq!(Facet::parse(facet.as_str()), Some(facet));
        }
        assert_eq!(Facet::parse("category"), None);
    }

    #[test]
    fn test_vocabulary_groups_by_facet() {
        let term = |facet, value: &str| LookbookFilterTerm {
            id: value.to_lowercase(),
            facet,
            value: value.to_string(),
        };
        let vocabulary = FilterVocabulary::from_terms(&[
            term(Facet::Style, "Modern"),
            term(Facet::Color, "Be"),
            term(Facet::Style, "Indochine"),
            term(Facet::Material, "Gỗ sồi"),
        ]);
        assert_eq!(vocabulary.style, vec!["Modern", "Indochine"]);
        assert_eq!(vocabulary.material, vec!["Gỗ sồi"]);
        assert_eq!(vocabulary.color, vec!["Be"]);
    }
}
