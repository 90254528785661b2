//! Facet filtering for lookbook browse views.
//!
//! [`reduce`] is the only way filter state changes. [`FilterQuery`] is the
//! query-string boundary: parsing folds `Select` actions over the default
//! state, and serialization writes the canonical form back out.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Facet, Lookbook};

/// Category value meaning "no category restriction".
pub const ALL_CATEGORIES: &str = "all";

/// Joins the selected values of one facet in a query string.
pub const VALUE_SEPARATOR: &str = ",";

/// Reject facet values the query string cannot carry.
pub fn check_facet_value(facet: Facet, value: &str) -> Result<(), AppError> {
    if value.contains(VALUE_SEPARATOR) {
        return Err(AppError::Validation(format!(
            "{} value \"{}\" cannot contain \"{}\"",
            facet.as_str(),
            value,
            VALUE_SEPARATOR
        )));
    }
    Ok(())
}

/// Current filter selection of a browse view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookbookFilter {
    /// `None` shows every category
    pub category: Option<String>,
    pub style: BTreeSet<String>,
    pub material: BTreeSet<String>,
    pub color: BTreeSet<String>,
}

/// Changes a shopper can make to the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    /// Replace the category; `None` or "all" clears it
    SetCategory(Option<String>),
    /// Add the value to the facet if absent, remove it if present
    Toggle(Facet, String),
    /// Add the value to the facet
    Select(Facet, String),
    ClearFacet(Facet),
    ClearAll,
}

impl LookbookFilter {
    pub fn facet(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Style => &self.style,
            Facet::Material => &self.material,
            Facet::Color => &self.color,
        }
    }

    fn facet_mut(&mut self, facet: Facet) -> &mut BTreeSet<String> {
        match facet {
            Facet::Style => &mut self.style,
            Facet::Material => &mut self.material,
            Facet::Color => &mut self.color,
        }
    }

    /// AND across facets, OR within a facet. An empty facet matches everything.
    pub fn matches(&self, lookbook: &Lookbook) -> bool {
        if let Some(category) = &self.category {
            if &lookbook.category_id != category {
                return false;
            }
        }

        Facet::ALL.into_iter().all(|facet| {
            let selected = self.facet(facet);
            selected.is_empty()
                || lookbook
                    .facet_value(facet)
                    .is_some_and(|value| selected.contains(value))
        })
    }

    /// Keep the lookbooks that match, preserving order.
    pub fn apply(&self, lookbooks: Vec<Lookbook>) -> Vec<Lookbook> {
        if self.is_empty() {
            return lookbooks;
        }
        lookbooks.into_iter().filter(|l| self.matches(l)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Apply one action to the filter state.
pub fn reduce(mut state: LookbookFilter, action: FilterAction) -> LookbookFilter {
    match action {
        FilterAction::SetCategory(category) => {
            state.category = normalize_category(category);
        }
        FilterAction::Toggle(facet, value) => {
            let value = value.trim().to_string();
            if value.is_empty() {
                return state;
            }
            let selected = state.facet_mut(facet);
            if !selected.remove(&value) {
                selected.insert(value);
            }
        }
        FilterAction::Select(facet, value) => {
            let value = value.trim().to_string();
            if !value.is_empty() {
                state.facet_mut(facet).insert(value);
            }
        }
        FilterAction::ClearFacet(facet) => state.facet_mut(facet).clear(),
        FilterAction::ClearAll => state = LookbookFilter::default(),
    }
    state
}

fn normalize_category(category: Option<String>) -> Option<String> {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty() && c != ALL_CATEGORIES)
}

/// Raw query parameters of the browse route. Facets are comma-joined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FilterQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl FilterQuery {
    fn facet(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Style => self.style.as_deref(),
            Facet::Material => self.material.as_deref(),
            Facet::Color => self.color.as_deref(),
        }
    }

    /// Parse into filter state. Missing or empty parameters mean no restriction.
    pub fn to_filter(&self) -> LookbookFilter {
        let mut actions = vec![FilterAction::SetCategory(self.category.clone())];
        for facet in Facet::ALL {
            let values = self.facet(facet).unwrap_or_default();
            actions.extend(
                values
                    .split(VALUE_SEPARATOR)
                    .map(|value| FilterAction::Select(facet, value.to_string())),
            );
        }
        actions.into_iter().fold(LookbookFilter::default(), reduce)
    }

    /// Serialize filter state; empty selections are omitted.
    pub fn from_filter(filter: &LookbookFilter) -> Self {
        let join = |facet| {
            let selected = filter.facet(facet);
            (!selected.is_empty()).then(|| {
                selected
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(VALUE_SEPARATOR)
            })
        };
        Self {
            category: filter.category.clone(),
            style: join(Facet::Style),
            material: join(Facet::Material),
            color: join(Facet::Color),
        }
    }

    /// Percent-encoded query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let pairs = [
            ("category", self.category.as_deref()),
            ("style", self.style.as_deref()),
            ("material", self.material.as_deref()),
            ("color", self.color.as_deref()),
        ];
        pairs
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| format!("{}={}", key, urlencoding::encode(v))))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parse a raw query string such as the one produced by [`Self::to_query_string`].
    /// Unknown keys are ignored.
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::default();
        for pair in query.trim_start_matches('?').split('&') {
            let Some((key, raw)) = pair.split_once('=') else {
                continue;
            };
            let value = urlencoding::decode(&raw.replace('+', " "))
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            match key {
                "category" => parsed.category = Some(value),
                "style" => parsed.style = Some(value),
                "material" => parsed.material = Some(value),
                "color" => parsed.color = Some(value),
                _ => {}
            }
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn look(id: &str, category: &str, style: Option<&str>, color: Option<&str>) -> Lookbook {
        Lookbook {
            id: id.to_string(),
            title: id.to_string(),
            slug: None,
            category_id: category.to_string(),
            image_url: format!("https://cdn.ohouse.vn/{}.jpg", id),
            gallery_urls: Vec::new(),
            style: style.map(str::to_string),
            material: None,
            color: color.map(str::to_string),
            is_active: true,
            display_order: 0,
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            version: 1,
            hotspots: Vec::new(),
        }
    }

    fn ids(lookbooks: &[Lookbook]) -> Vec<&str> {
        lookbooks.iter().map(|l| l.id.as_str()).collect()
    }

    fn fixtures() -> Vec<Lookbook> {
        vec![
            look("a1", "A", Some("S1"), None),
            look("a2", "A", Some("S2"), None),
            look("b1", "B", Some("S1"), None),
            look("b2", "B", Some("S2"), None),
            look("a3", "A", None, None),
        ]
    }

    #[test]
    fn test_category_and_style_intersect() {
        let filter = [
            FilterAction::SetCategory(Some("A".to_string())),
            FilterAction::Toggle(Facet::Style, "S1".to_string()),
        ]
        .into_iter()
        .fold(LookbookFilter::default(), reduce);

        assert_eq!(ids(&filter.apply(fixtures())), vec!["a1"]);
    }

    #[test]
    fn test_multi_select_is_union_within_facet() {
        let both = [
            FilterAction::Toggle(Facet::Style, "S1".to_string()),
            FilterAction::Toggle(Facet::Style, "S2".to_string()),
        ]
        .into_iter()
        .fold(LookbookFilter::default(), reduce);
        assert_eq!(ids(&both.apply(fixtures())), vec!["a1", "a2", "b1", "b2"]);

        let in_b = reduce(both, FilterAction::SetCategory(Some("B".to_string())));
        assert_eq!(ids(&in_b.apply(fixtures())), vec!["b1", "b2"]);
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = LookbookFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(fixtures()).len(), 5);
    }

    #[test]
    fn test_facet_without_value_fails_restricted_facet() {
        let filter = reduce(
            LookbookFilter::default(),
            FilterAction::Select(Facet::Color, "Be".to_string()),
        );
        let looks = vec![look("x", "A", None, Some("Be")), look("y", "A", None, None)];
        assert_eq!(ids(&filter.apply(looks)), vec!["x"]);
    }

    #[test]
    fn test_toggle_twice_removes_value() {
        let state = reduce(
            LookbookFilter::default(),
            FilterAction::Toggle(Facet::Material, "Gỗ".to_string()),
        );
        let state = reduce(state, FilterAction::Toggle(Facet::Material, "Gỗ".to_string()));
        assert!(state.material.is_empty());
    }

    #[test]
    fn test_set_category_keeps_facets() {
        let state = reduce(
            LookbookFilter::default(),
            FilterAction::Select(Facet::Style, "Modern".to_string()),
        );
        let state = reduce(state, FilterAction::SetCategory(Some("phong-ngu".to_string())));
        let state = reduce(state, FilterAction::SetCategory(Some("all".to_string())));
        assert_eq!(state.category, None);
        assert!(state.style.contains("Modern"));

        let cleared = reduce(state, FilterAction::ClearAll);
        assert!(cleared.is_empty());
    }

    #[test]
    fn test_clear_facet_only_touches_that_facet() {
        let state = [
            FilterAction::Select(Facet::Style, "Modern".to_string()),
            FilterAction::Select(Facet::Color, "Be".to_string()),
            FilterAction::ClearFacet(Facet::Style),
        ]
        .into_iter()
        .fold(LookbookFilter::default(), reduce);
        assert!(state.style.is_empty());
        assert!(state.color.contains("Be"));
    }

    #[test]
    fn test_facet_value_with_separator_is_rejected() {
        let err = check_facet_value(Facet::Style, "Bắc Âu, tối giản").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(check_facet_value(Facet::Style, "Bắc Âu tối giản").is_ok());
    }

    #[test]
    fn test_query_round_trip() {
        let filter = LookbookFilter {
            category: Some("phong-khach".to_string()),
            style: ["Modern", "Classic"].iter().map(|s| s.to_string()).collect(),
            material: BTreeSet::new(),
            color: BTreeSet::new(),
        };

        let query = FilterQuery::from_filter(&filter);
        assert_eq!(query.style.as_deref(), Some("Classic,Modern"));
        assert_eq!(query.material, None);
        assert_eq!(query.to_filter(), filter);

        let text = query.to_query_string();
        assert_eq!(text, "category=phong-khach&style=Classic%2CModern");
        assert_eq!(FilterQuery::parse(&text).to_filter(), filter);
    }

    #[test]
    fn test_query_round_trip_with_vietnamese_values() {
        let filter = reduce(
            LookbookFilter::default(),
            FilterAction::Select(Facet::Material, "Gỗ sồi".to_string()),
        );
        let text = FilterQuery::from_filter(&filter).to_query_string();
        assert_eq!(FilterQuery::parse(&text).to_filter(), filter);
    }

    #[test]
    fn test_empty_params_mean_no_restriction() {
        let query = FilterQuery {
            category: Some("all".to_string()),
            style: Some("".to_string()),
            material: Some(" , ".to_string()),
            color: None,
        };
        assert!(query.to_filter().is_empty());
        assert_eq!(FilterQuery::parse("").to_filter(), LookbookFilter::default());
    }
}
