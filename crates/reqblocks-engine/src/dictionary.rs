use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::block::Category;
use crate::error::EngineError;

/// One named category of the active language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    pub category: Category,
    /// Whether the category is offered in the prefab palette
    #[serde(default)]
    pub prefab: bool,
    #[serde(default)]
    pub items: Vec<String>,
}

impl CategoryEntry {
    pub fn with_items(name: &str, category: Category, items: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            category,
            prefab: false,
            items: items.iter().map(|item| item.to_string()).collect(),
        }
    }
}

/// A multi-word dictionary item, pre-split for the merge pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    pub words: Vec<String>,
    pub category: Category,
}

impl Phrase {
    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

/// Read-only mapping from category name to its items.
///
/// Enumeration order is significant: classification and the merge
/// tie-break both take the first match in category order, then item order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    #[serde(default = "default_requirement_token")]
    pub requirement_token: String,
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
}

fn default_requirement_token() -> String {
    "req:".to_string()
}

impl Default for Dictionary {
    fn default() -> Self {
        Self {
            requirement_token: default_requirement_token(),
            categories: Vec::new(),
        }
    }
}

/// Strip the punctuation that must not affect dictionary lookups.
pub fn sanitize(word: &str) -> Cow<'_, str> {
    static PUNCTUATION: OnceLock<Regex> = OnceLock::new();
    let punctuation =
        PUNCTUATION.get_or_init(|| Regex::new(r"[.,']").expect("Invalid punctuation regex"));
    punctuation.replace_all(word, "")
}

/// Whether `word` reads as a number (requirement ids such as `12` or `3.1`).
pub fn is_numeric(word: &str) -> bool {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let number = NUMBER.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("Invalid number regex")
    });
    number.is_match(word.trim())
}

impl Dictionary {
    pub fn new(requirement_token: impl Into<String>, categories: Vec<CategoryEntry>) -> Self {
        Self {
            requirement_token: requirement_token.into(),
            categories,
        }
    }

    /// The EARS test language the editor ships with.
    pub fn ears() -> Self {
        fn entry(name: &str, category: Category, prefab: bool, items: &[&str]) -> CategoryEntry {
            CategoryEntry {
                prefab,
                ..CategoryEntry::with_items(name, category, items)
            }
        }

        Self::new(
            default_requirement_token(),
            vec![
                entry(
                    "keywords",
                    Category::Keyword,
                    true,
                    &["while", "then", "shall", "if"],
                ),
                entry(
                    "relationalOperators",
                    Category::RelationalOperator,
                    true,
                    &[
                        "is",
                        "and",
                        "set",
                        "to",
                        "within",
                        "has been",
                        "for",
                        "greater than",
                    ],
                ),
                entry(
                    "objects",
                    Category::Object,
                    true,
                    &[
                        "left gear state",
                        "aircraft speed",
                        "aircraft status",
                        "operational mode",
                        "left gear visual warning",
                        "left gear warning lamp",
                    ],
                ),
                entry(
                    "states",
                    Category::State,
                    true,
                    &[
                        "becomes hazardous",
                        "stops being hazardous",
                        "active",
                        "inactive",
                        "on",
                        "off",
                        "in air",
                        "on land",
                        "up and locked",
                    ],
                ),
                entry("actors", Category::Actor, true, &["LGS Warning System"]),
                entry(
                    "other",
                    Category::Other,
                    false,
                    &[",", ".", "the", "second", "seconds", "previous"],
                ),
            ],
        )
    }

    /// Reject dictionaries the merge pass cannot interpret unambiguously.
    pub fn validate(&self) -> Result<(), EngineError> {
        if sanitize(&self.requirement_token).is_empty()
            || self.requirement_token.split_whitespace().count() != 1
        {
            return Err(EngineError::InvalidRequirementToken(
                self.requirement_token.clone(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.categories {
            if !seen.insert(entry.name.as_str()) {
                return Err(EngineError::DuplicateCategory(entry.name.clone()));
            }
            for item in &entry.items {
                if item.trim().is_empty() {
                    return Err(EngineError::EmptyItem {
                        category: entry.name.clone(),
                    });
                }
                let normalized = item.split_whitespace().collect::<Vec<_>>().join(" ");
                if normalized != *item {
                    return Err(EngineError::IrregularSpacing {
                        category: entry.name.clone(),
                        item: item.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Category of `word` after sanitizing it, `Unset` when nothing matches.
    pub fn classify(&self, word: &str) -> Category {
        let sanitized = sanitize(word);
        for entry in &self.categories {
            if entry.items.iter().any(|item| *item == sanitized) {
                return entry.category;
            }
        }

        log::debug!("\"{word}\" not found in any category");
        Category::Unset
    }

    /// Multi-word items in enumeration order.
    pub fn phrases(&self) -> Vec<Phrase> {
        self.categories
            .iter()
            .flat_map(|entry| {
                entry
                    .items
                    .iter()
                    .filter(|item| item.contains(' '))
                    .map(|item| Phrase {
                        words: item.split(' ').map(str::to_string).collect(),
                        category: entry.category,
                    })
            })
            .collect()
    }

    /// Categories offered in the prefab palette.
    pub fn prefab_categories(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.categories.iter().filter(|entry| entry.prefab)
    }

    /// Name of the first category tagged with `category`.
    pub fn category_name(&self, category: Category) -> Option<&str> {
        self.categories
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.name.as_str())
    }
}
