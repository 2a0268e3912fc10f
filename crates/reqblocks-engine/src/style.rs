use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::block::Category;

/// Colors applied to blocks of one category. Values are opaque to the
/// engine (CSS-like `#RRGGBB` strings in practice).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
}

/// Looks up rendering overrides by category.
///
/// A missing mapping means "render with no override", never an error.
pub trait StyleResolver {
    fn style(&self, category: Category) -> Option<&BlockStyle>;
}

/// Plain map-backed resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    styles: HashMap<Category, BlockStyle>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The palette of the EARS language.
    pub fn ears() -> Self {
        let mut map = Self::new();
        for (category, background) in [
            (Category::Keyword, "#FFB400"),
            (Category::RelationalOperator, "#FF6B6B"),
            (Category::Object, "#4ECDC4"),
            (Category::State, "#1A535C"),
            (Category::Actor, "#F7FFF7"),
            (Category::Other, "#A9A9A9"),
        ] {
            map.insert(
                category,
                BlockStyle {
                    background_color: Some(background.to_string()),
                    ..BlockStyle::default()
                },
            );
        }
        map
    }

    pub fn insert(&mut self, category: Category, style: BlockStyle) {
        self.styles.insert(category, style);
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Overlay `other` on top of this map, category by category.
    pub fn extend(&mut self, other: StyleMap) {
        self.styles.extend(other.styles);
    }
}

impl StyleResolver for StyleMap {
    fn style(&self, category: Category) -> Option<&BlockStyle> {
        self.styles.get(&category)
    }
}
