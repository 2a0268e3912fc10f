use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Content of the sentinel block that delimits lines.
pub const LINE_BREAK: &str = "\n";

/// Word classification attached to every block.
///
/// Drives styling and merge eligibility. The numeric codes from
/// [`Category::code`] are stable and match the dictionary `type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Not found in any dictionary category
    Unset,
    Keyword,
    RelationalOperator,
    Object,
    State,
    Actor,
    Other,
    /// Composite "requirement id" block (`req: 12`)
    Requirement,
    /// User-created prefab block
    Custom,
}

impl Category {
    pub fn code(self) -> i32 {
        match self {
            Category::Unset => 0,
            Category::Keyword => 1,
            Category::RelationalOperator => 2,
            Category::Object => 3,
            Category::State => 4,
            Category::Actor => 5,
            Category::Other => 6,
            Category::Requirement => -1,
            Category::Custom => -2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        let category = match code {
            0 => Category::Unset,
            1 => Category::Keyword,
            2 => Category::RelationalOperator,
            3 => Category::Object,
            4 => Category::State,
            5 => Category::Actor,
            6 => Category::Other,
            -1 => Category::Requirement,
            -2 => Category::Custom,
            _ => return None,
        };
        Some(category)
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Unset => "unset",
            Category::Keyword => "keyword",
            Category::RelationalOperator => "relational_operator",
            Category::Object => "object",
            Category::State => "state",
            Category::Actor => "actor",
            Category::Other => "other",
            Category::Requirement => "requirement",
            Category::Custom => "custom",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let category = match s {
            "unset" => Category::Unset,
            "keyword" => Category::Keyword,
            "relational_operator" => Category::RelationalOperator,
            "object" => Category::Object,
            "state" => Category::State,
            "actor" => Category::Actor,
            "other" => Category::Other,
            "requirement" => Category::Requirement,
            "custom" => Category::Custom,
            _ => return Err(format!("unknown category '{s}'")),
        };
        Ok(category)
    }
}

/// The atomic editable unit.
///
/// `index` is identity, not position: it is allocated once from the
/// document's counter and survives every reordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub content: String,
    pub category: Category,
}

impl Block {
    pub fn new(index: u64, content: impl Into<String>, category: Category) -> Self {
        Self {
            index,
            content: content.into(),
            category,
        }
    }

    pub fn line_break(index: u64) -> Self {
        Self::new(index, LINE_BREAK, Category::Unset)
    }

    pub fn is_line_break(&self) -> bool {
        self.content == LINE_BREAK
    }
}

/// Monotonic source of block identities.
///
/// Never reset while a document is open, so indices are never reused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexAllocator {
    next: u64,
}

impl IndexAllocator {
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// The value the next allocation will return
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn allocate(&mut self) -> u64 {
        let index = self.next;
        self.next += 1;
        index
    }

    /// Reserve `count` consecutive indices, returning the first one.
    pub fn reserve(&mut self, count: usize) -> u64 {
        let base = self.next;
        self.next += count as u64;
        base
    }
}
