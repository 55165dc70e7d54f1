//! Classifier record types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The four routable categories. Closed set: classifier output naming
/// anything else is ignored, so no fifth path can ever activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "corporativo_global")]
    CorporateGlobal,
    #[serde(rename = "corporativo_local")]
    CorporateLocal,
    #[serde(rename = "casual")]
    Casual,
    #[serde(rename = "internet")]
    Internet,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::CorporateGlobal,
        Category::CorporateLocal,
        Category::Casual,
        Category::Internet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::CorporateGlobal => "corporativo_global",
            Category::CorporateLocal => "corporativo_local",
            Category::Casual => "casual",
            Category::Internet => "internet",
        }
    }

    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str() == label)
    }
}

/// Parsed classifier output, defaults-filled. Immutable for the lifetime
/// of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierRecord {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub active_categories: Vec<Category>,
    #[serde(default)]
    pub focus: String,
    /// Opaque weights mapping, consumed by the reranker.
    #[serde(default = "empty_object")]
    pub rerank_weights: Value,
    /// Opaque query spec, consumed by the external search layer.
    #[serde(default = "empty_object")]
    pub search_instruction: Value,
    #[serde(default)]
    pub temporal_constraints: String,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Default for ClassifierRecord {
    fn default() -> Self {
        Self {
            message: String::new(),
            active_categories: Vec::new(),
            focus: String::new(),
            rerank_weights: empty_object(),
            search_instruction: empty_object(),
            temporal_constraints: String::new(),
        }
    }
}

impl ClassifierRecord {
    pub fn is_active(&self, category: Category) -> bool {
        self.active_categories.contains(&category)
    }
}
