//! Immutable routing decision over a classifier record.

use serde_json::Value;
use tracing::info;

use flowrank_classify::{parse_classifier_output, Category, ClassifierRecord};

use crate::sectors::normalize_sectors;

/// Fields a routed path can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteField {
    Message,
    Focus,
    RerankWeights,
    TemporalConstraints,
    Sectors,
}

/// What one output of one path carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSignal {
    /// Path is active; the wired value follows.
    Active(String),
    /// Path is not in the active set; the host must stop this branch.
    Stopped,
}

impl RouteSignal {
    pub fn is_stopped(&self) -> bool {
        matches!(self, RouteSignal::Stopped)
    }

    /// The carried value, or the empty string when stopped.
    pub fn value(&self) -> &str {
        match self {
            RouteSignal::Active(v) => v,
            RouteSignal::Stopped => "",
        }
    }
}

/// Routing decision computed once from the classifier payload and the
/// sector filter. All accessors are pure reads over this state.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    record: ClassifierRecord,
    sectors_json: String,
    status: String,
}

impl RoutingDecision {
    /// Decide routing from raw inputs. Parsing degrades to a
    /// defaults-filled record (all paths stopped) rather than failing.
    pub fn new(classifier_input: &Value, sectors_input: &Value) -> Self {
        let parsed = parse_classifier_output(classifier_input);
        let sectors_json = normalize_sectors(sectors_input);
        Self::from_record(parsed.record, sectors_json, parsed.status)
    }

    /// Decide routing from an already-parsed record.
    pub fn from_record(
        record: ClassifierRecord,
        sectors_json: String,
        parse_status: String,
    ) -> Self {
        let active_names: Vec<&str> = record
            .active_categories
            .iter()
            .map(Category::as_str)
            .collect();

        let status = if parse_status != "classifier output parsed" {
            format!("{parse_status}; all paths stopped")
        } else if active_names.is_empty() {
            "no active classification; all paths stopped".into()
        } else {
            format!("routing to: {}", active_names.join(", "))
        };

        info!("{status}");

        Self {
            record,
            sectors_json,
            status,
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn record(&self) -> &ClassifierRecord {
        &self.record
    }

    pub fn sectors_json(&self) -> &str {
        &self.sectors_json
    }

    pub fn is_active(&self, category: Category) -> bool {
        self.record.is_active(category)
    }

    /// The outputs the host wires for a given path.
    pub fn exposed_fields(category: Category) -> &'static [RouteField] {
        match category {
            Category::CorporateGlobal | Category::CorporateLocal => &[
                RouteField::Message,
                RouteField::Focus,
                RouteField::RerankWeights,
                RouteField::TemporalConstraints,
                RouteField::Sectors,
            ],
            Category::Casual => &[RouteField::Message],
            Category::Internet => &[RouteField::Message, RouteField::Focus],
        }
    }

    /// One output of one path. Inactive paths always answer `Stopped`,
    /// never stale or default content.
    pub fn output(&self, category: Category, field: RouteField) -> RouteSignal {
        if !self.is_active(category) {
            return RouteSignal::Stopped;
        }

        let value = match field {
            RouteField::Message => self.record.message.clone(),
            RouteField::Focus => self.record.focus.clone(),
            RouteField::RerankWeights => self.record.rerank_weights.to_string(),
            RouteField::TemporalConstraints => self.record.temporal_constraints.clone(),
            RouteField::Sectors => self.sectors_json.clone(),
        };
        RouteSignal::Active(value)
    }
}
