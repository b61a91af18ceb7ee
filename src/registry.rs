//! Widget registration table.
//!
//! DESIGN
//! ======
//! Everything type-specific about a widget lives in one [`WidgetDescriptor`]:
//! the template new instances are built from, the validator its payloads must
//! pass before they enter the store, and the skeleton shown while it loads.
//! Adding a widget type is a [`WidgetRegistry::register`] call; nothing else
//! in the crate switches on the type tag.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use serde::{Deserialize, Serialize};

use crate::milestone::ValidationError;
use crate::skeleton::SkeletonShape;
use crate::widget::{
    ACTIVITY_FEED, DOCUMENT_REVIEWER, MARKET_INSIGHTS, RESOURCE_LIST, ROADMAP_BOARD, SKILL_RADAR, WidgetData,
    WidgetType,
};

/// Default grid footprint of a new instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// Factory data for new widget instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetTemplate {
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    pub title: String,
    pub default_size: Size,
    /// `false` limits the dashboard to one instance of this type.
    pub allow_multiple: bool,
    pub refresh_interval_ms: u64,
}

/// Checks a payload before it is written to the store.
pub type Validator = fn(&WidgetType, &WidgetData) -> Result<(), ValidationError>;

#[derive(Debug, Clone)]
pub struct WidgetDescriptor {
    pub template: WidgetTemplate,
    pub validate: Validator,
    pub skeleton: SkeletonShape,
}

/// Roadmap payloads must be a structurally valid board.
///
/// # Errors
///
/// `Payload` for a non-board payload, otherwise whatever board validation reports.
pub fn validate_roadmap(widget_type: &WidgetType, data: &WidgetData) -> Result<(), ValidationError> {
    match data {
        WidgetData::Roadmap(board) => board.validate(),
        WidgetData::Opaque(_) => Err(ValidationError::Payload {
            widget_type: widget_type.to_string(),
            expected: "roadmap",
        }),
    }
}

/// Non-board widgets accept any opaque payload.
///
/// # Errors
///
/// `Payload` when handed a roadmap board.
pub fn validate_opaque(widget_type: &WidgetType, data: &WidgetData) -> Result<(), ValidationError> {
    match data {
        WidgetData::Opaque(_) => Ok(()),
        WidgetData::Roadmap(_) => Err(ValidationError::Payload {
            widget_type: widget_type.to_string(),
            expected: "opaque",
        }),
    }
}

/// Type tag → descriptor, in registration order.
#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    entries: Vec<WidgetDescriptor>,
}

impl WidgetRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The six built-in widget types.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (tag, title, (width, height), allow_multiple, refresh_interval_ms, skeleton) in [
            (ACTIVITY_FEED, "Activity Feed", (6, 4), false, 60_000, SkeletonShape::List { rows: 5 }),
            (SKILL_RADAR, "Skill Radar", (4, 4), false, 0, SkeletonShape::Chart),
            (ROADMAP_BOARD, "Learning Roadmap", (12, 6), false, 0, SkeletonShape::Board { columns: 4, cards: 3 }),
            (DOCUMENT_REVIEWER, "Document Reviewer", (6, 6), true, 0, SkeletonShape::Document { lines: 8 }),
            (MARKET_INSIGHTS, "Market Insights", (6, 4), true, 300_000, SkeletonShape::Chart),
            (RESOURCE_LIST, "Resources", (4, 6), true, 0, SkeletonShape::List { rows: 4 }),
        ] {
            let widget_type = WidgetType::new(tag);
            let validate: Validator = if widget_type.is_roadmap_board() { validate_roadmap } else { validate_opaque };
            registry.register(WidgetDescriptor {
                template: WidgetTemplate {
                    widget_type,
                    title: title.to_string(),
                    default_size: Size { width, height },
                    allow_multiple,
                    refresh_interval_ms,
                },
                validate,
                skeleton,
            });
        }
        registry
    }

    /// Add a type, replacing any existing entry for the same tag in place.
    pub fn register(&mut self, descriptor: WidgetDescriptor) {
        match self.entries.iter_mut().find(|d| d.template.widget_type == descriptor.template.widget_type) {
            Some(existing) => *existing = descriptor,
            None => self.entries.push(descriptor),
        }
    }

    #[must_use]
    pub fn get(&self, widget_type: &WidgetType) -> Option<&WidgetDescriptor> {
        self.entries.iter().find(|d| d.template.widget_type == *widget_type)
    }

    #[must_use]
    pub fn contains(&self, widget_type: &WidgetType) -> bool {
        self.get(widget_type).is_some()
    }

    /// Every template, in registration order.
    pub fn templates(&self) -> impl Iterator<Item = &WidgetTemplate> {
        self.entries.iter().map(|d| &d.template)
    }

    /// Skeleton for `widget_type`; unregistered types get [`SkeletonShape::Card`].
    #[must_use]
    pub fn skeleton_for(&self, widget_type: &WidgetType) -> SkeletonShape {
        self.get(widget_type).map_or(SkeletonShape::Card, |d| d.skeleton)
    }

    /// Run the type's validator. Unregistered types accept anything.
    ///
    /// # Errors
    ///
    /// Whatever the type's validator rejects.
    pub fn validate(&self, widget_type: &WidgetType, data: &WidgetData) -> Result<(), ValidationError> {
        match self.get(widget_type) {
            Some(d) => (d.validate)(widget_type, data),
            None => Ok(()),
        }
    }
}
