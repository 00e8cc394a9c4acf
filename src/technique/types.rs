use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of technique families
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Punches,
    Strikes,
    Kicks,
    Knees,
    #[serde(rename = "Defenses/Grabs")]
    DefensesGrabs,
    Weapons,
    #[serde(rename = "Hand-Grip")]
    HandGrip,
    Knife,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Punches,
        Category::Strikes,
        Category::Kicks,
        Category::Knees,
        Category::DefensesGrabs,
        Category::Weapons,
        Category::HandGrip,
        Category::Knife,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Punches => "Punches",
            Category::Strikes => "Strikes",
            Category::Kicks => "Kicks",
            Category::Knees => "Knees",
            Category::DefensesGrabs => "Defenses/Grabs",
            Category::Weapons => "Weapons",
            Category::HandGrip => "Hand-Grip",
            Category::Knife => "Knife",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Priority label used by the priority-based strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// Height the technique is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLevel {
    High,
    Middle,
    Low,
}

/// Side of the body the technique is performed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Either,
}

fn default_weight() -> f64 {
    1.0
}

fn default_selected() -> bool {
    true
}

/// A single trainable action.
///
/// The engine only ever reads technique snapshots; `selected`, `priority` and
/// `weight` are the fields configuration editors are expected to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technique {
    pub name: String,
    /// Identifier handed to the audio collaborator
    pub audio: String,
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_selected")]
    pub selected: bool,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub level: Option<TargetLevel>,
    #[serde(default)]
    pub side: Option<Side>,
}

impl Technique {
    /// Create a selected, medium-priority technique with weight 1
    pub fn new(name: impl Into<String>, audio: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            audio: audio.into(),
            category,
            priority: Priority::default(),
            selected: true,
            weight: default_weight(),
            level: None,
            side: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_level(mut self, level: TargetLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    pub fn deselected(mut self) -> Self {
        self.selected = false;
        self
    }
}

/// Keep only the techniques currently marked as selected
pub fn selectable(pool: &[Technique]) -> Vec<Technique> {
    pool.iter().filter(|t| t.selected).cloned().collect()
}
