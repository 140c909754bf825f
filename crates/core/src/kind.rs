//! Entity kinds served by the catalog and the per-kind rules for references and summaries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::reference::EntityId;

/// A collection exposed by the remote catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Character,
    Episode,
    Location,
}

/// A field on a parent record whose value points at entities of another kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceField {
    pub name: &'static str,
    pub target: EntityKind,
}

const CHARACTER_REFERENCES: &[ReferenceField] = &[ReferenceField {
    name: "episode",
    target: EntityKind::Episode,
}];

const EPISODE_REFERENCES: &[ReferenceField] = &[ReferenceField {
    name: "characters",
    target: EntityKind::Character,
}];

const LOCATION_REFERENCES: &[ReferenceField] = &[ReferenceField {
    name: "residents",
    target: EntityKind::Character,
}];

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Character,
        EntityKind::Episode,
        EntityKind::Location,
    ];

    /// Collection path relative to the API base, e.g. `/character`
    pub fn collection_path(&self) -> &'static str {
        match self {
            EntityKind::Character => "/character",
            EntityKind::Episode => "/episode",
            EntityKind::Location => "/location",
        }
    }

    /// Reference fields carried by records of this kind
    pub fn reference_fields(&self) -> &'static [ReferenceField] {
        match self {
            EntityKind::Character => CHARACTER_REFERENCES,
            EntityKind::Episode => EPISODE_REFERENCES,
            EntityKind::Location => LOCATION_REFERENCES,
        }
    }

    /// Fields kept, besides `id` and `name`, when a record is embedded in another one
    pub fn display_fields(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Character => &["image"],
            EntityKind::Episode => &["air_date", "episode"],
            EntityKind::Location => &["type", "dimension"],
        }
    }

    /// Whether the remote accepts a comma-joined id list on the collection path.
    pub fn supports_multi_fetch(&self) -> bool {
        true
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Character => "character",
            EntityKind::Episode => "episode",
            EntityKind::Location => "location",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "character" | "characters" => Ok(EntityKind::Character),
            "episode" | "episodes" => Ok(EntityKind::Episode),
            "location" | "locations" => Ok(EntityKind::Location),
            other => Err(format!(
                "Invalid entity kind: {}. Valid kinds: character, episode, location",
                other
            )),
        }
    }
}

/// Narrowed projection of an entity used when embedding it inside another record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSummary {
    pub id: EntityId,
    pub name: String,
    #[serde(flatten)]
    pub display: Map<String, Value>,
}

impl ResolvedSummary {
    /// Build the JSON object embedded into hydrated records.
    ///
    /// Produces the same value as serializing the summary, without going through a
    /// fallible serializer.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("id".to_string(), self.id.to_json());
        object.insert("name".to_string(), Value::String(self.name.clone()));
        object.extend(self.display.clone());
        Value::Object(object)
    }
}

/// Project a full entity record onto its kind's summary.
///
/// Returns `None` when the record has no usable `id`. A missing `name` is kept as an
/// empty string and missing display fields are simply left out.
pub fn summarize(kind: EntityKind, record: &Value) -> Option<ResolvedSummary> {
    let object = record.as_object()?;
    let id = EntityId::from_json(object.get("id")?)?;
    let name = object
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let display = kind
        .display_fields()
        .iter()
        .filter_map(|field| object.get(*field).map(|v| (field.to_string(), v.clone())))
        .collect();

    Some(ResolvedSummary { id, name, display })
}
