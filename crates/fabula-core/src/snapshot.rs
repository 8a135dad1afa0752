//! Change-tracking snapshots.
//!
//! The engine does not implement storage. It exposes a contract: once
//! recording is enabled, every tracked setter notes its field, and a
//! snapshot carries only the altered fields plus enough identity to
//! reconstruct on load. What happens to the serialized value is the host's
//! business.

use serde::{Deserialize, Serialize};

use crate::item::{Item, ItemId};

/// Snapshot of a single changed item: identity plus altered fields only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSnapshot {
    /// The item's id.
    pub id: ItemId,
    /// The item's canonical name.
    pub name: String,
    /// Type tag for reconstruction.
    pub kind: String,
    /// Altered fields and their current values.
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ItemSnapshot {
    /// Snapshot an item, or None if nothing changed since recording began.
    pub fn of(item: &Item) -> Option<Self> {
        let altered = item.altered_fields();
        if altered.is_empty() {
            return None;
        }
        let mut fields = serde_json::Map::new();
        for field in altered {
            fields.insert(field.clone(), item.field_value(field));
        }
        Some(Self {
            id: item.id,
            name: item.name().to_string(),
            kind: "item".to_string(),
            fields,
        })
    }
}

/// Snapshot of every changed item in a world.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Changed items, sorted by name for stable output.
    pub items: Vec<ItemSnapshot>,
}

impl WorldSnapshot {
    /// Whether anything changed at all.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemConfig, PropertyValue};

    #[test]
    fn unaltered_item_has_no_snapshot() {
        let item = Item::from_config(ItemConfig::new("stone")).unwrap();
        assert!(ItemSnapshot::of(&item).is_none());
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut item = Item::from_config(ItemConfig::new("stone")).unwrap();
        item.set_recording(true);
        item.set_visible(false);
        item.set_property("weight", PropertyValue::Integer(12));

        let snapshot = ItemSnapshot::of(&item).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: ItemSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(back.name, "stone");
        assert_eq!(back.kind, "item");
        assert_eq!(back.fields.get("visible"), Some(&serde_json::json!(false)));
        assert!(back.fields.contains_key("properties"));
    }
}
