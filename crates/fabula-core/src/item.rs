//! Items and their typed construction.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthoringError, CoreResult};
use crate::text::TextSource;
use crate::vocab;

/// Unique identifier for every item in a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Generate a new random item ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// A flexible property value that supports common serializable types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A text value.
    String(String),
    /// A 64-bit signed integer value.
    Integer(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A boolean value.
    Boolean(bool),
    /// An ordered list of property values.
    List(Vec<PropertyValue>),
    /// A string-keyed map of property values.
    Map(HashMap<String, PropertyValue>),
}

/// Lock and hinge state for doors and openable containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorState {
    /// Whether the door is currently open.
    pub open: bool,
    /// Whether the door is currently locked.
    pub locked: bool,
    /// The item that unlocks this door, if any.
    pub key: Option<ItemId>,
    /// An always-open doorway; open/close attempts are refused.
    pub always_open: bool,
}

/// Door configuration, validated at item creation.
#[derive(Debug, Clone, Default)]
pub struct DoorConfig {
    /// Start open.
    pub open: bool,
    /// Start locked.
    pub locked: bool,
    /// The key item required to unlock, if any.
    pub key: Option<ItemId>,
    /// A doorway with no workable hinge; must not also start closed or locked.
    pub always_open: bool,
}

impl DoorConfig {
    fn validate(&self) -> CoreResult<()> {
        if self.always_open && !self.open {
            return Err(AuthoringError::InvalidConfig(
                "a door cannot be both always-open and closed".into(),
            ));
        }
        if self.always_open && self.locked {
            return Err(AuthoringError::InvalidConfig(
                "a door cannot be both always-open and locked".into(),
            ));
        }
        if self.open && self.locked {
            return Err(AuthoringError::InvalidConfig(
                "a door cannot start both open and locked".into(),
            ));
        }
        Ok(())
    }
}

/// Typed item definition. All fields are optional except the name; invalid
/// combinations are rejected when the item is created.
#[derive(Debug, Clone)]
pub struct ItemConfig {
    /// Unique display name.
    pub name: String,
    /// Extra aliases beyond those derived from the name.
    pub aliases: Vec<String>,
    /// Description text strategy.
    pub description: TextSource,
    /// Whether the item can be picked up.
    pub holdable: bool,
    /// Volume the item occupies inside containers; -1 = sizeless.
    pub size: i64,
    /// Whether things can deliberately be put into or onto this item.
    pub is_container: bool,
    /// Container volume; -1 = not a size-limited container.
    pub capacity: i64,
    /// Whether the item can be referred to without prior discovery.
    pub visible: bool,
    /// Whether contents are enumerable when this item is examined.
    pub items_visible_from_self: bool,
    /// Whether contents are enumerable from the surrounding room.
    pub items_visible_from_room: bool,
    /// Preposition used when placing things here ("in", "on", ...).
    pub preposition: String,
    /// Door capability.
    pub door: Option<DoorConfig>,
    /// Room this item leads to when traversed.
    pub leads_to: Option<ItemId>,
    /// Free-form serializable properties.
    pub properties: HashMap<String, PropertyValue>,
}

impl ItemConfig {
    /// Start a definition with defaults: not holdable, sizeless, not a
    /// container, visible, contents enumerable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: TextSource::fixed("You see nothing special."),
            holdable: false,
            size: -1,
            is_container: false,
            capacity: -1,
            visible: true,
            items_visible_from_self: true,
            items_visible_from_room: true,
            preposition: "in".to_string(),
            door: None,
            leads_to: None,
            properties: HashMap::new(),
        }
    }

    /// Add an alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<TextSource>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the item holdable.
    pub fn holdable(mut self) -> Self {
        self.holdable = true;
        self
    }

    /// Set the item's size.
    pub fn with_size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    /// Make the item a container with the given capacity (-1 = unbounded).
    pub fn container(mut self, capacity: i64) -> Self {
        self.is_container = true;
        self.capacity = capacity;
        self
    }

    /// Hide the item until revealed.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Hide contents until the item is opened.
    pub fn closed(mut self) -> Self {
        self.items_visible_from_self = false;
        self
    }

    /// Keep contents off room listings; they only show when examined.
    pub fn contents_hidden_from_room(mut self) -> Self {
        self.items_visible_from_room = false;
        self
    }

    /// Set the placement preposition.
    pub fn with_preposition(mut self, preposition: impl Into<String>) -> Self {
        self.preposition = preposition.into();
        self
    }

    /// Give the item a door capability.
    pub fn with_door(mut self, door: DoorConfig) -> Self {
        self.door = Some(door);
        self
    }

    /// Make the item traversable to the given room.
    pub fn leads_to(mut self, room: ItemId) -> Self {
        self.leads_to = Some(room);
        self
    }

    /// Set a property.
    pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub(crate) fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(AuthoringError::InvalidConfig(
                "item name must not be empty".into(),
            ));
        }
        if self.size < -1 {
            return Err(AuthoringError::InvalidConfig(format!(
                "item \"{}\" has a negative size",
                self.name
            )));
        }
        if self.capacity < -1 {
            return Err(AuthoringError::InvalidConfig(format!(
                "item \"{}\" has a negative capacity",
                self.name
            )));
        }
        if let Some(door) = &self.door {
            door.validate()?;
        }
        Ok(())
    }
}

/// A world object: room, prop, door, or carried thing, distinguished only by
/// which capability fields are set.
///
/// Containment is stored as ids on both sides (`container` up, `contents`
/// down); the two are kept in agreement by [`crate::GameWorld`], never edited
/// directly.
#[derive(Debug, Clone)]
pub struct Item {
    /// Unique identifier.
    pub id: ItemId,
    name: String,
    aliases: BTreeSet<String>,
    /// Description text strategy.
    pub description: TextSource,
    /// Whether the item can be picked up.
    pub holdable: bool,
    /// Volume occupied inside containers; -1 = sizeless.
    pub size: i64,
    /// Whether things can deliberately be put into or onto this item.
    pub is_container: bool,
    /// Container volume; -1 = not size-limited.
    pub capacity: i64,
    /// Remaining container volume, meaningful only when `capacity >= 0`.
    pub free: i64,
    visible: bool,
    /// Whether contents are enumerable when this item is examined.
    pub items_visible_from_self: bool,
    /// Whether contents are enumerable from the surrounding room.
    pub items_visible_from_room: bool,
    /// Preposition used when placing things here.
    pub preposition: String,
    pub(crate) container: Option<ItemId>,
    pub(crate) contents: Vec<ItemId>,
    door: Option<DoorState>,
    /// Room this item leads to when traversed.
    pub leads_to: Option<ItemId>,
    properties: HashMap<String, PropertyValue>,
    recording: bool,
    altered: BTreeSet<String>,
}

impl Item {
    pub(crate) fn from_config(config: ItemConfig) -> CoreResult<Self> {
        config.validate()?;
        let aliases = vocab::derive_aliases(&config.name, &config.aliases);
        let door = config.door.map(|d| DoorState {
            open: d.open,
            locked: d.locked,
            key: d.key,
            always_open: d.always_open,
        });
        Ok(Self {
            id: ItemId::new(),
            name: config.name,
            aliases,
            description: config.description,
            holdable: config.holdable,
            size: config.size,
            is_container: config.is_container,
            capacity: config.capacity,
            free: config.capacity.max(0),
            visible: config.visible,
            items_visible_from_self: config.items_visible_from_self,
            items_visible_from_room: config.items_visible_from_room,
            preposition: config.preposition,
            container: None,
            contents: Vec::new(),
            door,
            leads_to: config.leads_to,
            properties: config.properties,
            recording: false,
            altered: BTreeSet::new(),
        })
    }

    /// The item's canonical display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every phrase that refers to this item, lower-cased.
    pub fn aliases(&self) -> &BTreeSet<String> {
        &self.aliases
    }

    /// The item currently holding this one, if any.
    pub fn container(&self) -> Option<ItemId> {
        self.container
    }

    /// Direct children, in placement order.
    pub fn contents(&self) -> &[ItemId] {
        &self.contents
    }

    /// Whether the item can currently be referred to.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Reveal or hide the item.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.note_altered("visible");
    }

    /// The door capability, if any.
    pub fn door(&self) -> Option<&DoorState> {
        self.door.as_ref()
    }

    /// Whether the item has a door capability that is currently open.
    pub fn is_open(&self) -> bool {
        self.door.as_ref().is_some_and(|d| d.open)
    }

    /// Whether the item has a door capability that is currently locked.
    pub fn is_locked(&self) -> bool {
        self.door.as_ref().is_some_and(|d| d.locked)
    }

    /// Open or close the door capability. No effect on doorless items.
    pub fn set_open(&mut self, open: bool) {
        if let Some(door) = self.door.as_mut() {
            door.open = open;
            self.note_altered("open");
        }
    }

    /// Lock or unlock the door capability. No effect on doorless items.
    pub fn set_locked(&mut self, locked: bool) {
        if let Some(door) = self.door.as_mut() {
            door.locked = locked;
            self.note_altered("locked");
        }
    }

    /// Look up a property.
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Set a property.
    pub fn set_property(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.properties.insert(key.into(), value);
        self.note_altered("properties");
    }

    /// The space the item takes up in a sized container.
    pub fn occupied_size(&self) -> i64 {
        self.size.max(0)
    }

    /// Whether the item answers to the given phrase.
    pub fn answers_to(&self, phrase: &str) -> bool {
        self.aliases.contains(&phrase.to_lowercase())
    }

    pub(crate) fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
    }

    pub(crate) fn note_altered(&mut self, field: &str) {
        if self.recording {
            self.altered.insert(field.to_string());
        }
    }

    pub(crate) fn altered_fields(&self) -> &BTreeSet<String> {
        &self.altered
    }

    pub(crate) fn field_value(&self, field: &str) -> serde_json::Value {
        match field {
            "visible" => serde_json::json!(self.visible),
            "open" => serde_json::json!(self.is_open()),
            "locked" => serde_json::json!(self.is_locked()),
            "free" => serde_json::json!(self.free),
            "container" => serde_json::json!(self.container.map(|id| id.0)),
            "contents_enumerable" => serde_json::json!(self.items_visible_from_self),
            "properties" => serde_json::to_value(&self.properties).unwrap_or_default(),
            _ => serde_json::Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_display_shows_short_form() {
        let id = ItemId(Uuid::parse_str("a3f2b1c8-1234-5678-9abc-def012345678").unwrap());
        assert_eq!(id.to_string(), "a3f2b1c8");
    }

    #[test]
    fn config_derives_aliases_from_name() {
        let item = Item::from_config(
            ItemConfig::new("the red ball of yarn").with_alias("woolball"),
        )
        .unwrap();
        assert!(item.answers_to("red"));
        assert!(item.answers_to("ball"));
        assert!(item.answers_to("yarn"));
        assert!(item.answers_to("the red ball of yarn"));
        assert!(item.answers_to("woolball"));
        // Stopwords are not aliases on their own
        assert!(!item.answers_to("the"));
        assert!(!item.answers_to("of"));
    }

    #[test]
    fn always_open_and_closed_rejected() {
        let result = Item::from_config(ItemConfig::new("archway").with_door(DoorConfig {
            open: false,
            always_open: true,
            ..DoorConfig::default()
        }));
        assert!(matches!(result, Err(AuthoringError::InvalidConfig(_))));
    }

    #[test]
    fn open_and_locked_rejected() {
        let result = Item::from_config(ItemConfig::new("vault").with_door(DoorConfig {
            open: true,
            locked: true,
            ..DoorConfig::default()
        }));
        assert!(matches!(result, Err(AuthoringError::InvalidConfig(_))));
    }

    #[test]
    fn empty_name_rejected() {
        let result = Item::from_config(ItemConfig::new("   "));
        assert!(matches!(result, Err(AuthoringError::InvalidConfig(_))));
    }

    #[test]
    fn door_state_follows_setters() {
        let mut item = Item::from_config(
            ItemConfig::new("trapdoor").with_door(DoorConfig::default()),
        )
        .unwrap();
        assert!(!item.is_open());
        item.set_open(true);
        assert!(item.is_open());
        item.set_locked(true);
        assert!(item.is_locked());
    }

    #[test]
    fn setters_record_once_recording_enabled() {
        let mut item = Item::from_config(ItemConfig::new("lamp")).unwrap();
        item.set_visible(false);
        assert!(item.altered_fields().is_empty());

        item.set_recording(true);
        item.set_visible(true);
        item.set_property("lit", PropertyValue::Boolean(true));
        assert!(item.altered_fields().contains("visible"));
        assert!(item.altered_fields().contains("properties"));
    }

    #[test]
    fn sizeless_item_occupies_nothing() {
        let item = Item::from_config(ItemConfig::new("mote")).unwrap();
        assert_eq!(item.occupied_size(), 0);
    }
}
