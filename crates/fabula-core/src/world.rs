//! The world graph: an arena of items linked by containment ids.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::error::{AuthoringError, CoreResult};
use crate::item::{Item, ItemConfig, ItemId};
use crate::snapshot::{ItemSnapshot, WorldSnapshot};
use crate::vocab::Vocabulary;

/// Map from phrase to the reachable items answering to it, shallower items
/// first.
pub type AccessMap = HashMap<String, Vec<ItemId>>;

/// The central world model. Owns every item and the vocabulary index.
///
/// Containment is a pair of id links (`container` up, `contents` down) that
/// this type keeps in agreement; cycles cannot occur because an item has at
/// most one container and placing it always detaches it first.
#[derive(Debug)]
pub struct GameWorld {
    items: HashMap<ItemId, Item>,
    by_name: HashMap<String, ItemId>,
    vocab: Vocabulary,
    limbo: ItemId,
    recording: bool,
}

impl GameWorld {
    /// Create an empty world.
    ///
    /// The world starts with one hidden container, limbo: items are never
    /// deleted, only relocated there, so their names stay resolvable for
    /// narration.
    pub fn new() -> Self {
        let mut world = Self {
            items: HashMap::new(),
            by_name: HashMap::new(),
            vocab: Vocabulary::new(),
            limbo: ItemId::new(),
            recording: false,
        };
        let mut limbo = Item::from_config(
            ItemConfig::new("limbo")
                .hidden()
                .closed()
                .with_description("Where consumed things go."),
        )
        .expect("limbo config is static");
        limbo.id = world.limbo;
        world.by_name.insert("limbo".to_string(), world.limbo);
        world.items.insert(world.limbo, limbo);
        world
    }

    /// Create an item from its definition, registering it in the vocabulary.
    ///
    /// Names are unique per world; a duplicate is an authoring error.
    pub fn create(&mut self, config: ItemConfig) -> CoreResult<ItemId> {
        let key = config.name.trim().to_lowercase();
        if self.by_name.contains_key(&key) {
            return Err(AuthoringError::DuplicateName(config.name));
        }
        let mut item = Item::from_config(config)?;
        item.set_recording(self.recording);
        let id = item.id;
        self.vocab.register(id, item.aliases());
        self.by_name.insert(key, id);
        self.items.insert(id, item);
        Ok(id)
    }

    /// The hidden container that receives consumed items.
    pub fn limbo(&self) -> ItemId {
        self.limbo
    }

    /// Get an item by id.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Get a mutable item by id.
    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(&id)
    }

    /// An item's display name, or "nothing" for a stale id.
    pub fn name_of(&self, id: ItemId) -> &str {
        self.items.get(&id).map(Item::name).unwrap_or("nothing")
    }

    /// Find an item by canonical name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<ItemId> {
        self.by_name.get(&name.trim().to_lowercase()).copied()
    }

    /// The vocabulary index.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Whether `container` directly holds `item`.
    pub fn holds(&self, container: ItemId, item: ItemId) -> bool {
        self.items
            .get(&item)
            .is_some_and(|i| i.container() == Some(container))
    }

    /// Whether `container` has room left for `item`.
    pub fn fits(&self, container: ItemId, item: ItemId) -> bool {
        let Some(c) = self.items.get(&container) else {
            return false;
        };
        let Some(i) = self.items.get(&item) else {
            return false;
        };
        c.capacity < 0 || c.free >= i.occupied_size()
    }

    /// Place `item` into `container`, detaching it from any previous holder.
    ///
    /// Both sides of the link are updated together, and capacity bookkeeping
    /// moves with the item. Placing an item where it already is is a no-op.
    /// Returns false when the container is full or either id is stale.
    pub fn place(&mut self, item: ItemId, container: ItemId) -> bool {
        if item == container {
            return false;
        }
        if !self.items.contains_key(&container) || !self.items.contains_key(&item) {
            return false;
        }
        if self.holds(container, item) {
            debug!(
                item = self.name_of(item),
                container = self.name_of(container),
                "item already in container, ignoring"
            );
            return true;
        }
        if !self.fits(container, item) {
            return false;
        }
        if let Some(previous) = self.items[&item].container() {
            self.detach(previous, item);
        }
        let size = self.items[&item].occupied_size();
        if let Some(c) = self.items.get_mut(&container) {
            c.contents.push(item);
            if c.capacity >= 0 {
                c.free -= size;
                c.note_altered("free");
            }
        }
        if let Some(i) = self.items.get_mut(&item) {
            i.container = Some(container);
            i.note_altered("container");
        }
        true
    }

    /// Remove `item` from `container`. Returns false unless `item` was a
    /// direct child. The container's free capacity is restored by the item's
    /// size, and the item is left unheld (every alias entry disappears from
    /// the container's accessible view at once, since that view is derived).
    pub fn remove(&mut self, container: ItemId, item: ItemId) -> bool {
        if !self.holds(container, item) {
            return false;
        }
        self.detach(container, item);
        if let Some(i) = self.items.get_mut(&item) {
            i.container = None;
            i.note_altered("container");
        }
        true
    }

    fn detach(&mut self, container: ItemId, item: ItemId) {
        let size = self.items[&item].occupied_size();
        if let Some(c) = self.items.get_mut(&container) {
            c.contents.retain(|&id| id != item);
            if c.capacity >= 0 {
                c.free += size;
                c.note_altered("free");
            }
        }
    }

    /// Relocate an item to limbo. The item stays in the registry, so its
    /// name remains resolvable; it is simply no longer reachable.
    pub fn consume(&mut self, item: ItemId) {
        if !self.items.contains_key(&item) {
            return;
        }
        if let Some(previous) = self.items.get(&item).and_then(Item::container) {
            self.detach(previous, item);
        }
        let limbo = self.limbo;
        if let Some(i) = self.items.get_mut(&item) {
            i.container = Some(limbo);
            i.note_altered("container");
        }
        if let Some(l) = self.items.get_mut(&limbo) {
            l.contents.push(item);
        }
    }

    /// The outermost container above an item: its room.
    pub fn room_of(&self, mut id: ItemId) -> ItemId {
        while let Some(container) = self.items.get(&id).and_then(Item::container) {
            id = container;
        }
        id
    }

    /// Open or close an item's door capability. Opening a sized container
    /// also makes its contents enumerable, closing hides them again.
    pub fn set_open(&mut self, id: ItemId, open: bool) {
        if let Some(item) = self.items.get_mut(&id) {
            item.set_open(open);
            if !item.contents.is_empty() || item.capacity >= 0 {
                item.items_visible_from_self = open;
                item.note_altered("contents_enumerable");
            }
        }
    }

    /// Produce the next fragment of an item's description and whether
    /// further pages remain.
    pub fn produce_description(&mut self, id: ItemId) -> (String, bool) {
        match self.items.get_mut(&id) {
            Some(item) => {
                let text = item.description.produce();
                (text, item.description.pages_remaining())
            }
            None => ("You see nothing special.".to_string(), false),
        }
    }

    /// Collect every item reachable from `root` under each of its aliases.
    ///
    /// A breadth-first walk: the root's direct contents come before anything
    /// nested, so room-level matches are preferred on alias ties. Descent
    /// into an item's contents is gated by its visibility flags — a closed
    /// container hides what it holds. Invisible items are still collected;
    /// filtering them is the disambiguator's job, not the graph's.
    pub fn accessible(&self, root: ItemId) -> AccessMap {
        let mut map: AccessMap = HashMap::new();
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            let Some(item) = self.items.get(&id) else {
                continue;
            };
            for alias in item.aliases() {
                let ids = map.entry(alias.clone()).or_default();
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            let enumerable = item.items_visible_from_self
                && (id == root || item.items_visible_from_room);
            if enumerable {
                queue.extend(item.contents.iter().copied());
            }
        }
        map
    }

    /// Direct children of `container` answering to `phrase`.
    pub fn contents_named(&self, container: ItemId, phrase: &str) -> Vec<ItemId> {
        self.items
            .get(&container)
            .map(|c| {
                c.contents
                    .iter()
                    .copied()
                    .filter(|id| {
                        self.items
                            .get(id)
                            .is_some_and(|i| i.answers_to(phrase))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Start recording property changes on every item, present and future.
    pub fn enable_recording(&mut self) {
        self.recording = true;
        for item in self.items.values_mut() {
            item.set_recording(true);
        }
    }

    /// A snapshot of every item that changed since recording was enabled.
    pub fn snapshot(&self) -> WorldSnapshot {
        let mut items: Vec<ItemSnapshot> = self
            .items
            .values()
            .filter_map(ItemSnapshot::of)
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        WorldSnapshot { items }
    }
}

impl Default for GameWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with(configs: Vec<ItemConfig>) -> (GameWorld, Vec<ItemId>) {
        let mut world = GameWorld::new();
        let ids = configs
            .into_iter()
            .map(|c| world.create(c).unwrap())
            .collect();
        (world, ids)
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut world = GameWorld::new();
        world.create(ItemConfig::new("Lamp")).unwrap();
        let result = world.create(ItemConfig::new("lamp"));
        assert!(matches!(result, Err(AuthoringError::DuplicateName(_))));
    }

    #[test]
    fn place_and_remove_agree_on_both_sides() {
        let (mut world, ids) = world_with(vec![
            ItemConfig::new("chest").container(10),
            ItemConfig::new("coin").holdable().with_size(1),
        ]);
        let (chest, coin) = (ids[0], ids[1]);

        assert!(world.place(coin, chest));
        assert_eq!(world.item(coin).unwrap().container(), Some(chest));
        assert!(world.item(chest).unwrap().contents().contains(&coin));
        assert_eq!(world.accessible(chest).get("coin"), Some(&vec![coin]));

        assert!(world.remove(chest, coin));
        assert_eq!(world.item(coin).unwrap().container(), None);
        assert!(!world.item(chest).unwrap().contents().contains(&coin));
        // Every alias entry is gone from the container's view at once.
        assert!(world.accessible(chest).get("coin").is_none());
    }

    #[test]
    fn free_capacity_tracks_contents() {
        let (mut world, ids) = world_with(vec![
            ItemConfig::new("chest").container(5),
            ItemConfig::new("cushion").holdable().with_size(2),
        ]);
        let (chest, cushion) = (ids[0], ids[1]);

        assert_eq!(world.item(chest).unwrap().free, 5);
        world.place(cushion, chest);
        assert_eq!(world.item(chest).unwrap().free, 3);
        world.remove(chest, cushion);
        assert_eq!(world.item(chest).unwrap().free, 5);
    }

    #[test]
    fn overfull_container_refuses() {
        let (mut world, ids) = world_with(vec![
            ItemConfig::new("pouch").container(1),
            ItemConfig::new("boulder").holdable().with_size(10),
        ]);
        assert!(!world.place(ids[1], ids[0]));
        assert_eq!(world.item(ids[1]).unwrap().container(), None);
    }

    #[test]
    fn replacing_is_a_noop() {
        let (mut world, ids) = world_with(vec![
            ItemConfig::new("table").container(-1),
            ItemConfig::new("mug").holdable().with_size(1),
        ]);
        world.place(ids[1], ids[0]);
        assert!(world.place(ids[1], ids[0]));
        assert_eq!(world.item(ids[0]).unwrap().contents().len(), 1);
    }

    #[test]
    fn place_moves_between_containers() {
        let (mut world, ids) = world_with(vec![
            ItemConfig::new("shelf").container(10),
            ItemConfig::new("crate").container(10),
            ItemConfig::new("jar").holdable().with_size(2),
        ]);
        let (shelf, crate_, jar) = (ids[0], ids[1], ids[2]);

        world.place(jar, shelf);
        world.place(jar, crate_);
        assert_eq!(world.item(jar).unwrap().container(), Some(crate_));
        assert!(!world.item(shelf).unwrap().contents().contains(&jar));
        assert_eq!(world.item(shelf).unwrap().free, 10);
        assert_eq!(world.item(crate_).unwrap().free, 8);
    }

    #[test]
    fn accessible_finds_aliases_at_depth() {
        let (mut world, ids) = world_with(vec![
            ItemConfig::new("parlor"),
            ItemConfig::new("oak table"),
            ItemConfig::new("pewter mug").holdable(),
        ]);
        let (parlor, table, mug) = (ids[0], ids[1], ids[2]);
        world.place(table, parlor);
        world.place(mug, table);

        let access = world.accessible(parlor);
        assert_eq!(access.get("mug"), Some(&vec![mug]));
        assert_eq!(access.get("pewter mug"), Some(&vec![mug]));
        assert_eq!(access.get("table"), Some(&vec![table]));
    }

    #[test]
    fn closed_container_hides_contents() {
        let (mut world, ids) = world_with(vec![
            ItemConfig::new("cellar"),
            ItemConfig::new("locker").container(5).closed(),
            ItemConfig::new("gem").holdable().with_size(1),
        ]);
        let (cellar, locker, gem) = (ids[0], ids[1], ids[2]);
        world.place(locker, cellar);
        world.place(gem, locker);

        let access = world.accessible(cellar);
        assert!(access.get("gem").is_none());
        assert!(access.get("locker").is_some());
    }

    #[test]
    fn room_level_matches_come_first() {
        let (mut world, ids) = world_with(vec![
            ItemConfig::new("study"),
            ItemConfig::new("desk"),
            ItemConfig::new("red ball").holdable(),
            ItemConfig::new("blue ball").holdable(),
        ]);
        let (study, desk, red, blue) = (ids[0], ids[1], ids[2], ids[3]);
        world.place(desk, study);
        world.place(blue, desk);
        world.place(red, study);

        let access = world.accessible(study);
        // The room-level red ball precedes the nested blue one.
        assert_eq!(access.get("ball"), Some(&vec![red, blue]));
    }

    #[test]
    fn consume_keeps_name_resolvable() {
        let (mut world, ids) = world_with(vec![
            ItemConfig::new("hall"),
            ItemConfig::new("biscuit").holdable(),
        ]);
        let (hall, biscuit) = (ids[0], ids[1]);
        world.place(biscuit, hall);
        world.consume(biscuit);

        assert_eq!(world.item(biscuit).unwrap().container(), Some(world.limbo()));
        assert!(world.accessible(hall).get("biscuit").is_none());
        assert_eq!(world.find_by_name("biscuit"), Some(biscuit));
        assert_eq!(world.vocab().lookup("biscuit"), &[biscuit]);
    }

    #[test]
    fn contents_named_matches_direct_children_by_alias() {
        let (mut world, ids) = world_with(vec![
            ItemConfig::new("bench"),
            ItemConfig::new("red ball").holdable(),
            ItemConfig::new("blue ball").holdable(),
        ]);
        let (bench, red, blue) = (ids[0], ids[1], ids[2]);
        world.place(red, bench);
        world.place(blue, bench);

        assert_eq!(world.contents_named(bench, "ball"), vec![red, blue]);
        assert_eq!(world.contents_named(bench, "red"), vec![red]);
        assert!(world.contents_named(bench, "lamp").is_empty());
    }

    #[test]
    fn room_of_walks_to_the_top() {
        let (mut world, ids) = world_with(vec![
            ItemConfig::new("attic"),
            ItemConfig::new("box").container(-1),
            ItemConfig::new("string").holdable(),
        ]);
        world.place(ids[1], ids[0]);
        world.place(ids[2], ids[1]);
        assert_eq!(world.room_of(ids[2]), ids[0]);
    }

    #[test]
    fn opening_reveals_contents() {
        let (mut world, ids) = world_with(vec![
            ItemConfig::new("den"),
            ItemConfig::new("chest")
                .container(5)
                .closed()
                .with_door(crate::item::DoorConfig::default()),
            ItemConfig::new("locket").holdable().with_size(1),
        ]);
        let (den, chest, locket) = (ids[0], ids[1], ids[2]);
        world.place(chest, den);
        world.place(locket, chest);

        assert!(world.accessible(den).get("locket").is_none());
        world.set_open(chest, true);
        assert!(world.accessible(den).get("locket").is_some());
        world.set_open(chest, false);
        assert!(world.accessible(den).get("locket").is_none());
    }

    #[test]
    fn snapshot_contains_only_altered() {
        let (mut world, ids) = world_with(vec![
            ItemConfig::new("shrine"),
            ItemConfig::new("idol"),
            ItemConfig::new("candle"),
        ]);
        world.enable_recording();
        assert!(world.snapshot().is_empty());
        world.item_mut(ids[1]).unwrap().set_visible(false);

        let snapshot = world.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].name, "idol");
        assert_eq!(
            snapshot.items[0].fields.get("visible"),
            Some(&serde_json::json!(false))
        );
    }
}
