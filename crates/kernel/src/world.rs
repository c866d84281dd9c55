use glam::DVec2;
use serde::{Deserialize, Serialize};
use walkabout_common::{Rect, Rgba, Surface};

/// Size of the rectangle drawn for every item, in logical units.
pub const ITEM_SIZE: DVec2 = DVec2::new(150.0, 100.0);

/// Fill color for items.
pub const ITEM_COLOR: Rgba = Rgba::BLACK;

/// A static element of the world at a fixed world-space position.
///
/// Items are created when added to the world and never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Item {
    x: f64,
    y: f64,
}

impl Item {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// The persistent world: everything that exists with no player activity,
/// plus the player position every draw is anchored to.
///
/// Items keep insertion order so frames are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    player: DVec2,
    items: Vec<Item>,
}

impl World {
    /// Empty world with the player at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty world with the player at a given starting position.
    pub fn with_player_at(player_x: f64, player_y: f64) -> Self {
        Self {
            player: DVec2::new(player_x, player_y),
            items: Vec::new(),
        }
    }

    pub fn player(&self) -> DVec2 {
        self.player
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Append a static item at world-space `(x, y)`.
    pub fn add_item(&mut self, x: f64, y: f64) {
        self.items.push(Item::new(x, y));
        tracing::trace!(x, y, count = self.items.len(), "item added");
    }

    /// Move the player by a delta. The world is unbounded and deltas are not rounded.
    pub fn transform(&mut self, delta_x: f64, delta_y: f64) {
        self.player += DVec2::new(delta_x, delta_y);
    }

    /// Screen position of an item for the current player position.
    ///
    /// `camera_offset` is where the player appears on screen, normally the
    /// viewport center.
    pub fn screen_position(&self, item: &Item, camera_offset: DVec2) -> DVec2 {
        item.position() - self.player + camera_offset
    }

    /// Screen rectangle an item occupies for the current player position.
    pub fn item_rect(&self, item: &Item, camera_offset: DVec2) -> Rect {
        Rect::at(self.screen_position(item, camera_offset), ITEM_SIZE)
    }

    /// Draw every item relative to the player, in insertion order.
    pub fn draw_all<S: Surface + ?Sized>(&self, surface: &mut S, camera_offset: DVec2) {
        for item in &self.items {
            surface.fill_rect(self.item_rect(item, camera_offset), ITEM_COLOR);
        }
        tracing::trace!(items = self.items.len(), "world drawn");
    }

    /// Items whose rectangle overlaps `viewport` (screen-space).
    pub fn visible_items(
        &self,
        viewport: Rect,
        camera_offset: DVec2,
    ) -> impl Iterator<Item = &Item> + '_ {
        self.items
            .iter()
            .filter(move |item| self.item_rect(item, camera_offset).intersects(&viewport))
    }

    /// Deterministic hash of the world state for comparing runs.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.player.x.to_le_bytes());
        mix(&mut h, &self.player.y.to_le_bytes());
        for item in &self.items {
            mix(&mut h, &item.x.to_le_bytes());
            mix(&mut h, &item.y.to_le_bytes());
        }
        h
    }
}
