use std::fmt;

use glam::DVec2;
use walkabout_kernel::World;
use walkabout_scheduler::Game;

/// Game inspector for developer tooling.
///
/// Read-only queries against a [`Game`] for debugging and headless runs.
pub struct GameInspector;

impl GameInspector {
    /// Produce a summary of the game state.
    pub fn summary(game: &Game) -> GameSummary {
        let viewport = game.viewport();
        let stats = game.stats();
        GameSummary {
            tick: stats.ticks,
            player: game.world().player(),
            item_count: game.world().item_count(),
            visible_items: game
                .world()
                .visible_items(game.screen_rect(), game.camera_offset())
                .count(),
            animation: game.player().current_animation().map(str::to_owned),
            frame_index: game.player().frame_index(),
            viewport: (viewport.width, viewport.height),
            draw_failures: stats.draw_failures,
            state_hash: game.world().state_hash(),
        }
    }

    /// Where every item lands on screen for the given camera offset.
    pub fn items(world: &World, viewport: (u32, u32), camera_offset: DVec2) -> Vec<ItemInfo> {
        let screen = walkabout_common::Rect::new(0.0, 0.0, viewport.0 as f64, viewport.1 as f64);
        world
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| ItemInfo {
                index,
                world: item.position(),
                screen: world.screen_position(item, camera_offset),
                visible: world.item_rect(item, camera_offset).intersects(&screen),
            })
            .collect()
    }
}

/// Summary of game state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub tick: u64,
    pub player: DVec2,
    pub item_count: usize,
    pub visible_items: usize,
    pub animation: Option<String>,
    pub frame_index: u32,
    pub viewport: (u32, u32),
    pub draw_failures: u64,
    pub state_hash: u64,
}

impl fmt::Display for GameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Game: tick={} player=({:.2}, {:.2}) items={} visible={} animation={} frame={} viewport={}x{} draw_failures={} hash={:016x}",
            self.tick,
            self.player.x,
            self.player.y,
            self.item_count,
            self.visible_items,
            self.animation.as_deref().unwrap_or("-"),
            self.frame_index,
            self.viewport.0,
            self.viewport.1,
            self.draw_failures,
            self.state_hash,
        )
    }
}

/// Placement of a single item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInfo {
    pub index: usize,
    pub world: DVec2,
    /// Top-left corner on screen.
    pub screen: DVec2,
    pub visible: bool,
}

impl fmt::Display for ItemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Item [{}] world=({:.2}, {:.2}) screen=({:.2}, {:.2}){}",
            self.index,
            self.world.x,
            self.world.y,
            self.screen.x,
            self.screen.y,
            if self.visible { "" } else { " offscreen" },
        )
    }
}
