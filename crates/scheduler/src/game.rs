use std::time::Duration;

use glam::DVec2;
use walkabout_common::{Rect, Surface};
use walkabout_input::{IDLE_ANIMATION, InputSampler, Movement, MovementPolicy};
use walkabout_kernel::World;
use walkabout_sprite::{Sprite, SpriteError};

use crate::config::{ConfigError, DemoConfig, Viewport, required_animations};

/// Errors from assembling a [`Game`].
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("sprite has no {0:?} animation")]
    MissingAnimation(String),
    #[error(transparent)]
    Sprite(#[from] SpriteError),
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub movement: Movement,
    pub animation: &'static str,
    pub frame_index: u32,
    /// Set when the sprite could not be drawn this tick.
    pub draw_error: Option<SpriteError>,
}

/// Running totals across ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickStats {
    pub ticks: u64,
    pub draw_failures: u64,
    pub resizes: u64,
}

/// The whole simulation: world, player sprite and movement policy.
///
/// [`Game::run_tick`] is the only thing that advances it. It is host
/// independent; a driver decides when to call it and with what timestamp.
#[derive(Debug)]
pub struct Game {
    world: World,
    player: Sprite,
    policy: MovementPolicy,
    viewport: Viewport,
    pending_resize: Option<Viewport>,
    stats: TickStats,
}

impl Game {
    /// Assemble a game. The sprite must carry the idle animation and one walk
    /// animation per facing; it starts idle.
    pub fn new(
        world: World,
        mut player: Sprite,
        policy: MovementPolicy,
        viewport: Viewport,
    ) -> Result<Self, FrameError> {
        if let Some(missing) = required_animations().find(|name| !player.has_animation(name)) {
            return Err(FrameError::MissingAnimation(missing.to_string()));
        }
        player.set_animation(IDLE_ANIMATION)?;
        Ok(Self {
            world,
            player,
            policy,
            viewport,
            pending_resize: None,
            stats: TickStats::default(),
        })
    }

    /// Build the world and player sprite a config describes.
    pub fn from_config(config: &DemoConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sheet = config.sprite.load_sheet()?;
        let player = config.sprite.build(sheet)?;
        let game = Self::new(
            config.build_world(),
            player,
            config.movement.clone(),
            config.viewport,
        )
        .map_err(|e| match e {
            FrameError::Sprite(e) => ConfigError::Sprite(e),
            other => ConfigError::Invalid(other.to_string()),
        })?;
        tracing::info!(
            items = game.world.item_count(),
            viewport = ?(config.viewport.width, config.viewport.height),
            "game ready"
        );
        Ok(game)
    }

    /// Size the surface to the viewport and switch to crisp scaling. Call once
    /// before the first tick.
    pub fn prepare_surface<S: Surface + ?Sized>(&self, surface: &mut S) {
        if surface.size() != (self.viewport.width, self.viewport.height) {
            surface.resize(self.viewport.width, self.viewport.height);
        }
        surface.set_smoothing(false);
    }

    /// Queue a viewport resize. It is applied at the start of the next tick,
    /// before anything is drawn; later requests replace earlier ones.
    pub fn request_resize(&mut self, width: u32, height: u32) {
        self.pending_resize = Some(Viewport { width, height });
    }

    /// Screen position the player is drawn at: the viewport center.
    pub fn camera_offset(&self) -> DVec2 {
        DVec2::new(self.viewport.width as f64, self.viewport.height as f64) / 2.0
    }

    /// Viewport rectangle in screen space.
    pub fn screen_rect(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.viewport.width as f64,
            self.viewport.height as f64,
        )
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player(&self) -> &Sprite {
        &self.player
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn stats(&self) -> TickStats {
        self.stats
    }

    /// Run one tick: sample input, move, clear, redraw the world, then
    /// advance and draw the player sprite.
    ///
    /// `now` is wall-clock time since the session started. A sprite draw
    /// failure is reported and logged; the world state still advances.
    pub fn run_tick<S, I>(&mut self, now: Duration, input: &I, surface: &mut S) -> TickReport
    where
        S: Surface + ?Sized,
        I: InputSampler + ?Sized,
    {
        let tick = self.stats.ticks;
        let _span = tracing::info_span!("tick", tick).entered();

        if let Some(size) = self.pending_resize.take() {
            self.apply_resize(size, surface);
        }

        let movement = self.policy.sample(input);
        self.world.transform(movement.delta.x, movement.delta.y);

        let animation = movement.animation();
        let mut draw_error = self.player.set_animation(animation).err();

        let offset = self.camera_offset();
        surface.clear();
        self.world.draw_all(surface, offset);

        self.player.advance(now);
        if let Err(e) = self.player.draw_centered(surface, offset) {
            draw_error = Some(e);
        }

        if let Some(e) = &draw_error {
            self.stats.draw_failures += 1;
            tracing::warn!(error = %e, "player sprite not drawn this tick");
        }
        self.stats.ticks += 1;

        tracing::trace!(
            player = ?self.world.player(),
            animation,
            frame = self.player.frame_index(),
            "tick complete"
        );

        TickReport {
            tick,
            movement,
            animation,
            frame_index: self.player.frame_index(),
            draw_error,
        }
    }

    fn apply_resize<S: Surface + ?Sized>(&mut self, size: Viewport, surface: &mut S) {
        if size.width == 0 || size.height == 0 {
            tracing::debug!(?size, "ignoring resize to empty viewport");
            return;
        }
        surface.resize(size.width, size.height);
        surface.set_smoothing(false);
        self.viewport = size;
        self.stats.resizes += 1;
        tracing::debug!(?size, "viewport resized");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use walkabout_common::{Image, Rgba};
    use walkabout_input::{Facing, InputState};
    use walkabout_kernel::{ITEM_SIZE, Item};
    use walkabout_render::{DrawCommand, RecordingSurface, SoftwareCanvas};

    use crate::config::SpriteConfig;

    fn game_with(items: &[(f64, f64)]) -> Game {
        let cfg = DemoConfig {
            items: items.iter().map(|&(x, y)| Item::new(x, y)).collect(),
            ..DemoConfig::default()
        };
        Game::from_config(&cfg).unwrap()
    }

    fn held(keys: &[&str]) -> InputState {
        let mut input = InputState::new();
        for k in keys {
            input.press(*k);
        }
        input
    }

    #[test]
    fn starts_idle() {
        let game = game_with(&[]);
        assert_eq!(game.player().current_animation(), Some(IDLE_ANIMATION));
    }

    #[test]
    fn missing_walk_animation_fails_fast() {
        let mut cfg = SpriteConfig::default();
        let sheet = cfg.load_sheet().unwrap();
        cfg.animations.remove("walk_west");
        let sprite = cfg.build(sheet).unwrap();
        let err = Game::new(
            World::new(),
            sprite,
            MovementPolicy::default(),
            Viewport::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FrameError::MissingAnimation(name) if name == "walk_west"));
    }

    #[test]
    fn tick_orders_clear_world_sprite() {
        let mut game = game_with(&[(0.0, 0.0), (10.0, 10.0)]);
        let mut surface = RecordingSurface::new(800, 600);
        game.run_tick(Duration::ZERO, &held(&[]), &mut surface);

        let cmds = surface.commands();
        assert_eq!(cmds.len(), 4);
        assert_eq!(cmds[0], DrawCommand::Clear);
        assert!(matches!(cmds[1], DrawCommand::FillRect { .. }));
        assert!(matches!(cmds[2], DrawCommand::FillRect { .. }));
        assert!(matches!(cmds[3], DrawCommand::Blit { .. }));
    }

    #[test]
    fn right_moves_east_and_shifts_items_left() {
        let mut game = game_with(&[(0.0, 0.0)]);
        let mut surface = RecordingSurface::new(800, 600);
        let input = held(&["d"]);

        let report = game.run_tick(Duration::ZERO, &input, &mut surface);
        assert_eq!(report.movement.delta, DVec2::new(1.0, 0.0));
        assert_eq!(report.animation, Facing::East.walk_animation());
        assert_eq!(game.player().current_animation(), Some("walk_east"));
        let first = surface.filled_rects()[0];
        surface.take_commands();

        game.run_tick(Duration::from_millis(16), &input, &mut surface);
        let second = surface.filled_rects()[0];
        assert_eq!(second.x, first.x - 1.0);
        assert_eq!(second.y, first.y);
    }

    #[test]
    fn item_screen_rect_uses_camera_offset() {
        let mut game = game_with(&[(100.0, 100.0)]);
        let mut surface = RecordingSurface::new(800, 600);
        game.run_tick(Duration::ZERO, &held(&[]), &mut surface);
        assert_eq!(
            surface.filled_rects()[0],
            Rect::new(500.0, 400.0, ITEM_SIZE.x, ITEM_SIZE.y)
        );
    }

    #[test]
    fn opposite_keys_go_idle() {
        let mut game = game_with(&[]);
        let mut surface = RecordingSurface::new(800, 600);
        game.run_tick(Duration::ZERO, &held(&["s"]), &mut surface);
        assert_eq!(game.player().current_animation(), Some("walk_south"));

        let report = game.run_tick(Duration::ZERO, &held(&["w", "s"]), &mut surface);
        assert_eq!(report.movement.delta, DVec2::ZERO);
        assert_eq!(game.player().current_animation(), Some(IDLE_ANIMATION));
        assert_eq!(game.world().player(), DVec2::new(0.0, 1.0));
    }

    #[test]
    fn player_drawn_centered() {
        let mut game = game_with(&[]);
        let mut surface = RecordingSurface::new(800, 600);
        game.run_tick(Duration::ZERO, &held(&[]), &mut surface);
        let (_, dst) = surface.blits()[0];
        assert_eq!(dst, Rect::new(400.0 - 24.0, 300.0 - 37.5, 48.0, 75.0));
    }

    #[test]
    fn draw_failure_does_not_stop_ticks() {
        let cfg = DemoConfig::default();
        let sheet = Arc::new(Image::filled(0, 0, Rgba::WHITE));
        let player = cfg.sprite.build(sheet).unwrap();
        let mut game = Game::new(
            cfg.build_world(),
            player,
            cfg.movement.clone(),
            cfg.viewport,
        )
        .unwrap();
        let mut surface = RecordingSurface::new(800, 600);

        let input = held(&["d"]);
        for i in 0..3 {
            let report = game.run_tick(Duration::from_millis(i * 16), &input, &mut surface);
            assert!(report.draw_error.is_some());
        }
        assert_eq!(game.stats().ticks, 3);
        assert_eq!(game.stats().draw_failures, 3);
        assert_eq!(game.world().player(), DVec2::new(3.0, 0.0));
        // The world is still drawn.
        assert_eq!(surface.filled_rects().len(), 3 * cfg.items.len());
    }

    #[test]
    fn resize_is_applied_at_next_tick() {
        let mut game = game_with(&[]);
        let mut surface = RecordingSurface::new(800, 600);
        game.prepare_surface(&mut surface);
        surface.take_commands();

        game.request_resize(1024, 768);
        assert_eq!(game.viewport(), Viewport::default());
        game.run_tick(Duration::ZERO, &held(&[]), &mut surface);

        assert_eq!(
            &surface.commands()[..3],
            &[
                DrawCommand::Resize {
                    width: 1024,
                    height: 768
                },
                DrawCommand::SetSmoothing(false),
                DrawCommand::Clear,
            ]
        );
        assert!(!surface.smoothing());
        assert_eq!(game.camera_offset(), DVec2::new(512.0, 384.0));
    }

    #[test]
    fn resize_keeps_canvas_pixels_and_disables_smoothing() {
        let mut game = game_with(&[]);
        let mut canvas = SoftwareCanvas::new(800, 600);
        game.prepare_surface(&mut canvas);
        game.run_tick(Duration::ZERO, &held(&[]), &mut canvas);
        let before = canvas.clone();

        // Resize only: pixels must survive until the next clear.
        game.request_resize(1000, 700);
        if let Some(size) = game.pending_resize.take() {
            game.apply_resize(size, &mut canvas);
        }
        assert!(!canvas.smoothing());
        for y in (0..600).step_by(7) {
            for x in (0..800).step_by(7) {
                assert_eq!(canvas.pixel(x, y), before.pixel(x, y));
            }
        }
    }

    #[test]
    fn empty_resize_is_ignored() {
        let mut game = game_with(&[]);
        let mut surface = RecordingSurface::new(800, 600);
        game.request_resize(0, 600);
        game.run_tick(Duration::ZERO, &held(&[]), &mut surface);
        assert_eq!(game.viewport(), Viewport::default());
        assert_eq!(game.stats().resizes, 0);
    }
}
