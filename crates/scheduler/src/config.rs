use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use walkabout_common::{Image, Rect, Rgba};
use walkabout_input::{Facing, IDLE_ANIMATION, MovementPolicy};
use walkabout_kernel::{Item, World};
use walkabout_render::image_file::{self, ImageFileError};
use walkabout_sprite::{Sprite, SpriteError, StripSpec, placeholder_sheet};

use crate::driver::FixedRate;

/// Errors from loading or validating a [`DemoConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("sprite: {0}")]
    Sprite(#[from] SpriteError),
    #[error("sprite sheet: {0}")]
    Sheet(#[from] ImageFileError),
}

/// Logical viewport size. The player is drawn at its center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// One animation strip as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub frames: u32,
    pub origin_x: f64,
    pub origin_y: f64,
    pub seconds_per_frame: f64,
}

/// The player sprite: sheet, base frame, scale and its animation strips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    /// Binary PPM sheet. Without one a placeholder sheet is generated.
    pub sheet: Option<PathBuf>,
    /// Sheet color treated as transparent.
    pub color_key: Option<Rgba>,
    pub base: Rect,
    pub scale: f64,
    pub animations: BTreeMap<String, AnimationConfig>,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        let strip = |row: f64, frames, seconds_per_frame| AnimationConfig {
            frames,
            origin_x: 0.0,
            origin_y: row * 25.0,
            seconds_per_frame,
        };
        let animations = BTreeMap::from([
            (IDLE_ANIMATION.to_string(), strip(0.0, 2, 0.5)),
            (Facing::South.walk_animation().to_string(), strip(1.0, 4, 0.15)),
            (Facing::North.walk_animation().to_string(), strip(2.0, 4, 0.15)),
            (Facing::East.walk_animation().to_string(), strip(3.0, 4, 0.15)),
            (Facing::West.walk_animation().to_string(), strip(4.0, 4, 0.15)),
        ]);
        Self {
            sheet: None,
            color_key: Some(Rgba::opaque(255, 0, 255)),
            base: Rect::new(0.0, 0.0, 16.0, 25.0),
            scale: 3.0,
            animations,
        }
    }
}

impl SpriteConfig {
    /// Load the configured sheet, or generate a placeholder covering every strip.
    pub fn load_sheet(&self) -> Result<Arc<Image>, ConfigError> {
        let image = match &self.sheet {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading sprite sheet");
                image_file::load_image(path, self.color_key)?
            }
            None => {
                let strips: Vec<StripSpec> = self
                    .animations
                    .values()
                    .map(|a| StripSpec {
                        origin_x: a.origin_x.max(0.0) as u32,
                        origin_y: a.origin_y.max(0.0) as u32,
                        frame_count: a.frames,
                    })
                    .collect();
                placeholder_sheet(self.base.w as u32, self.base.h as u32, &strips)?
            }
        };
        Ok(Arc::new(image))
    }

    /// Build the sprite and register every animation.
    pub fn build(&self, sheet: Arc<Image>) -> Result<Sprite, SpriteError> {
        let mut sprite = Sprite::new(sheet, self.base, self.scale)?;
        for (name, a) in &self.animations {
            sprite.add_animation(
                name.as_str(),
                a.frames,
                a.origin_x,
                a.origin_y,
                a.seconds_per_frame,
            )?;
        }
        Ok(sprite)
    }
}

/// Everything needed to start a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Target ticks per second.
    pub tick_rate_hz: f64,
    /// Ticks run back to back after a stall before the schedule resyncs.
    pub max_catch_up_ticks: u32,
    pub viewport: Viewport,
    pub movement: MovementPolicy,
    pub sprite: SpriteConfig,
    pub player_start: DVec2,
    pub items: Vec<Item>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            max_catch_up_ticks: 5,
            viewport: Viewport::default(),
            movement: MovementPolicy::default(),
            sprite: SpriteConfig::default(),
            player_start: DVec2::ZERO,
            items: vec![
                Item::new(100.0, 100.0),
                Item::new(-300.0, 50.0),
                Item::new(400.0, -200.0),
                Item::new(-150.0, -350.0),
            ],
        }
    }
}

impl DemoConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let config: Self = match ext.as_deref() {
            Some("yaml" | "yml") => serde_yaml::from_str(&text)?,
            Some("json") => serde_json::from_str(&text)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        config.validate()?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values the session cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        if FixedRate::from_hz(self.tick_rate_hz, 1).is_none() {
            return invalid(format!(
                "tick_rate_hz must give a positive tick period, got {}",
                self.tick_rate_hz
            ));
        }
        if self.max_catch_up_ticks == 0 {
            return invalid("max_catch_up_ticks must be at least 1".into());
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return invalid(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            ));
        }
        let m = &self.movement;
        if !(m.speed.is_finite() && m.speed >= 0.0) {
            return invalid(format!("movement.speed must be >= 0, got {}", m.speed));
        }
        if !(m.sprint_multiplier.is_finite() && m.sprint_multiplier > 0.0) {
            return invalid(format!(
                "movement.sprint_multiplier must be positive, got {}",
                m.sprint_multiplier
            ));
        }
        if let Some(action) = m.bindings.unbound().first() {
            return invalid(format!("no key bound to {action:?}"));
        }
        for name in required_animations() {
            if !self.sprite.animations.contains_key(name) {
                return invalid(format!("sprite is missing animation {name:?}"));
            }
        }
        Ok(())
    }

    /// Tick schedule for `tick_rate_hz` and `max_catch_up_ticks`.
    pub fn fixed_rate(&self) -> Result<FixedRate, ConfigError> {
        FixedRate::from_hz(self.tick_rate_hz, self.max_catch_up_ticks).ok_or_else(|| {
            ConfigError::Invalid(format!("tick_rate_hz {} has no tick period", self.tick_rate_hz))
        })
    }

    /// The world with the player at its start and every configured item.
    pub fn build_world(&self) -> World {
        let mut world = World::with_player_at(self.player_start.x, self.player_start.y);
        for item in &self.items {
            world.add_item(item.x(), item.y());
        }
        world
    }
}

/// Animations the movement policy can ask for.
pub fn required_animations() -> impl Iterator<Item = &'static str> {
    std::iter::once(IDLE_ANIMATION).chain(Facing::ALL.into_iter().map(Facing::walk_animation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        DemoConfig::default().validate().unwrap();
    }

    #[test]
    fn default_sprite_builds_on_placeholder_sheet() {
        let cfg = SpriteConfig::default();
        let sheet = cfg.load_sheet().unwrap();
        let sprite = cfg.build(sheet).unwrap();
        for name in required_animations() {
            assert!(sprite.has_animation(name), "missing {name}");
        }
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = DemoConfig::default();
        cfg.tick_rate_hz = 0.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let mut cfg = DemoConfig::default();
        cfg.tick_rate_hz = f64::NAN;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let mut cfg = DemoConfig::default();
        cfg.sprite.animations.remove("walk_east");
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let mut cfg = DemoConfig::default();
        cfg.movement.bindings.sprint.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_frame_strip_fails_at_build() {
        let mut cfg = SpriteConfig::default();
        cfg.animations.insert(
            "broken".into(),
            AnimationConfig {
                frames: 0,
                origin_x: 0.0,
                origin_y: 0.0,
                seconds_per_frame: 0.1,
            },
        );
        let sheet = cfg.load_sheet().unwrap();
        assert!(matches!(cfg.build(sheet), Err(SpriteError::NoFrames(_))));
    }

    #[test]
    fn yaml_round_trip_keeps_defaults() {
        let cfg = DemoConfig::default();
        let yaml = cfg.to_yaml().unwrap();
        let back: DemoConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn load_partial_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.yaml");
        std::fs::write(
            &path,
            "tick_rate_hz: 30\nviewport: { width: 320, height: 240 }\nmovement: { sprint_multiplier: 2.0 }\n",
        )
        .unwrap();
        let cfg = DemoConfig::load(&path).unwrap();
        assert_eq!(cfg.tick_rate_hz, 30.0);
        assert_eq!(cfg.viewport, Viewport { width: 320, height: 240 });
        assert_eq!(cfg.movement.sprint_multiplier, 2.0);
        assert_eq!(cfg.movement.speed, 1.0);
        assert_eq!(cfg.items, DemoConfig::default().items);
    }

    #[test]
    fn load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.json");
        std::fs::write(&path, r#"{"items": [{"x": 1.0, "y": 2.0}]}"#).unwrap();
        let cfg = DemoConfig::load(&path).unwrap();
        assert_eq!(cfg.items, vec![Item::new(1.0, 2.0)]);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.toml");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(
            DemoConfig::load(&path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn world_uses_start_and_items() {
        let mut cfg = DemoConfig::default();
        cfg.player_start = DVec2::new(5.0, -5.0);
        let world = cfg.build_world();
        assert_eq!(world.player(), DVec2::new(5.0, -5.0));
        assert_eq!(world.item_count(), cfg.items.len());
    }

    #[test]
    fn tiny_tick_rate_is_rejected() {
        let mut cfg = DemoConfig::default();
        cfg.tick_rate_hz = 1e-20;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
        assert!(matches!(cfg.fixed_rate(), Err(ConfigError::Invalid(_))));
        assert!(matches!(
            crate::Game::from_config(&cfg),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn fixed_rate_follows_config() {
        let mut cfg = DemoConfig::default();
        cfg.tick_rate_hz = 50.0;
        let rate = cfg.fixed_rate().unwrap();
        assert_eq!(rate.period(), std::time::Duration::from_millis(20));
    }

    #[test]
    fn oversized_placeholder_strip_is_an_error() {
        let mut cfg = SpriteConfig::default();
        if let Some(idle) = cfg.animations.get_mut("idle") {
            idle.frames = 300_000_000;
        }
        assert!(matches!(
            cfg.load_sheet(),
            Err(ConfigError::Sprite(SpriteError::SheetTooLarge { .. }))
        ));
    }

    #[test]
    fn missing_sheet_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = SpriteConfig::default();
        cfg.sheet = Some(dir.path().join("absent.png"));
        assert!(matches!(cfg.load_sheet(), Err(ConfigError::Sheet(_))));
    }

    #[test]
    fn png_sheet_is_color_keyed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.png");
        let mut sheet = Image::filled(64, 125, Rgba::opaque(255, 0, 255));
        sheet.set(20, 10, Rgba::opaque(1, 2, 3));
        image_file::save_image(&sheet, Rgba::WHITE, &path).unwrap();

        let mut cfg = SpriteConfig::default();
        cfg.sheet = Some(path);
        let loaded = cfg.load_sheet().unwrap();
        assert_eq!(loaded.get(0, 0), Some(Rgba::TRANSPARENT));
        assert_eq!(loaded.get(20, 10), Some(Rgba::opaque(1, 2, 3)));
        cfg.build(loaded).unwrap();
    }
}
