use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use glam::DVec2;
use walkabout_common::{Image, Rect, Surface, SurfaceError};

use crate::animation::Animation;

/// Errors from sprite configuration and drawing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpriteError {
    #[error("unknown animation: {0}")]
    UnknownAnimation(String),
    #[error("animation {0:?} needs at least one frame")]
    NoFrames(String),
    #[error("animation {name:?}: seconds per frame must be positive, got {value}")]
    InvalidFrameTime { name: String, value: f64 },
    #[error("scale factor must be positive, got {0}")]
    InvalidScale(f64),
    #[error("base frame {0:?} has no area")]
    EmptyFrame(Rect),
    #[error("placeholder sheet of {width}x{height} pixels is too large")]
    SheetTooLarge { width: u64, height: u64 },
    #[error("draw failed: {0}")]
    Surface(#[from] SurfaceError),
}

/// An animated character drawn from a shared sprite sheet.
///
/// Frames advance on wall-clock time passed to [`Sprite::advance`], so the
/// animation speed does not depend on how often the caller ticks.
#[derive(Debug, Clone)]
pub struct Sprite {
    sheet: Arc<Image>,
    base: Rect,
    scale: f64,
    animations: BTreeMap<String, Animation>,
    current: Option<String>,
    frame: u32,
    last_frame_change: Duration,
}

impl Sprite {
    /// Create a sprite whose frames are `base.w` x `base.h` and whose idle
    /// look is the `base` rect itself.
    pub fn new(sheet: Arc<Image>, base: Rect, scale: f64) -> Result<Self, SpriteError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(SpriteError::InvalidScale(scale));
        }
        if base.is_empty() {
            return Err(SpriteError::EmptyFrame(base));
        }
        Ok(Self {
            sheet,
            base,
            scale,
            animations: BTreeMap::new(),
            current: None,
            frame: 0,
            last_frame_change: Duration::ZERO,
        })
    }

    /// Register (or redefine) a strip of `frame_count` frames starting at
    /// `(origin_x, origin_y)` on the sheet.
    pub fn add_animation(
        &mut self,
        name: impl Into<String>,
        frame_count: u32,
        origin_x: f64,
        origin_y: f64,
        seconds_per_frame: f64,
    ) -> Result<(), SpriteError> {
        let name = name.into();
        if frame_count == 0 {
            return Err(SpriteError::NoFrames(name));
        }
        let frame_duration = Duration::try_from_secs_f64(seconds_per_frame)
            .ok()
            .filter(|d| !d.is_zero())
            .ok_or_else(|| SpriteError::InvalidFrameTime {
                name: name.clone(),
                value: seconds_per_frame,
            })?;

        let animation = Animation {
            frame_count,
            origin: DVec2::new(origin_x, origin_y),
            frame_duration,
        };
        tracing::debug!(%name, frame_count, ?frame_duration, "animation registered");
        self.animations.insert(name, animation);
        self.wrap_frame();
        Ok(())
    }

    /// Make `name` the active animation.
    ///
    /// The frame index carries over (wrapped into the new strip) so switching
    /// direction mid-stride does not restart the cycle.
    pub fn set_animation(&mut self, name: &str) -> Result<(), SpriteError> {
        if !self.animations.contains_key(name) {
            return Err(SpriteError::UnknownAnimation(name.to_string()));
        }
        if self.current.as_deref() != Some(name) {
            tracing::debug!(from = ?self.current, to = name, "animation switched");
            self.current = Some(name.to_string());
            self.wrap_frame();
        }
        Ok(())
    }

    /// Go back to the first frame and restart frame timing at `now`.
    pub fn reset(&mut self, now: Duration) {
        self.frame = 0;
        self.last_frame_change = now;
    }

    /// Step to the next frame if the active frame has been shown for at
    /// least its duration. Returns whether the frame changed.
    pub fn advance(&mut self, now: Duration) -> bool {
        let Some(animation) = self.active() else {
            return false;
        };
        let frame_count = animation.frame_count;
        if now.saturating_sub(self.last_frame_change) < animation.frame_duration {
            return false;
        }
        self.frame = (self.frame + 1) % frame_count;
        self.last_frame_change = now;
        true
    }

    /// Draw the current frame with its top-left corner at `(screen_x, screen_y)`.
    pub fn draw<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        screen_x: f64,
        screen_y: f64,
    ) -> Result<(), SpriteError> {
        let dst = Rect::at(DVec2::new(screen_x, screen_y), self.draw_size());
        surface.blit(&self.sheet, self.source_rect(), dst)?;
        Ok(())
    }

    /// Draw the current frame centered on `center`.
    pub fn draw_centered<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        center: DVec2,
    ) -> Result<(), SpriteError> {
        let top_left = center - self.draw_size() / 2.0;
        self.draw(surface, top_left.x, top_left.y)
    }

    /// Sheet rectangle for the frame that would be drawn now.
    pub fn source_rect(&self) -> Rect {
        match self.active() {
            Some(animation) => animation.frame_rect(self.frame, self.base.size()),
            None => self.base,
        }
    }

    /// On-screen size of one frame after scaling.
    pub fn draw_size(&self) -> DVec2 {
        self.base.size() * self.scale
    }

    pub fn current_animation(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn frame_index(&self) -> u32 {
        self.frame
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn has_animation(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    pub fn sheet(&self) -> &Arc<Image> {
        &self.sheet
    }

    fn active(&self) -> Option<&Animation> {
        self.current
            .as_deref()
            .and_then(|name| self.animations.get(name))
    }

    fn wrap_frame(&mut self) {
        if let Some(count) = self.active().map(|a| a.frame_count) {
            self.frame %= count;
        }
    }
}
