use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::action::{Action, Bindings};
use crate::state::InputSampler;

/// Animation shown while the player stands still.
pub const IDLE_ANIMATION: &str = "idle";

/// Compass direction the player sprite faces while walking.
///
/// Screen convention: y grows downward, so south is +y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    North,
    East,
    South,
    West,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::North, Facing::East, Facing::South, Facing::West];

    /// Facing for a movement delta, or `None` when standing still.
    ///
    /// The larger axis wins; on a tie vertical wins over horizontal.
    pub fn from_delta(delta: DVec2) -> Option<Facing> {
        if delta == DVec2::ZERO {
            return None;
        }
        if delta.y != 0.0 && delta.y.abs() >= delta.x.abs() {
            Some(if delta.y > 0.0 {
                Facing::South
            } else {
                Facing::North
            })
        } else if delta.x > 0.0 {
            Some(Facing::East)
        } else {
            Some(Facing::West)
        }
    }

    /// Name of the walk animation for this direction.
    pub fn walk_animation(self) -> &'static str {
        match self {
            Facing::North => "walk_north",
            Facing::East => "walk_east",
            Facing::South => "walk_south",
            Facing::West => "walk_west",
        }
    }
}

/// Movement derived from one tick of input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    pub delta: DVec2,
    pub facing: Option<Facing>,
    pub sprinting: bool,
}

impl Movement {
    pub fn is_idle(&self) -> bool {
        self.facing.is_none()
    }

    /// Animation the player sprite should show for this movement.
    pub fn animation(&self) -> &'static str {
        self.facing.map_or(IDLE_ANIMATION, Facing::walk_animation)
    }
}

/// Turns held keys into a per-tick movement delta.
///
/// Axes are summed independently, so diagonals fall out naturally and opposite
/// keys cancel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementPolicy {
    pub bindings: Bindings,
    /// Distance per tick without the sprint modifier.
    pub speed: f64,
    pub sprint_multiplier: f64,
}

impl Default for MovementPolicy {
    fn default() -> Self {
        Self {
            bindings: Bindings::default(),
            speed: 1.0,
            sprint_multiplier: 1.5,
        }
    }
}

impl MovementPolicy {
    pub fn sample(&self, input: &(impl InputSampler + ?Sized)) -> Movement {
        let active = |action| self.bindings.is_active(action, input);
        let axis = |positive, negative| {
            let pos = if active(positive) { 1.0 } else { 0.0 };
            let neg = if active(negative) { 1.0 } else { 0.0 };
            pos - neg
        };

        let sprinting = active(Action::Sprint);
        let speed = if sprinting {
            self.speed * self.sprint_multiplier
        } else {
            self.speed
        };
        let delta = DVec2::new(
            axis(Action::MoveRight, Action::MoveLeft),
            axis(Action::MoveDown, Action::MoveUp),
        ) * speed;

        let movement = Movement {
            delta,
            facing: Facing::from_delta(delta),
            sprinting,
        };
        tracing::trace!(?movement, "input sampled");
        movement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::InputState;

    fn sample(keys: &[&str]) -> Movement {
        let mut input = InputState::new();
        for k in keys {
            input.press(*k);
        }
        MovementPolicy::default().sample(&input)
    }

    #[test]
    fn right_walks_east() {
        let m = sample(&["d"]);
        assert_eq!(m.delta, DVec2::new(1.0, 0.0));
        assert_eq!(m.facing, Some(Facing::East));
        assert_eq!(m.animation(), "walk_east");
    }

    #[test]
    fn opposite_keys_cancel_to_idle() {
        let m = sample(&["w", "s"]);
        assert_eq!(m.delta, DVec2::ZERO);
        assert!(m.is_idle());
        assert_eq!(m.animation(), IDLE_ANIMATION);

        let m = sample(&["a", "d"]);
        assert_eq!(m.delta, DVec2::ZERO);
        assert!(m.is_idle());
    }

    #[test]
    fn sprint_multiplies_speed() {
        let m = sample(&["ShiftLeft", "d"]);
        assert_eq!(m.delta, DVec2::new(1.5, 0.0));
        assert!(m.sprinting);
        assert!(sample(&["ShiftRight", "d"]).sprinting);
    }

    #[test]
    fn up_is_negative_y_and_faces_north() {
        let m = sample(&["w"]);
        assert_eq!(m.delta, DVec2::new(0.0, -1.0));
        assert_eq!(m.facing, Some(Facing::North));
        assert_eq!(sample(&["s"]).facing, Some(Facing::South));
    }

    #[test]
    fn diagonal_sums_axes_and_prefers_vertical() {
        let m = sample(&["s", "d"]);
        assert_eq!(m.delta, DVec2::new(1.0, 1.0));
        assert_eq!(m.facing, Some(Facing::South));

        let m = sample(&["w", "a"]);
        assert_eq!(m.delta, DVec2::new(-1.0, -1.0));
        assert_eq!(m.facing, Some(Facing::North));
    }

    #[test]
    fn vertical_cancel_keeps_horizontal() {
        let m = sample(&["w", "s", "a"]);
        assert_eq!(m.delta, DVec2::new(-1.0, 0.0));
        assert_eq!(m.facing, Some(Facing::West));
    }

    #[test]
    fn dominant_axis_wins() {
        assert_eq!(Facing::from_delta(DVec2::new(3.0, 1.0)), Some(Facing::East));
        assert_eq!(Facing::from_delta(DVec2::new(1.0, -3.0)), Some(Facing::North));
        assert_eq!(Facing::from_delta(DVec2::ZERO), None);
    }
}
