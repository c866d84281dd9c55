use serde::{Deserialize, Serialize};

use crate::state::{InputSampler, Key};

/// A logical control the movement policy understands.
///
/// The policy consumes actions, never raw key names; bindings sit between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    /// Modifier that multiplies movement speed while held.
    Sprint,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveLeft,
        Action::MoveRight,
        Action::Sprint,
    ];
}

/// Keys bound to each action. Any bound key being held activates the action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bindings {
    pub move_up: Vec<Key>,
    pub move_down: Vec<Key>,
    pub move_left: Vec<Key>,
    pub move_right: Vec<Key>,
    pub sprint: Vec<Key>,
}

impl Default for Bindings {
    fn default() -> Self {
        Self {
            move_up: vec![Key::new("w"), Key::new("ArrowUp")],
            move_down: vec![Key::new("s"), Key::new("ArrowDown")],
            move_left: vec![Key::new("a"), Key::new("ArrowLeft")],
            move_right: vec![Key::new("d"), Key::new("ArrowRight")],
            sprint: vec![Key::new("ShiftLeft"), Key::new("ShiftRight")],
        }
    }
}

impl Bindings {
    pub fn keys(&self, action: Action) -> &[Key] {
        match action {
            Action::MoveUp => &self.move_up,
            Action::MoveDown => &self.move_down,
            Action::MoveLeft => &self.move_left,
            Action::MoveRight => &self.move_right,
            Action::Sprint => &self.sprint,
        }
    }

    /// True when any key bound to `action` is held.
    pub fn is_active(&self, action: Action, input: &(impl InputSampler + ?Sized)) -> bool {
        self.keys(action).iter().any(|key| input.is_held(key))
    }

    /// The action a key is bound to, if any.
    pub fn action_for(&self, key: &Key) -> Option<Action> {
        Action::ALL
            .into_iter()
            .find(|action| self.keys(*action).contains(key))
    }

    /// Actions without any bound key.
    pub fn unbound(&self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|action| self.keys(*action).is_empty())
            .collect()
    }
}
