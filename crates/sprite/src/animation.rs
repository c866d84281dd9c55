use std::time::Duration;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use walkabout_common::Rect;

/// A horizontal strip of equally sized frames on a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub frame_count: u32,
    /// Top-left corner of the first frame on the sheet.
    pub origin: DVec2,
    pub frame_duration: Duration,
}

impl Animation {
    /// Source rectangle of frame `index` for frames of size `frame_size`.
    pub fn frame_rect(&self, index: u32, frame_size: DVec2) -> Rect {
        Rect::new(
            self.origin.x + index as f64 * frame_size.x,
            self.origin.y,
            frame_size.x,
            frame_size.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_horizontally_adjacent() {
        let anim = Animation {
            frame_count: 4,
            origin: DVec2::new(288.0, 39.0),
            frame_duration: Duration::from_millis(150),
        };
        let size = DVec2::new(16.0, 25.0);
        assert_eq!(anim.frame_rect(0, size), Rect::new(288.0, 39.0, 16.0, 25.0));
        assert_eq!(anim.frame_rect(3, size), Rect::new(336.0, 39.0, 16.0, 25.0));
    }
}
