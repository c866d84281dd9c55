use walkabout_common::{Image, Rect, Rgba, Surface, SurfaceError};

/// One call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    FillRect { rect: Rect, color: Rgba },
    Blit { src: Rect, dst: Rect },
    Resize { width: u32, height: u32 },
    SetSmoothing(bool),
}

/// Surface that keeps the draw calls instead of pixels.
///
/// Blits are validated exactly like a raster surface would, so a bad source
/// rect fails here too and is not recorded.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    smoothing: bool,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            smoothing: true,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands, e.g. one frame at a time.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Rectangles filled since the last drain, in draw order.
    pub fn filled_rects(&self) -> Vec<Rect> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    /// Blits since the last drain, as `(src, dst)` pairs.
    pub fn blits(&self) -> Vec<(Rect, Rect)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Blit { src, dst } => Some((*src, *dst)),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn blit(&mut self, source: &Image, src: Rect, dst: Rect) -> Result<(), SurfaceError> {
        source.check_source(src)?;
        self.commands.push(DrawCommand::Blit { src, dst });
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.smoothing = true;
        self.commands.push(DrawCommand::Resize { width, height });
    }

    fn smoothing(&self) -> bool {
        self.smoothing
    }

    fn set_smoothing(&mut self, enabled: bool) {
        self.smoothing = enabled;
        self.commands.push(DrawCommand::SetSmoothing(enabled));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_call_order() {
        let mut s = RecordingSurface::new(800, 600);
        s.clear();
        s.fill_rect(Rect::new(1.0, 2.0, 3.0, 4.0), Rgba::BLACK);
        s.set_smoothing(false);
        assert_eq!(
            s.commands(),
            &[
                DrawCommand::Clear,
                DrawCommand::FillRect {
                    rect: Rect::new(1.0, 2.0, 3.0, 4.0),
                    color: Rgba::BLACK
                },
                DrawCommand::SetSmoothing(false),
            ]
        );
    }

    #[test]
    fn failed_blit_is_not_recorded() {
        let mut s = RecordingSurface::new(10, 10);
        let sheet = Image::filled(16, 16, Rgba::WHITE);
        assert!(
            s.blit(&sheet, Rect::new(8.0, 0.0, 16.0, 16.0), Rect::new(0.0, 0.0, 1.0, 1.0))
                .is_err()
        );
        assert!(s.blits().is_empty());
    }

    #[test]
    fn take_commands_drains() {
        let mut s = RecordingSurface::new(10, 10);
        s.clear();
        assert_eq!(s.take_commands().len(), 1);
        assert!(s.commands().is_empty());
    }

    #[test]
    fn resize_updates_size_and_resets_smoothing() {
        let mut s = RecordingSurface::new(10, 10);
        s.set_smoothing(false);
        s.resize(20, 5);
        assert_eq!(s.size(), (20, 5));
        assert!(s.smoothing());
    }
}
