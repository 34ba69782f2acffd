//! The shared drawing surface.

use scribble_protocol::{Color, ServerEvent};

use crate::RoomError;

/// A fixed-size, row-major grid of colors.
///
/// The length never changes after construction and every cell always
/// holds a color, so readers never see a partial canvas.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u16,
    height: u16,
    background: Color,
    cells: Vec<Color>,
}

impl Canvas {
    /// A canvas filled with `background`.
    pub fn new(width: u16, height: u16, background: Color) -> Self {
        let len = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            background,
            cells: vec![background; len],
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Color> {
        self.cells.get(index).copied()
    }

    pub fn cells(&self) -> &[Color] {
        &self.cells
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Overwrites one cell.
    ///
    /// # Errors
    /// Returns [`RoomError::StrokeOutOfBounds`] if `index` is past the end.
    pub fn paint(&mut self, index: usize, color: Color) -> Result<(), RoomError> {
        let len = self.cells.len();
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(RoomError::StrokeOutOfBounds { index, len })?;
        *cell = color;
        Ok(())
    }

    /// Fills every cell with the background color.
    pub fn reset(&mut self) {
        self.cells.fill(self.background);
    }

    /// The whole canvas as a wire event.
    pub fn snapshot(&self) -> ServerEvent {
        ServerEvent::CanvasSnapshot {
            width: self.width,
            height: self.height,
            cells: self.cells.clone(),
        }
    }
}
