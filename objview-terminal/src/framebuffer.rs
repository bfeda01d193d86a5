//! Character framebuffer shared by the terminal window and the rasterizer
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// Terminal cells are roughly twice as tall as they are wide; one cell
/// covers this many vertical pixel-equivalents.
pub const CELL_ASPECT: u32 = 2;

/// Clear color (0.1 grey)
const BACKGROUND: Cell = Cell {
    glyph: ' ',
    color: [26, 26, 26],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub color: [u8; 3],
}

pub type SharedFrameBuffer = Rc<RefCell<FrameBuffer>>;

/// Color and depth planes, one entry per terminal cell
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    depth: Vec<f32>,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth: vec![f32::INFINITY; size],
            cells: vec![BACKGROUND; size],
        }
    }

    pub fn shared(width: usize, height: usize) -> SharedFrameBuffer {
        Rc::new(RefCell::new(Self::new(width, height)))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocate for a new size; contents are cleared
    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.width, self.height) {
            *self = Self::new(width, height);
        }
    }

    pub fn clear(&mut self) {
        self.depth.fill(f32::INFINITY);
        self.cells.fill(BACKGROUND);
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    pub fn is_background(&self, x: usize, y: usize) -> bool {
        self.cell(x, y) == Some(BACKGROUND)
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Depth test against the stored value, keeping the closer fragment.
    /// Returns whether `depth` won; positions outside the buffer never do.
    pub fn depth_test(&mut self, x: usize, y: usize, depth: f32) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        if depth < self.depth[idx] {
            self.depth[idx] = depth;
            true
        } else {
            false
        }
    }

    /// Write a cell; positions outside the buffer are ignored
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(idx) = self.index(x, y) {
            self.cells[idx] = cell;
        }
    }

    /// Queue the whole buffer starting at terminal row `top`
    pub fn draw<W: Write>(&self, writer: &mut W, top: u16) -> std::io::Result<()> {
        let mut current: Option<[u8; 3]> = None;
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, top + y as u16))?;
            for x in 0..self.width {
                let cell = self.cells[y * self.width + x];
                if current != Some(cell.color) {
                    let [r, g, b] = cell.color;
                    writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                    current = Some(cell.color);
                }
                writer.queue(Print(cell.glyph))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}
