use crate::ScreenSize;
use crate::WorldOffset;
use crate::grid::Grid;

/// Hex values of braille dots
///
/// ```text
///  1   8
///  2  10
///  4  20
/// 40  80
/// ```
///
/// Where the base blank pattern is codepoint `0x2800` (or U+2800)
///
/// To get other configurations, just add the numbers above.
const BRAILLE_EMPTY: u32 = 0x2800;

/// A window onto the plane, rendered as braille characters.
///
/// Each cell is one braille dot, so a character covers 2 columns and 4 rows of cells.
pub struct Camera {
    /// The cell buffer
    cb: Vec<bool>,

    /// The frame buffer.
    fb: String,

    /// Codepoints. This allows us to construct the framebuffer more easily
    cp: Vec<u32>,

    /// Width of the cell buffer
    w: usize,

    /// Height of the cell buffer
    h: usize,

    /// World column at the left edge of the view
    x: WorldOffset,

    /// World row at the top edge of the view
    y: WorldOffset,
}

impl Camera {
    /// A camera `w` cells wide and `h` cells tall, looking at the world origin.
    pub fn new(w: usize, h: usize) -> Self {
        let (bw, bh) = (w.div_ceil(2), h.div_ceil(4));

        // Each braille character is 3 bytes, and newlines one byte.
        let fb = String::with_capacity(3 * (bw * bh) + bh);

        Self {
            cb: vec![false; w * h],
            fb,
            cp: vec![BRAILLE_EMPTY; bw * bh],
            w,
            h,
            x: 0,
            y: 0,
        }
    }

    /// A camera filling a terminal of `cols` by `rows` characters.
    pub fn for_terminal(cols: ScreenSize, rows: ScreenSize) -> Self {
        Self::new(cols as usize * 2, rows as usize * 4)
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    /// World (row, column) of the top left corner of the view
    pub fn position(&self) -> (WorldOffset, WorldOffset) {
        (self.y, self.x)
    }

    pub fn offset_x(&mut self, offset: WorldOffset) {
        self.x += offset;
    }

    pub fn offset_y(&mut self, offset: WorldOffset) {
        self.y += offset;
    }

    /// Point the camera so that the world cell (`row`, `col`) is in the middle of the view.
    pub fn center_on(&mut self, row: WorldOffset, col: WorldOffset) {
        self.y = row - (self.h / 2) as WorldOffset;
        self.x = col - (self.w / 2) as WorldOffset;
    }

    /// World (row, column) of the top left dot of the character at terminal (`col`, `row`), or
    /// `None` past the edge of the view.
    pub fn cell_at(&self, col: ScreenSize, row: ScreenSize) -> Option<(WorldOffset, WorldOffset)> {
        let (x, y) = (col as usize * 2, row as usize * 4);

        (x < self.w && y < self.h).then(|| (self.y + y as WorldOffset, self.x + x as WorldOffset))
    }

    /// Turns on a single pixel of the cell buffer
    pub fn draw_pixel(&mut self, x: usize, y: usize) {
        assert!(x < self.w, "x is out of bounds");
        assert!(y < self.h, "y is out of bounds");

        let i = self.xy_from(x, y);

        self.cb[i] = true;
    }

    /// Draw the live cells of `grid`, whose top left cell sits at world (`row`, `col`). Anything
    /// outside the view is skipped.
    pub fn draw(&mut self, grid: &Grid, (row, col): (WorldOffset, WorldOffset)) {
        for (r, cells) in grid.rows().enumerate() {
            let y = row + r as WorldOffset - self.y;
            let Ok(y) = usize::try_from(y) else { continue };

            if y >= self.h {
                continue;
            }

            for (c, &alive) in cells.iter().enumerate() {
                let x = col + c as WorldOffset - self.x;
                let Ok(x) = usize::try_from(x) else { continue };

                if alive && x < self.w {
                    self.draw_pixel(x, y);
                }
            }
        }
    }

    /// Reset the cell buffer
    pub fn reset(&mut self) {
        self.cb.fill(false);
    }

    /// Build the braille frame from the cell buffer. Every line, including the last, ends in a
    /// newline.
    pub fn render(&mut self) -> &str {
        let bw = self.w.div_ceil(2);

        // compute new codepoints
        self.cp.fill(BRAILLE_EMPTY);

        for (n, &px) in self.cb.iter().enumerate() {
            if px {
                let (x, y) = self.xy_to(n);
                self.cp[(y / 4) * bw + (x / 2)] += Self::get_hex_value(x, y);
            }
        }

        self.fb.clear();

        for (i, &c) in self.cp.iter().enumerate() {
            if i > 0 && i % bw == 0 {
                self.fb.push('\n');
            }

            // Sums of distinct dots never leave the braille block
            self.fb.push(char::from_u32(c).unwrap_or(' '));
        }
        self.fb.push('\n');

        &self.fb
    }

    fn xy_to(&self, n: usize) -> (usize, usize) {
        (n % self.w, n / self.w)
    }

    fn xy_from(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    fn get_hex_value(x: usize, y: usize) -> u32 {
        match (x % 2, y % 4) {
            (0, 0) => 0x1,
            (1, 0) => 0x8,
            (0, 1) => 0x2,
            (1, 1) => 0x10,
            (0, 2) => 0x4,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Camera;
    use crate::grid::Grid;

    #[test]
    fn draws_a_block_as_one_character() {
        let block = Grid::from_rows(&[[1, 1], [1, 1]]).unwrap();
        let mut cam = Camera::new(2, 4);

        cam.draw(&block, (0, 0));

        // dots 1, 8, 2, 10
        assert_eq!(cam.render(), "\u{281B}\n");
    }

    #[test]
    fn skips_cells_outside_the_view() {
        let block = Grid::from_rows(&[[1, 1], [1, 1]]).unwrap();
        let mut cam = Camera::new(2, 4);

        cam.draw(&block, (-1, 1));

        // only the bottom left cell of the block lands on the view, at (0, 1)
        assert_eq!(cam.render(), "\u{2808}\n");
    }

    #[test]
    fn follows_camera_offset() {
        let dot = Grid::from_rows(&[[1]]).unwrap();
        let mut cam = Camera::new(4, 4);

        cam.offset_x(-2);
        cam.draw(&dot, (0, 0));

        assert_eq!(cam.render(), "\u{2800}\u{2801}\n");
    }

    #[test]
    fn screen_to_world() {
        let mut cam = Camera::for_terminal(4, 2);
        cam.offset_x(-3);
        cam.offset_y(10);

        assert_eq!(cam.cell_at(0, 0), Some((10, -3)));
        assert_eq!(cam.cell_at(3, 1), Some((14, 3)));
        assert_eq!(cam.cell_at(4, 0), None);
        assert_eq!(cam.cell_at(0, 2), None);
    }
}
