/// Side length of one grid cell in surface pixels.
pub const CELL_SIZE: f32 = 20.0;

/// Cosmetic tag carried by a grid occupant. Textured occupants render as
/// quads, colored ones go through the point-sprite path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Skin {
    Texture(&'static str),
    Color([f32; 4]),
}

/// One renderer-facing primitive for the current frame.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawItem {
    PointSprite {
        pos: [f32; 2],
        color: [f32; 4],
        size: f32,
    },
    TexturedQuad {
        pos: [f32; 2],
        width: f32,
        height: f32,
        texture: &'static str,
    },
}

/// Pixel-space center of a grid cell.
pub fn cell_center(row: u16, col: u16) -> [f32; 2] {
    [
        col as f32 * CELL_SIZE + CELL_SIZE / 2.0,
        row as f32 * CELL_SIZE + CELL_SIZE / 2.0,
    ]
}
