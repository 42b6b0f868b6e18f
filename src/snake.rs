use crate::food::FoodManager;
use crate::grid::{CellGrid, CellKind};
use crate::item::{cell_center, DrawItem, Skin};

pub const SEGMENT_QUAD: f32 = 10.0;

const START_ROW: u16 = 2;
const START_LEN: u16 = 3;
const BODY_SKIN: Skin = Skin::Texture("logo");

/// Encoded so that two directions are opposite iff their values sum to zero.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(i8)]
pub enum Direction {
    Left = -1,
    Right = 1,
    Up = -2,
    Down = 2,
}

impl Direction {
    pub fn opposes(self, other: Direction) -> bool {
        self as i8 + other as i8 == 0
    }

    /// One step from a coordinate, wrapped modulo the grid dimensions.
    fn step(self, row: u16, col: u16, rows: u16, cols: u16) -> (u16, u16) {
        match self {
            Direction::Right => (row, (col + 1) % cols),
            Direction::Left => (row, (col + cols - 1) % cols),
            Direction::Down => ((row + 1) % rows, col),
            Direction::Up => ((row + rows - 1) % rows, col),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SnakeState {
    Alive,
    GameOver,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickOutcome {
    Moved,
    Ate,
    Died,
    /// Already game over; nothing happened.
    Halted,
}

#[derive(Clone, Debug)]
pub struct Segment {
    pub row: u16,
    pub col: u16,
    pub skin: Skin,
}

/// The snake body and its direction state machine. Segments are ordered tail
/// first; the last element is the head the next step is computed from.
pub struct Snake {
    segments: Vec<Segment>,
    committed: Direction,
    pending: Direction,
    state: SnakeState,
    on_game_over: Option<Box<dyn FnMut()>>,
}

impl Snake {
    pub fn new(grid: &mut CellGrid) -> Self {
        let mut snake = Self {
            segments: Vec::new(),
            committed: Direction::Right,
            pending: Direction::Right,
            state: SnakeState::Alive,
            on_game_over: None,
        };
        snake.reset(grid);
        snake
    }

    /// Reinitializes the fixed starting body. The caller hands in a freshly
    /// replaced grid; the starting cells are marked here.
    pub fn reset(&mut self, grid: &mut CellGrid) {
        self.segments.clear();
        for col in 1..=START_LEN {
            self.segments.push(Segment {
                row: START_ROW,
                col,
                skin: BODY_SKIN,
            });
            grid.set(START_ROW, col, CellKind::Snake);
        }
        self.committed = Direction::Right;
        self.pending = Direction::Right;
        self.state = SnakeState::Alive;
    }

    /// Buffers a direction request for the next tick. A request opposite to
    /// the committed direction is dropped, so a user faster than one tick
    /// cannot fold the head into the second segment.
    pub fn change_direction(&mut self, dir: Direction) {
        if dir.opposes(self.committed) {
            return;
        }
        self.pending = dir;
    }

    /// One simulation step: commit the buffered direction, probe the wrapped
    /// next-head cell before mutating anything, then die, grow or rotate.
    pub fn advance(&mut self, grid: &mut CellGrid, foods: &mut FoodManager) -> TickOutcome {
        if self.state == SnakeState::GameOver {
            return TickOutcome::Halted;
        }
        self.committed = self.pending;

        let head = self.segments.last().unwrap();
        let (row, col) = self
            .committed
            .step(head.row, head.col, grid.rows(), grid.cols());
        let target = grid.get(row, col);

        if target == CellKind::Snake {
            self.state = SnakeState::GameOver;
            if let Some(hook) = self.on_game_over.as_mut() {
                hook();
            }
            return TickOutcome::Died;
        }

        if target == CellKind::Food {
            // The consumed cell becomes the new head and the tail stays put,
            // so the grid mirror matches the body length after every tick.
            let skin = foods
                .consume(row, col)
                .map(|item| item.skin)
                .unwrap_or(BODY_SKIN);
            self.segments.push(Segment { row, col, skin });
            grid.set(row, col, CellKind::Snake);
            return TickOutcome::Ate;
        }

        // Positional rotation through the existing segment slots: each takes
        // the coordinate of the one ahead, the head slot takes the new cell.
        let tail = &self.segments[0];
        grid.set(tail.row, tail.col, CellKind::Empty);
        for i in 0..self.segments.len() - 1 {
            let (next_row, next_col) = (self.segments[i + 1].row, self.segments[i + 1].col);
            self.segments[i].row = next_row;
            self.segments[i].col = next_col;
        }
        let head = self.segments.last_mut().unwrap();
        head.row = row;
        head.col = col;
        grid.set(row, col, CellKind::Snake);
        TickOutcome::Moved
    }

    pub fn set_game_over_hook(&mut self, hook: Box<dyn FnMut()>) {
        self.on_game_over = Some(hook);
    }

    pub fn state(&self) -> SnakeState {
        self.state
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn head(&self) -> &Segment {
        self.segments.last().unwrap()
    }

    pub fn drawables(&self) -> Vec<DrawItem> {
        self.segments
            .iter()
            .map(|seg| match seg.skin {
                Skin::Texture(name) => DrawItem::TexturedQuad {
                    pos: cell_center(seg.row, seg.col),
                    width: SEGMENT_QUAD,
                    height: SEGMENT_QUAD,
                    texture: name,
                },
                Skin::Color(color) => DrawItem::PointSprite {
                    pos: cell_center(seg.row, seg.col),
                    color,
                    size: SEGMENT_QUAD,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::CosmeticMode;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::cell::Cell;
    use std::rc::Rc;

    fn world(rows: u16, cols: u16) -> (CellGrid, Snake, FoodManager) {
        let mut grid = CellGrid::new(rows, cols);
        let snake = Snake::new(&mut grid);
        let foods = FoodManager::with_rng(CosmeticMode::Textured, SmallRng::seed_from_u64(1));
        (grid, snake, foods)
    }

    fn coords(snake: &Snake) -> Vec<(u16, u16)> {
        snake.segments().iter().map(|s| (s.row, s.col)).collect()
    }

    fn snake_cell_count(grid: &CellGrid) -> usize {
        let mut n = 0;
        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                if grid.get(row, col) == CellKind::Snake {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn straight_tick_shifts_the_body_by_one() {
        let (mut grid, mut snake, mut foods) = world(10, 10);
        assert_eq!(coords(&snake), vec![(2, 1), (2, 2), (2, 3)]);

        assert_eq!(snake.advance(&mut grid, &mut foods), TickOutcome::Moved);
        assert_eq!(coords(&snake), vec![(2, 2), (2, 3), (2, 4)]);
        assert_eq!(grid.get(2, 4), CellKind::Snake);
        assert_eq!(grid.get(2, 1), CellKind::Empty);
    }

    #[test]
    fn grid_mirror_matches_body_length_after_every_tick() {
        let (mut grid, mut snake, mut foods) = world(10, 10);
        foods.spawn_at(&mut grid, 2, 5, Skin::Texture("food1"));
        for _ in 0..4 {
            snake.advance(&mut grid, &mut foods);
            assert_eq!(snake_cell_count(&grid), snake.segments().len());
        }
    }

    fn lone_segment_at(row: u16, col: u16, dir: Direction) -> (CellGrid, Snake, FoodManager) {
        let (mut grid, mut snake, foods) = world(10, 10);
        for seg in snake.segments.drain(..) {
            grid.set(seg.row, seg.col, CellKind::Empty);
        }
        snake.segments.push(Segment {
            row,
            col,
            skin: BODY_SKIN,
        });
        grid.set(row, col, CellKind::Snake);
        snake.committed = dir;
        snake.pending = dir;
        (grid, snake, foods)
    }

    #[test]
    fn movement_wraps_on_all_four_edges() {
        let cases = [
            ((0, 5), Direction::Up, (9, 5)),
            ((9, 5), Direction::Down, (0, 5)),
            ((4, 9), Direction::Right, (4, 0)),
            ((4, 0), Direction::Left, (4, 9)),
        ];
        for ((row, col), dir, expected) in cases {
            let (mut grid, mut snake, mut foods) = lone_segment_at(row, col, dir);
            snake.advance(&mut grid, &mut foods);
            assert_eq!((snake.head().row, snake.head().col), expected);
        }
    }

    #[test]
    fn eating_grows_at_the_head_and_inherits_the_skin() {
        let (mut grid, mut snake, mut foods) = world(10, 10);
        foods.spawn_at(&mut grid, 2, 4, Skin::Texture("food3"));

        assert_eq!(snake.advance(&mut grid, &mut foods), TickOutcome::Ate);
        assert_eq!(coords(&snake), vec![(2, 1), (2, 2), (2, 3), (2, 4)]);
        assert_eq!(snake.head().skin, Skin::Texture("food3"));
        assert!(foods.items().is_empty());
        assert_eq!(grid.get(2, 4), CellKind::Snake);
        assert_eq!(snake_cell_count(&grid), 4);
    }

    #[test]
    fn only_the_last_buffered_request_takes_effect() {
        let (mut grid, mut snake, mut foods) = world(10, 10);
        snake.change_direction(Direction::Up);
        snake.change_direction(Direction::Down);
        snake.advance(&mut grid, &mut foods);
        assert_eq!((snake.head().row, snake.head().col), (3, 3));
    }

    #[test]
    fn reversal_is_rejected_regardless_of_request_order() {
        let (mut grid, mut snake, mut foods) = world(10, 10);
        // committed is Right; Left must be dropped even after Up was buffered
        snake.change_direction(Direction::Up);
        snake.change_direction(Direction::Left);
        snake.advance(&mut grid, &mut foods);
        assert_eq!((snake.head().row, snake.head().col), (1, 3));
    }

    #[test]
    fn lone_reversal_request_keeps_the_committed_direction() {
        let (mut grid, mut snake, mut foods) = world(10, 10);
        snake.change_direction(Direction::Left);
        snake.advance(&mut grid, &mut foods);
        assert_eq!((snake.head().row, snake.head().col), (2, 4));
    }

    #[test]
    fn self_collision_notifies_exactly_once_and_halts() {
        let (mut grid, mut snake, mut foods) = world(10, 10);
        foods.spawn_at(&mut grid, 2, 4, Skin::Texture("food1"));
        let fired = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&fired);
        snake.set_game_over_hook(Box::new(move || counter.set(counter.get() + 1)));

        // grow to length 4, then curl back into the body
        assert_eq!(snake.advance(&mut grid, &mut foods), TickOutcome::Ate);
        snake.change_direction(Direction::Up);
        snake.advance(&mut grid, &mut foods);
        snake.change_direction(Direction::Left);
        snake.advance(&mut grid, &mut foods);
        snake.change_direction(Direction::Down);
        let before = coords(&snake);
        assert_eq!(snake.advance(&mut grid, &mut foods), TickOutcome::Died);
        assert_eq!(snake.state(), SnakeState::GameOver);
        assert_eq!(fired.get(), 1);
        // the body is left untouched by the fatal tick
        assert_eq!(coords(&snake), before);

        assert_eq!(snake.advance(&mut grid, &mut foods), TickOutcome::Halted);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn reset_restores_the_starting_configuration() {
        let (mut grid, mut snake, mut foods) = world(10, 10);
        snake.change_direction(Direction::Down);
        snake.advance(&mut grid, &mut foods);

        let mut fresh = CellGrid::new(10, 10);
        snake.reset(&mut fresh);
        assert_eq!(coords(&snake), vec![(2, 1), (2, 2), (2, 3)]);
        assert_eq!(snake.state(), SnakeState::Alive);
        // next tick moves right again
        snake.advance(&mut fresh, &mut foods);
        assert_eq!((snake.head().row, snake.head().col), (2, 4));
    }

    #[test]
    fn body_length_is_preserved_on_plain_moves() {
        let (mut grid, mut snake, mut foods) = world(10, 10);
        for _ in 0..5 {
            snake.advance(&mut grid, &mut foods);
            assert_eq!(snake.segments().len(), 3);
        }
    }
}
