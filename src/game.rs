use crate::food::{CosmeticMode, FoodManager};
use crate::grid::CellGrid;
use crate::item::{cell_center, DrawItem, CELL_SIZE};
use crate::snake::{Direction, Snake, SnakeState, TickOutcome};

const DOT_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 1.0];
const DOT_SIZE: f32 = 2.0;

/// Ties the snake's advance and the food spawner into one discrete tick and
/// owns the per-session state. Reset replaces the grid wholesale so no stale
/// occupancy from the previous session survives.
pub struct Game {
    grid: CellGrid,
    snake: Snake,
    foods: FoodManager,
    dots: Vec<DrawItem>,
    mode: CosmeticMode,
}

impl Game {
    /// Sizes the grid from the drawing surface and the fixed cell size.
    pub fn new(width: u32, height: u32, mode: CosmeticMode) -> Self {
        let rows = (height as f32 / CELL_SIZE) as u16;
        let cols = (width as f32 / CELL_SIZE) as u16;
        let mut grid = CellGrid::new(rows, cols);
        let snake = Snake::new(&mut grid);
        let dots = background_dots(rows, cols);
        Self {
            grid,
            snake,
            foods: FoodManager::new(mode),
            dots,
            mode,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.snake.state() == SnakeState::GameOver {
            return TickOutcome::Halted;
        }
        let outcome = self.snake.advance(&mut self.grid, &mut self.foods);
        self.foods.try_spawn(&mut self.grid);
        outcome
    }

    pub fn reset(&mut self) {
        self.grid = CellGrid::new(self.grid.rows(), self.grid.cols());
        self.foods = FoodManager::new(self.mode);
        self.snake.reset(&mut self.grid);
    }

    pub fn change_direction(&mut self, dir: Direction) {
        self.snake.change_direction(dir);
    }

    pub fn set_game_over_hook(&mut self, hook: Box<dyn FnMut()>) {
        self.snake.set_game_over_hook(hook);
    }

    pub fn state(&self) -> SnakeState {
        self.snake.state()
    }

    pub fn score(&self) -> usize {
        self.snake.segments().len().saturating_sub(3)
    }

    /// Drawable groups in registration order: map dots, food, snake.
    pub fn frame_items(&self) -> Vec<Vec<DrawItem>> {
        vec![
            self.dots.clone(),
            self.foods.drawables(),
            self.snake.drawables(),
        ]
    }
}

fn background_dots(rows: u16, cols: u16) -> Vec<DrawItem> {
    let mut dots = Vec::with_capacity(rows as usize * cols as usize);
    for row in 0..rows {
        for col in 0..cols {
            dots.push(DrawItem::PointSprite {
                pos: cell_center(row, col),
                color: DOT_COLOR,
                size: DOT_SIZE,
            });
        }
    }
    dots
}
