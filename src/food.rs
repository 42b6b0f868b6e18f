use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::grid::{CellGrid, CellKind};
use crate::item::{cell_center, DrawItem, Skin};

pub const MAX_ACTIVE_FOOD: usize = 3;
pub const FOOD_QUAD: f32 = 6.0;
pub const FOOD_TEXTURES: [&str; 4] = ["food1", "food2", "food3", "food4"];

/// How freshly spawned food picks its cosmetic tag.
#[derive(Clone, Copy, Debug)]
pub enum CosmeticMode {
    Textured,
    RandomColor,
}

#[derive(Clone, Debug)]
pub struct FoodItem {
    pub row: u16,
    pub col: u16,
    pub skin: Skin,
}

pub struct FoodManager {
    items: Vec<FoodItem>,
    mode: CosmeticMode,
    rng: SmallRng,
}

impl FoodManager {
    pub fn new(mode: CosmeticMode) -> Self {
        Self::with_rng(mode, SmallRng::from_entropy())
    }

    pub fn with_rng(mode: CosmeticMode, rng: SmallRng) -> Self {
        Self {
            items: Vec::new(),
            mode,
            rng,
        }
    }

    /// Spawns one food item into a uniformly chosen empty cell. No-op when
    /// the active set is full or the grid has no empty cell left.
    pub fn try_spawn(&mut self, grid: &mut CellGrid) {
        if self.items.len() >= MAX_ACTIVE_FOOD {
            return;
        }
        let empty: Vec<(u16, u16)> = grid.empty_cells().collect();
        if empty.is_empty() {
            return;
        }
        let (row, col) = empty[self.rng.gen_range(0..empty.len())];
        let skin = match self.mode {
            CosmeticMode::Textured => {
                Skin::Texture(FOOD_TEXTURES[self.rng.gen_range(0..FOOD_TEXTURES.len())])
            }
            CosmeticMode::RandomColor => {
                Skin::Color([self.rng.gen(), self.rng.gen(), self.rng.gen(), 1.0])
            }
        };
        grid.set(row, col, CellKind::Food);
        self.items.push(FoodItem { row, col, skin });
    }

    /// Removes and returns the item at the coordinate, if any. The cell kind
    /// is left untouched: the snake's head occupies that cell next.
    pub fn consume(&mut self, row: u16, col: u16) -> Option<FoodItem> {
        let idx = self
            .items
            .iter()
            .position(|f| f.row == row && f.col == col)?;
        Some(self.items.remove(idx))
    }

    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    pub fn drawables(&self) -> Vec<DrawItem> {
        self.items
            .iter()
            .map(|f| match f.skin {
                Skin::Texture(name) => DrawItem::TexturedQuad {
                    pos: cell_center(f.row, f.col),
                    width: FOOD_QUAD,
                    height: FOOD_QUAD,
                    texture: name,
                },
                Skin::Color(color) => DrawItem::PointSprite {
                    pos: cell_center(f.row, f.col),
                    color,
                    size: FOOD_QUAD,
                },
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn spawn_at(&mut self, grid: &mut CellGrid, row: u16, col: u16, skin: Skin) {
        debug_assert_eq!(grid.get(row, col), CellKind::Empty);
        grid.set(row, col, CellKind::Food);
        self.items.push(FoodItem { row, col, skin });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(mode: CosmeticMode) -> FoodManager {
        FoodManager::with_rng(mode, SmallRng::seed_from_u64(7))
    }

    #[test]
    fn spawn_count_never_exceeds_max() {
        let mut grid = CellGrid::new(10, 10);
        let mut foods = seeded(CosmeticMode::Textured);
        for _ in 0..10 {
            foods.try_spawn(&mut grid);
        }
        assert_eq!(foods.items().len(), MAX_ACTIVE_FOOD);
    }

    #[test]
    fn spawned_items_land_on_distinct_empty_cells() {
        let mut grid = CellGrid::new(10, 10);
        grid.set(4, 4, CellKind::Snake);
        let mut foods = seeded(CosmeticMode::Textured);
        for _ in 0..3 {
            foods.try_spawn(&mut grid);
        }
        for f in foods.items() {
            assert_eq!(grid.get(f.row, f.col), CellKind::Food);
        }
        let mut coords: Vec<_> = foods.items().iter().map(|f| (f.row, f.col)).collect();
        coords.sort_unstable();
        coords.dedup();
        assert_eq!(coords.len(), 3);
        assert!(!coords.contains(&(4, 4)));
    }

    #[test]
    fn spawn_is_noop_without_empty_cells() {
        let mut grid = CellGrid::new(2, 2);
        for row in 0..2 {
            for col in 0..2 {
                grid.set(row, col, CellKind::Snake);
            }
        }
        let mut foods = seeded(CosmeticMode::Textured);
        foods.try_spawn(&mut grid);
        assert!(foods.items().is_empty());
    }

    #[test]
    fn consume_removes_and_returns_the_item() {
        let mut grid = CellGrid::new(5, 5);
        let mut foods = seeded(CosmeticMode::Textured);
        foods.spawn_at(&mut grid, 2, 4, Skin::Texture("food2"));
        let item = foods.consume(2, 4).unwrap();
        assert_eq!(item.skin, Skin::Texture("food2"));
        assert!(foods.items().is_empty());
        // cell kind is the caller's responsibility
        assert_eq!(grid.get(2, 4), CellKind::Food);
    }

    #[test]
    fn consume_on_a_bare_coordinate_is_none() {
        let mut foods = seeded(CosmeticMode::Textured);
        assert!(foods.consume(1, 1).is_none());
    }

    #[test]
    fn textured_mode_picks_a_known_variant() {
        let mut grid = CellGrid::new(8, 8);
        let mut foods = seeded(CosmeticMode::Textured);
        foods.try_spawn(&mut grid);
        match foods.items()[0].skin {
            Skin::Texture(name) => assert!(FOOD_TEXTURES.contains(&name)),
            Skin::Color(_) => panic!("textured mode produced a color skin"),
        }
    }

    #[test]
    fn color_mode_picks_an_opaque_color() {
        let mut grid = CellGrid::new(8, 8);
        let mut foods = seeded(CosmeticMode::RandomColor);
        foods.try_spawn(&mut grid);
        match foods.items()[0].skin {
            Skin::Color(c) => assert_eq!(c[3], 1.0),
            Skin::Texture(_) => panic!("color mode produced a texture skin"),
        }
    }
}
