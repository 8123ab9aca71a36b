/// Integer map coordinate. `y` grows downwards, like the rendered map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, direction: Direction, step: i32) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx * step, self.y + dy * step)
    }
}

/// Axis-aligned rectangle, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Bounds {
    pub const fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub const fn contains(&self, position: Position) -> bool {
        position.x >= self.min_x
            && position.x <= self.max_x
            && position.y >= self.min_y
            && position.y <= self.max_y
    }

    pub const fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub const fn height(&self) -> i32 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Maps a key name to a direction. Accepts both DOM-style (`ArrowUp`) and
    /// short (`up`) names; anything else is not a movement key.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "up" => Some(Self::Up),
            "ArrowDown" | "down" => Some(Self::Down),
            "ArrowLeft" | "left" => Some(Self::Left),
            "ArrowRight" | "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}
