use crate::{Configuration, Point, Points};

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(Point { x, y }: Point) -> Self {
        (x, y)
    }
}

impl Configuration {
    #[must_use]
    pub fn new(id: impl Into<String>, molecule_name: impl Into<String>, points: Points) -> Self {
        let id = id.into();
        let molecule_name = molecule_name.into();
        Self {
            id,
            molecule_name,
            points,
        }
    }
}
