use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub w: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub h: u32,
}

impl Rect {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    pub fn is_degenerate(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// A rectangle submitted for packing. Names are unique within one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRect {
    pub name: String,
    #[serde(flatten)]
    pub rect: Rect,
}

impl NamedRect {
    pub fn new(name: impl Into<String>, w: u32, h: u32) -> Self {
        Self {
            name: name.into(),
            rect: Rect::new(w, h),
        }
    }
}

/// Top-left corner of a placed rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub name: String,
    pub rect: Rect,
    pub x: u32,
    pub y: u32,
}

impl Placement {
    pub fn right(&self) -> u32 {
        self.x + self.rect.w
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.rect.h
    }

    pub fn overlaps(&self, other: &Placement) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// The best packing found by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Packing {
    /// Placements in input order.
    pub placements: Vec<Placement>,
    pub width: u32,
    /// Occupied height, `max(y + h)` over all placements.
    pub height: u32,
    /// Height bound of the attempt that produced this packing.
    pub height_bound: u32,
}

impl Packing {
    pub fn position(&self, name: &str) -> Option<Position> {
        self.placements
            .iter()
            .find(|p| p.name == name)
            .map(|p| Position::new(p.x, p.y))
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn waste_percent(&self) -> f64 {
        let area = self.area();
        if area == 0 {
            return 0.0;
        }
        let used: u64 = self.placements.iter().map(|p| p.rect.area()).sum();
        (area - used) as f64 / area as f64 * 100.0
    }
}

/// Accepts any JSON number with an integral value that fits in `u32`
/// (`3` and `3.0` are both fine).
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
        return Err(D::Error::custom(format!(
            "expected a non-negative integer, got {value}"
        )));
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_rect_from_json_accepts_float_dimensions() {
        let r: NamedRect = serde_json::from_str(r#"{"name":"a","w":3.0,"h":2}"#).unwrap();
        assert_eq!(r, NamedRect::new("a", 3, 2));
    }

    #[test]
    fn test_named_rect_from_json_rejects_fractions() {
        let r = serde_json::from_str::<NamedRect>(r#"{"name":"a","w":2.5,"h":2}"#);
        assert!(r.is_err());
        let r = serde_json::from_str::<NamedRect>(r#"{"name":"a","w":-1,"h":2}"#);
        assert!(r.is_err());
    }

    #[test]
    fn test_overlap() {
        let a = Placement {
            name: "a".into(),
            rect: Rect::new(2, 2),
            x: 0,
            y: 0,
        };
        let touching = Placement {
            name: "b".into(),
            rect: Rect::new(1, 1),
            x: 2,
            y: 0,
        };
        let inside = Placement {
            name: "c".into(),
            rect: Rect::new(1, 1),
            x: 1,
            y: 1,
        };
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
        assert!(inside.overlaps(&a));
    }

    #[test]
    fn test_waste_percent() {
        let packing = Packing {
            placements: vec![Placement {
                name: "a".into(),
                rect: Rect::new(2, 1),
                x: 0,
                y: 0,
            }],
            width: 2,
            height: 2,
            height_bound: 2,
        };
        assert!((packing.waste_percent() - 50.0).abs() < 0.01);
        assert_eq!(packing.position("a"), Some(Position::new(0, 0)));
        assert_eq!(packing.position("z"), None);
    }
}
