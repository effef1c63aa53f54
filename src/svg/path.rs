//! Path data (`d` attribute) helpers used when merging paths.

use std::fmt::Write;

use svgtypes::{PathParser, PathSegment, SimplePathSegment, SimplifyingPathParser};

use super::format_number;

/// Axis-aligned bounds in user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    fn point(x: f64, y: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }
}

fn include(bounds: &mut Option<Bounds>, x: f64, y: f64) {
    match bounds {
        Some(b) => b.include(x, y),
        None => *bounds = Some(Bounds::point(x, y)),
    }
}

/// Conservative bounds of a path: every end point and control point is
/// included. Arcs are approximated by curves whose hull contains them.
///
/// Returns `None` for empty or malformed data.
pub fn bounds(d: &str) -> Option<Bounds> {
    let mut bounds: Option<Bounds> = None;

    for segment in SimplifyingPathParser::from(d) {
        match segment.ok()? {
            SimplePathSegment::MoveTo { x, y } | SimplePathSegment::LineTo { x, y } => {
                include(&mut bounds, x, y);
            }
            SimplePathSegment::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                include(&mut bounds, x1, y1);
                include(&mut bounds, x2, y2);
                include(&mut bounds, x, y);
            }
            SimplePathSegment::Quadratic { x1, y1, x, y } => {
                include(&mut bounds, x1, y1);
                include(&mut bounds, x, y);
            }
            SimplePathSegment::ClosePath => {}
        }
    }

    bounds
}

/// Makes a path safe to append to another path's data.
///
/// A path starting with a relative moveto is interpreted relative to the
/// previous path's current point once appended, so the leading `m` becomes an
/// absolute `M`. Anything else is returned as written.
pub fn absolute_start(d: &str) -> String {
    let trimmed = d.trim_start();
    if !trimmed.starts_with('m') {
        return trimmed.to_string();
    }

    let Ok(segments) = PathParser::from(trimmed).collect::<Result<Vec<_>, _>>() else {
        return trimmed.to_string();
    };

    let mut acc = String::with_capacity(trimmed.len() + 1);
    for (i, segment) in segments.into_iter().enumerate() {
        let segment = match segment {
            PathSegment::MoveTo { x, y, .. } if i == 0 => PathSegment::MoveTo { abs: true, x, y },
            other => other,
        };
        write_segment(&mut acc, &segment);
    }
    acc
}

/// Writes one segment with an explicit command letter.
fn write_segment(acc: &mut String, segment: &PathSegment) {
    let (abs, command, values): (bool, char, Vec<f64>) = match *segment {
        PathSegment::MoveTo { abs, x, y } => (abs, 'm', vec![x, y]),
        PathSegment::LineTo { abs, x, y } => (abs, 'l', vec![x, y]),
        PathSegment::HorizontalLineTo { abs, x } => (abs, 'h', vec![x]),
        PathSegment::VerticalLineTo { abs, y } => (abs, 'v', vec![y]),
        PathSegment::CurveTo {
            abs,
            x1,
            y1,
            x2,
            y2,
            x,
            y,
        } => (abs, 'c', vec![x1, y1, x2, y2, x, y]),
        PathSegment::SmoothCurveTo { abs, x2, y2, x, y } => (abs, 's', vec![x2, y2, x, y]),
        PathSegment::Quadratic { abs, x1, y1, x, y } => (abs, 'q', vec![x1, y1, x, y]),
        PathSegment::SmoothQuadratic { abs, x, y } => (abs, 't', vec![x, y]),
        PathSegment::EllipticalArc {
            abs,
            rx,
            ry,
            x_axis_rotation,
            large_arc,
            sweep,
            x,
            y,
        } => (
            abs,
            'a',
            vec![
                rx,
                ry,
                x_axis_rotation,
                f64::from(u8::from(large_arc)),
                f64::from(u8::from(sweep)),
                x,
                y,
            ],
        ),
        PathSegment::ClosePath { abs } => (abs, 'z', Vec::new()),
    };

    acc.push(if abs {
        command.to_ascii_uppercase()
    } else {
        command
    });
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            acc.push(' ');
        }
        let _ = write!(acc, "{}", format_number(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_absolute_and_relative() {
        let b = bounds("M1 2L5 6").unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (1.0, 2.0, 5.0, 6.0));

        let b = bounds("m10 10h5v5h-5z").unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (10.0, 10.0, 15.0, 15.0));

        let b = bounds("M0 0 10 10 20-5").unwrap();
        assert_eq!((b.min_y, b.max_x), (-5.0, 20.0));
    }

    #[test]
    fn test_bounds_compact_numbers() {
        let b = bounds("M.5.5l1e1-1.5").unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (0.5, -1.0, 10.5, 0.5));
    }

    #[test]
    fn test_bounds_arc_flags() {
        let b = bounds("M0 0a5 5 0 0110 0").unwrap();
        assert!(b.max_x > 9.99);
        assert!(b.min_y < -4.9);
    }

    #[test]
    fn test_bounds_malformed() {
        assert!(bounds("").is_none());
        assert!(bounds("L1 1").is_none());
        assert!(bounds("M1").is_none());
    }

    #[test]
    fn test_intersects() {
        let a = bounds("M0 0H10V10H0z").unwrap();
        let b = bounds("M5 5H15V15H5z").unwrap();
        let c = bounds("M20 20H30V30H20z").unwrap();
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_absolute_start() {
        assert_eq!(absolute_start("M1 1h2"), "M1 1h2");
        assert_eq!(absolute_start("m1 1h2"), "M1 1h2");
        assert_eq!(absolute_start("m1 1 2 2"), "M1 1l2 2");
        assert_eq!(absolute_start("m1,1a2 2 0 1 0 4-4z"), "M1 1a2 2 0 1 0 4 -4z");
        // left alone when it can't be parsed
        assert_eq!(absolute_start("m1"), "m1");
    }
}
