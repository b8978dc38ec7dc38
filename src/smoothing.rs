//! Freehand stroke cleanup.
//!
//! A stroke is first simplified with Ramer-Douglas-Peucker, then the
//! surviving control points are re-expanded with a cardinal spline. The
//! transform is one-way: smoothing an already smoothed stroke may pick
//! different split points and is not expected to reproduce it.

use crate::{config::SmoothingConfig, types::Point};

/// Perpendicular distance from `p` to the line through `start` and `end`.
/// Falls back to the point distance when the line is degenerate.
pub fn perpendicular_distance(p: &Point, start: &Point, end: &Point) -> f32 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    if dx == 0.0 && dy == 0.0 {
        return p.distance_to(start);
    }
    (dy * p.x - dx * p.y + end.x * start.y - end.y * start.x).abs() / dx.hypot(dy)
}

/// Douglas-Peucker simplification over index ranges with an explicit stack.
/// Splits at the first point of maximum distance whenever that distance
/// exceeds `tolerance`; fewer than 3 points are returned unchanged.
pub fn simplify_path(points: &[Point], tolerance: f32) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut ranges = vec![(0, last)];
    while let Some((start, end)) = ranges.pop() {
        if end - start < 2 {
            continue;
        }

        let mut split: Option<(usize, f32)> = None;
        for i in start + 1..end {
            let d = perpendicular_distance(&points[i], &points[start], &points[end]);
            if split.is_none_or(|(_, best)| d > best) {
                split = Some((i, d));
            }
        }

        if let Some((index, distance)) = split
            && distance > tolerance
        {
            keep[index] = true;
            ranges.push((index, end));
            ranges.push((start, index));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect()
}

/// Cardinal spline through `points`, sampling `segments` steps per span.
/// Endpoints reuse themselves as the missing outer neighbour. Every control
/// point appears exactly once in the output: joints between spans are not
/// sampled twice, so `n` points yield `(n - 1) * segments + 1` samples rather
/// than `segments + 1` per span.
pub fn cardinal_spline(points: &[Point], tension: f32, segments: usize) -> Vec<Point> {
    if points.len() < 2 || segments == 0 {
        return points.to_vec();
    }

    let spans = points.len() - 1;
    let mut result = Vec::with_capacity(spans * segments + 1);

    for i in 0..spans {
        let p0 = if i > 0 { points[i - 1] } else { points[i] };
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = if i + 2 < points.len() { points[i + 2] } else { p2 };

        // Later spans start at k = 1; k = 0 would repeat the previous end.
        let first_step = if i == 0 { 0 } else { 1 };
        for k in first_step..=segments {
            let t = k as f32 / segments as f32;
            result.push(blend(p0, p1, p2, p3, t, tension));
        }
    }

    result
}

fn blend(p0: Point, p1: Point, p2: Point, p3: Point, t: f32, tension: f32) -> Point {
    let t2 = t * t;
    let t3 = t2 * t;
    let c1 = -tension * t3 + 2.0 * tension * t2 - tension * t;
    let c2 = (2.0 - tension) * t3 + (tension - 3.0) * t2 + 1.0;
    let c3 = (tension - 2.0) * t3 + (3.0 - 2.0 * tension) * t2 + tension * t;
    let c4 = tension * t3 - tension * t2;

    Point::new(
        c1 * p0.x + c2 * p1.x + c3 * p2.x + c4 * p3.x,
        c1 * p0.y + c2 * p1.y + c3 * p2.y + c4 * p3.y,
    )
}

pub fn smoothen_path(points: &[Point], config: &SmoothingConfig) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let simplified = simplify_path(points, config.tolerance);
    cardinal_spline(&simplified, config.tension, config.segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f32 * 3.0, i as f32 * 1.5)).collect()
    }

    #[test]
    fn test_perpendicular_distance() {
        let d = perpendicular_distance(
            &Point::new(1.0, 1.0),
            &Point::new(0.0, 0.0),
            &Point::new(2.0, 0.0),
        );
        assert!((d - 1.0).abs() < 1e-6);

        let degenerate = perpendicular_distance(
            &Point::new(3.0, 4.0),
            &Point::new(0.0, 0.0),
            &Point::new(0.0, 0.0),
        );
        assert!((degenerate - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_straight_line_collapses_to_endpoints() {
        let points: Vec<Point> = (0..10).map(|i| Point::new(i as f32, 0.0)).collect();
        let simplified = simplify_path(&points, 1.5);
        assert_eq!(simplified, vec![points[0], points[9]]);

        let diagonal = line(10);
        assert_eq!(simplify_path(&diagonal, 1.5).len(), 2);
    }

    #[test]
    fn test_short_paths_unchanged() {
        let two = vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)];
        assert_eq!(simplify_path(&two, 1.5), two);
        assert_eq!(smoothen_path(&two, &SmoothingConfig::default()), two);
        assert!(simplify_path(&[], 1.5).is_empty());
    }

    #[test]
    fn test_corner_is_kept() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.1),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(10.0, 10.0),
        ];
        let simplified = simplify_path(&points, 1.5);
        assert_eq!(
            simplified,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)]
        );
    }

    #[test]
    fn test_ties_split_at_first_maximum() {
        // Points 1 and 3 are equally far from the base line.
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 5.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 5.0),
            Point::new(4.0, 0.0),
        ];
        let simplified = simplify_path(&points, 100.0);
        assert_eq!(simplified.len(), 2);

        let simplified = simplify_path(&points, 1.5);
        assert_eq!(simplified, points);
    }

    #[test]
    fn test_spline_preserves_endpoints() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(13.0, -7.0);
        let curve = cardinal_spline(&[a, b], 0.5, 12);
        assert_eq!(curve.len(), 13);
        assert_eq!(curve[0], a);
        assert_eq!(curve[12], b);
    }

    #[test]
    fn test_spline_passes_through_control_points() {
        let controls = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(20.0, 0.0),
        ];
        let curve = cardinal_spline(&controls, 0.5, 12);
        assert_eq!(curve.len(), 25);
        assert_eq!(curve[12], controls[1]);
        assert_eq!(curve[24], controls[2]);
        // No duplicated joint sample.
        assert_ne!(curve[12], curve[13]);
    }

    #[test]
    fn test_smoothen_noisy_stroke() {
        let points: Vec<Point> = (0..40)
            .map(|i| {
                let x = i as f32 * 2.0;
                let jitter = if i % 2 == 0 { 0.3 } else { -0.3 };
                Point::new(x, (x / 20.0).sin() * 30.0 + jitter)
            })
            .collect();
        let smoothed = smoothen_path(&points, &SmoothingConfig::default());
        assert_eq!(smoothed.first(), points.first());
        assert_eq!(smoothed.last(), points.last());
        assert!(smoothed.len() > 2);
    }
}
