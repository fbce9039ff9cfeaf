use geo::{Coord, Distance, Haversine, LineString, Point};

/// cumulative haversine distance in meters at each vertex of a line.
pub fn cumulative_distances(line: &LineString<f64>) -> Vec<f64> {
    let mut acc = 0.0;
    let mut result = Vec::with_capacity(line.0.len());
    let mut prev: Option<Point<f64>> = None;
    for p in line.points() {
        if let Some(q) = prev {
            acc += Haversine.distance(q, p);
        }
        result.push(acc);
        prev = Some(p);
    }
    result
}

/// cumulative haversine distance along a sequence of points, used when stops
/// cannot be placed along a shape.
pub fn path_positions(points: &[Point<f64>]) -> Vec<f64> {
    let line: LineString<f64> = points.iter().map(|p| p.0).collect();
    cumulative_distances(&line)
}

/// true if values never decrease. NaN values are not monotonic.
pub fn is_monotonic(values: &[f64]) -> bool {
    values.iter().all(|v| !v.is_nan()) && values.windows(2).all(|w| w[0] <= w[1])
}

/// length in meters of the longest segment of a line.
pub fn max_segment_length(line: &LineString<f64>) -> f64 {
    line.lines()
        .map(|l| Haversine.distance(Point(l.start), Point(l.end)))
        .fold(0.0, f64::max)
}

/// position along a line of the point on the line closest to `point`,
/// expressed in the units of `distances` (one value per vertex).
///
/// segments are projected on a local equirectangular plane where longitude
/// is scaled by the cosine of the query latitude. projections are clamped to
/// the segment and the first segment wins ties.
pub fn closest_position(line: &LineString<f64>, distances: &[f64], point: Point<f64>) -> Option<f64> {
    let coords = &line.0;
    if coords.is_empty() || distances.len() != coords.len() {
        return None;
    }
    if coords.len() == 1 {
        return Some(distances[0]);
    }
    let kx = point.y().to_radians().cos();
    let to_plane = |c: &Coord<f64>| (c.x * kx, c.y);
    let (px, py) = to_plane(&point.0);

    let mut best_dist = f64::INFINITY;
    let mut best_pos = distances[0];
    for i in 0..coords.len() - 1 {
        let (ax, ay) = to_plane(&coords[i]);
        let (bx, by) = to_plane(&coords[i + 1]);
        let (dx, dy) = (bx - ax, by - ay);
        let seg_len2 = dx * dx + dy * dy;
        let t = if seg_len2 > 0.0 {
            (((px - ax) * dx + (py - ay) * dy) / seg_len2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (cx, cy) = (ax + t * dx, ay + t * dy);
        let d2 = (px - cx).powi(2) + (py - cy).powi(2);
        if d2 < best_dist {
            best_dist = d2;
            best_pos = distances[i] + t * (distances[i + 1] - distances[i]);
        }
    }
    Some(best_pos)
}

/// positions of each point along a line. see [`closest_position`].
pub fn line_positions(line: &LineString<f64>, distances: &[f64], points: &[Point<f64>]) -> Option<Vec<f64>> {
    points
        .iter()
        .map(|p| closest_position(line, distances, *p))
        .collect()
}
