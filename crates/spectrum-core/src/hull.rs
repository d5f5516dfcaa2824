//! Hull Geometry
//!
//! Convex-hull membership via simplex decomposition. Every affinely
//! independent (d+1)-subset of the hull's vertices becomes a simplex stored
//! as its base vertex and inverted edge matrix; a point is inside the hull
//! when it has non-negative barycentric coordinates in any simplex. The
//! union of those simplices is exactly the convex hull.

use nalgebra::{DMatrix, DVector};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::components::point::{AxisSet, Point};
use crate::error::TooManyVertices;

/// Edge matrices with a smaller determinant are treated as degenerate.
const DEGENERATE_DET: f64 = 1e-9;

/// Points closer than this to an affine span lie in it.
const SPAN_TOLERANCE: f64 = 1e-6;

/// One non-degenerate simplex.
#[derive(Debug, Clone)]
pub struct Simplex {
    base: DVector<f64>,
    inverse: DMatrix<f64>,
}

impl Simplex {
    fn from_vertices(vertices: &[&DVector<f64>]) -> Option<Self> {
        let base = vertices[0].clone();
        let dimension = base.len();
        let edges = DMatrix::from_fn(dimension, dimension, |row, col| {
            vertices[col + 1][row] - base[row]
        });
        if edges.determinant().abs() < DEGENERATE_DET {
            return None;
        }
        let inverse = edges.try_inverse()?;
        Some(Self { base, inverse })
    }

    fn contains(&self, point: &DVector<f64>, epsilon: f64) -> bool {
        let lambda = &self.inverse * (point - &self.base);
        lambda.iter().all(|l| *l >= -epsilon) && lambda.sum() <= 1.0 + epsilon
    }
}

/// Precomputed geometry for one hull zone.
#[derive(Debug, Clone)]
pub struct HullGeometry {
    axes: AxisSet,
    simplices: Vec<Simplex>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    epsilon: f64,
}

impl HullGeometry {
    /// Geometry that contains nothing.
    pub fn empty(axes: AxisSet) -> Self {
        Self {
            axes,
            simplices: Vec::new(),
            lower: Vec::new(),
            upper: Vec::new(),
            epsilon: 0.0,
        }
    }

    /// Builds the decomposition of the hull spanned by `vertices` projected
    /// onto `axes`.
    ///
    /// Duplicate projections are merged. When more than `max_points`
    /// distinct vertices remain, points inside the hull are dropped first;
    /// a hull that still has more corners than that is an error.
    /// Degenerate (lower-dimensional) vertex sets and an empty axis set
    /// produce an empty hull.
    pub fn build(
        vertices: &[Point],
        axes: AxisSet,
        max_points: usize,
        epsilon: f64,
    ) -> Result<Self, TooManyVertices> {
        let dimension = axes.len();
        if dimension == 0 {
            return Ok(Self::empty(axes));
        }

        let distinct: BTreeSet<Vec<i32>> = vertices
            .iter()
            .map(|point| axes.iter().map(|axis| point.get(axis)).collect())
            .collect();
        let mut points: Vec<DVector<f64>> = distinct
            .iter()
            .map(|coords| DVector::from_iterator(dimension, coords.iter().map(|c| f64::from(*c))))
            .collect();
        if points.len() > max_points {
            let total = points.len();
            points = extreme_points(points, dimension, max_points, epsilon)?;
            tracing::debug!(total, corners = points.len(), "hull reduced to its corners");
        }

        let simplices: Vec<Simplex> = decompose(&points, dimension)
            .into_iter()
            .map(|(_, simplex)| simplex)
            .collect();
        if simplices.is_empty() {
            tracing::debug!(vertices = points.len(), dimension, "degenerate hull");
            return Ok(Self::empty(axes));
        }

        let mut lower = vec![f64::INFINITY; dimension];
        let mut upper = vec![f64::NEG_INFINITY; dimension];
        for point in &points {
            for (d, value) in point.iter().enumerate() {
                lower[d] = lower[d].min(*value);
                upper[d] = upper[d].max(*value);
            }
        }

        Ok(Self {
            axes,
            simplices,
            lower,
            upper,
            epsilon,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.simplices.is_empty()
    }

    pub fn simplex_count(&self) -> usize {
        self.simplices.len()
    }

    /// Boundary-inclusive membership test.
    pub fn contains(&self, point: &Point) -> bool {
        if self.is_empty() {
            return false;
        }
        let coords: Vec<f64> = self.axes.iter().map(|axis| f64::from(point.get(axis))).collect();
        let outside_box = coords.iter().enumerate().any(|(d, value)| {
            *value < self.lower[d] - self.epsilon || *value > self.upper[d] + self.epsilon
        });
        if outside_box {
            return false;
        }
        let vector = DVector::from_vec(coords);
        self.simplices
            .iter()
            .any(|simplex| simplex.contains(&vector, self.epsilon))
    }
}

/// Every non-degenerate simplex over `points`, with the indices it uses.
fn decompose(points: &[DVector<f64>], dimension: usize) -> Vec<(Vec<usize>, Simplex)> {
    let mut simplices = Vec::new();
    for_each_combination(points.len(), dimension + 1, |indices| {
        let chosen: Vec<&DVector<f64>> = indices.iter().map(|i| &points[*i]).collect();
        if let Some(simplex) = Simplex::from_vertices(&chosen) {
            simplices.push((indices.to_vec(), simplex));
        }
    });
    simplices
}

/// Reduces `points` to the corners of their hull.
///
/// Starts from a full-dimensional simplex and adds the remaining points
/// farthest from the centroid first, skipping any already covered. Returns
/// no points for a degenerate set.
fn extreme_points(
    points: Vec<DVector<f64>>,
    dimension: usize,
    max_points: usize,
    epsilon: f64,
) -> Result<Vec<DVector<f64>>, TooManyVertices> {
    let centroid = points
        .iter()
        .fold(DVector::zeros(dimension), |sum, point| sum + point)
        / points.len() as f64;
    let mut ordered: Vec<(f64, DVector<f64>)> = points
        .into_iter()
        .map(|point| ((&point - &centroid).norm(), point))
        .collect();
    ordered.sort_by(|a, b| b.0.total_cmp(&a.0));
    let mut remaining: Vec<DVector<f64>> = ordered.into_iter().map(|(_, point)| point).collect();

    let Some(seed) = spanning_simplex(&remaining, dimension) else {
        return Ok(Vec::new());
    };
    let mut kept: Vec<DVector<f64>> = seed.iter().map(|i| remaining[*i].clone()).collect();
    let mut index = 0;
    remaining.retain(|_| {
        let keep = !seed.contains(&index);
        index += 1;
        keep
    });

    let mut simplices = decompose(&kept, dimension);
    for point in remaining {
        if simplices.iter().any(|(_, simplex)| simplex.contains(&point, epsilon)) {
            continue;
        }
        kept.push(point);
        simplices = decompose(&kept, dimension);
        if kept.len() > max_points {
            kept = drop_covered(kept, &simplices, epsilon);
            if kept.len() > max_points {
                return Err(TooManyVertices {
                    vertices: kept.len(),
                    max_points,
                });
            }
            simplices = decompose(&kept, dimension);
        }
    }
    Ok(kept)
}

/// Indices of `dimension + 1` affinely independent points, chosen greedily
/// by distance from the span of those already picked.
fn spanning_simplex(points: &[DVector<f64>], dimension: usize) -> Option<Vec<usize>> {
    let anchor = points.first()?;
    let mut chosen = vec![0];
    let mut basis: Vec<DVector<f64>> = Vec::with_capacity(dimension);
    while chosen.len() <= dimension {
        let (index, residual) = points
            .iter()
            .enumerate()
            .filter(|(i, _)| !chosen.contains(i))
            .map(|(i, point)| {
                let mut residual = point - anchor;
                for direction in &basis {
                    residual -= direction * direction.dot(&residual);
                }
                (i, residual)
            })
            .max_by(|a, b| a.1.norm().total_cmp(&b.1.norm()))?;
        let norm = residual.norm();
        if norm < SPAN_TOLERANCE {
            return None;
        }
        basis.push(residual / norm);
        chosen.push(index);
    }
    Some(chosen)
}

/// Keeps only the points not covered by a simplex built from the others.
fn drop_covered(
    kept: Vec<DVector<f64>>,
    simplices: &[(Vec<usize>, Simplex)],
    epsilon: f64,
) -> Vec<DVector<f64>> {
    kept.iter()
        .enumerate()
        .filter(|(i, point)| {
            !simplices
                .iter()
                .any(|(indices, simplex)| !indices.contains(i) && simplex.contains(point, epsilon))
        })
        .map(|(_, point)| point.clone())
        .collect()
}

/// Calls `f` with every k-subset of 0..n, in lexicographic order.
fn for_each_combination(n: usize, k: usize, mut f: impl FnMut(&[usize])) {
    if k == 0 || k > n {
        return;
    }
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        f(&indices);
        let mut i = k;
        loop {
            if i == 0 {
                return;
            }
            i -= 1;
            if indices[i] != i + n - k {
                break;
            }
            if i == 0 {
                return;
            }
        }
        indices[i] += 1;
        for j in i + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}

#[derive(Debug)]
struct CachedHull {
    computed_at: Instant,
    geometry: Arc<HullGeometry>,
}

/// Hull geometry per zone id, recomputed after `ttl`.
#[derive(Debug)]
pub struct HullCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedHull>>,
}

impl HullCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached geometry for a zone, rebuilding on a miss or once stale.
    pub fn get_or_build<E>(
        &self,
        zone_id: &str,
        now: Instant,
        build: impl FnOnce() -> Result<HullGeometry, E>,
    ) -> Result<Arc<HullGeometry>, E> {
        {
            let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = entries.get(zone_id) {
                if now.saturating_duration_since(cached.computed_at) < self.ttl {
                    return Ok(Arc::clone(&cached.geometry));
                }
            }
        }

        let geometry = Arc::new(build()?);
        tracing::debug!(
            zone_id,
            simplices = geometry.simplex_count(),
            "hull geometry rebuilt"
        );
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                zone_id.to_string(),
                CachedHull {
                    computed_at: now,
                    geometry: Arc::clone(&geometry),
                },
            );
        Ok(geometry)
    }

    pub fn invalidate(&self, zone_id: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(zone_id);
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::point::Axis;

    fn plane() -> AxisSet {
        AxisSet::only(Axis::Entropy).with(Axis::Oblivion)
    }

    fn at(entropy: i32, oblivion: i32) -> Point {
        Point::ORIGIN
            .with(Axis::Entropy, entropy)
            .with(Axis::Oblivion, oblivion)
    }

    fn square() -> HullGeometry {
        let corners = [at(10, 10), at(20, 10), at(20, 20), at(10, 20)];
        HullGeometry::build(&corners, plane(), 16, 1e-9).unwrap()
    }

    #[test]
    fn test_square_contains_interior_and_boundary() {
        let hull = square();
        assert!(!hull.is_empty());
        assert!(hull.contains(&at(15, 15)));
        assert!(hull.contains(&at(10, 10)));
        assert!(hull.contains(&at(20, 15)));
        assert!(!hull.contains(&at(21, 15)));
        assert!(!hull.contains(&at(5, 5)));
    }

    #[test]
    fn test_interior_vertex_does_not_change_hull() {
        let points = [at(0, 0), at(30, 0), at(0, 30), at(10, 10)];
        let hull = HullGeometry::build(&points, plane(), 16, 1e-9).unwrap();
        assert!(hull.contains(&at(15, 14)));
        assert!(!hull.contains(&at(16, 16)));
    }

    #[test]
    fn test_collinear_points_are_degenerate() {
        let points = [at(0, 0), at(5, 5), at(10, 10), at(20, 20)];
        let hull = HullGeometry::build(&points, plane(), 16, 1e-9).unwrap();
        assert!(hull.is_empty());
        assert!(!hull.contains(&at(5, 5)));
    }

    #[test]
    fn test_duplicates_merged() {
        let points = [at(0, 0), at(0, 0), at(0, 0), at(9, 9)];
        assert!(HullGeometry::build(&points, plane(), 16, 1e-9).unwrap().is_empty());
    }

    #[test]
    fn test_empty_axes_contain_nothing() {
        let hull = HullGeometry::build(&[at(0, 0), at(9, 0), at(0, 9)], AxisSet::empty(), 16, 1e-9).unwrap();
        assert!(hull.is_empty());
    }

    #[test]
    fn test_full_dimension_simplex() {
        let mut vertices = vec![Point::ORIGIN];
        for axis in Axis::ALL {
            vertices.push(Point::ORIGIN.with(axis, 60));
        }
        let hull = HullGeometry::build(&vertices, AxisSet::all(), 16, 1e-9).unwrap();
        assert_eq!(hull.simplex_count(), 1);
        assert!(hull.contains(&Point::new([10; 6])));
        assert!(hull.contains(&Point::ORIGIN.with(Axis::Liberty, 60)));
        assert!(!hull.contains(&Point::new([11; 6])));
    }

    #[test]
    fn test_many_vertices_reduce_to_corners() {
        // Sixteen points along one edge sort ahead of the two that close the triangle.
        let mut points: Vec<Point> = (0..16).map(|x| at(x, 0)).collect();
        points.push(at(50, 0));
        points.push(at(50, 50));
        let hull = HullGeometry::build(&points, plane(), 16, 1e-9).unwrap();
        assert!(!hull.is_empty());
        assert_eq!(hull.simplex_count(), 1);
        assert!(hull.contains(&at(10, 5)));
        assert!(hull.contains(&at(50, 25)));
        assert!(!hull.contains(&at(10, 20)));
    }

    #[test]
    fn test_interior_cloud_reduces_to_square() {
        let mut points = vec![at(0, 0), at(40, 0), at(40, 40), at(0, 40)];
        for x in 1..6 {
            for y in 1..6 {
                points.push(at(x * 6, y * 6));
            }
        }
        let hull = HullGeometry::build(&points, plane(), 8, 1e-9).unwrap();
        assert!(hull.contains(&at(39, 1)));
        assert!(hull.contains(&at(1, 39)));
        assert!(!hull.contains(&at(41, 20)));
    }

    #[test]
    fn test_too_many_corners_is_an_error() {
        // Edges turning through 24 distinct directions give 24 corners.
        let half = [
            (1, 0),
            (3, 1),
            (2, 1),
            (1, 1),
            (1, 2),
            (1, 3),
            (0, 1),
            (-1, 3),
            (-1, 2),
            (-1, 1),
            (-2, 1),
            (-3, 1),
        ];
        let edges = half.iter().copied().chain(half.iter().map(|(x, y)| (-x, -y)));
        let mut corner = (50, 30);
        let mut points = Vec::new();
        for (dx, dy) in edges {
            points.push(at(corner.0, corner.1));
            corner = (corner.0 + dx, corner.1 + dy);
        }
        assert_eq!(corner, (50, 30));
        let err = HullGeometry::build(&points, plane(), 16, 1e-9).unwrap_err();
        assert_eq!(err, TooManyVertices { vertices: 17, max_points: 16 });
    }

    #[test]
    fn test_degenerate_cloud_over_the_limit_is_empty() {
        let points: Vec<Point> = (0..20).map(|x| at(x, x)).collect();
        assert!(HullGeometry::build(&points, plane(), 16, 1e-9).unwrap().is_empty());
    }

    #[test]
    fn test_combinations() {
        let mut seen = Vec::new();
        for_each_combination(4, 2, |c| seen.push(c.to_vec()));
        assert_eq!(
            seen,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        let mut count = 0;
        for_each_combination(3, 4, |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_cache_hits_until_ttl() {
        let cache = HullCache::new(Duration::from_secs(60));
        let start = Instant::now();
        let mut builds = 0;

        for offset in [0, 30] {
            cache
                .get_or_build::<()>("zone_rim", start + Duration::from_secs(offset), || {
                    builds += 1;
                    Ok(square())
                })
                .unwrap();
        }
        assert_eq!(builds, 1);

        cache
            .get_or_build::<()>("zone_rim", start + Duration::from_secs(60), || {
                builds += 1;
                Ok(square())
            })
            .unwrap();
        assert_eq!(builds, 2);

        cache.invalidate("zone_rim");
        assert!(cache.is_empty());
    }
}
