// src/analysis/polynomial.rs
//
// Least-squares quadratic fit x = a·y² + b·y + c.
//
// Coordinate system:
//   - y is the independent variable (row, increases downward), x the dependent
//     one (column). Lane boundaries in a top-down view are near-vertical, so
//     x(y) stays single-valued where y(x) would not.
//   - y is normalized to [0, 1] over the sample extent before building the
//     normal equations, then the coefficients are mapped back to raw y. Raw
//     y⁴ sums over a 720-row frame reach ~1e14 and lose precision otherwise.

use crate::types::LanePixels;
use serde::Serialize;
use thiserror::Error;

/// Quadratic x = a·y² + b·y + c.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quadratic {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Quadratic {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    #[inline]
    pub fn eval(&self, y: f64) -> f64 {
        self.a * y * y + self.b * y + self.c
    }

    pub fn eval_all(&self, ys: &[f64]) -> Vec<f64> {
        ys.iter().map(|&y| self.eval(y)).collect()
    }

    /// Radius of curvature R = (1 + x'(y)²)^1.5 / |x''(y)| at `y`.
    /// Infinite for a straight line.
    pub fn radius_at(&self, y: f64) -> f64 {
        let slope = 2.0 * self.a * y + self.b;
        (1.0 + slope * slope).powf(1.5) / (2.0 * self.a).abs()
    }
}

/// Reasons a quadratic cannot be fitted. Recovered locally: the tracker only
/// turns them into `detected = false`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("need at least 3 points for a quadratic, got {0}")]
    TooFewPoints(usize),
    #[error("need at least 3 distinct rows for a quadratic, got {0}")]
    TooFewDistinctRows(usize),
    #[error("x/y sample lengths differ ({xs} vs {ys})")]
    LengthMismatch { xs: usize, ys: usize },
    #[error("normal equations are singular")]
    Singular,
    #[error("fit produced non-finite coefficients")]
    NonFinite,
}

/// Fit the boundary pixels of one side.
pub fn fit_pixels(pixels: &LanePixels) -> Result<Quadratic, FitError> {
    let xs: Vec<f64> = pixels.xs.iter().map(|&x| x as f64).collect();
    let ys: Vec<f64> = pixels.ys.iter().map(|&y| y as f64).collect();
    fit_quadratic(&xs, &ys)
}

/// Least-squares fit of x = a·y² + b·y + c minimizing squared x residuals.
pub fn fit_quadratic(xs: &[f64], ys: &[f64]) -> Result<Quadratic, FitError> {
    if xs.len() != ys.len() {
        return Err(FitError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }
    if xs.len() < 3 {
        return Err(FitError::TooFewPoints(xs.len()));
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite);
    }
    let distinct = distinct_rows_up_to_three(ys);
    if distinct < 3 {
        return Err(FitError::TooFewDistinctRows(distinct));
    }

    let y_min = ys.iter().copied().fold(f64::INFINITY, f64::min);
    let y_max = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let y_range = y_max - y_min;

    let n = xs.len() as f64;
    let (mut s1, mut s2, mut s3, mut s4) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
    let (mut sx0, mut sx1, mut sx2) = (0.0f64, 0.0f64, 0.0f64);

    for (&x, &y) in xs.iter().zip(ys) {
        let yn = (y - y_min) / y_range;
        let yn2 = yn * yn;
        s1 += yn;
        s2 += yn2;
        s3 += yn2 * yn;
        s4 += yn2 * yn2;
        sx0 += x;
        sx1 += x * yn;
        sx2 += x * yn2;
    }

    //   | s4 s3 s2 | | A |   | sx2 |
    //   | s3 s2 s1 | | B | = | sx1 |
    //   | s2 s1 n  | | C |   | sx0 |
    let (na, nb, nc) = solve_3x3([s4, s3, s2, s3, s2, s1, s2, s1, n], [sx2, sx1, sx0])
        .ok_or(FitError::Singular)?;

    // Undo yn = (y - m) / s
    let m = y_min;
    let s = y_range;
    let a = na / (s * s);
    let b = nb / s - 2.0 * na * m / (s * s);
    let c = na * m * m / (s * s) - nb * m / s + nc;

    if a.is_finite() && b.is_finite() && c.is_finite() {
        Ok(Quadratic { a, b, c })
    } else {
        Err(FitError::NonFinite)
    }
}

fn distinct_rows_up_to_three(ys: &[f64]) -> usize {
    let mut seen: [f64; 2] = [f64::NAN; 2];
    let mut count = 0usize;
    for &y in ys {
        if seen[..count].contains(&y) {
            continue;
        }
        if count == 2 {
            return 3;
        }
        seen[count] = y;
        count += 1;
    }
    count
}

/// Solve a 3×3 linear system Ax = b using Gaussian elimination with partial pivoting.
/// Matrix is row-major. Returns None if the system is singular.
fn solve_3x3(mat: [f64; 9], rhs: [f64; 3]) -> Option<(f64, f64, f64)> {
    let mut m = [
        [mat[0], mat[1], mat[2], rhs[0]],
        [mat[3], mat[4], mat[5], rhs[1]],
        [mat[6], mat[7], mat[8], rhs[2]],
    ];

    let scale = mat.iter().fold(0.0f64, |acc, v| acc.max(v.abs())).max(1.0);
    let eps = 1e-12 * scale;

    for col in 0..3 {
        let mut max_row = col;
        for row in (col + 1)..3 {
            if m[row][col].abs() > m[max_row][col].abs() {
                max_row = row;
            }
        }
        if m[max_row][col].abs() < eps {
            return None;
        }
        m.swap(col, max_row);

        for row in (col + 1)..3 {
            let factor = m[row][col] / m[col][col];
            for j in col..4 {
                m[row][j] -= factor * m[col][j];
            }
        }
    }

    let c = m[2][3] / m[2][2];
    let b = (m[1][3] - m[1][2] * c) / m[1][1];
    let a = (m[0][3] - m[0][2] * c - m[0][1] * b) / m[0][0];

    if a.is_finite() && b.is_finite() && c.is_finite() {
        Some((a, b, c))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(q: &Quadratic, ys: impl Iterator<Item = f64>) -> (Vec<f64>, Vec<f64>) {
        let ys: Vec<f64> = ys.collect();
        (q.eval_all(&ys), ys)
    }

    #[test]
    fn test_solve_3x3_identity() {
        let (a, b, c) = solve_3x3(
            [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            [1.0, 2.0, 3.0],
        )
        .unwrap();
        assert!((a - 1.0).abs() < 1e-10);
        assert!((b - 2.0).abs() < 1e-10);
        assert!((c - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_solve_3x3_singular() {
        let result = solve_3x3(
            [1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            [1.0, 1.0, 2.0],
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_fit_recovers_known_quadratic() {
        let truth = Quadratic::new(2.5e-4, -0.31, 412.0);
        let (xs, ys) = sample(&truth, (0..720).map(|y| y as f64));
        let fit = fit_quadratic(&xs, &ys).unwrap();
        assert!((fit.a - truth.a).abs() < 1e-9, "a: {} vs {}", fit.a, truth.a);
        assert!((fit.b - truth.b).abs() < 1e-6, "b: {} vs {}", fit.b, truth.b);
        assert!((fit.c - truth.c).abs() < 1e-4, "c: {} vs {}", fit.c, truth.c);
    }

    #[test]
    fn test_fit_recovers_quadratic_on_partial_extent() {
        // Samples only in the lower part of the frame, with an offset y origin
        let truth = Quadratic::new(-1.2e-3, 1.1, 150.0);
        let (xs, ys) = sample(&truth, (400..720).step_by(7).map(|y| y as f64));
        let fit = fit_quadratic(&xs, &ys).unwrap();
        assert!((fit.a - truth.a).abs() < 1e-9);
        assert!((fit.b - truth.b).abs() < 1e-6);
        assert!((fit.c - truth.c).abs() < 1e-3);
    }

    #[test]
    fn test_fit_exactly_three_points() {
        let truth = Quadratic::new(0.5, -2.0, 7.0);
        let (xs, ys) = sample(&truth, [0.0, 1.0, 2.0].into_iter());
        let fit = fit_quadratic(&xs, &ys).unwrap();
        assert!((fit.a - 0.5).abs() < 1e-9);
        assert!((fit.b + 2.0).abs() < 1e-9);
        assert!((fit.c - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_straight_vertical_line() {
        let ys: Vec<f64> = (0..100).map(|y| y as f64).collect();
        let xs = vec![300.0; 100];
        let fit = fit_quadratic(&xs, &ys).unwrap();
        assert!(fit.a.abs() < 1e-12);
        assert!(fit.b.abs() < 1e-9);
        assert!((fit.c - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_points() {
        assert_eq!(
            fit_quadratic(&[1.0, 2.0], &[0.0, 1.0]),
            Err(FitError::TooFewPoints(2))
        );
        assert_eq!(fit_pixels(&LanePixels::default()), Err(FitError::TooFewPoints(0)));
    }

    #[test]
    fn test_two_distinct_rows_is_degenerate() {
        let xs = [10.0, 11.0, 12.0, 13.0];
        let ys = [5.0, 5.0, 9.0, 9.0];
        assert_eq!(fit_quadratic(&xs, &ys), Err(FitError::TooFewDistinctRows(2)));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            fit_quadratic(&[1.0, 2.0, 3.0], &[1.0, 2.0]),
            Err(FitError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_radius_of_straight_line_is_infinite() {
        let q = Quadratic::new(0.0, 0.0, 300.0);
        assert!(q.radius_at(40.0).is_infinite());
    }

    #[test]
    fn test_radius_of_circle_approximation() {
        // x = y²/(2R) has curvature 1/R at y = 0
        let r = 500.0;
        let q = Quadratic::new(1.0 / (2.0 * r), 0.0, 0.0);
        assert!((q.radius_at(0.0) - r).abs() < 1e-9);
    }
}
