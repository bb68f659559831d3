use core::ops::{Add, Index, Mul, Sub};

use crate::Error;

/// Square `D x D` matrix stored row-major.
pub type Matrix<const D: usize> = [[f64; D]; D];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<const D: usize> {
    pub coords: [f64; D],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector<const D: usize> {
    pub coords: [f64; D],
}

impl<const D: usize> Point<D> {
    pub const fn new(coords: [f64; D]) -> Self {
        Self { coords }
    }

    pub fn origin() -> Self {
        Self { coords: [0.0; D] }
    }
}

impl<const D: usize> Default for Point<D> {
    fn default() -> Self {
        Self::origin()
    }
}

impl<const D: usize> Index<usize> for Point<D> {
    type Output = f64;

    fn index(&self, axis: usize) -> &f64 {
        &self.coords[axis]
    }
}

impl<const D: usize> Vector<D> {
    pub const fn new(coords: [f64; D]) -> Self {
        Self { coords }
    }

    pub fn zero() -> Self {
        Self { coords: [0.0; D] }
    }

    pub fn dot(self, rhs: Self) -> f64 {
        self.coords
            .iter()
            .zip(rhs.coords.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }
}

impl<const D: usize> Default for Vector<D> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const D: usize> Add<Vector<D>> for Point<D> {
    type Output = Point<D>;

    fn add(self, rhs: Vector<D>) -> Self::Output {
        Point {
            coords: core::array::from_fn(|i| self.coords[i] + rhs.coords[i]),
        }
    }
}

impl<const D: usize> Sub<Vector<D>> for Point<D> {
    type Output = Point<D>;

    fn sub(self, rhs: Vector<D>) -> Self::Output {
        Point {
            coords: core::array::from_fn(|i| self.coords[i] - rhs.coords[i]),
        }
    }
}

impl<const D: usize> Sub<Point<D>> for Point<D> {
    type Output = Vector<D>;

    fn sub(self, rhs: Point<D>) -> Self::Output {
        Vector {
            coords: core::array::from_fn(|i| self.coords[i] - rhs.coords[i]),
        }
    }
}

impl<const D: usize> Add for Vector<D> {
    type Output = Vector<D>;

    fn add(self, rhs: Vector<D>) -> Self::Output {
        Vector {
            coords: core::array::from_fn(|i| self.coords[i] + rhs.coords[i]),
        }
    }
}

impl<const D: usize> Mul<f64> for Vector<D> {
    type Output = Vector<D>;

    fn mul(self, rhs: f64) -> Self::Output {
        Vector {
            coords: self.coords.map(|c| c * rhs),
        }
    }
}

pub fn identity_matrix<const D: usize>() -> Matrix<D> {
    core::array::from_fn(|r| core::array::from_fn(|c| if r == c { 1.0 } else { 0.0 }))
}

pub fn mat_vec<const D: usize>(m: &Matrix<D>, v: &[f64; D]) -> [f64; D] {
    core::array::from_fn(|r| m[r].iter().zip(v.iter()).map(|(a, b)| a * b).sum())
}

pub fn mat_mul<const D: usize>(a: &Matrix<D>, b: &Matrix<D>) -> Matrix<D> {
    core::array::from_fn(|r| core::array::from_fn(|c| (0..D).map(|k| a[r][k] * b[k][c]).sum()))
}

/// Gauss-Jordan inverse with partial pivoting.
///
/// Returns `None` when a pivot falls below a scale-relative tolerance.
pub fn invert_matrix<const D: usize>(m: &Matrix<D>) -> Option<Matrix<D>> {
    let scale = m
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    if !scale.is_finite() || scale == 0.0 {
        return None;
    }
    let tol = scale * 1e-12;

    let mut a = *m;
    let mut inv = identity_matrix::<D>();

    for col in 0..D {
        let pivot_row = (col..D).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot_row][col].abs() <= tol {
            return None;
        }
        a.swap(col, pivot_row);
        inv.swap(col, pivot_row);

        let p = a[col][col];
        for k in 0..D {
            a[col][k] /= p;
            inv[col][k] /= p;
        }

        for row in 0..D {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in 0..D {
                a[row][k] -= factor * a[col][k];
                inv[row][k] -= factor * inv[col][k];
            }
        }
    }

    Some(inv)
}

/// `p -> matrix * p + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform<const D: usize> {
    pub matrix: Matrix<D>,
    pub offset: Vector<D>,
}

impl<const D: usize> AffineTransform<D> {
    pub fn new(matrix: Matrix<D>, offset: Vector<D>) -> Self {
        Self { matrix, offset }
    }

    pub fn identity() -> Self {
        Self {
            matrix: identity_matrix(),
            offset: Vector::zero(),
        }
    }

    pub fn translation(offset: Vector<D>) -> Self {
        Self {
            matrix: identity_matrix(),
            offset,
        }
    }

    pub fn transform_point(&self, p: &Point<D>) -> Point<D> {
        Point {
            coords: mat_vec(&self.matrix, &p.coords),
        } + self.offset
    }

    pub fn inverse(&self) -> Result<Self, Error> {
        let matrix = invert_matrix(&self.matrix).ok_or(Error::SingularTransform)?;
        let t = mat_vec(&matrix, &self.offset.coords);
        Ok(Self {
            matrix,
            offset: Vector {
                coords: t.map(|c| -c),
            },
        })
    }
}

impl<const D: usize> Default for AffineTransform<D> {
    fn default() -> Self {
        Self::identity()
    }
}
