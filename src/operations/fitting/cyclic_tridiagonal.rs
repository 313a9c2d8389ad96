use std::ops::{Add, Mul, Sub};

use crate::math::TOLERANCE;

/// Solves a cyclic tridiagonal system
///
/// ```text
/// a[i] * x[i-1] + b[i] * x[i] + c[i] * x[i+1] = r[i]    (indices mod n)
/// ```
///
/// with the Sherman-Morrison correction over two Thomas sweeps. Returns
/// `None` if `n < 3` or a pivot vanishes.
pub(super) fn solve_cyclic<T>(a: &[f64], b: &[f64], c: &[f64], r: &[T]) -> Option<Vec<T>>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f64, Output = T>,
{
    let n = b.len();
    if n < 3 || a.len() != n || c.len() != n || r.len() != n {
        return None;
    }

    // Corner couplings: row 0 touches x[n-1], row n-1 touches x[0].
    let beta = a[0];
    let alpha = c[n - 1];
    let gamma = -b[0];
    if gamma.abs() < TOLERANCE {
        return None;
    }

    let mut bb = b.to_vec();
    bb[0] = b[0] - gamma;
    bb[n - 1] = b[n - 1] - alpha * beta / gamma;

    let x = solve_tridiagonal(a, &bb, c, r)?;

    let mut u = vec![0.0; n];
    u[0] = gamma;
    u[n - 1] = alpha;
    let z = solve_tridiagonal(a, &bb, c, &u)?;

    let denom = 1.0 + z[0] + beta * z[n - 1] / gamma;
    if denom.abs() < TOLERANCE {
        return None;
    }
    let correction = (x[0] + x[n - 1] * (beta / gamma)) * (1.0 / denom);

    Some(
        x.iter()
            .zip(&z)
            .map(|(&xi, &zi)| xi - correction * zi)
            .collect(),
    )
}

/// Thomas algorithm for a plain tridiagonal system; `a[0]` and `c[n-1]`
/// are ignored.
fn solve_tridiagonal<T>(a: &[f64], b: &[f64], c: &[f64], r: &[T]) -> Option<Vec<T>>
where
    T: Copy + Sub<Output = T> + Mul<f64, Output = T>,
{
    let n = b.len();
    let mut c_prime = vec![0.0; n];
    let mut d_prime: Vec<T> = Vec::with_capacity(n);

    if b[0].abs() < TOLERANCE {
        return None;
    }
    c_prime[0] = c[0] / b[0];
    d_prime.push(r[0] * (1.0 / b[0]));

    for i in 1..n {
        let pivot = b[i] - a[i] * c_prime[i - 1];
        if pivot.abs() < TOLERANCE {
            return None;
        }
        c_prime[i] = c[i] / pivot;
        let next = (r[i] - d_prime[i - 1] * a[i]) * (1.0 / pivot);
        d_prime.push(next);
    }

    let mut x = d_prime;
    for i in (0..n - 1).rev() {
        x[i] = x[i] - x[i + 1] * c_prime[i];
    }
    Some(x)
}
