use crate::error::{Degeneracy, WarpError};

/// Pivots smaller than this are treated as zero.
pub const PIVOT_EPSILON: f64 = 1e-10;

/// Solve `a * x = b` by Gaussian elimination with partial pivoting.
///
/// Works on copies of `a` and `b`. Fails with
/// [`Degeneracy::SingularPivot`] as soon as a column has no usable pivot, so a
/// singular system never yields `NaN` or infinite entries.
pub fn solve<const N: usize>(a: &[[f64; N]; N], b: &[f64; N]) -> Result<[f64; N], WarpError> {
    let mut m = *a;
    let mut rhs = *b;

    for col in 0..N {
        // Find pivot
        let mut max_val = m[col][col].abs();
        let mut max_row = col;
        for row in (col + 1)..N {
            let v = m[row][col].abs();
            if v > max_val {
                max_val = v;
                max_row = row;
            }
        }
        // NaN compares false against everything, so test for it explicitly
        if !(max_val >= PIVOT_EPSILON) || !max_val.is_finite() {
            return Err(WarpError::DegenerateGeometry(
                Degeneracy::SingularPivot { column: col },
            ));
        }

        // Swap
        if max_row != col {
            m.swap(col, max_row);
            rhs.swap(col, max_row);
        }

        // Eliminate below
        let pivot = m[col][col];
        for row in (col + 1)..N {
            let factor = m[row][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for c in col..N {
                m[row][c] -= factor * m[col][c];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    // Back-substitute
    let mut x = [0.0f64; N];
    for row in (0..N).rev() {
        let mut sum = rhs[row];
        for c in (row + 1)..N {
            sum -= m[row][c] * x[c];
        }
        x[row] = sum / m[row][row];
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_diagonal_system() {
        let a = [[2.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, -1.0]];
        let b = [2.0, 8.0, 3.0];
        let x = solve(&a, &b).unwrap();
        assert_eq!(x, [1.0, 2.0, -3.0]);
    }

    #[test]
    fn solves_general_system() {
        // x + 2y - z = 2, 2x - y + 3z = 9, 3x + y + z = 8  →  (1, 2, 3)
        let a = [[1.0, 2.0, -1.0], [2.0, -1.0, 3.0], [3.0, 1.0, 1.0]];
        let b = [2.0, 9.0, 8.0];
        let x = solve(&a, &b).unwrap();
        for (i, expected) in [1.0, 2.0, 3.0].iter().enumerate() {
            assert!((x[i] - expected).abs() < 1e-12, "x[{i}] = {}", x[i]);
        }
    }

    #[test]
    fn pivoting_handles_zero_leading_entry() {
        // Without a row swap the first pivot would be 0
        let a = [[0.0, 1.0], [1.0, 0.0]];
        let b = [5.0, 7.0];
        let x = solve(&a, &b).unwrap();
        assert_eq!(x, [7.0, 5.0]);
    }

    #[test]
    fn pivoting_prefers_largest_entry() {
        // A tiny leading pivot loses all precision without partial pivoting
        let a = [[1e-17, 1.0], [1.0, 1.0]];
        let b = [1.0, 2.0];
        let x = solve(&a, &b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12, "x0 = {}", x[0]);
        assert!((x[1] - 1.0).abs() < 1e-12, "x1 = {}", x[1]);
    }

    #[test]
    fn does_not_mutate_inputs() {
        let a = [[0.0, 2.0], [3.0, 1.0]];
        let b = [4.0, 5.0];
        let (a0, b0) = (a, b);
        solve(&a, &b).unwrap();
        assert_eq!(a, a0);
        assert_eq!(b, b0);
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let a = [[1.0, 2.0], [2.0, 4.0]];
        let b = [3.0, 6.0];
        assert_eq!(
            solve(&a, &b),
            Err(WarpError::DegenerateGeometry(Degeneracy::SingularPivot { column: 1 }))
        );
    }

    #[test]
    fn zero_column_is_rejected() {
        let a = [[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0]];
        let b = [1.0, 1.0, 1.0];
        assert_eq!(
            solve(&a, &b),
            Err(WarpError::DegenerateGeometry(Degeneracy::SingularPivot { column: 0 }))
        );
    }

    #[test]
    fn nan_entries_are_rejected() {
        let a = [[f64::NAN, 0.0], [f64::NAN, 1.0]];
        let b = [1.0, 1.0];
        assert!(solve(&a, &b).is_err());
    }
}
