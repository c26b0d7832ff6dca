use crate::PiError;

/// Floating point type used throughout the simulator.
pub type Real = f64;

/// Absolute/relative tolerance pair.
///
/// Used both for float comparisons and as the `rtol`/`atol` pair handed to
/// the adaptive integrator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

impl Tolerances {
    pub fn new(abs: Real, rel: Real) -> Result<Self, PiError> {
        if !(abs.is_finite() && rel.is_finite()) || abs < 0.0 || rel < 0.0 {
            return Err(PiError::InvalidArg {
                what: "tolerances must be finite and non-negative",
            });
        }
        if abs == 0.0 && rel == 0.0 {
            return Err(PiError::InvalidArg {
                what: "at least one tolerance must be positive",
            });
        }
        Ok(Self { abs, rel })
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, PiError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PiError::NonFinite { what, value: v })
    }
}

/// Strictly positive and finite, as required of time constants and gains.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, PiError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(PiError::InvalidArg { what })
    }
}

/// `n` uniformly spaced points over `[start, end]`, both ends included.
///
/// The last point is exactly `end` so that sampled runs always report the
/// requested horizon.
pub fn linspace(start: Real, end: Real, n: usize) -> Vec<Real> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as Real;
            let mut out: Vec<Real> = (0..n).map(|i| start + step * i as Real).collect();
            out[n - 1] = end;
            out
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn linspace_is_uniform_and_bounded(
            end in 0.1_f64..100.0,
            n in 2_usize..2000,
        ) {
            let t = linspace(0.0, end, n);
            prop_assert_eq!(t.len(), n);
            prop_assert_eq!(t[n - 1], end);
            let step = end / (n - 1) as f64;
            let tol = Tolerances { abs: 1e-9, rel: 1e-9 };
            for w in t.windows(2) {
                prop_assert!(w[1] > w[0]);
                prop_assert!(nearly_equal(w[1] - w[0], step, tol));
            }
        }
    }
}
