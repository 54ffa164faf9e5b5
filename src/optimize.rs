//! Bounded scalar minimization.
//!
//! A coarse scan over the interval (which always includes the seed) picks the
//! best bracket, then Brent's method (golden section with parabolic
//! interpolation) refines inside it. The scan keeps a multimodal objective,
//! such as distance to a wiggly high-degree curve, from settling in a distant
//! local minimum next to the seed.

use serde::{Deserialize, Serialize};

/// Tuning for `minimize_bounded`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MinimizeOptions {
    /// Absolute tolerance on `x`.
    /// Default: 1e-10
    pub x_tolerance: f64,

    /// Maximum refinement iterations.
    /// Default: 500
    pub max_iterations: usize,

    /// Evenly spaced scan points used to bracket the minimum (0 disables the scan).
    /// Default: 64
    pub scan_points: usize,
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            x_tolerance: 1e-10,
            max_iterations: 500,
            scan_points: 64,
        }
    }
}

/// Outcome of a bounded minimization, successful or not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum {
    pub x: f64,
    pub fun: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Minimize `f` over `[lower, upper]` starting from `seed`.
pub fn minimize_bounded<F>(
    f: F,
    lower: f64,
    upper: f64,
    seed: f64,
    options: &MinimizeOptions,
) -> Minimum
where
    F: Fn(f64) -> f64,
{
    if !(lower.is_finite() && upper.is_finite()) || lower > upper {
        return Minimum {
            x: seed,
            fun: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }
    if lower == upper {
        let fun = f(lower);
        return Minimum {
            x: lower,
            fun,
            iterations: 0,
            converged: fun.is_finite(),
        };
    }

    let seed = seed.clamp(lower, upper);
    let (a, b) = bracket_by_scan(&f, lower, upper, seed, options.scan_points);
    let result = brent(&f, a, b, options);

    // The refinement never does worse than the seed it was bracketed around
    let seed_value = f(seed);
    if result.converged && seed_value < result.fun {
        return Minimum {
            x: seed,
            fun: seed_value,
            ..result
        };
    }
    result
}

/// Interval around the best of the scan samples and the seed.
fn bracket_by_scan<F>(f: &F, lower: f64, upper: f64, seed: f64, scan_points: usize) -> (f64, f64)
where
    F: Fn(f64) -> f64,
{
    if scan_points < 2 {
        return (lower, upper);
    }

    let step = (upper - lower) / (scan_points - 1) as f64;
    let mut xs: Vec<f64> = (0..scan_points).map(|i| lower + step * i as f64).collect();
    xs.push(seed);
    xs.sort_by(|a, b| a.total_cmp(b));

    let mut best = 0;
    let mut best_value = f64::INFINITY;
    for (i, &x) in xs.iter().enumerate() {
        let value = f(x);
        if value < best_value {
            best_value = value;
            best = i;
        }
    }

    let a = xs[best.saturating_sub(1)];
    let b = xs[(best + 1).min(xs.len() - 1)];
    (a.max(lower), b.min(upper))
}

/// Brent's bounded minimizer on `[a, b]`.
fn brent<F>(f: &F, mut a: f64, mut b: f64, options: &MinimizeOptions) -> Minimum
where
    F: Fn(f64) -> f64,
{
    let golden = 0.5 * (3.0 - 5.0_f64.sqrt());
    let sqrt_eps = f64::EPSILON.sqrt();

    let mut fulc = a + golden * (b - a);
    let mut nfc = fulc;
    let mut xf = fulc;
    let mut rat: f64 = 0.0;
    let mut e: f64 = 0.0;
    let mut fx = f(xf);
    let mut ffulc = fx;
    let mut fnfc = fx;
    let mut iterations = 0;

    let mut xm = 0.5 * (a + b);
    let mut tol1 = sqrt_eps * xf.abs() + options.x_tolerance / 3.0;
    let mut tol2 = 2.0 * tol1;

    while (xf - xm).abs() > tol2 - 0.5 * (b - a) {
        if iterations >= options.max_iterations || !fx.is_finite() {
            return Minimum {
                x: xf,
                fun: fx,
                iterations,
                converged: false,
            };
        }
        iterations += 1;

        let mut golden_step = true;
        if e.abs() > tol1 {
            // Try a parabolic step through the three best points
            let mut r = (xf - nfc) * (fx - ffulc);
            let mut q = (xf - fulc) * (fx - fnfc);
            let mut p = (xf - fulc) * q - (xf - nfc) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            r = e;
            e = rat;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - xf) && p < q * (b - xf) {
                rat = p / q;
                let x = xf + rat;
                if (x - a) < tol2 || (b - x) < tol2 {
                    rat = if xm >= xf { tol1 } else { -tol1 };
                }
                golden_step = false;
            }
        }

        if golden_step {
            e = if xf >= xm { a - xf } else { b - xf };
            rat = golden * e;
        }

        let sign = if rat >= 0.0 { 1.0 } else { -1.0 };
        let x = xf + sign * rat.abs().max(tol1);
        let fu = f(x);

        if fu <= fx {
            if x >= xf {
                a = xf;
            } else {
                b = xf;
            }
            fulc = nfc;
            ffulc = fnfc;
            nfc = xf;
            fnfc = fx;
            xf = x;
            fx = fu;
        } else {
            if x < xf {
                a = x;
            } else {
                b = x;
            }
            if fu <= fnfc || nfc == xf {
                fulc = nfc;
                ffulc = fnfc;
                nfc = x;
                fnfc = fu;
            } else if fu <= ffulc || fulc == xf || fulc == nfc {
                fulc = x;
                ffulc = fu;
            }
        }

        xm = 0.5 * (a + b);
        tol1 = sqrt_eps * xf.abs() + options.x_tolerance / 3.0;
        tol2 = 2.0 * tol1;
    }

    Minimum {
        x: xf,
        fun: fx,
        iterations,
        converged: fx.is_finite(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_minimum() {
        let m = minimize_bounded(
            |x| (x - 1.3).powi(2),
            -5.0,
            5.0,
            0.0,
            &MinimizeOptions::default(),
        );
        assert!(m.converged);
        assert!((m.x - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_minimum_on_boundary() {
        let m = minimize_bounded(|x| x, 2.0, 3.0, 2.5, &MinimizeOptions::default());
        assert!(m.converged);
        assert!((m.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_scan_escapes_local_minimum_near_seed() {
        // Shallow local minimum at the seed, deeper one at 4
        let f = |x: f64| 1.0 - 0.5 * (-x * x).exp() - (-4.0 * (x - 4.0).powi(2)).exp();
        let m = minimize_bounded(f, -5.0, 5.0, 0.0, &MinimizeOptions::default());
        assert!(m.converged);
        assert!((m.x - 4.0).abs() < 1e-4, "x = {}", m.x);
    }

    #[test]
    fn test_iteration_cap_reports_failure() {
        let options = MinimizeOptions {
            max_iterations: 1,
            x_tolerance: 1e-14,
            scan_points: 0,
        };
        let m = minimize_bounded(|x| (x - 0.123).powi(2), -100.0, 100.0, 0.0, &options);
        assert!(!m.converged);
        assert_eq!(m.iterations, 1);
    }
}
