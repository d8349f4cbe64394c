//! Gauss-Legendre rules on the interval `[-1, 1]` and on arbitrary intervals.

use crate::{Error, Rule};
use std::f64::consts::PI;

/// Upper bound on Newton iterations per root.
///
/// Convergence from the Chebyshev-like initial guess takes a handful of steps for every rule
/// size used in practice.
const MAX_NEWTON_ITERATIONS: usize = 100;

/// Legendre polynomial $P_n(x)$ together with $P_{n - 1}(x)$, evaluated by recurrence.
///
/// The derivative formula used here is singular at |x| == 1, so evaluation is only meaningful
/// in the open interval (-1, 1).
#[derive(Debug, Default)]
struct LegendreRecurrence {
    n: usize,
    x: f64,
    // p_n(x)
    current: f64,
    // p_{n - 1}(x)
    previous: f64,
}

impl LegendreRecurrence {
    fn evaluate(n: usize, x: f64) -> Self {
        //  m P_m(x) = (2m - 1) x P_{m - 1}(x) - (m - 1) P_{m - 2}(x)
        let mut current = 1.0;
        let mut previous = 0.0;
        for m in 1..=n {
            let m = m as f64;
            let before_previous = previous;
            previous = current;
            current = ((2.0 * m - 1.0) * x * previous - (m - 1.0) * before_previous) / m;
        }

        Self {
            n,
            x,
            current,
            previous,
        }
    }

    fn value(&self) -> f64 {
        self.current
    }

    fn derivative(&self) -> f64 {
        let n = self.n as f64;
        let x = self.x;
        // dP_n/dx (x) = n (x P_n(x) - P_{n - 1}(x)) / (x^2 - 1)
        n * (x * self.current - self.previous) / (x * x - 1.0)
    }
}

/// Gauss-Legendre rule with `num_points` points on `[-1, 1]`.
///
/// A rule with `n` points integrates polynomials of degree up to `2n - 1` exactly.
///
/// Returns [`Error::NoRuleAvailable`] if zero points are requested.
pub fn try_gauss(num_points: usize) -> Result<Rule<1>, Error> {
    let n = num_points;
    if n == 0 {
        return Err(Error::NoRuleAvailable);
    }

    // Roots are symmetric about the origin, so only the first half is computed by Newton's
    // method (following Numerical Recipes, 3rd ed., section 4.6).
    let m = (n + 1) / 2;
    let mut points = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);

    for i in 0..m {
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut recurrence = LegendreRecurrence::evaluate(n, x);

        for _ in 0..MAX_NEWTON_ITERATIONS {
            let dx = -recurrence.value() / recurrence.derivative();
            x += dx;
            recurrence = LegendreRecurrence::evaluate(n, x);
            if dx.abs() <= 1e-15 {
                break;
            }
        }

        let dp = recurrence.derivative();
        points.push([x]);
        weights.push(2.0 / ((1.0 - x * x) * dp * dp));
    }

    for i in m..n {
        let mirror = n - i - 1;
        points.push([-points[mirror][0]]);
        weights.push(weights[mirror]);
    }

    debug_assert_eq!(points.len(), n);
    Ok((weights, points))
}

/// Gauss-Legendre rule with `num_points` points on `[-1, 1]`.
///
/// # Panics
///
/// Panics if zero points are requested.
pub fn gauss(num_points: usize) -> Rule<1> {
    try_gauss(num_points).expect("number of points must be positive")
}

/// Gauss-Legendre rule mapped onto the interval `[a, b]`.
///
/// Points are mapped by $x = \frac{b - a}{2} \xi + \frac{b + a}{2}$ and weights are scaled by
/// $\frac{b - a}{2}$. A reversed interval (`b < a`) yields negative weights, so the rule still
/// computes the oriented integral.
pub fn gauss_on_interval(num_points: usize, a: f64, b: f64) -> Result<Rule<1>, Error> {
    let (mut weights, mut points) = try_gauss(num_points)?;
    let half_length = 0.5 * (b - a);
    let midpoint = 0.5 * (b + a);
    for ([x], w) in points.iter_mut().zip(weights.iter_mut()) {
        *x = half_length * *x + midpoint;
        *w *= half_length;
    }
    Ok((weights, points))
}
