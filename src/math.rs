//! Math utilities.

pub mod romberg;

use crate::constants::PI;
use special::Gamma;
use special_fun::FloatSpecial;

/// Floating-point precision to use for integration.
#[allow(non_camel_case_types)]
pub type fin = f64;

/// Argument above which `bessel_k_scaled` switches to the asymptotic
/// expansion, as `K_n(x)` approaches the underflow limit.
const BESSEL_ASYMPTOTIC_THRESHOLD: fin = 500.0;

/// Number of correction terms kept in the asymptotic expansion of `K_n`.
const BESSEL_ASYMPTOTIC_TERMS: usize = 8;

/// Estimates the integral of the given function over the given interval using a
/// five-point Gauss-Legendre quadrature.
pub fn integrate_five_point_gauss_legendre<E>(evaluate_integrand: E, start: fin, end: fin) -> fin
where
    E: Fn(fin) -> fin,
{
    const COORD_1: fin = -0.906_179_845_938_664; // -(1/3)*sqrt(5 + 2*sqrt(10/7))
    const COORD_2: fin = -0.538_469_310_105_683; // -(1/3)*sqrt(5 - 2*sqrt(10/7))
    const COORD_3: fin = 0.0;
    const COORD_4: fin = -COORD_2; // (1/3)*sqrt(5 - 2*sqrt(10/7))
    const COORD_5: fin = -COORD_1; // (1/3)*sqrt(5 + 2*sqrt(10/7))

    const WEIGHT_1: fin = 0.236_926_885_056_189_08; // (322 - 13*sqrt(70))/900
    const WEIGHT_2: fin = 0.478_628_670_499_366_47; // (322 + 13*sqrt(70))/900
    const WEIGHT_3: fin = 128.0 / 225.0;
    const WEIGHT_4: fin = WEIGHT_2; // (322 + 13*sqrt(70))/900
    const WEIGHT_5: fin = WEIGHT_1; // (322 - 13*sqrt(70))/900

    assert!(
        end >= start,
        "Interval end {:?} is smaller than interval start {:?}",
        end,
        start
    );
    let interval_scale = 0.5 * (end - start);
    let interval_offset = 0.5 * (end + start);

    interval_scale
        * (WEIGHT_1 * evaluate_integrand(interval_offset + interval_scale * COORD_1)
            + WEIGHT_2 * evaluate_integrand(interval_offset + interval_scale * COORD_2)
            + WEIGHT_3 * evaluate_integrand(interval_offset + interval_scale * COORD_3)
            + WEIGHT_4 * evaluate_integrand(interval_offset + interval_scale * COORD_4)
            + WEIGHT_5 * evaluate_integrand(interval_offset + interval_scale * COORD_5))
}

/// Estimates the integral of the given function over the given interval by
/// applying the five-point Gauss-Legendre quadrature to each of `n_intervals`
/// equal subintervals.
pub fn integrate_composite_five_point_gauss_legendre<E>(
    evaluate_integrand: E,
    start: fin,
    end: fin,
    n_intervals: usize,
) -> fin
where
    E: Fn(fin) -> fin,
{
    assert!(n_intervals > 0, "Number of subintervals must be non-zero");
    let width = (end - start) / (n_intervals as fin);
    (0..n_intervals)
        .map(|idx| {
            let lower = start + (idx as fin) * width;
            integrate_five_point_gauss_legendre(&evaluate_integrand, lower, lower + width)
        })
        .sum()
}

/// Returns the centers of `n_cells` equal cells covering `[start, end]`,
/// together with the cell width.
pub fn midpoint_grid(start: fin, end: fin, n_cells: usize) -> (Vec<fin>, fin) {
    if n_cells == 0 {
        return (Vec::new(), 0.0);
    }
    let width = (end - start) / (n_cells as fin);
    let centers = (0..n_cells)
        .map(|idx| start + ((idx as fin) + 0.5) * width)
        .collect();
    (centers, width)
}

/// Returns `n_values` evenly spaced values from `start` to `end`, both included.
pub fn linear_grid(start: fin, end: fin, n_values: usize) -> Vec<fin> {
    match n_values {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / ((n_values - 1) as fin);
            (0..n_values)
                .map(|idx| start + (idx as fin) * step)
                .collect()
        }
    }
}

/// Computes the width of the cell around each coordinate of the given
/// ascending grid, using the midpoints between neighbors as cell boundaries.
///
/// The outermost cells are given the width of their only neighboring interval,
/// so that every cell of an evenly spaced grid has the grid spacing as width.
pub fn cell_widths(coords: &[fin]) -> Vec<fin> {
    let n = coords.len();
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n)
            .map(|idx| {
                if idx == 0 {
                    coords[1] - coords[0]
                } else if idx == n - 1 {
                    coords[n - 1] - coords[n - 2]
                } else {
                    0.5 * (coords[idx + 1] - coords[idx - 1])
                }
            })
            .collect(),
    }
}

/// Evaluates the exponentially scaled modified Bessel function of the second
/// kind, `K_n(x)*exp(x)`, for `x > 0`.
///
/// For large arguments, where `K_n(x)` would underflow, the asymptotic
/// expansion `sqrt(pi/(2x))*(1 + (4n^2 - 1)/(8x) + ...)` is used instead.
pub fn bessel_k_scaled(order: i32, x: fin) -> fin {
    assert!(x > 0.0, "Argument of Bessel function must be positive");
    if x < BESSEL_ASYMPTOTIC_THRESHOLD {
        x.besselk(order) * fin::exp(x)
    } else {
        bessel_k_scaled_asymptotic(order, x)
    }
}

fn bessel_k_scaled_asymptotic(order: i32, x: fin) -> fin {
    let four_order_sqr = 4.0 * (order as fin).powi(2);
    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 1..=BESSEL_ASYMPTOTIC_TERMS {
        let odd = (2 * k - 1) as fin;
        term *= (four_order_sqr - odd * odd) / (8.0 * (k as fin) * x);
        sum += term;
    }
    fin::sqrt(PI / (2.0 * x)) * sum
}

/// Evaluates the ratio of gamma functions `Gamma(a)/Gamma(b)`.
pub fn gamma_ratio(a: fin, b: fin) -> fin {
    Gamma::gamma(a) / Gamma::gamma(b)
}
