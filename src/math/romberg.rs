//! Romberg integration that records the integrand samples it uses.
//!
//! An expensive integrand `f(x)` is integrated once with `RecordedRomberg::integrate`,
//! which stores every sample in the order the trapezoid refinements request them.
//! Integrals of `f(x)*w(x)` for any number of cheap weight functions `w` can then
//! be computed with `RecordedRomberg::replay`, which re-runs the same Richardson
//! table on the stored samples without evaluating `f` again.

use super::fin;

/// Minimum number of rows computed in the Richardson table before
/// convergence is checked.
pub const MIN_ROWS: usize = 5;

/// Result of a Romberg integration whose samples have been recorded.
#[derive(Clone, Debug)]
pub struct RecordedRomberg {
    start: fin,
    end: fin,
    abscissae: Vec<fin>,
    samples: Vec<fin>,
    n_rows: usize,
    estimate: fin,
    last_difference: fin,
    converged: bool,
}

/// Final row of a Richardson extrapolation table, updated one row at a time.
#[derive(Clone, Debug, Default)]
struct RichardsonTable {
    row: Vec<fin>,
}

impl RichardsonTable {
    fn with_capacity(n_rows: usize) -> Self {
        Self {
            row: Vec::with_capacity(n_rows),
        }
    }

    /// Adds a new row starting with the given trapezoid estimate and returns
    /// the new and the previous diagonal entries.
    fn add_row(&mut self, trapezoid: fin) -> (fin, Option<fin>) {
        let previous_diagonal = self.row.last().copied();

        let mut previous = trapezoid;
        let mut factor = 1.0;
        for k in 0..self.row.len() {
            factor *= 4.0;
            let extrapolated = previous + (previous - self.row[k]) / (factor - 1.0);
            self.row[k] = std::mem::replace(&mut previous, extrapolated);
        }
        self.row.push(previous);

        (previous, previous_diagonal)
    }
}

/// Returns the number of samples used by a table with the given number of rows.
pub fn n_samples_for_rows(n_rows: usize) -> usize {
    if n_rows == 0 {
        0
    } else {
        (1 << (n_rows - 1)) + 1
    }
}

/// Returns the abscissae of the samples added by the given row of the table.
fn row_abscissae(start: fin, end: fin, row: usize) -> Vec<fin> {
    if row == 0 {
        vec![start, end]
    } else {
        let n_new = 1usize << (row - 1);
        let step = (end - start) / ((2 * n_new) as fin);
        (1..=n_new)
            .map(|j| start + ((2 * j - 1) as fin) * step)
            .collect()
    }
}

/// Computes the trapezoid estimate of the given row from the one of the
/// previous row and the sum of the samples added by the row.
fn refined_trapezoid(start: fin, end: fin, row: usize, previous: fin, new_sum: fin) -> fin {
    if row == 0 {
        0.5 * (end - start) * new_sum
    } else {
        let step = (end - start) / ((1usize << row) as fin);
        0.5 * previous + step * new_sum
    }
}

impl RecordedRomberg {
    /// Integrates the function from `start` to `end`, adding rows to the
    /// Richardson table until successive diagonal entries differ by less than
    /// `relative_accuracy` times the latest estimate, or `max_rows` rows are used.
    ///
    /// `evaluate_batch` is given all the abscissae of one row at a time, and must
    /// return the corresponding integrand values in the same order.
    pub fn integrate<E>(
        mut evaluate_batch: E,
        start: fin,
        end: fin,
        relative_accuracy: fin,
        max_rows: usize,
    ) -> Self
    where
        E: FnMut(&[fin]) -> Vec<fin>,
    {
        assert!(max_rows > 0, "Romberg table must have at least one row");
        let capacity = n_samples_for_rows(max_rows);
        let mut abscissae = Vec::with_capacity(capacity);
        let mut samples = Vec::with_capacity(capacity);

        let mut table = RichardsonTable::with_capacity(max_rows);
        let mut trapezoid = 0.0;
        let mut estimate = 0.0;
        let mut last_difference = fin::INFINITY;
        let mut converged = false;
        let mut n_rows = 0;

        for row in 0..max_rows {
            let new_abscissae = row_abscissae(start, end, row);
            let new_samples = evaluate_batch(&new_abscissae);
            assert_eq!(
                new_samples.len(),
                new_abscissae.len(),
                "Wrong number of integrand values"
            );

            trapezoid =
                refined_trapezoid(start, end, row, trapezoid, new_samples.iter().sum::<fin>());
            abscissae.extend_from_slice(&new_abscissae);
            samples.extend_from_slice(&new_samples);

            let (diagonal, previous_diagonal) = table.add_row(trapezoid);
            estimate = diagonal;
            n_rows = row + 1;

            if let Some(previous_diagonal) = previous_diagonal {
                last_difference = fin::abs(diagonal - previous_diagonal);
                if n_rows >= MIN_ROWS && last_difference < relative_accuracy * fin::abs(diagonal)
                {
                    converged = true;
                    break;
                }
            }
        }

        Self {
            start,
            end,
            abscissae,
            samples,
            n_rows,
            estimate,
            last_difference,
            converged,
        }
    }

    /// Computes the integral of the recorded function multiplied with the given
    /// weight function, using the same table size as the recorded integration.
    pub fn replay<W>(&self, weight: W) -> fin
    where
        W: Fn(fin) -> fin,
    {
        let mut table = RichardsonTable::with_capacity(self.n_rows);
        let mut trapezoid = 0.0;
        let mut estimate = 0.0;
        let mut offset = 0;

        for row in 0..self.n_rows {
            let n_new = if row == 0 { 2 } else { 1 << (row - 1) };
            let new_sum: fin = self.abscissae[offset..offset + n_new]
                .iter()
                .zip(&self.samples[offset..offset + n_new])
                .map(|(&x, &sample)| sample * weight(x))
                .sum();
            offset += n_new;

            trapezoid = refined_trapezoid(self.start, self.end, row, trapezoid, new_sum);
            estimate = table.add_row(trapezoid).0;
        }
        estimate
    }

    /// Returns the estimated integral of the recorded function.
    pub fn estimate(&self) -> fin {
        self.estimate
    }

    /// Returns the number of rows used in the Richardson table.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Returns the number of recorded samples.
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    /// Whether the requested accuracy was reached before running out of rows.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Returns the estimated relative error of the integral.
    pub fn achieved_relative_accuracy(&self) -> fin {
        if self.estimate == 0.0 {
            self.last_difference
        } else {
            self.last_difference / fin::abs(self.estimate)
        }
    }

    /// Returns the abscissae of the recorded samples, in recording order.
    pub fn abscissae(&self) -> &[fin] {
        &self.abscissae
    }

    /// Returns the recorded samples.
    pub fn samples(&self) -> &[fin] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_relative_eq;

    fn batch<F: Fn(fin) -> fin>(f: F) -> impl FnMut(&[fin]) -> Vec<fin> {
        move |xs: &[fin]| xs.iter().map(|&x| f(x)).collect()
    }

    #[test]
    fn romberg_converges_for_smooth_function() {
        let romberg = RecordedRomberg::integrate(batch(fin::exp), 0.0, 1.0, 1e-10, 20);
        assert!(romberg.converged());
        assert!(romberg.n_rows() >= MIN_ROWS);
        assert_eq!(romberg.n_samples(), n_samples_for_rows(romberg.n_rows()));
        assert_relative_eq!(romberg.estimate(), fin::exp(1.0) - 1.0, max_relative = 1e-10);
    }

    #[test]
    fn samples_are_recorded_in_refinement_order() {
        let romberg = RecordedRomberg::integrate(batch(|x| x * x), 0.0, 1.0, 1e-12, 3);
        assert!(!romberg.converged());
        assert_eq!(romberg.abscissae(), &[0.0, 1.0, 0.5, 0.25, 0.75]);
        assert_eq!(romberg.samples(), &[0.0, 1.0, 0.25, 0.0625, 0.5625]);
        assert_relative_eq!(romberg.estimate(), 1.0 / 3.0, max_relative = 1e-14);
    }

    #[test]
    fn replay_with_unit_weight_reproduces_estimate() {
        let romberg =
            RecordedRomberg::integrate(batch(|x| fin::exp(-x * x)), -2.0, 3.0, 1e-8, 16);
        assert_relative_eq!(romberg.replay(|_| 1.0), romberg.estimate(), max_relative = 1e-14);
    }

    #[test]
    fn replay_integrates_weighted_function() {
        let romberg = RecordedRomberg::integrate(batch(fin::sin), 0.0, 2.0, 1e-10, 20);
        // int sin(x)*x dx from 0 to 2 = sin(2) - 2*cos(2)
        let weighted = romberg.replay(|x| x);
        assert_relative_eq!(
            weighted,
            fin::sin(2.0) - 2.0 * fin::cos(2.0),
            max_relative = 1e-7
        );
    }

    #[test]
    fn non_converged_integration_is_reported() {
        let romberg = RecordedRomberg::integrate(batch(fin::sqrt), 0.0, 1.0, 1e-14, 6);
        assert!(!romberg.converged());
        assert_eq!(romberg.n_rows(), 6);
        assert!(romberg.achieved_relative_accuracy() > 1e-14);
    }
}
