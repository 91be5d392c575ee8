use crate::errors::VolatilityDivergence;

/// Inputs of the Glicko-2 volatility equation for one rating update
#[derive(Debug, Clone, Copy)]
pub struct VolatilityProblem {
    pub delta: f64,
    pub phi: f64,
    pub variance: f64,
    pub sigma: f64,
    pub tau: f64,
}

impl VolatilityProblem {
    fn gap(&self) -> f64 {
        self.delta.powi(2) - self.phi.powi(2) - self.variance
    }

    fn objective(&self, x: f64, a: f64) -> f64 {
        let ex = x.exp();
        let spread = self.phi.powi(2) + self.variance + ex;
        let numerator = ex * (self.gap() - ex);
        let denominator = 2.0 * spread.powi(2);
        numerator / denominator - (x - a) / self.tau.powi(2)
    }
}

/// Solve for the new volatility with the Illinois variant of regula falsi.
///
/// Bracket widening steps and interpolation steps share the `max_iterations` budget.
pub fn solve_volatility(
    problem: &VolatilityProblem,
    tolerance: f64,
    max_iterations: usize,
) -> Result<f64, VolatilityDivergence> {
    let a = problem.sigma.powi(2).ln();
    let mut iterations = 0;

    let mut lower = a;
    let mut upper = initial_upper_bound(problem, a, &mut iterations, max_iterations)?;
    let mut f_lower = problem.objective(lower, a);
    let mut f_upper = problem.objective(upper, a);

    while !has_converged(lower, upper, tolerance) {
        check_budget(iterations, max_iterations)?;
        iterations += 1;

        let candidate = lower + (lower - upper) * f_lower / (f_upper - f_lower);
        let f_candidate = problem.objective(candidate, a);
        if !f_candidate.is_finite() {
            return Err(VolatilityDivergence { iterations });
        }

        if f_candidate * f_upper <= 0.0 {
            lower = upper;
            f_lower = f_upper;
        } else {
            f_lower /= 2.0;
        }

        upper = candidate;
        f_upper = f_candidate;
    }

    Ok((lower / 2.0).exp())
}

fn initial_upper_bound(
    problem: &VolatilityProblem,
    a: f64,
    iterations: &mut usize,
    max_iterations: usize,
) -> Result<f64, VolatilityDivergence> {
    let gap = problem.gap();
    if gap > 0.0 {
        return Ok(gap.ln());
    }

    let mut k = 1.0;
    while problem.objective(a - k, a) < 0.0 {
        check_budget(*iterations, max_iterations)?;
        *iterations += 1;
        k += 1.0;
    }
    Ok(a - k)
}

fn has_converged(lower: f64, upper: f64, tolerance: f64) -> bool {
    (upper - lower).abs() <= tolerance
}

fn check_budget(iterations: usize, max_iterations: usize) -> Result<(), VolatilityDivergence> {
    if iterations < max_iterations {
        Ok(())
    } else {
        Err(VolatilityDivergence { iterations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // Intermediate quantities of the reference example in Glickman's Glicko-2 paper
    fn reference_problem() -> VolatilityProblem {
        VolatilityProblem {
            delta: -0.4834,
            phi: 1.1513,
            variance: 1.7785,
            sigma: 0.06,
            tau: 0.5,
        }
    }

    #[test]
    fn converges_on_the_reference_example() {
        let sigma = solve_volatility(&reference_problem(), 1e-6, 100).unwrap();
        assert_abs_diff_eq!(sigma, 0.05999, epsilon = 1e-5);
    }

    #[test]
    fn large_improvement_uses_the_log_gap_bracket() {
        let problem = VolatilityProblem {
            delta: 3.0,
            phi: 0.5,
            variance: 1.0,
            sigma: 0.06,
            tau: 0.5,
        };

        let sigma = solve_volatility(&problem, 1e-6, 100).unwrap();
        assert!(sigma > 0.06);
    }

    #[test]
    fn reports_divergence_when_the_budget_is_exhausted() {
        let result = solve_volatility(&reference_problem(), 1e-6, 1);
        assert_eq!(result, Err(VolatilityDivergence { iterations: 1 }));
    }
}
