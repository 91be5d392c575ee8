use std::f64::consts::PI;

use super::convergence::{VolatilityProblem, solve_volatility};
use super::types::{Encounter, RatingState};
use crate::config::settings::RatingSettings;
use crate::errors::VolatilityDivergence;

/// Center of the public rating scale
const RATING_CENTER: f64 = 1500.0;
/// Factor between the public scale and the internal Glicko-2 scale
const SCALE: f64 = 173.7178;

/// An opponent on the internal scale
#[derive(Debug, Clone, Copy)]
struct Opponent {
    mu: f64,
    phi: f64,
    score: f64,
}

impl From<&Encounter> for Opponent {
    fn from(encounter: &Encounter) -> Self {
        Self {
            mu: to_mu(encounter.opponent_rating),
            phi: to_phi(encounter.opponent_rd),
            score: encounter.score,
        }
    }
}

/// Apply one rating period's games to a character's prior state.
///
/// An empty period only grows the rating deviation; rating and volatility stay as they were.
pub fn update(
    prior: &RatingState,
    encounters: &[Encounter],
    settings: &RatingSettings,
) -> Result<RatingState, VolatilityDivergence> {
    let phi = to_phi(prior.rd);
    let sigma = prior.volatility.max(settings.min_volatility);

    if encounters.is_empty() {
        let phi_star = pre_period_phi(phi, sigma);
        return Ok(RatingState {
            rd: clamp_rd(from_phi(phi_star), settings),
            ..*prior
        });
    }

    let mu = to_mu(prior.rating);
    let opponents: Vec<Opponent> = encounters.iter().map(Opponent::from).collect();

    let variance = estimated_variance(mu, &opponents);
    let score_sum = weighted_score_sum(mu, &opponents);
    let delta = variance * score_sum;

    let problem = VolatilityProblem {
        delta,
        phi,
        variance,
        sigma,
        tau: settings.tau,
    };
    let sigma_prime = solve_volatility(
        &problem,
        settings.convergence_tolerance,
        settings.max_iterations,
    )?
    .max(settings.min_volatility);

    let phi_star = pre_period_phi(phi, sigma_prime);
    let phi_prime = 1.0 / (1.0 / phi_star.powi(2) + 1.0 / variance).sqrt();
    let mu_prime = mu + phi_prime.powi(2) * score_sum;

    Ok(RatingState {
        rating: from_mu(mu_prime),
        rd: clamp_rd(from_phi(phi_prime), settings),
        volatility: sigma_prime,
        matches: prior.matches + encounters.len() as u32,
    })
}

fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * phi.powi(2) / PI.powi(2)).sqrt()
}

fn expected_score(mu: f64, opponent: &Opponent) -> f64 {
    1.0 / (1.0 + (-g(opponent.phi) * (mu - opponent.mu)).exp())
}

fn estimated_variance(mu: f64, opponents: &[Opponent]) -> f64 {
    let inverse: f64 = opponents
        .iter()
        .map(|o| {
            let e = expected_score(mu, o);
            g(o.phi).powi(2) * e * (1.0 - e)
        })
        .sum();
    1.0 / inverse
}

fn weighted_score_sum(mu: f64, opponents: &[Opponent]) -> f64 {
    opponents
        .iter()
        .map(|o| g(o.phi) * (o.score - expected_score(mu, o)))
        .sum()
}

fn pre_period_phi(phi: f64, sigma: f64) -> f64 {
    (phi.powi(2) + sigma.powi(2)).sqrt()
}

fn clamp_rd(rd: f64, settings: &RatingSettings) -> f64 {
    let rd = rd.max(settings.min_rd);
    match settings.max_rd {
        Some(max_rd) => rd.min(max_rd),
        None => rd,
    }
}

fn to_mu(rating: f64) -> f64 {
    (rating - RATING_CENTER) / SCALE
}

fn to_phi(rd: f64) -> f64 {
    rd / SCALE
}

fn from_mu(mu: f64) -> f64 {
    RATING_CENTER + SCALE * mu
}

fn from_phi(phi: f64) -> f64 {
    SCALE * phi
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn uncapped() -> RatingSettings {
        RatingSettings {
            max_rd: None,
            ..RatingSettings::default()
        }
    }

    fn prior(rating: f64, rd: f64) -> RatingState {
        RatingState {
            rating,
            rd,
            volatility: 0.06,
            matches: 0,
        }
    }

    #[test]
    fn matches_the_reference_example() {
        let encounters = [
            Encounter::new(1400.0, 30.0, 1.0),
            Encounter::new(1550.0, 100.0, 0.0),
            Encounter::new(1700.0, 300.0, 0.0),
        ];

        let updated = update(&prior(1500.0, 200.0), &encounters, &RatingSettings::default()).unwrap();

        assert_abs_diff_eq!(updated.rating, 1464.06, epsilon = 0.01);
        assert_abs_diff_eq!(updated.rd, 151.52, epsilon = 0.01);
        assert_abs_diff_eq!(updated.volatility, 0.05999, epsilon = 0.01);
        assert_eq!(updated.matches, 3);
    }

    #[test]
    fn empty_period_only_grows_rd() {
        let before = prior(1620.0, 120.0);
        let after = update(&before, &[], &uncapped()).unwrap();

        assert_eq!(after.rating, before.rating);
        assert_eq!(after.volatility, before.volatility);
        assert_eq!(after.matches, before.matches);
        assert!(after.rd > before.rd);
    }

    #[test]
    fn rd_growth_stops_at_the_cap() {
        let after = update(&prior(1500.0, 350.0), &[], &RatingSettings::default()).unwrap();
        assert_eq!(after.rd, 350.0);

        let near_cap = update(&prior(1500.0, 349.99), &[], &RatingSettings::default()).unwrap();
        assert_eq!(near_cap.rd, 350.0);
    }

    #[test]
    fn winning_raises_and_losing_lowers_the_rating() {
        let settings = RatingSettings::default();
        let start = RatingState::default();

        let won = update(&start, &[Encounter::against(&start, true)], &settings).unwrap();
        let lost = update(&start, &[Encounter::against(&start, false)], &settings).unwrap();

        assert!(won.rating > 1500.0);
        assert!(lost.rating < 1500.0);
        assert_abs_diff_eq!(won.rating - 1500.0, 1500.0 - lost.rating, epsilon = 1e-9);
        assert!(won.rd < 350.0);
    }

    #[test]
    fn rd_never_drops_below_the_floor() {
        let settings = RatingSettings {
            min_rd: 60.0,
            ..RatingSettings::default()
        };
        let mut state = prior(1500.0, 61.0);
        let opponent = prior(1500.0, 30.0);

        for _ in 0..20 {
            state = update(&state, &[Encounter::against(&opponent, true)], &settings).unwrap();
        }

        assert!(state.rd >= 60.0);
        assert_eq!(state.matches, 20);
    }

    #[test]
    fn zero_volatility_is_lifted_to_the_floor() {
        let mut start = RatingState::default();
        start.volatility = 0.0;
        let settings = RatingSettings::default();

        let updated = update(&start, &[Encounter::new(1500.0, 350.0, 1.0)], &settings).unwrap();

        assert!(updated.volatility >= settings.min_volatility);
        assert!(updated.rating.is_finite());
    }

    #[test]
    fn divergence_propagates() {
        let settings = RatingSettings {
            max_iterations: 1,
            ..RatingSettings::default()
        };
        let encounters = [
            Encounter::new(1400.0, 30.0, 1.0),
            Encounter::new(1550.0, 100.0, 0.0),
            Encounter::new(1700.0, 300.0, 0.0),
        ];

        assert!(update(&prior(1500.0, 200.0), &encounters, &settings).is_err());
    }
}
