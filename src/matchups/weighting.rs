/// Weight of a match `age` positions before the most recent one (age 0).
pub fn recency_weight(age: usize, decay: f64) -> f64 {
    apply_exponential_decay(age as f64, decay)
}

/// Weights for `len` matches ordered oldest first, so the last match gets weight 1.
pub fn recency_weights(len: usize, decay: f64) -> Vec<f64> {
    (0..len)
        .rev()
        .map(|age| recency_weight(age, decay))
        .collect()
}

fn apply_exponential_decay(age: f64, decay: f64) -> f64 {
    // weight = exp(-decay × age)
    (-decay * age).exp()
}
