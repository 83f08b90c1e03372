//! Revenue curves over a product's normalised lifetime `t ∈ [0, 1]`.

use serde::{Deserialize, Serialize};

/// Shape of revenue over time, as a fraction of peak revenue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RevenueCurve {
    /// Bell curve with peak 1.0 at `mean`.
    Gaussian { mean: f32, sd: f32 },
    /// Linear interpolation between `(t, value)` keyframes sorted by `t`;
    /// flat beyond the first and last key.
    Sampled { keys: Vec<(f32, f32)> },
}

impl Default for RevenueCurve {
    /// Quick ramp-up, long plateau, decline to zero at end of life.
    fn default() -> Self {
        RevenueCurve::Sampled {
            keys: vec![(0.0, 0.0), (0.15, 0.6), (0.3, 1.0), (0.7, 1.0), (1.0, 0.0)],
        }
    }
}

impl RevenueCurve {
    pub fn evaluate(&self, t: f32) -> f32 {
        match self {
            RevenueCurve::Gaussian { mean, sd } => {
                if *sd <= 0.0 {
                    return if (t - mean).abs() < f32::EPSILON { 1.0 } else { 0.0 };
                }
                let z = (t - mean) / sd;
                (-0.5 * z * z).exp()
            }
            RevenueCurve::Sampled { keys } => sample(keys, t),
        }
    }

    /// Keyframes must be finite and sorted by time.
    pub fn is_well_formed(&self) -> bool {
        match self {
            RevenueCurve::Gaussian { mean, sd } => mean.is_finite() && sd.is_finite(),
            RevenueCurve::Sampled { keys } => {
                keys.iter().all(|(t, v)| t.is_finite() && v.is_finite())
                    && keys.windows(2).all(|w| w[0].0 <= w[1].0)
            }
        }
    }
}

fn sample(keys: &[(f32, f32)], t: f32) -> f32 {
    let (first, last) = match (keys.first(), keys.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return 0.0,
    };
    if t <= first.0 {
        return first.1;
    }
    if t >= last.0 {
        return last.1;
    }
    for w in keys.windows(2) {
        let (t0, v0) = w[0];
        let (t1, v1) = w[1];
        if t >= t0 && t <= t1 {
            let span = t1 - t0;
            if span <= 0.0 {
                return v1;
            }
            return v0 + (v1 - v0) * (t - t0) / span;
        }
    }
    last.1
}
