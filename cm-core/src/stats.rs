//! Descriptive statistics used by the engine and the experiment report

/// Arithmetic mean; `0.0` for an empty slice
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Unbiased sample variance; `0.0` with fewer than two samples
pub fn sample_variance(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let acc: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
    acc / (xs.len() as f64 - 1.0)
}

pub fn std_dev(xs: &[f64]) -> f64 {
    sample_variance(xs).sqrt()
}

/// z-score of `value`; `0.0` when `std` is zero
pub fn z_score(value: f64, mean: f64, std: f64) -> f64 {
    if std == 0.0 {
        return 0.0;
    }
    (value - mean) / std
}

/// Cohen's d with pooled standard deviation
pub fn cohens_d(group1: &[f64], group2: &[f64]) -> f64 {
    let n1 = group1.len() as f64;
    let n2 = group2.len() as f64;
    if n1 + n2 <= 2.0 {
        return 0.0;
    }
    let s1 = std_dev(group1);
    let s2 = std_dev(group2);
    let pooled = (((n1 - 1.0) * s1 * s1 + (n2 - 1.0) * s2 * s2) / (n1 + n2 - 2.0)).sqrt();
    if pooled == 0.0 {
        0.0
    } else {
        (mean(group1) - mean(group2)) / pooled
    }
}

/// Running mean and variance (Welford)
#[derive(Debug, Clone, Default)]
pub struct OnlineStatistics {
    n: u64,
    mean: f64,
    m2: f64,
}

impl OnlineStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, value: f64) {
        self.n += 1;
        let delta = value - self.mean;
        self.mean += delta / self.n as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    pub fn count(&self) -> u64 {
        self.n
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        if self.n < 2 {
            0.0
        } else {
            self.m2 / (self.n - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
