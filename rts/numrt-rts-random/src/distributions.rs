//! Distribution samplers.
//!
//! Every sampler validates its parameters before touching the generator, so
//! a rejected call leaves the engine state exactly as it was.

use crate::engine::Engine;
use crate::{EngineError, EngineResult};
use rand_distr::{Binomial, Cauchy, ChiSquared, Distribution, Exp, Gamma, Poisson, Weibull};

fn require(parameter: &'static str, value: f64, valid: bool) -> EngineResult<()> {
    if valid {
        Ok(())
    } else {
        Err(EngineError::invalid(parameter, value))
    }
}

fn positive(parameter: &'static str, value: f64) -> EngineResult<()> {
    require(parameter, value, value > 0.0 && value.is_finite())
}

fn probability(parameter: &'static str, value: f64) -> EngineResult<()> {
    require(parameter, value, (0.0..=1.0).contains(&value))
}

fn finite(parameter: &'static str, value: f64) -> EngineResult<()> {
    require(parameter, value, value.is_finite())
}

/// Saturating conversion of a non-negative count.
fn count_to_integer(value: f64) -> i64 {
    if value >= i64::MAX as f64 {
        i64::MAX
    } else {
        value as i64
    }
}

impl Engine {
    /// Standard normal deviate (Marsaglia polar method).
    ///
    /// Each accepted pair yields two deviates; the second is cached until
    /// the next call or the next reseed.
    pub fn standard_normal(&mut self) -> f64 {
        if let Some(z) = self.spare_normal.take() {
            return z;
        }
        loop {
            let u = 2.0 * self.uniform_exclusive() - 1.0;
            let v = 2.0 * self.uniform_exclusive() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                let factor = (-2.0 * s.ln() / s).sqrt();
                self.spare_normal = Some(v * factor);
                return u * factor;
            }
        }
    }

    /// Normal deviate with the given mean and standard deviation.
    pub fn normal(&mut self, mean: f64, sigma: f64) -> EngineResult<f64> {
        finite("mean", mean)?;
        require("sigma", sigma, sigma >= 0.0 && sigma.is_finite())?;
        Ok(mean + sigma * self.standard_normal())
    }

    /// Log-normal deviate: `exp(N(mu, sigma))`.
    pub fn log_normal(&mut self, mu: f64, sigma: f64) -> EngineResult<f64> {
        Ok(self.normal(mu, sigma)?.exp())
    }

    /// Weibull deviate.
    pub fn weibull(&mut self, scale: f64, shape: f64) -> EngineResult<f64> {
        positive("scale", scale)?;
        positive("shape", shape)?;
        let dist = Weibull::new(scale, shape).map_err(|_| EngineError::invalid("shape", shape))?;
        Ok(dist.sample(self))
    }

    /// Exponential deviate with the given rate.
    pub fn exponential(&mut self, rate: f64) -> EngineResult<f64> {
        positive("rate", rate)?;
        let dist = Exp::new(rate).map_err(|_| EngineError::invalid("rate", rate))?;
        Ok(dist.sample(self))
    }

    /// Gamma deviate with shape `k` and scale `theta`.
    pub fn gamma(&mut self, shape: f64, scale: f64) -> EngineResult<f64> {
        positive("shape", shape)?;
        positive("scale", scale)?;
        let dist = Gamma::new(shape, scale).map_err(|_| EngineError::invalid("shape", shape))?;
        Ok(dist.sample(self))
    }

    /// Rayleigh deviate (inverse CDF).
    pub fn rayleigh(&mut self, sigma: f64) -> EngineResult<f64> {
        positive("sigma", sigma)?;
        let u = self.uniform_exclusive();
        Ok(sigma * (-2.0 * u.ln()).sqrt())
    }

    /// Chi-squared deviate with `k` degrees of freedom.
    pub fn chi_squared(&mut self, degrees_of_freedom: f64) -> EngineResult<f64> {
        positive("degrees_of_freedom", degrees_of_freedom)?;
        let dist = ChiSquared::new(degrees_of_freedom)
            .map_err(|_| EngineError::invalid("degrees_of_freedom", degrees_of_freedom))?;
        Ok(dist.sample(self))
    }

    /// Poisson deviate with the given mean rate.
    pub fn poisson(&mut self, rate: f64) -> EngineResult<i64> {
        require("rate", rate, rate >= 0.0 && rate.is_finite())?;
        if rate == 0.0 {
            return Ok(0);
        }
        let dist = Poisson::new(rate).map_err(|_| EngineError::invalid("rate", rate))?;
        let draw: f64 = dist.sample(self);
        Ok(count_to_integer(draw))
    }

    /// Binomial deviate: successes in `trials` Bernoulli(`p`) trials.
    pub fn binomial(&mut self, trials: i64, p: f64) -> EngineResult<i64> {
        require("trials", trials as f64, trials > 0)?;
        probability("p", p)?;
        let dist = Binomial::new(trials as u64, p).map_err(|_| EngineError::invalid("p", p))?;
        let draw: u64 = dist.sample(self);
        Ok(i64::try_from(draw).unwrap_or(i64::MAX))
    }

    /// Geometric deviate: failures before the first success (inverse CDF).
    ///
    /// `p == 0` never succeeds and saturates to `i64::MAX`.
    pub fn geometric(&mut self, p: f64) -> EngineResult<i64> {
        probability("p", p)?;
        if p == 1.0 {
            return Ok(0);
        }
        if p == 0.0 {
            return Ok(i64::MAX);
        }
        let u = self.uniform_exclusive();
        Ok(count_to_integer((u.ln() / (-p).ln_1p()).floor()))
    }

    /// Cauchy-Lorentz deviate.
    pub fn cauchy_lorentz(&mut self, location: f64, scale: f64) -> EngineResult<f64> {
        finite("location", location)?;
        positive("scale", scale)?;
        let dist =
            Cauchy::new(location, scale).map_err(|_| EngineError::invalid("scale", scale))?;
        Ok(dist.sample(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Algorithm, Seed};

    fn engine() -> Engine {
        Engine::new(Algorithm::Xoshiro256StarStar, Seed::new([11, 22, 33, 44]))
    }

    fn mean_of(samples: &[f64]) -> f64 {
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    #[test]
    fn test_normal_moments() {
        let mut e = engine();
        let samples: Vec<f64> = (0..20_000).map(|_| e.normal(3.0, 2.0).unwrap()).collect();
        let mean = mean_of(&samples);
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!((mean - 3.0).abs() < 0.1, "mean {mean}");
        assert!((var - 4.0).abs() < 0.3, "variance {var}");
    }

    #[test]
    fn test_spare_normal_flushed_on_reseed() {
        let mut e = engine();
        let first = e.standard_normal();
        assert!(e.spare_normal.is_some());
        e.reseed(Seed::new([11, 22, 33, 44]));
        assert!(e.spare_normal.is_none());
        assert_eq!(e.standard_normal(), first);
    }

    #[test]
    fn test_exponential_mean() {
        let mut e = engine();
        let samples: Vec<f64> = (0..20_000).map(|_| e.exponential(4.0).unwrap()).collect();
        assert!((mean_of(&samples) - 0.25).abs() < 0.02);
    }

    #[test]
    fn test_rayleigh_mean() {
        let mut e = engine();
        let samples: Vec<f64> = (0..20_000).map(|_| e.rayleigh(1.0).unwrap()).collect();
        let expected = (std::f64::consts::PI / 2.0).sqrt();
        assert!((mean_of(&samples) - expected).abs() < 0.03);
    }

    #[test]
    fn test_poisson_mean_and_zero_rate() {
        let mut e = engine();
        let samples: Vec<f64> = (0..20_000).map(|_| e.poisson(3.5).unwrap() as f64).collect();
        assert!((mean_of(&samples) - 3.5).abs() < 0.1);
        assert_eq!(e.poisson(0.0).unwrap(), 0);
    }

    #[test]
    fn test_binomial_range() {
        let mut e = engine();
        for _ in 0..1000 {
            let k = e.binomial(10, 0.3).unwrap();
            assert!((0..=10).contains(&k));
        }
        assert_eq!(e.binomial(5, 1.0).unwrap(), 5);
        assert_eq!(e.binomial(5, 0.0).unwrap(), 0);
    }

    #[test]
    fn test_geometric_edges() {
        let mut e = engine();
        assert_eq!(e.geometric(1.0).unwrap(), 0);
        assert_eq!(e.geometric(0.0).unwrap(), i64::MAX);
        let samples: Vec<f64> = (0..20_000).map(|_| e.geometric(0.5).unwrap() as f64).collect();
        assert!((mean_of(&samples) - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_positive_samplers() {
        let mut e = engine();
        for _ in 0..100 {
            assert!(e.weibull(1.0, 1.5).unwrap() >= 0.0);
            assert!(e.gamma(2.0, 1.0).unwrap() >= 0.0);
            assert!(e.chi_squared(3.0).unwrap() >= 0.0);
            assert!(e.log_normal(0.0, 1.0).unwrap() > 0.0);
            assert!(e.cauchy_lorentz(0.0, 1.0).unwrap().is_finite());
        }
    }

    #[test]
    fn test_rejection_leaves_state_untouched() {
        let mut a = engine();
        let mut b = engine();
        assert!(matches!(
            a.poisson(-1.0),
            Err(EngineError::InvalidNumericValue { parameter: "rate", .. })
        ));
        assert!(a.binomial(10, 1.5).is_err());
        assert!(a.binomial(0, 0.5).is_err());
        assert!(a.binomial(-3, 0.5).is_err());
        assert!(a.geometric(-0.1).is_err());
        assert!(a.geometric(f64::NAN).is_err());
        assert!(a.exponential(0.0).is_err());
        assert!(a.weibull(-1.0, 1.0).is_err());
        assert!(a.gamma(1.0, f64::INFINITY).is_err());
        assert!(a.rayleigh(0.0).is_err());
        assert!(a.chi_squared(-2.0).is_err());
        assert!(a.normal(0.0, -1.0).is_err());
        assert!(a.cauchy_lorentz(0.0, 0.0).is_err());
        assert_eq!(a.next_u64(), b.next_u64());
    }
}
