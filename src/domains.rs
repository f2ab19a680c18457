/*!
Domain models for the two spaces the sampler ties together.

[`EmbeddedDomain`] describes the low-dimensional space samples are ultimately
expressed in: a center, a length scale, and a distribution kind, with a single
`draw_one` operation. [`BoundedAmbientDomain`] describes the high-dimensional
space carrying the feasibility box: a membership test, a truncated density,
and an unconstrained-but-scaled generator.

Both are immutable after construction, and all validation happens eagerly in
the constructors. Every random draw goes through an explicit `&mut impl Rng`
handle so runs are reproducible from a seed.

# Examples

```rust
use embedded_sampler::domains::{BoundedAmbientDomain, DomainKind, EmbeddedDomain};
use nalgebra::dvector;
use rand::rngs::SmallRng;
use rand::SeedableRng;

let mut rng = SmallRng::seed_from_u64(42);

// A 2D embedded space, uniform over [-1, 1]^2.
let embedded = EmbeddedDomain::isotropic(2, 0.0, 1.0, DomainKind::Uniform)?;
let point = embedded.draw_one(&mut rng);
assert_eq!(point.len(), 2);

// A 3D ambient box [0, 2]^3 with a truncated-Gaussian density.
let ambient = BoundedAmbientDomain::new(
    dvector![0.0, 0.0, 0.0],
    dvector![2.0, 2.0, 2.0],
    DomainKind::Gaussian,
)?;
assert!(ambient.is_in_domain(&dvector![1.0, 1.0, 1.0]));
assert!(ambient.density(&dvector![1.0, 1.0, 1.0]) > 0.0);
# Ok::<(), embedded_sampler::error::ConfigError>(())
```
*/

use std::str::FromStr;

use nalgebra::DVector;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::ConfigError;

/// The probability density a domain is equipped with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainKind {
    /// Independent per-axis uniform density.
    Uniform,
    /// Independent per-axis Gaussian density (truncated to the box for
    /// [`BoundedAmbientDomain`]).
    Gaussian,
}

impl FromStr for DomainKind {
    type Err = ConfigError;

    /// Parses the legacy string tags `"uniform"` and `"gaussian"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform" => Ok(DomainKind::Uniform),
            "gaussian" => Ok(DomainKind::Gaussian),
            other => Err(ConfigError::UnknownKind {
                what: "distribution kind",
                got: other.to_string(),
            }),
        }
    }
}

/**
The low-dimensional embedded space.

Holds a per-axis center `mu`, a per-axis length scale `sigma`, and a
[`DomainKind`]. The only runtime operation is [`draw_one`](Self::draw_one),
which never fails.

# Examples

```rust
use embedded_sampler::domains::{DomainKind, EmbeddedDomain};
use nalgebra::dvector;
use rand::rngs::SmallRng;
use rand::SeedableRng;

let domain = EmbeddedDomain::new(
    dvector![0.0, 5.0],
    dvector![1.0, 0.5],
    DomainKind::Gaussian,
)?;
let x = domain.draw_one(&mut SmallRng::seed_from_u64(7));
assert_eq!(x.len(), 2);
# Ok::<(), embedded_sampler::error::ConfigError>(())
```
*/
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedDomain {
    mu: DVector<f64>,
    sigma: DVector<f64>,
    kind: DomainKind,
}

impl EmbeddedDomain {
    /// Creates an embedded domain from per-axis center and scale vectors.
    ///
    /// Fails if the vectors are empty, their lengths disagree, or any scale
    /// entry is zero, negative, or non-finite.
    pub fn new(
        mu: DVector<f64>,
        sigma: DVector<f64>,
        kind: DomainKind,
    ) -> Result<Self, ConfigError> {
        if mu.is_empty() {
            return Err(ConfigError::EmptyDomain);
        }
        if sigma.len() != mu.len() {
            return Err(ConfigError::DimensionMismatch {
                what: "embedded domain scale",
                expected: mu.len(),
                got: sigma.len(),
            });
        }
        if sigma.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ConfigError::NonPositiveScale {
                what: "embedded domain scale",
            });
        }
        Ok(Self { mu, sigma, kind })
    }

    /// Creates a `dim`-dimensional domain with the same scalar center and
    /// scale broadcast to every axis.
    pub fn isotropic(
        dim: usize,
        mu: f64,
        sigma: f64,
        kind: DomainKind,
    ) -> Result<Self, ConfigError> {
        Self::new(
            DVector::from_element(dim, mu),
            DVector::from_element(dim, sigma),
            kind,
        )
    }

    /// The dimension of the embedded space.
    pub fn dim(&self) -> usize {
        self.mu.len()
    }

    /// The distribution kind this domain was built with.
    pub fn kind(&self) -> DomainKind {
        self.kind
    }

    /// Draws one point from the domain's density.
    ///
    /// For [`DomainKind::Uniform`], each coordinate is drawn independently
    /// and uniformly from `[mu - sigma, mu + sigma]`. For
    /// [`DomainKind::Gaussian`], each coordinate is drawn from
    /// `N(mu, sigma)`. Never fails at call time.
    pub fn draw_one<R: Rng>(&self, rng: &mut R) -> DVector<f64> {
        match self.kind {
            DomainKind::Uniform => DVector::from_iterator(
                self.dim(),
                self.mu
                    .iter()
                    .zip(self.sigma.iter())
                    .map(|(&m, &s)| rng.gen_range(m - s..=m + s)),
            ),
            DomainKind::Gaussian => DVector::from_iterator(
                self.dim(),
                self.mu.iter().zip(self.sigma.iter()).map(|(&m, &s)| {
                    Normal::new(m, s)
                        .expect("scales are validated at construction")
                        .sample(rng)
                }),
            ),
        }
    }
}

/**
The high-dimensional ambient space: a bounded box `[L, U]` with an associated
density and an automatically derived length scale.

Derived at construction: `center = (L + U) / 2` and
`scale = k_sigma * average_box_length()`, where
[`average_box_length`](Self::average_box_length) is the mean side length of
the box. The scale multiplier `k_sigma` defaults to 1.

Note the asymmetry baked into the uniform variant: the density descales its
query point by `k_sigma` before the membership test, while the generator
scales the bounds by `k_sigma` directly. Both behaviors are long-standing and
kept exactly as they are; callers relying on either should read
[`density`](Self::density) and
[`sample_unconstrained`](Self::sample_unconstrained) closely.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedAmbientDomain {
    lower: DVector<f64>,
    upper: DVector<f64>,
    kind: DomainKind,
    k_sigma: f64,
    center: DVector<f64>,
    scale: f64,
}

impl BoundedAmbientDomain {
    /// Creates a bounded domain with the default scale multiplier
    /// `k_sigma = 1.0`.
    pub fn new(
        lower: DVector<f64>,
        upper: DVector<f64>,
        kind: DomainKind,
    ) -> Result<Self, ConfigError> {
        Self::with_k_sigma(lower, upper, kind, 1.0)
    }

    /// Creates a bounded domain with an explicit scale multiplier.
    ///
    /// Fails if the bound vectors are empty or of differing lengths, if any
    /// lower bound exceeds its upper bound, or if `k_sigma` is zero,
    /// negative, or non-finite.
    pub fn with_k_sigma(
        lower: DVector<f64>,
        upper: DVector<f64>,
        kind: DomainKind,
        k_sigma: f64,
    ) -> Result<Self, ConfigError> {
        if lower.is_empty() {
            return Err(ConfigError::EmptyDomain);
        }
        if upper.len() != lower.len() {
            return Err(ConfigError::DimensionMismatch {
                what: "ambient domain bounds",
                expected: lower.len(),
                got: upper.len(),
            });
        }
        if let Some((index, _)) = lower
            .iter()
            .zip(upper.iter())
            .enumerate()
            .find(|(_, (l, u))| l > u)
        {
            return Err(ConfigError::InvalidBounds { index });
        }
        if !k_sigma.is_finite() || k_sigma <= 0.0 {
            return Err(ConfigError::NonPositiveScale { what: "k_sigma" });
        }

        let center = (&lower + &upper) * 0.5;
        let scale = k_sigma * (&upper - &lower).mean();
        Ok(Self {
            lower,
            upper,
            kind,
            k_sigma,
            center,
            scale,
        })
    }

    /// The dimension of the ambient space.
    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    /// The distribution kind this domain was built with.
    pub fn kind(&self) -> DomainKind {
        self.kind
    }

    /// The midpoint of the box.
    pub fn center(&self) -> &DVector<f64> {
        &self.center
    }

    /// The derived length scale `k_sigma * average_box_length()`.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Mean side length of the box, `mean(U - L)` over the axes.
    ///
    /// Used to set the domain's own scale and, by the MCMC strategy, to size
    /// the proposal step.
    pub fn average_box_length(&self) -> f64 {
        (&self.upper - &self.lower).mean()
    }

    /// Tests whether `x` lies inside the box, bounds inclusive.
    pub fn is_in_domain(&self, x: &DVector<f64>) -> bool {
        if x.len() != self.dim() {
            return false;
        }
        x.iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .all(|(xi, (l, u))| xi >= l && xi <= u)
    }

    /// Evaluates the (unnormalized) density at `x`.
    ///
    /// Uniform: `1.0` if `x / k_sigma` lies in the box, else `0.0` — the
    /// query point is descaled before the membership test so the density's
    /// support tracks the `k_sigma`-scaled generator range. Gaussian:
    /// `exp(-0.5 * ||x - center||^2 / scale^2)` inside the box, `0.0`
    /// outside.
    pub fn density(&self, x: &DVector<f64>) -> f64 {
        match self.kind {
            DomainKind::Uniform => {
                if self.is_in_domain(&(x / self.k_sigma)) {
                    1.0
                } else {
                    0.0
                }
            }
            DomainKind::Gaussian => {
                if self.is_in_domain(x) {
                    let d = x - &self.center;
                    (-0.5 * d.norm_squared() / (self.scale * self.scale)).exp()
                } else {
                    0.0
                }
            }
        }
    }

    /// Draws one point from the domain's own generator.
    ///
    /// Uniform: a single draw, uniform per axis over
    /// `[k_sigma * L, k_sigma * U]`; always `Some`. Gaussian: redraws from
    /// the untruncated `N(center, scale)` until a draw lands in the box,
    /// giving up with `None` after `max_attempts` rejections. A
    /// near-degenerate box can exhaust any cap, so the cap is a required,
    /// caller-visible argument rather than a hidden constant.
    pub fn sample_unconstrained<R: Rng>(
        &self,
        rng: &mut R,
        max_attempts: usize,
    ) -> Option<DVector<f64>> {
        match self.kind {
            DomainKind::Uniform => Some(DVector::from_iterator(
                self.dim(),
                self.lower.iter().zip(self.upper.iter()).map(|(&l, &u)| {
                    rng.gen_range(self.k_sigma * l..=self.k_sigma * u)
                }),
            )),
            DomainKind::Gaussian => {
                let normal = Normal::new(0.0, self.scale)
                    .expect("scale is validated at construction");
                for _ in 0..max_attempts {
                    let candidate = DVector::from_iterator(
                        self.dim(),
                        self.center.iter().map(|&c| c + normal.sample(rng)),
                    );
                    if self.is_in_domain(&candidate) {
                        return Some(candidate);
                    }
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn uniform_draws_stay_inside_the_scale_interval() {
        let domain =
            EmbeddedDomain::new(dvector![0.5, -2.0], dvector![1.5, 0.25], DomainKind::Uniform)
                .unwrap();
        let mut rng = SmallRng::seed_from_u64(0);
        for _ in 0..1_000 {
            let x = domain.draw_one(&mut rng);
            assert!(x[0] >= -1.0 && x[0] <= 2.0, "x[0] = {} out of range", x[0]);
            assert!(x[1] >= -2.25 && x[1] <= -1.75, "x[1] = {} out of range", x[1]);
        }
    }

    #[test]
    fn isotropic_broadcasts_scalars() {
        let domain = EmbeddedDomain::isotropic(4, 1.0, 2.0, DomainKind::Gaussian).unwrap();
        assert_eq!(domain.dim(), 4);
        let x = domain.draw_one(&mut SmallRng::seed_from_u64(1));
        assert_eq!(x.len(), 4);
    }

    #[test]
    fn embedded_domain_rejects_bad_scales() {
        assert!(matches!(
            EmbeddedDomain::isotropic(2, 0.0, 0.0, DomainKind::Uniform),
            Err(ConfigError::NonPositiveScale { .. })
        ));
        assert!(matches!(
            EmbeddedDomain::isotropic(0, 0.0, 1.0, DomainKind::Uniform),
            Err(ConfigError::EmptyDomain)
        ));
        assert!(matches!(
            EmbeddedDomain::new(dvector![0.0, 0.0], dvector![1.0], DomainKind::Uniform),
            Err(ConfigError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn membership_is_inclusive_at_the_boundary() {
        let domain = BoundedAmbientDomain::new(
            dvector![-1.0, 0.0],
            dvector![1.0, 2.0],
            DomainKind::Uniform,
        )
        .unwrap();
        assert!(domain.is_in_domain(&dvector![-1.0, 0.0]));
        assert!(domain.is_in_domain(&dvector![1.0, 2.0]));
        assert!(domain.is_in_domain(&dvector![0.0, 1.0]));
        assert!(!domain.is_in_domain(&dvector![1.0 + 1e-12, 1.0]));
        assert!(!domain.is_in_domain(&dvector![0.0, -1e-12]));
    }

    #[test]
    fn bounds_validation_catches_inverted_axes() {
        let err = BoundedAmbientDomain::new(
            dvector![0.0, 3.0],
            dvector![1.0, 2.0],
            DomainKind::Uniform,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidBounds { index: 1 });
    }

    #[test]
    fn derived_center_and_scale() {
        let domain = BoundedAmbientDomain::with_k_sigma(
            dvector![0.0, 0.0],
            dvector![2.0, 4.0],
            DomainKind::Gaussian,
            0.5,
        )
        .unwrap();
        assert_eq!(domain.center(), &dvector![1.0, 2.0]);
        assert_eq!(domain.average_box_length(), 3.0);
        assert_eq!(domain.scale(), 1.5);
    }

    #[test]
    fn uniform_density_descales_by_k_sigma() {
        let domain = BoundedAmbientDomain::with_k_sigma(
            dvector![-1.0],
            dvector![1.0],
            DomainKind::Uniform,
            2.0,
        )
        .unwrap();
        // The box is [-1, 1] but the density's support is [-2, 2].
        assert_eq!(domain.density(&dvector![1.5]), 1.0);
        assert_eq!(domain.density(&dvector![2.0]), 1.0);
        assert_eq!(domain.density(&dvector![2.5]), 0.0);
    }

    #[test]
    fn gaussian_density_is_truncated_and_peaks_at_the_center() {
        let domain = BoundedAmbientDomain::new(
            dvector![-1.0, -1.0],
            dvector![1.0, 1.0],
            DomainKind::Gaussian,
        )
        .unwrap();
        assert_eq!(domain.density(&dvector![0.0, 0.0]), 1.0);
        let near = domain.density(&dvector![0.1, 0.1]);
        let far = domain.density(&dvector![0.9, 0.9]);
        assert!(near > far && far > 0.0);
        assert_eq!(domain.density(&dvector![1.1, 0.0]), 0.0);
    }

    #[test]
    fn uniform_generator_scales_bounds_by_k_sigma() {
        let domain = BoundedAmbientDomain::with_k_sigma(
            dvector![1.0, -2.0],
            dvector![3.0, 2.0],
            DomainKind::Uniform,
            2.0,
        )
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..500 {
            let x = domain.sample_unconstrained(&mut rng, 1).unwrap();
            assert!(x[0] >= 2.0 && x[0] <= 6.0);
            assert!(x[1] >= -4.0 && x[1] <= 4.0);
        }
    }

    #[test]
    fn truncated_gaussian_generator_lands_in_the_box() {
        let domain = BoundedAmbientDomain::new(
            dvector![-0.5, -0.5, -0.5],
            dvector![0.5, 0.5, 0.5],
            DomainKind::Gaussian,
        )
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..100 {
            let x = domain
                .sample_unconstrained(&mut rng, 10_000)
                .expect("a unit box should not exhaust the cap");
            assert!(domain.is_in_domain(&x));
        }
    }

    #[test]
    fn degenerate_gaussian_box_gives_up_instead_of_spinning() {
        // One axis is pinned to a single point while the derived scale stays
        // positive: a continuous draw almost surely never hits it exactly,
        // so the cap must kick in.
        let domain = BoundedAmbientDomain::new(
            dvector![0.0, 1.0],
            dvector![2.0, 1.0],
            DomainKind::Gaussian,
        )
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(5);
        assert!(domain.sample_unconstrained(&mut rng, 100).is_none());
    }

    #[test]
    fn kind_parses_legacy_tags() {
        assert_eq!("uniform".parse::<DomainKind>().unwrap(), DomainKind::Uniform);
        assert_eq!(
            "gaussian".parse::<DomainKind>().unwrap(),
            DomainKind::Gaussian
        );
        assert!(matches!(
            "triangular".parse::<DomainKind>(),
            Err(ConfigError::UnknownKind { .. })
        ));
    }
}
