/*!
# Embedded-space sampling engine

This module implements the strategy dispatch at the heart of the crate. A
[`SamplingEngine`] borrows a [`RandomProjection`], a [`BoundedAmbientDomain`],
and an [`EmbeddedDomain`], and produces ordered sequences of embedded-space
points under one of three strategies:

- [`Strategy::Unconstrained`] — independent draws from the embedded domain,
  no feasibility test.
- [`Strategy::Rejection`] — draw, lift into the ambient space, keep the
  candidate iff its lift lands inside the box.
- [`Strategy::Mcmc`] — a Metropolis-style chain with burn-in: isotropic
  Gaussian proposals in embedded coordinates, accepted by the density ratio
  of their ambient lifts.

Every strategy is best-effort: an exhausted iteration cap (or an expired
deadline) ends the run early and whatever was accepted so far is returned in
a [`SampleRun`] whose `target_met` flag records whether the requested count
was reached. Under-fill is never an error.

All randomness comes from the `&mut impl Rng` handle passed into every call,
so a fixed seed reproduces a run exactly.

## Example

```rust
use embedded_sampler::domains::{BoundedAmbientDomain, DomainKind, EmbeddedDomain};
use embedded_sampler::engine::{SamplingEngine, Strategy};
use embedded_sampler::projection::{ProjectionKind, RandomProjection};
use nalgebra::DVector;
use rand::rngs::SmallRng;
use rand::SeedableRng;

let mut rng = SmallRng::seed_from_u64(42);

let projection = RandomProjection::new(5, 2, ProjectionKind::Hypersphere, &mut rng)?;
let ambient = BoundedAmbientDomain::new(
    DVector::from_element(5, -1.0),
    DVector::from_element(5, 1.0),
    DomainKind::Uniform,
)?;
let embedded = EmbeddedDomain::isotropic(2, 0.0, 1.0, DomainKind::Uniform)?;

let engine = SamplingEngine::new(&projection, &ambient, &embedded, Strategy::default_rejection())?;
let run = engine.sample(10, &mut rng);

assert!(run.points.len() <= 10);
for point in &run.points {
    assert!(ambient.is_in_domain(&projection.lift(point)));
}
# Ok::<(), embedded_sampler::error::ConfigError>(())
```
*/

use std::str::FromStr;
use std::time::Instant;

use indicatif::ProgressBar;
use nalgebra::DVector;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::domains::{BoundedAmbientDomain, EmbeddedDomain};
use crate::error::ConfigError;
use crate::projection::RandomProjection;

/// Caps and constants of the rejection strategy. All fields are public so
/// callers can widen or tighten the loop instead of relying on a hidden
/// constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectionConfig {
    /// Maximum number of candidate draws before the run gives up.
    pub max_attempts: usize,
}

impl Default for RejectionConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10_000,
        }
    }
}

/// Caps and constants of the Metropolis-style chain strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McmcConfig {
    /// Cap on chain iterations; the initialization phase uses the same cap
    /// with a fresh counter.
    pub max_iters: usize,
    /// Coefficient applied to the ambient domain's average box length to
    /// size the proposal step.
    pub k_sigma_jump: f64,
    /// Number of initial iterations whose proposals are never accepted.
    pub burn_in: usize,
    /// Density threshold a starting point must clear during initialization.
    pub init_density_floor: f64,
}

impl Default for McmcConfig {
    fn default() -> Self {
        Self {
            max_iters: 100_000,
            k_sigma_jump: 0.5,
            burn_in: 1_000,
            init_density_floor: 1e-4,
        }
    }
}

/// Which sampling strategy the engine runs, together with that strategy's
/// loop configuration. Resolved once at engine construction; there is no
/// per-call dispatch on strings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    /// Independent unconstrained draws from the embedded domain.
    Unconstrained,
    /// Rejection sampling against the lifted feasibility test.
    Rejection(RejectionConfig),
    /// Metropolis-style chain with burn-in.
    Mcmc(McmcConfig),
}

impl Strategy {
    /// Rejection sampling with the stock cap of 10,000 attempts.
    pub fn default_rejection() -> Self {
        Strategy::Rejection(RejectionConfig::default())
    }

    /// The Metropolis-style chain with the stock caps (100,000
    /// iterations, burn-in 1,000, jump coefficient 0.5).
    pub fn default_mcmc() -> Self {
        Strategy::Mcmc(McmcConfig::default())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    /// Parses the legacy string tags `"MC_unconstrained"`,
    /// `"MC_ambientConstrained"`, and `"MCMC_ambientConstrained"`, yielding
    /// the default configuration for the constrained strategies.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MC_unconstrained" => Ok(Strategy::Unconstrained),
            "MC_ambientConstrained" => Ok(Strategy::default_rejection()),
            "MCMC_ambientConstrained" => Ok(Strategy::default_mcmc()),
            other => Err(ConfigError::UnknownKind {
                what: "sampling strategy",
                got: other.to_string(),
            }),
        }
    }
}

/// The outcome of one call to [`SamplingEngine::sample`].
///
/// `points` holds the accepted embedded-space points in acceptance order;
/// it may be shorter than the requested count. `target_met` records whether
/// the request was filled, so under-fill is observable rather than a silent
/// truncation. `iterations` counts the candidate evaluations the run spent
/// across all of its phases.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRun {
    pub points: Vec<DVector<f64>>,
    pub target_met: bool,
    pub iterations: u64,
}

impl SampleRun {
    /// Number of points produced.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if no point was accepted.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/**
The sampling engine: one strategy over one projection, one ambient domain,
and one embedded domain.

The engine borrows its collaborators read-only and keeps no state between
calls; two calls with identically seeded RNGs produce identical runs. The
dimensions are checked once at construction: the projection's embedded side
must match the embedded domain and its ambient side must match the bounded
domain.

# Examples

```rust
use embedded_sampler::domains::{BoundedAmbientDomain, DomainKind, EmbeddedDomain};
use embedded_sampler::engine::{SamplingEngine, Strategy};
use embedded_sampler::projection::{ProjectionKind, RandomProjection};
use nalgebra::DVector;
use rand::rngs::SmallRng;
use rand::SeedableRng;

let mut rng = SmallRng::seed_from_u64(1);
let projection = RandomProjection::new(4, 2, ProjectionKind::JohnsonLindenstrauss, &mut rng)?;
let ambient = BoundedAmbientDomain::new(
    DVector::from_element(4, -2.0),
    DVector::from_element(4, 2.0),
    DomainKind::Gaussian,
)?;
let embedded = EmbeddedDomain::isotropic(2, 0.0, 1.0, DomainKind::Gaussian)?;

let engine = SamplingEngine::new(&projection, &ambient, &embedded, Strategy::Unconstrained)?;
let run = engine.sample(25, &mut rng);
assert_eq!(run.points.len(), 25);
assert!(run.target_met);
# Ok::<(), embedded_sampler::error::ConfigError>(())
```
*/
#[derive(Debug, Clone)]
pub struct SamplingEngine<'a> {
    projection: &'a RandomProjection,
    ambient: &'a BoundedAmbientDomain,
    embedded: &'a EmbeddedDomain,
    strategy: Strategy,
}

impl<'a> SamplingEngine<'a> {
    /// Builds an engine over the three collaborators, validating that their
    /// dimensions agree and that the strategy's configuration is sane.
    pub fn new(
        projection: &'a RandomProjection,
        ambient: &'a BoundedAmbientDomain,
        embedded: &'a EmbeddedDomain,
        strategy: Strategy,
    ) -> Result<Self, ConfigError> {
        if projection.embedded_dim() != embedded.dim() {
            return Err(ConfigError::DimensionMismatch {
                what: "embedded domain vs projection",
                expected: projection.embedded_dim(),
                got: embedded.dim(),
            });
        }
        if projection.ambient_dim() != ambient.dim() {
            return Err(ConfigError::DimensionMismatch {
                what: "ambient domain vs projection",
                expected: projection.ambient_dim(),
                got: ambient.dim(),
            });
        }
        if let Strategy::Mcmc(cfg) = &strategy {
            if !cfg.k_sigma_jump.is_finite() || cfg.k_sigma_jump <= 0.0 {
                return Err(ConfigError::NonPositiveScale {
                    what: "k_sigma_jump",
                });
            }
        }
        Ok(Self {
            projection,
            ambient,
            embedded,
            strategy,
        })
    }

    /// The strategy this engine was built with.
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Produces up to `n` embedded-space points.
    ///
    /// Check [`SampleRun::target_met`] on the result: the constrained
    /// strategies legitimately return fewer than `n` points when their
    /// iteration cap runs out.
    pub fn sample<R: Rng>(&self, n: usize, rng: &mut R) -> SampleRun {
        self.run(n, rng, None, None)
    }

    /// Like [`sample`](Self::sample), but stops accepting once `deadline`
    /// has passed, exactly as if the iteration cap had been exhausted.
    /// The points accepted before the deadline are returned as usual.
    pub fn sample_with_deadline<R: Rng>(
        &self,
        n: usize,
        rng: &mut R,
        deadline: Instant,
    ) -> SampleRun {
        self.run(n, rng, Some(deadline), None)
    }

    /// Like [`sample`](Self::sample), advancing `progress` by one for every
    /// accepted point.
    pub fn sample_with_progress<R: Rng>(
        &self,
        n: usize,
        rng: &mut R,
        progress: &ProgressBar,
    ) -> SampleRun {
        progress.set_length(n as u64);
        let run = self.run(n, rng, None, Some(progress));
        progress.finish();
        run
    }

    fn run<R: Rng>(
        &self,
        n: usize,
        rng: &mut R,
        deadline: Option<Instant>,
        progress: Option<&ProgressBar>,
    ) -> SampleRun {
        match self.strategy {
            Strategy::Unconstrained => self.run_unconstrained(n, rng, deadline, progress),
            Strategy::Rejection(cfg) => self.run_rejection(n, rng, cfg, deadline, progress),
            Strategy::Mcmc(cfg) => self.run_mcmc(n, rng, cfg, deadline, progress),
        }
    }

    fn run_unconstrained<R: Rng>(
        &self,
        n: usize,
        rng: &mut R,
        deadline: Option<Instant>,
        progress: Option<&ProgressBar>,
    ) -> SampleRun {
        let mut points = Vec::with_capacity(n);
        while points.len() < n && !expired(deadline) {
            points.push(self.embedded.draw_one(rng));
            if let Some(pb) = progress {
                pb.inc(1);
            }
        }
        finish(points, n)
    }

    fn run_rejection<R: Rng>(
        &self,
        n: usize,
        rng: &mut R,
        cfg: RejectionConfig,
        deadline: Option<Instant>,
        progress: Option<&ProgressBar>,
    ) -> SampleRun {
        let mut points = Vec::with_capacity(n);
        let mut count: u64 = 0;
        while points.len() < n && count < cfg.max_attempts as u64 && !expired(deadline) {
            let candidate = self.embedded.draw_one(rng);
            if self.ambient.is_in_domain(&self.projection.lift(&candidate)) {
                points.push(candidate);
                if let Some(pb) = progress {
                    pb.inc(1);
                }
            }
            count += 1;
        }
        let mut run = finish(points, n);
        run.iterations = count;
        run
    }

    fn run_mcmc<R: Rng>(
        &self,
        n: usize,
        rng: &mut R,
        cfg: McmcConfig,
        deadline: Option<Instant>,
        progress: Option<&ProgressBar>,
    ) -> SampleRun {
        // Initialization: hunt for a starting point whose lifted density
        // clears the floor. If the cap runs out first, the chain starts from
        // the last draw anyway, unvalidated; it may then sit in a
        // zero-density region until a proposal escapes. Long-standing
        // behavior, kept.
        let mut init_count: u64 = 0;
        let mut x0 = self.embedded.draw_one(rng);
        let mut rho0 = self.ambient.density(&self.projection.lift(&x0));
        while rho0 <= cfg.init_density_floor
            && init_count < cfg.max_iters as u64
            && !expired(deadline)
        {
            x0 = self.embedded.draw_one(rng);
            rho0 = self.ambient.density(&self.projection.lift(&x0));
            init_count += 1;
        }

        // The proposal step is sized from the *ambient* box, not the
        // embedded domain.
        let jump = Normal::new(0.0, cfg.k_sigma_jump * self.ambient.average_box_length())
            .expect("jump scale is validated at construction");

        let mut points = Vec::with_capacity(n);
        let mut count: u64 = 0;
        while points.len() < n && count < cfg.max_iters as u64 && !expired(deadline) {
            let candidate =
                DVector::from_iterator(x0.len(), x0.iter().map(|&xi| xi + jump.sample(rng)));
            let lifted = self.projection.lift(&candidate);
            let rho_candidate = self.ambient.density(&lifted);
            let alpha = rho_candidate / rho0;
            let u: f64 = rng.gen();

            if alpha > u && self.ambient.is_in_domain(&lifted) && count > cfg.burn_in as u64 {
                points.push(candidate.clone());
                x0 = candidate;
                // Recomputed from the new state rather than carried over
                // from rho_candidate.
                rho0 = self.ambient.density(&self.projection.lift(&x0));
                if let Some(pb) = progress {
                    pb.inc(1);
                }
            }
            count += 1;
        }

        let mut run = finish(points, n);
        run.iterations = init_count + count;
        run
    }
}

fn expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

fn finish(points: Vec<DVector<f64>>, n: usize) -> SampleRun {
    let target_met = points.len() == n;
    let iterations = points.len() as u64;
    SampleRun {
        points,
        target_met,
        iterations,
    }
}
