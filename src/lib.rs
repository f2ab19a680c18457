/*!
# embedded-sampler

A compact library for drawing feasible samples from a low-dimensional
embedded space that is tied to a high-dimensional ambient space through a
fixed random linear map.

The intended use case: a function of many variables is believed to have low
intrinsic dimensionality, so candidate inputs are generated in a small
embedded space and lifted back into the ambient space — where the only thing
that can actually be checked is feasibility, a bounded box with an associated
density. The [`engine::SamplingEngine`] composes the three pieces:

- [`domains::EmbeddedDomain`] — the low-dimensional generator (uniform or
  Gaussian per axis);
- [`domains::BoundedAmbientDomain`] — the feasibility box, its truncated
  density, and an auto-derived length scale;
- [`projection::RandomProjection`] — the compression matrix (JL or
  hypersphere rows) and its cached Moore-Penrose pseudo-inverse.

Three strategies are available: plain unconstrained draws, rejection sampling
against the lifted feasibility test, and a Metropolis-style chain with
burn-in. The constrained strategies are best-effort: they stop at their
iteration cap and report under-fill through
[`engine::SampleRun::target_met`] instead of erroring.

Every call takes an explicit `&mut impl Rng`, so seeded runs are fully
reproducible.

## Quick start

```rust
use embedded_sampler::prelude::*;
use nalgebra::DVector;
use rand::rngs::SmallRng;
use rand::SeedableRng;

let mut rng = SmallRng::seed_from_u64(42);

// 5D ambient box, 2D embedded space.
let projection = RandomProjection::new(5, 2, ProjectionKind::Hypersphere, &mut rng)?;
let ambient = BoundedAmbientDomain::new(
    DVector::from_element(5, -1.0),
    DVector::from_element(5, 1.0),
    DomainKind::Uniform,
)?;
let embedded = EmbeddedDomain::isotropic(2, 0.0, 1.0, DomainKind::Uniform)?;

let engine = SamplingEngine::new(&projection, &ambient, &embedded, Strategy::default_mcmc())?;
let run = engine.sample(10, &mut rng);

println!(
    "accepted {} of 10 requested points (target met: {})",
    run.len(),
    run.target_met
);
# Ok::<(), embedded_sampler::error::ConfigError>(())
```
*/

pub mod domains;
pub mod engine;
pub mod error;
#[cfg(feature = "csv")]
pub mod io;
pub mod projection;

/// One-stop imports for the common types.
pub mod prelude {
    pub use crate::domains::{BoundedAmbientDomain, DomainKind, EmbeddedDomain};
    pub use crate::engine::{
        McmcConfig, RejectionConfig, SampleRun, SamplingEngine, Strategy,
    };
    pub use crate::error::ConfigError;
    pub use crate::projection::{ProjectionKind, RandomProjection};
}
