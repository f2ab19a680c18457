//! A small end-to-end demo: sample a 2D embedded space constrained by a 3D
//! ambient box through a hypersphere projection, then lift the accepted
//! points back into ambient coordinates and print a summary.

use std::error::Error;

use indicatif::{ProgressBar, ProgressStyle};
use nalgebra::DVector;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use embedded_sampler::prelude::*;

fn main() -> Result<(), Box<dyn Error>> {
    const AMBIENT_DIM: usize = 3;
    const EMBEDDED_DIM: usize = 2;
    const N_SAMPLES: usize = 2_000;
    const SEED: u64 = 42;

    let mut rng = SmallRng::seed_from_u64(SEED);

    let ambient = BoundedAmbientDomain::with_k_sigma(
        DVector::from_element(AMBIENT_DIM, -1.0),
        DVector::from_element(AMBIENT_DIM, 1.0),
        DomainKind::Gaussian,
        0.1,
    )?;
    let embedded = EmbeddedDomain::new(
        DVector::from_element(EMBEDDED_DIM, -1.0),
        DVector::from_element(EMBEDDED_DIM, 1.0),
        DomainKind::Gaussian,
    )?;
    let projection =
        RandomProjection::new(AMBIENT_DIM, EMBEDDED_DIM, ProjectionKind::Hypersphere, &mut rng)?;

    let engine = SamplingEngine::new(&projection, &ambient, &embedded, Strategy::default_mcmc())?;

    let pb = ProgressBar::new(N_SAMPLES as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    let run = engine.sample_with_progress(N_SAMPLES, &mut rng, &pb);

    println!(
        "{} samples generated ({} iterations, target met: {})",
        run.len(),
        run.iterations,
        run.target_met
    );

    let lifted = projection.lift_many(&run.points);
    if !lifted.is_empty() {
        let mut mean = DVector::zeros(AMBIENT_DIM);
        for x in &lifted {
            mean += x;
        }
        mean /= lifted.len() as f64;
        println!("mean of lifted samples: {:.4}", mean.transpose());

        let feasible = lifted.iter().filter(|x| ambient.is_in_domain(x)).count();
        println!(
            "{feasible}/{} lifted samples inside the ambient box",
            lifted.len()
        );
    }

    #[cfg(feature = "csv")]
    {
        embedded_sampler::io::save_csv(&run, "embedded_samples.csv")?;
        println!("saved embedded coordinates to embedded_samples.csv");
    }

    Ok(())
}
