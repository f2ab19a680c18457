/*!
Random linear projection and lifting between the ambient and embedded spaces.

A [`RandomProjection`] holds a fixed `d x D` compression matrix `P` and its
Moore-Penrose pseudo-inverse `P+` (`D x d`), computed once at construction.
Projection maps ambient points down (`P * x`), lifting maps embedded points
back up (`P+ * x`). The two are only approximate inverses of each other;
nothing in this crate relies on exactness.

Two matrix kinds are available: [`ProjectionKind::JohnsonLindenstrauss`]
fills `P` with independent standard-normal entries, and
[`ProjectionKind::Hypersphere`] additionally rescales every row to unit
Euclidean norm.

# Examples

```rust
use embedded_sampler::projection::{ProjectionKind, RandomProjection};
use nalgebra::DVector;
use rand::rngs::SmallRng;
use rand::SeedableRng;

let mut rng = SmallRng::seed_from_u64(42);
let op = RandomProjection::new(5, 2, ProjectionKind::Hypersphere, &mut rng)?;

let ambient = DVector::from_element(5, 1.0);
let embedded = op.project(&ambient);
assert_eq!(embedded.len(), 2);
assert_eq!(op.lift(&embedded).len(), 5);
# Ok::<(), embedded_sampler::error::ConfigError>(())
```
*/

use std::str::FromStr;

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::ConfigError;

/// How the random compression matrix is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    /// Independent standard-normal entries, no further normalization, in the
    /// spirit of the Johnson-Lindenstrauss lemma.
    JohnsonLindenstrauss,
    /// Standard-normal entries with every row rescaled to unit norm, i.e.
    /// rows drawn uniformly on the unit hypersphere.
    Hypersphere,
}

impl FromStr for ProjectionKind {
    type Err = ConfigError;

    /// Parses the legacy string tags `"JL"` and `"hypersphere"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JL" => Ok(ProjectionKind::JohnsonLindenstrauss),
            "hypersphere" => Ok(ProjectionKind::Hypersphere),
            other => Err(ConfigError::UnknownKind {
                what: "projection kind",
                got: other.to_string(),
            }),
        }
    }
}

/**
A fixed random compression matrix together with its cached pseudo-inverse.

`ambient_dim` is the high dimension `D`, `embedded_dim` the low dimension
`d`; construction requires `1 <= d <= D`. The matrix entries are drawn from
the caller's RNG, so a seeded generator reproduces the same operator.

# Examples

```rust
use embedded_sampler::projection::{ProjectionKind, RandomProjection};
use rand::rngs::SmallRng;
use rand::SeedableRng;

let mut rng = SmallRng::seed_from_u64(0);
let op = RandomProjection::new(10, 3, ProjectionKind::JohnsonLindenstrauss, &mut rng)?;
assert_eq!(op.matrix().shape(), (3, 10));
assert_eq!(op.pseudo_inverse().shape(), (10, 3));
# Ok::<(), embedded_sampler::error::ConfigError>(())
```
*/
#[derive(Debug, Clone, PartialEq)]
pub struct RandomProjection {
    kind: ProjectionKind,
    matrix: DMatrix<f64>,
    pinv: DMatrix<f64>,
}

impl RandomProjection {
    /// Draws a fresh `embedded_dim x ambient_dim` compression matrix of the
    /// given kind and computes its pseudo-inverse.
    ///
    /// Fails if either dimension is zero, if `embedded_dim > ambient_dim`
    /// (the operator is supposed to compress), or if the SVD behind the
    /// pseudo-inverse does not converge.
    pub fn new<R: Rng>(
        ambient_dim: usize,
        embedded_dim: usize,
        kind: ProjectionKind,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        if ambient_dim == 0 || embedded_dim == 0 {
            return Err(ConfigError::EmptyDomain);
        }
        if embedded_dim > ambient_dim {
            return Err(ConfigError::EmbeddingTooLarge {
                embedded: embedded_dim,
                ambient: ambient_dim,
            });
        }

        let mut matrix = DMatrix::from_fn(embedded_dim, ambient_dim, |_, _| {
            rng.sample::<f64, _>(StandardNormal)
        });
        if kind == ProjectionKind::Hypersphere {
            for i in 0..embedded_dim {
                let norm = matrix.row(i).norm();
                for j in 0..ambient_dim {
                    matrix[(i, j)] /= norm;
                }
            }
        }

        let pinv = matrix
            .clone()
            .pseudo_inverse(1e-12)
            .map_err(ConfigError::PseudoInverse)?;

        Ok(Self { kind, matrix, pinv })
    }

    /// The ambient (high) dimension `D`.
    pub fn ambient_dim(&self) -> usize {
        self.matrix.ncols()
    }

    /// The embedded (low) dimension `d`.
    pub fn embedded_dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// The matrix kind this operator was built with.
    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    /// The `d x D` compression matrix `P`.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// The cached `D x d` Moore-Penrose pseudo-inverse `P+`.
    pub fn pseudo_inverse(&self) -> &DMatrix<f64> {
        &self.pinv
    }

    /// Maps an ambient point to embedded coordinates, `P * x` (`D -> d`).
    pub fn project(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.matrix * x
    }

    /// Maps an embedded point to ambient coordinates, `P+ * x` (`d -> D`).
    pub fn lift(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.pinv * x
    }

    /// Lifts a batch of embedded points in one matrix product, preserving
    /// order and batch size.
    pub fn lift_many(&self, points: &[DVector<f64>]) -> Vec<DVector<f64>> {
        if points.is_empty() {
            return Vec::new();
        }
        let stacked = DMatrix::from_columns(points);
        let lifted = &self.pinv * stacked;
        lifted.column_iter().map(|c| c.into_owned()).collect()
    }

    /// The rows of `P`: one `D`-dimensional projection vector per embedded
    /// axis.
    pub fn projection_vectors(&self) -> Vec<DVector<f64>> {
        self.matrix
            .row_iter()
            .map(|r| r.transpose())
            .collect()
    }

    /// The rows of `P+`: one `d`-dimensional lifting vector per ambient
    /// axis.
    pub fn lifting_vectors(&self) -> Vec<DVector<f64>> {
        self.pinv.row_iter().map(|r| r.transpose()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn hypersphere_rows_have_unit_norm() {
        let mut rng = SmallRng::seed_from_u64(0);
        let op = RandomProjection::new(50, 7, ProjectionKind::Hypersphere, &mut rng).unwrap();
        for row in op.matrix().row_iter() {
            assert_abs_diff_eq!(row.norm(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn jl_rows_are_not_normalized() {
        let mut rng = SmallRng::seed_from_u64(1);
        let op =
            RandomProjection::new(200, 4, ProjectionKind::JohnsonLindenstrauss, &mut rng).unwrap();
        // A 200-entry standard-normal row has norm near sqrt(200), nowhere
        // near 1.
        for row in op.matrix().row_iter() {
            assert!(row.norm() > 5.0);
        }
    }

    #[test]
    fn shapes_follow_the_compression_contract() {
        let mut rng = SmallRng::seed_from_u64(2);
        let op = RandomProjection::new(5, 2, ProjectionKind::Hypersphere, &mut rng).unwrap();
        assert_eq!(op.ambient_dim(), 5);
        assert_eq!(op.embedded_dim(), 2);

        let ambient = DVector::from_element(5, 0.3);
        let down = op.project(&ambient);
        assert_eq!(down.len(), 2);
        let up = op.lift(&down);
        assert_eq!(up.len(), 5);
    }

    #[test]
    fn lift_many_preserves_batch_size_and_matches_lift() {
        let mut rng = SmallRng::seed_from_u64(3);
        let op = RandomProjection::new(8, 3, ProjectionKind::JohnsonLindenstrauss, &mut rng)
            .unwrap();
        let batch: Vec<DVector<f64>> = (0..17)
            .map(|i| DVector::from_fn(3, |j, _| (i * 3 + j) as f64 * 0.1))
            .collect();
        let lifted = op.lift_many(&batch);
        assert_eq!(lifted.len(), 17);
        for (one, many) in batch.iter().map(|p| op.lift(p)).zip(lifted.iter()) {
            assert_abs_diff_eq!(one, *many, epsilon = 1e-12);
        }
        assert!(op.lift_many(&[]).is_empty());
    }

    #[test]
    fn pseudo_inverse_is_a_right_inverse_for_full_row_rank() {
        // With d < D and Gaussian entries, P has full row rank almost
        // surely, so P * P+ should be the d x d identity.
        let mut rng = SmallRng::seed_from_u64(4);
        let op = RandomProjection::new(12, 4, ProjectionKind::Hypersphere, &mut rng).unwrap();
        let product = op.matrix() * op.pseudo_inverse();
        assert_abs_diff_eq!(product, DMatrix::identity(4, 4), epsilon = 1e-9);
    }

    #[test]
    fn vector_accessors_expose_rows() {
        let mut rng = SmallRng::seed_from_u64(5);
        let op = RandomProjection::new(6, 2, ProjectionKind::JohnsonLindenstrauss, &mut rng)
            .unwrap();
        let proj = op.projection_vectors();
        assert_eq!(proj.len(), 2);
        assert_eq!(proj[0].len(), 6);
        let lift = op.lifting_vectors();
        assert_eq!(lift.len(), 6);
        assert_eq!(lift[0].len(), 2);
    }

    #[test]
    fn construction_rejects_expanding_operators() {
        let mut rng = SmallRng::seed_from_u64(6);
        assert!(matches!(
            RandomProjection::new(2, 5, ProjectionKind::JohnsonLindenstrauss, &mut rng),
            Err(ConfigError::EmbeddingTooLarge {
                embedded: 5,
                ambient: 2
            })
        ));
        assert!(matches!(
            RandomProjection::new(0, 0, ProjectionKind::Hypersphere, &mut rng),
            Err(ConfigError::EmptyDomain)
        ));
    }

    #[test]
    fn seeded_construction_is_deterministic() {
        let op_a = RandomProjection::new(
            9,
            3,
            ProjectionKind::Hypersphere,
            &mut SmallRng::seed_from_u64(7),
        )
        .unwrap();
        let op_b = RandomProjection::new(
            9,
            3,
            ProjectionKind::Hypersphere,
            &mut SmallRng::seed_from_u64(7),
        )
        .unwrap();
        assert_eq!(op_a.matrix(), op_b.matrix());
        assert_eq!(op_a.pseudo_inverse(), op_b.pseudo_inverse());
    }

    #[test]
    fn kind_parses_legacy_tags() {
        assert_eq!(
            "JL".parse::<ProjectionKind>().unwrap(),
            ProjectionKind::JohnsonLindenstrauss
        );
        assert_eq!(
            "hypersphere".parse::<ProjectionKind>().unwrap(),
            ProjectionKind::Hypersphere
        );
        assert!("jl".parse::<ProjectionKind>().is_err());
    }
}
