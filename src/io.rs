//! Saving sample runs to disk. Only CSV is supported, behind the `csv`
//! cargo feature; consumers that plot or post-process samples do so from
//! the exported file.

use std::error::Error;
use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::engine::SampleRun;

/// Saves the points of a [`SampleRun`] as a CSV file.
///
/// The header row is `sample,dim_0,dim_1,...`; each subsequent row holds the
/// sample index and the point's coordinates. An empty run produces a file
/// with just the `sample` header.
///
/// # Examples
///
/// ```rust
/// # use embedded_sampler::engine::SampleRun;
/// # use embedded_sampler::io::save_csv;
/// use nalgebra::dvector;
///
/// let run = SampleRun {
///     points: vec![dvector![0.5, -0.5], dvector![1.0, 0.0]],
///     target_met: true,
///     iterations: 2,
/// };
/// save_csv(&run, "/tmp/embedded_samples.csv")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn save_csv<P: AsRef<Path>>(run: &SampleRun, filename: P) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_writer(File::create(filename)?);

    let num_dimensions = run.points.first().map_or(0, |p| p.len());
    let mut header: Vec<String> = vec!["sample".to_string()];
    header.extend((0..num_dimensions).map(|i| format!("dim_{}", i)));
    wtr.write_record(&header)?;

    for (sample_idx, point) in run.points.iter().enumerate() {
        let mut row = vec![sample_idx.to_string()];
        row.extend(point.iter().map(|v| v.to_string()));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn writes_header_and_one_row_per_point() -> Result<(), Box<dyn Error>> {
        let run = SampleRun {
            points: vec![dvector![1.0, 2.0], dvector![3.0, 4.0]],
            target_met: true,
            iterations: 2,
        };
        let file = NamedTempFile::new()?;
        save_csv(&run, file.path())?;

        let contents = fs::read_to_string(file.path())?;
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["sample,dim_0,dim_1", "0,1,2", "1,3,4"]);
        Ok(())
    }

    #[test]
    fn empty_run_writes_only_the_header() -> Result<(), Box<dyn Error>> {
        let run = SampleRun {
            points: vec![],
            target_met: false,
            iterations: 10,
        };
        let file = NamedTempFile::new()?;
        save_csv(&run, file.path())?;

        let contents = fs::read_to_string(file.path())?;
        assert_eq!(contents.trim(), "sample");
        Ok(())
    }
}
