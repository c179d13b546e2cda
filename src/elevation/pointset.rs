//! Point-set elevation samples with bounded nearest-neighbor queries.
//!
//! Backs both the point-cloud and the delimited-text encodings: once decoded,
//! samples live in an R-tree keyed by planar position. Queries are bounded by
//! a maximum search radius so a sparse data set never extrapolates silently
//! from a distant sample.

use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::elevation::Sample;
use crate::error::{ForgeError, Result};

/// One stored sample: planar position, (insertion order, elevation).
type IndexedSample = GeomWithData<[f64; 2], (usize, f64)>;

/// Unordered elevation samples indexed for nearest-neighbor lookup.
#[derive(Debug)]
pub struct PointSetSource {
    tree: RTree<IndexedSample>,
    len: usize,
}

impl PointSetSource {
    /// Index `(x, z, elevation)` samples. Non-finite samples are dropped.
    pub fn from_samples(samples: Vec<(f64, f64, f64)>) -> Self {
        let entries: Vec<IndexedSample> = samples
            .into_iter()
            .filter(|(x, z, e)| x.is_finite() && z.is_finite() && e.is_finite())
            .enumerate()
            .map(|(order, (x, z, elevation))| GeomWithData::new([x, z], (order, elevation)))
            .collect();
        let len = entries.len();
        Self {
            tree: RTree::bulk_load(entries),
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Nearest-neighbor sample by planar Euclidean distance.
    ///
    /// Returns `Uncovered` when the set is empty or the nearest sample lies
    /// beyond `max_radius` meters. Exact distance ties resolve to the sample
    /// that was encountered first when the set was built.
    pub fn sample_at(&self, x: f64, z: f64, max_radius: f64) -> Sample {
        let mut nearest_iter = self.tree.nearest_neighbor_iter_with_distance_2(&[x, z]);
        let Some((first, dist2)) = nearest_iter.next() else {
            return Sample::Uncovered;
        };
        if dist2.sqrt() > max_radius {
            return Sample::Uncovered;
        }

        // Collect exact-distance ties and keep the first-encountered sample.
        let mut best = first.data;
        for (candidate, candidate_dist2) in nearest_iter {
            if candidate_dist2 > dist2 {
                break;
            }
            if candidate.data.0 < best.0 {
                best = candidate.data;
            }
        }
        Sample::Elevation(best.1)
    }
}

/// Parse whitespace- or comma-delimited "x y z" rows into samples.
///
/// Rows are x (east), y (north), elevation, all in meters. Blank lines and
/// `#`-prefixed comments are skipped; anything else that does not yield three
/// numbers is a malformed-content error.
pub fn parse_ascii_rows(text: &str) -> Result<Vec<(f64, f64, f64)>> {
    let mut samples = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        if fields.len() != 3 {
            return Err(ForgeError::UnsupportedFormat(format!(
                "line {}: expected 3 fields, got {} (`{line}`)",
                line_no + 1,
                fields.len()
            )));
        }
        let mut values = [0.0f64; 3];
        for (slot, field) in values.iter_mut().zip(&fields) {
            *slot = field.parse().map_err(|_| {
                ForgeError::UnsupportedFormat(format!(
                    "line {}: non-numeric field `{field}`",
                    line_no + 1
                ))
            })?;
        }
        samples.push((values[0], values[1], values[2]));
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_neighbor_never_interpolates() {
        let source =
            PointSetSource::from_samples(vec![(0.0, 0.0, 10.0), (10.0, 0.0, 12.0), (0.0, 10.0, 11.0)]);
        // The query sits between all three samples: the result must be one
        // of the stored elevations, never a blend.
        let Sample::Elevation(value) = source.sample_at(5.0, 5.0, 50.0) else {
            panic!("expected coverage");
        };
        assert!([10.0, 12.0, 11.0].contains(&value));
    }

    #[test]
    fn test_beyond_radius_is_uncovered() {
        let source = PointSetSource::from_samples(vec![(0.0, 0.0, 5.0)]);
        assert_eq!(source.sample_at(0.0, 0.0, 50.0), Sample::Elevation(5.0));
        assert_eq!(source.sample_at(30.0, 40.0, 50.0), Sample::Elevation(5.0));
        assert_eq!(source.sample_at(30.0, 40.1, 50.0), Sample::Uncovered);
        assert_eq!(source.sample_at(100.0, 0.0, 50.0), Sample::Uncovered);
    }

    #[test]
    fn test_empty_set_is_uncovered() {
        let source = PointSetSource::from_samples(Vec::new());
        assert!(source.is_empty());
        assert_eq!(source.sample_at(0.0, 0.0, 1000.0), Sample::Uncovered);
    }

    #[test]
    fn test_ties_resolve_to_first_encountered() {
        // Two samples equidistant from the query, different elevations.
        let source = PointSetSource::from_samples(vec![(-5.0, 0.0, 100.0), (5.0, 0.0, 200.0)]);
        assert_eq!(source.sample_at(0.0, 0.0, 50.0), Sample::Elevation(100.0));

        let reversed = PointSetSource::from_samples(vec![(5.0, 0.0, 200.0), (-5.0, 0.0, 100.0)]);
        assert_eq!(reversed.sample_at(0.0, 0.0, 50.0), Sample::Elevation(200.0));
    }

    #[test]
    fn test_non_finite_samples_dropped() {
        let source = PointSetSource::from_samples(vec![
            (f64::NAN, 0.0, 1.0),
            (0.0, f64::INFINITY, 2.0),
            (1.0, 1.0, 3.0),
        ]);
        assert_eq!(source.len(), 1);
        assert_eq!(source.sample_at(1.0, 1.0, 10.0), Sample::Elevation(3.0));
    }

    #[test]
    fn test_parse_ascii_rows_formats() {
        let samples = parse_ascii_rows("0 0 10\n10,0,12\n# comment\n\n  0\t10\t11 \n").unwrap();
        assert_eq!(
            samples,
            vec![(0.0, 0.0, 10.0), (10.0, 0.0, 12.0), (0.0, 10.0, 11.0)]
        );
    }

    #[test]
    fn test_parse_ascii_rows_rejects_malformed() {
        assert!(parse_ascii_rows("1 2\n").is_err());
        assert!(parse_ascii_rows("1 2 3 4\n").is_err());
        assert!(parse_ascii_rows("1 2 elephants\n").is_err());
    }
}
