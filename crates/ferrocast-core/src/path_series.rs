//! Simulated price paths to chart-ready series.
//!
//! A path matrix has one row per simulated path and one column per sampled
//! time step. The series has one point per time step carrying the day offset
//! `x` and one `path{k}` field per rendered path:
//!
//! ```text
//! [[100, 101, 103],          [{"x": 0,  "path0": 100, "path1": 100},
//!  [100,  99,  97]]   ──▶     {"x": 5,  "path0": 101, "path1": 99},
//!                             {"x": 10, "path0": 103, "path1": 97}]
//! ```
//!
//! Only a deterministic prefix of at most `cap` paths is rendered. If those
//! rows differ in length the series is empty.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::config::{ViewConfig, DEFAULT_PATH_CAP, DEFAULT_STRIDE_DAYS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSeriesConfig {
    /// Maximum number of paths rendered.
    pub cap: usize,
    /// Calendar days between consecutive samples.
    pub stride_days: u32,
}

impl Default for PathSeriesConfig {
    fn default() -> Self {
        Self {
            cap: DEFAULT_PATH_CAP,
            stride_days: DEFAULT_STRIDE_DAYS,
        }
    }
}

impl From<&ViewConfig> for PathSeriesConfig {
    fn from(config: &ViewConfig) -> Self {
        Self {
            cap: config.path_cap,
            stride_days: config.stride_days,
        }
    }
}

/// Shape of the selected prefix of a path matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathShape {
    /// No paths selected, or the first selected path has no samples.
    Empty,
    Rectangular { paths: usize, steps: usize },
    /// `row` has `found` samples where the first path has `expected`.
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

pub fn inspect(paths: &[Vec<f64>], cap: usize) -> PathShape {
    let selected = &paths[..paths.len().min(cap)];
    let Some(first) = selected.first() else {
        return PathShape::Empty;
    };
    if first.is_empty() {
        return PathShape::Empty;
    }

    let expected = first.len();
    for (row, path) in selected.iter().enumerate().skip(1) {
        if path.len() != expected {
            return PathShape::Ragged {
                row,
                expected,
                found: path.len(),
            };
        }
    }

    PathShape::Rectangular {
        paths: selected.len(),
        steps: expected,
    }
}

/// One time step across all rendered paths.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    /// Day offset from the simulation start.
    pub x: u64,
    /// `values[k]` is path `k` at this step.
    pub values: Vec<f64>,
}

impl Serialize for ChartPoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("x", &self.x)?;
        for (index, value) in self.values.iter().enumerate() {
            map.serialize_entry(&field_name(index), value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChartSeries {
    points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn path_count(&self) -> usize {
        self.points.first().map_or(0, |point| point.values.len())
    }

    /// Per-path field keys, `path0..pathN`, for wiring chart lines.
    pub fn field_names(&self) -> Vec<String> {
        (0..self.path_count()).map(field_name).collect()
    }
}

fn field_name(index: usize) -> String {
    format!("path{index}")
}

/// Builds the chart series for the first `config.cap` paths.
///
/// Pure and O(selected paths × steps).
pub fn build_series(paths: &[Vec<f64>], config: PathSeriesConfig) -> ChartSeries {
    let PathShape::Rectangular { paths: count, steps } = inspect(paths, config.cap) else {
        return ChartSeries::empty();
    };

    let selected = &paths[..count];
    let stride = u64::from(config.stride_days);
    let points = (0..steps)
        .map(|step| ChartPoint {
            x: step as u64 * stride,
            values: selected.iter().map(|path| path[step]).collect(),
        })
        .collect();

    ChartSeries { points }
}
