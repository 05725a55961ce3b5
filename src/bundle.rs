//! The decoded result bundle: datasets carrying a voxel grid, axis
//! tags, a coordinate space and descriptive metadata, grouped by
//! element kind.

use crate::coords::CoordinateSpace;
use crate::volume::{ElementKind, VoxelGrid};
use std::collections::BTreeMap;

/// A tagged axis of a decoded dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    /// Axis label: x, y, z, t, or empty beyond the fourth axis.
    pub label: String,
    /// Unit name from the header's packed units field.
    pub unit: String,
}

/// A decoded dataset: the voxel grid plus everything describing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Display name of the dataset.
    pub name: String,
    /// The file the dataset was read from.
    pub source: String,
    /// The fully materialized voxel grid.
    pub grid: VoxelGrid,
    /// One tag per grid axis.
    pub axes: Vec<Axis>,
    /// Mapping from grid indices to physical coordinates.
    pub coordinates: CoordinateSpace,
    /// Every parsed header field, as a flat key-value store. Purely
    /// descriptive; never consulted by the decoder.
    pub metadata: BTreeMap<String, String>,
}

/// A collection of decoded datasets keyed by element kind. Datasets
/// only enter a bundle through [`merge`](DataBundle::merge).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataBundle {
    datasets: BTreeMap<ElementKind, Vec<Dataset>>,
}

impl DataBundle {
    /// Create an empty bundle.
    pub fn new() -> Self {
        DataBundle::default()
    }

    /// Merge a dataset into the bundle under its grid's element kind.
    pub fn merge(&mut self, dataset: Dataset) {
        self.datasets
            .entry(dataset.grid.kind())
            .or_insert_with(Vec::new)
            .push(dataset);
    }

    /// The datasets of the given element kind.
    pub fn get(&self, kind: ElementKind) -> &[Dataset] {
        self.datasets.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the bundle holds no datasets at all.
    pub fn is_empty(&self) -> bool {
        self.datasets.values().all(Vec::is_empty)
    }

    /// Total number of datasets across all kinds.
    pub fn len(&self) -> usize {
        self.datasets.values().map(Vec::len).sum()
    }

    /// Iterate over all datasets, grouped by kind.
    pub fn iter(&self) -> impl Iterator<Item = (ElementKind, &Dataset)> {
        self.datasets
            .iter()
            .flat_map(|(kind, sets)| sets.iter().map(move |d| (*kind, d)))
    }
}

#[cfg(test)]
mod tests {
    use super::{Axis, DataBundle, Dataset};
    use crate::coords::CoordinateSpace;
    use crate::volume::{ElementKind, VoxelGrid};
    use ndarray::arr1;

    fn dataset(grid: VoxelGrid) -> Dataset {
        Dataset {
            name: "nifti file".to_owned(),
            source: String::new(),
            grid,
            axes: vec![Axis {
                label: "x".to_owned(),
                unit: "unknown".to_owned(),
            }],
            coordinates: CoordinateSpace::Linear {
                scales: vec![1.0],
                offsets: vec![0.0],
            },
            metadata: Default::default(),
        }
    }

    #[test]
    fn merge_groups_by_kind() {
        let mut bundle = DataBundle::new();
        assert!(bundle.is_empty());
        bundle.merge(dataset(VoxelGrid::Uint8(arr1(&[1u8]).into_dyn())));
        bundle.merge(dataset(VoxelGrid::Uint8(arr1(&[2u8]).into_dyn())));
        bundle.merge(dataset(VoxelGrid::Float32(arr1(&[1.0f32]).into_dyn())));
        assert_eq!(bundle.len(), 3);
        assert_eq!(bundle.get(ElementKind::Uint8).len(), 2);
        assert_eq!(bundle.get(ElementKind::Float32).len(), 1);
        assert!(bundle.get(ElementKind::Rgb24).is_empty());
    }
}
