//! In-memory container of per-item (time x element) arrays.

use ndarray::{Array2, Axis};

use flexmesh_time::{TimeAxis, TimeSelection};

use crate::error::IoError;
use crate::items::ItemInfo;

/// One `(time x element)` `f32` array per item, all sharing one time axis
/// and one element-axis length.
///
/// Datasets are independent values: selection returns a new `Dataset` and
/// never mutates a shared one. Axis 0 is time, axis 1 is the element axis
/// of the geometry the data was read from (or is being written onto).
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    items: Vec<ItemInfo>,
    time: TimeAxis,
    data: Vec<Array2<f32>>,
}

impl Dataset {
    /// Build a dataset, validating the shared-shape invariants.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::ShapeMismatch`] when the item and array counts
    /// differ, when an array's time axis disagrees with `time.len()`, or
    /// when the arrays disagree on the element-axis length.
    pub fn new(
        items: Vec<ItemInfo>,
        time: TimeAxis,
        data: Vec<Array2<f32>>,
    ) -> Result<Self, IoError> {
        if items.len() != data.len() {
            return Err(IoError::ShapeMismatch {
                what: "item count vs array count".to_string(),
                expected: items.len(),
                got: data.len(),
            });
        }
        for (item, array) in items.iter().zip(&data) {
            if array.nrows() != time.len() {
                return Err(IoError::ShapeMismatch {
                    what: format!("item '{}' time axis", item.name()),
                    expected: time.len(),
                    got: array.nrows(),
                });
            }
        }
        if let Some(first) = data.first() {
            let n_elements = first.ncols();
            for (item, array) in items.iter().zip(&data).skip(1) {
                if array.ncols() != n_elements {
                    return Err(IoError::ShapeMismatch {
                        what: format!("item '{}' element axis", item.name()),
                        expected: n_elements,
                        got: array.ncols(),
                    });
                }
            }
        }
        Ok(Self { items, time, data })
    }

    /// Number of items.
    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    /// Number of time steps (axis 0 length).
    pub fn n_time_steps(&self) -> usize {
        self.time.len()
    }

    /// Element-axis length (axis 1); 0 for an item-less dataset.
    pub fn n_elements(&self) -> usize {
        self.data.first().map_or(0, |array| array.ncols())
    }

    /// Item descriptors in array order.
    pub fn items(&self) -> &[ItemInfo] {
        &self.items
    }

    /// The shared time axis.
    pub fn time(&self) -> &TimeAxis {
        &self.time
    }

    /// All data arrays in item order.
    pub fn data(&self) -> &[Array2<f32>] {
        &self.data
    }

    /// Data array of the item at `index`.
    pub fn array(&self, index: usize) -> Option<&Array2<f32>> {
        self.data.get(index)
    }

    /// New dataset restricted to the selected time steps.
    ///
    /// # Errors
    ///
    /// Propagates selection errors from the time crate.
    pub fn select_time(&self, selection: &TimeSelection) -> Result<Self, IoError> {
        let indices = selection.resolve(self.time.len())?;
        let time = self.time.subset(&indices)?;
        let data = self
            .data
            .iter()
            .map(|array| array.select(Axis(0), &indices))
            .collect();
        Self::new(self.items.clone(), time, data)
    }

    /// New dataset restricted to the given element-axis positions, in the
    /// caller-given order.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::IndexOutOfRange`] for positions past the element
    /// axis.
    pub fn select_elements(&self, indices: &[usize]) -> Result<Self, IoError> {
        let n_elements = self.n_elements();
        for &index in indices {
            if index >= n_elements {
                return Err(IoError::IndexOutOfRange {
                    index,
                    len: n_elements,
                });
            }
        }
        let data = self
            .data
            .iter()
            .map(|array| array.select(Axis(1), indices))
            .collect();
        Self::new(self.items.clone(), self.time.clone(), data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemInfo;
    use chrono::{NaiveDate, TimeDelta};

    fn axis(n: usize) -> TimeAxis {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        TimeAxis::equidistant(start, TimeDelta::hours(1), n).unwrap()
    }

    fn dataset(n_steps: usize, n_elements: usize) -> Dataset {
        let items = vec![
            ItemInfo::instantaneous("A", "meter"),
            ItemInfo::instantaneous("B", "meter"),
        ];
        let data = (0..2)
            .map(|k| {
                Array2::from_shape_fn((n_steps, n_elements), |(t, e)| {
                    (k * 1000 + t * 100 + e) as f32
                })
            })
            .collect();
        Dataset::new(items, axis(n_steps), data).unwrap()
    }

    #[test]
    fn construction_and_shape() {
        let ds = dataset(9, 884);
        assert_eq!(ds.n_items(), 2);
        assert_eq!(ds.n_time_steps(), 9);
        assert_eq!(ds.n_elements(), 884);
        assert_eq!(ds.array(0).unwrap().dim(), (9, 884));
    }

    #[test]
    fn item_array_count_mismatch_fails() {
        let items = vec![ItemInfo::instantaneous("A", "meter")];
        let err = Dataset::new(items, axis(2), Vec::new()).unwrap_err();
        match err {
            IoError::ShapeMismatch { expected, got, .. } => {
                assert_eq!(expected, 1);
                assert_eq!(got, 0);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn time_axis_mismatch_fails() {
        let items = vec![ItemInfo::instantaneous("A", "meter")];
        let data = vec![Array2::zeros((3, 10))];
        let err = Dataset::new(items, axis(2), data).unwrap_err();
        match err {
            IoError::ShapeMismatch { what, expected, got } => {
                assert!(what.contains("'A'"));
                assert_eq!(expected, 2);
                assert_eq!(got, 3);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn element_axis_mismatch_fails() {
        let items = vec![
            ItemInfo::instantaneous("A", "meter"),
            ItemInfo::instantaneous("B", "meter"),
        ];
        let data = vec![Array2::zeros((2, 10)), Array2::zeros((2, 11))];
        let err = Dataset::new(items, axis(2), data).unwrap_err();
        assert!(matches!(err, IoError::ShapeMismatch { .. }));
    }

    #[test]
    fn select_time_scalar_keeps_one_row() {
        let ds = dataset(9, 5);
        let sub = ds.select_time(&TimeSelection::Single(1)).unwrap();
        assert_eq!(sub.n_time_steps(), 1);
        assert_eq!(sub.array(0).unwrap().dim(), (1, 5));
        assert_eq!(sub.array(0).unwrap()[[0, 3]], ds.array(0).unwrap()[[1, 3]]);
    }

    #[test]
    fn select_time_scalar_equals_list() {
        let ds = dataset(9, 5);
        let scalar = ds.select_time(&TimeSelection::Single(1)).unwrap();
        let list = ds.select_time(&TimeSelection::List(vec![1])).unwrap();
        assert_eq!(scalar, list);
    }

    #[test]
    fn select_time_out_of_range_fails() {
        let ds = dataset(9, 5);
        let err = ds.select_time(&TimeSelection::Single(100)).unwrap_err();
        assert!(matches!(
            err,
            IoError::Time(flexmesh_time::TimeError::IndexOutOfRange { index: 100, len: 9 })
        ));
    }

    #[test]
    fn select_elements_caller_order() {
        let ds = dataset(3, 6);
        let sub = ds.select_elements(&[4, 0]).unwrap();
        assert_eq!(sub.n_elements(), 2);
        assert_eq!(sub.array(1).unwrap()[[2, 0]], ds.array(1).unwrap()[[2, 4]]);
        assert_eq!(sub.array(1).unwrap()[[2, 1]], ds.array(1).unwrap()[[2, 0]]);
    }

    #[test]
    fn select_elements_out_of_range_fails() {
        let ds = dataset(3, 6);
        let err = ds.select_elements(&[6]).unwrap_err();
        match err {
            IoError::IndexOutOfRange { index, len } => {
                assert_eq!(index, 6);
                assert_eq!(len, 6);
            }
            other => panic!("expected IndexOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn selection_returns_new_dataset() {
        let ds = dataset(9, 5);
        let _sub = ds.select_time(&TimeSelection::Single(0)).unwrap();
        // The source is untouched.
        assert_eq!(ds.n_time_steps(), 9);
    }
}
