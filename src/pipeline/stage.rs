use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::dataset::{AlignedDataset, Column};

use super::error::StageError;

/// A pure transformation of an aligned dataset.
///
/// Stages must not depend on anything but their own parameters and the input
/// dataset. The pipeline records each applied stage in the output history.
pub trait Stage: Send + Sync + Debug {
    /// Short stage name used in histories and errors
    fn name(&self) -> &str;

    /// Parameters recorded in the processing history
    fn parameters(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Produce a new dataset from `input`
    fn apply(&self, input: &AlignedDataset) -> Result<AlignedDataset, StageError>;
}

/// Replace every column of `input` with the result of `f`, keeping the grid
pub fn map_columns<F>(input: &AlignedDataset, f: F) -> Result<AlignedDataset, StageError>
where
    F: Fn(&Column) -> Result<Column, StageError>,
{
    let columns = input
        .columns()
        .iter()
        .map(f)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(input.with_columns(columns)?)
}

/// Parameter map from `(key, value)` pairs
pub(crate) fn params<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
