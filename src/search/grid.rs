use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{HarnessError, Result};

/// The Cartesian product of explicit candidate lists.
///
/// Accepts either one object (`{"lr": [0.1, 0.01], "batch_size": [32]}`)
/// or a list of such objects, whose grids are visited one after the other.
/// Within a grid keys are taken in sorted order and the last key varies
/// fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGrid {
    grids: Vec<Vec<(String, Vec<Value>)>>,
}

impl ParameterGrid {
    pub fn load(path: &Path) -> Result<ParameterGrid> {
        let content = fs::read_to_string(path)?;
        ParameterGrid::from_json(&serde_json::from_str(&content)?)
    }

    pub fn from_json(value: &Value) -> Result<ParameterGrid> {
        let grids = match value {
            Value::Object(map) => vec![Self::parse_grid(map)?],
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => Self::parse_grid(map),
                    other => Err(HarnessError::Config(format!(
                        "grid entries must be objects, found {other}"
                    ))),
                })
                .collect::<Result<Vec<_>>>()?,
            other => {
                return Err(HarnessError::Config(format!(
                    "a parameter grid must be an object or a list of objects, found {other}"
                )))
            }
        };
        Ok(ParameterGrid { grids })
    }

    fn parse_grid(map: &Map<String, Value>) -> Result<Vec<(String, Vec<Value>)>> {
        let mut grid: Vec<(String, Vec<Value>)> = map
            .iter()
            .map(|(key, values)| match values {
                Value::Array(candidates) => Ok((key.clone(), candidates.clone())),
                other => Err(HarnessError::Config(format!(
                    "candidates for `{key}` must be a list, found {other}"
                ))),
            })
            .collect::<Result<_>>()?;
        grid.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(grid)
    }

    /// Number of points. A grid with an empty candidate list contributes
    /// none; a grid without keys contributes one empty assignment.
    pub fn len(&self) -> usize {
        self.grids.iter().map(|g| Self::grid_len(g)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn grid_len(grid: &[(String, Vec<Value>)]) -> usize {
        grid.iter().map(|(_, values)| values.len()).product()
    }

    /// The `index`-th assignment in iteration order.
    pub fn get(&self, mut index: usize) -> Option<Map<String, Value>> {
        for grid in &self.grids {
            let size = Self::grid_len(grid);
            if index >= size {
                index -= size;
                continue;
            }
            let mut point = Map::new();
            for (key, values) in grid.iter().rev() {
                point.insert(key.clone(), values[index % values.len()].clone());
                index /= values.len();
            }
            return Some(point);
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = Map<String, Value>> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}
