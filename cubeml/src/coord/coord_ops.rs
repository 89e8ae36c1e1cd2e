use cubeml_units::Unit;
use itertools::Itertools;

use crate::values::{float_eq, Values};

use super::{monotonic_direction, Coord, CoordBuilder, CoordOpError};

impl Coord {
    fn numeric_points(&self) -> Result<Vec<f64>, CoordOpError> {
        let points = self
            .points
            .explicit()
            .ok_or_else(|| CoordOpError::Elided(self.name().to_string()))?;
        points
            .to_f64()
            .ok_or_else(|| CoordOpError::NotNumeric(self.name().to_string()))
    }

    fn numeric_bounds(&self) -> Result<Option<Vec<f64>>, CoordOpError> {
        match &self.bounds {
            Some(bounds) => {
                let bounds = bounds
                    .explicit()
                    .ok_or_else(|| CoordOpError::Elided(self.name().to_string()))?;
                Ok(bounds.to_f64())
            }
            None => Ok(None),
        }
    }

    fn require_one_dimensional(&self) -> Result<(), CoordOpError> {
        if self.ndim() == 1 {
            Ok(())
        } else {
            Err(CoordOpError::NotOneDimensional(self.name().to_string()))
        }
    }

    /// A copy of this coordinate with new points and bounds.
    ///
    /// Integer coordinates stay integer if every new point is integral, unless `force_float`.
    fn with_values(
        &self,
        points: Vec<f64>,
        bounds: Option<Vec<f64>>,
        shape: Vec<usize>,
        nbounds: usize,
        force_float: bool,
    ) -> Result<Self, CoordOpError> {
        let points = Values::Float(points);
        let value_type = if self.value_type.is_float()
            || (!force_float && points.fits(self.value_type))
        {
            self.value_type
        } else {
            crate::DataType::Float64
        };
        let mut builder = CoordBuilder::from_coord(self);
        builder
            .points(points)
            .value_type(value_type)
            .shape(shape)
            .nbounds(nbounds);
        builder.bounds_value_type = None;
        match bounds {
            Some(bounds) => builder.bounds(Values::Float(bounds)),
            None => builder.clear_bounds(),
        };
        Ok(builder.build()?)
    }

    /// Guess contiguous bounds for a one-dimensional coordinate from its points.
    ///
    /// `bound_position` is the position of each point within its cell, where `0.5` centres the point.
    /// The first and last cells are extended by the neighbouring point spacing.
    ///
    /// # Errors
    /// Returns a [`CoordOpError`] if the coordinate already has bounds, is not one-dimensional, numeric and explicit,
    /// has fewer than two points, its points are not monotonic, or `bound_position` is outside `[0, 1]`.
    pub fn guess_bounds(&self, bound_position: f64) -> Result<Self, CoordOpError> {
        if !(0.0..=1.0).contains(&bound_position) {
            return Err(CoordOpError::InvalidBoundPosition(bound_position));
        }
        if self.has_bounds() {
            return Err(CoordOpError::BoundsExist(self.name().to_string()));
        }
        self.require_one_dimensional()?;
        let points = self.numeric_points()?;
        if points.len() < 2 {
            return Err(CoordOpError::TooFewPoints {
                coord: self.name().to_string(),
                points: points.len(),
                required: 2,
            });
        }
        if monotonic_direction(&points, true).is_none() {
            return Err(CoordOpError::NotMonotonic(self.name().to_string()));
        }

        let diffs: Vec<f64> = points.iter().tuple_windows().map(|(a, b)| b - a).collect();
        let first = diffs[0];
        let last = diffs[diffs.len() - 1];
        let extended: Vec<f64> = std::iter::once(first)
            .chain(diffs.iter().copied())
            .chain(std::iter::once(last))
            .collect();
        let bounds = points
            .iter()
            .zip(extended.iter().tuple_windows())
            .flat_map(|(point, (before, after))| {
                [
                    point - before * bound_position,
                    point + after * (1.0 - bound_position),
                ]
            })
            .collect();

        let mut builder = CoordBuilder::from_coord(self);
        builder.bounds(Values::Float(bounds)).nbounds(2);
        Ok(builder.build()?)
    }

    /// Collapse the coordinate to a single cell spanning all of its points and bounds.
    ///
    /// The point is the middle of the cell, truncated for integer coordinates.
    /// A circular coordinate with a unit modulus collapses to a cell one modulus wide starting at its minimum.
    /// Text points are joined with `|`.
    ///
    /// # Errors
    /// Returns a [`CoordOpError`] if the points or bounds are elided.
    pub fn collapsed(&self) -> Result<Self, CoordOpError> {
        if let Some(Values::Text(points)) = self.points.explicit() {
            let mut builder = CoordBuilder::from_coord(self);
            builder
                .points(vec![points.join("|")])
                .shape(vec![1])
                .clear_bounds()
                .circular(false);
            return Ok(builder.build()?);
        }

        let values = match self.numeric_bounds()? {
            Some(bounds) => bounds,
            None => self.numeric_points()?,
        };
        let lower = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut upper = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if self.circular {
            if let Some(modulus) = self.units.modulus() {
                upper = lower + modulus;
            }
        }
        let mut point = (lower + upper) * 0.5;
        if !self.value_type.is_float() {
            point = point.trunc();
        }
        let mut collapsed =
            self.with_values(vec![point], Some(vec![lower, upper]), vec![1], 2, false)?;
        collapsed.circular = false;
        Ok(collapsed)
    }

    /// The indices of the cells of this coordinate that also appear in `other`, in the order of `other`.
    ///
    /// Cells match when their points and bounds are equal.
    ///
    /// # Errors
    /// Returns [`CoordOpError::Incompatible`] if the coordinates differ in name, units or coordinate system,
    /// or another [`CoordOpError`] if either is not one-dimensional, numeric and explicit.
    pub fn intersect_indices(&self, other: &Self) -> Result<Vec<usize>, CoordOpError> {
        let incompatible = |reason| CoordOpError::Incompatible {
            coord: self.name().to_string(),
            other: other.name().to_string(),
            reason,
        };
        if self.name() != other.name() {
            return Err(incompatible("different names"));
        }
        if self.units != other.units {
            return Err(incompatible("different units"));
        }
        if self.coord_system != other.coord_system {
            return Err(incompatible("different coordinate systems"));
        }
        self.require_one_dimensional()?;
        other.require_one_dimensional()?;

        let cells = |coord: &Self| -> Result<Vec<(f64, Vec<f64>)>, CoordOpError> {
            let points = coord.numeric_points()?;
            let bounds = coord.numeric_bounds()?;
            Ok(points
                .iter()
                .enumerate()
                .map(|(index, point)| {
                    let bounds = bounds.as_ref().map_or_else(Vec::new, |bounds| {
                        bounds[index * coord.nbounds..(index + 1) * coord.nbounds].to_vec()
                    });
                    (*point, bounds)
                })
                .collect())
        };
        let cell_eq = |(a, a_bounds): &(f64, Vec<f64>), (b, b_bounds): &(f64, Vec<f64>)| {
            float_eq(*a, *b)
                && a_bounds.len() == b_bounds.len()
                && a_bounds.iter().zip(b_bounds).all(|(a, b)| float_eq(*a, *b))
        };

        let self_cells = cells(self)?;
        Ok(cells(other)?
            .iter()
            .filter_map(|cell| self_cells.iter().position(|self_cell| cell_eq(self_cell, cell)))
            .collect())
    }

    /// The cells of this coordinate that also appear in `other`, in the order of `other`.
    ///
    /// # Errors
    /// Returns [`CoordOpError::NoIntersection`] if there are no common cells,
    /// or any error of [`intersect_indices`](Coord::intersect_indices).
    pub fn intersect(&self, other: &Self) -> Result<Self, CoordOpError> {
        let indices = self.intersect_indices(other)?;
        if indices.is_empty() {
            return Err(CoordOpError::NoIntersection(self.name().to_string()));
        }
        self.select(&indices)
    }

    /// Returns true if the coordinates describe the same quantity, regardless of their points and bounds.
    ///
    /// The names, units and coordinate systems must match, as must the attributes present on both
    /// coordinates other than those named in `ignore`.
    #[must_use]
    pub fn is_compatible(&self, other: &Self, ignore: &[&str]) -> bool {
        self.name() == other.name()
            && self.units == other.units
            && self.coord_system == other.coord_system
            && self
                .attributes
                .iter()
                .filter(|(key, _)| !ignore.contains(&key.as_str()))
                .all(|(key, value)| other.attributes.get(key).map_or(true, |other| other == value))
    }

    /// The cells at `indices` of a one-dimensional coordinate.
    ///
    /// # Errors
    /// Returns a [`CoordOpError`] if the coordinate is not one-dimensional or explicit,
    /// an index is out of range, or `indices` is empty.
    pub fn select(&self, indices: &[usize]) -> Result<Self, CoordOpError> {
        self.require_one_dimensional()?;
        let points = self
            .points
            .explicit()
            .ok_or_else(|| CoordOpError::Elided(self.name().to_string()))?;
        if let Some(index) = indices.iter().find(|index| **index >= self.len()) {
            return Err(CoordOpError::IndexOutOfRange {
                coord: self.name().to_string(),
                index: *index,
                len: self.len(),
            });
        }
        let points = points
            .select(indices)
            .unwrap_or_else(|| Values::empty(self.value_type));

        let mut builder = CoordBuilder::from_coord(self);
        builder.points(points).shape(vec![indices.len()]);
        if let Some(bounds) = &self.bounds {
            let bounds = bounds
                .explicit()
                .ok_or_else(|| CoordOpError::Elided(self.name().to_string()))?;
            let bound_indices: Vec<usize> = indices
                .iter()
                .flat_map(|index| index * self.nbounds..(index + 1) * self.nbounds)
                .collect();
            builder.bounds(
                bounds
                    .select(&bound_indices)
                    .unwrap_or_else(|| Values::empty(self.bounds_value_type())),
            );
        }
        Ok(builder.build()?)
    }

    fn map_values(
        &self,
        op: impl Fn(f64) -> f64,
        force_float: bool,
    ) -> Result<Self, CoordOpError> {
        let points = self.numeric_points()?.into_iter().map(&op).collect();
        let bounds = self
            .numeric_bounds()?
            .map(|bounds| bounds.into_iter().map(&op).collect());
        self.with_values(points, bounds, self.shape.clone(), self.nbounds, force_float)
    }

    /// `self + value`.
    ///
    /// # Errors
    /// Returns a [`CoordOpError`] if the points or bounds are elided or not numeric.
    pub fn add(&self, value: f64) -> Result<Self, CoordOpError> {
        self.map_values(|x| x + value, false)
    }

    /// `self - value`.
    ///
    /// # Errors
    /// Returns a [`CoordOpError`] if the points or bounds are elided or not numeric.
    pub fn subtract(&self, value: f64) -> Result<Self, CoordOpError> {
        self.map_values(|x| x - value, false)
    }

    /// `value - self`.
    ///
    /// # Errors
    /// Returns a [`CoordOpError`] if the points or bounds are elided or not numeric.
    pub fn subtract_from(&self, value: f64) -> Result<Self, CoordOpError> {
        self.map_values(|x| value - x, false)
    }

    /// `self * value`.
    ///
    /// # Errors
    /// Returns a [`CoordOpError`] if the points or bounds are elided or not numeric.
    pub fn multiply(&self, value: f64) -> Result<Self, CoordOpError> {
        self.map_values(|x| x * value, false)
    }

    /// `self / value`. The result is always floating point.
    ///
    /// # Errors
    /// Returns a [`CoordOpError`] if the points or bounds are elided or not numeric.
    pub fn divide(&self, value: f64) -> Result<Self, CoordOpError> {
        self.map_values(|x| x / value, true)
    }

    /// `value / self`. The result is always floating point.
    ///
    /// # Errors
    /// Returns a [`CoordOpError`] if the points or bounds are elided or not numeric.
    pub fn divide_into(&self, value: f64) -> Result<Self, CoordOpError> {
        self.map_values(|x| value / x, true)
    }

    /// `-self`.
    ///
    /// # Errors
    /// Returns a [`CoordOpError`] if the points or bounds are elided or not numeric.
    pub fn negated(&self) -> Result<Self, CoordOpError> {
        self.map_values(|x| -x, false)
    }

    /// The sine of an angular coordinate, named `sin(<name>)` with units `1`.
    ///
    /// # Errors
    /// Returns a [`CoordOpError`] if the units cannot be converted to radians,
    /// or the points or bounds are elided or not numeric.
    pub fn sin(&self) -> Result<Self, CoordOpError> {
        self.trig("sin", f64::sin)
    }

    /// The cosine of an angular coordinate, named `cos(<name>)` with units `1`.
    ///
    /// # Errors
    /// Returns a [`CoordOpError`] under the same conditions as [`sin`](Coord::sin).
    pub fn cos(&self) -> Result<Self, CoordOpError> {
        self.trig("cos", f64::cos)
    }

    fn trig(&self, function: &str, op: fn(f64) -> f64) -> Result<Self, CoordOpError> {
        let radians = Unit::radians();
        let apply = |values: Vec<f64>| {
            values
                .into_iter()
                .map(|value| self.units.convert(value, &radians).map(op))
                .collect::<Result<Vec<_>, _>>()
        };
        let points = apply(self.numeric_points()?)?;
        let bounds = self.numeric_bounds()?.map(apply).transpose()?;
        let mut result = self.with_values(points, bounds, self.shape.clone(), self.nbounds, true)?;
        result.rename(format!("{function}({})", self.name()));
        result.units = Unit::dimensionless();
        result.circular = false;
        Ok(result)
    }

    /// Differences between neighbouring cells, named `change_in_<name>`.
    ///
    /// A coordinate of length `n` gives `n - 1` differences, or `n` if `circular`,
    /// in which case the last difference wraps from the last cell to the first across the unit modulus.
    ///
    /// # Errors
    /// Returns a [`CoordOpError`] if the coordinate is not one-dimensional, numeric and explicit,
    /// or has a single point and is not `circular`.
    pub fn delta(&self, circular: bool) -> Result<Self, CoordOpError> {
        let (points, bounds) = self.deltas(circular)?;
        let len = points.len();
        let mut delta = self.with_values(points, bounds, vec![len], self.nbounds, false)?;
        delta.rename(format!("change_in_{}", self.name()));
        delta.circular = false;
        Ok(delta)
    }

    /// Mid-points between neighbouring cells.
    ///
    /// A coordinate of length `n` gives `n - 1` mid-points, or `n` if `circular`.
    ///
    /// # Errors
    /// Returns a [`CoordOpError`] under the same conditions as [`delta`](Coord::delta).
    pub fn midpoints(&self, circular: bool) -> Result<Self, CoordOpError> {
        let (point_deltas, bound_deltas) = self.deltas(circular)?;
        let points = self.numeric_points()?;
        let len = point_deltas.len();
        let midpoints = points
            .iter()
            .zip(&point_deltas)
            .map(|(point, delta)| point + delta * 0.5)
            .collect();
        let bounds = match (self.numeric_bounds()?, bound_deltas) {
            (Some(bounds), Some(deltas)) => Some(
                bounds
                    .iter()
                    .zip(&deltas)
                    .map(|(bound, delta)| bound + delta * 0.5)
                    .collect(),
            ),
            _ => None,
        };
        self.with_values(midpoints, bounds, vec![len], self.nbounds, true)
    }

    #[allow(clippy::type_complexity)]
    fn deltas(&self, circular: bool) -> Result<(Vec<f64>, Option<Vec<f64>>), CoordOpError> {
        self.require_one_dimensional()?;
        let points = self.numeric_points()?;
        if points.len() < 2 && !circular {
            return Err(CoordOpError::TooFewPoints {
                coord: self.name().to_string(),
                points: points.len(),
                required: 2,
            });
        }
        let modulus = if circular { self.units.modulus() } else { None };
        let point_deltas = delta_along(&points, 1, circular, modulus);
        let bound_deltas = self
            .numeric_bounds()?
            .map(|bounds| delta_along(&bounds, self.nbounds, circular, modulus));
        Ok((point_deltas, bound_deltas))
    }
}

/// Differences along the first axis of a C order array with `stride` values per row.
///
/// If `circular`, a final row wraps from the last row to the first,
/// adjusted by `modulus` so that it continues in the direction of travel.
fn delta_along(values: &[f64], stride: usize, circular: bool, modulus: Option<f64>) -> Vec<f64> {
    let rows = values.len() / stride;
    let row = |index: usize| &values[index * stride..(index + 1) * stride];
    let mut deltas = Vec::with_capacity(values.len());
    for index in 1..rows {
        deltas.extend(row(index).iter().zip(row(index - 1)).map(|(b, a)| b - a));
    }
    if circular && rows > 0 {
        deltas.extend(row(0).iter().zip(row(rows - 1)).map(|(first, last)| {
            let wrap = first - last;
            match modulus {
                Some(modulus) if last >= first => wrap + modulus,
                Some(modulus) => wrap - modulus,
                None => wrap,
            }
        }));
    }
    deltas
}
