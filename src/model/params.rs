// src/model/params.rs

use crate::error::{RestockError, Result};
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// How seasonal effects combine with the trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SeasonalityMode {
    Additive,
    Multiplicative,
}

/// Tunable settings of the demand model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hyperparameters {
    /// How readily the trend bends. Larger is more flexible.
    pub changepoint_prior_scale: f64,
    /// How strongly yearly seasonality and holidays are weighted.
    pub seasonality_prior_scale: f64,
    pub seasonality_mode: SeasonalityMode,
}

impl Hyperparameters {
    /// Conservative general-purpose default used when a series is too short to tune
    /// or when tuning produced no usable candidate. Not tuned for any data set.
    pub const FALLBACK: Self = Self {
        changepoint_prior_scale: 0.05,
        seasonality_prior_scale: 10.0,
        seasonality_mode: SeasonalityMode::Additive,
    };

    /// Fixed settings for the single-fit interactive path.
    pub const INTERACTIVE: Self = Self {
        changepoint_prior_scale: 0.01,
        seasonality_prior_scale: 10.0,
        seasonality_mode: SeasonalityMode::Multiplicative,
    };

    /// Base the search grid overrides.
    pub const SEARCH_BASE: Self = Self {
        changepoint_prior_scale: 0.05,
        seasonality_prior_scale: 10.0,
        seasonality_mode: SeasonalityMode::Multiplicative,
    };

    /// Stable hash for cache keys.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.changepoint_prior_scale.to_bits().hash(&mut hasher);
        self.seasonality_prior_scale.to_bits().hash(&mut hasher);
        self.seasonality_mode.hash(&mut hasher);
        hasher.finish()
    }
}

impl fmt::Display for Hyperparameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "changepoint_prior_scale={}, seasonality_prior_scale={}, mode={:?}",
            self.changepoint_prior_scale, self.seasonality_prior_scale, self.seasonality_mode
        )
    }
}

/// One searchable parameter with its candidate values.
#[derive(Debug, Clone, PartialEq)]
pub enum GridDimension {
    ChangepointPriorScale(Vec<f64>),
    SeasonalityPriorScale(Vec<f64>),
    SeasonalityMode(Vec<SeasonalityMode>),
}

impl GridDimension {
    pub fn name(&self) -> &'static str {
        match self {
            GridDimension::ChangepointPriorScale(_) => "changepoint_prior_scale",
            GridDimension::SeasonalityPriorScale(_) => "seasonality_prior_scale",
            GridDimension::SeasonalityMode(_) => "seasonality_mode",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            GridDimension::ChangepointPriorScale(v) => v.len(),
            GridDimension::SeasonalityPriorScale(v) => v.len(),
            GridDimension::SeasonalityMode(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn apply(&self, index: usize, params: Hyperparameters) -> Hyperparameters {
        match self {
            GridDimension::ChangepointPriorScale(v) => Hyperparameters {
                changepoint_prior_scale: v[index],
                ..params
            },
            GridDimension::SeasonalityPriorScale(v) => Hyperparameters {
                seasonality_prior_scale: v[index],
                ..params
            },
            GridDimension::SeasonalityMode(v) => Hyperparameters {
                seasonality_mode: v[index],
                ..params
            },
        }
    }
}

/// Ordered parameter grid. Candidates are the Cartesian product of its dimensions,
/// first dimension varying slowest, applied over `base`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchGrid {
    base: Hyperparameters,
    dimensions: Vec<GridDimension>,
}

impl SearchGrid {
    pub fn new(base: Hyperparameters) -> Self {
        Self {
            base,
            dimensions: Vec::new(),
        }
    }

    pub fn with_dimension(mut self, dimension: GridDimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    pub fn changepoint_prior_scale(self, values: Vec<f64>) -> Self {
        self.with_dimension(GridDimension::ChangepointPriorScale(values))
    }

    pub fn seasonality_prior_scale(self, values: Vec<f64>) -> Self {
        self.with_dimension(GridDimension::SeasonalityPriorScale(values))
    }

    pub fn seasonality_mode(self, values: Vec<SeasonalityMode>) -> Self {
        self.with_dimension(GridDimension::SeasonalityMode(values))
    }

    /// All candidates in enumeration order.
    ///
    /// A grid with no dimensions, or with an empty dimension, is a caller error.
    pub fn candidates(&self) -> Result<Vec<Hyperparameters>> {
        if self.dimensions.is_empty() {
            return Err(RestockError::Precondition(
                "search grid has no dimensions".to_string(),
            ));
        }
        if let Some(dim) = self.dimensions.iter().find(|d| d.is_empty()) {
            return Err(RestockError::Precondition(format!(
                "search grid dimension '{}' has no values",
                dim.name()
            )));
        }

        let mut combos = vec![self.base];
        for dim in &self.dimensions {
            combos = combos
                .iter()
                .flat_map(|params| (0..dim.len()).map(move |i| dim.apply(i, *params)))
                .collect();
        }
        Ok(combos)
    }
}

impl Default for SearchGrid {
    /// The batch grid: three trend flexibilities by two seasonality strengths.
    fn default() -> Self {
        SearchGrid::new(Hyperparameters::SEARCH_BASE)
            .changepoint_prior_scale(vec![0.01, 0.1, 0.5])
            .seasonality_prior_scale(vec![1.0, 10.0])
    }
}
