//! The sighting analyses, as ready-made pipelines
//!
//! Each function returns an [`OperationPipeline`] over the raw sightings table.
//! Thresholds and row limits come from [`QueryParams`].

use crate::ops::{
    AggregateOptions, AggregateSpec, MissingKeys, OperationPipeline, Predicate, RankOptions,
    SortOptions, Stat,
};

/// Column names of the sightings dataset and of derived outputs
pub mod columns {
    pub const DATE_TIME: &str = "Date_time";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state_province";
    pub const COUNTRY: &str = "country";
    pub const SHAPE: &str = "UFO_shape";
    pub const SECONDS: &str = "length_of_encounter_seconds";
    pub const DESCRIBED_DURATION: &str = "described_duration_of_encounter";

    pub const MINUTES: &str = "minutes";
    pub const SIGHTING_COUNT: &str = "sighting_count";
    pub const COUNT: &str = "count";
    pub const AVG_DURATION: &str = "avg_duration";
    pub const MAX_DURATION: &str = "max_duration";
    pub const MIN_DURATION: &str = "min_duration";
    pub const CITY_RANK: &str = "city_rank";
}

use columns::{
    AVG_DURATION, CITY, CITY_RANK, COUNT, COUNTRY, DATE_TIME, DESCRIBED_DURATION, MAX_DURATION,
    MINUTES, MIN_DURATION, SECONDS, SHAPE, SIGHTING_COUNT, STATE,
};

/// Tunable thresholds and limits of the analyses
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    /// Country code the US-only queries keep
    pub country: String,
    /// Shape matched by [`disk_sightings`]
    pub shape: String,
    /// Rows kept by [`disk_sightings`]
    pub disk_limit: usize,
    /// Rows kept by [`long_encounters`]
    pub long_limit: usize,
    /// Minimum encounter length in seconds for [`long_encounters`]
    pub long_min_seconds: f64,
    /// Rows kept by [`sightings_by_country`]
    pub country_limit: usize,
    /// Minimum sightings per shape for [`shape_statistics`]
    pub shape_min_count: i64,
    /// Rows kept by [`shape_statistics`]
    pub shape_limit: usize,
    /// Cities kept per state by [`top_cities_by_state`]
    pub top_k: usize,
    /// Rows kept by [`top_cities_by_state`]
    pub top_cities_limit: usize,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            country: "us".to_string(),
            shape: "disk".to_string(),
            disk_limit: 10,
            long_limit: 20,
            long_min_seconds: 1800.0,
            country_limit: 10,
            shape_min_count: 1000,
            shape_limit: 15,
            top_k: 5,
            top_cities_limit: 100,
        }
    }
}

fn names(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| (*c).to_string()).collect()
}

/// Disk-shaped sightings in one country, most recent first
#[must_use]
pub fn disk_sightings(params: &QueryParams) -> OperationPipeline {
    OperationPipeline::new()
        .coerce(SECONDS)
        .filter(Predicate::and(vec![
            Predicate::eq(COUNTRY, params.country.as_str()),
            Predicate::eq(SHAPE, params.shape.as_str()),
        ]))
        .select(names(&[DATE_TIME, CITY, STATE, SHAPE, SECONDS]))
        .sort(vec![SortOptions::desc(DATE_TIME)])
        .head(params.disk_limit)
}

/// Encounters lasting at least `long_min_seconds`, longest first, with a minutes column
#[must_use]
pub fn long_encounters(params: &QueryParams) -> OperationPipeline {
    OperationPipeline::new()
        .coerce(SECONDS)
        .filter(Predicate::and(vec![
            Predicate::ge(SECONDS, params.long_min_seconds),
            Predicate::eq(COUNTRY, params.country.as_str()),
        ]))
        .sort(vec![SortOptions::desc(SECONDS)])
        .with_column(MINUTES, names(&[SECONDS]), |row| {
            Ok(row.get(SECONDS)?.div(60.0))
        })
        .select(names(&[
            DATE_TIME,
            CITY,
            STATE,
            SHAPE,
            MINUTES,
            DESCRIBED_DURATION,
        ]))
        .head(params.long_limit)
}

/// Sightings per country, largest first. Rows without a country are not counted.
#[must_use]
pub fn sightings_by_country(params: &QueryParams) -> OperationPipeline {
    OperationPipeline::new().aggregate(
        names(&[COUNTRY]),
        vec![AggregateSpec::count_rows().alias(SIGHTING_COUNT)],
        AggregateOptions::default()
            .missing_keys(MissingKeys::Drop)
            .sort(vec![SortOptions::desc(SIGHTING_COUNT)])
            .limit(params.country_limit),
    )
}

/// Duration statistics per shape for shapes seen at least `shape_min_count` times
#[must_use]
pub fn shape_statistics(params: &QueryParams) -> OperationPipeline {
    OperationPipeline::new()
        .coerce(SECONDS)
        .filter(Predicate::and(vec![
            Predicate::not_missing(SHAPE),
            Predicate::not_missing(SECONDS),
        ]))
        .aggregate(
            names(&[SHAPE]),
            vec![
                AggregateSpec::count_rows().alias(COUNT),
                AggregateSpec::new(SECONDS, Stat::Mean).alias(AVG_DURATION),
                AggregateSpec::new(SECONDS, Stat::Max).alias(MAX_DURATION),
                AggregateSpec::new(SECONDS, Stat::Min).alias(MIN_DURATION),
            ],
            AggregateOptions::default()
                .having(Predicate::ge(COUNT, params.shape_min_count))
                .sort(vec![SortOptions::desc(COUNT)])
                .limit(params.shape_limit),
        )
}

/// The `top_k` cities of each state by sighting count
#[must_use]
pub fn top_cities_by_state(params: &QueryParams) -> OperationPipeline {
    OperationPipeline::new()
        .filter(Predicate::and(vec![
            Predicate::eq(COUNTRY, params.country.as_str()),
            Predicate::not_missing(STATE),
            Predicate::not_missing(CITY),
        ]))
        .aggregate(
            names(&[STATE, CITY]),
            vec![AggregateSpec::count_rows().alias(SIGHTING_COUNT)],
            AggregateOptions::default().missing_keys(MissingKeys::Drop),
        )
        .rank(
            RankOptions::new(names(&[STATE]), SIGHTING_COUNT)
                .descending()
                .output(CITY_RANK),
        )
        .top_k(params.top_k)
        .sort(vec![SortOptions::asc(STATE), SortOptions::asc(CITY_RANK)])
        .head(params.top_cities_limit)
}

/// A named analysis selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    DiskSightings,
    LongEncounters,
    SightingsByCountry,
    ShapeStatistics,
    TopCitiesByState,
}

impl Query {
    /// Every query, in presentation order
    pub const ALL: [Query; 5] = [
        Query::DiskSightings,
        Query::LongEncounters,
        Query::SightingsByCountry,
        Query::ShapeStatistics,
        Query::TopCitiesByState,
    ];

    /// Build the pipeline for this query
    #[must_use]
    pub fn pipeline(self, params: &QueryParams) -> OperationPipeline {
        match self {
            Query::DiskSightings => disk_sightings(params),
            Query::LongEncounters => long_encounters(params),
            Query::SightingsByCountry => sightings_by_country(params),
            Query::ShapeStatistics => shape_statistics(params),
            Query::TopCitiesByState => top_cities_by_state(params),
        }
    }

    /// Identifier used for output file names
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Query::DiskSightings => "disk_sightings",
            Query::LongEncounters => "long_encounters",
            Query::SightingsByCountry => "sightings_by_country",
            Query::ShapeStatistics => "shape_statistics",
            Query::TopCitiesByState => "top_cities_by_state",
        }
    }

    /// Short human-readable title
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Query::DiskSightings => "Disk-shaped sightings",
            Query::LongEncounters => "Long encounters",
            Query::SightingsByCountry => "Sightings by country",
            Query::ShapeStatistics => "Shape statistics",
            Query::TopCitiesByState => "Top cities by state",
        }
    }
}
