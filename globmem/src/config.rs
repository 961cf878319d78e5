use std::num::ParseIntError;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::address::TeamId;
use crate::address::UnitId;

/// Number of units to launch.
pub const PGAS_UNITS: &str = "PGAS_UNITS";

/// Size in bytes of each unit's segment.
pub const PGAS_SEGMENT_BYTES: &str = "PGAS_SEGMENT_BYTES";

/// Id of the team formed by the launched units.
pub const PGAS_TEAM_ID: &str = "PGAS_TEAM_ID";

/// Unit ids carry 24 significant bits.
pub const MAX_UNITS: usize = 1 << 24;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {source}")]
    InvalidValue {
        var: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("at least one unit is required")]
    NoUnits,

    #[error("{units} units exceed the maximum of {max}", max = MAX_UNITS)]
    TooManyUnits { units: usize },
}

/// Launch parameters for a team of units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PgasConfig {
    pub units: usize,
    pub segment_bytes: usize,
    pub team_id: TeamId,
}

impl Default for PgasConfig {
    fn default() -> Self {
        Self {
            units: 4,
            segment_bytes: 4096,
            team_id: 0,
        }
    }
}

impl PgasConfig {
    /// The default configuration, overridden by `PGAS_UNITS`,
    /// `PGAS_SEGMENT_BYTES` and `PGAS_TEAM_ID` where set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|var| std::env::var(var).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(units) = parse_var(&lookup, PGAS_UNITS)? {
            self.units = units;
        }
        if let Some(segment_bytes) = parse_var(&lookup, PGAS_SEGMENT_BYTES)? {
            self.segment_bytes = segment_bytes;
        }
        if let Some(team_id) = parse_var(&lookup, PGAS_TEAM_ID)? {
            self.team_id = team_id;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.units == 0 {
            return Err(ConfigError::NoUnits);
        }
        if self.units > MAX_UNITS {
            return Err(ConfigError::TooManyUnits { units: self.units });
        }
        Ok(())
    }

    /// Ids of the configured units, in order.
    pub fn unit_ids(&self) -> impl Iterator<Item = UnitId> {
        (0..self.units).filter_map(|unit| UnitId::try_from(unit).ok())
    }
}

fn parse_var<T: FromStr<Err = ParseIntError>>(
    lookup: &impl Fn(&'static str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    match value.trim().parse() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(source) => Err(ConfigError::InvalidValue { var, value, source }),
    }
}
