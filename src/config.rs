use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_COLUMNS: usize = 8;
pub const DEFAULT_ROWS: usize = 16;
pub const DEFAULT_TICK_MS: u64 = 750;

/// Session parameters, fixed once the session is created.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Config {
    pub columns: usize,
    pub rows: usize,
    pub tick_interval: Duration,
}

impl Config {
    pub fn new(columns: usize, rows: usize) -> Result<Self> {
        Self {
            columns,
            rows,
            ..Self::default()
        }
        .validated()
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Result<Self> {
        self.tick_interval = tick_interval;
        self.validated()
    }

    pub fn validated(self) -> Result<Self> {
        if self.columns == 0 {
            return Err(Error::NoColumns);
        }
        if self.rows == 0 {
            return Err(Error::NoRows);
        }
        if self.tick_interval.is_zero() {
            return Err(Error::ZeroTickInterval);
        }
        Ok(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
        }
    }
}
