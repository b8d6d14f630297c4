//! Time-ordered snowflake identifiers.
//!
//! A snowflake stores the milliseconds elapsed since an [`Epoch`] in its upper
//! 42 bits and a generator sequence number in its lower 22 bits. Generators never
//! hand out the same value twice, even when the clock stalls or steps backwards.

use derive_where::derive_where;
use std::{
    fmt::{Display, Formatter},
    marker::PhantomData,
};
use thiserror::Error;
use time::{Duration, UtcDateTime};

pub const TIMESTAMP_OFFSET: u64 = 22;
pub const TIMESTAMP_LENGTH: u64 = 42;
pub const TIMESTAMP_MAX: u64 = (1 << TIMESTAMP_LENGTH) - 1;

pub const SEQUENCE_LENGTH: u64 = 22;
pub const SEQUENCE_BITMASK: u64 = (1 << SEQUENCE_LENGTH) - 1;

pub trait Epoch {
    const EPOCH_TIME: UtcDateTime;
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum SnowflakeTimestampError {
    #[error("Specified time was before the snowflake epoch.")]
    TimeBeforeEpoch,
    #[error("Resulting timestamp uses too many bits.")]
    TimestampTooLarge,
}

/// Milliseconds between the epoch and `time`, if they fit the timestamp bits.
pub fn millis_since_epoch<SnowflakeEpoch: Epoch>(
    time: UtcDateTime,
) -> Result<u64, SnowflakeTimestampError> {
    let millis = (time - SnowflakeEpoch::EPOCH_TIME).whole_milliseconds();
    if millis < 0 {
        return Err(SnowflakeTimestampError::TimeBeforeEpoch);
    }

    u64::try_from(millis)
        .ok()
        .filter(|millis| *millis <= TIMESTAMP_MAX)
        .ok_or(SnowflakeTimestampError::TimestampTooLarge)
}

#[derive_where(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct Snowflake<SnowflakeEpoch>(u64, PhantomData<SnowflakeEpoch>);

impl<SnowflakeEpoch> Snowflake<SnowflakeEpoch> {
    #[must_use]
    pub fn new(inner: u64) -> Self {
        Self(inner, PhantomData)
    }

    /// Packs the parts, dropping any bits that do not fit their field.
    #[must_use]
    pub fn from_parts(millis: u64, sequence: u32) -> Self {
        let snowflake = ((millis & TIMESTAMP_MAX) << TIMESTAMP_OFFSET)
            | (u64::from(sequence) & SEQUENCE_BITMASK);

        Self::new(snowflake)
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn millis(self) -> u64 {
        self.0 >> TIMESTAMP_OFFSET
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn sequence(self) -> u32 {
        (self.0 & SEQUENCE_BITMASK) as u32
    }

    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn created_at(self) -> UtcDateTime
    where
        SnowflakeEpoch: Epoch,
    {
        SnowflakeEpoch::EPOCH_TIME + Duration::milliseconds(self.millis() as i64)
    }
}

impl<SnowflakeEpoch> Display for Snowflake<SnowflakeEpoch> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<SnowflakeEpoch> From<u64> for Snowflake<SnowflakeEpoch> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<SnowflakeEpoch> From<Snowflake<SnowflakeEpoch>> for u64 {
    fn from(value: Snowflake<SnowflakeEpoch>) -> Self {
        value.get()
    }
}

#[derive_where(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct SnowflakeGenerator<SnowflakeEpoch> {
    last_millis: u64,
    next_sequence: u32,
    phantom_data: PhantomData<SnowflakeEpoch>,
}

impl<SnowflakeEpoch> SnowflakeGenerator<SnowflakeEpoch> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_millis: 0,
            next_sequence: 0,
            phantom_data: PhantomData,
        }
    }

    /// Generates a snowflake for `time`.
    ///
    /// Times before the epoch count as the epoch itself. A time that is not later
    /// than the previous one reuses the previous millisecond with the next sequence
    /// number, so the output is strictly increasing.
    pub fn generate_at(&mut self, time: UtcDateTime) -> Snowflake<SnowflakeEpoch>
    where
        SnowflakeEpoch: Epoch,
    {
        let millis = match millis_since_epoch::<SnowflakeEpoch>(time) {
            Ok(millis) => millis,
            Err(SnowflakeTimestampError::TimeBeforeEpoch) => 0,
            Err(SnowflakeTimestampError::TimestampTooLarge) => TIMESTAMP_MAX,
        };

        if millis > self.last_millis {
            self.last_millis = millis;
            self.next_sequence = 0;
        } else if u64::from(self.next_sequence) > SEQUENCE_BITMASK {
            self.last_millis += 1;
            self.next_sequence = 0;
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        Snowflake::from_parts(self.last_millis, sequence)
    }

    pub fn generate(&mut self) -> Snowflake<SnowflakeEpoch>
    where
        SnowflakeEpoch: Epoch,
    {
        self.generate_at(UtcDateTime::now())
    }
}
