//! Capture group configuration contracts
//!
//! Serde-backed parameter blocks for integer-stamped pipelines. Embedders
//! parse these (TOML/JSON), run `validate`, then construct the typed captors.
//! Delays and periods are expressed in stamp ticks; delays may be negative.

use serde::{Deserialize, Serialize};

use crate::{StreamId, SyncError};

/// Driver policy selection and parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum DriverPolicyConfig {
    /// Emit the oldest element, one per capture.
    Next,
    /// Emit a sliding window of the N oldest elements.
    Batch { size: usize },
    /// Emit and retire the N oldest elements.
    Chunk { size: usize },
    /// Emit at most one element per period.
    Throttled { period: i64 },
}

/// Follower policy selection and parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum FollowerPolicyConfig {
    /// Emit everything before the delayed range upper bound; never blocks.
    AnyBefore {
        #[serde(default)]
        delay: i64,
    },
    /// Emit everything before the delayed range lower bound, once a witness
    /// at or past the boundary exists.
    Before {
        #[serde(default)]
        delay: i64,
    },
    /// Emit the element closest below the boundary within a lookback period.
    ClosestBefore {
        #[serde(default)]
        delay: i64,
        period: i64,
    },
    /// Emit the N newest elements before the boundary.
    CountBefore {
        count: usize,
        #[serde(default)]
        delay: i64,
    },
    /// Emit the newest sufficiently old element, re-emitting it while no
    /// newer candidate arrives.
    Latched { min_period: i64 },
    /// Emit the element whose stamp equals the range lower bound.
    MatchedStamp,
    /// Emit the elements bracketing the delayed range.
    Ranged {
        #[serde(default)]
        delay: i64,
    },
}

/// Per-captor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptorConfig<P> {
    /// Stream label, used for logging and metric tags.
    pub stream: StreamId,

    /// Policy parameters.
    #[serde(flatten)]
    pub policy: P,

    /// Queue capacity; `None` means unbounded.
    #[serde(default)]
    pub capacity: Option<usize>,
}

/// Whole-group configuration: one driver, N followers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Driver captor.
    pub driver: CaptorConfig<DriverPolicyConfig>,

    /// Follower captors, in tuple order.
    #[serde(default)]
    pub followers: Vec<CaptorConfig<FollowerPolicyConfig>>,
}

impl GroupConfig {
    /// Validate the configuration.
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), SyncError> {
        validate_driver(&self.driver)?;
        validate_follower_streams(&self.followers, &self.driver.stream)?;
        for follower in &self.followers {
            validate_follower(follower)?;
        }
        Ok(())
    }
}

fn validate_capacity(stream: &StreamId, capacity: Option<usize>) -> Result<(), SyncError> {
    if capacity == Some(0) {
        return Err(SyncError::config_validation(
            format!("captor[{stream}].capacity"),
            "capacity must be at least 1 when set",
        ));
    }
    Ok(())
}

fn validate_driver(driver: &CaptorConfig<DriverPolicyConfig>) -> Result<(), SyncError> {
    validate_capacity(&driver.stream, driver.capacity)?;
    match driver.policy {
        DriverPolicyConfig::Batch { size } | DriverPolicyConfig::Chunk { size } if size == 0 => {
            Err(SyncError::config_validation(
                format!("driver[{}].size", driver.stream),
                "batch/chunk size must be at least 1",
            ))
        }
        DriverPolicyConfig::Throttled { period } if period <= 0 => {
            Err(SyncError::config_validation(
                format!("driver[{}].period", driver.stream),
                format!("throttle period must be positive, got {period}"),
            ))
        }
        _ => Ok(()),
    }
}

fn validate_follower(follower: &CaptorConfig<FollowerPolicyConfig>) -> Result<(), SyncError> {
    validate_capacity(&follower.stream, follower.capacity)?;
    match follower.policy {
        FollowerPolicyConfig::ClosestBefore { period, .. } if period <= 0 => {
            Err(SyncError::config_validation(
                format!("follower[{}].period", follower.stream),
                format!("lookback period must be positive, got {period}"),
            ))
        }
        FollowerPolicyConfig::CountBefore { count, .. } if count == 0 => {
            Err(SyncError::config_validation(
                format!("follower[{}].count", follower.stream),
                "count must be at least 1",
            ))
        }
        FollowerPolicyConfig::Latched { min_period } if min_period < 0 => {
            Err(SyncError::config_validation(
                format!("follower[{}].min_period", follower.stream),
                format!("min period must be non-negative, got {min_period}"),
            ))
        }
        _ => Ok(()),
    }
}

fn validate_follower_streams(
    followers: &[CaptorConfig<FollowerPolicyConfig>],
    driver_stream: &StreamId,
) -> Result<(), SyncError> {
    let mut seen = std::collections::HashSet::new();
    seen.insert(&**driver_stream);
    for follower in followers {
        if !seen.insert(&*follower.stream) {
            return Err(SyncError::config_validation(
                format!("followers[stream={}]", follower.stream),
                "duplicate stream label",
            ));
        }
    }
    Ok(())
}
