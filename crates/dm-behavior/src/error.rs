use thiserror::Error;

/// Configuration problems found while validating [`Parameters`][crate::Parameters].
///
/// All of these are fatal at startup: the simulation builder refuses to
/// construct a run from parameters that fail validation.
#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("parameter `{name}` = {value} is outside [0, 1]")]
    NotAProbability { name: String, value: f64 },

    #[error("distribution `{name}` is malformed: {reason}")]
    BadDistribution { name: String, reason: &'static str },

    #[error("age table `{name}` is malformed: {reason}")]
    BadAgeTable { name: String, reason: &'static str },

    #[error("behavior configuration error: {0}")]
    Config(String),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;

/// Check that `value` is a probability.
pub(crate) fn check_unit(name: &str, value: f64) -> BehaviorResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(BehaviorError::NotAProbability { name: name.to_owned(), value })
    }
}
