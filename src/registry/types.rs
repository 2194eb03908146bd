use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RateLimitError {
    #[error("invalid rate limit amount in {0:?}")]
    InvalidAmount(String),
    #[error("unknown rate limit unit {unit:?} in {spec:?} (expected s, m or h)")]
    UnknownUnit { spec: String, unit: String },
    #[error("unsupported rate limit value {0}")]
    Unsupported(String),
}

/// Maximum admission frequency for a task type, e.g. `10/s`, `100/m`, `1000/h`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimit {
    amount: f64,
    per: Duration,
}

impl RateLimit {
    pub fn per_second(amount: f64) -> Self {
        Self {
            amount,
            per: Duration::from_secs(1),
        }
    }

    pub fn per_minute(amount: f64) -> Self {
        Self {
            amount,
            per: Duration::from_secs(60),
        }
    }

    pub fn per_hour(amount: f64) -> Self {
        Self {
            amount,
            per: Duration::from_secs(3600),
        }
    }

    /// Minimum spacing between two admissions of the same task type.
    ///
    /// Saturates at `Duration::MAX` for amounts too small to represent.
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.per.as_secs_f64() / self.amount).unwrap_or(Duration::MAX)
    }

    /// Builds a limit, rejecting amounts whose admission interval has no `Duration`.
    fn checked(amount: f64, per: Duration, spec: &str) -> Result<Self, RateLimitError> {
        Duration::try_from_secs_f64(per.as_secs_f64() / amount)
            .map(|_| Self { amount, per })
            .map_err(|_| RateLimitError::InvalidAmount(spec.to_string()))
    }

    /// Parses a textual rate specification.
    ///
    /// A bare number is per second. Empty and zero rates mean "no limit" and
    /// yield `Ok(None)`.
    pub fn parse(spec: &str) -> Result<Option<Self>, RateLimitError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Ok(None);
        }

        let (amount, unit) = match spec.split_once('/') {
            Some((amount, unit)) => (amount.trim(), unit.trim()),
            None => (spec, "s"),
        };

        let amount: f64 = amount
            .parse()
            .map_err(|_| RateLimitError::InvalidAmount(spec.to_string()))?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(RateLimitError::InvalidAmount(spec.to_string()));
        }
        if amount == 0.0 {
            return Ok(None);
        }

        let per = match unit {
            "s" => Duration::from_secs(1),
            "m" => Duration::from_secs(60),
            "h" => Duration::from_secs(3600),
            other => {
                return Err(RateLimitError::UnknownUnit {
                    spec: spec.to_string(),
                    unit: other.to_string(),
                })
            }
        };
        Self::checked(amount, per, spec).map(Some)
    }

    /// Interprets a rate limit received as a JSON control argument.
    ///
    /// `null`, `false`, `0` and `""` all disable limiting.
    pub fn from_value(value: &Value) -> Result<Option<Self>, RateLimitError> {
        match value {
            Value::Null | Value::Bool(false) => Ok(None),
            Value::Number(n) => match n.as_f64() {
                Some(amount) if amount == 0.0 => Ok(None),
                Some(amount) if amount.is_finite() && amount > 0.0 => {
                    Self::checked(amount, Duration::from_secs(1), &n.to_string()).map(Some)
                }
                _ => Err(RateLimitError::InvalidAmount(n.to_string())),
            },
            Value::String(spec) => Self::parse(spec),
            other => Err(RateLimitError::Unsupported(other.to_string())),
        }
    }
}

impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.per.as_secs() {
            60 => "m",
            3600 => "h",
            _ => "s",
        };
        write!(f, "{}/{}", self.amount, unit)
    }
}

/// Runtime description of a registered task type.
///
/// Only `rate_limit` changes after registration (through the `rate_limit`
/// control command).
#[derive(Debug, Clone, PartialEq)]
pub struct TaskTypeDescriptor {
    /// Unique task type name, e.g. `"reports.generate"`.
    pub name: String,
    /// `None` means executions are admitted without throttling.
    pub rate_limit: Option<RateLimit>,
    /// How many times a failed invocation is re-scheduled.
    pub max_retries: u32,
    /// Delay before a failed invocation becomes due again.
    pub retry_delay: Duration,
}

impl TaskTypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rate_limit: None,
            max_retries: 3,
            retry_delay: Duration::from_secs(180),
        }
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }
}
