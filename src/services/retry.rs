use std::time::Duration;

use super::config::RequestConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub attempt_timeout: Duration,
    pub delay: Duration,
}

impl RetryConfig {
    pub fn from_request_config(config: &RequestConfig) -> Self {
        Self {
            max_attempts: config.retry_count.max(1) as usize,
            attempt_timeout: Duration::from_millis(config.timeout_ms.max(1)),
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Pause before attempt `attempt + 1`. Fixed; `None` when retrying immediately.
    pub fn backoff(&self, _attempt: usize) -> Option<Duration> {
        if self.delay.is_zero() {
            None
        } else {
            Some(self.delay)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_request_config() {
        let config = RequestConfig::default().with_retry_count(4).with_timeout_ms(250);
        let retry = RetryConfig::from_request_config(&config);
        assert_eq!(retry.max_attempts, 4);
        assert_eq!(retry.attempt_timeout, Duration::from_millis(250));
        assert_eq!(retry.backoff(1), None);
    }

    #[test]
    fn test_fixed_backoff() {
        let config = RequestConfig {
            retry_delay_ms: 300,
            ..RequestConfig::default()
        };
        let retry = RetryConfig::from_request_config(&config);
        assert_eq!(retry.backoff(1), Some(Duration::from_millis(300)));
        assert_eq!(retry.backoff(5), Some(Duration::from_millis(300)));
    }
}
