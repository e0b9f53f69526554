//! Счётчик ручных повторов загрузки.

/// Сколько раз пользователь может нажать «повторить» на одной странице.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Ограниченный счётчик повторов. Повтор всегда запускает пользователь,
/// автоматических повторов и задержек нет.
pub struct RetryCounter {
    attempts: u32,
    max: u32,
}

impl Default for RetryCounter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

impl RetryCounter {
    /// Счётчик с пределом `max` повторов.
    pub fn new(max: u32) -> Self {
        Self { attempts: 0, max }
    }

    /// Сколько повторов уже сделано.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Можно ли показать кнопку «повторить».
    pub fn can_retry(&self) -> bool {
        self.attempts < self.max
    }

    /// Учитывает повтор. Возвращает `false`, если предел уже исчерпан.
    pub fn record_attempt(&mut self) -> bool {
        if !self.can_retry() {
            return false;
        }
        self.attempts += 1;
        true
    }

    /// Сбрасывает счётчик после успешной загрузки.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_is_capped() {
        let mut counter = RetryCounter::new(2);
        assert!(counter.record_attempt());
        assert!(counter.record_attempt());
        assert!(!counter.can_retry());
        assert!(!counter.record_attempt());
        assert_eq!(counter.attempts(), 2);
    }

    #[test]
    fn reset_allows_retries_again() {
        let mut counter = RetryCounter::default();
        while counter.record_attempt() {}
        assert_eq!(counter.attempts(), DEFAULT_MAX_RETRIES);
        counter.reset();
        assert!(counter.can_retry());
    }
}
