use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;

/// 默认请求间隔 10ms
pub const DEFAULT_DELAY: Duration = Duration::from_millis(10);

/// 每个worker处理完一个候选后的停顿策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// 固定间隔
    Fixed(Duration),
    /// `[min, max]` 内均匀随机
    Jitter { min: Duration, max: Duration },
}

impl Pacing {
    /// 随机区间，`min > max` 时自动交换
    pub fn jitter(min: Duration, max: Duration) -> Self {
        if min <= max {
            Pacing::Jitter { min, max }
        } else {
            Pacing::Jitter { min: max, max: min }
        }
    }

    /// 下一次停顿时长
    pub fn next_delay(&self) -> Duration {
        match *self {
            Pacing::Fixed(delay) => delay,
            Pacing::Jitter { min, max } => {
                let low = min.as_micros() as u64;
                let high = max.as_micros() as u64;
                if low >= high {
                    return min;
                }
                Duration::from_micros(rand::thread_rng().gen_range(low..=high))
            }
        }
    }

    pub async fn pause(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::Fixed(DEFAULT_DELAY)
    }
}
