//! 请求序号
//!
//! 同一类操作（聊天提交、文档列表、健康检查）每次发起时领取一个单调递增的序号，
//! 响应回来时只有序号仍是最新的才允许修改状态，旧响应直接丢弃。

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 领取新序号（从 1 开始）
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// `seq` 是否仍是最近一次发出的序号
    pub fn is_latest(&self, seq: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == seq
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::RequestSequencer;

    #[test]
    fn only_the_newest_sequence_is_latest() {
        let seq = RequestSequencer::new();
        assert_eq!(seq.latest(), 0);

        let first = seq.issue();
        assert!(seq.is_latest(first));

        let second = seq.issue();
        assert!(second > first);
        assert!(!seq.is_latest(first));
        assert!(seq.is_latest(second));
    }
}
