//! 数字人头像播报接口
//!
//! 头像只是聊天回复的附加展示：它的缺失或失败不能阻塞、也不能改变聊天请求本身。
//! 默认实现 `NoopPresenter` 什么都不做；`DidPresenter` 目前只完成了 API Key
//! 检查，实时视频流尚未接入，因此始终保持禁用。

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 播报速度估算：约每秒 15 个字符
const CHARS_PER_SECOND: f64 = 15.0;

#[async_trait]
pub trait AvatarPresenter: Send + Sync {
    /// 当前是否可以播报
    fn is_enabled(&self) -> bool;

    /// 尝试启用头像，返回启用后的状态
    async fn initialize(&self) -> bool;

    /// 播报一段回复
    async fn speak(&self, text: &str);
}

/// 空实现（默认）
pub struct NoopPresenter;

#[async_trait]
impl AvatarPresenter for NoopPresenter {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn initialize(&self) -> bool {
        false
    }

    async fn speak(&self, _text: &str) {}
}

/// D-ID 头像（未完成的实时流集成）
pub struct DidPresenter {
    api_key: Option<String>,
    enabled: AtomicBool,
    speaking: AtomicBool,
}

impl DidPresenter {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            enabled: AtomicBool::new(false),
            speaking: AtomicBool::new(false),
        }
    }

    /// 是否配置了 API Key（界面据此决定 "Enable Avatar" 按钮是否可用）
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }
}

/// 估算播报一段文本所需的时长
pub fn estimated_speech_duration(text: &str) -> Duration {
    let chars = text.chars().count() as f64;
    Duration::from_millis((chars / CHARS_PER_SECOND * 1000.0) as u64)
}

#[async_trait]
impl AvatarPresenter for DidPresenter {
    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    async fn initialize(&self) -> bool {
        if self.api_key.is_none() {
            info!("[Avatar] 未配置 D-ID API Key，头像功能禁用");
            self.enabled.store(false, Ordering::SeqCst);
            return false;
        }

        // TODO: 接入 D-ID WebRTC 流（创建 stream、交换 SDP/ICE）后再把 enabled 置为 true
        warn!("[Avatar] ⚠️ D-ID 实时流尚未实现，头像保持禁用");
        self.enabled.store(false, Ordering::SeqCst);
        false
    }

    async fn speak(&self, text: &str) {
        if !self.is_enabled() {
            return;
        }
        let duration = estimated_speech_duration(text);
        debug!("[Avatar] 🎤 开始播报，预计 {:?}", duration);
        self.speaking.store(true, Ordering::SeqCst);
        tokio::time::sleep(duration).await;
        self.speaking.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speech_duration_estimate() {
        assert_eq!(estimated_speech_duration(""), Duration::ZERO);
        assert_eq!(
            estimated_speech_duration(&"a".repeat(30)),
            Duration::from_secs(2)
        );
    }

    #[tokio::test]
    async fn did_presenter_never_enables() {
        let without_key = DidPresenter::new(Some("   ".into()));
        assert!(!without_key.has_api_key());
        assert!(!without_key.initialize().await);

        let with_key = DidPresenter::new(Some("did-key".into()));
        assert!(with_key.has_api_key());
        assert!(!with_key.initialize().await);
        assert!(!with_key.is_enabled());

        // 未启用时 speak 立即返回
        with_key.speak("hello there").await;
        assert!(!with_key.is_speaking());
    }
}
