//! 聊天会话服务层
//!
//! 用户消息先乐观地追加到会话，再发出请求；同一时刻最多一个在途请求。
//! 所有失败都转换为一条 `error=true` 的助手消息，用户消息永远不会被撤回。

use crate::rag::chat::api::ChatApi;
use crate::rag::chat::listener::{ChatListener, EmptyChatListener};
use crate::rag::chat::models::{ConversationTurn, SessionSnapshot, SourceCitation, SubmitOutcome};
use crate::rag::chat::presenter::{AvatarPresenter, NoopPresenter};
use crate::rag::chat::render::render_transcript;
use crate::rag::config::ClientConfig;
use crate::rag::error::ApiError;
use crate::rag::sequence::RequestSequencer;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

#[derive(Default)]
struct SessionState {
    thread_id: Option<String>,
    turns: Vec<ConversationTurn>,
    busy: bool,
}

/// 聊天会话
pub struct ConversationSession {
    config: ClientConfig,
    /// 聊天 API 客户端
    api: ChatApi,
    state: Mutex<SessionState>,
    /// 聊天提交序号
    sequencer: RequestSequencer,
    /// 聊天监听器
    listener: Arc<dyn ChatListener>,
    /// 头像播报（默认空实现）
    presenter: Arc<dyn AvatarPresenter>,
}

impl ConversationSession {
    /// 创建新的会话（使用默认空监听器）
    pub fn new(config: ClientConfig, http_client: reqwest::Client) -> Self {
        Self::with_listener(config, http_client, Arc::new(EmptyChatListener))
    }

    /// 创建新的会话（带自定义监听器）
    pub fn with_listener(
        config: ClientConfig,
        http_client: reqwest::Client,
        listener: Arc<dyn ChatListener>,
    ) -> Self {
        info!("[Chat] 创建聊天会话，API: {}", config.api_base_url);
        let api = ChatApi::new(http_client, config.api_base_url.clone());
        Self {
            config,
            api,
            state: Mutex::new(SessionState::default()),
            sequencer: RequestSequencer::new(),
            listener,
            presenter: Arc::new(NoopPresenter),
        }
    }

    /// 注册聊天监听器
    pub fn set_listener(&mut self, listener: Arc<dyn ChatListener>) {
        self.listener = listener;
    }

    /// 注册头像播报
    pub fn set_presenter(&mut self, presenter: Arc<dyn AvatarPresenter>) {
        self.presenter = presenter;
    }

    pub fn presenter(&self) -> Arc<dyn AvatarPresenter> {
        self.presenter.clone()
    }

    /// 提交一条用户消息
    ///
    /// 输入为空（去掉首尾空白后）或已有请求在途时直接忽略：不发请求、不改状态。
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let message = text.trim();
        if message.is_empty() {
            debug!("[Chat] 输入为空，忽略提交");
            return SubmitOutcome::Ignored;
        }

        let (seq, conversation_id, user_turn) = {
            let mut state = self.state.lock().await;
            if state.busy {
                info!("[Chat] 上一条消息仍在处理中，忽略本次提交");
                return SubmitOutcome::Ignored;
            }
            let turn = ConversationTurn::user(message);
            state.turns.push(turn.clone());
            state.busy = true;
            (self.sequencer.issue(), state.thread_id.clone(), turn)
        };

        info!(
            "[Chat] 📤 提交消息 #{}，会话ID: {:?}",
            seq,
            conversation_id.as_deref()
        );
        self.listener.on_turn_appended(user_turn).await;
        self.listener.on_busy_changed(true).await;

        let result = self
            .api
            .send_message(message, conversation_id.as_deref())
            .await;

        let mut new_thread: Option<String> = None;
        let outcome = {
            let mut state = self.state.lock().await;
            // busy 闸门保证同一时刻只有一个在途请求，这里正常不会命中；
            // 即使命中，也不能留下 busy，否则会话永远无法再提交
            if !self.sequencer.is_latest(seq) {
                warn!(
                    "[Chat] 回复 #{} 已过期（最新 #{}），丢弃",
                    seq,
                    self.sequencer.latest()
                );
                state.busy = false;
                drop(state);
                self.listener.on_busy_changed(false).await;
                return SubmitOutcome::Superseded;
            }
            state.busy = false;

            match result {
                Ok(resp) => {
                    let sources: Vec<SourceCitation> =
                        resp.sources.into_iter().map(SourceCitation::from).collect();
                    let turn = ConversationTurn::assistant(resp.response, sources);
                    state.turns.push(turn.clone());

                    // 会话 ID 只会被后端下发的新值覆盖，空值不清除已有 ID
                    if !resp.conversation_id.is_empty()
                        && state.thread_id.as_deref() != Some(resp.conversation_id.as_str())
                    {
                        state.thread_id = Some(resp.conversation_id.clone());
                        new_thread = Some(resp.conversation_id);
                    }
                    SubmitOutcome::Replied(turn)
                }
                Err(e) => {
                    error!("[Chat] ❌ 消息 #{} 失败: {}", seq, e);
                    let content = e.chat_message(
                        &self.config.api_base_url,
                        &self.config.backend_start_hint,
                    );
                    let turn = ConversationTurn::assistant_error(content);
                    state.turns.push(turn.clone());
                    SubmitOutcome::Failed(turn)
                }
            }
        };

        if let Some(thread_id) = new_thread {
            info!("[Chat] 🧵 会话ID更新为 {}", thread_id);
            self.listener.on_thread_changed(thread_id).await;
        }
        match &outcome {
            SubmitOutcome::Replied(turn) | SubmitOutcome::Failed(turn) => {
                self.listener.on_turn_appended(turn.clone()).await;
            }
            _ => {}
        }
        self.listener.on_busy_changed(false).await;

        if let SubmitOutcome::Replied(turn) = &outcome {
            self.present(turn.content.clone());
        }

        outcome
    }

    /// 头像播报放到独立任务中，不影响聊天流程
    fn present(&self, text: String) {
        if !self.presenter.is_enabled() {
            return;
        }
        let presenter = self.presenter.clone();
        tokio::spawn(async move {
            presenter.speak(&text).await;
        });
    }

    /// 从后端恢复历史会话
    ///
    /// 只允许在会话为空且没有在途请求时调用，返回恢复的消息数
    pub async fn resume(&self, conversation_id: &str) -> Result<usize, ApiError> {
        let conversation_id = conversation_id.trim();
        if conversation_id.is_empty() {
            return Err(ApiError::Validation("Conversation id is required".into()));
        }

        let seq = {
            let mut state = self.state.lock().await;
            if state.busy {
                return Err(ApiError::Validation(
                    "A message is still being processed".into(),
                ));
            }
            if !state.turns.is_empty() {
                return Err(ApiError::Validation(
                    "Cannot resume into a conversation that already has messages".into(),
                ));
            }
            state.busy = true;
            self.sequencer.issue()
        };
        self.listener.on_busy_changed(true).await;

        let result = self.api.get_conversation(conversation_id).await;

        let restored = {
            let mut state = self.state.lock().await;
            // 同上，busy 闸门下正常不会命中
            if !self.sequencer.is_latest(seq) {
                warn!("[Chat] 会话恢复 #{} 已过期，丢弃", seq);
                state.busy = false;
                drop(state);
                self.listener.on_busy_changed(false).await;
                return Ok(0);
            }
            state.busy = false;
            match result {
                // 后端对未知 ID 返回空历史；采用该 ID 会让后续每条消息都失败
                Ok(history) if history.messages.is_empty() => Err(ApiError::NotFound {
                    detail: Some(format!("Conversation not found: {}", conversation_id)),
                }),
                Ok(history) => {
                    let turns: Vec<ConversationTurn> = history
                        .messages
                        .into_iter()
                        .map(ConversationTurn::from)
                        .collect();
                    let count = turns.len();
                    state.turns = turns.clone();
                    let thread_id = if history.conversation_id.is_empty() {
                        conversation_id.to_string()
                    } else {
                        history.conversation_id
                    };
                    state.thread_id = Some(thread_id.clone());
                    Ok((thread_id, turns, count))
                }
                Err(e) => Err(e),
            }
        };

        self.listener.on_busy_changed(false).await;
        match restored {
            Ok((thread_id, turns, count)) => {
                info!("[Chat] ✅ 恢复会话 {}，消息数: {}", thread_id, count);
                self.listener.on_thread_changed(thread_id).await;
                for turn in turns {
                    self.listener.on_turn_appended(turn).await;
                }
                Ok(count)
            }
            Err(e) => {
                error!("[Chat] ❌ 恢复会话失败: {}", e);
                Err(e)
            }
        }
    }

    /// 当前会话状态快照
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            thread_id: state.thread_id.clone(),
            turns: state.turns.clone(),
            busy: state.busy,
        }
    }

    pub async fn thread_id(&self) -> Option<String> {
        self.state.lock().await.thread_id.clone()
    }

    pub async fn is_busy(&self) -> bool {
        self.state.lock().await.busy
    }

    /// 会话为空时展示的建议问题
    pub fn suggested_questions(&self) -> &[String] {
        &self.config.suggested_questions
    }

    /// 渲染整个会话
    pub async fn render(&self) -> String {
        let snapshot = self.snapshot().await;
        render_transcript(
            &snapshot,
            self.config.excerpt_chars,
            &self.config.suggested_questions,
        )
    }
}
