//! 单评卷人决策 - 业务能力层
//!
//! 文件中只有一位评卷人时无法互相复核，需要外部（操作员）给出决定。
//! 编排层发出一个请求并等待答复；请求通过通道送出，答复通过 oneshot 返回，
//! 因此同一套编排逻辑可以用预设的决定来测试。

use crate::models::Record;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

/// 操作员的决定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// 由评卷人本人复核
    Same,
    /// 指定另一位复核人
    Different(String),
    /// 取消处理该文件
    Cancel,
    /// 选择了指定复核人但在输入时退出，等同取消
    DifferentCancelled,
}

impl Decision {
    /// 空白的复核人按“输入时退出”处理
    pub fn normalized(self) -> Self {
        match self {
            Decision::Different(moderator) if moderator.trim().is_empty() => {
                Decision::DifferentCancelled
            }
            Decision::Different(moderator) => Decision::Different(moderator.trim().to_string()),
            other => other,
        }
    }

    /// 解析固定策略：`same`、`cancel`、`moderator:<ID>`
    pub fn parse_policy(text: &str) -> Option<Self> {
        let text = text.trim();
        match text.to_ascii_lowercase().as_str() {
            "same" => Some(Decision::Same),
            "cancel" => Some(Decision::Cancel),
            _ => text
                .strip_prefix("moderator:")
                .map(|moderator| Decision::Different(moderator.to_string()).normalized()),
        }
    }
}

/// 发给决策方的请求内容
#[derive(Debug, Clone)]
pub struct SingleEvaluatorPrompt {
    pub evaluator: String,
    pub booklets: Vec<Record>,
    pub file_name: String,
}

/// 决策来源
pub trait DecisionSource {
    fn decide(&self, prompt: SingleEvaluatorPrompt) -> impl Future<Output = Decision> + Send;
}

/// 通道中传递的请求：提示内容 + 答复端
#[derive(Debug)]
pub struct DecisionRequest {
    pub prompt: SingleEvaluatorPrompt,
    pub reply: oneshot::Sender<Decision>,
}

/// 基于通道的决策来源，另一端由界面（或控制台）负责应答
#[derive(Debug, Clone)]
pub struct ChannelDecisionSource {
    sender: mpsc::Sender<DecisionRequest>,
}

/// 创建决策通道
pub fn decision_channel(capacity: usize) -> (ChannelDecisionSource, mpsc::Receiver<DecisionRequest>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (ChannelDecisionSource { sender }, receiver)
}

impl DecisionSource for ChannelDecisionSource {
    fn decide(&self, prompt: SingleEvaluatorPrompt) -> impl Future<Output = Decision> + Send {
        let sender = self.sender.clone();
        async move {
            let file_name = prompt.file_name.clone();
            let (reply, answer) = oneshot::channel();
            if sender.send(DecisionRequest { prompt, reply }).await.is_err() {
                warn!("⚠️ [{}] 决策通道已关闭，按取消处理", file_name);
                return Decision::Cancel;
            }
            match answer.await {
                Ok(decision) => decision.normalized(),
                Err(_) => {
                    warn!("⚠️ [{}] 决策方未答复即退出，按取消处理", file_name);
                    Decision::Cancel
                }
            }
        }
    }
}

/// 对所有请求给出同一个决定（无人值守运行）
#[derive(Debug, Clone)]
pub struct FixedDecision(pub Decision);

impl DecisionSource for FixedDecision {
    fn decide(&self, _prompt: SingleEvaluatorPrompt) -> impl Future<Output = Decision> + Send {
        let decision = self.0.clone().normalized();
        async move { decision }
    }
}

/// 按顺序给出预设决定，用完后一律取消
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    queue: Mutex<VecDeque<Decision>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedDecisions {
    pub fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            queue: Mutex::new(decisions.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// 已收到请求的文件名（按顺序）
    pub fn asked_files(&self) -> Vec<String> {
        self.asked
            .lock()
            .map(|asked| asked.clone())
            .unwrap_or_default()
    }
}

impl DecisionSource for ScriptedDecisions {
    fn decide(&self, prompt: SingleEvaluatorPrompt) -> impl Future<Output = Decision> + Send {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(prompt.file_name.clone());
        }
        let decision = self
            .queue
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or(Decision::Cancel)
            .normalized();
        async move { decision }
    }
}
