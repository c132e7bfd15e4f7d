//! 测试用模型客户端

use async_trait::async_trait;
use parking_lot::Mutex;

use super::client::ModelClient;
use super::types::LlmError;

/// 按顺序返回预设回答并记录收到的 prompt，用完后重复最后一个
pub struct StubClient {
    replies: Vec<Result<String, String>>,
    prompts: Mutex<Vec<String>>,
}

impl StubClient {
    fn with_replies(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_replies(vec![Ok(text.into())])
    }

    /// 每次调用都以 ApiError 失败
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_replies(vec![Err(message.into())])
    }

    /// 第一次调用失败，之后正常回答
    pub fn failing_then_replying(message: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_replies(vec![Err(message.into()), Ok(text.into())])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl ModelClient for StubClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let call = {
            let mut prompts = self.prompts.lock();
            prompts.push(prompt.to_string());
            prompts.len() - 1
        };

        match self.replies.get(call).or(self.replies.last()) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(LlmError::ApiError {
                status: 503,
                message: message.clone(),
            }),
            None => Err(LlmError::EmptyResponse),
        }
    }
}
