//! Prompt 构建服务
//!
//! 根据请求字段生成发送给模型的自然语言指令

use crate::models::Intent;

/// Prompt 服务
pub struct PromptService;

impl PromptService {
    /// 创建新的 Prompt 服务
    pub fn new() -> Self {
        Self
    }

    /// 构建摘要 prompt，原文逐字嵌入
    pub fn build_summarize_prompt(&self, text: &str) -> String {
        format!(
            "Summarize the following developer problem description in one to two sentences. \
             Respond with the summary only.\n\n\
             Problem description:\n{}",
            text
        )
    }

    /// 按意图构建建议 prompt
    ///
    /// explain 分支不包含 `text`
    pub fn build_suggest_prompt(&self, intent: Intent, text: &str, code_snippet: &str) -> String {
        match intent {
            Intent::Explain => self.build_explain_prompt(code_snippet),
            Intent::Suggest => self.build_improve_prompt(text, code_snippet),
        }
    }

    fn build_explain_prompt(&self, code_snippet: &str) -> String {
        format!(
            "Explain what the following code does. Be concise and use bullet points.\n\n\
             ```\n{}\n```",
            code_snippet
        )
    }

    fn build_improve_prompt(&self, text: &str, code_snippet: &str) -> String {
        format!(
            "A developer describes their problem as follows:\n{}\n\n\
             Their current code is:\n```\n{}\n```\n\n\
             Provide a corrected or improved version of the code together with a brief explanation \
             of the changes. Write the explanation first, then put the complete code in a single \
             fenced code block.",
            text, code_snippet
        )
    }
}

impl Default for PromptService {
    fn default() -> Self {
        Self::new()
    }
}
