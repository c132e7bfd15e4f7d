//! 模型回答解析
//!
//! 将模型的自由文本回答拆分为说明和代码两部分。只取第一个代码块，
//! 首个闭合围栏之后的内容全部丢弃；缺少闭合围栏时取剩余全部文本。

use crate::models::SuggestResponse;

/// 代码块围栏
const FENCE: &str = "```";

/// 拆分说明与代码
///
/// 拆分有损：多行且没有语言标记的代码会丢失第一行。
pub fn split_suggestion(raw: &str) -> SuggestResponse {
    let Some((before, after)) = raw.split_once(FENCE) else {
        return SuggestResponse {
            suggestion: String::new(),
            explanation: raw.trim().to_string(),
        };
    };

    let code = after.split_once(FENCE).map_or(after, |(code, _)| code);

    // 去掉紧跟在开启围栏后的语言标记行
    let code = code.split_once('\n').map_or(code, |(_, rest)| rest);

    SuggestResponse {
        suggestion: code.trim().to_string(),
        explanation: before.trim().to_string(),
    }
}
