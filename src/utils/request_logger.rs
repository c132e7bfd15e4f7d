//! 模型调用日志记录器
//!
//! 将每次模型调用记录到 JSONL 文件，便于调试 prompt 与模型输出。

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;
use uuid::Uuid;

use crate::llm::LlmError;

const LOG_FILE_NAME: &str = "model_requests.jsonl";
const DEFAULT_MAX_ENTRIES: usize = 1000;

/// 日志条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub provider: String,
    pub base_url: String,
    /// API 密钥（脱敏）
    pub api_key_masked: String,
    pub model: String,
    pub prompt_length: usize,
    pub prompt_preview: String,
    /// pending / success / error
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// 模型调用日志记录器
pub struct RequestLogger {
    sink: Arc<LogSink>,
}

/// 实际持有文件的部分，写入在阻塞线程池中执行
struct LogSink {
    log_path: PathBuf,
    max_entries: usize,
    state: Mutex<LogFile>,
}

#[derive(Default)]
struct LogFile {
    file: Option<File>,
    /// 当前行数，首次写入时从文件统计
    lines: Option<usize>,
}

impl RequestLogger {
    /// 在指定目录下创建日志记录器
    pub fn new(log_dir: impl AsRef<Path>) -> io::Result<Self> {
        Self::with_max_entries(log_dir, DEFAULT_MAX_ENTRIES)
    }

    fn with_max_entries(log_dir: impl AsRef<Path>, max_entries: usize) -> io::Result<Self> {
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        Ok(Self {
            sink: Arc::new(LogSink {
                log_path: log_dir.join(LOG_FILE_NAME),
                max_entries,
                state: Mutex::new(LogFile::default()),
            }),
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.sink.log_path
    }

    /// 生成 8 位请求 ID
    pub fn generate_request_id() -> String {
        Uuid::new_v4().simple().to_string()[..8].to_string()
    }

    /// API 密钥脱敏
    pub fn mask_api_key(api_key: &str) -> String {
        let chars: Vec<char> = api_key.chars().collect();
        if chars.len() <= 8 {
            "*".repeat(chars.len())
        } else {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{}...{}", head, tail)
        }
    }

    fn truncate(s: &str, max_chars: usize) -> String {
        if s.chars().count() <= max_chars {
            s.to_string()
        } else {
            let head: String = s.chars().take(max_chars).collect();
            format!("{}...", head)
        }
    }

    /// 构建请求开始时的条目（尚未写入）
    pub fn log_request(
        &self,
        request_id: &str,
        provider: &str,
        base_url: &str,
        model: &str,
        prompt: &str,
        api_key: &str,
    ) -> LogEntry {
        LogEntry {
            request_id: request_id.to_string(),
            timestamp: Utc::now(),
            provider: provider.to_string(),
            base_url: base_url.to_string(),
            api_key_masked: Self::mask_api_key(api_key),
            model: model.to_string(),
            prompt_length: prompt.len(),
            prompt_preview: Self::truncate(prompt, 200),
            status: "pending".to_string(),
            duration_ms: None,
            response_length: None,
            response_preview: None,
            error_type: None,
            error_message: None,
            status_code: None,
        }
    }

    /// 记录成功
    pub async fn log_success(&self, mut entry: LogEntry, start_time: Instant, response: &str) {
        entry.status = "success".to_string();
        entry.duration_ms = Some(start_time.elapsed().as_millis() as u64);
        entry.response_length = Some(response.len());
        entry.response_preview = Some(Self::truncate(response, 300));
        self.persist(entry).await;
    }

    /// 记录错误
    pub async fn log_error(&self, mut entry: LogEntry, start_time: Instant, error: &LlmError) {
        entry.status = "error".to_string();
        entry.duration_ms = Some(start_time.elapsed().as_millis() as u64);
        entry.error_type = Some(error.kind().to_string());
        entry.error_message = Some(Self::truncate(&error.to_string(), 500));
        entry.status_code = error.status_code();
        self.persist(entry).await;
    }

    async fn persist(&self, entry: LogEntry) {
        let sink = Arc::clone(&self.sink);
        if let Err(e) = tokio::task::spawn_blocking(move || sink.write_entry(&entry)).await {
            warn!("Request log writer task failed: {}", e);
        }
    }
}

impl LogSink {
    fn write_entry(&self, entry: &LogEntry) {
        let json = match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize request log entry: {}", e);
                return;
            }
        };

        let mut state = self.state.lock();

        // 懒加载文件
        if state.file.is_none() {
            match OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_path)
            {
                Ok(f) => state.file = Some(f),
                Err(e) => {
                    warn!("Failed to open request log {}: {}", self.log_path.display(), e);
                    return;
                }
            }
        }
        if state.lines.is_none() {
            state.lines = Some(self.count_lines());
        }

        let Some(file) = state.file.as_mut() else {
            return;
        };
        if let Err(e) = writeln!(file, "{}", json).and_then(|_| file.flush()) {
            warn!("Failed to write request log: {}", e);
            return;
        }
        let lines = state.lines.unwrap_or(0) + 1;
        state.lines = Some(lines);

        // 超出上限一成后才裁剪，避免每次写入都重写文件
        if lines > self.max_entries + self.max_entries / 10 {
            self.trim(&mut state);
        }
    }

    fn count_lines(&self) -> usize {
        fs::read(&self.log_path)
            .map(|bytes| bytes.iter().filter(|&&b| b == b'\n').count())
            .unwrap_or(0)
    }

    /// 只保留最近 max_entries 条，跳过无法解码的行
    fn trim(&self, state: &mut LogFile) {
        let Ok(file) = File::open(&self.log_path) else {
            return;
        };
        let lines: Vec<String> = BufReader::new(file).lines().filter_map(Result::ok).collect();
        let keep_lines = &lines[lines.len().saturating_sub(self.max_entries)..];

        match File::create(&self.log_path) {
            Ok(mut file) => {
                for line in keep_lines {
                    let _ = writeln!(file, "{}", line);
                }
                state.lines = Some(keep_lines.len());
            }
            Err(e) => {
                warn!("Failed to rewrite request log: {}", e);
                state.lines = None;
            }
        }
        // 文件被重建，下次写入时重新打开
        state.file = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_entries(logger: &RequestLogger) -> Vec<LogEntry> {
        let content = fs::read_to_string(logger.log_path()).unwrap();
        content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(RequestLogger::mask_api_key("short"), "*****");
        assert_eq!(RequestLogger::mask_api_key("AIzaSyA1234567890xyz"), "AIza...0xyz");
    }

    #[test]
    fn test_generate_request_id() {
        let id = RequestLogger::generate_request_id();
        assert_eq!(id.len(), 8);
    }

    #[tokio::test]
    async fn test_log_success_and_error() {
        let dir = tempfile::tempdir().unwrap();
        let logger = RequestLogger::new(dir.path()).unwrap();

        let entry = logger.log_request(
            "abcd1234",
            "gemini",
            "https://generativelanguage.googleapis.com",
            "gemini-1.5-flash",
            "Summarize this",
            "AIzaSyA1234567890xyz",
        );
        logger.log_success(entry, Instant::now(), "A short summary.").await;

        let entry = logger.log_request("efgh5678", "openai", "http://x", "gpt-4o", "p", "sk-0123456789");
        let err = LlmError::ApiError {
            status: 429,
            message: "rate limited".to_string(),
        };
        logger.log_error(entry, Instant::now(), &err).await;

        let entries = read_entries(&logger);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, "success");
        assert_eq!(entries[0].api_key_masked, "AIza...0xyz");
        assert_eq!(entries[0].response_preview.as_deref(), Some("A short summary."));
        assert_eq!(entries[1].status, "error");
        assert_eq!(entries[1].error_type.as_deref(), Some("api"));
        assert_eq!(entries[1].status_code, Some(429));
    }

    #[tokio::test]
    async fn test_cleanup_keeps_latest_entries() {
        let dir = tempfile::tempdir().unwrap();
        let logger = RequestLogger::with_max_entries(dir.path(), 3).unwrap();

        for i in 0..5 {
            let entry = logger.log_request(&format!("id{}", i), "gemini", "u", "m", "p", "k");
            logger.log_success(entry, Instant::now(), "ok").await;
        }

        let entries = read_entries(&logger);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].request_id, "id2");
        assert_eq!(entries[2].request_id, "id4");
    }

    #[tokio::test]
    async fn test_cleanup_trims_in_batches() {
        let dir = tempfile::tempdir().unwrap();
        let logger = RequestLogger::with_max_entries(dir.path(), 10).unwrap();

        for i in 0..11 {
            let entry = logger.log_request(&format!("id{}", i), "gemini", "u", "m", "p", "k");
            logger.log_success(entry, Instant::now(), "ok").await;
        }
        // 10 + 1 未超过阈值，不裁剪
        assert_eq!(read_entries(&logger).len(), 11);

        let entry = logger.log_request("id11", "gemini", "u", "m", "p", "k");
        logger.log_success(entry, Instant::now(), "ok").await;

        let entries = read_entries(&logger);
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].request_id, "id2");
        assert_eq!(entries[9].request_id, "id11");
    }

    #[tokio::test]
    async fn test_cleanup_skips_undecodable_lines() {
        let dir = tempfile::tempdir().unwrap();
        let logger = RequestLogger::with_max_entries(dir.path(), 3).unwrap();

        // 已有文件中间夹着一行非 UTF-8 内容
        let old = |id: &str| serde_json::to_string(&logger.log_request(id, "gemini", "u", "m", "p", "k")).unwrap();
        let mut existing = Vec::new();
        existing.extend_from_slice(format!("{}\n", old("old0")).as_bytes());
        existing.extend_from_slice(b"\xff\xfe not utf-8\n");
        existing.extend_from_slice(format!("{}\n", old("old1")).as_bytes());
        fs::write(logger.log_path(), existing).unwrap();

        for id in ["new0", "new1"] {
            let entry = logger.log_request(id, "gemini", "u", "m", "p", "k");
            logger.log_success(entry, Instant::now(), "ok").await;
        }

        let ids: Vec<String> = read_entries(&logger).into_iter().map(|e| e.request_id).collect();
        assert_eq!(ids, ["old1", "new0", "new1"]);
    }
}
