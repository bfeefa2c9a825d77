/// 讲义生成 API 客户端
///
/// 封装生成接口的调用与响应校验
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::infrastructure::ApiTransport;
use crate::models::{LectureDocument, Topic};
use crate::services::{GenerateLectureRequest, GenerationService};

/// 讲义生成客户端
pub struct HttpGenerationService {
    transport: ApiTransport,
    path: String,
}

impl HttpGenerationService {
    /// 创建新的生成客户端
    pub fn new(transport: ApiTransport, config: &Config) -> Self {
        Self::with_path(transport, config.generate_path.clone())
    }

    pub fn with_path(transport: ApiTransport, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
        }
    }

    async fn request(&self, topic: &Topic) -> Result<LectureDocument, ApiError> {
        let payload = GenerateLectureRequest {
            topic: topic.as_str().to_string(),
        };

        let response = self.transport.post_json(&self.path, &payload).await?;

        if !response.is_success() {
            warn!("生成接口返回非成功状态: {}", response.status);
            return Err(ApiError::BadStatus {
                endpoint: self.path.clone(),
                status: response.status,
            });
        }

        let body = response
            .body
            .ok_or_else(|| ApiError::invalid_payload(&self.path, "响应不是 JSON"))?;

        decode_lecture(&self.path, body)
    }
}

impl GenerationService for HttpGenerationService {
    fn generate<'a>(&'a self, topic: &'a Topic) -> BoxFuture<'a, Result<LectureDocument, ApiError>> {
        self.request(topic).boxed()
    }
}

/// 解析生成接口的响应体
///
/// 同时接受裸讲义对象和 `{ "status": "success", "data": {...} }` 包装。
/// `title` 必须是非空字符串，`slides` 必须存在且不为 null。
pub fn decode_lecture(endpoint: &str, body: Value) -> Result<LectureDocument, ApiError> {
    let lecture = unwrap_envelope(body);

    let has_title = lecture
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.is_empty());
    if !has_title {
        return Err(ApiError::invalid_payload(endpoint, "缺少 title"));
    }

    let has_slides = lecture.get("slides").is_some_and(|s| !s.is_null());
    if !has_slides {
        return Err(ApiError::invalid_payload(endpoint, "缺少 slides"));
    }

    let document: LectureDocument = serde_json::from_value(lecture)
        .map_err(|e| ApiError::invalid_payload(endpoint, e.to_string()))?;

    debug!(
        "讲义解析完成: {} ({} 个研究任务)",
        document.title,
        document.research_tasks.len()
    );

    Ok(document)
}

fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map)
            if map.get("status").and_then(Value::as_str) == Some("success")
                && map.get("data").is_some_and(Value::is_object) =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_bare_lecture() {
        let doc = decode_lecture(
            "/g",
            json!({
                "title": "Photosynthesis",
                "slides": [{ "title": "Intro" }],
                "research_tasks": [{ "title": "Light reactions", "subtasks": ["find sources", "summarize"] }]
            }),
        )
        .unwrap();
        assert_eq!(doc.title, "Photosynthesis");
        assert_eq!(doc.research_tasks[0].subtasks.len(), 2);
    }

    #[test]
    fn test_decode_enveloped_lecture() {
        let doc = decode_lecture(
            "/g",
            json!({ "status": "success", "data": { "title": "T", "slides": {} } }),
        )
        .unwrap();
        assert_eq!(doc.title, "T");
        assert!(doc.research_tasks.is_empty());
    }

    #[test]
    fn test_decode_rejects_missing_or_empty_title() {
        for body in [
            json!({ "slides": [] }),
            json!({ "title": "", "slides": [] }),
            json!({ "title": 42, "slides": [] }),
        ] {
            assert!(matches!(
                decode_lecture("/g", body),
                Err(ApiError::InvalidPayload { .. })
            ));
        }
    }

    #[test]
    fn test_decode_rejects_missing_or_null_slides() {
        for body in [json!({ "title": "T" }), json!({ "title": "T", "slides": null })] {
            assert!(matches!(
                decode_lecture("/g", body),
                Err(ApiError::InvalidPayload { .. })
            ));
        }
    }

    #[test]
    fn test_decode_rejects_malformed_tasks() {
        let body = json!({ "title": "T", "slides": [], "research_tasks": [{ "subtasks": [] }] });
        assert!(decode_lecture("/g", body).is_err());
    }
}
