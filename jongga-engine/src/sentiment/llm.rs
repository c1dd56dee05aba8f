//! Remote classifier over a `generateContent` style API.
//!
//! The model is asked for `{"score": 0-3, "reason": "..."}`. Whatever comes
//! back is coerced into a [`SentimentVerdict`]:
//!
//! - valid JSON: score clamped to `0..=3`, empty reason defaulted;
//! - broken JSON: first digit within 20 characters after `"score"`;
//! - nothing usable: score 0, "analysis failed".
//!
//! Transport and HTTP failures surface as [`ClassifierError`] so the caller
//! can fall back to the keyword heuristic.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use jongga_common::SentimentConfig;

use super::{ClassifierError, SentimentClassifier, SentimentVerdict, DEFAULT_REASON};
use crate::data::NewsItem;

const SALVAGE_WINDOW: usize = 20;

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseCandidate {
    #[serde(default)]
    content: Content,
}

impl GenerateResponse {
    fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

// ============================================================================
// Gemini Classifier
// ============================================================================

/// Sentiment classifier backed by a Gemini-compatible endpoint.
pub struct GeminiClassifier {
    config: SentimentConfig,
    client: reqwest::Client,
}

impl GeminiClassifier {
    pub fn new(config: SentimentConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { config, client }
    }

    /// True when an API key is available.
    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Prompt listing the first `prompt_headlines` titles.
    pub fn build_prompt(&self, stock_name: &str, news: &[NewsItem]) -> String {
        let headlines: Vec<String> = news
            .iter()
            .take(self.config.prompt_headlines.max(1))
            .enumerate()
            .map(|(i, n)| format!("{}. {}", i + 1, n.title))
            .collect();

        format!(
            r#"다음은 '{name}' 종목의 최근 뉴스 제목입니다.

{headlines}

이 뉴스가 다음 거래일 주가 상승 재료가 되는 정도를 0~3점으로 평가하세요.
- 3점: 실적 서프라이즈, 대형 수주, 신약 승인 같은 강한 호재
- 2점: 의미 있는 호재
- 1점: 약한 호재 또는 단순 언급
- 0점: 재료 없음 또는 악재

다음 JSON 형식으로만 답하세요:
{{"score": 0, "reason": "한 문장 근거"}}"#,
            name = stock_name,
            headlines = headlines.join("\n"),
        )
    }

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, ClassifierError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: "application/json",
            },
        };

        let url = self.url();
        debug!(url = %url, model = %self.config.model, "Sending classification request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status { status, body });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed.text().ok_or(ClassifierError::EmptyResponse)
    }
}

#[async_trait]
impl SentimentClassifier for GeminiClassifier {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn classify(
        &self,
        stock_name: &str,
        news: &[NewsItem],
    ) -> Result<SentimentVerdict, ClassifierError> {
        let api_key = self
            .api_key()
            .ok_or_else(|| ClassifierError::NotConfigured("no API key".into()))?;

        if news.is_empty() {
            return Ok(SentimentVerdict::new(0, "no news"));
        }

        let prompt = self.build_prompt(stock_name, news);
        let text = self.generate(api_key, &prompt).await?;
        let verdict = parse_verdict(&text);

        debug!(
            stock = %stock_name,
            score = verdict.score,
            reason = %verdict.reason,
            "Classified headlines"
        );
        Ok(verdict)
    }
}

// ============================================================================
// Response Parsing
// ============================================================================

/// Coerce model output into a verdict. Never fails.
pub fn parse_verdict(text: &str) -> SentimentVerdict {
    if let Some(json) = extract_json(text) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(json) {
            let score = value.get("score").and_then(score_from_value).unwrap_or(0);
            let reason = value
                .get("reason")
                .and_then(|v| v.as_str())
                .unwrap_or(DEFAULT_REASON);
            return SentimentVerdict::new(score, reason);
        }
    }

    match salvage_score(text) {
        Some(score) => SentimentVerdict::new(score, DEFAULT_REASON),
        None => SentimentVerdict::new(0, "analysis failed"),
    }
}

/// Slice from the first `{` to the last `}`.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn score_from_value(value: &serde_json::Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

/// First digit within `SALVAGE_WINDOW` characters starting at a `"score"`
/// key in otherwise unparseable text. The window includes the key itself.
fn salvage_score(text: &str) -> Option<i64> {
    let start = text.find("\"score\"")?;
    text[start..]
        .chars()
        .take(SALVAGE_WINDOW)
        .find_map(|c| c.to_digit(10))
        .map(i64::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(endpoint: &str, api_key: Option<&str>) -> SentimentConfig {
        SentimentConfig {
            endpoint: endpoint.to_string(),
            model: "test-model".to_string(),
            api_key: api_key.map(str::to_string),
            timeout_secs: 5,
            prompt_headlines: 2,
        }
    }

    fn model_reply(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": {"parts": [{"text": text}]}
            }]
        })
    }

    fn news() -> Vec<NewsItem> {
        vec![
            NewsItem::new("대형 공급계약 체결", "finance"),
            NewsItem::new("영업이익 사상최대", "finance"),
            NewsItem::new("세 번째 기사", "search"),
        ]
    }

    #[test]
    fn test_parse_plain_json() {
        let v = parse_verdict(r#"{"score": 2, "reason": "수주 공시"}"#);
        assert_eq!(v.score, 2);
        assert_eq!(v.reason, "수주 공시");
    }

    #[test]
    fn test_parse_fenced_json() {
        let v = parse_verdict("```json\n{\"score\": 3, \"reason\": \"강한 호재\"}\n```");
        assert_eq!(v.score, 3);
    }

    #[test]
    fn test_parse_clamps_and_defaults() {
        let v = parse_verdict(r#"{"score": 9}"#);
        assert_eq!(v.score, 3);
        assert_eq!(v.reason, DEFAULT_REASON);

        assert_eq!(parse_verdict(r#"{"score": -1, "reason": "x"}"#).score, 0);
        assert_eq!(parse_verdict(r#"{"score": "2", "reason": "x"}"#).score, 2);
        assert_eq!(parse_verdict(r#"{"reason": "점수 없음"}"#).score, 0);
    }

    #[test]
    fn test_parse_salvages_broken_json() {
        let v = parse_verdict(r#"{"score": 2, "reason": "따옴표가 닫히지 않음}"#);
        assert_eq!(v.score, 2);
        assert_eq!(v.reason, DEFAULT_REASON);

        let v = parse_verdict(r#"결과 "score" :   1 이유 생략"#);
        assert_eq!(v.score, 1);
    }

    #[test]
    fn test_salvage_window_counts_from_key() {
        // key (7) + ':' + 11 spaces puts the digit at index 19
        let near = format!("\"score\":{}2", " ".repeat(11));
        assert_eq!(parse_verdict(&near).score, 2);

        // one more space pushes it to index 20, outside the window
        let far = format!("\"score\":{}2", " ".repeat(12));
        let v = parse_verdict(&far);
        assert_eq!(v.score, 0);
        assert_eq!(v.reason, "analysis failed");
    }

    #[test]
    fn test_parse_gives_up() {
        let v = parse_verdict("I cannot help with that.");
        assert_eq!(v.score, 0);
        assert_eq!(v.reason, "analysis failed");

        // digit too far from the key
        let v = parse_verdict(r#""score" is somewhere far away from here... 3"#);
        assert_eq!(v.score, 0);
    }

    #[test]
    fn test_prompt_limits_headlines() {
        let classifier = GeminiClassifier::new(config("http://localhost", Some("k")));
        let prompt = classifier.build_prompt("테스트전자", &news());
        assert!(prompt.contains("테스트전자"));
        assert!(prompt.contains("1. 대형 공급계약 체결"));
        assert!(prompt.contains("2. 영업이익 사상최대"));
        assert!(!prompt.contains("세 번째 기사"));
        assert!(prompt.contains(r#"{"score": 0, "reason""#));
    }

    #[tokio::test]
    async fn test_classify_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test-model:generateContent"))
            .and(header("x-goog-api-key", "secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(model_reply(r#"{"score": 3, "reason": "대형 수주"}"#)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let classifier = GeminiClassifier::new(config(&server.uri(), Some("secret")));
        let verdict = classifier.classify("테스트전자", &news()).await.unwrap();
        assert_eq!(verdict.score, 3);
        assert_eq!(verdict.reason, "대형 수주");
    }

    #[tokio::test]
    async fn test_classify_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let classifier = GeminiClassifier::new(config(&server.uri(), Some("secret")));
        let err = classifier.classify("테스트전자", &news()).await.unwrap_err();
        assert!(matches!(err, ClassifierError::Status { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_classify_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let classifier = GeminiClassifier::new(config(&server.uri(), Some("secret")));
        let err = classifier.classify("테스트전자", &news()).await.unwrap_err();
        assert!(matches!(err, ClassifierError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_classify_without_key() {
        let classifier = GeminiClassifier::new(config("http://localhost:9", None));
        assert!(!classifier.is_configured());
        let err = classifier.classify("테스트전자", &news()).await.unwrap_err();
        assert!(matches!(err, ClassifierError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_classify_no_news_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let classifier = GeminiClassifier::new(config(&server.uri(), Some("secret")));
        let verdict = classifier.classify("테스트전자", &[]).await.unwrap();
        assert_eq!(verdict.score, 0);
        assert_eq!(verdict.reason, "no news");
    }
}
