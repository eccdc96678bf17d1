//! Website analysis: fetch a page and ask the model for its topic, audience and sentiment.

pub mod handlers;

use bytes::Bytes;
use futures::{pin_mut, Stream, StreamExt};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::errors::AppError;
use crate::llm_client::{CompletionProvider, CompletionRequest};

const ANALYSIS_MODEL: &str = "gpt-4o-mini";
const ANALYSIS_MAX_TOKENS: u32 = 500;

/// Accepts absolute http(s) URLs only.
pub fn parse_website_url(raw: &str) -> Result<Url, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::Validation("URL is required".to_string()));
    }
    let url = Url::parse(raw).map_err(|e| AppError::Validation(format!("Invalid URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(AppError::Validation(format!(
            "Unsupported URL scheme '{scheme}'; use http or https"
        ))),
    }
}

/// Keeps at most `max_bytes` of `html`, cut back to a char boundary.
pub fn truncate_html(html: &str, max_bytes: usize) -> &str {
    if html.len() <= max_bytes {
        return html;
    }
    let mut end = max_bytes;
    while !html.is_char_boundary(end) {
        end -= 1;
    }
    &html[..end]
}

/// Reads body chunks until `max_bytes` have been collected. Chunks past the cap
/// are never polled.
pub async fn read_capped<S, E>(chunks: S, max_bytes: usize) -> Result<Vec<u8>, E>
where
    S: Stream<Item = Result<Bytes, E>>,
{
    pin_mut!(chunks);
    let mut buf = Vec::new();
    while buf.len() < max_bytes {
        let Some(chunk) = chunks.next().await else {
            break;
        };
        let chunk = chunk?;
        let room = max_bytes - buf.len();
        buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }
    Ok(buf)
}

/// Decodes a possibly cut-off body. An incomplete trailing character is
/// dropped; other invalid sequences become U+FFFD.
fn decode_capped(bytes: &[u8]) -> String {
    let end = match std::str::from_utf8(bytes) {
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        _ => bytes.len(),
    };
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

pub fn build_analysis_prompt(html: &str) -> String {
    format!(
        r#"Analyze the following HTML content and extract key information, including the main topic, target audience, and overall sentiment. Provide a concise summary of the website's purpose and effectiveness.

HTML Content:
{html}

Analysis:"#
    )
}

pub async fn fetch_html(http: &Client, url: &Url, max_bytes: usize) -> Result<String, AppError> {
    let response = http
        .get(url.clone())
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("Could not fetch {url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Upstream(format!(
            "Fetching {url} returned status {status}"
        )));
    }

    let bytes = read_capped(response.bytes_stream(), max_bytes)
        .await
        .map_err(|e| AppError::Upstream(format!("Could not read {url}: {e}")))?;
    debug!("Fetched {} bytes from {url}", bytes.len());

    let html = decode_capped(&bytes);
    Ok(truncate_html(&html, max_bytes).to_string())
}

/// Runs the analysis prompt over already-fetched HTML.
pub async fn analyze_html(llm: &dyn CompletionProvider, html: &str) -> Result<String, AppError> {
    let request = CompletionRequest::new(ANALYSIS_MODEL, build_analysis_prompt(html), ANALYSIS_MAX_TOKENS);
    let analysis = llm.complete(&request).await?;
    info!("Website analysis produced {} chars", analysis.len());
    Ok(analysis.trim().to_string())
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::stream;

    use super::*;
    use crate::llm_client::testing::ScriptedProvider;

    #[test]
    fn test_parse_website_url() {
        assert!(parse_website_url("https://acme.example/about").is_ok());
        assert!(matches!(parse_website_url("  "), Err(AppError::Validation(_))));
        assert!(matches!(
            parse_website_url("ftp://acme.example"),
            Err(AppError::Validation(m)) if m.contains("ftp")
        ));
        assert!(matches!(parse_website_url("acme.example"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_html("<p>hi</p>", 100), "<p>hi</p>");
        assert_eq!(truncate_html("abcdef", 3), "abc");
        // 'é' is two bytes; cutting inside it backs off to the previous boundary.
        assert_eq!(truncate_html("aé", 2), "a");
    }

    #[tokio::test]
    async fn test_read_capped_stops_at_byte_cap() {
        let polled = AtomicUsize::new(0);
        let chunks = stream::iter(["<html>", "<body>", "tail", "never read"])
            .inspect(|_| {
                polled.fetch_add(1, Ordering::SeqCst);
            })
            .map(|chunk| Ok::<_, Infallible>(Bytes::from(chunk)));

        let bytes = read_capped(chunks, 14).await.unwrap();

        assert_eq!(bytes, b"<html><body>ta");
        assert_eq!(polled.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_read_capped_passes_short_bodies_through() {
        let chunks = stream::iter(vec![Ok::<_, Infallible>(Bytes::from_static(b"<p>hi</p>"))]);
        assert_eq!(read_capped(chunks, 100).await.unwrap(), b"<p>hi</p>");
    }

    #[test]
    fn test_decode_drops_cut_character() {
        // "aé" cut after the first byte of 'é'.
        assert_eq!(decode_capped(&[b'a', 0xC3]), "a");
        assert_eq!(decode_capped(&[b'a', 0xFF, b'b']), "a\u{FFFD}b");
    }

    #[tokio::test]
    async fn test_analyze_html_uses_small_model() {
        let llm = ScriptedProvider::replying("  A widget shop for hobbyists.  ");

        let analysis = analyze_html(&llm, "<h1>Acme widgets</h1>").await.unwrap();

        assert_eq!(analysis, "A widget shop for hobbyists.");
        let request = &llm.requests()[0];
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.max_tokens, 500);
        assert!(request.prompt.contains("<h1>Acme widgets</h1>"));
        assert!(request.prompt.ends_with("Analysis:"));
    }
}
