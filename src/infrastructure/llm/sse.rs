//! Extracts assistant text from a chat-completions event stream

use serde::Deserialize;

/// Line-buffering decoder for `data: {...}` events
///
/// Network chunks can end anywhere, so incomplete lines are kept until the
/// rest arrives.
#[derive(Debug, Default)]
pub struct SseTextDecoder {
    pending: Vec<u8>,
}

impl SseTextDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return the content deltas of every completed line.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut deltas = Vec::new();
        while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            if let Some(delta) = parse_line(&String::from_utf8_lossy(&line)) {
                deltas.push(delta);
            }
        }
        deltas
    }

    /// Flush a final line that arrived without a trailing newline.
    pub fn finish(&mut self) -> Option<String> {
        let line = std::mem::take(&mut self.pending);
        parse_line(&String::from_utf8_lossy(&line))
    }
}

fn parse_line(line: &str) -> Option<String> {
    let data = line.trim_end().strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        return None;
    }

    let chunk: StreamChunk = serde_json::from_str(data).ok()?;
    chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty())
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({
                "id": "chatcmpl-1",
                "choices": [{ "index": 0, "delta": { "content": content } }]
            })
        )
    }

    #[test]
    fn test_extracts_content_deltas() {
        let mut decoder = SseTextDecoder::new();
        let input = format!("{}{}data: [DONE]\n\n", event("Hel"), event("lo"));

        assert_eq!(decoder.push(input.as_bytes()), vec!["Hel", "lo"]);
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut decoder = SseTextDecoder::new();
        let input = event("world");
        let (head, tail) = input.as_bytes().split_at(17);

        assert!(decoder.push(head).is_empty());
        assert_eq!(decoder.push(tail), vec!["world"]);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let mut decoder = SseTextDecoder::new();
        let input = event("héllo");
        let split = input.find('é').unwrap() + 1;
        let (head, tail) = input.as_bytes().split_at(split);

        assert!(decoder.push(head).is_empty());
        assert_eq!(decoder.push(tail), vec!["héllo"]);
    }

    #[test]
    fn test_ignores_comments_role_only_and_garbage() {
        let mut decoder = SseTextDecoder::new();
        let role_only = "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n";
        let input = format!(": keep-alive\n{}data: not json\n", role_only);

        assert!(decoder.push(input.as_bytes()).is_empty());
    }

    #[test]
    fn test_finish_flushes_unterminated_line() {
        let mut decoder = SseTextDecoder::new();
        let input = event("tail");
        let unterminated = input.trim_end();

        assert!(decoder.push(unterminated.as_bytes()).is_empty());
        assert_eq!(decoder.finish(), Some("tail".to_string()));
    }
}
