use serde_json::Value;

use crate::error::{ScriptError, ScriptResult};

/// Reads JSON script text into the generic value tree.
pub(crate) fn read(input: &str) -> ScriptResult<Value> {
    serde_json::from_str(input).map_err(|err| syntax_error(input, &err))
}

#[cold]
#[inline(never)]
fn syntax_error(input: &str, err: &serde_json::Error) -> ScriptError {
    let offset = error_offset(input, err);
    let (window, local_offset) = error_window(input, offset);
    let span_len = usize::from(local_offset < window.len());
    ScriptError::Json {
        message: err.to_string(),
        src: window,
        span: (local_offset, span_len).into(),
    }
}

/// Byte offset of serde_json's 1-based line/column position. The column
/// counts bytes, so it is clamped back onto a char boundary.
fn error_offset(input: &str, error: &serde_json::Error) -> usize {
    let line = error.line();
    let column = error.column();
    if line == 0 || column == 0 {
        return 0;
    }
    let mut offset = 0usize;
    for (current_line, chunk) in input.split_inclusive('\n').enumerate() {
        if current_line + 1 == line {
            let mut byte_index = (column - 1).min(chunk.len().saturating_sub(1));
            while byte_index > 0 && !chunk.is_char_boundary(byte_index) {
                byte_index -= 1;
            }
            return offset + byte_index;
        }
        offset += chunk.len();
    }
    input.len().saturating_sub(1)
}

/// Slice of the input around `offset`, cut on char boundaries, so diagnostics
/// for large scripts stay small.
fn error_window(input: &str, offset: usize) -> (String, usize) {
    const CONTEXT: usize = 160;
    let mut start = offset.saturating_sub(CONTEXT);
    let mut end = (offset + 1 + CONTEXT).min(input.len());
    while start > 0 && !input.is_char_boundary(start) {
        start -= 1;
    }
    while end < input.len() && !input.is_char_boundary(end) {
        end += 1;
    }
    (input[start..end].to_string(), offset.saturating_sub(start))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_position_of_syntax_error() {
        let input = "{\n  \"id\": \"demo\",\n  \"entries\": [\n}";
        let err = read(input).expect_err("should fail");
        let rendered = err.to_string();
        assert!(rendered.starts_with("JSON解析错误: "), "{rendered}");
        match err {
            ScriptError::Json { src, span, .. } => {
                assert!(span.offset() <= src.len());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_span_lands_after_multibyte_text() {
        let input = "{\"text\": \"你好，世界\", oops}";
        match read(input).expect_err("unquoted key") {
            ScriptError::Json { src, span, .. } => {
                assert!(src.is_char_boundary(span.offset()));
                assert!(src[span.offset()..].starts_with("oops"), "{src:?} @ {}", span.offset());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_reads_escapes() {
        let value = read(r#"{"text": "line\nbreak \"quoted\" tab\t"}"#).expect("valid json");
        assert_eq!(value["text"], "line\nbreak \"quoted\" tab\t");
    }
}
