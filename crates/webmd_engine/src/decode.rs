use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use engine_logging::engine_debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}: {message}")]
    DecodeFailure { encoding: String, message: String },
}

/// Decode raw page bytes into UTF-8: BOM -> Content-Type charset -> chardetng guess.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedHtml, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(extract_charset) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    // The external client reports no headers, so detection carries those pages.
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

/// Like [`decode_html`], but keeps the text with replacement characters when
/// the bytes do not fully decode.
pub fn decode_text(bytes: &[u8], content_type: Option<&str>) -> String {
    match decode_html(bytes, content_type) {
        Ok(decoded) => decoded.html,
        Err(err) => {
            engine_debug!("{err}; keeping lossy text");
            let encoding = Encoding::for_bom(bytes)
                .map(|(enc, _)| enc)
                .or_else(|| {
                    content_type
                        .and_then(extract_charset)
                        .and_then(|label| Encoding::for_label(label.as_bytes()))
                })
                .unwrap_or(encoding_rs::UTF_8);
            encoding.decode(bytes).0.into_owned()
        }
    }
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim_matches(&[' ', '"', '\''][..]).to_string())
    })
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<DecodedHtml, DecodeError> {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: enc.name().to_string(),
            message: "decoding error".into(),
        });
    }
    Ok(DecodedHtml {
        html: text.into_owned(),
        encoding_label: enc.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::extract_charset;

    #[test]
    fn charset_parameter_is_found_in_any_case() {
        assert_eq!(
            extract_charset("text/html; Charset=\"ISO-8859-1\"").as_deref(),
            Some("ISO-8859-1")
        );
        assert_eq!(extract_charset("text/html"), None);
    }
}
