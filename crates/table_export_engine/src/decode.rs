use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use export_logging::export_warn;

/// How far into the input a `<meta charset>` declaration is looked for.
const META_PRESCAN_BYTES: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
    /// Malformed sequences were replaced with U+FFFD.
    pub had_replacements: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown character encoding label `{0}`")]
    UnknownLabel(String),
}

/// Decode a saved HTML page into UTF-8.
///
/// Order: byte order mark, explicit `charset` from the caller, `<meta charset>`
/// near the top of the document, then chardetng detection. Malformed input is
/// decoded lossily and flagged rather than rejected.
pub fn decode_html(bytes: &[u8], charset: Option<&str>) -> Result<DecodedHtml, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return Ok(decode_with(bytes, encoding));
    }

    if let Some(label) = charset {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| DecodeError::UnknownLabel(label.to_string()))?;
        return Ok(decode_with(bytes, encoding));
    }

    if let Some(encoding) = meta_charset(bytes) {
        return Ok(decode_with(bytes, encoding));
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    Ok(decode_with(bytes, detector.guess(None, true)))
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> DecodedHtml {
    let (text, used, had_replacements) = encoding.decode(bytes);
    if had_replacements {
        export_warn!("Input is not valid {}; malformed bytes replaced", used.name());
    }
    DecodedHtml {
        html: text.into_owned(),
        encoding_label: used.name().to_string(),
        had_replacements,
    }
}

fn meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_PRESCAN_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    let start = head.find("charset=")? + "charset=".len();
    let label: String = head[start..]
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        .collect();
    Encoding::for_label(label.as_bytes())
}
