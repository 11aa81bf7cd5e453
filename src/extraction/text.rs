/// Decode plain text as UTF-8, retrying once as Latin-1 before giving up.
///
/// Latin-1 maps every byte to a code point, so the fallback only rejects content holding NUL
/// bytes, which marks binary data rather than text.
pub(super) fn decode_text(bytes: &[u8]) -> Result<String, String> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.trim().to_string()),
        Err(utf8_error) => {
            tracing::debug!(error = %utf8_error, "UTF-8 decode failed; retrying as Latin-1");
            if let Some(position) = bytes.iter().position(|byte| *byte == 0) {
                return Err(format!(
                    "not valid UTF-8 ({utf8_error}) and binary data found at byte {position}"
                ));
            }
            let text: String = bytes.iter().map(|byte| char::from(*byte)).collect();
            Ok(text.trim().to_string())
        }
    }
}
