/// Plain text and Markdown share this path: decode as UTF-8, fall back to
/// lossy conversion for files with stray non-UTF-8 bytes.
pub fn extract_txt(bytes: &[u8]) -> String {
    let text = String::from_utf8(bytes.to_vec())
        .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned());
    text.trim().to_string()
}
