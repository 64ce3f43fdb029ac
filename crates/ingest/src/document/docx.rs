use std::io::{Cursor, Read};

use super::ExtractionError;

/// Extract plain text from DOCX bytes.
///
/// A DOCX file is a ZIP archive; the document body lives in
/// `word/document.xml`. Visible text sits in `<w:t>` runs, paragraphs end
/// with `</w:p>`, and explicit tabs and breaks have their own elements.
pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::DocxError(format!("not a valid DOCX archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractionError::DocxError(format!("word/document.xml missing: {e}")))?
        .read_to_string(&mut xml)?;

    Ok(document_text(&xml))
}

/// Walks the WordprocessingML body and collects visible text. Word writes
/// machine-generated XML, so tag boundaries are reliable and `<` never
/// appears unescaped inside attribute values or text runs.
fn document_text(xml: &str) -> String {
    let mut out = String::new();
    let mut rest = xml;

    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        let tag = &rest[start + 1..start + len];
        rest = &rest[start + len + 1..];

        let self_closing = tag.ends_with('/');
        let (closing, body) = match tag.strip_prefix('/') {
            Some(body) => (true, body),
            None => (false, tag),
        };
        let name = body
            .split_whitespace()
            .next()
            .unwrap_or("")
            .trim_end_matches('/');

        match (name, closing) {
            ("w:t", false) if !self_closing => {
                let text_len = rest.find('<').unwrap_or(rest.len());
                decode_entities(&rest[..text_len], &mut out);
                rest = &rest[text_len..];
            }
            ("w:p", true) => out.push('\n'),
            ("w:tab", false) => out.push('\t'),
            ("w:br", false) | ("w:cr", false) => out.push('\n'),
            _ => {}
        }
    }

    out.trim().to_string()
}

/// Decodes the five predefined XML entities plus numeric character
/// references. Anything unrecognized is kept literally.
fn decode_entities(text: &str, out: &mut String) {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let Some(semi) = rest.find(';').filter(|&i| i <= 12) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };

        let decoded = match &rest[1..semi] {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            entity => parse_char_ref(entity),
        };

        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
}

fn parse_char_ref(entity: &str) -> Option<char> {
    let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse().ok()?
    };
    char::from_u32(code)
}
