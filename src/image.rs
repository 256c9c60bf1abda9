//! Uploaded poster files to embeddable `data:` URLs.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::{AppError, AppResult};

const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"BM", "image/bmp"),
];

pub async fn decode(bytes: Vec<u8>, content_type: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || to_data_url(&bytes, &content_type))
        .await
        .map_err(|err| AppError::Decode(err.to_string()))?
}

pub fn to_data_url(bytes: &[u8], content_type: &str) -> AppResult<String> {
    if bytes.is_empty() {
        return Err(AppError::Decode("file is empty".to_string()));
    }
    let mime = sniff(bytes)
        .or_else(|| is_svg(bytes, content_type).then_some("image/svg+xml"))
        .ok_or_else(|| {
            AppError::Decode(format!("unsupported image type {:?}", content_type.trim()))
        })?;
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

fn sniff(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    SIGNATURES.iter().find(|(magic, _)| bytes.starts_with(magic)).map(|(_, mime)| *mime)
}

fn is_svg(bytes: &[u8], content_type: &str) -> bool {
    let declared = content_type.split(';').next().unwrap_or_default().trim();
    declared.eq_ignore_ascii_case("image/svg+xml")
        && std::str::from_utf8(bytes).is_ok_and(|text| text.contains("<svg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn sniffed_type_wins_over_declared() {
        let url = to_data_url(PNG_HEADER, "application/octet-stream").unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(&url["data:image/png;base64,".len()..], STANDARD.encode(PNG_HEADER));
    }

    #[test]
    fn webp_needs_riff_container() {
        let webp = b"RIFF\x24\0\0\0WEBPVP8 ";
        assert!(to_data_url(webp, "").unwrap().starts_with("data:image/webp;"));
        assert!(to_data_url(b"RIFF\x24\0\0\0WAVEfmt ", "image/webp").is_err());
    }

    #[test]
    fn svg_requires_declared_type() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg"/>"#;
        assert!(to_data_url(svg, "image/svg+xml").unwrap().starts_with("data:image/svg+xml;"));
        assert!(to_data_url(svg, "text/plain").is_err());
    }

    #[test]
    fn rejects_empty_and_unknown_files() {
        assert!(matches!(to_data_url(b"", "image/png"), Err(AppError::Decode(_))));
        assert!(matches!(to_data_url(b"hello", "image/png"), Err(AppError::Decode(_))));
    }

    #[tokio::test]
    async fn decodes_off_the_async_thread() {
        let url = decode(b"GIF89a\x01\0\x01\0".to_vec(), "image/gif".into()).await.unwrap();
        assert!(url.starts_with("data:image/gif;base64,"));
    }
}
