//! Shared fixtures for the connector tests.

use std::io::Write;
use tempfile::NamedTempFile;

/// Build a minimal PDF with one Helvetica text line per page.
#[allow(dead_code)]
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let streams: Vec<String> = pages
        .iter()
        .map(|text| format!("BT /F1 12 Tf 20 150 Td ({}) Tj ET", text))
        .collect();
    let streams: Vec<&str> = streams.iter().map(String::as_str).collect();
    pdf_with_streams(&streams)
}

/// Build a minimal PDF with one page per content stream, `/F1` bound to Helvetica.
#[allow(dead_code)]
pub fn pdf_with_streams(streams: &[&str]) -> Vec<u8> {
    let page_count = streams.len();
    let font_id = 3 + 2 * page_count;
    let mut objects: Vec<String> = Vec::new();

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());

    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        page_count
    ));

    for (i, stream) in streams.iter().enumerate() {
        let content_id = 4 + 2 * i;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 300 300] /Resources << /Font << /F1 {} 0 R >> >> /Contents {} 0 R >>",
            font_id, content_id
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for offset in offsets {
        out.push_str(&format!("{:010} 00000 n \n", offset));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));

    out.into_bytes()
}

/// Write bytes to a temp file with the given suffix.
#[allow(dead_code)]
pub fn temp_file(suffix: &str, bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(suffix).unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}
