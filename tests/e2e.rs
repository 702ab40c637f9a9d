//! End-to-end integration tests for docchat.
//!
//! These tests load the real pdfium library and make live LLM API calls.
//! They are gated behind the `E2E_ENABLED` environment variable so they do
//! not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use docchat::pipeline::pdf::extract_pdf_text;
use docchat::{
    extract, ChatConfig, ExtractedContent, ExtractionError, LlmClient, SessionLoop, UploadedFile,
};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

macro_rules! e2e_skip_unless_enabled {
    () => {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    };
}

/// Build a minimal uncompressed PDF with one Helvetica text run per page.
fn minimal_pdf(pages: &[&str]) -> Vec<u8> {
    let n = pages.len();
    let font_id = 3 + 2 * n;
    let kids: Vec<String> = (0..n).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), n),
    ];
    for (i, text) in pages.iter().enumerate() {
        let stream = format!("BT /F1 24 Tf 20 100 Td ({text}) Tj ET");
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 200 200] \
             /Resources << /Font << /F1 {font_id} 0 R >> >> /Contents {} 0 R >>",
            4 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{stream}\nendstream",
            stream.len()
        ));
    }
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }
    let xref_at = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for off in offsets {
        pdf.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    pdf
}

fn has_llm_key() -> bool {
    ["ANTHROPIC_API_KEY", "OPENAI_API_KEY", "GEMINI_API_KEY", "EDGEQUAKE_LLM_PROVIDER"]
        .iter()
        .any(|k| std::env::var(k).is_ok())
}

// ── PDF extraction (pdfium) ──────────────────────────────────────────────────

#[test]
fn test_two_page_pdf_text() {
    e2e_skip_unless_enabled!();

    let bytes = minimal_pdf(&["Hello", "World"]);
    let text = extract_pdf_text(&bytes, None).expect("pdfium extraction");
    println!("extracted: {text:?}");

    assert_eq!(text, "Hello\nWorld\n");
    assert_eq!(text.matches('\n').count(), 2);
}

#[test]
fn test_pdf_extraction_is_deterministic() {
    e2e_skip_unless_enabled!();

    let bytes = minimal_pdf(&["Alpha", "Beta", "Gamma"]);
    let a = extract_pdf_text(&bytes, None).expect("first extraction");
    let b = extract_pdf_text(&bytes, None).expect("second extraction");
    assert_eq!(a, b);
}

#[test]
fn test_truncated_pdf_is_rejected() {
    e2e_skip_unless_enabled!();

    let bytes = minimal_pdf(&["Hello"]);
    let err = extract_pdf_text(&bytes[..20], None).unwrap_err();
    assert!(
        matches!(err, ExtractionError::CorruptPdf { .. }),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_pdf_upload_from_disk() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.pdf");
    std::fs::write(&path, minimal_pdf(&["Hello", "World"])).unwrap();

    let file = UploadedFile::from_path(&path).await.unwrap();
    let content = extract(&file, None).await.unwrap();
    let ExtractedContent::Text(text) = content else {
        panic!("expected text content");
    };
    assert!(text.contains("Hello"));
    assert!(text.contains("World"));
}

// ── Live LLM ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_live_turn_about_pdf() {
    e2e_skip_unless_enabled!();
    if !has_llm_key() {
        println!("SKIP: no LLM API key in environment");
        return;
    }

    let config = ChatConfig::builder().max_tokens(128).temperature(0.0).build().unwrap();
    let client = LlmClient::from_config(&config).expect("provider");
    let mut session = SessionLoop::new(Arc::new(client), &config);

    let file = UploadedFile::new("hello.pdf", "application/pdf", minimal_pdf(&["Hello", "World"]))
        .unwrap();
    session.on_upload(file).await.expect("upload");

    let reply = session
        .on_user_turn("Which two words appear in the document? Answer with just the words.")
        .await
        .expect("model reply");
    println!("reply: {reply}");

    assert!(!reply.trim().is_empty());
    assert!(reply.to_lowercase().contains("hello"));
    assert_eq!(session.messages().len(), 3);
}
