//! Report Renderer: turns enriched candidates into a PDF report, merging in
//! each candidate's resume after their section.

pub mod layout;
pub mod metrics;
pub mod rtl;
pub mod text;
pub mod unicode_font;
pub mod writer;

use bytes::Bytes;
use chrono::Utc;
use lopdf::Document;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::EnrichedCandidate;
use layout::{Align, PageLayout, Style};
use metrics::Face;
use text::{format_transcript, truncate_field};
use writer::{load_document, PdfBuilder};

pub const REPORT_TITLE: &str = "Candidate Matching Report";

const TITLE: Style = Style::new(Face::Bold, 22.0);
const HEADING: Style = Style::new(Face::Bold, 16.0);
const SECTION: Style = Style::new(Face::Bold, 12.0);
const BODY: Style = Style::new(Face::Regular, 10.0);
const BULLET_INDENT: f32 = 12.0;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Report task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// Transcript and feedback are cut past this many characters.
    pub max_field_chars: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            max_field_chars: 1500,
        }
    }
}

/// One single-candidate report.
#[derive(Debug, Clone)]
pub struct CandidateReport {
    pub candidate_name: String,
    pub pdf: Vec<u8>,
}

/// Renders one combined report: a title page, then one section per
/// candidate, each followed by their resume when one was fetched.
pub fn render_report(
    candidates: &[EnrichedCandidate],
    settings: &ReportSettings,
) -> Result<Vec<u8>, ReportError> {
    let mut builder = PdfBuilder::new();
    let mut layout = PageLayout::new();

    write_title_page(&mut layout, candidates);

    for (index, candidate) in candidates.iter().enumerate() {
        layout.break_page();
        write_candidate(&mut layout, index + 1, candidate, settings);
        flush(&mut layout, &mut builder)?;
        if let Some(pdf) = &candidate.resume_pdf {
            append_resume(&mut builder, &candidate.candidate_name, pdf)?;
        }
    }

    flush(&mut layout, &mut builder)?;

    let pages = builder.page_count();
    let bytes = builder.finish()?;
    info!(
        "Rendered report for {} candidates ({} pages, {} bytes)",
        candidates.len(),
        pages,
        bytes.len()
    );
    Ok(bytes)
}

/// Renders one report per candidate, in input order.
pub fn render_candidate_reports(
    candidates: &[EnrichedCandidate],
    settings: &ReportSettings,
) -> Result<Vec<CandidateReport>, ReportError> {
    candidates
        .iter()
        .map(|candidate| {
            Ok(CandidateReport {
                candidate_name: candidate.candidate_name.clone(),
                pdf: render_report(std::slice::from_ref(candidate), settings)?,
            })
        })
        .collect()
}

fn write_title_page(layout: &mut PageLayout, candidates: &[EnrichedCandidate]) {
    layout.aligned(REPORT_TITLE, TITLE, Align::Center);
    layout.gap(6.0);
    layout.aligned(
        &format!("Generated {}", Utc::now().format("%Y-%m-%d %H:%M UTC")),
        BODY.gray(0.4),
        Align::Center,
    );
    layout.gap(18.0);
    layout.aligned(
        &format!("Top {} matching candidates", candidates.len()),
        SECTION,
        Align::Left,
    );
    layout.rule();
    for (index, candidate) in candidates.iter().enumerate() {
        layout.paragraph(
            &format!(
                "{}. {} ({} matched skills)",
                index + 1,
                candidate.candidate_name,
                candidate.match_count
            ),
            BODY,
            0.0,
        );
    }
}

fn write_candidate(
    layout: &mut PageLayout,
    position: usize,
    candidate: &EnrichedCandidate,
    settings: &ReportSettings,
) {
    layout.paragraph(
        &format!("Candidate {position}: {}", candidate.candidate_name),
        HEADING,
        0.0,
    );
    layout.rule();

    section(layout, "Match Score");
    layout.paragraph(&format!("Matched {} skills", candidate.match_count), BODY, 0.0);

    section(layout, "Matched Skills");
    for skill in &candidate.matched_skills {
        layout.paragraph(&format!("\u{2022} {skill}"), BODY, BULLET_INDENT);
    }

    section(layout, "Summary");
    layout.paragraph(or_default(&candidate.summary, "No summary available"), BODY, 0.0);

    section(layout, "Feedback Analysis");
    layout.paragraph(
        or_default(&candidate.feedback_review, "No analysis available"),
        BODY,
        0.0,
    );

    section(layout, "Feedback");
    let feedback = candidate
        .feedback
        .as_ref()
        .map(|fb| truncate_field(&fb.display_text(), settings.max_field_chars))
        .unwrap_or_default();
    layout.paragraph(or_default(&feedback, "No feedback available"), BODY, 0.0);

    section(layout, "Interview Transcript");
    let transcript = truncate_field(
        &format_transcript(&candidate.transcript),
        settings.max_field_chars,
    );
    layout.paragraph(or_default(&transcript, "No transcript available"), BODY, 0.0);

    if !candidate.email.trim().is_empty() {
        section(layout, "Email");
        layout.paragraph(&candidate.email, BODY, 0.0);
    }
}

fn section(layout: &mut PageLayout, title: &str) {
    layout.gap(8.0);
    layout.paragraph(title, SECTION, 0.0);
    layout.gap(2.0);
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

fn flush(layout: &mut PageLayout, builder: &mut PdfBuilder) -> Result<(), ReportError> {
    for page in layout.drain_pages() {
        builder.add_page(page)?;
    }
    builder.record_glyphs(layout.take_glyphs());
    Ok(())
}

/// Adds a separator page and the resume's pages. A resume that does not
/// parse is skipped without a separator.
fn append_resume(builder: &mut PdfBuilder, name: &str, pdf: &Bytes) -> Result<(), ReportError> {
    match load_document(pdf) {
        Ok(resume) => merge_resume(builder, name, resume),
        Err(e) => {
            warn!("Skipping resume for {name}: {e}");
            Ok(())
        }
    }
}

/// The separator goes in only once the resume's pages are in.
fn merge_resume(builder: &mut PdfBuilder, name: &str, resume: Document) -> Result<(), ReportError> {
    let at = builder.page_count();
    let pages = match builder.append_document(resume) {
        Ok(pages) => pages,
        Err(e) => {
            warn!("Skipping resume for {name}: {e}");
            return Ok(());
        }
    };

    let mut separator = PageLayout::new();
    separator.gap(300.0);
    separator.aligned(&format!("Resume: {name}"), HEADING, Align::Center);
    builder.insert_pages(at, separator.drain_pages())?;
    builder.record_glyphs(separator.take_glyphs());
    info!("Merged {pages} resume pages for {name}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Feedback;
    use lopdf::Object;
    use serde_json::json;

    fn enriched(name: &str) -> EnrichedCandidate {
        EnrichedCandidate {
            candidate_name: name.to_string(),
            match_count: 2,
            matched_skills: vec!["node.js".to_string(), "react".to_string()],
            summary: "Full-stack engineer.".to_string(),
            feedback_review: "✅ Suitable based on feedback".to_string(),
            transcript: "assistant: Hi user: Hello".to_string(),
            feedback: Feedback::from_value(&json!({"technical_skills": "strong"})),
            email: format!("{}@example.com", name.to_lowercase()),
            cv_resume: None,
            has_resume_pdf: false,
            resume_pdf: None,
        }
    }

    fn resume_pdf(pages: usize) -> Bytes {
        let mut layout = PageLayout::new();
        let mut builder = PdfBuilder::new();
        for i in 0..pages {
            layout.paragraph(&format!("Resume page {i}"), BODY, 0.0);
            layout.break_page();
        }
        for page in layout.drain_pages() {
            builder.add_page(page).unwrap();
        }
        Bytes::from(builder.finish().unwrap())
    }

    fn page_count(pdf: &[u8]) -> usize {
        Document::load_mem(pdf).unwrap().get_pages().len()
    }

    fn page_text(doc: &Document, number: u32) -> String {
        let page = *doc.get_pages().get(&number).unwrap();
        String::from_utf8_lossy(&doc.get_page_content(page).unwrap()).into_owned()
    }

    fn stream_text(doc: &Document, object: &Object) -> String {
        let stream = doc
            .get_object(object.as_reference().unwrap())
            .unwrap()
            .as_stream()
            .unwrap();
        let content = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        String::from_utf8_lossy(&content).into_owned()
    }

    #[test]
    fn test_report_is_a_pdf_with_one_page_per_candidate() {
        let candidates = vec![enriched("Alice"), enriched("Bob")];
        let pdf = render_report(&candidates, &ReportSettings::default()).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert_eq!(page_count(&pdf), 3);
    }

    #[test]
    fn test_empty_report_has_title_page_only() {
        let pdf = render_report(&[], &ReportSettings::default()).unwrap();
        assert_eq!(page_count(&pdf), 1);
    }

    #[test]
    fn test_resume_adds_separator_and_pages() {
        let mut alice = enriched("Alice");
        alice.resume_pdf = Some(resume_pdf(2));
        alice.has_resume_pdf = true;

        let pdf = render_report(&[alice], &ReportSettings::default()).unwrap();

        // title + candidate + separator + 2 resume pages
        assert_eq!(page_count(&pdf), 5);
    }

    #[test]
    fn test_unparseable_resume_is_skipped() {
        let mut alice = enriched("Alice");
        alice.resume_pdf = Some(Bytes::from_static(b"%PDF-1.4 broken"));

        let pdf = render_report(&[alice], &ReportSettings::default()).unwrap();

        assert_eq!(page_count(&pdf), 2);
    }

    #[test]
    fn test_long_fields_are_truncated_and_still_render() {
        let mut alice = enriched("Alice");
        alice.transcript = "assistant: question? user: answer. ".repeat(500);
        alice.feedback = Feedback::from_value(&json!("x".repeat(5000)));

        let pdf = render_report(&[alice], &ReportSettings::default()).unwrap();

        assert!(page_count(&pdf) >= 2);
    }

    #[test]
    fn test_rtl_and_missing_fields_render() {
        let mut alice = enriched("علي");
        alice.summary = String::new();
        alice.feedback = None;
        alice.transcript = String::new();
        alice.email = String::new();

        let pdf = render_report(&[alice], &ReportSettings::default()).unwrap();

        assert_eq!(page_count(&pdf), 2);
    }

    #[test]
    fn test_arabic_text_is_embedded_not_replaced() {
        let mut ali = enriched("علي حسن");
        ali.transcript = "assistant: ما هي خبرتك؟ user: خمس سنوات في تطوير الويب".to_string();

        let pdf = render_report(&[ali], &ReportSettings::default()).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();

        let content = page_text(&doc, 2);
        assert!(!content.contains("(Candidate 1: ???"));
        assert!(content.contains("/F3"));

        let page = *doc.get_pages().get(&2).unwrap();
        let resources = doc
            .get_dictionary(page)
            .unwrap()
            .get(b"Resources")
            .unwrap()
            .as_reference()
            .unwrap();
        let fonts = doc
            .get_dictionary(resources)
            .unwrap()
            .get(b"Font")
            .unwrap()
            .as_dict()
            .unwrap();
        let font = doc
            .get_dictionary(fonts.get(b"F3").unwrap().as_reference().unwrap())
            .unwrap();
        assert_eq!(font.get(b"Subtype").unwrap().as_name().unwrap(), b"Type0");
        assert_eq!(
            font.get(b"BaseFont").unwrap().as_name().unwrap(),
            unicode_font::BASE_FONT.as_bytes()
        );

        // ToUnicode maps glyphs back to the original letters
        let cmap = stream_text(&doc, font.get(b"ToUnicode").unwrap());
        assert!(cmap.contains("<0639>"), "ain from the name");
        assert!(cmap.contains("<062D>"), "hah from the surname");
        assert!(cmap.contains("<062E>"), "khah from the transcript");
    }

    #[test]
    fn test_separator_sits_before_resume_pages() {
        let mut alice = enriched("Alice");
        alice.resume_pdf = Some(resume_pdf(2));

        let pdf = render_report(&[alice], &ReportSettings::default()).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();

        assert!(page_text(&doc, 3).contains("Resume: Alice"));
        assert!(page_text(&doc, 4).contains("Resume page 0"));
    }

    #[test]
    fn test_resume_without_pages_adds_no_separator() {
        let mut builder = PdfBuilder::new();
        merge_resume(&mut builder, "Alice", Document::with_version("1.5")).unwrap();
        assert_eq!(builder.page_count(), 0);
    }

    #[test]
    fn test_per_candidate_reports() {
        let mut bob = enriched("Bob");
        bob.resume_pdf = Some(resume_pdf(1));
        let reports =
            render_candidate_reports(&[enriched("Alice"), bob], &ReportSettings::default())
                .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].candidate_name, "Alice");
        assert_eq!(page_count(&reports[0].pdf), 2);
        assert_eq!(page_count(&reports[1].pdf), 4);
    }
}
