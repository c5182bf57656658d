// Generated pages for a loaded document

use richpad::render::export::{export_file_name, export_html, sidebar_entries};
use richpad::render::html::{document_to_html_with_ids, heading_outline};
use richpad::render::page::print_html;
use richpad::richtext::markdown_converter::markdown_to_document;
use richpad::richtext::style::StyleProfile;

const GUIDE: &str = "# Getting Started\n\nWelcome.\n\n## Install\n\nRun it.\n\n### Details\n\nMore.\n\n## Install\n\nAgain.\n\n# FAQ & Tips\n";

#[test]
fn sidebar_lists_h1_and_h2_in_order() {
    let doc = markdown_to_document(GUIDE);
    let outline = heading_outline(&doc);
    let slugs: Vec<&str> = outline.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(
        slugs,
        ["getting-started", "install", "install", "faq-tips"]
    );

    insta::assert_snapshot!(
        sidebar_entries(&doc),
        @r##"<li class="nested"><a href="#getting-started">Getting Started</a></li><li><a href="#install">Install</a></li><li><a href="#install">Install</a></li><li class="nested"><a href="#faq-tips">FAQ &amp; Tips</a></li>"##
    );
}

#[test]
fn content_headings_carry_slug_ids() {
    let doc = markdown_to_document("# Intro\n\nBody *text*.\n\n### Deep");
    insta::assert_snapshot!(
        document_to_html_with_ids(&doc).replace('\n', ""),
        @r#"<h1 id="intro">Intro</h1><p>Body <i>text</i>.</p><h3>Deep</h3>"#
    );
}

#[test]
fn export_page_wraps_everything() {
    let doc = markdown_to_document(GUIDE);
    let page = export_html("User Guide", &doc, 2026);
    assert!(page.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));
    assert!(page.contains(
        "<header><div class=\"inner\"><h1>User Guide</h1><p>Updated: 2026 Edition</p></div></header>"
    ));
    assert_eq!(page.matches("<li").count(), 4);
    assert_eq!(page.matches("id=\"install\"").count(), 2);
    assert!(page.contains("<h3>Details</h3>"));
    assert!(page.contains("scrollIntoView({behavior:'smooth',block:'start'})"));
    assert_eq!(export_file_name("User Guide"), "user_guide.html");
}

#[test]
fn print_page_titles_the_document() {
    let doc = markdown_to_document("Just text");
    let page = print_html("   ", &doc, &StyleProfile::default());
    assert!(page.contains("<title>Untitled Document</title>"));
    assert!(page.contains("<h1>Untitled Document</h1>\n<p>Just text</p>"));
}
