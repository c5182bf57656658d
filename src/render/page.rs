// Preview and print documents
// Both are complete HTML pages whose stylesheet comes from the style profile.

use super::html::{document_to_html, escape_html};
use crate::richtext::structured_document::StructuredDocument;
use crate::richtext::style::{DEFAULT_FONT_FAMILY, StyleProfile, is_valid_font_family};

/// Title used when the user left the title field blank
pub const UNTITLED: &str = "Untitled Document";

/// Trimmed title, or the untitled fallback
pub fn document_title(title: &str) -> String {
    match title.trim() {
        "" => UNTITLED.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Stylesheet for the preview and print pages
pub fn profile_css(profile: &StyleProfile) -> String {
    let family = if is_valid_font_family(&profile.font_family) {
        profile.font_family.as_str()
    } else {
        DEFAULT_FONT_FAMILY
    };
    let mut css = String::from("    body {\n");
    css.push_str(&format!("      font-family: {family};\n"));
    css.push_str(&format!("      line-height: {};\n", profile.line_height));
    css.push_str("      margin: 20px;\n");
    css.push_str(&format!("      font-size: {}px;\n", profile.font_size.px()));
    if let Some(color) = profile.text_color {
        css.push_str(&format!("      color: {color};\n"));
    }
    if let Some(color) = profile.background_color {
        css.push_str(&format!("      background-color: {color};\n"));
    }
    css.push_str("    }\n");
    for level in 1..=3u8 {
        let heading = profile.heading(level);
        let weight = if heading.bold { "bold" } else { "normal" };
        css.push_str(&format!(
            "    h{level} {{ font-size: {}em; font-weight: {weight}; margin: 1em 0 0.5em 0; }}\n",
            heading.size_em
        ));
    }
    css.push_str("    p { margin: 0.5em 0; }\n");
    css.push_str("    * { font-family: inherit; }\n");
    css
}

fn page(title: &str, profile: &StyleProfile, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"UTF-8\">\n  <title>{}</title>\n  <style>\n{}  </style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(&document_title(title)),
        profile_css(profile),
        body
    )
}

/// Standalone preview page
pub fn preview_html(title: &str, doc: &StructuredDocument, profile: &StyleProfile) -> String {
    page(title, profile, &document_to_html(doc))
}

/// Printable page: the preview with the title prefixed as a heading
pub fn print_html(title: &str, doc: &StructuredDocument, profile: &StyleProfile) -> String {
    let body = format!(
        "<h1>{}</h1>\n{}",
        escape_html(&document_title(title)),
        document_to_html(doc)
    );
    page(title, profile, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::style::{Color, FontSize};

    #[test]
    fn test_document_title() {
        assert_eq!(document_title("  Notes  "), "Notes");
        assert_eq!(document_title("   "), UNTITLED);
    }

    #[test]
    fn test_profile_css() {
        let mut profile = StyleProfile::default();
        profile.font_size = FontSize::new(18).unwrap();
        profile.text_color = Some(Color::rgb(0x33, 0x33, 0x33));
        profile.h2.bold = false;
        let css = profile_css(&profile);
        assert!(css.contains("font-family: Inter, Arial, sans-serif;"));
        assert!(css.contains("font-size: 18px;"));
        assert!(css.contains("color: #333333;"));
        assert!(css.contains("h1 { font-size: 2em; font-weight: bold;"));
        assert!(css.contains("h2 { font-size: 1.5em; font-weight: normal;"));
        assert!(!css.contains("background-color"));
    }

    #[test]
    fn test_profile_css_skips_unsafe_family() {
        let mut profile = StyleProfile::default();
        profile.font_family = "Inter;}</style><script>alert(1)</script><style>".into();
        let css = profile_css(&profile);
        assert!(css.contains("font-family: Inter, Arial, sans-serif;"));
        assert!(!css.contains("<script>"));
    }

    #[test]
    fn test_print_prefixes_title() {
        let doc = StructuredDocument::with_paragraph("Body");
        let html = print_html("<Plan>", &doc, &StyleProfile::default());
        assert!(html.contains("<title>&lt;Plan&gt;</title>"));
        assert!(html.contains("<body>\n<h1>&lt;Plan&gt;</h1>\n<p>Body</p>\n</body>"));

        let preview = preview_html("", &doc, &StyleProfile::default());
        assert!(preview.starts_with("<!DOCTYPE html>"));
        assert!(preview.contains("<title>Untitled Document</title>"));
        assert!(preview.contains("<body>\n<p>Body</p>\n</body>"));
    }
}
