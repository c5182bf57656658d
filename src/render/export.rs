// Exported standalone document
// Header with title and edition year, a sidebar listing the h1/h2 headings and
// a small script that keeps the sidebar in sync and scrolls smoothly.

use super::html::{document_to_html_with_ids, escape_html, heading_outline};
use super::page::document_title;
use crate::richtext::structured_document::StructuredDocument;
use chrono::Datelike;
use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

const EXPORT_CSS: &str = r#"
:root { --brand-green: #f0fdfa; --border: #e2e8f0; --text-dark: #111; --text-light: #555;}
*{box-sizing:border-box;}
body{margin:0;padding:0;font-family:system-ui,sans-serif;color:var(--text-dark);}
header{background:var(--brand-green);padding:2rem 1rem;}
header .inner{max-width:900px;margin:auto;}
header h1{margin:0;text-align:center;font-size:2rem;}
header p{margin:.5rem 0 0;text-align:center;color:var(--text-light);}
.container{display:flex;max-width:900px;margin:2rem 10vw;gap:2rem;}
.sidebar{flex:0 0 200px;position:sticky;top:1rem;align-self:start;border-right:1px solid var(--border);padding-right:1rem;max-height:calc(100vh-4rem);overflow-y:auto;}
.sidebar ul{list-style:none;padding:0;margin:0;}
.sidebar li+li{margin-top:.5rem;}
.sidebar a{text-decoration:none;color:var(--text-dark);}
.sidebar a.active,.sidebar a:hover{font-weight:bold;color:#007a5a;}
.sidebar li.nested a{display:block;padding-left:1rem;font-size:.9em;color:var(--text-light);}
.content{flex:1;line-height:1.6;}
.content h1{position:relative;font-size:1.6rem;text-transform:uppercase;text-align:center;letter-spacing:.05em;margin:3rem 0 1.5rem;padding-bottom:.5rem;color:#007a5a;border-bottom:3px solid var(--border);}
.content h1::before{content:'';position:absolute;left:-1rem;top:0;width:4px;height:100%;background:#007a5a;}
.content h2{font-size:1.2rem;text-transform:uppercase;letter-spacing:.05em;margin:3rem 0 1.5rem;color:#007a5a;}
.content table{width:100%;border-collapse:collapse;margin:1rem 0;}
.content th,.content td{border:1px solid var(--border);padding:.5rem;}
.content code,.content pre{background:#f7fafc;padding:.2rem .4rem;border-radius:4px;}
* { font-family: inherit; }
"#;

const EXPORT_SCRIPT: &str = r#"
    const c = document.getElementById('export-content');
    const s = document.querySelector('.sidebar ul');
    c.querySelectorAll('h1,h2').forEach(h => {
      if (!h.id) h.id = h.textContent.trim().toLowerCase().replace(/[^\w]+/g,'-').replace(/(^-+|-+$)/g,'');
    });
    s.innerHTML = '';
    c.querySelectorAll('h1,h2').forEach(h => {
      const li = document.createElement('li');
      const a  = document.createElement('a');
      a.href = '#'+h.id;
      a.textContent = h.textContent;
      if (h.tagName === 'H1') li.classList.add('nested');
      li.appendChild(a);
      s.appendChild(li);
    });
    document.querySelectorAll('.sidebar a').forEach(link => {
      link.addEventListener('click', e => {
        e.preventDefault();
        document.querySelectorAll('.sidebar a').forEach(a => a.classList.remove('active'));
        link.classList.add('active');
        const t = document.getElementById(link.getAttribute('href').slice(1));
        if (t) t.scrollIntoView({behavior:'smooth',block:'start'});
      });
    });
  "#;

/// Sidebar list items for every h1/h2, in document order
pub fn sidebar_entries(doc: &StructuredDocument) -> String {
    heading_outline(doc)
        .iter()
        .map(|entry| {
            let class = if entry.level == 1 { " class=\"nested\"" } else { "" };
            format!(
                "<li{class}><a href=\"#{}\">{}</a></li>",
                escape_html(&entry.slug),
                escape_html(&entry.text)
            )
        })
        .collect()
}

/// Self-contained export page
pub fn export_html(title: &str, doc: &StructuredDocument, year: i32) -> String {
    let title = escape_html(&document_title(title));
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>{title}</title>
  <style>{css}</style>
</head>
<body>
  <header><div class="inner"><h1>{title}</h1><p>Updated: {year} Edition</p></div></header>
  <div class="container">
    <nav class="sidebar"><ul>{entries}</ul></nav>
    <main class="content" id="export-content">{content}</main>
  </div>
  <script>{script}</script>
</body>
</html>"#,
        css = EXPORT_CSS,
        entries = sidebar_entries(doc),
        content = document_to_html_with_ids(doc),
        script = EXPORT_SCRIPT,
    )
}

/// File name offered for an export: lowercased title, whitespace runs as `_`
pub fn export_file_name(title: &str) -> String {
    let title = document_title(title).to_lowercase();
    format!("{}.html", WHITESPACE.replace_all(&title, "_"))
}

/// The year stamped into the export header
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}
