//! Rendering of generated documents.
//!
//! Documents are plain text formats any desktop can open: Markdown for
//! documents and slide decks, CSV for spreadsheets.

use super::Slide;

/// Themes understood by slide rendering. Anything else falls back to `dark`.
pub const THEMES: &[&str] = &["dark", "corporate", "nature", "warm", "ocean", "minimal"];

/// `<title>_<stamp>.<ext>` with spaces replaced and path separators removed.
pub fn output_file_name(title: &str, stamp: &str, ext: &str) -> String {
    let safe: String = title
        .trim()
        .chars()
        .map(|c| match c {
            ' ' => '_',
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c => c,
        })
        .collect();
    let safe = if safe.is_empty() { "untitled".to_string() } else { safe };
    format!("{safe}_{stamp}.{ext}")
}

/// Markdown document: title, date line, then the content with heading and
/// bullet markers normalised.
pub fn render_document(title: &str, date: &str, content: &str) -> String {
    let mut out = format!("# {title}\n\n_{date}_\n\n---\n\n");
    for line in content.lines() {
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }
        // Content headings sit one level below the document title
        if ["# ", "## ", "### "].iter().any(|h| stripped.starts_with(h)) {
            out.push_str(&format!("#{stripped}\n\n"));
        } else if stripped.starts_with(['-', '*', '>']) {
            out.push_str(&format!("- {}\n", strip_bullet(stripped)));
        } else {
            out.push_str(stripped);
            out.push_str("\n\n");
        }
    }
    out.push_str(&format!("\n---\n\n{title} | Generated by Desk Assistant\n"));
    out
}

/// Marp-compatible Markdown deck: title slide, one slide per entry, closing slide.
pub fn render_presentation(title: &str, date: &str, slides: &[Slide], theme: &str) -> String {
    let theme = if THEMES.contains(&theme) { theme } else { "dark" };
    let mut out = format!("---\nmarp: true\ntheme: {theme}\npaginate: true\n---\n\n# {title}\n\n{date}\n");

    for (idx, slide) in slides.iter().enumerate() {
        out.push_str(&format!("\n---\n\n<!-- {:02} -->\n## {}\n\n", idx + 1, slide.title));
        for line in slide.content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            out.push_str(&format!("- {}\n", strip_bullet(line)));
        }
    }

    out.push_str(&format!("\n---\n\n# Thank You\n\n{title}\n"));
    out
}

/// CSV with RFC 4180 quoting.
pub fn render_spreadsheet(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        let line = row.iter().map(|cell| csv_escape(cell)).collect::<Vec<_>>().join(",");
        out.push_str(&line);
        out.push_str("\r\n");
    }
    out
}

fn csv_escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(['-', '*', '>', ' '])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("Weekly Report", "101500", "md"), "Weekly_Report_101500.md");
        assert_eq!(output_file_name("a/b\\c", "1", "csv"), "a-b-c_1.csv");
        assert_eq!(output_file_name("  ", "1", "md"), "untitled_1.md");
    }

    #[test]
    fn test_render_document_markers() {
        let doc = render_document("Plan", "2026-10-18", "# Goals\n- ship\n* test\n\nplain text\n### Detail");
        assert!(doc.starts_with("# Plan\n\n_2026-10-18_"));
        assert!(doc.contains("## Goals"));
        assert!(doc.contains("- ship\n"));
        assert!(doc.contains("- test\n"));
        assert!(doc.contains("plain text\n\n"));
        assert!(doc.contains("#### Detail"));
        assert!(doc.contains("Generated by Desk Assistant"));
    }

    #[test]
    fn test_render_presentation() {
        let slides = vec![
            Slide { title: "Intro".into(), content: "- one\ntwo\n\n> three".into() },
            Slide { title: "End".into(), content: String::new() },
        ];
        let deck = render_presentation("Taiwan News", "2026.10.18", &slides, "ocean");
        assert!(deck.starts_with("---\nmarp: true\ntheme: ocean"));
        assert!(deck.contains("# Taiwan News"));
        assert!(deck.contains("<!-- 01 -->\n## Intro"));
        assert!(deck.contains("- one\n- two\n- three\n"));
        assert!(deck.contains("<!-- 02 -->\n## End"));
        assert!(deck.contains("# Thank You"));
    }

    #[test]
    fn test_render_presentation_unknown_theme_falls_back() {
        let deck = render_presentation("T", "d", &[], "neon");
        assert!(deck.contains("theme: dark"));
    }

    #[test]
    fn test_render_spreadsheet_quoting() {
        let rows = vec![
            vec!["name".to_string(), "note".to_string()],
            vec!["a,b".to_string(), "say \"hi\"".to_string()],
        ];
        assert_eq!(
            render_spreadsheet(&rows),
            "name,note\r\n\"a,b\",\"say \"\"hi\"\"\"\r\n"
        );
    }
}
