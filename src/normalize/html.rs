use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::sync::LazyLock;

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex"));

// 技術說明頁固定以此標題開頭
static DESCRIPTION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:#+[ \t]*)?Technische Beschreibung\s*\n\s*\n\s*").expect("static regex")
});

/// Renders an HTML page as markdown.
///
/// Returns `None` when `content_type` is not `text/html`. Links are kept,
/// images dropped, emphasis kept, no line wrapping. Runs of blank lines are
/// collapsed and a leading "Technische Beschreibung" heading is removed.
pub fn html_to_text(body: &str, content_type: &str) -> Option<String> {
    if !content_type.to_ascii_lowercase().contains("text/html") {
        return None;
    }

    let document = Html::parse_document(body);
    let mut writer = MarkdownWriter::default();
    writer.element(document.root_element());

    let markdown = writer.finish();
    let markdown = EXCESS_NEWLINES.replace_all(&markdown, "\n\n");
    Some(DESCRIPTION_HEADING.replacen(&markdown, 1, "").into_owned())
}

#[derive(Default)]
struct MarkdownWriter {
    out: String,
    // None = <ul>, Some(n) = <ol> 目前編號
    lists: Vec<Option<usize>>,
    preformatted: usize,
}

impl MarkdownWriter {
    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    fn trim_trailing_spaces(&mut self) {
        let trimmed = self.out.trim_end_matches([' ', '\t']).len();
        self.out.truncate(trimmed);
    }

    fn newline(&mut self) {
        self.trim_trailing_spaces();
        if !self.at_line_start() {
            self.out.push('\n');
        }
    }

    fn blank_line(&mut self) {
        self.trim_trailing_spaces();
        if self.out.is_empty() {
            return;
        }
        while !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn text(&mut self, text: &str) {
        if self.preformatted > 0 {
            self.out.push_str(text);
            return;
        }

        let mut pending_space = false;
        for c in text.chars() {
            if c.is_whitespace() {
                pending_space = true;
                continue;
            }
            if pending_space && !self.at_line_start() && !self.out.ends_with(' ') {
                self.out.push(' ');
            }
            pending_space = false;
            self.out.push(c);
        }
        if pending_space && !self.at_line_start() && !self.out.ends_with(' ') {
            self.out.push(' ');
        }
    }

    fn children(&mut self, element: ElementRef) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.element(child);
                    }
                }
                _ => {}
            }
        }
    }

    /// Emits `marker` around the element's content, or nothing if it is empty.
    fn emphasis(&mut self, element: ElementRef, marker: &str) {
        let start = self.out.len();
        self.out.push_str(marker);
        self.children(element);
        if self.out.len() == start + marker.len() {
            self.out.truncate(start);
        } else {
            self.out.push_str(marker);
        }
    }

    fn element(&mut self, element: ElementRef) {
        let name = element.value().name();
        match name {
            "head" | "script" | "style" | "noscript" | "template" | "img" => {}
            "br" => {
                self.trim_trailing_spaces();
                self.out.push('\n');
            }
            "hr" => {
                self.blank_line();
                self.out.push_str("* * *");
                self.blank_line();
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<usize>().unwrap_or(1);
                self.blank_line();
                self.out.push_str(&"#".repeat(level));
                self.out.push(' ');
                self.children(element);
                self.blank_line();
            }
            "p" | "div" | "section" | "article" | "header" | "footer" | "main" | "nav"
            | "table" | "blockquote" | "dl" | "figure" => {
                self.blank_line();
                self.children(element);
                self.blank_line();
            }
            "pre" => {
                self.blank_line();
                self.preformatted += 1;
                self.children(element);
                self.preformatted -= 1;
                self.blank_line();
            }
            "tr" | "dt" | "dd" => {
                self.newline();
                self.children(element);
                self.newline();
            }
            "td" | "th" => {
                if !self.at_line_start() {
                    self.trim_trailing_spaces();
                    self.out.push_str(" | ");
                }
                self.children(element);
            }
            "ul" | "ol" => {
                if self.lists.is_empty() {
                    self.blank_line();
                } else {
                    self.newline();
                }
                self.lists.push((name == "ol").then_some(0));
                self.children(element);
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                } else {
                    self.newline();
                }
            }
            "li" => {
                self.newline();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        *n += 1;
                        format!("{}. ", n)
                    }
                    _ => "* ".to_string(),
                };
                self.out.push_str(&indent);
                self.out.push_str(&marker);
                self.children(element);
                self.newline();
            }
            "strong" | "b" => self.emphasis(element, "**"),
            "em" | "i" => self.emphasis(element, "_"),
            "a" => match element.value().attr("href").filter(|href| !href.is_empty()) {
                Some(href) => {
                    self.out.push('[');
                    self.children(element);
                    self.out.push_str("](");
                    self.out.push_str(href);
                    self.out.push(')');
                }
                None => self.children(element),
            },
            _ => self.children(element),
        }
    }

    fn finish(self) -> String {
        let lines: Vec<&str> = self.out.lines().map(str::trim_end).collect();
        let joined = lines.join("\n");
        let body = joined.trim_matches('\n');
        if body.is_empty() {
            String::new()
        } else {
            format!("{}\n", body)
        }
    }
}
