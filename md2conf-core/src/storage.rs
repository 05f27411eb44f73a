//! Confluence storage format output.
//!
//! The storage format is XHTML with `ac:`/`ri:` namespaced elements for
//! macros and resource references. Element tags are written through
//! [`ElementTag`], which carries a self-closing flag, so empty resource
//! references come out as `<ri:attachment ... />` without any textual
//! clean-up afterwards.

use crate::tree::{AttachmentLink, Document, Embed, Image, Link, Macro, MacroBody, Node, Table};
use pulldown_cmark::Alignment;

/// Render a document as storage-format markup.
pub fn serialize(document: &Document) -> String {
    let mut writer = StorageWriter::new();
    writer.nodes(&document.children);
    writer.finish()
}

/// A start tag, or a complete self-closing element.
#[derive(Debug, Clone)]
pub struct ElementTag<'a> {
    name: &'a str,
    attributes: Vec<(&'a str, &'a str)>,
    self_closing: bool,
}

impl<'a> ElementTag<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            self_closing: false,
        }
    }

    pub fn attr(mut self, key: &'a str, value: &'a str) -> Self {
        self.attributes.push((key, value));
        self
    }

    pub fn attr_opt(self, key: &'a str, value: Option<&'a str>) -> Self {
        match value {
            Some(value) => self.attr(key, value),
            None => self,
        }
    }

    pub fn self_closing(mut self) -> Self {
        self.self_closing = true;
        self
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
        if self.self_closing {
            out.push_str(" />");
        } else {
            out.push('>');
        }
    }
}

struct StorageWriter {
    out: String,
    /// Alignments of the table being written, and whether we are in its head.
    table: Option<(Vec<Alignment>, bool)>,
}

impl StorageWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            table: None,
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn open(&mut self, tag: ElementTag<'_>) {
        tag.write_to(&mut self.out);
    }

    fn close(&mut self, name: &str) {
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn newline(&mut self) {
        self.out.push('\n');
    }

    fn wrapped(&mut self, name: &str, children: &[Node]) {
        self.open(ElementTag::new(name));
        self.nodes(children);
        self.close(name);
    }

    fn nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.node(node);
        }
    }

    fn node(&mut self, node: &Node) {
        match node {
            Node::Heading { level, children } => {
                let name = heading_tag(*level);
                self.wrapped(name, children);
                self.newline();
            }
            Node::Paragraph(children) => {
                self.wrapped("p", children);
                self.newline();
            }
            Node::BlockQuote(children) => {
                self.open(ElementTag::new("blockquote"));
                self.newline();
                self.nodes(children);
                self.close("blockquote");
                self.newline();
            }
            Node::List { start, items } => self.list(*start, items),
            Node::ListItem(children) => {
                self.wrapped("li", children);
                self.newline();
            }
            Node::Table(table) => self.table(table),
            Node::TableHead(cells) => {
                if let Some((_, in_head)) = self.table.as_mut() {
                    *in_head = true;
                }
                self.open(ElementTag::new("thead"));
                self.row(cells);
                self.close("thead");
                self.newline();
                if let Some((_, in_head)) = self.table.as_mut() {
                    *in_head = false;
                }
            }
            Node::TableRow(cells) => self.row(cells),
            // Cells are written by `row`, which knows their column.
            Node::TableCell(children) => self.cell(0, children),
            Node::CodeFence(fence) => {
                let class = fence.language().map(|lang| format!("language-{lang}"));
                self.open(ElementTag::new("pre"));
                self.open(ElementTag::new("code").attr_opt("class", class.as_deref()));
                for child in &fence.children {
                    match child {
                        Node::Code(text) => self.out.push_str(&escape_text(text)),
                        other => self.node(other),
                    }
                }
                self.close("code");
                self.close("pre");
                self.newline();
            }
            Node::HtmlBlock(children) => self.nodes(children),
            Node::Rule => {
                self.open(ElementTag::new("hr").self_closing());
                self.newline();
            }
            Node::Text(text) => self.out.push_str(&escape_text(text)),
            Node::Code(code) => {
                self.open(ElementTag::new("code"));
                self.out.push_str(&escape_text(code));
                self.close("code");
            }
            Node::Emphasis(children) => self.wrapped("em", children),
            Node::Strong(children) => self.wrapped("strong", children),
            Node::SoftBreak => self.newline(),
            Node::HardBreak => {
                self.open(ElementTag::new("br").self_closing());
                self.newline();
            }
            Node::Image(image) => self.image(image),
            Node::Link(link) => self.link(link),
            Node::Html(html) => self.out.push_str(html),
            Node::Embed(embed) => self.embed(embed),
            Node::AttachmentLink(link) => self.attachment_link(link),
            Node::Macro(structured) => self.structured_macro(structured),
        }
    }

    fn list(&mut self, start: Option<u64>, items: &[Node]) {
        let name = if start.is_some() { "ol" } else { "ul" };
        let start_attr = start.filter(|s| *s != 1).map(|s| s.to_string());
        self.open(ElementTag::new(name).attr_opt("start", start_attr.as_deref()));
        self.newline();
        self.nodes(items);
        self.close(name);
        self.newline();
    }

    fn table(&mut self, table: &Table) {
        let outer = self.table.replace((table.alignments.clone(), false));

        self.open(ElementTag::new("table"));
        self.newline();

        let (head, body): (Vec<&Node>, Vec<&Node>) = table
            .children
            .iter()
            .partition(|child| matches!(child, Node::TableHead(_)));
        for child in head {
            self.node(child);
        }
        if !body.is_empty() {
            self.open(ElementTag::new("tbody"));
            self.newline();
            for child in body {
                self.node(child);
            }
            self.close("tbody");
            self.newline();
        }

        self.close("table");
        self.newline();
        self.table = outer;
    }

    fn row(&mut self, cells: &[Node]) {
        self.open(ElementTag::new("tr"));
        for (column, cell) in cells.iter().enumerate() {
            match cell {
                Node::TableCell(children) => self.cell(column, children),
                other => self.node(other),
            }
        }
        self.close("tr");
        self.newline();
    }

    fn cell(&mut self, column: usize, children: &[Node]) {
        let (alignment, in_head) = match &self.table {
            Some((alignments, in_head)) => (
                alignments.get(column).copied().unwrap_or(Alignment::None),
                *in_head,
            ),
            None => (Alignment::None, false),
        };
        let name = if in_head { "th" } else { "td" };
        let style = match alignment {
            Alignment::None => None,
            Alignment::Left => Some("text-align: left"),
            Alignment::Center => Some("text-align: center"),
            Alignment::Right => Some("text-align: right"),
        };
        self.open(ElementTag::new(name).attr_opt("style", style));
        self.nodes(children);
        self.close(name);
    }

    fn image(&mut self, image: &Image) {
        self.open(
            ElementTag::new("img")
                .attr("src", &image.target)
                .attr_opt("alt", image.alt.as_deref())
                .attr_opt("title", image.title.as_deref())
                .self_closing(),
        );
    }

    fn link(&mut self, link: &Link) {
        self.open(
            ElementTag::new("a")
                .attr("href", &link.target)
                .attr_opt("title", link.title.as_deref()),
        );
        self.nodes(&link.children);
        self.close("a");
    }

    fn attachment(&mut self, filename: &str) {
        self.open(
            ElementTag::new("ri:attachment")
                .attr("ri:filename", filename)
                .self_closing(),
        );
    }

    fn embed(&mut self, embed: &Embed) {
        self.open(
            ElementTag::new("ac:image")
                .attr_opt("ac:alt", embed.alt.as_deref())
                .attr_opt("ac:title", embed.title.as_deref()),
        );
        self.attachment(&embed.filename);
        self.close("ac:image");
    }

    fn attachment_link(&mut self, link: &AttachmentLink) {
        self.open(ElementTag::new("ac:link"));
        self.attachment(&link.filename);
        if !link.body.is_empty() {
            self.wrapped("ac:link-body", &link.body);
        }
        self.close("ac:link");
    }

    fn structured_macro(&mut self, structured: &Macro) {
        self.open(ElementTag::new("ac:structured-macro").attr("ac:name", &structured.name));
        for (key, value) in &structured.parameters {
            self.open(ElementTag::new("ac:parameter").attr("ac:name", key));
            self.out.push_str(&escape_text(value));
            self.close("ac:parameter");
        }
        match &structured.body {
            MacroBody::Empty => {}
            MacroBody::PlainText(text) => {
                self.open(ElementTag::new("ac:plain-text-body"));
                self.out.push_str(&cdata(text));
                self.close("ac:plain-text-body");
            }
            MacroBody::RichText(children) => self.wrapped("ac:rich-text-body", children),
        }
        self.close("ac:structured-macro");
        self.newline();
    }
}

fn heading_tag(level: u8) -> &'static str {
    match level {
        1 => "h1",
        2 => "h2",
        3 => "h3",
        4 => "h4",
        5 => "h5",
        _ => "h6",
    }
}

/// Wrap text in CDATA; `]]>` inside the text is split across sections.
pub fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attribute(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}
