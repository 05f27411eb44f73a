//! Owned document tree shared by every conversion stage.
//!
//! The parser produces a [`Document`], each stage takes it by value or by
//! `&mut`, and the storage serializer consumes it at the end. Nothing here is
//! shared between conversions.

use pulldown_cmark::Alignment;

/// Root of a parsed document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }
}

/// A block or inline element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Heading { level: u8, children: Vec<Node> },
    Paragraph(Vec<Node>),
    BlockQuote(Vec<Node>),
    /// `start` is `Some` for ordered lists.
    List { start: Option<u64>, items: Vec<Node> },
    ListItem(Vec<Node>),
    Table(Table),
    /// Header row of a table; holds [`Node::TableCell`]s.
    TableHead(Vec<Node>),
    TableRow(Vec<Node>),
    TableCell(Vec<Node>),
    /// `<pre><code>` region. The canonical shape holds exactly one
    /// [`Node::Code`] child.
    CodeFence(CodeFence),
    /// Raw HTML block wrapper; children are raw fragments and lifted nodes.
    HtmlBlock(Vec<Node>),
    Rule,

    Text(String),
    /// Literal code text: an inline code span, or the body of a code fence.
    Code(String),
    Emphasis(Vec<Node>),
    Strong(Vec<Node>),
    SoftBreak,
    HardBreak,
    Image(Image),
    Link(Link),
    /// Raw markup copied verbatim to the output.
    Html(String),

    /// Confluence `ac:image` pointing at a page attachment.
    Embed(Embed),
    /// Confluence `ac:link` pointing at a page attachment.
    AttachmentLink(AttachmentLink),
    /// Confluence `ac:structured-macro`.
    Macro(Macro),
}

impl Node {
    /// Child nodes, for container kinds.
    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Heading { children, .. } => Some(children),
            Node::Paragraph(c)
            | Node::BlockQuote(c)
            | Node::ListItem(c)
            | Node::HtmlBlock(c)
            | Node::TableHead(c)
            | Node::TableRow(c)
            | Node::TableCell(c)
            | Node::Emphasis(c)
            | Node::Strong(c) => Some(c),
            Node::List { items, .. } => Some(items),
            Node::Table(table) => Some(&table.children),
            Node::CodeFence(fence) => Some(&fence.children),
            Node::Link(link) => Some(&link.children),
            Node::AttachmentLink(link) => Some(&link.body),
            Node::Macro(Macro {
                body: MacroBody::RichText(children),
                ..
            }) => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Heading { children, .. } => Some(children),
            Node::Paragraph(c)
            | Node::BlockQuote(c)
            | Node::ListItem(c)
            | Node::HtmlBlock(c)
            | Node::TableHead(c)
            | Node::TableRow(c)
            | Node::TableCell(c)
            | Node::Emphasis(c)
            | Node::Strong(c) => Some(c),
            Node::List { items, .. } => Some(items),
            Node::Table(table) => Some(&mut table.children),
            Node::CodeFence(fence) => Some(&mut fence.children),
            Node::Link(link) => Some(&mut link.children),
            Node::AttachmentLink(link) => Some(&mut link.body),
            Node::Macro(Macro {
                body: MacroBody::RichText(children),
                ..
            }) => Some(children),
            _ => None,
        }
    }

    /// Concatenated text content, ignoring markup.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain_text(&mut out);
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match self {
            Node::Text(text) | Node::Code(text) => out.push_str(text),
            Node::SoftBreak | Node::HardBreak => out.push(' '),
            Node::Embed(embed) => {
                if let Some(alt) = &embed.alt {
                    out.push_str(alt);
                }
            }
            Node::Image(image) => {
                if let Some(alt) = &image.alt {
                    out.push_str(alt);
                }
            }
            other => {
                if let Some(children) = other.children() {
                    for child in children {
                        child.push_plain_text(out);
                    }
                }
            }
        }
    }
}

/// Concatenated text content of a node slice.
pub fn plain_text(nodes: &[Node]) -> String {
    nodes.iter().map(Node::plain_text).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column alignments, indexed by cell position.
    pub alignments: Vec<Alignment>,
    /// One optional [`Node::TableHead`] followed by [`Node::TableRow`]s.
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeFence {
    /// Info string of a fenced block; `None` for indented code.
    pub info: Option<String>,
    pub children: Vec<Node>,
}

impl CodeFence {
    /// The code text, if the fence has the canonical single-child shape.
    pub fn canonical_text(&self) -> Option<&str> {
        match self.children.as_slice() {
            [Node::Code(text)] => Some(text),
            _ => None,
        }
    }

    /// First word of the info string.
    pub fn language(&self) -> Option<&str> {
        self.info
            .as_deref()
            .and_then(|info| info.split_whitespace().next())
            .filter(|lang| !lang.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub target: String,
    pub alt: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub target: String,
    pub title: Option<String>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub filename: String,
    pub alt: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentLink {
    pub filename: String,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    pub name: String,
    pub parameters: Vec<(String, String)>,
    pub body: MacroBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MacroBody {
    Empty,
    /// Emitted as CDATA, never escaped.
    PlainText(String),
    RichText(Vec<Node>),
}
