//! Markdown → document tree.
//!
//! `pulldown-cmark` does the character-level work; its flat event stream is
//! folded into a [`Document`] with a stack of open containers. A `Start`
//! event pushes a container, content events append to the top of the stack,
//! and an `End` event pops the top and attaches it to its parent.
//!
//! Raw HTML `<a href>` tags open containers of their own. They have no
//! guaranteed `End`, so whenever a Markdown container closes over an open raw
//! link, the link is unwound back into plain markup. The grammar never
//! rejects input and neither does this builder.

use super::html::{split_raw_html, RawPiece};
use crate::tree::{self, CodeFence, Document, Image, Link, Node, Table};
use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

/// Parser options: CommonMark (fenced code included) plus tables.
pub fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options
}

/// Parse Markdown text into a document tree.
pub fn parse_document(source: &str) -> Document {
    parse_with_options(source, parser_options())
}

pub fn parse_with_options(source: &str, options: Options) -> Document {
    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(source, options) {
        builder.event(event);
    }
    builder.finish()
}

#[derive(Debug)]
enum Frame {
    Root,
    Heading(u8),
    Paragraph,
    BlockQuote,
    List(Option<u64>),
    Item,
    Table(Vec<Alignment>),
    TableHead,
    TableRow,
    TableCell,
    CodeBlock(Option<String>),
    HtmlBlock,
    Emphasis,
    Strong,
    Image {
        target: String,
        title: String,
    },
    Link {
        target: String,
        title: String,
    },
    RawLink {
        tag: String,
        target: String,
        title: Option<String>,
    },
    /// Constructs without a node of their own; children are spliced into the
    /// parent when the frame closes.
    Transparent,
}

#[derive(Debug)]
struct Open {
    frame: Frame,
    children: Vec<Node>,
}

struct TreeBuilder {
    stack: Vec<Open>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Open {
                frame: Frame::Root,
                children: Vec::new(),
            }],
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(end) => self.end(end),
            Event::Text(text) => self.text(text),
            Event::Code(code) => self.push(Node::Code(code.into_string())),
            Event::Html(html) | Event::InlineHtml(html) => self.raw_html(&html),
            Event::SoftBreak => self.push(Node::SoftBreak),
            Event::HardBreak => self.push(Node::HardBreak),
            Event::Rule => self.push(Node::Rule),
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.push(Node::Text(math.into_string()))
            }
            Event::FootnoteReference(label) => self.push(Node::Text(format!("[^{label}]"))),
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push(Node::Text(marker.to_string()))
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph,
            Tag::Heading { level, .. } => Frame::Heading(level as u8),
            Tag::BlockQuote(_) => Frame::BlockQuote,
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                Frame::CodeBlock(Some(info.into_string()).filter(|info| !info.is_empty()))
            }
            Tag::CodeBlock(CodeBlockKind::Indented) => Frame::CodeBlock(None),
            Tag::HtmlBlock => Frame::HtmlBlock,
            Tag::List(start) => Frame::List(start),
            Tag::Item => Frame::Item,
            Tag::Table(alignments) => Frame::Table(alignments),
            Tag::TableHead => Frame::TableHead,
            Tag::TableRow => Frame::TableRow,
            Tag::TableCell => Frame::TableCell,
            Tag::Emphasis => Frame::Emphasis,
            Tag::Strong => Frame::Strong,
            Tag::Image {
                dest_url, title, ..
            } => Frame::Image {
                target: dest_url.into_string(),
                title: title.into_string(),
            },
            Tag::Link {
                dest_url, title, ..
            } => Frame::Link {
                target: dest_url.into_string(),
                title: title.into_string(),
            },
            _ => Frame::Transparent,
        };
        self.open(frame);
    }

    fn end(&mut self, _end: TagEnd) {
        // Raw links cannot span a Markdown container boundary.
        while matches!(self.top().frame, Frame::RawLink { .. }) {
            self.unwind_raw_link();
        }
        self.close();
    }

    fn text(&mut self, text: CowStr<'_>) {
        if matches!(self.top().frame, Frame::CodeBlock(_)) {
            let children = &mut self.top_mut().children;
            match children.last_mut() {
                Some(Node::Code(code)) => code.push_str(&text),
                _ => children.push(Node::Code(text.into_string())),
            }
            return;
        }
        self.push(Node::Text(text.into_string()));
    }

    fn raw_html(&mut self, fragment: &str) {
        for piece in split_raw_html(fragment) {
            match piece {
                RawPiece::Html(html) => self.push(Node::Html(html.to_string())),
                RawPiece::Image(image) => self.push(Node::Image(image)),
                RawPiece::OpenLink { tag, target, title } => self.open(Frame::RawLink {
                    tag: tag.to_string(),
                    target,
                    title,
                }),
                RawPiece::CloseLink(tag) => {
                    if matches!(self.top().frame, Frame::RawLink { .. }) {
                        self.close();
                    } else {
                        tracing::debug!("Unmatched {} kept as raw HTML", tag);
                        self.push(Node::Html(tag.to_string()));
                    }
                }
            }
        }
    }

    fn top(&self) -> &Open {
        // The root frame is never popped before `finish`.
        &self.stack[self.stack.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Open {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn open(&mut self, frame: Frame) {
        self.stack.push(Open {
            frame,
            children: Vec::new(),
        });
    }

    /// Append a node to the current container, merging adjacent text.
    fn push(&mut self, node: Node) {
        let children = &mut self.top_mut().children;
        if let (Some(Node::Text(previous)), Node::Text(text)) = (children.last_mut(), &node) {
            previous.push_str(text);
            return;
        }
        children.push(node);
    }

    fn push_all(&mut self, nodes: Vec<Node>) {
        for node in nodes {
            self.push(node);
        }
    }

    /// Pop the top container and attach it to its parent.
    fn close(&mut self) {
        if self.stack.len() <= 1 {
            tracing::warn!("Ignoring end event with no open container");
            return;
        }
        let Some(open) = self.stack.pop() else {
            return;
        };
        let children = open.children;

        let node = match open.frame {
            Frame::Root => unreachable!("root frame is never closed"),
            Frame::Heading(level) => Node::Heading { level, children },
            Frame::Paragraph => Node::Paragraph(children),
            Frame::BlockQuote => Node::BlockQuote(children),
            Frame::List(start) => Node::List {
                start,
                items: children,
            },
            Frame::Item => Node::ListItem(children),
            Frame::Table(alignments) => Node::Table(Table {
                alignments,
                children,
            }),
            Frame::TableHead => Node::TableHead(children),
            Frame::TableRow => Node::TableRow(children),
            Frame::TableCell => Node::TableCell(children),
            Frame::CodeBlock(info) => {
                let children = if children.is_empty() {
                    vec![Node::Code(String::new())]
                } else {
                    children
                };
                Node::CodeFence(CodeFence { info, children })
            }
            Frame::HtmlBlock => Node::HtmlBlock(children),
            Frame::Emphasis => Node::Emphasis(children),
            Frame::Strong => Node::Strong(children),
            Frame::Image { target, title } => {
                let alt = tree::plain_text(&children);
                Node::Image(Image {
                    target,
                    alt: Some(alt).filter(|alt| !alt.is_empty()),
                    title: Some(title).filter(|title| !title.is_empty()),
                })
            }
            Frame::Link { target, title } => Node::Link(Link {
                target,
                title: Some(title).filter(|title| !title.is_empty()),
                children,
            }),
            Frame::RawLink { target, title, .. } => Node::Link(Link {
                target,
                title,
                children,
            }),
            Frame::Transparent => {
                self.push_all(children);
                return;
            }
        };

        self.push(node);
    }

    /// Turn an unclosed raw `<a>` back into verbatim markup.
    fn unwind_raw_link(&mut self) {
        let Some(open) = self.stack.pop() else {
            return;
        };
        if let Frame::RawLink { tag, .. } = open.frame {
            tracing::debug!("Unclosed {} kept as raw HTML", tag);
            self.push(Node::Html(tag));
        }
        self.push_all(open.children);
    }

    fn finish(mut self) -> Document {
        while self.stack.len() > 1 {
            if matches!(self.top().frame, Frame::RawLink { .. }) {
                self.unwind_raw_link();
            } else {
                self.close();
            }
        }

        let root = self.stack.pop().map(|open| open.children).unwrap_or_default();
        Document::new(root)
    }
}
