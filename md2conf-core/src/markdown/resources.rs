//! Rewriting of local image and link targets into attachment references.

use crate::attachments::{normalize_attachment_name, AttachmentMap, Inserted, NamingCollision};
use crate::tree::{AttachmentLink, Document, Embed, Node};
use regex::Regex;
use std::sync::OnceLock;

static SCHEME_REGEX: OnceLock<Regex> = OnceLock::new();

fn scheme_regex() -> &'static Regex {
    // RFC 3986 scheme followed by `:`
    SCHEME_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").unwrap())
}

/// Decides which resource targets live on the local file system.
///
/// Any target carrying a URL scheme (`https:`, `mailto:`, `data:`, ...) is
/// remote. `remote_prefixes` adds further prefixes, such as `//` or a
/// shared wiki path, that are remote without a scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locality {
    pub remote_prefixes: Vec<String>,
}

impl Default for Locality {
    fn default() -> Self {
        Self {
            remote_prefixes: default_remote_prefixes(),
        }
    }
}

pub fn default_remote_prefixes() -> Vec<String> {
    vec!["http://".to_string(), "https://".to_string()]
}

/// A local target split into the file path to upload and its attachment name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalResource<'t> {
    /// Target with any `?query` or `#fragment` removed.
    pub path: &'t str,
    pub name: &'t str,
}

impl Locality {
    pub fn new(remote_prefixes: Vec<String>) -> Self {
        Self { remote_prefixes }
    }

    pub fn is_local(&self, target: &str) -> bool {
        !scheme_regex().is_match(target)
            && !self
                .remote_prefixes
                .iter()
                .any(|prefix| target.starts_with(prefix.as_str()))
    }

    /// The local file a target refers to, or `None` if it should stay as is.
    ///
    /// Remote targets, empty targets, in-page anchors, and paths whose last
    /// segment is empty, `.` or `..` are not attachments.
    pub fn local_resource<'t>(&self, target: &'t str) -> Option<LocalResource<'t>> {
        if !self.is_local(target) {
            return None;
        }
        let path = target.split(['?', '#']).next().unwrap_or_default();
        let name = normalize_attachment_name(path);
        if matches!(name, "" | "." | "..") {
            return None;
        }
        Some(LocalResource { path, name })
    }
}

/// Replaces local images with `ac:image` embeds and local links with
/// `ac:link` attachment links.
pub struct ResourceRewriter<'a> {
    locality: &'a Locality,
}

impl<'a> ResourceRewriter<'a> {
    pub fn new(locality: &'a Locality) -> Self {
        Self { locality }
    }

    /// Rewrite the document and return the attachments it now references.
    ///
    /// Images go first so that an image inside a link body is already an
    /// embed when the body moves into the attachment link.
    pub fn rewrite(
        &self,
        mut document: Document,
    ) -> Result<(Document, AttachmentMap), NamingCollision> {
        let mut attachments = AttachmentMap::new();
        self.rewrite_images(&mut document.children, &mut attachments)?;
        self.rewrite_links(&mut document.children, &mut attachments)?;

        tracing::debug!(
            "Rewrote local resources into {} attachment(s)",
            attachments.len()
        );
        Ok((document, attachments))
    }

    fn rewrite_images(
        &self,
        nodes: &mut [Node],
        attachments: &mut AttachmentMap,
    ) -> Result<(), NamingCollision> {
        for node in nodes.iter_mut() {
            if let Node::Image(image) = node {
                if let Some(resource) = self.locality.local_resource(&image.target) {
                    record(attachments, resource)?;
                    let embed = Embed {
                        filename: resource.name.to_string(),
                        alt: image.alt.take(),
                        title: image.title.take(),
                    };
                    *node = Node::Embed(embed);
                }
                continue;
            }

            if let Some(children) = node.children_mut() {
                self.rewrite_images(children, attachments)?;
            }
        }
        Ok(())
    }

    fn rewrite_links(
        &self,
        nodes: &mut [Node],
        attachments: &mut AttachmentMap,
    ) -> Result<(), NamingCollision> {
        for node in nodes.iter_mut() {
            if let Node::Link(link) = node {
                if let Some(resource) = self.locality.local_resource(&link.target) {
                    record(attachments, resource)?;
                    let filename = resource.name.to_string();
                    let body = std::mem::take(&mut link.children);
                    *node = Node::AttachmentLink(AttachmentLink { filename, body });
                }
            }

            if let Some(children) = node.children_mut() {
                self.rewrite_links(children, attachments)?;
            }
        }
        Ok(())
    }
}

fn record(
    attachments: &mut AttachmentMap,
    resource: LocalResource<'_>,
) -> Result<(), NamingCollision> {
    if attachments.insert(resource.name, resource.path)? == Inserted::New {
        tracing::debug!("Attachment {} <- {}", resource.name, resource.path);
    }
    Ok(())
}

/// Rewrite local resources with the given locality rule.
pub fn rewrite_local_resources(
    document: Document,
    locality: &Locality,
) -> Result<(Document, AttachmentMap), NamingCollision> {
    ResourceRewriter::new(locality).rewrite(document)
}
