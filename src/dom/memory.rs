//! Plain-text document model with literal substring marking.

use super::{ConcealStyle, Document, MarkOptions, Selector, UnmarkOptions};
use crate::error::DomError;
use crate::types::ElementId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// A mark element as currently present in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkNode {
    pub id: ElementId,
    pub tag: String,
    pub class_name: String,
    pub text: String,
    pub data: BTreeMap<String, String>,
    pub style: Option<ConcealStyle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Mark(MarkNode),
}

#[derive(Debug)]
struct Body {
    segments: Vec<Segment>,
    next_id: u64,
}

#[derive(Debug)]
pub struct MemoryDocument {
    body: Mutex<Body>,
}

impl MemoryDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            body: Mutex::new(Body {
                segments: vec![Segment::Text(text.into())],
                next_id: 1,
            }),
        }
    }

    pub fn segments(&self) -> Vec<Segment> {
        self.body.lock().segments.clone()
    }

    pub fn marks(&self) -> Vec<MarkNode> {
        self.body
            .lock()
            .segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Mark(mark) => Some(mark.clone()),
                Segment::Text(_) => None,
            })
            .collect()
    }

    /// Full page text, marks included
    pub fn text(&self) -> String {
        self.body
            .lock()
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.as_str(),
                Segment::Mark(mark) => mark.text.as_str(),
            })
            .collect()
    }

    /// Remove a mark element from the page without unwrapping it, as a script on the page might.
    pub fn detach(&self, element: ElementId) -> bool {
        let mut body = self.body.lock();
        let before = body.segments.len();
        body.segments
            .retain(|segment| !matches!(segment, Segment::Mark(mark) if mark.id == element));
        before != body.segments.len()
    }

    fn with_mark<T>(
        &self,
        element: ElementId,
        f: impl FnOnce(&mut MarkNode) -> T,
    ) -> Result<T, DomError> {
        let mut body = self.body.lock();
        body.segments
            .iter_mut()
            .find_map(|segment| match segment {
                Segment::Mark(mark) if mark.id == element => Some(mark),
                _ => None,
            })
            .map(f)
            .ok_or(DomError::ElementNotFound(element))
    }
}

fn merge_text(segments: Vec<Segment>) -> Vec<Segment> {
    let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            Segment::Text(text) if text.is_empty() => {}
            Segment::Text(text) => {
                if let Some(Segment::Text(prev)) = merged.last_mut() {
                    prev.push_str(&text);
                } else {
                    merged.push(Segment::Text(text));
                }
            }
            mark => merged.push(mark),
        }
    }
    merged
}

#[async_trait]
impl Document for MemoryDocument {
    async fn mark(&self, text: &str, options: &MarkOptions) -> Result<Vec<ElementId>, DomError> {
        if text.trim().is_empty() {
            return Err(DomError::InvalidText("blank search text".to_string()));
        }

        let mut body = self.body.lock();
        let segments = std::mem::take(&mut body.segments);
        let mut next = Vec::with_capacity(segments.len());
        let mut created = Vec::new();

        for segment in segments {
            let plain = match segment {
                Segment::Text(plain) => plain,
                mark => {
                    next.push(mark);
                    continue;
                }
            };

            let mut cursor = 0;
            for (start, found) in plain.match_indices(text) {
                next.push(Segment::Text(plain[cursor..start].to_string()));
                let id = ElementId(body.next_id);
                body.next_id += 1;
                next.push(Segment::Mark(MarkNode {
                    id,
                    tag: options.element.clone(),
                    class_name: options.class_name.clone(),
                    text: found.to_string(),
                    data: BTreeMap::new(),
                    style: None,
                }));
                created.push(id);
                cursor = start + found.len();
            }
            next.push(Segment::Text(plain[cursor..].to_string()));
        }

        body.segments = merge_text(next);
        Ok(created)
    }

    async fn unmark(&self, options: &UnmarkOptions) -> Result<Vec<ElementId>, DomError> {
        // Unmarking walks the tree asynchronously in the browser.
        tokio::task::yield_now().await;

        let excludes: Vec<Selector> = options
            .exclude
            .iter()
            .filter_map(|raw| Selector::parse(raw))
            .collect();

        let mut body = self.body.lock();
        let segments = std::mem::take(&mut body.segments);
        let mut removed = Vec::new();
        let next = segments
            .into_iter()
            .map(|segment| match segment {
                Segment::Mark(mark) if !excludes.iter().any(|s| s.matches(&mark.data)) => {
                    removed.push(mark.id);
                    Segment::Text(mark.text)
                }
                other => other,
            })
            .collect();

        body.segments = merge_text(next);
        Ok(removed)
    }

    fn set_data(&self, element: ElementId, key: &str, value: &str) -> Result<(), DomError> {
        self.with_mark(element, |mark| {
            mark.data.insert(key.to_string(), value.to_string());
        })
    }

    fn data(&self, element: ElementId, key: &str) -> Option<String> {
        self.with_mark(element, |mark| mark.data.get(key).cloned())
            .ok()
            .flatten()
    }

    fn apply_style(&self, element: ElementId, style: &ConcealStyle) -> Result<(), DomError> {
        self.with_mark(element, |mark| mark.style = Some(style.clone()))
    }
}
