//! Small traversal helpers over a parsed markup tree.

use scraper::ElementRef;

/// Collect every element below `root` (including `root`) that satisfies
/// `predicate`, in document order.
pub fn find_descendants<'a, P>(root: ElementRef<'a>, mut predicate: P) -> Vec<ElementRef<'a>>
where
    P: FnMut(&ElementRef<'a>) -> bool,
{
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| predicate(element))
        .collect()
}

/// The first element below `root` (including `root`) that satisfies
/// `predicate`.
pub fn find_first<'a, P>(root: ElementRef<'a>, mut predicate: P) -> Option<ElementRef<'a>>
where
    P: FnMut(&ElementRef<'a>) -> bool,
{
    root.descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| predicate(element))
}

/// Direct element children of `parent` with tag `name`.
pub fn child_elements<'a>(parent: ElementRef<'a>, name: &str) -> Vec<ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|element| is_tag(element, name))
        .collect()
}

/// Whether `element` has tag `name`. Tag names are lowercased by the parser.
#[must_use]
pub fn is_tag(element: &ElementRef<'_>, name: &str) -> bool {
    element.value().name() == name
}

/// Whether `element` carries `class` in its class list.
#[must_use]
pub fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|candidate| candidate == class)
}

/// Text nodes directly under `element`, concatenated as they appear.
#[must_use]
pub fn raw_text(element: &ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect()
}

/// Text nodes directly under `element`, concatenated and trimmed.
///
/// Text inside nested elements is ignored. Returns `None` when nothing but
/// whitespace remains.
#[must_use]
pub fn own_text(element: &ElementRef<'_>) -> Option<String> {
    let text = raw_text(element);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
