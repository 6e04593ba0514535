//! Field pairing across host form markups
//!
//! Each host form plugin wraps the address input differently, so the
//! suggestion panel and the hidden place-id input are located by searching
//! progressively wider scopes around the field. When structure gives no
//! answer, the geometrically nearest candidate wins.
//!
//! The page is modelled as a small element arena so the heuristics can be
//! exercised without a browser.

/// Marker class of address inputs
pub const FIELD_CLASS: &str = "address-autocomplete-field";
/// Marker class of suggestion panels
pub const SUGGESTIONS_CLASS: &str = "address-autocomplete-suggestions";
/// Marker class of hidden place-id inputs
pub const PLACE_ID_CLASS: &str = "address-autocomplete-place-id";
/// Wrapper emitted around the field by the form-tag integration
pub const WRAPPER_CLASS: &str = "address-autocomplete-wrapper";

const WPFORMS_WRAPPER_CLASS: &str = "wpforms-field";
const GRAVITY_WRAPPER_CLASS: &str = "gfield";

/// Page coordinates of an element's top-left corner
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub top: f64,
    pub left: f64,
}

impl Position {
    pub const fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }

    /// Manhattan distance to `other`
    pub fn distance(&self, other: &Self) -> f64 {
        (self.top - other.top).abs() + (self.left - other.left).abs()
    }
}

/// Pick the candidate nearest to `reference` by Manhattan distance
///
/// Ties keep the earliest candidate. Candidates whose distance is not a
/// number are skipped. Returns `None` when nothing qualifies.
pub fn nearest<T>(
    candidates: impl IntoIterator<Item = (T, Position)>,
    reference: Position,
) -> Option<T> {
    let mut best: Option<(T, f64)> = None;
    for (candidate, position) in candidates {
        let distance = position.distance(&reference);
        if distance.is_nan() {
            continue;
        }
        if best.as_ref().is_none_or(|(_, min)| distance < *min) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Handle to an element in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// An element with the attributes the pairing heuristics look at
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub name: Option<String>,
    /// Rendered position; `None` for elements without layout
    pub position: Option<Position>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn at(mut self, top: f64, left: f64) -> Self {
        self.position = Some(Position::new(top, left));
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

#[derive(Debug, Clone)]
struct Node {
    element: Element,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Element tree in document order
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `element` as the last child of `parent` (or as a root)
    pub fn append(&mut self, parent: Option<NodeId>, element: Element) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            element,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    /// Element behind `id`
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to another document.
    pub fn element(&self, id: NodeId) -> &Element {
        &self.nodes[id.0].element
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// First of `id` and its ancestors that matches
    pub fn closest(&self, id: NodeId, matches: impl Fn(&Element) -> bool) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if matches(self.element(node)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Descendants of `id` that match, in document order
    pub fn find(&self, id: NodeId, matches: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if matches(self.element(node)) {
                found.push(node);
            }
            stack.extend(self.nodes[node.0].children.iter().rev());
        }
        found
    }

    /// The element right after `id` under the same parent
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = &self.nodes[self.parent(id)?.0].children;
        let index = siblings.iter().position(|&s| s == id)?;
        siblings.get(index + 1).copied()
    }

    /// Every element that matches, in document order
    pub fn select_all(&self, matches: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        let roots = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(i, _)| NodeId(i));

        let mut found = Vec::new();
        for root in roots {
            if matches(self.element(root)) {
                found.push(root);
            }
            found.extend(self.find(root, &matches));
        }
        found
    }

    fn next_matching(&self, id: NodeId, matches: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.next_sibling(id).filter(|&next| matches(self.element(next)))
    }

    fn positioned(&self, ids: Vec<NodeId>) -> impl Iterator<Item = (NodeId, Position)> + '_ {
        ids.into_iter()
            .filter_map(|id| self.element(id).position.map(|p| (id, p)))
    }
}

fn is_suggestions(e: &Element) -> bool {
    e.has_class(SUGGESTIONS_CLASS)
}

fn is_field(e: &Element) -> bool {
    e.has_class(FIELD_CLASS)
}

fn is_enclosing_block(e: &Element) -> bool {
    e.is("label") || e.is("p") || (e.is("div") && e.has_class("field-wrapper"))
}

/// Locate the suggestion panel belonging to `field`
///
/// Looks inside the field's wrapper, then inside the enclosing label or
/// paragraph, then right after that enclosing element, then right after the
/// wrapper, and finally takes the panel nearest to the field on the page.
pub fn suggestions_panel(doc: &Document, field: NodeId) -> Option<NodeId> {
    let wrapper = doc.closest(field, |e| {
        e.has_class(WRAPPER_CLASS) || e.has_class(WPFORMS_WRAPPER_CLASS)
    });
    if let Some(found) = wrapper.and_then(|w| doc.find(w, is_suggestions).first().copied()) {
        return Some(found);
    }

    if let Some(block) = doc.closest(field, is_enclosing_block) {
        if let Some(found) = doc.find(block, is_suggestions).first().copied() {
            return Some(found);
        }
        if let Some(found) = doc.next_matching(block, is_suggestions) {
            return Some(found);
        }
    }

    if let Some(found) = wrapper.and_then(|w| doc.next_matching(w, is_suggestions)) {
        return Some(found);
    }

    let reference = doc.element(field).position?;
    nearest(doc.positioned(doc.select_all(is_suggestions)), reference)
}

/// Locate the hidden input that receives the selected place id
///
/// The paired input is named `<field name>_place_id`. Looks for any place-id
/// input inside the wrapper, then for the named one inside or right after
/// the enclosing label or paragraph, then for the named input anywhere in
/// the form.
pub fn place_id_field(doc: &Document, field: NodeId) -> Option<NodeId> {
    let wrapper = doc.closest(field, |e| {
        e.has_class(WRAPPER_CLASS)
            || e.has_class(WPFORMS_WRAPPER_CLASS)
            || e.has_class(GRAVITY_WRAPPER_CLASS)
    });
    if let Some(found) = wrapper.and_then(|w| doc.find(w, |e| e.has_class(PLACE_ID_CLASS)).first().copied()) {
        return Some(found);
    }

    let name = format!("{}_place_id", doc.element(field).name.as_deref()?);
    let is_named_place_id = |e: &Element| e.has_class(PLACE_ID_CLASS) && e.has_name(&name);

    if let Some(block) = doc.closest(field, is_enclosing_block) {
        if let Some(found) = doc.find(block, is_named_place_id).first().copied() {
            return Some(found);
        }
        if let Some(found) = doc.next_matching(block, is_named_place_id) {
            return Some(found);
        }
    }

    let form = doc.closest(field, |e| e.is("form"))?;
    doc.find(form, |e| e.is("input") && e.has_name(&name))
        .first()
        .copied()
}

/// Locate the field a suggestion panel belongs to
///
/// Uses the field inside the panel's wrapper, label or paragraph; otherwise
/// the field vertically closest to the panel.
pub fn owning_field(doc: &Document, suggestion: NodeId) -> Option<NodeId> {
    let container = doc.closest(suggestion, |e| {
        e.has_class(WRAPPER_CLASS)
            || e.has_class(WPFORMS_WRAPPER_CLASS)
            || e.has_class(GRAVITY_WRAPPER_CLASS)
            || e.is("label")
            || e.is("p")
    });
    if let Some(found) = container.and_then(|c| doc.find(c, is_field).first().copied()) {
        return Some(found);
    }

    let reference = doc.element(suggestion).position?;
    let fields = doc
        .positioned(doc.select_all(is_field))
        .map(|(id, p)| (id, Position::new(p.top, 0.0)));
    nearest(fields, Position::new(reference.top, 0.0))
}
