//! Small helpers over the lopdf object graph

use lopdf::{Dictionary, Document, Object, ObjectId};

use super::types::DEFAULT_PAGE_HEIGHT;

/// Parent chains deeper than this are treated as cyclic
pub(crate) const MAX_TREE_DEPTH: usize = 32;

/// Follow an indirect reference, returning the object itself otherwise
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Resolve an object to a dictionary, if it is one
pub(crate) fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    resolve(doc, obj).and_then(|o| o.as_dict().ok())
}

/// Look up `key` in `dict` and resolve it to a dictionary
pub(crate) fn dict_entry<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    dict.get(key).ok().and_then(|obj| resolve_dict(doc, obj))
}

/// Look up `key` in `dict` and resolve it to an array
pub(crate) fn array_entry<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Vec<Object>> {
    dict.get(key)
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_array().ok())
}

/// Numeric value of an integer or real object
pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(*f as f64),
        _ => None,
    }
}

/// Name object as text, without the leading delimiter
pub(crate) fn name_entry(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// Page height from the (possibly inherited) MediaBox
pub(crate) fn page_height(doc: &Document, page_id: ObjectId) -> f64 {
    media_box(doc, page_id)
        .map(|[_, lly, _, ury]| (ury - lly).abs())
        .filter(|h| *h > 0.0)
        .unwrap_or(DEFAULT_PAGE_HEIGHT)
}

fn media_box(doc: &Document, page_id: ObjectId) -> Option<[f64; 4]> {
    let mut node = doc.get_object(page_id).ok()?.as_dict().ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Some(values) = array_entry(doc, node, b"MediaBox") {
            return rect_values(doc, values);
        }
        node = dict_entry(doc, node, b"Parent")?;
    }
    None
}

/// Four numbers of a rectangle array
pub(crate) fn rect_values(doc: &Document, values: &[Object]) -> Option<[f64; 4]> {
    if values.len() != 4 {
        return None;
    }
    let mut out = [0.0; 4];
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = resolve(doc, value).and_then(number)?;
    }
    Some(out)
}

/// Object id of the document catalog
pub(crate) fn catalog_id(doc: &Document) -> lopdf::Result<ObjectId> {
    doc.trailer.get(b"Root").and_then(Object::as_reference)
}

/// Page object ids in document order
pub(crate) fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_page_height_inherited_from_pages_node() {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        assert_eq!(page_height(&doc, page_id), 842.0);
    }

    #[test]
    fn test_page_height_defaults_to_letter() {
        let mut doc = Document::with_version("1.7");
        let page_id = doc.add_object(dictionary! { "Type" => "Page" });
        assert_eq!(page_height(&doc, page_id), DEFAULT_PAGE_HEIGHT);
    }

    #[test]
    fn test_rect_values_rejects_short_arrays() {
        let doc = Document::with_version("1.7");
        assert!(rect_values(&doc, &[1.into(), 2.into()]).is_none());
        assert!(rect_values(&doc, &[1.into(), 2.into(), 3.into(), Object::Null]).is_none());
        assert_eq!(
            rect_values(&doc, &[1.into(), Object::Real(2.5), 3.into(), 4.into()]),
            Some([1.0, 2.5, 3.0, 4.0])
        );
    }
}
