//! In-memory documents for unit tests

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, StringFormat};

pub(crate) fn pdf_string(s: &str) -> Object {
    Object::String(s.as_bytes().to_vec(), StringFormat::Literal)
}

/// Document with `count` empty US-Letter pages
pub(crate) fn blank_document(count: usize) -> (Document, Vec<ObjectId>) {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let page_ids: Vec<ObjectId> = (0..count)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            })
        })
        .collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    (doc, page_ids)
}

/// Single-page document whose page carries `annots`
pub(crate) fn document_with_annots(annots: Vec<Object>) -> (Document, ObjectId) {
    let (mut doc, pages) = blank_document(1);
    let page_id = pages[0];
    if let Ok(page) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
        page.set("Annots", annots);
    }
    (doc, page_id)
}

pub(crate) fn text_widget(name: &str, rect: [i64; 4]) -> Dictionary {
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => pdf_string(name),
        "Rect" => rect.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
    }
}

pub(crate) fn link_annotation() -> Dictionary {
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
    }
}

/// Serialize a document the way an upload would arrive
pub(crate) fn to_bytes(doc: &mut Document) -> Vec<u8> {
    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}
