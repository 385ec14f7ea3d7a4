use lopdf::{Dictionary, Document, Object, Stream};
use pdf_pages::*;

/// Test PDF whose page `i` has content stream `Page i` (1-based)
fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");

    // Create page tree root ID
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));

    // Create pages array
    let mut kids = Vec::new();
    for i in 0..num_pages {
        let content = format!("Page {}", i + 1).into_bytes();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    // MediaBox and Resources are inherited from the page tree root
    let resources = Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
    )]);
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        ),
        ("Resources", Object::Dictionary(resources)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    // Create catalog
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

fn source(num_pages: usize) -> SourceDocument {
    SourceDocument::new("name.pdf", create_test_pdf(num_pages))
}

/// Content text of each page, e.g. `["Page 3", "Page 1"]`
fn page_labels(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_dictionary(id).unwrap();
            let content_id = page.get(b"Contents").unwrap().as_reference().unwrap();
            let stream = doc.get_object(content_id).unwrap().as_stream().unwrap();
            String::from_utf8(stream.content.clone()).unwrap()
        })
        .collect()
}

fn labels(pages: &[usize]) -> Vec<String> {
    pages.iter().map(|p| format!("Page {}", p + 1)).collect()
}

#[test]
fn test_single_output_in_sequence_order() {
    let source = source(4);
    let outputs = materialize_sync(&source, &[3, 0, 2], &SplitMarkers::new()).unwrap();

    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].name, "name.pdf");
    assert_eq!(outputs[0].page_count(), 3);
    assert_eq!(page_labels(&outputs[0].document), labels(&[3, 0, 2]));
}

#[test]
fn test_split_materialization() {
    let source = source(6);
    let markers: SplitMarkers = [1, 3].into_iter().collect();
    let outputs = materialize_sync(&source, &[0, 1, 2, 3, 4, 5], &markers).unwrap();

    assert_eq!(outputs.len(), 3);
    let names: Vec<&str> = outputs.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["name_part_1.pdf", "name_part_2.pdf", "name_part_3.pdf"]
    );
    assert_eq!(page_labels(&outputs[0].document), labels(&[0, 1]));
    assert_eq!(page_labels(&outputs[1].document), labels(&[2, 3]));
    assert_eq!(page_labels(&outputs[2].document), labels(&[4, 5]));
}

#[test]
fn test_trailing_marker_is_noop() {
    let source = source(3);
    let markers: SplitMarkers = [2].into_iter().collect();
    let outputs = materialize_sync(&source, &[0, 1, 2], &markers).unwrap();

    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].name, "name.pdf");
    assert_eq!(outputs[0].page_count(), 3);
}

#[test]
fn test_out_of_range_index_is_skipped() {
    let source = source(3);
    let outputs = materialize_sync(&source, &[0, 7, 2], &SplitMarkers::new()).unwrap();

    assert_eq!(outputs.len(), 1);
    assert_eq!(page_labels(&outputs[0].document), labels(&[0, 2]));
}

#[test]
fn test_empty_sequence_gives_empty_document() {
    let source = source(3);
    let outputs = materialize_sync(&source, &[], &SplitMarkers::new()).unwrap();

    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].page_count(), 0);

    // Still a valid PDF
    let bytes = outputs[0].to_bytes().unwrap();
    let reloaded = Document::load_mem(&bytes).unwrap();
    assert_eq!(reloaded.get_pages().len(), 0);
}

#[test]
fn test_source_is_not_mutated() {
    let mut bytes = Vec::new();
    create_test_pdf(4).save_to(&mut bytes).unwrap();
    let source = SourceDocument::from_bytes("name.pdf", &bytes).unwrap();

    let mut before = Vec::new();
    source.document().clone().save_to(&mut before).unwrap();

    let markers: SplitMarkers = [0].into_iter().collect();
    materialize_sync(&source, &[3, 3, 1, 0], &markers).unwrap();

    assert_eq!(source.page_count(), 4);
    let mut after = Vec::new();
    source.document().clone().save_to(&mut after).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_duplicated_pages_are_independent_objects() {
    let source = source(2);
    let sequence = transform(TransformMode::Duplicate, 2, "2").unwrap();
    let outputs = materialize_sync(&source, &sequence, &SplitMarkers::new()).unwrap();
    let doc = &outputs[0].document;

    let page_ids: Vec<_> = doc.get_pages().into_values().collect();
    assert_eq!(page_ids.len(), 4);
    assert_ne!(page_ids[0], page_ids[1]);
    assert_eq!(page_labels(doc), labels(&[0, 0, 1, 1]));
}

#[test]
fn test_inherited_attributes_are_copied() {
    let source = source(2);
    let outputs = materialize_sync(&source, &[1], &SplitMarkers::new()).unwrap();
    let doc = &outputs[0].document;

    let page_id = *doc.get_pages().values().next().unwrap();
    let page = doc.get_dictionary(page_id).unwrap();
    assert!(page.has(b"MediaBox"));

    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
    let font_id = fonts.get(b"F1").unwrap().as_reference().unwrap();
    let font = doc.get_dictionary(font_id).unwrap();
    assert_eq!(font.get(b"BaseFont").unwrap().as_name().unwrap(), b"Helvetica");

    // Parent points at the new page tree, not the source one
    let parent_id = page.get(b"Parent").unwrap().as_reference().unwrap();
    let parent = doc.get_dictionary(parent_id).unwrap();
    assert_eq!(parent.get(b"Count").unwrap().as_i64().unwrap(), 1);
}

#[test]
fn test_outputs_do_not_share_objects() {
    let source = source(4);
    let markers: SplitMarkers = [1].into_iter().collect();
    let mut outputs = materialize_sync(&source, &[0, 1, 0, 1], &markers).unwrap();

    // Editing one output leaves its sibling untouched
    let first_page = *outputs[0].document.get_pages().values().next().unwrap();
    outputs[0]
        .document
        .get_dictionary_mut(first_page)
        .unwrap()
        .set("Rotate", Object::Integer(90));

    let sibling_page = *outputs[1].document.get_pages().values().next().unwrap();
    let sibling = outputs[1].document.get_dictionary(sibling_page).unwrap();
    assert!(!sibling.has(b"Rotate"));
}

#[test]
fn test_corrupt_source_fails() {
    let result = SourceDocument::from_bytes("broken.pdf", b"not a pdf at all");
    assert!(matches!(result, Err(PageError::SourceCorrupt(_))));
}

/// Object id of the page at 0-based `index`
fn page_id(doc: &Document, index: usize) -> lopdf::ObjectId {
    doc.get_pages().into_values().nth(index).unwrap()
}

#[test]
fn test_undefined_reference_copies_as_null() {
    let mut doc = create_test_pdf(2);
    let first = page_id(&doc, 0);
    doc.get_dictionary_mut(first).unwrap().set(
        "Annots",
        Object::Array(vec![Object::Reference((999, 0))]),
    );
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    let source = SourceDocument::from_bytes("name.pdf", &bytes).unwrap();

    let outputs = materialize_sync(&source, &[1, 0], &SplitMarkers::new()).unwrap();
    let out = &outputs[0].document;
    assert_eq!(page_labels(out), labels(&[1, 0]));

    let page = out.get_dictionary(page_id(out, 1)).unwrap();
    let annots = page.get(b"Annots").unwrap().as_array().unwrap();
    let annot_id = annots[0].as_reference().unwrap();
    assert_eq!(out.objects.get(&annot_id), Some(&Object::Null));
}

#[test]
fn test_unreadable_object_fails_whole_call() {
    let mut doc = create_test_pdf(3);
    // An object that only refers to itself can never be resolved
    let looping = doc.new_object_id();
    doc.objects.insert(looping, Object::Reference(looping));
    let last = page_id(&doc, 2);
    doc.get_dictionary_mut(last)
        .unwrap()
        .set("Thumb", Object::Reference(looping));
    let source = SourceDocument::new("name.pdf", doc);

    let markers: SplitMarkers = [0].into_iter().collect();
    let result = materialize_sync(&source, &[0, 2], &markers);
    assert!(matches!(result, Err(PageError::SourceCorrupt(_))));
}

fn link_to(target: lopdf::ObjectId) -> Object {
    Object::Dictionary(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Annot".to_vec())),
        ("Subtype", Object::Name(b"Link".to_vec())),
        (
            "Dest",
            Object::Array(vec![Object::Reference(target), Object::Name(b"Fit".to_vec())]),
        ),
    ]))
}

#[test]
fn test_links_only_reach_pages_in_the_same_output() {
    let mut doc = create_test_pdf(3);
    let (first, second, third) = (page_id(&doc, 0), page_id(&doc, 1), page_id(&doc, 2));
    doc.get_dictionary_mut(first)
        .unwrap()
        .set("Annots", Object::Array(vec![link_to(second), link_to(third)]));
    let source = SourceDocument::new("name.pdf", doc);

    let outputs = materialize_sync(&source, &[0, 1], &SplitMarkers::new()).unwrap();
    let out = &outputs[0].document;

    let annots = out
        .get_dictionary(page_id(out, 0))
        .unwrap()
        .get(b"Annots")
        .unwrap()
        .as_array()
        .unwrap();
    let dest = |i: usize| {
        annots[i].as_dict().unwrap().get(b"Dest").unwrap().as_array().unwrap()[0].clone()
    };
    assert_eq!(dest(0), Object::Reference(page_id(out, 1)));
    assert_eq!(dest(1), Object::Null);

    // Page 3 and its content stream stay behind
    let has_page_three = out.objects.values().any(|obj| {
        obj.as_stream()
            .is_ok_and(|stream| stream.content == b"Page 3")
    });
    assert!(!has_page_three);
}

#[test]
fn test_widget_keeps_field_parent() {
    let mut doc = create_test_pdf(1);
    let field_id = doc.add_object(Dictionary::from_iter(vec![
        ("FT", Object::Name(b"Tx".to_vec())),
        ("T", Object::string_literal("email")),
    ]));
    let widget = Dictionary::from_iter(vec![
        ("Subtype", Object::Name(b"Widget".to_vec())),
        (
            "Rect",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(100),
                Object::Integer(20),
            ]),
        ),
        ("Parent", Object::Reference(field_id)),
    ]);
    let first = page_id(&doc, 0);
    doc.get_dictionary_mut(first)
        .unwrap()
        .set("Annots", Object::Array(vec![Object::Dictionary(widget)]));
    let source = SourceDocument::new("form.pdf", doc);

    let outputs = materialize_sync(&source, &[0], &SplitMarkers::new()).unwrap();
    let out = &outputs[0].document;
    let annots = out
        .get_dictionary(page_id(out, 0))
        .unwrap()
        .get(b"Annots")
        .unwrap()
        .as_array()
        .unwrap();
    let parent_id = annots[0]
        .as_dict()
        .unwrap()
        .get(b"Parent")
        .unwrap()
        .as_reference()
        .unwrap();
    let field = out.get_dictionary(parent_id).unwrap();
    assert_eq!(field.get(b"T").unwrap().as_str().unwrap(), b"email");
}

#[tokio::test]
async fn test_materialize_async() {
    let source = source(5);
    let sequence = rearrange(TransformMode::BookletSort, "", source.page_count()).unwrap();
    let outputs = materialize(&source, &sequence, &SplitMarkers::new())
        .await
        .unwrap();

    assert_eq!(outputs.len(), 1);
    assert_eq!(page_labels(&outputs[0].document), labels(&[0, 4, 1, 3, 2]));
}

#[tokio::test]
async fn test_load_and_save_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scan.pdf");
    let mut writer = Vec::new();
    create_test_pdf(4).save_to(&mut writer).unwrap();
    std::fs::write(&input, writer).unwrap();

    let source = load_source(&input).await.unwrap();
    assert_eq!(source.name(), "scan.pdf");
    assert_eq!(source.page_count(), 4);

    let markers = SplitMarkers::after_every_page(2);
    let outputs = materialize(&source, &[3, 2], &markers).await.unwrap();
    let out_dir = dir.path().join("out");
    let written = save_outputs(outputs, &out_dir).await.unwrap();

    assert_eq!(written.len(), 2);
    assert!(written[0].ends_with("scan_part_1.pdf"));
    assert!(written[1].ends_with("scan_part_2.pdf"));
    for path in &written {
        let loaded = Document::load(path).unwrap();
        assert_eq!(loaded.get_pages().len(), 1);
    }
}

#[tokio::test]
async fn test_save_refuses_to_overwrite_source() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scan.pdf");
    let mut writer = Vec::new();
    create_test_pdf(3).save_to(&mut writer).unwrap();
    std::fs::write(&input, writer).unwrap();

    let source = load_source(&input).await.unwrap();
    let sequence = rearrange(TransformMode::RemoveFirst, "", source.page_count()).unwrap();
    let outputs = materialize(&source, &sequence, &SplitMarkers::new())
        .await
        .unwrap();
    assert_eq!(outputs[0].name, "scan.pdf");

    match save_outputs(outputs.clone(), dir.path()).await {
        Err(PageError::Config(msg)) => assert!(msg.contains("scan.pdf")),
        other => panic!("Expected Config error, got {other:?}"),
    }

    // The input is untouched
    let reloaded = Document::load(&input).unwrap();
    assert_eq!(page_labels(&reloaded), labels(&[0, 1, 2]));

    // A different directory is fine
    let written = save_outputs(outputs, dir.path().join("out")).await.unwrap();
    let saved = Document::load(&written[0]).unwrap();
    assert_eq!(page_labels(&saved), labels(&[1, 2]));
}
