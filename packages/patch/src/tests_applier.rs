/// Edit-stream applier tests
use crate::test_support::*;
use crate::{Edit, Frame, PatchError, RootContent};
use arbor_dom::{Dom, MemoryDom, Namespace, NodeKind};
use arbor_markup::HtmlParser;

#[test]
fn test_insert_element_with_attributes_and_text() {
    let (renderer, root) = render(&[
        Frame::element("p", 3),
        Frame::attribute("class", "lead"),
        Frame::text("hello"),
    ]);

    assert_eq!(html(&renderer, root), "<p class=\"lead\">hello</p>");
}

#[test]
fn test_insert_element_with_only_attributes() {
    let (renderer, root) = render(&[Frame::element("input", 2), Frame::attribute("type", "text")]);
    assert_eq!(html(&renderer, root), "<input type=\"text\">");
}

#[test]
fn test_insert_nested_elements_skips_descendants() {
    let (renderer, root) = render(&[
        Frame::element("ul", 5),
        Frame::attribute("class", "list"),
        Frame::element("li", 2),
        Frame::text("one"),
        Frame::text("tail"),
    ]);

    assert_eq!(html(&renderer, root), "<ul class=\"list\"><li>one</li>tail</ul>");
}

#[test]
fn test_region_inserts_children_in_place() {
    let (mut renderer, root) = render(&[
        Frame::region(3),
        Frame::text("a"),
        Frame::text("b"),
        Frame::text("c"),
    ]);
    assert_eq!(html(&renderer, root), "ab");

    // The region added two logical children
    renderer
        .update_component(ROOT, &[Edit::prepend(2, 0)], &[Frame::text("c")])
        .unwrap();
    assert_eq!(html(&renderer, root), "abc");
    assert_eq!(renderer.tree().child_count(root), 3);
}

#[test]
fn test_named_event_frames_have_no_effect() {
    let (renderer, root) = render(&[
        Frame::region(3),
        Frame::named_event("submit", "save"),
        Frame::text("a"),
    ]);
    assert_eq!(html(&renderer, root), "a");
}

#[test]
fn test_child_component_renders_into_marker() {
    let (mut renderer, root) = render(&[Frame::component(7, 1)]);
    let marker = renderer.component_location(7).unwrap();
    assert_eq!(renderer.dom().kind(marker), NodeKind::Comment);

    renderer
        .update_component(7, &[Edit::prepend(0, 0)], &[Frame::text("child")])
        .unwrap();
    renderer
        .update_component(ROOT, &[Edit::prepend(1, 0)], &[Frame::text("after")])
        .unwrap();
    renderer
        .update_component(7, &[Edit::prepend(1, 0)], &[Frame::text("more")])
        .unwrap();

    assert_eq!(html(&renderer, root), "<!--!-->childmoreafter");
    assert_eq!(visible_html(&renderer, root), "childmoreafter");
}

#[test]
fn test_removing_component_marker_removes_its_output() {
    let (mut renderer, root) = render(&[Frame::component(7, 1)]);
    renderer
        .update_component(7, &[Edit::prepend(0, 0), Edit::prepend(1, 1)], &[Frame::text("x"), Frame::text("y")])
        .unwrap();

    renderer.update_component(ROOT, &[Edit::remove(0)], &[]).unwrap();

    assert_eq!(html(&renderer, root), "");
    assert_eq!(renderer.tree().len(), 1);
}

#[test]
fn test_step_in_and_out() {
    let (mut renderer, root) = render(&[Frame::element("div", 2), Frame::text("x")]);

    renderer
        .update_component(
            ROOT,
            &[Edit::step_in(0), Edit::prepend(1, 0), Edit::StepOut, Edit::prepend(1, 1)],
            &[Frame::text("y"), Frame::text("z")],
        )
        .unwrap();

    assert_eq!(html(&renderer, root), "<div>xy</div>z");
}

#[test]
fn test_step_out_restores_caller_child_index() {
    let (mut renderer, root) = render(&[
        Frame::region(3),
        Frame::text("a"),
        Frame::element("div", 1),
    ]);

    renderer
        .apply_edits(
            root,
            1,
            &[Edit::step_in(0), Edit::prepend(0, 0), Edit::StepOut, Edit::prepend(1, 1)],
            &[Frame::text("in"), Frame::text("end")],
        )
        .unwrap();

    assert_eq!(html(&renderer, root), "a<div>in</div>end");
}

#[test]
fn test_apply_edits_offsets_by_child_index() {
    let (mut renderer, root) = render(&[Frame::region(3), Frame::text("a"), Frame::text("b")]);

    renderer
        .apply_edits(root, 1, &[Edit::prepend(0, 0)], &[Frame::text("mid")])
        .unwrap();

    assert_eq!(html(&renderer, root), "amidb");
}

#[test]
fn test_step_out_at_top_level_is_mismatch() {
    let (mut renderer, _root) = renderer_with_root();
    let result = renderer.update_component(ROOT, &[Edit::StepOut], &[]);
    assert!(matches!(result, Err(PatchError::StructuralMismatch(_))));
}

#[test]
fn test_remove_frame() {
    let (mut renderer, root) = render(&[Frame::region(4), Frame::text("a"), Frame::text("b"), Frame::text("c")]);
    renderer.update_component(ROOT, &[Edit::remove(1)], &[]).unwrap();
    assert_eq!(html(&renderer, root), "ac");
}

#[test]
fn test_set_and_remove_attribute() {
    let (mut renderer, root) = render(&[Frame::element("a", 2), Frame::attribute("href", "/")]);

    renderer
        .update_component(
            ROOT,
            &[Edit::set_attribute(0, 0), Edit::remove_attribute(0, "href")],
            &[Frame::attribute("title", "t")],
        )
        .unwrap();

    assert_eq!(html(&renderer, root), "<a title=\"t\"></a>");
}

#[test]
fn test_set_attribute_on_text_is_mismatch() {
    let (mut renderer, root) = render(&[Frame::text("plain")]);
    let result = renderer.update_component(ROOT, &[Edit::set_attribute(0, 0)], &[Frame::attribute("id", "x")]);

    assert!(matches!(result, Err(PatchError::StructuralMismatch(_))));
    assert_eq!(html(&renderer, root), "plain");
}

#[test]
fn test_update_text() {
    let (mut renderer, root) = render(&[Frame::text("old")]);
    renderer
        .update_component(ROOT, &[Edit::update_text(0, 0)], &[Frame::text("new")])
        .unwrap();
    assert_eq!(html(&renderer, root), "new");
}

#[test]
fn test_update_text_on_element_leaves_tree_unchanged() {
    let (mut renderer, root) = render(&[Frame::element("span", 2), Frame::text("keep")]);
    let before = html(&renderer, root);
    let logical_nodes = renderer.tree().len();

    let result = renderer.update_component(ROOT, &[Edit::update_text(0, 0)], &[Frame::text("lost")]);

    assert!(matches!(result, Err(PatchError::StructuralMismatch(_))));
    assert_eq!(html(&renderer, root), before);
    assert_eq!(renderer.tree().len(), logical_nodes);
}

#[test]
fn test_insert_markup_block() {
    let (renderer, root) = render(&[Frame::markup("<b>bold</b> and <i>italic</i>")]);
    let marker = renderer.tree().child(root, 0).unwrap();

    assert_eq!(html(&renderer, root), "<!--!--><b>bold</b> and <i>italic</i>");
    assert_eq!(renderer.tree().child_count(marker), 3);
}

#[test]
fn test_update_markup_replaces_block() {
    let (mut renderer, root) = render(&[Frame::region(3), Frame::markup("<b>x</b>"), Frame::text("tail")]);

    renderer
        .update_component(ROOT, &[Edit::update_markup(0, 0)], &[Frame::markup("<i>y</i><i>z</i>")])
        .unwrap();

    assert_eq!(html(&renderer, root), "<!--!--><i>y</i><i>z</i>tail");
    assert_eq!(renderer.tree().child_count(root), 2);
}

#[test]
fn test_empty_markup_uses_placeholder() {
    let (renderer, root) = render(&[Frame::markup("")]);
    assert_eq!(html(&renderer, root), "<!--!--> ");
}

#[test]
fn test_malformed_markup_is_error() {
    let (mut renderer, _root) = renderer_with_root();
    let result = renderer.update_component(ROOT, &[Edit::prepend(0, 0)], &[Frame::markup("<!-- open")]);
    assert!(matches!(result, Err(PatchError::Markup(_))));
}

#[test]
fn test_svg_namespace_rules() {
    let (renderer, root) = render(&[
        Frame::element("svg", 4),
        Frame::element("circle", 1),
        Frame::element("foreignObject", 2),
        Frame::element("div", 1),
    ]);
    let dom = renderer.dom();
    let svg = dom.children(root)[0];
    let children = dom.children(svg);
    let div = dom.children(children[1])[0];

    assert_eq!(dom.namespace(svg), Some(Namespace::Svg));
    assert_eq!(dom.namespace(children[0]), Some(Namespace::Svg));
    assert_eq!(dom.namespace(children[1]), Some(Namespace::Svg));
    assert_eq!(dom.namespace(div), Some(Namespace::Html));
}

#[test]
fn test_markup_inside_svg_parses_as_svg() {
    let (renderer, root) = render(&[Frame::element("svg", 2), Frame::markup("<rect width=\"1\"/>")]);
    let dom = renderer.dom();
    let svg = dom.children(root)[0];
    let rect = dom.children(svg)[1];

    assert_eq!(dom.tag_name(rect), Some("rect"));
    assert_eq!(dom.namespace(rect), Some(Namespace::Svg));
}

#[test]
fn test_element_reference_capture() {
    let (renderer, root) = render(&[
        Frame::element("input", 3),
        Frame::attribute("type", "text"),
        Frame::reference_capture("ref-1"),
    ]);
    let input = renderer.dom().children(root)[0];

    assert_eq!(renderer.element_for_reference("ref-1"), Some(input));
    assert_eq!(renderer.element_for_reference("ref-2"), None);
    assert_eq!(html(&renderer, root), "<input type=\"text\">");
}

#[test]
fn test_element_reference_dropped_with_element() {
    let (mut renderer, _root) = render(&[
        Frame::region(4),
        Frame::element("input", 2),
        Frame::reference_capture("r1"),
        Frame::element("p", 2),
        Frame::reference_capture("r2"),
    ]);
    assert!(renderer.element_for_reference("r1").is_some());

    renderer.update_component(ROOT, &[Edit::remove(0)], &[]).unwrap();

    assert_eq!(renderer.element_for_reference("r1"), None);
    assert!(renderer.element_for_reference("r2").is_some());
}

#[test]
fn test_element_reference_dropped_with_component_content() {
    let (mut renderer, _root) = render(&[Frame::component(3, 1)]);
    renderer
        .update_component(
            3,
            &[Edit::prepend(0, 0)],
            &[
                Frame::element("div", 3),
                Frame::element("input", 2),
                Frame::reference_capture("nested"),
            ],
        )
        .unwrap();
    assert!(renderer.element_for_reference("nested").is_some());

    renderer.update_component(ROOT, &[Edit::remove(0)], &[]).unwrap();
    assert_eq!(renderer.element_for_reference("nested"), None);
}

#[test]
fn test_element_reference_dropped_on_root_detach() {
    let (mut renderer, _root) = render(&[Frame::element("input", 2), Frame::reference_capture("r1")]);

    renderer.detach_component(ROOT).unwrap();

    assert_eq!(renderer.element_for_reference("r1"), None);
}

#[test]
fn test_reference_capture_under_marker_is_mismatch() {
    let (mut renderer, _root) = render(&[Frame::component(5, 1)]);
    let result = renderer.update_component(5, &[Edit::prepend(0, 0)], &[Frame::reference_capture("r")]);
    assert!(matches!(result, Err(PatchError::StructuralMismatch(_))));
}

#[test]
fn test_misplaced_attribute_frame_is_mismatch() {
    let (mut renderer, _root) = renderer_with_root();
    let result = renderer.update_component(ROOT, &[Edit::prepend(0, 0)], &[Frame::attribute("id", "x")]);
    assert!(matches!(result, Err(PatchError::StructuralMismatch(_))));
}

#[test]
fn test_unknown_edit_and_frame_are_mismatches() {
    let (mut renderer, _root) = renderer_with_root();

    let result = renderer.update_component(ROOT, &[Edit::Unknown], &[]);
    assert!(matches!(result, Err(PatchError::StructuralMismatch(_))));

    let result = renderer.update_component(ROOT, &[Edit::prepend(0, 0)], &[Frame::Unknown]);
    assert!(matches!(result, Err(PatchError::StructuralMismatch(_))));
}

#[test]
fn test_frame_index_out_of_range_is_mismatch() {
    let (mut renderer, _root) = renderer_with_root();
    let result = renderer.update_component(ROOT, &[Edit::prepend(0, 3)], &[Frame::text("x")]);
    assert!(matches!(result, Err(PatchError::StructuralMismatch(_))));
}

#[test]
fn test_permutation_edits() {
    let (mut renderer, root) = render(&[Frame::region(4), Frame::text("a"), Frame::text("b"), Frame::text("c")]);

    renderer
        .update_component(
            ROOT,
            &[Edit::permutation(0, 2), Edit::permutation(2, 0), Edit::PermutationListEnd],
            &[],
        )
        .unwrap();

    assert_eq!(html(&renderer, root), "cba");
}

#[test]
fn test_permutation_inside_stepped_element() {
    let (mut renderer, root) = render(&[
        Frame::element("ul", 5),
        Frame::element("li", 2),
        Frame::text("1"),
        Frame::element("li", 2),
        Frame::text("2"),
    ]);

    renderer
        .update_component(
            ROOT,
            &[
                Edit::step_in(0),
                Edit::permutation(0, 1),
                Edit::permutation(1, 0),
                Edit::PermutationListEnd,
                Edit::StepOut,
            ],
            &[],
        )
        .unwrap();

    assert_eq!(html(&renderer, root), "<ul><li>2</li><li>1</li></ul>");
}

#[test]
fn test_unknown_component_is_error() {
    let (mut renderer, _root) = renderer_with_root();
    let result = renderer.update_component(42, &[], &[]);
    assert_eq!(result, Err(PatchError::UnknownComponent(42)));
}

#[test]
fn test_prerendered_content_is_replaced_on_first_render() {
    let mut dom = MemoryDom::new();
    let root = dom.create_element("div", Namespace::Html);
    let loading = dom.create_text("loading");
    dom.append_child(root, loading);

    let mut renderer = crate::Renderer::new(dom, HtmlParser);
    renderer.attach_root(ROOT, root).unwrap();
    assert_eq!(renderer.tree().children(root), &[loading]);

    renderer
        .update_component(ROOT, &[Edit::prepend(0, 0)], &[Frame::text("ready")])
        .unwrap();
    assert_eq!(html(&renderer, root), "ready");

    // Only the first render clears
    renderer
        .update_component(ROOT, &[Edit::prepend(1, 0)], &[Frame::text("!")])
        .unwrap();
    assert_eq!(html(&renderer, root), "ready!");
}

#[test]
fn test_append_mode_keeps_existing_content() {
    let mut dom = MemoryDom::new();
    let head = dom.create_element("head", Namespace::Html);
    let title = dom.create_element("title", Namespace::Html);
    dom.append_child(head, title);

    let mut renderer = crate::Renderer::new(dom, HtmlParser);
    renderer.attach_root_with(ROOT, head, RootContent::Append).unwrap();
    renderer
        .update_component(
            ROOT,
            &[Edit::prepend(0, 0)],
            &[Frame::element("meta", 2), Frame::attribute("charset", "utf-8")],
        )
        .unwrap();

    assert_eq!(html(&renderer, head), "<title></title><!--!--><meta charset=\"utf-8\">");

    renderer.detach_component(ROOT).unwrap();
    assert_eq!(html(&renderer, head), "<title></title><!--!-->");
}

#[test]
fn test_detach_root_component_empties_it() {
    let (mut renderer, root) = render(&[Frame::element("p", 2), Frame::text("bye")]);

    renderer.detach_component(ROOT).unwrap();

    assert_eq!(html(&renderer, root), "");
    assert_eq!(renderer.component_location(ROOT), None);
    // Unknown ids are ignored
    renderer.detach_component(99).unwrap();
}

#[test]
fn test_event_handler_attribute_binds_without_writing() {
    let (mut renderer, root) = render(&[
        Frame::element("button", 3),
        Frame::event_handler("onclick", 5),
        Frame::text("go"),
    ]);
    let button = renderer.dom().children(root)[0];

    assert_eq!(html(&renderer, root), "<button>go</button>");
    assert_eq!(renderer.handler_for(button, "click"), Some(5));
    assert_eq!(renderer.handler_element(5), Ok(button));

    assert!(renderer.release_event_handler(5));
    assert!(!renderer.release_event_handler(5));
    assert_eq!(renderer.handler_element(5), Err(PatchError::MissingHandlerBinding(5)));
}

#[test]
fn test_event_handler_replacement_through_set_attribute() {
    let (mut renderer, root) = render(&[Frame::element("button", 2), Frame::event_handler("onclick", 5)]);
    let button = renderer.dom().children(root)[0];

    renderer
        .update_component(ROOT, &[Edit::set_attribute(0, 0)], &[Frame::event_handler("onclick", 6)])
        .unwrap();

    assert_eq!(renderer.handler_for(button, "click"), Some(6));
    assert!(renderer.handler_element(5).is_err());
}

#[test]
fn test_event_handler_without_on_prefix_is_error() {
    let (mut renderer, _root) = renderer_with_root();
    let result = renderer.update_component(
        ROOT,
        &[Edit::prepend(0, 0)],
        &[Frame::element("button", 2), Frame::event_handler("click", 5)],
    );
    assert_eq!(result, Err(PatchError::InvalidEventName("click".to_string())));
}

#[test]
fn test_internal_attributes_drive_dispatch() {
    let (renderer, root) = render(&[
        Frame::element("div", 5),
        Frame::event_handler("onclick", 1),
        Frame::attribute("__internal_stopPropagation_onclick", ""),
        Frame::element("span", 2),
        Frame::attribute("__internal_preventDefault_onclick", ""),
    ]);
    let div = renderer.dom().children(root)[0];
    let span = renderer.dom().children(div)[0];

    assert_eq!(html(&renderer, root), "<div><span></span></div>");

    let plan = renderer.resolve_dispatch(span, "click");
    assert_eq!(plan.handlers, vec![1]);
    assert!(plan.prevent_default);
}

#[test]
fn test_removing_internal_attribute_clears_flag() {
    let (mut renderer, root) = render(&[
        Frame::element("div", 2),
        Frame::attribute("__internal_preventDefault_onsubmit", ""),
    ]);
    let div = renderer.dom().children(root)[0];
    assert!(renderer.event_bindings().prevents_default(div, "submit"));

    renderer
        .update_component(ROOT, &[Edit::remove_attribute(0, "__internal_preventDefault_onsubmit")], &[])
        .unwrap();
    assert!(!renderer.event_bindings().prevents_default(div, "submit"));
}

#[test]
fn test_unknown_internal_attribute_is_error() {
    let (mut renderer, _root) = renderer_with_root();
    let result = renderer.update_component(
        ROOT,
        &[Edit::prepend(0, 0)],
        &[Frame::element("div", 2), Frame::attribute("__internal_teleport", "")],
    );
    assert_eq!(result, Err(PatchError::InvalidReservedAttribute("teleport".to_string())));
}
