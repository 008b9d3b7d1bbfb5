/// Element property reconciler tests
use crate::test_support::*;
use crate::{normalize_input_value, DeferredValue, Edit, Frame, PatchError};
use arbor_dom::{Dom, MemoryDom, Namespace, NodeId};

fn option(value: &str, label: &str) -> Vec<Frame> {
    vec![
        Frame::element("option", 3),
        Frame::attribute("value", value),
        Frame::text(label),
    ]
}

fn select_frames(leading: Vec<Frame>, options: &[(&str, &str)]) -> Vec<Frame> {
    let mut children = leading;
    for (value, label) in options {
        children.extend(option(value, label));
    }
    let mut frames = vec![Frame::element("select", children.len() + 1)];
    frames.extend(children);
    frames
}

fn first_child(renderer: &TestRenderer, root: NodeId) -> NodeId {
    renderer.dom().children(root)[0]
}

fn selected_values(renderer: &TestRenderer, select: NodeId) -> Vec<String> {
    renderer
        .dom()
        .children(select)
        .into_iter()
        .filter(|option| renderer.dom().selected(*option))
        .filter_map(|option| renderer.dom().value(option))
        .collect()
}

#[test]
fn test_select_value_waits_for_matching_option() {
    let frames = select_frames(
        vec![Frame::attribute("value", "b")],
        &[("a", "A"), ("b", "B"), ("c", "C")],
    );
    assert_eq!(frames[0].subtree_length(), 11);

    let (renderer, root) = render(&frames);
    let select = first_child(&renderer, root);

    assert_eq!(renderer.dom().value(select).as_deref(), Some("b"));
    assert_eq!(selected_values(&renderer, select), vec!["b"]);
    assert_eq!(renderer.pending_value(select), None);
}

#[test]
fn test_select_value_resolved_by_later_option() {
    let frames = select_frames(vec![Frame::attribute("value", "z")], &[("a", "A")]);
    let (mut renderer, root) = render(&frames);
    let select = first_child(&renderer, root);

    assert_eq!(renderer.dom().value(select), None);
    assert_eq!(
        renderer.pending_value(select),
        Some(&DeferredValue::Scalar(Some("z".to_string())))
    );

    renderer
        .update_component(
            ROOT,
            &[Edit::step_in(0), Edit::prepend(1, 0), Edit::StepOut],
            &option("z", "Z"),
        )
        .unwrap();

    assert_eq!(renderer.dom().value(select).as_deref(), Some("z"));
    assert_eq!(renderer.pending_value(select), None);
}

#[test]
fn test_multiple_select_marks_each_listed_option() {
    let frames = select_frames(
        vec![
            Frame::attribute("multiple", ""),
            Frame::attribute("value", r#"["a","c"]"#),
        ],
        &[("a", "A"), ("b", "B"), ("c", "C")],
    );
    let (mut renderer, root) = render(&frames);
    let select = first_child(&renderer, root);

    assert_eq!(selected_values(&renderer, select), vec!["a", "c"]);
    // Settled once the select and its options are in place
    assert_eq!(renderer.pending_value(select), None);

    renderer
        .update_component(
            ROOT,
            &[Edit::step_in(0), Edit::prepend(3, 0), Edit::StepOut],
            &option("c", "C2"),
        )
        .unwrap();
    assert_eq!(selected_values(&renderer, select), vec!["a", "c"]);
}

#[test]
fn test_multiple_select_update_waits_for_new_options() {
    let frames = select_frames(
        vec![
            Frame::attribute("multiple", ""),
            Frame::attribute("value", r#"["a"]"#),
        ],
        &[("a", "A"), ("b", "B")],
    );
    let (mut renderer, root) = render(&frames);
    let select = first_child(&renderer, root);

    let mut frames = vec![Frame::attribute("value", r#"["b","d"]"#)];
    frames.extend(option("d", "D"));
    renderer
        .update_component(
            ROOT,
            &[Edit::set_attribute(0, 0), Edit::step_in(0), Edit::prepend(2, 1), Edit::StepOut],
            &frames,
        )
        .unwrap();

    assert_eq!(selected_values(&renderer, select), vec!["b", "d"]);
    assert_eq!(
        renderer.pending_value(select),
        Some(&DeferredValue::Multiple(vec!["b".to_string(), "d".to_string()]))
    );
}

#[test]
fn test_multiple_select_rejects_non_array_value() {
    let (mut renderer, _root) = renderer_with_root();
    let frames = select_frames(
        vec![Frame::attribute("multiple", ""), Frame::attribute("value", "a,c")],
        &[("a", "A")],
    );

    let result = renderer.update_component(ROOT, &[Edit::prepend(0, 0)], &frames);
    assert!(matches!(result, Err(PatchError::InvalidSelection(_))));
}

#[test]
fn test_option_value_update_resolves_select() {
    let frames = select_frames(vec![Frame::attribute("value", "b")], &[("a", "A"), ("x", "B")]);
    let (mut renderer, root) = render(&frames);
    let select = first_child(&renderer, root);
    assert!(renderer.pending_value(select).is_some());

    renderer
        .update_component(
            ROOT,
            &[Edit::step_in(0), Edit::set_attribute(1, 0), Edit::StepOut],
            &[Frame::attribute("value", "b")],
        )
        .unwrap();

    assert_eq!(renderer.dom().value(select).as_deref(), Some("b"));
    assert_eq!(renderer.pending_value(select), None);
}

#[test]
fn test_options_from_markup_resolve_select() {
    let (renderer, root) = render(&[
        Frame::element("select", 3),
        Frame::attribute("value", "b"),
        Frame::markup("<option>a</option><option>b</option>"),
    ]);
    let select = first_child(&renderer, root);

    assert_eq!(renderer.dom().value(select).as_deref(), Some("b"));
    assert_eq!(renderer.pending_value(select), None);
}

#[test]
fn test_select_pending_value_forgotten_on_removal() {
    let frames = select_frames(vec![Frame::attribute("value", "q")], &[]);
    let (mut renderer, root) = render(&frames);
    let select = first_child(&renderer, root);
    assert!(renderer.pending_value(select).is_some());

    renderer.update_component(ROOT, &[Edit::remove(0)], &[]).unwrap();

    assert_eq!(renderer.pending_value(select), None);
}

#[test]
fn test_normalize_time_values() {
    let mut dom = MemoryDom::new();
    let time = dom.create_element("input", Namespace::Html);
    dom.set_attribute(time, "type", "time");

    assert_eq!(normalize_input_value(&dom, time, "14:30:00"), "14:30");
    assert_eq!(normalize_input_value(&dom, time, "14:30:15"), "14:30");
    assert_eq!(normalize_input_value(&dom, time, "14:30"), "14:30");

    dom.set_attribute(time, "step", "1");
    assert_eq!(normalize_input_value(&dom, time, "14:30:15"), "14:30:15");
    assert_eq!(normalize_input_value(&dom, time, "14:30:00"), "14:30");
}

#[test]
fn test_normalize_datetime_local_and_other_types() {
    let mut dom = MemoryDom::new();
    let local = dom.create_element("input", Namespace::Html);
    dom.set_attribute(local, "type", "datetime-local");
    let text = dom.create_element("input", Namespace::Html);
    dom.set_attribute(text, "type", "text");

    assert_eq!(normalize_input_value(&dom, local, "2024-01-02T14:30:00"), "2024-01-02T14:30");
    assert_eq!(normalize_input_value(&dom, text, "14:30:00"), "14:30:00");
}

#[test]
fn test_time_input_value_is_normalized() {
    let (renderer, root) = render(&[
        Frame::element("input", 3),
        Frame::attribute("type", "time"),
        Frame::attribute("value", "09:15:00"),
    ]);
    let input = first_child(&renderer, root);

    assert_eq!(renderer.dom().value(input).as_deref(), Some("09:15"));
    assert_eq!(html(&renderer, root), "<input type=\"time\">");
}

#[test]
fn test_range_value_reapplied_after_bounds() {
    let (mut renderer, root) = render(&[
        Frame::element("input", 4),
        Frame::attribute("type", "range"),
        Frame::attribute("value", "150"),
        Frame::attribute("max", "200"),
    ]);
    let input = first_child(&renderer, root);

    assert_eq!(renderer.dom().value(input).as_deref(), Some("150"));
    assert_eq!(renderer.pending_value(input), None);

    renderer
        .update_component(ROOT, &[Edit::set_attribute(0, 0)], &[Frame::attribute("value", "250")])
        .unwrap();
    assert_eq!(renderer.dom().value(input).as_deref(), Some("200"));
    assert_eq!(renderer.pending_value(input), None);
}

#[test]
fn test_textarea_value_is_a_property() {
    let (renderer, root) = render(&[Frame::element("textarea", 2), Frame::attribute("value", "hi")]);
    let textarea = first_child(&renderer, root);

    assert_eq!(renderer.dom().value(textarea).as_deref(), Some("hi"));
    assert_eq!(html(&renderer, root), "<textarea></textarea>");
}

#[test]
fn test_checked_is_a_property_on_inputs() {
    let (mut renderer, root) = render(&[
        Frame::element("input", 3),
        Frame::attribute("type", "checkbox"),
        Frame::attribute("checked", ""),
    ]);
    let input = first_child(&renderer, root);

    assert!(renderer.dom().checked(input));
    assert_eq!(html(&renderer, root), "<input type=\"checkbox\">");

    renderer
        .update_component(ROOT, &[Edit::remove_attribute(0, "checked")], &[])
        .unwrap();
    assert!(!renderer.dom().checked(input));
}

#[test]
fn test_value_and_checked_on_other_elements_are_attributes() {
    let (renderer, root) = render(&[
        Frame::element("div", 3),
        Frame::attribute("checked", "x"),
        Frame::attribute("value", "v"),
    ]);
    let div = first_child(&renderer, root);

    assert!(!renderer.dom().checked(div));
    assert_eq!(html(&renderer, root), "<div checked=\"x\" value=\"v\"></div>");
}
