use arbor_dom::{inner_html, Dom, MemoryDom, Namespace, NodeId};
use arbor_markup::HtmlParser;
use arbor_patch::{RenderBatch, Renderer};

pub type TestRenderer = Renderer<MemoryDom, HtmlParser>;

/// Route renderer logs to the test harness; repeated calls are fine
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

pub fn renderer_with_root(component_id: u32) -> (TestRenderer, NodeId) {
    init_tracing();
    let mut dom = MemoryDom::new();
    let root = dom.create_element("main", Namespace::Html);
    let mut renderer = Renderer::new(dom, HtmlParser);
    renderer
        .attach_root(component_id, root)
        .expect("root element is fresh");
    (renderer, root)
}

pub fn apply_json(renderer: &mut TestRenderer, json: &str) {
    let batch = RenderBatch::from_json(json).expect("batch JSON parses");
    renderer.apply_batch(&batch).expect("batch applies");
}

pub fn html(renderer: &TestRenderer, node: NodeId) -> String {
    inner_html(renderer.dom(), node)
}

pub fn child(renderer: &TestRenderer, node: NodeId, index: usize) -> NodeId {
    renderer.dom().children(node)[index]
}
