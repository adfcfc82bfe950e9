#![no_main]

use c4_core::ViewType;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let parsed = c4_parser::parse(input);
    for view_type in ViewType::ALL {
        let view = c4_layout::layout_view(&parsed.workspace, view_type);
        let ids: Vec<&str> = view.nodes.iter().map(|node| node.id.as_str()).collect();
        for edge in &view.edges {
            assert!(ids.contains(&edge.source.as_str()));
            assert!(ids.contains(&edge.target.as_str()));
        }
        for node in &view.nodes {
            assert!(node.x.is_finite() && node.y.is_finite());
        }
    }
});
