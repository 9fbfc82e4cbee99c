use ReactingFV::Examples::reacting_flow_examples::reacting_flow_examples;
use ReactingFV::Utils::logging::{init_logging, level_from_str};

pub fn main() {
    // 0 - Sod shock tube, 1 - reacting periodic box
    let task: usize = 1;
    let level = std::env::var("REACTINGFV_LOG").unwrap_or_else(|_| "info".to_string());
    init_logging(level_from_str(&level));
    reacting_flow_examples(task);
}
