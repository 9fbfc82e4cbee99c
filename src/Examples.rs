/// Sod shock tube and a reacting periodic box driven by an outer step controller
pub mod reacting_flow_examples;
