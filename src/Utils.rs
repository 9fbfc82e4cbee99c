/// terminal logger set-up for the binary and the examples
pub mod logging;
