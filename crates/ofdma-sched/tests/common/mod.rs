mod sched_test;

pub use sched_test::*;
