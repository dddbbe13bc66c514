//! Programs shipped with the kernel, runnable by name through
//! [`programs::demo_registry`].

pub mod programs;
