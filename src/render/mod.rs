pub(crate) mod cpu;
pub(crate) mod lines;
pub(crate) mod renderer;
pub(crate) mod surface;
