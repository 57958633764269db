//! End-to-end scenarios across the window subsystem and GPU resources

mod lifecycle;
