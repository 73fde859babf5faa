pub mod compositor;
pub mod frame;
pub mod quantize;
pub mod surface;
