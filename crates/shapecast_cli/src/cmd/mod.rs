/// Structural cast command.
pub mod cast;
/// Shape file inspection command.
pub mod shapes;
/// Shared loading and output helpers.
pub(crate) mod util;
