//! Display names for native types.

const VALUE_MODULE: &str = concat!(env!("CARGO_CRATE_NAME"), "::cast::value::");

/// Display name of `T`. Value model types drop their module prefix; every
/// other type stays fully qualified.
pub fn type_label<T: ?Sized>() -> String {
	display_name_of(std::any::type_name::<T>())
}

/// Strip the value model prefix from a fully qualified type name, including
/// inside generic arguments.
pub fn display_name_of(name: &str) -> String {
	name.replace(VALUE_MODULE, "")
}
