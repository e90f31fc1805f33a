pub mod books;
pub mod genres;
pub mod users;

use bookshelf_kernel::ModuleRegistry;

/// Register the core and application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry) {
    registry.register_core(bookshelf_authz::create_module());

    registry.register_custom(books::create_module());
    registry.register_custom(genres::create_module());
    registry.register_custom(users::create_module());
}
