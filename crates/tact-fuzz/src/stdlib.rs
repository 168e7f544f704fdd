use tact_common::next_id;
use tact_compiler::ast::{Id, ModuleItem, PrimitiveTypeDecl};

use crate::types::StdlibType;

/// `primitive` declarations for every stdlib type, in a fixed order.
pub fn primitive_declarations() -> Vec<ModuleItem> {
    StdlibType::ALL
        .iter()
        .map(|t| {
            ModuleItem::PrimitiveType(PrimitiveTypeDecl {
                id: next_id(),
                name: Id::new(t.name()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tact_compiler::ast::Module;
    use tact_compiler::format::format_module;
    use tact_compiler::semantic::check_module;

    #[test]
    fn primitives_print_and_check() {
        let module = Module::new(primitive_declarations());
        let text = format_module(&module);
        assert!(text.starts_with("primitive Int;\n"));
        assert_eq!(module.items.len(), StdlibType::ALL.len());
        assert!(!check_module(&module).has_errors());
    }
}
