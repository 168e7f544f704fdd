use rand::Rng;
use tact_common::{next_id, AstId};
use tact_compiler::ast::{Module, ModuleItem};
use tracing::debug;

use super::contract::ContractGen;
use super::structs::{StructGen, StructKind};
use super::trait_decl::TraitGen;
use super::{Declare, Generative};
use crate::context::Session;
use crate::error::Result;
use crate::scope::ScopeItemKind;
use crate::stdlib::primitive_declarations;
use crate::types::{Type, UtilType};
use crate::util::random_element;

/// Fixed program shape. `None` counts are drawn from the configured ranges.
#[derive(Debug, Clone, Default)]
pub struct ProgramOptions {
    /// Prepend `primitive` declarations for the stdlib types.
    pub add_stdlib: bool,
    pub structs: Option<usize>,
    pub messages: Option<usize>,
    pub traits: Option<usize>,
}

/// Order in which root-scope categories become module items.
const HARVEST_ORDER: [ScopeItemKind; 6] = [
    ScopeItemKind::Struct,
    ScopeItemKind::Message,
    ScopeItemKind::ConstantDef,
    ScopeItemKind::FunctionDef,
    ScopeItemKind::Trait,
    ScopeItemKind::Contract,
];

/// A whole module: structs, messages and traits first, then a single
/// contract whose generation pulls in whatever top-level constants and
/// functions it needs.
pub struct ProgramGen {
    id: AstId,
    ty: Type,
    options: ProgramOptions,
}

impl ProgramGen {
    pub fn new(options: ProgramOptions) -> Self {
        Self {
            id: next_id(),
            ty: Type::Util(UtilType::Program),
            options,
        }
    }
}

impl Generative for ProgramGen {
    type Output = Module;

    fn id(&self) -> AstId {
        self.id
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn generate(&self, session: &mut Session) -> Result<Module> {
        let root = session.scopes.root();
        let limits = session.config.limits.clone();
        let structs = match self.options.structs {
            Some(n) => n,
            None => session.rng.gen_range(limits.structs),
        };
        let messages = match self.options.messages {
            Some(n) => n,
            None => session.rng.gen_range(limits.messages),
        };
        let traits = match self.options.traits {
            Some(n) => n,
            None => session.rng.gen_range(limits.traits),
        };
        debug!(structs, messages, traits, "program shape");

        for _ in 0..structs {
            StructGen::new(session, root, StructKind::Struct)?.declare(session)?;
        }
        for _ in 0..messages {
            StructGen::new(session, root, StructKind::Message)?.declare(session)?;
        }
        let mut trait_names = Vec::with_capacity(traits);
        for _ in 0..traits {
            let gen = TraitGen::new(session, root)?;
            gen.declare(session)?;
            trait_names.extend(gen.name().map(str::to_string));
        }
        let inherited = random_element(&mut session.rng, &trait_names).cloned();
        ContractGen::new(session, root, inherited)?.declare(session)?;

        let mut items: Vec<ModuleItem> = if self.options.add_stdlib {
            primitive_declarations()
        } else {
            Vec::new()
        };
        for kind in HARVEST_ORDER {
            items.extend(
                session
                    .scopes
                    .get_all(root, kind)
                    .into_iter()
                    .filter_map(|b| b.entity.to_module_item()),
            );
        }
        Ok(Module::new(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FuzzConfig;

    #[test]
    fn items_follow_harvest_order() {
        for seed in 0..10 {
            let mut session = Session::new(FuzzConfig::default(), seed);
            let module = ProgramGen::new(ProgramOptions {
                add_stdlib: true,
                ..ProgramOptions::default()
            })
            .generate(&mut session)
            .unwrap();
            let ranks: Vec<u8> = module.items.iter().map(|i| i.kind_rank()).collect();
            let mut sorted = ranks.clone();
            sorted.sort_unstable();
            assert_eq!(ranks, sorted);
            assert!(matches!(module.items[0], ModuleItem::PrimitiveType(_)));
            assert!(matches!(module.items.last(), Some(ModuleItem::Contract(_))));
        }
    }

    #[test]
    fn fixed_shape() {
        let mut session = Session::new(FuzzConfig::default(), 42);
        let module = ProgramGen::new(ProgramOptions {
            add_stdlib: false,
            structs: Some(2),
            messages: Some(0),
            traits: Some(1),
        })
        .generate(&mut session)
        .unwrap();
        let count = |f: fn(&ModuleItem) -> bool| module.items.iter().filter(|i| f(i)).count();
        assert_eq!(count(|i| matches!(i, ModuleItem::Struct(_))), 2);
        assert_eq!(count(|i| matches!(i, ModuleItem::Message(_))), 0);
        assert_eq!(count(|i| matches!(i, ModuleItem::Trait(_))), 1);
        assert_eq!(count(|i| matches!(i, ModuleItem::Contract(_))), 1);
        let Some(ModuleItem::Contract(c)) = module.items.last() else {
            panic!("expected the contract last");
        };
        assert_eq!(c.traits.len(), 1);
    }
}
