//! Structural equality of AST nodes, ignoring node ids.

use super::hash::AstHasher;
use super::rename::AstRenamer;
use super::AstNode;
use crate::ast::*;

/// Deep structural comparator.
///
/// - `canonicalize`: modules are alpha-renamed with [`AstRenamer`] before
///   comparison, so consistently renamed programs compare equal.
/// - `sort`: module items, struct/message fields and trait/contract
///   declarations are compared as multisets.
#[derive(Debug, Clone, Copy, Default)]
pub struct AstComparator {
    pub sort: bool,
    pub canonicalize: bool,
}

impl AstComparator {
    pub fn new(sort: bool, canonicalize: bool) -> Self {
        Self { sort, canonicalize }
    }

    pub fn compare<'a>(&self, a: impl Into<AstNode<'a>>, b: impl Into<AstNode<'a>>) -> bool {
        match (a.into(), b.into()) {
            (AstNode::Module(a), AstNode::Module(b)) => {
                if self.canonicalize {
                    let renamer = AstRenamer::new();
                    let a = renamer.rename_module(a);
                    let b = renamer.rename_module(b);
                    self.module(&a, &b)
                } else {
                    self.module(a, b)
                }
            }
            (AstNode::Item(a), AstNode::Item(b)) => self.item(a, b),
            (AstNode::Declaration(a), AstNode::Declaration(b)) => self.declaration(a, b),
            (AstNode::Field(a), AstNode::Field(b)) => self.field(a, b),
            (AstNode::Statement(a), AstNode::Statement(b)) => self.statement(a, b),
            (AstNode::Expression(a), AstNode::Expression(b)) => self.expression(a, b),
            (AstNode::Type(a), AstNode::Type(b)) => type_ann(a, b),
            (AstNode::Id(a), AstNode::Id(b)) => id(a, b),
            _ => false,
        }
    }

    /// Pairwise comparison of two collections. With `sort`, the collections
    /// are compared as multisets: every element of `a` must consume a distinct
    /// equal element of `b`. Hashes ignore declaration names, so they only
    /// narrow the candidates and `eq` decides.
    fn collection<T>(
        &self,
        a: &[T],
        b: &[T],
        hash: impl Fn(&AstHasher, &T) -> String,
        eq: impl Fn(&T, &T) -> bool,
    ) -> bool {
        if a.len() != b.len() {
            return false;
        }
        if !self.sort {
            return a.iter().zip(b).all(|(x, y)| eq(x, y));
        }
        let hasher = AstHasher::new(true);
        let mut unmatched: Vec<(String, &T)> = b.iter().map(|y| (hash(&hasher, y), y)).collect();
        a.iter().all(|x| {
            let hx = hash(&hasher, x);
            match unmatched.iter().position(|(hy, y)| *hy == hx && eq(x, *y)) {
                Some(i) => {
                    unmatched.swap_remove(i);
                    true
                }
                None => false,
            }
        })
    }

    fn module(&self, a: &Module, b: &Module) -> bool {
        self.collection(
            &a.items,
            &b.items,
            |h, i| h.hash_item(i),
            |x, y| self.item(x, y),
        )
    }

    fn item(&self, a: &ModuleItem, b: &ModuleItem) -> bool {
        match (a, b) {
            (ModuleItem::PrimitiveType(a), ModuleItem::PrimitiveType(b)) => id(&a.name, &b.name),
            (ModuleItem::Struct(a), ModuleItem::Struct(b)) => {
                id(&a.name, &b.name) && self.fields(&a.fields, &b.fields)
            }
            (ModuleItem::Message(a), ModuleItem::Message(b)) => {
                id(&a.name, &b.name)
                    && opt(&a.opcode, &b.opcode, |x, y| self.expression(x, y))
                    && self.fields(&a.fields, &b.fields)
            }
            (ModuleItem::Constant(a), ModuleItem::Constant(b)) => self.constant_def(a, b),
            (ModuleItem::Function(a), ModuleItem::Function(b)) => self.function_def(a, b),
            (ModuleItem::Trait(a), ModuleItem::Trait(b)) => {
                id(&a.name, &b.name)
                    && ids(&a.traits, &b.traits)
                    && self.declarations(&a.declarations, &b.declarations)
            }
            (ModuleItem::Contract(a), ModuleItem::Contract(b)) => {
                id(&a.name, &b.name)
                    && ids(&a.traits, &b.traits)
                    && self.declarations(&a.declarations, &b.declarations)
            }
            _ => false,
        }
    }

    fn fields(&self, a: &[FieldDecl], b: &[FieldDecl]) -> bool {
        self.collection(a, b, |h, f| h.hash_field(f), |x, y| self.field(x, y))
    }

    fn field(&self, a: &FieldDecl, b: &FieldDecl) -> bool {
        id(&a.name, &b.name)
            && type_ann(&a.type_ann, &b.type_ann)
            && opt(&a.initializer, &b.initializer, |x, y| self.expression(x, y))
    }

    fn declarations(&self, a: &[Declaration], b: &[Declaration]) -> bool {
        self.collection(
            a,
            b,
            |h, d| h.hash_declaration(d),
            |x, y| self.declaration(x, y),
        )
    }

    fn declaration(&self, a: &Declaration, b: &Declaration) -> bool {
        match (a, b) {
            (Declaration::Field(a), Declaration::Field(b)) => self.field(a, b),
            (Declaration::ConstantDef(a), Declaration::ConstantDef(b)) => self.constant_def(a, b),
            (Declaration::ConstantDecl(a), Declaration::ConstantDecl(b)) => {
                a.attributes == b.attributes
                    && id(&a.name, &b.name)
                    && type_ann(&a.type_ann, &b.type_ann)
            }
            (Declaration::FunctionDef(a), Declaration::FunctionDef(b)) => self.function_def(a, b),
            (Declaration::FunctionDecl(a), Declaration::FunctionDecl(b)) => {
                a.attributes == b.attributes
                    && id(&a.name, &b.name)
                    && params(&a.params, &b.params)
                    && opt(&a.return_type, &b.return_type, type_ann)
            }
            (Declaration::Receiver(a), Declaration::Receiver(b)) => {
                receiver_kind(&a.selector, &b.selector)
                    && self.statements(&a.statements, &b.statements)
            }
            _ => false,
        }
    }

    fn constant_def(&self, a: &ConstantDef, b: &ConstantDef) -> bool {
        a.attributes == b.attributes
            && id(&a.name, &b.name)
            && type_ann(&a.type_ann, &b.type_ann)
            && self.expression(&a.initializer, &b.initializer)
    }

    fn function_def(&self, a: &FunctionDef, b: &FunctionDef) -> bool {
        a.attributes == b.attributes
            && id(&a.name, &b.name)
            && params(&a.params, &b.params)
            && opt(&a.return_type, &b.return_type, type_ann)
            && self.statements(&a.statements, &b.statements)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statements(&self, a: &[Statement], b: &[Statement]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.statement(x, y))
    }

    fn statement(&self, a: &Statement, b: &Statement) -> bool {
        match (a, b) {
            (Statement::Let(a), Statement::Let(b)) => {
                id(&a.name, &b.name)
                    && opt(&a.type_ann, &b.type_ann, type_ann)
                    && self.expression(&a.expression, &b.expression)
            }
            (Statement::Return(a), Statement::Return(b)) => {
                opt(&a.expression, &b.expression, |x, y| self.expression(x, y))
            }
            (Statement::Expression(a), Statement::Expression(b)) => {
                self.expression(&a.expression, &b.expression)
            }
            (Statement::Assign(a), Statement::Assign(b)) => {
                self.expression(&a.path, &b.path) && self.expression(&a.expression, &b.expression)
            }
            (Statement::AugmentedAssign(a), Statement::AugmentedAssign(b)) => {
                a.op == b.op
                    && self.expression(&a.path, &b.path)
                    && self.expression(&a.expression, &b.expression)
            }
            (Statement::Condition(a), Statement::Condition(b)) => {
                self.expression(&a.condition, &b.condition)
                    && self.statements(&a.true_statements, &b.true_statements)
                    && opt(&a.false_statements, &b.false_statements, |x, y| {
                        self.statements(x, y)
                    })
            }
            (Statement::While(a), Statement::While(b)) => {
                self.expression(&a.condition, &b.condition)
                    && self.statements(&a.statements, &b.statements)
            }
            (Statement::Until(a), Statement::Until(b)) => {
                self.expression(&a.condition, &b.condition)
                    && self.statements(&a.statements, &b.statements)
            }
            (Statement::Repeat(a), Statement::Repeat(b)) => {
                self.expression(&a.iterations, &b.iterations)
                    && self.statements(&a.statements, &b.statements)
            }
            (Statement::Try(a), Statement::Try(b)) => {
                self.statements(&a.statements, &b.statements)
                    && opt(&a.catch_block, &b.catch_block, |x, y| {
                        id(&x.name, &y.name) && self.statements(&x.statements, &y.statements)
                    })
            }
            (Statement::Foreach(a), Statement::Foreach(b)) => {
                id(&a.key_name, &b.key_name)
                    && id(&a.value_name, &b.value_name)
                    && self.expression(&a.map, &b.map)
                    && self.statements(&a.statements, &b.statements)
            }
            _ => false,
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expressions(&self, a: &[Expression], b: &[Expression]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.expression(x, y))
    }

    fn expression(&self, a: &Expression, b: &Expression) -> bool {
        use ExpressionKind as K;
        match (&a.kind, &b.kind) {
            (K::Number { value: x, .. }, K::Number { value: y, .. }) => x == y,
            (K::Boolean(x), K::Boolean(y)) => x == y,
            (K::String(x), K::String(y)) => x == y,
            (K::Null, K::Null) => true,
            (K::Id(x), K::Id(y)) => id(x, y),
            (
                K::OpBinary {
                    op: op_a,
                    left: la,
                    right: ra,
                },
                K::OpBinary {
                    op: op_b,
                    left: lb,
                    right: rb,
                },
            ) => op_a == op_b && self.expression(la, lb) && self.expression(ra, rb),
            (
                K::OpUnary {
                    op: op_a,
                    operand: xa,
                },
                K::OpUnary {
                    op: op_b,
                    operand: xb,
                },
            ) => op_a == op_b && self.expression(xa, xb),
            (
                K::Conditional {
                    condition: ca,
                    then_branch: ta,
                    else_branch: ea,
                },
                K::Conditional {
                    condition: cb,
                    then_branch: tb,
                    else_branch: eb,
                },
            ) => self.expression(ca, cb) && self.expression(ta, tb) && self.expression(ea, eb),
            (
                K::FieldAccess {
                    aggregate: xa,
                    field: fa,
                },
                K::FieldAccess {
                    aggregate: xb,
                    field: fb,
                },
            ) => id(fa, fb) && self.expression(xa, xb),
            (
                K::MethodCall {
                    receiver: ra,
                    method: ma,
                    args: aa,
                },
                K::MethodCall {
                    receiver: rb,
                    method: mb,
                    args: ab,
                },
            ) => id(ma, mb) && self.expression(ra, rb) && self.expressions(aa, ab),
            (
                K::StaticCall {
                    function: fa,
                    args: aa,
                },
                K::StaticCall {
                    function: fb,
                    args: ab,
                },
            ) => id(fa, fb) && self.expressions(aa, ab),
            (K::StructInstance { ty: ta, args: aa }, K::StructInstance { ty: tb, args: ab }) => {
                id(ta, tb)
                    && aa.len() == ab.len()
                    && aa.iter().zip(ab).all(|(x, y)| {
                        id(&x.field, &y.field) && self.expression(&x.initializer, &y.initializer)
                    })
            }
            _ => false,
        }
    }
}

fn id(a: &Id, b: &Id) -> bool {
    a.text == b.text
}

fn ids(a: &[Id], b: &[Id]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| id(x, y))
}

fn opt<T>(a: &Option<T>, b: &Option<T>, eq: impl Fn(&T, &T) -> bool) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => eq(x, y),
        (None, None) => true,
        _ => false,
    }
}

fn type_ann(a: &TypeAnnotation, b: &TypeAnnotation) -> bool {
    match (&a.kind, &b.kind) {
        (TypeKind::Named(x), TypeKind::Named(y)) => id(x, y),
        (TypeKind::Map { key: ka, value: va }, TypeKind::Map { key: kb, value: vb }) => {
            id(ka, kb) && id(va, vb)
        }
        (TypeKind::Bounced(x), TypeKind::Bounced(y)) => id(x, y),
        _ => false,
    }
}

fn params(a: &[TypedParameter], b: &[TypedParameter]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| id(&x.name, &y.name) && type_ann(&x.type_ann, &y.type_ann))
}

fn receiver_kind(a: &ReceiverKind, b: &ReceiverKind) -> bool {
    match (a, b) {
        (ReceiverKind::Internal(x), ReceiverKind::Internal(y))
        | (ReceiverKind::External(x), ReceiverKind::External(y)) => receiver_sub_kind(x, y),
        (
            ReceiverKind::Bounce {
                param: pa,
                type_ann: ta,
            },
            ReceiverKind::Bounce {
                param: pb,
                type_ann: tb,
            },
        ) => id(pa, pb) && type_ann(ta, tb),
        _ => false,
    }
}

fn receiver_sub_kind(a: &ReceiverSubKind, b: &ReceiverSubKind) -> bool {
    match (a, b) {
        (
            ReceiverSubKind::Simple {
                param: pa,
                type_ann: ta,
            },
            ReceiverSubKind::Simple {
                param: pb,
                type_ann: tb,
            },
        ) => id(pa, pb) && type_ann(ta, tb),
        (ReceiverSubKind::Fallback, ReceiverSubKind::Fallback) => true,
        (ReceiverSubKind::Comment(x), ReceiverSubKind::Comment(y)) => x == y,
        _ => false,
    }
}
