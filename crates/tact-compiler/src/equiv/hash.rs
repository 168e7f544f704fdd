//! Content hashing of AST nodes.
//!
//! Every node is serialized as its kind tag, its semantic scalar fields and
//! the hashes of its children, then digested with SHA-256. Node ids never
//! take part. The names a declaration introduces are replaced by its kind,
//! so `const A: Int = 1 + 1;` and `const B: Int = 1 + 1;` hash identically.
//! The same holds for local bindings (parameters, `let`, loop and catch
//! variables). Identifiers used as references hash their text.

use sha2::{Digest, Sha256};

use super::AstNode;
use crate::ast::*;

/// Lowercase hex SHA-256 digest.
pub type AstHash = String;

/// Incremental serialization of one node.
struct NodeHash {
    hasher: Sha256,
}

impl NodeHash {
    fn new(kind: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(kind.as_bytes());
        Self { hasher }
    }

    /// Feed one length-prefixed scalar so adjacent fields cannot run together.
    fn field(mut self, value: &str) -> Self {
        self.hasher.update((value.len() as u64).to_le_bytes());
        self.hasher.update(value.as_bytes());
        self
    }

    fn child(self, hash: &str) -> Self {
        self.field(hash)
    }

    fn children(mut self, hashes: &[AstHash]) -> Self {
        self = self.field(&hashes.len().to_string());
        for h in hashes {
            self = self.child(h);
        }
        self
    }

    fn finish(self) -> AstHash {
        format!("{:x}", self.hasher.finalize())
    }
}

/// Computes [`AstHash`]es.
///
/// With `sort` set, the orderable collections (module items, struct and
/// message fields, trait and contract declarations) are hashed as sorted
/// multisets. Statement sequences always keep their order.
#[derive(Debug, Clone, Copy, Default)]
pub struct AstHasher {
    pub sort: bool,
}

impl AstHasher {
    pub fn new(sort: bool) -> Self {
        Self { sort }
    }

    pub fn hash<'a>(&self, node: impl Into<AstNode<'a>>) -> AstHash {
        match node.into() {
            AstNode::Module(m) => self.hash_module(m),
            AstNode::Item(i) => self.hash_item(i),
            AstNode::Declaration(d) => self.hash_declaration(d),
            AstNode::Field(f) => self.hash_field(f),
            AstNode::Statement(s) => self.hash_statement(s),
            AstNode::Expression(e) => self.hash_expression(e),
            AstNode::Type(t) => self.hash_type(t),
            AstNode::Id(id) => self.hash_id(id),
        }
    }

    fn ordered(&self, mut hashes: Vec<AstHash>) -> Vec<AstHash> {
        if self.sort {
            hashes.sort();
        }
        hashes
    }

    pub fn hash_module(&self, module: &Module) -> AstHash {
        let items = self.ordered(module.items.iter().map(|i| self.hash_item(i)).collect());
        NodeHash::new("module").children(&items).finish()
    }

    pub fn hash_item(&self, item: &ModuleItem) -> AstHash {
        match item {
            // Primitive names are the type itself, not a binding.
            ModuleItem::PrimitiveType(p) => NodeHash::new("primitive").field(&p.name.text).finish(),
            ModuleItem::Struct(s) => NodeHash::new("struct")
                .children(&self.struct_fields(&s.fields))
                .finish(),
            ModuleItem::Message(m) => {
                let opcode = m
                    .opcode
                    .as_ref()
                    .map(|e| self.hash_expression(e))
                    .unwrap_or_default();
                NodeHash::new("message")
                    .child(&opcode)
                    .children(&self.struct_fields(&m.fields))
                    .finish()
            }
            ModuleItem::Constant(c) => self.hash_constant_def(c),
            ModuleItem::Function(f) => self.hash_function_def("function", f),
            ModuleItem::Trait(t) => NodeHash::new("trait")
                .children(&self.trait_list(&t.traits))
                .children(&self.declarations(&t.declarations))
                .finish(),
            ModuleItem::Contract(c) => NodeHash::new("contract")
                .children(&self.trait_list(&c.traits))
                .children(&self.declarations(&c.declarations))
                .finish(),
        }
    }

    /// Struct and message fields keep their names: instances refer to them.
    fn struct_fields(&self, fields: &[FieldDecl]) -> Vec<AstHash> {
        self.ordered(
            fields
                .iter()
                .map(|f| {
                    NodeHash::new("struct-field")
                        .field(&f.name.text)
                        .child(&self.hash_field(f))
                        .finish()
                })
                .collect(),
        )
    }

    fn trait_list(&self, traits: &[Id]) -> Vec<AstHash> {
        self.ordered(traits.iter().map(|t| self.hash_id(t)).collect())
    }

    fn declarations(&self, decls: &[Declaration]) -> Vec<AstHash> {
        self.ordered(decls.iter().map(|d| self.hash_declaration(d)).collect())
    }

    pub fn hash_declaration(&self, decl: &Declaration) -> AstHash {
        match decl {
            Declaration::Field(f) => self.hash_field(f),
            Declaration::ConstantDef(c) => self.hash_constant_def(c),
            Declaration::ConstantDecl(c) => NodeHash::new("constant-decl")
                .field(&constant_attributes(&c.attributes))
                .child(&self.hash_type(&c.type_ann))
                .finish(),
            Declaration::FunctionDef(f) => self.hash_function_def("method", f),
            Declaration::FunctionDecl(f) => NodeHash::new("method-decl")
                .field(&function_attributes(&f.attributes))
                .children(&self.params(&f.params))
                .child(&self.return_type(f.return_type.as_ref()))
                .finish(),
            Declaration::Receiver(r) => self.hash_receiver(r),
        }
    }

    pub fn hash_field(&self, field: &FieldDecl) -> AstHash {
        let init = field
            .initializer
            .as_ref()
            .map(|e| self.hash_expression(e))
            .unwrap_or_default();
        NodeHash::new("field")
            .child(&self.hash_type(&field.type_ann))
            .child(&init)
            .finish()
    }

    fn hash_constant_def(&self, c: &ConstantDef) -> AstHash {
        NodeHash::new("constant")
            .field(&constant_attributes(&c.attributes))
            .child(&self.hash_type(&c.type_ann))
            .child(&self.hash_expression(&c.initializer))
            .finish()
    }

    fn hash_function_def(&self, kind: &str, f: &FunctionDef) -> AstHash {
        NodeHash::new(kind)
            .field(&function_attributes(&f.attributes))
            .children(&self.params(&f.params))
            .child(&self.return_type(f.return_type.as_ref()))
            .children(&self.statements(&f.statements))
            .finish()
    }

    fn params(&self, params: &[TypedParameter]) -> Vec<AstHash> {
        params
            .iter()
            .map(|p| {
                NodeHash::new("param")
                    .child(&self.hash_type(&p.type_ann))
                    .finish()
            })
            .collect()
    }

    fn return_type(&self, ty: Option<&TypeAnnotation>) -> AstHash {
        ty.map(|t| self.hash_type(t)).unwrap_or_default()
    }

    fn hash_receiver(&self, r: &Receiver) -> AstHash {
        let selector = match &r.selector {
            ReceiverKind::Internal(sub) => NodeHash::new("internal")
                .child(&self.receiver_sub_kind(sub))
                .finish(),
            ReceiverKind::External(sub) => NodeHash::new("external")
                .child(&self.receiver_sub_kind(sub))
                .finish(),
            ReceiverKind::Bounce { type_ann, .. } => NodeHash::new("bounced")
                .child(&self.hash_type(type_ann))
                .finish(),
        };
        NodeHash::new("receiver")
            .child(&selector)
            .children(&self.statements(&r.statements))
            .finish()
    }

    fn receiver_sub_kind(&self, sub: &ReceiverSubKind) -> AstHash {
        match sub {
            ReceiverSubKind::Simple { type_ann, .. } => NodeHash::new("simple")
                .child(&self.hash_type(type_ann))
                .finish(),
            ReceiverSubKind::Fallback => NodeHash::new("fallback").finish(),
            ReceiverSubKind::Comment(text) => NodeHash::new("comment").field(text).finish(),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statements(&self, stmts: &[Statement]) -> Vec<AstHash> {
        stmts.iter().map(|s| self.hash_statement(s)).collect()
    }

    pub fn hash_statement(&self, stmt: &Statement) -> AstHash {
        match stmt {
            Statement::Let(s) => NodeHash::new("let")
                .child(&self.return_type(s.type_ann.as_ref()))
                .child(&self.hash_expression(&s.expression))
                .finish(),
            Statement::Return(s) => NodeHash::new("return")
                .child(
                    &s.expression
                        .as_ref()
                        .map(|e| self.hash_expression(e))
                        .unwrap_or_default(),
                )
                .finish(),
            Statement::Expression(s) => NodeHash::new("expression-stmt")
                .child(&self.hash_expression(&s.expression))
                .finish(),
            Statement::Assign(s) => NodeHash::new("assign")
                .child(&self.hash_expression(&s.path))
                .child(&self.hash_expression(&s.expression))
                .finish(),
            Statement::AugmentedAssign(s) => NodeHash::new("augmented-assign")
                .field(s.op.symbol())
                .child(&self.hash_expression(&s.path))
                .child(&self.hash_expression(&s.expression))
                .finish(),
            Statement::Condition(s) => {
                let false_branch = match &s.false_statements {
                    Some(stmts) => NodeHash::new("else")
                        .children(&self.statements(stmts))
                        .finish(),
                    None => String::new(),
                };
                NodeHash::new("if")
                    .child(&self.hash_expression(&s.condition))
                    .children(&self.statements(&s.true_statements))
                    .child(&false_branch)
                    .finish()
            }
            Statement::While(s) => NodeHash::new("while")
                .child(&self.hash_expression(&s.condition))
                .children(&self.statements(&s.statements))
                .finish(),
            Statement::Until(s) => NodeHash::new("until")
                .child(&self.hash_expression(&s.condition))
                .children(&self.statements(&s.statements))
                .finish(),
            Statement::Repeat(s) => NodeHash::new("repeat")
                .child(&self.hash_expression(&s.iterations))
                .children(&self.statements(&s.statements))
                .finish(),
            Statement::Try(s) => {
                let catch = match &s.catch_block {
                    Some(c) => NodeHash::new("catch")
                        .children(&self.statements(&c.statements))
                        .finish(),
                    None => String::new(),
                };
                NodeHash::new("try")
                    .children(&self.statements(&s.statements))
                    .child(&catch)
                    .finish()
            }
            Statement::Foreach(s) => NodeHash::new("foreach")
                .child(&self.hash_expression(&s.map))
                .children(&self.statements(&s.statements))
                .finish(),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn hash_expression(&self, expr: &Expression) -> AstHash {
        match &expr.kind {
            ExpressionKind::Number { value, .. } => {
                // The radix is presentation only.
                NodeHash::new("number").field(&value.to_string()).finish()
            }
            ExpressionKind::Boolean(b) => NodeHash::new("boolean").field(&b.to_string()).finish(),
            ExpressionKind::String(s) => NodeHash::new("string").field(s).finish(),
            ExpressionKind::Null => NodeHash::new("null").finish(),
            ExpressionKind::Id(id) => self.hash_id(id),
            ExpressionKind::OpBinary { op, left, right } => NodeHash::new("binary")
                .field(op.symbol())
                .child(&self.hash_expression(left))
                .child(&self.hash_expression(right))
                .finish(),
            ExpressionKind::OpUnary { op, operand } => NodeHash::new("unary")
                .field(op.symbol())
                .child(&self.hash_expression(operand))
                .finish(),
            ExpressionKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => NodeHash::new("conditional")
                .child(&self.hash_expression(condition))
                .child(&self.hash_expression(then_branch))
                .child(&self.hash_expression(else_branch))
                .finish(),
            ExpressionKind::FieldAccess { aggregate, field } => NodeHash::new("field-access")
                .child(&self.hash_expression(aggregate))
                .field(&field.text)
                .finish(),
            ExpressionKind::MethodCall {
                receiver,
                method,
                args,
            } => NodeHash::new("method-call")
                .child(&self.hash_expression(receiver))
                .field(&method.text)
                .children(&self.expressions(args))
                .finish(),
            ExpressionKind::StaticCall { function, args } => NodeHash::new("static-call")
                .field(&function.text)
                .children(&self.expressions(args))
                .finish(),
            ExpressionKind::StructInstance { ty, args } => {
                let inits: Vec<AstHash> = args
                    .iter()
                    .map(|a| {
                        NodeHash::new("initializer")
                            .field(&a.field.text)
                            .child(&self.hash_expression(&a.initializer))
                            .finish()
                    })
                    .collect();
                NodeHash::new("struct-instance")
                    .field(&ty.text)
                    .children(&inits)
                    .finish()
            }
        }
    }

    fn expressions(&self, exprs: &[Expression]) -> Vec<AstHash> {
        exprs.iter().map(|e| self.hash_expression(e)).collect()
    }

    pub fn hash_type(&self, ty: &TypeAnnotation) -> AstHash {
        match &ty.kind {
            TypeKind::Named(id) => NodeHash::new("named-type").field(&id.text).finish(),
            TypeKind::Map { key, value } => NodeHash::new("map-type")
                .field(&key.text)
                .field(&value.text)
                .finish(),
            TypeKind::Bounced(id) => NodeHash::new("bounced-type").field(&id.text).finish(),
        }
    }

    pub fn hash_id(&self, id: &Id) -> AstHash {
        NodeHash::new("id").field(&id.text).finish()
    }
}

fn constant_attributes(attrs: &[ConstantAttribute]) -> String {
    let kw: Vec<&str> = attrs.iter().map(|a| a.keyword()).collect();
    kw.join(" ")
}

fn function_attributes(attrs: &[FunctionAttribute]) -> String {
    let kw: Vec<&str> = attrs.iter().map(|a| a.keyword()).collect();
    kw.join(" ")
}
