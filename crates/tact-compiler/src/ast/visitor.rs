use super::nodes::*;
use super::types::{TypeAnnotation, TypeKind};

/// Visitor trait for walking the AST.
///
/// Default implementations walk children; override specific methods
/// to add behavior at particular node types.
pub trait Visitor {
    fn visit_module(&mut self, module: &Module) {
        for item in &module.items {
            self.visit_item(item);
        }
    }

    fn visit_item(&mut self, item: &ModuleItem) {
        match item {
            ModuleItem::PrimitiveType(_) => {}
            ModuleItem::Struct(s) => self.visit_fields(&s.fields),
            ModuleItem::Message(m) => {
                if let Some(ref opcode) = m.opcode {
                    self.visit_expression(opcode);
                }
                self.visit_fields(&m.fields);
            }
            ModuleItem::Constant(c) => self.visit_constant_def(c),
            ModuleItem::Function(f) => self.visit_function_def(f),
            ModuleItem::Trait(t) => self.visit_declarations(&t.declarations),
            ModuleItem::Contract(c) => self.visit_declarations(&c.declarations),
        }
    }

    fn visit_fields(&mut self, fields: &[FieldDecl]) {
        for field in fields {
            self.visit_field(field);
        }
    }

    fn visit_field(&mut self, field: &FieldDecl) {
        self.visit_type(&field.type_ann);
        if let Some(ref init) = field.initializer {
            self.visit_expression(init);
        }
    }

    fn visit_declarations(&mut self, decls: &[Declaration]) {
        for decl in decls {
            self.visit_declaration(decl);
        }
    }

    fn visit_declaration(&mut self, decl: &Declaration) {
        match decl {
            Declaration::Field(f) => self.visit_field(f),
            Declaration::ConstantDef(c) => self.visit_constant_def(c),
            Declaration::ConstantDecl(c) => self.visit_type(&c.type_ann),
            Declaration::FunctionDef(f) => self.visit_function_def(f),
            Declaration::FunctionDecl(f) => {
                for param in &f.params {
                    self.visit_type(&param.type_ann);
                }
                if let Some(ref ret) = f.return_type {
                    self.visit_type(ret);
                }
            }
            Declaration::Receiver(r) => self.visit_receiver(r),
        }
    }

    fn visit_constant_def(&mut self, decl: &ConstantDef) {
        self.visit_type(&decl.type_ann);
        self.visit_expression(&decl.initializer);
    }

    fn visit_function_def(&mut self, func: &FunctionDef) {
        for param in &func.params {
            self.visit_type(&param.type_ann);
        }
        if let Some(ref ret) = func.return_type {
            self.visit_type(ret);
        }
        self.visit_statements(&func.statements);
    }

    fn visit_receiver(&mut self, receiver: &Receiver) {
        match &receiver.selector {
            ReceiverKind::Internal(sub) | ReceiverKind::External(sub) => {
                if let ReceiverSubKind::Simple { type_ann, .. } = sub {
                    self.visit_type(type_ann);
                }
            }
            ReceiverKind::Bounce { type_ann, .. } => self.visit_type(type_ann),
        }
        self.visit_statements(&receiver.statements);
    }

    fn visit_type(&mut self, _ty: &TypeAnnotation) {}

    fn visit_statements(&mut self, stmts: &[Statement]) {
        for stmt in stmts {
            self.visit_statement(stmt);
        }
    }

    fn visit_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Let(s) => {
                if let Some(ref ty) = s.type_ann {
                    self.visit_type(ty);
                }
                self.visit_expression(&s.expression);
            }
            Statement::Return(s) => {
                if let Some(ref expr) = s.expression {
                    self.visit_expression(expr);
                }
            }
            Statement::Expression(s) => self.visit_expression(&s.expression),
            Statement::Assign(s) => {
                self.visit_expression(&s.path);
                self.visit_expression(&s.expression);
            }
            Statement::AugmentedAssign(s) => {
                self.visit_expression(&s.path);
                self.visit_expression(&s.expression);
            }
            Statement::Condition(s) => {
                self.visit_expression(&s.condition);
                self.visit_statements(&s.true_statements);
                if let Some(ref stmts) = s.false_statements {
                    self.visit_statements(stmts);
                }
            }
            Statement::While(s) => {
                self.visit_expression(&s.condition);
                self.visit_statements(&s.statements);
            }
            Statement::Until(s) => {
                self.visit_statements(&s.statements);
                self.visit_expression(&s.condition);
            }
            Statement::Repeat(s) => {
                self.visit_expression(&s.iterations);
                self.visit_statements(&s.statements);
            }
            Statement::Try(s) => {
                self.visit_statements(&s.statements);
                if let Some(ref catch) = s.catch_block {
                    self.visit_statements(&catch.statements);
                }
            }
            Statement::Foreach(s) => {
                self.visit_expression(&s.map);
                self.visit_statements(&s.statements);
            }
        }
    }

    fn visit_expression(&mut self, expr: &Expression) {
        match &expr.kind {
            ExpressionKind::Number { .. }
            | ExpressionKind::Boolean(_)
            | ExpressionKind::String(_)
            | ExpressionKind::Null
            | ExpressionKind::Id(_) => {}
            ExpressionKind::OpBinary { left, right, .. } => {
                self.visit_expression(left);
                self.visit_expression(right);
            }
            ExpressionKind::OpUnary { operand, .. } => self.visit_expression(operand),
            ExpressionKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                self.visit_expression(condition);
                self.visit_expression(then_branch);
                self.visit_expression(else_branch);
            }
            ExpressionKind::FieldAccess { aggregate, .. } => self.visit_expression(aggregate),
            ExpressionKind::MethodCall { receiver, args, .. } => {
                self.visit_expression(receiver);
                for arg in args {
                    self.visit_expression(arg);
                }
            }
            ExpressionKind::StaticCall { args, .. } => {
                for arg in args {
                    self.visit_expression(arg);
                }
            }
            ExpressionKind::StructInstance { args, .. } => {
                for arg in args {
                    self.visit_expression(&arg.initializer);
                }
            }
        }
    }
}

/// Mutable counterpart of [`Visitor`], used by passes that rewrite names in place.
pub trait VisitorMut {
    fn visit_module_mut(&mut self, module: &mut Module) {
        for item in &mut module.items {
            self.visit_item_mut(item);
        }
    }

    fn visit_item_mut(&mut self, item: &mut ModuleItem) {
        match item {
            ModuleItem::PrimitiveType(_) => {}
            ModuleItem::Struct(s) => {
                for field in &mut s.fields {
                    self.visit_field_mut(field);
                }
            }
            ModuleItem::Message(m) => {
                if let Some(ref mut opcode) = m.opcode {
                    self.visit_expression_mut(opcode);
                }
                for field in &mut m.fields {
                    self.visit_field_mut(field);
                }
            }
            ModuleItem::Constant(c) => self.visit_constant_def_mut(c),
            ModuleItem::Function(f) => self.visit_function_def_mut(f),
            ModuleItem::Trait(t) => {
                for name in &mut t.traits {
                    self.visit_reference_mut(name);
                }
                for decl in &mut t.declarations {
                    self.visit_declaration_mut(decl);
                }
            }
            ModuleItem::Contract(c) => {
                for name in &mut c.traits {
                    self.visit_reference_mut(name);
                }
                for decl in &mut c.declarations {
                    self.visit_declaration_mut(decl);
                }
            }
        }
    }

    fn visit_field_mut(&mut self, field: &mut FieldDecl) {
        self.visit_type_mut(&mut field.type_ann);
        if let Some(ref mut init) = field.initializer {
            self.visit_expression_mut(init);
        }
    }

    fn visit_declaration_mut(&mut self, decl: &mut Declaration) {
        match decl {
            Declaration::Field(f) => self.visit_field_mut(f),
            Declaration::ConstantDef(c) => self.visit_constant_def_mut(c),
            Declaration::ConstantDecl(c) => self.visit_type_mut(&mut c.type_ann),
            Declaration::FunctionDef(f) => self.visit_function_def_mut(f),
            Declaration::FunctionDecl(f) => {
                for param in &mut f.params {
                    self.visit_type_mut(&mut param.type_ann);
                }
                if let Some(ref mut ret) = f.return_type {
                    self.visit_type_mut(ret);
                }
            }
            Declaration::Receiver(r) => {
                self.enter_block_mut();
                match &mut r.selector {
                    ReceiverKind::Internal(sub) | ReceiverKind::External(sub) => {
                        if let ReceiverSubKind::Simple { param, type_ann } = sub {
                            self.visit_type_mut(type_ann);
                            self.visit_binding_mut(param);
                        }
                    }
                    ReceiverKind::Bounce { param, type_ann } => {
                        self.visit_type_mut(type_ann);
                        self.visit_binding_mut(param);
                    }
                }
                self.visit_statements_mut(&mut r.statements);
                self.exit_block_mut();
            }
        }
    }

    fn visit_constant_def_mut(&mut self, decl: &mut ConstantDef) {
        self.visit_type_mut(&mut decl.type_ann);
        self.visit_expression_mut(&mut decl.initializer);
    }

    fn visit_function_def_mut(&mut self, func: &mut FunctionDef) {
        self.enter_block_mut();
        for param in &mut func.params {
            self.visit_type_mut(&mut param.type_ann);
            self.visit_binding_mut(&mut param.name);
        }
        if let Some(ref mut ret) = func.return_type {
            self.visit_type_mut(ret);
        }
        self.visit_statements_mut(&mut func.statements);
        self.exit_block_mut();
    }

    fn visit_type_mut(&mut self, ty: &mut TypeAnnotation) {
        match &mut ty.kind {
            TypeKind::Named(id) | TypeKind::Bounced(id) => self.visit_type_name_mut(id),
            TypeKind::Map { key, value } => {
                self.visit_type_name_mut(key);
                self.visit_type_name_mut(value);
            }
        }
    }

    /// Called for every identifier naming a type.
    fn visit_type_name_mut(&mut self, _id: &mut Id) {}

    /// Called for identifiers referring to a declaration by name: bare
    /// references, global function calls and trait lists.
    fn visit_reference_mut(&mut self, _id: &mut Id) {}

    /// Called for the name of a global function being called.
    fn visit_callee_mut(&mut self, id: &mut Id) {
        self.visit_reference_mut(id);
    }

    /// Called for the member name in `self.x` and `self.m()`.
    fn visit_self_member_mut(&mut self, _id: &mut Id) {}

    /// Called for names bound locally: parameters, `let`, loop and catch
    /// variables. The binding is visible until the enclosing block exits.
    fn visit_binding_mut(&mut self, _id: &mut Id) {}

    /// A function body or nested block opens.
    fn enter_block_mut(&mut self) {}

    fn exit_block_mut(&mut self) {}

    fn visit_statements_mut(&mut self, stmts: &mut [Statement]) {
        for stmt in stmts {
            self.visit_statement_mut(stmt);
        }
    }

    fn visit_block_mut(&mut self, stmts: &mut [Statement]) {
        self.enter_block_mut();
        self.visit_statements_mut(stmts);
        self.exit_block_mut();
    }

    fn visit_statement_mut(&mut self, stmt: &mut Statement) {
        match stmt {
            Statement::Let(s) => {
                if let Some(ref mut ty) = s.type_ann {
                    self.visit_type_mut(ty);
                }
                self.visit_expression_mut(&mut s.expression);
                self.visit_binding_mut(&mut s.name);
            }
            Statement::Return(s) => {
                if let Some(ref mut expr) = s.expression {
                    self.visit_expression_mut(expr);
                }
            }
            Statement::Expression(s) => self.visit_expression_mut(&mut s.expression),
            Statement::Assign(s) => {
                self.visit_expression_mut(&mut s.path);
                self.visit_expression_mut(&mut s.expression);
            }
            Statement::AugmentedAssign(s) => {
                self.visit_expression_mut(&mut s.path);
                self.visit_expression_mut(&mut s.expression);
            }
            Statement::Condition(s) => {
                self.visit_expression_mut(&mut s.condition);
                self.visit_block_mut(&mut s.true_statements);
                if let Some(ref mut stmts) = s.false_statements {
                    self.visit_block_mut(stmts);
                }
            }
            Statement::While(s) => {
                self.visit_expression_mut(&mut s.condition);
                self.visit_block_mut(&mut s.statements);
            }
            Statement::Until(s) => {
                self.visit_block_mut(&mut s.statements);
                self.visit_expression_mut(&mut s.condition);
            }
            Statement::Repeat(s) => {
                self.visit_expression_mut(&mut s.iterations);
                self.visit_block_mut(&mut s.statements);
            }
            Statement::Try(s) => {
                self.visit_block_mut(&mut s.statements);
                if let Some(ref mut catch) = s.catch_block {
                    self.enter_block_mut();
                    self.visit_binding_mut(&mut catch.name);
                    self.visit_statements_mut(&mut catch.statements);
                    self.exit_block_mut();
                }
            }
            Statement::Foreach(s) => {
                self.visit_expression_mut(&mut s.map);
                self.enter_block_mut();
                self.visit_binding_mut(&mut s.key_name);
                self.visit_binding_mut(&mut s.value_name);
                self.visit_statements_mut(&mut s.statements);
                self.exit_block_mut();
            }
        }
    }

    fn visit_expression_mut(&mut self, expr: &mut Expression) {
        match &mut expr.kind {
            ExpressionKind::Number { .. }
            | ExpressionKind::Boolean(_)
            | ExpressionKind::String(_)
            | ExpressionKind::Null => {}
            ExpressionKind::Id(id) => self.visit_reference_mut(id),
            ExpressionKind::OpBinary { left, right, .. } => {
                self.visit_expression_mut(left);
                self.visit_expression_mut(right);
            }
            ExpressionKind::OpUnary { operand, .. } => self.visit_expression_mut(operand),
            ExpressionKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                self.visit_expression_mut(condition);
                self.visit_expression_mut(then_branch);
                self.visit_expression_mut(else_branch);
            }
            ExpressionKind::FieldAccess { aggregate, field } => {
                if is_self(aggregate) {
                    self.visit_self_member_mut(field);
                } else {
                    self.visit_expression_mut(aggregate);
                }
            }
            ExpressionKind::MethodCall {
                receiver,
                method,
                args,
            } => {
                if is_self(receiver) {
                    self.visit_self_member_mut(method);
                } else {
                    self.visit_expression_mut(receiver);
                }
                for arg in args {
                    self.visit_expression_mut(arg);
                }
            }
            ExpressionKind::StaticCall { function, args } => {
                self.visit_callee_mut(function);
                for arg in args {
                    self.visit_expression_mut(arg);
                }
            }
            ExpressionKind::StructInstance { ty, args } => {
                self.visit_type_name_mut(ty);
                for arg in args {
                    self.visit_expression_mut(&mut arg.initializer);
                }
            }
        }
    }
}

/// Whether an expression is the bare `self` receiver.
pub fn is_self(expr: &Expression) -> bool {
    matches!(&expr.kind, ExpressionKind::Id(id) if id.text == "self")
}

/// Counts statements and expressions in a tree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeCounter {
    pub items: usize,
    pub declarations: usize,
    pub statements: usize,
    pub expressions: usize,
}

impl NodeCounter {
    pub fn count(module: &Module) -> Self {
        let mut counter = Self::default();
        counter.visit_module(module);
        counter
    }
}

impl Visitor for NodeCounter {
    fn visit_item(&mut self, item: &ModuleItem) {
        self.items += 1;
        match item {
            ModuleItem::PrimitiveType(_) => {}
            ModuleItem::Struct(s) => self.visit_fields(&s.fields),
            ModuleItem::Message(m) => {
                if let Some(ref opcode) = m.opcode {
                    self.visit_expression(opcode);
                }
                self.visit_fields(&m.fields);
            }
            ModuleItem::Constant(c) => self.visit_constant_def(c),
            ModuleItem::Function(f) => self.visit_function_def(f),
            ModuleItem::Trait(t) => self.visit_declarations(&t.declarations),
            ModuleItem::Contract(c) => self.visit_declarations(&c.declarations),
        }
    }

    fn visit_declarations(&mut self, decls: &[Declaration]) {
        self.declarations += decls.len();
        for decl in decls {
            self.visit_declaration(decl);
        }
    }

    fn visit_statements(&mut self, stmts: &[Statement]) {
        self.statements += stmts.len();
        for stmt in stmts {
            self.visit_statement(stmt);
        }
    }

    fn visit_expression(&mut self, expr: &Expression) {
        self.expressions += 1;
        match &expr.kind {
            ExpressionKind::OpBinary { left, right, .. } => {
                self.visit_expression(left);
                self.visit_expression(right);
            }
            ExpressionKind::OpUnary { operand, .. } => self.visit_expression(operand),
            ExpressionKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                self.visit_expression(condition);
                self.visit_expression(then_branch);
                self.visit_expression(else_branch);
            }
            ExpressionKind::FieldAccess { aggregate, .. } => self.visit_expression(aggregate),
            ExpressionKind::MethodCall { receiver, args, .. } => {
                self.visit_expression(receiver);
                for arg in args {
                    self.visit_expression(arg);
                }
            }
            ExpressionKind::StaticCall { args, .. } => {
                for arg in args {
                    self.visit_expression(arg);
                }
            }
            ExpressionKind::StructInstance { args, .. } => {
                for arg in args {
                    self.visit_expression(&arg.initializer);
                }
            }
            ExpressionKind::Number { .. }
            | ExpressionKind::Boolean(_)
            | ExpressionKind::String(_)
            | ExpressionKind::Null
            | ExpressionKind::Id(_) => {}
        }
    }
}
