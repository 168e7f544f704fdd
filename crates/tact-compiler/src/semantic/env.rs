use std::collections::HashMap;

use crate::ast::visitor::is_self;
use crate::ast::*;

use super::scope::{ScopeKind, ScopeStack, Symbol, SymbolKind};
use super::type_checker::{check_binary_op, check_unary_op, types_assignable};
use super::types::Type;

/// Parameter and return types of a function or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Type>,
    pub ret: Type,
}

impl Signature {
    pub fn of(params: &[TypedParameter], ret: Option<&TypeAnnotation>) -> Self {
        Self {
            params: params
                .iter()
                .map(|p| Type::from_annotation(&p.type_ann))
                .collect(),
            ret: ret.map(Type::from_annotation).unwrap_or(Type::Void),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StructField {
    pub name: String,
    pub ty: Type,
    pub has_default: bool,
}

/// Layout of a struct or message.
#[derive(Debug, Clone)]
pub struct StructInfo {
    pub fields: Vec<StructField>,
    pub is_message: bool,
}

impl StructInfo {
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Constant,
}

/// Members reachable through `self` inside a trait or contract.
#[derive(Debug, Clone, Default)]
pub struct SelfEnv {
    pub name: String,
    pub members: HashMap<String, (MemberKind, Type)>,
    pub methods: HashMap<String, Signature>,
}

/// The typing environment an expression is resolved in.
#[derive(Debug, Clone, Default)]
pub struct Env {
    pub scopes: ScopeStack,
    structs: HashMap<String, StructInfo>,
    functions: HashMap<String, Signature>,
    self_env: Option<SelfEnv>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_struct(&mut self, name: impl Into<String>, info: StructInfo) {
        self.structs.insert(name.into(), info);
    }

    pub fn define_function(&mut self, name: impl Into<String>, sig: Signature) {
        self.functions.insert(name.into(), sig);
    }

    /// Define a value symbol in the innermost scope.
    pub fn define(
        &mut self,
        name: &str,
        kind: SymbolKind,
        ty: Type,
        defined_at: tact_common::AstId,
    ) -> Result<(), tact_common::AstId> {
        self.scopes.define(Symbol {
            name: name.to_string(),
            kind,
            ty,
            defined_at,
        })
    }

    pub fn push_scope(&mut self, kind: ScopeKind) {
        self.scopes.push(kind);
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn enter_self(&mut self, env: SelfEnv) {
        self.self_env = Some(env);
    }

    pub fn leave_self(&mut self) {
        self.self_env = None;
    }

    pub fn self_env(&self) -> Option<&SelfEnv> {
        self.self_env.as_ref()
    }

    pub fn struct_info(&self, name: &str) -> Option<&StructInfo> {
        self.structs.get(name)
    }

    /// Whether a type names something that exists in this environment.
    pub fn is_known_type(&self, ty: &Type) -> bool {
        match ty {
            Type::Map(k, v) => self.is_known_type(k) && self.is_known_type(v),
            Type::Named(n) => self.structs.contains_key(n),
            Type::Bounced(n) => self.structs.get(n).is_some_and(|s| s.is_message),
            Type::Null | Type::Void | Type::Error => false,
            primitive => primitive.is_primitive(),
        }
    }

    /// Resolve the type of an expression, or describe why it is ill-typed.
    pub fn type_of(&self, expr: &Expression) -> Result<Type, String> {
        match &expr.kind {
            ExpressionKind::Number { .. } => Ok(Type::Int),
            ExpressionKind::Boolean(_) => Ok(Type::Bool),
            ExpressionKind::String(_) => Ok(Type::String),
            ExpressionKind::Null => Ok(Type::Null),
            ExpressionKind::Id(id) => self.type_of_name(&id.text),
            ExpressionKind::OpBinary { op, left, right } => {
                check_binary_op(&self.type_of(left)?, *op, &self.type_of(right)?)
            }
            ExpressionKind::OpUnary { op, operand } => {
                check_unary_op(*op, &self.type_of(operand)?)
            }
            ExpressionKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                let cond = self.type_of(condition)?;
                if !types_assignable(&cond, &Type::Bool) {
                    return Err(format!(
                        "condition must be Bool, got {}",
                        cond.display_name()
                    ));
                }
                let then_ty = self.type_of(then_branch)?;
                let else_ty = self.type_of(else_branch)?;
                if types_assignable(&else_ty, &then_ty) {
                    Ok(then_ty)
                } else if types_assignable(&then_ty, &else_ty) {
                    Ok(else_ty)
                } else {
                    Err(format!(
                        "conditional branches have different types: {} and {}",
                        then_ty.display_name(),
                        else_ty.display_name()
                    ))
                }
            }
            ExpressionKind::FieldAccess { aggregate, field } => {
                if is_self(aggregate) {
                    return self.self_member(&field.text);
                }
                let agg = self.type_of(aggregate)?;
                let name = match &agg {
                    Type::Named(n) | Type::Bounced(n) => n,
                    Type::Error => return Ok(Type::Error),
                    other => {
                        return Err(format!(
                            "type {} has no field `{}`",
                            other.display_name(),
                            field.text
                        ))
                    }
                };
                self.struct_info(name)
                    .and_then(|s| s.field(&field.text))
                    .map(|f| f.ty.clone())
                    .ok_or_else(|| format!("type {} has no field `{}`", name, field.text))
            }
            ExpressionKind::MethodCall {
                receiver,
                method,
                args,
            } => {
                if !is_self(receiver) {
                    return Err(format!(
                        "method `{}` can only be called on `self`",
                        method.text
                    ));
                }
                let sig = self
                    .self_env
                    .as_ref()
                    .and_then(|s| s.methods.get(&method.text))
                    .ok_or_else(|| format!("undefined method `{}`", method.text))?;
                self.check_call(&method.text, sig, args)
            }
            ExpressionKind::StaticCall { function, args } => {
                self.type_of_static_call(&function.text, args)
            }
            ExpressionKind::StructInstance { ty, args } => self.type_of_instance(&ty.text, args),
        }
    }

    fn type_of_name(&self, name: &str) -> Result<Type, String> {
        if name == "self" {
            return self
                .self_env
                .as_ref()
                .map(|s| Type::Named(s.name.clone()))
                .ok_or_else(|| "`self` used outside of a trait or contract".to_string());
        }
        self.scopes
            .lookup(name)
            .map(|sym| sym.ty.clone())
            .ok_or_else(|| format!("undefined name `{}`", name))
    }

    fn self_member(&self, name: &str) -> Result<Type, String> {
        let env = self
            .self_env
            .as_ref()
            .ok_or_else(|| "`self` used outside of a trait or contract".to_string())?;
        env.members
            .get(name)
            .map(|(_, ty)| ty.clone())
            .ok_or_else(|| format!("`{}` has no field or constant `{}`", env.name, name))
    }

    fn type_of_static_call(&self, name: &str, args: &[Expression]) -> Result<Type, String> {
        match name {
            "require" => {
                let sig = Signature {
                    params: vec![Type::Bool, Type::String],
                    ret: Type::Void,
                };
                self.check_call(name, &sig, args)
            }
            "emptyMap" => {
                let sig = Signature {
                    params: vec![],
                    ret: Type::Null,
                };
                self.check_call(name, &sig, args)
            }
            _ => {
                let sig = self
                    .functions
                    .get(name)
                    .ok_or_else(|| format!("undefined function `{}`", name))?;
                self.check_call(name, sig, args)
            }
        }
    }

    fn check_call(&self, name: &str, sig: &Signature, args: &[Expression]) -> Result<Type, String> {
        if args.len() != sig.params.len() {
            return Err(format!(
                "`{}` expects {} argument(s) but got {}",
                name,
                sig.params.len(),
                args.len()
            ));
        }
        for (i, (arg, param)) in args.iter().zip(&sig.params).enumerate() {
            let arg_ty = self.type_of(arg)?;
            if !types_assignable(&arg_ty, param) {
                return Err(format!(
                    "argument {} of `{}` expects {} but got {}",
                    i + 1,
                    name,
                    param.display_name(),
                    arg_ty.display_name()
                ));
            }
        }
        Ok(sig.ret.clone())
    }

    fn type_of_instance(&self, name: &str, args: &[StructFieldInitializer]) -> Result<Type, String> {
        let info = self
            .struct_info(name)
            .ok_or_else(|| format!("undefined struct or message `{}`", name))?;
        let mut seen: Vec<&str> = Vec::new();
        for arg in args {
            let field = info
                .field(&arg.field.text)
                .ok_or_else(|| format!("`{}` has no field `{}`", name, arg.field.text))?;
            if seen.contains(&field.name.as_str()) {
                return Err(format!("field `{}` initialized twice", field.name));
            }
            seen.push(&field.name);
            let ty = self.type_of(&arg.initializer)?;
            if !types_assignable(&ty, &field.ty) {
                return Err(format!(
                    "field `{}` of `{}` expects {} but got {}",
                    field.name,
                    name,
                    field.ty.display_name(),
                    ty.display_name()
                ));
            }
        }
        if let Some(missing) = info
            .fields
            .iter()
            .find(|f| !f.has_default && !f.ty.is_nullable() && !seen.contains(&f.name.as_str()))
        {
            return Err(format!("missing field `{}` in `{}`", missing.name, name));
        }
        Ok(Type::Named(name.to_string()))
    }
}

/// Resolve the type of `expr` in `env`.
pub fn resolve_expression(env: &Env, expr: &Expression) -> Result<Type, String> {
    env.type_of(expr)
}
