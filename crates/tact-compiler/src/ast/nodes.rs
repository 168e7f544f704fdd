use serde::Serialize;
use tact_common::{next_id, AstId};

use super::types::TypeAnnotation;

// ============================================================================
// Identifiers
// ============================================================================

/// An identifier: `counter`, `Point`, `self`.
#[derive(Debug, Clone, Serialize)]
pub struct Id {
    pub id: AstId,
    pub text: String,
}

impl Id {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: next_id(),
            text: text.into(),
        }
    }
}

// ============================================================================
// Module (top-level)
// ============================================================================

/// A complete Tact module.
#[derive(Debug, Clone, Serialize)]
pub struct Module {
    pub id: AstId,
    pub items: Vec<ModuleItem>,
}

impl Module {
    pub fn new(items: Vec<ModuleItem>) -> Self {
        Self { id: next_id(), items }
    }
}

/// A top-level module item.
#[derive(Debug, Clone, Serialize)]
pub enum ModuleItem {
    PrimitiveType(PrimitiveTypeDecl),
    Struct(StructDecl),
    Message(MessageDecl),
    Constant(ConstantDef),
    Function(FunctionDef),
    Trait(TraitDecl),
    Contract(ContractDecl),
}

impl ModuleItem {
    pub fn name(&self) -> &Id {
        match self {
            ModuleItem::PrimitiveType(d) => &d.name,
            ModuleItem::Struct(d) => &d.name,
            ModuleItem::Message(d) => &d.name,
            ModuleItem::Constant(d) => &d.name,
            ModuleItem::Function(d) => &d.name,
            ModuleItem::Trait(d) => &d.name,
            ModuleItem::Contract(d) => &d.name,
        }
    }

    pub fn name_mut(&mut self) -> &mut Id {
        match self {
            ModuleItem::PrimitiveType(d) => &mut d.name,
            ModuleItem::Struct(d) => &mut d.name,
            ModuleItem::Message(d) => &mut d.name,
            ModuleItem::Constant(d) => &mut d.name,
            ModuleItem::Function(d) => &mut d.name,
            ModuleItem::Trait(d) => &mut d.name,
            ModuleItem::Contract(d) => &mut d.name,
        }
    }

    /// Position of this item kind in the canonical top-level order.
    ///
    /// Types come before the constants and functions that mention them, and
    /// traits before the contracts that implement them.
    pub fn kind_rank(&self) -> u8 {
        match self {
            ModuleItem::PrimitiveType(_) => 0,
            ModuleItem::Struct(_) => 1,
            ModuleItem::Message(_) => 2,
            ModuleItem::Constant(_) => 3,
            ModuleItem::Function(_) => 4,
            ModuleItem::Trait(_) => 5,
            ModuleItem::Contract(_) => 6,
        }
    }
}

/// `primitive Int;`
#[derive(Debug, Clone, Serialize)]
pub struct PrimitiveTypeDecl {
    pub id: AstId,
    pub name: Id,
}

// ============================================================================
// Functions
// ============================================================================

/// Function and method attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FunctionAttribute {
    Get,
    Mutates,
    Extends,
    Virtual,
    Abstract,
    Override,
    Inline,
}

impl FunctionAttribute {
    pub fn keyword(self) -> &'static str {
        match self {
            FunctionAttribute::Get => "get",
            FunctionAttribute::Mutates => "mutates",
            FunctionAttribute::Extends => "extends",
            FunctionAttribute::Virtual => "virtual",
            FunctionAttribute::Abstract => "abstract",
            FunctionAttribute::Override => "override",
            FunctionAttribute::Inline => "inline",
        }
    }
}

/// A function or method with a body.
///
/// ```tact
/// fun name(a: Int, b: Bool): Int { statements }
/// override fun name(): Int { statements }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDef {
    pub id: AstId,
    pub attributes: Vec<FunctionAttribute>,
    pub name: Id,
    pub return_type: Option<TypeAnnotation>,
    pub params: Vec<TypedParameter>,
    pub statements: Vec<Statement>,
}

/// A method declaration without a body: `abstract fun name(): Int;`
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDecl {
    pub id: AstId,
    pub attributes: Vec<FunctionAttribute>,
    pub name: Id,
    pub return_type: Option<TypeAnnotation>,
    pub params: Vec<TypedParameter>,
}

/// A typed parameter: `name: Type`.
#[derive(Debug, Clone, Serialize)]
pub struct TypedParameter {
    pub id: AstId,
    pub name: Id,
    pub type_ann: TypeAnnotation,
}

// ============================================================================
// Constants and fields
// ============================================================================

/// Constant attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConstantAttribute {
    Virtual,
    Override,
    Abstract,
}

impl ConstantAttribute {
    pub fn keyword(self) -> &'static str {
        match self {
            ConstantAttribute::Virtual => "virtual",
            ConstantAttribute::Override => "override",
            ConstantAttribute::Abstract => "abstract",
        }
    }
}

/// `[virtual|override] const NAME: Type = value;`
#[derive(Debug, Clone, Serialize)]
pub struct ConstantDef {
    pub id: AstId,
    pub attributes: Vec<ConstantAttribute>,
    pub name: Id,
    pub type_ann: TypeAnnotation,
    pub initializer: Expression,
}

/// `abstract const NAME: Type;`
#[derive(Debug, Clone, Serialize)]
pub struct ConstantDecl {
    pub id: AstId,
    pub attributes: Vec<ConstantAttribute>,
    pub name: Id,
    pub type_ann: TypeAnnotation,
}

/// A typed field: `name: Type [= initializer];` (contract, trait, struct, message).
#[derive(Debug, Clone, Serialize)]
pub struct FieldDecl {
    pub id: AstId,
    pub name: Id,
    pub type_ann: TypeAnnotation,
    pub initializer: Option<Expression>,
}

// ============================================================================
// Structs and messages
// ============================================================================

/// ```tact
/// struct Point { x: Int; y: Int }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct StructDecl {
    pub id: AstId,
    pub name: Id,
    pub fields: Vec<FieldDecl>,
}

/// ```tact
/// message(0x7362d09c) Transfer { amount: Int }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct MessageDecl {
    pub id: AstId,
    pub name: Id,
    pub opcode: Option<Expression>,
    pub fields: Vec<FieldDecl>,
}

// ============================================================================
// Traits and contracts
// ============================================================================

/// A declaration inside a trait or contract body.
#[derive(Debug, Clone, Serialize)]
pub enum Declaration {
    Field(FieldDecl),
    ConstantDef(ConstantDef),
    ConstantDecl(ConstantDecl),
    FunctionDef(FunctionDef),
    FunctionDecl(FunctionDecl),
    Receiver(Receiver),
}

impl Declaration {
    /// Name of the declaration; receivers are anonymous.
    pub fn name(&self) -> Option<&Id> {
        match self {
            Declaration::Field(d) => Some(&d.name),
            Declaration::ConstantDef(d) => Some(&d.name),
            Declaration::ConstantDecl(d) => Some(&d.name),
            Declaration::FunctionDef(d) => Some(&d.name),
            Declaration::FunctionDecl(d) => Some(&d.name),
            Declaration::Receiver(_) => None,
        }
    }

    pub fn name_mut(&mut self) -> Option<&mut Id> {
        match self {
            Declaration::Field(d) => Some(&mut d.name),
            Declaration::ConstantDef(d) => Some(&mut d.name),
            Declaration::ConstantDecl(d) => Some(&mut d.name),
            Declaration::FunctionDef(d) => Some(&mut d.name),
            Declaration::FunctionDecl(d) => Some(&mut d.name),
            Declaration::Receiver(_) => None,
        }
    }
}

/// ```tact
/// trait Name with Other { declarations }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct TraitDecl {
    pub id: AstId,
    pub name: Id,
    pub traits: Vec<Id>,
    pub declarations: Vec<Declaration>,
}

/// ```tact
/// contract Name with Trait { declarations }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ContractDecl {
    pub id: AstId,
    pub name: Id,
    pub traits: Vec<Id>,
    pub declarations: Vec<Declaration>,
}

// ============================================================================
// Receivers
// ============================================================================

/// `receive(...) { }`, `external(...) { }` or `bounced(...) { }`.
#[derive(Debug, Clone, Serialize)]
pub struct Receiver {
    pub id: AstId,
    pub selector: ReceiverKind,
    pub statements: Vec<Statement>,
}

/// Which receiver keyword is used.
#[derive(Debug, Clone, Serialize)]
pub enum ReceiverKind {
    Internal(ReceiverSubKind),
    External(ReceiverSubKind),
    /// `bounced(msg: bounced<M>)`
    Bounce { param: Id, type_ann: TypeAnnotation },
}

/// What an internal or external receiver matches.
#[derive(Debug, Clone, Serialize)]
pub enum ReceiverSubKind {
    /// `receive(msg: M)`
    Simple { param: Id, type_ann: TypeAnnotation },
    /// `receive()`
    Fallback,
    /// `receive("text")`
    Comment(String),
}

// ============================================================================
// Statements
// ============================================================================

/// A statement within a body.
#[derive(Debug, Clone, Serialize)]
pub enum Statement {
    Let(LetStmt),
    Return(ReturnStmt),
    Expression(ExpressionStmt),
    Assign(AssignStmt),
    AugmentedAssign(AugmentedAssignStmt),
    Condition(ConditionStmt),
    While(WhileStmt),
    Until(UntilStmt),
    Repeat(RepeatStmt),
    Try(TryStmt),
    Foreach(ForeachStmt),
}

/// `let name: Type = expr;`
#[derive(Debug, Clone, Serialize)]
pub struct LetStmt {
    pub id: AstId,
    pub name: Id,
    pub type_ann: Option<TypeAnnotation>,
    pub expression: Expression,
}

/// `return [expr];`
#[derive(Debug, Clone, Serialize)]
pub struct ReturnStmt {
    pub id: AstId,
    pub expression: Option<Expression>,
}

/// An expression used as a statement: `require(x > 0, "oops");`
#[derive(Debug, Clone, Serialize)]
pub struct ExpressionStmt {
    pub id: AstId,
    pub expression: Expression,
}

/// `path = expr;`
#[derive(Debug, Clone, Serialize)]
pub struct AssignStmt {
    pub id: AstId,
    pub path: Expression,
    pub expression: Expression,
}

/// `path += expr;`
#[derive(Debug, Clone, Serialize)]
pub struct AugmentedAssignStmt {
    pub id: AstId,
    pub op: AugmentedAssignOp,
    pub path: Expression,
    pub expression: Expression,
}

/// Augmented assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AugmentedAssignOp {
    Add,
    Sub,
    Mul,
}

impl AugmentedAssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AugmentedAssignOp::Add => "+=",
            AugmentedAssignOp::Sub => "-=",
            AugmentedAssignOp::Mul => "*=",
        }
    }
}

/// `if (cond) { } [else { }]`
#[derive(Debug, Clone, Serialize)]
pub struct ConditionStmt {
    pub id: AstId,
    pub condition: Expression,
    pub true_statements: Vec<Statement>,
    pub false_statements: Option<Vec<Statement>>,
}

/// `while (cond) { }`
#[derive(Debug, Clone, Serialize)]
pub struct WhileStmt {
    pub id: AstId,
    pub condition: Expression,
    pub statements: Vec<Statement>,
}

/// `do { } until (cond);`
#[derive(Debug, Clone, Serialize)]
pub struct UntilStmt {
    pub id: AstId,
    pub condition: Expression,
    pub statements: Vec<Statement>,
}

/// `repeat (n) { }`
#[derive(Debug, Clone, Serialize)]
pub struct RepeatStmt {
    pub id: AstId,
    pub iterations: Expression,
    pub statements: Vec<Statement>,
}

/// `try { } [catch (e) { }]`
#[derive(Debug, Clone, Serialize)]
pub struct TryStmt {
    pub id: AstId,
    pub statements: Vec<Statement>,
    pub catch_block: Option<CatchBlock>,
}

/// The `catch (name) { }` part of a try statement.
#[derive(Debug, Clone, Serialize)]
pub struct CatchBlock {
    pub name: Id,
    pub statements: Vec<Statement>,
}

/// `foreach (key, value in map) { }`
#[derive(Debug, Clone, Serialize)]
pub struct ForeachStmt {
    pub id: AstId,
    pub key_name: Id,
    pub value_name: Id,
    pub map: Expression,
    pub statements: Vec<Statement>,
}

// ============================================================================
// Expressions
// ============================================================================

/// An expression node.
#[derive(Debug, Clone, Serialize)]
pub struct Expression {
    pub id: AstId,
    pub kind: ExpressionKind,
}

impl Expression {
    pub fn new(kind: ExpressionKind) -> Self {
        Self { id: next_id(), kind }
    }

    /// A bare identifier reference: `name`.
    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(ExpressionKind::Id(Id::new(name)))
    }

    /// A field or constant read through `self`: `self.name`.
    pub fn self_access(name: impl Into<String>) -> Self {
        Self::new(ExpressionKind::FieldAccess {
            aggregate: Box::new(Self::ident("self")),
            field: Id::new(name),
        })
    }

    /// A call of a global function: `name(args)`.
    pub fn static_call(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self::new(ExpressionKind::StaticCall {
            function: Id::new(name),
            args,
        })
    }
}

/// All expression variants.
#[derive(Debug, Clone, Serialize)]
pub enum ExpressionKind {
    /// Integer literal: `42`, `0x2a`, `0b101010`, `0o52`
    Number { base: NumberBase, value: u64 },

    /// `true` / `false`
    Boolean(bool),

    /// `"text"`
    String(String),

    /// `null`
    Null,

    /// A reference: `x`, `self`
    Id(Id),

    /// `a + b`, `x == y`
    OpBinary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// `-x`, `!flag`
    OpUnary { op: UnaryOp, operand: Box<Expression> },

    /// `cond ? a : b`
    Conditional {
        condition: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Box<Expression>,
    },

    /// `obj.field`
    FieldAccess { aggregate: Box<Expression>, field: Id },

    /// `obj.method(args)`
    MethodCall {
        receiver: Box<Expression>,
        method: Id,
        args: Vec<Expression>,
    },

    /// `function(args)`
    StaticCall { function: Id, args: Vec<Expression> },

    /// `Point { x: 1, y: 2 }`
    StructInstance {
        ty: Id,
        args: Vec<StructFieldInitializer>,
    },
}

/// A field in a struct instance: `name: expr`.
#[derive(Debug, Clone, Serialize)]
pub struct StructFieldInitializer {
    pub id: AstId,
    pub field: Id,
    pub initializer: Expression,
}

/// Radix of an integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumberBase {
    Bin,
    Oct,
    Dec,
    Hex,
}

impl NumberBase {
    pub fn radix(self) -> u32 {
        match self {
            NumberBase::Bin => 2,
            NumberBase::Oct => 8,
            NumberBase::Dec => 10,
            NumberBase::Hex => 16,
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    // Logical
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Lte => "<=",
            BinaryOp::Gte => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}
