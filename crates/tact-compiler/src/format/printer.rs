use crate::ast::*;

/// Number of spaces per indentation level.
const INDENT_WIDTH: usize = 4;

/// Concrete-syntax printer. Writes into an owned buffer.
pub(crate) struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    pub(crate) fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent * INDENT_WIDTH {
            self.out.push(' ');
        }
    }

    fn line(&mut self, text: &str) {
        self.write_indent();
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Writes `header {`, the body produced by `body`, and the closing brace.
    fn block(&mut self, header: &str, body: impl FnOnce(&mut Self)) {
        self.write_indent();
        self.out.push_str(header);
        self.out.push_str(" {\n");
        self.indent += 1;
        body(self);
        self.indent -= 1;
        self.line("}");
    }

    // ========================================================================
    // Module items
    // ========================================================================

    pub(crate) fn module(&mut self, module: &Module) {
        for (i, item) in module.items.iter().enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            self.item(item);
        }
    }

    pub(crate) fn item(&mut self, item: &ModuleItem) {
        match item {
            ModuleItem::PrimitiveType(p) => self.line(&format!("primitive {};", p.name.text)),
            ModuleItem::Struct(s) => {
                let header = format!("struct {}", s.name.text);
                self.block(&header, |p| p.fields(&s.fields));
            }
            ModuleItem::Message(m) => {
                let header = match &m.opcode {
                    Some(opcode) => format!("message({}) {}", expression(opcode), m.name.text),
                    None => format!("message {}", m.name.text),
                };
                self.block(&header, |p| p.fields(&m.fields));
            }
            ModuleItem::Constant(c) => self.constant_def(c),
            ModuleItem::Function(f) => self.function_def(f),
            ModuleItem::Trait(t) => {
                let header = format!("trait {}{}", t.name.text, with_clause(&t.traits));
                self.block(&header, |p| p.declarations(&t.declarations));
            }
            ModuleItem::Contract(c) => {
                let header = format!("contract {}{}", c.name.text, with_clause(&c.traits));
                self.block(&header, |p| p.declarations(&c.declarations));
            }
        }
    }

    fn fields(&mut self, fields: &[FieldDecl]) {
        for field in fields {
            self.field(field);
        }
    }

    fn field(&mut self, field: &FieldDecl) {
        let mut text = format!("{}: {}", field.name.text, type_annotation(&field.type_ann));
        if let Some(ref init) = field.initializer {
            text.push_str(" = ");
            text.push_str(&expression(init));
        }
        text.push(';');
        self.line(&text);
    }

    fn declarations(&mut self, decls: &[Declaration]) {
        for decl in decls {
            match decl {
                Declaration::Field(f) => self.field(f),
                Declaration::ConstantDef(c) => self.constant_def(c),
                Declaration::ConstantDecl(c) => {
                    let text = format!(
                        "{}const {}: {};",
                        constant_attributes(&c.attributes),
                        c.name.text,
                        type_annotation(&c.type_ann)
                    );
                    self.line(&text);
                }
                Declaration::FunctionDef(f) => self.function_def(f),
                Declaration::FunctionDecl(f) => {
                    let text = format!(
                        "{};",
                        function_header(&f.attributes, &f.name, &f.params, f.return_type.as_ref())
                    );
                    self.line(&text);
                }
                Declaration::Receiver(r) => self.receiver(r),
            }
        }
    }

    fn constant_def(&mut self, c: &ConstantDef) {
        let text = format!(
            "{}const {}: {} = {};",
            constant_attributes(&c.attributes),
            c.name.text,
            type_annotation(&c.type_ann),
            expression(&c.initializer)
        );
        self.line(&text);
    }

    fn function_def(&mut self, f: &FunctionDef) {
        let header = function_header(&f.attributes, &f.name, &f.params, f.return_type.as_ref());
        self.block(&header, |p| p.statements(&f.statements));
    }

    fn receiver(&mut self, r: &Receiver) {
        let header = match &r.selector {
            ReceiverKind::Internal(sub) => format!("receive({})", receiver_selector(sub)),
            ReceiverKind::External(sub) => format!("external({})", receiver_selector(sub)),
            ReceiverKind::Bounce { param, type_ann } => {
                format!("bounced({}: {})", param.text, type_annotation(type_ann))
            }
        };
        self.block(&header, |p| p.statements(&r.statements));
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub(crate) fn statements(&mut self, stmts: &[Statement]) {
        for stmt in stmts {
            self.statement(stmt);
        }
    }

    pub(crate) fn statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Let(s) => {
                let text = match &s.type_ann {
                    Some(ty) => format!(
                        "let {}: {} = {};",
                        s.name.text,
                        type_annotation(ty),
                        expression(&s.expression)
                    ),
                    None => format!("let {} = {};", s.name.text, expression(&s.expression)),
                };
                self.line(&text);
            }
            Statement::Return(s) => match &s.expression {
                Some(expr) => self.line(&format!("return {};", expression(expr))),
                None => self.line("return;"),
            },
            Statement::Expression(s) => self.line(&format!("{};", expression(&s.expression))),
            Statement::Assign(s) => {
                let text = format!("{} = {};", expression(&s.path), expression(&s.expression));
                self.line(&text);
            }
            Statement::AugmentedAssign(s) => {
                let text = format!(
                    "{} {} {};",
                    expression(&s.path),
                    s.op.symbol(),
                    expression(&s.expression)
                );
                self.line(&text);
            }
            Statement::Condition(s) => {
                let header = format!("if ({})", expression(&s.condition));
                match &s.false_statements {
                    None => self.block(&header, |p| p.statements(&s.true_statements)),
                    Some(false_statements) => {
                        self.write_indent();
                        self.out.push_str(&header);
                        self.out.push_str(" {\n");
                        self.indent += 1;
                        self.statements(&s.true_statements);
                        self.indent -= 1;
                        self.block("} else", |p| p.statements(false_statements));
                    }
                }
            }
            Statement::While(s) => {
                let header = format!("while ({})", expression(&s.condition));
                self.block(&header, |p| p.statements(&s.statements));
            }
            Statement::Until(s) => {
                self.block("do", |p| p.statements(&s.statements));
                // Reopen the closing line to attach the condition.
                self.out.truncate(self.out.len() - 1);
                self.out
                    .push_str(&format!(" until ({});\n", expression(&s.condition)));
            }
            Statement::Repeat(s) => {
                let header = format!("repeat ({})", expression(&s.iterations));
                self.block(&header, |p| p.statements(&s.statements));
            }
            Statement::Try(s) => match &s.catch_block {
                None => self.block("try", |p| p.statements(&s.statements)),
                Some(catch) => {
                    self.block("try", |p| p.statements(&s.statements));
                    self.out.truncate(self.out.len() - 1);
                    self.out.push_str(&format!(" catch ({}) {{\n", catch.name.text));
                    self.indent += 1;
                    self.statements(&catch.statements);
                    self.indent -= 1;
                    self.line("}");
                }
            },
            Statement::Foreach(s) => {
                let header = format!(
                    "foreach ({}, {} in {})",
                    s.key_name.text,
                    s.value_name.text,
                    expression(&s.map)
                );
                self.block(&header, |p| p.statements(&s.statements));
            }
        }
    }
}

// ============================================================================
// Inline fragments
// ============================================================================

fn with_clause(traits: &[Id]) -> String {
    if traits.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = traits.iter().map(|t| t.text.as_str()).collect();
    format!(" with {}", names.join(", "))
}

fn constant_attributes(attrs: &[ConstantAttribute]) -> String {
    attrs.iter().map(|a| format!("{} ", a.keyword())).collect()
}

fn function_header(
    attrs: &[FunctionAttribute],
    name: &Id,
    params: &[TypedParameter],
    return_type: Option<&TypeAnnotation>,
) -> String {
    let mut text: String = attrs.iter().map(|a| format!("{} ", a.keyword())).collect();
    let params: Vec<String> = params
        .iter()
        .map(|p| format!("{}: {}", p.name.text, type_annotation(&p.type_ann)))
        .collect();
    text.push_str(&format!("fun {}({})", name.text, params.join(", ")));
    if let Some(ret) = return_type {
        text.push_str(": ");
        text.push_str(&type_annotation(ret));
    }
    text
}

fn receiver_selector(sub: &ReceiverSubKind) -> String {
    match sub {
        ReceiverSubKind::Simple { param, type_ann } => {
            format!("{}: {}", param.text, type_annotation(type_ann))
        }
        ReceiverSubKind::Fallback => String::new(),
        ReceiverSubKind::Comment(text) => string_literal(text),
    }
}

pub(crate) fn type_annotation(ty: &TypeAnnotation) -> String {
    match &ty.kind {
        TypeKind::Named(id) => id.text.clone(),
        TypeKind::Map { key, value } => format!("map<{}, {}>", key.text, value.text),
        TypeKind::Bounced(id) => format!("bounced<{}>", id.text),
    }
}

fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn number_literal(base: NumberBase, value: u64) -> String {
    match base {
        NumberBase::Bin => format!("0b{:b}", value),
        NumberBase::Oct => format!("0o{:o}", value),
        NumberBase::Dec => value.to_string(),
        NumberBase::Hex => format!("0x{:X}", value),
    }
}

/// Whether an expression prints as a single token or postfix chain and so
/// never needs parentheses as an operand.
fn is_atomic(expr: &Expression) -> bool {
    !matches!(
        expr.kind,
        ExpressionKind::OpBinary { .. }
            | ExpressionKind::OpUnary { .. }
            | ExpressionKind::Conditional { .. }
    )
}

fn operand(expr: &Expression) -> String {
    if is_atomic(expr) {
        expression(expr)
    } else {
        format!("({})", expression(expr))
    }
}

fn arguments(args: &[Expression]) -> String {
    let args: Vec<String> = args.iter().map(expression).collect();
    args.join(", ")
}

pub(crate) fn expression(expr: &Expression) -> String {
    match &expr.kind {
        ExpressionKind::Number { base, value } => number_literal(*base, *value),
        ExpressionKind::Boolean(b) => b.to_string(),
        ExpressionKind::String(s) => string_literal(s),
        ExpressionKind::Null => "null".to_string(),
        ExpressionKind::Id(id) => id.text.clone(),
        ExpressionKind::OpBinary { op, left, right } => {
            format!("{} {} {}", operand(left), op.symbol(), operand(right))
        }
        ExpressionKind::OpUnary { op, operand: inner } => {
            format!("{}{}", op.symbol(), operand(inner))
        }
        ExpressionKind::Conditional {
            condition,
            then_branch,
            else_branch,
        } => format!(
            "{} ? {} : {}",
            operand(condition),
            operand(then_branch),
            operand(else_branch)
        ),
        ExpressionKind::FieldAccess { aggregate, field } => {
            format!("{}.{}", operand(aggregate), field.text)
        }
        ExpressionKind::MethodCall {
            receiver,
            method,
            args,
        } => format!("{}.{}({})", operand(receiver), method.text, arguments(args)),
        ExpressionKind::StaticCall { function, args } => {
            format!("{}({})", function.text, arguments(args))
        }
        ExpressionKind::StructInstance { ty, args } => {
            if args.is_empty() {
                return format!("{} {{}}", ty.text);
            }
            let fields: Vec<String> = args
                .iter()
                .map(|a| format!("{}: {}", a.field.text, expression(&a.initializer)))
                .collect();
            format!("{} {{ {} }}", ty.text, fields.join(", "))
        }
    }
}
