//! Listing Emitter Module
//!
//! Renders a `GeneratedUnit` as an indented, human-readable listing. The
//! output is a pure function of the unit, so it doubles as a structural
//! fingerprint in tests and diagnostics.

use crate::output::unit_ast::{Block, Constant, GeneratedUnit, Instruction, Routine};

const INDENT_WITH: &str = "  ";

#[derive(Debug, Clone)]
struct EmittedLine {
    parts: Vec<String>,
    indent: usize,
}

impl EmittedLine {
    fn new(indent: usize) -> Self {
        EmittedLine {
            parts: Vec::new(),
            indent,
        }
    }
}

pub struct ListingContext {
    lines: Vec<EmittedLine>,
    indent: usize,
}

impl ListingContext {
    pub fn create_root() -> Self {
        ListingContext {
            lines: vec![EmittedLine::new(0)],
            indent: 0,
        }
    }

    fn current_line_mut(&mut self) -> &mut EmittedLine {
        if self.lines.is_empty() {
            self.lines.push(EmittedLine::new(self.indent));
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    fn line_is_empty(&self) -> bool {
        self.lines.last().map_or(true, |l| l.parts.is_empty())
    }

    pub fn print(&mut self, part: &str, new_line: bool) {
        if !part.is_empty() {
            self.current_line_mut().parts.push(part.to_string());
        }
        if new_line {
            self.lines.push(EmittedLine::new(self.indent));
        }
    }

    pub fn println(&mut self, last_part: &str) {
        self.print(last_part, true);
    }

    pub fn inc_indent(&mut self) {
        self.indent += 1;
        if self.line_is_empty() {
            self.current_line_mut().indent = self.indent;
        }
    }

    pub fn dec_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        if self.line_is_empty() {
            self.current_line_mut().indent = self.indent;
        }
    }

    pub fn to_source(&self) -> String {
        let mut out = self
            .lines
            .iter()
            .map(|l| {
                if l.parts.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", INDENT_WITH.repeat(l.indent), l.parts.join(""))
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        while out.ends_with("\n\n") {
            out.pop();
        }
        out
    }
}

/// Renders the complete listing of `unit`.
pub fn emit_listing(unit: &GeneratedUnit) -> String {
    let mut ctx = ListingContext::create_root();

    let mut header = format!("unit {} extends {}", unit.binary_name(), unit.super_class);
    if !unit.interfaces.is_empty() {
        header.push_str(" implements ");
        header.push_str(&unit.interfaces.join(", "));
    }
    for annotation in &unit.annotations {
        ctx.println(&format!("@{}", annotation));
    }
    ctx.println(&header);

    for routine in &unit.routines {
        ctx.println("");
        emit_routine(&mut ctx, routine);
    }
    ctx.to_source()
}

fn emit_routine(ctx: &mut ListingContext, routine: &Routine) {
    let mut signature = routine.modifiers.keywords().join(" ");
    if !signature.is_empty() {
        signature.push(' ');
    }
    signature.push_str(&format!(
        "routine {}({}) -> {} {{",
        routine.name,
        routine.params.join(", "),
        routine.return_type
    ));
    ctx.println(&signature);
    ctx.inc_indent();
    emit_block(ctx, &routine.body);
    ctx.dec_indent();
    ctx.println("}");
}

fn emit_block(ctx: &mut ListingContext, block: &Block) {
    for instruction in &block.instructions {
        emit_instruction(ctx, instruction);
    }
}

fn emit_instruction(ctx: &mut ListingContext, instruction: &Instruction) {
    match instruction {
        Instruction::Const { dest, value } => {
            let rendered = match value {
                Constant::Null => "null".to_string(),
                Constant::Bool(b) => b.to_string(),
                Constant::Int(i) => i.to_string(),
                Constant::Str(s) => format!("{:?}", s),
            };
            ctx.println(&format!("{} = const {}", dest, rendered));
        }
        Instruction::LoadClass { dest, class_name } => {
            ctx.println(&format!("{} = class {}", dest, class_name));
        }
        Instruction::Param { dest, index } => {
            ctx.println(&format!("{} = param {}", dest, index));
        }
        Instruction::Invoke {
            dest,
            kind,
            method,
            receiver,
            args,
        } => {
            if method.returns_value() {
                ctx.print(&format!("{} = ", dest), false);
            }
            ctx.print(&format!("invoke {} {}", kind.as_str(), method), false);
            if let Some(receiver) = receiver {
                ctx.print(&format!(" on {}", receiver), false);
            }
            let args = args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
            ctx.println(&format!(" ({})", args.join(", ")));
        }
        Instruction::NewInstance { dest, class_name } => {
            ctx.println(&format!("{} = new {}()", dest, class_name));
        }
        Instruction::NewArray {
            dest,
            component,
            length,
        } => {
            ctx.println(&format!("{} = new {}[{}]", dest, component, length));
        }
        Instruction::ArrayStore {
            array,
            index,
            value,
        } => {
            ctx.println(&format!("{}[{}] = {}", array, index, value));
        }
        Instruction::DeclareVariable { dest, type_name } => {
            ctx.println(&format!("{} = var {}", dest, type_name));
        }
        Instruction::Assign { target, value } => {
            ctx.println(&format!("{} := {}", target, value));
        }
        Instruction::IfTrue {
            condition,
            then_block,
            else_block,
        } => {
            ctx.println(&format!("if {} {{", condition));
            ctx.inc_indent();
            emit_block(ctx, then_block);
            ctx.dec_indent();
            ctx.println("} else {");
            ctx.inc_indent();
            emit_block(ctx, else_block);
            ctx.dec_indent();
            ctx.println("}");
        }
        Instruction::Try(region) => {
            ctx.println("try {");
            ctx.inc_indent();
            emit_block(ctx, &region.body);
            ctx.dec_indent();
            ctx.println(&format!(
                "}} catch {} {} {{",
                region.exception_type, region.caught
            ));
            ctx.inc_indent();
            emit_block(ctx, &region.handler);
            ctx.dec_indent();
            ctx.println("}");
        }
        Instruction::Return { value } => match value {
            Some(v) => ctx.println(&format!("return {}", v)),
            None => ctx.println("return"),
        },
    }
}
