//! Unit AST Module
//!
//! In-memory representation of a generated initialization unit. A unit is a
//! named type with routines; each routine body is a tree of structured blocks
//! whose instructions produce values addressed through opaque `ValueId`s.

use bitflags::bitflags;
use std::fmt;

/// Binary name of the throwable root type caught by isolated regions.
pub const THROWABLE: &str = "java.lang.Throwable";

/// Return type of routines and calls that produce no value.
pub const VOID: &str = "void";

/// Handle to a value produced inside a routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    Null,
    Bool(bool),
    Int(i32),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeKind {
    Static,
    Virtual,
    Interface,
}

impl InvokeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvokeKind::Static => "static",
            InvokeKind::Virtual => "virtual",
            InvokeKind::Interface => "interface",
        }
    }
}

/// Reference to a method on some owner type, identified by name and
/// parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub owner: String,
    pub name: String,
    pub params: Vec<String>,
    pub return_type: String,
}

impl MethodRef {
    pub fn new(owner: &str, name: &str, return_type: &str, params: &[&str]) -> Self {
        MethodRef {
            owner: owner.to_string(),
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            return_type: return_type.to_string(),
        }
    }

    pub fn returns_value(&self) -> bool {
        self.return_type != VOID
    }

    pub fn is(&self, owner: &str, name: &str) -> bool {
        self.owner == owner && self.name == name
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}({}) -> {}",
            self.owner,
            self.name,
            self.params.join(", "),
            self.return_type
        )
    }
}

bitflags! {
    /// Access modifiers of a generated routine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const STATIC = 0x0008;
    }
}

impl Modifiers {
    pub fn keywords(&self) -> Vec<&'static str> {
        let mut words = Vec::new();
        if self.contains(Modifiers::PUBLIC) {
            words.push("public");
        }
        if self.contains(Modifiers::PRIVATE) {
            words.push("private");
        }
        if self.contains(Modifiers::STATIC) {
            words.push("static");
        }
        words
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Const {
        dest: ValueId,
        value: Constant,
    },
    LoadClass {
        dest: ValueId,
        class_name: String,
    },
    Param {
        dest: ValueId,
        index: u16,
    },
    /// `dest` is always allocated; it holds null when the method is void.
    Invoke {
        dest: ValueId,
        kind: InvokeKind,
        method: MethodRef,
        receiver: Option<ValueId>,
        args: Vec<ValueId>,
    },
    NewInstance {
        dest: ValueId,
        class_name: String,
    },
    NewArray {
        dest: ValueId,
        component: String,
        length: u32,
    },
    ArrayStore {
        array: ValueId,
        index: u32,
        value: ValueId,
    },
    DeclareVariable {
        dest: ValueId,
        type_name: String,
    },
    Assign {
        target: ValueId,
        value: ValueId,
    },
    IfTrue {
        condition: ValueId,
        then_block: Block,
        else_block: Block,
    },
    Try(TryRegion),
    Return {
        value: Option<ValueId>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub instructions: Vec<Instruction>,
}

impl Block {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Block { instructions }
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Visits every instruction depth-first, in emission order, including
    /// those nested in branches and isolated regions.
    pub fn visit(&self, visitor: &mut dyn FnMut(&Instruction)) {
        for instruction in &self.instructions {
            visitor(instruction);
            match instruction {
                Instruction::IfTrue {
                    then_block,
                    else_block,
                    ..
                } => {
                    then_block.visit(visitor);
                    else_block.visit(visitor);
                }
                Instruction::Try(region) => {
                    region.body.visit(visitor);
                    region.handler.visit(visitor);
                }
                _ => {}
            }
        }
    }

    /// All invoked methods in emission order.
    pub fn invoked_methods(&self) -> Vec<&MethodRef> {
        let mut methods = Vec::new();
        for instruction in &self.instructions {
            collect_invocations(instruction, &mut methods);
        }
        methods
    }
}

fn collect_invocations<'a>(instruction: &'a Instruction, out: &mut Vec<&'a MethodRef>) {
    match instruction {
        Instruction::Invoke { method, .. } => out.push(method),
        Instruction::IfTrue {
            then_block,
            else_block,
            ..
        } => {
            out.extend(then_block.invoked_methods());
            out.extend(else_block.invoked_methods());
        }
        Instruction::Try(region) => {
            out.extend(region.body.invoked_methods());
            out.extend(region.handler.invoked_methods());
        }
        _ => {}
    }
}

/// An isolated region: a failure raised in `body` whose type matches
/// `exception_type` is bound to `caught` and handled by `handler`, after which
/// execution resumes behind the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryRegion {
    pub body: Block,
    pub exception_type: String,
    pub caught: ValueId,
    pub handler: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    pub name: String,
    pub modifiers: Modifiers,
    pub params: Vec<String>,
    pub return_type: String,
    /// Number of value slots the body allocates.
    pub value_count: u32,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Internal name, `/`-separated.
    pub name: String,
    pub super_class: String,
    pub interfaces: Vec<String>,
    pub annotations: Vec<String>,
    pub routines: Vec<Routine>,
}

impl GeneratedUnit {
    /// Dotted form of the unit name, as used by class loading.
    pub fn binary_name(&self) -> String {
        self.name.replace('/', ".")
    }

    pub fn routine(&self, name: &str) -> Option<&Routine> {
        self.routines.iter().find(|r| r.name == name)
    }

    pub fn routine_names(&self) -> Vec<&str> {
        self.routines.iter().map(|r| r.name.as_str()).collect()
    }
}
