//! Unit Builder Module
//!
//! Builders for `GeneratedUnit`s. Routines are reserved by name first and
//! defined later, so a routine can call a worker that is only generated while
//! its own body is being built, while the unit keeps routines in reservation
//! order.

use crate::error::{Result, SynthesisError};
use crate::output::unit_ast::{
    Block, Constant, GeneratedUnit, Instruction, InvokeKind, MethodRef, Modifiers, Routine,
    TryRegion, ValueId,
};
use indexmap::IndexMap;

pub struct UnitBuilder {
    name: String,
    super_class: String,
    interfaces: Vec<String>,
    annotations: Vec<String>,
    routines: IndexMap<String, Option<Routine>>,
}

impl UnitBuilder {
    pub fn new(name: &str, super_class: &str, interfaces: &[&str]) -> Self {
        UnitBuilder {
            name: name.to_string(),
            super_class: super_class.to_string(),
            interfaces: interfaces.iter().map(|i| i.to_string()).collect(),
            annotations: Vec::new(),
            routines: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binary_name(&self) -> String {
        self.name.replace('/', ".")
    }

    pub fn add_annotation(&mut self, annotation: &str) {
        self.annotations.push(annotation.to_string());
    }

    pub fn has_routine(&self, name: &str) -> bool {
        self.routines.contains_key(name)
    }

    /// Claims the slot for `name` at the current position.
    pub fn reserve_routine(&mut self, name: &str) -> Result<()> {
        if self.routines.contains_key(name) {
            return Err(SynthesisError::DuplicateRoutine {
                routine: name.to_string(),
                unit: self.name.clone(),
            });
        }
        self.routines.insert(name.to_string(), None);
        Ok(())
    }

    /// Fills a reserved slot, or appends the routine when none was reserved.
    pub fn define_routine(&mut self, routine: Routine) -> Result<()> {
        match self.routines.get_mut(&routine.name) {
            Some(Some(_)) => Err(SynthesisError::DuplicateRoutine {
                routine: routine.name,
                unit: self.name.clone(),
            }),
            Some(slot) => {
                *slot = Some(routine);
                Ok(())
            }
            None => {
                self.routines.insert(routine.name.clone(), Some(routine));
                Ok(())
            }
        }
    }

    pub fn finish(self) -> Result<GeneratedUnit> {
        let mut routines = Vec::with_capacity(self.routines.len());
        for (name, routine) in self.routines {
            routines.push(routine.ok_or(SynthesisError::UndefinedRoutine(name))?);
        }
        Ok(GeneratedUnit {
            name: self.name,
            super_class: self.super_class,
            interfaces: self.interfaces,
            annotations: self.annotations,
            routines,
        })
    }
}

pub struct RoutineBuilder {
    name: String,
    modifiers: Modifiers,
    params: Vec<String>,
    return_type: String,
    next_value: u32,
}

impl RoutineBuilder {
    pub fn new(name: &str, return_type: &str, params: &[&str]) -> Self {
        RoutineBuilder {
            name: name.to_string(),
            modifiers: Modifiers::PUBLIC,
            params: params.iter().map(|p| p.to_string()).collect(),
            return_type: return_type.to_string(),
            next_value: 0,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Reference through which other routines of `owner` invoke this one.
    pub fn method_ref(&self, owner: &str) -> MethodRef {
        MethodRef {
            owner: owner.to_string(),
            name: self.name.clone(),
            params: self.params.clone(),
            return_type: self.return_type.clone(),
        }
    }

    pub fn build<E, F>(mut self, body: F) -> std::result::Result<Routine, E>
    where
        F: FnOnce(&mut BlockBuilder<'_>) -> std::result::Result<(), E>,
    {
        let mut block = BlockBuilder::new(&mut self.next_value);
        body(&mut block)?;
        let body = block.into_block();
        Ok(Routine {
            name: self.name,
            modifiers: self.modifiers,
            params: self.params,
            return_type: self.return_type,
            value_count: self.next_value,
            body,
        })
    }
}

/// Appends instructions to one block of a routine. Nested regions get their
/// own child builder sharing the routine's value counter.
pub struct BlockBuilder<'r> {
    next_value: &'r mut u32,
    instructions: Vec<Instruction>,
}

impl<'r> BlockBuilder<'r> {
    fn new(next_value: &'r mut u32) -> Self {
        BlockBuilder {
            next_value,
            instructions: Vec::new(),
        }
    }

    fn into_block(self) -> Block {
        Block::new(self.instructions)
    }

    fn alloc(&mut self) -> ValueId {
        let id = ValueId(*self.next_value);
        *self.next_value += 1;
        id
    }

    fn child(&mut self) -> BlockBuilder<'_> {
        BlockBuilder::new(&mut *self.next_value)
    }

    fn constant(&mut self, value: Constant) -> ValueId {
        let dest = self.alloc();
        self.instructions.push(Instruction::Const { dest, value });
        dest
    }

    pub fn load_null(&mut self) -> ValueId {
        self.constant(Constant::Null)
    }

    pub fn load_bool(&mut self, value: bool) -> ValueId {
        self.constant(Constant::Bool(value))
    }

    pub fn load_int(&mut self, value: i32) -> ValueId {
        self.constant(Constant::Int(value))
    }

    pub fn load_str(&mut self, value: &str) -> ValueId {
        self.constant(Constant::Str(value.to_string()))
    }

    pub fn load_class(&mut self, class_name: &str) -> ValueId {
        let dest = self.alloc();
        self.instructions.push(Instruction::LoadClass {
            dest,
            class_name: class_name.to_string(),
        });
        dest
    }

    pub fn param(&mut self, index: u16) -> ValueId {
        let dest = self.alloc();
        self.instructions.push(Instruction::Param { dest, index });
        dest
    }

    fn invoke(
        &mut self,
        kind: InvokeKind,
        method: &MethodRef,
        receiver: Option<ValueId>,
        args: &[ValueId],
    ) -> ValueId {
        let dest = self.alloc();
        self.instructions.push(Instruction::Invoke {
            dest,
            kind,
            method: method.clone(),
            receiver,
            args: args.to_vec(),
        });
        dest
    }

    pub fn invoke_static(&mut self, method: &MethodRef, args: &[ValueId]) -> ValueId {
        self.invoke(InvokeKind::Static, method, None, args)
    }

    pub fn invoke_virtual(
        &mut self,
        method: &MethodRef,
        receiver: ValueId,
        args: &[ValueId],
    ) -> ValueId {
        self.invoke(InvokeKind::Virtual, method, Some(receiver), args)
    }

    pub fn invoke_interface(
        &mut self,
        method: &MethodRef,
        receiver: ValueId,
        args: &[ValueId],
    ) -> ValueId {
        self.invoke(InvokeKind::Interface, method, Some(receiver), args)
    }

    pub fn new_instance(&mut self, class_name: &str) -> ValueId {
        let dest = self.alloc();
        self.instructions.push(Instruction::NewInstance {
            dest,
            class_name: class_name.to_string(),
        });
        dest
    }

    pub fn new_array(&mut self, component: &str, length: u32) -> ValueId {
        let dest = self.alloc();
        self.instructions.push(Instruction::NewArray {
            dest,
            component: component.to_string(),
            length,
        });
        dest
    }

    pub fn array_store(&mut self, array: ValueId, index: u32, value: ValueId) {
        self.instructions.push(Instruction::ArrayStore {
            array,
            index,
            value,
        });
    }

    /// New array of `component` holding `values` in order.
    pub fn marshal_as_array(&mut self, component: &str, values: &[ValueId]) -> ValueId {
        let array = self.new_array(component, values.len() as u32);
        for (index, value) in values.iter().enumerate() {
            self.array_store(array, index as u32, *value);
        }
        array
    }

    pub fn declare_variable(&mut self, type_name: &str) -> ValueId {
        let dest = self.alloc();
        self.instructions.push(Instruction::DeclareVariable {
            dest,
            type_name: type_name.to_string(),
        });
        dest
    }

    pub fn assign(&mut self, target: ValueId, value: ValueId) {
        self.instructions.push(Instruction::Assign { target, value });
    }

    pub fn if_true<E, T, F>(
        &mut self,
        condition: ValueId,
        then_branch: T,
        else_branch: F,
    ) -> std::result::Result<(), E>
    where
        T: FnOnce(&mut BlockBuilder<'_>) -> std::result::Result<(), E>,
        F: FnOnce(&mut BlockBuilder<'_>) -> std::result::Result<(), E>,
    {
        let mut then_builder = self.child();
        then_branch(&mut then_builder)?;
        let then_block = then_builder.into_block();

        let mut else_builder = self.child();
        else_branch(&mut else_builder)?;
        let else_block = else_builder.into_block();

        self.instructions.push(Instruction::IfTrue {
            condition,
            then_block,
            else_block,
        });
        Ok(())
    }

    /// Emits an isolated region catching `exception_type`. The handler
    /// receives the value the caught failure is bound to.
    pub fn try_catch<E, B, H>(
        &mut self,
        exception_type: &str,
        body: B,
        handler: H,
    ) -> std::result::Result<(), E>
    where
        B: FnOnce(&mut BlockBuilder<'_>) -> std::result::Result<(), E>,
        H: FnOnce(&mut BlockBuilder<'_>, ValueId) -> std::result::Result<(), E>,
    {
        let mut body_builder = self.child();
        body(&mut body_builder)?;
        let body = body_builder.into_block();

        let caught = self.alloc();
        let mut handler_builder = self.child();
        handler(&mut handler_builder, caught)?;
        let handler = handler_builder.into_block();

        self.instructions.push(Instruction::Try(TryRegion {
            body,
            exception_type: exception_type.to_string(),
            caught,
            handler,
        }));
        Ok(())
    }

    pub fn return_value(&mut self, value: ValueId) {
        self.instructions.push(Instruction::Return { value: Some(value) });
    }

    pub fn return_void(&mut self) {
        self.instructions.push(Instruction::Return { value: None });
    }
}
