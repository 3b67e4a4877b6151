//! Unit Evaluator Module
//!
//! Executes a `GeneratedUnit` against a `HostEnvironment`. Class loading and
//! every call whose owner is not the unit itself are delegated to the host;
//! static calls into the unit's own routines are dispatched here.

use crate::output::unit_ast::{
    Block, Constant, GeneratedUnit, Instruction, InvokeKind, MethodRef, Routine, ValueId,
    THROWABLE,
};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// A failure raised by the host, as seen by the generated code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{exception}: {message}")]
pub struct HostFault {
    pub exception: String,
    pub message: String,
}

impl HostFault {
    pub fn new(exception: &str, message: impl Into<String>) -> Self {
        HostFault {
            exception: exception.to_string(),
            message: message.into(),
        }
    }

    pub fn class_not_found(name: &str) -> Self {
        HostFault::new("java.lang.ClassNotFoundException", name)
    }

    pub fn no_such_field(class_name: &str, field: &str) -> Self {
        HostFault::new(
            "java.lang.NoSuchFieldException",
            format!("{}.{}", class_name, field),
        )
    }

    pub fn no_such_method(class_name: &str, method: &str) -> Self {
        HostFault::new(
            "java.lang.NoSuchMethodException",
            format!("{}.{}", class_name, method),
        )
    }
}

/// Reflective member handed out by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Constructor {
        declaring_class: String,
        params: Vec<String>,
    },
    Method {
        declaring_class: String,
        name: String,
        params: Vec<String>,
    },
    Field {
        declaring_class: String,
        name: String,
    },
}

pub type SharedValues = Rc<RefCell<Vec<HostValue>>>;

#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Bool(bool),
    Int(i32),
    Str(String),
    Class(String),
    Member(Member),
    Array(SharedValues),
    List(SharedValues),
    /// Opaque host object, tagged with its type name.
    Object(String),
    Throwable(HostFault),
}

impl HostValue {
    pub fn array(values: Vec<HostValue>) -> Self {
        HostValue::Array(Rc::new(RefCell::new(values)))
    }

    pub fn as_class(&self) -> Option<&str> {
        match self {
            HostValue::Class(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Snapshot of the elements of an array or list value.
    pub fn elements(&self) -> Option<Vec<HostValue>> {
        match self {
            HostValue::Array(values) | HostValue::List(values) => Some(values.borrow().clone()),
            _ => None,
        }
    }
}

/// The hosted side of an evaluation: the capabilities generated code calls.
pub trait HostEnvironment {
    fn load_class(&mut self, name: &str) -> Result<HostValue, HostFault>;

    fn new_instance(&mut self, class_name: &str) -> Result<HostValue, HostFault>;

    fn invoke(
        &mut self,
        kind: InvokeKind,
        method: &MethodRef,
        receiver: Option<&HostValue>,
        args: &[HostValue],
    ) -> Result<HostValue, HostFault>;
}

#[derive(Debug, Error, PartialEq)]
pub enum EvaluationError {
    #[error("unit has no routine `{0}`")]
    UnknownRoutine(String),

    #[error("uncaught failure escaped routine `{routine}`: {fault}")]
    Uncaught { routine: String, fault: HostFault },

    #[error("value {value} read before assignment in `{routine}`")]
    UnassignedValue { routine: String, value: ValueId },

    #[error("value {value} in `{routine}` is not an array")]
    NotAnArray { routine: String, value: ValueId },

    #[error("value {value} in `{routine}` is not a {expected}")]
    TypeMismatch {
        routine: String,
        value: ValueId,
        expected: &'static str,
    },

    #[error("routine `{routine}` has no argument {index}")]
    MissingArgument { routine: String, index: u16 },
}

enum Unwind {
    Fault(HostFault),
    Error(EvaluationError),
}

impl From<EvaluationError> for Unwind {
    fn from(error: EvaluationError) -> Self {
        Unwind::Error(error)
    }
}

type Flow = Result<Option<HostValue>, Unwind>;

struct Frame<'u> {
    routine: &'u Routine,
    args: Vec<HostValue>,
    values: Vec<Option<HostValue>>,
}

impl<'u> Frame<'u> {
    fn get(&self, id: ValueId) -> Result<HostValue, EvaluationError> {
        self.values
            .get(id.0 as usize)
            .and_then(|v| v.clone())
            .ok_or_else(|| EvaluationError::UnassignedValue {
                routine: self.routine.name.clone(),
                value: id,
            })
    }

    fn set(&mut self, id: ValueId, value: HostValue) {
        let index = id.0 as usize;
        if index >= self.values.len() {
            self.values.resize(index + 1, None);
        }
        self.values[index] = Some(value);
    }
}

pub struct UnitEvaluator<'u> {
    unit: &'u GeneratedUnit,
    binary_name: String,
}

impl<'u> UnitEvaluator<'u> {
    pub fn new(unit: &'u GeneratedUnit) -> Self {
        UnitEvaluator {
            binary_name: unit.binary_name(),
            unit,
        }
    }

    /// Runs `routine` to completion. A host fault that no isolated region
    /// catches is reported as `EvaluationError::Uncaught`.
    pub fn run(
        &self,
        host: &mut dyn HostEnvironment,
        routine: &str,
        args: Vec<HostValue>,
    ) -> Result<HostValue, EvaluationError> {
        match self.call(host, routine, args) {
            Ok(value) => Ok(value),
            Err(Unwind::Fault(fault)) => Err(EvaluationError::Uncaught {
                routine: routine.to_string(),
                fault,
            }),
            Err(Unwind::Error(error)) => Err(error),
        }
    }

    fn call(
        &self,
        host: &mut dyn HostEnvironment,
        name: &str,
        args: Vec<HostValue>,
    ) -> Result<HostValue, Unwind> {
        let routine = self
            .unit
            .routine(name)
            .ok_or_else(|| EvaluationError::UnknownRoutine(name.to_string()))?;
        let mut frame = Frame {
            routine,
            args,
            values: vec![None; routine.value_count as usize],
        };
        let returned = self.exec_block(host, &mut frame, &routine.body)?;
        Ok(returned.unwrap_or(HostValue::Null))
    }

    fn exec_block(&self, host: &mut dyn HostEnvironment, frame: &mut Frame<'u>, block: &Block) -> Flow {
        for instruction in &block.instructions {
            if let Some(returned) = self.exec(host, frame, instruction)? {
                return Ok(Some(returned));
            }
        }
        Ok(None)
    }

    fn exec(
        &self,
        host: &mut dyn HostEnvironment,
        frame: &mut Frame<'u>,
        instruction: &Instruction,
    ) -> Flow {
        match instruction {
            Instruction::Const { dest, value } => {
                let value = match value {
                    Constant::Null => HostValue::Null,
                    Constant::Bool(b) => HostValue::Bool(*b),
                    Constant::Int(i) => HostValue::Int(*i),
                    Constant::Str(s) => HostValue::Str(s.clone()),
                };
                frame.set(*dest, value);
            }
            Instruction::LoadClass { dest, class_name } => {
                let class = if *class_name == self.binary_name {
                    HostValue::Class(class_name.clone())
                } else {
                    host.load_class(class_name).map_err(Unwind::Fault)?
                };
                frame.set(*dest, class);
            }
            Instruction::Param { dest, index } => {
                let value = frame.args.get(*index as usize).cloned().ok_or_else(|| {
                    EvaluationError::MissingArgument {
                        routine: frame.routine.name.clone(),
                        index: *index,
                    }
                })?;
                frame.set(*dest, value);
            }
            Instruction::Invoke {
                dest,
                kind,
                method,
                receiver,
                args,
            } => {
                let args = args
                    .iter()
                    .map(|a| frame.get(*a))
                    .collect::<Result<Vec<_>, _>>()?;
                let result = if *kind == InvokeKind::Static && method.owner == self.binary_name {
                    self.call(host, &method.name, args)?
                } else {
                    let receiver = receiver.map(|r| frame.get(r)).transpose()?;
                    host.invoke(*kind, method, receiver.as_ref(), &args)
                        .map_err(Unwind::Fault)?
                };
                frame.set(*dest, result);
            }
            Instruction::NewInstance { dest, class_name } => {
                let object = host.new_instance(class_name).map_err(Unwind::Fault)?;
                frame.set(*dest, object);
            }
            Instruction::NewArray { dest, length, .. } => {
                frame.set(*dest, HostValue::array(vec![HostValue::Null; *length as usize]));
            }
            Instruction::ArrayStore {
                array,
                index,
                value,
            } => {
                let value = frame.get(*value)?;
                match frame.get(*array)? {
                    HostValue::Array(values) => {
                        let mut values = values.borrow_mut();
                        let slot = values.get_mut(*index as usize).ok_or_else(|| {
                            Unwind::Fault(HostFault::new(
                                "java.lang.ArrayIndexOutOfBoundsException",
                                index.to_string(),
                            ))
                        })?;
                        *slot = value;
                    }
                    _ => {
                        return Err(EvaluationError::NotAnArray {
                            routine: frame.routine.name.clone(),
                            value: *array,
                        }
                        .into())
                    }
                }
            }
            Instruction::DeclareVariable { dest, .. } => frame.set(*dest, HostValue::Null),
            Instruction::Assign { target, value } => {
                let value = frame.get(*value)?;
                frame.set(*target, value);
            }
            Instruction::IfTrue {
                condition,
                then_block,
                else_block,
            } => {
                let branch = match frame.get(*condition)? {
                    HostValue::Bool(true) => then_block,
                    HostValue::Bool(false) => else_block,
                    _ => {
                        return Err(EvaluationError::TypeMismatch {
                            routine: frame.routine.name.clone(),
                            value: *condition,
                            expected: "boolean",
                        }
                        .into())
                    }
                };
                return self.exec_block(host, frame, branch);
            }
            Instruction::Try(region) => match self.exec_block(host, frame, &region.body) {
                Err(Unwind::Fault(fault))
                    if region.exception_type == THROWABLE
                        || region.exception_type == fault.exception =>
                {
                    frame.set(region.caught, HostValue::Throwable(fault));
                    return self.exec_block(host, frame, &region.handler);
                }
                other => return other,
            },
            Instruction::Return { value } => {
                let value = match value {
                    Some(v) => frame.get(*v)?,
                    None => HostValue::Null,
                };
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}
