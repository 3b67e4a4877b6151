//! Binary unit format.
//!
//! Layout:
//! - Magic: "NFEU" (4 bytes)
//! - Version: u32 (little-endian)
//! - String pool: count + length-prefixed UTF-8 strings
//! - Unit header: name, super class, interfaces, annotations
//! - Routines: count + routine data, each with a structured instruction stream
//!
//! Every name is stored as a u32 index into the string pool, and every count
//! and length is a u32.

use crate::output::unit_ast::{
    Block, Constant, GeneratedUnit, Instruction, InvokeKind, MethodRef, Modifiers, Routine,
    TryRegion, ValueId,
};
use indexmap::IndexSet;
use std::io::{self, Read};
use thiserror::Error;

/// Magic bytes for serialized units
pub const MAGIC: &[u8; 4] = b"NFEU";

/// Current format version
pub const VERSION: u32 = 2;

const OP_CONST_NULL: u8 = 0x01;
const OP_CONST_BOOL: u8 = 0x02;
const OP_CONST_INT: u8 = 0x03;
const OP_CONST_STR: u8 = 0x04;
const OP_LOAD_CLASS: u8 = 0x05;
const OP_PARAM: u8 = 0x06;
const OP_INVOKE: u8 = 0x07;
const OP_NEW_INSTANCE: u8 = 0x08;
const OP_NEW_ARRAY: u8 = 0x09;
const OP_ARRAY_STORE: u8 = 0x0A;
const OP_DECLARE_VARIABLE: u8 = 0x0B;
const OP_ASSIGN: u8 = 0x0C;
const OP_IF_TRUE: u8 = 0x0D;
const OP_TRY: u8 = 0x0E;
const OP_RETURN: u8 = 0x0F;

#[derive(Debug, Error)]
pub enum UnitFormatError {
    #[error("invalid magic number")]
    InvalidMagic,
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u32),
    #[error("unexpected end of data")]
    UnexpectedEof,
    #[error("invalid opcode: {0:#04x}")]
    InvalidOpcode(u8),
    #[error("invalid invoke kind: {0}")]
    InvalidInvokeKind(u8),
    #[error("string index {0} out of range")]
    InvalidStringIndex(u32),
    #[error("invalid UTF-8 string")]
    InvalidUtf8,
    #[error("{what} count {count} does not fit the format")]
    TooLarge { what: &'static str, count: usize },
    #[error("length {len} exceeds the {remaining} bytes remaining")]
    LengthOutOfBounds { len: u32, remaining: usize },
    #[error("{0} unexpected bytes after the last routine")]
    TrailingData(usize),
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for UnitFormatError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            UnitFormatError::UnexpectedEof
        } else {
            UnitFormatError::Io(e)
        }
    }
}

/// Serialize a unit to bytes.
pub fn serialize(unit: &GeneratedUnit) -> Result<Vec<u8>, UnitFormatError> {
    let mut pool = StringPool::default();
    let mut body = Vec::new();
    write_unit_body(&mut body, &mut pool, unit)?;

    let mut out = Vec::with_capacity(body.len() + 64);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    put_count(&mut out, "string pool", pool.strings.len())?;
    for s in &pool.strings {
        put_count(&mut out, "string byte", s.len())?;
        out.extend_from_slice(s.as_bytes());
    }
    out.extend_from_slice(&body);
    Ok(out)
}

/// Deserialize a unit from bytes. The whole input must be consumed.
pub fn deserialize(data: &[u8]) -> Result<GeneratedUnit, UnitFormatError> {
    let mut cursor = io::Cursor::new(data);
    let unit = read_unit(&mut cursor)?;
    let trailing = remaining(&cursor);
    if trailing > 0 {
        return Err(UnitFormatError::TrailingData(trailing));
    }
    Ok(unit)
}

#[derive(Default)]
struct StringPool {
    strings: IndexSet<String>,
}

impl StringPool {
    fn intern(&mut self, s: &str) -> u32 {
        if let Some(index) = self.strings.get_index_of(s) {
            return index as u32;
        }
        self.strings.insert_full(s.to_string()).0 as u32
    }
}

// Writes into a Vec never fail, so the writer half works on Vec<u8> directly.

fn put_u8(w: &mut Vec<u8>, v: u8) {
    w.push(v);
}

fn put_u16(w: &mut Vec<u8>, v: u16) {
    w.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(w: &mut Vec<u8>, v: u32) {
    w.extend_from_slice(&v.to_le_bytes());
}

fn put_count(w: &mut Vec<u8>, what: &'static str, count: usize) -> Result<(), UnitFormatError> {
    let v = u32::try_from(count).map_err(|_| UnitFormatError::TooLarge { what, count })?;
    put_u32(w, v);
    Ok(())
}

fn put_str(w: &mut Vec<u8>, pool: &mut StringPool, s: &str) {
    let index = pool.intern(s);
    put_u32(w, index);
}

fn put_strs(w: &mut Vec<u8>, pool: &mut StringPool, strs: &[String]) -> Result<(), UnitFormatError> {
    put_count(w, "string list", strs.len())?;
    for s in strs {
        put_str(w, pool, s);
    }
    Ok(())
}

fn put_value(w: &mut Vec<u8>, v: ValueId) {
    put_u32(w, v.0);
}

fn write_unit_body(
    w: &mut Vec<u8>,
    pool: &mut StringPool,
    unit: &GeneratedUnit,
) -> Result<(), UnitFormatError> {
    put_str(w, pool, &unit.name);
    put_str(w, pool, &unit.super_class);
    put_strs(w, pool, &unit.interfaces)?;
    put_strs(w, pool, &unit.annotations)?;

    put_count(w, "routine", unit.routines.len())?;
    for routine in &unit.routines {
        put_str(w, pool, &routine.name);
        put_u16(w, routine.modifiers.bits());
        put_strs(w, pool, &routine.params)?;
        put_str(w, pool, &routine.return_type);
        put_u32(w, routine.value_count);
        write_block(w, pool, &routine.body)?;
    }
    Ok(())
}

fn write_block(w: &mut Vec<u8>, pool: &mut StringPool, block: &Block) -> Result<(), UnitFormatError> {
    put_count(w, "instruction", block.instructions.len())?;
    for instruction in &block.instructions {
        write_instruction(w, pool, instruction)?;
    }
    Ok(())
}

fn write_instruction(
    w: &mut Vec<u8>,
    pool: &mut StringPool,
    instruction: &Instruction,
) -> Result<(), UnitFormatError> {
    match instruction {
        Instruction::Const { dest, value } => match value {
            Constant::Null => {
                put_u8(w, OP_CONST_NULL);
                put_value(w, *dest);
            }
            Constant::Bool(b) => {
                put_u8(w, OP_CONST_BOOL);
                put_value(w, *dest);
                put_u8(w, *b as u8);
            }
            Constant::Int(i) => {
                put_u8(w, OP_CONST_INT);
                put_value(w, *dest);
                w.extend_from_slice(&i.to_le_bytes());
            }
            Constant::Str(s) => {
                put_u8(w, OP_CONST_STR);
                put_value(w, *dest);
                put_str(w, pool, s);
            }
        },
        Instruction::LoadClass { dest, class_name } => {
            put_u8(w, OP_LOAD_CLASS);
            put_value(w, *dest);
            put_str(w, pool, class_name);
        }
        Instruction::Param { dest, index } => {
            put_u8(w, OP_PARAM);
            put_value(w, *dest);
            put_u16(w, *index);
        }
        Instruction::Invoke {
            dest,
            kind,
            method,
            receiver,
            args,
        } => {
            put_u8(w, OP_INVOKE);
            put_value(w, *dest);
            put_u8(
                w,
                match kind {
                    InvokeKind::Static => 0,
                    InvokeKind::Virtual => 1,
                    InvokeKind::Interface => 2,
                },
            );
            put_str(w, pool, &method.owner);
            put_str(w, pool, &method.name);
            put_strs(w, pool, &method.params)?;
            put_str(w, pool, &method.return_type);
            match receiver {
                Some(r) => {
                    put_u8(w, 1);
                    put_value(w, *r);
                }
                None => put_u8(w, 0),
            }
            put_count(w, "argument", args.len())?;
            for arg in args {
                put_value(w, *arg);
            }
        }
        Instruction::NewInstance { dest, class_name } => {
            put_u8(w, OP_NEW_INSTANCE);
            put_value(w, *dest);
            put_str(w, pool, class_name);
        }
        Instruction::NewArray {
            dest,
            component,
            length,
        } => {
            put_u8(w, OP_NEW_ARRAY);
            put_value(w, *dest);
            put_str(w, pool, component);
            put_u32(w, *length);
        }
        Instruction::ArrayStore {
            array,
            index,
            value,
        } => {
            put_u8(w, OP_ARRAY_STORE);
            put_value(w, *array);
            put_u32(w, *index);
            put_value(w, *value);
        }
        Instruction::DeclareVariable { dest, type_name } => {
            put_u8(w, OP_DECLARE_VARIABLE);
            put_value(w, *dest);
            put_str(w, pool, type_name);
        }
        Instruction::Assign { target, value } => {
            put_u8(w, OP_ASSIGN);
            put_value(w, *target);
            put_value(w, *value);
        }
        Instruction::IfTrue {
            condition,
            then_block,
            else_block,
        } => {
            put_u8(w, OP_IF_TRUE);
            put_value(w, *condition);
            write_block(w, pool, then_block)?;
            write_block(w, pool, else_block)?;
        }
        Instruction::Try(region) => {
            put_u8(w, OP_TRY);
            write_block(w, pool, &region.body)?;
            put_str(w, pool, &region.exception_type);
            put_value(w, region.caught);
            write_block(w, pool, &region.handler)?;
        }
        Instruction::Return { value } => {
            put_u8(w, OP_RETURN);
            match value {
                Some(v) => {
                    put_u8(w, 1);
                    put_value(w, *v);
                }
                None => put_u8(w, 0),
            }
        }
    }
    Ok(())
}

fn read_u8<R: Read>(r: &mut R) -> Result<u8, UnitFormatError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u16<R: Read>(r: &mut R) -> Result<u16, UnitFormatError> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32, UnitFormatError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_i32<R: Read>(r: &mut R) -> Result<i32, UnitFormatError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

struct Reader<'p, R> {
    r: R,
    pool: &'p [String],
}

impl<'p, R: Read> Reader<'p, R> {
    fn string(&mut self) -> Result<String, UnitFormatError> {
        let index = read_u32(&mut self.r)?;
        self.pool
            .get(index as usize)
            .cloned()
            .ok_or(UnitFormatError::InvalidStringIndex(index))
    }

    fn strings(&mut self) -> Result<Vec<String>, UnitFormatError> {
        let count = read_u32(&mut self.r)?;
        (0..count).map(|_| self.string()).collect()
    }

    fn value(&mut self) -> Result<ValueId, UnitFormatError> {
        Ok(ValueId(read_u32(&mut self.r)?))
    }

    fn block(&mut self) -> Result<Block, UnitFormatError> {
        let count = read_u32(&mut self.r)?;
        let mut instructions = Vec::new();
        for _ in 0..count {
            instructions.push(self.instruction()?);
        }
        Ok(Block::new(instructions))
    }

    fn instruction(&mut self) -> Result<Instruction, UnitFormatError> {
        let op = read_u8(&mut self.r)?;
        let instruction = match op {
            OP_CONST_NULL => Instruction::Const {
                dest: self.value()?,
                value: Constant::Null,
            },
            OP_CONST_BOOL => Instruction::Const {
                dest: self.value()?,
                value: Constant::Bool(read_u8(&mut self.r)? != 0),
            },
            OP_CONST_INT => Instruction::Const {
                dest: self.value()?,
                value: Constant::Int(read_i32(&mut self.r)?),
            },
            OP_CONST_STR => Instruction::Const {
                dest: self.value()?,
                value: Constant::Str(self.string()?),
            },
            OP_LOAD_CLASS => Instruction::LoadClass {
                dest: self.value()?,
                class_name: self.string()?,
            },
            OP_PARAM => Instruction::Param {
                dest: self.value()?,
                index: read_u16(&mut self.r)?,
            },
            OP_INVOKE => {
                let dest = self.value()?;
                let kind = match read_u8(&mut self.r)? {
                    0 => InvokeKind::Static,
                    1 => InvokeKind::Virtual,
                    2 => InvokeKind::Interface,
                    other => return Err(UnitFormatError::InvalidInvokeKind(other)),
                };
                let method = MethodRef {
                    owner: self.string()?,
                    name: self.string()?,
                    params: self.strings()?,
                    return_type: self.string()?,
                };
                let receiver = match read_u8(&mut self.r)? {
                    0 => None,
                    _ => Some(self.value()?),
                };
                let arg_count = read_u32(&mut self.r)?;
                let mut args = Vec::new();
                for _ in 0..arg_count {
                    args.push(self.value()?);
                }
                Instruction::Invoke {
                    dest,
                    kind,
                    method,
                    receiver,
                    args,
                }
            }
            OP_NEW_INSTANCE => Instruction::NewInstance {
                dest: self.value()?,
                class_name: self.string()?,
            },
            OP_NEW_ARRAY => Instruction::NewArray {
                dest: self.value()?,
                component: self.string()?,
                length: read_u32(&mut self.r)?,
            },
            OP_ARRAY_STORE => Instruction::ArrayStore {
                array: self.value()?,
                index: read_u32(&mut self.r)?,
                value: self.value()?,
            },
            OP_DECLARE_VARIABLE => Instruction::DeclareVariable {
                dest: self.value()?,
                type_name: self.string()?,
            },
            OP_ASSIGN => Instruction::Assign {
                target: self.value()?,
                value: self.value()?,
            },
            OP_IF_TRUE => Instruction::IfTrue {
                condition: self.value()?,
                then_block: self.block()?,
                else_block: self.block()?,
            },
            OP_TRY => Instruction::Try(TryRegion {
                body: self.block()?,
                exception_type: self.string()?,
                caught: self.value()?,
                handler: self.block()?,
            }),
            OP_RETURN => Instruction::Return {
                value: match read_u8(&mut self.r)? {
                    0 => None,
                    _ => Some(self.value()?),
                },
            },
            other => return Err(UnitFormatError::InvalidOpcode(other)),
        };
        Ok(instruction)
    }
}

fn remaining(cursor: &io::Cursor<&[u8]>) -> usize {
    let len = cursor.get_ref().len();
    len.saturating_sub(cursor.position().min(len as u64) as usize)
}

fn read_unit(r: &mut io::Cursor<&[u8]>) -> Result<GeneratedUnit, UnitFormatError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(UnitFormatError::InvalidMagic);
    }

    let version = read_u32(r)?;
    if version != VERSION {
        return Err(UnitFormatError::UnsupportedVersion(version));
    }

    let pool_len = read_u32(r)?;
    let mut pool = Vec::with_capacity(pool_len.min(4096) as usize);
    for _ in 0..pool_len {
        let len = read_u32(r)?;
        let available = remaining(r);
        if len as usize > available {
            return Err(UnitFormatError::LengthOutOfBounds {
                len,
                remaining: available,
            });
        }
        let mut buf = vec![0u8; len as usize];
        r.read_exact(&mut buf)?;
        pool.push(String::from_utf8(buf).map_err(|_| UnitFormatError::InvalidUtf8)?);
    }

    let mut reader = Reader { r, pool: &pool };
    let name = reader.string()?;
    let super_class = reader.string()?;
    let interfaces = reader.strings()?;
    let annotations = reader.strings()?;

    let routine_count = read_u32(&mut reader.r)?;
    let mut routines = Vec::new();
    for _ in 0..routine_count {
        let name = reader.string()?;
        let modifiers = Modifiers::from_bits_truncate(read_u16(&mut reader.r)?);
        let params = reader.strings()?;
        let return_type = reader.string()?;
        let value_count = read_u32(&mut reader.r)?;
        let body = reader.block()?;
        routines.push(Routine {
            name,
            modifiers,
            params,
            return_type,
            value_count,
            body,
        });
    }

    Ok(GeneratedUnit {
        name,
        super_class,
        interfaces,
        annotations,
        routines,
    })
}
