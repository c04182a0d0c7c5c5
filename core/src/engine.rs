//! The decode–dispatch loop: the core of TeenyJVM.
//!
//! `execute` runs one method's bytecode to completion, recursively invoking
//! `invokestatic` targets and threading the same heap through every frame.
//! Any opcode not listed in the table below is treated permissively — `pc`
//! advances by one byte and execution continues — matching the reference
//! interpreter, which almost certainly does this as a shortcut for opcodes
//! it never implemented rather than as a deliberate design choice.

use tracing::trace;

use crate::class::{find_method_from_index, ClassFile, Method};
use crate::error::EngineTrap;
use crate::frame::Frame;
use crate::heap::Heap;
use crate::opcode;

/// The result of running a method to completion: either nothing (`void`
/// return, or falling off the end of the bytecode) or a value returned by
/// `ireturn`/`areturn`.
///
/// Kept as a tagged enum rather than a `has_value`/sentinel pair so a
/// forgotten check is a compile error instead of a silently-wrong push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionalValue {
    Void,
    Int(i32),
    Reference(i32),
}

impl OptionalValue {
    /// The raw int32 payload to push onto a caller's operand stack, or
    /// `None` for `Void` — a callee that returned void pushes nothing.
    fn as_pushable(self) -> Option<i32> {
        match self {
            OptionalValue::Void => None,
            OptionalValue::Int(v) | OptionalValue::Reference(v) => Some(v),
        }
    }
}

/// Runs `method`'s bytecode until it returns or falls off the end.
///
/// `locals` must already be sized to `method.max_locals` with parameters in
/// the leading slots; `class` supplies the constant pool and method table
/// for `ldc`/`invokestatic`; `heap` is the single heap shared by every
/// frame of the top-level execution.
pub fn execute(
    method: &Method,
    locals: Vec<i32>,
    class: &ClassFile,
    heap: &mut Heap,
) -> Result<OptionalValue, EngineTrap> {
    trace!(method = %method.name, descriptor = %method.descriptor, "entering method");
    let mut frame = Frame::new(locals, method.max_stack);
    let code = &method.code;

    while frame.pc < code.len() {
        let instruction = code[frame.pc];
        match instruction {
            opcode::NOP => {
                frame.pc += 1;
            }

            opcode::ICONST_M1..=opcode::ICONST_5 => {
                let v = (instruction as i8).wrapping_sub(opcode::ICONST_0 as i8);
                frame.push(v as i32);
                frame.pc += 1;
            }

            opcode::BIPUSH => {
                let v = code[frame.pc + 1] as i8 as i32;
                frame.push(v);
                frame.pc += 2;
            }

            opcode::SIPUSH => {
                let v = read_i16(code, frame.pc + 1) as i32;
                frame.push(v);
                frame.pc += 3;
            }

            opcode::LDC => {
                let index = code[frame.pc + 1] as u16;
                let v = class
                    .constant_pool()
                    .integer_at(index)
                    .expect("ldc on a well-formed class references an Integer constant");
                frame.push(v);
                frame.pc += 2;
            }

            opcode::ILOAD | opcode::ALOAD => {
                let idx = code[frame.pc + 1] as usize;
                frame.push(frame.locals[idx]);
                frame.pc += 2;
            }

            opcode::ILOAD_0..=opcode::ILOAD_3 => {
                let idx = (instruction - opcode::ILOAD_0) as usize;
                frame.push(frame.locals[idx]);
                frame.pc += 1;
            }

            opcode::ALOAD_0..=opcode::ALOAD_3 => {
                let idx = (instruction - opcode::ALOAD_0) as usize;
                frame.push(frame.locals[idx]);
                frame.pc += 1;
            }

            opcode::ISTORE | opcode::ASTORE => {
                let idx = code[frame.pc + 1] as usize;
                frame.locals[idx] = frame.pop();
                frame.pc += 2;
            }

            opcode::ISTORE_0..=opcode::ISTORE_3 => {
                let idx = (instruction - opcode::ISTORE_0) as usize;
                frame.locals[idx] = frame.pop();
                frame.pc += 1;
            }

            opcode::ASTORE_0..=opcode::ASTORE_3 => {
                let idx = (instruction - opcode::ASTORE_0) as usize;
                frame.locals[idx] = frame.pop();
                frame.pc += 1;
            }

            opcode::IINC => {
                let idx = code[frame.pc + 1] as usize;
                let delta = code[frame.pc + 2] as i8 as i32;
                frame.locals[idx] = frame.locals[idx].wrapping_add(delta);
                frame.pc += 3;
            }

            opcode::IADD => binary_op(&mut frame, |a, b| a.wrapping_add(b)),
            opcode::ISUB => binary_op(&mut frame, |a, b| a.wrapping_sub(b)),
            opcode::IMUL => binary_op(&mut frame, |a, b| a.wrapping_mul(b)),

            opcode::IDIV => {
                let b = frame.pop();
                let a = frame.pop();
                if b == 0 {
                    return Err(EngineTrap::DivisionByZero);
                }
                frame.push(a.wrapping_div(b));
                frame.pc += 1;
            }

            opcode::IREM => {
                let b = frame.pop();
                let a = frame.pop();
                if b == 0 {
                    return Err(EngineTrap::DivisionByZero);
                }
                frame.push(a.wrapping_rem(b));
                frame.pc += 1;
            }

            opcode::INEG => {
                let a = frame.pop();
                frame.push(a.wrapping_neg());
                frame.pc += 1;
            }

            opcode::ISHL => {
                let b = frame.pop();
                let a = frame.pop();
                if b < 0 {
                    return Err(EngineTrap::NegativeShiftCount);
                }
                frame.push(a.wrapping_shl(b as u32));
                frame.pc += 1;
            }

            opcode::ISHR => {
                let b = frame.pop();
                let a = frame.pop();
                if b < 0 {
                    return Err(EngineTrap::NegativeShiftCount);
                }
                frame.push(a.wrapping_shr(b as u32));
                frame.pc += 1;
            }

            opcode::IUSHR => {
                let b = frame.pop();
                let a = frame.pop();
                if b < 0 {
                    return Err(EngineTrap::NegativeShiftCount);
                }
                // Logical shift: operate on the unsigned bit pattern, then
                // reinterpret as signed on push. An arithmetic shift here
                // would sign-extend instead of zero-filling from the left.
                frame.push(((a as u32).wrapping_shr(b as u32)) as i32);
                frame.pc += 1;
            }

            opcode::IAND => binary_op(&mut frame, |a, b| a & b),
            opcode::IOR => binary_op(&mut frame, |a, b| a | b),
            opcode::IXOR => binary_op(&mut frame, |a, b| a ^ b),

            opcode::IFEQ..=opcode::IFLE => {
                let v = frame.pop();
                let taken = match instruction {
                    opcode::IFEQ => v == 0,
                    opcode::IFNE => v != 0,
                    opcode::IFLT => v < 0,
                    opcode::IFGE => v >= 0,
                    opcode::IFGT => v > 0,
                    opcode::IFLE => v <= 0,
                    _ => unreachable!(),
                };
                branch(&mut frame, code, taken);
            }

            opcode::IF_ICMPEQ..=opcode::IF_ICMPLE => {
                // `b` is the operand pushed last (top); `a` is the deeper,
                // left-hand operand.
                let b = frame.pop();
                let a = frame.pop();
                let taken = match instruction {
                    opcode::IF_ICMPEQ => a == b,
                    opcode::IF_ICMPNE => a != b,
                    opcode::IF_ICMPLT => a < b,
                    opcode::IF_ICMPGE => a >= b,
                    opcode::IF_ICMPGT => a > b,
                    opcode::IF_ICMPLE => a <= b,
                    _ => unreachable!(),
                };
                branch(&mut frame, code, taken);
            }

            opcode::GOTO => {
                let offset = read_i16(code, frame.pc + 1);
                frame.pc = (frame.pc as i64 + offset as i64) as usize;
            }

            opcode::IRETURN => {
                let v = frame.pop();
                trace!(method = %method.name, value = v, "ireturn");
                return Ok(OptionalValue::Int(v));
            }

            opcode::ARETURN => {
                let v = frame.pop();
                trace!(method = %method.name, reference = v, "areturn");
                return Ok(OptionalValue::Reference(v));
            }

            opcode::RETURN => {
                trace!(method = %method.name, "return");
                return Ok(OptionalValue::Void);
            }

            opcode::GETSTATIC => {
                // Models looking up `System.out`; the operand is unused.
                frame.pc += 3;
            }

            opcode::INVOKEVIRTUAL => {
                // Models `PrintStream.println(int)` unconditionally; the
                // constant-pool operand is never inspected, so any class
                // file that invokes something else through this opcode
                // will misbehave.
                let v = frame.pop();
                println!("{v}");
                frame.pc += 3;
            }

            opcode::INVOKESTATIC => {
                let cp_index = read_u16(code, frame.pc + 1);
                let target = find_method_from_index(class, cp_index)
                    .expect("invokestatic on a well-formed class references a declared method");
                let result = invoke_static(target, &mut frame, class, heap)?;
                if let Some(v) = result.as_pushable() {
                    frame.push(v);
                }
                frame.pc += 3;
            }

            opcode::DUP => {
                frame.dup();
                frame.pc += 1;
            }

            opcode::NEWARRAY => {
                let n = frame.pop();
                let reference = heap.allocate(n)?;
                frame.push(reference);
                frame.pc += 2;
            }

            opcode::ARRAYLENGTH => {
                let r = frame.pop();
                frame.push(heap.get(r).length());
                frame.pc += 1;
            }

            opcode::IASTORE => {
                let v = frame.pop();
                let i = frame.pop();
                let r = frame.pop();
                heap.get(r).set(i, v);
                frame.pc += 1;
            }

            opcode::IALOAD => {
                let i = frame.pop();
                let r = frame.pop();
                frame.push(heap.get(r).get(i));
                frame.pc += 1;
            }

            _ => {
                // Unknown opcode: advance one byte and continue, matching
                // the reference interpreter's permissive fallback.
                frame.pc += 1;
            }
        }
    }

    Ok(OptionalValue::Void)
}

fn binary_op(frame: &mut Frame, f: impl FnOnce(i32, i32) -> i32) {
    let b = frame.pop();
    let a = frame.pop();
    frame.push(f(a, b));
    frame.pc += 1;
}

/// Applies a conditional branch's stack effect: on a taken branch, `pc`
/// moves by the 16-bit signed offset relative to the branch opcode's own
/// position (not the instruction following it — getting this wrong breaks
/// every loop); otherwise it simply steps past the 3-byte instruction.
fn branch(frame: &mut Frame, code: &[u8], taken: bool) {
    if taken {
        let offset = read_i16(code, frame.pc + 1);
        frame.pc = (frame.pc as i64 + offset as i64) as usize;
    } else {
        frame.pc += 3;
    }
}

/// Reads a big-endian `int16` immediate starting at `offset` in `code`.
fn read_i16(code: &[u8], offset: usize) -> i16 {
    i16::from_be_bytes([code[offset], code[offset + 1]])
}

fn read_u16(code: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([code[offset], code[offset + 1]])
}

/// Marshals arguments for an `invokestatic` target and recurses into
/// `execute`.
fn invoke_static(
    target: &Method,
    caller: &mut Frame,
    class: &ClassFile,
    heap: &mut Heap,
) -> Result<OptionalValue, EngineTrap> {
    let n = target
        .num_parameters()
        .expect("invokestatic on a well-formed class references a parseable descriptor");
    let mut locals = vec![0i32; target.max_locals as usize];
    // Last-pushed argument is topmost; it belongs in the highest-indexed
    // parameter slot.
    for i in (0..n as usize).rev() {
        locals[i] = caller.pop();
    }
    execute(target, locals, class, heap)
}
