//! Parses a JVM `.class` byte stream into the in-memory model the resolver
//! and execution engine consume.
//!
//! Only what TeenyJVM needs is actually interpreted: interfaces, fields, and
//! most attributes are walked past by length rather than decoded — the
//! engine never second-guesses what the class-file layer hands it, so this
//! module is kept as small as the format allows.

use crate::class::constant_pool::{tag, Constant, ConstantPool};
use crate::class::method::Method;
use crate::class::reader::Reader;
use crate::error::ClassFileError;

const CLASS_MAGIC: u32 = 0xCAFE_BABE;

/// A fully parsed class file: its constant pool and method table.
#[derive(Debug, Clone)]
pub struct ClassFile {
    constant_pool: ConstantPool,
    methods: Vec<Method>,
}

impl ClassFile {
    /// Parses a class file from its raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self, ClassFileError> {
        let mut r = Reader::new(data);

        let magic = r.u4()?;
        if magic != CLASS_MAGIC {
            return Err(ClassFileError::BadMagic { found: magic });
        }
        let _minor_version = r.u2()?;
        let _major_version = r.u2()?;

        let constant_pool = parse_constant_pool(&mut r)?;

        let _access_flags = r.u2()?;
        let _this_class = r.u2()?;
        let _super_class = r.u2()?;

        skip_interfaces(&mut r)?;
        skip_fields(&mut r)?;
        let methods = parse_methods(&mut r, &constant_pool)?;

        Ok(Self { constant_pool, methods })
    }

    pub fn constant_pool(&self) -> &ConstantPool {
        &self.constant_pool
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }
}

/// Reads the constant pool, honoring the JVM's two-slot convention for
/// `Long`/`Double` entries (JVMS §4.4: "the constant_pool index n+1 must be
/// valid but is considered unusable").
fn parse_constant_pool(r: &mut Reader) -> Result<ConstantPool, ClassFileError> {
    let count = r.u2()?;
    // entries[0] is unused padding so `entries[i]` lines up with a 1-based
    // constant pool index `i`.
    let mut entries: Vec<Constant> = vec![Constant::Unusable];

    let mut index = 1u16;
    while index < count {
        let t = r.u1()?;
        let entry = match t {
            tag::UTF8 => {
                let len = r.u2()? as usize;
                let bytes = r.bytes(len)?;
                Constant::Utf8(String::from_utf8_lossy(bytes).into_owned())
            }
            tag::INTEGER => Constant::Integer(r.i4()?),
            tag::FLOAT => Constant::Float(f32::from_bits(r.u4()?)),
            tag::LONG => Constant::Long(r.i8_be()?),
            tag::DOUBLE => Constant::Double(f64::from_bits(
                ((r.u4()? as u64) << 32) | r.u4()? as u64,
            )),
            tag::CLASS => Constant::Class { name_index: r.u2()? },
            tag::STRING => Constant::String { utf8_index: r.u2()? },
            tag::FIELDREF => Constant::Fieldref {
                class_index: r.u2()?,
                name_and_type_index: r.u2()?,
            },
            tag::METHODREF => Constant::Methodref {
                class_index: r.u2()?,
                name_and_type_index: r.u2()?,
            },
            tag::INTERFACE_METHODREF => Constant::InterfaceMethodref {
                class_index: r.u2()?,
                name_and_type_index: r.u2()?,
            },
            tag::NAME_AND_TYPE => Constant::NameAndType {
                name_index: r.u2()?,
                descriptor_index: r.u2()?,
            },
            tag::METHOD_HANDLE => Constant::MethodHandle {
                reference_kind: r.u1()?,
                reference_index: r.u2()?,
            },
            tag::METHOD_TYPE => Constant::MethodType { descriptor_index: r.u2()? },
            tag::DYNAMIC => Constant::Dynamic {
                bootstrap_method_attr_index: r.u2()?,
                name_and_type_index: r.u2()?,
            },
            tag::INVOKE_DYNAMIC => Constant::InvokeDynamic {
                bootstrap_method_attr_index: r.u2()?,
                name_and_type_index: r.u2()?,
            },
            tag::MODULE => Constant::Module { name_index: r.u2()? },
            tag::PACKAGE => Constant::Package { name_index: r.u2()? },
            other => return Err(ClassFileError::UnknownConstantTag { index, tag: other }),
        };

        let occupies_two_slots = matches!(entry, Constant::Long(_) | Constant::Double(_));
        entries.push(entry);
        index += 1;
        if occupies_two_slots {
            entries.push(Constant::Unusable);
            index += 1;
        }
    }

    Ok(ConstantPool::new(entries))
}

fn skip_interfaces(r: &mut Reader) -> Result<(), ClassFileError> {
    let count = r.u2()?;
    r.skip(count as usize * 2)
}

fn skip_fields(r: &mut Reader) -> Result<(), ClassFileError> {
    let count = r.u2()?;
    for _ in 0..count {
        let _access_flags = r.u2()?;
        let _name_index = r.u2()?;
        let _descriptor_index = r.u2()?;
        skip_attributes(r)?;
    }
    Ok(())
}

fn parse_methods(r: &mut Reader, pool: &ConstantPool) -> Result<Vec<Method>, ClassFileError> {
    let count = r.u2()?;
    let mut methods = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let _access_flags = r.u2()?;
        let name_index = r.u2()?;
        let descriptor_index = r.u2()?;
        let name = pool.utf8_at(name_index)?.to_string();
        let descriptor = pool.utf8_at(descriptor_index)?.to_string();

        let attribute_count = r.u2()?;
        let mut code = None;
        for _ in 0..attribute_count {
            let attribute_name_index = r.u2()?;
            let attribute_length = r.u4()? as usize;
            let attribute_name = pool.utf8_at(attribute_name_index)?;
            if attribute_name == "Code" {
                code = Some(parse_code_attribute(r)?);
            } else {
                r.skip(attribute_length)?;
            }
        }

        let (max_stack, max_locals, bytecode) =
            code.ok_or_else(|| ClassFileError::MissingCode { name: name.clone() })?;

        methods.push(Method {
            name,
            descriptor,
            max_stack,
            max_locals,
            code: bytecode,
        });
    }
    Ok(methods)
}

/// Parses a `Code` attribute's body (JVMS §4.7.3): `max_stack`,
/// `max_locals`, the bytecode itself, the exception table, and nested
/// attributes. Only the first three are kept; the rest are skipped by
/// length since TeenyJVM has no exceptions and no use for debug attributes.
fn parse_code_attribute(r: &mut Reader) -> Result<(u16, u16, Vec<u8>), ClassFileError> {
    let max_stack = r.u2()?;
    let max_locals = r.u2()?;
    let code_length = r.u4()? as usize;
    let code = r.bytes(code_length)?.to_vec();

    let exception_table_length = r.u2()?;
    // Each exception table entry is four u16 fields.
    r.skip(exception_table_length as usize * 8)?;

    skip_attributes(r)?;

    Ok((max_stack, max_locals, code))
}

fn skip_attributes(r: &mut Reader) -> Result<(), ClassFileError> {
    let count = r.u2()?;
    for _ in 0..count {
        let _name_index = r.u2()?;
        let length = r.u4()? as usize;
        r.skip(length)?;
    }
    Ok(())
}
