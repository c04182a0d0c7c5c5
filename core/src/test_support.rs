//! Hand-assembles minimal `.class` byte streams for the reader/resolver unit
//! tests, so those tests exercise the real binary format instead of a
//! synthetic in-memory shortcut.

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_CLASS: u8 = 7;
const TAG_METHODREF: u8 = 10;
const TAG_NAME_AND_TYPE: u8 = 12;

enum Entry {
    Utf8(String),
    Integer(i32),
    Class { name_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    Methodref { class_index: u16, name_and_type_index: u16 },
}

struct MethodEntry {
    name_index: u16,
    descriptor_index: u16,
    max_stack: u16,
    max_locals: u16,
    code: Vec<u8>,
}

/// Builds a well-formed class file one constant/method at a time, then
/// serializes it with [`ClassBuilder::build`].
pub(crate) struct ClassBuilder {
    constants: Vec<Entry>,
    methods: Vec<MethodEntry>,
}

impl ClassBuilder {
    pub(crate) fn new() -> Self {
        Self { constants: Vec::new(), methods: Vec::new() }
    }

    fn add_entry(&mut self, entry: Entry) -> u16 {
        self.constants.push(entry);
        self.constants.len() as u16
    }

    fn add_utf8(&mut self, s: &str) -> u16 {
        self.add_entry(Entry::Utf8(s.to_string()))
    }

    /// Adds an `Integer` constant and returns its pool index.
    pub(crate) fn add_integer(&mut self, value: i32) -> u16 {
        self.add_entry(Entry::Integer(value))
    }

    /// Adds a method with a `Code` attribute wrapping `code`.
    pub(crate) fn add_method(
        &mut self,
        name: &str,
        descriptor: &str,
        max_stack: u16,
        max_locals: u16,
        code: &[u8],
    ) {
        let name_index = self.add_utf8(name);
        let descriptor_index = self.add_utf8(descriptor);
        self.methods.push(MethodEntry {
            name_index,
            descriptor_index,
            max_stack,
            max_locals,
            code: code.to_vec(),
        });
    }

    /// Adds a `Methodref` (via a fresh `Class`/`NameAndType` pair) and
    /// returns its pool index, for `invokestatic` test fixtures.
    pub(crate) fn add_methodref(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.add_utf8(name);
        let descriptor_index = self.add_utf8(descriptor);
        let name_and_type_index =
            self.add_entry(Entry::NameAndType { name_index, descriptor_index });
        let class_name_index = self.add_utf8("Main");
        let class_index = self.add_entry(Entry::Class { name_index: class_name_index });
        self.add_entry(Entry::Methodref { class_index, name_and_type_index })
    }

    /// Serializes the accumulated constants and methods into a complete
    /// `.class` byte stream (magic through the method table; TeenyJVM's
    /// reader never looks past it).
    pub(crate) fn build(&self) -> Vec<u8> {
        let code_name_index = self.constants.len() as u16 + 1;

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // minor_version
        out.extend_from_slice(&52u16.to_be_bytes()); // major_version

        out.extend_from_slice(&(self.constants.len() as u16 + 2).to_be_bytes());
        for entry in &self.constants {
            write_entry(&mut out, entry);
        }
        write_entry(&mut out, &Entry::Utf8("Code".to_string()));

        out.extend_from_slice(&0u16.to_be_bytes()); // access_flags
        out.extend_from_slice(&0u16.to_be_bytes()); // this_class
        out.extend_from_slice(&0u16.to_be_bytes()); // super_class

        out.extend_from_slice(&0u16.to_be_bytes()); // interfaces_count
        out.extend_from_slice(&0u16.to_be_bytes()); // fields_count

        out.extend_from_slice(&(self.methods.len() as u16).to_be_bytes());
        for method in &self.methods {
            out.extend_from_slice(&0u16.to_be_bytes()); // access_flags
            out.extend_from_slice(&method.name_index.to_be_bytes());
            out.extend_from_slice(&method.descriptor_index.to_be_bytes());
            out.extend_from_slice(&1u16.to_be_bytes()); // attributes_count

            out.extend_from_slice(&code_name_index.to_be_bytes());
            let body_len = 2 + 2 + 4 + method.code.len() + 2 + 2;
            out.extend_from_slice(&(body_len as u32).to_be_bytes());
            out.extend_from_slice(&method.max_stack.to_be_bytes());
            out.extend_from_slice(&method.max_locals.to_be_bytes());
            out.extend_from_slice(&(method.code.len() as u32).to_be_bytes());
            out.extend_from_slice(&method.code);
            out.extend_from_slice(&0u16.to_be_bytes()); // exception_table_length
            out.extend_from_slice(&0u16.to_be_bytes()); // (nested) attributes_count
        }

        out
    }
}

fn write_entry(out: &mut Vec<u8>, entry: &Entry) {
    match entry {
        Entry::Utf8(s) => {
            out.push(TAG_UTF8);
            let bytes = s.as_bytes();
            out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
            out.extend_from_slice(bytes);
        }
        Entry::Integer(v) => {
            out.push(TAG_INTEGER);
            out.extend_from_slice(&v.to_be_bytes());
        }
        Entry::Class { name_index } => {
            out.push(TAG_CLASS);
            out.extend_from_slice(&name_index.to_be_bytes());
        }
        Entry::NameAndType { name_index, descriptor_index } => {
            out.push(TAG_NAME_AND_TYPE);
            out.extend_from_slice(&name_index.to_be_bytes());
            out.extend_from_slice(&descriptor_index.to_be_bytes());
        }
        Entry::Methodref { class_index, name_and_type_index } => {
            out.push(TAG_METHODREF);
            out.extend_from_slice(&class_index.to_be_bytes());
            out.extend_from_slice(&name_and_type_index.to_be_bytes());
        }
    }
}
