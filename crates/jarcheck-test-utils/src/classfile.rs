use std::collections::HashMap;

const ACC_PUBLIC: u16 = 0x0001;
const ACC_SUPER: u16 = 0x0020;
const ACC_INTERFACE: u16 = 0x0200;
const ACC_ABSTRACT: u16 = 0x0400;
const MAJOR_JAVA_8: u16 = 52;

/// Builds minimal, structurally valid classfiles.
///
/// Only what the indexer reads is emitted: the constant pool, class header,
/// and fields/methods with their descriptors (no `Code` attributes).
#[derive(Debug, Clone)]
pub struct ClassFileBuilder {
    internal_name: String,
    access_flags: u16,
    super_class: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<(String, String)>,
    methods: Vec<(String, String)>,
}

impl ClassFileBuilder {
    /// A class extending `java/lang/Object`.
    pub fn new(internal_name: &str) -> Self {
        Self {
            internal_name: internal_name.to_string(),
            access_flags: ACC_PUBLIC | ACC_SUPER,
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    /// Mark the class as an interface. Like `javac`, the classfile still
    /// names `java/lang/Object` as `super_class`.
    pub fn interface_type(mut self) -> Self {
        self.access_flags = ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT;
        self.super_class = Some("java/lang/Object".to_string());
        self
    }

    pub fn super_class(mut self, super_class: Option<&str>) -> Self {
        self.super_class = super_class.map(str::to_string);
        self
    }

    pub fn interface(mut self, internal_name: &str) -> Self {
        self.interfaces.push(internal_name.to_string());
        self
    }

    pub fn field(mut self, name: &str, descriptor: &str) -> Self {
        self.fields.push((name.to_string(), descriptor.to_string()));
        self
    }

    pub fn method(mut self, name: &str, descriptor: &str) -> Self {
        self.methods.push((name.to_string(), descriptor.to_string()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = PoolWriter::default();
        let this_index = pool.class(&self.internal_name);
        let super_index = self.super_class.as_deref().map_or(0, |s| pool.class(s));
        let interface_indices: Vec<u16> = self.interfaces.iter().map(|i| pool.class(i)).collect();
        let fields: Vec<(u16, u16)> = self
            .fields
            .iter()
            .map(|(n, d)| (pool.utf8(n), pool.utf8(d)))
            .collect();
        let methods: Vec<(u16, u16)> = self
            .methods
            .iter()
            .map(|(n, d)| (pool.utf8(n), pool.utf8(d)))
            .collect();

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFEBABEu32.to_be_bytes());
        push_u16(&mut out, 0);
        push_u16(&mut out, MAJOR_JAVA_8);
        push_u16(&mut out, pool.count + 1);
        out.extend_from_slice(&pool.bytes);

        push_u16(&mut out, self.access_flags);
        push_u16(&mut out, this_index);
        push_u16(&mut out, super_index);
        push_u16(&mut out, interface_indices.len() as u16);
        for idx in interface_indices {
            push_u16(&mut out, idx);
        }

        for members in [fields, methods] {
            push_u16(&mut out, members.len() as u16);
            for (name, descriptor) in members {
                push_u16(&mut out, ACC_PUBLIC);
                push_u16(&mut out, name);
                push_u16(&mut out, descriptor);
                push_u16(&mut out, 0);
            }
        }

        // class attributes_count
        push_u16(&mut out, 0);
        out
    }
}

#[derive(Default)]
struct PoolWriter {
    bytes: Vec<u8>,
    count: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl PoolWriter {
    fn utf8(&mut self, s: &str) -> u16 {
        if let Some(&idx) = self.utf8.get(s) {
            return idx;
        }
        self.bytes.push(1); // CONSTANT_Utf8
        push_u16(&mut self.bytes, s.len() as u16);
        self.bytes.extend_from_slice(s.as_bytes());
        self.count += 1;
        self.utf8.insert(s.to_string(), self.count);
        self.count
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        if let Some(&idx) = self.classes.get(internal_name) {
            return idx;
        }
        let name_index = self.utf8(internal_name);
        self.bytes.push(7); // CONSTANT_Class
        push_u16(&mut self.bytes, name_index);
        self.count += 1;
        self.classes.insert(internal_name.to_string(), self.count);
        self.count
    }
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}
