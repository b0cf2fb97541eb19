use jarcheck_classfile::{
    internal_to_binary, parse_field_descriptor, parse_method_descriptor, BaseType, ClassFile,
    FieldType, ReturnType,
};
use jarcheck_types::{FieldShape, MethodSignature, PrimitiveType, TypeRef, TypeShape};

const ACC_INTERFACE: u16 = 0x0200;

/// Instance and static initializers are not declared methods.
fn is_initializer(name: &str) -> bool {
    name == "<init>" || name == "<clinit>"
}

pub(crate) fn shape_from_classfile(cf: &ClassFile) -> jarcheck_classfile::Result<TypeShape> {
    let fields = cf
        .fields
        .iter()
        .map(|f| {
            Ok(FieldShape {
                name: f.name.clone(),
                ty: type_ref(&parse_field_descriptor(&f.descriptor)?),
            })
        })
        .collect::<jarcheck_classfile::Result<Vec<_>>>()?;

    let methods = cf
        .methods
        .iter()
        .filter(|m| !is_initializer(&m.name))
        .map(|m| {
            let desc = parse_method_descriptor(&m.descriptor)?;
            let return_type = match &desc.return_type {
                ReturnType::Void => TypeRef::Void,
                ReturnType::Type(ty) => type_ref(ty),
            };
            Ok(MethodSignature {
                name: m.name.clone(),
                parameter_types: desc.params.iter().map(type_ref).collect(),
                return_type,
            })
        })
        .collect::<jarcheck_classfile::Result<Vec<_>>>()?;

    // Interfaces record `java/lang/Object` as `super_class`, but they have no
    // superclass in the class hierarchy.
    let superclass = if cf.access_flags & ACC_INTERFACE != 0 {
        None
    } else {
        cf.super_class
            .as_deref()
            .map(|s| TypeRef::Named(internal_to_binary(s)))
    };

    Ok(TypeShape {
        name: internal_to_binary(&cf.this_class),
        fields,
        methods,
        superclass,
    })
}

fn type_ref(ty: &FieldType) -> TypeRef {
    match ty {
        FieldType::Base(base) => TypeRef::Primitive(primitive(*base)),
        FieldType::Object(internal) => TypeRef::Named(internal_to_binary(internal)),
        FieldType::Array(component) => TypeRef::array_of(type_ref(component)),
    }
}

fn primitive(base: BaseType) -> PrimitiveType {
    match base {
        BaseType::Byte => PrimitiveType::Byte,
        BaseType::Char => PrimitiveType::Char,
        BaseType::Double => PrimitiveType::Double,
        BaseType::Float => PrimitiveType::Float,
        BaseType::Int => PrimitiveType::Int,
        BaseType::Long => PrimitiveType::Long,
        BaseType::Short => PrimitiveType::Short,
        BaseType::Boolean => PrimitiveType::Boolean,
    }
}
