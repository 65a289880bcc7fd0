//! L2: the Type Mapper turns a complete D-Bus type signature into a
//! [`TypeBinding`] describing the native Rust type it should become,
//! interning a synthetic struct for every D-Bus struct it encounters
//! (at any nesting depth) along the way.
//!
//! Grounded on `generate/types.rs::{xml_to_rust_type, make_type,
//! Arg::typename}`; generalized here to emit named structs instead of
//! tuples (`SPEC_FULL.md` §3's "Struct list" requirement) and to run on
//! top of `sig::cursor::SignatureCursor` rather than a raw byte slice.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::mangle::make_camel;
use crate::sig::cursor::{BasicType, SignatureCursor, TypeCode};

/// Key a synthetic struct is interned and deduplicated by: the same key
/// always yields the same generated name, emitted exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructKey {
    pub prefix: String,
    pub interface_symbol: String,
    pub member_symbol: String,
    pub argument_symbol: String,
    pub suffix: u32,
}

#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: String,
    pub signature: String,
    pub fields: Vec<TypeBinding>,
}

/// Accumulates synthetic struct definitions across one interface module,
/// in first-seen order (the order they must be emitted in, since later
/// members may reference a struct generated for an earlier one... in
/// practice each struct is only referenced by the member that produced
/// it, but stable order keeps output deterministic across runs).
#[derive(Debug, Default)]
pub struct StructRegistry {
    order: Vec<StructKey>,
    defs: HashMap<StructKey, StructDef>,
}

impl StructRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_order(&self) -> impl Iterator<Item = &StructDef> {
        self.order.iter().map(move |k| &self.defs[k])
    }

    fn intern(&mut self, key: StructKey, name: String, signature: String, fields: Vec<TypeBinding>) {
        if !self.defs.contains_key(&key) {
            self.order.push(key.clone());
            self.defs.insert(key, StructDef { name, signature, fields });
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeBinding {
    pub rust_type: String,
    pub needs_length: bool,
    pub struct_name: Option<String>,
    pub generic_param: Option<(String, String)>,
}

/// Per-argument mapping context: identifies which struct-registry key
/// namespace new structs should be interned under, and whether this is a
/// borrowed (`no_refs == false`, in-argument) or owned (`no_refs ==
/// true`, out-argument/property/signal field) position.
pub struct MapCtx<'a> {
    pub structs: &'a mut StructRegistry,
    pub prefix: String,
    pub interface_symbol: String,
    pub member_symbol: String,
    pub argument_symbol: String,
    pub generic_variant: bool,
    pub no_refs: bool,
    next_suffix: u32,
    next_generic: u32,
}

impl<'a> MapCtx<'a> {
    pub fn new(
        structs: &'a mut StructRegistry,
        prefix: impl Into<String>,
        interface_symbol: impl Into<String>,
        member_symbol: impl Into<String>,
        argument_symbol: impl Into<String>,
        generic_variant: bool,
        no_refs: bool,
    ) -> Self {
        MapCtx {
            structs,
            prefix: prefix.into(),
            interface_symbol: interface_symbol.into(),
            member_symbol: member_symbol.into(),
            argument_symbol: argument_symbol.into(),
            generic_variant,
            no_refs,
            next_suffix: 0,
            next_generic: 0,
        }
    }
}

pub fn map_signature(sig: &str, ctx: &mut MapCtx) -> Result<TypeBinding> {
    let cursor = SignatureCursor::new(sig)?;
    let binding = map_one(&cursor, ctx)?;
    Ok(binding)
}

fn map_one(cursor: &SignatureCursor, ctx: &mut MapCtx) -> Result<TypeBinding> {
    match cursor.current_type() {
        TypeCode::Basic(b) => Ok(basic_binding(b, ctx.no_refs)),
        TypeCode::Variant => Ok(variant_binding(ctx)),
        TypeCode::Array => map_array(cursor, ctx),
        TypeCode::DictEntry => map_dict(cursor, ctx),
        TypeCode::Struct => map_struct(cursor, ctx),
        TypeCode::End => Err(Error::InvalidSignature {
            signature: cursor.current_signature().to_string(),
            offset: 0,
        }),
    }
}

fn basic_binding(b: BasicType, no_refs: bool) -> TypeBinding {
    let rust_type = match b {
        BasicType::Byte => "u8",
        BasicType::Boolean => "bool",
        BasicType::Int16 => "i16",
        BasicType::UInt16 => "u16",
        BasicType::Int32 => "i32",
        BasicType::UInt32 => "u32",
        BasicType::Int64 => "i64",
        BasicType::UInt64 => "u64",
        BasicType::Double => "f64",
        BasicType::UnixFd => "arg::OwnedFd",
        BasicType::String => {
            if no_refs {
                "String"
            } else {
                "&str"
            }
        }
        BasicType::ObjectPath => {
            if no_refs {
                "dbus::Path<'static>"
            } else {
                "dbus::Path"
            }
        }
        BasicType::Signature => {
            if no_refs {
                "dbus::Signature<'static>"
            } else {
                "dbus::Signature"
            }
        }
    };
    TypeBinding {
        rust_type: rust_type.to_string(),
        ..Default::default()
    }
}

fn variant_binding(ctx: &mut MapCtx) -> TypeBinding {
    if ctx.generic_variant {
        let idx = ctx.next_generic;
        ctx.next_generic += 1;
        let letter = if ctx.no_refs { 'R' } else { 'I' };
        let name = format!("{}{}", letter, idx);
        let bound = if ctx.no_refs {
            "for<'b> arg::Get<'b> + 'static".to_string()
        } else {
            "arg::Arg + arg::Append".to_string()
        };
        TypeBinding {
            rust_type: name.clone(),
            generic_param: Some((name, bound)),
            ..Default::default()
        }
    } else {
        let rust_type = if ctx.no_refs {
            "arg::Variant<Box<dyn arg::RefArg + 'static>>"
        } else {
            "arg::Variant<Box<dyn arg::RefArg>>"
        };
        TypeBinding {
            rust_type: rust_type.to_string(),
            ..Default::default()
        }
    }
}

fn map_array(cursor: &SignatureCursor, ctx: &mut MapCtx) -> Result<TypeBinding> {
    let inner = cursor.recurse().expect("array always has an element type");
    let elem = map_one(&inner, ctx)?;
    Ok(TypeBinding {
        rust_type: format!("Vec<{}>", elem.rust_type),
        ..Default::default()
    })
}

fn map_dict(cursor: &SignatureCursor, ctx: &mut MapCtx) -> Result<TypeBinding> {
    let full = cursor.current_signature();
    if full == "a{sv}" {
        return Ok(TypeBinding {
            rust_type: "arg::PropMap".to_string(),
            ..Default::default()
        });
    }
    let mut kv = cursor.recurse().expect("dict entry always has key+value");
    let key = map_one(&kv, ctx)?;
    kv.advance();
    let value = map_one(&kv, ctx)?;
    Ok(TypeBinding {
        rust_type: format!(
            "::std::collections::HashMap<{}, {}>",
            key.rust_type, value.rust_type
        ),
        ..Default::default()
    })
}

fn map_struct(cursor: &SignatureCursor, ctx: &mut MapCtx) -> Result<TypeBinding> {
    let suffix = ctx.next_suffix;
    ctx.next_suffix += 1;

    let key = StructKey {
        prefix: ctx.prefix.clone(),
        interface_symbol: ctx.interface_symbol.clone(),
        member_symbol: ctx.member_symbol.clone(),
        argument_symbol: ctx.argument_symbol.clone(),
        suffix,
    };

    // A synthesized struct is always an owned value -- it needs a plain
    // `impl<'a> Get<'a>` with no borrowed fields, so its fields are
    // mapped in owned position even if the struct itself sits in a
    // borrowed (in-argument) position.
    let saved_no_refs = ctx.no_refs;
    ctx.no_refs = true;
    let mut fields = Vec::new();
    let mut field = cursor.recurse().expect("struct always has field types");
    while !field.is_end() {
        fields.push(map_one(&field, ctx)?);
        field.advance();
    }
    ctx.no_refs = saved_no_refs;

    let name = make_camel(&format!(
        "{}_{}_{}_{}_struct_{}",
        ctx.prefix, ctx.interface_symbol, ctx.member_symbol, ctx.argument_symbol, suffix
    ));

    ctx.structs
        .intern(key, name.clone(), cursor.current_signature().to_string(), fields);

    Ok(TypeBinding {
        rust_type: name.clone(),
        struct_name: Some(name),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_ctx(structs: &mut StructRegistry) -> MapCtx {
        MapCtx::new(structs, "pfx", "Iface", "Member", "arg0", false, true)
    }

    #[test]
    fn maps_basics() {
        let mut structs = StructRegistry::new();
        let mut ctx = fresh_ctx(&mut structs);
        assert_eq!(map_signature("s", &mut ctx).unwrap().rust_type, "String");
        assert_eq!(map_signature("i", &mut ctx).unwrap().rust_type, "i32");
    }

    #[test]
    fn maps_array_of_dict() {
        let mut structs = StructRegistry::new();
        let mut ctx = fresh_ctx(&mut structs);
        let b = map_signature("a{su}", &mut ctx).unwrap();
        assert_eq!(b.rust_type, "::std::collections::HashMap<String, u32>");
    }

    #[test]
    fn a_sv_is_propmap() {
        let mut structs = StructRegistry::new();
        let mut ctx = fresh_ctx(&mut structs);
        let b = map_signature("a{sv}", &mut ctx).unwrap();
        assert_eq!(b.rust_type, "arg::PropMap");
    }

    #[test]
    fn struct_is_interned_once() {
        let mut structs = StructRegistry::new();
        let mut ctx = fresh_ctx(&mut structs);
        let b1 = map_signature("(iii)", &mut ctx).unwrap();
        assert!(b1.struct_name.is_some());
        assert_eq!(structs.in_order().count(), 1);
        let def = structs.in_order().next().unwrap();
        assert_eq!(def.fields.len(), 3);
        assert_eq!(def.signature, "(iii)");
    }

    #[test]
    fn nested_struct_gets_distinct_suffix() {
        let mut structs = StructRegistry::new();
        let mut ctx = fresh_ctx(&mut structs);
        map_signature("(ii(ii))", &mut ctx).unwrap();
        // outer struct + inner struct = 2 distinct interned defs
        assert_eq!(structs.in_order().count(), 2);
    }

    #[test]
    fn generic_variant_produces_param() {
        let mut structs = StructRegistry::new();
        let mut ctx = MapCtx::new(&mut structs, "pfx", "Iface", "Member", "arg0", true, false);
        let b = map_signature("v", &mut ctx).unwrap();
        assert!(b.generic_param.is_some());
        assert_eq!(b.rust_type, "I0");
    }
}
