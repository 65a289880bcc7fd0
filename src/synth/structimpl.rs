//! C: the Struct Marshal/Demarshal Synthesizer. For every [`StructDef`]
//! interned by the Type Mapper, emits the struct's own field
//! declaration plus its `arg::Arg`/`arg::Append`/`arg::Get` impls.
//!
//! Grounded on `examples/original_source/nih-dbus-tool/property.c`'s
//! struct marshal/demarshal shape (open one `Struct` container, append
//! fields in declared order / recurse then read fields in declared
//! order), translated into the `arg::{Arg, Append, Get}` idiom already
//! visible in the vendored `dbus-codegen` 0.10.0 `write.rs`. Container
//! open/close pairing is delegated to `IterAppend::append_struct` and
//! `Iter::recurse`, both implemented once in the assumed `dbus` crate,
//! so there is exactly one `append_struct`/`recurse` call per impl no
//! matter how many fields the struct has -- see `SPEC_FULL.md` §4.3 for
//! why the original's OOM-retry loop has no counterpart here.

use crate::sig::mapper::StructDef;
use crate::synth::emit::CodeBuf;

/// Renders the struct's field declaration and its three trait impls.
pub fn generate_struct(def: &StructDef) -> String {
    let mut b = CodeBuf::new();

    b.block(&format!("#[derive(Debug, Clone, PartialEq)]\npub struct {} {{", def.name), |b| {
        for (i, f) in def.fields.iter().enumerate() {
            b.line(format!("pub item{}: {},", i, f.rust_type));
        }
    });
    b.blank();

    b.block(&format!("impl arg::Arg for {} {{", def.name), |b| {
        b.line("const ARG_TYPE: arg::ArgType = arg::ArgType::Struct;");
        b.block("fn signature() -> arg::Signature<'static> {", |b| {
            b.line(format!("arg::Signature::from(\"{}\")", def.signature));
        });
    });
    b.blank();

    b.block(&format!("impl arg::Append for {} {{", def.name), |b| {
        b.block("fn append_by_ref(&self, ia: &mut arg::IterAppend) {", |b| {
            b.block("ia.append_struct(|ia| {", |b| {
                for (i, _) in def.fields.iter().enumerate() {
                    b.line(format!("ia.append(&self.item{});", i));
                }
            });
            b.line("});");
        });
    });
    b.blank();

    b.block(&format!("impl<'a> arg::Get<'a> for {} {{", def.name), |b| {
        b.block("fn get(i: &mut arg::Iter<'a>) -> Option<Self> {", |b| {
            b.line("i.recurse(arg::ArgType::Struct).and_then(|mut si| {");
            b.line(format!("    Some({} {{", def.name));
            for (i, _) in def.fields.iter().enumerate() {
                b.line(format!("        item{}: si.read().ok()?,", i));
            }
            b.line("    })");
            b.line("})");
        });
    });
    b.blank();

    // `signal_decl`'s `AppendAll` impl goes through `arg::RefArg::append`
    // uniformly for every field regardless of type, so synthesized
    // structs need a `RefArg` impl of their own, not just `Arg`/`Append`.
    b.block(&format!("impl arg::RefArg for {} {{", def.name), |b| {
        b.line("fn arg_type(&self) -> arg::ArgType { arg::ArgType::Struct }");
        b.block("fn signature(&self) -> arg::Signature<'static> {", |b| {
            b.line(format!("arg::Signature::from(\"{}\")", def.signature));
        });
        b.block("fn append(&self, i: &mut arg::IterAppend) {", |b| {
            b.line("arg::Append::append_by_ref(self, i);");
        });
        b.block("fn as_any(&self) -> &dyn ::std::any::Any where Self: 'static {", |b| {
            b.line("self");
        });
        b.block("fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any where Self: 'static {", |b| {
            b.line("self");
        });
        b.block("fn box_clone(&self) -> Box<dyn arg::RefArg + 'static> {", |b| {
            b.line("Box::new(self.clone())");
        });
    });

    b.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sig::mapper::{MapCtx, StructRegistry};
    use crate::sig::map_signature;

    #[test]
    fn container_pairing_is_one_to_one() {
        let mut structs = StructRegistry::new();
        let mut ctx = MapCtx::new(&mut structs, "pfx", "Iface", "Member", "arg0", false, true);
        map_signature("(iii)", &mut ctx).unwrap();
        let def = structs.in_order().next().unwrap();
        let src = generate_struct(def);
        assert_eq!(src.matches("append_struct").count(), 1);
        assert_eq!(src.matches("recurse(arg::ArgType::Struct)").count(), 1);
        assert_eq!(src.matches("ia.append(&self.item").count(), 3);
        assert_eq!(src.matches("si.read().ok()?").count(), 3);
    }
}
