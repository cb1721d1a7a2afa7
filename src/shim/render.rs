//! Renders a [`ShimSpec`] into C++ source.
//!
//! Every forwarder is a GNU `ifunc` whose resolver looks the live symbol up
//! in the target library. The trampoline is bound to `name@compat_version`
//! through `.symver`, so it never shadows the default-versioned export.

use std::fmt::Write;

use crate::shim::spec::{ShimEntry, ShimSpec, INTERNAL_PREFIX};

/// Render `spec` as one translation unit.
pub fn render(spec: &ShimSpec) -> String {
    let mut out = String::new();
    write_unit(&mut out, spec);
    out
}

fn write_unit(out: &mut String, spec: &ShimSpec) {
    writeln!(out, "// Generated by vndk-compat. Do not edit.").unwrap();
    writeln!(out, "//").unwrap();
    writeln!(out, "// target library: {}", spec.target_library).unwrap();
    writeln!(out, "// compat version: {}", spec.compat_version).unwrap();
    writeln!(out, "// system model:   {}", spec.model_fingerprint).unwrap();
    writeln!(out, "// forwarders:     {}", spec.entries.len()).unwrap();
    writeln!(out).unwrap();
    writeln!(out, "#include <dlfcn.h>").unwrap();
    writeln!(out).unwrap();

    let lookup = format!("{}_lookup", INTERNAL_PREFIX);
    writeln!(out, "namespace {{").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "void* {}(const char* name) {{", lookup).unwrap();
    writeln!(
        out,
        "    static void* handle = dlopen(\"{}\", RTLD_NOW | RTLD_NOLOAD);",
        spec.live_soname
    )
    .unwrap();
    writeln!(out, "    if (handle == nullptr) {{").unwrap();
    writeln!(out, "        handle = dlopen(\"{}\", RTLD_NOW);", spec.live_soname).unwrap();
    writeln!(out, "    }}").unwrap();
    writeln!(out, "    return handle == nullptr ? nullptr : dlsym(handle, name);").unwrap();
    writeln!(out, "}}").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "}}  // namespace").unwrap();

    for entry in &spec.entries {
        writeln!(out).unwrap();
        write_entry(out, spec, entry, &lookup);
    }
}

fn write_entry(out: &mut String, spec: &ShimSpec, entry: &ShimEntry, lookup: &str) {
    let resolver = &entry.resolver_name;

    writeln!(
        out,
        "// {}:{} ({}, live version {})",
        spec.target_library,
        entry.public_name,
        entry.signature.as_str(),
        entry.live_version
    )
    .unwrap();
    writeln!(out, "extern \"C\" void* {}(void) {{", resolver).unwrap();
    writeln!(out, "    return {}(\"{}\");", lookup, entry.public_name).unwrap();
    writeln!(out, "}}").unwrap();
    writeln!(
        out,
        "extern \"C\" void {}(void) __attribute__((ifunc(\"{}\")));",
        entry.internal_name, resolver
    )
    .unwrap();
    writeln!(
        out,
        "__asm__(\".symver {}, {}@{}\");",
        entry.internal_name, entry.public_name, spec.compat_version
    )
    .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shim::spec::SignatureClass;

    fn spec() -> ShimSpec {
        ShimSpec {
            target_library: "libbaz".to_string(),
            compat_version: "v2compat".to_string(),
            live_soname: "libbaz.so".to_string(),
            model_fingerprint: "abc123".to_string(),
            entries: vec![
                ShimEntry::new("v2compat", "baz", SignatureClass::Function, 1),
                ShimEntry::new("v2compat", "_ZTV3Baz", SignatureClass::VtableSlot, 1),
            ],
        }
    }

    #[test]
    fn test_render_forwarder() {
        let contents = render(&spec());

        assert!(contents.starts_with("// Generated by vndk-compat. Do not edit.\n"));
        assert!(contents.contains("// system model:   abc123\n"));
        assert!(contents.contains("dlopen(\"libbaz.so\", RTLD_NOW | RTLD_NOLOAD)"));
        assert!(contents.contains(
            "extern \"C\" void vndk_compat_fwd_v2compat__baz(void) \
             __attribute__((ifunc(\"vndk_compat_res_v2compat__baz\")));"
        ));
        assert!(contents.contains("__asm__(\".symver vndk_compat_fwd_v2compat__baz, baz@v2compat\");"));
        assert!(contents.contains("// libbaz:_ZTV3Baz (vtable slot, live version 1)"));
    }

    #[test]
    fn test_render_keeps_entry_order() {
        let contents = render(&spec());
        let first = contents.find("baz@v2compat").unwrap();
        let second = contents.find("_ZTV3Baz@v2compat").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_resolver_precedes_ifunc() {
        let contents = render(&spec());
        let resolver = contents
            .find("void* vndk_compat_res_v2compat__baz(void) {")
            .unwrap();
        let ifunc = contents.find("void vndk_compat_fwd_v2compat__baz(void)").unwrap();
        assert!(resolver < ifunc);
    }
}
