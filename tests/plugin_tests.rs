//! Integration tests for plugin discovery and the transform ABI.
//!
//! Broken candidates are plain files carrying the module extension, and
//! valid transforms come from descriptors linked into this test binary.
//! Compiled modules are loaded by the sharpen demo's own tests.

use pixview::buffer::{PixelBuffer, PixelView, PixelViewMut};
use pixview::plugin::{
    DiagnosticKind, PIXVIEW_ABI_VERSION, PluginError, PluginLoader, PluginRegistry,
    PluginTransform, RawImage, RawImageMut, STATUS_BAD_INPUT, STATUS_OK, STATUS_PANICKED,
    TransformDescriptor,
};
use pixview::transform::Transform;
use pixview::Error;
use std::ffi::{c_char, c_int};
use std::fs;
use std::path::Path;

// ============================================================================
// Plugin defined through the export macro
// ============================================================================

fn posterize(input: &PixelView<'_>, output: &mut PixelViewMut<'_>) -> Result<(), String> {
    if input.width() > 1000 {
        return Err("too wide".into());
    }
    if input.height() == 7 {
        panic!("unlucky height");
    }
    for y in 0..input.height() {
        for x in 0..input.width() {
            output.set_pixel(x, y, input.pixel(x, y).map(|c| c & 0xC0));
        }
    }
    Ok(())
}

pixview::define_transform_plugin! {
    name: "Posterize",
    description: "Keeps the two high bits of every channel",
    apply: posterize,
}

fn exported() -> PluginTransform {
    unsafe { PluginTransform::from_static(pixview_transform_descriptor(), "posterize") }.unwrap()
}

#[test]
fn test_macro_exports_valid_descriptor() {
    let transform = exported();
    assert_eq!(transform.name(), "Posterize");
    assert_eq!(transform.description(), "Keeps the two high bits of every channel");
    assert_eq!(transform.origin(), Path::new("posterize"));
}

#[test]
fn test_macro_plugin_reads_through_stride() {
    let mut input = PixelBuffer::with_stride(3, 2, 16).unwrap();
    input.set_pixel(2, 1, [0xFF, 0x7F, 0x41]);
    input.as_bytes_mut()[15] = 0xAA; // padding

    let output = exported().apply(&input.as_view()).unwrap();
    assert_eq!(output.shape(), input.shape());
    assert_eq!(output.pixel(2, 1), [0xC0, 0x40, 0x40]);
}

#[test]
fn test_macro_plugin_errors_become_status() {
    let input = PixelBuffer::new(1001, 1).unwrap();
    let err = exported().apply(&input.as_view()).unwrap_err();
    assert!(matches!(err, Error::TransformFailed { status, .. } if status == STATUS_BAD_INPUT));
}

#[test]
fn test_macro_plugin_panic_is_caught() {
    let input = PixelBuffer::new(2, 7).unwrap();
    let err = exported().apply(&input.as_view()).unwrap_err();
    assert!(matches!(err, Error::TransformFailed { status, .. } if status == STATUS_PANICKED));
}

// ============================================================================
// Hand-written descriptors
// ============================================================================

unsafe extern "C" fn identity(input: *const RawImage, output: *mut RawImageMut) -> c_int {
    // SAFETY: The host passes valid images.
    let (input, mut output) = unsafe {
        match ((*input).as_view(), (*output).as_view_mut()) {
            (Some(i), Some(o)) => (i, o),
            _ => return STATUS_BAD_INPUT,
        }
    };
    for y in 0..input.height() {
        for x in 0..input.width() {
            output.set_pixel(x, y, input.pixel(x, y));
        }
    }
    STATUS_OK
}

fn leaked(abi_version: u32, name: &'static [u8]) -> &'static TransformDescriptor {
    Box::leak(Box::new(TransformDescriptor {
        abi_version,
        name: name.as_ptr() as *const c_char,
        description: b"\0".as_ptr() as *const c_char,
        apply: Some(identity),
    }))
}

fn load(abi_version: u32, name: &'static [u8], origin: &str) -> Result<PluginTransform, PluginError> {
    unsafe { PluginTransform::from_static(leaked(abi_version, name), origin) }
}

#[test]
fn test_wrong_abi_version_rejected() {
    let err = load(PIXVIEW_ABI_VERSION + 1, b"Identity\0", "future.so").unwrap_err();
    assert_eq!(
        err,
        PluginError::AbiMismatch {
            expected: PIXVIEW_ABI_VERSION,
            actual: PIXVIEW_ABI_VERSION + 1
        }
    );
}

#[test]
fn test_duplicate_sharpen_first_wins() {
    let mut registry = PluginRegistry::new();
    assert!(registry.admit("a_sharpen.so", load(PIXVIEW_ABI_VERSION, b"Sharpen\0", "a_sharpen.so")));
    assert!(!registry.admit("b_sharpen.so", load(PIXVIEW_ABI_VERSION, b"Sharpen\0", "b_sharpen.so")));

    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.get("Sharpen").unwrap().origin(),
        Path::new("a_sharpen.so")
    );
    assert_eq!(registry.diagnostics().len(), 1);
    assert!(matches!(
        &registry.diagnostics()[0].kind,
        DiagnosticKind::DuplicateName { name, existing }
            if name == "Sharpen" && existing == Path::new("a_sharpen.so")
    ));
}

#[test]
fn test_n_valid_m_invalid_in_any_order() {
    // None marks a module with the wrong ABI version
    let sequences: [&[(&str, Option<&'static [u8]>)]; 2] = [
        &[
            ("1", Some(&b"Blur2\0"[..])),
            ("2", None),
            ("3", Some(&b"Invert\0"[..])),
            ("4", None),
            ("5", Some(&b"Invert\0"[..])),
        ],
        &[
            ("1", None),
            ("2", None),
            ("3", Some(&b"Invert\0"[..])),
            ("4", Some(&b"Invert\0"[..])),
            ("5", Some(&b"Blur2\0"[..])),
        ],
    ];

    for sequence in sequences {
        let mut registry = PluginRegistry::new();
        for &(origin, name) in sequence {
            let loaded = match name {
                Some(name) => load(PIXVIEW_ABI_VERSION, name, origin),
                None => load(0, b"Broken\0", origin),
            };
            registry.admit(origin, loaded);
        }
        assert_eq!(registry.len(), 2);
        // two invalid modules and one duplicate
        assert_eq!(registry.diagnostics().len(), 3);
    }
}

// ============================================================================
// Directory discovery
// ============================================================================

fn module_name(stem: &str) -> String {
    format!("{stem}.{}", std::env::consts::DLL_EXTENSION)
}

#[test]
fn test_discover_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    let registry = unsafe { PluginRegistry::discover(dir.path()) };
    assert!(registry.is_empty());
    assert!(registry.diagnostics().is_empty());
}

#[test]
fn test_discover_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let registry = unsafe { PluginRegistry::discover(dir.path().join("plugins")) };
    assert!(registry.is_empty());
}

#[test]
fn test_discover_reports_each_invalid_module() {
    let dir = tempfile::tempdir().unwrap();
    for stem in ["c_bad", "a_bad", "b_bad"] {
        fs::write(dir.path().join(module_name(stem)), b"not a shared library").unwrap();
    }
    fs::write(dir.path().join("README.txt"), b"ignored").unwrap();
    fs::create_dir(dir.path().join(module_name("subdir"))).unwrap();

    let registry = unsafe { PluginRegistry::discover(dir.path()) };
    assert!(registry.is_empty());

    let diagnostics = registry.diagnostics();
    assert_eq!(diagnostics.len(), 3);
    let order: Vec<_> = diagnostics
        .iter()
        .map(|d| d.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(order, vec![module_name("a_bad"), module_name("b_bad"), module_name("c_bad")]);
    for diagnostic in diagnostics {
        assert!(matches!(
            diagnostic.kind,
            DiagnosticKind::LoadFailed(PluginError::LoadFailed(_))
        ));
        assert!(diagnostic.to_string().starts_with("bad plugin"));
    }
}

#[test]
fn test_loader_candidates_match_extension_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    let loader = PluginLoader::new();
    let upper = format!("b.{}", loader.extension().to_uppercase());
    for name in [module_name("a"), upper.clone(), "c.txt".to_string()] {
        fs::write(dir.path().join(name), b"").unwrap();
    }

    let candidates = loader.candidates(dir.path());
    assert_eq!(
        candidates,
        vec![dir.path().join(module_name("a")), dir.path().join(upper)]
    );
}
