//! End-to-end tests for the editing session: real image files on disk,
//! built-in and plugin transforms, navigation and saving.

use pixview::buffer::PixelBuffer;
use pixview::codec::{ImageCodec, ImageCrateCodec};
use pixview::config::Config;
use pixview::format::ImageFormat;
use pixview::navigation::Boundary;
use pixview::plugin::{
    PIXVIEW_ABI_VERSION, PluginRegistry, PluginTransform, RawImage, RawImageMut, STATUS_BAD_INPUT,
    STATUS_OK, TransformDescriptor,
};
use pixview::session::{EditorSession, ImageStatus, Navigation};
use pixview::Error;
use std::ffi::{c_char, c_int};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

fn checkerboard(width: usize, height: usize) -> PixelBuffer {
    let mut buf = PixelBuffer::new(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            let v = if (x / 4 + y / 4) % 2 == 0 { 230 } else { 20 };
            buf.set_pixel(x, y, [v, v / 2, 255 - v]);
        }
    }
    buf
}

fn write_image(dir: &TempDir, name: &str, buf: &PixelBuffer) -> PathBuf {
    let path = dir.path().join(name);
    let format = ImageFormat::from_path(&path).unwrap();
    let bytes = ImageCrateCodec::new().encode(&buf.as_view(), format).unwrap();
    fs::write(&path, bytes).unwrap();
    path
}

unsafe extern "C" fn invert(input: *const RawImage, output: *mut RawImageMut) -> c_int {
    // SAFETY: The host passes valid images.
    let (input, mut output) = unsafe {
        match ((*input).as_view(), (*output).as_view_mut()) {
            (Some(i), Some(o)) => (i, o),
            _ => return STATUS_BAD_INPUT,
        }
    };
    for y in 0..input.height() {
        for x in 0..input.width() {
            output.set_pixel(x, y, input.pixel(x, y).map(|c| 255 - c));
        }
    }
    STATUS_OK
}

unsafe extern "C" fn grow(_input: *const RawImage, output: *mut RawImageMut) -> c_int {
    // SAFETY: The host passes a valid output image.
    unsafe { (*output).height += 1 };
    STATUS_OK
}

fn plugin(name: &'static [u8], apply: pixview::plugin::ApplyFn) -> PluginTransform {
    let descriptor: &'static TransformDescriptor = Box::leak(Box::new(TransformDescriptor {
        abi_version: PIXVIEW_ABI_VERSION,
        name: name.as_ptr() as *const c_char,
        description: b"test plugin\0".as_ptr() as *const c_char,
        apply: Some(apply),
    }));
    unsafe { PluginTransform::from_static(descriptor, "static") }.unwrap()
}

fn registry() -> Arc<PluginRegistry> {
    let mut registry = PluginRegistry::new();
    registry.admit("invert.so", Ok(plugin(b"Invert\0", invert)));
    registry.admit("grow.so", Ok(plugin(b"Grow\0", grow)));
    // shadowed by the built-in of the same name
    registry.admit("blur.so", Ok(plugin(b"Blur\0", invert)));
    Arc::new(registry)
}

fn current_name(session: &EditorSession) -> String {
    session
        .current_path()
        .and_then(Path::file_name)
        .unwrap()
        .to_string_lossy()
        .into_owned()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_previous_from_b_then_at_start() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.png", "b.png", "c.png"] {
        write_image(&dir, name, &checkerboard(8, 8));
    }

    let mut session = EditorSession::new(registry());
    session.load(dir.path().join("b.png")).unwrap();

    assert_eq!(
        session.go_to_previous().unwrap(),
        Navigation::Moved(dir.path().join("a.png"))
    );
    assert_eq!(current_name(&session), "a.png");

    assert_eq!(
        session.go_to_previous().unwrap(),
        Navigation::Boundary(Boundary::AtStart)
    );
    assert_eq!(current_name(&session), "a.png");
}

#[test]
fn test_next_across_formats_until_end() {
    let dir = tempfile::tempdir().unwrap();
    write_image(&dir, "1.bmp", &checkerboard(4, 4));
    write_image(&dir, "2.jpg", &checkerboard(6, 5));
    write_image(&dir, "3.png", &checkerboard(2, 3));
    fs::write(dir.path().join("4.txt"), b"skip me").unwrap();

    let mut session = EditorSession::new(registry());
    session.load(dir.path().join("1.bmp")).unwrap();

    let mut sizes = vec![];
    while let Navigation::Moved(_) = session.go_to_next().unwrap() {
        let buf = session.current_buffer().unwrap();
        sizes.push((buf.width(), buf.height()));
    }
    assert_eq!(sizes, vec![(6, 5), (2, 3)]);
    assert_eq!(current_name(&session), "3.png");
}

#[test]
fn test_undecodable_neighbor_keeps_current() {
    let dir = tempfile::tempdir().unwrap();
    write_image(&dir, "a.png", &checkerboard(4, 4));
    fs::write(dir.path().join("b.png"), b"corrupt").unwrap();

    let mut session = EditorSession::new(registry());
    session.load(dir.path().join("a.png")).unwrap();
    assert!(matches!(session.go_to_next(), Err(Error::Decode { .. })));
    assert_eq!(current_name(&session), "a.png");
}

#[test]
fn test_plugin_and_builtin_transforms() {
    let dir = tempfile::tempdir().unwrap();
    let original = checkerboard(12, 9);
    let path = write_image(&dir, "a.png", &original);

    let mut session = EditorSession::new(registry());
    session.load(&path).unwrap();
    assert_eq!(session.transform_names(), vec!["Blur", "Invert", "Grow"]);

    session.apply_transform("Invert").unwrap();
    assert_eq!(session.current_buffer().unwrap().pixel(0, 0), [25, 140, 230]);

    session.apply_transform("Blur").unwrap();
    let blurred = session.current_buffer().unwrap();
    assert_eq!((blurred.width(), blurred.height()), (12, 9));
    assert_eq!(
        session.status(),
        Some(ImageStatus::Edited {
            width: 12,
            height: 9
        })
    );
}

#[test]
fn test_resizing_plugin_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(&dir, "a.png", &checkerboard(5, 5));

    let mut session = EditorSession::new(registry());
    session.load(&path).unwrap();
    let before = session.current_buffer().unwrap().clone();

    let err = session.apply_transform("Grow").unwrap_err();
    assert!(matches!(
        err,
        Error::TransformContractViolation { height: 6, expected_height: 5, .. }
    ));
    assert_eq!(session.current_buffer(), Some(&before));
    assert!(!session.is_edited());
}

#[test]
fn test_no_current_image_never_mutates() {
    let mut session = EditorSession::new(registry());
    for name in ["Blur", "Invert", "Missing"] {
        assert!(matches!(session.apply_transform(name), Err(Error::NoCurrentImage)));
    }
    assert!(session.current_buffer().is_none());
}

#[test]
fn test_save_and_reload_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let original = checkerboard(16, 10);
    let path = write_image(&dir, "a.png", &original);

    let mut session = EditorSession::new(registry());
    session.load(&path).unwrap();
    session.apply_transform("Invert").unwrap();
    let edited = session.current_buffer().unwrap().clone();

    for name in ["copy.bmp", "copy.PNG"] {
        let target = dir.path().join(name);
        session.save(&target).unwrap();
        let mut reloaded = EditorSession::new(registry());
        reloaded.load(&target).unwrap();
        assert_eq!(reloaded.current_buffer(), Some(&edited), "{name}");
    }

    // lossy: dimensions only
    let jpg = dir.path().join("copy.jpg");
    session.save(&jpg).unwrap();
    session.load(&jpg).unwrap();
    session.save(&jpg).unwrap();
    session.load(&jpg).unwrap();
    let buf = session.current_buffer().unwrap();
    assert_eq!((buf.width(), buf.height()), (16, 10));
}

#[test]
fn test_save_rejects_unknown_extensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(&dir, "a.png", &checkerboard(4, 4));
    let mut session = EditorSession::new(registry());
    session.load(&path).unwrap();

    for name in ["out.gif", "out.jpeg", "out", ".png"] {
        let target = dir.path().join(name);
        assert!(
            matches!(session.save(&target), Err(Error::UnsupportedFormat(_))),
            "{name}"
        );
        assert!(!target.exists());
    }
}

#[test]
fn test_status_line_for_loaded_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(&dir, "shot.bmp", &checkerboard(3, 2));
    let size = fs::metadata(&path).unwrap().len();

    let mut session = EditorSession::new(registry());
    session.load(&path).unwrap();
    assert_eq!(
        session.status().unwrap().to_string(),
        format!("{}, 3x2, {} Bytes", path.display(), size)
    );
}

#[test]
fn test_session_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(&dir, "a.png", &checkerboard(8, 8));
    let config = Config::from_toml("[blur]\nkernel = 1").unwrap();

    let mut session = EditorSession::from_config(&config, Arc::new(PluginRegistry::new()));
    session.load(&path).unwrap();
    let before = session.current_buffer().unwrap().clone();
    session.apply_transform("Blur").unwrap();
    // a 1x1 box is the identity
    assert_eq!(session.current_buffer().unwrap().as_bytes(), before.as_bytes());
    assert!(session.is_edited());
}
