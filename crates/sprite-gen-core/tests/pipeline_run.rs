use image::{Rgb, RgbImage, Rgba, RgbaImage};
use sprite_gen_core::error::SpriteError;
use sprite_gen_core::prelude::*;
use std::fs;
use std::path::Path;

fn png(dir: &Path, name: &str, w: u32, h: u32) {
    RgbaImage::from_pixel(w, h, Rgba([200, 100, 50, 255]))
        .save(dir.join(name))
        .expect("write png fixture");
}

fn jpg(dir: &Path, name: &str, w: u32, h: u32) {
    RgbImage::from_pixel(w, h, Rgb([10, 20, 30]))
        .save(dir.join(name))
        .expect("write jpeg fixture");
}

fn cfg_for(dir: &Path) -> SpriteConfig {
    SpriteConfig::builder().path(dir).build()
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn worked_example_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    png(dir.path(), "a-n.png", 20, 10);
    png(dir.path(), "b-n-pr5.png", 30, 10);
    png(dir.path(), "c-x.png", 40, 15);
    png(dir.path(), "d-x.png", 40, 20);
    jpg(dir.path(), "e.jpg", 8, 8);

    let report = run(cfg_for(dir.path())).expect("run");
    assert!(report.failed.is_empty());

    let n = report.sheet.group(RepeatClass::NoRepeat).expect("n");
    assert_eq!((n.width, n.height), (55, 10));
    let x = report.sheet.group(RepeatClass::RepeatX).expect("x");
    assert_eq!((x.width, x.height), (40, 35));
    assert!(report.sheet.group(RepeatClass::RepeatY).expect("y").is_empty());

    assert_eq!(
        listing(dir.path()),
        vec![
            "a-n.png",
            "b-n-pr5.png",
            "c-x.png",
            "d-x.png",
            "e.jpg",
            "sprites-x.png",
            "sprites.css",
            "sprites.png",
        ]
    );
    assert_eq!(image::image_dimensions(dir.path().join("sprites.png")).expect("dims"), (55, 10));
    assert_eq!(image::image_dimensions(dir.path().join("sprites-x.png")).expect("dims"), (40, 35));

    let css = fs::read_to_string(dir.path().join("sprites.css")).expect("css");
    assert_eq!(css, report.stylesheet);
    assert!(css.contains("background:url(sprites.png) no-repeat 0 0;"));
    assert!(css.contains("background:url(sprites.png) no-repeat -20px 0;"));
    assert!(css.contains("background:url(sprites-x.png) repeat-x 0 -15px;"));
    assert!(!css.contains(".e-jpg"));
}

#[test]
fn zero_fragments_is_fatal_and_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    jpg(dir.path(), "e.jpg", 8, 8);
    fs::write(dir.path().join("notes-n.txt"), "hello").expect("write");

    let r = run(cfg_for(dir.path()));
    assert!(matches!(r, Err(SpriteError::NoFragments)));
    assert_eq!(listing(dir.path()), vec!["e.jpg", "notes-n.txt"]);
}

#[test]
fn missing_path_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope");
    let r = run(cfg_for(&missing));
    assert!(matches!(r, Err(SpriteError::PathNotFound(p)) if p == missing));
    assert!(!missing.exists());
}

#[test]
fn invalid_config_is_fatal_before_scanning() {
    let dir = tempfile::tempdir().expect("tempdir");
    png(dir.path(), "a-n.png", 4, 4);
    let cfg = SpriteConfig::builder().path(dir.path()).prefix("a/b").build();
    assert!(matches!(run(cfg), Err(SpriteError::InvalidConfig(_))));
    assert_eq!(listing(dir.path()), vec!["a-n.png"]);
}

#[test]
fn unreadable_fragments_are_dropped() {
    let dir = tempfile::tempdir().expect("tempdir");
    png(dir.path(), "good-n.png", 6, 6);
    fs::write(dir.path().join("broken-n.png"), b"not an image at all").expect("write");
    fs::write(dir.path().join("empty-y.gif"), b"").expect("write");

    let report = run(cfg_for(dir.path())).expect("run");
    assert_eq!(report.sheet.num_fragments(), 1);
    assert!(!report.stylesheet.contains("broken"));
    assert!(!dir.path().join("sprites-y.png").exists());
}

#[test]
fn rerun_ignores_own_outputs_and_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    png(dir.path(), "top-x.png", 12, 3);
    png(dir.path(), "bottom-x.png", 12, 5);
    png(dir.path(), "side-y.png", 4, 9);
    png(dir.path(), "icon-n-pl2.png", 8, 8);
    jpg(dir.path(), "photo-n.jpeg", 5, 7);

    let first = run(cfg_for(dir.path())).expect("first run");
    let css_first = fs::read_to_string(dir.path().join("sprites.css")).expect("css");
    // the composites now sit in the same directory; sprites-x.png / sprites-y.png
    // match the suffix grammar but must not be picked up
    let second = run(cfg_for(dir.path())).expect("second run");
    let css_second = fs::read_to_string(dir.path().join("sprites.css")).expect("css");

    assert_eq!(css_first, css_second);
    assert_eq!(first.sheet.num_fragments(), 5);
    assert_eq!(second.sheet.num_fragments(), 5);
    for (a, b) in first.sheet.groups.iter().zip(&second.sheet.groups) {
        assert_eq!(a, b);
    }
    let x = second.sheet.group(RepeatClass::RepeatX).expect("x");
    let order: Vec<&str> = x.items.iter().map(|i| i.fragment.file_name.as_str()).collect();
    assert_eq!(order, vec!["bottom-x.png", "top-x.png"]);
}

#[test]
fn probed_metadata_is_recorded() {
    let dir = tempfile::tempdir().expect("tempdir");
    jpg(dir.path(), "pic-n.jpg", 5, 7);
    // content decides the format, not the extension
    RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]))
        .save_with_format(dir.path().join("disguised-n.gif"), image::ImageFormat::Png)
        .expect("write png bytes under a gif name");

    let sheet = plan(&cfg_for(dir.path())).expect("plan");
    let n = sheet.group(RepeatClass::NoRepeat).expect("n");
    let by_name = |name: &str| {
        n.items
            .iter()
            .find(|i| i.fragment.file_name == name)
            .map(|i| i.fragment.clone())
            .expect("fragment present")
    };
    let pic = by_name("pic-n.jpg");
    assert_eq!((pic.width, pic.height, pic.format), (5, 7, SourceFormat::Jpeg));
    assert!(pic.file_size > 0);
    let disguised = by_name("disguised-n.gif");
    assert_eq!(disguised.format, SourceFormat::Png);
    // plan never writes
    assert!(!dir.path().join("sprites.css").exists());
}

#[test]
fn render_failure_skips_only_that_composite() {
    let dir = tempfile::tempdir().expect("tempdir");
    png(dir.path(), "ok-n.png", 4, 4);
    png(dir.path(), "bad-x.png", 4, 4);
    let cfg = cfg_for(dir.path());

    let sheet = plan(&cfg).expect("plan");
    // the file goes bad between probing and rendering
    fs::write(dir.path().join("bad-x.png"), b"garbage").expect("corrupt");
    let renders = render_sheet(&sheet, &cfg);
    assert_eq!(renders.len(), 3);
    for r in &renders {
        match (r.class, &r.outcome) {
            (RepeatClass::NoRepeat, GroupOutcome::Rendered(c)) => assert_eq!(c.dimensions(), (4, 4)),
            (RepeatClass::RepeatY, GroupOutcome::Empty) => {}
            (RepeatClass::RepeatX, GroupOutcome::Failed(_)) => {}
            (class, _) => panic!("unexpected outcome for {class}"),
        }
    }
}

#[test]
fn sequential_render_hands_over_one_canvas_at_a_time() {
    let dir = tempfile::tempdir().expect("tempdir");
    png(dir.path(), "a-n.png", 100, 100);
    png(dir.path(), "b-y.png", 100, 100);
    png(dir.path(), "c-x.png", 100, 100);
    let limit = 10_000u64;
    let cfg = SpriteConfig::builder()
        .path(dir.path())
        .max_canvas_pixels(limit)
        .build();
    let sheet = plan(&cfg).expect("plan");

    let mut seen = Vec::new();
    render_each(&sheet, &cfg, |render| {
        if let GroupOutcome::Rendered(canvas) = &render.outcome {
            assert!(canvas.as_raw().len() as u64 <= limit * 4);
        }
        if render.class == RepeatClass::NoRepeat {
            // later groups must not have been rendered yet
            fs::write(dir.path().join("c-x.png"), b"garbage").expect("corrupt");
        }
        seen.push((render.class, matches!(render.outcome, GroupOutcome::Rendered(_))));
        Ok(())
    })
    .expect("render_each");

    assert_eq!(
        seen,
        vec![
            (RepeatClass::NoRepeat, true),
            (RepeatClass::RepeatY, true),
            (RepeatClass::RepeatX, false),
        ]
    );
}

#[test]
fn render_each_stops_on_sink_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    png(dir.path(), "a-n.png", 2, 2);
    png(dir.path(), "b-x.png", 2, 2);
    let cfg = cfg_for(dir.path());
    let sheet = plan(&cfg).expect("plan");

    let mut calls = 0;
    let r = render_each(&sheet, &cfg, |_| {
        calls += 1;
        Err(SpriteError::NoFragments)
    });
    assert!(matches!(r, Err(SpriteError::NoFragments)));
    assert_eq!(calls, 1);
}

#[cfg(unix)]
#[test]
fn unreadable_directory_is_an_io_error() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("tempdir");
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).expect("mkdir");
    png(&locked, "a-n.png", 2, 2);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("chmod");

    // privileged users can still list it; nothing to check then
    if fs::read_dir(&locked).is_err() {
        let r = run(cfg_for(&locked));
        assert!(matches!(r, Err(SpriteError::Io(_))), "got {r:?}");
    }
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("chmod back");
}

#[test]
fn canvas_limit_fails_group_but_run_continues() {
    let dir = tempfile::tempdir().expect("tempdir");
    png(dir.path(), "small-n.png", 2, 2);
    png(dir.path(), "big-y.png", 50, 50);
    let cfg = SpriteConfig::builder()
        .path(dir.path())
        .max_canvas_pixels(100)
        .build();

    let report = run(cfg).expect("run");
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, RepeatClass::RepeatY);
    assert!(dir.path().join("sprites.png").exists());
    assert!(!dir.path().join("sprites-y.png").exists());
    // rules for the missing composite are still emitted
    assert!(report.stylesheet.contains("url(sprites-y.png) repeat-y"));
}

#[test]
fn solid_matte_writes_opaque_rgb_png() {
    let dir = tempfile::tempdir().expect("tempdir");
    png(dir.path(), "a-n-pr3.png", 2, 2);
    let cfg = SpriteConfig::builder()
        .path(dir.path())
        .prefix("ui")
        .matte(Matte::Solid([1, 2, 3]))
        .build();

    run(cfg).expect("run");
    let img = image::open(dir.path().join("ui.png")).expect("open");
    assert_eq!(img.color(), image::ColorType::Rgb8);
    let rgb = img.to_rgb8();
    assert_eq!(*rgb.get_pixel(4, 1), Rgb([1, 2, 3]));
    assert_eq!(*rgb.get_pixel(0, 0), Rgb([200, 100, 50]));
    assert!(dir.path().join("ui.css").exists());
}
