use desk::components::colors::{FillColor, NamedColor};
use desk::components::tools::Tool;
use desk::io::{SCRATCH_FILE_NAME, load_image_sync};
use desk::ops::shapes::{BoundsRect, ShapeStyle, draw_rect};
use desk::project::{CanvasEvents, Project};
use desk::settings::AppSettings;
use image::{Rgba, RgbaImage};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

fn session(dir: &tempfile::TempDir) -> Project {
    let settings = AppSettings {
        canvas_width: 80,
        canvas_height: 60,
        scratch_dir: dir.path().join("scratch"),
        ..AppSettings::default()
    };
    Project::new(&settings)
}

#[test]
fn filled_rectangle_preview_commits_final_shape_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = session(&dir);
    p.on_tool_selected(Tool::Rectangle);
    p.on_color_selected(NamedColor::Blue);
    p.on_fill_selected(FillColor::Solid(NamedColor::Orange));

    p.on_pointer_down((50.0, 30.0));
    p.on_pointer_move((70.0, 50.0));
    p.on_pointer_move((10.0, 10.0));
    p.on_pointer_up((10.0, 10.0));

    // Dragging up-left of the origin normalizes to (10,10)-(50,30).
    let mut expected = RgbaImage::from_pixel(80, 60, WHITE);
    let style = ShapeStyle::stroke(NamedColor::Blue.rgba(), 3.0)
        .with_fill(Some(NamedColor::Orange.rgba()));
    draw_rect(&mut expected, BoundsRect::from_corners((10.0, 10.0), (50.0, 30.0)), &style);

    assert_eq!(p.canvas_state.image(), &expected);
    assert_eq!(p.canvas_state.get_pixel(30, 20), NamedColor::Orange.rgba());
    assert_eq!(p.canvas_state.get_pixel(60, 40), WHITE);
    assert_eq!(p.history.undo_count(), 1);
}

#[test]
fn scratch_file_holds_the_pre_stroke_canvas() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = session(&dir);
    p.on_pointer_down((5.0, 5.0));
    p.on_pointer_move((20.0, 5.0));
    p.on_pointer_up((20.0, 5.0));
    let before_shape = p.canvas_state.image().clone();

    p.on_tool_selected(Tool::Line);
    p.on_pointer_down((0.0, 40.0));
    p.on_pointer_move((70.0, 40.0));

    let scratch = dir.path().join("scratch").join(SCRATCH_FILE_NAME);
    assert_eq!(load_image_sync(&scratch).unwrap(), before_shape);
}

#[test]
fn saved_drawing_reopens_identically() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = session(&dir);
    p.on_tool_selected(Tool::Circle);
    p.on_pointer_down((10.0, 10.0));
    p.on_pointer_move((60.0, 40.0));
    p.on_pointer_up((60.0, 40.0));
    let drawn = p.canvas_state.image().clone();

    let path = dir.path().join("circle.png");
    p.save_path(&path).unwrap();
    p.new_canvas();
    assert!(p.current_path().is_none());
    p.open_path(&path).unwrap();
    assert_eq!(p.canvas_state.image(), &drawn);
}
