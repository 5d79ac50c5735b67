//! Draws a small scene into the recording backend and prints what was
//! submitted.
//!
//! Run with `RUST_LOG=quill_geometry=debug` to see the path cache dump.

use std::f32::consts::PI;

use glam::Vec2;
use quill_core::{Color, logging, profiling};
use quill_geometry::{
    Context, ContextDescriptor, DrawCall, LineCap, LineJoin, Paint, RecordingBackend, Winding,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    profiling::set_enabled(true);

    let desc = ContextDescriptor::default().with_name("frame-stats");
    let mut ctx = Context::new(RecordingBackend::new(true), desc)?;

    profiling::new_frame();
    ctx.begin_frame(800.0, 600.0, 2.0);

    // Panel with a drop shadow
    ctx.begin_path();
    ctx.rect(30.0, 30.0, 320.0, 220.0);
    ctx.set_fill_paint(Paint::box_gradient(
        Vec2::new(40.0, 40.0),
        Vec2::new(300.0, 200.0),
        8.0,
        12.0,
        Color::rgba(0.0, 0.0, 0.0, 0.5),
        Color::TRANSPARENT,
    ));
    ctx.fill();

    ctx.begin_path();
    ctx.rounded_rect(40.0, 40.0, 300.0, 200.0, 8.0);
    ctx.set_fill_color(Color::from_hex(0x2B2F36));
    ctx.fill();

    // Ring with a hole
    ctx.with_saved(|ctx| {
        ctx.translate(190.0, 140.0);
        ctx.rotate(PI / 8.0);
        ctx.begin_path();
        ctx.circle(0.0, 0.0, 60.0);
        ctx.circle(0.0, 0.0, 35.0);
        ctx.path_winding(Winding::Hole);
        ctx.set_fill_paint(Paint::radial_gradient(
            Vec2::ZERO,
            35.0,
            60.0,
            Color::from_hex(0x4FC3F7),
            Color::from_hex(0x0277BD),
        ));
        ctx.fill();
    });

    // Polyline
    ctx.begin_path();
    ctx.move_to(60.0, 220.0);
    ctx.line_to(120.0, 180.0);
    ctx.quad_to(160.0, 240.0, 220.0, 190.0);
    ctx.line_to(320.0, 210.0);
    ctx.set_stroke_color(Color::WHITE);
    ctx.set_stroke_width(3.0);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);
    ctx.stroke();
    ctx.debug_dump_path_cache();

    let stats = ctx.end_frame();

    for (i, call) in ctx.backend().calls().iter().enumerate() {
        let kind = match call {
            DrawCall::Fill { .. } => "fill",
            DrawCall::Stroke { .. } => "stroke",
        };
        let vertices: usize = call.paths().iter().map(|p| p.fill.len() + p.stroke.len()).sum();
        println!("#{i} {kind}: {} path(s), {vertices} vertices", call.paths().len());
    }
    println!(
        "{} draw calls, {} fill triangles, {} stroke triangles",
        stats.draw_calls, stats.fill_triangles, stats.stroke_triangles
    );

    Ok(())
}
