mod common;

use common::{FakeCamera, FakeContext, GpuOp};
use glam::{Mat4, Vec2, Vec3, Vec4};
use std::f32::consts::FRAC_PI_2;

use basalt::error::RendererError;
use basalt::graphics::{CullMode, DepthFunc, PolygonMode};
use basalt::renderer::{
    DirectionalLight, Material, PassKind, TextureRegion, VertexRecord, NO_TEXTURE_SLOT,
};
use basalt::{BatchRenderer, RenderSettings};

fn settings(max_quads: u32, max_texture_slots: u32) -> RenderSettings {
    RenderSettings {
        max_quads,
        max_texture_slots,
        shadow_map_resolution: 256,
        post_processing: false,
    }
}

fn renderer(settings: RenderSettings) -> BatchRenderer<FakeContext> {
    common::init_logs();
    BatchRenderer::new(FakeContext::new(), settings).unwrap()
}

fn vertex_uploads(renderer: &BatchRenderer<FakeContext>) -> Vec<Vec<u8>> {
    renderer.context().vertex_buffers[0].uploads.borrow().clone()
}

#[test]
fn several_shapes_share_one_upload_and_rebased_indices() {
    let mut renderer = renderer(settings(100, 8));
    renderer.begin_scene(&FakeCamera::new());

    renderer.submit_quad(Mat4::IDENTITY, Vec4::ONE).unwrap();
    renderer
        .submit_triangle(Mat4::from_translation(Vec3::X), Vec4::ONE)
        .unwrap();
    renderer.end_scene();

    let uploads = vertex_uploads(&renderer);
    assert_eq!(uploads.len(), 1);

    let indices = renderer.context().index_buffers[0].uploads.borrow().clone();
    // The triangle's indices are rebased past the quad's four vertices.
    assert_eq!(indices[0], vec![0, 1, 2, 2, 3, 0, 4, 5, 6]);
}

#[test]
fn filling_the_vertex_budget_splits_the_frame_into_two_flushes() {
    // 6 quads fill 24 vertices / 36 indices exactly.
    let mut renderer = renderer(settings(6, 8));
    renderer.begin_scene(&FakeCamera::new());

    for i in 0..7 {
        renderer
            .submit_quad(Mat4::from_translation(Vec3::X * i as f32), Vec4::ONE)
            .unwrap();
    }
    renderer.end_scene();

    let uploads = vertex_uploads(&renderer);
    assert_eq!(uploads.len(), 2);
    assert_eq!(
        uploads[0].len(),
        24 * std::mem::size_of::<VertexRecord>()
    );
    assert_eq!(uploads[1].len(), 4 * std::mem::size_of::<VertexRecord>());

    // end_scene flushes without resetting; the next begin_scene reopens.
    assert_eq!(renderer.staged_vertices(), 4);
    assert_eq!(renderer.staged_indices(), 6);
    renderer.begin_scene(&FakeCamera::new());
    assert_eq!(renderer.staged_vertices(), 0);
}

#[test]
fn texture_slot_exhaustion_flushes_and_reassigns_from_slot_one() {
    let mut renderer = renderer(settings(100, 4));
    let textures: Vec<_> = (0..4)
        .map(|_| renderer.create_texture(2, 2, &[0; 16]))
        .collect();

    renderer.begin_scene(&FakeCamera::new());
    for texture in &textures[..3] {
        renderer
            .submit_textured_quad(Mat4::IDENTITY, texture, Vec4::ONE)
            .unwrap();
    }
    // A fourth distinct texture cannot fit in slots 1..4.
    renderer
        .submit_textured_quad(Mat4::IDENTITY, &textures[3], Vec4::ONE)
        .unwrap();
    renderer.end_scene();

    let uploads = vertex_uploads(&renderer);
    assert_eq!(uploads.len(), 2);

    // After the forced flush the new texture starts over at slot 1.
    let records: Vec<VertexRecord> = bytemuck::pod_collect_to_vec(&uploads[1]);
    assert_eq!(records[0].texture_slots[0], 1);
}

#[test]
fn repeated_texture_keeps_its_slot_and_is_bound_once_per_flush() {
    let mut renderer = renderer(settings(100, 4));
    let texture = renderer.create_texture(2, 2, &[0; 16]);
    let id = {
        use basalt::graphics::Texture;
        texture.id().0
    };

    renderer.begin_scene(&FakeCamera::new());
    for _ in 0..10 {
        renderer
            .submit_textured_quad(Mat4::IDENTITY, &texture, Vec4::ONE)
            .unwrap();
    }
    renderer.end_scene();

    assert_eq!(vertex_uploads(&renderer).len(), 1);
    let binds = renderer
        .context()
        .ops()
        .iter()
        .filter(|op| matches!(op, GpuOp::BindTexture(bound, _) if *bound == id))
        .count();
    assert_eq!(binds, 1);
}

#[test]
fn white_texture_is_bound_to_slot_zero_exactly_once() {
    let mut renderer = renderer(settings(6, 8));

    renderer.begin_scene(&FakeCamera::new());
    for i in 0..13 {
        renderer
            .submit_quad(Mat4::from_translation(Vec3::X * i as f32), Vec4::ONE)
            .unwrap();
    }
    renderer.end_scene();

    let slot_zero_binds = renderer
        .context()
        .ops()
        .iter()
        .filter(|op| matches!(op, GpuOp::BindTexture(_, 0)))
        .count();
    assert_eq!(slot_zero_binds, 1);
}

#[test]
fn transforms_are_applied_before_staging() {
    let mut renderer = renderer(settings(100, 8));
    renderer.begin_scene(&FakeCamera::new());
    renderer
        .submit_quad(Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)), Vec4::ONE)
        .unwrap();
    renderer.end_scene();

    let uploads = vertex_uploads(&renderer);
    let records: Vec<VertexRecord> = bytemuck::pod_collect_to_vec(&uploads[0]);
    assert_eq!(records[0].position, [0.5, 1.5, 3.0, 1.0]);
    assert_eq!(records[2].position, [1.5, 2.5, 3.0, 1.0]);
}

#[test]
fn normals_and_tangents_rotate_with_the_transform() {
    let mut renderer = renderer(settings(100, 8));
    renderer.begin_scene(&FakeCamera::new());
    renderer
        .submit_quad(Mat4::from_rotation_x(-FRAC_PI_2), Vec4::ONE)
        .unwrap();
    renderer.end_scene();

    let uploads = vertex_uploads(&renderer);
    let records: Vec<VertexRecord> = bytemuck::pod_collect_to_vec(&uploads[0]);
    let normal = Vec3::from_array(records[0].normal);
    let tangent = Vec3::from_array(records[0].tangent);
    assert!((normal - Vec3::Y).length() < 1e-5);
    assert!((tangent - Vec3::X).length() < 1e-5);
}

#[test]
fn pass_order_without_skybox_or_post_processing_ends_in_a_blit() {
    let mut renderer = renderer(settings(100, 8));
    renderer.add_directional_light(DirectionalLight::default()).unwrap();

    assert_eq!(
        renderer.planned_passes(),
        vec![
            PassKind::ShadowDirectional,
            PassKind::ShadowOmnidirectional,
            PassKind::Geometry,
            PassKind::Overlay,
            PassKind::BlitToScreen,
        ]
    );

    renderer.begin_scene(&FakeCamera::new());
    renderer.submit_cuboid(Mat4::IDENTITY, Vec4::ONE).unwrap();
    renderer.end_scene();

    let ops = renderer.context().ops();
    let shadow_bind = ops
        .iter()
        .position(|op| *op == GpuOp::BindFramebuffer("directional shadow map"))
        .unwrap();
    let scene_bind = ops
        .iter()
        .position(|op| *op == GpuOp::BindFramebuffer("scene"))
        .unwrap();
    assert!(shadow_bind < scene_bind);
    assert_eq!(ops.last(), Some(&GpuOp::Blit("scene")));
}

#[test]
fn shadow_passes_cull_front_faces() {
    let mut renderer = renderer(settings(100, 8));
    renderer.add_directional_light(DirectionalLight::default()).unwrap();

    renderer.begin_scene(&FakeCamera::new());
    renderer.submit_cuboid(Mat4::IDENTITY, Vec4::ONE).unwrap();
    renderer.end_scene();

    let ops = renderer.context().ops();
    let front = ops
        .iter()
        .position(|op| *op == GpuOp::SetCulling(CullMode::Front))
        .unwrap();
    let first_draw = ops
        .iter()
        .position(|op| matches!(op, GpuOp::DrawIndexed(_)))
        .unwrap();
    assert!(front < first_draw);
    assert!(ops.contains(&GpuOp::SetCulling(CullMode::Back)));
    assert!(ops.contains(&GpuOp::ShaderUniform("shadow:u_CurrentLight".into())));
}

#[test]
fn non_casting_materials_are_left_out_of_the_shadow_passes() {
    let mut renderer = renderer(settings(100, 8));
    renderer.add_directional_light(DirectionalLight::default()).unwrap();

    renderer.begin_scene(&FakeCamera::new());
    let material = Material {
        casts_shadows: false,
        ..Material::default()
    };
    renderer
        .submit_quad_with_material(Mat4::IDENTITY, &material)
        .unwrap();
    renderer.end_scene();

    let ops = renderer.context().ops();
    let shadow_bind = ops
        .iter()
        .position(|op| *op == GpuOp::BindFramebuffer("directional shadow map"))
        .unwrap();
    let scene_bind = ops
        .iter()
        .position(|op| *op == GpuOp::BindFramebuffer("scene"))
        .unwrap();
    // The shadow target is still cleared, but nothing is drawn into it.
    assert!(!ops[shadow_bind..scene_bind]
        .iter()
        .any(|op| matches!(op, GpuOp::DrawIndexed(_))));
    assert!(ops[scene_bind..].contains(&GpuOp::DrawIndexed(6)));
}

#[test]
fn shadow_passes_draw_only_the_casting_subset() {
    let mut renderer = renderer(settings(100, 8));
    renderer.add_directional_light(DirectionalLight::default()).unwrap();

    renderer.begin_scene(&FakeCamera::new());
    renderer.submit_quad(Mat4::IDENTITY, Vec4::ONE).unwrap();
    let material = Material {
        casts_shadows: false,
        ..Material::default()
    };
    renderer
        .submit_quad_with_material(Mat4::from_translation(Vec3::X), &material)
        .unwrap();
    renderer.end_scene();

    let ops = renderer.context().ops();
    let scene_bind = ops
        .iter()
        .position(|op| *op == GpuOp::BindFramebuffer("scene"))
        .unwrap();
    assert!(ops[..scene_bind].contains(&GpuOp::DrawIndexed(6)));
    assert!(ops[scene_bind..].contains(&GpuOp::DrawIndexed(12)));

    // The shadow index list holds only the casting quad's indices.
    let shadow_indices = renderer.context().index_buffers[1].uploads.borrow().clone();
    assert_eq!(shadow_indices[0], vec![0, 1, 2, 2, 3, 0]);
}

#[test]
fn region_submissions_stage_the_region_uvs() {
    let mut renderer = renderer(settings(100, 8));
    let texture = renderer.create_texture(4, 4, &[0; 64]);
    let region = TextureRegion::new(texture, Vec2::new(0.25, 0.5), Vec2::new(0.5, 0.75));

    renderer.begin_scene(&FakeCamera::new());
    renderer
        .submit_quad_with_region(Mat4::IDENTITY, &region, Vec4::ONE)
        .unwrap();
    renderer.end_scene();

    let uploads = vertex_uploads(&renderer);
    let records: Vec<VertexRecord> = bytemuck::pod_collect_to_vec(&uploads[0]);
    assert_eq!(records[0].uv, [0.25, 0.5]);
    assert_eq!(records[2].uv, [0.5, 0.75]);
    // The region's texture lands in the first batch slot.
    assert_eq!(records[0].texture_slots[0], 1);
}

#[test]
fn untextured_materials_resolve_no_slots() {
    let mut renderer = renderer(settings(100, 8));
    renderer.begin_scene(&FakeCamera::new());
    let material = Material {
        tint: Vec4::new(1.0, 0.0, 0.0, 1.0),
        ..Material::default()
    };
    renderer
        .submit_quad_with_material(Mat4::IDENTITY, &material)
        .unwrap();
    renderer.end_scene();

    let uploads = vertex_uploads(&renderer);
    let records: Vec<VertexRecord> = bytemuck::pod_collect_to_vec(&uploads[0]);
    assert_eq!(records[0].texture_slots, [NO_TEXTURE_SLOT; 5]);

    // Only the reserved white texture is ever bound in the batch range.
    let batch_binds = renderer
        .context()
        .ops()
        .iter()
        .filter(|op| matches!(op, GpuOp::BindTexture(_, slot) if *slot >= 1 && *slot < 8))
        .count();
    assert_eq!(batch_binds, 0);
}

#[test]
fn empty_scene_issues_no_uploads_or_draws() {
    let mut renderer = renderer(settings(100, 8));
    renderer.begin_scene(&FakeCamera::new());
    renderer.end_scene();

    let ops = renderer.context().ops();
    assert!(!ops.iter().any(|op| matches!(op, GpuOp::VertexUpload(_))));
    assert!(!ops.iter().any(|op| matches!(op, GpuOp::DrawIndexed(_))));
}

#[test]
fn post_processing_draws_a_fullscreen_pass_instead_of_blitting() {
    let mut renderer = renderer(RenderSettings {
        post_processing: true,
        ..settings(100, 8)
    });
    assert_eq!(renderer.planned_passes().last(), Some(&PassKind::PostProcess));

    renderer.begin_scene(&FakeCamera::new());
    renderer.submit_quad(Mat4::IDENTITY, Vec4::ONE).unwrap();
    renderer.end_scene();

    let ops = renderer.context().ops();
    assert!(ops.contains(&GpuOp::BindScreen));
    assert!(ops.contains(&GpuOp::DrawVertices(6)));
    assert!(!ops.iter().any(|op| matches!(op, GpuOp::Blit(_))));
}

#[test]
fn skybox_draws_a_cube_with_lequal_depth() {
    let mut renderer = renderer(settings(100, 8));
    let cubemap = renderer.create_texture(1, 1, &[0; 4]);
    renderer.set_skybox(Some(cubemap));

    assert!(renderer.planned_passes().contains(&PassKind::Skybox));

    renderer.begin_scene(&FakeCamera::new());
    renderer.submit_quad(Mat4::IDENTITY, Vec4::ONE).unwrap();
    renderer.end_scene();

    let ops = renderer.context().ops();
    assert!(ops.contains(&GpuOp::SetDepthFunc(DepthFunc::Lequal)));
    assert!(ops.contains(&GpuOp::DrawVertices(36)));
}

#[test]
fn overlay_redraws_the_batch_with_depth_testing_disabled() {
    let mut renderer = renderer(settings(100, 8));
    renderer.begin_scene(&FakeCamera::new());
    renderer.submit_quad(Mat4::IDENTITY, Vec4::ONE).unwrap();
    renderer.end_scene();

    let ops = renderer.context().ops();
    let draws = ops
        .iter()
        .filter(|op| matches!(op, GpuOp::DrawIndexed(6)))
        .count();
    // Geometry plus overlay, same snapshot.
    assert_eq!(draws, 2);
    assert!(ops.contains(&GpuOp::SetDepthFunc(DepthFunc::Always)));
}

#[test]
fn directional_light_limit_is_enforced() {
    let mut renderer = renderer(settings(100, 8));
    for _ in 0..5 {
        renderer.add_directional_light(DirectionalLight::default()).unwrap();
    }

    let result = renderer.add_directional_light(DirectionalLight::default());
    assert!(matches!(
        result,
        Err(RendererError::TooManyLights { kind: "directional", max: 5 })
    ));
}

#[test]
fn incomplete_shadow_target_fails_light_setup() {
    let mut context = FakeContext::new();
    context.failing_framebuffers.insert("directional shadow map");
    let mut renderer = BatchRenderer::new(context, settings(100, 8)).unwrap();

    let result = renderer.add_directional_light(DirectionalLight::default());
    assert!(matches!(
        result,
        Err(RendererError::IncompleteFramebuffer { label: "directional shadow map" })
    ));
}

#[test]
fn wireframe_toggle_switches_polygon_mode() {
    let mut renderer = renderer(settings(100, 8));
    renderer.set_wireframe(true);
    renderer.set_wireframe(false);

    let ops = renderer.context().ops();
    assert!(ops.contains(&GpuOp::SetPolygonMode(PolygonMode::Line)));
    assert!(ops.contains(&GpuOp::SetPolygonMode(PolygonMode::Fill)));
}
