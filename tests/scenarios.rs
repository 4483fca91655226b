//! End-to-end authoring and reload scenarios

use std::fs;
use std::path::Path;

use beat_engine::assets::MaterialValue;
use beat_engine::core::{SceneDocument, scene_to_document};
use beat_engine::ecs::GraphError;
use beat_engine::prelude::*;

const BOX_OBJ: &str = "\
v -0.5 -0.5 0.5
v 0.5 -0.5 0.5
v 0.5 0.5 0.5
v -0.5 0.5 0.5
vn 0 0 1
f 1//1 2//1 3//1 4//1
";

fn write_png(path: &Path) {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 120, 40, 255]));
    img.save(path).unwrap();
}

/// Asset root with a box mesh, its texture and a shader pair
fn asset_root() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("box.obj"), BOX_OBJ).unwrap();
    write_png(&dir.path().join("box.png"));
    fs::write(dir.path().join("basic.vert"), "void main() {}").unwrap();
    fs::write(dir.path().join("basic.frag"), "void main() {}").unwrap();
    dir
}

fn box_material(registry: &ResourceRegistry) -> (AssetHandle<Material>, AssetHandle<Texture>) {
    let shader = registry
        .create_or_load::<Shader>(AssetDescriptor::shader([
            (ShaderStage::Vertex, "basic.vert"),
            (ShaderStage::Fragment, "basic.frag"),
        ]))
        .unwrap();
    let texture = registry
        .create_or_load::<Texture>(AssetDescriptor::texture_2d("box.png"))
        .unwrap();
    let material = registry
        .create_material(
            Material::builder("Box", shader)
                .set("u_Material.Diffuse", texture.clone())
                .set("u_Material.Shininess", 0.1_f32)
                .build(),
        )
        .unwrap();
    (material, texture)
}

#[test]
fn test_same_obj_loads_once() {
    let dir = asset_root();
    let registry = ResourceRegistry::new(dir.path());

    let first = registry.create_or_load::<Mesh>(AssetDescriptor::mesh("box.obj")).unwrap();
    let second = registry.create_or_load::<Mesh>(AssetDescriptor::mesh("./box.obj")).unwrap();

    assert_eq!(first.guid(), second.guid());
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.ref_count(first.guid()).unwrap(), 2);
    assert_eq!(first.triangle_count(), 2);
}

#[test]
fn test_player_reloads_with_missing_texture() {
    let dir = asset_root();
    let manifest_path = dir.path().join("manifest.json");
    let scene_path = dir.path().join("level.json");

    let (material_guid, texture_guid, player_guid) = {
        let registry = ResourceRegistry::new(dir.path());
        let mesh = registry.create_or_load::<Mesh>(AssetDescriptor::mesh("box.obj")).unwrap();
        let (material, texture) = box_material(&registry);

        let mut scene = Scene::new("Level");
        let player = scene.create_entity("Player");
        scene
            .set_local_transform(player, Transform::from_position(Vec3::new(1.0, 2.0, 3.0)))
            .unwrap();
        scene
            .attach(player, RenderComponent::new(mesh, material.clone()))
            .unwrap();
        scene
            .attach(
                player,
                RigidBody::new(BodyType::Dynamic).with_collider(Collider::cuboid(Vec3::splat(0.5))),
            )
            .unwrap();

        registry.save_manifest(&manifest_path).unwrap();
        scene.save(&scene_path).unwrap();
        let guid = scene.entity(player).unwrap().guid();
        (material.guid(), texture.guid(), guid)
    };

    // Drop the texture from the manifest, as if it was deleted from the project
    let mut manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&manifest_path).unwrap()).unwrap();
    let removed = manifest["assets"]
        .as_object_mut()
        .unwrap()
        .remove(&texture_guid.to_string());
    assert!(removed.is_some());
    fs::write(&manifest_path, serde_json::to_string(&manifest).unwrap()).unwrap();

    let registry = ResourceRegistry::new(dir.path());
    let report = registry.load_manifest(&manifest_path).unwrap();
    assert!(report.failed.is_empty());
    assert_eq!(report.missing_references.len(), 1);
    assert_eq!(report.missing_references[0].asset, material_guid);
    assert_eq!(report.missing_references[0].missing, texture_guid);

    let material = registry.get_typed::<Material>(material_guid).unwrap();
    match material.get("u_Material.Diffuse") {
        Some(MaterialValue::Texture(diffuse)) => {
            assert!(diffuse.is_placeholder());
            assert_eq!(diffuse.guid(), texture_guid);
        }
        other => panic!("unexpected diffuse {other:?}"),
    }

    let factory = ComponentFactory::with_builtins();
    let (scene, load) = Scene::load(&scene_path, &registry, &factory).unwrap();
    assert!(load.is_clean(), "{:?}", load.issues);

    let player = scene.find_by_name("Player").unwrap();
    assert_eq!(scene.entity(player).unwrap().guid(), player_guid);
    assert_eq!(
        scene.local_transform(player).unwrap().position,
        Vec3::new(1.0, 2.0, 3.0)
    );
    let render = scene.get::<RenderComponent>(player).unwrap();
    assert_eq!(render.material().unwrap().guid(), material_guid);
    let body = scene.get::<RigidBody>(player).unwrap();
    assert_eq!(body.body_type, BodyType::Dynamic);
    assert_eq!(body.colliders().len(), 1);
    assert_eq!(scene.collect_frame().draws.len(), 1);
}

#[test]
fn test_destroying_chain_root_removes_descendants() {
    let mut scene = Scene::new("chain");
    let a = scene.create_entity("A");
    let b = scene.create_child(a, "B").unwrap();
    let c = scene.create_child(b, "C").unwrap();
    let other = scene.create_entity("Other");

    scene.destroy(a).unwrap();

    assert!(!scene.contains(a));
    assert!(!scene.contains(b));
    assert!(!scene.contains(c));
    assert_eq!(scene.len(), 1);
    assert_eq!(scene.roots(), [other]);
    assert!(scene.find_by_name("C").is_none());
    assert_eq!(scene.destroy(c), Err(GraphError::NoSuchEntity(c)));
}

#[test]
fn test_second_render_component_is_rejected() {
    let registry = ResourceRegistry::new(".");
    let shader = registry.placeholder::<Shader>(AssetKind::Shader, Guid::NIL);
    let material = registry
        .create_material(Material::builder("Plain", shader).build())
        .unwrap();
    let cube = registry
        .create_or_load::<Mesh>(AssetDescriptor::procedural_mesh(vec![MeshShape::Cube {
            center: Vec3::ZERO,
            size: Vec3::ONE,
        }]))
        .unwrap();
    let ball = registry
        .create_or_load::<Mesh>(AssetDescriptor::procedural_mesh(vec![MeshShape::UvSphere {
            center: Vec3::ZERO,
            radius: 0.5,
            segments: 8,
            rings: 4,
        }]))
        .unwrap();

    let mut scene = Scene::new("dup");
    let e = scene.create_entity("Player");
    scene
        .attach(e, RenderComponent::new(cube.clone(), material.clone()))
        .unwrap();

    let err = scene
        .attach(e, RenderComponent::new(ball, material))
        .unwrap_err();
    assert!(matches!(err, GraphError::DuplicateComponent { .. }));
    assert_eq!(scene.entity(e).unwrap().components().len(), 1);
    assert_eq!(
        scene.get::<RenderComponent>(e).unwrap().mesh().unwrap().guid(),
        cube.guid()
    );
    assert_eq!(scene.collect_frame().draws.len(), 1);
}

#[test]
fn test_save_load_save_is_stable() {
    let dir = asset_root();
    let registry = ResourceRegistry::new(dir.path());
    let mesh = registry.create_or_load::<Mesh>(AssetDescriptor::mesh("box.obj")).unwrap();
    let (material, _) = box_material(&registry);

    let mut scene = Scene::new("Stable");
    let camera = scene.create_entity("Camera");
    scene
        .set_local_transform(camera, Transform::from_position(Vec3::new(0.0, 2.0, 6.0)))
        .unwrap();
    let lens = scene.attach(camera, Camera::perspective(70.0, 0.1, 50.0)).unwrap();
    scene.set_active_camera(lens).unwrap();

    let crate_entity = scene.create_entity("Crate");
    scene
        .set_local_transform(
            crate_entity,
            Transform::from_euler_degrees(Vec3::X, Vec3::new(0.0, 45.0, 0.0), Vec3::splat(2.0)),
        )
        .unwrap();
    scene
        .attach(crate_entity, RenderComponent::new(mesh.clone(), material))
        .unwrap();
    scene
        .attach(
            crate_entity,
            RigidBody::new(BodyType::Dynamic)
                .with_collider(Collider::convex_mesh(mesh))
                .with_collider(Collider::sphere(0.5).with_offset(Vec3::Y)),
        )
        .unwrap();
    let lid = scene.create_child(crate_entity, "Lid").unwrap();
    scene
        .attach(lid, RotatingBehaviour::new(Vec3::new(5.0, 0.0, 0.0)))
        .unwrap();
    scene.add_light(Light::new(Vec3::new(0.0, 5.0, 0.0), Vec3::ONE, 12.0));

    let first = dir.path().join("first.json");
    let second = dir.path().join("second.ron");
    scene.save(&first).unwrap();

    let factory = ComponentFactory::with_builtins();
    let (loaded, report) = Scene::load(&first, &registry, &factory).unwrap();
    assert!(report.is_clean(), "{:?}", report.issues);
    assert!(loaded.active_camera().is_some());
    loaded.save(&second).unwrap();

    let (reloaded, _) = Scene::load(&second, &registry, &factory).unwrap();
    let a: SceneDocument = scene_to_document(&scene).unwrap();
    let b: SceneDocument = scene_to_document(&reloaded).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_reparent_under_descendant_fails() {
    let mut scene = Scene::new("cycle");
    let a = scene.create_entity("A");
    let b = scene.create_child(a, "B").unwrap();
    let c = scene.create_child(b, "C").unwrap();

    assert_eq!(
        scene.set_parent(a, Some(c)),
        Err(GraphError::Cycle { child: a, parent: c })
    );
    assert_eq!(scene.set_parent(a, Some(a)), Err(GraphError::Cycle { child: a, parent: a }));
    assert_eq!(scene.entity(a).unwrap().parent(), None);
    assert_eq!(scene.entity(c).unwrap().parent(), Some(b));
}

#[test]
fn test_moving_ancestor_moves_grandchild() {
    let mut scene = Scene::new("world");
    let a = scene.create_entity("A");
    let b = scene.create_child(a, "B").unwrap();
    let c = scene.create_child(b, "C").unwrap();
    scene
        .set_local_transform(b, Transform::from_position(Vec3::new(0.0, 1.0, 0.0)))
        .unwrap();
    scene
        .set_local_transform(c, Transform::from_position(Vec3::new(0.0, 0.0, 1.0)))
        .unwrap();

    // Prime the cache, then move the root
    assert_eq!(
        scene.world_transform(c).unwrap().position(),
        Vec3::new(0.0, 1.0, 1.0)
    );
    scene
        .modify_transform(a, |t| t.position = Vec3::new(5.0, 0.0, 0.0))
        .unwrap();
    assert!(
        scene
            .world_transform(c)
            .unwrap()
            .position()
            .abs_diff_eq(Vec3::new(5.0, 1.0, 1.0), 1e-5)
    );

    scene
        .modify_transform(a, |t| t.scale = Vec3::splat(2.0))
        .unwrap();
    assert!(
        scene
            .world_transform(c)
            .unwrap()
            .position()
            .abs_diff_eq(Vec3::new(5.0, 2.0, 2.0), 1e-5)
    );
}
