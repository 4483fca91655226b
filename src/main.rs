//! Demo: author a small scene, save it with its manifest, then load both back
//!
//! Usage: `beat-engine [config.ron|config.json]`

use std::error::Error;
use std::fs;
use std::path::Path;

use beat_engine::prelude::*;

const VERTEX_SHADER: &str = "#version 330 core\nlayout(location = 0) in vec3 a_Position;\nuniform mat4 u_ViewProjection;\nuniform mat4 u_Transform;\nvoid main() { gl_Position = u_ViewProjection * u_Transform * vec4(a_Position, 1.0); }\n";
const FRAGMENT_SHADER: &str = "#version 330 core\nout vec4 o_Color;\nuniform vec3 u_Material.Tint;\nvoid main() { o_Color = vec4(u_Material.Tint, 1.0); }\n";

/// Write the demo shader sources if the asset root does not have them yet
fn seed_shaders(root: &Path) -> std::io::Result<()> {
    let dir = root.join("shaders");
    fs::create_dir_all(&dir)?;
    for (name, source) in [("basic.vert", VERTEX_SHADER), ("basic.frag", FRAGMENT_SHADER)] {
        let path = dir.join(name);
        if !path.exists() {
            fs::write(path, source)?;
        }
    }
    Ok(())
}

fn build_scene(registry: &ResourceRegistry) -> Result<Scene, Box<dyn Error>> {
    let shader = registry.create_or_load::<Shader>(AssetDescriptor::shader([
        (ShaderStage::Vertex, "shaders/basic.vert"),
        (ShaderStage::Fragment, "shaders/basic.frag"),
    ]))?;
    let gem = registry.create_material(
        Material::builder("Gem", shader.clone())
            .set("u_Material.Tint", Vec3::new(0.2, 0.6, 1.0))
            .set("u_Material.Shininess", 0.5_f32)
            .build(),
    )?;
    let ground_material = registry.create_material(
        Material::builder("Ground", shader)
            .set("u_Material.Tint", Vec3::splat(0.4))
            .build(),
    )?;

    let cube = registry.create_or_load::<Mesh>(AssetDescriptor::procedural_mesh(vec![MeshShape::Cube {
        center: Vec3::ZERO,
        size: Vec3::ONE,
    }]))?;
    let floor = registry.create_or_load::<Mesh>(AssetDescriptor::procedural_mesh(vec![MeshShape::Plane {
        center: Vec3::ZERO,
        normal: Vec3::Y,
        tangent: Vec3::X,
        size: Vec2::splat(20.0),
    }]))?;

    let mut scene = Scene::new("Demo");

    let camera = scene.create_entity("Main Camera");
    scene.modify_transform(camera, |t| {
        t.position = Vec3::new(0.0, 3.0, 8.0);
        t.look_at(Vec3::ZERO, Vec3::Y);
    })?;
    let mut lens = Camera::perspective(60.0, 0.1, 100.0);
    lens.set_aspect(1280, 720);
    let lens = scene.attach(camera, lens)?;
    scene.set_active_camera(lens)?;

    let ground = scene.create_entity("Ground");
    scene.attach(ground, RenderComponent::new(floor, ground_material))?;
    scene.attach(
        ground,
        RigidBody::new(BodyType::Static).with_collider(Collider::plane(Vec3::Y)),
    )?;

    let player = scene.create_entity("Player");
    scene.set_local_transform(player, Transform::from_position(Vec3::new(0.0, 1.0, 0.0)))?;
    scene.attach(player, RenderComponent::new(cube.clone(), gem.clone()))?;
    scene.attach(
        player,
        RigidBody::new(BodyType::Dynamic).with_collider(Collider::cuboid(Vec3::splat(0.5))),
    )?;

    let orbiter = scene.create_child(player, "Orbiter")?;
    scene.set_local_transform(
        orbiter,
        Transform::from_position(Vec3::new(2.0, 0.0, 0.0)).with_scale(Vec3::splat(0.25)),
    )?;
    scene.attach(orbiter, RenderComponent::new(cube, gem))?;
    scene.attach(orbiter, RotatingBehaviour::new(Vec3::new(0.0, 45.0, 0.0)))?;

    let hud = scene.create_entity("Score Panel");
    scene.attach(
        hud,
        RectTransform::centered(Vec2::new(640.0, 40.0), Vec2::new(240.0, 60.0)),
    )?;
    scene.attach(hud, GuiPanel::new(Vec4::new(0.0, 0.0, 0.0, 0.5)))?;

    scene.add_light(Light::new(Vec3::new(2.0, 4.0, 2.0), Vec3::ONE, 10.0));
    scene.add_light(Light::new(Vec3::new(-3.0, 2.0, -1.0), Vec3::new(1.0, 0.8, 0.6), 6.0));

    Ok(scene)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    log::info!("Using asset root {}", config.asset_root.display());

    seed_shaders(&config.asset_root)?;
    let manifest_path = config.asset_root.join(&config.manifest_path);
    let scene_path = config.asset_root.join(&config.scene_path);

    // Author and save
    {
        let registry = ResourceRegistry::from_config(&config);
        let mut scene = build_scene(&registry)?;
        for _ in 0..10 {
            scene.update(1.0 / 60.0);
        }
        let frame = scene.collect_frame();
        log::info!(
            "Authored '{}': {} entities, {} draws, {} gui items",
            scene.name(),
            scene.len(),
            frame.draws.len(),
            frame.gui.len()
        );

        registry.save_manifest(&manifest_path)?;
        scene.save_with(&scene_path, config.pretty_documents)?;
    }

    // Load back into a fresh registry
    let registry = ResourceRegistry::from_config(&config);
    let manifest = registry.load_manifest(&manifest_path)?;
    if !manifest.is_clean() {
        log::warn!(
            "Manifest loaded with {} failure(s) and {} missing reference(s)",
            manifest.failed.len(),
            manifest.missing_references.len()
        );
    }

    let factory = ComponentFactory::with_builtins();
    let (mut scene, report) = Scene::load(&scene_path, &registry, &factory)?;
    scene.update(1.0 / 60.0);

    let frame = scene.collect_frame();
    log::info!(
        "Reloaded '{}': {} entities, {} draws, {} lights, camera {}",
        scene.name(),
        report.entities,
        frame.draws.len(),
        frame.lights.len(),
        if frame.camera.is_some() { "set" } else { "missing" }
    );
    if report.is_clean() {
        log::info!("Scene loaded cleanly");
    }

    Ok(())
}
