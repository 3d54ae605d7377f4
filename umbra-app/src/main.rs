use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context;
use umbra::shadow::{keys, SECTION};
use umbra::{
    DefineMap, Group, Node, Settings, SettingsProvider, ShaderManager, ShadowManager,
    SHADOW_RECEIVER_TEMPLATE,
};

/// Node masks of the demo scene.
mod mask {
    pub const ACTOR: u32 = 1 << 0;
    pub const OBJECT: u32 = 1 << 1;
    pub const TERRAIN: u32 = 1 << 2;
    pub const SKY: u32 = 1 << 3;
}

fn report<P: SettingsProvider>(
    label: &str,
    shadows: &ShadowManager<P>,
    shaders: &mut ShaderManager,
    dump_shader: bool,
) -> anyhow::Result<()> {
    shaders.set_global_defines(shadows.shadow_defines());

    let scene = shadows.shadowed_scene().borrow();
    println!("== {label} ({:?})", shadows.mode());
    println!("  technique enabled: {}", scene.technique().shadows_enabled());
    println!(
        "  casting mask: {:#06b}",
        scene.shadow_settings().casts_shadow_traversal_mask
    );
    for (name, value) in shaders.global_defines() {
        println!("  {name} = {value:?}");
    }

    let source = shaders
        .get_shader("shadow_receiver", SHADOW_RECEIVER_TEMPLATE, &DefineMap::new())
        .context("expanding shadow receiver shader")?;
    log::info!(
        "{}: receiver shader has {} lines, {} variants cached",
        label,
        source.lines().count(),
        shaders.variant_count()
    );
    if dump_shader {
        println!("{source}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut settings_path = None;
    let mut dump_shader = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--dump-shader" => dump_shader = true,
            _ => settings_path = Some(arg),
        }
    }

    let settings = match settings_path {
        Some(path) => Settings::load(&path).with_context(|| format!("loading {path}"))?,
        None => Settings::new()?,
    };
    let settings = Rc::new(RefCell::new(settings));

    let scene_root = Group::new("scene root").into_shared();
    let sky = Group::new("sky").into_shared();
    sky.borrow_mut().set_node_mask(mask::SKY);
    scene_root.borrow_mut().add_child(Node::Group(Rc::clone(&sky)));
    let mut root = Group::new("root");

    let mut shadows = ShadowManager::new(
        Rc::clone(&settings),
        scene_root,
        &mut root,
        mask::ACTOR | mask::OBJECT | mask::TERRAIN,
        mask::ACTOR | mask::OBJECT,
    );

    // The sky is never shadowed
    shadows.disable_shadows_for_state_set(sky.borrow_mut().get_or_create_state_set());

    let mut shaders = ShaderManager::new();
    report("outdoor", &shadows, &mut shaders, dump_shader)?;

    shadows.enable_indoor_mode();
    report("indoor", &shadows, &mut shaders, dump_shader)?;

    shadows.enable_outdoor_mode();
    let enabled = shadows.shadows_enabled();
    settings
        .borrow_mut()
        .set_bool(SECTION, keys::ENABLE_SHADOWS, !enabled)?;
    let changes = settings.borrow_mut().take_changes();
    if shadows.process_changed_settings(&changes) {
        report("toggled", &shadows, &mut shaders, dump_shader)?;
    }

    Ok(())
}
